//! InMemoryEventSink - keeps the audit trail in process memory.
//!
//! Mirrors the per-order scan log operators consult: which codes were
//! scanned for a zone and whether the task finished.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{TaskEvent, ZoneKey};
use crate::ports::EventSink;

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<Vec<TaskEvent>>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for one zone, oldest first.
    pub async fn events_for(&self, zone: &ZoneKey) -> Vec<TaskEvent> {
        let events = self.events.lock().await;
        events.iter().filter(|e| &e.zone == zone).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn emit(&self, event: TaskEvent) {
        self.events.lock().await.push(event);
    }
}
