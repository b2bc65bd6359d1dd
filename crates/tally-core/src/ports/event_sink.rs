//! EventSink port - audit trail of what happened to each task.
//!
//! Sinks observe; they never influence a mutation. The coordinator emits
//! after releasing the zone lock.

use async_trait::async_trait;

use crate::domain::TaskEvent;

/// Receives one `TaskEvent` per lifecycle step of a task.
///
/// # Ordering
/// - Events for one zone arrive in the order their mutations were applied,
///   except that two concurrent mutations may emit in either order once both
///   have released the zone lock.
/// - A scan that completes the task emits `Scanned` then `TaskCompleted`.
///
/// # Failure
/// `emit` has no error path. A sink that writes somewhere fallible logs and
/// drops the event; the mutation it describes has already happened.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: TaskEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn emit(&self, _event: TaskEvent) {}
}
