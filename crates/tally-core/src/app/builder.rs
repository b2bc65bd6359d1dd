//! CoordinatorBuilder - wires ports into a `TaskCoordinator`.
//!
//! Zone names are validated at `build()` so a bad allow-list fails at
//! startup rather than on the first request.

use std::sync::Arc;
use std::time::Duration;

use super::config::TallyConfig;
use super::coordinator::TaskCoordinator;
use crate::domain::ZoneKey;
use crate::ports::{Clock, EventSink, IdGenerator, NoopEventSink, SystemClock, UlidGenerator};

/// Usage:
/// ```ignore
/// let coordinator = CoordinatorBuilder::from_config(&config)
///     .event_sink(sink.clone())
///     .build()?;
/// ```
pub struct CoordinatorBuilder {
    zones: Vec<String>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    events: Arc<dyn EventSink>,
    poll_interval: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid zone name {0:?}")]
    InvalidZone(String),

    #[error("zone {0:?} is listed more than once")]
    DuplicateZone(String),
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            clock: Arc::new(SystemClock),
            ids: None,
            events: Arc::new(NoopEventSink),
            poll_interval: Duration::from_millis(TallyConfig::default().poll_interval_ms),
        }
    }

    pub fn from_config(config: &TallyConfig) -> Self {
        let mut builder = Self::new().poll_interval(config.poll_interval());
        builder.zones = config.zones.clone();
        builder
    }

    /// Restrict the coordinator to these zones. Names are canonicalised.
    pub fn zones(mut self, zones: &[&str]) -> Self {
        self.zones = zones.iter().map(|z| z.to_string()).collect();
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Defaults to a `UlidGenerator` on the configured clock.
    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    pub fn event_sink(mut self, events: impl EventSink + 'static) -> Self {
        self.events = Arc::new(events);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn build(self) -> Result<TaskCoordinator, BuildError> {
        let mut allowed: Vec<ZoneKey> = Vec::with_capacity(self.zones.len());
        for raw in &self.zones {
            let key = ZoneKey::parse(raw).map_err(|_| BuildError::InvalidZone(raw.clone()))?;
            if allowed.contains(&key) {
                return Err(BuildError::DuplicateZone(raw.clone()));
            }
            allowed.push(key);
        }

        let ids = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(SharedClock(Arc::clone(&self.clock)))),
        };

        Ok(TaskCoordinator::new(
            allowed,
            self.clock,
            ids,
            self.events,
            self.poll_interval,
        ))
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets the default id generator read the same clock as the coordinator.
struct SharedClock(Arc<dyn Clock>);

impl Clock for SharedClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.0.now()
    }
}
