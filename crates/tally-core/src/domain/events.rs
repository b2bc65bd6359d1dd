//! Audit events emitted by the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{LineId, TaskId};
use super::outcome::ScanOutcome;
use super::task::TaskKind;
use super::zone::ZoneKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    TaskCreated {
        kind: TaskKind,
        lines: usize,
        source: Option<String>,
    },
    Scanned {
        code: String,
        outcome: ScanOutcome,
        line_id: Option<LineId>,
    },
    ManualEdit {
        line_id: LineId,
        requested: i64,
        scanned_qty: u32,
    },
    /// Every line reached target.
    TaskCompleted,
    TaskCleared,
    TaskCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub zone: ZoneKey,
    pub task_id: TaskId,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl TaskEvent {
    pub fn new(zone: ZoneKey, task_id: TaskId, at: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            zone,
            task_id,
            at,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn event_is_internally_tagged() {
        let event = TaskEvent::new(
            ZoneKey::parse("yummy").unwrap(),
            TaskId::from_ulid(Ulid::new()),
            Utc::now(),
            EventKind::Scanned {
                code: "1001".to_string(),
                outcome: ScanOutcome::Matched,
                line_id: None,
            },
        );

        let v = serde_json::to_value(&event).unwrap();
        assert_eq!(v["event"], "scanned");
        assert_eq!(v["zone"], "yummy");
        assert_eq!(v["outcome"], "matched");
    }
}
