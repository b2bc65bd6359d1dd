//! The live task for one zone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{LineId, TaskId};
use super::line::{LineItem, LineSnapshot};
use super::zone::ZoneKey;

/// Which workflow a task belongs to.
///
/// Both kinds share the reconciliation contract. Outbound orders also refuse
/// any scan once every line is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Inbound delivery-note inspection.
    #[default]
    Inspection,
    /// Outbound shipment picking.
    Outbound,
}

/// Expected-vs-scanned state for one zone.
///
/// Owned exclusively by the coordinator; callers only ever see
/// [`TaskSnapshot`] copies.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub zone: ZoneKey,
    pub kind: TaskKind,
    /// Label of the uploaded document (file name), if any.
    pub source: Option<String>,
    /// Manifest order.
    pub lines: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: TaskId,
        zone: ZoneKey,
        kind: TaskKind,
        source: Option<String>,
        lines: Vec<LineItem>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            zone,
            kind,
            source,
            lines,
            created_at: now,
            updated_at: now,
        }
    }

    /// All lines in scan-search order: each parent followed by its sub-lines.
    pub fn iter_lines(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter().flat_map(LineItem::iter_flat)
    }

    pub fn find_line(&self, id: LineId) -> Option<&LineItem> {
        self.iter_lines().find(|l| l.id == id)
    }

    pub(crate) fn find_line_mut(&mut self, id: LineId) -> Option<&mut LineItem> {
        for line in &mut self.lines {
            if line.id == id {
                return Some(line);
            }
            if let Some(sub) = line.sub_lines.iter_mut().find(|s| s.id == id) {
                return Some(sub);
            }
        }
        None
    }

    /// True once every line and sub-line has reached its target.
    pub fn is_complete(&self) -> bool {
        self.iter_lines().all(LineItem::is_completed)
    }

    pub fn progress(&self) -> TaskProgress {
        let mut progress = TaskProgress::default();
        for line in self.iter_lines() {
            progress.total_lines += 1;
            if line.is_completed() {
                progress.completed_lines += 1;
            }
            progress.total_target += u64::from(line.target_qty());
            progress.total_scanned += u64::from(line.scanned_qty());
        }
        progress.is_complete = progress.completed_lines == progress.total_lines;
        progress
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            zone: self.zone.clone(),
            kind: self.kind,
            source: self.source.clone(),
            lines: self.lines.iter().map(LineItem::snapshot).collect(),
            progress: self.progress(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Aggregate counts for a progress bar. Sub-lines count alongside parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskProgress {
    pub total_lines: usize,
    pub completed_lines: usize,
    pub total_target: u64,
    pub total_scanned: u64,
    pub is_complete: bool,
}

impl TaskProgress {
    pub fn remaining(&self) -> u64 {
        self.total_target.saturating_sub(self.total_scanned)
    }
}

/// Serializable copy of a task returned to polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub zone: ZoneKey,
    pub kind: TaskKind,
    pub source: Option<String>,
    pub lines: Vec<LineSnapshot>,
    pub progress: TaskProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskSnapshot {
    /// Look up a line (or sub-line) by product code.
    pub fn line_by_code(&self, product_code: &str) -> Option<&LineSnapshot> {
        self.lines
            .iter()
            .flat_map(|l| std::iter::once(l).chain(l.sub_lines.iter()))
            .find(|l| l.product_code == product_code)
    }
}
