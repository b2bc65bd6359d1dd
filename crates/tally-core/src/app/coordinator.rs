//! TaskCoordinator - owns the live task of every zone.
//!
//! # Locking
//! - The zone map sits behind one `RwLock`, held only long enough to find or
//!   insert a zone's slot.
//! - Each slot is its own `RwLock<Option<Task>>`. Mutations take the write
//!   lock, so two scans on one zone apply strictly one after the other.
//!   Reads take the read lock and clone, so they see either the state before
//!   or after a mutation, never half of one.
//! - Different zones never contend.
//! - Events go to the sink after the slot lock is dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{
    EventKind, LineId, LineSnapshot, ReportRow, Result, ScanResult, TallyError, Task, TaskEvent,
    TaskId, TaskKind, TaskSnapshot, ZoneKey, build_ledger, report_rows,
};
use crate::engine;
use crate::ports::{Clock, EventSink, IdGenerator, Manifest};

type ZoneSlot = Arc<RwLock<Option<Task>>>;

pub struct TaskCoordinator {
    zones: RwLock<HashMap<ZoneKey, ZoneSlot>>,
    /// Empty means every zone is accepted.
    allowed: Vec<ZoneKey>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    events: Arc<dyn EventSink>,
    poll_interval: Duration,
}

impl TaskCoordinator {
    pub(crate) fn new(
        allowed: Vec<ZoneKey>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        events: Arc<dyn EventSink>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            allowed,
            clock,
            ids,
            events,
            poll_interval,
        }
    }

    /// Interval clients should poll at; bounds how stale a device's view is.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Canonicalise a zone name and check it against the allow-list.
    pub fn zone_key(&self, raw: &str) -> Result<ZoneKey> {
        let key = ZoneKey::parse(raw)?;
        if !self.allowed.is_empty() && !self.allowed.contains(&key) {
            return Err(TallyError::UnknownZone(raw.to_string()));
        }
        Ok(key)
    }

    async fn slot(&self, zone: &ZoneKey) -> ZoneSlot {
        if let Some(slot) = self.zones.read().await.get(zone) {
            return Arc::clone(slot);
        }
        let mut zones = self.zones.write().await;
        Arc::clone(zones.entry(zone.clone()).or_default())
    }

    /// Drop the zone's slot once it is empty and nothing else holds it.
    ///
    /// Clones of a slot are only handed out under the map lock, so with the
    /// write lock held a strong count of one means no operation is in flight.
    async fn prune(&self, zone: &ZoneKey) {
        let mut zones = self.zones.write().await;
        let idle = zones.get(zone).is_some_and(|slot| {
            Arc::strong_count(slot) == 1 && slot.try_read().is_ok_and(|t| t.is_none())
        });
        if idle {
            zones.remove(zone);
        }
    }

    async fn existing_slot(&self, zone: &ZoneKey) -> Option<ZoneSlot> {
        self.zones.read().await.get(zone).cloned()
    }

    async fn emit(&self, zone: &ZoneKey, task_id: TaskId, kind: EventKind) {
        let event = TaskEvent::new(zone.clone(), task_id, self.clock.now(), kind);
        self.events.emit(event).await;
    }

    /// Seed a new task for `zone` from an imported manifest.
    ///
    /// Fails with `TaskAlreadyActive` while the zone still has a task, and
    /// with `ManifestEmpty` when the manifest has no usable rows.
    pub async fn create_task(
        &self,
        zone: &str,
        kind: TaskKind,
        manifest: Manifest,
    ) -> Result<TaskSnapshot> {
        let zone = self.zone_key(zone)?;
        let lines = build_ledger(&manifest.rows, self.ids.as_ref())?;
        let slot = self.slot(&zone).await;

        let snapshot = {
            let mut current = slot.write().await;
            if current.is_some() {
                return Err(TallyError::TaskAlreadyActive(zone));
            }
            let task = Task::new(
                self.ids.generate_task_id(),
                zone.clone(),
                kind,
                manifest.source,
                lines,
                self.clock.now(),
            );
            let snapshot = task.snapshot();
            *current = Some(task);
            snapshot
        };

        info!(
            zone = %zone,
            task_id = %snapshot.id,
            kind = ?kind,
            lines = snapshot.lines.len(),
            target = snapshot.progress.total_target,
            "task created"
        );
        self.emit(
            &zone,
            snapshot.id,
            EventKind::TaskCreated {
                kind,
                lines: snapshot.lines.len(),
                source: snapshot.source.clone(),
            },
        )
        .await;
        Ok(snapshot)
    }

    /// Current state of the zone, or `None` when no task is live.
    pub async fn get_task(&self, zone: &str) -> Result<Option<TaskSnapshot>> {
        let zone = self.zone_key(zone)?;
        let Some(slot) = self.existing_slot(&zone).await else {
            return Ok(None);
        };
        let current = slot.read().await;
        Ok(current.as_ref().map(Task::snapshot))
    }

    /// Apply one scanned code to the zone's task.
    pub async fn record_scan(&self, zone: &str, code: &str) -> Result<ScanResult> {
        let zone = self.zone_key(zone)?;
        let slot = self.existing_slot(&zone).await;
        let Some(slot) = slot else {
            return Err(TallyError::NoTask(zone));
        };

        let (task_id, result) = {
            let mut current = slot.write().await;
            let task = current
                .as_mut()
                .ok_or_else(|| TallyError::NoTask(zone.clone()))?;
            let result = engine::apply_scan(task, code);
            if result.outcome.is_mutation() {
                task.updated_at = self.clock.now();
            }
            (task.id, result)
        };

        self.emit(
            &zone,
            task_id,
            EventKind::Scanned {
                code: result.code.clone(),
                outcome: result.outcome,
                line_id: result.line.as_ref().map(|l| l.id),
            },
        )
        .await;
        if result.task_completed {
            info!(zone = %zone, task_id = %task_id, "all lines reached target");
            self.emit(&zone, task_id, EventKind::TaskCompleted).await;
        }
        Ok(result)
    }

    /// Operator correction of one line's count, clamped to its target.
    pub async fn record_manual_edit(
        &self,
        zone: &str,
        line_id: LineId,
        qty: i64,
    ) -> Result<LineSnapshot> {
        let zone = self.zone_key(zone)?;
        let Some(slot) = self.existing_slot(&zone).await else {
            return Err(TallyError::NoTask(zone));
        };

        let (task_id, line, completed_now) = {
            let mut current = slot.write().await;
            let task = current
                .as_mut()
                .ok_or_else(|| TallyError::NoTask(zone.clone()))?;
            let was_complete = task.is_complete();
            let line = engine::apply_manual_edit(task, line_id, qty)?;
            task.updated_at = self.clock.now();
            (task.id, line, !was_complete && task.is_complete())
        };

        self.emit(
            &zone,
            task_id,
            EventKind::ManualEdit {
                line_id,
                requested: qty,
                scanned_qty: line.scanned_qty,
            },
        )
        .await;
        if completed_now {
            info!(zone = %zone, task_id = %task_id, "all lines reached target");
            self.emit(&zone, task_id, EventKind::TaskCompleted).await;
        }
        Ok(line)
    }

    /// Close a finished task. Refuses while any unit is outstanding.
    ///
    /// Returns the final state of the removed task.
    pub async fn clear_task(&self, zone: &str) -> Result<TaskSnapshot> {
        let zone = self.zone_key(zone)?;
        let Some(slot) = self.existing_slot(&zone).await else {
            return Err(TallyError::NoTask(zone));
        };

        let snapshot = {
            let mut current = slot.write().await;
            let task = current
                .as_ref()
                .ok_or_else(|| TallyError::NoTask(zone.clone()))?;
            if !task.is_complete() {
                let remaining = task.progress().remaining();
                return Err(TallyError::IncompleteTask {
                    zone,
                    remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
                });
            }
            let snapshot = task.snapshot();
            *current = None;
            snapshot
        };
        drop(slot);
        self.prune(&zone).await;

        info!(zone = %zone, task_id = %snapshot.id, "task cleared");
        self.emit(&zone, snapshot.id, EventKind::TaskCleared).await;
        Ok(snapshot)
    }

    /// Drop the zone's task whatever its progress (operator switches order).
    pub async fn cancel_task(&self, zone: &str) -> Result<TaskSnapshot> {
        let zone = self.zone_key(zone)?;
        let Some(slot) = self.existing_slot(&zone).await else {
            return Err(TallyError::NoTask(zone));
        };

        let task = slot
            .write()
            .await
            .take()
            .ok_or_else(|| TallyError::NoTask(zone.clone()))?;
        drop(slot);
        self.prune(&zone).await;
        let snapshot = task.snapshot();

        info!(
            zone = %zone,
            task_id = %snapshot.id,
            remaining = snapshot.progress.remaining(),
            "task cancelled"
        );
        self.emit(&zone, snapshot.id, EventKind::TaskCancelled).await;
        Ok(snapshot)
    }

    /// Rows for the downloadable report. Read-only; any completion level.
    pub async fn export_report(&self, zone: &str) -> Result<Vec<ReportRow>> {
        let zone = self.zone_key(zone)?;
        let Some(slot) = self.existing_slot(&zone).await else {
            return Err(TallyError::NoTask(zone));
        };
        let current = slot.read().await;
        let task = current.as_ref().ok_or(TallyError::NoTask(zone.clone()))?;
        Ok(report_rows(task))
    }

    /// Zones that currently hold a live task, sorted.
    pub async fn active_zones(&self) -> Vec<ZoneKey> {
        let slots: Vec<(ZoneKey, ZoneSlot)> = self
            .zones
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();

        let mut active = Vec::new();
        for (zone, slot) in slots {
            if slot.read().await.is_some() {
                active.push(zone);
            }
        }
        active.sort();
        active
    }
}
