//! Reconciliation engine.
//!
//! Applies one scan or one manual edit to a task's ledger. Both paths share
//! the same upper bound: a line's scanned count never exceeds its target.
//!
//! Callers are responsible for serialisation; these functions assume they
//! hold the only mutable reference to the task.

use tracing::{debug, warn};

use crate::domain::barcode::{self, MatchKind};
use crate::domain::{
    LineId, LineItem, LineSnapshot, ScanOutcome, ScanResult, TallyError, Task, TaskKind,
};

/// Position of a line inside a task: parent index plus optional sub index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinePos {
    parent: usize,
    sub: Option<usize>,
}

fn line_at(task: &Task, pos: LinePos) -> &LineItem {
    let parent = &task.lines[pos.parent];
    match pos.sub {
        Some(i) => &parent.sub_lines[i],
        None => parent,
    }
}

fn line_at_mut(task: &mut Task, pos: LinePos) -> &mut LineItem {
    let parent = &mut task.lines[pos.parent];
    match pos.sub {
        Some(i) => &mut parent.sub_lines[i],
        None => parent,
    }
}

/// First line in manifest order whose barcode matches, raw or stripped.
///
/// Parents are checked before their own sub-lines.
fn find_match(task: &Task, code: &str) -> Option<(LinePos, MatchKind)> {
    for (p, parent) in task.lines.iter().enumerate() {
        if let Some(kind) = barcode::match_barcode(&parent.barcode, code) {
            return Some((LinePos { parent: p, sub: None }, kind));
        }
        for (s, sub) in parent.sub_lines.iter().enumerate() {
            if let Some(kind) = barcode::match_barcode(&sub.barcode, code) {
                return Some((
                    LinePos {
                        parent: p,
                        sub: Some(s),
                    },
                    kind,
                ));
            }
        }
    }
    None
}

/// Apply one scanned code to the task.
///
/// Only a `Matched` outcome mutates. Outbound orders that are already fully
/// picked refuse every scan with `AlreadyFulfilled`.
pub fn apply_scan(task: &mut Task, raw_code: &str) -> ScanResult {
    let code = barcode::normalize(raw_code);

    if task.kind == TaskKind::Outbound && task.is_complete() {
        warn!(zone = %task.zone, code, "scan against fulfilled order");
        return ScanResult::without_line(ScanOutcome::AlreadyFulfilled, code);
    }

    let Some((pos, matched_by)) = find_match(task, code) else {
        warn!(zone = %task.zone, code, "no line matches scanned code");
        return ScanResult::without_line(ScanOutcome::NoMatch, code);
    };

    let incremented = line_at_mut(task, pos).try_increment();
    let line = line_at(task, pos);
    if !incremented {
        warn!(
            zone = %task.zone,
            code,
            product = %line.product_code,
            target = line.target_qty(),
            "line already at target"
        );
        return ScanResult::with_line(ScanOutcome::Overscanned, code, line.snapshot(), matched_by);
    }

    if matched_by == MatchKind::VariantStripped || line.needs_attention() {
        debug!(
            product = %line.product_code,
            barcode = %line.barcode,
            "matched special-packaging line"
        );
    }
    debug!(
        product = %line.product_code,
        scanned = line.scanned_qty(),
        target = line.target_qty(),
        "scan matched"
    );

    let mut result =
        ScanResult::with_line(ScanOutcome::Matched, code, line.snapshot(), matched_by);
    result.task_completed = task.is_complete();
    result
}

/// Set a line's scanned count directly, clamped into `0..=target`.
pub fn apply_manual_edit(
    task: &mut Task,
    line_id: LineId,
    new_qty: i64,
) -> Result<LineSnapshot, TallyError> {
    let line = task
        .find_line_mut(line_id)
        .ok_or(TallyError::LineNotFound(line_id))?;
    line.set_scanned(new_qty);
    debug!(
        product = %line.product_code,
        requested = new_qty,
        scanned = line.scanned_qty(),
        "manual edit applied"
    );
    Ok(line.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineStatus, ManifestRow, ZoneKey, build_ledger};
    use crate::ports::{IdGenerator, SystemClock, UlidGenerator};
    use chrono::Utc;
    use rstest::rstest;

    fn task_of(kind: TaskKind, rows: &[ManifestRow]) -> Task {
        let ids = UlidGenerator::new(SystemClock);
        let lines = build_ledger(rows, &ids).unwrap();
        Task::new(
            ids.generate_task_id(),
            ZoneKey::parse("anymall").unwrap(),
            kind,
            None,
            lines,
            Utc::now(),
        )
    }

    fn inspection() -> Task {
        task_of(
            TaskKind::Inspection,
            &[
                ManifestRow::new("A1", "Tea", "1001", 2),
                ManifestRow::new("A2", "Gift box", "1002B", 1),
            ],
        )
    }

    #[test]
    fn scan_increments_matching_line() {
        let mut task = inspection();

        let r = apply_scan(&mut task, " 1001 ");

        assert_eq!(r.outcome, ScanOutcome::Matched);
        assert_eq!(r.code, "1001");
        assert_eq!(r.matched_by, Some(MatchKind::Exact));
        let line = r.line.unwrap();
        assert_eq!(line.scanned_qty, 1);
        assert_eq!(line.status, LineStatus::Partial);
        assert!(!r.task_completed);
    }

    #[test]
    fn scan_matches_suffix_stripped_barcode() {
        let mut task = inspection();

        let r = apply_scan(&mut task, "1002");

        assert_eq!(r.outcome, ScanOutcome::Matched);
        assert_eq!(r.matched_by, Some(MatchKind::VariantStripped));
        let line = r.line.unwrap();
        assert_eq!(line.product_code, "A2");
        assert!(line.needs_attention);
    }

    #[rstest]
    #[case::unknown("9999")]
    #[case::blank("   ")]
    #[case::suffix_on_scan_side("1001X")]
    fn unknown_code_is_no_match(#[case] code: &str) {
        let mut task = inspection();
        let before = task.progress();

        let r = apply_scan(&mut task, code);

        assert_eq!(r.outcome, ScanOutcome::NoMatch);
        assert!(r.line.is_none());
        assert_eq!(task.progress(), before);
    }

    #[test]
    fn excess_scans_are_overscanned_and_never_increment() {
        let mut task = inspection();
        apply_scan(&mut task, "1001");
        apply_scan(&mut task, "1001");

        for _ in 0..3 {
            let r = apply_scan(&mut task, "1001");
            assert_eq!(r.outcome, ScanOutcome::Overscanned);
            assert_eq!(r.line.as_ref().unwrap().scanned_qty, 2);
        }
    }

    #[test]
    fn first_line_in_manifest_order_wins() {
        let mut task = task_of(
            TaskKind::Inspection,
            &[
                ManifestRow::new("BASE", "Base", "5000A", 1),
                ManifestRow::new("PLAIN", "Plain", "5000", 1),
            ],
        );

        let r = apply_scan(&mut task, "5000");

        assert_eq!(r.line.unwrap().product_code, "BASE");
        assert_eq!(r.matched_by, Some(MatchKind::VariantStripped));
    }

    #[test]
    fn last_scan_reports_task_completion() {
        let mut task = inspection();
        apply_scan(&mut task, "1001");
        apply_scan(&mut task, "1001");

        let r = apply_scan(&mut task, "1002");

        assert!(r.task_completed);
        assert!(task.is_complete());
    }

    #[test]
    fn inspection_keeps_reporting_per_line_outcomes_after_completion() {
        let mut task = inspection();
        for code in ["1001", "1001", "1002"] {
            apply_scan(&mut task, code);
        }

        assert_eq!(apply_scan(&mut task, "9999").outcome, ScanOutcome::NoMatch);
        assert_eq!(
            apply_scan(&mut task, "1001").outcome,
            ScanOutcome::Overscanned
        );
    }

    #[test]
    fn fulfilled_outbound_order_refuses_scans() {
        let mut task = task_of(
            TaskKind::Outbound,
            &[ManifestRow::new("A1", "Tea", "1001", 1)],
        );
        assert_eq!(apply_scan(&mut task, "1001").outcome, ScanOutcome::Matched);

        for code in ["1001", "9999"] {
            let r = apply_scan(&mut task, code);
            assert_eq!(r.outcome, ScanOutcome::AlreadyFulfilled);
            assert!(r.line.is_none());
        }
        assert_eq!(task.lines[0].scanned_qty(), 1);
    }

    #[test]
    fn outbound_scans_reach_sub_lines_without_touching_parent() {
        let mut task = task_of(
            TaskKind::Outbound,
            &[
                ManifestRow::new("SET", "Gift set", "7000", 1),
                ManifestRow::new("SOAP", "Soap", "7001", 2).under("SET"),
            ],
        );

        let r = apply_scan(&mut task, "7001");

        assert_eq!(r.outcome, ScanOutcome::Matched);
        assert_eq!(r.line.unwrap().product_code, "SOAP");
        assert_eq!(task.lines[0].scanned_qty(), 0);
        assert_eq!(task.lines[0].sub_lines[0].scanned_qty(), 1);

        apply_scan(&mut task, "7000");
        assert!(!task.is_complete());
        let r = apply_scan(&mut task, "7001");
        assert!(r.task_completed);
        assert_eq!(
            apply_scan(&mut task, "7000").outcome,
            ScanOutcome::AlreadyFulfilled
        );
    }

    #[rstest]
    #[case::within(1, 1, LineStatus::Partial)]
    #[case::at_target(2, 2, LineStatus::Completed)]
    #[case::above_target(7, 2, LineStatus::Completed)]
    #[case::negative(-3, 0, LineStatus::NotStarted)]
    fn manual_edit_is_clamped(
        #[case] requested: i64,
        #[case] expected: u32,
        #[case] status: LineStatus,
    ) {
        let mut task = inspection();
        let id = task.lines[0].id;

        let line = apply_manual_edit(&mut task, id, requested).unwrap();

        assert_eq!(line.scanned_qty, expected);
        assert_eq!(line.status, status);
        assert_eq!(task.lines[0].scanned_qty(), expected);
    }

    #[test]
    fn manual_edit_reaches_sub_lines() {
        let mut task = task_of(
            TaskKind::Outbound,
            &[
                ManifestRow::new("SET", "Gift set", "7000", 1),
                ManifestRow::new("SOAP", "Soap", "7001", 2).under("SET"),
            ],
        );
        let id = task.lines[0].sub_lines[0].id;

        let line = apply_manual_edit(&mut task, id, 2).unwrap();

        assert_eq!(line.status, LineStatus::Completed);
        assert_eq!(task.lines[0].scanned_qty(), 0);
    }

    #[test]
    fn manual_edit_on_unknown_line_fails() {
        let mut task = inspection();
        let stale = UlidGenerator::new(SystemClock).generate_line_id();

        assert_eq!(
            apply_manual_edit(&mut task, stale, 1),
            Err(TallyError::LineNotFound(stale))
        );
    }
}
