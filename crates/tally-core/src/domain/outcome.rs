//! Scan outcomes.
//!
//! A scan never fails with an error for reasons the operator can fix on the
//! floor; it returns one of these outcomes instead. Only `Matched` mutates.

use serde::{Deserialize, Serialize};

use super::barcode::MatchKind;
use super::line::LineSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// One unit was added to the matched line.
    Matched,
    /// No line's barcode (raw or suffix-stripped) equals the code: wrong item.
    NoMatch,
    /// The matched line is already at target: do not take more.
    Overscanned,
    /// The whole order is already picked: nothing may be added.
    AlreadyFulfilled,
}

impl ScanOutcome {
    pub fn is_mutation(self) -> bool {
        matches!(self, ScanOutcome::Matched)
    }

    /// Operator-facing message for the scanning client.
    pub fn message(self) -> &'static str {
        match self {
            ScanOutcome::Matched => "scan accepted",
            ScanOutcome::NoMatch => "wrong item: barcode not in this task",
            ScanOutcome::Overscanned => "quantity already full: do not take more",
            ScanOutcome::AlreadyFulfilled => "order already fulfilled",
        }
    }
}

/// Result of applying one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub outcome: ScanOutcome,
    /// The normalised code that was looked up.
    pub code: String,
    /// Matched line after the scan (present for `Matched` and `Overscanned`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchKind>,
    /// True only for the scan that brought the whole task to completion.
    #[serde(default)]
    pub task_completed: bool,
}

impl ScanResult {
    pub(crate) fn without_line(outcome: ScanOutcome, code: &str) -> Self {
        Self {
            outcome,
            code: code.to_string(),
            line: None,
            matched_by: None,
            task_completed: false,
        }
    }

    pub(crate) fn with_line(
        outcome: ScanOutcome,
        code: &str,
        line: LineSnapshot,
        matched_by: MatchKind,
    ) -> Self {
        Self {
            outcome,
            code: code.to_string(),
            line: Some(line),
            matched_by: Some(matched_by),
            task_completed: false,
        }
    }
}
