//! Domain model: ids, zones, line items, tasks, outcomes, events.

pub mod barcode;
pub mod errors;
pub mod events;
pub mod ids;
pub mod line;
pub mod manifest;
pub mod outcome;
pub mod report;
pub mod task;
pub mod zone;

pub use barcode::MatchKind;
pub use errors::{Result, TallyError};
pub use events::{EventKind, TaskEvent};
pub use ids::{LineId, TaskId};
pub use line::{LineItem, LineSnapshot, LineStatus};
pub use manifest::{ManifestRow, build_ledger};
pub use outcome::{ScanOutcome, ScanResult};
pub use report::{ReportRow, render_csv, report_rows};
pub use task::{Task, TaskKind, TaskProgress, TaskSnapshot};
pub use zone::ZoneKey;
