//! Errors surfaced by the tally engine.
//!
//! Every variant is locally recoverable: the task is left in its last valid
//! state and the caller decides what to show the operator.

use thiserror::Error;

use super::ids::LineId;
use super::zone::ZoneKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TallyError {
    /// The manifest produced no usable rows; no task is created.
    #[error("manifest contains no line items")]
    ManifestEmpty,

    /// A manifest row names a parent product that is not in the manifest.
    #[error("sub-line '{product_code}' refers to missing parent '{parent_code}'")]
    OrphanSubLine {
        product_code: String,
        parent_code: String,
    },

    /// Rows for one product sum past the largest representable target.
    #[error("target quantity for '{0}' overflows")]
    QuantityOverflow(String),

    /// A live task already exists for the zone. Clear or cancel it first.
    #[error("zone '{0}' already has an active task")]
    TaskAlreadyActive(ZoneKey),

    /// No task is live for the zone.
    #[error("zone '{0}' has no active task")]
    NoTask(ZoneKey),

    /// The line id is stale or belongs to another task. Re-poll.
    #[error("line {0} not found in task")]
    LineNotFound(LineId),

    /// Clear attempted while some line is still below target.
    #[error("zone '{zone}' still has {remaining} unit(s) outstanding")]
    IncompleteTask { zone: ZoneKey, remaining: u32 },

    /// Zone name is empty or not on the configured allow-list.
    #[error("unknown zone '{0}'")]
    UnknownZone(String),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T, E = TallyError> = std::result::Result<T, E>;
