//! ManifestImporter port - turns an uploaded document into manifest rows.
//!
//! Document parsing (PDF delivery notes, order APIs) lives outside this
//! crate; the coordinator only consumes the rows.

use crate::domain::ManifestRow;

/// A parsed upload: the rows plus the label of the document they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub source: Option<String>,
    pub rows: Vec<ManifestRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("manifest could not be read: {0}")]
    Unreadable(String),

    #[error("manifest is malformed: {0}")]
    Malformed(String),
}

pub trait ManifestImporter: Send + Sync {
    fn import(&self, source: &str, bytes: &[u8]) -> Result<Manifest, ImportError>;
}
