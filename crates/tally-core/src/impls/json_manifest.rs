//! JsonManifestImporter - reads manifest rows from a JSON document.
//!
//! Accepts either a bare array of rows or `{"source": .., "rows": [..]}`.

use serde::Deserialize;

use crate::domain::ManifestRow;
use crate::ports::{ImportError, Manifest, ManifestImporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestImporter;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonManifest {
    Rows(Vec<ManifestRow>),
    Document {
        #[serde(default)]
        source: Option<String>,
        rows: Vec<ManifestRow>,
    },
}

impl ManifestImporter for JsonManifestImporter {
    fn import(&self, source: &str, bytes: &[u8]) -> Result<Manifest, ImportError> {
        let doc: JsonManifest =
            serde_json::from_slice(bytes).map_err(|e| ImportError::Malformed(e.to_string()))?;
        let manifest = match doc {
            JsonManifest::Rows(rows) => Manifest {
                source: Some(source.to_string()),
                rows,
            },
            JsonManifest::Document { source: label, rows } => Manifest {
                source: label.or_else(|| Some(source.to_string())),
                rows,
            },
        };
        Ok(manifest)
    }
}
