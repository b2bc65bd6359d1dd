//! Impls - in-process implementations of the ports.
//!
//! - **InMemoryEventSink**: audit trail kept in memory
//! - **JsonManifestImporter**: manifest rows from JSON uploads

pub mod inmem_events;
pub mod json_manifest;

pub use self::inmem_events::InMemoryEventSink;
pub use self::json_manifest::JsonManifestImporter;
