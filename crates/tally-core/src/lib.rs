//! tally-core
//!
//! Reconciles barcode scans against an expected bill of materials, one live
//! task per zone, shared by any number of scanning devices.
//!
//! # Modules
//! - **domain**: line items, tasks, barcode normalisation, ledger building
//! - **engine**: applies scans and manual edits to a task
//! - **ports**: clock, id generation, audit sink, manifest import
//! - **impls**: in-memory and JSON implementations of the ports
//! - **app**: coordinator, builder, configuration, logging

pub mod app;
pub mod domain;
pub mod engine;
pub mod impls;
pub mod ports;

pub use app::{CoordinatorBuilder, TallyConfig, TaskCoordinator};
pub use domain::{
    LineId, LineSnapshot, LineStatus, ManifestRow, ReportRow, ScanOutcome, ScanResult,
    TallyError, TaskKind, TaskSnapshot, ZoneKey,
};
pub use ports::Manifest;
