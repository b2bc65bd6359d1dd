//! Ports - the seams between the engine and the outside world.
//!
//! Each trait hides something the core should not depend on directly:
//! wall-clock time, id generation, the audit trail, document parsing.

pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod manifest_source;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::{EventSink, NoopEventSink};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::manifest_source::{ImportError, Manifest, ManifestImporter};
