//! App - wiring, configuration and the coordinator itself.
//!
//! # Components
//! - **CoordinatorBuilder**: validates zones, plugs in the ports
//! - **TaskCoordinator**: per-zone serialised access to live tasks
//! - **TallyConfig**: TOML configuration
//! - **init_logging**: tracing subscriber setup

pub mod builder;
pub mod config;
pub mod coordinator;
pub mod logging;

pub use self::builder::{BuildError, CoordinatorBuilder};
pub use self::config::{LogConfig, LogFormat, TallyConfig};
pub use self::coordinator::TaskCoordinator;
pub use self::logging::init_logging;
