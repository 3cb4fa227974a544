//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the crate only uses
//! the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
