//! Logging setup.
//!
//! The crate logs through the `log` facade; binaries and tests pick the backend.
//! [`init_logging`] installs `env_logger` for callers that have no logger of their own.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
