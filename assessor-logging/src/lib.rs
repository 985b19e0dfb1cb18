//! Logging initialisation for the assessor binaries
//!
//! Both the service and the load driver log through `tracing`. Crates that
//! use the `log` facade (the retry executor, the MongoDB driver) are bridged
//! into the same subscriber.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
