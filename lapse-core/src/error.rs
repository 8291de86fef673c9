//! Error types for store construction.
//!
//! Runtime operations never fail: a missing or expired key is reported as
//! `None`/`false`, not as an error.

use thiserror::Error;

/// Invalid store configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The reaper cannot tick on a zero-length period
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,

    /// An environment variable held something other than a duration
    #[error("invalid duration {value:?} in {var}: {source}")]
    InvalidDuration {
        var: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}

/// Errors that can occur when creating a store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The reaper is spawned on Tokio, so construction needs a runtime context
    #[error(
        "lapse_core::Store requires a Tokio runtime. Ensure the store is created \
         from within a #[tokio::main] or #[tokio::test] context, or from code \
         running on a Tokio runtime"
    )]
    NoRuntime,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
