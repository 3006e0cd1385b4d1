//! Errors raised by the integration layer.

use autonpc_core::SpawnDenied;
use thiserror::Error;

/// Failures at the engine boundary.
#[derive(Error, Debug)]
pub enum HostError {
    /// No factory is registered under this script name.
    #[error("unknown creature script: {0}")]
    UnknownScript(String),

    /// The agent manager refused the spawn.
    #[error(transparent)]
    Denied(#[from] SpawnDenied),

    /// A global tracing subscriber was already installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
