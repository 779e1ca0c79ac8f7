//! Run-level error type.

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::config::ConfigError;

/// Errors that abort a run. Verification failures never appear here; they
/// are reported as a `VerificationOutcome` instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The contract could not be created.
    #[error("Deployment failed: {0}")]
    Deployment(#[from] BlockchainError),
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
