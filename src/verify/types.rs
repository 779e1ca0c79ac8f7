//! Verification request, reply and outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why a verification did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The explorer did not answer within the request or status deadline.
    #[error("explorer request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("explorer unreachable: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("explorer rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Reply body not understood.
    #[error("unexpected explorer reply: {0}")]
    Decode(String),

    /// The explorer ran the verification and it failed.
    #[error("verification failed: {0}")]
    Failed(String),
}

impl VerificationError {
    /// Human-readable message carried by the explorer, if any.
    pub fn explorer_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Terminal result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    /// The explorer already had this source; counts as success.
    AlreadyVerified,
    /// Reported, never fatal to the run.
    Failed(VerificationError),
}

impl VerificationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => f.write_str("verified"),
            Self::AlreadyVerified => f.write_str("already verified"),
            Self::Failed(e) => write!(f, "failed ({})", e),
        }
    }
}

/// Status values reported by the verification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Queued,
    InProgress,
    Successful,
    Failed,
    AlreadyVerified,
}

/// Reply to a status query for a queued request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
    pub status: VerificationStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub compilation_errors: Vec<String>,
}

impl StatusReply {
    /// Error text for a failed status, joining compilation errors when the
    /// service gives no summary.
    pub fn failure_message(&self) -> String {
        match &self.error {
            Some(error) if !error.is_empty() => error.clone(),
            _ if !self.compilation_errors.is_empty() => self.compilation_errors.join("; "),
            _ => "no reason given".to_string(),
        }
    }
}

/// Immediate reply to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReply {
    /// Queued; poll the status endpoint with this id.
    Accepted(u64),
    Verified,
    AlreadyVerified,
}

/// Body sent to the verification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSubmission {
    pub contract_address: String,
    pub contract_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code: Option<Value>,
    pub code_format: String,
    pub compiler_solc_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_zksolc_version: Option<String>,
    pub optimization_used: bool,
    pub constructor_arguments: String,
}
