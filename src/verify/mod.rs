//! Explorer verification subsystem.
//!
//! # Data Flow
//! ```text
//! DeploymentResult (canonical address) + ConstructorArgs
//!     → verifier.rs (settling delay, submission, classification)
//!     → explorer.rs (HTTP verification API)
//!     → VerificationOutcome (Verified | AlreadyVerified | Failed)
//! ```
//!
//! # Design Decisions
//! - Failures stop at this boundary; the deployment stands regardless
//! - Structured status first, message matching as a fallback
//! - One submission per run, no resubmission

pub mod explorer;
pub mod source;
pub mod types;
pub mod verifier;

pub use explorer::{ExplorerApi, HttpExplorer};
pub use source::load_standard_json;
pub use types::{
    StatusReply, SubmitReply, VerificationError, VerificationOutcome, VerificationStatus,
    VerificationSubmission,
};
pub use verifier::{SourceMetadata, Verifier, VerifierSettings};
