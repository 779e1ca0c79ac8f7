//! Source verification of a deployed contract.
//!
//! ```text
//! Start --submit--> Pending --success--> Verified
//! Pending --already verified--> AlreadyVerified
//! Pending --any other error--> Failed
//! ```
//!
//! The submission is sent once. A queued request is followed until it
//! reaches a terminal status or the status deadline passes; it is never
//! resubmitted.

use std::time::Duration;

use serde_json::Value;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};

use crate::blockchain::ContractAddress;
use crate::config::VerificationConfig;
use crate::deploy::ConstructorArgs;
use crate::verify::explorer::ExplorerApi;
use crate::verify::types::{
    SubmitReply, VerificationError, VerificationOutcome, VerificationStatus, VerificationSubmission,
};

/// Timing and classification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierSettings {
    /// Single pause before submitting, so the explorer can index the contract.
    pub settle_delay: Duration,
    pub status_poll_interval: Duration,
    pub status_timeout: Duration,
    /// Lowercase fragments of an "already verified" message.
    pub already_verified_markers: Vec<String>,
}

impl From<&VerificationConfig> for VerifierSettings {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            settle_delay: Duration::from_secs(config.settle_delay_secs),
            status_poll_interval: Duration::from_secs(config.status_poll_secs),
            status_timeout: Duration::from_secs(config.status_timeout_secs),
            already_verified_markers: config
                .already_verified_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

/// Compiler and source details sent with every submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetadata {
    /// Fully qualified name (`path/File.sol:Name`) or plain contract name.
    pub contract_name: String,
    pub source_code: Option<Value>,
    pub code_format: String,
    pub solc_version: String,
    pub zksolc_version: Option<String>,
    pub optimization_used: bool,
}

impl SourceMetadata {
    pub fn from_config(config: &VerificationConfig, contract_name: &str, source_code: Option<Value>) -> Self {
        Self {
            contract_name: config
                .contract_fqn
                .clone()
                .unwrap_or_else(|| contract_name.to_string()),
            source_code,
            code_format: config.code_format.clone(),
            solc_version: config.solc_version.clone(),
            zksolc_version: config.zksolc_version.clone(),
            optimization_used: config.optimization_used,
        }
    }

    fn submission(&self, address: &ContractAddress, args: &ConstructorArgs) -> VerificationSubmission {
        VerificationSubmission {
            contract_address: address.to_canonical(),
            contract_name: self.contract_name.clone(),
            source_code: self.source_code.clone(),
            code_format: self.code_format.clone(),
            compiler_solc_version: self.solc_version.clone(),
            compiler_zksolc_version: self.zksolc_version.clone(),
            optimization_used: self.optimization_used,
            constructor_arguments: args.to_hex(),
        }
    }
}

/// Drives one explorer through the verification state machine.
pub struct Verifier<E> {
    explorer: E,
    settings: VerifierSettings,
    metadata: SourceMetadata,
}

impl<E: ExplorerApi> Verifier<E> {
    pub fn new(explorer: E, settings: VerifierSettings, metadata: SourceMetadata) -> Self {
        Self {
            explorer,
            settings,
            metadata,
        }
    }

    /// Verify the contract at `address`. Never fails: every problem is
    /// reported through [`VerificationOutcome::Failed`].
    pub async fn verify(&self, address: &ContractAddress, args: &ConstructorArgs) -> VerificationOutcome {
        if !self.settings.settle_delay.is_zero() {
            tracing::info!(
                delay_secs = self.settings.settle_delay.as_secs(),
                "Waiting for the explorer to index the contract"
            );
            sleep(self.settings.settle_delay).await;
        }

        let submission = self.metadata.submission(address, args);
        let outcome = match self.explorer.submit(&submission).await {
            Ok(SubmitReply::Verified) => VerificationOutcome::Verified,
            Ok(SubmitReply::AlreadyVerified) => VerificationOutcome::AlreadyVerified,
            Ok(SubmitReply::Accepted(request_id)) => {
                tracing::info!(request_id = request_id, "Verification request queued");
                self.await_result(request_id).await
            }
            Err(e) => self.classify_error(e),
        };

        match &outcome {
            VerificationOutcome::Verified => {
                tracing::info!(address = %address, "Contract verified");
            }
            VerificationOutcome::AlreadyVerified => {
                tracing::info!(address = %address, "Contract was already verified");
            }
            VerificationOutcome::Failed(e) => {
                tracing::warn!(address = %address, error = %e, "Verification failed");
            }
        }
        outcome
    }

    /// Follow a queued request until it finishes or the deadline passes.
    async fn await_result(&self, request_id: u64) -> VerificationOutcome {
        let result = timeout(self.settings.status_timeout, async {
            let mut ticker = interval(self.settings.status_poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let reply = match self.explorer.status(request_id).await {
                    Ok(reply) => reply,
                    Err(e) => return self.classify_error(e),
                };

                match reply.status {
                    VerificationStatus::Successful => return VerificationOutcome::Verified,
                    VerificationStatus::AlreadyVerified => {
                        return VerificationOutcome::AlreadyVerified
                    }
                    VerificationStatus::Failed => {
                        return self.classify_error(VerificationError::Failed(reply.failure_message()))
                    }
                    VerificationStatus::Queued | VerificationStatus::InProgress => {
                        tracing::debug!(request_id = request_id, status = ?reply.status, "Verification pending");
                    }
                }
            }
        })
        .await;

        result.unwrap_or(VerificationOutcome::Failed(VerificationError::Timeout))
    }

    /// Compatibility shim for services that report "already verified" only
    /// as free text: match the configured markers, case-insensitively.
    fn classify_error(&self, error: VerificationError) -> VerificationOutcome {
        match error.explorer_message() {
            Some(message) if self.is_already_verified(message) => VerificationOutcome::AlreadyVerified,
            _ => VerificationOutcome::Failed(error),
        }
    }

    fn is_already_verified(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.settings
            .already_verified_markers
            .iter()
            .any(|marker| message.contains(marker.as_str()))
    }
}
