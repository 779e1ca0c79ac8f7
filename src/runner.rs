//! Deploy-and-verify orchestration.
//!
//! # Data Flow
//! ```text
//! DeployConfig + overrides
//!     → DeploymentPlan::resolve (network, artifact, constructor args, source)
//!     → signer check + summary table
//!     → Deployer (create + confirm)
//!     → Verifier (optional, non-fatal)
//!     → RunReport
//! ```
//!
//! Steps run strictly in sequence; verification only starts once the
//! creation transaction is confirmed.

use std::path::PathBuf;

use crate::blockchain::{ChainClient, ConfirmationPolicy, ContractAddress};
use crate::config::{resolve_network, ConfigError, DeployConfig, NetworkConfig};
use crate::deploy::{resolve_signer, ContractArtifact, Deployer, DeploymentRequest, DeploymentResult};
use crate::error::RunError;
use crate::report::{self, RunSummary};
use crate::verify::{
    load_standard_json, ExplorerApi, SourceMetadata, VerificationOutcome, Verifier, VerifierSettings,
};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct PlanOverrides {
    pub network: Option<String>,
    pub artifact_path: Option<PathBuf>,
    /// Replaces the configured constructor arguments when non-empty.
    pub constructor_args: Vec<String>,
    pub settle_delay_secs: Option<u64>,
    pub skip_verification: bool,
}

/// Verification half of a plan.
#[derive(Debug, Clone)]
pub struct VerificationPlan {
    pub settings: VerifierSettings,
    pub metadata: SourceMetadata,
    pub request_timeout_secs: u64,
}

/// A fully resolved run: nothing left to read from disk or config.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    pub network_name: String,
    pub network: NetworkConfig,
    pub request: DeploymentRequest,
    pub confirmation: ConfirmationPolicy,
    pub verification: Option<VerificationPlan>,
}

impl DeploymentPlan {
    /// Resolve configuration into a plan. Reads the artifact and verification
    /// source from disk; makes no network call.
    pub fn resolve(config: &DeployConfig, overrides: &PlanOverrides) -> Result<Self, ConfigError> {
        let (network_name, network) = resolve_network(config, overrides.network.as_deref())?;

        let artifact_path = overrides
            .artifact_path
            .as_ref()
            .unwrap_or(&config.deployment.artifact_path);
        let artifact = ContractArtifact::load(artifact_path, &config.deployment.contract_name)?;

        let values = if overrides.constructor_args.is_empty() {
            &config.deployment.constructor_args
        } else {
            &overrides.constructor_args
        };
        let constructor_args = artifact.encode_constructor_args(values)?;

        let verification = if config.verification.enabled && !overrides.skip_verification {
            let source_code = match &config.verification.source_path {
                Some(path) => Some(load_standard_json(path)?),
                None => {
                    tracing::warn!("No verification source_path configured; submitting without source code");
                    None
                }
            };
            let mut settings = VerifierSettings::from(&config.verification);
            if let Some(secs) = overrides.settle_delay_secs {
                settings.settle_delay = std::time::Duration::from_secs(secs);
            }
            Some(VerificationPlan {
                settings,
                metadata: SourceMetadata::from_config(
                    &config.verification,
                    &artifact.contract_name,
                    source_code,
                ),
                request_timeout_secs: config.verification.request_timeout_secs,
            })
        } else {
            None
        };

        Ok(Self {
            network_name: network_name.to_string(),
            network: network.clone(),
            request: DeploymentRequest {
                artifact,
                constructor_args,
            },
            confirmation: ConfirmationPolicy::from(&config.chain),
            verification,
        })
    }

    pub fn contract_name(&self) -> &str {
        &self.request.artifact.contract_name
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub deployment: DeploymentResult,
    /// `None` when verification was skipped.
    pub verification: Option<VerificationOutcome>,
}

/// Deploy, then verify if a verifier is given.
///
/// Only configuration and deployment errors are returned; a failed
/// verification is part of the report.
pub async fn run<C, E>(
    plan: DeploymentPlan,
    signer_key: Option<&str>,
    client: &C,
    verifier: Option<&Verifier<E>>,
) -> Result<RunReport, RunError>
where
    C: ChainClient,
    E: ExplorerApi,
{
    let wallet = resolve_signer(signer_key, plan.network.chain_id)?;

    report::print_summary(&RunSummary {
        contract: plan.contract_name().to_string(),
        chain_id: plan.network.chain_id,
        network: plan.network_name.clone(),
        deployer: wallet.address().to_checksum(None),
    });

    let contract_name = plan.contract_name().to_string();
    let constructor_args = plan.request.constructor_args.clone();
    let deployer = Deployer::new(client, &plan.network, plan.confirmation);
    let deployment = deployer.deploy_with(&wallet, plan.request).await?;

    let link = plan.network.explorer_link(&deployment.contract_address.to_canonical());
    report::print_deployment(&contract_name, &deployment, link.as_deref());

    let verification = match verifier {
        Some(verifier) => {
            report::print_verification_start();
            let outcome = verifier.verify(&deployment.contract_address, &constructor_args).await;
            report::print_verification(&outcome);
            Some(outcome)
        }
        None => {
            tracing::info!("Verification skipped");
            None
        }
    };

    Ok(RunReport {
        deployment,
        verification,
    })
}

/// Verify an already deployed contract.
pub async fn verify_existing<E: ExplorerApi>(
    plan: &DeploymentPlan,
    address: &ContractAddress,
    verifier: &Verifier<E>,
) -> VerificationOutcome {
    report::print_verification_start();
    let outcome = verifier
        .verify(address, &plan.request.constructor_args)
        .await;
    report::print_verification(&outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::deploy::artifact::tests::{hardhat_artifact, ADMIN};

    fn artifact_file(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "contract-deployer-plan-{}-{}.json",
            std::process::id(),
            tag
        ));
        fs::write(&path, hardhat_artifact()).unwrap();
        path
    }

    #[test]
    fn test_resolve_defaults() {
        let mut config = DeployConfig::default();
        config.deployment.artifact_path = artifact_file("defaults");

        let plan = DeploymentPlan::resolve(&config, &PlanOverrides::default()).unwrap();
        assert_eq!(plan.network_name, "sophonMainnet");
        assert_eq!(plan.contract_name(), "SablierMerkleFactory");
        assert_eq!(plan.request.constructor_args.values(), &[ADMIN.to_string()]);
        assert_eq!(plan.confirmation.required, 1);

        let verification = plan.verification.unwrap();
        assert_eq!(verification.settings.settle_delay.as_secs(), 20);
        assert!(verification.metadata.source_code.is_none());
    }

    #[test]
    fn test_resolve_overrides() {
        let mut config = DeployConfig::default();
        config.deployment.artifact_path = PathBuf::from("/no/such/file.json");

        let overrides = PlanOverrides {
            artifact_path: Some(artifact_file("overrides")),
            constructor_args: vec!["0x0000000000000000000000000000000000000001".into()],
            settle_delay_secs: Some(0),
            ..PlanOverrides::default()
        };
        let plan = DeploymentPlan::resolve(&config, &overrides).unwrap();
        assert_eq!(plan.request.constructor_args.encoded()[31], 1);
        assert!(plan.verification.unwrap().settings.settle_delay.is_zero());

        let skip = PlanOverrides {
            skip_verification: true,
            ..overrides
        };
        assert!(DeploymentPlan::resolve(&config, &skip).unwrap().verification.is_none());
    }

    #[test]
    fn test_resolve_missing_artifact() {
        let mut config = DeployConfig::default();
        config.deployment.artifact_path = PathBuf::from("/no/such/file.json");
        let err = DeploymentPlan::resolve(&config, &PlanOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Artifact(_)));
    }

    #[test]
    fn test_resolve_unknown_network() {
        let overrides = PlanOverrides {
            network: Some("zkSyncSepolia".into()),
            ..PlanOverrides::default()
        };
        let err = DeploymentPlan::resolve(&DeployConfig::default(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork { .. }));
    }
}
