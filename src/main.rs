//! contract-deployer
//!
//! Deploys a single contract and registers its source with the network's
//! block explorer.
//!
//! # Flow
//!
//! ```text
//!   deploy.toml ──▶ validate ──▶ plan ──▶ signer check ──▶ summary table
//!                                                              │
//!                                                              ▼
//!   verify ◀── settle delay ◀── confirmation ◀── broadcast creation tx
//! ```
//!
//! # Exit status
//! - `0` once the contract is deployed, whatever verification reports
//! - `1` on configuration or deployment errors
//! - `2` when the `verify` command could not verify

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use contract_deployer::blockchain::{ContractAddress, RpcChainClient};
use contract_deployer::config::loader::signer_key_from_env;
use contract_deployer::config::{load_or_default, ConfigError, DeployConfig};
use contract_deployer::observability::init_logging;
use contract_deployer::report;
use contract_deployer::runner::{self, VerificationPlan};
use contract_deployer::verify::{HttpExplorer, VerificationOutcome, Verifier};
use contract_deployer::{DeploymentPlan, PlanOverrides, RunError, RunReport};

#[derive(Parser)]
#[command(name = "contract-deployer", version)]
#[command(about = "Deploy a contract and verify it on the block explorer", long_about = None)]
struct Cli {
    /// Configuration file; built-in defaults are used if it does not exist
    #[arg(short, long, global = true, default_value = "deploy.toml")]
    config: PathBuf,

    /// Network name from the config (defaults to `default_network`)
    #[arg(short, long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the contract, then verify it
    Deploy(DeployArgs),
    /// Verify an already deployed contract
    Verify(VerifyArgs),
    /// List configured networks
    Networks,
}

#[derive(Args)]
struct DeployArgs {
    /// Compiled artifact, overriding `deployment.artifact_path`
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Constructor argument, repeat in declaration order
    #[arg(long = "constructor-arg", value_name = "VALUE")]
    constructor_args: Vec<String>,

    /// Skip explorer verification
    #[arg(long)]
    no_verify: bool,

    /// Override the pause before verification
    #[arg(long, value_name = "SECS")]
    settle_secs: Option<u64>,
}

#[derive(Args)]
struct VerifyArgs {
    /// Address of the deployed contract
    address: String,

    #[arg(long)]
    artifact: Option<PathBuf>,

    #[arg(long = "constructor-arg", value_name = "VALUE")]
    constructor_args: Vec<String>,

    #[arg(long, value_name = "SECS", default_value_t = 0)]
    settle_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };
    init_logging(&config.logging);

    tracing::debug!(config = %cli.config.display(), "Configuration loaded");

    match cli.command {
        Commands::Networks => {
            println!("{}", report::networks_table(&config));
            ExitCode::SUCCESS
        }
        Commands::Deploy(args) => match deploy(&config, cli.network, args).await {
            Ok(report) => {
                tracing::info!(
                    address = %report.deployment.contract_address,
                    verified = report.verification.as_ref().map(VerificationOutcome::is_success),
                    "Run complete"
                );
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        },
        Commands::Verify(args) => match verify(&config, cli.network, args).await {
            Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::from(2),
            Err(e) => fail(e),
        },
    }
}

fn fail(e: RunError) -> ExitCode {
    tracing::error!(error = %e, "Run aborted");
    eprintln!("Error: {}", e);
    ExitCode::from(e.exit_code())
}

async fn deploy(config: &DeployConfig, network: Option<String>, args: DeployArgs) -> Result<RunReport, RunError> {
    let overrides = PlanOverrides {
        network,
        artifact_path: args.artifact,
        constructor_args: args.constructor_args,
        settle_delay_secs: args.settle_secs,
        skip_verification: args.no_verify,
    };
    let plan = DeploymentPlan::resolve(config, &overrides)?;

    let signer_key = signer_key_from_env(config);
    if signer_key.is_none() {
        tracing::error!(env = %config.signer.key_env, "Signer key variable is not set");
    }

    let client = RpcChainClient::connect(&plan.network, &config.chain)?;
    let verifier = plan
        .verification
        .as_ref()
        .map(|v| build_verifier(&plan.network.explorer_verify_url, v));

    runner::run(plan, signer_key.as_deref(), &client, verifier.as_ref()).await
}

async fn verify(
    config: &DeployConfig,
    network: Option<String>,
    args: VerifyArgs,
) -> Result<VerificationOutcome, RunError> {
    let address = ContractAddress::normalize(&args.address)
        .map_err(|e| ConfigError::InvalidAddress(e.to_string()))?;

    let mut config = config.clone();
    config.verification.enabled = true;
    let overrides = PlanOverrides {
        network,
        artifact_path: args.artifact,
        constructor_args: args.constructor_args,
        settle_delay_secs: Some(args.settle_secs),
        skip_verification: false,
    };
    let plan = DeploymentPlan::resolve(&config, &overrides)?;

    let Some(verification) = plan.verification.as_ref() else {
        return Err(ConfigError::VerificationDisabled.into());
    };
    let verifier = build_verifier(&plan.network.explorer_verify_url, verification);

    Ok(runner::verify_existing(&plan, &address, &verifier).await)
}

fn build_verifier(verify_url: &str, plan: &VerificationPlan) -> Verifier<HttpExplorer> {
    let explorer = HttpExplorer::new(verify_url, Duration::from_secs(plan.request_timeout_secs));
    Verifier::new(explorer, plan.settings.clone(), plan.metadata.clone())
}
