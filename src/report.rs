//! User-facing run output on stdout.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::DeployConfig;
use crate::deploy::DeploymentResult;
use crate::verify::VerificationOutcome;

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "setting")]
    key: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "network")]
    name: String,
    #[tabled(rename = "chain id")]
    chain_id: u64,
    #[tabled(rename = "rpc")]
    rpc_url: String,
    #[tabled(rename = "verify url")]
    verify_url: String,
}

/// What is about to happen, shown before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub contract: String,
    pub chain_id: u64,
    pub network: String,
    pub deployer: String,
}

impl RunSummary {
    pub fn to_table(&self) -> String {
        let rows = vec![
            SettingRow {
                key: "contract",
                value: self.contract.clone(),
            },
            SettingRow {
                key: "chainId",
                value: self.chain_id.to_string(),
            },
            SettingRow {
                key: "network",
                value: self.network.clone(),
            },
            SettingRow {
                key: "deployerAddress",
                value: self.deployer.clone(),
            },
        ];
        Table::new(rows).with(Style::modern()).to_string()
    }
}

/// Table of configured networks.
pub fn networks_table(config: &DeployConfig) -> String {
    let rows = config.networks.iter().map(|(name, network)| NetworkRow {
        name: name.clone(),
        chain_id: network.chain_id,
        rpc_url: network.rpc_url.clone(),
        verify_url: network.explorer_verify_url.clone(),
    });
    Table::new(rows).with(Style::modern()).to_string()
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary.to_table());
}

pub fn print_deployment(contract: &str, result: &DeploymentResult, explorer_link: Option<&str>) {
    println!("{} deployed to: {}", contract, result.contract_address);
    println!("  transaction: {} (block {})", result.transaction_hash, result.block_number);
    if let Some(link) = explorer_link {
        println!("  explorer:    {}", link);
    }
}

pub fn print_verification_start() {
    println!();
    println!("Verifying contract...");
}

pub fn print_verification(outcome: &VerificationOutcome) {
    match outcome {
        VerificationOutcome::Verified => println!("Contract verified"),
        VerificationOutcome::AlreadyVerified => println!("Contract already verified"),
        VerificationOutcome::Failed(e) => {
            println!("Verification failed: {}", e);
            println!("The deployment itself succeeded; verification can be retried with the `verify` command.");
        }
    }
}
