//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deployment
//! run. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name of the network shipped in the built-in defaults.
pub const DEFAULT_NETWORK: &str = "sophonMainnet";

/// Admin address passed to the constructor when no arguments are configured.
pub const DEFAULT_ADMIN: &str = "0xb1bef51ebca01eb12001a639bdbbff6eeca12b9f";

/// Root configuration for a deploy-and-verify run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Network used when none is given on the command line.
    pub default_network: Option<String>,

    /// Where the signing key comes from.
    pub signer: SignerConfig,

    /// What gets deployed.
    pub deployment: DeploymentConfig,

    /// Transaction and confirmation settings.
    pub chain: ChainConfig,

    /// Explorer verification settings.
    pub verification: VerificationConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Network table keyed by network name.
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(DEFAULT_NETWORK.to_string(), NetworkConfig::sophon_mainnet());

        Self {
            default_network: Some(DEFAULT_NETWORK.to_string()),
            signer: SignerConfig::default(),
            deployment: DeploymentConfig::default(),
            chain: ChainConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::default(),
            networks,
        }
    }
}

/// Connection parameters for one network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Explorer endpoint accepting verification requests.
    pub explorer_verify_url: String,

    /// Human-facing explorer root, used to print a link to the contract.
    #[serde(default)]
    pub explorer_browser_url: Option<String>,

    /// zkSync-stack chain: deploy EraVM bytecode with an EIP-712 transaction.
    #[serde(default)]
    pub zksync: bool,
}

impl NetworkConfig {
    /// Sophon mainnet, a zkSync-stack chain.
    pub fn sophon_mainnet() -> Self {
        Self {
            chain_id: 50104,
            rpc_url: "https://rpc.sophon.xyz".to_string(),
            failover_urls: Vec::new(),
            explorer_verify_url: "https://verification-explorer.sophon.xyz/contract_verification"
                .to_string(),
            explorer_browser_url: Some("https://explorer.sophon.xyz/".to_string()),
            zksync: true,
        }
    }

    /// Link to the contract page on the explorer, if a browser URL is known.
    pub fn explorer_link(&self, address: &str) -> Option<String> {
        self.explorer_browser_url
            .as_ref()
            .map(|base| format!("{}/address/{}", base.trim_end_matches('/'), address))
    }
}

/// Signer key source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Environment variable holding the hex-encoded private key.
    pub key_env: String,

    /// Load a `.env` file from the working directory before reading the key.
    pub load_dotenv: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            key_env: "PRIVATE_KEY".to_string(),
            load_dotenv: true,
        }
    }
}

/// The contract being deployed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Contract name shown in the summary and sent to the explorer.
    pub contract_name: String,

    /// Compiled artifact (Hardhat or Foundry JSON).
    pub artifact_path: PathBuf,

    /// Constructor arguments, in declaration order, as strings coerced
    /// against the constructor ABI.
    pub constructor_args: Vec<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            contract_name: "SablierMerkleFactory".to_string(),
            artifact_path: PathBuf::from(
                "artifacts-zk/src/SablierMerkleFactory.sol/SablierMerkleFactory.json",
            ),
            constructor_args: vec![DEFAULT_ADMIN.to_string()],
        }
    }
}

/// Transaction and confirmation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required (inclusion counts as one).
    pub confirmation_blocks: u32,

    /// Upper bound on the confirmation wait, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,

    /// Gas price multiplier (1.0 = node estimate, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 300,
            confirmation_poll_ms: 2_000,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

impl ChainConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

/// Explorer verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Submit a verification request after deployment.
    pub enabled: bool,

    /// Pause before the first request so the explorer indexes the contract.
    pub settle_delay_secs: u64,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Interval between status queries for queued requests.
    pub status_poll_secs: u64,

    /// Upper bound on waiting for a queued request to finish.
    pub status_timeout_secs: u64,

    /// Fully qualified contract name (`path/File.sol:Name`).
    pub contract_fqn: Option<String>,

    /// Standard-JSON compiler input submitted as the source code.
    pub source_path: Option<PathBuf>,

    /// Code format label understood by the explorer.
    pub code_format: String,

    pub solc_version: String,

    /// zksolc version for zkSync-stack explorers.
    pub zksolc_version: Option<String>,

    pub optimization_used: bool,

    /// Case-insensitive fragments identifying an "already verified" reply.
    pub already_verified_markers: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_delay_secs: 20,
            request_timeout_secs: 30,
            status_poll_secs: 5,
            status_timeout_secs: 120,
            contract_fqn: None,
            source_path: None,
            code_format: "solidity-standard-json-input".to_string(),
            solc_version: "0.8.26".to_string(),
            zksolc_version: Some("v1.5.12".to_string()),
            optimization_used: true,
            already_verified_markers: vec![
                "already verified".to_string(),
                "contract source code already verified".to_string(),
            ],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "contract_deployer=info".to_string(),
        }
    }
}
