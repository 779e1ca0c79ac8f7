//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{DeployConfig, NetworkConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::deploy::artifact::ArtifactError;

/// Errors raised while resolving configuration. All of them abort the run
/// before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Unknown network '{name}' (configured: {known})")]
    UnknownNetwork { name: String, known: String },

    #[error("No network selected and no default_network configured")]
    NoNetwork,

    /// The signer key is absent or blank.
    #[error("Signer key not set; export it in the environment or add it to .env")]
    MissingSignerKey,

    #[error("Invalid signer key: {0}")]
    InvalidSignerKey(String),

    #[error("Invalid contract address: {0}")]
    InvalidAddress(String),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Verification is disabled for this run")]
    VerificationDisabled,

    #[error("Verification source error for {path}: {reason}")]
    VerificationSource { path: PathBuf, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DeployConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load the file if it exists, otherwise fall back to the built-in defaults.
pub fn load_or_default(path: &Path) -> Result<DeployConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "Config file not found, using built-in defaults");
        let config = DeployConfig::default();
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DeployConfig, ConfigError> {
    let config: DeployConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Select a network by name, falling back to `default_network`.
pub fn resolve_network<'a>(
    config: &'a DeployConfig,
    requested: Option<&str>,
) -> Result<(&'a str, &'a NetworkConfig), ConfigError> {
    let name = requested
        .or(config.default_network.as_deref())
        .ok_or(ConfigError::NoNetwork)?;

    config
        .networks
        .get_key_value(name)
        .map(|(name, network)| (name.as_str(), network))
        .ok_or_else(|| ConfigError::UnknownNetwork {
            name: name.to_string(),
            known: config.networks.keys().cloned().collect::<Vec<_>>().join(", "),
        })
}

/// Read the signer key from the configured environment variable.
///
/// Returns `None` when the variable is unset or blank. The value is never
/// logged.
pub fn signer_key_from_env(config: &DeployConfig) -> Option<String> {
    if config.signer.load_dotenv {
        // A missing .env file is normal.
        let _ = dotenv::dotenv();
    }
    std::env::var(&config.signer.key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
}
