//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default network exists)
//! - Validate value ranges (timeouts > 0, confirmations >= 1)
//! - Validate endpoint URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{DeployConfig, NetworkConfig};

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &DeployConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.networks.is_empty() {
        errors.push(ValidationError::new("networks", "at least one network is required"));
    }
    if let Some(name) = &config.default_network {
        if !config.networks.contains_key(name) {
            errors.push(ValidationError::new(
                "default_network",
                format!("unknown network '{}'", name),
            ));
        }
    }
    for (name, network) in &config.networks {
        validate_network(name, network, &mut errors);
    }

    if config.signer.key_env.trim().is_empty() {
        errors.push(ValidationError::new("signer.key_env", "must not be empty"));
    }

    let deployment = &config.deployment;
    if deployment.contract_name.trim().is_empty() {
        errors.push(ValidationError::new("deployment.contract_name", "must not be empty"));
    }
    if deployment.artifact_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("deployment.artifact_path", "must not be empty"));
    }
    for (i, arg) in deployment.constructor_args.iter().enumerate() {
        if arg.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("deployment.constructor_args[{}]", i),
                "must not be empty",
            ));
        }
    }

    let chain = &config.chain;
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }
    if chain.confirmation_blocks == 0 {
        errors.push(ValidationError::new("chain.confirmation_blocks", "must be at least 1"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }
    if chain.confirmation_poll_ms == 0 {
        errors.push(ValidationError::new("chain.confirmation_poll_ms", "must be greater than 0"));
    }
    if !(chain.gas_price_multiplier >= 1.0) {
        errors.push(ValidationError::new("chain.gas_price_multiplier", "must be at least 1.0"));
    }

    let verification = &config.verification;
    if verification.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "verification.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    if verification.status_poll_secs == 0 {
        errors.push(ValidationError::new(
            "verification.status_poll_secs",
            "must be greater than 0",
        ));
    }
    if verification.already_verified_markers.iter().any(|m| m.trim().is_empty()) {
        errors.push(ValidationError::new(
            "verification.already_verified_markers",
            "markers must not be empty",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_network(name: &str, network: &NetworkConfig, errors: &mut Vec<ValidationError>) {
    if network.chain_id == 0 {
        errors.push(ValidationError::new(
            format!("networks.{}.chain_id", name),
            "must be greater than 0",
        ));
    }
    check_http_url(&format!("networks.{}.rpc_url", name), &network.rpc_url, errors);
    for (i, url) in network.failover_urls.iter().enumerate() {
        check_http_url(&format!("networks.{}.failover_urls[{}]", name, i), url, errors);
    }
    check_http_url(
        &format!("networks.{}.explorer_verify_url", name),
        &network.explorer_verify_url,
        errors,
    );
    if let Some(url) = &network.explorer_browser_url {
        check_http_url(&format!("networks.{}.explorer_browser_url", name), url, errors);
    }
}

fn check_http_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DeployConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DeployConfig::default();
        config.default_network = Some("nowhere".to_string());
        config.chain.confirmation_blocks = 0;
        config.chain.gas_price_multiplier = 0.5;
        config
            .networks
            .get_mut("sophonMainnet")
            .unwrap()
            .rpc_url = "ftp://rpc.example".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(errors.len(), 4);
        assert!(fields.contains(&"default_network"));
        assert!(fields.contains(&"chain.confirmation_blocks"));
        assert!(fields.contains(&"chain.gas_price_multiplier"));
        assert!(fields.contains(&"networks.sophonMainnet.rpc_url"));
    }

    #[test]
    fn test_malformed_explorer_url() {
        let mut config = DeployConfig::default();
        config
            .networks
            .get_mut("sophonMainnet")
            .unwrap()
            .explorer_verify_url = "not a url".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("invalid URL"));
    }

    #[test]
    fn test_empty_constructor_arg() {
        let mut config = DeployConfig::default();
        config.deployment.constructor_args = vec!["  ".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "deployment.constructor_args[0]");
    }
}
