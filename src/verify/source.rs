//! Standard-JSON compiler input used as the verification source.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::ConfigError;

/// Load a standard-JSON input file.
///
/// Accepts the input itself or a Hardhat build-info file, whose `input`
/// field holds it. Either way the result must contain `sources`.
pub fn load_standard_json(path: &Path) -> Result<Value, ConfigError> {
    let error = |reason: String| ConfigError::VerificationSource {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
    let mut value: Value = serde_json::from_str(&content).map_err(|e| error(e.to_string()))?;

    if value.get("sources").is_none() {
        if let Some(input) = value.get_mut("input").map(Value::take) {
            value = input;
        }
    }
    if !value.get("sources").is_some_and(Value::is_object) {
        return Err(error("no `sources` object found".to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("contract-deployer-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_plain_input() {
        let path = write_temp("input.json", r#"{"language":"Solidity","sources":{"A.sol":{"content":""}}}"#);
        let value = load_standard_json(&path).unwrap();
        assert_eq!(value["language"], "Solidity");
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_build_info_input() {
        let path = write_temp(
            "build-info.json",
            r#"{"id":"abc","solcVersion":"0.8.26","input":{"language":"Solidity","sources":{"A.sol":{}}}}"#,
        );
        let value = load_standard_json(&path).unwrap();
        assert!(value["sources"]["A.sol"].is_object());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_rejects_without_sources() {
        let path = write_temp("bad.json", r#"{"language":"Solidity"}"#);
        let err = load_standard_json(&path).unwrap_err();
        assert!(err.to_string().contains("sources"));
        fs::remove_file(path).ok();
    }
}
