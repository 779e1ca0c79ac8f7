//! Compiled contract artifacts.
//!
//! Reads Hardhat (`"bytecode": "0x…"`) and Foundry
//! (`"bytecode": { "object": "0x…" }`) JSON artifacts and encodes
//! constructor arguments against the artifact's ABI.

use std::fs;
use std::path::{Path, PathBuf};

use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::deploy::types::ConstructorArgs;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("artifact for {0} has no creation bytecode (abstract contract or interface?)")]
    EmptyBytecode(String),

    #[error("constructor takes {expected} argument(s), {actual} given")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("constructor argument {index} ({name}: {ty}): {reason}")]
    InvalidArgument {
        index: usize,
        name: String,
        ty: String,
        reason: String,
    },
}

#[derive(Deserialize)]
struct RawArtifact {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

/// Creation bytecode plus ABI of one contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Load an artifact from disk. `fallback_name` is used when the file does
    /// not record a contract name (Foundry artifacts).
    pub fn load(path: &Path, fallback_name: &str) -> Result<Self, ArtifactError> {
        let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, fallback_name)
    }

    pub fn from_json(json: &str, fallback_name: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(json)?;
        let contract_name = raw.contract_name.unwrap_or_else(|| fallback_name.to_string());
        let bytecode = match raw.bytecode {
            RawBytecode::Hex(b) | RawBytecode::Object { object: b } => b,
        };
        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(contract_name));
        }

        Ok(Self {
            contract_name,
            abi: raw.abi,
            bytecode,
        })
    }

    /// Coerce string values against the constructor inputs and ABI-encode
    /// them. A contract without a constructor takes no arguments.
    pub fn encode_constructor_args(&self, values: &[String]) -> Result<ConstructorArgs, ArtifactError> {
        let inputs = self
            .abi
            .constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default();

        if inputs.len() != values.len() {
            return Err(ArtifactError::ArgumentCount {
                expected: inputs.len(),
                actual: values.len(),
            });
        }

        let mut tokens = Vec::with_capacity(values.len());
        for (index, (param, raw)) in inputs.iter().zip(values).enumerate() {
            let invalid = |reason: String| ArtifactError::InvalidArgument {
                index,
                name: param.name.clone(),
                ty: param.ty.clone(),
                reason,
            };
            let ty: DynSolType = param.resolve().map_err(|e| invalid(e.to_string()))?;
            let value = ty.coerce_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;
            tokens.push(value);
        }

        let encoded = if tokens.is_empty() {
            Bytes::new()
        } else {
            Bytes::from(DynSolValue::Tuple(tokens).abi_encode_params())
        };

        Ok(ConstructorArgs::new(values.to_vec(), encoded))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::primitives::Address;

    pub(crate) const ADMIN: &str = "0xb1bef51ebca01eb12001a639bdbbff6eeca12b9f";

    pub(crate) fn hardhat_artifact() -> String {
        r#"{
            "_format": "hh-zksolc-artifact-1",
            "contractName": "SablierMerkleFactory",
            "sourceName": "src/SablierMerkleFactory.sol",
            "abi": [
                {
                    "type": "constructor",
                    "stateMutability": "nonpayable",
                    "inputs": [
                        { "name": "initialAdmin", "type": "address", "internalType": "address" }
                    ]
                },
                {
                    "type": "function",
                    "name": "admin",
                    "stateMutability": "view",
                    "inputs": [],
                    "outputs": [{ "name": "", "type": "address", "internalType": "address" }]
                }
            ],
            "bytecode": "0x6080604052348015600f57600080fd5b50"
        }"#
        .to_string()
    }

    #[test]
    fn test_load_hardhat_artifact() {
        let artifact = ContractArtifact::from_json(&hardhat_artifact(), "Fallback").unwrap();
        assert_eq!(artifact.contract_name, "SablierMerkleFactory");
        assert_eq!(artifact.bytecode[0], 0x60);
        assert!(artifact.abi.constructor.is_some());
    }

    #[test]
    fn test_load_foundry_artifact() {
        let json = r#"{
            "abi": [],
            "bytecode": { "object": "0x6001", "sourceMap": "", "linkReferences": {} }
        }"#;
        let artifact = ContractArtifact::from_json(json, "Counter").unwrap();
        assert_eq!(artifact.contract_name, "Counter");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x01]);

        let args = artifact.encode_constructor_args(&[]).unwrap();
        assert!(args.encoded().is_empty());
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let json = r#"{ "contractName": "IFactory", "abi": [], "bytecode": "0x" }"#;
        let result = ContractArtifact::from_json(json, "IFactory");
        assert!(matches!(result, Err(ArtifactError::EmptyBytecode(_))));
    }

    #[test]
    fn test_encode_admin_address() {
        let artifact = ContractArtifact::from_json(&hardhat_artifact(), "x").unwrap();
        let args = artifact.encode_constructor_args(&[ADMIN.to_string()]).unwrap();

        let admin: Address = ADMIN.parse().unwrap();
        assert_eq!(args.encoded().len(), 32);
        assert!(args.encoded()[..12].iter().all(|b| *b == 0));
        assert_eq!(&args.encoded()[12..], admin.as_slice());
        assert_eq!(args.values(), &[ADMIN.to_string()]);
    }

    #[test]
    fn test_argument_count_mismatch() {
        let artifact = ContractArtifact::from_json(&hardhat_artifact(), "x").unwrap();
        let result = artifact.encode_constructor_args(&[]);
        assert!(matches!(
            result,
            Err(ArtifactError::ArgumentCount { expected: 1, actual: 0 })
        ));
    }

    #[test]
    fn test_invalid_argument() {
        let artifact = ContractArtifact::from_json(&hardhat_artifact(), "x").unwrap();
        let err = artifact
            .encode_constructor_args(&["not-an-address".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("initialAdmin"));
    }

    #[test]
    fn test_missing_file() {
        let result = ContractArtifact::load(Path::new("/no/such/artifact.json"), "x");
        assert!(matches!(result, Err(ArtifactError::Io { .. })));
    }
}
