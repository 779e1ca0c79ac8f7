//! Deployment request and result types.

use alloy::hex;
use alloy::primitives::{Bytes, TxHash};

use crate::blockchain::{ContractAddress, CreationCode};
use crate::deploy::artifact::ContractArtifact;

/// Constructor arguments in declaration order, with their ABI encoding.
///
/// The same value is appended to the creation bytecode and later sent to the
/// explorer, so both sides always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorArgs {
    values: Vec<String>,
    encoded: Bytes,
}

impl ConstructorArgs {
    pub fn new(values: Vec<String>, encoded: Bytes) -> Self {
        Self { values, encoded }
    }

    /// Raw values as configured.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    /// `0x`-prefixed hex of the encoding (`"0x"` when there are no arguments).
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.encoded)
    }
}

/// Everything needed to create the contract. Consumed by one deployment.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub artifact: ContractArtifact,
    pub constructor_args: ConstructorArgs,
}

impl DeploymentRequest {
    /// Bytecode and encoded constructor arguments for the chain client.
    pub fn creation_code(&self) -> CreationCode {
        CreationCode {
            bytecode: self.artifact.bytecode.clone(),
            constructor_args: self.constructor_args.encoded.clone(),
        }
    }
}

/// A confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_address: ContractAddress,
    pub transaction_hash: TxHash,
    pub block_number: u64,
}
