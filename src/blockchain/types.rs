//! Chain-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes, TxHash};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Canonical, non-empty contract address.
///
/// Every address produced by a deployment passes through this type, whether
/// the chain client hands back a raw [`Address`] or a string. Displays as the
/// EIP-55 checksummed form; parsing a displayed value yields the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractAddress(Address);

impl ContractAddress {
    /// Wrap a raw address. The zero address means "no address" and is rejected.
    pub fn new(address: Address) -> BlockchainResult<Self> {
        if address.is_zero() {
            return Err(BlockchainError::MissingContractAddress);
        }
        Ok(Self(address))
    }

    /// Normalize a textual address (any hex casing, optional surrounding
    /// whitespace) into its canonical form.
    pub fn normalize(raw: &str) -> BlockchainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BlockchainError::MissingContractAddress);
        }
        let address = Address::from_str(trimmed)
            .map_err(|e| BlockchainError::InvalidAddress(format!("'{}': {}", trimmed, e)))?;
        Self::new(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }

    /// Checksummed `0x`-prefixed string, 42 characters long.
    pub fn to_canonical(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl FromStr for ContractAddress {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<Address> for ContractAddress {
    type Error = BlockchainError;

    fn try_from(address: Address) -> Result<Self, Self::Error> {
        Self::new(address)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within the configured deadline.
    #[error("Transaction {tx_hash} not confirmed within {timeout_secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, timeout_secs: u64 },

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Signer cannot pay for the deployment.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Bytecode the target VM cannot accept.
    #[error("Invalid bytecode: {0}")]
    InvalidBytecode(String),

    /// Receipt of a successful creation carried no contract address.
    #[error("Deployment produced no contract address")]
    MissingContractAddress,

    #[error("Invalid address {0}")]
    InvalidAddress(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// What a creation transaction carries. The EVM runs `bytecode ++ args`
/// as init code, while zkSync-stack chains take them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationCode {
    pub bytecode: Bytes,
    /// ABI-encoded constructor arguments, empty when there are none.
    pub constructor_args: Bytes,
}

impl CreationCode {
    /// EVM init code: bytecode followed by the encoded arguments.
    pub fn init_code(&self) -> Bytes {
        [self.bytecode.as_ref(), self.constructor_args.as_ref()].concat().into()
    }
}

/// A contract-creation transaction accepted by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedDeployment {
    pub tx_hash: TxHash,
    /// Address derived from sender and nonce before inclusion.
    pub expected_address: Option<Address>,
}

/// What the chain currently knows about a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub block_number: u64,
    /// Blocks on top of and including the transaction's block.
    pub confirmations: u64,
    /// Execution status from the receipt.
    pub succeeded: bool,
    pub contract_address: Option<Address>,
}

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is pending in mempool.
    Pending,
    /// Transaction has been mined but not enough confirmations.
    Confirming { current: u64, required: u64 },
    /// Transaction is confirmed with required block depth.
    Confirmed(ReceiptSummary),
    /// Transaction was mined and reverted.
    Failed(String),
}

impl ConfirmationStatus {
    /// Classify a receipt lookup against the required depth.
    pub fn from_receipt(receipt: Option<ReceiptSummary>, required: u64) -> Self {
        match receipt {
            None => Self::Pending,
            Some(r) if !r.succeeded => {
                Self::Failed(format!("reverted in block {}", r.block_number))
            }
            Some(r) if r.confirmations >= required => Self::Confirmed(r),
            Some(r) => Self::Confirming {
                current: r.confirmations,
                required,
            },
        }
    }
}
