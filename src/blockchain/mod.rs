//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (private key)
//!     → wallet.rs (key loading, signing identity)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (build, sign, broadcast, confirm)
//!     → zksync.rs (EIP-712 creation for zkSync-stack networks)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - The confirmation wait has a deadline

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;
pub mod zksync;

pub use client::{ChainClient, RpcChainClient};
pub use transaction::{wait_for_confirmation, ConfirmationPolicy};
pub use types::{
    BlockchainError, BlockchainResult, ChainId, ContractAddress, CreationCode, ReceiptSummary,
    SubmittedDeployment,
};
pub use wallet::Wallet;
