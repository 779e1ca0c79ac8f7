//! Deployer wallet.
//!
//! # Security
//! - Private keys come from the environment (see `config::loader`)
//! - Keys are never logged or serialized
//! - `Debug` prints the address only

use std::fmt;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Signing identity for the run. Owns exactly one address.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    /// Target chain, stamped into every creation transaction.
    chain_id: u64,
}

impl Wallet {
    /// Parse a 32-byte hex key. Surrounding whitespace, as left by `.env`
    /// files, and a `0x` prefix are accepted.
    pub fn from_private_key(key: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key = key.trim();
        let signer = key
            .strip_prefix("0x")
            .unwrap_or(key)
            .parse::<PrivateKeySigner>()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(deployer = %signer.address(), chain_id, "Signer loaded");

        Ok(Self { signer, chain_id })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a precomputed digest, such as an EIP-712 signing hash.
    pub fn sign_hash(&self, hash: &B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))
    }

    /// Network wallet used to sign transaction envelopes.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
