//! Contract creation.
//!
//! # Responsibilities
//! - Refuse to run without a signer key
//! - Check the node serves the configured chain
//! - Broadcast the creation transaction and wait for confirmation
//! - Return the canonical address of the new contract
//!
//! There is no retry here: once broadcast, a creation cannot be taken back,
//! so every failure is reported to the caller as-is.

use crate::blockchain::{
    wait_for_confirmation, BlockchainError, BlockchainResult, ChainClient, ConfirmationPolicy,
    ContractAddress, Wallet,
};
use crate::config::{ConfigError, NetworkConfig};
use crate::deploy::types::{DeploymentRequest, DeploymentResult};
use crate::error::RunError;

/// Derive the signing wallet, without touching the network.
pub fn resolve_signer(signer_key: Option<&str>, chain_id: u64) -> Result<Wallet, ConfigError> {
    let key = signer_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingSignerKey)?;

    Wallet::from_private_key(key, chain_id).map_err(|e| ConfigError::InvalidSignerKey(e.to_string()))
}

/// Deploys one contract to one network.
pub struct Deployer<'a, C> {
    client: &'a C,
    network: &'a NetworkConfig,
    policy: ConfirmationPolicy,
}

impl<'a, C: ChainClient> Deployer<'a, C> {
    pub fn new(client: &'a C, network: &'a NetworkConfig, policy: ConfirmationPolicy) -> Self {
        Self {
            client,
            network,
            policy,
        }
    }

    /// Deploy with a signer derived from `signer_key`.
    ///
    /// A missing or malformed key fails with a configuration error before
    /// any call reaches the chain client.
    pub async fn deploy(
        &self,
        signer_key: Option<&str>,
        request: DeploymentRequest,
    ) -> Result<DeploymentResult, RunError> {
        let wallet = resolve_signer(signer_key, self.network.chain_id)?;
        Ok(self.deploy_with(&wallet, request).await?)
    }

    /// Deploy with an already derived wallet.
    pub async fn deploy_with(
        &self,
        wallet: &Wallet,
        request: DeploymentRequest,
    ) -> BlockchainResult<DeploymentResult> {
        let actual = self.client.chain_id().await?;
        if actual != self.network.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.network.chain_id,
                actual,
            });
        }

        tracing::info!(
            contract = %request.artifact.contract_name,
            deployer = %wallet.address(),
            chain_id = actual,
            "Broadcasting contract creation"
        );
        let submitted = self.client.deploy_contract(wallet, request.creation_code()).await?;
        tracing::info!(tx_hash = %submitted.tx_hash, "Creation transaction sent, awaiting confirmation");

        let receipt = wait_for_confirmation(self.client, submitted.tx_hash, &self.policy).await?;
        let contract_address = receipt
            .contract_address
            .ok_or(BlockchainError::MissingContractAddress)
            .and_then(ContractAddress::new)?;

        if let Some(expected) = submitted.expected_address {
            if expected != contract_address.address() {
                tracing::warn!(
                    expected = %expected,
                    actual = %contract_address,
                    "Receipt address differs from the CREATE-derived address"
                );
            }
        }

        tracing::info!(
            address = %contract_address,
            block = receipt.block_number,
            confirmations = receipt.confirmations,
            "Contract deployed"
        );

        Ok(DeploymentResult {
            contract_address,
            transaction_hash: submitted.tx_hash,
            block_number: receipt.block_number,
        })
    }
}
