//! Transaction building and confirmation monitoring.
//!
//! # Responsibilities
//! - Build the contract-creation transaction with gas estimation
//! - Build the EIP-712 variant for zkSync-stack networks
//! - Guard against gas price spikes and unfunded signers
//! - Wait for confirmations under an explicit deadline

use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::{ChainClient, RpcChainClient};
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, CreationCode, ReceiptSummary,
};
use crate::blockchain::wallet::Wallet;
use crate::blockchain::zksync::{Eip712Transaction, DEFAULT_GAS_PER_PUBDATA};
use crate::config::ChainConfig;

/// Extra gas on top of the node's estimate, in percent.
const GAS_LIMIT_HEADROOM_PERCENT: u64 = 10;

/// A fully populated, unsigned EVM creation transaction.
#[derive(Debug, Clone)]
pub struct PreparedDeployment {
    pub request: TransactionRequest,
    /// Sender nonce, which also fixes the CREATE address.
    pub nonce: u64,
}

/// Transaction builder for contract creation.
pub struct TxBuilder<'a> {
    client: &'a RpcChainClient,
    wallet: &'a Wallet,
}

impl<'a> TxBuilder<'a> {
    pub fn new(client: &'a RpcChainClient, wallet: &'a Wallet) -> Self {
        Self { client, wallet }
    }

    /// Build an EVM creation transaction with nonce, gas price and gas limit
    /// taken from the chain.
    pub async fn build_deployment(&self, code: &CreationCode) -> BlockchainResult<PreparedDeployment> {
        let from = self.wallet.address();
        let config = self.client.chain_config();

        let nonce = self.client.get_transaction_count(from).await?;
        let gas_price = adjusted_gas_price(self.client.get_gas_price().await?, config)?;

        let request = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(code.init_code())
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.wallet.chain_id());

        let gas_limit = with_headroom(self.client.estimate_gas(request.clone()).await?);
        self.ensure_funded(from, gas_limit, gas_price).await?;

        tracing::debug!(
            nonce = nonce,
            gas_limit = gas_limit,
            gas_price = gas_price,
            "Deployment transaction prepared"
        );

        Ok(PreparedDeployment {
            request: request.with_gas_limit(gas_limit),
            nonce,
        })
    }

    /// Build a zkSync EIP-712 creation with fees from `zks_estimateFee`.
    pub async fn build_zksync_deployment(&self, code: &CreationCode) -> BlockchainResult<Eip712Transaction> {
        let from = self.wallet.address();
        let config = self.client.chain_config();

        let nonce = self.client.get_transaction_count(from).await?;
        let mut tx = Eip712Transaction::deployment(self.wallet.chain_id(), from, nonce, code)?;

        let fee = self.client.estimate_zksync_fee(&tx.fee_request()).await?;
        tx.max_fee_per_gas = adjusted_gas_price(fee.max_fee_per_gas.saturating_to(), config)?;
        tx.max_priority_fee_per_gas = fee
            .max_priority_fee_per_gas
            .saturating_to::<u128>()
            .min(tx.max_fee_per_gas);
        tx.gas_limit = with_headroom(fee.gas_limit.saturating_to());
        tx.gas_per_pubdata = match fee.gas_per_pubdata_limit.saturating_to::<u64>() {
            0 => DEFAULT_GAS_PER_PUBDATA,
            limit => limit,
        };

        self.ensure_funded(from, tx.gas_limit, tx.max_fee_per_gas).await?;

        tracing::debug!(
            nonce = nonce,
            gas_limit = tx.gas_limit,
            max_fee_per_gas = tx.max_fee_per_gas,
            gas_per_pubdata = tx.gas_per_pubdata,
            "zkSync deployment transaction prepared"
        );

        Ok(tx)
    }

    async fn ensure_funded(&self, from: Address, gas_limit: u64, gas_price: u128) -> BlockchainResult<()> {
        let cost = U256::from(gas_limit) * U256::from(gas_price);
        let balance = self.client.get_balance(from).await?;
        if balance < cost {
            return Err(BlockchainError::InsufficientFunds(format!(
                "{} holds {} wei, deployment needs up to {} wei",
                from, balance, cost
            )));
        }
        Ok(())
    }
}

fn with_headroom(estimate: u64) -> u64 {
    estimate.saturating_add(estimate * GAS_LIMIT_HEADROOM_PERCENT / 100)
}

/// Apply the configured multiplier, rejecting a result above the cap.
pub fn adjusted_gas_price(gas_price: u128, config: &ChainConfig) -> BlockchainResult<u128> {
    let adjusted = (gas_price as f64 * config.gas_price_multiplier) as u128;
    let adjusted_gwei = adjusted / 1_000_000_000;
    if adjusted_gwei > u128::from(config.max_gas_price_gwei) {
        return Err(BlockchainError::GasPriceTooHigh {
            current_gwei: u64::try_from(adjusted_gwei).unwrap_or(u64::MAX),
            max_gwei: config.max_gas_price_gwei,
        });
    }
    Ok(adjusted)
}

/// How long and how deep to wait for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Required confirmations, inclusion counts as one.
    pub required: u64,
    /// Deadline for the whole wait.
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&ChainConfig> for ConfirmationPolicy {
    fn from(config: &ChainConfig) -> Self {
        Self {
            required: u64::from(config.confirmation_blocks.max(1)),
            timeout: Duration::from_secs(config.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.confirmation_poll_ms),
        }
    }
}

/// Wait for a transaction to be confirmed.
///
/// Polls at a fixed interval. RPC errors while polling are logged and the
/// wait continues; the deadline bounds the whole loop.
pub async fn wait_for_confirmation<C: ChainClient>(
    client: &C,
    tx_hash: TxHash,
    policy: &ConfirmationPolicy,
) -> BlockchainResult<ReceiptSummary> {
    let result = timeout(policy.timeout, async {
        let mut ticker = interval(policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let receipt = match client.confirmations_for(tx_hash).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                    continue;
                }
            };

            match ConfirmationStatus::from_receipt(receipt, policy.required) {
                ConfirmationStatus::Pending => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                ConfirmationStatus::Confirming { current, required } => {
                    tracing::debug!(
                        tx_hash = %tx_hash,
                        confirmations = current,
                        required = required,
                        "Waiting for confirmations"
                    );
                }
                ConfirmationStatus::Confirmed(summary) => return Ok(summary),
                ConfirmationStatus::Failed(reason) => {
                    return Err(BlockchainError::Reverted(format!("{}: {}", tx_hash, reason)));
                }
            }
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => Err(BlockchainError::ConfirmationTimeout {
            tx_hash,
            timeout_secs: policy.timeout.as_secs(),
        }),
    }
}
