//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (chain id, nonce, gas price, balances, receipts)
//! - Broadcast a signed contract-creation transaction (EVM or zkSync EIP-712)
//! - Handle timeouts and network errors gracefully

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256, U64};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use serde::Deserialize;
use tokio::time::timeout;

use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, CreationCode, ReceiptSummary, SubmittedDeployment,
};
use crate::blockchain::wallet::Wallet;
use crate::blockchain::zksync::{FeeEstimate, FeeRequest};
use crate::config::{ChainConfig, NetworkConfig};

/// Operations the deployer needs from a chain.
///
/// Implemented over JSON-RPC by [`RpcChainClient`]; tests substitute an
/// in-memory chain.
pub trait ChainClient {
    /// Chain ID reported by the connected node.
    fn chain_id(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;

    /// Sign and broadcast a transaction creating `code`.
    fn deploy_contract(
        &self,
        wallet: &Wallet,
        code: CreationCode,
    ) -> impl Future<Output = BlockchainResult<SubmittedDeployment>> + Send;

    /// Receipt state of a transaction, `None` while it is still pending.
    fn confirmations_for(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = BlockchainResult<Option<ReceiptSummary>>> + Send;
}

/// Run a read call against each provider in order, each under the
/// per-call timeout, returning the first success.
macro_rules! with_failover {
    ($client:expr, $what:literal, |$provider:ident| $call:expr) => {{
        let mut outcome = Err(BlockchainError::Rpc(format!("All RPC providers failed to {}", $what)));
        for (i, $provider) in $client.providers.iter().enumerate() {
            match timeout($client.timeout_duration, $call).await {
                Ok(Ok(result)) => {
                    outcome = Ok(result);
                    break;
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, call = $what, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, call = $what, "RPC timeout, trying next provider");
                }
            }
        }
        outcome
    }};
}

/// JSON-RPC chain client with failover support.
#[derive(Clone)]
pub struct RpcChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    network: NetworkConfig,
    chain: ChainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Build providers for the network's endpoints.
    ///
    /// No request is sent here; the first network call happens on first use.
    pub fn connect(network: &NetworkConfig, chain: &ChainConfig) -> BlockchainResult<Self> {
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = network.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", network.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>
        );

        // 2. Add failover providers
        for url_str in &network.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::debug!(
            rpc_url = %network.rpc_url,
            failovers = providers.len() - 1,
            "Chain client created"
        );

        Ok(Self {
            providers,
            network: network.clone(),
            chain: chain.clone(),
            timeout_duration: chain.rpc_timeout(),
        })
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        with_failover!(self, "get chain id", |provider| provider.get_chain_id()).map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        with_failover!(self, "get block number", |provider| provider.get_block_number())
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        with_failover!(self, "get balance", |provider| provider.get_balance(address))
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        with_failover!(self, "get transaction count", |provider| provider
            .get_transaction_count(address))
    }

    /// Get the receipt fields the deployer needs.
    ///
    /// Read through a raw request so that receipts of transaction types the
    /// Ethereum envelope does not know (zkSync `0x71`) still parse.
    pub async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<MinedReceipt>> {
        with_failover!(self, "get receipt", |provider| provider
            .client()
            .request::<_, Option<MinedReceipt>>("eth_getTransactionReceipt", (tx_hash,)))
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        with_failover!(self, "get gas price", |provider| provider.get_gas_price())
    }

    /// Estimate gas for a transaction on the primary provider.
    ///
    /// A constructor that reverts surfaces here, before anything is broadcast.
    pub async fn estimate_gas(&self, tx: TransactionRequest) -> BlockchainResult<u64> {
        match timeout(self.timeout_duration, self.providers[0].estimate_gas(tx)).await {
            Ok(Ok(gas)) => Ok(gas),
            Ok(Err(e)) => Err(classify_send_error(&e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Fee estimate for a zkSync EIP-712 transaction, on the primary provider.
    pub async fn estimate_zksync_fee(&self, request: &FeeRequest) -> BlockchainResult<FeeEstimate> {
        let call = self.providers[0]
            .client()
            .request::<_, FeeEstimate>("zks_estimateFee", (request.clone(),));
        match timeout(self.timeout_duration, call).await {
            Ok(Ok(fee)) => Ok(fee),
            Ok(Err(e)) => Err(classify_send_error(&e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Broadcast a signed transaction once, on the primary provider only.
    async fn send_raw(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        match timeout(self.timeout_duration, self.providers[0].send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(classify_send_error(&e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }

    /// Creation through the zkSync `ContractDeployer`.
    ///
    /// The address depends on the account's deployment nonce, which is not
    /// the transaction nonce, so none is predicted here.
    async fn deploy_zksync(&self, wallet: &Wallet, code: &CreationCode) -> BlockchainResult<SubmittedDeployment> {
        let tx = TxBuilder::new(self, wallet).build_zksync_deployment(code).await?;
        let signature = wallet.sign_hash(&tx.signing_hash())?;
        let tx_hash = self.send_raw(&tx.encode_signed(&signature)).await?;

        Ok(SubmittedDeployment {
            tx_hash,
            expected_address: None,
        })
    }

    /// Get the chain settings.
    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain
    }
}

impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.get_chain_id().await.map(u64::from)
    }

    async fn deploy_contract(&self, wallet: &Wallet, code: CreationCode) -> BlockchainResult<SubmittedDeployment> {
        if self.network.zksync {
            return self.deploy_zksync(wallet, &code).await;
        }

        let prepared = TxBuilder::new(self, wallet).build_deployment(&code).await?;
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(
            prepared.request,
            &wallet.network_wallet(),
        )
        .await
        .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))?;
        let tx_hash = self.send_raw(&envelope.encoded_2718()).await?;

        Ok(SubmittedDeployment {
            tx_hash,
            expected_address: Some(wallet.address().create(prepared.nonce)),
        })
    }

    async fn confirmations_for(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        let Some(receipt) = self.get_transaction_receipt(tx_hash).await? else {
            return Ok(None);
        };

        // Receipts of not yet sealed blocks may lack a block number.
        let Some(tx_block) = receipt.block_number.map(|n| n.to::<u64>()) else {
            return Ok(None);
        };
        let current_block = self.get_block_number().await?;

        Ok(Some(ReceiptSummary {
            block_number: tx_block,
            confirmations: current_block.saturating_sub(tx_block) + 1,
            succeeded: receipt.succeeded(),
            contract_address: receipt.contract_address,
        }))
    }
}

/// Receipt fields common to Ethereum and zkSync nodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinedReceipt {
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl MinedReceipt {
    /// Post-Byzantium status; `0x1` means success.
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|status| status == U64::from(1))
    }
}

/// Map a node error message onto the deployment failure kinds.
fn classify_send_error(message: &str) -> BlockchainError {
    let lower = message.to_lowercase();
    if lower.contains("insufficient funds") {
        BlockchainError::InsufficientFunds(message.to_string())
    } else if lower.contains("revert") {
        BlockchainError::Reverted(message.to_string())
    } else {
        BlockchainError::Rpc(message.to_string())
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.network.rpc_url)
            .field("chain_id", &self.network.chain_id)
            .field("timeout_secs", &self.chain.rpc_timeout_secs)
            .finish()
    }
}
