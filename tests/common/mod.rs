//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, B256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use contract_deployer::blockchain::{
    BlockchainError, BlockchainResult, ChainClient, ConfirmationPolicy, CreationCode, ReceiptSummary,
    SubmittedDeployment, Wallet,
};
use contract_deployer::config::DeployConfig;
use contract_deployer::verify::{SourceMetadata, VerifierSettings};
use contract_deployer::{DeploymentPlan, PlanOverrides};

/// Well-known development key (first Anvil/Hardhat account).
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Address the mock chain reports for the created contract.
pub const DEPLOYED: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

pub const ADMIN: &str = "0xb1bef51ebca01eb12001a639bdbbff6eeca12b9f";

/// One request seen by the mock explorer.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Start a programmable mock explorer on an ephemeral port.
///
/// The handler sees every request in full (headers are consumed, the body
/// is read up to `Content-Length`) and returns a status and a body.
pub async fn start_programmable_explorer<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}

/// Ways the mock chain can make a deployment fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFault {
    /// The node refuses the transaction for lack of funds.
    InsufficientFunds,
    /// The node refuses the transaction because the constructor reverts.
    RevertOnSend,
    /// The transaction is mined with a failed status.
    RevertedReceipt,
    /// The receipt reports success but carries no contract address.
    NoContractAddress,
}

/// In-memory chain that mines every creation immediately.
#[derive(Default)]
pub struct MockChain {
    pub chain_id: u64,
    pub chain_id_calls: AtomicUsize,
    pub deploy_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
    /// Receipt lookups that report the transaction as pending first.
    pub pending_polls: usize,
    pub fault: Option<ChainFault>,
    pub last_code: std::sync::Mutex<Option<CreationCode>>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Self::default()
        }
    }

    pub fn failing(chain_id: u64, fault: ChainFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::new(chain_id)
        }
    }

    pub fn total_calls(&self) -> usize {
        self.chain_id_calls.load(Ordering::SeqCst)
            + self.deploy_calls.load(Ordering::SeqCst)
            + self.receipt_calls.load(Ordering::SeqCst)
    }
}

impl ChainClient for MockChain {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.chain_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_id)
    }

    async fn deploy_contract(&self, wallet: &Wallet, code: CreationCode) -> BlockchainResult<SubmittedDeployment> {
        self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            Some(ChainFault::InsufficientFunds) => {
                return Err(BlockchainError::InsufficientFunds("balance 0".to_string()))
            }
            Some(ChainFault::RevertOnSend) => {
                return Err(BlockchainError::Reverted("execution reverted".to_string()))
            }
            _ => {}
        }
        *self.last_code.lock().unwrap() = Some(code);
        Ok(SubmittedDeployment {
            tx_hash: TxHash::from(B256::repeat_byte(0xab)),
            expected_address: Some(wallet.address().create(0)),
        })
    }

    async fn confirmations_for(&self, _tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        let seen = self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        if seen < self.pending_polls {
            return Ok(None);
        }
        Ok(Some(ReceiptSummary {
            block_number: 42,
            confirmations: 1,
            succeeded: self.fault != Some(ChainFault::RevertedReceipt),
            contract_address: match self.fault {
                Some(ChainFault::NoContractAddress) => None,
                _ => Some(DEPLOYED),
            },
        }))
    }
}

/// Hardhat-style artifact with a single `address` constructor argument.
pub fn artifact_json() -> &'static str {
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
            }
        ],
        "bytecode": "0x6080604052348015600f57600080fd5b50",
        "deployedBytecode": "0x"
    }"#
}

/// Write the artifact to a per-test temp file.
pub fn write_artifact(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "contract-deployer-it-{}-{}.json",
        std::process::id(),
        tag
    ));
    std::fs::write(&path, artifact_json()).unwrap();
    path
}

/// Default configuration pointed at a temp artifact, with fast timings.
pub fn test_config(tag: &str) -> DeployConfig {
    let mut config = DeployConfig::default();
    config.deployment.artifact_path = write_artifact(tag);
    config.verification.settle_delay_secs = 0;
    config
}

/// Resolve a plan and shorten every wait so tests finish quickly.
pub fn fast_plan(config: &DeployConfig) -> DeploymentPlan {
    let mut plan = DeploymentPlan::resolve(config, &PlanOverrides::default()).unwrap();
    plan.confirmation = ConfirmationPolicy {
        required: 1,
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
    };
    if let Some(verification) = plan.verification.as_mut() {
        verification.settings.status_poll_interval = Duration::from_millis(20);
        verification.settings.status_timeout = Duration::from_secs(2);
    }
    plan
}

/// Verification settings and metadata of a plan, for building a verifier.
pub fn verification_parts(plan: &DeploymentPlan) -> (VerifierSettings, SourceMetadata) {
    let verification = plan.verification.as_ref().unwrap();
    (verification.settings.clone(), verification.metadata.clone())
}
