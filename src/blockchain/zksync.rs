//! Contract creation on zkSync-stack (EraVM) networks.
//!
//! EraVM does not execute EVM init code. A contract is created by calling the
//! system `ContractDeployer` with the versioned hash of its bytecode, while
//! the bytecode itself travels in the transaction's factory dependencies.
//! Such a transaction is EIP-712 typed (`0x71`) and signed over the
//! `zkSync`/`2` domain.
//!
//! # Steps
//! 1. Hash the bytecode (`hash_bytecode`)
//! 2. Encode `ContractDeployer.create(salt, hash, constructor_args)`
//! 3. Estimate fees with `zks_estimateFee`
//! 4. Sign the EIP-712 digest and RLP-encode the signed envelope

use alloy::primitives::{address, Address, Bytes, Signature, B256, U256};
use alloy::rlp::{Encodable, Header};
use alloy::sol;
use alloy::sol_types::{eip712_domain, SolCall, SolStruct};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::blockchain::types::{BlockchainError, BlockchainResult, CreationCode};

/// System contract that creates contracts on EraVM.
pub const CONTRACT_DEPLOYER: Address = address!("0000000000000000000000000000000000008006");

/// EIP-2718 type byte of zkSync EIP-712 transactions.
pub const EIP712_TX_TYPE: u8 = 0x71;

/// Gas per pubdata byte used when the node does not suggest one.
pub const DEFAULT_GAS_PER_PUBDATA: u64 = 50_000;

sol! {
    function create(bytes32 _salt, bytes32 _bytecodeHash, bytes _input) external payable returns (address);

    struct Transaction {
        uint256 txType;
        uint256 from;
        uint256 to;
        uint256 gasLimit;
        uint256 gasPerPubdataByteLimit;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        uint256 paymaster;
        uint256 nonce;
        uint256 value;
        bytes data;
        bytes32[] factoryDeps;
        bytes paymasterInput;
    }
}

/// Versioned EraVM bytecode hash: version `1`, a zero byte, the length in
/// 32-byte words, then the tail of the SHA-256 digest.
pub fn hash_bytecode(bytecode: &[u8]) -> BlockchainResult<B256> {
    if bytecode.is_empty() || bytecode.len() % 32 != 0 {
        return Err(BlockchainError::InvalidBytecode(format!(
            "EraVM bytecode must be a non-empty multiple of 32 bytes, got {} bytes",
            bytecode.len()
        )));
    }
    let words = bytecode.len() / 32;
    if words % 2 == 0 || words > usize::from(u16::MAX) {
        return Err(BlockchainError::InvalidBytecode(format!(
            "EraVM bytecode must be an odd number of words below 2^16, got {}",
            words
        )));
    }

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha256::digest(bytecode));
    hash[0] = 1;
    hash[1] = 0;
    hash[2..4].copy_from_slice(&(words as u16).to_be_bytes());
    Ok(B256::from(hash))
}

/// `zks_estimateFee` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FeeEstimate {
    pub gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub gas_per_pubdata_limit: U256,
}

/// Call request for `zks_estimateFee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub eip712_meta: Eip712Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Meta {
    pub gas_per_pubdata: U256,
    /// Raw bytecodes, sent as byte arrays.
    pub factory_deps: Vec<Vec<u8>>,
}

/// Unsigned zkSync EIP-712 creation transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Transaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub from: Address,
    pub to: Address,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub gas_per_pubdata: u64,
    pub data: Bytes,
    pub factory_deps: Vec<Bytes>,
    factory_dep_hashes: Vec<B256>,
}

impl Eip712Transaction {
    /// Creation of `code` through the `ContractDeployer`, fees left at zero.
    pub fn deployment(
        chain_id: u64,
        from: Address,
        nonce: u64,
        code: &CreationCode,
    ) -> BlockchainResult<Self> {
        let bytecode_hash = hash_bytecode(&code.bytecode)?;
        let data = createCall {
            _salt: B256::ZERO,
            _bytecodeHash: bytecode_hash,
            _input: code.constructor_args.clone(),
        }
        .abi_encode();

        Ok(Self {
            chain_id,
            nonce,
            from,
            to: CONTRACT_DEPLOYER,
            gas_limit: 0,
            max_fee_per_gas: 0,
            max_priority_fee_per_gas: 0,
            gas_per_pubdata: DEFAULT_GAS_PER_PUBDATA,
            data: data.into(),
            factory_deps: vec![code.bytecode.clone()],
            factory_dep_hashes: vec![bytecode_hash],
        })
    }

    pub fn fee_request(&self) -> FeeRequest {
        FeeRequest {
            from: self.from,
            to: self.to,
            data: self.data.clone(),
            transaction_type: format!("{:#x}", EIP712_TX_TYPE),
            eip712_meta: Eip712Meta {
                gas_per_pubdata: U256::from(self.gas_per_pubdata),
                factory_deps: self.factory_deps.iter().map(|dep| dep.to_vec()).collect(),
            },
        }
    }

    /// Digest the sender signs.
    pub fn signing_hash(&self) -> B256 {
        let domain = eip712_domain! {
            name: "zkSync",
            version: "2",
            chain_id: self.chain_id,
        };
        let typed = Transaction {
            txType: U256::from(EIP712_TX_TYPE),
            from: U256::from_be_slice(self.from.as_slice()),
            to: U256::from_be_slice(self.to.as_slice()),
            gasLimit: U256::from(self.gas_limit),
            gasPerPubdataByteLimit: U256::from(self.gas_per_pubdata),
            maxFeePerGas: U256::from(self.max_fee_per_gas),
            maxPriorityFeePerGas: U256::from(self.max_priority_fee_per_gas),
            paymaster: U256::ZERO,
            nonce: U256::from(self.nonce),
            value: U256::ZERO,
            data: self.data.clone(),
            factoryDeps: self.factory_dep_hashes.clone(),
            paymasterInput: Bytes::new(),
        };
        typed.eip712_signing_hash(&domain)
    }

    /// `0x71 || rlp([...])`, ready for `eth_sendRawTransaction`.
    pub fn encode_signed(&self, signature: &Signature) -> Bytes {
        let y_parity = u8::from(signature.v());
        let r = signature.r();
        let s = signature.s();
        let value = U256::ZERO;
        let custom_signature = Bytes::new();
        let paymaster_params: Vec<Bytes> = Vec::new();

        let fields: [&dyn Encodable; 16] = [
            &self.nonce,
            &self.max_priority_fee_per_gas,
            &self.max_fee_per_gas,
            &self.gas_limit,
            &self.to,
            &value,
            &self.data,
            &y_parity,
            &r,
            &s,
            &self.chain_id,
            &self.from,
            &self.gas_per_pubdata,
            &self.factory_deps,
            &custom_signature,
            &paymaster_params,
        ];

        let payload_length: usize = fields.iter().map(|field| field.length()).sum();
        let header = Header { list: true, payload_length };
        let mut out = Vec::with_capacity(1 + header.length() + payload_length);
        out.push(EIP712_TX_TYPE);
        header.encode(&mut out);
        for field in fields {
            field.encode(&mut out);
        }
        out.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rlp::Decodable;

    use crate::blockchain::Wallet;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn one_word() -> Bytes {
        Bytes::from(vec![0x5au8; 32])
    }

    fn code() -> CreationCode {
        CreationCode {
            bytecode: one_word(),
            constructor_args: Bytes::from(vec![0u8; 32]),
        }
    }

    #[test]
    fn test_hash_bytecode_layout() {
        let hash = hash_bytecode(&vec![0u8; 96]).unwrap();
        assert_eq!(hash[0], 1);
        assert_eq!(hash[1], 0);
        assert_eq!(&hash[2..4], &[0, 3]);

        let digest = Sha256::digest(vec![0u8; 96]);
        assert_eq!(&hash[4..], &digest[4..]);
    }

    #[test]
    fn test_hash_bytecode_rejects_evm_bytecode() {
        for len in [0, 17, 64] {
            assert!(matches!(
                hash_bytecode(&vec![0u8; len]),
                Err(BlockchainError::InvalidBytecode(_))
            ));
        }
    }

    #[test]
    fn test_deployment_calls_contract_deployer() {
        let from = Address::repeat_byte(0x01);
        let tx = Eip712Transaction::deployment(50104, from, 3, &code()).unwrap();

        assert_eq!(tx.to, CONTRACT_DEPLOYER);
        assert_eq!(tx.factory_deps, vec![one_word()]);

        let call = createCall::abi_decode(&tx.data).unwrap();
        assert_eq!(call._salt, B256::ZERO);
        assert_eq!(call._bytecodeHash, hash_bytecode(&one_word()).unwrap());
        assert_eq!(call._input, code().constructor_args);
    }

    #[test]
    fn test_fee_request_shape() {
        let tx = Eip712Transaction::deployment(50104, Address::repeat_byte(0x01), 0, &code()).unwrap();
        let json = serde_json::to_value(tx.fee_request()).unwrap();

        assert_eq!(json["type"], "0x71");
        assert_eq!(json["to"], "0x0000000000000000000000000000000000008006");
        assert_eq!(json["eip712Meta"]["gasPerPubdata"], "0xc350");
        assert_eq!(json["eip712Meta"]["factoryDeps"][0].as_array().unwrap().len(), 32);
        assert_eq!(json["eip712Meta"]["factoryDeps"][0][0], 0x5a);
    }

    #[test]
    fn test_fee_estimate_parsing() {
        let fee: FeeEstimate = serde_json::from_str(
            r#"{
                "gas_limit": "0x1e8480",
                "max_fee_per_gas": "0x2b275d0",
                "max_priority_fee_per_gas": "0x0",
                "gas_per_pubdata_limit": "0xc350"
            }"#,
        )
        .unwrap();
        assert_eq!(fee.gas_limit, U256::from(2_000_000u64));
        assert_eq!(fee.gas_per_pubdata_limit, U256::from(50_000u64));
    }

    #[test]
    fn test_signing_hash_binds_fields() {
        let tx = Eip712Transaction::deployment(50104, Address::repeat_byte(0x01), 0, &code()).unwrap();
        let bumped = Eip712Transaction { nonce: 1, ..tx.clone() };
        let other_chain = Eip712Transaction { chain_id: 324, ..tx.clone() };

        assert_eq!(tx.signing_hash(), tx.clone().signing_hash());
        assert_ne!(tx.signing_hash(), bumped.signing_hash());
        assert_ne!(tx.signing_hash(), other_chain.signing_hash());
    }

    #[test]
    fn test_signed_envelope() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 50104).unwrap();
        let mut tx = Eip712Transaction::deployment(50104, wallet.address(), 7, &code()).unwrap();
        tx.gas_limit = 2_000_000;
        tx.max_fee_per_gas = 45_250_000;

        let hash = tx.signing_hash();
        let signature = wallet.sign_hash(&hash).unwrap();
        assert_eq!(signature.recover_address_from_prehash(&hash).unwrap(), wallet.address());

        let raw = tx.encode_signed(&signature);
        assert_eq!(raw[0], EIP712_TX_TYPE);

        let mut body = &raw[1..];
        let header = Header::decode(&mut body).unwrap();
        assert!(header.list);
        assert_eq!(header.payload_length, body.len());

        assert_eq!(u64::decode(&mut body).unwrap(), 7);
        assert_eq!(u128::decode(&mut body).unwrap(), 0);
        assert_eq!(u128::decode(&mut body).unwrap(), 45_250_000);
        assert_eq!(u64::decode(&mut body).unwrap(), 2_000_000);
        assert_eq!(Address::decode(&mut body).unwrap(), CONTRACT_DEPLOYER);
    }
}
