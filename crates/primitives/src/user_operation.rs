use crate::utils::{as_checksum, paymaster_address};
use ethers::{
    abi::AbiEncode,
    prelude::{EthAbiCodec, EthAbiType},
    types::{Address, Bytes, H256, U256},
    utils::keccak256,
};
use rustc_hex::FromHexError;
use serde::{Deserialize, Serialize};
use std::{ops::Deref, str::FromStr};

/// Account abstraction (ERC-4337 v0.6) transaction descriptor.
///
/// The operation is built unsigned (`signature` empty) from a
/// [RawTransactionRequest](crate::RawTransactionRequest), optionally gains a
/// sponsorship payload in `paymaster_and_data`, and is only considered signed
/// once the signer collaborator has filled in `signature`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, EthAbiCodec, EthAbiType)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// The smart-contract account sending the operation
    #[serde(serialize_with = "as_checksum")]
    pub sender: Address,

    /// Anti-replay nonce, managed by the entry point
    pub nonce: U256,

    /// Factory call that deploys the account when it does not exist yet
    pub init_code: Bytes,

    /// Calldata executed by the account during the main call
    pub call_data: Bytes,

    /// Gas allocated for the main execution call
    pub call_gas_limit: U256,

    /// Gas allocated for the verification step (covers the paymaster's
    /// verification too when the operation is sponsored)
    pub verification_gas_limit: U256,

    /// Gas compensating the bundler for pre-verification work and calldata
    pub pre_verification_gas: U256,

    /// Maximum fee per gas (EIP-1559 style)
    pub max_fee_per_gas: U256,

    /// Maximum priority fee per gas (EIP-1559 style)
    pub max_priority_fee_per_gas: U256,

    /// Paymaster address followed by the sponsorship payload; empty when the
    /// operation is not sponsored
    pub paymaster_and_data: Bytes,

    /// Account signature over [hash](UserOperation::hash); empty until signed
    pub signature: Bytes,
}

impl UserOperation {
    /// Calculates the v0.6 signing digest of the user operation, tied to the
    /// entry point address and chain id
    pub fn hash(&self, entry_point: &Address, chain_id: &U256) -> UserOperationHash {
        H256::from_slice(
            keccak256(
                [
                    keccak256(UserOperationDigest::from(self).encode()).to_vec(),
                    entry_point.encode(),
                    chain_id.encode(),
                ]
                .concat(),
            )
            .as_slice(),
        )
        .into()
    }

    /// Paymaster sponsoring the operation, parsed from the leading word of
    /// `paymaster_and_data`
    pub fn paymaster(&self) -> Option<Address> {
        paymaster_address(self.paymaster_and_data.deref())
    }

    /// Whether a paymaster payload is attached
    pub fn is_sponsored(&self) -> bool {
        !self.paymaster_and_data.is_empty()
    }

    /// Whether the signer has produced a signature yet
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    // Builder-style helpers

    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_init_code(mut self, init_code: Bytes) -> Self {
        self.init_code = init_code;
        self
    }

    pub fn with_call_data(mut self, call_data: Bytes) -> Self {
        self.call_data = call_data;
        self
    }

    pub fn with_call_gas_limit(mut self, call_gas_limit: U256) -> Self {
        self.call_gas_limit = call_gas_limit;
        self
    }

    pub fn with_verification_gas_limit(mut self, verification_gas_limit: U256) -> Self {
        self.verification_gas_limit = verification_gas_limit;
        self
    }

    pub fn with_pre_verification_gas(mut self, pre_verification_gas: U256) -> Self {
        self.pre_verification_gas = pre_verification_gas;
        self
    }

    pub fn with_max_fee_per_gas(mut self, max_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = max_fee_per_gas;
        self
    }

    pub fn with_max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: U256) -> Self {
        self.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    pub fn with_paymaster_and_data(mut self, paymaster_and_data: Bytes) -> Self {
        self.paymaster_and_data = paymaster_and_data;
        self
    }

    pub fn with_signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }
}

/// ABI view of the operation with dynamic fields pre-hashed; this is what the
/// entry point hashes when checking the account signature
#[derive(EthAbiCodec, EthAbiType)]
struct UserOperationDigest {
    sender: Address,
    nonce: U256,
    init_code: H256,
    call_data: H256,
    call_gas_limit: U256,
    verification_gas_limit: U256,
    pre_verification_gas: U256,
    max_fee_per_gas: U256,
    max_priority_fee_per_gas: U256,
    paymaster_and_data: H256,
}

impl From<&UserOperation> for UserOperationDigest {
    fn from(uo: &UserOperation) -> Self {
        Self {
            sender: uo.sender,
            nonce: uo.nonce,
            init_code: keccak256(uo.init_code.deref()).into(),
            call_data: keccak256(uo.call_data.deref()).into(),
            call_gas_limit: uo.call_gas_limit,
            verification_gas_limit: uo.verification_gas_limit,
            pre_verification_gas: uo.pre_verification_gas,
            max_fee_per_gas: uo.max_fee_per_gas,
            max_priority_fee_per_gas: uo.max_priority_fee_per_gas,
            paymaster_and_data: keccak256(uo.paymaster_and_data.deref()).into(),
        }
    }
}

/// User operation hash returned by the submitter and reported to the origin
#[derive(
    Eq, Hash, PartialEq, Debug, Serialize, Deserialize, Clone, Copy, Default, PartialOrd, Ord,
)]
pub struct UserOperationHash(pub H256);

impl From<H256> for UserOperationHash {
    fn from(value: H256) -> Self {
        Self(value)
    }
}

impl From<UserOperationHash> for H256 {
    fn from(value: UserOperationHash) -> Self {
        value.0
    }
}

impl From<[u8; 32]> for UserOperationHash {
    fn from(value: [u8; 32]) -> Self {
        Self(H256::from_slice(&value))
    }
}

impl FromStr for UserOperationHash {
    type Err = FromHexError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        H256::from_str(s).map(|h| h.into())
    }
}

impl UserOperationHash {
    #[inline]
    pub const fn as_fixed_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    #[inline]
    pub const fn zero() -> UserOperationHash {
        UserOperationHash(H256([0; 32]))
    }
}

/// Nonce, gas, and fee values the signer collaborator estimates for a raw
/// transaction request; the builder copies them into the unsigned operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationGasEstimate {
    pub nonce: U256,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}
