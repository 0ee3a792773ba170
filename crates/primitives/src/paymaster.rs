use ethers::{
    abi::{AbiDecode, AbiEncode},
    prelude::{EthAbiCodec, EthAbiType},
    types::{Address, Bytes, H256, I256},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest well-formed encoding: nine head words (seven fixed components
/// plus two array elements each for nullifiers and commitments share the
/// head, the dynamic `proof` contributes its offset word) followed by the
/// proof length word.
pub const MIN_PAYLOAD_LEN: usize = 10 * 32;

/// Sponsorship payload embedded in a user operation's `paymasterAndData`
/// field, authenticating the paymaster's privacy-preserving accounting.
///
/// Field values are supplied by the sponsoring service; only the byte layout
/// is a contract, shared with the on-chain paymaster verifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, EthAbiCodec, EthAbiType)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterPayload {
    /// Paymaster contract sponsoring the operation
    pub paymaster: Address,

    /// Root of the paymaster's commitment tree
    pub merkle_root: H256,

    /// Nullifiers of the notes being spent
    pub input_nullifiers: [H256; 2],

    /// Commitments of the notes being created
    pub output_commitments: [H256; 2],

    /// Recipient of the external amount
    pub recipient: Address,

    /// Signed external amount; negative when value leaves the pool
    pub ext_amount: I256,

    /// Opaque validity proof checked by the paymaster contract
    pub proof: Bytes,
}

impl PaymasterPayload {
    /// Canonical byte encoding of the payload: the ABI tuple
    /// `(address, bytes32, bytes32[2], bytes32[2], address, int256, bytes)`
    /// with fixed-width fields zero-padded to 32-byte words, array elements
    /// in input order, and the dynamic proof length-prefixed in the tail.
    ///
    /// Equal payloads encode byte-identically.
    pub fn encode(&self) -> Bytes {
        AbiEncode::encode(self.clone()).into()
    }

    /// Decodes `paymasterAndData` bytes back into a payload.
    ///
    /// Empty input is the "no paymaster" sentinel and yields `Ok(None)`.
    pub fn decode(data: &[u8]) -> Result<Option<Self>, PaymasterCodecError> {
        if data.is_empty() {
            return Ok(None);
        }
        if data.len() < MIN_PAYLOAD_LEN {
            return Err(PaymasterCodecError::TruncatedPayload {
                got: data.len(),
                expected: MIN_PAYLOAD_LEN,
            });
        }

        let payload = <Self as AbiDecode>::decode(data)
            .map_err(|err| PaymasterCodecError::MalformedPayload { inner: err.to_string() })?;

        // ABI decoding tolerates trailing bytes and dirty padding; the
        // on-chain verifier reads the canonical bytes, so anything that does
        // not re-encode to the input byte-for-byte is rejected here.
        if payload.clone().encode().as_slice() != data {
            return Err(PaymasterCodecError::MalformedPayload {
                inner: "non-canonical encoding".into(),
            });
        }

        Ok(Some(payload))
    }
}

/// Paymaster codec error
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PaymasterCodecError {
    /// Fewer bytes than the fixed tuple layout requires
    #[error("paymaster data truncated: {got} bytes, layout needs at least {expected}")]
    TruncatedPayload { got: usize, expected: usize },
    /// Field boundaries do not match the fixed layout
    #[error("malformed paymaster data: {inner}")]
    MalformedPayload { inner: String },
}
