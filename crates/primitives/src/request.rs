use crate::utils::as_checksum;
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Raw transaction request received from an origin (a connected site).
///
/// Immutable once stored in the session; a later request supersedes it, it is
/// never edited in place. The requesting origin is tracked by the session
/// store next to the request, so the same value type works for both single
/// and batched submissions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRequest {
    /// Call target
    #[serde(serialize_with = "as_checksum")]
    pub to: Address,

    /// Native token amount forwarded with the call
    pub value: U256,

    /// Calldata of the inner call
    pub data: Bytes,

    /// Account the origin addressed, when it named one explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
}

impl RawTransactionRequest {
    pub fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self { to, value, data, from: None }
    }
}
