//! Primitive types of the Satchel wallet engine.
//!
//! This crate contains the account abstraction (ERC-4337) types shared by the
//! session store and the lifecycle coordinator: the user operation itself,
//! the raw transaction request received from an origin, and the paymaster
//! sponsorship payload with its canonical byte codec.

pub mod constants;
mod paymaster;
mod request;
mod user_operation;
mod utils;

pub use paymaster::{PaymasterCodecError, PaymasterPayload, MIN_PAYLOAD_LEN};
pub use request::RawTransactionRequest;
pub use user_operation::{UserOperation, UserOperationGasEstimate, UserOperationHash};
pub use utils::paymaster_address;
