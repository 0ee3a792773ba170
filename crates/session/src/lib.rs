//! Single-slot store for the wallet session's pending transaction request.
//!
//! A wallet session has at most one request in flight: a new inbound request
//! fully replaces the previous one (last-writer-wins, no queue), and the slot
//! is cleared exactly once when the request resolves or is rejected.

mod error;
mod store;

pub use error::StoreError;
pub use store::{PendingRequestState, RequestStore};
