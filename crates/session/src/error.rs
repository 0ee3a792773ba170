use thiserror::Error;

/// Session store error
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The slot holds no pending request
    #[error("no active transaction request in the session")]
    NoActiveRequest,
}
