use crate::signer::SignerError;
use ethers::types::U256;
use satchel_session::StoreError;
use thiserror::Error;

/// Error when assembling or augmenting an unsigned user operation
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    /// Verification gas multiplier must be positive
    #[error("invalid verification gas multiplier: {multiplier}")]
    InvalidGasMultiplier { multiplier: u64 },
    /// Scaling the verification gas limit overflowed
    #[error("verification gas limit overflow: {verification_gas_limit} * {multiplier}")]
    GasOverflow { verification_gas_limit: U256, multiplier: u64 },
}

/// Lifecycle error
///
/// None of these are fatal: build and sponsorship errors leave the pending
/// request untouched, signing and submission errors keep it in place so the
/// caller may retry the send or fall back to rejection.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No pending request (or derived operation) to act on
    #[error("no active transaction request in the session")]
    NoActiveRequest,
    /// The signer collaborator declined or failed
    #[error("signing failed: {inner}")]
    SigningFailed {
        #[source]
        inner: SignerError,
    },
    /// The submitter collaborator failed to broadcast the operation
    #[error("submission failed: {inner}")]
    SubmissionFailed { inner: eyre::Report },
    /// Operation assembly failed
    #[error(transparent)]
    Builder(#[from] BuilderError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoActiveRequest => LifecycleError::NoActiveRequest,
        }
    }
}
