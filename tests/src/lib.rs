//! Shared mock collaborators for the Satchel integration tests.
//!
//! The mocks record every call so tests can assert the exactly-once
//! resolution guarantees of the lifecycle coordinator.

use ethers::types::{Address, Bytes, H256};
use parking_lot::Mutex;
use satchel_lifecycle::{ResolveRequest, SignUserOperation, SignerError, SubmitUserOperation};
use satchel_primitives::{
    RawTransactionRequest, UserOperation, UserOperationGasEstimate, UserOperationHash,
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

/// Hash every mock submission reports back.
pub const MOCK_OPERATION_HASH: H256 = H256::repeat_byte(0x42);

/// Signer with a fixed gas estimate and a canned signature.
///
/// `Context = String` so the tests also cover the opaque signing-token
/// plumbing through the coordinator.
#[derive(Default)]
pub struct MockSigner {
    /// When set, `sign_user_operation` fails with `SigningDeclined`
    pub decline: AtomicBool,
    /// Artificial signing latency, used to race `reject` against `send`
    pub delay: Mutex<Option<Duration>>,
    /// Signing tokens the coordinator forwarded
    pub contexts: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl SignUserOperation for MockSigner {
    type Context = String;

    async fn estimate_user_operation(
        &self,
        _sender: Address,
        _request: &RawTransactionRequest,
    ) -> Result<UserOperationGasEstimate, SignerError> {
        Ok(UserOperationGasEstimate {
            nonce: 0.into(),
            call_gas_limit: 33_100.into(),
            verification_gas_limit: 1_000_000.into(),
            pre_verification_gas: 21_000.into(),
            max_fee_per_gas: 3_000_000_000_u64.into(),
            max_priority_fee_per_gas: 1_000_000_000.into(),
        })
    }

    async fn sign_user_operation(
        &self,
        _sender: Address,
        _uo: &UserOperation,
        context: &Self::Context,
    ) -> Result<Bytes, SignerError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.decline.load(Ordering::SeqCst) {
            return Err(SignerError::SigningDeclined);
        }
        self.contexts.lock().push(context.clone());
        Ok(vec![0x01; 65].into())
    }
}

/// Submitter recording every broadcast operation.
#[derive(Default)]
pub struct MockSubmitter {
    /// When set, `submit_user_operation` fails
    pub fail: AtomicBool,
    /// Operations that reached the network
    pub submitted: Mutex<Vec<UserOperation>>,
}

#[async_trait::async_trait]
impl SubmitUserOperation for MockSubmitter {
    async fn submit_user_operation(
        &self,
        _sender: Address,
        uo: &UserOperation,
    ) -> eyre::Result<UserOperationHash> {
        if self.fail.load(Ordering::SeqCst) {
            eyre::bail!("bundler unavailable");
        }
        self.submitted.lock().push(uo.clone());
        Ok(MOCK_OPERATION_HASH.into())
    }
}

/// Origin resolver recording every outcome notification.
#[derive(Default)]
pub struct MockResolver {
    pub resolutions: Mutex<Vec<(String, UserOperationHash)>>,
    pub rejections: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl ResolveRequest for MockResolver {
    async fn resolve(&self, origin: &str, hash: UserOperationHash) {
        self.resolutions.lock().push((origin.into(), hash));
    }

    async fn reject(&self, origin: &str, reason: &str) {
        self.rejections.lock().push((origin.into(), reason.into()));
    }
}
