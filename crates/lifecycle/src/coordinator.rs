use crate::{
    builder::{augment_with_paymaster, UserOperationBuilder},
    errors::LifecycleError,
    signer::SignUserOperation,
    submitter::SubmitUserOperation,
};
use ethers::types::Address;
use satchel_primitives::{
    PaymasterPayload, RawTransactionRequest, UserOperation, UserOperationHash,
};
use satchel_session::RequestStore;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// A trait for reporting the request outcome back to the requesting origin.
///
/// The coordinator calls at most one of the two methods, at most once, per
/// pending request.
#[async_trait::async_trait]
pub trait ResolveRequest: Send + Sync + 'static {
    /// Reports the operation hash of a successfully submitted request.
    async fn resolve(&self, origin: &str, hash: UserOperationHash);

    /// Reports a rejection; `reason` is empty for a plain user rejection.
    async fn reject(&self, origin: &str, reason: &str);
}

/// Orchestrates the pending-request lifecycle:
/// `Received -> Built -> [Sponsored] -> Signed -> Submitted -> Resolved`,
/// with `Rejected` reachable from every non-terminal state.
///
/// The coordinator owns the session store and holds typed handles to its
/// collaborators. Nothing here retries: a failed sign or submit leaves the
/// pending request in place for the caller to retry or reject.
pub struct LifecycleCoordinator<S, B, R>
where
    S: SignUserOperation,
    B: SubmitUserOperation,
    R: ResolveRequest,
{
    store: RequestStore,
    builder: UserOperationBuilder<S>,
    signer: Arc<S>,
    submitter: Arc<B>,
    resolver: Arc<R>,
}

impl<S, B, R> LifecycleCoordinator<S, B, R>
where
    S: SignUserOperation,
    B: SubmitUserOperation,
    R: ResolveRequest,
{
    pub fn new(signer: Arc<S>, submitter: Arc<B>, resolver: Arc<R>) -> Self {
        Self {
            store: RequestStore::new(),
            builder: UserOperationBuilder::new(signer.clone()),
            signer,
            submitter,
            resolver,
        }
    }

    /// Read access to the session store for confirmation surfaces.
    pub fn store(&self) -> &RequestStore {
        &self.store
    }

    /// Accepts an inbound transaction request, superseding any pending one.
    pub fn receive_request(&self, origin: &str, request: RawTransactionRequest) {
        if !self.store.is_empty() {
            warn!("Pending request superseded by a new request from {origin}");
        }
        info!("Transaction request received from {origin}");
        self.store.set_request(origin, request);
    }

    /// Accepts a batch of inbound requests from one origin.
    pub fn receive_requests(&self, origin: &str, requests: Vec<RawTransactionRequest>) {
        if !self.store.is_empty() {
            warn!("Pending request superseded by a new batch from {origin}");
        }
        info!("{} transaction requests received from {origin}", requests.len());
        self.store.set_requests(origin, requests);
    }

    /// Records the user-edited request list next to the original for audit.
    pub fn record_modified_requests(
        &self,
        requests: Vec<RawTransactionRequest>,
    ) -> Result<(), LifecycleError> {
        self.store.set_modified_requests(requests)?;
        Ok(())
    }

    /// Builds the unsigned operation for the pending request and stores it.
    pub async fn create_unsigned_user_operation(
        &self,
        sender: Address,
    ) -> Result<UserOperation, LifecycleError> {
        let request = self.store.request().ok_or(LifecycleError::NoActiveRequest)?;

        let uo = self.builder.build_unsigned(sender, &request).await?;
        self.store.set_unsigned_user_operation(uo.clone())?;

        info!("Unsigned user operation created for {sender:?}");
        trace!("Unsigned user operation: {uo:?}");

        Ok(uo)
    }

    /// Rewrites the stored operation with the encoded sponsorship payload,
    /// scaling its verification gas by `gas_multiplier`.
    pub fn sponsor_user_operation(
        &self,
        payload: &PaymasterPayload,
        gas_multiplier: u64,
    ) -> Result<UserOperation, LifecycleError> {
        let uo =
            self.store.unsigned_user_operation().ok_or(LifecycleError::NoActiveRequest)?;

        let sponsored = augment_with_paymaster(&uo, payload.encode(), gas_multiplier)?;
        self.store.set_unsigned_user_operation(sponsored.clone())?;

        info!("User operation sponsored by paymaster {:?}", payload.paymaster);

        Ok(sponsored)
    }

    /// Signs and submits the pending operation, then resolves the origin.
    ///
    /// The slot is cleared *before* the origin is notified, so a concurrent
    /// call can never observe a resolved request as still pending. If the
    /// request was rejected or superseded while the network calls were in
    /// flight, the stale outcome is dropped instead of re-notifying the
    /// origin; the caller still receives the hash of what it submitted.
    pub async fn send(
        &self,
        sender: Address,
        context: &S::Context,
    ) -> Result<UserOperationHash, LifecycleError> {
        let (state, generation) = self.store.snapshot();
        let origin = state.origin.ok_or(LifecycleError::NoActiveRequest)?;
        let uo = state.unsigned_user_operation.ok_or(LifecycleError::NoActiveRequest)?;
        if uo.sender != sender {
            // the pending operation belongs to a different account
            return Err(LifecycleError::NoActiveRequest);
        }

        let signature = self
            .signer
            .sign_user_operation(sender, &uo, context)
            .await
            .map_err(|inner| LifecycleError::SigningFailed { inner })?;
        let signed = uo.with_signature(signature);
        trace!("Signed user operation: {signed:?}");

        let hash = self
            .submitter
            .submit_user_operation(sender, &signed)
            .await
            .map_err(|inner| LifecycleError::SubmissionFailed { inner })?;

        if self.store.clear_if_current(generation) {
            info!("User operation submitted, hash: {hash:?}, origin: {origin}");
            self.resolver.resolve(&origin, hash).await;
        } else {
            warn!(
                "Request from {origin} was rejected or superseded while the send \
                 was in flight, origin not notified, hash: {hash:?}"
            );
        }

        Ok(hash)
    }

    /// Rejects the pending request and notifies the origin.
    ///
    /// Works in every lifecycle state, including before an operation was
    /// built and while a send is in flight; the cleared slot then makes the
    /// in-flight completion drop its own notification.
    pub async fn reject(&self) -> Result<(), LifecycleError> {
        let (state, generation) = self.store.snapshot();
        let origin = state.origin.ok_or(LifecycleError::NoActiveRequest)?;

        if !self.store.clear_if_current(generation) {
            return Err(LifecycleError::NoActiveRequest);
        }

        info!("Transaction request from {origin} rejected");
        self.resolver.reject(&origin, "").await;

        Ok(())
    }
}
