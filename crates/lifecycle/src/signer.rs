use alloy_chains::Chain;
use ethers::{
    contract::abigen,
    providers::Middleware,
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, TransactionRequest, U256},
};
use satchel_primitives::{
    constants::gas::{DEFAULT_PRE_VERIFICATION_GAS, DEFAULT_VERIFICATION_GAS_LIMIT},
    RawTransactionRequest, UserOperation, UserOperationGasEstimate,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Signer collaborator error
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The user (or a signing policy) declined to sign
    #[error("signing declined")]
    SigningDeclined,
    /// The signing backend failed
    #[error("signer error: {inner}")]
    SigningError { inner: String },
}

/// A trait for the external signing service of the wallet.
///
/// The signer owns everything account-specific: nonce and gas estimation for
/// a raw request, and the production of the operation signature. The
/// coordinator calls each method once per attempt and never retries.
#[async_trait::async_trait]
pub trait SignUserOperation: Send + Sync + 'static {
    /// Opaque signing token the wallet host threads through to the signer;
    /// the coordinator stores and forwards it without inspecting it.
    type Context: Send + Sync;

    /// Estimates nonce, gas limits, and fees for a raw transaction request.
    ///
    /// # Arguments
    /// * `sender` - The active smart account
    /// * `request` - The raw request the estimate is for
    ///
    /// # Returns
    /// * `UserOperationGasEstimate` - Values the builder copies into the
    ///   unsigned operation
    async fn estimate_user_operation(
        &self,
        sender: Address,
        request: &RawTransactionRequest,
    ) -> Result<UserOperationGasEstimate, SignerError>;

    /// Signs the operation on behalf of `sender`.
    ///
    /// # Arguments
    /// * `sender` - The active smart account
    /// * `uo` - The unsigned operation
    /// * `context` - The opaque signing token
    ///
    /// # Returns
    /// * `Bytes` - The signature to place into the operation
    async fn sign_user_operation(
        &self,
        sender: Address,
        uo: &UserOperation,
        context: &Self::Context,
    ) -> Result<Bytes, SignerError>;
}

abigen!(
    EntryPointAPI,
    r#"[
        function getNonce(address sender, uint192 key) view returns (uint256 nonce)
    ]"#
);

/// In-process signer over a local key.
///
/// Signs the ERC-4337 v0.6 digest with an owner key and estimates against an
/// execution client: entry-point nonce, EIP-1559 fees, and the gas of the
/// inner call. Verification and pre-verification gas use the crate defaults.
#[derive(Clone, Debug)]
pub struct LocalSigner<M> {
    /// Owner key of the smart account
    signer: LocalWallet,
    /// Entry point contract address
    entry_point: Address,
    /// Chain the wallet session is on
    chain: Chain,
    /// Ethereum execution client
    eth_client: Arc<M>,
}

impl<M> LocalSigner<M>
where
    M: Middleware + 'static,
{
    pub fn new(signer: LocalWallet, entry_point: Address, chain: Chain, eth_client: Arc<M>) -> Self {
        Self { signer, entry_point, chain, eth_client }
    }
}

#[async_trait::async_trait]
impl<M> SignUserOperation for LocalSigner<M>
where
    M: Middleware + 'static,
{
    type Context = ();

    async fn estimate_user_operation(
        &self,
        sender: Address,
        request: &RawTransactionRequest,
    ) -> Result<UserOperationGasEstimate, SignerError> {
        let ep = EntryPointAPI::new(self.entry_point, self.eth_client.clone());
        let nonce = ep
            .get_nonce(sender, U256::zero())
            .call()
            .await
            .map_err(|err| SignerError::SigningError { inner: err.to_string() })?;

        let (max_fee_per_gas, max_priority_fee_per_gas) = self
            .eth_client
            .estimate_eip1559_fees(None)
            .await
            .map_err(|err| SignerError::SigningError { inner: err.to_string() })?;

        let call = TransactionRequest::new()
            .from(sender)
            .to(request.to)
            .value(request.value)
            .data(request.data.clone());
        let call_gas_limit = self
            .eth_client
            .estimate_gas(&call.into(), None)
            .await
            .map_err(|err| SignerError::SigningError { inner: err.to_string() })?;

        Ok(UserOperationGasEstimate {
            nonce,
            call_gas_limit,
            verification_gas_limit: DEFAULT_VERIFICATION_GAS_LIMIT.into(),
            pre_verification_gas: DEFAULT_PRE_VERIFICATION_GAS.into(),
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    async fn sign_user_operation(
        &self,
        sender: Address,
        uo: &UserOperation,
        _context: &Self::Context,
    ) -> Result<Bytes, SignerError> {
        let hash = uo.hash(&self.entry_point, &U256::from(self.chain.id()));
        trace!("Signing user operation from {sender:?}, digest: {hash:?}");

        let signature = self
            .signer
            .sign_message(hash.as_fixed_bytes())
            .await
            .map_err(|err| SignerError::SigningError { inner: err.to_string() })?;
        Ok(signature.to_vec().into())
    }
}
