use crate::{
    errors::{BuilderError, LifecycleError},
    signer::SignUserOperation,
};
use ethers::{
    abi::AbiEncode,
    contract::abigen,
    types::{Address, Bytes, U256},
};
use satchel_primitives::{RawTransactionRequest, UserOperation};
use std::sync::Arc;
use tracing::trace;

abigen!(
    SimpleAccountAPI,
    r#"[
        function execute(address dest, uint256 value, bytes func)
    ]"#
);

/// Derives unsigned user operations from raw transaction requests.
///
/// The raw call is wrapped into the account's `execute` calldata; nonce, gas,
/// and fees come from a single estimation call to the signer collaborator
/// (no retries here). The resulting operation carries no paymaster data and
/// no signature.
pub struct UserOperationBuilder<S> {
    signer: Arc<S>,
}

impl<S> UserOperationBuilder<S>
where
    S: SignUserOperation,
{
    pub fn new(signer: Arc<S>) -> Self {
        Self { signer }
    }

    /// Builds the unsigned operation for `sender` from a raw request.
    pub async fn build_unsigned(
        &self,
        sender: Address,
        request: &RawTransactionRequest,
    ) -> Result<UserOperation, LifecycleError> {
        let estimate = self
            .signer
            .estimate_user_operation(sender, request)
            .await
            .map_err(|inner| LifecycleError::SigningFailed { inner })?;
        trace!("Gas estimate for request to {:?}: {estimate:?}", request.to);

        let call_data: Bytes = ExecuteCall {
            dest: request.to,
            value: request.value,
            func: request.data.clone(),
        }
        .encode()
        .into();

        Ok(UserOperation::default()
            .with_sender(sender)
            .with_nonce(estimate.nonce)
            .with_call_data(call_data)
            .with_call_gas_limit(estimate.call_gas_limit)
            .with_verification_gas_limit(estimate.verification_gas_limit)
            .with_pre_verification_gas(estimate.pre_verification_gas)
            .with_max_fee_per_gas(estimate.max_fee_per_gas)
            .with_max_priority_fee_per_gas(estimate.max_priority_fee_per_gas))
    }
}

/// Returns a copy of `uo` carrying `paymaster_and_data`, with the
/// verification gas limit scaled by `gas_multiplier` to cover the
/// paymaster's added verification work.
///
/// Pure rewrite, no validation of the payload bytes themselves (that is the
/// codec's concern). Overflow fails closed instead of wrapping.
pub fn augment_with_paymaster(
    uo: &UserOperation,
    paymaster_and_data: Bytes,
    gas_multiplier: u64,
) -> Result<UserOperation, BuilderError> {
    if gas_multiplier == 0 {
        return Err(BuilderError::InvalidGasMultiplier { multiplier: gas_multiplier });
    }

    let verification_gas_limit = uo
        .verification_gas_limit
        .checked_mul(U256::from(gas_multiplier))
        .ok_or(BuilderError::GasOverflow {
            verification_gas_limit: uo.verification_gas_limit,
            multiplier: gas_multiplier,
        })?;

    Ok(uo
        .clone()
        .with_paymaster_and_data(paymaster_and_data)
        .with_verification_gas_limit(verification_gas_limit))
}
