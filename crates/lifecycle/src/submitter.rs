use ethers::{
    providers::{JsonRpcClient, Provider},
    types::{Address, H256},
};
use satchel_primitives::{UserOperation, UserOperationHash};
use tracing::trace;

/// A trait for broadcasting a signed user operation to the network.
#[async_trait::async_trait]
pub trait SubmitUserOperation: Send + Sync + 'static {
    /// Broadcasts the signed operation.
    ///
    /// # Arguments
    /// * `sender` - The smart account the operation belongs to
    /// * `uo` - The signed operation
    ///
    /// # Returns
    /// * `UserOperationHash` - The hash the network identifies the operation by
    async fn submit_user_operation(
        &self,
        sender: Address,
        uo: &UserOperation,
    ) -> eyre::Result<UserOperationHash>;
}

/// Submitter that forwards signed operations to an ERC-4337 bundler endpoint
/// via `eth_sendUserOperation`.
#[derive(Clone, Debug)]
pub struct BundlerClient<C> {
    provider: Provider<C>,
    entry_point: Address,
}

impl<C> BundlerClient<C>
where
    C: JsonRpcClient,
{
    pub fn new(provider: Provider<C>, entry_point: Address) -> Self {
        Self { provider, entry_point }
    }
}

#[async_trait::async_trait]
impl<C> SubmitUserOperation for BundlerClient<C>
where
    C: JsonRpcClient + 'static,
{
    async fn submit_user_operation(
        &self,
        sender: Address,
        uo: &UserOperation,
    ) -> eyre::Result<UserOperationHash> {
        trace!("Forwarding user operation from {sender:?} to the bundler: {uo:?}");

        let hash: H256 = self
            .provider
            .request(
                "eth_sendUserOperation",
                [serde_json::to_value(uo)?, serde_json::to_value(self.entry_point)?],
            )
            .await?;

        Ok(hash.into())
    }
}
