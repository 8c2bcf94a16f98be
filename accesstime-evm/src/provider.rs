//! The chain seam used by readers, the allowance manager and the purchase flow.
//!
//! [`AccessTimeChain`] exposes exactly the contract calls the widget needs,
//! so the flow can run against a live RPC node ([`AlloyChain`]) or an
//! in-memory double.

use std::future::Future;
use std::time::Duration;

use accesstime::chain::ChainId;
use accesstime::types::{DeploymentDetails, ExtraTimeTerms, PackageTerms};
use alloy_network::{ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::{PendingTransactionBuilder, Provider};
use alloy_rpc_types_eth::TransactionRequest;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::contract::{IAccessTime, IAccessTimeFactory, IERC20};
use crate::error::ChainError;

/// A state-changing call to submit from the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Target contract address.
    pub to: Address,
    /// Encoded function call data.
    pub calldata: Bytes,
    /// Native currency attached to the call.
    pub value: U256,
}

/// How receipts are awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptConfig {
    /// Number of block confirmations to wait for (default: 1).
    pub confirmations: u64,
    /// Seconds to wait for a receipt (default: 120).
    pub timeout_secs: u64,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout_secs: 120,
        }
    }
}

/// Contract reads and wallet writes on one chain.
pub trait AccessTimeChain: Send + Sync {
    /// The chain this client talks to.
    fn chain_id(&self) -> ChainId;

    /// Factory `deploymentDetails(accessTime)`.
    fn deployment_details(
        &self,
        factory: Address,
        access_time: Address,
    ) -> impl Future<Output = Result<DeploymentDetails, ChainError>> + Send;

    /// `tokenRates(token)`: price of one hour in token base units.
    fn token_rate(
        &self,
        access_time: Address,
        token: Address,
    ) -> impl Future<Output = Result<U256, ChainError>> + Send;

    /// `packages(id)`.
    fn package(
        &self,
        access_time: Address,
        package_id: U256,
    ) -> impl Future<Output = Result<PackageTerms, ChainError>> + Send;

    /// `extras(id)`.
    fn extra_time(
        &self,
        access_time: Address,
        extra_time_id: U256,
    ) -> impl Future<Output = Result<ExtraTimeTerms, ChainError>> + Send;

    /// ERC-20 `allowance(owner, spender)`.
    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<U256, ChainError>> + Send;

    /// ERC-20 `symbol()`.
    fn token_symbol(&self, token: Address)
    -> impl Future<Output = Result<String, ChainError>> + Send;

    /// ERC-20 `decimals()`.
    fn token_decimals(&self, token: Address) -> impl Future<Output = Result<u8, ChainError>> + Send;

    /// Signs and broadcasts `call`, returning its hash without waiting.
    fn send_transaction(
        &self,
        call: ContractCall,
    ) -> impl Future<Output = Result<TxHash, ChainError>> + Send;

    /// Waits for the receipt of `hash`; `true` when the transaction succeeded.
    fn wait_for_receipt(&self, hash: TxHash)
    -> impl Future<Output = Result<bool, ChainError>> + Send;
}

/// [`AccessTimeChain`] backed by an alloy [`Provider`].
///
/// Writes go through the provider's wallet filler, so the provider must be
/// built with the signer of the connected account.
#[derive(Debug, Clone)]
pub struct AlloyChain<P> {
    provider: P,
    chain_id: ChainId,
    receipt: ReceiptConfig,
}

impl<P: Provider> AlloyChain<P> {
    /// Wraps `provider` for `chain_id`.
    pub fn new(provider: P, chain_id: ChainId) -> Self {
        Self {
            provider,
            chain_id,
            receipt: ReceiptConfig::default(),
        }
    }

    /// Overrides how receipts are awaited.
    #[must_use]
    pub const fn with_receipt_config(mut self, receipt: ReceiptConfig) -> Self {
        self.receipt = receipt;
        self
    }

    /// Returns the underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider + Send + Sync> AccessTimeChain for AlloyChain<P> {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "accesstime.chain.deployment_details", skip(self), err)
    )]
    async fn deployment_details(
        &self,
        factory: Address,
        access_time: Address,
    ) -> Result<DeploymentDetails, ChainError> {
        let factory = IAccessTimeFactory::new(factory, &self.provider);
        let raw = factory.deploymentDetails(access_time).call().await?;
        Ok(DeploymentDetails {
            status: raw.status,
            id: raw.id,
            included_extra_time: raw.includedExtraTime,
            included_package_module: raw.includedPackageModule,
            name: raw.name,
            description: raw.description,
            website: raw.website,
        })
    }

    async fn token_rate(&self, access_time: Address, token: Address) -> Result<U256, ChainError> {
        let contract = IAccessTime::new(access_time, &self.provider);
        Ok(contract.tokenRates(token).call().await?)
    }

    async fn package(
        &self,
        access_time: Address,
        package_id: U256,
    ) -> Result<PackageTerms, ChainError> {
        let contract = IAccessTime::new(access_time, &self.provider);
        let raw = contract.packages(package_id).call().await?;
        Ok(PackageTerms {
            time: raw.time,
            available: raw.available,
        })
    }

    async fn extra_time(
        &self,
        access_time: Address,
        extra_time_id: U256,
    ) -> Result<ExtraTimeTerms, ChainError> {
        let contract = IAccessTime::new(access_time, &self.provider);
        let raw = contract.extras(extra_time_id).call().await?;
        Ok(ExtraTimeTerms {
            limit: raw.limit,
            percent: raw.percent,
            available: raw.available,
        })
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        let erc20 = IERC20::new(token, &self.provider);
        Ok(erc20.allowance(owner, spender).call().await?)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        let erc20 = IERC20::new(token, &self.provider);
        Ok(erc20.symbol().call().await?)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        let erc20 = IERC20::new(token, &self.provider);
        Ok(erc20.decimals().call().await?)
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "accesstime.chain.send_transaction",
            skip_all,
            fields(to = %call.to, value = %call.value),
            err
        )
    )]
    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, ChainError> {
        let txr = TransactionRequest::default()
            .with_to(call.to)
            .with_input(call.calldata)
            .with_value(call.value);
        let pending = self.provider.send_transaction(txr).await?;
        Ok(*pending.tx_hash())
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "accesstime.chain.wait_for_receipt", skip(self), err)
    )]
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<bool, ChainError> {
        let timeout = Duration::from_secs(self.receipt.timeout_secs);
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_required_confirmations(self.receipt.confirmations)
            .with_timeout(Some(timeout))
            .get_receipt()
            .await?;
        Ok(receipt.status())
    }
}
