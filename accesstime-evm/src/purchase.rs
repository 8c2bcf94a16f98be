//! Purchase submission against one AccessTime contract.

use accesstime::chain::ChainId;
use accesstime::purchase::{PurchaseContext, PurchaseRequest};
use accesstime::types::{PendingTransaction, TransactionKind};
use alloy_primitives::Address;
use alloy_sol_types::SolCall;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::contract::IAccessTime;
use crate::error::ChainError;
use crate::provider::{AccessTimeChain, ContractCall};

/// Sends `purchase` / `purchasePackage` once the request passes its checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOrchestrator {
    chain_id: ChainId,
    access_time: Address,
}

impl PurchaseOrchestrator {
    /// An orchestrator for `access_time` on `chain_id`.
    #[must_use]
    pub const fn new(chain_id: ChainId, access_time: Address) -> Self {
        Self {
            chain_id,
            access_time,
        }
    }

    /// Target chain.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Target contract.
    #[must_use]
    pub const fn access_time(&self) -> Address {
        self.access_time
    }

    /// Encodes `request` as a call to the AccessTime contract.
    ///
    /// Native currency payments carry the amount as value.
    #[must_use]
    pub fn call(&self, request: &PurchaseRequest) -> ContractCall {
        let calldata = match *request {
            PurchaseRequest::Time {
                amount,
                payment_token,
            } => IAccessTime::purchaseCall {
                amount,
                paymentToken: payment_token,
            }
            .abi_encode(),
            PurchaseRequest::Package {
                amount,
                payment_token,
                package_id,
            } => IAccessTime::purchasePackageCall {
                amount,
                paymentToken: payment_token,
                packageId: package_id,
            }
            .abi_encode(),
        };
        ContractCall {
            to: self.access_time,
            calldata: calldata.into(),
            value: request.value(),
        }
    }

    /// Checks `request` against `context` and sends it.
    ///
    /// # Errors
    ///
    /// - [`ChainError::Rejected`] with the first failed precondition
    /// - [`ChainError`] if the transaction cannot be sent
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "accesstime.purchase", skip(self, chain, context), fields(access_time = %self.access_time), err)
    )]
    pub async fn purchase<C: AccessTimeChain>(
        &self,
        chain: &C,
        context: &PurchaseContext<'_>,
        request: &PurchaseRequest,
    ) -> Result<PendingTransaction, ChainError> {
        context.check(request)?;
        let hash = chain.send_transaction(self.call(request)).await?;

        #[cfg(feature = "telemetry")]
        tracing::info!(%hash, "Purchase submitted");

        Ok(PendingTransaction::submitted(hash, TransactionKind::Purchase))
    }

    /// Waits for the receipt of `tx` and resolves its status.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the receipt cannot be obtained.
    pub async fn wait_for_confirmation<C: AccessTimeChain>(
        chain: &C,
        tx: PendingTransaction,
    ) -> Result<PendingTransaction, ChainError> {
        let success = chain.wait_for_receipt(tx.hash).await?;
        Ok(tx.resolve(success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use accesstime::AccessTimeError;
    use accesstime::networks::BASE_SEPOLIA;
    use accesstime::types::{
        ContractDetails, DeploymentDetails, ProjectDetails, TransactionStatus,
    };
    use accesstime::wallet::{ConnectionStatus, WalletState};
    use alloy_primitives::U256;

    const ACCESS_TIME: Address = Address::repeat_byte(0x11);
    const USDC: Address = Address::repeat_byte(0x22);
    const OWNER: Address = Address::repeat_byte(0xaa);

    fn details(package_module: bool) -> ContractDetails {
        ContractDetails::from(DeploymentDetails {
            status: true,
            id: U256::from(1),
            included_extra_time: package_module,
            ..DeploymentDetails::default()
        })
    }

    fn project() -> ProjectDetails {
        ProjectDetails {
            packages: vec![U256::from(3)],
            payment_methods: vec![Address::ZERO, USDC],
            ..ProjectDetails::default()
        }
    }

    fn connection() -> ConnectionStatus {
        ConnectionStatus::derive(BASE_SEPOLIA, &WalletState::connected(OWNER, BASE_SEPOLIA))
    }

    #[test]
    fn test_native_call_carries_value() {
        let orchestrator = PurchaseOrchestrator::new(BASE_SEPOLIA, ACCESS_TIME);
        let call = orchestrator.call(&PurchaseRequest::Time {
            amount: U256::from(500),
            payment_token: Address::ZERO,
        });
        assert_eq!(call.to, ACCESS_TIME);
        assert_eq!(call.value, U256::from(500));
        let decoded = IAccessTime::purchaseCall::abi_decode(&call.calldata).unwrap();
        assert_eq!(decoded.amount, U256::from(500));
        assert_eq!(decoded.paymentToken, Address::ZERO);
    }

    #[test]
    fn test_package_call() {
        let orchestrator = PurchaseOrchestrator::new(BASE_SEPOLIA, ACCESS_TIME);
        let call = orchestrator.call(&PurchaseRequest::Package {
            amount: U256::from(500),
            payment_token: USDC,
            package_id: U256::from(3),
        });
        assert_eq!(call.value, U256::ZERO);
        let decoded = IAccessTime::purchasePackageCall::abi_decode(&call.calldata).unwrap();
        assert_eq!(decoded.paymentToken, USDC);
        assert_eq!(decoded.packageId, U256::from(3));
    }

    #[tokio::test]
    async fn test_purchase_confirmed() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let orchestrator = PurchaseOrchestrator::new(BASE_SEPOLIA, ACCESS_TIME);
        let details = details(false);
        let project = project();
        let context = PurchaseContext {
            connection: connection(),
            details: &details,
            project: Some(&project),
        };
        let request = PurchaseRequest::Time {
            amount: U256::from(10),
            payment_token: USDC,
        };
        let tx = orchestrator
            .purchase(&chain, &context, &request)
            .await
            .unwrap();
        assert_eq!(tx.kind, TransactionKind::Purchase);
        assert_eq!(chain.sent().len(), 1);

        let tx = PurchaseOrchestrator::wait_for_confirmation(&chain, tx)
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_purchase_reverted() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        chain.set_reverting(true);
        let orchestrator = PurchaseOrchestrator::new(BASE_SEPOLIA, ACCESS_TIME);
        let details = details(true);
        let project = project();
        let context = PurchaseContext {
            connection: connection(),
            details: &details,
            project: Some(&project),
        };
        let request = PurchaseRequest::Package {
            amount: U256::from(10),
            payment_token: Address::ZERO,
            package_id: U256::from(3),
        };
        let tx = orchestrator
            .purchase(&chain, &context, &request)
            .await
            .unwrap();
        let tx = PurchaseOrchestrator::wait_for_confirmation(&chain, tx)
            .await
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Reverted);
    }

    #[tokio::test]
    async fn test_rejected_purchase_sends_nothing() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let orchestrator = PurchaseOrchestrator::new(BASE_SEPOLIA, ACCESS_TIME);
        let details = details(true);
        let project = project();
        let context = PurchaseContext {
            connection: connection(),
            details: &details,
            project: Some(&project),
        };
        let err = orchestrator
            .purchase(
                &chain,
                &context,
                &PurchaseRequest::Time {
                    amount: U256::from(10),
                    payment_token: USDC,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(AccessTimeError::PackageModuleActive));
        assert!(chain.sent().is_empty());
    }
}
