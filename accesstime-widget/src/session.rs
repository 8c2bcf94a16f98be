//! Per-contract session: connection status, deployment details, project record.
//!
//! A [`Session`] is bound to one chain and one AccessTime contract. Each
//! [`Session::load`] re-derives the connection status from the wallet and
//! only issues reads the status allows: contract details once the wallet is
//! ready, the project record once the contract is known to be deployed.

use std::sync::Arc;

use accesstime::AccessTimeError;
use accesstime::chain::ChainId;
use accesstime::networks::factory_address;
use accesstime::purchase::{PurchaseContext, PurchaseRequest};
use accesstime::types::{ContractDetails, PendingTransaction, ProjectDetails, TransactionStatus};
use accesstime::wallet::{ConnectionStatus, WalletState};
use accesstime_evm::reader::read_contract_details;
use accesstime_evm::{AccessTimeChain, PurchaseOrchestrator};
use accesstime_http::ProjectApiClient;
use alloy_primitives::{Address, U256};

use crate::error::WidgetError;

/// Loaded state of one AccessTime contract for the current wallet.
#[derive(Debug)]
pub struct Session<C> {
    chain: Arc<C>,
    api: ProjectApiClient,
    orchestrator: PurchaseOrchestrator,
    wallet: WalletState,
    connection: ConnectionStatus,
    details: Option<ContractDetails>,
    details_error: Option<String>,
    project: Option<ProjectDetails>,
    project_error: Option<String>,
}

impl<C: AccessTimeChain> Session<C> {
    /// A session for `access_time` on the chain served by `chain`.
    #[must_use]
    pub fn new(chain: Arc<C>, api: ProjectApiClient, access_time: Address) -> Self {
        let orchestrator = PurchaseOrchestrator::new(chain.chain_id(), access_time);
        Self {
            chain,
            api,
            orchestrator,
            wallet: WalletState::disconnected(),
            connection: ConnectionStatus::default(),
            details: None,
            details_error: None,
            project: None,
            project_error: None,
        }
    }

    /// Chain client.
    #[must_use]
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Requested chain.
    #[must_use]
    pub const fn chain_id(&self) -> ChainId {
        self.orchestrator.chain_id()
    }

    /// AccessTime contract address.
    #[must_use]
    pub const fn access_time(&self) -> Address {
        self.orchestrator.access_time()
    }

    /// Wallet state of the last load.
    #[must_use]
    pub const fn wallet(&self) -> &WalletState {
        &self.wallet
    }

    /// Connection status of the last load.
    #[must_use]
    pub const fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Deployment details, once read.
    #[must_use]
    pub const fn details(&self) -> Option<&ContractDetails> {
        self.details.as_ref()
    }

    /// Project record, once fetched.
    #[must_use]
    pub const fn project(&self) -> Option<&ProjectDetails> {
        self.project.as_ref()
    }

    /// Deployment details are expected but not read yet.
    #[must_use]
    pub const fn is_details_loading(&self) -> bool {
        self.connection.is_ready() && self.details.is_none() && self.details_error.is_none()
    }

    /// The project record is expected but not fetched yet.
    #[must_use]
    pub fn is_project_loading(&self) -> bool {
        self.details.as_ref().is_some_and(|d| d.deployed)
            && self.project.is_none()
            && self.project_error.is_none()
    }

    /// Either read is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_details_loading() || self.is_project_loading()
    }

    /// Message of the failed deployment-details read.
    #[must_use]
    pub fn details_error(&self) -> Option<&str> {
        self.details_error.as_deref()
    }

    /// Message of the failed project fetch.
    #[must_use]
    pub fn project_error(&self) -> Option<&str> {
        self.project_error.as_deref()
    }

    /// A read failed.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.details_error.is_some() || self.project_error.is_some()
    }

    /// Re-derives the connection status for `wallet` and runs the reads it allows.
    ///
    /// # Errors
    ///
    /// Returns the first failed read; the failure is also kept for the view.
    pub async fn load(&mut self, wallet: &WalletState) -> Result<(), WidgetError> {
        self.wallet = *wallet;
        self.connection = ConnectionStatus::derive(self.chain_id(), wallet);
        if !self.connection.is_ready() {
            self.details = None;
            self.details_error = None;
            self.project = None;
            self.project_error = None;
            return Ok(());
        }

        let factory = factory_address(self.chain_id()).ok_or(AccessTimeError::InvalidChain)?;
        match read_contract_details(&*self.chain, factory, self.access_time()).await {
            Ok(details) => {
                self.details = Some(details);
                self.details_error = None;
            }
            Err(e) => {
                tracing::warn!(access_time = %self.access_time(), error = %e, "Contract details read failed");
                self.details = None;
                self.details_error = Some(e.to_string());
                self.project = None;
                self.project_error = None;
                return Err(e.into());
            }
        }
        self.load_project().await
    }

    async fn load_project(&mut self) -> Result<(), WidgetError> {
        let id = self
            .details
            .as_ref()
            .filter(|d| d.deployed)
            .and_then(|d| d.access_time_id);
        let Some(id) = id else {
            self.project = None;
            self.project_error = None;
            return Ok(());
        };
        match self.api.project(self.chain_id(), id).await {
            Ok(project) => {
                self.project = Some(project);
                self.project_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(chain_id = self.chain_id(), %id, error = %e, "Project fetch failed");
                self.project = None;
                self.project_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Drops the cached project record so the next load refetches it.
    pub async fn invalidate(&mut self) {
        if let Some(id) = self.details.as_ref().and_then(|d| d.access_time_id) {
            self.api.invalidate(self.chain_id(), id).await;
        }
        self.project = None;
        self.project_error = None;
    }

    /// Buys `amount` worth of time paid in `payment_token`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Rejected`] with the first failed precondition,
    /// or [`WidgetError::Chain`] if the transaction cannot be sent.
    pub async fn subscribe(
        &self,
        amount: U256,
        payment_token: Address,
    ) -> Result<PendingTransaction, WidgetError> {
        self.submit(PurchaseRequest::Time {
            amount,
            payment_token,
        })
        .await
    }

    /// Buys package `package_id` paying `amount` in `payment_token`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Rejected`] with the first failed precondition,
    /// or [`WidgetError::Chain`] if the transaction cannot be sent.
    pub async fn subscribe_package(
        &self,
        amount: U256,
        payment_token: Address,
        package_id: U256,
    ) -> Result<PendingTransaction, WidgetError> {
        self.submit(PurchaseRequest::Package {
            amount,
            payment_token,
            package_id,
        })
        .await
    }

    /// Submits `request` after checking it against the loaded state.
    ///
    /// # Errors
    ///
    /// See [`Self::subscribe`].
    pub async fn submit(&self, request: PurchaseRequest) -> Result<PendingTransaction, WidgetError> {
        let not_deployed = ContractDetails::not_deployed();
        let context = PurchaseContext {
            connection: self.connection,
            details: self.details.as_ref().unwrap_or(&not_deployed),
            project: self.project.as_ref(),
        };
        let tx = self
            .orchestrator
            .purchase(&*self.chain, &context, &request)
            .await?;
        tracing::info!(hash = %tx.hash, access_time = %self.access_time(), "Subscription submitted");
        Ok(tx)
    }

    /// Waits for a purchase receipt. A confirmed purchase invalidates the
    /// project record.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Chain`] if the receipt cannot be obtained.
    pub async fn wait_for_confirmation(
        &mut self,
        tx: PendingTransaction,
    ) -> Result<PendingTransaction, WidgetError> {
        let tx = PurchaseOrchestrator::wait_for_confirmation(&*self.chain, tx).await?;
        if tx.status == TransactionStatus::Confirmed {
            self.invalidate().await;
        }
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ACCESS_TIME, OWNER, TestBed};
    use accesstime::networks::{BASE_MAINNET, BASE_SEPOLIA};

    #[tokio::test]
    async fn test_not_ready_issues_no_reads() {
        let bed = TestBed::start(false).await;
        let mut session = bed.session();

        session.load(&WalletState::disconnected()).await.unwrap();
        assert!(!session.connection().is_wallet_connected);
        assert!(session.details().is_none());
        assert!(!session.is_loading());

        session
            .load(&WalletState::connected(OWNER, BASE_MAINNET))
            .await
            .unwrap();
        assert!(!session.connection().is_correct_chain_connected);
        assert!(session.details().is_none());
        assert_eq!(bed.chain.reads(), 0);
    }

    #[tokio::test]
    async fn test_load_reads_details_and_project() {
        let bed = TestBed::start(false).await;
        let mut session = bed.session();
        assert!(!session.is_loading());

        session.load(&bed.wallet()).await.unwrap();
        let details = session.details().unwrap();
        assert!(details.deployed);
        assert_eq!(details.package_module, Some(false));
        assert_eq!(session.project().unwrap().payment_methods.len(), 2);
        assert!(!session.is_loading());
        assert!(!session.has_error());
    }

    #[tokio::test]
    async fn test_not_deployed_skips_api() {
        let bed = TestBed::start(false).await;
        let mut session = Session::new(
            Arc::clone(&bed.chain),
            bed.api.clone(),
            Address::repeat_byte(0x99),
        );
        session.load(&bed.wallet()).await.unwrap();
        assert_eq!(session.details(), Some(&ContractDetails::not_deployed()));
        assert!(session.project().is_none());
        assert!(!session.is_project_loading());

        let err = session
            .subscribe(U256::from(1), Address::ZERO)
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(AccessTimeError::ApiUnavailable));
    }

    #[tokio::test]
    async fn test_api_failure_is_kept() {
        let bed = TestBed::start_without_api().await;
        let mut session = bed.session();
        let err = session.load(&bed.wallet()).await.unwrap_err();
        assert!(matches!(err, WidgetError::Api(_)));
        assert!(session.project_error().is_some());
        assert!(session.has_error());
    }

    #[tokio::test]
    async fn test_subscribe_and_confirm() {
        let bed = TestBed::start(false).await;
        let mut session = bed.session();
        session.load(&bed.wallet()).await.unwrap();

        let tx = session
            .subscribe(U256::from(1_000), Address::ZERO)
            .await
            .unwrap();
        let sent = bed.chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, ACCESS_TIME);
        assert_eq!(sent[0].value, U256::from(1_000));

        let tx = session.wait_for_confirmation(tx).await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Confirmed);
        assert!(session.project().is_none());
        assert!(session.is_project_loading());
    }

    #[tokio::test]
    async fn test_subscribe_package_on_time_contract() {
        let bed = TestBed::start(false).await;
        let mut session = bed.session();
        session.load(&bed.wallet()).await.unwrap();
        let err = session
            .subscribe_package(U256::from(1), Address::ZERO, U256::from(1))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(AccessTimeError::PackageModuleInactive));
        assert_eq!(session.chain_id(), BASE_SEPOLIA);
    }
}
