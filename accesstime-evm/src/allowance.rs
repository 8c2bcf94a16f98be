//! ERC-20 allowance tracking for the AccessTime contract as spender.

use accesstime::AccessTimeError;
use accesstime::chain::ChainId;
use accesstime::types::{PendingTransaction, TransactionKind};
use accesstime::wallet::WalletState;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::contract::IERC20;
use crate::error::ChainError;
use crate::provider::{AccessTimeChain, ContractCall};

/// Whether an approval must precede the purchase, and by how much the
/// current allowance falls short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApproveRequirement {
    /// An approval is required.
    pub status: bool,
    /// Shortfall in token base units.
    pub amount: U256,
}

/// Tracks the allowance granted by the connected account to one AccessTime
/// contract, for the token and amount currently selected.
///
/// Native currency payments never need an approval and issue no reads.
#[derive(Debug, Clone)]
pub struct AllowanceManager {
    chain_id: ChainId,
    spender: Address,
    token: Address,
    desired: U256,
    allowance: Option<U256>,
    pending: Option<PendingTransaction>,
    loading: bool,
}

impl AllowanceManager {
    /// A manager for approvals to `spender` on `chain_id`.
    #[must_use]
    pub const fn new(chain_id: ChainId, spender: Address) -> Self {
        Self {
            chain_id,
            spender,
            token: Address::ZERO,
            desired: U256::ZERO,
            allowance: None,
            pending: None,
            loading: false,
        }
    }

    /// Selects the token and the amount the next purchase will spend.
    ///
    /// Switching tokens forgets the allowance read for the previous one.
    pub fn update_config(&mut self, token: Address, desired: U256) {
        if token != self.token {
            self.allowance = None;
        }
        self.token = token;
        self.desired = desired;
    }

    /// Selected token.
    #[must_use]
    pub const fn token(&self) -> Address {
        self.token
    }

    /// Amount the next purchase will spend.
    #[must_use]
    pub const fn desired(&self) -> U256 {
        self.desired
    }

    /// Last allowance read, if any.
    #[must_use]
    pub const fn allowance(&self) -> Option<U256> {
        self.allowance
    }

    /// Approval awaiting its receipt.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingTransaction> {
        self.pending
    }

    /// An approval is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-reads the allowance of `owner`. A no-op for the native currency.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the read fails; the previous value is dropped.
    #[cfg_attr(feature = "telemetry", instrument(skip(self, chain), fields(token = %self.token), err))]
    pub async fn refresh<C: AccessTimeChain>(
        &mut self,
        chain: &C,
        owner: Address,
    ) -> Result<(), ChainError> {
        if self.token.is_zero() {
            self.allowance = None;
            return Ok(());
        }
        match chain.allowance(self.token, owner, self.spender).await {
            Ok(allowance) => {
                self.allowance = Some(allowance);
                Ok(())
            }
            Err(e) => {
                self.allowance = None;
                Err(e)
            }
        }
    }

    /// Compares the desired amount against the last allowance read.
    #[must_use]
    pub fn approve_required(&self) -> ApproveRequirement {
        match self.allowance {
            Some(allowance) if !self.desired.is_zero() && self.desired > allowance => {
                ApproveRequirement {
                    status: true,
                    amount: self.desired - allowance,
                }
            }
            _ => ApproveRequirement::default(),
        }
    }

    /// Sends `approve(spender, desired)` from the connected wallet.
    ///
    /// # Errors
    ///
    /// - [`AccessTimeError::InvalidChain`] when the wallet is on another chain
    /// - [`AccessTimeError::ApproveNotRequired`] when the allowance already suffices
    /// - [`ChainError`] if the transaction cannot be sent
    #[cfg_attr(feature = "telemetry", instrument(skip_all, fields(token = %self.token), err))]
    pub async fn approve<C: AccessTimeChain>(
        &mut self,
        chain: &C,
        wallet: &WalletState,
    ) -> Result<PendingTransaction, ChainError> {
        if wallet.chain_id != Some(self.chain_id) {
            return Err(AccessTimeError::InvalidChain.into());
        }
        if !self.approve_required().status {
            return Err(AccessTimeError::ApproveNotRequired.into());
        }
        let calldata = IERC20::approveCall {
            spender: self.spender,
            amount: self.desired,
        }
        .abi_encode();
        self.loading = true;
        let sent = chain
            .send_transaction(ContractCall {
                to: self.token,
                calldata: calldata.into(),
                value: U256::ZERO,
            })
            .await;
        match sent {
            Ok(hash) => {
                let tx = PendingTransaction::submitted(hash, TransactionKind::Approve);
                self.pending = Some(tx);
                Ok(tx)
            }
            Err(e) => {
                self.loading = false;
                Err(e)
            }
        }
    }

    /// Waits for the pending approval, then re-reads the allowance.
    ///
    /// Returns `None` when nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the receipt or the allowance read fails.
    pub async fn wait_for_confirmation<C: AccessTimeChain>(
        &mut self,
        chain: &C,
        owner: Address,
    ) -> Result<Option<PendingTransaction>, ChainError> {
        let Some(tx) = self.pending else {
            return Ok(None);
        };
        let receipt = chain.wait_for_receipt(tx.hash).await;
        self.pending = None;
        self.loading = false;
        let tx = tx.resolve(receipt?);
        self.refresh(chain, owner).await?;
        Ok(Some(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use accesstime::networks::{BASE_MAINNET, BASE_SEPOLIA};
    use accesstime::types::TransactionStatus;

    const ACCESS_TIME: Address = Address::repeat_byte(0x11);
    const USDC: Address = Address::repeat_byte(0x22);
    const OWNER: Address = Address::repeat_byte(0xaa);

    fn wallet() -> WalletState {
        WalletState::connected(OWNER, BASE_SEPOLIA)
    }

    #[tokio::test]
    async fn test_native_never_requires_approval() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let mut manager = AllowanceManager::new(BASE_SEPOLIA, ACCESS_TIME);
        manager.update_config(Address::ZERO, U256::from(100));
        manager.refresh(&chain, OWNER).await.unwrap();
        assert_eq!(manager.allowance(), None);
        assert_eq!(manager.approve_required(), ApproveRequirement::default());
        assert_eq!(chain.reads(), 0);
    }

    #[tokio::test]
    async fn test_shortfall() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        chain.set_allowance(USDC, OWNER, ACCESS_TIME, U256::from(40));
        let mut manager = AllowanceManager::new(BASE_SEPOLIA, ACCESS_TIME);
        manager.update_config(USDC, U256::from(100));
        manager.refresh(&chain, OWNER).await.unwrap();
        assert_eq!(
            manager.approve_required(),
            ApproveRequirement {
                status: true,
                amount: U256::from(60)
            }
        );

        manager.update_config(USDC, U256::from(40));
        assert!(!manager.approve_required().status);

        manager.update_config(USDC, U256::ZERO);
        assert!(!manager.approve_required().status);
    }

    #[tokio::test]
    async fn test_switching_token_forgets_allowance() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let mut manager = AllowanceManager::new(BASE_SEPOLIA, ACCESS_TIME);
        manager.update_config(USDC, U256::from(100));
        manager.refresh(&chain, OWNER).await.unwrap();
        assert_eq!(manager.allowance(), Some(U256::ZERO));
        manager.update_config(Address::repeat_byte(0x23), U256::from(100));
        assert_eq!(manager.allowance(), None);
    }

    #[tokio::test]
    async fn test_approve_then_confirm() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let mut manager = AllowanceManager::new(BASE_SEPOLIA, ACCESS_TIME);
        manager.update_config(USDC, U256::from(100));
        manager.refresh(&chain, OWNER).await.unwrap();

        let tx = manager.approve(&chain, &wallet()).await.unwrap();
        assert_eq!(tx.kind, TransactionKind::Approve);
        assert!(tx.is_pending());
        assert!(manager.is_loading());

        let sent = chain.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, USDC);
        let call = IERC20::approveCall::abi_decode(&sent[0].calldata).unwrap();
        assert_eq!(call.spender, ACCESS_TIME);
        assert_eq!(call.amount, U256::from(100));

        let confirmed = manager
            .wait_for_confirmation(&chain, OWNER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmed.status, TransactionStatus::Confirmed);
        assert!(!manager.is_loading());
        assert_eq!(manager.pending(), None);
        assert_eq!(manager.allowance(), Some(U256::from(100)));
        assert!(!manager.approve_required().status);
    }

    #[tokio::test]
    async fn test_approve_rejections() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let mut manager = AllowanceManager::new(BASE_SEPOLIA, ACCESS_TIME);
        manager.update_config(USDC, U256::from(100));

        let err = manager
            .approve(&chain, &WalletState::connected(OWNER, BASE_MAINNET))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(AccessTimeError::InvalidChain));

        // Allowance not read yet.
        let err = manager.approve(&chain, &wallet()).await.unwrap_err();
        assert_eq!(err.rejection(), Some(AccessTimeError::ApproveNotRequired));
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_wait_without_pending() {
        let chain = MockChain::new(BASE_SEPOLIA, OWNER);
        let mut manager = AllowanceManager::new(BASE_SEPOLIA, ACCESS_TIME);
        assert_eq!(
            manager.wait_for_confirmation(&chain, OWNER).await.unwrap(),
            None
        );
    }
}
