//! Composition root shared by every button and card of a page.

use std::sync::Arc;

use accesstime::chain::ChainId;
use accesstime::networks::{chain_name, is_supported_chain};
use accesstime::view::BoxConfig;
use accesstime::wallet::WalletState;
use accesstime_evm::AccessTimeChain;
use accesstime_http::ProjectApiClient;
use alloy_primitives::{Address, U256};
use tokio::sync::watch;

use crate::button::SubscriptionButton;
use crate::card::SubscriptionCard;
use crate::session::Session;

/// Holds the chain client, the project API client and the wallet state, and
/// builds components that share them.
///
/// Wallet changes published with [`Self::set_wallet`] reach every component
/// built by this widget on its next [`SubscriptionButton::sync`].
#[derive(Debug)]
pub struct AccessTimeWidget<C> {
    chain: Arc<C>,
    api: ProjectApiClient,
    wallet_tx: watch::Sender<WalletState>,
}

impl<C: AccessTimeChain> AccessTimeWidget<C> {
    /// A widget over `chain` and `api`, with no wallet connected.
    #[must_use]
    pub fn new(chain: Arc<C>, api: ProjectApiClient) -> Self {
        let (wallet_tx, _) = watch::channel(WalletState::disconnected());
        Self {
            chain,
            api,
            wallet_tx,
        }
    }

    /// Chain served by this widget.
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.chain.chain_id()
    }

    /// Display name of the chain.
    #[must_use]
    pub fn chain_name(&self) -> &'static str {
        chain_name(self.chain_id())
    }

    /// The chain is in the supported table.
    #[must_use]
    pub fn is_supported_chain(&self) -> bool {
        is_supported_chain(self.chain_id())
    }

    /// Shared chain client.
    #[must_use]
    pub fn chain(&self) -> &Arc<C> {
        &self.chain
    }

    /// Shared project API client.
    #[must_use]
    pub const fn api(&self) -> &ProjectApiClient {
        &self.api
    }

    /// Current wallet state.
    #[must_use]
    pub fn wallet(&self) -> WalletState {
        *self.wallet_tx.borrow()
    }

    /// Publishes a wallet change to every component.
    pub fn set_wallet(&self, wallet: WalletState) {
        self.wallet_tx.send_if_modified(|current| {
            if *current == wallet {
                return false;
            }
            *current = wallet;
            true
        });
        tracing::debug!(?wallet, "Wallet updated");
    }

    /// A session for `access_time`.
    #[must_use]
    pub fn session(&self, access_time: Address) -> Session<C> {
        Session::new(Arc::clone(&self.chain), self.api.clone(), access_time)
    }

    /// A button for `access_time` that follows this widget's wallet.
    #[must_use]
    pub fn button(&self, access_time: Address, package_id: Option<U256>) -> SubscriptionButton<C> {
        SubscriptionButton::new(self.session(access_time), package_id)
            .with_wallet_updates(self.wallet_tx.subscribe())
    }

    /// A card for `access_time` that follows this widget's wallet.
    #[must_use]
    pub fn card(
        &self,
        access_time: Address,
        package_id: Option<U256>,
        box_config: BoxConfig,
    ) -> SubscriptionCard<C> {
        SubscriptionCard::new(self.button(access_time, package_id), box_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ACCESS_TIME, TestBed};
    use accesstime::view::ButtonView;

    #[tokio::test]
    async fn test_wallet_propagates_to_components() {
        let bed = TestBed::start(false).await;
        let widget = AccessTimeWidget::new(Arc::clone(&bed.chain), bed.api.clone());
        assert_eq!(widget.chain_name(), "Base Sepolia");
        assert!(widget.is_supported_chain());

        let mut button = widget.button(ACCESS_TIME, None);
        let mut card = widget.card(ACCESS_TIME, None, BoxConfig::ChildComponent);

        button.sync().await.unwrap();
        assert_eq!(button.view(), ButtonView::ConnectWallet);

        widget.set_wallet(bed.wallet());
        assert!(button.wallet_changed().await);
        button.sync().await.unwrap();
        card.sync().await.unwrap();
        assert!(matches!(button.view(), ButtonView::Ready(_)));
        assert!(matches!(card.view().button, ButtonView::Ready(_)));
        assert_eq!(widget.wallet(), bed.wallet());
    }

    #[tokio::test]
    async fn test_components_share_the_api_cache() {
        let bed = TestBed::start(false).await;
        let widget = AccessTimeWidget::new(Arc::clone(&bed.chain), bed.api.clone());
        widget.set_wallet(bed.wallet());

        let mut first = widget.button(ACCESS_TIME, None);
        let mut second = widget.button(ACCESS_TIME, None);
        first.sync().await.unwrap();
        second.sync().await.unwrap();

        let key = (widget.chain_id(), U256::from(7));
        assert!(widget.api().cache().get(&key).await.is_some());
    }
}
