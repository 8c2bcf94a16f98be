//! The subscription card: badges and a box above an embedded button.

use accesstime::networks::chain_name;
use accesstime::view::{BoxConfig, CardView, extra_time_badge, package_badge};
use accesstime::wallet::WalletState;
use accesstime_evm::AccessTimeChain;

use crate::button::{ClickOutcome, SubscriptionButton};
use crate::error::WidgetError;

/// Card wrapping a [`SubscriptionButton`].
#[derive(Debug)]
pub struct SubscriptionCard<C> {
    button: SubscriptionButton<C>,
    box_config: BoxConfig,
}

impl<C: AccessTimeChain> SubscriptionCard<C> {
    /// A card around `button` with `box_config` in its top area.
    #[must_use]
    pub const fn new(button: SubscriptionButton<C>, box_config: BoxConfig) -> Self {
        Self { button, box_config }
    }

    /// The embedded button.
    #[must_use]
    pub const fn button(&self) -> &SubscriptionButton<C> {
        &self.button
    }

    /// The embedded button, for selection changes.
    pub const fn button_mut(&mut self) -> &mut SubscriptionButton<C> {
        &mut self.button
    }

    /// Top area content.
    #[must_use]
    pub const fn box_config(&self) -> &BoxConfig {
        &self.box_config
    }

    /// Runs the button's read pipeline.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionButton::refresh`].
    pub async fn refresh(&mut self, wallet: &WalletState) -> Result<(), WidgetError> {
        self.button.refresh(wallet).await
    }

    /// Runs the button's read pipeline for the latest published wallet.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionButton::refresh`].
    pub async fn sync(&mut self) -> Result<(), WidgetError> {
        self.button.sync().await
    }

    /// Clicks the embedded button.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionButton::click`].
    pub async fn click(&mut self) -> Result<ClickOutcome, WidgetError> {
        self.button.click().await
    }

    /// Derives what the host should draw.
    #[must_use]
    pub fn view(&self) -> CardView {
        CardView {
            package_badge: package_badge(self.button.is_package_loading(), self.button.package()),
            extra_time_badge: extra_time_badge(
                self.button.is_extra_time_loading(),
                self.button.extra_time(),
            ),
            chain_badge: chain_name(self.button.session().chain_id()).to_owned(),
            box_config: self.box_config.clone(),
            button: self.button.view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PACKAGE_ID, TestBed};
    use accesstime::view::{Badge, ButtonView};
    use alloy_primitives::U256;

    #[tokio::test]
    async fn test_time_card_badges() {
        let bed = TestBed::start(false).await;
        let mut card = SubscriptionCard::new(
            SubscriptionButton::new(bed.session(), None),
            BoxConfig::Icon("clock".into()),
        );
        card.refresh(&bed.wallet()).await.unwrap();

        let view = card.view();
        assert_eq!(view.chain_badge, "Base Sepolia");
        assert_eq!(view.package_badge, None);
        // One hour is below every extra-time limit.
        assert_eq!(view.extra_time_badge, None);
        assert_eq!(view.box_config, BoxConfig::Icon("clock".into()));

        card.button_mut().select_fixed_time(604_800).unwrap();
        let view = card.view();
        assert_eq!(
            view.extra_time_badge,
            Some(Badge::Text("ExtraTime: 1 day, 9 hours, and 36 minutes".into()))
        );
    }

    #[tokio::test]
    async fn test_package_card_badges() {
        let bed = TestBed::start(true).await;
        let mut card = SubscriptionCard::new(
            SubscriptionButton::new(bed.session(), Some(U256::from(PACKAGE_ID))),
            BoxConfig::ChildComponent,
        );
        card.refresh(&bed.wallet()).await.unwrap();

        let view = card.view();
        assert_eq!(view.package_badge, Some(Badge::Text("Package: 1 week".into())));
        assert!(matches!(view.button, ButtonView::Ready(_)));
    }

    #[tokio::test]
    async fn test_disconnected_card() {
        let bed = TestBed::start(false).await;
        let mut card = SubscriptionCard::new(
            SubscriptionButton::new(bed.session(), None),
            BoxConfig::BackgroundImage("https://example.com/bg.png".into()),
        );
        card.refresh(&WalletState::disconnected()).await.unwrap();
        let view = card.view();
        assert_eq!(view.button, ButtonView::ConnectWallet);
        assert_eq!(view.extra_time_badge, None);
    }
}
