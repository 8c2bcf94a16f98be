//! The subscription button controller.
//!
//! [`SubscriptionButton`] owns the selection state (payment method, duration,
//! custom-time toggle), runs the read pipeline on [`SubscriptionButton::refresh`]
//! and turns clicks into approvals or purchases. [`SubscriptionButton::view`]
//! derives what a host should draw.

use std::collections::HashMap;
use std::fmt;

use accesstime::AccessTimeError;
use accesstime::chain::ChainId;
use accesstime::pricing::{
    DEFAULT_TIME_AMOUNT, PaymentQuote, best_extra_time, quote, validate_custom_time,
};
use accesstime::types::{
    ContractDetails, ExtraTimeTerms, PackageTerms, PaymentMethodOption, PendingTransaction,
    TransactionStatus,
};
use accesstime::view::{ButtonAction, ButtonConfig, ButtonInputs, ButtonView};
use accesstime::wallet::WalletState;
use accesstime_evm::reader::{
    read_extra_times, read_package, read_payment_method_options, read_token_rates,
};
use accesstime_evm::{AccessTimeChain, AllowanceManager};
use alloy_primitives::{Address, TxHash, U256};
use tokio::sync::watch;

use crate::error::WidgetError;
use crate::session::Session;

/// Called with the hash of each submitted purchase.
pub type SubscriptionCallback = Box<dyn Fn(TxHash) + Send + Sync>;

/// Called whenever the selected duration changes.
pub type TimeAmountCallback = Box<dyn Fn(Option<u64>) + Send + Sync>;

/// Result of a click on the main button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The host should open its wallet connector.
    ConnectWallet,
    /// The host should switch the wallet to this chain.
    SwitchNetwork(ChainId),
    /// An approval or purchase was submitted.
    Submitted(PendingTransaction),
    /// The button is inert in its current state.
    Ignored,
}

/// Subscription button bound to one AccessTime contract.
pub struct SubscriptionButton<C> {
    session: Session<C>,
    config: ButtonConfig,
    package_id: Option<U256>,
    wallet_rx: Option<watch::Receiver<WalletState>>,
    options: Option<Vec<PaymentMethodOption>>,
    rates: HashMap<Address, U256>,
    package: Option<PackageTerms>,
    extra_times: Vec<ExtraTimeTerms>,
    read_error: Option<String>,
    selected: Option<Address>,
    custom_time: bool,
    time_amount: Option<u64>,
    allowance: AllowanceManager,
    pending: Option<PendingTransaction>,
    on_subscription: Option<SubscriptionCallback>,
    on_time_amount: Option<TimeAmountCallback>,
}

impl<C> fmt::Debug for SubscriptionButton<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionButton")
            .field("package_id", &self.package_id)
            .field("selected", &self.selected)
            .field("custom_time", &self.custom_time)
            .field("time_amount", &self.time_amount)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<C: AccessTimeChain> SubscriptionButton<C> {
    /// A button selling time, or package `package_id` when given.
    #[must_use]
    pub fn new(session: Session<C>, package_id: Option<U256>) -> Self {
        let allowance = AllowanceManager::new(session.chain_id(), session.access_time());
        Self {
            session,
            config: ButtonConfig::default(),
            package_id,
            wallet_rx: None,
            options: None,
            rates: HashMap::new(),
            package: None,
            extra_times: Vec::new(),
            read_error: None,
            selected: None,
            custom_time: false,
            time_amount: package_id.is_none().then_some(DEFAULT_TIME_AMOUNT),
            allowance,
            pending: None,
            on_subscription: None,
            on_time_amount: None,
        }
    }

    /// Sets the host settings.
    #[must_use]
    pub fn with_config(mut self, config: ButtonConfig) -> Self {
        self.config = config;
        self
    }

    /// Follows the wallet published by a widget; see [`Self::sync`].
    #[must_use]
    pub fn with_wallet_updates(mut self, wallet_rx: watch::Receiver<WalletState>) -> Self {
        self.wallet_rx = Some(wallet_rx);
        self
    }

    /// Registers the purchase callback.
    #[must_use]
    pub fn on_subscription(mut self, callback: impl Fn(TxHash) + Send + Sync + 'static) -> Self {
        self.on_subscription = Some(Box::new(callback));
        self
    }

    /// Registers the duration callback. It is called right away with the
    /// current duration, then on every change.
    #[must_use]
    pub fn on_time_amount(
        mut self,
        callback: impl Fn(Option<u64>) + Send + Sync + 'static,
    ) -> Self {
        callback(self.time_amount);
        self.on_time_amount = Some(Box::new(callback));
        self
    }

    /// Underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Host settings.
    #[must_use]
    pub const fn config(&self) -> &ButtonConfig {
        &self.config
    }

    /// Package sold by this button.
    #[must_use]
    pub const fn package_id(&self) -> Option<U256> {
        self.package_id
    }

    /// Payment method options, once token metadata is read.
    #[must_use]
    pub fn options(&self) -> Option<&[PaymentMethodOption]> {
        self.options.as_deref()
    }

    /// Selected payment method.
    #[must_use]
    pub const fn selected(&self) -> Option<Address> {
        self.selected
    }

    /// Selected duration in seconds.
    #[must_use]
    pub const fn time_amount(&self) -> Option<u64> {
        self.time_amount
    }

    /// The custom-time input is open.
    #[must_use]
    pub const fn is_custom_time(&self) -> bool {
        self.custom_time
    }

    /// Terms of the package sold by this button, once read.
    #[must_use]
    pub const fn package(&self) -> Option<&PackageTerms> {
        self.package.as_ref()
    }

    /// Extra-time rules of the contract.
    #[must_use]
    pub fn extra_times(&self) -> &[ExtraTimeTerms] {
        &self.extra_times
    }

    /// Allowance state for the selected token.
    #[must_use]
    pub const fn allowance(&self) -> &AllowanceManager {
        &self.allowance
    }

    /// Purchase awaiting its receipt.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingTransaction> {
        self.pending
    }

    /// The package terms are expected but not read yet.
    #[must_use]
    pub fn is_package_loading(&self) -> bool {
        self.package_id.is_some() && self.package.is_none() && self.session.is_loading()
    }

    /// Extra-time rules are expected but not read yet.
    #[must_use]
    pub fn is_extra_time_loading(&self) -> bool {
        self.session.is_project_loading()
    }

    /// Bonus seconds awarded on the selected duration.
    #[must_use]
    pub fn extra_time(&self) -> Option<u64> {
        best_extra_time(self.time_amount?, &self.extra_times)
    }

    /// Payment for the selected duration and method.
    #[must_use]
    pub fn quote(&self) -> PaymentQuote {
        let (Some(selected), Some(time)) = (self.selected, self.time_amount) else {
            return PaymentQuote::uncalculated();
        };
        let Some(option) = self.option(selected) else {
            return PaymentQuote::uncalculated();
        };
        let rate = self.rates.get(&selected).copied().unwrap_or_default();
        quote(rate, time, option)
    }

    fn option(&self, address: Address) -> Option<&PaymentMethodOption> {
        self.options
            .as_deref()
            .and_then(|options| options.iter().find(|o| o.address == address))
    }

    /// Re-reads everything the button shows for the latest wallet published
    /// to [`Self::with_wallet_updates`], or the last wallet seen otherwise.
    ///
    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn sync(&mut self) -> Result<(), WidgetError> {
        let wallet = match &mut self.wallet_rx {
            Some(rx) => *rx.borrow_and_update(),
            None => *self.session.wallet(),
        };
        self.refresh(&wallet).await
    }

    /// Waits until the widget publishes a new wallet state.
    ///
    /// Returns `false` when the button does not follow a widget or the
    /// widget is gone.
    pub async fn wallet_changed(&mut self) -> bool {
        match &mut self.wallet_rx {
            Some(rx) => rx.changed().await.is_ok(),
            None => false,
        }
    }

    /// Runs the read pipeline: session, payment methods, rates, package,
    /// extra times, then the allowance of the selected token.
    ///
    /// # Errors
    ///
    /// Returns the first failed read; the view reports it as an error.
    pub async fn refresh(&mut self, wallet: &WalletState) -> Result<(), WidgetError> {
        self.read_error = None;
        if let Err(e) = self.session.load(wallet).await {
            self.clear_reads();
            return Err(e);
        }
        let Some(project) = self.session.project() else {
            self.clear_reads();
            return Ok(());
        };

        let chain = self.session.chain();
        let access_time = self.session.access_time();
        let options = read_payment_method_options(chain, &project.payment_methods).await;
        let rates = read_token_rates(chain, access_time, &project.payment_methods).await;

        let package_module = self
            .session
            .details()
            .is_some_and(ContractDetails::has_package_module);
        let package = match self.package_id {
            Some(id) if package_module && project.has_package(id) => {
                Some(read_package(chain, access_time, id).await)
            }
            _ => None,
        };

        let extra_times = if project.extra_times.is_empty() {
            Vec::new()
        } else {
            read_extra_times(chain, access_time, &project.extra_times)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(%access_time, error = %e, "Extra-time read failed");
                    Vec::new()
                })
        };

        if self
            .selected
            .is_none_or(|s| !options.iter().any(|o| o.address == s))
        {
            self.selected = options.first().map(|o| o.address);
        }
        self.options = Some(options);
        self.rates = rates;
        self.extra_times = extra_times;
        match package {
            Some(Ok(terms)) => {
                self.package = Some(terms);
                self.set_time_amount(Some(terms.time_secs()));
            }
            Some(Err(e)) => {
                self.package = None;
                self.read_error = Some(e.to_string());
                return Err(e.into());
            }
            None => self.package = None,
        }

        self.sync_allowance();
        self.refresh_allowance().await
    }

    fn clear_reads(&mut self) {
        self.options = None;
        self.rates.clear();
        self.package = None;
        self.extra_times.clear();
    }

    fn sync_allowance(&mut self) {
        if let Some(token) = self.selected {
            self.allowance.update_config(token, self.quote().amount);
        }
    }

    async fn refresh_allowance(&mut self) -> Result<(), WidgetError> {
        let Some(owner) = self.session.wallet().address else {
            return Ok(());
        };
        if !self.session.connection().is_ready() {
            return Ok(());
        }
        self.allowance.refresh(self.session.chain(), owner).await?;
        Ok(())
    }

    fn set_time_amount(&mut self, time_amount: Option<u64>) {
        if self.time_amount == time_amount {
            return;
        }
        self.time_amount = time_amount;
        self.sync_allowance();
        if let Some(callback) = &self.on_time_amount {
            callback(time_amount);
        }
    }

    fn ensure_free_time(&self) -> Result<(), AccessTimeError> {
        if self.package_id.is_some()
            || self
                .session
                .details()
                .is_some_and(ContractDetails::has_package_module)
        {
            return Err(AccessTimeError::PackageModuleActive);
        }
        Ok(())
    }

    /// Picks a preset duration.
    ///
    /// # Errors
    ///
    /// [`AccessTimeError::PackageModuleActive`] when durations are fixed by a package.
    pub fn select_fixed_time(&mut self, seconds: u64) -> Result<(), AccessTimeError> {
        self.ensure_free_time()?;
        self.set_time_amount(Some(seconds));
        Ok(())
    }

    /// Opens the custom-time input.
    ///
    /// # Errors
    ///
    /// [`AccessTimeError::PackageModuleActive`] when durations are fixed by a package.
    pub fn open_custom_time(&mut self) -> Result<(), AccessTimeError> {
        self.ensure_free_time()?;
        self.custom_time = true;
        Ok(())
    }

    /// Sets the custom duration. Invalid input leaves the duration unchanged.
    ///
    /// # Errors
    ///
    /// - [`AccessTimeError::PackageModuleActive`] when durations are fixed by a package
    /// - [`AccessTimeError::InvalidTimeAmount`] outside `1..9_999_999_999`
    pub fn set_custom_time(&mut self, seconds: u64) -> Result<(), AccessTimeError> {
        self.ensure_free_time()?;
        let seconds = validate_custom_time(seconds)?;
        self.set_time_amount(Some(seconds));
        Ok(())
    }

    /// Closes the custom-time input and restores the default duration.
    /// Ignored for package buttons.
    pub fn reset_custom_time(&mut self) {
        if self.package_id.is_some() {
            return;
        }
        self.custom_time = false;
        self.set_time_amount(Some(DEFAULT_TIME_AMOUNT));
    }

    /// Selects a payment method and reads its allowance.
    ///
    /// # Errors
    ///
    /// - [`AccessTimeError::UnknownPaymentMethod`] if `token` is not an option
    /// - [`WidgetError::Chain`] if the allowance read fails
    pub async fn select_payment_method(&mut self, token: Address) -> Result<(), WidgetError> {
        if self.option(token).is_none() {
            return Err(AccessTimeError::UnknownPaymentMethod.into());
        }
        self.selected = Some(token);
        self.sync_allowance();
        self.refresh_allowance().await
    }

    /// Derives what the host should draw.
    #[must_use]
    pub fn view(&self) -> ButtonView {
        let quote = self.quote();
        let project = self.session.project();
        let inputs = ButtonInputs {
            connection: self.session.connection(),
            payment_method_count: project.map(|p| p.payment_methods.len()),
            package_module: self.session.details().and_then(|d| d.package_module),
            custom_time: self.custom_time,
            time_amount: self.time_amount,
            options: self.options.as_deref().unwrap_or_default(),
            options_loading: project.is_some() && self.options.is_none(),
            selected: self.selected,
            quote: &quote,
            approve_required: self.allowance.approve_required().status,
            loading: self.session.is_loading(),
            busy: self.pending.is_some() || self.allowance.is_loading(),
            error: self.session.has_error() || self.read_error.is_some(),
            config: &self.config,
        };
        ButtonView::derive(&inputs)
    }

    /// Performs the action of the main button.
    ///
    /// Wallet connection and network switches are delegated to the host.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError`] if the approval or purchase fails.
    pub async fn click(&mut self) -> Result<ClickOutcome, WidgetError> {
        match self.view().action() {
            None => Ok(ClickOutcome::Ignored),
            Some(ButtonAction::ConnectWallet) => Ok(ClickOutcome::ConnectWallet),
            Some(ButtonAction::SwitchNetwork) => {
                Ok(ClickOutcome::SwitchNetwork(self.session.chain_id()))
            }
            Some(ButtonAction::Approve) => self.approve().await.map(ClickOutcome::Submitted),
            Some(ButtonAction::Subscribe) => self.subscribe().await.map(ClickOutcome::Submitted),
        }
    }

    /// Approves the AccessTime contract to spend the quoted amount.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError`] if the approval is not needed or fails.
    pub async fn approve(&mut self) -> Result<PendingTransaction, WidgetError> {
        let tx = self
            .allowance
            .approve(self.session.chain(), self.session.wallet())
            .await?;
        tracing::info!(hash = %tx.hash, token = %self.allowance.token(), "Approval submitted");
        Ok(tx)
    }

    /// Purchases the selected duration or package.
    ///
    /// # Errors
    ///
    /// - [`AccessTimeError::InvalidTimeAmount`] without a duration, a payment
    ///   method and a positive quote
    /// - [`WidgetError`] if a precondition fails or the transaction cannot be sent
    pub async fn subscribe(&mut self) -> Result<PendingTransaction, WidgetError> {
        let quote = self.quote();
        let (Some(_), Some(token)) = (self.time_amount, self.selected) else {
            return Err(AccessTimeError::InvalidTimeAmount.into());
        };
        if !quote.is_payable() {
            return Err(AccessTimeError::InvalidTimeAmount.into());
        }
        let tx = match self.package_id {
            Some(package_id) => {
                self.session
                    .subscribe_package(quote.amount, token, package_id)
                    .await?
            }
            None => self.session.subscribe(quote.amount, token).await?,
        };
        self.pending = Some(tx);
        if let Some(callback) = &self.on_subscription {
            callback(tx.hash);
        }
        Ok(tx)
    }

    /// Waits for the pending approval or purchase, then re-reads the allowance.
    ///
    /// Returns `None` when nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError`] if the receipt or the allowance read fails.
    pub async fn wait_for_confirmation(
        &mut self,
    ) -> Result<Option<PendingTransaction>, WidgetError> {
        if self.allowance.pending().is_some() {
            let owner = self
                .session
                .wallet()
                .address
                .ok_or(AccessTimeError::WalletNotReady)?;
            let tx = self
                .allowance
                .wait_for_confirmation(self.session.chain(), owner)
                .await?;
            return Ok(tx);
        }
        let Some(tx) = self.pending else {
            return Ok(None);
        };
        let resolved = self.session.wait_for_confirmation(tx).await;
        self.pending = None;
        let tx = resolved?;
        tracing::info!(hash = %tx.hash, status = ?tx.status, "Subscription resolved");
        if tx.status == TransactionStatus::Confirmed {
            let wallet = *self.session.wallet();
            self.refresh(&wallet).await?;
        } else {
            self.refresh_allowance().await?;
        }
        Ok(Some(tx))
    }
}
