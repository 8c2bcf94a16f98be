//! Render-ready views of the subscription button and card.
//!
//! The widget components collect their state into [`ButtonInputs`] and call
//! [`ButtonView::derive`]; a host UI only has to draw the result and route
//! clicks back through [`ButtonAction`].

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::amount::display_amount;
use crate::humanize::humanize_duration;
use crate::pricing::{FIXED_TIMES, FixedTime, PaymentQuote};
use crate::types::{PackageTerms, PaymentMethodOption};
use crate::wallet::ConnectionStatus;

/// Label used when no custom text is configured.
pub const DEFAULT_BUTTON_TEXT: &str = "Subscribe";

/// Host-supplied button settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonConfig {
    /// Label of the purchase button.
    #[serde(default)]
    pub text: Option<String>,
    /// Show the humanized subscription time above the button.
    #[serde(default)]
    pub show_time_information: bool,
}

impl ButtonConfig {
    /// The purchase label.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_BUTTON_TEXT)
    }
}

/// Color scheme of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    /// Primary action.
    Blue,
    /// Inert.
    Gray,
    /// Needs attention (approval or network switch).
    Yellow,
    /// Failure.
    Red,
}

/// What a click on the main button should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonAction {
    /// Ask the host to open its wallet connector.
    ConnectWallet,
    /// Ask the host to switch the wallet's network.
    SwitchNetwork,
    /// Send an ERC-20 approval.
    Approve,
    /// Send the purchase.
    Subscribe,
}

/// Everything the button view depends on.
#[derive(Debug, Clone, Copy)]
pub struct ButtonInputs<'a> {
    /// Wallet status for the widget's chain.
    pub connection: ConnectionStatus,
    /// Payment methods listed by the API; `None` while not loaded.
    pub payment_method_count: Option<usize>,
    /// Package module flag of the contract, once known.
    pub package_module: Option<bool>,
    /// The custom-time input is open.
    pub custom_time: bool,
    /// Selected duration in seconds.
    pub time_amount: Option<u64>,
    /// Payment method options.
    pub options: &'a [PaymentMethodOption],
    /// Token metadata is still loading.
    pub options_loading: bool,
    /// Selected payment method.
    pub selected: Option<Address>,
    /// Quote for the selection.
    pub quote: &'a PaymentQuote,
    /// The allowance does not cover the quote.
    pub approve_required: bool,
    /// Contract or API reads are in flight.
    pub loading: bool,
    /// An approval or purchase is in flight.
    pub busy: bool,
    /// A contract or API read failed.
    pub error: bool,
    /// Host settings.
    pub config: &'a ButtonConfig,
}

/// Duration controls shown above the main button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimeSelector {
    /// Preset durations plus a "Custom" toggle.
    Presets {
        /// Available presets.
        options: Vec<FixedTime>,
        /// Currently selected duration.
        selected: Option<u64>,
    },
    /// Free-form input with a "Reset" control.
    Custom {
        /// Current input value.
        value: u64,
        /// Humanized time, when enabled.
        info: Option<String>,
    },
    /// Duration fixed by the package; information only.
    Fixed {
        /// Humanized time, when enabled.
        info: Option<String>,
    },
}

/// Payment method dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSelector {
    /// Token metadata is loading; render a placeholder.
    pub loading: bool,
    /// Options to list.
    pub options: Vec<PaymentMethodOption>,
    /// Selected option.
    pub selected: Option<Address>,
}

/// The main purchase/approve button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainButton {
    /// Label.
    pub label: String,
    /// Color scheme.
    pub color: ButtonColor,
    /// Show a spinner.
    pub loading: bool,
    /// Reject clicks.
    pub disabled: bool,
    /// What a click does.
    pub action: ButtonAction,
}

/// The "Total Payment" line under the button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalPayment {
    /// `"Total Payment: <amount> <symbol>"`.
    pub text: String,
    /// `false` renders a skeleton instead of the text.
    pub loaded: bool,
}

/// Controls shown once the wallet is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyPanel {
    /// Duration controls.
    pub time_selector: TimeSelector,
    /// Present when more than one payment method exists.
    pub payment_selector: Option<PaymentSelector>,
    /// Main button.
    pub main: MainButton,
    /// Present once a payment method is selected.
    pub total_payment: Option<TotalPayment>,
}

/// What the subscription button renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ButtonView {
    /// No wallet.
    ConnectWallet,
    /// The widget is configured for an unsupported chain.
    ConfigInvalid,
    /// The wallet is on another chain.
    SwitchNetwork,
    /// The project accepts no payment method.
    PaymentMethodNotFound,
    /// Ready to approve or purchase.
    Ready(ReadyPanel),
}

impl ButtonView {
    /// Derives the view; checks apply in wallet, chain, network, payment order.
    #[must_use]
    pub fn derive(inputs: &ButtonInputs<'_>) -> Self {
        let connection = inputs.connection;
        if !connection.is_wallet_connected {
            return Self::ConnectWallet;
        }
        if !connection.is_supported_chain {
            return Self::ConfigInvalid;
        }
        if !connection.is_correct_chain_connected {
            return Self::SwitchNetwork;
        }
        if inputs.payment_method_count == Some(0) {
            return Self::PaymentMethodNotFound;
        }
        Self::Ready(ReadyPanel::derive(inputs))
    }

    /// Label of the primary control.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::ConnectWallet => "Connect Wallet",
            Self::ConfigInvalid => "Config is invalid!",
            Self::SwitchNetwork => "Switch Network",
            Self::PaymentMethodNotFound => "Payment Method not found!",
            Self::Ready(panel) => &panel.main.label,
        }
    }

    /// Color of the primary control.
    #[must_use]
    pub const fn color(&self) -> ButtonColor {
        match self {
            Self::ConnectWallet => ButtonColor::Blue,
            Self::ConfigInvalid => ButtonColor::Gray,
            Self::SwitchNetwork => ButtonColor::Yellow,
            Self::PaymentMethodNotFound => ButtonColor::Red,
            Self::Ready(panel) => panel.main.color,
        }
    }

    /// Action of the primary control, or `None` when it is inert.
    #[must_use]
    pub const fn action(&self) -> Option<ButtonAction> {
        match self {
            Self::ConnectWallet => Some(ButtonAction::ConnectWallet),
            Self::SwitchNetwork => Some(ButtonAction::SwitchNetwork),
            Self::ConfigInvalid | Self::PaymentMethodNotFound => None,
            Self::Ready(panel) if panel.main.disabled => None,
            Self::Ready(panel) => Some(panel.main.action),
        }
    }
}

impl ReadyPanel {
    fn derive(inputs: &ButtonInputs<'_>) -> Self {
        let info = inputs
            .time_amount
            .filter(|_| inputs.config.show_time_information)
            .map(|t| format!("Subscribe Time: {}", humanize_duration(t)));

        let time_selector = match (inputs.package_module, inputs.custom_time) {
            (Some(false), false) => TimeSelector::Presets {
                options: FIXED_TIMES.to_vec(),
                selected: inputs.time_amount,
            },
            (Some(false), true) => TimeSelector::Custom {
                value: inputs.time_amount.unwrap_or(1),
                info,
            },
            _ => TimeSelector::Fixed { info },
        };

        let payment_selector = (inputs.payment_method_count.unwrap_or(0) > 1)
            .then(|| PaymentSelector {
                loading: inputs.options_loading,
                options: inputs.options.to_vec(),
                selected: inputs.selected,
            })
            .filter(|s| s.loading || !s.options.is_empty());

        let (label, color, action) = if inputs.error {
            ("Error occurred!", ButtonColor::Red, ButtonAction::Subscribe)
        } else if inputs.approve_required {
            ("Approve", ButtonColor::Yellow, ButtonAction::Approve)
        } else {
            (inputs.config.text(), ButtonColor::Blue, ButtonAction::Subscribe)
        };
        let loading = inputs.loading || inputs.busy;
        let main = MainButton {
            label: label.to_owned(),
            color,
            loading,
            disabled: loading || inputs.error,
            action,
        };

        let total_payment = inputs.selected.map(|_| TotalPayment {
            text: format!(
                "Total Payment: {} {}",
                display_amount(inputs.quote.amount, inputs.quote.decimals),
                inputs.quote.symbol
            ),
            loaded: inputs.quote.calculated,
        });

        Self {
            time_selector,
            payment_selector,
            main,
            total_payment,
        }
    }
}

/// Content of the card's top area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum BoxConfig {
    /// A background image URL.
    BackgroundImage(String),
    /// An icon identifier resolved by the host.
    Icon(String),
    /// Host-rendered child content.
    ChildComponent,
}

/// A small label on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "camelCase")]
pub enum Badge {
    /// Data is loading; render a skeleton.
    Loading,
    /// Loaded text.
    Text(String),
}

/// Badge for the package duration.
#[must_use]
pub fn package_badge(loading: bool, terms: Option<&PackageTerms>) -> Option<Badge> {
    if loading {
        return Some(Badge::Loading);
    }
    terms.map(|t| Badge::Text(format!("Package: {}", humanize_duration(t.time_secs()))))
}

/// Badge for the extra time awarded on the current duration.
#[must_use]
pub fn extra_time_badge(loading: bool, extra_time: Option<u64>) -> Option<Badge> {
    if loading {
        return Some(Badge::Loading);
    }
    extra_time.map(|t| Badge::Text(format!("ExtraTime: {}", humanize_duration(t))))
}

/// What the subscription card renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    /// Package duration badge.
    pub package_badge: Option<Badge>,
    /// Extra-time badge.
    pub extra_time_badge: Option<Badge>,
    /// Chain name badge.
    pub chain_badge: String,
    /// Top area content.
    pub box_config: BoxConfig,
    /// The embedded subscription button.
    pub button: ButtonView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn ready() -> ConnectionStatus {
        ConnectionStatus {
            is_supported_chain: true,
            is_wallet_connected: true,
            is_correct_chain_connected: true,
        }
    }

    fn option(byte: u8, symbol: &str) -> PaymentMethodOption {
        PaymentMethodOption {
            address: Address::repeat_byte(byte),
            symbol: symbol.into(),
            decimals: 6,
        }
    }

    fn inputs<'a>(
        options: &'a [PaymentMethodOption],
        quote: &'a PaymentQuote,
        config: &'a ButtonConfig,
    ) -> ButtonInputs<'a> {
        ButtonInputs {
            connection: ready(),
            payment_method_count: Some(options.len()),
            package_module: Some(false),
            custom_time: false,
            time_amount: Some(3600),
            options,
            options_loading: false,
            selected: options.first().map(|o| o.address),
            quote,
            approve_required: false,
            loading: false,
            busy: false,
            error: false,
            config,
        }
    }

    fn panel(view: ButtonView) -> ReadyPanel {
        match view {
            ButtonView::Ready(panel) => panel,
            other => panic!("expected ready panel, got {other:?}"),
        }
    }

    #[test]
    fn test_gating_order() {
        let quote = PaymentQuote::uncalculated();
        let config = ButtonConfig::default();
        let mut i = inputs(&[], &quote, &config);
        i.connection = ConnectionStatus::default();
        assert_eq!(ButtonView::derive(&i), ButtonView::ConnectWallet);

        i.connection.is_wallet_connected = true;
        assert_eq!(ButtonView::derive(&i), ButtonView::ConfigInvalid);

        i.connection.is_supported_chain = true;
        assert_eq!(ButtonView::derive(&i), ButtonView::SwitchNetwork);
        assert_eq!(ButtonView::derive(&i).action(), Some(ButtonAction::SwitchNetwork));

        i.connection.is_correct_chain_connected = true;
        assert_eq!(ButtonView::derive(&i), ButtonView::PaymentMethodNotFound);
        assert_eq!(ButtonView::derive(&i).action(), None);

        i.payment_method_count = None;
        assert!(matches!(ButtonView::derive(&i), ButtonView::Ready(_)));
    }

    #[test]
    fn test_ready_subscribe() {
        let options = [option(1, "USDC")];
        let quote = PaymentQuote {
            amount: U256::from(1_500_000),
            symbol: "USDC".into(),
            decimals: 6,
            calculated: true,
        };
        let config = ButtonConfig {
            text: Some("Buy access".into()),
            show_time_information: false,
        };
        let view = ButtonView::derive(&inputs(&options, &quote, &config));
        assert_eq!(view.label(), "Buy access");
        assert_eq!(view.color(), ButtonColor::Blue);
        assert_eq!(view.action(), Some(ButtonAction::Subscribe));
        let panel = panel(view);
        assert!(panel.payment_selector.is_none());
        assert_eq!(
            panel.total_payment,
            Some(TotalPayment {
                text: "Total Payment: 1.5 USDC".into(),
                loaded: true,
            })
        );
        assert!(matches!(
            panel.time_selector,
            TimeSelector::Presets {
                selected: Some(3600),
                ..
            }
        ));
    }

    #[test]
    fn test_approve_and_error_labels() {
        let options = [option(1, "USDC"), option(2, "DAI")];
        let quote = PaymentQuote::uncalculated();
        let config = ButtonConfig::default();
        let mut i = inputs(&options, &quote, &config);
        i.approve_required = true;
        let view = ButtonView::derive(&i);
        assert_eq!(view.label(), "Approve");
        assert_eq!(view.color(), ButtonColor::Yellow);
        assert_eq!(view.action(), Some(ButtonAction::Approve));
        assert_eq!(panel(view).payment_selector.map(|s| s.options.len()), Some(2));

        i.error = true;
        let view = ButtonView::derive(&i);
        assert_eq!(view.label(), "Error occurred!");
        assert_eq!(view.color(), ButtonColor::Red);
        assert_eq!(view.action(), None);
    }

    #[test]
    fn test_busy_disables_button() {
        let options = [option(1, "USDC")];
        let quote = PaymentQuote::uncalculated();
        let config = ButtonConfig::default();
        let mut i = inputs(&options, &quote, &config);
        i.busy = true;
        let main = panel(ButtonView::derive(&i)).main;
        assert!(main.loading);
        assert!(main.disabled);
        assert_eq!(main.label, DEFAULT_BUTTON_TEXT);
    }

    #[test]
    fn test_time_selector_modes() {
        let options = [option(1, "USDC")];
        let quote = PaymentQuote::uncalculated();
        let config = ButtonConfig {
            text: None,
            show_time_information: true,
        };
        let mut i = inputs(&options, &quote, &config);
        i.custom_time = true;
        i.time_amount = Some(5400);
        assert_eq!(
            panel(ButtonView::derive(&i)).time_selector,
            TimeSelector::Custom {
                value: 5400,
                info: Some("Subscribe Time: 1 hour and 30 minutes".into()),
            }
        );

        i.package_module = Some(true);
        assert_eq!(
            panel(ButtonView::derive(&i)).time_selector,
            TimeSelector::Fixed {
                info: Some("Subscribe Time: 1 hour and 30 minutes".into()),
            }
        );
    }

    #[test]
    fn test_badges() {
        let terms = PackageTerms {
            time: U256::from(86_400),
            available: true,
        };
        assert_eq!(package_badge(true, Some(&terms)), Some(Badge::Loading));
        assert_eq!(
            package_badge(false, Some(&terms)),
            Some(Badge::Text("Package: 1 day".into()))
        );
        assert_eq!(package_badge(false, None), None);
        assert_eq!(
            extra_time_badge(false, Some(360)),
            Some(Badge::Text("ExtraTime: 6 minutes".into()))
        );
        assert_eq!(extra_time_badge(false, None), None);
    }
}
