#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Subscription button, card and widget controllers for AccessTime.
//!
//! Components are headless: they hold selection state, run chain and API
//! reads, submit transactions, and derive render-ready views from
//! [`accesstime::view`]. A host UI draws the views and forwards clicks.
//!
//! # Architecture
//!
//! - [`widget`] - [`AccessTimeWidget`], the composition root sharing clients and wallet state
//! - [`session`] - Connection status, deployment details and project record of one contract
//! - [`button`] - [`SubscriptionButton`], the purchase controller
//! - [`card`] - [`SubscriptionCard`], badges around a button
//! - [`config`] - TOML configuration for hosts
//!
//! # Feature Flags
//!
//! - `bin` - The `accesstime` command-line host
//! - `telemetry` - Tracing spans in the underlying crates

pub mod button;
pub mod card;
pub mod config;
pub mod error;
pub mod session;
pub mod widget;

#[cfg(test)]
mod testing;

pub use button::{ClickOutcome, SubscriptionButton};
pub use card::SubscriptionCard;
pub use config::WidgetConfig;
pub use error::WidgetError;
pub use session::Session;
pub use widget::AccessTimeWidget;
