#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for selling AccessTime subscriptions on-chain.
//!
//! This crate holds everything about a subscription widget that does not
//! touch the network: the supported chain table, the data model shared by
//! the readers, the pricing calculator, and the derivation of render-ready
//! views for the subscription button and card. Chain access lives in
//! `accesstime-evm`, the project REST API in `accesstime-http`, and the
//! stateful components in `accesstime-widget`.
//!
//! # Modules
//!
//! - [`amount`] - Token amount formatting
//! - [`chain`] - Chain identifiers and static chain metadata
//! - [`error`] - Purchase precondition errors
//! - [`humanize`] - Human-readable durations
//! - [`networks`] - The table of supported chains and the factory deployment
//! - [`pricing`] - Payment quotes, extra-time rules and time presets
//! - [`purchase`] - Purchase precondition checks
//! - [`types`] - Contract, project and transaction data model
//! - [`view`] - Button and card view derivation
//! - [`wallet`] - Wallet connection status
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod amount;
pub mod chain;
pub mod error;
pub mod humanize;
pub mod networks;
pub mod pricing;
pub mod purchase;
pub mod types;
pub mod view;
pub mod wallet;

pub use error::AccessTimeError;
