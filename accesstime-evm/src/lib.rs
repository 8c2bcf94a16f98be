#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM reads and transactions for AccessTime subscriptions.
//!
//! # Architecture
//!
//! - [`contract`] - Solidity bindings for the factory, AccessTime and ERC-20 contracts
//! - [`provider`] - The [`AccessTimeChain`] seam and its alloy implementation
//! - [`reader`] - Contract details, payment methods, rates, packages and extra times
//! - [`allowance`] - ERC-20 allowance tracking and approval
//! - [`purchase`] - Purchase submission and receipt resolution
//!
//! # Feature Flags
//!
//! - `telemetry` - `tracing` spans on chain calls
//! - `mock` - In-memory [`AccessTimeChain`] for tests and previews

pub mod allowance;
pub mod contract;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
pub mod purchase;
pub mod reader;

pub use allowance::{AllowanceManager, ApproveRequirement};
pub use error::ChainError;
pub use provider::{AccessTimeChain, AlloyChain, ContractCall, ReceiptConfig};
pub use purchase::PurchaseOrchestrator;
