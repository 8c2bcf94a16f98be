#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! REST client for the AccessTime project API.
//!
//! The project API serves the off-chain view of an AccessTime deployment:
//! accepted payment methods, active packages and extra-time rules, owner
//! fields and the paused flag. [`ProjectApiClient`] fetches
//! `GET /project/{chainId}/{id}` and keeps responses in a TTL cache keyed by
//! chain and AccessTime id, which the widget invalidates after a purchase
//! confirms.
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod cache;
pub mod client;
pub mod error;

pub use cache::ProjectCache;
pub use client::ProjectApiClient;
pub use error::ProjectApiError;
