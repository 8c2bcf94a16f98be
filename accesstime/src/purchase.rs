//! Purchase requests and the checks they must pass before being sent.

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::error::AccessTimeError;
use crate::types::{ContractDetails, ProjectDetails};
use crate::wallet::ConnectionStatus;

/// A subscription purchase to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PurchaseRequest {
    /// `purchase(amount, paymentToken)`.
    Time {
        /// Token amount in base units.
        amount: U256,
        /// Payment token; zero for the native currency.
        payment_token: Address,
    },
    /// `purchasePackage(amount, paymentToken, packageId)`.
    Package {
        /// Token amount in base units.
        amount: U256,
        /// Payment token; zero for the native currency.
        payment_token: Address,
        /// Package to buy.
        package_id: U256,
    },
}

impl PurchaseRequest {
    /// Token amount in base units.
    #[must_use]
    pub const fn amount(&self) -> U256 {
        match self {
            Self::Time { amount, .. } | Self::Package { amount, .. } => *amount,
        }
    }

    /// Payment token.
    #[must_use]
    pub const fn payment_token(&self) -> Address {
        match self {
            Self::Time { payment_token, .. } | Self::Package { payment_token, .. } => {
                *payment_token
            }
        }
    }

    /// Native currency payments carry the amount as transaction value.
    #[must_use]
    pub fn value(&self) -> U256 {
        if self.payment_token().is_zero() {
            self.amount()
        } else {
            U256::ZERO
        }
    }
}

/// What is known about the contract when a purchase is requested.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseContext<'a> {
    /// Wallet connection status for the widget's chain.
    pub connection: ConnectionStatus,
    /// Factory deployment details.
    pub details: &'a ContractDetails,
    /// Project API record, once loaded.
    pub project: Option<&'a ProjectDetails>,
}

impl PurchaseContext<'_> {
    /// Checks `request` against the context.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, in order: wallet, API record,
    /// deployment, package module, package listing, payment method.
    pub fn check(&self, request: &PurchaseRequest) -> Result<(), AccessTimeError> {
        let result = self.check_inner(request);
        #[cfg(feature = "telemetry")]
        if let Err(e) = &result {
            tracing::debug!(error = %e, request = ?request, "Purchase rejected");
        }
        result
    }

    fn check_inner(&self, request: &PurchaseRequest) -> Result<(), AccessTimeError> {
        if !self.connection.is_ready() {
            return Err(AccessTimeError::WalletNotReady);
        }
        let project = self.project.ok_or(AccessTimeError::ApiUnavailable)?;
        if !self.details.deployed {
            return Err(AccessTimeError::InvalidAccessTime);
        }
        let package_module = self.details.package_module == Some(true);
        match request {
            PurchaseRequest::Time { .. } if package_module => {
                return Err(AccessTimeError::PackageModuleActive);
            }
            PurchaseRequest::Package { .. } if !package_module => {
                return Err(AccessTimeError::PackageModuleInactive);
            }
            PurchaseRequest::Package { package_id, .. } if !project.has_package(*package_id) => {
                return Err(AccessTimeError::PackageNotActive);
            }
            _ => {}
        }
        if !project.has_payment_method(request.payment_token()) {
            return Err(AccessTimeError::PaymentMethodNotFound);
        }
        Ok(())
    }
}
