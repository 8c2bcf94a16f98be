//! Errors raised when a purchase or approval cannot be issued.
//!
//! The display strings are shown to end users as-is, so they stay short.

/// Rejection of a widget action before anything is sent on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessTimeError {
    /// The wallet is disconnected, on another chain, or the chain is unsupported.
    #[error("Wallet is not connected or not correct!")]
    WalletNotReady,
    /// The project API record is not available.
    #[error("API failed!")]
    ApiUnavailable,
    /// The contract is not a factory deployment.
    #[error("AccessTime is invalid!")]
    InvalidAccessTime,
    /// A plain purchase was attempted on a package-only contract.
    #[error("Package module is active!")]
    PackageModuleActive,
    /// A package purchase was attempted on a contract without packages.
    #[error("Package module is not active!")]
    PackageModuleInactive,
    /// The requested package is not listed.
    #[error("Package is not active!")]
    PackageNotActive,
    /// The payment token is not accepted by the contract.
    #[error("Payment method is not exist!")]
    PaymentMethodNotFound,
    /// The wallet is on a different chain than the widget.
    #[error("Invalid chainId!")]
    InvalidChain,
    /// The current allowance already covers the payment.
    #[error("Approve is not required!")]
    ApproveNotRequired,
    /// No valid duration, payment method or quote is selected.
    #[error("Requested time is invalid!")]
    InvalidTimeAmount,
    /// The payment method is not one of the loaded options.
    #[error("Payment method is not an option!")]
    UnknownPaymentMethod,
}
