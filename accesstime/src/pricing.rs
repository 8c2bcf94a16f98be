//! Payment quotes and duration rules.
//!
//! AccessTime contracts price subscriptions as a per-hour token rate. The
//! requested duration is converted to fractional hours with 18 decimals of
//! precision, multiplied by the rate, and scaled back down, so partial hours
//! are charged proportionally.

use alloy_primitives::U256;
use serde::Serialize;

use crate::error::AccessTimeError;
use crate::networks::{DEFAULT_DECIMALS, UNKNOWN_CHAIN_LABEL};
use crate::types::{ExtraTimeTerms, PaymentMethodOption};

/// Fixed-point precision used for fractional hours (1e18).
pub const RATE_PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Duration selected when nothing else applies.
pub const DEFAULT_TIME_AMOUNT: u64 = SECONDS_PER_HOUR;

/// Exclusive upper bound for custom durations.
pub const MAX_TIME_AMOUNT: u64 = 9_999_999_999;

/// A selectable preset duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixedTime {
    /// Label shown on the preset.
    pub text: &'static str,
    /// Duration in seconds.
    pub value: u64,
}

/// Presets offered when the package module is off.
pub const FIXED_TIMES: [FixedTime; 3] = [
    FixedTime {
        text: "1 Hour",
        value: SECONDS_PER_HOUR,
    },
    FixedTime {
        text: "1 Day",
        value: 24 * SECONDS_PER_HOUR,
    },
    FixedTime {
        text: "1 Week",
        value: 7 * 24 * SECONDS_PER_HOUR,
    },
];

/// The amount a purchase costs in a given payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentQuote {
    /// Required token amount in base units.
    pub amount: U256,
    /// Symbol of the payment method.
    pub symbol: String,
    /// Decimals of the payment method.
    pub decimals: u8,
    /// `false` until a rate and a duration are both known.
    pub calculated: bool,
}

impl PaymentQuote {
    /// A quote with no rate or duration behind it.
    #[must_use]
    pub fn uncalculated() -> Self {
        Self {
            amount: U256::ZERO,
            symbol: UNKNOWN_CHAIN_LABEL.to_owned(),
            decimals: DEFAULT_DECIMALS,
            calculated: false,
        }
    }

    /// `true` when the quote can back a purchase.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        self.calculated && !self.amount.is_zero()
    }
}

impl Default for PaymentQuote {
    fn default() -> Self {
        Self::uncalculated()
    }
}

/// Token amount owed for `seconds` at `rate_per_hour`.
#[must_use]
pub fn required_payment(rate_per_hour: U256, seconds: u64) -> U256 {
    let desired_hours = RATE_PRECISION.saturating_mul(U256::from(seconds))
        / U256::from(SECONDS_PER_HOUR);
    rate_per_hour.saturating_mul(desired_hours) / RATE_PRECISION
}

/// Quotes `seconds` of access paid with `option` at `rate_per_hour`.
#[must_use]
pub fn quote(rate_per_hour: U256, seconds: u64, option: &PaymentMethodOption) -> PaymentQuote {
    if rate_per_hour.is_zero() || seconds == 0 {
        return PaymentQuote::uncalculated();
    }
    PaymentQuote {
        amount: required_payment(rate_per_hour, seconds),
        symbol: option.symbol.clone(),
        decimals: option.decimals,
        calculated: true,
    }
}

/// Largest bonus among the extra-time rules that apply to `seconds`.
///
/// A rule applies when it is available and `seconds` reaches its limit. The
/// bonus is `seconds * percent / 100`. Returns `None` when no rule yields a
/// positive bonus.
#[must_use]
pub fn best_extra_time(seconds: u64, terms: &[ExtraTimeTerms]) -> Option<u64> {
    let requested = U256::from(seconds);
    terms
        .iter()
        .filter(|t| t.available && requested >= t.limit)
        .map(|t| requested.saturating_mul(t.percent) / U256::from(100))
        .max()
        .filter(|bonus| !bonus.is_zero())
        .map(|bonus| u64::try_from(bonus).unwrap_or(u64::MAX))
}

/// Validates a custom duration entered by the user.
///
/// # Errors
///
/// Returns [`AccessTimeError::InvalidTimeAmount`] unless
/// `1 <= seconds < MAX_TIME_AMOUNT`.
pub fn validate_custom_time(seconds: u64) -> Result<u64, AccessTimeError> {
    if seconds == 0 || seconds >= MAX_TIME_AMOUNT {
        Err(AccessTimeError::InvalidTimeAmount)
    } else {
        Ok(seconds)
    }
}
