//! Token amount formatting.
//!
//! Amounts travel as base-unit integers. These helpers render them as
//! decimal strings without any floating-point rounding.

use alloy_primitives::U256;

/// Formats `amount` base units with `decimals` as an exact decimal string.
///
/// Trailing fractional zeros are dropped, and a whole amount has no
/// fractional part: `1_500_000` with 6 decimals is `"1.5"`, `2_000_000` is `"2"`.
#[must_use]
pub fn format_units(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = amount.to_string();
    let decimals = usize::from(decimals);
    let padded = if digits.len() <= decimals {
        format!("{digits:0>width$}", width = decimals + 1)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_owned()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Shortens a formatted amount for display.
///
/// Fractions longer than five digits are cut to their first four.
#[must_use]
pub fn shorten(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) if fraction.len() > 5 => format!("{whole}.{}", &fraction[..4]),
        _ => formatted.to_owned(),
    }
}

/// Formats and shortens `amount` for display.
#[must_use]
pub fn display_amount(amount: U256, decimals: u8) -> String {
    shorten(&format_units(amount, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000), 6), "1.5");
        assert_eq!(format_units(U256::from(2_000_000), 6), "2");
        assert_eq!(format_units(U256::from(1), 6), "0.000001");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(42), 0), "42");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("1.123456"), "1.1234");
        assert_eq!(shorten("1.12345"), "1.12345");
        assert_eq!(shorten("12"), "12");
    }

    #[test]
    fn test_display_amount() {
        // 0.000277777777777777 ETH for one second at 1 ETH/hour.
        let wei = U256::from(277_777_777_777_777_u64);
        assert_eq!(display_amount(wei, 18), "0.0002");
    }
}
