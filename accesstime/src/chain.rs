//! EVM chain primitives.
//!
//! Provides the chain identifier type and the static metadata the widget
//! needs for each supported chain.

use alloy_primitives::Address;
use serde::Serialize;

/// An EIP-155 chain ID (e.g., 8453 for Base).
pub type ChainId = u64;

/// Formats a chain ID as a CAIP-2 identifier.
///
/// Example: `caip2(8453)` returns `"eip155:8453"`.
#[must_use]
pub fn caip2(chain_id: ChainId) -> String {
    format!("eip155:{chain_id}")
}

/// Parses a CAIP-2 identifier into an EIP-155 chain ID.
///
/// Returns `None` if the input is not a valid `eip155:` prefixed string.
#[must_use]
pub fn parse_caip2(caip: &str) -> Option<ChainId> {
    caip.strip_prefix("eip155:").and_then(|s| s.parse().ok())
}

/// Static metadata for a chain the widget can sell subscriptions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainConfig {
    /// EIP-155 chain ID.
    pub chain_id: ChainId,
    /// Display name (e.g., `"Base Sepolia"`).
    pub name: &'static str,
    /// Symbol of the native currency.
    pub currency_symbol: &'static str,
    /// Decimals of the native currency.
    pub currency_decimals: u8,
    /// AccessTime factory contract deployed on this chain.
    pub factory_address: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caip2_roundtrip() {
        assert_eq!(caip2(8453), "eip155:8453");
        assert_eq!(parse_caip2("eip155:84532"), Some(84532));
    }

    #[test]
    fn test_parse_caip2_rejects_other_namespaces() {
        assert_eq!(parse_caip2("solana:mainnet"), None);
        assert_eq!(parse_caip2("eip155:base"), None);
        assert_eq!(parse_caip2("8453"), None);
    }
}
