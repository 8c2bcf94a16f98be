//! Supported chains and the AccessTime factory deployment.
//!
//! The widget only sells subscriptions on the chains listed here. Lookups
//! for unknown chains fall back to `"-"` for display strings and 18 for
//! decimals.

use alloy_primitives::{Address, address};

use crate::chain::{ChainConfig, ChainId};

/// Base Mainnet chain ID.
pub const BASE_MAINNET: ChainId = 8453;

/// Base Sepolia (testnet) chain ID.
pub const BASE_SEPOLIA: ChainId = 84532;

/// AccessTime factory address, identical on every supported chain.
pub const FACTORY_ADDRESS: Address = address!("84Ec87B41272223755AdD5f2A8271290aD5d87f0");

/// Base URL of the AccessTime project API.
pub const API_URL: &str = "https://api.accesstime.io";

/// Placeholder shown for chains outside the table.
pub const UNKNOWN_CHAIN_LABEL: &str = "-";

/// Decimals assumed when nothing better is known.
pub const DEFAULT_DECIMALS: u8 = 18;

static SUPPORTED_CHAINS: [ChainConfig; 2] = [
    ChainConfig {
        chain_id: BASE_MAINNET,
        name: "Base",
        currency_symbol: "ETH",
        currency_decimals: 18,
        factory_address: FACTORY_ADDRESS,
    },
    ChainConfig {
        chain_id: BASE_SEPOLIA,
        name: "Base Sepolia",
        currency_symbol: "ETH",
        currency_decimals: 18,
        factory_address: FACTORY_ADDRESS,
    },
];

/// Returns the configuration of every supported chain.
#[must_use]
pub fn supported_chains() -> &'static [ChainConfig] {
    &SUPPORTED_CHAINS
}

/// Looks up a supported chain by ID.
#[must_use]
pub fn chain_config(chain_id: ChainId) -> Option<&'static ChainConfig> {
    SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

/// Returns `true` if subscriptions can be sold on `chain_id`.
#[must_use]
pub fn is_supported_chain(chain_id: ChainId) -> bool {
    chain_config(chain_id).is_some()
}

/// Display name of a chain, or `"-"` when unsupported.
#[must_use]
pub fn chain_name(chain_id: ChainId) -> &'static str {
    chain_config(chain_id).map_or(UNKNOWN_CHAIN_LABEL, |c| c.name)
}

/// Native currency symbol of a chain, or `"-"` when unsupported.
#[must_use]
pub fn chain_currency_symbol(chain_id: ChainId) -> &'static str {
    chain_config(chain_id).map_or(UNKNOWN_CHAIN_LABEL, |c| c.currency_symbol)
}

/// Native currency decimals of a chain, or 18 when unsupported.
#[must_use]
pub fn chain_currency_decimals(chain_id: ChainId) -> u8 {
    chain_config(chain_id).map_or(DEFAULT_DECIMALS, |c| c.currency_decimals)
}

/// Factory address on a chain, if supported.
#[must_use]
pub fn factory_address(chain_id: ChainId) -> Option<Address> {
    chain_config(chain_id).map(|c| c.factory_address)
}
