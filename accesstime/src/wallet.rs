//! Wallet connection status relative to a requested chain.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;
use crate::networks::is_supported_chain;

/// Live state reported by the wallet connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    /// Whether the connector reports an active session.
    pub connected: bool,
    /// The connected account, if any.
    pub address: Option<Address>,
    /// The chain the wallet is currently on.
    pub chain_id: Option<ChainId>,
}

impl WalletState {
    /// A wallet connected with `address` on `chain_id`.
    #[must_use]
    pub const fn connected(address: Address, chain_id: ChainId) -> Self {
        Self {
            connected: true,
            address: Some(address),
            chain_id: Some(chain_id),
        }
    }

    /// No wallet session.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            connected: false,
            address: None,
            chain_id: None,
        }
    }
}

/// Connection checks for a widget bound to one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// The requested chain is in the supported table.
    pub is_supported_chain: bool,
    /// The wallet is connected and exposes an account.
    pub is_wallet_connected: bool,
    /// The wallet is on the requested chain.
    pub is_correct_chain_connected: bool,
}

impl ConnectionStatus {
    /// Derives the status of `wallet` for a widget bound to `requested_chain`.
    #[must_use]
    pub fn derive(requested_chain: ChainId, wallet: &WalletState) -> Self {
        Self {
            is_supported_chain: is_supported_chain(requested_chain),
            is_wallet_connected: wallet.connected && wallet.address.is_some(),
            is_correct_chain_connected: wallet.chain_id == Some(requested_chain),
        }
    }

    /// All checks pass: chain reads and transactions may be issued.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.is_supported_chain && self.is_wallet_connected && self.is_correct_chain_connected
    }
}
