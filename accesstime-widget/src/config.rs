//! Widget host configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! api_url = "https://api.accesstime.io"
//! api_cache_ttl_secs = 300
//! receipt_timeout_secs = 120
//! confirmations = 1
//! signer_private_key = "$PRIVATE_KEY"
//!
//! [chains."eip155:84532"]
//! rpc_url = "https://sepolia.base.org"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `accesstime.toml`)
//! - `API_URL` - Override the project API base URL
//! - `RPC_URL` - Override the RPC endpoint of every configured chain
//! - `PRIVATE_KEY` - Override the wallet key
//! - Any variable referenced by `$VAR` in the config file

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use accesstime::chain::{ChainId, caip2, parse_caip2};
use accesstime::networks::API_URL;
use accesstime_evm::ReceiptConfig;
use accesstime_http::ProjectApiClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::WidgetError;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "accesstime.toml";

/// Top-level widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Project API base URL (default: `https://api.accesstime.io`).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Seconds a project record stays cached (default: 300, 0 disables caching).
    #[serde(default = "default_api_cache_ttl_secs")]
    pub api_cache_ttl_secs: u64,

    /// Seconds to wait for a transaction receipt (default: 120).
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    /// Block confirmations to wait for (default: 1).
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Private key of the wallet (hex, with or without `0x` prefix).
    /// Supports `$VAR` / `${VAR}` for environment variable expansion.
    #[serde(default)]
    pub signer_private_key: Option<String>,

    /// Chain configurations keyed by CAIP-2 network identifier.
    #[serde(default)]
    pub chains: HashMap<String, ChainRpcConfig>,
}

/// Per-chain RPC settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRpcConfig {
    /// HTTP RPC endpoint URL.
    pub rpc_url: String,
}

fn default_api_url() -> String {
    API_URL.to_owned()
}

const fn default_api_cache_ttl_secs() -> u64 {
    300
}

const fn default_receipt_timeout_secs() -> u64 {
    120
}

const fn default_confirmations() -> u64 {
    1
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_cache_ttl_secs: default_api_cache_ttl_secs(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            confirmations: default_confirmations(),
            signer_private_key: None,
            chains: HashMap::new(),
        }
    }
}

impl WidgetConfig {
    /// Loads configuration from the path given by the `CONFIG` environment
    /// variable, falling back to `accesstime.toml` in the current directory.
    ///
    /// After loading, all string values with `$VAR` / `${VAR}` references
    /// are expanded from the process environment. `API_URL`, `RPC_URL` and
    /// `PRIVATE_KEY` env vars override the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, WidgetError> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, WidgetError> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path).map_err(|source| WidgetError::ConfigRead {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };
        Self::parse(&content)
    }

    /// Parses configuration from TOML text, expanding environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::ConfigParse`] if the text is not valid.
    pub fn parse(content: &str) -> Result<Self, WidgetError> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api_url) = std::env::var("API_URL") {
            self.api_url = api_url;
        }
        if let Ok(rpc_url) = std::env::var("RPC_URL") {
            for chain in self.chains.values_mut() {
                chain.rpc_url.clone_from(&rpc_url);
            }
        }
        if let Ok(key) = std::env::var("PRIVATE_KEY") {
            self.signer_private_key = Some(key);
        }
    }

    /// RPC URL configured for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Config`] if the chain is missing or its URL is invalid.
    pub fn rpc_url(&self, chain_id: ChainId) -> Result<Url, WidgetError> {
        let network = caip2(chain_id);
        let chain = self
            .chains
            .get(&network)
            .ok_or_else(|| WidgetError::Config(format!("No RPC configured for {network}")))?;
        chain
            .rpc_url
            .parse()
            .map_err(|e| WidgetError::Config(format!("Invalid RPC URL for {network}: {e}")))
    }

    /// Chain ids with a valid CAIP-2 key.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<ChainId> {
        let mut ids: Vec<ChainId> = self.chains.keys().filter_map(|k| parse_caip2(k)).collect();
        ids.sort_unstable();
        ids
    }

    /// The wallet key, if it was resolved.
    ///
    /// Values still starting with `$` reference an unset variable.
    #[must_use]
    pub fn signer_private_key(&self) -> Option<&str> {
        self.signer_private_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.starts_with('$'))
    }

    /// Receipt settings for chain clients.
    #[must_use]
    pub const fn receipt_config(&self) -> ReceiptConfig {
        ReceiptConfig {
            confirmations: self.confirmations,
            timeout_secs: self.receipt_timeout_secs,
        }
    }

    /// Builds the project API client.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Api`] if `api_url` is not a valid URL.
    pub fn api_client(&self) -> Result<ProjectApiClient, WidgetError> {
        let client = ProjectApiClient::try_from(self.api_url.as_str())?
            .with_cache_ttl(Duration::from_secs(self.api_cache_ttl_secs));
        Ok(client)
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match lookup(&var_name).filter(|_| !var_name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced {
                    result.push('}');
                }
            }
        }
    }

    result
}
