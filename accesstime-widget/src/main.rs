//! Command-line host for AccessTime subscriptions.
//!
//! Drives the same card/button controllers a UI would, against a live RPC
//! node and the project API, and prints views as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Show what the card would render for a contract
//! cargo run -p accesstime-widget --features bin -- --access-time 0x... status
//!
//! # Quote one day paid in a token
//! cargo run -p accesstime-widget --features bin -- --access-time 0x... quote --time 86400 --token 0x...
//!
//! # Approve if needed, then buy one week
//! PRIVATE_KEY=0x... cargo run -p accesstime-widget --features bin -- --access-time 0x... subscribe --time 604800
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `accesstime.toml`)
//! - `API_URL` - Override the project API base URL
//! - `RPC_URL` - Override the RPC endpoint of every configured chain
//! - `PRIVATE_KEY` - Wallet key used to sign approvals and purchases
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::sync::Arc;

use accesstime::networks::BASE_SEPOLIA;
use accesstime::types::{TransactionKind, TransactionStatus};
use accesstime::view::BoxConfig;
use accesstime::wallet::WalletState;
use accesstime_evm::AlloyChain;
use accesstime_http::ProjectApiClient;
use accesstime_widget::button::SubscriptionButton;
use accesstime_widget::{AccessTimeWidget, ClickOutcome, SubscriptionCard, WidgetConfig};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// AccessTime subscription host.
#[derive(Debug, Parser)]
#[command(name = "accesstime", version, about)]
struct Cli {
    /// Chain of the AccessTime contract.
    #[arg(long, env = "CHAIN_ID", default_value_t = BASE_SEPOLIA)]
    chain_id: u64,

    /// AccessTime contract address.
    #[arg(long, env = "ACCESS_TIME")]
    access_time: Address,

    /// Sell this package instead of free-form time.
    #[arg(long)]
    package_id: Option<U256>,

    /// Account to inspect when no private key is configured.
    #[arg(long, env = "ACCOUNT")]
    account: Option<Address>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the card view.
    Status,
    /// Print the payment required for a duration.
    Quote {
        /// Duration in seconds.
        #[arg(long, default_value_t = 3600)]
        time: u64,
        /// Payment token; the first accepted method when omitted.
        #[arg(long)]
        token: Option<Address>,
    },
    /// Approve if needed, then purchase.
    Subscribe {
        /// Duration in seconds.
        #[arg(long, default_value_t = 3600)]
        time: u64,
        /// Payment token; the first accepted method when omitted.
        #[arg(long)]
        token: Option<Address>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput {
    time_amount: Option<u64>,
    time: String,
    extra_time: String,
    payment_token: Option<Address>,
    amount: U256,
    display: String,
    symbol: String,
    approve_required: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("accesstime failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = WidgetConfig::load()?;
    let rpc_url = config.rpc_url(cli.chain_id)?;
    let api = config.api_client()?;
    tracing::info!(
        chain_id = cli.chain_id,
        access_time = %cli.access_time,
        api_url = %api.base_url(),
        "Loaded configuration"
    );

    match config.signer_private_key() {
        Some(key) => {
            let signer: PrivateKeySigner = key
                .parse()
                .map_err(|e| format!("Invalid private key: {e}"))?;
            let account = signer.address();
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(rpc_url);
            execute(provider, api, &config, &cli, Some(account)).await
        }
        None => {
            if let Some(reason) = missing_wallet(&cli.command, cli.account) {
                return Err(reason.into());
            }
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            execute(provider, api, &config, &cli, cli.account).await
        }
    }
}

/// Why `command` cannot run without a signer, given the `--account` flag.
fn missing_wallet(command: &Command, account: Option<Address>) -> Option<&'static str> {
    match command {
        Command::Subscribe { .. } => Some("subscribe needs PRIVATE_KEY or signer_private_key"),
        Command::Quote { .. } if account.is_none() => Some("quote needs --account or PRIVATE_KEY"),
        Command::Quote { .. } | Command::Status => None,
    }
}

async fn execute<P: Provider + Send + Sync>(
    provider: P,
    api: ProjectApiClient,
    config: &WidgetConfig,
    cli: &Cli,
    account: Option<Address>,
) -> Result<(), Box<dyn std::error::Error>> {
    let wallet_chain = provider.get_chain_id().await?;
    let chain = AlloyChain::new(provider, cli.chain_id).with_receipt_config(config.receipt_config());
    let widget = AccessTimeWidget::new(Arc::new(chain), api);
    if let Some(account) = account {
        widget.set_wallet(WalletState::connected(account, wallet_chain));
    }

    let mut card = widget.card(cli.access_time, cli.package_id, BoxConfig::ChildComponent);
    if let Err(e) = card.sync().await {
        tracing::warn!(error = %e, "Refresh failed");
    }

    match cli.command {
        Command::Status => print_json(&card.view()),
        Command::Quote { time, token } => {
            select(card.button_mut(), time, token).await?;
            let button = card.button();
            let quote = button.quote();
            print_json(&QuoteOutput {
                time_amount: button.time_amount(),
                time: accesstime::humanize::humanize_optional(button.time_amount()),
                extra_time: accesstime::humanize::humanize_optional(button.extra_time()),
                payment_token: button.selected(),
                amount: quote.amount,
                display: accesstime::amount::display_amount(quote.amount, quote.decimals),
                symbol: quote.symbol,
                approve_required: button.allowance().approve_required().status,
            })
        }
        Command::Subscribe { time, token } => {
            select(card.button_mut(), time, token).await?;
            subscribe(&mut card).await
        }
    }
}

async fn select<C: accesstime_evm::AccessTimeChain>(
    button: &mut SubscriptionButton<C>,
    time: u64,
    token: Option<Address>,
) -> Result<(), Box<dyn std::error::Error>> {
    if button.package_id().is_none() && button.time_amount() != Some(time) {
        button.open_custom_time()?;
        button.set_custom_time(time)?;
    }
    if let Some(token) = token {
        button.select_payment_method(token).await?;
    }
    Ok(())
}

async fn subscribe<C: accesstime_evm::AccessTimeChain>(
    card: &mut SubscriptionCard<C>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match card.click().await? {
            ClickOutcome::Submitted(tx) => {
                tracing::info!(hash = %tx.hash, kind = ?tx.kind, "Waiting for receipt");
                let Some(tx) = card.button_mut().wait_for_confirmation().await? else {
                    continue;
                };
                if tx.status == TransactionStatus::Reverted {
                    return Err(format!("Transaction {} reverted", tx.hash).into());
                }
                if tx.kind == TransactionKind::Purchase {
                    return print_json(&tx);
                }
            }
            ClickOutcome::ConnectWallet => return Err("No wallet connected".into()),
            ClickOutcome::SwitchNetwork(chain_id) => {
                return Err(format!("RPC endpoint is not on chain {chain_id}").into());
            }
            ClickOutcome::Ignored => {
                return Err(format!("Cannot subscribe: {}", card.view().button.label()).into());
            }
        }
    }
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_TIME: &str = "0x1111111111111111111111111111111111111111";

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["accesstime", "--access-time", ACCESS_TIME];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_quote_requires_account_without_signer() {
        let cli = parse(&["quote", "--time", "86400"]);
        assert_eq!(
            missing_wallet(&cli.command, cli.account),
            Some("quote needs --account or PRIVATE_KEY")
        );

        let cli = parse(&["--account", ACCESS_TIME, "quote"]);
        assert_eq!(missing_wallet(&cli.command, cli.account), None);
    }

    #[test]
    fn test_subscribe_requires_signer() {
        let cli = parse(&["--account", ACCESS_TIME, "subscribe"]);
        assert!(missing_wallet(&cli.command, cli.account).is_some());
    }

    #[test]
    fn test_status_runs_read_only() {
        let cli = parse(&["status"]);
        assert_eq!(missing_wallet(&cli.command, cli.account), None);
    }
}
