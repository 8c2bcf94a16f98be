//! Chain reads feeding the widget.
//!
//! Reads are issued concurrently where they are independent, and token
//! metadata falls back to display defaults instead of failing the list.

use std::collections::HashMap;

use accesstime::networks::{DEFAULT_DECIMALS, chain_currency_decimals, chain_currency_symbol};
use accesstime::types::{ContractDetails, ExtraTimeTerms, PackageTerms, PaymentMethodOption};
use alloy_primitives::{Address, U256};
use futures_util::future::{join, join_all, try_join_all};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::error::ChainError;
use crate::provider::AccessTimeChain;

/// Symbol shown when a token's `symbol()` cannot be read.
pub const FALLBACK_SYMBOL: &str = "TKN";

/// Awaits a future, optionally instrumenting it with a tracing span.
macro_rules! traced {
    ($fut:expr, $span:expr) => {{
        #[cfg(feature = "telemetry")]
        {
            use tracing::Instrument;
            $fut.instrument($span).await
        }
        #[cfg(not(feature = "telemetry"))]
        {
            $fut.await
        }
    }};
}

/// Reads the factory deployment record of `access_time`.
///
/// # Errors
///
/// Returns [`ChainError`] if the factory call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), err))]
pub async fn read_contract_details<C: AccessTimeChain>(
    chain: &C,
    factory: Address,
    access_time: Address,
) -> Result<ContractDetails, ChainError> {
    let raw = chain.deployment_details(factory, access_time).await?;
    Ok(ContractDetails::from(raw))
}

/// Joins payment tokens with their symbol and decimals.
///
/// The zero address maps to the chain's native currency. Tokens whose
/// metadata cannot be read get [`FALLBACK_SYMBOL`] and 18 decimals.
pub async fn read_payment_method_options<C: AccessTimeChain>(
    chain: &C,
    methods: &[Address],
) -> Vec<PaymentMethodOption> {
    let chain_id = chain.chain_id();
    let options = methods.iter().map(|&address| async move {
        if address.is_zero() {
            return PaymentMethodOption {
                address,
                symbol: chain_currency_symbol(chain_id).to_owned(),
                decimals: chain_currency_decimals(chain_id),
            };
        }
        let (symbol, decimals) =
            join(chain.token_symbol(address), chain.token_decimals(address)).await;
        PaymentMethodOption {
            address,
            symbol: symbol.unwrap_or_else(|_| FALLBACK_SYMBOL.to_owned()),
            decimals: decimals.unwrap_or(DEFAULT_DECIMALS),
        }
    });
    traced!(
        join_all(options),
        tracing::info_span!(
            "accesstime.read_payment_method_options",
            chain_id,
            count = methods.len()
        )
    )
}

/// Reads the hourly rate of each token.
///
/// A token whose rate cannot be read is priced at zero, which leaves its
/// quote uncalculated.
pub async fn read_token_rates<C: AccessTimeChain>(
    chain: &C,
    access_time: Address,
    tokens: &[Address],
) -> HashMap<Address, U256> {
    let rates = join_all(tokens.iter().map(|&token| async move {
        let rate = chain.token_rate(access_time, token).await;
        #[cfg(feature = "telemetry")]
        if let Err(e) = &rate {
            tracing::warn!(%token, error = %e, "Failed to read token rate");
        }
        (token, rate.unwrap_or_default())
    }));
    let rates = traced!(
        rates,
        tracing::info_span!("accesstime.read_token_rates", %access_time, count = tokens.len())
    );
    rates.into_iter().collect()
}

/// Reads the terms of one package.
///
/// # Errors
///
/// Returns [`ChainError`] if the call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), err))]
pub async fn read_package<C: AccessTimeChain>(
    chain: &C,
    access_time: Address,
    package_id: U256,
) -> Result<PackageTerms, ChainError> {
    chain.package(access_time, package_id).await
}

/// Reads the terms of each extra-time rule, in the order of `ids`.
///
/// # Errors
///
/// Returns the first [`ChainError`] among the reads.
pub async fn read_extra_times<C: AccessTimeChain>(
    chain: &C,
    access_time: Address,
    ids: &[U256],
) -> Result<Vec<ExtraTimeTerms>, ChainError> {
    let terms = try_join_all(ids.iter().map(|&id| chain.extra_time(access_time, id)));
    traced!(
        terms,
        tracing::info_span!("accesstime.read_extra_times", %access_time, count = ids.len())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChain;
    use accesstime::networks::{BASE_SEPOLIA, FACTORY_ADDRESS};
    use accesstime::types::DeploymentDetails;

    const ACCESS_TIME: Address = Address::repeat_byte(0x11);
    const USDC: Address = Address::repeat_byte(0x22);
    const BROKEN: Address = Address::repeat_byte(0x33);
    const SENDER: Address = Address::repeat_byte(0xaa);

    fn chain() -> MockChain {
        MockChain::new(BASE_SEPOLIA, SENDER)
            .with_deployment(
                FACTORY_ADDRESS,
                ACCESS_TIME,
                DeploymentDetails {
                    status: true,
                    id: U256::from(7),
                    included_extra_time: false,
                    included_package_module: true,
                    name: "Demo".into(),
                    description: "Demo project".into(),
                    website: "https://example.com".into(),
                },
            )
            .with_token(USDC, Some("USDC"), Some(6))
            .with_token(BROKEN, None, None)
            .with_rate(ACCESS_TIME, Address::ZERO, U256::from(1_000))
            .with_rate(ACCESS_TIME, USDC, U256::from(2_000_000))
    }

    #[tokio::test]
    async fn test_read_contract_details() {
        let chain = chain();
        let details = read_contract_details(&chain, FACTORY_ADDRESS, ACCESS_TIME)
            .await
            .unwrap();
        assert!(details.deployed);
        assert_eq!(details.access_time_id, Some(U256::from(7)));
        assert_eq!(details.extra_time_module, Some(true));
        assert_eq!(details.package_module, Some(false));
        assert_eq!(details.name.as_deref(), Some("Demo"));
    }

    #[tokio::test]
    async fn test_read_contract_details_not_deployed() {
        let chain = chain();
        let details = read_contract_details(&chain, FACTORY_ADDRESS, Address::repeat_byte(0x99))
            .await
            .unwrap();
        assert_eq!(details, ContractDetails::not_deployed());
    }

    #[tokio::test]
    async fn test_payment_method_options_fallbacks() {
        let chain = chain();
        let options = read_payment_method_options(&chain, &[Address::ZERO, USDC, BROKEN]).await;
        assert_eq!(options.len(), 3);
        assert!(options[0].is_native());
        assert_eq!(options[0].symbol, "ETH");
        assert_eq!(options[0].decimals, 18);
        assert_eq!(options[1].symbol, "USDC");
        assert_eq!(options[1].decimals, 6);
        assert_eq!(options[2].symbol, FALLBACK_SYMBOL);
        assert_eq!(options[2].decimals, DEFAULT_DECIMALS);
    }

    #[tokio::test]
    async fn test_read_token_rates() {
        let chain = chain();
        let rates = read_token_rates(&chain, ACCESS_TIME, &[Address::ZERO, USDC, BROKEN]).await;
        assert_eq!(rates[&Address::ZERO], U256::from(1_000));
        assert_eq!(rates[&USDC], U256::from(2_000_000));
        assert_eq!(rates[&BROKEN], U256::ZERO);
    }

    #[tokio::test]
    async fn test_read_extra_times_keeps_order() {
        let first = ExtraTimeTerms {
            limit: U256::from(3600),
            percent: U256::from(10),
            available: true,
        };
        let second = ExtraTimeTerms {
            limit: U256::from(86_400),
            percent: U256::from(20),
            available: false,
        };
        let chain = chain()
            .with_extra_time(ACCESS_TIME, U256::from(1), first)
            .with_extra_time(ACCESS_TIME, U256::from(2), second);
        let terms = read_extra_times(&chain, ACCESS_TIME, &[U256::from(2), U256::from(1)])
            .await
            .unwrap();
        assert_eq!(terms, vec![second, first]);

        let err = read_extra_times(&chain, ACCESS_TIME, &[U256::from(3)])
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::ContractCall(_)));
    }

    #[tokio::test]
    async fn test_read_package() {
        let terms = PackageTerms {
            time: U256::from(604_800),
            available: true,
        };
        let chain = chain().with_package(ACCESS_TIME, U256::from(4), terms);
        let read = read_package(&chain, ACCESS_TIME, U256::from(4)).await.unwrap();
        assert_eq!(read, terms);
    }
}
