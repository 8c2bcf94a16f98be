//! Shared fixtures: an in-memory chain and a mocked project API.

use std::sync::Arc;

use accesstime::networks::{BASE_SEPOLIA, FACTORY_ADDRESS};
use accesstime::types::{DeploymentDetails, ExtraTimeTerms, PackageTerms};
use accesstime::wallet::WalletState;
use accesstime_evm::mock::MockChain;
use accesstime_http::ProjectApiClient;
use alloy_primitives::{Address, U256};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::session::Session;

pub(crate) const ACCESS_TIME: Address = Address::repeat_byte(0x11);
pub(crate) const USDC: Address = Address::repeat_byte(0x22);
pub(crate) const OWNER: Address = Address::repeat_byte(0xaa);
pub(crate) const PACKAGE_ID: u64 = 1;
pub(crate) const PACKAGE_TIME: u64 = 604_800;
/// 0.001 ETH per hour.
pub(crate) const NATIVE_RATE: u64 = 1_000_000_000_000_000;
/// 2 USDC per hour.
pub(crate) const USDC_RATE: u64 = 2_000_000;

pub(crate) struct TestBed {
    pub(crate) _server: MockServer,
    pub(crate) chain: Arc<MockChain>,
    pub(crate) api: ProjectApiClient,
}

fn chain(package_module: bool) -> MockChain {
    MockChain::new(BASE_SEPOLIA, OWNER)
        .with_deployment(
            FACTORY_ADDRESS,
            ACCESS_TIME,
            DeploymentDetails {
                status: true,
                id: U256::from(7),
                included_extra_time: package_module,
                included_package_module: true,
                name: "Demo".into(),
                description: "Demo project".into(),
                website: "https://example.com".into(),
            },
        )
        .with_token(USDC, Some("USDC"), Some(6))
        .with_rate(ACCESS_TIME, Address::ZERO, U256::from(NATIVE_RATE))
        .with_rate(ACCESS_TIME, USDC, U256::from(USDC_RATE))
        .with_package(
            ACCESS_TIME,
            U256::from(PACKAGE_ID),
            PackageTerms {
                time: U256::from(PACKAGE_TIME),
                available: true,
            },
        )
        .with_extra_time(
            ACCESS_TIME,
            U256::from(1),
            ExtraTimeTerms {
                limit: U256::from(86_400),
                percent: U256::from(10),
                available: true,
            },
        )
        .with_extra_time(
            ACCESS_TIME,
            U256::from(2),
            ExtraTimeTerms {
                limit: U256::from(604_800),
                percent: U256::from(20),
                available: true,
            },
        )
}

fn project_json() -> serde_json::Value {
    serde_json::json!({
        "id": ACCESS_TIME.to_string(),
        "extraTimes": ["1", "2"],
        "removedExtraTimes": [],
        "nextOwner": Address::ZERO.to_string(),
        "owner": OWNER.to_string(),
        "packages": [PACKAGE_ID.to_string()],
        "removedPackages": [],
        "paused": false,
        "paymentMethods": [Address::ZERO.to_string(), USDC.to_string()],
        "prevOwner": Address::ZERO.to_string()
    })
}

impl TestBed {
    pub(crate) async fn start(package_module: bool) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/project/{BASE_SEPOLIA}/7")))
            .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
            .mount(&server)
            .await;
        Self::with_server(server, package_module)
    }

    pub(crate) async fn start_without_api() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("unavailable"))
            .mount(&server)
            .await;
        Self::with_server(server, false)
    }

    fn with_server(server: MockServer, package_module: bool) -> Self {
        let api = ProjectApiClient::try_from(server.uri()).unwrap();
        Self {
            _server: server,
            chain: Arc::new(chain(package_module)),
            api,
        }
    }

    pub(crate) fn session(&self) -> Session<MockChain> {
        Session::new(Arc::clone(&self.chain), self.api.clone(), ACCESS_TIME)
    }

    pub(crate) fn wallet(&self) -> WalletState {
        WalletState::connected(OWNER, BASE_SEPOLIA)
    }
}
