//! Data model shared by the chain readers, the project API and the widget.

use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

/// Raw result of the factory's `deploymentDetails(address)` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentDetails {
    /// Whether the address was deployed by the factory.
    pub status: bool,
    /// Numeric AccessTime id assigned by the factory.
    pub id: U256,
    /// Tuple index 2, read as the package module flag.
    pub included_extra_time: bool,
    /// Tuple index 3, read as the extra-time module flag.
    pub included_package_module: bool,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Project website.
    pub website: String,
}

/// Deployment metadata of an AccessTime contract.
///
/// Every optional field is `None` when the contract is not a factory deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    /// The contract was deployed by the factory.
    pub deployed: bool,
    /// Numeric id used by the project API.
    pub access_time_id: Option<U256>,
    /// Packages replace free-form durations.
    pub package_module: Option<bool>,
    /// Extra time is awarded above thresholds.
    pub extra_time_module: Option<bool>,
    /// Display name.
    pub name: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Project website.
    pub website: Option<String>,
}

impl ContractDetails {
    /// Details of an address that is not a factory deployment.
    #[must_use]
    pub fn not_deployed() -> Self {
        Self::default()
    }

    /// `true` when deployed with the package module enabled.
    #[must_use]
    pub fn has_package_module(&self) -> bool {
        self.deployed && self.package_module == Some(true)
    }
}

impl From<DeploymentDetails> for ContractDetails {
    fn from(raw: DeploymentDetails) -> Self {
        if !raw.status {
            return Self::not_deployed();
        }
        Self {
            deployed: true,
            access_time_id: Some(raw.id),
            // Module flags are taken by tuple position: index 2 gates
            // packages, index 3 gates extra time.
            package_module: Some(raw.included_extra_time),
            extra_time_module: Some(raw.included_package_module),
            name: Some(raw.name),
            description: Some(raw.description),
            website: Some(raw.website),
        }
    }
}

/// Project record served by `GET /project/{chainId}/{id}`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    /// AccessTime contract address.
    pub id: Address,
    /// Active extra-time ids.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub extra_times: Vec<U256>,
    /// Extra-time ids that were removed.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub removed_extra_times: Vec<U256>,
    /// Pending owner during an ownership transfer.
    #[serde(default)]
    pub next_owner: Option<Address>,
    /// Current owner.
    #[serde(default)]
    pub owner: Option<Address>,
    /// Active package ids.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub packages: Vec<U256>,
    /// Package ids that were removed.
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub removed_packages: Vec<U256>,
    /// Purchases are paused.
    #[serde(default)]
    pub paused: bool,
    /// Accepted payment tokens; the zero address is the native currency.
    #[serde(default)]
    pub payment_methods: Vec<Address>,
    /// Previous owner.
    #[serde(default)]
    pub prev_owner: Option<Address>,
}

impl ProjectDetails {
    /// Returns `true` if `package_id` is an active package.
    #[must_use]
    pub fn has_package(&self, package_id: U256) -> bool {
        self.packages.contains(&package_id)
    }

    /// Returns `true` if `token` is an accepted payment method.
    #[must_use]
    pub fn has_payment_method(&self, token: Address) -> bool {
        self.payment_methods.contains(&token)
    }
}

/// A payment token joined with its on-chain metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodOption {
    /// Token address; zero for the native currency.
    pub address: Address,
    /// Display symbol.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u8,
}

impl PaymentMethodOption {
    /// `true` for the chain's native currency.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.address.is_zero()
    }
}

/// Terms of a package as stored by the AccessTime contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageTerms {
    /// Package duration in seconds.
    pub time: U256,
    /// Whether the package can still be purchased.
    pub available: bool,
}

impl PackageTerms {
    /// Duration in seconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn time_secs(&self) -> u64 {
        u64::try_from(self.time).unwrap_or(u64::MAX)
    }
}

/// Terms of an extra-time rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtraTimeTerms {
    /// Minimum purchased duration in seconds.
    pub limit: U256,
    /// Bonus as a percentage of the purchased duration.
    pub percent: U256,
    /// Whether the rule is active.
    pub available: bool,
}

/// What a tracked transaction does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// ERC-20 `approve`.
    Approve,
    /// `purchase` or `purchasePackage`.
    Purchase,
}

/// Lifecycle of a tracked transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Submitted, receipt not yet seen.
    Pending,
    /// Mined successfully.
    Confirmed,
    /// Mined but reverted.
    Reverted,
}

/// A submitted transaction awaiting its receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    /// Transaction hash.
    pub hash: TxHash,
    /// What the transaction does.
    pub kind: TransactionKind,
    /// Current status.
    pub status: TransactionStatus,
}

impl PendingTransaction {
    /// A freshly submitted transaction.
    #[must_use]
    pub const fn submitted(hash: TxHash, kind: TransactionKind) -> Self {
        Self {
            hash,
            kind,
            status: TransactionStatus::Pending,
        }
    }

    /// Resolves the transaction from its receipt status.
    #[must_use]
    pub const fn resolve(self, success: bool) -> Self {
        Self {
            status: if success {
                TransactionStatus::Confirmed
            } else {
                TransactionStatus::Reverted
            },
            ..self
        }
    }

    /// `true` while no receipt has been observed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}
