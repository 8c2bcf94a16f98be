//! In-memory [`AccessTimeChain`] for tests and offline previews.
//!
//! Reads are served from maps seeded with the builder methods. Sent calls
//! are recorded; ERC-20 `approve` calls also update the stored allowance,
//! so an approve-then-purchase flow can be replayed end to end.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use accesstime::chain::ChainId;
use accesstime::types::{DeploymentDetails, ExtraTimeTerms, PackageTerms};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;

use crate::contract::IERC20;
use crate::error::ChainError;
use crate::provider::{AccessTimeChain, ContractCall};

#[derive(Debug, Default)]
struct State {
    deployments: HashMap<(Address, Address), DeploymentDetails>,
    rates: HashMap<(Address, Address), U256>,
    packages: HashMap<(Address, U256), PackageTerms>,
    extras: HashMap<(Address, U256), ExtraTimeTerms>,
    allowances: HashMap<(Address, Address, Address), U256>,
    symbols: HashMap<Address, String>,
    decimals: HashMap<Address, u8>,
    sent: Vec<ContractCall>,
    reverting: bool,
    reads: usize,
}

/// In-memory chain whose transactions are signed by `sender`.
#[derive(Debug)]
pub struct MockChain {
    chain_id: ChainId,
    sender: Address,
    state: Mutex<State>,
}

impl MockChain {
    /// An empty chain.
    #[must_use]
    pub fn new(chain_id: ChainId, sender: Address) -> Self {
        Self {
            chain_id,
            sender,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a factory deployment.
    #[must_use]
    pub fn with_deployment(
        self,
        factory: Address,
        access_time: Address,
        details: DeploymentDetails,
    ) -> Self {
        self.state()
            .deployments
            .insert((factory, access_time), details);
        self
    }

    /// Sets the hourly rate of `token`.
    #[must_use]
    pub fn with_rate(self, access_time: Address, token: Address, rate: U256) -> Self {
        self.state().rates.insert((access_time, token), rate);
        self
    }

    /// Registers package terms.
    #[must_use]
    pub fn with_package(self, access_time: Address, id: U256, terms: PackageTerms) -> Self {
        self.state().packages.insert((access_time, id), terms);
        self
    }

    /// Registers extra-time terms.
    #[must_use]
    pub fn with_extra_time(self, access_time: Address, id: U256, terms: ExtraTimeTerms) -> Self {
        self.state().extras.insert((access_time, id), terms);
        self
    }

    /// Registers an ERC-20 token. `None` metadata makes that read fail.
    #[must_use]
    pub fn with_token(self, token: Address, symbol: Option<&str>, decimals: Option<u8>) -> Self {
        {
            let mut state = self.state();
            if let Some(symbol) = symbol {
                state.symbols.insert(token, symbol.to_owned());
            }
            if let Some(decimals) = decimals {
                state.decimals.insert(token, decimals);
            }
        }
        self
    }

    /// Sets an allowance.
    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state()
            .allowances
            .insert((token, owner, spender), amount);
    }

    /// Makes every later receipt report a revert.
    pub fn set_reverting(&self, reverting: bool) {
        self.state().reverting = reverting;
    }

    /// Calls sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<ContractCall> {
        self.state().sent.clone()
    }

    /// Number of read calls served.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.state().reads
    }

    fn read<T: Clone>(
        &self,
        what: &str,
        lookup: impl FnOnce(&State) -> Option<&T>,
    ) -> Result<T, ChainError> {
        let mut state = self.state();
        state.reads += 1;
        lookup(&*state)
            .cloned()
            .ok_or_else(|| ChainError::ContractCall(format!("execution reverted: {what}")))
    }
}

impl AccessTimeChain for MockChain {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn deployment_details(
        &self,
        factory: Address,
        access_time: Address,
    ) -> Result<DeploymentDetails, ChainError> {
        let mut state = self.state();
        state.reads += 1;
        Ok(state
            .deployments
            .get(&(factory, access_time))
            .cloned()
            .unwrap_or_default())
    }

    async fn token_rate(&self, access_time: Address, token: Address) -> Result<U256, ChainError> {
        let mut state = self.state();
        state.reads += 1;
        Ok(state
            .rates
            .get(&(access_time, token))
            .copied()
            .unwrap_or_default())
    }

    async fn package(
        &self,
        access_time: Address,
        package_id: U256,
    ) -> Result<PackageTerms, ChainError> {
        self.read("packages", |s| s.packages.get(&(access_time, package_id)))
    }

    async fn extra_time(
        &self,
        access_time: Address,
        extra_time_id: U256,
    ) -> Result<ExtraTimeTerms, ChainError> {
        self.read("extras", |s| s.extras.get(&(access_time, extra_time_id)))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainError> {
        let mut state = self.state();
        state.reads += 1;
        Ok(state
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        self.read("symbol", |s| s.symbols.get(&token))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.read("decimals", |s| s.decimals.get(&token))
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, ChainError> {
        let mut state = self.state();
        if call.calldata.starts_with(&IERC20::approveCall::SELECTOR) {
            let approve = IERC20::approveCall::abi_decode(&call.calldata)
                .map_err(|e| ChainError::ContractCall(e.to_string()))?;
            state
                .allowances
                .insert((call.to, self.sender, approve.spender), approve.amount);
        }
        state.sent.push(call);
        let nonce = u64::try_from(state.sent.len()).unwrap_or(u64::MAX);
        Ok(TxHash::left_padding_from(&nonce.to_be_bytes()))
    }

    async fn wait_for_receipt(&self, _hash: TxHash) -> Result<bool, ChainError> {
        Ok(!self.state().reverting)
    }
}
