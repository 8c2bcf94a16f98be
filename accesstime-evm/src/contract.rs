//! Solidity interface definitions for on-chain interactions.
//!
//! - [`IAccessTimeFactory`] - deployment registry of AccessTime contracts
//! - [`IAccessTime`] - subscription contract: rates, packages, extra times, purchases
//! - [`IERC20`] - token metadata and allowance

use alloy_sol_types::sol;

sol! {
    /// Factory that deploys AccessTime contracts and records their modules.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IAccessTimeFactory {
        function deploymentDetails(address accessTime) external view returns (
            bool status,
            uint256 id,
            bool includedExtraTime,
            bool includedPackageModule,
            string name,
            string description,
            string website
        );
    }
}

sol! {
    /// Subscription contract.
    ///
    /// `tokenRates` is the price of one hour in the token's base units.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IAccessTime {
        function tokenRates(address paymentToken) external view returns (uint256);
        function packages(uint256 packageId) external view returns (uint256 time, bool available);
        function extras(uint256 extraTimeId) external view returns (uint256 limit, uint256 percent, bool available);
        function purchase(uint256 amount, address paymentToken) external payable;
        function purchasePackage(uint256 amount, address paymentToken, uint256 packageId) external payable;
    }
}

sol! {
    /// Minimal ERC-20 interface.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
