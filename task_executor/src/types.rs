use alloy_primitives::Address;
use alloy_sol_types::sol;
use candid::{CandidType, Nat};
use serde::{Deserialize, Serialize};

/// The identities an action runs under.
/// `account` is the proxy whose balances and positions are touched,
/// `sender` is whoever instructed the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub account: Address,
}

impl CallContext {
    pub fn new(sender: Address, account: Address) -> Self {
        Self { sender, account }
    }
}

/// Farm action init arguments
#[derive(CandidType, Clone, Debug, Serialize, Deserialize)]
pub struct FarmInitArgs {
    /// Identity allowed to change the fee configuration
    pub owner: String,
    /// Identity receiving the harvest fee
    pub collector: String,
    /// Harvest fee in basis points of `FEE_BASE`
    pub harvest_fee: Nat,
    /// Reward-bearing share token redeemed by `dQuickLeave`
    pub share_token: String,
}

sol!(
    // Farm action
    interface IFarmAction {
        function stake(address lpToken, uint256 amount) external payable;
        function getReward(address lpToken) external payable returns (uint256);
        function getRewardAndCharge(address lpToken) external payable returns (uint256);
        function dQuickLeave(uint256 dQuickAmount) external payable returns (uint256);
        function exit(address lpToken) external payable returns (uint256, uint256);
    }

    // Task executor
    interface ITaskExecutor {
        function execute(address to, bytes data) external payable returns (bytes memory);
        function batchExec(address[] tos, bytes32[] configs, bytes[] datas) external payable returns (bytes[] memory);
    }

    event RecordActionResult(bytes data);
);
