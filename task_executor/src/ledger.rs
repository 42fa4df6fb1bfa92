//! Interfaces of the external collaborators an action talks to.
//!
//! Every mutation names the account it acts for. Actions pass the account of
//! their `CallContext`, so balance changes land on the proxy that invoked the
//! executor and never on the action itself.

use alloy_primitives::{Address, U256};

use crate::utils::error::ExecutorResult;

/// Fungible token balances
pub trait TokenLedger {
    fn balance_of(&self, token: Address, owner: Address) -> U256;

    /// Moves `amount` of `token` from `from` to `to`. Fails instead of moving less.
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256)
        -> ExecutorResult<()>;
}

/// Staking reward pools, one per deposit token, addressed by the pool address
pub trait StakingRewards {
    /// Token the pool pays its rewards in
    fn rewards_token(&self, source: Address) -> ExecutorResult<Address>;

    /// Deposit tokens staked by `account`
    fn staked_balance(&self, source: Address, account: Address) -> U256;

    /// Reward accrued to `account` and not yet claimed
    fn earned(&self, source: Address, account: Address) -> ExecutorResult<U256>;

    /// Pulls `amount` of the deposit token from `account` into the pool
    fn stake(&mut self, source: Address, account: Address, amount: U256) -> ExecutorResult<()>;

    /// Returns `amount` of staked deposit tokens to `account`
    fn withdraw(&mut self, source: Address, account: Address, amount: U256) -> ExecutorResult<()>;

    /// Pays every accrued reward to `account`
    fn get_reward(&mut self, source: Address, account: Address) -> ExecutorResult<()>;

    /// Withdraws the whole stake of `account` and pays its reward
    fn exit(&mut self, source: Address, account: Address) -> ExecutorResult<()>;
}

/// Lookup of the reward pool serving a deposit token
pub trait StakingRewardsRegistry {
    fn staking_rewards(&self, staking_token: Address) -> Option<Address>;
}

/// Reward-bearing share token redeemable for its underlying token
pub trait ShareToken {
    fn underlying(&self, share: Address) -> ExecutorResult<Address>;

    /// Underlying amount `amount` shares redeem for at the current rate
    fn share_to_underlying(&self, share: Address, amount: U256) -> ExecutorResult<U256>;

    /// Burns `amount` shares of `account` and credits it the underlying
    fn leave(&mut self, share: Address, account: Address, amount: U256) -> ExecutorResult<()>;
}

/// Everything the farm action needs from its host
pub trait FarmHost: TokenLedger + StakingRewards + StakingRewardsRegistry + ShareToken {}

impl<T> FarmHost for T where T: TokenLedger + StakingRewards + StakingRewardsRegistry + ShareToken {}
