//! Reward pool bookkeeping.
//!
//! Rewards stream at a fixed rate per second until the period finishes and are
//! shared pro rata between stakers through a reward-per-token accumulator
//! scaled by `SCALE`.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::{
    constants::scale,
    utils::error::{arithmetic_err, ExecutorResult},
};

#[derive(Clone, Debug)]
pub struct StakingPool {
    /// Deposit token accepted by the pool
    pub staking_token: Address,
    /// Token the rewards are paid in
    pub rewards_token: Address,
    /// Reward emitted per second across all stakers
    reward_rate: U256,
    /// Timestamp in seconds after which no more reward accrues
    period_finish: u64,
    /// Timestamp in seconds of the last accumulator update
    last_update_time: u64,
    reward_per_token_stored: U256,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    user_reward_per_token_paid: HashMap<Address, U256>,
    rewards: HashMap<Address, U256>,
}

impl StakingPool {
    pub fn new(
        staking_token: Address,
        rewards_token: Address,
        reward_rate: U256,
        start: u64,
        duration: u64,
    ) -> Self {
        Self {
            staking_token,
            rewards_token,
            reward_rate,
            period_finish: start.saturating_add(duration),
            last_update_time: start,
            reward_per_token_stored: U256::ZERO,
            total_supply: U256::ZERO,
            balances: HashMap::new(),
            user_reward_per_token_paid: HashMap::new(),
            rewards: HashMap::new(),
        }
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn last_time_reward_applicable(&self, now: u64) -> u64 {
        now.min(self.period_finish)
    }

    pub fn reward_per_token(&self, now: u64) -> ExecutorResult<U256> {
        if self.total_supply.is_zero() {
            return Ok(self.reward_per_token_stored);
        }

        let elapsed = U256::from(
            self.last_time_reward_applicable(now)
                .saturating_sub(self.last_update_time),
        );
        let accrued = elapsed
            .checked_mul(self.reward_rate)
            .and_then(|value| value.checked_mul(scale()))
            .ok_or_else(|| arithmetic_err("Reward per token overflowed."))?
            / self.total_supply;

        self.reward_per_token_stored
            .checked_add(accrued)
            .ok_or_else(|| arithmetic_err("Reward per token overflowed."))
    }

    pub fn earned(&self, account: Address, now: u64) -> ExecutorResult<U256> {
        let paid = self
            .user_reward_per_token_paid
            .get(&account)
            .copied()
            .unwrap_or_default();
        let pending = self
            .reward_per_token(now)?
            .checked_sub(paid)
            .ok_or_else(|| arithmetic_err("Reward per token went backwards."))?;
        let stored = self.rewards.get(&account).copied().unwrap_or_default();

        self.balance_of(account)
            .checked_mul(pending)
            .map(|value| value / scale())
            .and_then(|value| value.checked_add(stored))
            .ok_or_else(|| arithmetic_err("Earned reward overflowed."))
    }

    /// Settles the accumulator and the reward of `account` up to `now`
    pub fn update_reward(&mut self, account: Address, now: u64) -> ExecutorResult<()> {
        let reward_per_token = self.reward_per_token(now)?;
        let earned = self.earned(account, now)?;

        self.reward_per_token_stored = reward_per_token;
        self.last_update_time = self.last_time_reward_applicable(now);
        self.rewards.insert(account, earned);
        self.user_reward_per_token_paid
            .insert(account, reward_per_token);
        Ok(())
    }

    pub fn record_stake(&mut self, account: Address, amount: U256) -> ExecutorResult<()> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or_else(|| arithmetic_err("Stake overflowed."))?;
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| arithmetic_err("Total supply overflowed."))?;
        self.balances.insert(account, balance);
        Ok(())
    }

    pub fn record_withdraw(&mut self, account: Address, amount: U256) -> ExecutorResult<()> {
        let balance = self
            .balance_of(account)
            .checked_sub(amount)
            .ok_or_else(|| arithmetic_err("Withdraw amount exceeds the stake."))?;
        self.total_supply -= amount;
        self.balances.insert(account, balance);
        Ok(())
    }

    /// Clears and returns the settled reward of `account`
    pub fn take_reward(&mut self, account: Address) -> U256 {
        self.rewards.remove(&account).unwrap_or_default()
    }
}
