//! In-memory host implementing every collaborator of the farm action.
//!
//! Holds token balances, reward pools, the deposit token registry and share
//! vaults in one cloneable value, so a snapshot is a clone and a revert is an
//! assignment.

pub mod staking;

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::{
    executor::action::{Checkpoint, EventLog},
    ledger::{ShareToken, StakingRewards, StakingRewardsRegistry, TokenLedger},
    utils::error::{arithmetic_err, rejected, ExecutorResult},
};

use self::staking::StakingPool;

/// An event emitted to the chain log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub emitter: Address,
    pub topic: B256,
    pub data: Bytes,
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryChain {
    /// Current timestamp in seconds
    now: u64,
    /// Balance per (token, owner)
    balances: HashMap<(Address, Address), U256>,
    /// Total supply per token
    supplies: HashMap<Address, U256>,
    /// Reward pools by pool address
    pools: HashMap<Address, StakingPool>,
    /// Reward pool by deposit token
    registry: HashMap<Address, Address>,
    /// Underlying token by share token
    shares: HashMap<Address, Address>,
    /// Emitted events, in order
    logs: Vec<LogEntry>,
}

impl InMemoryChain {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Moves the clock forward
    pub fn advance_time(&mut self, seconds: u64) -> &mut Self {
        self.now = self.now.saturating_add(seconds);
        self
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    /// Creates `amount` of `token` for `to`
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> ExecutorResult<()> {
        let supply = self
            .total_supply(token)
            .checked_add(amount)
            .ok_or_else(|| arithmetic_err("Total supply overflowed."))?;
        self.supplies.insert(token, supply);
        let balance = self.balance_of(token, to) + amount;
        self.balances.insert((token, to), balance);
        Ok(())
    }

    fn burn(&mut self, token: Address, from: Address, amount: U256) -> ExecutorResult<()> {
        let balance = self
            .balance_of(token, from)
            .checked_sub(amount)
            .ok_or_else(|| rejected("burn amount exceeds balance"))?;
        self.balances.insert((token, from), balance);
        let supply = self.total_supply(token) - amount;
        self.supplies.insert(token, supply);
        Ok(())
    }

    /// Deploys a reward pool at `pool` for `staking_token`, registers it and
    /// funds it from `funder` with the full emission of `reward_rate` over
    /// `duration` seconds.
    pub fn deploy_staking_rewards(
        &mut self,
        pool: Address,
        staking_token: Address,
        rewards_token: Address,
        reward_rate: U256,
        duration: u64,
        funder: Address,
    ) -> ExecutorResult<()> {
        let funding = reward_rate
            .checked_mul(U256::from(duration))
            .ok_or_else(|| arithmetic_err("Reward funding overflowed."))?;
        self.transfer(rewards_token, funder, pool, funding)?;
        self.pools.insert(
            pool,
            StakingPool::new(staking_token, rewards_token, reward_rate, self.now, duration),
        );
        self.registry.insert(staking_token, pool);
        Ok(())
    }

    /// Deploys a share token at `share` redeemable for `underlying`
    pub fn deploy_share_token(&mut self, share: Address, underlying: Address) -> &mut Self {
        self.shares.insert(share, underlying);
        self
    }

    /// Deposits `amount` of the underlying of `share` from `account` and mints
    /// it shares at the current vault rate. Returns the minted shares.
    pub fn enter(&mut self, share: Address, account: Address, amount: U256) -> ExecutorResult<U256> {
        let underlying = self.underlying(share)?;
        let total_shares = self.total_supply(share);
        let vault_balance = self.balance_of(underlying, share);

        let minted = if total_shares.is_zero() || vault_balance.is_zero() {
            amount
        } else {
            amount
                .checked_mul(total_shares)
                .map(|value| value / vault_balance)
                .ok_or_else(|| arithmetic_err("Share conversion overflowed."))?
        };

        self.transfer(underlying, account, share, amount)?;
        self.mint(share, account, minted)?;
        Ok(minted)
    }

    fn pool(&self, source: Address) -> ExecutorResult<&StakingPool> {
        self.pools
            .get(&source)
            .ok_or_else(|| rejected(format!("no staking rewards at {}", source)))
    }

    fn pool_mut(&mut self, source: Address) -> ExecutorResult<&mut StakingPool> {
        self.pools
            .get_mut(&source)
            .ok_or_else(|| rejected(format!("no staking rewards at {}", source)))
    }
}

impl TokenLedger for InMemoryChain {
    fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> ExecutorResult<()> {
        if to == Address::ZERO {
            return Err(rejected("transfer to the zero address"));
        }
        let from_balance = self
            .balance_of(token, from)
            .checked_sub(amount)
            .ok_or_else(|| rejected("transfer amount exceeds balance"))?;
        self.balances.insert((token, from), from_balance);
        let to_balance = self.balance_of(token, to) + amount;
        self.balances.insert((token, to), to_balance);
        Ok(())
    }
}

impl StakingRewards for InMemoryChain {
    fn rewards_token(&self, source: Address) -> ExecutorResult<Address> {
        Ok(self.pool(source)?.rewards_token)
    }

    fn staked_balance(&self, source: Address, account: Address) -> U256 {
        self.pools
            .get(&source)
            .map(|pool| pool.balance_of(account))
            .unwrap_or_default()
    }

    fn earned(&self, source: Address, account: Address) -> ExecutorResult<U256> {
        self.pool(source)?.earned(account, self.now)
    }

    fn stake(&mut self, source: Address, account: Address, amount: U256) -> ExecutorResult<()> {
        if amount.is_zero() {
            return Err(rejected("Cannot stake 0"));
        }
        let staking_token = self.pool(source)?.staking_token;
        self.transfer(staking_token, account, source, amount)?;

        let now = self.now;
        let pool = self.pool_mut(source)?;
        pool.update_reward(account, now)?;
        pool.record_stake(account, amount)
    }

    fn withdraw(&mut self, source: Address, account: Address, amount: U256) -> ExecutorResult<()> {
        if amount.is_zero() {
            return Err(rejected("Cannot withdraw 0"));
        }
        let now = self.now;
        let pool = self.pool_mut(source)?;
        if pool.balance_of(account) < amount {
            return Err(rejected("withdraw amount exceeds stake"));
        }
        pool.update_reward(account, now)?;
        pool.record_withdraw(account, amount)?;
        let staking_token = pool.staking_token;

        self.transfer(staking_token, source, account, amount)
    }

    fn get_reward(&mut self, source: Address, account: Address) -> ExecutorResult<()> {
        let now = self.now;
        let pool = self.pool_mut(source)?;
        pool.update_reward(account, now)?;
        let reward = pool.take_reward(account);
        let rewards_token = pool.rewards_token;

        if reward.is_zero() {
            return Ok(());
        }
        self.transfer(rewards_token, source, account, reward)
    }

    fn exit(&mut self, source: Address, account: Address) -> ExecutorResult<()> {
        let staked = self.pool(source)?.balance_of(account);
        self.withdraw(source, account, staked)?;
        self.get_reward(source, account)
    }
}

impl StakingRewardsRegistry for InMemoryChain {
    fn staking_rewards(&self, staking_token: Address) -> Option<Address> {
        self.registry.get(&staking_token).copied()
    }
}

impl ShareToken for InMemoryChain {
    fn underlying(&self, share: Address) -> ExecutorResult<Address> {
        self.shares
            .get(&share)
            .copied()
            .ok_or_else(|| rejected(format!("no share token at {}", share)))
    }

    fn share_to_underlying(&self, share: Address, amount: U256) -> ExecutorResult<U256> {
        let underlying = self.underlying(share)?;
        let total_shares = self.total_supply(share);
        if total_shares.is_zero() {
            return Err(arithmetic_err("Share supply is zero."));
        }
        amount
            .checked_mul(self.balance_of(underlying, share))
            .map(|value| value / total_shares)
            .ok_or_else(|| arithmetic_err("Share conversion overflowed."))
    }

    fn leave(&mut self, share: Address, account: Address, amount: U256) -> ExecutorResult<()> {
        let underlying = self.underlying(share)?;
        let redeemed = self.share_to_underlying(share, amount)?;
        self.burn(share, account, amount)?;
        self.transfer(underlying, share, account, redeemed)
    }
}

impl EventLog for InMemoryChain {
    fn emit(&mut self, emitter: Address, topic: B256, data: Vec<u8>) {
        self.logs.push(LogEntry {
            emitter,
            topic,
            data: Bytes::from(data),
        });
    }
}

impl Checkpoint for InMemoryChain {
    type Snapshot = InMemoryChain;

    fn snapshot(&self) -> Self::Snapshot {
        self.clone()
    }

    fn revert_to(&mut self, snapshot: Self::Snapshot) {
        *self = snapshot;
    }
}
