//! Yield farming action.
//!
//! Runs in the account of whoever invoked the executor: every stake, claim and
//! redemption lands on `ctx.account`. The action itself holds no balances, only
//! the fee configuration and the address of the share token it redeems.

use std::cell::RefCell;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolInterface};
use tracing::{debug, info};

use crate::{
    executor::action::Action,
    ledger::{FarmHost, StakingRewardsRegistry},
    types::{
        CallContext, FarmInitArgs,
        IFarmAction::{
            dQuickLeaveCall, exitCall, getRewardAndChargeCall, getRewardCall, stakeCall,
            IFarmActionCalls,
        },
    },
    utils::{
        common::{balance_delta, string_to_address},
        error::{arithmetic_err, ExecutorError, ExecutorResult},
    },
};

use super::fee::{FeeConfig, FeeConfigQuery};

pub struct FarmAction {
    /// Harvest fee settings, changed only by the owner
    fee: RefCell<FeeConfig>,
    /// Share token redeemed by `dquick_leave`
    share_token: Address,
}

impl FarmAction {
    pub fn new(fee: FeeConfig, share_token: Address) -> Self {
        Self {
            fee: RefCell::new(fee),
            share_token,
        }
    }

    pub fn owner(&self) -> Address {
        self.fee.borrow().owner
    }

    pub fn collector(&self) -> Address {
        self.fee.borrow().collector
    }

    pub fn harvest_fee(&self) -> U256 {
        self.fee.borrow().harvest_fee
    }

    pub fn fee_base(&self) -> U256 {
        self.fee.borrow().fee_base
    }

    pub fn share_token(&self) -> Address {
        self.share_token
    }

    pub fn fee_config(&self) -> FeeConfigQuery {
        FeeConfigQuery::from(&*self.fee.borrow())
    }

    pub fn set_harvest_fee(&self, sender: Address, fee: U256) -> ExecutorResult<()> {
        self.fee.borrow_mut().set_harvest_fee(sender, fee)?;
        info!(%fee, "harvest fee updated");
        Ok(())
    }

    pub fn set_collector(&self, sender: Address, collector: Address) -> ExecutorResult<()> {
        self.fee.borrow_mut().set_collector(sender, collector)?;
        info!(%collector, "fee collector updated");
        Ok(())
    }

    /// Stakes `amount` of the caller's `lp_token` into its reward pool.
    pub fn stake<H: FarmHost>(
        &self,
        host: &mut H,
        ctx: &CallContext,
        lp_token: Address,
        amount: U256,
    ) -> ExecutorResult<()> {
        if amount.is_zero() {
            return Err(ExecutorError::ZeroAmount("stake: zero amount".to_string()));
        }
        let staking_rewards = staking_rewards_contract(host, lp_token)?;

        host.stake(staking_rewards, ctx.account, amount)
            .map_err(|err| err.within("stake"))?;

        debug!(account = %ctx.account, %lp_token, %amount, "staked");
        Ok(())
    }

    /// Claims the caller's whole reward and returns the claimed amount.
    pub fn get_reward<H: FarmHost>(
        &self,
        host: &mut H,
        ctx: &CallContext,
        lp_token: Address,
    ) -> ExecutorResult<U256> {
        let staking_rewards = staking_rewards_contract(host, lp_token)?;
        let reward = claim_reward(host, staking_rewards, ctx.account)
            .map_err(|err| err.within("getReward"))?;

        debug!(account = %ctx.account, %lp_token, %reward, "reward claimed");
        Ok(reward)
    }

    /// Claims the caller's whole reward, sends the harvest fee to the collector
    /// and returns what is left to the caller.
    pub fn get_reward_and_charge<H: FarmHost>(
        &self,
        host: &mut H,
        ctx: &CallContext,
        lp_token: Address,
    ) -> ExecutorResult<U256> {
        let staking_rewards = staking_rewards_contract(host, lp_token)?;
        let reward = claim_reward(host, staking_rewards, ctx.account)
            .map_err(|err| err.within("getRewardAndCharge"))?;

        let (split, collector) = {
            let fee = self.fee.borrow();
            (fee.split(reward), fee.collector)
        };
        let split = split.map_err(|err| err.within("getRewardAndCharge"))?;

        if !split.collector_share.is_zero() {
            let rewards_token = host
                .rewards_token(staking_rewards)
                .map_err(|err| err.within("getRewardAndCharge"))?;
            host.transfer(rewards_token, ctx.account, collector, split.collector_share)
                .map_err(|err| err.within("getRewardAndCharge"))?;
        }

        info!(
            account = %ctx.account,
            %lp_token,
            total = %split.total,
            collector_share = %split.collector_share,
            user_share = %split.user_share,
            "reward claimed and charged"
        );
        Ok(split.user_share)
    }

    /// Redeems `amount` of the share token for its underlying and returns the
    /// underlying amount credited to the caller.
    pub fn dquick_leave<H: FarmHost>(
        &self,
        host: &mut H,
        ctx: &CallContext,
        amount: U256,
    ) -> ExecutorResult<U256> {
        if amount.is_zero() {
            return Err(ExecutorError::ZeroAmount("dQuickLeave: zero amount".to_string()));
        }
        let underlying = host
            .underlying(self.share_token)
            .map_err(|err| err.within("dQuickLeave"))?;

        let before = host.balance_of(underlying, ctx.account);
        host.leave(self.share_token, ctx.account, amount)
            .map_err(|err| err.within("dQuickLeave"))?;
        let redeemed = balance_delta(before, host.balance_of(underlying, ctx.account))
            .map_err(|err| err.within("dQuickLeave"))?;

        debug!(account = %ctx.account, shares = %amount, %redeemed, "shares redeemed");
        Ok(redeemed)
    }

    /// Withdraws the caller's whole stake and claims its reward.
    /// Returns `(withdrawn, reward)`.
    pub fn exit<H: FarmHost>(
        &self,
        host: &mut H,
        ctx: &CallContext,
        lp_token: Address,
    ) -> ExecutorResult<(U256, U256)> {
        let staking_rewards = staking_rewards_contract(host, lp_token)?;
        let rewards_token = host
            .rewards_token(staking_rewards)
            .map_err(|err| err.within("exit"))?;

        let staked = host.staked_balance(staking_rewards, ctx.account);
        let lp_before = host.balance_of(lp_token, ctx.account);
        let reward_before = host.balance_of(rewards_token, ctx.account);
        host.exit(staking_rewards, ctx.account)
            .map_err(|err| err.within("exit"))?;

        let lp_received = balance_delta(lp_before, host.balance_of(lp_token, ctx.account))
            .map_err(|err| err.within("exit"))?;
        let (withdrawn, reward) = if rewards_token == lp_token {
            // Single-asset pools pay the stake and the reward in the same token
            let reward = lp_received
                .checked_sub(staked)
                .ok_or_else(|| arithmetic_err("exit: received less than the stake"))?;
            (staked, reward)
        } else {
            let reward = balance_delta(reward_before, host.balance_of(rewards_token, ctx.account))
                .map_err(|err| err.within("exit"))?;
            (lp_received, reward)
        };

        debug!(account = %ctx.account, %lp_token, %withdrawn, %reward, "exited");
        Ok((withdrawn, reward))
    }
}

impl TryFrom<FarmInitArgs> for FarmAction {
    type Error = ExecutorError;

    fn try_from(value: FarmInitArgs) -> Result<Self, Self::Error> {
        let fee = FeeConfig::try_from(&value)?;
        let share_token = string_to_address(value.share_token)?;
        Ok(Self::new(fee, share_token))
    }
}

impl<H: FarmHost> Action<H> for FarmAction {
    fn name(&self) -> &'static str {
        "FarmAction"
    }

    fn delegate_call(
        &self,
        host: &mut H,
        ctx: &CallContext,
        payload: &[u8],
    ) -> ExecutorResult<Bytes> {
        let call = IFarmActionCalls::abi_decode(payload, true)
            .map_err(|err| ExecutorError::DecodingError(err.to_string()))?;

        let data = match call {
            IFarmActionCalls::stake(args) => {
                self.stake(host, ctx, args.lpToken, args.amount)?;
                stakeCall::abi_encode_returns(&())
            }
            IFarmActionCalls::getReward(args) => {
                let reward = self.get_reward(host, ctx, args.lpToken)?;
                getRewardCall::abi_encode_returns(&(reward,))
            }
            IFarmActionCalls::getRewardAndCharge(args) => {
                let reward = self.get_reward_and_charge(host, ctx, args.lpToken)?;
                getRewardAndChargeCall::abi_encode_returns(&(reward,))
            }
            IFarmActionCalls::dQuickLeave(args) => {
                let redeemed = self.dquick_leave(host, ctx, args.dQuickAmount)?;
                dQuickLeaveCall::abi_encode_returns(&(redeemed,))
            }
            IFarmActionCalls::exit(args) => {
                let (withdrawn, reward) = self.exit(host, ctx, args.lpToken)?;
                exitCall::abi_encode_returns(&(withdrawn, reward))
            }
        };

        Ok(Bytes::from(data))
    }
}

/// Resolves the reward pool of `lp_token`.
fn staking_rewards_contract<H: StakingRewardsRegistry>(
    host: &H,
    lp_token: Address,
) -> ExecutorResult<Address> {
    host.staking_rewards(lp_token)
        .filter(|staking_rewards| *staking_rewards != Address::ZERO)
        .ok_or_else(|| {
            ExecutorError::SourceNotFound(
                "_getStakingRewardsContract: StakingRewards contract not found".to_string(),
            )
        })
}

/// Claims the reward of `account` and returns the amount it was credited.
fn claim_reward<H: FarmHost>(
    host: &mut H,
    staking_rewards: Address,
    account: Address,
) -> ExecutorResult<U256> {
    let rewards_token = host.rewards_token(staking_rewards)?;
    let before = host.balance_of(rewards_token, account);
    host.get_reward(staking_rewards, account)?;
    balance_delta(before, host.balance_of(rewards_token, account))
}
