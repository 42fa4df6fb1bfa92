//! Harvest fee configuration and reward splitting

use alloy_primitives::{Address, U256};
use candid::{CandidType, Nat};
use serde::{Deserialize, Serialize};

use crate::{
    constants::fee_base,
    types::FarmInitArgs,
    utils::{
        common::{nat_to_u256, string_to_address, u256_to_nat},
        error::{arithmetic_err, ExecutorError, ExecutorResult},
    },
};

/// Who may change the fee, who receives it, and how large it is
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeConfig {
    /// Identity allowed to change the configuration
    pub owner: Address,
    /// Identity receiving the harvest fee
    pub collector: Address,
    /// Fee charged on claimed rewards, in units of `fee_base`
    pub harvest_fee: U256,
    /// Scale of `harvest_fee`
    pub fee_base: U256,
}

impl FeeConfig {
    /// Creates a config on the default `FEE_BASE` scale
    pub fn new(owner: Address, collector: Address, harvest_fee: U256) -> ExecutorResult<Self> {
        Self::with_fee_base(owner, collector, harvest_fee, fee_base())
    }

    pub fn with_fee_base(
        owner: Address,
        collector: Address,
        harvest_fee: U256,
        fee_base: U256,
    ) -> ExecutorResult<Self> {
        if fee_base.is_zero() {
            return Err(ExecutorError::InvalidFee("Fee base is zero".to_string()));
        }
        validate_collector(collector)?;
        let config = Self {
            owner,
            collector,
            harvest_fee,
            fee_base,
        };
        config.validate_fee(harvest_fee)?;
        Ok(config)
    }

    fn validate_fee(&self, fee: U256) -> ExecutorResult<()> {
        if fee > self.fee_base {
            return Err(ExecutorError::InvalidFee(format!(
                "Harvest fee {} exceeds fee base {}",
                fee, self.fee_base
            )));
        }
        Ok(())
    }

    fn only_owner(&self, sender: Address) -> ExecutorResult<()> {
        if sender != self.owner {
            return Err(ExecutorError::Unauthorized);
        }
        Ok(())
    }

    /// Owner-gated update of the harvest fee
    pub fn set_harvest_fee(&mut self, sender: Address, fee: U256) -> ExecutorResult<()> {
        self.only_owner(sender)?;
        self.validate_fee(fee)?;
        self.harvest_fee = fee;
        Ok(())
    }

    /// Owner-gated update of the collector
    pub fn set_collector(&mut self, sender: Address, collector: Address) -> ExecutorResult<()> {
        self.only_owner(sender)?;
        validate_collector(collector)?;
        self.collector = collector;
        Ok(())
    }

    /// Splits `total` by the current fee
    pub fn split(&self, total: U256) -> ExecutorResult<RewardSplit> {
        RewardSplit::compute(total, self.harvest_fee, self.fee_base)
    }
}

fn validate_collector(collector: Address) -> ExecutorResult<()> {
    if collector == Address::ZERO {
        return Err(ExecutorError::InvalidFee("Collector is the zero address".to_string()));
    }
    Ok(())
}

impl TryFrom<&FarmInitArgs> for FeeConfig {
    type Error = ExecutorError;

    fn try_from(value: &FarmInitArgs) -> Result<Self, Self::Error> {
        Self::new(
            string_to_address(value.owner.clone())?,
            string_to_address(value.collector.clone())?,
            nat_to_u256(&value.harvest_fee)?,
        )
    }
}

/// Candid view of a fee configuration
#[derive(CandidType, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeConfigQuery {
    pub owner: String,
    pub collector: String,
    pub harvest_fee: Nat,
    pub fee_base: Nat,
}

impl From<&FeeConfig> for FeeConfigQuery {
    fn from(value: &FeeConfig) -> Self {
        Self {
            owner: value.owner.to_string(),
            collector: value.collector.to_string(),
            harvest_fee: u256_to_nat(&value.harvest_fee),
            fee_base: u256_to_nat(&value.fee_base),
        }
    }
}

/// A claimed reward divided between the fee collector and the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSplit {
    pub total: U256,
    pub collector_share: U256,
    pub user_share: U256,
}

impl RewardSplit {
    /// The collector share is floored, the user keeps the remainder.
    pub fn compute(total: U256, harvest_fee: U256, fee_base: U256) -> ExecutorResult<Self> {
        let collector_share = total
            .checked_mul(harvest_fee)
            .ok_or_else(|| arithmetic_err("Harvest fee calculation overflowed."))?
            .checked_div(fee_base)
            .ok_or_else(|| arithmetic_err("Fee base was zero."))?;
        let user_share = total
            .checked_sub(collector_share)
            .ok_or_else(|| arithmetic_err("Harvest fee exceeds the reward."))?;

        Ok(Self {
            total,
            collector_share,
            user_share,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FEE_BASE;
    use candid::Nat;
    use proptest::prelude::*;

    const OWNER: Address = Address::repeat_byte(0x0a);
    const COLLECTOR: Address = Address::repeat_byte(0x0c);

    #[test]
    fn test_split_twenty_percent() {
        let split = RewardSplit::compute(U256::from(1_003u64), U256::from(2_000u64), fee_base())
            .unwrap();
        assert_eq!(split.collector_share, U256::from(200u64));
        assert_eq!(split.user_share, U256::from(803u64));
    }

    #[test]
    fn test_split_zero_reward() {
        let config = FeeConfig::new(OWNER, COLLECTOR, U256::from(2_000u64)).unwrap();
        let split = config.split(U256::ZERO).unwrap();
        assert_eq!(split.collector_share, U256::ZERO);
        assert_eq!(split.user_share, U256::ZERO);
    }

    #[test]
    fn test_fee_range() {
        assert!(FeeConfig::new(OWNER, COLLECTOR, fee_base()).is_ok());
        assert!(matches!(
            FeeConfig::new(OWNER, COLLECTOR, fee_base() + U256::from(1)),
            Err(ExecutorError::InvalidFee(_))
        ));
        assert!(matches!(
            FeeConfig::with_fee_base(OWNER, COLLECTOR, U256::ZERO, U256::ZERO),
            Err(ExecutorError::InvalidFee(_))
        ));
    }

    #[test]
    fn test_zero_collector_is_rejected() {
        let err = FeeConfig::new(OWNER, Address::ZERO, U256::from(2_000u64)).unwrap_err();
        assert_eq!(
            err,
            ExecutorError::InvalidFee("Collector is the zero address".to_string())
        );

        let args = FarmInitArgs {
            owner: OWNER.to_string(),
            collector: Address::ZERO.to_string(),
            harvest_fee: Nat::from(2_000u64),
            share_token: Address::repeat_byte(0x03).to_string(),
        };
        assert_eq!(FeeConfig::try_from(&args), Err(err));
    }

    #[test]
    fn test_only_owner_sets_fee() {
        let mut config = FeeConfig::new(OWNER, COLLECTOR, U256::from(2_000u64)).unwrap();

        assert_eq!(
            config.set_harvest_fee(COLLECTOR, U256::from(100u64)),
            Err(ExecutorError::Unauthorized)
        );
        assert!(config
            .set_harvest_fee(OWNER, U256::from(FEE_BASE + 1))
            .is_err());
        assert_eq!(config.harvest_fee, U256::from(2_000u64));

        config.set_harvest_fee(OWNER, U256::from(100u64)).unwrap();
        assert_eq!(config.harvest_fee, U256::from(100u64));
    }

    #[test]
    fn test_only_owner_sets_collector() {
        let mut config = FeeConfig::new(OWNER, COLLECTOR, U256::ZERO).unwrap();
        let new_collector = Address::repeat_byte(0x0d);

        assert_eq!(
            config.set_collector(new_collector, new_collector),
            Err(ExecutorError::Unauthorized)
        );
        assert!(config.set_collector(OWNER, Address::ZERO).is_err());
        config.set_collector(OWNER, new_collector).unwrap();
        assert_eq!(config.collector, new_collector);
    }

    #[test]
    fn test_from_init_args() {
        let args = FarmInitArgs {
            owner: OWNER.to_string(),
            collector: COLLECTOR.to_string(),
            harvest_fee: Nat::from(2_000u64),
            share_token: Address::repeat_byte(0x03).to_string(),
        };
        let config = FeeConfig::try_from(&args).unwrap();
        assert_eq!(config.owner, OWNER);
        assert_eq!(config.collector, COLLECTOR);
        assert_eq!(config.harvest_fee, U256::from(2_000u64));
        assert_eq!(config.fee_base, fee_base());

        let invalid = FarmInitArgs {
            harvest_fee: Nat::from(FEE_BASE + 1),
            ..args
        };
        assert!(matches!(
            FeeConfig::try_from(&invalid),
            Err(ExecutorError::InvalidFee(_))
        ));
    }

    #[test]
    fn test_query_view() {
        let config = FeeConfig::new(OWNER, COLLECTOR, U256::from(2_000u64)).unwrap();
        let query = FeeConfigQuery::from(&config);
        assert_eq!(query.owner, OWNER.to_string());
        assert_eq!(query.collector, COLLECTOR.to_string());
        assert_eq!(query.harvest_fee, Nat::from(2_000u64));
        assert_eq!(query.fee_base, Nat::from(FEE_BASE));
    }

    proptest! {
        #[test]
        fn test_split_conserves_the_reward(
            total in any::<u128>(),
            fee in 0u64..=FEE_BASE,
        ) {
            let total = U256::from(total);
            let split = RewardSplit::compute(total, U256::from(fee), fee_base()).unwrap();

            prop_assert_eq!(split.collector_share + split.user_share, total);
            prop_assert_eq!(split.collector_share, total * U256::from(fee) / fee_base());
            prop_assert!(split.collector_share <= total);
        }
    }
}
