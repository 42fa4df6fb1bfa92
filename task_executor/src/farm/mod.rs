//! Yield farming module: staking into reward pools, harvesting with an
//! optional fee, and redeeming the reward-bearing share token.

pub mod action;
pub mod fee;

pub use action::FarmAction;
pub use fee::{FeeConfig, FeeConfigQuery, RewardSplit};
