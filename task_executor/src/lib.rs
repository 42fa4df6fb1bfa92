//! Atomic task executor with a yield farming action.
//!
//! The executor runs ABI-encoded module calls in the caller's account, one at
//! a time or as a batch, and keeps an ordered record of every return. The farm
//! action stakes deposit tokens into reward pools, harvests rewards with an
//! optional fee, exits positions and redeems the reward-bearing share token.

pub mod constants;
pub mod executor;
pub mod farm;
pub mod journal;
pub mod ledger;
pub mod sim;
pub mod types;
pub mod utils;

pub use executor::{
    action::{Action, Checkpoint, EventLog},
    config::InvocationConfig,
    ActionInvocation, TaskExecutor,
};
pub use farm::{FarmAction, FeeConfig, RewardSplit};
pub use journal::{ActionRecord, ActionRecordQuery};
pub use types::{CallContext, FarmInitArgs};
pub use utils::error::{ExecutorError, ExecutorResult};
