//! The seams between the executor, its host and the modules it dispatches to

use alloy_primitives::{Address, Bytes, B256};

use crate::{types::CallContext, utils::error::ExecutorResult};

/// A module the executor can run in a caller's account.
///
/// `payload` is the ABI-encoded call. Implementations decode it into one of
/// their operations before touching the host and return the ABI-encoded result.
pub trait Action<H> {
    /// Name used in logs
    fn name(&self) -> &'static str;

    fn delegate_call(&self, host: &mut H, ctx: &CallContext, payload: &[u8])
        -> ExecutorResult<Bytes>;
}

/// Host state that can be rolled back.
///
/// The executor takes a snapshot before an invocation chain and reverts to it
/// when anything in the chain fails.
pub trait Checkpoint {
    type Snapshot;

    fn snapshot(&self) -> Self::Snapshot;

    fn revert_to(&mut self, snapshot: Self::Snapshot);
}

/// Host log the executor emits its `RecordActionResult` events to.
/// Emitted entries are part of the host state and roll back with it.
pub trait EventLog {
    fn emit(&mut self, emitter: Address, topic: B256, data: Vec<u8>);
}
