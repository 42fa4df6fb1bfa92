//! Task executor.
//!
//! Runs one or more module invocations in the caller's account as a single
//! atomic unit. Each invocation is dispatched to the module deployed at its
//! target address, and the return data of every invocation is journaled in
//! order. Any failure reverts the host to the state it had before the first
//! invocation and surfaces the failing module's reason unchanged.

pub mod action;
pub mod config;

use std::{collections::HashMap, rc::Rc};

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolInterface};
use tracing::{debug, info, warn};

use crate::{
    journal::{ActionJournal, ActionRecord},
    types::{
        CallContext,
        ITaskExecutor::{batchExecCall, executeCall, ITaskExecutorCalls},
    },
    utils::error::{ExecutorError, ExecutorResult},
};

use self::{
    action::{Action, Checkpoint, EventLog},
    config::{InvocationConfig, LocalStack},
};

/// One module call of a batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInvocation {
    /// Address the module is deployed at
    pub target: Address,
    /// ABI-encoded call
    pub payload: Bytes,
    pub config: InvocationConfig,
}

impl ActionInvocation {
    pub fn new(target: Address, payload: impl Into<Bytes>) -> Self {
        Self {
            target,
            payload: payload.into(),
            config: InvocationConfig::default(),
        }
    }

    /// Encodes `call` as the payload
    pub fn call<C: SolCall>(target: Address, call: &C) -> Self {
        Self::new(target, call.abi_encode())
    }

    pub fn with_config(mut self, config: InvocationConfig) -> Self {
        self.config = config;
        self
    }
}

pub struct TaskExecutor<H> {
    /// Account of the executor itself, never a valid execution account
    address: Address,
    /// Deployed modules by address
    modules: HashMap<Address, Rc<dyn Action<H>>>,
}

impl<H: Checkpoint + EventLog> TaskExecutor<H> {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            modules: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Deploys `module` at `address`.
    pub fn deploy(&mut self, address: Address, module: Rc<dyn Action<H>>) -> ExecutorResult<()> {
        if address == Address::ZERO || address == self.address {
            return Err(ExecutorError::InvalidTarget(format!(
                "Cannot deploy a module at {}",
                address
            )));
        }
        if self.modules.contains_key(&address) {
            return Err(ExecutorError::InvalidTarget(format!(
                "A module is already deployed at {}",
                address
            )));
        }

        info!(%address, module = module.name(), "module deployed");
        self.modules.insert(address, module);
        Ok(())
    }

    fn module(&self, target: Address) -> ExecutorResult<&Rc<dyn Action<H>>> {
        if target == Address::ZERO {
            return Err(ExecutorError::InvalidTarget(
                "Invalid target: the zero address".to_string(),
            ));
        }
        self.modules.get(&target).ok_or_else(|| {
            ExecutorError::InvalidTarget(format!("Invalid target: no module at {}", target))
        })
    }

    fn delegate_call_only(&self, ctx: &CallContext) -> ExecutorResult<()> {
        if ctx.account == self.address {
            return Err(ExecutorError::DelegateCallOnly);
        }
        Ok(())
    }

    /// Runs a single invocation atomically and returns its record.
    pub fn execute(
        &self,
        host: &mut H,
        ctx: &CallContext,
        invocation: &ActionInvocation,
    ) -> ExecutorResult<ActionRecord> {
        self.execute_many(host, ctx, std::slice::from_ref(invocation))?
            .pop()
            .ok_or_else(|| ExecutorError::Custom("Invocation left no record".to_string()))
    }

    /// Runs `invocations` in order as one atomic unit and returns one record
    /// per invocation, in the same order. Every record is also emitted to the
    /// host as a `RecordActionResult` event.
    pub fn execute_many(
        &self,
        host: &mut H,
        ctx: &CallContext,
        invocations: &[ActionInvocation],
    ) -> ExecutorResult<Vec<ActionRecord>> {
        self.delegate_call_only(ctx)?;

        debug!(
            account = %ctx.account,
            sender = %ctx.sender,
            invocations = invocations.len(),
            "batch started"
        );

        let snapshot = host.snapshot();
        match self.run(host, ctx, invocations) {
            Ok(journal) => {
                debug!(account = %ctx.account, records = journal.len(), "batch finished");
                Ok(journal.into_records())
            }
            Err(err) => {
                host.revert_to(snapshot);
                warn!(account = %ctx.account, error = %err, "batch reverted");
                Err(err)
            }
        }
    }

    fn run(
        &self,
        host: &mut H,
        ctx: &CallContext,
        invocations: &[ActionInvocation],
    ) -> ExecutorResult<ActionJournal> {
        let mut journal = ActionJournal::default();
        let mut stack = LocalStack::default();

        for (index, invocation) in invocations.iter().enumerate() {
            let module = self.module(invocation.target)?;
            let payload = invocation.config.apply(&invocation.payload, &stack)?;

            let data = module
                .delegate_call(host, ctx, &payload)
                .inspect_err(|err| {
                    warn!(
                        index,
                        target = %invocation.target,
                        module = module.name(),
                        error = %err,
                        "invocation failed"
                    )
                })?;

            stack.push_returns(&data, invocation.config.return_words())?;
            let (topic, event_data) = journal.append(invocation.target, data).to_event();
            host.emit(self.address, topic, event_data);
        }

        Ok(journal)
    }

    /// ABI entry point: decodes `execute` or `batchExec` calldata, runs it and
    /// returns the ABI-encoded result.
    pub fn handle(&self, host: &mut H, ctx: &CallContext, calldata: &[u8]) -> ExecutorResult<Bytes> {
        let call = ITaskExecutorCalls::abi_decode(calldata, true)
            .map_err(|err| ExecutorError::DecodingError(err.to_string()))?;

        let data = match call {
            ITaskExecutorCalls::execute(args) => {
                let record = self.execute(host, ctx, &ActionInvocation::new(args.to, args.data))?;
                executeCall::abi_encode_returns(&(record.data,))
            }
            ITaskExecutorCalls::batchExec(args) => {
                if args.tos.len() != args.configs.len() || args.tos.len() != args.datas.len() {
                    return Err(ExecutorError::InvalidConfig(
                        "batchExec: Tos, configs and datas length inconsistent".to_string(),
                    ));
                }

                let invocations = args
                    .tos
                    .into_iter()
                    .zip(args.configs.iter())
                    .zip(args.datas)
                    .map(|((target, config), data)| {
                        Ok(ActionInvocation::new(target, data)
                            .with_config(InvocationConfig::from_word(config)?))
                    })
                    .collect::<ExecutorResult<Vec<_>>>()?;

                let returns = self
                    .execute_many(host, ctx, &invocations)?
                    .into_iter()
                    .map(|record| record.data)
                    .collect::<Vec<_>>();
                batchExecCall::abi_encode_returns(&(returns,))
            }
        };

        Ok(Bytes::from(data))
    }
}
