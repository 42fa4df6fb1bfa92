//! Result channel of the executor.
//!
//! Every successful invocation leaves one record holding the raw ABI-encoded
//! return of the module, keyed by its position in the batch.

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::{SolCall, SolEvent};
use candid::CandidType;
use serde::{Deserialize, Serialize};

use crate::{
    types::RecordActionResult,
    utils::{
        common::decode_abi_response,
        error::{ExecutorError, ExecutorResult},
    },
};

/// Captured return data of one invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    /// Position of the invocation in its batch
    pub index: u32,
    /// Module the invocation ran
    pub target: Address,
    /// Raw return data
    pub data: Bytes,
}

impl ActionRecord {
    pub fn new(index: u32, target: Address, data: Bytes) -> Self {
        Self {
            index,
            target,
            data,
        }
    }

    /// Decodes the return data as the return values of `F`
    pub fn decode<T, F: SolCall<Return = T>>(&self) -> ExecutorResult<T> {
        decode_abi_response::<T, F>(&self.data)
    }

    /// Topic and data of the `RecordActionResult` event for this record
    pub fn to_event(&self) -> (B256, Vec<u8>) {
        let event = RecordActionResult {
            data: self.data.clone(),
        };
        (RecordActionResult::SIGNATURE_HASH, event.encode_data())
    }

    /// Rebuilds a record from `RecordActionResult` event data
    pub fn from_event(index: u32, target: Address, event_data: &[u8]) -> ExecutorResult<Self> {
        let (data,) = RecordActionResult::abi_decode_data(event_data, true)
            .map_err(|err| ExecutorError::DecodingError(err.to_string()))?;
        Ok(Self::new(index, target, data))
    }
}

/// Records of one batch, in invocation order
#[derive(Clone, Debug, Default)]
pub struct ActionJournal {
    records: Vec<ActionRecord>,
}

impl ActionJournal {
    /// Appends the return data of the next invocation
    pub fn append(&mut self, target: Address, data: Bytes) -> &ActionRecord {
        let index = self.records.len() as u32;
        self.records.push(ActionRecord::new(index, target, data));
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ActionRecord> {
        self.records
    }
}

/// Candid view of an action record
#[derive(CandidType, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecordQuery {
    pub index: u32,
    pub target: String,
    /// 0x-prefixed hex of the return data
    pub data: String,
}

impl From<ActionRecord> for ActionRecordQuery {
    fn from(value: ActionRecord) -> Self {
        Self {
            index: value.index,
            target: value.target.to_string(),
            data: format!("0x{}", hex::encode(&value.data)),
        }
    }
}
