//! Invocation configs and the batch-local stack used to chain return values
//! into later arguments.
//!
//! ```plain
//! Config word (bytes32):
//!
//!  byte 0      byte 1         bytes 2..32
//! ┌─────────┬──────────────┬──────────────────────────────────────┐
//! │ 00 / 01 │ return words │ slot per argument word, ff = literal │
//! └─────────┴──────────────┴──────────────────────────────────────┘
//!  static /   words pushed    argument word i of a dynamic call is
//!  dynamic    after the call  replaced by local stack slot byte[2+i]
//! ```

use alloy_primitives::B256;

use crate::{
    constants::{LOCAL_STACK_SIZE, MAX_REFERENCED_PARAMS, NO_REFERENCE, SELECTOR_LENGTH, WORD_LENGTH},
    utils::error::{ExecutorError, ExecutorResult},
};

const STATIC_CALL: u8 = 0x00;
const DYNAMIC_CALL: u8 = 0x01;

/// Decoded config word of an invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvocationConfig {
    /// Whether argument words are replaced from the local stack before the call
    dynamic: bool,
    /// Number of return words pushed onto the local stack after the call
    return_words: u8,
    /// Local stack slot per argument word
    references: [u8; MAX_REFERENCED_PARAMS],
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self::static_call()
    }
}

impl InvocationConfig {
    /// A call whose payload is sent as is
    pub fn static_call() -> Self {
        Self {
            dynamic: false,
            return_words: 0,
            references: [NO_REFERENCE; MAX_REFERENCED_PARAMS],
        }
    }

    /// A call whose argument words may be taken from the local stack
    pub fn dynamic_call() -> Self {
        Self {
            dynamic: true,
            ..Self::static_call()
        }
    }

    /// Sets the number of return words pushed after the call
    pub fn returns(mut self, words: u8) -> Self {
        self.return_words = words;
        self
    }

    /// Replaces argument word `param` with local stack slot `slot`
    pub fn reference(mut self, param: usize, slot: u8) -> ExecutorResult<Self> {
        if !self.dynamic {
            return Err(ExecutorError::InvalidConfig(
                "Static calls cannot reference the local stack".to_string(),
            ));
        }
        if slot == NO_REFERENCE {
            return Err(ExecutorError::InvalidConfig(format!(
                "Slot {:#x} is reserved",
                NO_REFERENCE
            )));
        }
        let entry = self.references.get_mut(param).ok_or_else(|| {
            ExecutorError::InvalidConfig(format!(
                "Only the first {} argument words can be referenced",
                MAX_REFERENCED_PARAMS
            ))
        })?;
        *entry = slot;
        Ok(self)
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn return_words(&self) -> u8 {
        self.return_words
    }

    /// Decodes a config word
    pub fn from_word(word: &B256) -> ExecutorResult<Self> {
        let dynamic = match word[0] {
            STATIC_CALL => false,
            DYNAMIC_CALL => true,
            other => {
                return Err(ExecutorError::InvalidConfig(format!(
                    "Unknown call type {:#04x}",
                    other
                )))
            }
        };

        let mut references = [NO_REFERENCE; MAX_REFERENCED_PARAMS];
        if dynamic {
            references.copy_from_slice(&word[2..]);
        }

        Ok(Self {
            dynamic,
            return_words: word[1],
            references,
        })
    }

    /// Encodes the config word
    pub fn to_word(&self) -> B256 {
        let mut word = [0u8; WORD_LENGTH];
        word[0] = if self.dynamic { DYNAMIC_CALL } else { STATIC_CALL };
        word[1] = self.return_words;
        word[2..].copy_from_slice(&self.references);
        B256::from(word)
    }

    /// Returns the payload with every referenced argument word replaced.
    pub fn apply(&self, payload: &[u8], stack: &LocalStack) -> ExecutorResult<Vec<u8>> {
        let mut data = payload.to_vec();
        if !self.dynamic {
            return Ok(data);
        }

        for (param, slot) in self
            .references
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot != NO_REFERENCE)
        {
            let start = SELECTOR_LENGTH + param * WORD_LENGTH;
            let end = start + WORD_LENGTH;
            if end > data.len() {
                return Err(ExecutorError::InvalidConfig(format!(
                    "Argument word {} is outside of the payload",
                    param
                )));
            }
            data[start..end].copy_from_slice(stack.get(*slot)?.as_slice());
        }

        Ok(data)
    }
}

/// Return words collected while running one batch
#[derive(Clone, Debug, Default)]
pub struct LocalStack {
    words: Vec<B256>,
}

impl LocalStack {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, slot: u8) -> ExecutorResult<B256> {
        self.words.get(slot as usize).copied().ok_or_else(|| {
            ExecutorError::InvalidConfig(format!("Reference to undefined local stack slot {}", slot))
        })
    }

    /// Pushes the first `count` words of `data`
    pub fn push_returns(&mut self, data: &[u8], count: u8) -> ExecutorResult<()> {
        let count = count as usize;
        if data.len() < count * WORD_LENGTH {
            return Err(ExecutorError::InvalidConfig(format!(
                "Expected {} return words, got {} bytes",
                count,
                data.len()
            )));
        }
        if self.words.len() + count > LOCAL_STACK_SIZE {
            return Err(ExecutorError::InvalidConfig("Local stack overflow".to_string()));
        }

        self.words.extend(
            data.chunks_exact(WORD_LENGTH)
                .take(count)
                .map(B256::from_slice),
        );
        Ok(())
    }
}
