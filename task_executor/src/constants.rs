//! Task Executor's Constants

use alloy_primitives::U256;

/// Scale of the harvest fee, in basis points
pub const FEE_BASE: u64 = 10_000; // 100%
pub fn fee_base() -> U256 {
    U256::from(FEE_BASE)
}

/// Scale used for fixed point arithmetic in the reward accounting
pub const SCALE: u128 = 1_000_000_000_000_000_000; // e18
pub fn scale() -> U256 {
    U256::from(SCALE)
}

/// Number of 32-byte words a batch may keep on its local stack.
/// The last slot (`NO_REFERENCE`) can be filled but never referenced.
pub const LOCAL_STACK_SIZE: usize = 256;

/// Number of argument words of a single payload that can reference the local stack.
/// The config word spends its first two bytes on the call type and the return count.
pub const MAX_REFERENCED_PARAMS: usize = 30;

/// Marker of an argument word that does not reference the local stack
pub const NO_REFERENCE: u8 = 0xff;

/// Length of a function selector
pub const SELECTOR_LENGTH: usize = 4;

/// Length of an ABI word
pub const WORD_LENGTH: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_e18() {
        assert_eq!(SCALE, 10_u128.pow(18));
    }

    #[test]
    fn config_word_fits_references() {
        assert_eq!(2 + MAX_REFERENCED_PARAMS, WORD_LENGTH);
    }

    #[test]
    fn local_stack_is_addressable_by_a_byte() {
        assert_eq!(LOCAL_STACK_SIZE, u8::MAX as usize + 1);
    }
}
