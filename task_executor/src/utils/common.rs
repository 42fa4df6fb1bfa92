//! Common utility and helper functions that are used across the project

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use candid::Nat;
use num_bigint::BigUint;

use super::error::*;

/// Converts String to Address and returns ExecutorError on failure
pub fn string_to_address(input: String) -> ExecutorResult<Address> {
    Address::from_str(&input).map_err(|err| ExecutorError::DecodingError(format!("{:#?}", err)))
}

/// Converts values of type `Nat` to `U256`
pub fn nat_to_u256(n: &Nat) -> ExecutorResult<U256> {
    let be_bytes = n.0.to_bytes_be();
    if be_bytes.len() > 32 {
        return Err(ExecutorError::DecodingError("The `Nat` input length exceedes 32 bytes when converted to big-endian bytes representation.".to_string()));
    }
    // Ensure the byte array is exactly 32 bytes long
    let mut padded_bytes = [0u8; 32];
    let start_pos = 32 - be_bytes.len();
    padded_bytes[start_pos..].copy_from_slice(&be_bytes);

    Ok(U256::from_be_bytes(padded_bytes))
}

/// Converts values of type `U256` to `Nat`
pub fn u256_to_nat(n: &U256) -> Nat {
    Nat(BigUint::from_bytes_be(&n.to_be_bytes::<32>()))
}

/// Reinterprets an ABI word as an unsigned integer
pub fn word_to_u256(word: &B256) -> U256 {
    U256::from_be_bytes(word.0)
}

/// Encodes an unsigned integer as an ABI word
pub fn u256_to_word(n: U256) -> B256 {
    B256::from(n.to_be_bytes::<32>())
}

/// Returns the ABI-decoded return values of `F` from raw return data.
pub fn decode_abi_response<T, F: SolCall<Return = T>>(data: &[u8]) -> ExecutorResult<T> {
    F::abi_decode_returns(data, true).map_err(|err| ExecutorError::DecodingError(err.to_string()))
}

/// Returns `after - before`, the amount an operation credited to a balance.
pub fn balance_delta(before: U256, after: U256) -> ExecutorResult<U256> {
    after
        .checked_sub(before)
        .ok_or_else(|| arithmetic_err("Balance decreased while expecting a credit."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_string_to_address_valid() {
        let input = "0x0123456789abcdef0123456789abcdef01234567".to_string();
        let result = string_to_address(input.clone());
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Address::from_str(&input).unwrap());
    }

    #[test]
    fn test_string_to_address_invalid() {
        let result = string_to_address("invalid_address".to_string());
        assert!(matches!(result, Err(ExecutorError::DecodingError(_))));
    }

    #[test]
    fn test_nat_to_u256_valid() {
        let value = 1234567890_u64;
        let result = nat_to_u256(&Nat::from(value));
        assert_eq!(result.unwrap(), U256::from(value));
    }

    #[test]
    fn test_nat_to_u256_too_large() {
        let too_large = Nat(BigUint::from(1u8) << 256);
        assert!(matches!(
            nat_to_u256(&too_large),
            Err(ExecutorError::DecodingError(_))
        ));
    }

    #[test]
    fn test_balance_delta_underflow() {
        assert_eq!(balance_delta(U256::from(3), U256::from(10)).unwrap(), U256::from(7));
        assert!(matches!(
            balance_delta(U256::from(10), U256::from(3)),
            Err(ExecutorError::Arithmetic(_))
        ));
    }

    proptest! {
        #[test]
        fn test_nat_u256_conversion(bytes in any::<[u8; 32]>()) {
            let value = U256::from_be_bytes(bytes);
            prop_assert_eq!(nat_to_u256(&u256_to_nat(&value)).unwrap(), value);
        }

        #[test]
        fn test_word_conversion(bytes in any::<[u8; 32]>()) {
            let word = B256::from(bytes);
            prop_assert_eq!(u256_to_word(word_to_u256(&word)), word);
        }
    }
}
