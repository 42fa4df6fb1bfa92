//! Utility and helper functions needed for:
//! - Error handling
//! - Type casting between candid, ABI words and integers
//! - Decoding ABI return data

pub mod common;
pub mod error;
