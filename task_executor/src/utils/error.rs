use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

/// Task Executor Result
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Task Executor Errors
/// Every variant carries the reason the caller sees when the batch reverts.
#[derive(Clone, CandidType, Debug, Deserialize, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// A positive amount was required
    #[error("{0}")]
    ZeroAmount(String),
    /// No accrual source is registered for the deposit token
    #[error("{0}")]
    SourceNotFound(String),
    /// A ledger, accrual source or share token rejected the operation
    #[error("{0}")]
    Rejected(String),
    /// Harvest fee outside of `[0, fee_base]`
    #[error("{0}")]
    InvalidFee(String),
    /// Unauthorized access
    #[error("Unauthorized")]
    Unauthorized,
    /// The invocation target is zero or has no module deployed
    #[error("{0}")]
    InvalidTarget(String),
    /// The executor was invoked in its own account instead of the caller's
    #[error("Delegate call only")]
    DelegateCallOnly,
    /// Malformed invocation config or local stack reference
    #[error("{0}")]
    InvalidConfig(String),
    /// Decoding issue
    #[error("{0}")]
    DecodingError(String),
    /// Arithmetic error
    #[error("{0}")]
    Arithmetic(String),
    /// Unknown/Custom error
    #[error("{0}")]
    Custom(String),
}

impl ExecutorError {
    /// Prefixes the reason with the name of the action it surfaced in,
    /// e.g. `Cannot withdraw 0` becomes `exit: Cannot withdraw 0`.
    pub fn within<S: AsRef<str>>(self, action: S) -> Self {
        let prefix = |reason: String| format!("{}: {}", action.as_ref(), reason);
        match self {
            ExecutorError::ZeroAmount(reason) => ExecutorError::ZeroAmount(prefix(reason)),
            ExecutorError::SourceNotFound(reason) => ExecutorError::SourceNotFound(prefix(reason)),
            ExecutorError::Rejected(reason) => ExecutorError::Rejected(prefix(reason)),
            ExecutorError::InvalidFee(reason) => ExecutorError::InvalidFee(prefix(reason)),
            ExecutorError::InvalidTarget(reason) => ExecutorError::InvalidTarget(prefix(reason)),
            ExecutorError::InvalidConfig(reason) => ExecutorError::InvalidConfig(prefix(reason)),
            ExecutorError::DecodingError(reason) => ExecutorError::DecodingError(prefix(reason)),
            ExecutorError::Arithmetic(reason) => ExecutorError::Arithmetic(prefix(reason)),
            ExecutorError::Custom(reason) => ExecutorError::Custom(prefix(reason)),
            unprefixed @ (ExecutorError::Unauthorized | ExecutorError::DelegateCallOnly) => {
                unprefixed
            }
        }
    }
}

pub fn arithmetic_err<S: AsRef<str>>(s: S) -> ExecutorError {
    ExecutorError::Arithmetic(s.as_ref().to_string())
}

pub fn rejected<S: AsRef<str>>(s: S) -> ExecutorError {
    ExecutorError::Rejected(s.as_ref().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_prefixes_the_reason() {
        let err = rejected("Cannot withdraw 0").within("exit");
        assert_eq!(err, ExecutorError::Rejected("exit: Cannot withdraw 0".to_string()));
        assert_eq!(err.to_string(), "exit: Cannot withdraw 0");
    }

    #[test]
    fn within_keeps_the_category() {
        let err = ExecutorError::InvalidConfig("undefined local stack slot 3".to_string())
            .within("batchExec");
        assert_eq!(err.to_string(), "batchExec: undefined local stack slot 3");
        assert!(matches!(err, ExecutorError::InvalidConfig(_)));
    }

    #[test]
    fn within_leaves_bare_variants_alone() {
        assert_eq!(ExecutorError::Unauthorized.within("setHarvestFee"), ExecutorError::Unauthorized);
        assert_eq!(ExecutorError::DelegateCallOnly.within("execute"), ExecutorError::DelegateCallOnly);
    }
}
