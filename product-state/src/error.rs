//! Error types for product-state

use thiserror::Error;

/// Result type for product-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors raised while constructing or naming product-state values
///
/// Message handling itself never fails; these only surface from parsing
/// helpers used by harnesses and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Key action code outside the known range (code 0 is reserved)
    #[error("Invalid key action code: {0}")]
    InvalidKeyAction(u32),

    /// Key action name that does not match any action
    #[error("Unknown key action name: {0}")]
    UnknownKeyActionName(String),

    /// Readiness flag name that does not match any flag
    #[error("Unknown readiness flag: {0}")]
    UnknownFlag(String),

    /// Derived predicate name that does not match any predicate
    #[error("Unknown readiness predicate: {0}")]
    UnknownPredicate(String),

    /// State name that does not match any state in the tree
    #[error("Unknown state: {0}")]
    UnknownState(String),
}
