//! Failure classes shared across the runtime.
//!
//! Every error unwinds the computation; there is no retry below the caller.
//! Errors are carried as [anyhow::Error] with one of these kinds at the root,
//! so callers that care can downcast while everything else just propagates.

use thiserror::Error;

/// The error kinds a computation can die with.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The caller handed in something malformed: mismatched batch sizes, a
    /// missing input value, an out-of-range split vector.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The parties disagree about the protocol state: unexpected number of
    /// opened secrets, transport EOF mid-execution, tuple shortage.
    #[error("protocol failure: {0}")]
    Protocol(String),

    /// A wire was read after free, a refcount was moved past zero, or a
    /// scheduler slot was installed twice. Indicates a frontend bug.
    #[error("lifecycle violation: {0}")]
    Lifecycle(String),
}
