// Path: crates/execution/src/error.rs
//! Errors that stop block processing.

use thiserror::Error;
use xco_types::error::{ErrorCode, StateError, TransactionError};

/// A failure the host must not paper over. Ordinary rejections are reported
/// per input and never surface here.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// An input broke an invariant of the replicated state.
    #[error("fatal error in {service_id}.{method}: {source}")]
    FatalTransition {
        /// Target service.
        service_id: String,
        /// Target method.
        method: String,
        /// The underlying error.
        #[source]
        source: TransactionError,
    },
    /// An end-block hook failed.
    #[error("end-block hook of '{service_id}' failed: {source}")]
    EndBlock {
        /// The service whose hook failed.
        service_id: String,
        /// The underlying error.
        #[source]
        source: TransactionError,
    },
    /// The store refused a finished change set.
    #[error("commit failed: {0}")]
    Commit(#[from] StateError),
}

impl ErrorCode for ExecutionError {
    fn code(&self) -> &'static str {
        match self {
            Self::FatalTransition { source, .. } => source.code(),
            Self::EndBlock { .. } => "EXECUTION_END_BLOCK_FAILED",
            Self::Commit(e) => e.code(),
        }
    }
}
