//! Error types for set partition unranking

use thiserror::Error;

/// Result type alias for unranking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while counting or unranking set partitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A caller-supplied argument is outside the valid domain
    /// (`k == 0`, `k > n`, a rank at or beyond `S(n, k)`, malformed blocks)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested table does not fit in the configured precomputed triangle
    #[error("triangle of {rows}x{cols} exceeds the {limit}x{limit} limit")]
    ResourceExceeded {
        /// Rows requested
        rows: usize,
        /// Columns requested
        cols: usize,
        /// Maximum dimension allowed
        limit: usize,
    },

    /// An internal invariant was violated (search did not converge,
    /// formula forms disagree, background column task died)
    #[error("arithmetic inconsistency: {0}")]
    ArithmeticInconsistency(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        Error::ArithmeticInconsistency(msg.into())
    }
}
