//! # Error Types

/// Errors from subgram operations.
///
/// Capacity exhaustion and lookup misses are never errors: the first is
/// absorbed by implicit threshold passes, the second is an `Option` at the
/// query surface.
#[derive(Debug, thiserror::Error)]
pub enum SubgramError {
    /// Rejected configuration, reported at construction time.
    #[error("invalid options: {reason}")]
    InvalidConfig {
        /// Why the options were rejected.
        reason: String,
    },

    /// A persisted entry carried an unknown kind tag.
    #[error("invalid entry kind tag: {tag}")]
    InvalidEntryKind {
        /// The tag byte that was read.
        tag: u8,
    },

    /// Persisted dictionary data is internally inconsistent.
    #[error("corrupt dictionary stream: {0}")]
    CorruptStream(String),

    /// The corpus scan finished with nothing above the minimum counts.
    #[error("empty vocabulary after thresholding; lower the minimum counts")]
    EmptyVocabulary,

    /// I/O error; truncated persisted streams surface here.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for subgram operations.
pub type SgResult<T> = core::result::Result<T, SubgramError>;
