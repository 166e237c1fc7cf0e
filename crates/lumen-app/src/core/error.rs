//! Composer error type.

use crate::views::effects::EffectDomain;
use crate::views::words::WordsError;
use thiserror::Error;

/// Errors returned by composer operations.
///
/// These cover caller misuse (wrong stage, unknown catalog keys, oversized
/// text) and configuration problems. Submission failures are not errors at this
/// level: they are routed outcomes, see [`crate::errors::SubmissionError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposerError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// What was invalid
        message: String,
    },

    /// Operation not allowed in the current selection stage
    #[error("Invalid transition: {message}")]
    InvalidTransition {
        /// Stage and operation that conflicted
        message: String,
    },

    /// Catalog lookup failed
    #[error("Unknown {domain} entry: {key}")]
    UnknownEntry {
        /// Domain searched
        domain: EffectDomain,
        /// Missing key
        key: String,
    },

    /// Custom words rejected
    #[error(transparent)]
    Words(#[from] WordsError),

    /// Message text exceeds the configured cap
    #[error("Message is {actual} characters, the limit is {max}")]
    TextTooLong {
        /// Configured cap
        max: usize,
        /// Provided length
        actual: usize,
    },

    /// The composer has no open session
    #[error("Composer is not open")]
    NotOpen,
}

impl ComposerError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }

    /// Create an unknown catalog entry error
    pub fn unknown_entry(domain: EffectDomain, key: impl Into<String>) -> Self {
        Self::UnknownEntry {
            domain,
            key: key.into(),
        }
    }
}
