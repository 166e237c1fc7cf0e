//! Categorized submission errors
//!
//! Every failure a submission attempt can hit is routed, not propagated. Each
//! variant knows:
//! - its short code and toast severity
//! - whether the user can recover from it
//! - the single action the user is offered next

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Presentation hints
// ============================================================================

/// Toast severity levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToastLevel {
    /// Informational message
    #[default]
    Info,
    /// Success message
    Success,
    /// Warning message
    Warning,
    /// Error message
    Error,
}

/// The one action a failure dialog offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogAction {
    /// Dismiss the dialog
    Acknowledge,
    /// Route to the subscription upgrade flow
    Upgrade,
    /// Reopen the editor with the original text after a rejection
    Rewrite,
    /// Reopen the editor to type a message
    EditText,
}

impl DialogAction {
    /// Button label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Acknowledge => "OK",
            Self::Upgrade => "Upgrade",
            Self::Rewrite => "Rewrite",
            Self::EditText => "Write a message",
        }
    }
}

impl fmt::Display for DialogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dialog shown for a surfaced failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDialog {
    /// Title line
    pub title: String,
    /// Body text
    pub message: String,
    /// Only action offered
    pub action: DialogAction,
    /// Severity
    pub level: ToastLevel,
}

// ============================================================================
// SubmissionError
// ============================================================================

/// Failure of a submission attempt.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Text is empty or whitespace
    #[error("Message text is required")]
    ContentRequired,

    /// Validation flagged the content
    #[error("Content was rejected{}", category.as_ref().map(|c| format!(" ({c})")).unwrap_or_default())]
    ValidationRejected {
        /// Moderation category, if reported
        category: Option<String>,
    },

    /// Validation could not be reached; the attempt proceeds as safe
    #[error("Validation service unavailable: {reason}")]
    ValidationServiceUnavailable {
        /// Transport or envelope error
        reason: String,
    },

    /// Creation refused because the user is out of messages
    #[error("Message limit reached")]
    LimitExceeded,

    /// Creation returned any other non-success
    #[error("Message could not be created ({code})")]
    CreationFailed {
        /// Error code from the envelope, or `UNKNOWN`
        code: String,
    },

    /// Anything else raised during the attempt
    #[error("Unexpected error: {message}")]
    UnexpectedException {
        /// Error description
        message: String,
    },
}

impl SubmissionError {
    /// Create a creation failure from an optional envelope code
    pub fn creation_failed(code: Option<&str>) -> Self {
        Self::CreationFailed {
            code: code.unwrap_or("UNKNOWN").to_string(),
        }
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedException {
            message: message.into(),
        }
    }

    /// Get a short error code string
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContentRequired => "CONTENT_REQUIRED",
            Self::ValidationRejected { .. } => "VALIDATION_REJECTED",
            Self::ValidationServiceUnavailable { .. } => "VALIDATION_UNAVAILABLE",
            Self::LimitExceeded => "LIMIT_EXCEEDED",
            Self::CreationFailed { .. } => "CREATION_FAILED",
            Self::UnexpectedException { .. } => "UNEXPECTED",
        }
    }

    /// Check if the user can recover without restarting the composer
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UnexpectedException { .. })
    }

    /// Whether the user ever sees this error
    #[must_use]
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, Self::ValidationServiceUnavailable { .. })
    }

    /// Get the appropriate toast severity for this error
    #[must_use]
    pub fn toast_level(&self) -> ToastLevel {
        match self {
            Self::ContentRequired => ToastLevel::Info,
            Self::ValidationRejected { .. }
            | Self::ValidationServiceUnavailable { .. }
            | Self::LimitExceeded => ToastLevel::Warning,
            Self::CreationFailed { .. } | Self::UnexpectedException { .. } => ToastLevel::Error,
        }
    }

    /// Single next step offered to the user. `None` when not surfaced.
    #[must_use]
    pub fn primary_action(&self) -> Option<DialogAction> {
        match self {
            Self::ContentRequired => Some(DialogAction::EditText),
            Self::ValidationRejected { .. } => Some(DialogAction::Rewrite),
            Self::ValidationServiceUnavailable { .. } => None,
            Self::LimitExceeded => Some(DialogAction::Upgrade),
            Self::CreationFailed { .. } | Self::UnexpectedException { .. } => {
                Some(DialogAction::Acknowledge)
            }
        }
    }

    /// Dialog for failures shown as a dialog.
    ///
    /// Content-required reopens the editor and rejections use the rejection
    /// sheet, so neither produces a dialog.
    #[must_use]
    pub fn dialog(&self) -> Option<ErrorDialog> {
        let (title, message) = match self {
            Self::LimitExceeded => (
                "Message limit reached",
                "You've sent all the messages your plan includes. Upgrade to keep sending.",
            ),
            Self::CreationFailed { .. } => (
                "Couldn't create message",
                "Something went wrong while creating your message. Please try again.",
            ),
            Self::UnexpectedException { .. } => (
                "Something went wrong",
                "An unexpected error occurred. Please try again.",
            ),
            Self::ContentRequired
            | Self::ValidationRejected { .. }
            | Self::ValidationServiceUnavailable { .. } => return None,
        };
        Some(ErrorDialog {
            title: title.to_string(),
            message: message.to_string(),
            action: self.primary_action()?,
            level: self.toast_level(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_routes_to_upgrade() {
        let err = SubmissionError::LimitExceeded;
        assert_eq!(err.code(), "LIMIT_EXCEEDED");
        assert!(err.is_recoverable());
        let dialog = err.dialog().unwrap();
        assert_eq!(dialog.action, DialogAction::Upgrade);
        assert_eq!(dialog.level, ToastLevel::Warning);
    }

    #[test]
    fn test_creation_failed_is_acknowledge_only() {
        let err = SubmissionError::creation_failed(Some("SERVER_BUSY"));
        assert_eq!(err.to_string(), "Message could not be created (SERVER_BUSY)");
        assert_eq!(err.dialog().unwrap().action, DialogAction::Acknowledge);

        let err = SubmissionError::creation_failed(None);
        assert_eq!(err, SubmissionError::CreationFailed { code: "UNKNOWN".into() });
    }

    #[test]
    fn test_unavailable_is_never_surfaced() {
        let err = SubmissionError::ValidationServiceUnavailable {
            reason: "timeout".into(),
        };
        assert!(!err.is_surfaced());
        assert_eq!(err.primary_action(), None);
        assert_eq!(err.dialog(), None);
    }

    #[test]
    fn test_every_surfaced_error_has_one_action() {
        let errors = [
            SubmissionError::ContentRequired,
            SubmissionError::ValidationRejected { category: None },
            SubmissionError::LimitExceeded,
            SubmissionError::creation_failed(None),
            SubmissionError::unexpected("boom"),
        ];
        for err in errors {
            assert!(err.is_surfaced());
            assert!(err.primary_action().is_some(), "{err:?}");
        }
    }

    #[test]
    fn test_rejected_display() {
        let err = SubmissionError::ValidationRejected {
            category: Some("harassment".into()),
        };
        assert_eq!(err.to_string(), "Content was rejected (harassment)");
        assert_eq!(
            SubmissionError::ValidationRejected { category: None }.to_string(),
            "Content was rejected"
        );
    }

    #[test]
    fn test_unexpected_is_not_recoverable() {
        let err = SubmissionError::unexpected("panic in bridge");
        assert!(!err.is_recoverable());
        assert_eq!(err.toast_level(), ToastLevel::Error);
        assert_eq!(err.code(), "UNEXPECTED");
    }
}
