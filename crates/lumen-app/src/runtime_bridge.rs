//! # ComposerBridge: Remote API Operations
//!
//! This module defines the `ComposerBridge` trait, which abstracts the two
//! remote calls a submission makes. `lumen-app` stays a pure core with no
//! HTTP stack; `lumen-agent` provides the real implementation.
//!
//! ## Design
//!
//! ```text
//! lumen-app (pure)            lumen-agent (runtime)
//! ┌──────────────────┐        ┌──────────────────┐
//! │ Composer         │        │ HttpBridge       │
//! │  ┌─────────────┐ │        │   implements     │
//! │  │ComposerBridge│◄────────│   ComposerBridge │
//! │  └─────────────┘ │        │                  │
//! └──────────────────┘        └──────────────────┘
//! ```

use crate::workflows::payload::{CreateMessageRequest, ValidationRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code the creation call returns when the user is out of messages.
pub const MESSAGE_LIMIT_EXCEEDED: &str = "MESSAGE_LIMIT_EXCEEDED";

// =============================================================================
// Wire Response Types
// =============================================================================

/// Persona-voiced explanation of a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// Sheet title
    pub title: String,
    /// Sheet body
    pub message: String,
}

/// Persona identity echoed by the validation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaVoice {
    /// Persona display name
    pub name: String,
    /// Persona avatar or backdrop
    #[serde(default)]
    pub media_ref: Option<String>,
}

/// Validation service response, including the error envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Whether the service processed the request
    pub success: bool,
    /// Verdict; absent on error envelopes
    #[serde(default)]
    pub safe: Option<bool>,
    /// Moderation category of an unsafe verdict
    #[serde(default)]
    pub category: Option<String>,
    /// Feedback to show on an unsafe verdict
    #[serde(default)]
    pub feedback: Option<FeedbackPayload>,
    /// Persona voicing the feedback
    #[serde(default)]
    pub persona: Option<PersonaVoice>,
    /// Error code on `success: false`
    #[serde(default, rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ValidationResponse {
    /// A successful safe verdict.
    pub fn safe() -> Self {
        Self {
            success: true,
            safe: Some(true),
            ..Self::default()
        }
    }

    /// A successful unsafe verdict.
    pub fn unsafe_with(feedback: Option<FeedbackPayload>) -> Self {
        Self {
            success: true,
            safe: Some(false),
            feedback,
            ..Self::default()
        }
    }
}

/// Payload of a created message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedMessage {
    /// Short code used in the share link
    pub short_code: String,
}

/// Creation response, including the error envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageResponse {
    /// Whether the message was created
    pub success: bool,
    /// Created message on success
    #[serde(default)]
    pub data: Option<CreatedMessage>,
    /// Error code on `success: false`
    #[serde(default, rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CreateMessageResponse {
    /// A successful creation.
    pub fn created(short_code: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(CreatedMessage {
                short_code: short_code.into(),
            }),
            error_code: None,
        }
    }

    /// An error envelope.
    pub fn failed(error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_code: Some(error_code.into()),
        }
    }
}

// =============================================================================
// Bridge
// =============================================================================

/// Failure reaching or decoding the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Network-level failure
    #[error("Transport error: {message}")]
    Transport {
        /// Underlying error
        message: String,
    },
    /// Non-success HTTP status with no decodable envelope
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },
    /// Response body did not match the expected shape
    #[error("Decode error: {message}")]
    Decode {
        /// Parse failure
        message: String,
    },
    /// No bridge is configured
    #[error("Remote API unavailable")]
    Unavailable,
}

impl BridgeError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Remote operations a submission needs.
///
/// Implementations must not retry on their own; each call is issued at most
/// once per submission attempt.
#[async_trait]
pub trait ComposerBridge: Send + Sync {
    /// Run the content-safety check.
    async fn validate_content(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, BridgeError>;

    /// Create the message.
    async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse, BridgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unsafe_verdict() {
        let json = r#"{"success":true,"safe":false,"category":"harassment",
            "feedback":{"title":"T","message":"M"},
            "persona":{"name":"Mira","media_ref":"persona/mira.jpg"}}"#;
        let response: ValidationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.safe, Some(false));
        assert_eq!(response.category.as_deref(), Some("harassment"));
        assert_eq!(
            response.feedback,
            Some(FeedbackPayload {
                title: "T".into(),
                message: "M".into()
            })
        );
        assert_eq!(response.persona.unwrap().name, "Mira");
    }

    #[test]
    fn test_parse_error_envelopes() {
        let response: ValidationResponse =
            serde_json::from_str(r#"{"success":false,"errorCode":"RATE_LIMITED"}"#).unwrap();
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("RATE_LIMITED"));

        let response: CreateMessageResponse =
            serde_json::from_str(r#"{"success":false,"errorCode":"MESSAGE_LIMIT_EXCEEDED"}"#)
                .unwrap();
        assert_eq!(response, CreateMessageResponse::failed(MESSAGE_LIMIT_EXCEEDED));
    }

    #[test]
    fn test_parse_created() {
        let response: CreateMessageResponse =
            serde_json::from_str(r#"{"success":true,"data":{"short_code":"aB3x"}}"#).unwrap();
        assert_eq!(response, CreateMessageResponse::created("aB3x"));
    }
}
