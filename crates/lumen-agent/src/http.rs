//! # HTTP Bridge
//!
//! `reqwest` implementation of [`ComposerBridge`]. Both endpoints take a JSON
//! body and answer with the `{ success, ..., errorCode }` envelope. Error
//! envelopes are often sent with a non-2xx status, so the body is decoded
//! regardless of status and only reported as [`BridgeError::Status`] when it
//! is not an envelope.
//!
//! No retries: each call issues exactly one request.

use crate::config::AgentConfig;
use async_trait::async_trait;
use lumen_app::runtime_bridge::{
    BridgeError, ComposerBridge, CreateMessageResponse, ValidationResponse,
};
use lumen_app::workflows::payload::{CreateMessageRequest, ValidationRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const VALIDATE_PATH: &str = "content/validate";
const MESSAGES_PATH: &str = "messages";

/// Longest response body kept in a [`BridgeError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Remote composer API over HTTPS.
#[derive(Clone, Debug)]
pub struct HttpBridge {
    http: reqwest::Client,
    api_base: Url,
}

impl HttpBridge {
    /// Create a bridge rooted at `api_base`.
    pub fn new(api_base: Url, timeout: Duration) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .user_agent(concat!("lumen-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, api_base })
    }

    /// Create a bridge from resolved agent settings.
    pub fn from_config(config: &AgentConfig) -> Result<Self, BridgeError> {
        let api_base = config
            .composer
            .api_base_url()
            .map_err(|e| BridgeError::transport(e.to_string()))?;
        Self::new(api_base, config.http_timeout())
    }

    /// Base URL requests are resolved against.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url, BridgeError> {
        self.api_base
            .join(path)
            .map_err(|e| BridgeError::transport(format!("invalid endpoint {path}: {e}")))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BridgeError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BridgeError::transport(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BridgeError::transport(e.to_string()))?;

        decode_envelope(status, &bytes)
    }
}

/// Decode an API envelope.
///
/// Success statuses must decode; anything else is [`BridgeError::Decode`].
/// Other statuses decode if they can, else become [`BridgeError::Status`].
pub(crate) fn decode_envelope<R: DeserializeOwned>(status: u16, body: &[u8]) -> Result<R, BridgeError> {
    if (200..300).contains(&status) {
        return serde_json::from_slice(body).map_err(|e| BridgeError::decode(e.to_string()));
    }
    serde_json::from_slice(body).map_err(|_| {
        let text: String = String::from_utf8_lossy(body)
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect();
        BridgeError::Status { status, body: text }
    })
}

#[async_trait]
impl ComposerBridge for HttpBridge {
    async fn validate_content(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, BridgeError> {
        self.post_json(VALIDATE_PATH, request).await
    }

    async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse, BridgeError> {
        self.post_json(MESSAGES_PATH, request).await
    }
}
