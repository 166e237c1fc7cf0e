//! Composer configuration.

use crate::core::ComposerError;
use crate::reveal::RevealTimings;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default remote API base.
pub const DEFAULT_API_BASE: &str = "https://api.lumen.app/v1/";
/// Default share link base.
pub const DEFAULT_SHARE_BASE: &str = "https://share.lumen.app/m";
/// Animation kind sent with every created message.
pub const DEFAULT_ANIMATION_KIND: &str = "emotional_message";

/// Settings for one composer instance.
///
/// URLs are kept as strings so partial config files deserialize without
/// failing; [`ComposerConfig::validate`] parses them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Remote API base the bridge talks to
    pub api_base: String,
    /// Base of share links; persona id and short code are appended
    pub share_base: String,
    /// Maximum message length in characters
    pub max_text_chars: usize,
    /// Characters of text used as the message title
    pub title_chars: usize,
    /// Fixed animation kind for created messages
    pub animation_kind: String,
    /// Gap between dismissing a sheet and presenting the next
    pub transition_settle_ms: u64,
    /// Number of quick-action affordances on the composer
    pub quick_actions: u8,
    /// Reveal offsets and durations
    pub reveal: RevealTimings,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            share_base: DEFAULT_SHARE_BASE.to_string(),
            max_text_chars: 500,
            title_chars: 30,
            animation_kind: DEFAULT_ANIMATION_KIND.to_string(),
            transition_settle_ms: 300,
            quick_actions: 4,
            reveal: RevealTimings::default(),
        }
    }
}

impl ComposerConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ComposerError> {
        self.api_base_url()?;
        self.share_base_url()?;
        if self.max_text_chars == 0 {
            return Err(ComposerError::invalid("max_text_chars must be non-zero"));
        }
        if self.title_chars == 0 {
            return Err(ComposerError::invalid("title_chars must be non-zero"));
        }
        if self.animation_kind.trim().is_empty() {
            return Err(ComposerError::invalid("animation_kind must not be empty"));
        }
        self.reveal.validate()
    }

    /// Parsed API base, always ending in `/` so endpoints join under it.
    pub fn api_base_url(&self) -> Result<Url, ComposerError> {
        let mut url = parse_http_url("api_base", &self.api_base)?;
        if url.cannot_be_a_base() {
            return Err(ComposerError::invalid(format!(
                "api_base cannot take path segments: {url}"
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Parsed share base.
    pub fn share_base_url(&self) -> Result<Url, ComposerError> {
        let url = parse_http_url("share_base", &self.share_base)?;
        if url.cannot_be_a_base() {
            return Err(ComposerError::invalid(format!(
                "share_base cannot take path segments: {url}"
            )));
        }
        Ok(url)
    }
}

fn parse_http_url(field: &str, value: &str) -> Result<Url, ComposerError> {
    let url = Url::parse(value)
        .map_err(|e| ComposerError::invalid(format!("{field} is not a valid URL ({e}): {value}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ComposerError::invalid(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}
