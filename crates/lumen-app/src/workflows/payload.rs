//! # Request Payloads
//!
//! Builds the validation and creation request bodies from a [`MessageDraft`].
//!
//! `effect_config` is always sent with all three keys; unset values are
//! serialized as `null`, never omitted.

use crate::core::ComposerConfig;
use crate::views::draft::{MessageDraft, UserId};
use crate::views::effects::EffectConfiguration;
use serde::{Deserialize, Serialize};

/// Body of the content-safety validation call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// Message text as typed
    pub text: String,
    /// Persona the reply tone is derived from
    pub persona_id: String,
    /// Sender, for relationship context
    pub user_id: UserId,
}

impl ValidationRequest {
    /// Build from the open draft.
    pub fn from_draft(draft: &MessageDraft, user_id: &UserId) -> Self {
        Self {
            text: draft.text().to_string(),
            persona_id: draft.persona().id.clone(),
            user_id: user_id.clone(),
        }
    }
}

/// `Y`/`N` wire flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    /// `"Y"`
    #[serde(rename = "Y")]
    Yes,
    /// `"N"`
    #[serde(rename = "N")]
    No,
}

/// Nested effect selection sent with a new message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectConfigPayload {
    /// Ambient background effect key
    pub background_effect: Option<String>,
    /// Active overlay effect key
    pub active_effect: Option<String>,
    /// Custom words, `null` when the active effect carries none
    pub custom_words: Option<Vec<String>>,
}

impl From<&EffectConfiguration> for EffectConfigPayload {
    fn from(effects: &EffectConfiguration) -> Self {
        let words = effects.custom_words();
        Self {
            background_effect: effects.background_effect().map(|e| e.to_string()),
            active_effect: effects.active_effect().map(|e| e.to_string()),
            custom_words: (!words.is_empty()).then(|| words.to_vec()),
        }
    }
}

/// Body of the message creation call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    /// Sender
    pub user_id: UserId,
    /// Persona the message is sent from
    pub persona_id: String,
    /// Resolved backdrop (override, else persona media)
    pub backdrop_ref: String,
    /// Leading characters of the text
    pub title: String,
    /// Full text
    pub text: String,
    /// Fixed animation kind
    pub animation_kind: String,
    /// Background effect key, duplicated for older readers
    pub particle_effect: Option<String>,
    /// Music catalog key
    pub bg_music_key: Option<String>,
    /// Music stream URL
    pub bg_music_url: Option<String>,
    /// Nested effect selection
    pub effect_config: EffectConfigPayload,
    /// Always `N`
    pub has_password: Flag,
    /// Always `Y`
    pub public: Flag,
}

impl CreateMessageRequest {
    /// Build from the open draft.
    pub fn from_draft(draft: &MessageDraft, user_id: &UserId, config: &ComposerConfig) -> Self {
        let effects = draft.effects();
        let music = effects.music();
        Self {
            user_id: user_id.clone(),
            persona_id: draft.persona().id.clone(),
            backdrop_ref: draft.resource_ref().to_string(),
            title: derive_title(draft.text(), config.title_chars),
            text: draft.text().to_string(),
            animation_kind: config.animation_kind.clone(),
            particle_effect: effects.background_effect().map(|e| e.to_string()),
            bg_music_key: music.map(|m| m.key.clone()),
            bg_music_url: music.map(|m| m.url.clone()),
            effect_config: EffectConfigPayload::from(effects),
            has_password: Flag::No,
            public: Flag::Yes,
        }
    }
}

/// First `max_chars` characters of `text`.
#[must_use]
pub fn derive_title(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
