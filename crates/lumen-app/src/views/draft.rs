//! # Message Draft
//!
//! The message being composed: text, effect configuration and the persona it
//! is addressed from. One draft exists per open composer session.

use crate::core::ComposerError;
use crate::views::effects::{EffectConfiguration, MediaRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persona the message is sent from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Stable persona identifier
    pub id: String,
    /// Display name, used in fallback feedback
    pub name: String,
    /// Default backdrop media
    pub media_ref: MediaRef,
}

impl PersonaProfile {
    /// Create a persona profile.
    pub fn new(id: impl Into<String>, name: impl Into<String>, media_ref: MediaRef) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            media_ref,
        }
    }
}

/// Text plus effects for one composer session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDraft {
    text: String,
    effects: EffectConfiguration,
    persona: PersonaProfile,
}

impl MessageDraft {
    /// Empty draft addressed from `persona`.
    pub fn new(persona: PersonaProfile) -> Self {
        Self {
            text: String::new(),
            effects: EffectConfiguration::default(),
            persona,
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, rejecting anything over `max_chars` characters.
    pub fn set_text(&mut self, text: impl Into<String>, max_chars: usize) -> Result<(), ComposerError> {
        let text = text.into();
        let actual = text.chars().count();
        if actual > max_chars {
            return Err(ComposerError::TextTooLong {
                max: max_chars,
                actual,
            });
        }
        self.text = text;
        Ok(())
    }

    /// Whether the text has any non-whitespace content.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Effect configuration.
    pub fn effects(&self) -> &EffectConfiguration {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut EffectConfiguration {
        &mut self.effects
    }

    /// Persona the draft is addressed from.
    pub fn persona(&self) -> &PersonaProfile {
        &self.persona
    }

    /// Backdrop sent with the message: the override if set, else the persona's media.
    pub fn resource_ref(&self) -> &MediaRef {
        self.effects
            .backdrop_override()
            .unwrap_or(&self.persona.media_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> PersonaProfile {
        PersonaProfile::new("p-1", "Mira", MediaRef::new("persona/mira.jpg"))
    }

    #[test]
    fn test_set_text_enforces_cap() {
        let mut draft = MessageDraft::new(persona());
        draft.set_text("é".repeat(10), 10).unwrap();
        assert_eq!(draft.text().chars().count(), 10);

        let err = draft.set_text("x".repeat(11), 10).unwrap_err();
        assert_eq!(err, ComposerError::TextTooLong { max: 10, actual: 11 });
        // Rejected text leaves the previous value in place
        assert_eq!(draft.text(), "é".repeat(10));
    }

    #[test]
    fn test_has_content_ignores_whitespace() {
        let mut draft = MessageDraft::new(persona());
        assert!(!draft.has_content());
        draft.set_text(" \n\t ", 500).unwrap();
        assert!(!draft.has_content());
        draft.set_text(" hi ", 500).unwrap();
        assert!(draft.has_content());
    }

    #[test]
    fn test_resource_ref_prefers_override() {
        let mut draft = MessageDraft::new(persona());
        assert_eq!(draft.resource_ref().as_str(), "persona/mira.jpg");

        draft
            .effects_mut()
            .set_backdrop_override(Some(MediaRef::new("custom/beach.mp4")));
        assert_eq!(draft.resource_ref().as_str(), "custom/beach.mp4");

        draft.effects_mut().set_backdrop_override(None);
        assert_eq!(draft.resource_ref().as_str(), "persona/mira.jpg");
    }
}
