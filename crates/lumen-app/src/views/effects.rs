//! # Effect Configuration
//!
//! The per-session effect state a message is composed with: ambient
//! background effect, active overlay effect (plus its custom words and lottie
//! reference), background music, and an optional backdrop override.
//!
//! Fields are private so the custom-words invariant holds: words are only
//! present while the applied active effect requires configuration.

use crate::views::words::CustomWords;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog key that means "no effect" in every domain.
pub const NONE_KEY: &str = "none";

/// One of the three independent effect domains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDomain {
    /// Foreground overlay effect
    Active,
    /// Ambient background effect
    Background,
    /// Background music
    Music,
}

impl EffectDomain {
    /// All domains in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Active, Self::Background, Self::Music]
    }

    /// Short label for logs and summaries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active effect",
            Self::Background => "Background effect",
            Self::Music => "Music",
        }
    }
}

impl fmt::Display for EffectDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Background => write!(f, "background"),
            Self::Music => write!(f, "music"),
        }
    }
}

macro_rules! string_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_ref!(
    /// Identifier of a visual effect (catalog item key).
    EffectRef
);
string_ref!(
    /// Reference to an image/video backdrop.
    MediaRef
);
string_ref!(
    /// Reference to a lottie animation asset.
    AnimationRef
);

/// Selected background music track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicSelection {
    /// Catalog key of the track
    pub key: String,
    /// Streamable URL
    pub url: String,
    /// Display title
    pub title: String,
}

/// Effect state owned by one composer session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectConfiguration {
    background_effect: Option<EffectRef>,
    active_effect: Option<EffectRef>,
    custom_words: CustomWords,
    music: Option<MusicSelection>,
    animation: Option<AnimationRef>,
    backdrop_override: Option<MediaRef>,
}

impl EffectConfiguration {
    /// Ambient background effect, if any.
    pub fn background_effect(&self) -> Option<&EffectRef> {
        self.background_effect.as_ref()
    }

    /// Active overlay effect, if any.
    pub fn active_effect(&self) -> Option<&EffectRef> {
        self.active_effect.as_ref()
    }

    /// Custom words for the active effect (empty unless it is configurable).
    pub fn custom_words(&self) -> &CustomWords {
        &self.custom_words
    }

    /// Background music, if any.
    pub fn music(&self) -> Option<&MusicSelection> {
        self.music.as_ref()
    }

    /// Lottie reference carried by the active effect.
    pub fn animation(&self) -> Option<&AnimationRef> {
        self.animation.as_ref()
    }

    /// Backdrop override replacing the persona's own media.
    pub fn backdrop_override(&self) -> Option<&MediaRef> {
        self.backdrop_override.as_ref()
    }

    /// Apply a non-configurable active effect. Clears custom words.
    pub fn apply_active(&mut self, effect: EffectRef, animation: Option<AnimationRef>) {
        self.active_effect = Some(effect);
        self.animation = animation;
        self.custom_words.clear();
    }

    /// Apply a configurable active effect together with its finalized words.
    pub fn apply_configured_active(
        &mut self,
        effect: EffectRef,
        animation: Option<AnimationRef>,
        words: CustomWords,
    ) {
        self.active_effect = Some(effect);
        self.animation = animation;
        self.custom_words = words;
    }

    /// Clear the active domain, including words and lottie reference.
    pub fn clear_active(&mut self) {
        self.active_effect = None;
        self.animation = None;
        self.custom_words.clear();
    }

    /// Set the ambient background effect.
    pub fn apply_background(&mut self, effect: EffectRef) {
        self.background_effect = Some(effect);
    }

    /// Clear the ambient background effect.
    pub fn clear_background(&mut self) {
        self.background_effect = None;
    }

    /// Set background music.
    pub fn apply_music(&mut self, music: MusicSelection) {
        self.music = Some(music);
    }

    /// Clear background music key, URL and title.
    pub fn clear_music(&mut self) {
        self.music = None;
    }

    /// Replace (or drop) the backdrop override.
    pub fn set_backdrop_override(&mut self, media: Option<MediaRef>) {
        self.backdrop_override = media;
    }

    /// Clear one domain back to its default.
    pub fn clear_domain(&mut self, domain: EffectDomain) {
        match domain {
            EffectDomain::Active => self.clear_active(),
            EffectDomain::Background => self.clear_background(),
            EffectDomain::Music => self.clear_music(),
        }
    }

    /// Whether a domain currently has a value.
    pub fn is_domain_set(&self, domain: EffectDomain) -> bool {
        match domain {
            EffectDomain::Active => self.active_effect.is_some(),
            EffectDomain::Background => self.background_effect.is_some(),
            EffectDomain::Music => self.music.is_some(),
        }
    }

    /// True when none of the three domains is set.
    pub fn is_unembellished(&self) -> bool {
        EffectDomain::all()
            .iter()
            .all(|domain| !self.is_domain_set(*domain))
    }

    /// Human-readable lines describing the set domains.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(active) = &self.active_effect {
            if self.custom_words.is_empty() {
                lines.push(format!("{}: {active}", EffectDomain::Active.label()));
            } else {
                let words: Vec<&str> = self.custom_words.iter().collect();
                lines.push(format!(
                    "{}: {active} ({})",
                    EffectDomain::Active.label(),
                    words.join(", ")
                ));
            }
        }
        if let Some(background) = &self.background_effect {
            lines.push(format!("{}: {background}", EffectDomain::Background.label()));
        }
        if let Some(music) = &self.music {
            lines.push(format!("{}: {}", EffectDomain::Music.label(), music.title));
        }
        lines
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
