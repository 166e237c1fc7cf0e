//! # Effect Catalog
//!
//! Categories and items offered by each effect domain's two-step picker.
//!
//! A category is either [`CategoryKind::Direct`] (selecting it is terminal,
//! e.g. "none") or [`CategoryKind::Modal`] (it opens a detail list). Detail
//! items with `word_limits` require configuration: picking one opens the word
//! collector instead of applying immediately.
//!
//! Catalogs are plain data. Hosts may ship their own as JSON; the built-in
//! catalog is used otherwise.

use crate::core::ComposerError;
use crate::views::effects::{AnimationRef, EffectDomain, NONE_KEY};
use crate::views::words::WordLimits;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A selectable effect, track, or backdrop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectItem {
    /// Stable key sent to the API
    pub key: String,
    /// Display title
    pub title: String,
    /// Present when the item requires custom words before it can be applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_limits: Option<WordLimits>,
    /// Lottie asset played for this effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationRef>,
    /// Stream URL (music items only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EffectItem {
    /// Plain item with no configuration, animation or URL.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            word_limits: None,
            animation: None,
            url: None,
        }
    }

    /// Require custom words within `limits`.
    #[must_use]
    pub fn with_word_limits(mut self, limits: WordLimits) -> Self {
        self.word_limits = Some(limits);
        self
    }

    /// Attach a lottie asset.
    #[must_use]
    pub fn with_animation(mut self, animation: impl Into<String>) -> Self {
        self.animation = Some(AnimationRef::new(animation));
        self
    }

    /// Attach a stream URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether selecting this item opens the word collector.
    pub fn requires_configuration(&self) -> bool {
        self.word_limits.is_some()
    }
}

/// How selecting a category resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryKind {
    /// Terminal on selection. `value: None` clears the domain.
    Direct {
        /// Value applied on selection
        #[serde(default)]
        value: Option<EffectItem>,
    },
    /// Opens a detail list.
    Modal {
        /// Detail items
        items: Vec<EffectItem>,
    },
}

/// A top-level entry in a domain's category sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCategory {
    /// Stable key
    pub key: String,
    /// Display title
    pub title: String,
    /// Resolution behavior
    pub kind: CategoryKind,
}

impl EffectCategory {
    /// The "none" category every domain starts with.
    pub fn none() -> Self {
        Self {
            key: NONE_KEY.to_string(),
            title: "None".to_string(),
            kind: CategoryKind::Direct { value: None },
        }
    }

    /// A direct category applying `value`.
    pub fn direct(value: EffectItem) -> Self {
        Self {
            key: value.key.clone(),
            title: value.title.clone(),
            kind: CategoryKind::Direct { value: Some(value) },
        }
    }

    /// A modal category with detail items.
    pub fn modal(key: impl Into<String>, title: impl Into<String>, items: Vec<EffectItem>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind: CategoryKind::Modal { items },
        }
    }

    /// Whether selecting the category is terminal.
    pub fn is_direct(&self) -> bool {
        matches!(self.kind, CategoryKind::Direct { .. })
    }

    /// Detail items (empty for direct categories).
    pub fn items(&self) -> &[EffectItem] {
        match &self.kind {
            CategoryKind::Direct { .. } => &[],
            CategoryKind::Modal { items } => items,
        }
    }
}

/// Categories for all three domains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCatalog {
    /// Active overlay categories
    pub active: Vec<EffectCategory>,
    /// Ambient background categories
    pub background: Vec<EffectCategory>,
    /// Music categories
    pub music: Vec<EffectCategory>,
}

impl EffectCatalog {
    /// Parse and validate a JSON catalog.
    pub fn from_json(json: &str) -> Result<Self, ComposerError> {
        let catalog: Self = serde_json::from_str(json)
            .map_err(|e| ComposerError::invalid(format!("Failed to parse catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Categories for a domain, in display order.
    pub fn categories(&self, domain: EffectDomain) -> &[EffectCategory] {
        match domain {
            EffectDomain::Active => &self.active,
            EffectDomain::Background => &self.background,
            EffectDomain::Music => &self.music,
        }
    }

    /// Look up a category.
    pub fn category(&self, domain: EffectDomain, key: &str) -> Result<&EffectCategory, ComposerError> {
        self.categories(domain)
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| ComposerError::unknown_entry(domain, key))
    }

    /// Look up a detail item within a category.
    pub fn item(
        &self,
        domain: EffectDomain,
        category: &str,
        key: &str,
    ) -> Result<&EffectItem, ComposerError> {
        self.category(domain, category)?
            .items()
            .iter()
            .find(|i| i.key == key)
            .ok_or_else(|| ComposerError::unknown_entry(domain, format!("{category}/{key}")))
    }

    /// Check structural rules.
    ///
    /// - every domain has a direct "none" category clearing it
    /// - category keys are unique per domain
    /// - modal categories are non-empty
    /// - only active items may require configuration, with non-zero limits
    /// - every music value carries a URL
    pub fn validate(&self) -> Result<(), ComposerError> {
        for domain in EffectDomain::all() {
            let categories = self.categories(*domain);

            let has_none = categories.iter().any(|c| {
                c.key == NONE_KEY && matches!(c.kind, CategoryKind::Direct { value: None })
            });
            if !has_none {
                return Err(ComposerError::invalid(format!(
                    "{domain} catalog has no direct \"{NONE_KEY}\" category"
                )));
            }

            let mut keys = HashSet::new();
            for category in categories {
                if !keys.insert(category.key.as_str()) {
                    return Err(ComposerError::invalid(format!(
                        "{domain} catalog repeats category {}",
                        category.key
                    )));
                }

                let values: Vec<&EffectItem> = match &category.kind {
                    CategoryKind::Direct { value } => value.iter().collect(),
                    CategoryKind::Modal { items } => {
                        if items.is_empty() {
                            return Err(ComposerError::invalid(format!(
                                "{domain} category {} has no items",
                                category.key
                            )));
                        }
                        items.iter().collect()
                    }
                };

                for item in values {
                    Self::validate_item(*domain, item)?;
                }
            }
        }
        Ok(())
    }

    fn validate_item(domain: EffectDomain, item: &EffectItem) -> Result<(), ComposerError> {
        if item.key == NONE_KEY {
            return Err(ComposerError::invalid(format!(
                "{domain} item may not use the reserved key \"{NONE_KEY}\""
            )));
        }
        if let Some(limits) = item.word_limits {
            if domain != EffectDomain::Active {
                return Err(ComposerError::invalid(format!(
                    "{domain} item {} cannot require configuration",
                    item.key
                )));
            }
            if limits.max_words == 0 || limits.max_chars == 0 {
                return Err(ComposerError::invalid(format!(
                    "item {} has zero word limits",
                    item.key
                )));
            }
        }
        if domain == EffectDomain::Music && item.url.is_none() {
            return Err(ComposerError::invalid(format!(
                "music item {} has no url",
                item.key
            )));
        }
        Ok(())
    }

    /// Catalog shipped with the app.
    pub fn builtin() -> Self {
        let active = vec![
            EffectCategory::none(),
            EffectCategory::modal(
                "words",
                "Words",
                vec![
                    EffectItem::new("fading_messages", "Fading Messages")
                        .with_word_limits(WordLimits::SHORT_WORDS)
                        .with_animation("lottie/fading_messages.json"),
                    EffectItem::new("floating_phrases", "Floating Phrases")
                        .with_word_limits(WordLimits::PHRASES)
                        .with_animation("lottie/floating_phrases.json"),
                ],
            ),
            EffectCategory::modal(
                "particles",
                "Particles",
                vec![
                    EffectItem::new("heart_burst", "Heart Burst")
                        .with_animation("lottie/heart_burst.json"),
                    EffectItem::new("sparkles", "Sparkles").with_animation("lottie/sparkles.json"),
                    EffectItem::new("petals", "Falling Petals")
                        .with_animation("lottie/petals.json"),
                ],
            ),
            EffectCategory::direct(
                EffectItem::new("confetti", "Confetti").with_animation("lottie/confetti.json"),
            ),
        ];

        let background = vec![
            EffectCategory::none(),
            EffectCategory::modal(
                "weather",
                "Weather",
                vec![
                    EffectItem::new("rain", "Soft Rain"),
                    EffectItem::new("snow", "Snowfall"),
                ],
            ),
            EffectCategory::modal(
                "light",
                "Light",
                vec![
                    EffectItem::new("aurora", "Aurora"),
                    EffectItem::new("fireflies", "Fireflies"),
                    EffectItem::new("starfield", "Starfield"),
                ],
            ),
        ];

        let music = vec![
            EffectCategory::none(),
            EffectCategory::modal(
                "calm",
                "Calm",
                vec![
                    EffectItem::new("piano_dawn", "Piano at Dawn")
                        .with_url("https://cdn.lumen.app/music/piano_dawn.mp3"),
                    EffectItem::new("rain_lofi", "Rainy Lo-fi")
                        .with_url("https://cdn.lumen.app/music/rain_lofi.mp3"),
                ],
            ),
            EffectCategory::modal(
                "romantic",
                "Romantic",
                vec![
                    EffectItem::new("moonlight_strings", "Moonlight Strings")
                        .with_url("https://cdn.lumen.app/music/moonlight_strings.mp3"),
                    EffectItem::new("slow_dance", "Slow Dance")
                        .with_url("https://cdn.lumen.app/music/slow_dance.mp3"),
                ],
            ),
        ];

        Self {
            active,
            background,
            music,
        }
    }
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
