//! # Views
//!
//! Plain state types shared by the composer workflows: effect configuration,
//! catalog data, custom words, selection stages and the message draft.

pub mod catalog;
pub mod draft;
pub mod effects;
pub mod selection;
pub mod words;

pub use catalog::{CategoryKind, EffectCatalog, EffectCategory, EffectItem};
pub use draft::{MessageDraft, PersonaProfile, UserId};
pub use effects::{
    AnimationRef, EffectConfiguration, EffectDomain, EffectRef, MediaRef, MusicSelection, NONE_KEY,
};
pub use selection::{PendingEffect, SelectionStage, Sheet, SheetCommand};
pub use words::{CustomWords, WordLimits, WordsError};
