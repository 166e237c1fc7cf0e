//! Lumen App - Headless Message Composer Core
//!
//! This crate holds the portable logic behind the "compose an emotional
//! message" flow: picking layered effects through a two-step picker,
//! sequencing the reveal animation, and running the validate-then-create
//! submission pipeline. It has no HTTP stack, no audio device and no UI;
//! those are consumed through traits.
//!
//! # Architecture
//!
//! ```text
//! lumen-app (pure)                     host / lumen-agent
//! ┌───────────────────────────┐        ┌──────────────────────┐
//! │ Composer                  │        │ ComposerBridge impl  │
//! │  ├─ SelectionController   │◄───────│ MusicPlayer impl     │
//! │  ├─ MusicController       │        │ ComposerPresenter    │
//! │  ├─ RevealTimeline        │        └──────────────────────┘
//! │  └─ SubmissionPipeline    │
//! └───────────────────────────┘
//! ```
//!
//! Hosts execute the [`SheetCommand`]s and [`RevealSchedule`]s the composer
//! returns and call [`Composer::tick`] so deferred sheets get presented.

#![forbid(unsafe_code)]

/// Composer facade, configuration, command slot and error type
pub mod core;

/// Categorized submission errors
pub mod errors;

/// Presentation services consumed from the host
pub mod presenter;

/// Reveal schedules and easing
pub mod reveal;

/// Remote API trait and wire response types
pub mod runtime_bridge;

/// Plain state types
pub mod views;

/// Composer business logic
pub mod workflows;

/// Test doubles for the host traits
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::core::{
    CommandSlot, Composer, ComposerCommand, ComposerConfig, ComposerError, ComposerSession,
    ComposerUpdate,
};
pub use errors::{DialogAction, ErrorDialog, SubmissionError, ToastLevel};
pub use presenter::{ComposerPresenter, ConfirmationPrompt, RejectionFeedback};
pub use reveal::{RevealSchedule, RevealTimeline, RevealTimings};
pub use runtime_bridge::{
    BridgeError, ComposerBridge, CreateMessageResponse, ValidationResponse,
    MESSAGE_LIMIT_EXCEEDED,
};
pub use views::{
    EffectCatalog, EffectConfiguration, EffectDomain, MessageDraft, PersonaProfile,
    SelectionStage, Sheet, SheetCommand, UserId,
};
pub use workflows::{MusicPlayer, PipelineStage, ShareLink, SubmissionOutcome};
