//! # Workflows - Composer Business Logic
//!
//! Multi-step operations behind the composer facade:
//!
//! - [`selection`]: two-step effect picker
//! - [`transition`]: settle interval between sheet dismiss and present
//! - [`music`]: pause-vs-reset policy for the playback resource
//! - [`payload`]: request bodies built from the draft
//! - [`submission`]: validate-then-create pipeline
//!
//! Workflows return domain types and [`SheetCommand`](crate::views::SheetCommand)s;
//! rendering them is the host's job.

pub mod music;
pub mod payload;
pub mod selection;
pub mod submission;
pub mod transition;

pub use music::{MusicController, MusicPlayer, PlaybackState};
pub use payload::{CreateMessageRequest, EffectConfigPayload, Flag, ValidationRequest};
pub use selection::{SelectionContext, SelectionController};
pub use submission::{
    PipelineStage, SessionEpoch, SessionToken, ShareLink, SubmissionOutcome, SubmissionPipeline,
    SubmissionRequest,
};
pub use transition::TransitionGuard;
