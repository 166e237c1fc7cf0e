//! # Composer Facade
//!
//! Owns one composer session at a time and wires the effect picker, music
//! policy, reveal timeline and submission pipeline together.
//!
//! Every operation takes the state lock briefly. `generate` snapshots the
//! draft under a read lock and releases it before any await, so selection and
//! text edits never wait on the network.
//!
//! Time is supplied by the caller as `now_ms` on any monotonic clock.

use crate::core::command_slot::{CommandSlot, ComposerCommand, SlotRegistration};
use crate::core::{ComposerConfig, ComposerError};
use crate::presenter::ComposerPresenter;
use crate::reveal::{RevealSchedule, RevealTimeline};
use crate::runtime_bridge::ComposerBridge;
use crate::views::catalog::EffectCatalog;
use crate::views::draft::{MessageDraft, PersonaProfile, UserId};
use crate::views::effects::{EffectConfiguration, EffectDomain, MediaRef};
use crate::views::selection::{SelectionStage, SheetCommand};
use crate::workflows::music::{MusicController, MusicPlayer};
use crate::workflows::selection::{SelectionContext, SelectionController};
use crate::workflows::submission::{
    PipelineStage, SessionEpoch, SessionToken, SubmissionOutcome, SubmissionPipeline,
    SubmissionRequest,
};
use async_lock::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

// ============================================================================
// Update types
// ============================================================================

/// What the host should do after a composer operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComposerUpdate {
    /// Sheets to present or dismiss, in order
    pub sheets: Vec<SheetCommand>,
    /// Reveal schedule to play
    pub reveal: Option<RevealSchedule>,
    /// Whether the backdrop was reset to the persona default
    pub reset_backdrop: bool,
}

impl ComposerUpdate {
    fn from_sheets(sheets: Vec<SheetCommand>) -> Self {
        Self {
            sheets,
            ..Self::default()
        }
    }

    /// Check if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty() && self.reveal.is_none() && !self.reset_backdrop
    }
}

/// Returned by [`Composer::open`].
#[derive(Debug)]
pub struct ComposerSession {
    /// Entrance update
    pub update: ComposerUpdate,
    /// Commands invoked through the composer's [`CommandSlot`]. Closes when
    /// the session ends.
    pub commands: mpsc::UnboundedReceiver<ComposerCommand>,
}

// ============================================================================
// State
// ============================================================================

struct Session {
    draft: MessageDraft,
    selection: SelectionController,
    token: SessionToken,
    _registration: SlotRegistration,
}

struct ComposerState {
    session: Option<Session>,
    music: MusicController,
    reveal: RevealTimeline,
}

impl ComposerState {
    fn session_mut(&mut self) -> Result<&mut Session, ComposerError> {
        self.session.as_mut().ok_or(ComposerError::NotOpen)
    }

    fn with_selection<R>(
        &mut self,
        f: impl FnOnce(&mut SelectionController, &mut SelectionContext<'_>) -> R,
    ) -> Result<R, ComposerError> {
        let session = self.session.as_mut().ok_or(ComposerError::NotOpen)?;
        let mut ctx = SelectionContext {
            effects: session.draft.effects_mut(),
            music: &mut self.music,
        };
        Ok(f(&mut session.selection, &mut ctx))
    }
}

// ============================================================================
// Composer
// ============================================================================

/// Headless message composer.
pub struct Composer {
    config: Arc<ComposerConfig>,
    catalog: Arc<EffectCatalog>,
    user_id: UserId,
    state: RwLock<ComposerState>,
    pipeline: SubmissionPipeline,
    epoch: SessionEpoch,
    slot: CommandSlot,
}

impl Composer {
    /// Create a closed composer.
    ///
    /// Fails if the config or catalog is invalid.
    pub fn new(
        config: ComposerConfig,
        catalog: EffectCatalog,
        bridge: Arc<dyn ComposerBridge>,
        player: Arc<dyn MusicPlayer>,
        user_id: UserId,
    ) -> Result<Self, ComposerError> {
        config.validate()?;
        catalog.validate()?;
        let config = Arc::new(config);
        let pipeline = SubmissionPipeline::new(bridge, config.clone())?;
        let reveal = RevealTimeline::new(config.reveal.clone(), config.quick_actions);

        Ok(Self {
            catalog: Arc::new(catalog),
            user_id,
            state: RwLock::new(ComposerState {
                session: None,
                music: MusicController::new(player),
                reveal,
            }),
            pipeline,
            epoch: SessionEpoch::default(),
            slot: CommandSlot::new(),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Catalog in use.
    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    /// Slot external affordances invoke commands through.
    pub fn command_slot(&self) -> CommandSlot {
        self.slot.clone()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Open a session addressed from `persona`.
    pub async fn open(&self, persona: PersonaProfile) -> Result<ComposerSession, ComposerError> {
        let mut state = self.state.write().await;
        if state.session.is_some() {
            return Err(ComposerError::invalid_transition("composer is already open"));
        }

        let (registration, commands) = self.slot.register();
        let draft = MessageDraft::new(persona);
        tracing::info!(persona = %draft.persona().id, "composer opened");

        let reveal = state.reveal.set_visible(true).map(|t| t.schedule);
        state.reveal.on_text_changed(draft.text());
        state.session = Some(Session {
            draft,
            selection: SelectionController::new(
                self.catalog.clone(),
                self.config.transition_settle_ms,
            ),
            token: self.epoch.begin(),
            _registration: registration,
        });

        Ok(ComposerSession {
            update: ComposerUpdate {
                reveal,
                ..ComposerUpdate::default()
            },
            commands,
        })
    }

    /// Close the session, discarding the draft and any unapplied selection.
    ///
    /// A submission still in flight runs to completion; its result is
    /// discarded. Closing a closed composer does nothing.
    pub async fn close(&self, now_ms: u64) -> ComposerUpdate {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let Some(mut session) = state.session.take() else {
            return ComposerUpdate::default();
        };
        self.epoch.end();

        let sheets = session.selection.cancel(
            &mut SelectionContext {
                effects: session.draft.effects_mut(),
                music: &mut state.music,
            },
            now_ms,
        );
        state.music.release();

        let transition = state.reveal.set_visible(false);
        tracing::info!(persona = %session.draft.persona().id, "composer closed");

        ComposerUpdate {
            sheets,
            reset_backdrop: transition.as_ref().is_some_and(|t| t.reset_backdrop),
            reveal: transition.map(|t| t.schedule),
        }
    }

    /// Whether a session is open.
    pub async fn is_open(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    /// Report the composer surface gaining or losing visibility while open.
    ///
    /// Losing visibility clears the backdrop override.
    pub async fn set_visible(&self, visible: bool) -> Result<ComposerUpdate, ComposerError> {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let session = state.session.as_mut().ok_or(ComposerError::NotOpen)?;

        let Some(transition) = state.reveal.set_visible(visible) else {
            return Ok(ComposerUpdate::default());
        };
        if transition.reset_backdrop {
            session.draft.effects_mut().set_backdrop_override(None);
        } else {
            state.reveal.on_text_changed(session.draft.text());
        }
        Ok(ComposerUpdate {
            reveal: Some(transition.schedule),
            reset_backdrop: transition.reset_backdrop,
            ..ComposerUpdate::default()
        })
    }

    // ========================================================================
    // Draft
    // ========================================================================

    /// Replace the message text.
    pub async fn set_text(&self, text: impl Into<String>) -> Result<ComposerUpdate, ComposerError> {
        let mut state = self.state.write().await;
        let state = &mut *state;
        let session = state.session.as_mut().ok_or(ComposerError::NotOpen)?;
        session.draft.set_text(text, self.config.max_text_chars)?;
        let reveal = state.reveal.on_text_changed(session.draft.text());
        Ok(ComposerUpdate {
            reveal,
            ..ComposerUpdate::default()
        })
    }

    /// Replace or clear the session backdrop override.
    pub async fn set_backdrop_override(&self, media: Option<MediaRef>) -> Result<(), ComposerError> {
        let mut state = self.state.write().await;
        state
            .session_mut()?
            .draft
            .effects_mut()
            .set_backdrop_override(media);
        Ok(())
    }

    /// Snapshot of the draft.
    pub async fn draft(&self) -> Option<MessageDraft> {
        self.state.read().await.session.as_ref().map(|s| s.draft.clone())
    }

    /// Snapshot of the effect configuration.
    pub async fn effects(&self) -> Option<EffectConfiguration> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.draft.effects().clone())
    }

    // ========================================================================
    // Effect selection
    // ========================================================================

    /// Open a domain's category list.
    pub async fn open_category_list(
        &self,
        domain: EffectDomain,
        now_ms: u64,
    ) -> Result<ComposerUpdate, ComposerError> {
        let mut state = self.state.write().await;
        let sheets =
            state.with_selection(|selection, ctx| selection.open_category_list(domain, ctx, now_ms))?;
        Ok(ComposerUpdate::from_sheets(sheets))
    }

    /// Pick a category from the open list.
    pub async fn select_category(
        &self,
        key: &str,
        now_ms: u64,
    ) -> Result<ComposerUpdate, ComposerError> {
        let mut state = self.state.write().await;
        let sheets =
            state.with_selection(|selection, ctx| selection.select_category(key, ctx, now_ms))??;
        Ok(ComposerUpdate::from_sheets(sheets))
    }

    /// Pick an item from the open detail list.
    pub async fn select_detail(&self, key: &str, now_ms: u64) -> Result<ComposerUpdate, ComposerError> {
        let mut state = self.state.write().await;
        let sheets =
            state.with_selection(|selection, ctx| selection.select_detail(key, ctx, now_ms))??;
        Ok(ComposerUpdate::from_sheets(sheets))
    }

    /// Preview a music track from the open detail list.
    pub async fn preview_track(&self, key: &str) -> Result<(), ComposerError> {
        let mut state = self.state.write().await;
        state.with_selection(|selection, ctx| selection.preview_track(key, ctx))?
    }

    /// Save collected words for the pending effect.
    pub async fn save_configuration<I, S>(
        &self,
        words: I,
        now_ms: u64,
    ) -> Result<ComposerUpdate, ComposerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.write().await;
        let sheets = state
            .with_selection(|selection, ctx| selection.save_configuration(words, ctx, now_ms))??;
        Ok(ComposerUpdate::from_sheets(sheets))
    }

    /// Close the open sheet without applying anything.
    pub async fn cancel_selection(&self, now_ms: u64) -> Result<ComposerUpdate, ComposerError> {
        let mut state = self.state.write().await;
        let sheets = state.with_selection(|selection, ctx| selection.cancel(ctx, now_ms))?;
        Ok(ComposerUpdate::from_sheets(sheets))
    }

    /// Release sheets whose settle interval has elapsed.
    pub async fn tick(&self, now_ms: u64) -> ComposerUpdate {
        let mut state = self.state.write().await;
        match state.session.as_mut() {
            Some(session) => ComposerUpdate::from_sheets(session.selection.tick(now_ms)),
            None => ComposerUpdate::default(),
        }
    }

    /// Current selection stage.
    pub async fn selection_stage(&self) -> Option<SelectionStage> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.selection.stage().clone())
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Current pipeline stage.
    pub fn pipeline_stage(&self) -> PipelineStage {
        self.pipeline.stage()
    }

    /// Watch pipeline stage changes.
    pub fn subscribe_pipeline(&self) -> watch::Receiver<PipelineStage> {
        self.pipeline.subscribe()
    }

    /// Run a submission attempt for the open draft.
    ///
    /// Ignored while another attempt is running. On success the caller shares
    /// the link and closes the composer.
    pub async fn generate(
        &self,
        presenter: &dyn ComposerPresenter,
    ) -> Result<SubmissionOutcome, ComposerError> {
        let (request, token) = {
            let state = self.state.read().await;
            let session = state.session.as_ref().ok_or(ComposerError::NotOpen)?;
            (
                SubmissionRequest {
                    draft: session.draft.clone(),
                    user_id: self.user_id.clone(),
                },
                session.token.clone(),
            )
        };
        Ok(self.pipeline.submit(request, presenter, &token).await)
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("user_id", &self.user_id)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::ScheduleKind;
    use crate::testing::{MockBridge, PlayerCall, RecordingPlayer, ScriptedPresenter};
    use crate::views::selection::Sheet;

    fn composer() -> (Composer, Arc<MockBridge>, Arc<RecordingPlayer>) {
        let bridge = Arc::new(MockBridge::new());
        let player = Arc::new(RecordingPlayer::default());
        let composer = Composer::new(
            ComposerConfig::default(),
            EffectCatalog::builtin(),
            bridge.clone(),
            player.clone(),
            UserId::new("u-1"),
        )
        .unwrap();
        (composer, bridge, player)
    }

    fn persona() -> PersonaProfile {
        PersonaProfile::new("p-1", "Mira", MediaRef::new("persona/mira.jpg"))
    }

    #[tokio::test]
    async fn test_open_plays_entrance_and_registers_slot() {
        let (composer, _, _) = composer();
        let session = composer.open(persona()).await.unwrap();
        assert_eq!(session.update.reveal.unwrap().kind, ScheduleKind::Entrance);
        assert!(composer.command_slot().is_registered());
        assert!(composer.open(persona()).await.is_err());
    }

    #[tokio::test]
    async fn test_operations_require_open_session() {
        let (composer, _, _) = composer();
        assert_eq!(composer.set_text("hi").await, Err(ComposerError::NotOpen));
        assert_eq!(
            composer.open_category_list(EffectDomain::Active, 0).await,
            Err(ComposerError::NotOpen)
        );
        let presenter = ScriptedPresenter::accepting();
        assert_eq!(
            composer.generate(&presenter).await,
            Err(ComposerError::NotOpen)
        );
        assert!(composer.close(0).await.is_empty());
    }

    #[tokio::test]
    async fn test_text_changes_replay_content() {
        let (composer, _, _) = composer();
        composer.open(persona()).await.unwrap();
        let update = composer.set_text("hello").await.unwrap();
        assert_eq!(update.reveal.unwrap().kind, ScheduleKind::ContentReplay);
        assert!(composer.set_text("").await.unwrap().reveal.is_none());
    }

    #[tokio::test]
    async fn test_text_over_cap_is_rejected() {
        let (composer, _, _) = composer();
        composer.open(persona()).await.unwrap();
        let err = composer.set_text("x".repeat(501)).await.unwrap_err();
        assert_eq!(err, ComposerError::TextTooLong { max: 500, actual: 501 });
    }

    #[tokio::test]
    async fn test_close_resets_everything() {
        let (composer, _, player) = composer();
        let mut session = composer.open(persona()).await.unwrap();
        composer
            .set_backdrop_override(Some(MediaRef::new("custom.jpg")))
            .await
            .unwrap();
        composer.open_category_list(EffectDomain::Music, 0).await.unwrap();
        composer.select_category("calm", 0).await.unwrap();
        composer.tick(300).await;
        composer.preview_track("piano_dawn").await.unwrap();

        let update = composer.close(400).await;
        assert_eq!(
            update.sheets,
            vec![SheetCommand::Dismiss(Sheet::DetailList {
                domain: EffectDomain::Music,
                category: "calm".into()
            })]
        );
        assert!(update.reset_backdrop);
        assert_eq!(update.reveal.unwrap().kind, ScheduleKind::Exit);
        assert_eq!(player.calls().last(), Some(&PlayerCall::Reset));
        assert!(!composer.command_slot().is_registered());
        assert!(session.commands.recv().await.is_none());
        assert!(composer.draft().await.is_none());

        // Reopening starts from a clean draft
        composer.open(persona()).await.unwrap();
        assert!(composer.effects().await.unwrap().is_unembellished());
    }

    #[tokio::test]
    async fn test_visibility_loss_clears_backdrop_override() {
        let (composer, _, _) = composer();
        composer.open(persona()).await.unwrap();
        composer
            .set_backdrop_override(Some(MediaRef::new("custom.jpg")))
            .await
            .unwrap();

        let update = composer.set_visible(false).await.unwrap();
        assert!(update.reset_backdrop);
        let draft = composer.draft().await.unwrap();
        assert_eq!(draft.resource_ref().as_str(), "persona/mira.jpg");

        let update = composer.set_visible(true).await.unwrap();
        assert_eq!(update.reveal.unwrap().kind, ScheduleKind::Entrance);
    }

    #[tokio::test]
    async fn test_slot_command_reaches_session() {
        let (composer, bridge, _) = composer();
        let mut session = composer.open(persona()).await.unwrap();
        composer.set_text("I miss you").await.unwrap();

        assert!(composer.command_slot().invoke(ComposerCommand::Generate));
        let command = session.commands.recv().await.unwrap();
        assert_eq!(command, ComposerCommand::Generate);

        let presenter = ScriptedPresenter::accepting();
        let outcome = composer.generate(&presenter).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Succeeded(_)));
        assert_eq!(bridge.validate_calls(), 1);
    }
}
