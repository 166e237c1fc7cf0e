//! # Submission Pipeline
//!
//! Local checks → confirmation → remote validation → remote creation →
//! outcome routing.
//!
//! ## Stages
//!
//! ```text
//! Idle → LocalChecking → (AwaitingEffectsConfirmation | AwaitingFinalConfirmation)
//!      → RemoteValidating → RemoteCreating → Succeeded | Rejected | Failed → Idle
//! ```
//!
//! The stage is published on a `tokio::sync::watch` channel. Entering
//! `LocalChecking` is a compare-and-set on that channel, so a second submit
//! while one is running is ignored rather than queued. The two remote calls
//! run strictly in sequence, at most once each, with no cancellation once
//! validation has started.
//!
//! Validation fails open: transport errors and error envelopes are logged and
//! the attempt proceeds as if the content were safe.

use crate::core::{ComposerConfig, ComposerError};
use crate::errors::SubmissionError;
use crate::presenter::{ComposerPresenter, ConfirmationPrompt, RejectionFeedback};
use crate::runtime_bridge::{ComposerBridge, CreateMessageResponse, MESSAGE_LIMIT_EXCEEDED};
use crate::views::draft::{MessageDraft, UserId};
use crate::workflows::payload::{CreateMessageRequest, ValidationRequest};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

// ============================================================================
// Session liveness
// ============================================================================

/// Counter bumped every time a composer session opens or closes.
#[derive(Clone, Debug, Default)]
pub struct SessionEpoch {
    current: Arc<AtomicU64>,
}

impl SessionEpoch {
    /// Start a new session and return its token.
    pub fn begin(&self) -> SessionToken {
        let epoch = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        SessionToken {
            epoch,
            current: self.current.clone(),
        }
    }

    /// End the current session; outstanding tokens go stale.
    pub fn end(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}

/// Proof that a result still belongs to the open session.
#[derive(Clone, Debug)]
pub struct SessionToken {
    epoch: u64,
    current: Arc<AtomicU64>,
}

impl SessionToken {
    /// Whether the session this token was issued for is still open.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.epoch
    }
}

// ============================================================================
// Stage and outcome types
// ============================================================================

/// Observable pipeline state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Ready for a new attempt
    #[default]
    Idle,
    /// Checking the draft locally
    LocalChecking,
    /// Asking whether to send without effects
    AwaitingEffectsConfirmation,
    /// Asking to confirm the effect summary
    AwaitingFinalConfirmation,
    /// Content-safety call in flight
    RemoteValidating,
    /// Creation call in flight
    RemoteCreating,
    /// Message created
    Succeeded,
    /// Content rejected
    Rejected,
    /// Creation failed
    Failed,
}

impl PipelineStage {
    /// Whether a new attempt may start.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a remote call is in flight.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteValidating | Self::RemoteCreating)
    }
}

/// Shareable locator of a created message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    /// Persona the message was sent from
    pub persona_id: String,
    /// Code returned by the creation call
    pub short_code: String,
    /// `{share_base}/{persona_id}/{short_code}`
    pub url: Url,
}

impl ShareLink {
    /// Append `persona_id` and `short_code` to `base` as path segments.
    pub fn build(base: &Url, persona_id: &str, short_code: &str) -> Result<Self, SubmissionError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| SubmissionError::unexpected(format!("share base {base} cannot be a base")))?
            .pop_if_empty()
            .push(persona_id)
            .push(short_code);
        Ok(Self {
            persona_id: persona_id.to_string(),
            short_code: short_code.to_string(),
            url,
        })
    }
}

/// How a submit call ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Another attempt was already running
    Ignored,
    /// Text was empty; the editor was reopened
    ContentRequired,
    /// A confirmation was declined
    Cancelled,
    /// Content was rejected; the rejection sheet was shown
    Rejected(RejectionFeedback),
    /// Creation failed; the dialog was shown
    Failed(SubmissionError),
    /// Message created
    Succeeded(ShareLink),
    /// The composer closed before the result could be shown
    Discarded,
}

impl SubmissionOutcome {
    /// Routed error, if the outcome is a failure.
    pub fn error(&self) -> Option<SubmissionError> {
        match self {
            Self::ContentRequired => Some(SubmissionError::ContentRequired),
            Self::Rejected(feedback) => Some(SubmissionError::ValidationRejected {
                category: feedback.category.clone(),
            }),
            Self::Failed(err) => Some(err.clone()),
            Self::Ignored | Self::Cancelled | Self::Succeeded(_) | Self::Discarded => None,
        }
    }
}

/// Snapshot a submission works from.
#[derive(Clone, Debug)]
pub struct SubmissionRequest {
    /// Draft at the moment generate was invoked
    pub draft: MessageDraft,
    /// Sender
    pub user_id: UserId,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Resets the stage to `Idle` when an attempt ends, however it ends.
struct StageGuard<'a> {
    stage: &'a watch::Sender<PipelineStage>,
}

impl StageGuard<'_> {
    fn advance(&self, next: PipelineStage) {
        tracing::debug!(stage = ?next, "submission stage");
        self.stage.send_replace(next);
    }
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        self.stage.send_replace(PipelineStage::Idle);
    }
}

/// Runs submission attempts against a [`ComposerBridge`].
pub struct SubmissionPipeline {
    bridge: Arc<dyn ComposerBridge>,
    config: Arc<ComposerConfig>,
    share_base: Url,
    stage: watch::Sender<PipelineStage>,
}

impl SubmissionPipeline {
    /// Create an idle pipeline.
    pub fn new(
        bridge: Arc<dyn ComposerBridge>,
        config: Arc<ComposerConfig>,
    ) -> Result<Self, ComposerError> {
        let share_base = config.share_base_url()?;
        let (stage, _) = watch::channel(PipelineStage::Idle);
        Ok(Self {
            bridge,
            config,
            share_base,
            stage,
        })
    }

    /// Current stage.
    pub fn stage(&self) -> PipelineStage {
        *self.stage.borrow()
    }

    /// Watch stage changes.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStage> {
        self.stage.subscribe()
    }

    fn try_begin(&self) -> Option<StageGuard<'_>> {
        let started = self.stage.send_if_modified(|stage| {
            if stage.is_idle() {
                *stage = PipelineStage::LocalChecking;
                true
            } else {
                false
            }
        });
        started.then_some(StageGuard { stage: &self.stage })
    }

    /// Run one attempt to completion and route its result.
    ///
    /// Nothing is presented once `token` goes stale; the outcome is then
    /// [`SubmissionOutcome::Discarded`].
    pub async fn submit(
        &self,
        request: SubmissionRequest,
        presenter: &dyn ComposerPresenter,
        token: &SessionToken,
    ) -> SubmissionOutcome {
        let Some(guard) = self.try_begin() else {
            tracing::debug!(stage = ?self.stage(), "submission already running, ignoring");
            return SubmissionOutcome::Ignored;
        };
        let draft = &request.draft;

        if !draft.has_content() {
            if !token.is_current() {
                return SubmissionOutcome::Discarded;
            }
            presenter.reopen_editor(draft.text());
            return SubmissionOutcome::ContentRequired;
        }

        let prompt = if draft.effects().is_unembellished() {
            guard.advance(PipelineStage::AwaitingEffectsConfirmation);
            ConfirmationPrompt::NoEffects
        } else {
            guard.advance(PipelineStage::AwaitingFinalConfirmation);
            ConfirmationPrompt::FinalSummary {
                lines: draft.effects().summary(),
            }
        };
        if !presenter.confirm(&prompt).await {
            tracing::debug!("submission declined at confirmation");
            return SubmissionOutcome::Cancelled;
        }
        if !token.is_current() {
            return SubmissionOutcome::Discarded;
        }

        guard.advance(PipelineStage::RemoteValidating);
        let validation = ValidationRequest::from_draft(draft, &request.user_id);
        match self.bridge.validate_content(&validation).await {
            Ok(response) if response.success && response.safe == Some(false) => {
                guard.advance(PipelineStage::Rejected);
                let feedback = RejectionFeedback::from_response(response, draft.persona(), draft.text());
                tracing::info!(category = ?feedback.category, "content rejected");
                return Self::route_rejection(feedback, presenter, token).await;
            }
            Ok(response) if response.success => {}
            Ok(response) => {
                let err = SubmissionError::ValidationServiceUnavailable {
                    reason: response.error_code.unwrap_or_else(|| "UNKNOWN".to_string()),
                };
                tracing::warn!(error = %err, "validation returned an error, proceeding as safe");
            }
            Err(e) => {
                let err = SubmissionError::ValidationServiceUnavailable {
                    reason: e.to_string(),
                };
                tracing::warn!(error = %err, "validation unreachable, proceeding as safe");
            }
        }

        guard.advance(PipelineStage::RemoteCreating);
        let creation = CreateMessageRequest::from_draft(draft, &request.user_id, &self.config);
        let result = match self.bridge.create_message(&creation).await {
            Ok(response) => self.interpret_creation(response, &draft.persona().id),
            Err(e) => Err(SubmissionError::unexpected(e.to_string())),
        };

        match result {
            Ok(link) => {
                guard.advance(PipelineStage::Succeeded);
                tracing::info!(short_code = %link.short_code, "message created");
                if !token.is_current() {
                    return SubmissionOutcome::Discarded;
                }
                SubmissionOutcome::Succeeded(link)
            }
            Err(err) => {
                guard.advance(PipelineStage::Failed);
                if err.is_recoverable() {
                    tracing::warn!(code = err.code(), error = %err, "message creation failed");
                } else {
                    tracing::error!(code = err.code(), error = %err, "message creation failed");
                }
                Self::route_failure(err, presenter, token).await
            }
        }
    }

    fn interpret_creation(
        &self,
        response: CreateMessageResponse,
        persona_id: &str,
    ) -> Result<ShareLink, SubmissionError> {
        if !response.success {
            return Err(match response.error_code.as_deref() {
                Some(MESSAGE_LIMIT_EXCEEDED) => SubmissionError::LimitExceeded,
                code => SubmissionError::creation_failed(code),
            });
        }
        let data = response
            .data
            .ok_or_else(|| SubmissionError::creation_failed(Some("MISSING_SHORT_CODE")))?;
        ShareLink::build(&self.share_base, persona_id, &data.short_code)
    }

    async fn route_rejection(
        feedback: RejectionFeedback,
        presenter: &dyn ComposerPresenter,
        token: &SessionToken,
    ) -> SubmissionOutcome {
        if !token.is_current() {
            return SubmissionOutcome::Discarded;
        }
        presenter.present_rejection(&feedback).await;
        if token.is_current() {
            presenter.reopen_editor(&feedback.original_text);
        }
        SubmissionOutcome::Rejected(feedback)
    }

    async fn route_failure(
        err: SubmissionError,
        presenter: &dyn ComposerPresenter,
        token: &SessionToken,
    ) -> SubmissionOutcome {
        if !token.is_current() {
            return SubmissionOutcome::Discarded;
        }
        if let Some(dialog) = err.dialog() {
            presenter.present_dialog(&dialog).await;
        }
        SubmissionOutcome::Failed(err)
    }
}

impl std::fmt::Debug for SubmissionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPipeline")
            .field("share_base", &self.share_base)
            .field("stage", &self.stage())
            .finish_non_exhaustive()
    }
}
