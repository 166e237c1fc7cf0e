//! # Test Doubles
//!
//! In-memory implementations of the host traits for unit and integration
//! tests. Enabled with the `testing` feature.

use crate::errors::ErrorDialog;
use crate::presenter::{ComposerPresenter, ConfirmationPrompt, RejectionFeedback};
use crate::runtime_bridge::{
    BridgeError, ComposerBridge, CreateMessageResponse, ValidationResponse,
};
use crate::workflows::music::MusicPlayer;
use crate::workflows::payload::{CreateMessageRequest, ValidationRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

// ============================================================================
// MockBridge
// ============================================================================

/// Scripted [`ComposerBridge`] that counts calls.
///
/// Replies are popped from per-call queues; an empty queue answers with a
/// safe verdict and a created message with short code `abc123`. Each call
/// yields once before replying so concurrent observers get polled.
#[derive(Default)]
pub struct MockBridge {
    validations: Mutex<VecDeque<Result<ValidationResponse, BridgeError>>>,
    creations: Mutex<VecDeque<Result<CreateMessageResponse, BridgeError>>>,
    validate_calls: AtomicUsize,
    create_calls: AtomicUsize,
    last_validation: Mutex<Option<ValidationRequest>>,
    last_creation: Mutex<Option<CreateMessageRequest>>,
    validation_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockBridge {
    /// Bridge answering with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a validation reply.
    #[must_use]
    pub fn with_validation(self, reply: Result<ValidationResponse, BridgeError>) -> Self {
        self.validations.lock().push_back(reply);
        self
    }

    /// Queue a creation reply.
    #[must_use]
    pub fn with_creation(self, reply: Result<CreateMessageResponse, BridgeError>) -> Self {
        self.creations.lock().push_back(reply);
        self
    }

    /// Hold validation replies until the returned gate is notified.
    pub fn hold_validation(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.validation_gate.lock() = Some(gate.clone());
        gate
    }

    /// Number of validation calls so far.
    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    /// Number of creation calls so far.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Most recent validation request.
    pub fn last_validation(&self) -> Option<ValidationRequest> {
        self.last_validation.lock().clone()
    }

    /// Most recent creation request.
    pub fn last_creation(&self) -> Option<CreateMessageRequest> {
        self.last_creation.lock().clone()
    }
}

#[async_trait]
impl ComposerBridge for MockBridge {
    async fn validate_content(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResponse, BridgeError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_validation.lock() = Some(request.clone());

        let gate = self.validation_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;

        self.validations
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ValidationResponse::safe()))
    }

    async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse, BridgeError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_creation.lock() = Some(request.clone());
        tokio::task::yield_now().await;

        self.creations
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(CreateMessageResponse::created("abc123")))
    }
}

// ============================================================================
// ScriptedPresenter
// ============================================================================

/// Something the presenter was asked to show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresenterEvent {
    /// Confirmation prompt
    Confirm(ConfirmationPrompt),
    /// Rejection sheet
    Rejection(RejectionFeedback),
    /// Failure dialog
    Dialog(ErrorDialog),
    /// Editor reopened with text
    ReopenEditor(String),
}

/// [`ComposerPresenter`] answering confirmations from a script.
pub struct ScriptedPresenter {
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
    events: Mutex<Vec<PresenterEvent>>,
}

impl ScriptedPresenter {
    /// Confirm everything.
    pub fn accepting() -> Self {
        Self::with_answers([], true)
    }

    /// Decline everything.
    pub fn declining() -> Self {
        Self::with_answers([], false)
    }

    /// Answer confirmations in order, then fall back to `default_answer`.
    pub fn with_answers(answers: impl IntoIterator<Item = bool>, default_answer: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            default_answer,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Everything presented, in order.
    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().clone()
    }

    /// Confirmation prompts shown.
    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Confirm(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }

    /// Rejection sheets shown.
    pub fn rejections(&self) -> Vec<RejectionFeedback> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Rejection(feedback) => Some(feedback),
                _ => None,
            })
            .collect()
    }

    /// Failure dialogs shown.
    pub fn dialogs(&self) -> Vec<ErrorDialog> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Dialog(dialog) => Some(dialog),
                _ => None,
            })
            .collect()
    }

    /// Texts the editor was reopened with.
    pub fn reopened(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::ReopenEditor(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ComposerPresenter for ScriptedPresenter {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        self.events.lock().push(PresenterEvent::Confirm(prompt.clone()));
        self.answers.lock().pop_front().unwrap_or(self.default_answer)
    }

    async fn present_rejection(&self, feedback: &RejectionFeedback) {
        self.events
            .lock()
            .push(PresenterEvent::Rejection(feedback.clone()));
    }

    async fn present_dialog(&self, dialog: &ErrorDialog) {
        self.events.lock().push(PresenterEvent::Dialog(dialog.clone()));
    }

    fn reopen_editor(&self, text: &str) {
        self.events
            .lock()
            .push(PresenterEvent::ReopenEditor(text.to_string()));
    }
}

// ============================================================================
// RecordingPlayer
// ============================================================================

/// Call made on a [`MusicPlayer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCall {
    /// `load(url)`
    Load(String),
    /// `play()`
    Play,
    /// `pause()`
    Pause,
    /// `reset()`
    Reset,
}

/// [`MusicPlayer`] that records calls.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    calls: Mutex<Vec<PlayerCall>>,
}

impl RecordingPlayer {
    /// Calls so far, in order.
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }
}

impl MusicPlayer for RecordingPlayer {
    fn load(&self, url: &str) {
        self.calls.lock().push(PlayerCall::Load(url.to_string()));
    }

    fn play(&self) {
        self.calls.lock().push(PlayerCall::Play);
    }

    fn pause(&self) {
        self.calls.lock().push(PlayerCall::Pause);
    }

    fn reset(&self) {
        self.calls.lock().push(PlayerCall::Reset);
    }
}
