//! # Composer Presenter
//!
//! Host-side presentation a submission needs: confirmation prompts, the
//! persona-voiced rejection sheet, failure dialogs and reopening the editor.
//! The core decides *what* to show; the host renders it.

use crate::errors::{DialogAction, ErrorDialog};
use crate::runtime_bridge::ValidationResponse;
use crate::views::draft::PersonaProfile;
use crate::views::effects::MediaRef;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Confirmation asked before any network call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationPrompt {
    /// No effect domain is set
    NoEffects,
    /// At least one domain is set; lists what will be sent
    FinalSummary {
        /// One line per set domain
        lines: Vec<String>,
    },
}

impl ConfirmationPrompt {
    /// Prompt title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::NoEffects => "Send without effects?",
            Self::FinalSummary { .. } => "Create this message?",
        }
    }

    /// Prompt body.
    pub fn message(&self) -> String {
        match self {
            Self::NoEffects => {
                "You haven't picked any effects or music. Send your message as plain text?"
                    .to_string()
            }
            Self::FinalSummary { lines } => lines.join("\n"),
        }
    }

    /// Label of the confirming button.
    #[must_use]
    pub fn confirm_label(&self) -> &'static str {
        match self {
            Self::NoEffects => "Continue",
            Self::FinalSummary { .. } => "Create",
        }
    }

    /// Whether the confirm button uses the destructive style.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::FinalSummary { .. })
    }
}

/// Persona-voiced explanation shown when content is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionFeedback {
    /// Sheet title
    pub title: String,
    /// Sheet body
    pub message: String,
    /// Name of the persona voicing the feedback
    pub persona_name: String,
    /// Persona media shown beside the feedback
    pub persona_media: Option<MediaRef>,
    /// Moderation category, if reported
    pub category: Option<String>,
    /// Text the editor is reopened with
    pub original_text: String,
}

impl RejectionFeedback {
    /// Build from an unsafe verdict, substituting a fallback when the service
    /// sent no feedback.
    pub fn from_response(
        response: ValidationResponse,
        persona: &PersonaProfile,
        original_text: &str,
    ) -> Self {
        let (persona_name, persona_media) = match response.persona {
            Some(voice) => (voice.name, voice.media_ref.map(MediaRef::new)),
            None => (persona.name.clone(), None),
        };
        let persona_media = persona_media.or_else(|| Some(persona.media_ref.clone()));

        let (title, message) = match response.feedback {
            Some(feedback) => (feedback.title, feedback.message),
            None => (
                format!("A note from {persona_name}"),
                format!(
                    "{persona_name} thinks this message might not land the way you mean it. \
                     Try putting it another way."
                ),
            ),
        };

        Self {
            title,
            message,
            persona_name,
            persona_media,
            category: response.category,
            original_text: original_text.to_string(),
        }
    }

    /// The only action the rejection sheet offers.
    #[must_use]
    pub fn action(&self) -> DialogAction {
        DialogAction::Rewrite
    }
}

/// Presentation services a submission consumes.
#[async_trait]
pub trait ComposerPresenter: Send + Sync {
    /// Ask for confirmation. `false` when declined or dismissed.
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;

    /// Show the rejection sheet; resolves when its single action is taken.
    async fn present_rejection(&self, feedback: &RejectionFeedback);

    /// Show a failure dialog; resolves when its single action is taken.
    async fn present_dialog(&self, dialog: &ErrorDialog);

    /// Bring the text editor back up with `text`.
    fn reopen_editor(&self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_bridge::{FeedbackPayload, PersonaVoice};

    fn persona() -> PersonaProfile {
        PersonaProfile::new("p-1", "Mira", MediaRef::new("persona/mira.jpg"))
    }

    #[test]
    fn test_feedback_from_service() {
        let response = ValidationResponse {
            category: Some("insult".into()),
            persona: Some(PersonaVoice {
                name: "Mira".into(),
                media_ref: Some("persona/mira_sad.jpg".into()),
            }),
            ..ValidationResponse::unsafe_with(Some(FeedbackPayload {
                title: "T".into(),
                message: "M".into(),
            }))
        };
        let feedback = RejectionFeedback::from_response(response, &persona(), "you idiot");
        assert_eq!(feedback.title, "T");
        assert_eq!(feedback.message, "M");
        assert_eq!(feedback.persona_media, Some(MediaRef::new("persona/mira_sad.jpg")));
        assert_eq!(feedback.category.as_deref(), Some("insult"));
        assert_eq!(feedback.original_text, "you idiot");
        assert_eq!(feedback.action(), DialogAction::Rewrite);
    }

    #[test]
    fn test_fallback_feedback_uses_persona() {
        let feedback =
            RejectionFeedback::from_response(ValidationResponse::unsafe_with(None), &persona(), "x");
        assert_eq!(feedback.title, "A note from Mira");
        assert!(feedback.message.starts_with("Mira thinks"));
        assert_eq!(feedback.persona_media, Some(MediaRef::new("persona/mira.jpg")));
    }

    #[test]
    fn test_prompt_styles() {
        assert!(!ConfirmationPrompt::NoEffects.is_destructive());
        let summary = ConfirmationPrompt::FinalSummary {
            lines: vec!["Background effect: snow".into(), "Music: Slow Dance".into()],
        };
        assert!(summary.is_destructive());
        assert_eq!(summary.message(), "Background effect: snow\nMusic: Slow Dance");
    }
}
