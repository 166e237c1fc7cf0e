//! End-to-end composer scenarios through the public API.

use assert_matches::assert_matches;
use lumen_app::errors::DialogAction;
use lumen_app::presenter::ConfirmationPrompt;
use lumen_app::runtime_bridge::{FeedbackPayload, ValidationResponse};
use lumen_app::testing::{MockBridge, PresenterEvent, RecordingPlayer, ScriptedPresenter};
use lumen_app::views::{EffectDomain, MediaRef, NONE_KEY};
use lumen_app::{
    Composer, ComposerConfig, CreateMessageResponse, EffectCatalog, PersonaProfile,
    PipelineStage, SubmissionError, SubmissionOutcome, UserId, MESSAGE_LIMIT_EXCEEDED,
};
use std::sync::Arc;

const SETTLE: u64 = 300;

struct Fixture {
    composer: Composer,
    bridge: Arc<MockBridge>,
}

async fn open_with(bridge: MockBridge) -> Fixture {
    let bridge = Arc::new(bridge);
    let composer = Composer::new(
        ComposerConfig::default(),
        EffectCatalog::builtin(),
        bridge.clone(),
        Arc::new(RecordingPlayer::default()),
        UserId::new("user-42"),
    )
    .unwrap();
    composer
        .open(PersonaProfile::new(
            "persona-7",
            "Mira",
            MediaRef::new("persona/mira.jpg"),
        ))
        .await
        .unwrap();
    Fixture { composer, bridge }
}

async fn open() -> Fixture {
    open_with(MockBridge::new()).await
}

/// Walk active → words → fading_messages → collector and save `words`.
async fn configure_fading_messages(composer: &Composer, words: &[&str], start: u64) -> u64 {
    composer
        .open_category_list(EffectDomain::Active, start)
        .await
        .unwrap();
    composer.select_category("words", start).await.unwrap();
    let t = start + SETTLE;
    composer.tick(t).await;
    composer.select_detail("fading_messages", t).await.unwrap();
    let t = t + SETTLE;
    composer.tick(t).await;
    composer
        .save_configuration(words.iter().copied(), t)
        .await
        .unwrap();
    t
}

// ============================================================================
// Scenario A: empty text
// ============================================================================

#[tokio::test]
async fn test_scenario_a_empty_text_requires_content() {
    let fx = open().await;
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::ContentRequired);
    assert_eq!(outcome.error(), Some(SubmissionError::ContentRequired));
    assert_eq!(fx.bridge.validate_calls(), 0);
    assert_eq!(fx.bridge.create_calls(), 0);
    assert_eq!(presenter.reopened(), vec![String::new()]);
    assert!(presenter.prompts().is_empty());
    assert_eq!(fx.composer.pipeline_stage(), PipelineStage::Idle);
}

// ============================================================================
// Scenario B: no effects
// ============================================================================

#[tokio::test]
async fn test_scenario_b_declining_no_effects_prompt() {
    let fx = open().await;
    fx.composer.set_text("I miss you").await.unwrap();
    let presenter = ScriptedPresenter::declining();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::Cancelled);
    assert_eq!(presenter.prompts(), vec![ConfirmationPrompt::NoEffects]);
    assert_eq!(fx.bridge.validate_calls(), 0);
    assert_eq!(fx.bridge.create_calls(), 0);
    assert_eq!(fx.composer.pipeline_stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn test_scenario_b_accepting_no_effects_prompt() {
    let fx = open().await;
    fx.composer.set_text("I miss you").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    let link = assert_matches!(outcome, SubmissionOutcome::Succeeded(link) => link);
    assert_eq!(
        link.url.as_str(),
        "https://share.lumen.app/m/persona-7/abc123"
    );
    assert_eq!(presenter.prompts(), vec![ConfirmationPrompt::NoEffects]);
    assert_eq!(fx.bridge.validate_calls(), 1);
    assert_eq!(fx.bridge.create_calls(), 1);

    let validation = fx.bridge.last_validation().unwrap();
    assert_eq!(validation.persona_id, "persona-7");
    assert_eq!(validation.user_id, UserId::new("user-42"));

    let creation = fx.bridge.last_creation().unwrap();
    let body = serde_json::to_value(&creation).unwrap();
    assert_eq!(body["title"], "I miss you");
    assert_eq!(body["backdrop_ref"], "persona/mira.jpg");
    assert_eq!(
        body["effect_config"],
        serde_json::json!({"background_effect": null, "active_effect": null, "custom_words": null})
    );
}

// ============================================================================
// Scenario C: configurable effect then "none"
// ============================================================================

#[tokio::test]
async fn test_scenario_c_custom_words_then_none() {
    let fx = open().await;
    let t = configure_fading_messages(&fx.composer, &["hello", "world"], 0).await;

    let effects = fx.composer.effects().await.unwrap();
    assert_eq!(effects.active_effect().unwrap().as_str(), "fading_messages");
    assert_eq!(effects.custom_words().to_vec(), vec!["hello", "world"]);

    let later = t + 5_000;
    fx.composer
        .open_category_list(EffectDomain::Active, later)
        .await
        .unwrap();
    fx.composer.select_category(NONE_KEY, later).await.unwrap();

    let effects = fx.composer.effects().await.unwrap();
    assert!(effects.active_effect().is_none());
    assert!(effects.custom_words().is_empty());
    assert!(effects.animation().is_none());
}

#[tokio::test]
async fn test_configured_effect_reaches_creation_payload() {
    let fx = open().await;
    configure_fading_messages(&fx.composer, &["hello", "world"], 0).await;
    fx.composer.set_text("thinking of you").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    assert_matches!(outcome, SubmissionOutcome::Succeeded(_));
    assert_eq!(
        presenter.prompts(),
        vec![ConfirmationPrompt::FinalSummary {
            lines: vec!["Active effect: fading_messages (hello, world)".into()]
        }]
    );
    let creation = fx.bridge.last_creation().unwrap();
    assert_eq!(
        creation.effect_config.custom_words,
        Some(vec!["hello".to_string(), "world".to_string()])
    );
    assert_eq!(
        creation.effect_config.active_effect.as_deref(),
        Some("fading_messages")
    );
}

// ============================================================================
// Scenario D: rejection with feedback
// ============================================================================

#[tokio::test]
async fn test_scenario_d_rejection_surfaces_feedback() {
    let bridge = MockBridge::new().with_validation(Ok(ValidationResponse::unsafe_with(Some(
        FeedbackPayload {
            title: "T".into(),
            message: "M".into(),
        },
    ))));
    let fx = open_with(bridge).await;
    fx.composer.set_text("something harsh").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    let feedback = assert_matches!(outcome, SubmissionOutcome::Rejected(f) => f);
    assert_eq!(feedback.title, "T");
    assert_eq!(feedback.message, "M");
    assert_eq!(feedback.action(), DialogAction::Rewrite);
    assert_eq!(fx.bridge.create_calls(), 0);

    let events = presenter.events();
    assert_eq!(
        &events[1..],
        &[
            PresenterEvent::Rejection(feedback.clone()),
            PresenterEvent::ReopenEditor("something harsh".into()),
        ]
    );
    // Draft text is untouched
    assert_eq!(fx.composer.draft().await.unwrap().text(), "something harsh");
    assert_eq!(fx.composer.pipeline_stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn test_rejection_without_feedback_uses_fallback() {
    let bridge = MockBridge::new().with_validation(Ok(ValidationResponse::unsafe_with(None)));
    let fx = open_with(bridge).await;
    fx.composer.set_text("hmm").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();
    let feedback = assert_matches!(outcome, SubmissionOutcome::Rejected(f) => f);
    assert_eq!(feedback.persona_name, "Mira");
    assert!(!feedback.message.is_empty());
}

// ============================================================================
// Scenario E: message limit
// ============================================================================

#[tokio::test]
async fn test_scenario_e_limit_routes_to_upgrade() {
    let bridge =
        MockBridge::new().with_creation(Ok(CreateMessageResponse::failed(MESSAGE_LIMIT_EXCEEDED)));
    let fx = open_with(bridge).await;
    fx.composer.set_text("one more").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::Failed(SubmissionError::LimitExceeded));
    let dialogs = presenter.dialogs();
    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].action, DialogAction::Upgrade);
}

#[tokio::test]
async fn test_other_creation_error_is_generic_failure() {
    let bridge = MockBridge::new().with_creation(Ok(CreateMessageResponse::failed("SERVER_ERROR")));
    let fx = open_with(bridge).await;
    fx.composer.set_text("hello").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let outcome = fx.composer.generate(&presenter).await.unwrap();

    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(SubmissionError::CreationFailed {
            code: "SERVER_ERROR".into()
        })
    );
    assert_eq!(presenter.dialogs()[0].action, DialogAction::Acknowledge);
}

// ============================================================================
// Exactly-once validation
// ============================================================================

#[tokio::test]
async fn test_double_generate_validates_once() {
    let fx = open().await;
    fx.composer.set_text("I miss you").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    let (first, second) = futures::join!(
        fx.composer.generate(&presenter),
        fx.composer.generate(&presenter)
    );

    let outcomes = [first.unwrap(), second.unwrap()];
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, SubmissionOutcome::Ignored))
            .count(),
        1
    );
    assert_eq!(fx.bridge.validate_calls(), 1);
    assert_eq!(fx.bridge.create_calls(), 1);
}

#[tokio::test]
async fn test_sequential_attempts_each_validate_once() {
    let fx = open().await;
    fx.composer.set_text("first").await.unwrap();
    let presenter = ScriptedPresenter::accepting();

    fx.composer.generate(&presenter).await.unwrap();
    fx.composer.generate(&presenter).await.unwrap();

    assert_eq!(fx.bridge.validate_calls(), 2);
    assert_eq!(fx.bridge.create_calls(), 2);
}

// ============================================================================
// Close while in flight
// ============================================================================

#[tokio::test]
async fn test_close_during_validation_discards_result() {
    let fx = open().await;
    let gate = fx.bridge.hold_validation();
    fx.composer.set_text("bye").await.unwrap();
    let presenter = ScriptedPresenter::accepting();
    let mut stages = fx.composer.subscribe_pipeline();

    let closer = async {
        while *stages.borrow_and_update() != PipelineStage::RemoteValidating {
            stages.changed().await.unwrap();
        }
        fx.composer.close(0).await;
        gate.notify_one();
    };
    let (outcome, ()) = futures::join!(fx.composer.generate(&presenter), closer);

    assert_eq!(outcome.unwrap(), SubmissionOutcome::Discarded);
    // The attempt ran to completion
    assert_eq!(fx.bridge.validate_calls(), 1);
    assert_eq!(fx.bridge.create_calls(), 1);
    assert!(presenter.dialogs().is_empty());
    assert_eq!(fx.composer.pipeline_stage(), PipelineStage::Idle);
}

// ============================================================================
// "None" always clears a domain
// ============================================================================

#[tokio::test]
async fn test_none_clears_every_domain() {
    let fx = open().await;
    let c = &fx.composer;
    let mut t = configure_fading_messages(c, &["hi"], 0).await + 1_000;

    for (domain, category, item) in [
        (EffectDomain::Background, "light", "aurora"),
        (EffectDomain::Music, "romantic", "slow_dance"),
    ] {
        c.open_category_list(domain, t).await.unwrap();
        c.select_category(category, t).await.unwrap();
        t += SETTLE;
        c.tick(t).await;
        c.select_detail(item, t).await.unwrap();
        t += 1_000;
    }
    let effects = c.effects().await.unwrap();
    assert!(EffectDomain::all().iter().all(|d| effects.is_domain_set(*d)));

    for domain in EffectDomain::all() {
        c.open_category_list(*domain, t).await.unwrap();
        t += SETTLE;
        c.tick(t).await;
        c.select_category(NONE_KEY, t).await.unwrap();
        t += 1_000;
        assert!(!c.effects().await.unwrap().is_domain_set(*domain));
    }
    assert!(c.effects().await.unwrap().is_unembellished());
}
