//! Command-line host for the Lumen composer
//!
//! Opens a composer for one persona, applies the requested effects through
//! the two-step picker, and submits the message against the configured API.
//!
//! ```text
//! lumen-host --persona-id p-7 --persona-media persona/mira.jpg \
//!     --user-id u-42 --text "thinking of you" \
//!     --active words/fading_messages --word hello --word world \
//!     --background light/aurora --music calm/piano_dawn
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Parser;
use lumen_agent::{init_tracing, AgentConfig, HttpBridge};
use lumen_app::views::MediaRef;
use lumen_app::{
    Composer, ComposerCommand, ComposerPresenter, ComposerUpdate, ConfirmationPrompt,
    EffectCatalog, EffectDomain, ErrorDialog, MusicPlayer, PersonaProfile, RejectionFeedback,
    SelectionStage, SubmissionOutcome, UserId,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "lumen-host")]
#[command(about = "Compose and send one Lumen message", long_about = None)]
struct Cli {
    /// Persona the message is sent from
    #[arg(long)]
    persona_id: String,

    /// Persona display name
    #[arg(long, default_value = "Persona")]
    persona_name: String,

    /// Persona media used as the default backdrop
    #[arg(long)]
    persona_media: String,

    /// Sending user
    #[arg(long)]
    user_id: String,

    /// Message text
    #[arg(long)]
    text: String,

    /// Active effect as `category` or `category/item`
    #[arg(long)]
    active: Option<String>,

    /// Custom word for a configurable active effect (repeatable)
    #[arg(long = "word")]
    words: Vec<String>,

    /// Background effect as `category` or `category/item`
    #[arg(long)]
    background: Option<String>,

    /// Music as `category` or `category/item`
    #[arg(long)]
    music: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Host services
// ============================================================================

/// Presenter that prints to the terminal and reads answers from stdin.
struct ConsolePresenter {
    assume_yes: bool,
}

#[async_trait]
impl ComposerPresenter for ConsolePresenter {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        println!("\n{}\n{}", prompt.title(), prompt.message());
        if self.assume_yes {
            println!("> {}", prompt.confirm_label());
            return true;
        }

        print!("{}? [y/N] ", prompt.confirm_label());
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!(error = %e, "failed to flush prompt");
        }
        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read answer, treating as declined");
                false
            }
        }
    }

    async fn present_rejection(&self, feedback: &RejectionFeedback) {
        eprintln!("\n{} ({})", feedback.title, feedback.persona_name);
        eprintln!("{}", feedback.message);
    }

    async fn present_dialog(&self, dialog: &ErrorDialog) {
        eprintln!("\n{}\n{}\n[{}]", dialog.title, dialog.message, dialog.action.label());
    }

    fn reopen_editor(&self, text: &str) {
        eprintln!("(edit your message and try again: {} characters kept)", text.chars().count());
    }
}

/// Player with no audio device; logs what a real player would do.
struct LogPlayer;

impl MusicPlayer for LogPlayer {
    fn load(&self, url: &str) {
        tracing::info!(%url, "music loaded");
    }

    fn play(&self) {
        tracing::info!("music playing");
    }

    fn pause(&self) {
        tracing::info!("music paused");
    }

    fn reset(&self) {
        tracing::info!("music reset");
    }
}

/// Monotonic milliseconds since start.
struct Clock(Instant);

impl Clock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.0.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

// ============================================================================
// Session driving
// ============================================================================

fn log_update(update: &ComposerUpdate) {
    for command in &update.sheets {
        tracing::debug!(?command, "sheet");
    }
    if let Some(schedule) = &update.reveal {
        tracing::debug!(kind = ?schedule.kind, total_ms = schedule.total_ms(), "reveal");
    }
}

/// Wait out the settle interval and release any pending sheet.
async fn settle(composer: &Composer, clock: &Clock) {
    tokio::time::sleep(Duration::from_millis(composer.config().transition_settle_ms)).await;
    log_update(&composer.tick(clock.now_ms()).await);
}

async fn choose(
    composer: &Composer,
    clock: &Clock,
    domain: EffectDomain,
    choice: &str,
    words: &[String],
) -> Result<()> {
    let (category, item) = match choice.split_once('/') {
        Some((category, item)) => (category, Some(item)),
        None => (choice, None),
    };

    log_update(&composer.open_category_list(domain, clock.now_ms()).await?);
    settle(composer, clock).await;
    log_update(&composer.select_category(category, clock.now_ms()).await?);
    settle(composer, clock).await;

    if let Some(item) = item {
        log_update(&composer.select_detail(item, clock.now_ms()).await?);
        settle(composer, clock).await;
    }

    match composer.selection_stage().await {
        Some(SelectionStage::ConfiguringWords { .. }) => {
            if words.is_empty() {
                bail!("{choice} needs at least one --word");
            }
            log_update(&composer.save_configuration(words, clock.now_ms()).await?);
        }
        Some(SelectionStage::DetailOpen { .. }) => {
            log_update(&composer.cancel_selection(clock.now_ms()).await?);
            bail!("{choice} is a category; pick an item as {category}/<item>");
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AgentConfig::load_from(Some(path.as_path()))?,
        None => AgentConfig::load()?,
    };
    init_tracing(if cli.verbose { "debug" } else { config.log_level.as_str() });

    let bridge = Arc::new(HttpBridge::from_config(&config)?);
    tracing::info!(api_base = %bridge.api_base(), "bridge ready");

    let composer = Composer::new(
        config.composer.clone(),
        EffectCatalog::builtin(),
        bridge,
        Arc::new(LogPlayer),
        UserId::new(cli.user_id),
    )?;
    let clock = Clock(Instant::now());

    let mut session = composer
        .open(PersonaProfile::new(
            cli.persona_id,
            cli.persona_name,
            MediaRef::new(cli.persona_media),
        ))
        .await?;
    log_update(&session.update);
    log_update(&composer.set_visible(true).await?);
    log_update(&composer.set_text(cli.text).await?);

    let choices = [
        (EffectDomain::Active, &cli.active),
        (EffectDomain::Background, &cli.background),
        (EffectDomain::Music, &cli.music),
    ];
    for (domain, choice) in choices {
        if let Some(choice) = choice {
            choose(&composer, &clock, domain, choice, &cli.words).await?;
        }
    }

    // Submit the way a header button would: through the command slot
    composer.command_slot().invoke(ComposerCommand::Generate);
    let presenter = ConsolePresenter {
        assume_yes: cli.yes,
    };
    let outcome = match session.commands.recv().await {
        Some(ComposerCommand::Generate) => composer.generate(&presenter).await?,
        None => bail!("composer closed before submission"),
    };
    log_update(&composer.close(clock.now_ms()).await);

    let code = match outcome {
        SubmissionOutcome::Succeeded(link) => {
            println!("{}", link.url);
            ExitCode::SUCCESS
        }
        SubmissionOutcome::Cancelled => {
            eprintln!("Not sent.");
            ExitCode::SUCCESS
        }
        other => {
            if let Some(err) = other.error() {
                tracing::debug!(code = err.code(), "submission did not succeed");
            }
            ExitCode::FAILURE
        }
    };
    Ok(code)
}
