//! # Two-Step Selection Controller
//!
//! Drives "pick category → pick item → (collect words) → apply" for the
//! active, background and music domains.
//!
//! ## Rules
//!
//! - One session at a time: opening a domain's category list closes whatever
//!   sheet is open.
//! - Moving from a parent sheet to a child sheet always dismisses the parent
//!   first, then presents the child once the [`TransitionGuard`] settle
//!   interval has passed. Until then the stage is [`SelectionStage::Closed`]
//!   and the child is pending; [`SelectionController::tick`] releases it.
//! - Terminal selections mutate [`EffectConfiguration`] and close the sheet.
//! - Cancelling never mutates the configuration and drops any pending
//!   effect or pending child sheet.

use crate::core::ComposerError;
use crate::views::catalog::{CategoryKind, EffectCatalog, EffectItem};
use crate::views::effects::{EffectConfiguration, EffectDomain, EffectRef, MusicSelection};
use crate::views::selection::{PendingEffect, SelectionStage, SheetCommand};
use crate::views::words::{CustomWords, WordLimits};
use crate::workflows::music::MusicController;
use crate::workflows::transition::TransitionGuard;
use std::sync::Arc;

/// State a terminal selection mutates.
pub struct SelectionContext<'a> {
    /// Effect configuration of the open draft
    pub effects: &'a mut EffectConfiguration,
    /// Playback policy for the music domain
    pub music: &'a mut MusicController,
}

/// Generic two-level picker shared by all effect domains.
#[derive(Debug)]
pub struct SelectionController {
    catalog: Arc<EffectCatalog>,
    stage: SelectionStage,
    guard: TransitionGuard<SelectionStage>,
}

impl SelectionController {
    /// Create a controller over `catalog` with the given sheet settle interval.
    pub fn new(catalog: Arc<EffectCatalog>, settle_ms: u64) -> Self {
        Self {
            catalog,
            stage: SelectionStage::Closed,
            guard: TransitionGuard::new(settle_ms),
        }
    }

    /// Current stage.
    pub fn stage(&self) -> &SelectionStage {
        &self.stage
    }

    /// Stage waiting for the settle interval, if any.
    pub fn pending_stage(&self) -> Option<&SelectionStage> {
        self.guard.pending()
    }

    /// Catalog in use.
    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Open a domain's category list, closing any other session first.
    pub fn open_category_list(
        &mut self,
        domain: EffectDomain,
        ctx: &mut SelectionContext<'_>,
        now_ms: u64,
    ) -> Vec<SheetCommand> {
        if self.stage == SelectionStage::CategoryOpen(domain) {
            return Vec::new();
        }
        self.guard.cancel();
        let mut commands = self.close_current(ctx, now_ms);
        self.open(SelectionStage::CategoryOpen(domain), now_ms, &mut commands);
        tracing::debug!(%domain, "category list requested");
        commands
    }

    /// Pick a category from the open category list.
    pub fn select_category(
        &mut self,
        key: &str,
        ctx: &mut SelectionContext<'_>,
        now_ms: u64,
    ) -> Result<Vec<SheetCommand>, ComposerError> {
        let domain = match &self.stage {
            SelectionStage::CategoryOpen(domain) => *domain,
            other => {
                return Err(ComposerError::invalid_transition(format!(
                    "select_category({key}) while {other:?}"
                )))
            }
        };
        let category = self.catalog.category(domain, key)?.clone();

        match category.kind {
            CategoryKind::Direct { value: Some(item) } if item.requires_configuration() => {
                Ok(self.begin_configuration(domain, category.key, item, ctx, now_ms))
            }
            CategoryKind::Direct { value } => {
                self.apply_value(domain, value.as_ref(), ctx)?;
                tracing::debug!(%domain, category = %category.key, "direct category applied");
                Ok(self.close_current(ctx, now_ms))
            }
            CategoryKind::Modal { .. } => {
                let mut commands = self.close_current(ctx, now_ms);
                self.open(
                    SelectionStage::DetailOpen {
                        domain,
                        category: category.key,
                    },
                    now_ms,
                    &mut commands,
                );
                Ok(commands)
            }
        }
    }

    /// Pick an item from the open detail list.
    pub fn select_detail(
        &mut self,
        key: &str,
        ctx: &mut SelectionContext<'_>,
        now_ms: u64,
    ) -> Result<Vec<SheetCommand>, ComposerError> {
        let (domain, category) = self.detail_stage("select_detail", key)?;
        let item = self.catalog.item(domain, &category, key)?.clone();

        if item.requires_configuration() {
            return Ok(self.begin_configuration(domain, category, item, ctx, now_ms));
        }

        self.apply_value(domain, Some(&item), ctx)?;
        tracing::debug!(%domain, item = %item.key, "detail applied");
        Ok(self.close_current(ctx, now_ms))
    }

    /// Preview a music track from the open detail list without applying it.
    pub fn preview_track(
        &mut self,
        key: &str,
        ctx: &mut SelectionContext<'_>,
    ) -> Result<(), ComposerError> {
        let (domain, category) = self.detail_stage("preview_track", key)?;
        if domain != EffectDomain::Music {
            return Err(ComposerError::invalid_transition(format!(
                "preview_track({key}) in {domain} domain"
            )));
        }
        let item = self.catalog.item(domain, &category, key)?;
        let url = music_url(item)?;
        ctx.music.preview(url);
        Ok(())
    }

    /// Save collected words and apply the pending effect.
    ///
    /// On validation failure the collector stays open and nothing is applied.
    pub fn save_configuration<I, S>(
        &mut self,
        words: I,
        ctx: &mut SelectionContext<'_>,
        now_ms: u64,
    ) -> Result<Vec<SheetCommand>, ComposerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pending = match &self.stage {
            SelectionStage::ConfiguringWords { pending, .. } => pending.clone(),
            other => {
                return Err(ComposerError::invalid_transition(format!(
                    "save_configuration while {other:?}"
                )))
            }
        };

        let words = CustomWords::parse(words, pending.limits)?;
        tracing::debug!(effect = %pending.item.key, words = words.len(), "configuration saved");
        ctx.effects.apply_configured_active(
            EffectRef::new(pending.item.key),
            pending.item.animation,
            words,
        );
        Ok(self.close_current(ctx, now_ms))
    }

    /// Close whatever is open, or drop a pending child, without applying.
    pub fn cancel(&mut self, ctx: &mut SelectionContext<'_>, now_ms: u64) -> Vec<SheetCommand> {
        if let Some(dropped) = self.guard.cancel() {
            tracing::debug!(stage = ?dropped, "pending sheet dropped");
            if dropped.domain() == Some(EffectDomain::Music) {
                ctx.music.on_sheet_closed();
            }
        }
        self.close_current(ctx, now_ms)
    }

    /// Release a pending child sheet once its settle interval has passed.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SheetCommand> {
        match self.guard.drain_ready(now_ms) {
            Some(stage) => {
                let mut commands = Vec::with_capacity(1);
                if let Some(sheet) = stage.sheet() {
                    commands.push(SheetCommand::Present(sheet));
                }
                self.stage = stage;
                commands
            }
            None => Vec::new(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn detail_stage(&self, op: &str, key: &str) -> Result<(EffectDomain, String), ComposerError> {
        match &self.stage {
            SelectionStage::DetailOpen { domain, category } => Ok((*domain, category.clone())),
            other => Err(ComposerError::invalid_transition(format!(
                "{op}({key}) while {other:?}"
            ))),
        }
    }

    fn begin_configuration(
        &mut self,
        domain: EffectDomain,
        category: String,
        item: EffectItem,
        ctx: &mut SelectionContext<'_>,
        now_ms: u64,
    ) -> Vec<SheetCommand> {
        let limits = item.word_limits.unwrap_or(WordLimits::SHORT_WORDS);
        let mut commands = self.close_current(ctx, now_ms);
        self.open(
            SelectionStage::ConfiguringWords {
                domain,
                pending: PendingEffect {
                    category,
                    item,
                    limits,
                },
            },
            now_ms,
            &mut commands,
        );
        commands
    }

    fn close_current(&mut self, ctx: &mut SelectionContext<'_>, now_ms: u64) -> Vec<SheetCommand> {
        let mut commands = Vec::new();
        if let Some(sheet) = self.stage.sheet() {
            if self.stage.domain() == Some(EffectDomain::Music) {
                ctx.music.on_sheet_closed();
            }
            commands.push(SheetCommand::Dismiss(sheet));
            self.guard.record_dismiss(now_ms);
        }
        self.stage = SelectionStage::Closed;
        commands
    }

    fn open(&mut self, target: SelectionStage, now_ms: u64, commands: &mut Vec<SheetCommand>) {
        if let Some(target) = self.guard.request_present(target, now_ms) {
            if let Some(sheet) = target.sheet() {
                commands.push(SheetCommand::Present(sheet));
            }
            self.stage = target;
        }
    }

    fn apply_value(
        &self,
        domain: EffectDomain,
        value: Option<&EffectItem>,
        ctx: &mut SelectionContext<'_>,
    ) -> Result<(), ComposerError> {
        let Some(item) = value else {
            ctx.effects.clear_domain(domain);
            if domain == EffectDomain::Music {
                ctx.music.select_none();
            }
            return Ok(());
        };

        match domain {
            EffectDomain::Active => {
                ctx.effects
                    .apply_active(EffectRef::new(item.key.clone()), item.animation.clone());
            }
            EffectDomain::Background => {
                ctx.effects.apply_background(EffectRef::new(item.key.clone()));
            }
            EffectDomain::Music => {
                let url = music_url(item)?;
                ctx.music.select(url);
                ctx.effects.apply_music(MusicSelection {
                    key: item.key.clone(),
                    url: url.to_string(),
                    title: item.title.clone(),
                });
            }
        }
        Ok(())
    }
}

fn music_url(item: &EffectItem) -> Result<&str, ComposerError> {
    item.url
        .as_deref()
        .ok_or_else(|| ComposerError::invalid(format!("music item {} has no url", item.key)))
}
