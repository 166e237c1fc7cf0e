//! # Reveal Timeline
//!
//! Declarative entrance/exit schedule for the composer surface.
//!
//! Offsets are relative to the moment visibility changes. The dependency
//! order on entrance is:
//!
//! 1. title mark at 0
//! 2. subtitle at `subtitle_delay_ms`
//! 3. ambient layer, active layer and bottom gradient at 0, concurrent with (1)
//! 4. content block at `content_delay_ms`, cubic in/out from off-screen
//! 5. quick actions from `content_delay_ms`, `action_stagger_ms` apart
//! 6. dismiss control `dismiss_lag_ms` after both (4) and (5) have started
//!
//! On visibility loss every layer fades out over `exit_duration_ms` and the
//! session backdrop override must be reset. Text changes while visible replay
//! (4) alone.

use crate::core::ComposerError;
use crate::reveal::easing::{clamp01, Easing};
use serde::{Deserialize, Serialize};

// ============================================================================
// Timings
// ============================================================================

/// Offsets and durations of the reveal, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTimings {
    /// Title mark fade/slide duration
    pub title_duration_ms: u64,
    /// Subtitle start offset
    pub subtitle_delay_ms: u64,
    /// Subtitle slide duration
    pub subtitle_duration_ms: u64,
    /// Effect layers and gradient fade duration
    pub layer_fade_ms: u64,
    /// Content block start offset
    pub content_delay_ms: u64,
    /// Content block slide duration
    pub content_duration_ms: u64,
    /// Distance the content block travels from off-screen, in points
    pub content_offset: f32,
    /// Gap between consecutive quick actions
    pub action_stagger_ms: u64,
    /// Bounce duration of one quick action
    pub action_duration_ms: u64,
    /// Dismiss control start, after content and actions have begun
    pub dismiss_lag_ms: u64,
    /// Dismiss control fade/scale duration
    pub dismiss_duration_ms: u64,
    /// Fade-out duration for every layer on visibility loss
    pub exit_duration_ms: u64,
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            title_duration_ms: 500,
            subtitle_delay_ms: 200,
            subtitle_duration_ms: 500,
            layer_fade_ms: 800,
            content_delay_ms: 400,
            content_duration_ms: 700,
            content_offset: 400.0,
            action_stagger_ms: 100,
            action_duration_ms: 450,
            dismiss_lag_ms: 200,
            dismiss_duration_ms: 300,
            exit_duration_ms: 250,
        }
    }
}

impl RevealTimings {
    /// Reject zero durations and non-positive content offsets.
    pub fn validate(&self) -> Result<(), ComposerError> {
        let durations = [
            ("title_duration_ms", self.title_duration_ms),
            ("subtitle_duration_ms", self.subtitle_duration_ms),
            ("layer_fade_ms", self.layer_fade_ms),
            ("content_duration_ms", self.content_duration_ms),
            ("action_duration_ms", self.action_duration_ms),
            ("dismiss_duration_ms", self.dismiss_duration_ms),
            ("exit_duration_ms", self.exit_duration_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(ComposerError::invalid(format!("reveal {name} must be non-zero")));
        }
        if !(self.content_offset.is_finite() && self.content_offset > 0.0) {
            return Err(ComposerError::invalid(
                "reveal content_offset must be positive",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Schedule types
// ============================================================================

/// Animated element of the composer surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealLayer {
    /// Brand title mark
    TitleMark,
    /// Subtitle under the title
    Subtitle,
    /// Ambient background effect layer
    AmbientLayer,
    /// Active overlay effect layer
    ActiveLayer,
    /// Gradient behind the bottom controls
    BottomGradient,
    /// Message text block
    Content,
    /// Quick action at an index
    QuickAction(u8),
    /// Close button
    DismissControl,
}

/// What a layer animation does.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// Opacity 0 → 1
    FadeIn,
    /// Opacity 0 → 1 while translating up into place
    FadeSlideIn,
    /// Translate from `from_offset` to 0 while fading in
    SlideIn {
        /// Starting offset
        from_offset: f32,
    },
    /// Scale up with bounce
    BounceIn,
    /// Opacity and scale up
    FadeScaleIn,
    /// Opacity 1 → 0
    FadeOut,
}

/// One animated layer within a schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerAnimation {
    /// Animated element
    pub layer: RevealLayer,
    /// Animation applied
    pub motion: Motion,
    /// Start offset from the schedule origin
    pub delay_ms: u64,
    /// Duration
    pub duration_ms: u64,
    /// Curve
    pub easing: Easing,
}

impl LayerAnimation {
    /// Offset at which the animation ends.
    pub fn end_ms(&self) -> u64 {
        self.delay_ms.saturating_add(self.duration_ms)
    }

    /// Eased progress at `elapsed_ms` since the schedule origin.
    pub fn progress(&self, elapsed_ms: u64) -> f32 {
        if elapsed_ms <= self.delay_ms {
            return self.easing.apply(0.0);
        }
        if self.duration_ms == 0 {
            return self.easing.apply(1.0);
        }
        let local = (elapsed_ms - self.delay_ms) as f32 / self.duration_ms as f32;
        self.easing.apply(clamp01(local))
    }
}

/// Why a schedule was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Full entrance on visibility gain
    Entrance,
    /// Fade-out on visibility loss
    Exit,
    /// Content block only, after a text change
    ContentReplay,
}

/// Ordered layer animations for one transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealSchedule {
    /// Kind of transition
    pub kind: ScheduleKind,
    /// Animations sorted by start offset
    pub animations: Vec<LayerAnimation>,
}

impl RevealSchedule {
    fn new(kind: ScheduleKind, mut animations: Vec<LayerAnimation>) -> Self {
        animations.sort_by_key(|a| a.delay_ms);
        Self { kind, animations }
    }

    /// Animation for a layer, if scheduled.
    pub fn get(&self, layer: RevealLayer) -> Option<&LayerAnimation> {
        self.animations.iter().find(|a| a.layer == layer)
    }

    /// Offset at which every animation has ended.
    pub fn total_ms(&self) -> u64 {
        self.animations.iter().map(LayerAnimation::end_ms).max().unwrap_or(0)
    }

    /// Eased progress of `layer` at `elapsed_ms`.
    pub fn sample(&self, layer: RevealLayer, elapsed_ms: u64) -> Option<f32> {
        self.get(layer).map(|a| a.progress(elapsed_ms))
    }
}

/// Result of a visibility change.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealTransition {
    /// Schedule to run
    pub schedule: RevealSchedule,
    /// Whether the session backdrop override must be cleared
    pub reset_backdrop: bool,
}

// ============================================================================
// Timeline
// ============================================================================

/// Visibility-gated reveal state.
#[derive(Clone, Debug)]
pub struct RevealTimeline {
    timings: RevealTimings,
    quick_actions: u8,
    visible: bool,
    last_text: Option<String>,
}

impl RevealTimeline {
    /// Create a hidden timeline.
    pub fn new(timings: RevealTimings, quick_actions: u8) -> Self {
        Self {
            timings,
            quick_actions,
            visible: false,
            last_text: None,
        }
    }

    /// Configured timings.
    pub fn timings(&self) -> &RevealTimings {
        &self.timings
    }

    /// Whether the surface is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Report a visibility change. Returns `None` when nothing changed.
    pub fn set_visible(&mut self, visible: bool) -> Option<RevealTransition> {
        if self.visible == visible {
            return None;
        }
        self.visible = visible;
        self.last_text = None;

        let transition = if visible {
            RevealTransition {
                schedule: self.entrance(),
                reset_backdrop: false,
            }
        } else {
            RevealTransition {
                schedule: self.exit(),
                reset_backdrop: true,
            }
        };
        tracing::debug!(kind = ?transition.schedule.kind, "reveal transition");
        Some(transition)
    }

    /// Report the current message text.
    ///
    /// The first observation after becoming visible is recorded without
    /// replay. Later changes to non-empty text replay the content block.
    pub fn on_text_changed(&mut self, text: &str) -> Option<RevealSchedule> {
        if !self.visible {
            return None;
        }
        let previous = self.last_text.replace(text.to_string());
        match previous {
            None => None,
            Some(previous) if previous == text => None,
            Some(_) if text.trim().is_empty() => None,
            Some(_) => Some(self.content_replay()),
        }
    }

    /// Full entrance schedule.
    pub fn entrance(&self) -> RevealSchedule {
        let t = &self.timings;
        let mut animations = vec![
            LayerAnimation {
                layer: RevealLayer::TitleMark,
                motion: Motion::FadeSlideIn,
                delay_ms: 0,
                duration_ms: t.title_duration_ms,
                easing: Easing::EaseOut,
            },
            LayerAnimation {
                layer: RevealLayer::Subtitle,
                motion: Motion::FadeSlideIn,
                delay_ms: t.subtitle_delay_ms,
                duration_ms: t.subtitle_duration_ms,
                easing: Easing::EaseOut,
            },
        ];

        for layer in [
            RevealLayer::AmbientLayer,
            RevealLayer::ActiveLayer,
            RevealLayer::BottomGradient,
        ] {
            animations.push(LayerAnimation {
                layer,
                motion: Motion::FadeIn,
                delay_ms: 0,
                duration_ms: t.layer_fade_ms,
                easing: Easing::Linear,
            });
        }

        animations.push(self.content_animation(t.content_delay_ms));

        let mut last_action_start = t.content_delay_ms;
        for index in 0..self.quick_actions {
            let delay_ms = t
                .content_delay_ms
                .saturating_add(t.action_stagger_ms.saturating_mul(u64::from(index)));
            last_action_start = delay_ms;
            animations.push(LayerAnimation {
                layer: RevealLayer::QuickAction(index),
                motion: Motion::BounceIn,
                delay_ms,
                duration_ms: t.action_duration_ms,
                easing: Easing::EaseOutBounce,
            });
        }

        animations.push(LayerAnimation {
            layer: RevealLayer::DismissControl,
            motion: Motion::FadeScaleIn,
            delay_ms: t
                .content_delay_ms
                .max(last_action_start)
                .saturating_add(t.dismiss_lag_ms),
            duration_ms: t.dismiss_duration_ms,
            easing: Easing::EaseOutBack,
        });

        RevealSchedule::new(ScheduleKind::Entrance, animations)
    }

    /// Exit schedule: every entrance layer fades out together.
    pub fn exit(&self) -> RevealSchedule {
        let animations = self
            .entrance()
            .animations
            .into_iter()
            .map(|a| LayerAnimation {
                layer: a.layer,
                motion: Motion::FadeOut,
                delay_ms: 0,
                duration_ms: self.timings.exit_duration_ms,
                easing: Easing::Linear,
            })
            .collect();
        RevealSchedule::new(ScheduleKind::Exit, animations)
    }

    /// Content-only replay from the same off-screen origin.
    pub fn content_replay(&self) -> RevealSchedule {
        RevealSchedule::new(ScheduleKind::ContentReplay, vec![self.content_animation(0)])
    }

    fn content_animation(&self, delay_ms: u64) -> LayerAnimation {
        LayerAnimation {
            layer: RevealLayer::Content,
            motion: Motion::SlideIn {
                from_offset: self.timings.content_offset,
            },
            delay_ms,
            duration_ms: self.timings.content_duration_ms,
            easing: Easing::EaseInOutCubic,
        }
    }
}

impl Default for RevealTimeline {
    fn default() -> Self {
        Self::new(RevealTimings::default(), 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(schedule: &RevealSchedule, layer: RevealLayer) -> u64 {
        schedule.get(layer).unwrap().delay_ms
    }

    #[test]
    fn test_entrance_ordering() {
        let timeline = RevealTimeline::default();
        let s = timeline.entrance();

        assert_eq!(delay(&s, RevealLayer::TitleMark), 0);
        assert_eq!(delay(&s, RevealLayer::Subtitle), 200);
        assert_eq!(delay(&s, RevealLayer::AmbientLayer), 0);
        assert_eq!(delay(&s, RevealLayer::ActiveLayer), 0);
        assert_eq!(delay(&s, RevealLayer::BottomGradient), 0);
        assert_eq!(delay(&s, RevealLayer::Content), 400);

        for i in 0..4u8 {
            assert_eq!(delay(&s, RevealLayer::QuickAction(i)), 400 + 100 * u64::from(i));
        }

        let dismiss = delay(&s, RevealLayer::DismissControl);
        assert!(dismiss > delay(&s, RevealLayer::Content));
        assert!(dismiss > delay(&s, RevealLayer::QuickAction(3)));
    }

    #[test]
    fn test_content_easing_is_distinct() {
        let s = RevealTimeline::default().entrance();
        let content = s.get(RevealLayer::Content).unwrap().easing;
        for layer in [
            RevealLayer::TitleMark,
            RevealLayer::Subtitle,
            RevealLayer::AmbientLayer,
            RevealLayer::BottomGradient,
        ] {
            assert_ne!(s.get(layer).unwrap().easing, content);
        }
    }

    #[test]
    fn test_exit_resets_backdrop_and_fades_everything() {
        let mut timeline = RevealTimeline::default();
        timeline.set_visible(true).unwrap();
        let transition = timeline.set_visible(false).unwrap();

        assert!(transition.reset_backdrop);
        assert_eq!(transition.schedule.kind, ScheduleKind::Exit);
        assert!(transition
            .schedule
            .animations
            .iter()
            .all(|a| a.motion == Motion::FadeOut && a.duration_ms == 250 && a.delay_ms == 0));
        assert_eq!(transition.schedule.total_ms(), 250);
    }

    #[test]
    fn test_repeat_visibility_is_noop() {
        let mut timeline = RevealTimeline::default();
        assert!(timeline.set_visible(false).is_none());
        assert!(timeline.set_visible(true).is_some());
        assert!(timeline.set_visible(true).is_none());
    }

    #[test]
    fn test_replay_skips_first_observation() {
        let mut timeline = RevealTimeline::default();
        timeline.set_visible(true);
        assert!(timeline.on_text_changed("hello").is_none());

        let replay = timeline.on_text_changed("hello there").unwrap();
        assert_eq!(replay.kind, ScheduleKind::ContentReplay);
        assert_eq!(replay.animations.len(), 1);
        let content = &replay.animations[0];
        assert_eq!(content.layer, RevealLayer::Content);
        assert_eq!(content.motion, Motion::SlideIn { from_offset: 400.0 });
    }

    #[test]
    fn test_replay_suppressed_for_empty_and_unchanged_text() {
        let mut timeline = RevealTimeline::default();
        timeline.set_visible(true);
        timeline.on_text_changed("a");
        assert!(timeline.on_text_changed("   ").is_none());
        assert!(timeline.on_text_changed("   ").is_none());
        assert!(timeline.on_text_changed("b").is_some());
        assert!(timeline.on_text_changed("b").is_none());
    }

    #[test]
    fn test_no_replay_while_hidden() {
        let mut timeline = RevealTimeline::default();
        assert!(timeline.on_text_changed("a").is_none());
        assert!(timeline.on_text_changed("b").is_none());
    }

    #[test]
    fn test_sample_progress() {
        let s = RevealTimeline::default().entrance();
        assert_eq!(s.sample(RevealLayer::Content, 0), Some(0.0));
        assert_eq!(s.sample(RevealLayer::Content, 400), Some(0.0));
        assert!((s.sample(RevealLayer::Content, 750).unwrap() - 0.5).abs() < 1e-5);
        assert_eq!(s.sample(RevealLayer::Content, 5_000), Some(1.0));
        assert_eq!(s.sample(RevealLayer::QuickAction(9), 0), None);
    }

    #[test]
    fn test_timings_validate() {
        assert!(RevealTimings::default().validate().is_ok());
        let timings = RevealTimings {
            exit_duration_ms: 0,
            ..RevealTimings::default()
        };
        assert!(timings.validate().is_err());
    }

    #[test]
    fn test_huge_timings_saturate() {
        let timings = RevealTimings {
            content_delay_ms: u64::MAX - 10,
            action_stagger_ms: u64::MAX,
            dismiss_lag_ms: u64::MAX,
            ..RevealTimings::default()
        };
        assert!(timings.validate().is_ok());
        let s = RevealTimeline::new(timings, 4).entrance();
        assert_eq!(delay(&s, RevealLayer::DismissControl), u64::MAX);
        assert_eq!(delay(&s, RevealLayer::QuickAction(3)), u64::MAX);
        assert_eq!(s.total_ms(), u64::MAX);
    }
}
