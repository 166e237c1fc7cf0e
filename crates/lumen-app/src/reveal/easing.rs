//! Easing curves for reveal sampling.
//!
//! All curves take `t` in [0, 1] and return a remapped value. Out-of-range
//! input is clamped first. Names follow easings.net.

use serde::{Deserialize, Serialize};

/// Clamp `v` to [0.0, 1.0].
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Linear interpolation between `a` and `b` at `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Named easing curve attached to a layer animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Pass-through
    Linear,
    /// Decelerate to the end
    #[default]
    EaseOut,
    /// Cubic in/out, used for the content block
    EaseInOutCubic,
    /// Slight overshoot then settle
    EaseOutBack,
    /// Bounce at the end, used for quick actions
    EaseOutBounce,
}

impl Easing {
    /// Apply the curve.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => clamp01(t),
            Self::EaseOut => ease_out(t),
            Self::EaseInOutCubic => ease_in_out_cubic(t),
            Self::EaseOutBack => ease_out_back(t),
            Self::EaseOutBounce => ease_out_bounce(t),
        }
    }
}

/// Ease out, quadratic.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = clamp01(t);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cubic ease in/out.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Ease out with overshoot. Exceeds 1.0 briefly before settling.
#[inline]
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let t = clamp01(t);
    1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
}

/// Ease out with bounces at the end.
#[inline]
pub fn ease_out_bounce(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    let t = clamp01(t);
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}
