//! Easing curves for morph transitions.
//!
//! All curves map `[0, 1]` onto `[0, 1]` with `ease(0) = 0` and
//! `ease(1) = 1`. Input outside the unit range is clamped.

use serde::{Deserialize, Serialize};

/// Easing curve applied to a transition's progress.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic ease in and out.
    Power1InOut,
    /// Cubic ease in and out.
    #[default]
    Power2InOut,
    /// Cubic ease out.
    Power2Out,
}

impl Ease {
    /// Evaluate the curve at `t`.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Ease::Linear => t,
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}
