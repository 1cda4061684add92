//! Easing functions
//!
//! Map linear time progress in [0, 1] onto animation progress. Input outside
//! [0, 1] is clamped first, so every curve starts at 0 and ends at 1.

use serde::{Deserialize, Serialize};

/// Easing curve applied to a time fraction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    /// Fast start, slow finish: `1 - (1 - t)^3`
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    /// Evaluate the curve at `t`
    pub fn apply(self, t: f64) -> f64 {
        let t = clamp_unit(t);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => ease_out_cubic(t),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// `1 - (1 - t)^3`, with `t` clamped to [0, 1]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t).powi(3)
}

fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}
