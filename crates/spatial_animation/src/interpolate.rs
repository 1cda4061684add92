//! Range mapping
//!
//! Provides the clamped linear map every scroll-linked value goes through, a
//! two-stop [`ScrollRange`] and a piecewise-linear multi-stop [`RangeMap`].

use crate::error::{AnimationError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t as f32
    }
}

/// Map `input` from `input_range` onto `output_range`
///
/// The input is clamped to the input range first, so the result always lies
/// between the two output bounds (inclusive), whatever the input. Either range
/// may be decreasing. A degenerate input range acts as a step at its value.
pub fn lerp(input: f64, input_range: (f64, f64), output_range: (f64, f64)) -> f64 {
    let (in_start, in_end) = input_range;
    let (out_start, out_end) = output_range;

    let span = in_end - in_start;
    let progress = if input.is_nan() {
        0.0
    } else if span == 0.0 {
        if input < in_start {
            0.0
        } else {
            1.0
        }
    } else {
        ((input - in_start) / span).clamp(0.0, 1.0)
    };

    let value = out_start.lerp(&out_end, progress);
    // Guard against rounding past the bounds
    value.clamp(out_start.min(out_end), out_start.max(out_end))
}

/// A two-stop clamped linear map from a scroll offset to a visual value
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollRange {
    /// Input offset mapped to `from`
    pub start: f64,
    /// Input offset mapped to `to`
    pub end: f64,
    pub from: f64,
    pub to: f64,
}

impl ScrollRange {
    pub fn new(start: f64, end: f64, from: f64, to: f64) -> Self {
        Self {
            start,
            end,
            from,
            to,
        }
    }

    pub fn map(&self, input: f64) -> f64 {
        lerp(input, (self.start, self.end), (self.from, self.to))
    }

    /// Smallest output this range can produce
    pub fn min(&self) -> f64 {
        self.from.min(self.to)
    }

    /// Largest output this range can produce
    pub fn max(&self) -> f64 {
        self.from.max(self.to)
    }
}

/// A piecewise-linear map through any number of stops
///
/// Inputs outside the first/last stop clamp to the first/last output.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeMap {
    stops: SmallVec<[(f64, f64); 4]>,
}

impl RangeMap {
    /// Build from matching input and output stops
    pub fn new(inputs: &[f64], outputs: &[f64]) -> Result<Self> {
        if inputs.len() != outputs.len() || inputs.len() < 2 {
            return Err(AnimationError::StopMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        let sorted = inputs.iter().all(|v| v.is_finite())
            && inputs.windows(2).all(|pair| pair[0] <= pair[1]);
        if !sorted {
            return Err(AnimationError::UnsortedStops);
        }

        Ok(Self {
            stops: inputs.iter().copied().zip(outputs.iter().copied()).collect(),
        })
    }

    pub fn map(&self, input: f64) -> f64 {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if input.is_nan() || input <= first.0 {
            return first.1;
        }
        if input >= last.0 {
            return last.1;
        }

        self.stops
            .windows(2)
            .find(|pair| input <= pair[1].0)
            .map(|pair| lerp(input, (pair[0].0, pair[1].0), (pair[0].1, pair[1].1)))
            .unwrap_or(last.1)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}

impl From<ScrollRange> for RangeMap {
    fn from(range: ScrollRange) -> Self {
        let mut stops = SmallVec::new();
        if range.start <= range.end {
            stops.push((range.start, range.from));
            stops.push((range.end, range.to));
        } else {
            stops.push((range.end, range.to));
            stops.push((range.start, range.from));
        }
        Self { stops }
    }
}
