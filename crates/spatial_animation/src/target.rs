//! Timed animation toward a target value

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::interpolate::Interpolate;

/// A value easing from where it was to a target over a fixed duration
///
/// The start time is taken from the first sample, so the animation begins on
/// the first frame after it is created or retargeted, not when the object was
/// built. Once the elapsed fraction reaches 1 the value is exactly the target
/// and the animation reports finished.
#[derive(Clone, Debug)]
pub struct AnimationTarget {
    from: f64,
    current: f64,
    target: f64,
    start: Option<f64>,
    duration_ms: f64,
    easing: Easing,
    finished: bool,
}

impl AnimationTarget {
    pub fn new(from: f64, target: f64, duration_ms: f64, easing: Easing) -> Result<Self> {
        let duration_ms = AnimationError::check_timing("duration", duration_ms)?;
        Ok(Self {
            from,
            current: from,
            target,
            start: None,
            duration_ms,
            easing,
            finished: false,
        })
    }

    /// Sample the value at time `now` (ms)
    pub fn sample(&mut self, now: f64) -> f64 {
        if self.finished {
            return self.current;
        }
        let start = *self.start.get_or_insert(now);
        let fraction = self.fraction_at(start, now);

        if fraction >= 1.0 {
            self.current = self.target;
            self.finished = true;
        } else {
            self.current = self.from.lerp(&self.target, self.easing.apply(fraction));
        }
        self.current
    }

    /// Elapsed fraction of the duration at `now`, clamped to [0, 1]
    pub fn progress(&self, now: f64) -> f64 {
        match self.start {
            Some(start) => self.fraction_at(start, now),
            None => 0.0,
        }
    }

    fn fraction_at(&self, start: f64, now: f64) -> f64 {
        ((now - start) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Animate from the current value to a new target, restarting the clock
    pub fn retarget(&mut self, target: f64) {
        self.from = self.current;
        self.target = target;
        self.start = None;
        self.finished = false;
    }

    /// Animate from an explicit value to a new target, restarting the clock
    pub fn retarget_from(&mut self, from: f64, target: f64) {
        self.current = from;
        self.retarget(target);
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
