//! Counting numbers
//!
//! [`CounterAnimator`] is the pure part: an integer that eases toward its
//! target along an ease-out cubic curve and lands on it exactly when the
//! duration elapses. [`MetricsCounter`] mounts one against a [`Host`], starting
//! the count the first time its element scrolls into view.

use crate::easing::Easing;
use crate::error::Result;
use crate::target::AnimationTarget;
use serde::{Deserialize, Serialize};
use spatial_core::{
    DisposeBag, ElementBounds, Host, ScrollState, Subscription, Tick, VisibilityGate,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An integer counting toward a target
#[derive(Clone, Debug)]
pub struct CounterAnimator {
    anim: AnimationTarget,
    // Kept as an integer; the eased f64 loses precision above 2^53
    target: u64,
    value: u64,
}

impl CounterAnimator {
    /// Count from 0 to `target` over `duration_ms`
    pub fn new(target: u64, duration_ms: f64) -> Result<Self> {
        let anim = AnimationTarget::new(0.0, target as f64, duration_ms, Easing::EaseOutCubic)?;
        Ok(Self {
            anim,
            target,
            value: 0,
        })
    }

    /// Advance to time `now` and return the displayed integer
    ///
    /// The first call fixes the start time.
    pub fn sample(&mut self, now: f64) -> u64 {
        let raw = self.anim.sample(now);
        self.value = if self.anim.is_finished() {
            self.target
        } else {
            (raw.floor().max(0.0) as u64).min(self.target)
        };
        self.value
    }

    /// Restart the count from 0 toward a new target over the full duration
    pub fn retarget(&mut self, target: u64) {
        self.anim.retarget_from(0.0, target as f64);
        self.target = target;
        self.value = 0;
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.anim.is_finished()
    }
}

/// A labelled metric shown as `{prefix}{value}{suffix}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSpec {
    pub label: String,
    pub end: u64,
    pub duration_ms: f64,
    pub prefix: String,
    pub suffix: String,
}

impl CounterSpec {
    pub fn new(label: impl Into<String>, end: u64, duration_ms: f64) -> Self {
        Self {
            label: label.into(),
            end,
            duration_ms,
            ..Default::default()
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Format a value with this counter's prefix and suffix
    pub fn display(&self, value: u64) -> String {
        format!("{}{}{}", self.prefix, group_thousands(value), self.suffix)
    }
}

impl Default for CounterSpec {
    fn default() -> Self {
        Self {
            label: String::new(),
            end: 0,
            duration_ms: 2000.0,
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

struct CounterShared {
    host: Host,
    animator: CounterAnimator,
    gate: VisibilityGate,
    bounds: ElementBounds,
    active: bool,
    frame: Option<Subscription>,
}

impl CounterShared {
    fn observe(&mut self, scroll: &ScrollState) -> bool {
        if self.active || !self.gate.observe(&self.bounds, scroll) {
            return false;
        }
        self.active = true;
        true
    }
}

fn start_frames(shared: &Rc<RefCell<CounterShared>>) {
    let weak: Weak<RefCell<CounterShared>> = Rc::downgrade(shared);
    let host = shared.borrow().host.clone();
    let frame = host.scheduler.scoped_frame(move |now| {
        let Some(shared) = weak.upgrade() else {
            return Tick::Done;
        };
        let mut state = shared.borrow_mut();
        state.animator.sample(now);
        if state.animator.is_finished() {
            tracing::debug!(value = state.animator.value(), "counter finished");
            Tick::Done
        } else {
            Tick::Continue
        }
    });
    // Replacing a finished registration is a no-op cancel
    let previous = shared.borrow_mut().frame.replace(frame);
    drop(previous);
}

/// A counter that starts when its element first becomes visible
pub struct MetricsCounter {
    spec: CounterSpec,
    shared: Rc<RefCell<CounterShared>>,
    _subscriptions: DisposeBag,
}

impl MetricsCounter {
    pub fn mount(host: &Host, spec: CounterSpec, bounds: ElementBounds) -> Result<Self> {
        let animator = CounterAnimator::new(spec.end, spec.duration_ms)?;
        let shared = Rc::new(RefCell::new(CounterShared {
            host: host.clone(),
            animator,
            gate: VisibilityGate::new(true, 0.0),
            bounds,
            active: false,
            frame: None,
        }));

        let weak = Rc::downgrade(&shared);
        let label = spec.label.clone();
        let layout = host.viewport.on_layout(move |scroll| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let entered = shared.borrow_mut().observe(scroll);
            if entered {
                tracing::debug!(label = %label, "counter activated");
                start_frames(&shared);
            }
        });

        let entered = shared.borrow_mut().observe(&host.scroll());
        if entered {
            tracing::debug!(label = %spec.label, "counter activated on mount");
            start_frames(&shared);
        }

        Ok(Self {
            spec,
            shared,
            _subscriptions: DisposeBag::new().with(layout),
        })
    }

    /// Count from 0 to `target` again, over the full duration
    ///
    /// Before activation only the target changes; the count starts
    /// when the element scrolls into view.
    pub fn set_target(&self, target: u64) {
        let restart = {
            let mut state = self.shared.borrow_mut();
            if state.animator.target() == target {
                return;
            }
            state.animator.retarget(target);
            state.active
        };
        if restart {
            start_frames(&self.shared);
        }
    }

    pub fn value(&self) -> u64 {
        self.shared.borrow().animator.value()
    }

    pub fn target(&self) -> u64 {
        self.shared.borrow().animator.target()
    }

    pub fn is_active(&self) -> bool {
        self.shared.borrow().active
    }

    pub fn is_finished(&self) -> bool {
        self.shared.borrow().animator.is_finished()
    }

    pub fn spec(&self) -> &CounterSpec {
        &self.spec
    }

    pub fn display(&self) -> String {
        self.spec.display(self.value())
    }
}

impl std::fmt::Debug for MetricsCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCounter")
            .field("label", &self.spec.label)
            .field("value", &self.value())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatial_core::{FrameScheduler, Viewport};

    fn host(scheduler: &FrameScheduler) -> Host {
        Host::new(scheduler.handle(), Rc::new(Viewport::new(1200.0, 800.0)))
    }

    #[test]
    fn test_counter_scenario() {
        let mut counter = CounterAnimator::new(100, 2000.0).unwrap();
        assert_eq!(counter.sample(0.0), 0);
        let mid = counter.sample(1000.0);
        // ease-out cubic at 0.5 is 0.875
        assert_eq!(mid, 87);
        assert_eq!(counter.sample(2000.0), 100);
    }

    #[test]
    fn test_counter_lands_exactly_on_target() {
        for &(target, duration) in &[(0u64, 1.0), (1, 16.0), (2500, 2500.0), (999_999, 320.0)] {
            let mut counter = CounterAnimator::new(target, duration).unwrap();
            counter.sample(10.0);
            // Irregular frame spacing
            for t in [11.0, 29.5, 30.0, 100.0] {
                assert!(counter.sample(t) <= target);
            }
            assert_eq!(counter.sample(10.0 + duration), target);
            assert_eq!(counter.sample(10.0 + duration * 3.0), target);
        }
    }

    #[test]
    fn test_counter_never_decreases() {
        let mut counter = CounterAnimator::new(50, 2000.0).unwrap();
        let mut prev = counter.sample(0.0);
        for t in (0..=2000).step_by(16) {
            let v = counter.sample(t as f64);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1247), "1,247");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn test_spec_display() {
        let spec = CounterSpec::new("Projects Delivered", 100, 2500.0).with_suffix("+");
        assert_eq!(spec.display(42), "42+");
        let spec = CounterSpec::new("Revenue", 0, 1.0).with_prefix("$");
        assert_eq!(spec.display(12_500), "$12,500");
    }

    #[test]
    fn test_mount_waits_for_visibility() {
        let scheduler = FrameScheduler::new();
        let host = host(&scheduler);
        let bounds = ElementBounds::new(2000.0, 200.0).unwrap();
        let counter =
            MetricsCounter::mount(&host, CounterSpec::new("Clients", 50, 2000.0), bounds).unwrap();

        scheduler.advance(5000.0);
        assert!(!counter.is_active());
        assert_eq!(counter.value(), 0);
        assert_eq!(scheduler.frame_count(), 0);

        host.viewport.scroll_to(1500.0);
        assert!(counter.is_active());
        scheduler.advance(16.0);
        scheduler.advance(2000.0);
        assert_eq!(counter.value(), 50);
        assert!(counter.is_finished());
        assert_eq!(scheduler.frame_count(), 0);

        // Scrolling away and back never restarts it
        host.viewport.scroll_to(0.0);
        host.viewport.scroll_to(1500.0);
        assert_eq!(scheduler.frame_count(), 0);
        assert_eq!(counter.value(), 50);
    }

    #[test]
    fn test_visible_on_mount_starts_at_zero() {
        let scheduler = FrameScheduler::new();
        let host = host(&scheduler);
        let bounds = ElementBounds::new(100.0, 100.0).unwrap();
        let counter =
            MetricsCounter::mount(&host, CounterSpec::new("Projects", 100, 2000.0), bounds)
                .unwrap();

        scheduler.frame();
        assert_eq!(counter.value(), 0);
        scheduler.advance(2000.0);
        assert_eq!(counter.value(), 100);
    }

    #[test]
    fn test_retarget_restarts_from_zero() {
        let scheduler = FrameScheduler::new();
        let host = host(&scheduler);
        let bounds = ElementBounds::new(0.0, 100.0).unwrap();
        let counter =
            MetricsCounter::mount(&host, CounterSpec::new("Points", 1247, 1000.0), bounds).unwrap();

        scheduler.frame();
        scheduler.advance(1000.0);
        assert_eq!(counter.value(), 1247);

        counter.set_target(1250);
        assert_eq!(counter.target(), 1250);
        assert_eq!(scheduler.frame_count(), 1);
        scheduler.frame();
        assert_eq!(counter.value(), 0);
        // ease-out cubic at 0.1 is 0.271
        scheduler.advance(100.0);
        assert_eq!(counter.value(), 338);
        scheduler.advance(900.0);
        assert_eq!(counter.value(), 1250);

        // Same target is a no-op
        counter.set_target(1250);
        assert_eq!(scheduler.frame_count(), 0);
        assert_eq!(counter.value(), 1250);

        counter.set_target(1240);
        scheduler.frame();
        scheduler.advance(500.0);
        assert!(counter.value() < 1240);
        scheduler.advance(500.0);
        assert_eq!(counter.value(), 1240);
    }

    #[test]
    fn test_retarget_before_activation_counts_from_zero() {
        let scheduler = FrameScheduler::new();
        let host = host(&scheduler);
        let bounds = ElementBounds::new(2000.0, 100.0).unwrap();
        let counter =
            MetricsCounter::mount(&host, CounterSpec::new("Points", 100, 1000.0), bounds).unwrap();

        counter.set_target(200);
        assert_eq!(scheduler.frame_count(), 0);
        assert_eq!(counter.value(), 0);

        host.viewport.scroll_to(1500.0);
        scheduler.frame();
        assert_eq!(counter.value(), 0);
        scheduler.advance(1000.0);
        assert_eq!(counter.value(), 200);
    }

    #[test]
    fn test_large_target_is_exact() {
        let target = (1u64 << 53) + 1;
        let mut counter = CounterAnimator::new(target, 100.0).unwrap();
        assert_eq!(counter.target(), target);
        counter.sample(0.0);
        assert!(counter.sample(50.0) <= target);
        assert_eq!(counter.sample(100.0), target);

        counter.retarget(u64::MAX);
        assert_eq!(counter.target(), u64::MAX);
        counter.sample(200.0);
        assert_eq!(counter.sample(300.0), u64::MAX);
    }

    #[test]
    fn test_unmount_cancels_frame() {
        let scheduler = FrameScheduler::new();
        let host = host(&scheduler);
        let bounds = ElementBounds::new(0.0, 100.0).unwrap();
        let counter =
            MetricsCounter::mount(&host, CounterSpec::new("Projects", 100, 2000.0), bounds)
                .unwrap();
        assert_eq!(scheduler.frame_count(), 1);

        drop(counter);
        assert_eq!(scheduler.frame_count(), 0);
        assert_eq!(host.viewport.listener_count(), 0);
    }
}
