//! Frame scheduler
//!
//! A cooperative, single-threaded clock that owns every repeating callback on the
//! page. Two kinds of registrations exist:
//!
//! - **Frame callbacks** run once per display frame until they return
//!   [`Tick::Done`] or are cancelled (the `requestAnimationFrame` loop)
//! - **Timers** run when their due time is reached: one-shot timeouts, fixed
//!   intervals, and variable-rate loops that re-arm with [`Tick::After`]
//!
//! Time is virtual and measured in milliseconds. The host drives it with
//! [`FrameScheduler::advance`], which fires every due timer in order and then
//! runs one frame. Nothing here reads a wall clock, so animations are
//! reproducible frame by frame.
//!
//! Components never hold the scheduler itself, only a weak [`SchedulerHandle`].
//! The `scoped_*` registration methods return a [`Subscription`] that cancels the
//! callback when dropped, which is how every animated section guarantees that no
//! callback fires after teardown.

use crate::subscription::Subscription;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Smallest period an interval (or a re-armed timer) may have
pub const MIN_INTERVAL_MS: f64 = 1.0;

new_key_type! {
    /// Handle to a registered frame callback
    pub struct FrameId;
    /// Handle to a registered timer
    pub struct TimerId;
}

/// What a callback wants to happen after it ran
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// Keep going: next frame for frame callbacks, next period for intervals.
    /// One-shot timers finish regardless.
    Continue,
    /// Unregister
    Done,
    /// Re-arm this timer after the given delay (ms). Frame callbacks treat it as `Continue`.
    After(f64),
}

type Callback = Box<dyn FnMut(f64) -> Tick>;

struct FrameEntry {
    seq: u64,
    /// `None` while the callback is running
    callback: Option<Callback>,
}

struct TimerEntry {
    due: f64,
    period: Option<f64>,
    seq: u64,
    /// `None` while the callback is running
    callback: Option<Callback>,
}

/// Internal state of the scheduler
struct SchedulerInner {
    now: f64,
    frames: SlotMap<FrameId, FrameEntry>,
    timers: SlotMap<TimerId, TimerEntry>,
    next_seq: u64,
    frames_run: u64,
}

impl SchedulerInner {
    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn insert_frame(&mut self, callback: Callback) -> FrameId {
        let seq = self.bump_seq();
        self.frames.insert(FrameEntry {
            seq,
            callback: Some(callback),
        })
    }

    fn insert_timer(&mut self, delay: f64, period: Option<f64>, callback: Callback) -> TimerId {
        let seq = self.bump_seq();
        let due = self.now + sanitize_delay(delay);
        self.timers.insert(TimerEntry {
            due,
            period,
            seq,
            callback: Some(callback),
        })
    }

    /// Earliest idle timer due at or before `until`, ties broken by registration order
    fn next_due(&self, until: f64) -> Option<TimerId> {
        self.timers
            .iter()
            .filter(|(_, t)| t.callback.is_some() && t.due <= until)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(id, _)| id)
    }
}

fn sanitize_delay(delay: f64) -> f64 {
    if delay.is_finite() {
        delay.max(0.0)
    } else {
        0.0
    }
}

fn sanitize_period(period: f64) -> f64 {
    if period.is_finite() {
        period.max(MIN_INTERVAL_MS)
    } else {
        MIN_INTERVAL_MS
    }
}

/// The scheduler that owns all frame callbacks and timers
///
/// Held by the host (the page runner or a test). Components receive a
/// [`SchedulerHandle`] from [`handle`](Self::handle).
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a scheduler whose clock starts at `now` ms
    pub fn starting_at(now: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                now,
                frames: SlotMap::with_key(),
                timers: SlotMap::with_key(),
                next_seq: 0,
                frames_run: 0,
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    /// Fire every timer due at or before `until`, then move the clock there
    ///
    /// Returns the number of timer callbacks run. The clock never moves backwards.
    pub fn run_until(&self, until: f64) -> usize {
        let mut fired = 0;

        loop {
            let (id, now, mut callback) = {
                let mut inner = self.inner.borrow_mut();
                let Some(id) = inner.next_due(until) else {
                    break;
                };
                let due = inner.timers[id].due;
                inner.now = inner.now.max(due);
                let now = inner.now;
                match inner.timers[id].callback.take() {
                    Some(callback) => (id, now, callback),
                    None => break,
                }
            };

            let result = callback(now);
            fired += 1;

            let mut inner = self.inner.borrow_mut();
            let seq = inner.bump_seq();
            let now = inner.now;
            let rearm = match inner.timers.get(id) {
                // Cancelled while running
                None => None,
                Some(entry) => match (result, entry.period) {
                    (Tick::Done, _) => None,
                    (Tick::After(delay), _) => Some(sanitize_period(delay)),
                    (Tick::Continue, Some(period)) => Some(period),
                    (Tick::Continue, None) => None,
                },
            };

            match rearm {
                Some(delay) => {
                    if let Some(entry) = inner.timers.get_mut(id) {
                        entry.due = now + delay;
                        entry.seq = seq;
                        entry.callback = Some(callback);
                    }
                }
                None => {
                    let removed = inner.timers.remove(id);
                    drop(inner);
                    drop(removed);
                    drop(callback);
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        if until.is_finite() && until > inner.now {
            inner.now = until;
        }
        fired
    }

    /// Run every registered frame callback once at the current time
    ///
    /// Callbacks registered during this pass first run on the next frame.
    /// Returns the number of callbacks run.
    pub fn frame(&self) -> usize {
        let (now, ids) = {
            let mut inner = self.inner.borrow_mut();
            inner.frames_run += 1;
            let mut ids: SmallVec<[(u64, FrameId); 16]> = inner
                .frames
                .iter()
                .filter(|(_, f)| f.callback.is_some())
                .map(|(id, f)| (f.seq, id))
                .collect();
            ids.sort_unstable_by_key(|(seq, _)| *seq);
            (inner.now, ids)
        };

        let mut ran = 0;
        for (_, id) in ids {
            let taken = self
                .inner
                .borrow_mut()
                .frames
                .get_mut(id)
                .and_then(|entry| entry.callback.take());
            let Some(mut callback) = taken else {
                continue;
            };

            let result = callback(now);
            ran += 1;

            let mut inner = self.inner.borrow_mut();
            if result == Tick::Done {
                let removed = inner.frames.remove(id);
                drop(inner);
                drop(removed);
                drop(callback);
            } else if let Some(entry) = inner.frames.get_mut(id) {
                entry.callback = Some(callback);
            }
        }
        ran
    }

    /// Advance the clock by `dt` ms, firing due timers, then run one frame
    pub fn advance(&self, dt: f64) {
        let target = self.now() + sanitize_delay(dt);
        self.run_until(target);
        self.frame();
    }

    /// Simulate `duration` ms of display frames spaced `frame_ms` apart
    ///
    /// Returns the number of frames run.
    pub fn run_for(&self, duration: f64, frame_ms: f64) -> u64 {
        let frame_ms = sanitize_period(frame_ms);
        let end = self.now() + sanitize_delay(duration);
        let mut frames = 0;
        while self.now() < end {
            let step = frame_ms.min(end - self.now());
            self.advance(step);
            frames += 1;
        }
        frames
    }

    /// Number of live frame callbacks
    pub fn frame_count(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    /// Number of live timers
    pub fn timer_count(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Whether anything is still registered
    pub fn has_pending(&self) -> bool {
        self.frame_count() > 0 || self.timer_count() > 0
    }

    /// Total frames run since creation
    pub fn frames_run(&self) -> u64 {
        self.inner.borrow().frames_run
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the frame scheduler
///
/// Passed to components that need to register callbacks. It won't keep the
/// scheduler alive; once the scheduler is gone every operation no-ops.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle that is never alive, for components built outside a host
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Current virtual time, if the scheduler is alive
    pub fn now(&self) -> Option<f64> {
        self.inner.upgrade().map(|inner| inner.borrow().now)
    }

    // =========================================================================
    // Frame callbacks
    // =========================================================================

    /// Register a per-frame callback
    pub fn request_frame<F>(&self, callback: F) -> Option<FrameId>
    where
        F: FnMut(f64) -> Tick + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().insert_frame(Box::new(callback));
        tracing::trace!(?id, "frame callback registered");
        Some(id)
    }

    /// Cancel a frame callback. Returns whether it was still registered.
    pub fn cancel_frame(&self, id: FrameId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().frames.remove(id);
        let existed = removed.is_some();
        drop(removed);
        if existed {
            tracing::trace!(?id, "frame callback cancelled");
        }
        existed
    }

    /// Register a per-frame callback cancelled when the subscription drops
    pub fn scoped_frame<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(f64) -> Tick + 'static,
    {
        match self.request_frame(callback) {
            Some(id) => {
                let handle = self.clone();
                Subscription::new(move || {
                    handle.cancel_frame(id);
                })
            }
            None => Subscription::empty(),
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Run `callback` once after `delay` ms
    pub fn set_timeout<F>(&self, delay: f64, callback: F) -> Option<TimerId>
    where
        F: FnOnce(f64) + 'static,
    {
        let mut once = Some(callback);
        self.insert_timer(
            delay,
            None,
            Box::new(move |now| {
                if let Some(callback) = once.take() {
                    callback(now);
                }
                Tick::Done
            }),
        )
    }

    /// Run `callback` every `period` ms until it returns [`Tick::Done`]
    ///
    /// Periods below [`MIN_INTERVAL_MS`] are clamped.
    pub fn set_interval<F>(&self, period: f64, callback: F) -> Option<TimerId>
    where
        F: FnMut(f64) -> Tick + 'static,
    {
        let period = sanitize_period(period);
        self.insert_timer(period, Some(period), Box::new(callback))
    }

    /// Run `callback` after `delay` ms; it keeps running for as long as it
    /// returns [`Tick::After`] with its next delay
    pub fn set_timer<F>(&self, delay: f64, callback: F) -> Option<TimerId>
    where
        F: FnMut(f64) -> Tick + 'static,
    {
        self.insert_timer(delay, None, Box::new(callback))
    }

    fn insert_timer(&self, delay: f64, period: Option<f64>, callback: Callback) -> Option<TimerId> {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().insert_timer(delay, period, callback);
        tracing::trace!(?id, delay, ?period, "timer registered");
        Some(id)
    }

    /// Cancel a timer. Returns whether it was still registered.
    pub fn clear_timer(&self, id: TimerId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().timers.remove(id);
        let existed = removed.is_some();
        drop(removed);
        if existed {
            tracing::trace!(?id, "timer cleared");
        }
        existed
    }

    /// [`set_timeout`](Self::set_timeout) cancelled when the subscription drops
    pub fn scoped_timeout<F>(&self, delay: f64, callback: F) -> Subscription
    where
        F: FnOnce(f64) + 'static,
    {
        self.scope_timer(self.set_timeout(delay, callback))
    }

    /// [`set_interval`](Self::set_interval) cancelled when the subscription drops
    pub fn scoped_interval<F>(&self, period: f64, callback: F) -> Subscription
    where
        F: FnMut(f64) -> Tick + 'static,
    {
        self.scope_timer(self.set_interval(period, callback))
    }

    /// [`set_timer`](Self::set_timer) cancelled when the subscription drops
    pub fn scoped_timer<F>(&self, delay: f64, callback: F) -> Subscription
    where
        F: FnMut(f64) -> Tick + 'static,
    {
        self.scope_timer(self.set_timer(delay, callback))
    }

    fn scope_timer(&self, id: Option<TimerId>) -> Subscription {
        match id {
            Some(id) => {
                let handle = self.clone();
                Subscription::new(move || {
                    handle.clear_timer(id);
                })
            }
            None => Subscription::empty(),
        }
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn test_frame_callback_runs_until_done() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let runs = Rc::new(Cell::new(0));

        let r = Rc::clone(&runs);
        handle.request_frame(move |_| {
            r.set(r.get() + 1);
            if r.get() == 3 {
                Tick::Done
            } else {
                Tick::Continue
            }
        });

        for _ in 0..5 {
            scheduler.advance(16.0);
        }
        assert_eq!(runs.get(), 3);
        assert_eq!(scheduler.frame_count(), 0);
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(300.0, "c"), (100.0, "a"), (200.0, "b"), (100.0, "a2")] {
            let l = Rc::clone(&log);
            handle.set_timeout(delay, move |now| l.borrow_mut().push((name, now)));
        }

        scheduler.advance(1000.0);
        assert_eq!(
            *log.borrow(),
            vec![("a", 100.0), ("a2", 100.0), ("b", 200.0), ("c", 300.0)]
        );
        assert_eq!(scheduler.now(), 1000.0);
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_interval_fires_each_period() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let times = Rc::new(RefCell::new(Vec::new()));

        let t = Rc::clone(&times);
        handle.set_interval(50.0, move |now| {
            t.borrow_mut().push(now);
            Tick::Continue
        });

        scheduler.advance(175.0);
        assert_eq!(*times.borrow(), vec![50.0, 100.0, 150.0]);
    }

    #[test]
    fn test_timer_rearms_with_after() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let times = Rc::new(RefCell::new(Vec::new()));

        let t = Rc::clone(&times);
        let mut delay = 10.0;
        handle.set_timer(10.0, move |now| {
            t.borrow_mut().push(now);
            delay *= 2.0;
            Tick::After(delay)
        });

        scheduler.advance(100.0);
        assert_eq!(*times.borrow(), vec![10.0, 30.0, 70.0]);
        assert_eq!(scheduler.timer_count(), 1);
    }

    #[test]
    fn test_scoped_registrations_cancel_on_drop() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let runs = Rc::new(Cell::new(0));

        let r1 = Rc::clone(&runs);
        let frame = handle.scoped_frame(move |_| {
            r1.set(r1.get() + 1);
            Tick::Continue
        });
        let r2 = Rc::clone(&runs);
        let interval = handle.scoped_interval(10.0, move |_| {
            r2.set(r2.get() + 1);
            Tick::Continue
        });
        assert_eq!(scheduler.frame_count(), 1);
        assert_eq!(scheduler.timer_count(), 1);

        drop(frame);
        drop(interval);
        assert!(!scheduler.has_pending());

        scheduler.advance(100.0);
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_callback_can_cancel_itself() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let runs = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let r = Rc::clone(&runs);
        let s = Rc::clone(&slot);
        let sub = handle.scoped_interval(10.0, move |_| {
            r.set(r.get() + 1);
            // Unmount from inside the callback
            s.borrow_mut().take();
            Tick::Continue
        });
        *slot.borrow_mut() = Some(sub);

        scheduler.advance(100.0);
        assert_eq!(runs.get(), 1);
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_callback_cancelled_mid_frame_does_not_run() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let second_ran = Rc::new(Cell::new(false));
        let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let s = Rc::clone(&second);
        let _first = handle.scoped_frame(move |_| {
            s.borrow_mut().take();
            Tick::Continue
        });
        let ran = Rc::clone(&second_ran);
        *second.borrow_mut() = Some(handle.scoped_frame(move |_| {
            ran.set(true);
            Tick::Continue
        }));

        scheduler.frame();
        assert!(!second_ran.get());
        assert_eq!(scheduler.frame_count(), 1);
    }

    #[test]
    fn test_frame_registered_during_frame_waits() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let inner_runs = Rc::new(Cell::new(0));

        let h = handle.clone();
        let r = Rc::clone(&inner_runs);
        handle.request_frame(move |_| {
            let r = Rc::clone(&r);
            h.request_frame(move |_| {
                r.set(r.get() + 1);
                Tick::Done
            });
            Tick::Done
        });

        scheduler.frame();
        assert_eq!(inner_runs.get(), 0);
        scheduler.frame();
        assert_eq!(inner_runs.get(), 1);
    }

    #[test]
    fn test_interval_period_clamped() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let runs = Rc::new(Cell::new(0));

        let r = Rc::clone(&runs);
        handle.set_interval(0.0, move |_| {
            r.set(r.get() + 1);
            Tick::Continue
        });

        scheduler.run_until(10.0);
        assert_eq!(runs.get(), 10);
    }

    #[test]
    fn test_run_for_counts_frames() {
        let scheduler = FrameScheduler::new();
        let frames = scheduler.run_for(100.0, 16.0);
        assert_eq!(frames, 7);
        assert_eq!(scheduler.now(), 100.0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());
        assert!(handle.request_frame(|_| Tick::Continue).is_none());
        assert!(!handle.scoped_timeout(10.0, |_| {}).is_active());
        assert_eq!(handle.now(), None);
    }
}
