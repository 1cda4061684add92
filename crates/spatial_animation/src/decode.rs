//! Decoding text
//!
//! Reveals a string left to right while the unrevealed tail flickers through
//! random characters, like a readout locking on. The reveal advances a third
//! of a character per tick; spaces are never scrambled, so word shapes are
//! visible from the start.

use crate::error::{AnimationError, Result};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use spatial_core::{DisposeBag, ElementBounds, Host, Subscription, Tick, VisibilityGate};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Characters drawn for the unrevealed tail
pub const SCRAMBLE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%&*<>[]{}";

/// Ticks needed to reveal one character
pub const TICKS_PER_CHAR: usize = 3;

/// The reveal machine for one string
#[derive(Clone, Debug)]
pub struct DecodeState {
    target: Vec<char>,
    alphabet: Vec<char>,
    display: Vec<char>,
    ticks: usize,
    complete: bool,
}

impl DecodeState {
    /// Start fully scrambled; the display is blank until the first tick
    pub fn new(target: &str, alphabet: &str) -> Result<Self> {
        let alphabet: Vec<char> = alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(AnimationError::EmptyAlphabet);
        }
        let target: Vec<char> = target.chars().collect();
        let complete = target.is_empty();
        Ok(Self {
            display: blank(&target),
            target,
            alphabet,
            ticks: 0,
            complete,
        })
    }

    /// Advance one tick, rescrambling the unrevealed tail
    ///
    /// Returns `true` once the whole target is shown; further ticks do nothing.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.complete {
            return true;
        }
        self.ticks += 1;
        if self.ticks >= TICKS_PER_CHAR * self.target.len() {
            self.display.clone_from(&self.target);
            self.complete = true;
            return true;
        }

        let revealed = self.revealed();
        for (i, (shown, &ch)) in self.display.iter_mut().zip(&self.target).enumerate() {
            *shown = if i < revealed || ch == ' ' {
                ch
            } else {
                self.alphabet[rng.gen_range(0..self.alphabet.len())]
            };
        }
        false
    }

    /// Length of the settled prefix
    ///
    /// Tick `k` settles `ceil((k - 1) / 3)` characters, so the first tick is
    /// all scramble.
    pub fn revealed(&self) -> usize {
        if self.complete {
            self.target.len()
        } else {
            self.ticks
                .saturating_sub(1)
                .div_ceil(TICKS_PER_CHAR)
                .min(self.target.len())
        }
    }

    pub fn display(&self) -> String {
        self.display.iter().collect()
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

fn blank(target: &[char]) -> Vec<char> {
    vec![' '; target.len()]
}

/// Timing for a mounted decode effect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Tick interval (ms)
    pub speed_ms: f64,
    /// Wait after entering the viewport before the first tick (ms)
    pub delay_ms: f64,
    /// Viewport margin for the entry check; negative means further inside
    pub margin: f64,
    pub alphabet: String,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            speed_ms: 50.0,
            delay_ms: 0.0,
            margin: -100.0,
            alphabet: SCRAMBLE_ALPHABET.to_string(),
        }
    }
}

struct DecodeShared {
    host: Host,
    state: DecodeState,
    rng: StdRng,
    gate: VisibilityGate,
    bounds: ElementBounds,
    speed_ms: f64,
    delay_ms: f64,
    started: bool,
    /// The pending delay, then the tick interval
    timer: Option<Subscription>,
}

fn activate(shared: &Rc<RefCell<DecodeShared>>) {
    let (host, delay) = {
        let state = shared.borrow();
        (state.host.clone(), state.delay_ms)
    };
    let weak = Rc::downgrade(shared);
    let timeout = host.scheduler.scoped_timeout(delay, move |_| {
        if let Some(shared) = weak.upgrade() {
            start_ticking(&shared);
        }
    });
    let previous = shared.borrow_mut().timer.replace(timeout);
    drop(previous);
}

fn start_ticking(shared: &Rc<RefCell<DecodeShared>>) {
    let (host, speed) = {
        let mut state = shared.borrow_mut();
        state.started = true;
        (state.host.clone(), state.speed_ms)
    };
    let weak: Weak<RefCell<DecodeShared>> = Rc::downgrade(shared);
    let interval = host.scheduler.scoped_interval(speed, move |_| {
        let Some(shared) = weak.upgrade() else {
            return Tick::Done;
        };
        let mut guard = shared.borrow_mut();
        let state = &mut *guard;
        if state.state.tick(&mut state.rng) {
            tracing::debug!(text = %state.state.target(), "decode complete");
            Tick::Done
        } else {
            Tick::Continue
        }
    });
    // Drops the fired timeout's subscription, a no-op cancel
    let previous = shared.borrow_mut().timer.replace(interval);
    drop(previous);
}

/// Decoding text that starts once its element has scrolled into view
pub struct DecodingText {
    shared: Rc<RefCell<DecodeShared>>,
    _subscriptions: DisposeBag,
}

impl DecodingText {
    pub fn mount(
        host: &Host,
        text: &str,
        bounds: ElementBounds,
        config: &DecodeConfig,
        rng: StdRng,
    ) -> Result<Self> {
        let speed_ms = AnimationError::check_timing("decode speed", config.speed_ms)?;
        let shared = Rc::new(RefCell::new(DecodeShared {
            host: host.clone(),
            state: DecodeState::new(text, &config.alphabet)?,
            rng,
            gate: VisibilityGate::new(true, config.margin),
            bounds,
            speed_ms,
            delay_ms: config.delay_ms.max(0.0),
            started: false,
            timer: None,
        }));

        let weak = Rc::downgrade(&shared);
        let layout = host.viewport.on_layout(move |scroll| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let entered = {
                let mut state = shared.borrow_mut();
                let bounds = state.bounds;
                state.gate.observe(&bounds, scroll)
            };
            if entered {
                activate(&shared);
            }
        });

        let entered = {
            let mut state = shared.borrow_mut();
            let bounds = state.bounds;
            state.gate.observe(&bounds, &host.scroll())
        };
        if entered {
            activate(&shared);
        }

        Ok(Self {
            shared,
            _subscriptions: DisposeBag::new().with(layout),
        })
    }

    /// Text as currently shown; blank until decoding starts
    pub fn text(&self) -> String {
        self.shared.borrow().state.display()
    }

    pub fn is_started(&self) -> bool {
        self.shared.borrow().started
    }

    pub fn is_complete(&self) -> bool {
        self.shared.borrow().state.is_complete()
    }
}

impl std::fmt::Debug for DecodingText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("DecodingText")
            .field("display", &shared.state.display())
            .field("complete", &shared.state.is_complete())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use spatial_core::{FrameScheduler, Viewport};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_prefix_matches_target() {
        let mut state = DecodeState::new("GEOSPATIAL DATA", SCRAMBLE_ALPHABET).unwrap();
        let target: Vec<char> = "GEOSPATIAL DATA".chars().collect();
        let mut rng = rng();
        let mut last_revealed = 0;

        while !state.tick(&mut rng) {
            let revealed = state.revealed();
            assert!(revealed >= last_revealed);
            last_revealed = revealed;

            let shown: Vec<char> = state.display().chars().collect();
            assert_eq!(shown.len(), target.len());
            for (i, (&s, &t)) in shown.iter().zip(&target).enumerate() {
                if i < revealed || t == ' ' {
                    assert_eq!(s, t);
                } else {
                    assert!(SCRAMBLE_ALPHABET.contains(s));
                }
            }
        }
        assert_eq!(state.display(), "GEOSPATIAL DATA");
    }

    #[test]
    fn test_reveal_curve() {
        let mut state = DecodeState::new("ABCD", SCRAMBLE_ALPHABET).unwrap();
        let mut rng = rng();
        let mut curve = Vec::new();
        for _ in 0..11 {
            state.tick(&mut rng);
            curve.push(state.revealed());
        }
        assert_eq!(curve, [0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4]);
        assert!(!state.is_complete());
        assert_eq!(state.display(), "ABCD");
    }

    #[test]
    fn test_completes_after_three_ticks_per_char() {
        for text in ["", " ", "   ", "A", "Real-Time Spatial", "ÆØÅ earth"] {
            let mut state = DecodeState::new(text, SCRAMBLE_ALPHABET).unwrap();
            let mut rng = rng();
            let needed = TICKS_PER_CHAR * text.chars().count();
            for _ in 0..needed {
                state.tick(&mut rng);
            }
            assert!(state.is_complete(), "{text:?}");
            assert_eq!(state.display(), text);
            assert_eq!(state.revealed(), text.chars().count());
        }
    }

    #[test]
    fn test_not_complete_one_tick_early() {
        let mut state = DecodeState::new("ABCD", SCRAMBLE_ALPHABET).unwrap();
        let mut rng = rng();
        for _ in 0..11 {
            assert!(!state.tick(&mut rng));
        }
        assert!(state.tick(&mut rng));
    }

    #[test]
    fn test_empty_alphabet() {
        assert!(matches!(
            DecodeState::new("x", ""),
            Err(AnimationError::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_mount_waits_for_view_and_delay() {
        let scheduler = FrameScheduler::new();
        let viewport = Rc::new(Viewport::new(1200.0, 800.0));
        let host = Host::new(scheduler.handle(), Rc::clone(&viewport));
        let bounds = ElementBounds::new(1000.0, 40.0).unwrap();
        let config = DecodeConfig {
            delay_ms: 200.0,
            ..Default::default()
        };
        let text = DecodingText::mount(&host, "GIS", bounds, &config, rng()).unwrap();

        assert_eq!(text.text(), "   ");
        scheduler.advance(1000.0);
        assert!(!text.is_started());

        // 50px inside the viewport is not enough with a -100px margin
        viewport.scroll_to(250.0);
        scheduler.advance(1000.0);
        assert!(!text.is_started());

        viewport.scroll_to(400.0);
        scheduler.advance(199.0);
        assert!(!text.is_started());
        scheduler.advance(1.0);
        assert!(text.is_started());

        // 9 ticks at 50ms
        scheduler.advance(450.0);
        assert!(text.is_complete());
        assert_eq!(text.text(), "GIS");
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_unmount_before_delay_clears_timer() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::new(1200.0, 800.0)));
        let bounds = ElementBounds::new(100.0, 40.0).unwrap();
        let config = DecodeConfig {
            delay_ms: 500.0,
            ..Default::default()
        };
        let text = DecodingText::mount(&host, "EARTH", bounds, &config, rng()).unwrap();
        assert_eq!(scheduler.timer_count(), 1);

        drop(text);
        assert_eq!(scheduler.timer_count(), 0);
        assert_eq!(host.viewport.listener_count(), 0);
    }
}
