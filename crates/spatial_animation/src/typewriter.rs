//! Typewriter text
//!
//! Types each string of a sequence one character at a time, holds it for a
//! pause, deletes it again and moves on to the next, forever:
//!
//! ```text
//! Typing --(full)--> Paused --(pause over)--> Deleting --(empty)--> Typing(next)
//! ```
//!
//! [`TypewriterState`] is the machine; every [`step`](TypewriterState::step)
//! returns the delay until the next one, so [`Typewriter`] drives it with a
//! single re-arming timer.

use crate::error::{AnimationError, Result};
use serde::{Deserialize, Serialize};
use spatial_core::{Host, Subscription, Tick};
use std::cell::RefCell;
use std::rc::Rc;

/// Where the machine is in its cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Typing,
    Paused,
    Deleting,
}

/// Strings and timings for a typewriter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub texts: Vec<String>,
    /// Delay between typed characters (ms)
    pub speed_ms: f64,
    /// Delay between deleted characters (ms)
    pub delete_speed_ms: f64,
    /// How long a fully typed string stays up (ms); 0 deletes right away
    pub pause_ms: f64,
}

impl TypewriterConfig {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_speeds(mut self, speed_ms: f64, delete_speed_ms: f64, pause_ms: f64) -> Self {
        self.speed_ms = speed_ms;
        self.delete_speed_ms = delete_speed_ms;
        self.pause_ms = pause_ms;
        self
    }
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            speed_ms: 100.0,
            delete_speed_ms: 50.0,
            pause_ms: 2000.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypewriterState {
    texts: Vec<Vec<char>>,
    index: usize,
    len: usize,
    phase: Phase,
    speed_ms: f64,
    delete_speed_ms: f64,
    pause_ms: f64,
}

impl TypewriterState {
    pub fn new(config: &TypewriterConfig) -> Result<Self> {
        if config.texts.is_empty() {
            return Err(AnimationError::EmptySequence);
        }
        Ok(Self {
            texts: config.texts.iter().map(|t| t.chars().collect()).collect(),
            index: 0,
            len: 0,
            phase: Phase::Typing,
            speed_ms: AnimationError::check_timing("typing speed", config.speed_ms)?,
            delete_speed_ms: AnimationError::check_timing("delete speed", config.delete_speed_ms)?,
            pause_ms: AnimationError::check_delay("pause", config.pause_ms)?,
        })
    }

    fn full_len(&self) -> usize {
        self.texts[self.index].len()
    }

    /// Run one transition and return the delay until the next (ms)
    pub fn step(&mut self) -> f64 {
        match self.phase {
            Phase::Typing => {
                if self.len < self.full_len() {
                    self.len += 1;
                }
                if self.len >= self.full_len() {
                    self.phase = Phase::Paused;
                    self.pause_ms
                } else {
                    self.speed_ms
                }
            }
            Phase::Paused => {
                self.phase = Phase::Deleting;
                self.delete_speed_ms
            }
            Phase::Deleting => {
                self.len = self.len.saturating_sub(1);
                if self.len == 0 {
                    self.index = (self.index + 1) % self.texts.len();
                    self.phase = Phase::Typing;
                    self.speed_ms
                } else {
                    self.delete_speed_ms
                }
            }
        }
    }

    /// Delay before the first step
    pub fn initial_delay(&self) -> f64 {
        self.speed_ms
    }

    /// The visible prefix of the active string
    pub fn text(&self) -> String {
        self.texts[self.index][..self.len].iter().collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn visible_len(&self) -> usize {
        self.len
    }
}

/// A mounted typewriter, stopped when dropped
pub struct Typewriter {
    state: Rc<RefCell<TypewriterState>>,
    _timer: Subscription,
}

impl Typewriter {
    /// Start typing immediately; the first character appears after one
    /// typing delay
    pub fn mount(host: &Host, config: &TypewriterConfig) -> Result<Self> {
        let state = Rc::new(RefCell::new(TypewriterState::new(config)?));
        let weak = Rc::downgrade(&state);
        let first = state.borrow().initial_delay();

        let timer = host.scheduler.scoped_timer(first, move |_| {
            let Some(state) = weak.upgrade() else {
                return Tick::Done;
            };
            let mut state = state.borrow_mut();
            let before = state.phase();
            let delay = state.step();
            if state.phase() != before {
                tracing::trace!(phase = ?state.phase(), index = state.index(), "typewriter phase");
            }
            Tick::After(delay)
        });
        tracing::debug!(texts = config.texts.len(), "typewriter mounted");

        Ok(Self {
            state,
            _timer: timer,
        })
    }

    pub fn text(&self) -> String {
        self.state.borrow().text()
    }

    pub fn index(&self) -> usize {
        self.state.borrow().index()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase()
    }
}

impl std::fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Typewriter")
            .field("text", &state.text())
            .field("phase", &state.phase())
            .finish()
    }
}
