//! Spatial Animation Values
//!
//! Everything on the page that moves is a value computed from time or scroll
//! position. This crate holds those computations and the components that run
//! them against a [`spatial_core::Host`].
//!
//! # Features
//!
//! - **Easing & Range Mapping**: `lerp`, two-stop [`ScrollRange`] and
//!   multi-stop [`RangeMap`], all clamped to their output bounds
//! - **Timed Targets**: [`AnimationTarget`] eases to a value and lands on it exactly
//! - **Counters**: Integer counters that start when scrolled into view
//! - **Typewriter**: Type, pause, delete, next; one re-arming timer
//! - **Decoding Text**: Left-to-right reveal over a scrambled tail
//! - **Parallax**: Per-layer scroll offsets and section-progress tracks
//!
//! # Example
//!
//! ```rust
//! use spatial_animation::{lerp, CounterAnimator};
//!
//! assert_eq!(lerp(1500.0, (0.0, 1000.0), (0.0, -300.0)), -300.0);
//!
//! let mut counter = CounterAnimator::new(100, 2000.0).unwrap();
//! assert_eq!(counter.sample(0.0), 0);
//! assert_eq!(counter.sample(2000.0), 100);
//! ```

pub mod counter;
pub mod decode;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod parallax;
pub mod target;
pub mod typewriter;

pub use counter::{group_thousands, CounterAnimator, CounterSpec, MetricsCounter};
pub use decode::{DecodeConfig, DecodeState, DecodingText, SCRAMBLE_ALPHABET, TICKS_PER_CHAR};
pub use easing::{ease_out_cubic, Easing};
pub use error::{AnimationError, Result};
pub use interpolate::{lerp, Interpolate, RangeMap, ScrollRange};
pub use parallax::{
    Offsets, ParallaxLayer, ParallaxMapper, ParallaxView, SectionMotion, SectionView, Track,
};
pub use target::AnimationTarget;
pub use typewriter::{Phase, Typewriter, TypewriterConfig, TypewriterState};
