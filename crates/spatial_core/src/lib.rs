//! Spatial Core Runtime
//!
//! This crate provides the foundational primitives every animated section of the
//! landing page is built on:
//!
//! - **Frame Scheduler**: A cooperative, single-threaded clock that drives
//!   per-frame callbacks, timeouts and intervals
//! - **Scoped Subscriptions**: Every registration returns a disposer that runs on drop
//! - **Event Sources**: Listener sets for scroll, resize and pointer events
//! - **Viewport**: Scroll position, element visibility and scroll progress
//!
//! # Example
//!
//! ```rust
//! use spatial_core::{FrameScheduler, Tick};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scheduler = FrameScheduler::new();
//! let handle = scheduler.handle();
//!
//! let fired = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&fired);
//! let sub = handle.scoped_interval(100.0, move |_now| {
//!     counter.set(counter.get() + 1);
//!     Tick::Continue
//! });
//!
//! scheduler.advance(250.0);
//! assert_eq!(fired.get(), 2);
//!
//! // Dropping the subscription cancels the interval
//! drop(sub);
//! scheduler.advance(1000.0);
//! assert_eq!(fired.get(), 2);
//! ```

pub mod error;
pub mod events;
pub mod host;
pub mod scheduler;
pub mod subscription;
pub mod viewport;

pub use error::{CoreError, Result};
pub use events::{EventSource, ListenerId};
pub use host::Host;
pub use scheduler::{FrameId, FrameScheduler, SchedulerHandle, Tick, TimerId, MIN_INTERVAL_MS};
pub use subscription::{DisposeBag, Subscription};
pub use viewport::{ElementBounds, PointerEvent, ScrollState, Viewport, VisibilityGate};
