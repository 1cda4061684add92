//! Spatial Site
//!
//! The landing page itself: its configuration, the sections that talk to the
//! outside world, and the composition that mounts everything at once.
//!
//! # Features
//!
//! - **Configuration**: One TOML file, every field optional ([`SiteConfig`])
//! - **Contact Form**: Validation, relay submission and timed reset
//! - **Earthquake Feed**: Polled GeoJSON with a demo fallback
//! - **Telemetry**: Simulated system status and live data counters
//! - **Chrome**: Navigation bar, before/after slider and HUD cursor
//! - **Page**: [`LandingPage`] mounts it all and snapshots what is on screen
//!
//! Remote services sit behind the [`FormRelay`] and [`FeedSource`] traits so
//! the page can run headless.

pub mod config;
pub mod contact;
pub mod cursor;
pub mod error;
pub mod feed;
pub mod navigation;
pub mod page;
pub mod slider;
pub mod telemetry;

pub use config::SiteConfig;
pub use contact::{ContactForm, FormFields, FormRelay, FormStatus, RelayPayload};
pub use cursor::{coordinate_label, CursorState, HudCursor};
pub use error::{FeedError, FormError, RelayError, Result, SiteError};
pub use feed::{
    demo_events, parse_feed, EarthquakeEvent, EarthquakeFeed, FeedOrigin, FeedSnapshot,
    FeedSource, MagnitudeClass,
};
pub use navigation::{Navigation, Section};
pub use page::{CounterSnapshot, LandingPage, PageSnapshot};
pub use slider::{BeforeAfterSlider, ContainerRect, SliderInput};
pub use telemetry::{ItemStatus, LiveStats, StatusItem, SystemStatus, Telemetry, TelemetryReading};
