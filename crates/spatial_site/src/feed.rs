//! Live earthquake feed
//!
//! Polls a GeoJSON summary of recent earthquakes and keeps the newest few for
//! display. When the feed cannot be fetched or read, a fixed set of demo
//! events is shown instead so the panel is never empty.

use crate::config::FeedSection;
use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use spatial_core::{Host, Subscription, Tick};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

const HOUR_MS: i64 = 3_600_000;
const PLACE_MAX_CHARS: usize = 30;

/// Where the GeoJSON body comes from
pub trait FeedSource {
    fn fetch(&self, url: &str) -> Result<String, FeedError>;

    /// Wall-clock time used to date the demo events
    fn epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EarthquakeEvent {
    pub magnitude: f64,
    pub place: String,
    /// Origin time, epoch ms
    pub time_ms: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: Option<f64>,
}

/// Severity band used to colour an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeClass {
    Minor,
    Moderate,
    Severe,
}

impl MagnitudeClass {
    pub fn of(magnitude: f64) -> Self {
        if magnitude >= 5.0 {
            Self::Severe
        } else if magnitude >= 4.0 {
            Self::Moderate
        } else {
            Self::Minor
        }
    }
}

impl EarthquakeEvent {
    pub fn class(&self) -> MagnitudeClass {
        MagnitudeClass::of(self.magnitude)
    }

    /// Place name cut to 30 characters
    pub fn short_place(&self) -> String {
        if self.place.chars().count() > PLACE_MAX_CHARS {
            let head: String = self.place.chars().take(PLACE_MAX_CHARS).collect();
            format!("{head}...")
        } else {
            self.place.clone()
        }
    }

    pub fn coordinates_label(&self) -> String {
        format!("{:.2}°, {:.2}°", self.latitude, self.longitude)
    }

    pub fn magnitude_label(&self) -> String {
        format!("{:.1}", self.magnitude)
    }
}

// GeoJSON shapes, only the fields we read
#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    time: Option<i64>,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

/// Read up to `max_events` events from the head of a GeoJSON feature collection
///
/// Features without a magnitude or coordinates are dropped after the cut, so
/// the result may be shorter than `max_events`.
pub fn parse_feed(body: &str, max_events: usize) -> Result<Vec<EarthquakeEvent>, FeedError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;

    let events: Vec<_> = collection
        .features
        .into_iter()
        .take(max_events)
        .filter_map(|feature| {
            let magnitude = feature.properties.mag?;
            let coords = feature.geometry?.coordinates;
            let (&longitude, &latitude) = (coords.first()?, coords.get(1)?);
            Some(EarthquakeEvent {
                magnitude,
                place: feature.properties.place.unwrap_or_default(),
                time_ms: feature.properties.time.unwrap_or_default(),
                longitude,
                latitude,
                depth_km: coords.get(2).copied(),
            })
        })
        .collect();

    if events.is_empty() {
        return Err(FeedError::Empty);
    }
    Ok(events)
}

/// Stand-in events dated relative to `now_ms`
pub fn demo_events(now_ms: i64) -> Vec<EarthquakeEvent> {
    let demo = |magnitude, place: &str, hours_ago, longitude, latitude| EarthquakeEvent {
        magnitude,
        place: place.to_string(),
        time_ms: now_ms - hours_ago * HOUR_MS,
        longitude,
        latitude,
        depth_km: None,
    };
    vec![
        demo(4.2, "Northern California", 1, -122.4, 37.8),
        demo(3.8, "Southern Japan", 2, 139.7, 35.7),
        demo(5.1, "Chile Coast", 3, -71.5, -33.0),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrigin {
    Live,
    Demo,
}

/// What the panel currently shows
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub origin: FeedOrigin,
    pub events: Vec<EarthquakeEvent>,
    /// Host time of the last refresh (ms)
    pub updated_at: Option<f64>,
}

struct FeedState {
    source: Rc<dyn FeedSource>,
    settings: FeedSection,
    snapshot: FeedSnapshot,
    refreshes: u64,
}

fn refresh(shared: &Rc<RefCell<FeedState>>, now: f64) {
    // Fetch without holding the borrow
    let (source, url, max) = {
        let state = shared.borrow();
        (
            Rc::clone(&state.source),
            state.settings.url.clone(),
            state.settings.max_events,
        )
    };

    let (origin, events) = match source
        .fetch(&url)
        .and_then(|body| parse_feed(&body, max))
    {
        Ok(events) => {
            tracing::debug!(count = events.len(), "earthquake feed refreshed");
            (FeedOrigin::Live, events)
        }
        Err(err) => {
            tracing::warn!(error = %err, "earthquake feed unavailable, showing demo events");
            (FeedOrigin::Demo, demo_events(source.epoch_ms()))
        }
    };

    let mut state = shared.borrow_mut();
    state.snapshot = FeedSnapshot {
        origin,
        events,
        updated_at: Some(now),
    };
    state.refreshes += 1;
}

/// A polling earthquake panel, stopped when dropped
pub struct EarthquakeFeed {
    state: Rc<RefCell<FeedState>>,
    _poll: Subscription,
}

impl EarthquakeFeed {
    /// Fetch once now, then every `poll_interval_ms`
    pub fn mount(host: &Host, settings: FeedSection, source: Rc<dyn FeedSource>) -> Self {
        let period = settings.poll_interval_ms;
        let state = Rc::new(RefCell::new(FeedState {
            source,
            settings,
            snapshot: FeedSnapshot {
                origin: FeedOrigin::Demo,
                events: Vec::new(),
                updated_at: None,
            },
            refreshes: 0,
        }));
        refresh(&state, host.now());

        let weak: Weak<RefCell<FeedState>> = Rc::downgrade(&state);
        let poll = host.scheduler.scoped_interval(period, move |now| {
            let Some(state) = weak.upgrade() else {
                return Tick::Done;
            };
            refresh(&state, now);
            Tick::Continue
        });

        Self { state, _poll: poll }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn events(&self) -> Vec<EarthquakeEvent> {
        self.state.borrow().snapshot.events.clone()
    }

    pub fn origin(&self) -> FeedOrigin {
        self.state.borrow().snapshot.origin
    }

    pub fn refreshes(&self) -> u64 {
        self.state.borrow().refreshes
    }
}

impl std::fmt::Debug for EarthquakeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EarthquakeFeed")
            .field("origin", &state.snapshot.origin)
            .field("events", &state.snapshot.events.len())
            .finish()
    }
}
