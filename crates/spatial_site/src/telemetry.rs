//! Simulated telemetry
//!
//! The status ticker and the live data counters show plausible numbers that
//! wander a little every few seconds. Nothing is measured.

use crate::config::TelemetrySection;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use spatial_core::{EventSource, Host, Subscription, Tick};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const UPTIME_CAP: f64 = 99.99;
const STANDBY_LATENCY_MS: u32 = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Online,
    Processing,
    Standby,
}

/// One cell of the status ticker
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusItem {
    pub label: &'static str,
    pub value: String,
    pub status: ItemStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SystemStatus {
    /// Percent
    pub uptime: f64,
    pub satellites: u32,
    pub nodes: u32,
    /// Milliseconds
    pub latency: u32,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            uptime: 99.97,
            satellites: 12,
            nodes: 847,
            latency: 23,
        }
    }
}

fn wander<R: Rng + ?Sized>(rng: &mut R, value: u32, delta: std::ops::Range<i64>, min: i64, max: i64) -> u32 {
    (i64::from(value) + rng.gen_range(delta)).clamp(min, max) as u32
}

impl SystemStatus {
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.uptime = (self.uptime + rng.gen_range(-0.005..0.005)).min(UPTIME_CAP);
        self.satellites = wander(rng, self.satellites, -1..2, 8, 16);
        self.nodes = wander(rng, self.nodes, -10..10, 700, 999);
        self.latency = wander(rng, self.latency, -5..5, 15, 50);
    }

    pub fn items(&self) -> [StatusItem; 4] {
        [
            StatusItem {
                label: "SYSTEM UPTIME",
                value: format!("{:.2}%", self.uptime),
                status: ItemStatus::Online,
            },
            StatusItem {
                label: "ACTIVE SATELLITES",
                value: self.satellites.to_string(),
                status: ItemStatus::Online,
            },
            StatusItem {
                label: "PROCESSING NODES",
                value: self.nodes.to_string(),
                status: ItemStatus::Processing,
            },
            StatusItem {
                label: "AVG LATENCY",
                value: format!("{}ms", self.latency),
                status: if self.latency > STANDBY_LATENCY_MS {
                    ItemStatus::Standby
                } else {
                    ItemStatus::Online
                },
            },
        ]
    }
}

/// Numbers behind the live data counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LiveStats {
    pub data_points: u64,
    pub active_connections: u64,
}

impl Default for LiveStats {
    fn default() -> Self {
        Self {
            data_points: 1247,
            active_connections: 89,
        }
    }
}

fn drift<R: Rng + ?Sized>(rng: &mut R, value: u64, delta: std::ops::Range<i64>) -> u64 {
    value.saturating_add_signed(rng.gen_range(delta))
}

impl LiveStats {
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.data_points = drift(rng, self.data_points, -5..5);
        self.active_connections = drift(rng, self.active_connections, -3..3);
    }
}

/// Both readings at one instant
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TelemetryReading {
    pub system: SystemStatus,
    pub live: LiveStats,
}

struct TelemetryState {
    rng: StdRng,
    reading: TelemetryReading,
}

/// Steps the simulated readings on an interval, stopped when dropped
pub struct Telemetry {
    state: Rc<RefCell<TelemetryState>>,
    updates: Rc<EventSource<TelemetryReading>>,
    _tick: Subscription,
}

impl Telemetry {
    pub fn mount(host: &Host, settings: &TelemetrySection, rng: StdRng) -> Self {
        let state = Rc::new(RefCell::new(TelemetryState {
            rng,
            reading: TelemetryReading {
                system: SystemStatus::default(),
                live: LiveStats::default(),
            },
        }));
        let updates = Rc::new(EventSource::new());

        let weak_state: Weak<RefCell<TelemetryState>> = Rc::downgrade(&state);
        let weak_updates = Rc::downgrade(&updates);
        let tick = host.scheduler.scoped_interval(settings.interval_ms, move |_| {
            let (Some(state), Some(updates)) = (weak_state.upgrade(), weak_updates.upgrade()) else {
                return Tick::Done;
            };
            let reading = {
                let mut state = state.borrow_mut();
                let TelemetryState { rng, reading } = &mut *state;
                reading.system.step(rng);
                reading.live.step(rng);
                *reading
            };
            tracing::trace!(latency = reading.system.latency, "telemetry stepped");
            updates.emit(&reading);
            Tick::Continue
        });

        Self {
            state,
            updates,
            _tick: tick,
        }
    }

    pub fn reading(&self) -> TelemetryReading {
        self.state.borrow().reading
    }

    pub fn system(&self) -> SystemStatus {
        self.reading().system
    }

    pub fn live(&self) -> LiveStats {
        self.reading().live
    }

    /// Called after every step with the new reading
    pub fn on_update<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&TelemetryReading) + 'static,
    {
        self.updates.subscribe(listener)
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("reading", &self.reading())
            .finish()
    }
}
