//! Code rain
//!
//! Snippets of geospatial code falling down the background. A first wave of
//! drops is staggered one second apart, then a new drop spawns every two
//! seconds, and every drop is removed a fixed time after it spawned.

use rand::rngs::StdRng;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use spatial_core::{DisposeBag, Host, Subscription, Tick};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const CODE_SNIPPETS: [&str; 15] = [
    "import arcpy",
    "ee.Initialize()",
    "SELECT * FROM spatial_data",
    "gdf = gpd.read_file()",
    "ST_Distance(geom1, geom2)",
    "map.addLayer()",
    "projection: EPSG:4326",
    "buffer(distance=1000)",
    "intersects(geometry)",
    "geoprocessing.clip()",
    "from osgeo import gdal",
    "raster = ee.Image()",
    "geometry.within(bounds)",
    "CREATE INDEX ON spatial_table",
    "leaflet.map(\"map\")",
];

#[derive(Clone, Debug, PartialEq)]
pub struct CodeRainConfig {
    pub initial_drops: usize,
    /// Gap between the initial drops (ms)
    pub stagger_ms: f64,
    /// Spawn period once the initial wave is under way (ms)
    pub spawn_interval_ms: f64,
    /// Time from spawn to removal (ms)
    pub lifetime_ms: f64,
}

impl Default for CodeRainConfig {
    fn default() -> Self {
        Self {
            initial_drops: 15,
            stagger_ms: 1000.0,
            spawn_interval_ms: 2000.0,
            lifetime_ms: 25_000.0,
        }
    }
}

/// One falling snippet
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RainDrop {
    pub id: u64,
    pub text: &'static str,
    /// Horizontal position in viewport widths, [0, 100)
    pub left_vw: f64,
    /// Fall time in seconds, [10, 20)
    pub duration_s: f64,
    /// Seconds before it starts falling, [0, 5)
    pub delay_s: f64,
    /// Clock time it was spawned (ms)
    pub spawned_at: f64,
}

impl RainDrop {
    fn random<R: Rng + ?Sized>(rng: &mut R, id: u64, now: f64) -> Self {
        Self {
            id,
            text: CODE_SNIPPETS[rng.gen_range(0..CODE_SNIPPETS.len())],
            left_vw: rng.gen_range(0.0..100.0),
            duration_s: rng.gen_range(10.0..20.0),
            delay_s: rng.gen_range(0.0..5.0),
            spawned_at: now,
        }
    }

    /// How far down the screen the drop is at `now`, in [0, 1]
    pub fn fall_progress(&self, now: f64) -> f64 {
        let falling = (now - self.spawned_at) / 1000.0 - self.delay_s;
        (falling / self.duration_s).clamp(0.0, 1.0)
    }
}

struct RainState {
    host: Host,
    rng: StdRng,
    lifetime_ms: f64,
    next_id: u64,
    drops: Vec<RainDrop>,
    removals: FxHashMap<u64, Subscription>,
}

fn spawn(shared: &Rc<RefCell<RainState>>, now: f64) {
    let weak: Weak<RefCell<RainState>> = Rc::downgrade(shared);
    let mut state = shared.borrow_mut();
    let id = state.next_id;
    state.next_id += 1;
    let raindrop = RainDrop::random(&mut state.rng, id, now);
    tracing::trace!(id, text = raindrop.text, "rain drop spawned");
    state.drops.push(raindrop);

    let removal = state.host.scheduler.scoped_timeout(state.lifetime_ms, move |_| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let removal = {
            let mut state = shared.borrow_mut();
            state.drops.retain(|d| d.id != id);
            state.removals.remove(&id)
        };
        // Already fired; releasing it is a no-op
        drop(removal);
    });
    state.removals.insert(id, removal);
}

/// A running code rain, stopped when dropped
pub struct CodeRain {
    state: Rc<RefCell<RainState>>,
    _timers: DisposeBag,
}

impl CodeRain {
    pub fn mount(host: &Host, config: &CodeRainConfig, rng: StdRng) -> Self {
        let state = Rc::new(RefCell::new(RainState {
            host: host.clone(),
            rng,
            lifetime_ms: config.lifetime_ms,
            next_id: 0,
            drops: Vec::new(),
            removals: FxHashMap::default(),
        }));

        let mut timers = DisposeBag::new();
        for i in 0..config.initial_drops {
            let weak = Rc::downgrade(&state);
            timers.add(host.scheduler.scoped_timeout(i as f64 * config.stagger_ms, move |now| {
                if let Some(state) = weak.upgrade() {
                    spawn(&state, now);
                }
            }));
        }

        let weak = Rc::downgrade(&state);
        timers.add(host.scheduler.scoped_interval(config.spawn_interval_ms, move |now| {
            let Some(state) = weak.upgrade() else {
                return Tick::Done;
            };
            spawn(&state, now);
            Tick::Continue
        }));

        tracing::debug!(initial = config.initial_drops, "code rain mounted");
        Self {
            state,
            _timers: timers,
        }
    }

    /// Drops currently on screen, oldest first
    pub fn drops(&self) -> Vec<RainDrop> {
        self.state.borrow().drops.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CodeRain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeRain").field("drops", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use spatial_core::{FrameScheduler, Viewport};

    fn mount(scheduler: &FrameScheduler) -> CodeRain {
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        CodeRain::mount(&host, &CodeRainConfig::default(), StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_initial_wave_and_interval() {
        let scheduler = FrameScheduler::new();
        let rain = mount(&scheduler);

        // First drop spawns immediately
        scheduler.advance(0.0);
        assert_eq!(rain.len(), 1);

        // t=10s: initial drops at 0..=10 (11) plus interval at 2,4,6,8,10 (5)
        scheduler.advance(10_000.0);
        assert_eq!(rain.len(), 16);

        for drop in rain.drops() {
            assert!(CODE_SNIPPETS.contains(&drop.text));
            assert!((0.0..100.0).contains(&drop.left_vw));
            assert!((10.0..20.0).contains(&drop.duration_s));
            assert!((0.0..5.0).contains(&drop.delay_s));
        }
    }

    #[test]
    fn test_drops_expire() {
        let scheduler = FrameScheduler::new();
        let rain = mount(&scheduler);

        scheduler.advance(0.0);
        let first = rain.drops()[0].id;
        scheduler.advance(24_999.0);
        assert!(rain.drops().iter().any(|d| d.id == first));
        scheduler.advance(1.0);
        assert!(rain.drops().iter().all(|d| d.id != first));

        // Steady state: everything older than 25s is gone
        scheduler.advance(60_000.0);
        let now = scheduler.now();
        assert!(rain.drops().iter().all(|d| now - d.spawned_at < 25_000.0));
        assert_eq!(rain.len(), 12);
    }

    #[test]
    fn test_fall_progress() {
        let drop = RainDrop {
            id: 0,
            text: CODE_SNIPPETS[0],
            left_vw: 10.0,
            duration_s: 10.0,
            delay_s: 2.0,
            spawned_at: 1000.0,
        };
        assert_eq!(drop.fall_progress(1000.0), 0.0);
        assert_eq!(drop.fall_progress(3000.0), 0.0);
        assert_eq!(drop.fall_progress(8000.0), 0.5);
        assert_eq!(drop.fall_progress(60_000.0), 1.0);
    }

    #[test]
    fn test_unmount_releases_every_timer() {
        let scheduler = FrameScheduler::new();
        let rain = mount(&scheduler);
        scheduler.advance(3000.0);
        assert!(scheduler.timer_count() > 0);

        drop(rain);
        assert_eq!(scheduler.timer_count(), 0);
    }
}
