//! Landing page composition
//!
//! Mounts every section of the page against one [`Host`]. Dropping the
//! [`LandingPage`] releases every frame callback, timer and listener the
//! sections registered.

use crate::config::{LayoutSection, SectionBounds, SiteConfig};
use crate::contact::{ContactForm, FormRelay, FormStatus};
use crate::cursor::{CursorState, HudCursor};
use crate::error::Result;
use crate::feed::{EarthquakeFeed, FeedSnapshot, FeedSource};
use crate::navigation::{Navigation, Section};
use crate::slider::{BeforeAfterSlider, SliderInput};
use crate::telemetry::{StatusItem, Telemetry, TelemetryReading};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use spatial_animation::{
    CounterSpec, DecodingText, MetricsCounter, Offsets, ParallaxMapper, ParallaxView,
    SectionMotion, SectionView, Typewriter,
};
use spatial_core::{Host, ScrollState, Subscription};
use spatial_scene::{Camera, CodeRain, CodeRainConfig, GlobeView, RainDrop, StarfieldView, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything on screen at one instant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub time_ms: f64,
    pub scroll: ScrollSnapshot,
    pub navigation: NavigationSnapshot,
    pub typewriter: String,
    pub hero_parallax: Offsets,
    pub globe: GlobeSnapshot,
    pub stars: Vec<(&'static str, f64)>,
    pub rain: Vec<RainDrop>,
    pub metrics: Vec<CounterSnapshot>,
    pub headlines: Vec<String>,
    pub story_map: Offsets,
    pub data_journey: Offsets,
    pub status: Vec<StatusItem>,
    pub telemetry: TelemetryReading,
    pub live_counters: Vec<CounterSnapshot>,
    pub feed: FeedSnapshot,
    pub form: FormStatus,
    pub slider: f64,
    pub cursor: Option<CursorState>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScrollSnapshot {
    pub offset: f64,
    pub width: f64,
    pub height: f64,
}

impl From<ScrollState> for ScrollSnapshot {
    fn from(state: ScrollState) -> Self {
        Self {
            offset: state.offset,
            width: state.width,
            height: state.height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NavigationSnapshot {
    pub scrolled: bool,
    pub menu_open: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GlobeSnapshot {
    pub rotation: Vec3,
    pub camera: Camera,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub label: String,
    pub value: u64,
    pub display: String,
}

impl From<&MetricsCounter> for CounterSnapshot {
    fn from(counter: &MetricsCounter) -> Self {
        Self {
            label: counter.spec().label.clone(),
            value: counter.value(),
            display: counter.display(),
        }
    }
}

/// Section holding the `index`th decoding headline
fn headline_anchor(layout: &LayoutSection, index: usize) -> SectionBounds {
    match index {
        0 => layout.services,
        _ => layout.technologies,
    }
}

/// The mounted page
pub struct LandingPage {
    host: Host,
    navigation: Navigation,
    typewriter: Typewriter,
    hero: ParallaxView,
    globe: GlobeView,
    stars: StarfieldView,
    rain: CodeRain,
    metrics: Vec<MetricsCounter>,
    headlines: Vec<DecodingText>,
    story_map: SectionView,
    data_journey: SectionView,
    telemetry: Telemetry,
    live_counters: Rc<Vec<MetricsCounter>>,
    feed: EarthquakeFeed,
    contact: ContactForm,
    slider: RefCell<BeforeAfterSlider>,
    cursor: HudCursor,
    _live_link: Subscription,
}

impl LandingPage {
    pub fn mount(
        host: &Host,
        config: &SiteConfig,
        relay: Rc<dyn FormRelay>,
        feed: Rc<dyn FeedSource>,
    ) -> Result<Self> {
        let seed = config.scene.seed.unwrap_or_else(rand::random);
        let mut seeds = StdRng::seed_from_u64(seed);
        let mut rng = || StdRng::seed_from_u64(seeds.gen());
        let layout = &config.layout;

        let navigation = Navigation::mount(
            host,
            &config.navigation,
            [
                (Section::Home, 0.0),
                (Section::About, layout.metrics.top),
                (Section::Services, layout.services.top),
                (Section::Technologies, layout.technologies.top),
                (Section::Contact, layout.contact.top),
            ],
        );

        let typewriter = Typewriter::mount(host, &config.typewriter.to_config())?;
        let hero = ParallaxView::mount(host, ParallaxMapper::hero());
        let globe = GlobeView::mount(host, &mut rng());
        let stars = StarfieldView::mount(host, &mut rng());
        let rain = CodeRain::mount(host, &CodeRainConfig::default(), rng());

        let metrics_bounds = layout.metrics.to_bounds()?;
        let metrics = config
            .metrics
            .iter()
            .map(|spec| MetricsCounter::mount(host, spec.clone(), metrics_bounds))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let decode = config.decode.to_config();
        let mut headlines = Vec::with_capacity(config.decode.headlines.len());
        for (i, text) in config.decode.headlines.iter().enumerate() {
            let anchor = headline_anchor(layout, i);
            headlines.push(DecodingText::mount(
                host,
                text,
                anchor.to_bounds()?,
                &decode,
                rng(),
            )?);
        }

        let story_map = SectionMotion::story_map(layout.story_map.to_bounds()?)?;
        let story_map = SectionView::mount(host, story_map);
        let data_journey = SectionMotion::data_journey(layout.data_journey.to_bounds()?)?;
        let data_journey = SectionView::mount(host, data_journey);

        let telemetry = Telemetry::mount(host, &config.telemetry, rng());
        let live_bounds = layout.live_data.to_bounds()?;
        let start = telemetry.live();
        let live_counters = Rc::new(vec![
            MetricsCounter::mount(
                host,
                CounterSpec::new(
                    "Data Points",
                    start.data_points,
                    config.live_stats.data_points_duration_ms,
                ),
                live_bounds,
            )?,
            MetricsCounter::mount(
                host,
                CounterSpec::new(
                    "Active Connections",
                    start.active_connections,
                    config.live_stats.connections_duration_ms,
                ),
                live_bounds,
            )?,
        ]);
        let weak_counters = Rc::downgrade(&live_counters);
        let live_link = telemetry.on_update(move |reading| {
            if let Some(counters) = weak_counters.upgrade() {
                counters[0].set_target(reading.live.data_points);
                counters[1].set_target(reading.live.active_connections);
            }
        });

        let feed = EarthquakeFeed::mount(host, config.feed.clone(), feed);
        let contact = ContactForm::mount(host, config.contact.clone(), relay);
        let cursor = HudCursor::mount(host, config.navigation.cursor_min_width);

        tracing::debug!(
            seed,
            counters = metrics.len(),
            headlines = headlines.len(),
            "landing page mounted"
        );

        Ok(Self {
            host: host.clone(),
            navigation,
            typewriter,
            hero,
            globe,
            stars,
            rain,
            metrics,
            headlines,
            story_map,
            data_journey,
            telemetry,
            live_counters,
            feed,
            contact,
            slider: RefCell::new(BeforeAfterSlider::new()),
            cursor,
            _live_link: live_link,
        })
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn feed(&self) -> &EarthquakeFeed {
        &self.feed
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn metrics(&self) -> &[MetricsCounter] {
        &self.metrics
    }

    pub fn slider_input(&self, input: SliderInput) -> bool {
        self.slider.borrow_mut().handle(input)
    }

    pub fn slider(&self) -> std::cell::RefMut<'_, BeforeAfterSlider> {
        self.slider.borrow_mut()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let reading = self.telemetry.reading();
        PageSnapshot {
            time_ms: self.host.now(),
            scroll: self.host.scroll().into(),
            navigation: NavigationSnapshot {
                scrolled: self.navigation.is_scrolled(),
                menu_open: self.navigation.is_menu_open(),
            },
            typewriter: self.typewriter.text(),
            hero_parallax: self.hero.offsets(),
            globe: GlobeSnapshot {
                rotation: self.globe.globe_rotation(),
                camera: self.globe.camera(),
            },
            stars: self.stars.offsets(),
            rain: self.rain.drops(),
            metrics: self.metrics.iter().map(CounterSnapshot::from).collect(),
            headlines: self.headlines.iter().map(DecodingText::text).collect(),
            story_map: self.story_map.values(),
            data_journey: self.data_journey.values(),
            status: reading.system.items().to_vec(),
            telemetry: reading,
            live_counters: self.live_counters.iter().map(CounterSnapshot::from).collect(),
            feed: self.feed.snapshot(),
            form: self.contact.status(),
            slider: self.slider.borrow().position(),
            cursor: self.cursor.visible_state(),
        }
    }
}

impl std::fmt::Debug for LandingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandingPage")
            .field("host", &self.host)
            .field("metrics", &self.metrics.len())
            .field("headlines", &self.headlines.len())
            .finish()
    }
}
