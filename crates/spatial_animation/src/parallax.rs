//! Scroll-linked motion
//!
//! Two flavours, both pure functions of the scroll state:
//!
//! - [`ParallaxMapper`]: layers offset by the page scroll position, each
//!   through its own [`ScrollRange`].
//! - [`SectionMotion`]: tracks driven by an element's progress through the
//!   viewport (0 on entry at the bottom edge, 1 on exit at the top), each
//!   through its own [`RangeMap`].
//!
//! The mounted views only cache the latest values; recomputing from the same
//! scroll state always gives the same answer.

use crate::error::Result;
use crate::interpolate::{RangeMap, ScrollRange};
use smallvec::SmallVec;
use spatial_core::{ElementBounds, Host, ScrollState, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// One layer of a parallax stack
#[derive(Clone, Debug, PartialEq)]
pub struct ParallaxLayer {
    pub name: &'static str,
    pub range: ScrollRange,
}

impl ParallaxLayer {
    pub fn new(name: &'static str, range: ScrollRange) -> Self {
        Self { name, range }
    }
}

pub type Offsets = SmallVec<[(&'static str, f64); 4]>;

/// Independent per-layer offsets for a scroll position
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParallaxMapper {
    layers: SmallVec<[ParallaxLayer; 4]>,
}

impl ParallaxMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, name: &'static str, range: ScrollRange) -> Self {
        self.layers.push(ParallaxLayer::new(name, range));
        self
    }

    /// Background star layers; smaller stars are further away and move more
    pub fn starfield() -> Self {
        Self::new()
            .layer("large", ScrollRange::new(0.0, 1000.0, 0.0, -100.0))
            .layer("medium", ScrollRange::new(0.0, 1000.0, 0.0, -200.0))
            .layer("small", ScrollRange::new(0.0, 1000.0, 0.0, -300.0))
    }

    /// Hero content drifting up over the first 300px of scroll
    pub fn hero() -> Self {
        Self::new()
            .layer("content", ScrollRange::new(0.0, 300.0, 0.0, -50.0))
            .layer("backdrop", ScrollRange::new(0.0, 300.0, 0.0, -25.0))
    }

    pub fn offsets(&self, scroll_offset: f64) -> Offsets {
        self.layers
            .iter()
            .map(|layer| (layer.name, layer.range.map(scroll_offset)))
            .collect()
    }

    pub fn offset(&self, name: &str, scroll_offset: f64) -> Option<f64> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| layer.range.map(scroll_offset))
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }
}

/// A parallax stack following the page scroll
pub struct ParallaxView {
    mapper: ParallaxMapper,
    offsets: Rc<RefCell<Offsets>>,
    _scroll: Subscription,
}

impl ParallaxView {
    pub fn mount(host: &Host, mapper: ParallaxMapper) -> Self {
        let offsets = Rc::new(RefCell::new(mapper.offsets(host.scroll().offset)));

        let listener_mapper = mapper.clone();
        let cache = Rc::clone(&offsets);
        let scroll = host.viewport.on_scroll(move |state| {
            *cache.borrow_mut() = listener_mapper.offsets(state.offset);
        });

        Self {
            mapper,
            offsets,
            _scroll: scroll,
        }
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets.borrow().clone()
    }

    pub fn offset(&self, name: &str) -> Option<f64> {
        self.offsets
            .borrow()
            .iter()
            .find(|(layer, _)| *layer == name)
            .map(|(_, value)| *value)
    }

    pub fn mapper(&self) -> &ParallaxMapper {
        &self.mapper
    }
}

impl std::fmt::Debug for ParallaxView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallaxView")
            .field("offsets", &*self.offsets.borrow())
            .finish()
    }
}

/// A named value driven by section progress
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub name: &'static str,
    pub map: RangeMap,
}

/// Values tied to one section's progress through the viewport
#[derive(Clone, Debug, PartialEq)]
pub struct SectionMotion {
    bounds: ElementBounds,
    tracks: SmallVec<[Track; 4]>,
}

impl SectionMotion {
    pub fn new(bounds: ElementBounds) -> Self {
        Self {
            bounds,
            tracks: SmallVec::new(),
        }
    }

    pub fn track(mut self, name: &'static str, inputs: &[f64], outputs: &[f64]) -> Result<Self> {
        self.tracks.push(Track {
            name,
            map: RangeMap::new(inputs, outputs)?,
        });
        Ok(self)
    }

    /// The story map fades in, holds, then fades out while scaling up
    pub fn story_map(bounds: ElementBounds) -> Result<Self> {
        Self::new(bounds)
            .track("opacity", &[0.1, 0.2, 0.8, 0.9], &[0.0, 1.0, 1.0, 0.0])?
            .track("scale", &[0.1, 0.9], &[0.8, 1.0])
    }

    /// Satellite to city: a beam grows while each stage settles in turn
    pub fn data_journey(bounds: ElementBounds) -> Result<Self> {
        Self::new(bounds)
            .track("beam", &[0.1, 0.9], &[0.0, 100.0])?
            .track("satellite", &[0.0, 0.3], &[0.0, 50.0])?
            .track("cloud", &[0.2, 0.5], &[0.0, 30.0])?
            .track("city", &[0.4, 0.7], &[0.0, 20.0])?
            .track("background", &[0.0, 1.0], &[0.0, -100.0])
    }

    pub fn progress(&self, scroll: &ScrollState) -> f64 {
        self.bounds.scroll_progress(scroll)
    }

    pub fn values(&self, scroll: &ScrollState) -> Offsets {
        let progress = self.progress(scroll);
        self.tracks
            .iter()
            .map(|track| (track.name, track.map.map(progress)))
            .collect()
    }

    pub fn bounds(&self) -> ElementBounds {
        self.bounds
    }
}

/// A section's tracks following scroll and resize
pub struct SectionView {
    values: Rc<RefCell<Offsets>>,
    _layout: Subscription,
}

impl SectionView {
    pub fn mount(host: &Host, motion: SectionMotion) -> Self {
        let values = Rc::new(RefCell::new(motion.values(&host.scroll())));
        let cache = Rc::clone(&values);
        let layout = host.viewport.on_layout(move |state| {
            *cache.borrow_mut() = motion.values(state);
        });
        Self {
            values,
            _layout: layout,
        }
    }

    pub fn values(&self) -> Offsets {
        self.values.borrow().clone()
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .borrow()
            .iter()
            .find(|(track, _)| *track == name)
            .map(|(_, value)| *value)
    }
}

impl std::fmt::Debug for SectionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionView")
            .field("values", &*self.values.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatial_core::{FrameScheduler, Viewport};

    #[test]
    fn test_starfield_offsets() {
        let stars = ParallaxMapper::starfield();
        let at = |offset| {
            stars
                .offsets(offset)
                .into_iter()
                .map(|(_, v)| v)
                .collect::<Vec<_>>()
        };
        assert_eq!(at(0.0), vec![0.0, 0.0, 0.0]);
        assert_eq!(at(500.0), vec![-50.0, -100.0, -150.0]);
        assert_eq!(at(5000.0), vec![-100.0, -200.0, -300.0]);
        assert_eq!(at(-80.0), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_layers_are_independent() {
        let mapper = ParallaxMapper::hero();
        assert_eq!(mapper.offset("content", 150.0), Some(-25.0));
        assert_eq!(mapper.offset("backdrop", 150.0), Some(-12.5));
        assert_eq!(mapper.offset("missing", 150.0), None);

        let alone = ParallaxMapper::new().layer("content", ScrollRange::new(0.0, 300.0, 0.0, -50.0));
        assert_eq!(alone.offset("content", 150.0), mapper.offset("content", 150.0));
    }

    #[test]
    fn test_view_follows_scroll() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::new(1200.0, 800.0)));
        host.viewport.scroll_to(300.0);

        let view = ParallaxView::mount(&host, ParallaxMapper::hero());
        assert_eq!(view.offset("content"), Some(-50.0));

        host.viewport.scroll_to(75.0);
        assert_eq!(view.offset("content"), Some(-12.5));

        drop(view);
        assert_eq!(host.viewport.listener_count(), 0);
    }

    #[test]
    fn test_story_map_fades() {
        // Progress runs over 800 + 1000 = 1800px of scroll from offset 200
        let bounds = ElementBounds::new(1000.0, 1000.0).unwrap();
        let motion = SectionMotion::story_map(bounds).unwrap();
        let value = |offset: f64, name: &str| {
            let scroll = ScrollState::new(offset, 1200.0, 800.0);
            motion
                .values(&scroll)
                .into_iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v)
                .unwrap()
        };

        assert_eq!(value(0.0, "opacity"), 0.0);
        assert_eq!(value(0.0, "scale"), 0.8);
        // progress 0.5
        assert_eq!(value(1100.0, "opacity"), 1.0);
        assert!((value(1100.0, "scale") - 0.9).abs() < 1e-9);
        assert_eq!(value(5000.0, "opacity"), 0.0);
        assert_eq!(value(5000.0, "scale"), 1.0);
    }

    #[test]
    fn test_data_journey_stages() {
        let bounds = ElementBounds::new(800.0, 1200.0).unwrap();
        let motion = SectionMotion::data_journey(bounds).unwrap();
        // start = 0, end = 2000
        let scroll = ScrollState::new(1000.0, 1200.0, 800.0);
        assert!((motion.progress(&scroll) - 0.5).abs() < 1e-9);

        let values = motion.values(&scroll);
        let get = |name: &str| values.iter().find(|(n, _)| *n == name).unwrap().1;
        assert!((get("beam") - 50.0).abs() < 1e-9);
        assert_eq!(get("satellite"), 50.0);
        assert_eq!(get("cloud"), 30.0);
        assert!((get("city") - 6.666_666_666).abs() < 1e-6);
        assert!((get("background") + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_section_view_tracks_resize() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::new(1200.0, 800.0)));
        let bounds = ElementBounds::new(800.0, 1200.0).unwrap();
        let view = SectionView::mount(&host, SectionMotion::data_journey(bounds).unwrap());
        assert_eq!(view.value("background"), Some(0.0));

        host.viewport.scroll_to(1000.0);
        let before = view.value("background");
        host.viewport.resize(1200.0, 400.0);
        assert_ne!(view.value("background"), before);
    }
}
