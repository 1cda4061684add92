//! Parallax starfield
//!
//! Three depth layers of twinkling stars. Each layer scrolls at its own rate;
//! smaller stars sit further back and move the most.

use rand::Rng;
use serde::Serialize;
use spatial_animation::{ParallaxMapper, ParallaxView};
use spatial_core::Host;
use std::f64::consts::TAU;

/// Dimmest brightness of the twinkle pulse
const MIN_BRIGHTNESS: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Star {
    /// Horizontal position, percent of the viewport
    pub left: f64,
    /// Vertical position, percent of the viewport
    pub top: f64,
    /// Seconds before the twinkle starts
    pub delay_s: f64,
    /// Seconds per twinkle
    pub duration_s: f64,
}

impl Star {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            left: rng.gen_range(0.0..100.0),
            top: rng.gen_range(0.0..100.0),
            delay_s: rng.gen_range(0.0..3.0),
            duration_s: rng.gen_range(2.0..4.0),
        }
    }

    /// Brightness at `time` seconds, between 0.3 and 1
    ///
    /// Stays dim until the delay has passed, then pulses once per duration.
    pub fn brightness(&self, time: f64) -> f64 {
        let elapsed = time - self.delay_s;
        if elapsed <= 0.0 {
            return MIN_BRIGHTNESS;
        }
        let phase = (elapsed / self.duration_s).fract();
        let pulse = 0.5 - 0.5 * (TAU * phase).cos();
        MIN_BRIGHTNESS + (1.0 - MIN_BRIGHTNESS) * pulse
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StarLayer {
    /// Matches the layer name in [`ParallaxMapper::starfield`]
    pub name: &'static str,
    pub size_px: f64,
    pub stars: Vec<Star>,
}

impl StarLayer {
    fn generate<R: Rng + ?Sized>(rng: &mut R, name: &'static str, count: usize, size_px: f64) -> Self {
        Self {
            name,
            size_px,
            stars: (0..count).map(|_| Star::random(rng)).collect(),
        }
    }
}

/// The star layers, placed once at mount
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Starfield {
    pub layers: Vec<StarLayer>,
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            layers: vec![
                StarLayer::generate(rng, "small", 50, 1.0),
                StarLayer::generate(rng, "medium", 30, 2.0),
                StarLayer::generate(rng, "large", 20, 3.0),
            ],
        }
    }

    pub fn star_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.stars.len()).sum()
    }
}

/// A starfield whose layers follow the page scroll
#[derive(Debug)]
pub struct StarfieldView {
    field: Starfield,
    parallax: ParallaxView,
}

impl StarfieldView {
    pub fn mount<R: Rng + ?Sized>(host: &Host, rng: &mut R) -> Self {
        let field = Starfield::generate(rng);
        tracing::debug!(stars = field.star_count(), "starfield mounted");
        Self {
            field,
            parallax: ParallaxView::mount(host, ParallaxMapper::starfield()),
        }
    }

    pub fn field(&self) -> &Starfield {
        &self.field
    }

    /// Vertical offset of a layer at the current scroll position
    pub fn layer_offset(&self, name: &str) -> f64 {
        self.parallax.offset(name).unwrap_or(0.0)
    }

    /// `(layer, offset)` for every layer, back to front
    pub fn offsets(&self) -> Vec<(&'static str, f64)> {
        self.field
            .layers
            .iter()
            .map(|layer| (layer.name, self.layer_offset(layer.name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use spatial_core::{FrameScheduler, Viewport};
    use std::rc::Rc;

    #[test]
    fn test_generate_layers() {
        let field = Starfield::generate(&mut StdRng::seed_from_u64(3));
        let counts: Vec<_> = field.layers.iter().map(|l| (l.name, l.stars.len())).collect();
        assert_eq!(counts, vec![("small", 50), ("medium", 30), ("large", 20)]);
        assert_eq!(field.star_count(), 100);

        for star in field.layers.iter().flat_map(|l| &l.stars) {
            assert!((0.0..100.0).contains(&star.left));
            assert!((0.0..100.0).contains(&star.top));
            assert!((0.0..3.0).contains(&star.delay_s));
            assert!((2.0..4.0).contains(&star.duration_s));
        }
    }

    #[test]
    fn test_brightness_pulse() {
        let star = Star {
            left: 0.0,
            top: 0.0,
            delay_s: 1.0,
            duration_s: 2.0,
        };
        assert_eq!(star.brightness(0.5), MIN_BRIGHTNESS);
        assert!((star.brightness(1.0) - MIN_BRIGHTNESS).abs() < 1e-9);
        assert!((star.brightness(2.0) - 1.0).abs() < 1e-9);
        assert!((star.brightness(3.0) - MIN_BRIGHTNESS).abs() < 1e-9);
        for i in 0..100 {
            let b = star.brightness(i as f64 * 0.13);
            assert!((MIN_BRIGHTNESS..=1.0).contains(&b));
        }
    }

    #[test]
    fn test_layers_follow_scroll() {
        let scheduler = FrameScheduler::new();
        let host = Host::new(scheduler.handle(), Rc::new(Viewport::default()));
        let view = StarfieldView::mount(&host, &mut StdRng::seed_from_u64(3));

        host.viewport.scroll_to(500.0);
        assert_eq!(
            view.offsets(),
            vec![("small", -150.0), ("medium", -100.0), ("large", -50.0)]
        );

        drop(view);
        assert_eq!(host.viewport.listener_count(), 0);
    }
}
