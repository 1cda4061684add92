//! Spatial Scenes
//!
//! The decorative backdrops of the landing page:
//!
//! - **Globe**: The hero's rotating wireframe globe with drifting data points
//! - **Starfield**: Three parallax layers of twinkling stars
//! - **Code Rain**: Falling snippets of geospatial code
//!
//! Each one mounts against a [`spatial_core::Host`] and releases every frame
//! callback, timer and listener it registered when dropped.

pub mod code_rain;
pub mod globe;
pub mod math;
pub mod starfield;

pub use code_rain::{CodeRain, CodeRainConfig, RainDrop, CODE_SNIPPETS};
pub use globe::{Camera, GlobeScene, GlobeView, NodeKind, PointMotion, SceneNode};
pub use math::{spiral_point, Vec3};
pub use starfield::{Star, StarLayer, Starfield, StarfieldView};
