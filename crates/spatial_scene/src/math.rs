//! Small vector math for scene nodes

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Point on a sphere of `radius` from polar angle `phi` and azimuth `theta`
    pub fn from_spherical(radius: f32, phi: f32, theta: f32) -> Self {
        Self::new(
            radius * theta.cos() * phi.sin(),
            radius * theta.sin() * phi.sin(),
            radius * phi.cos(),
        )
    }

    pub fn distance(&self, other: Vec3) -> f32 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Spiral point `i` of `n` spread evenly over a sphere
///
/// Polar angle from `acos(-1 + 2i/n)`, azimuth `sqrt(n * PI) * phi`.
pub fn spiral_point(i: usize, n: usize, radius: f32) -> Vec3 {
    let n = n.max(1) as f32;
    let phi = (-1.0 + 2.0 * i as f32 / n).clamp(-1.0, 1.0).acos();
    let theta = (n * std::f32::consts::PI).sqrt() * phi;
    Vec3::from_spherical(radius, phi, theta)
}
