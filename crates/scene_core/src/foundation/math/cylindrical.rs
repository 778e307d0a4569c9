use serde::{Deserialize, Serialize};

use super::Vector3;

/// Cylindrical coordinates around the Y axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylindrical {
    /// Distance from the Y axis
    pub radius: f32,
    /// Angle around Y measured from +Z
    pub theta: f32,
    /// Height above the XZ plane
    pub y: f32,
}

impl Default for Cylindrical {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

impl Cylindrical {
    /// Create from components
    #[must_use]
    pub const fn new(radius: f32, theta: f32, y: f32) -> Self {
        Self { radius, theta, y }
    }

    /// Overwrite all components
    pub fn set(&mut self, radius: f32, theta: f32, y: f32) -> &mut Self {
        *self = Self::new(radius, theta, y);
        self
    }

    /// Coordinates of a cartesian vector
    pub fn set_from_vector3(&mut self, v: Vector3) -> &mut Self {
        self.set_from_cartesian_coords(v.x, v.y, v.z)
    }

    /// Coordinates of `(x, y, z)`
    pub fn set_from_cartesian_coords(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set(x.hypot(z), x.atan2(z), y)
    }
}
