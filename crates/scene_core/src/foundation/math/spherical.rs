use serde::{Deserialize, Serialize};

use super::Vector3;

const EPS: f32 = 1e-6;

/// Spherical coordinates.
///
/// `phi` is the polar angle from the +Y axis, `theta` the azimuth around Y
/// measured from +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    /// Distance from the origin
    pub radius: f32,
    /// Polar angle in `[0, π]`
    pub phi: f32,
    /// Azimuthal angle
    pub theta: f32,
}

impl_approx_eq!(Spherical, radius, phi, theta);

impl Default for Spherical {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

impl Spherical {
    /// Create from components
    #[must_use]
    pub const fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// Overwrite all components
    pub fn set(&mut self, radius: f32, phi: f32, theta: f32) -> &mut Self {
        *self = Self::new(radius, phi, theta);
        self
    }

    /// Keep `phi` strictly inside `(0, π)` so a tangent basis never degenerates
    pub fn make_safe(&mut self) -> &mut Self {
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);
        self
    }

    /// Coordinates of a cartesian vector
    pub fn set_from_vector3(&mut self, v: Vector3) -> &mut Self {
        self.set_from_cartesian_coords(v.x, v.y, v.z)
    }

    /// Coordinates of `(x, y, z)`; the origin maps to zero angles
    pub fn set_from_cartesian_coords(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.radius = Vector3::new(x, y, z).length();
        if self.radius == 0.0 {
            self.theta = 0.0;
            self.phi = 0.0;
        } else {
            self.theta = x.atan2(z);
            self.phi = (y / self.radius).clamp(-1.0, 1.0).acos();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_cartesian_conversion() {
        let mut s = Spherical::default();
        s.set_from_cartesian_coords(0.0, 0.0, 2.0);
        assert_relative_eq!(s, Spherical::new(2.0, FRAC_PI_2, 0.0), epsilon = 1e-6);

        s.set_from_vector3(Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(s.theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_origin_has_zero_angles() {
        let mut s = Spherical::new(5.0, 1.0, 1.0);
        s.set_from_cartesian_coords(0.0, 0.0, 0.0);
        assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_make_safe_moves_off_the_poles() {
        let mut north = Spherical::new(1.0, 0.0, 0.0);
        north.make_safe();
        assert!(north.phi > 0.0);

        let mut south = Spherical::new(1.0, PI, 0.0);
        south.make_safe();
        assert!(south.phi < PI);

        let mut equator = Spherical::new(1.0, FRAC_PI_2, 0.3);
        equator.make_safe();
        assert_eq!(equator.phi, FRAC_PI_2);
    }
}
