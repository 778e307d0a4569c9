use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Two-component vector, used for texture coordinates and normalized device
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl_approx_eq!(Vector2, x, y);

impl Vector2 {
    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a vector from components
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Overwrite both components
    pub fn set(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, v: Self) -> f32 {
        self.x.mul_add(v.x, self.y * v.y)
    }

    /// Z component of the 3D cross product
    #[must_use]
    pub fn cross(self, v: Self) -> f32 {
        self.x.mul_add(v.y, -(self.y * v.x))
    }

    /// Squared length
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to `v`
    #[must_use]
    pub fn distance_to(self, v: Self) -> f32 {
        (self - v).length()
    }

    /// Scale to unit length; the zero vector is left unchanged
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            *self *= 1.0 / length;
        }
        self
    }

    /// Angle in radians relative to the positive x axis, in `[0, 2π)`
    #[must_use]
    pub fn angle(self) -> f32 {
        let angle = (-self.y).atan2(-self.x) + std::f32::consts::PI;
        angle % std::f32::consts::TAU
    }

    /// Rotate around `center` by `angle` radians
    pub fn rotate_around(&mut self, center: Self, angle: f32) -> &mut Self {
        let (s, c) = angle.sin_cos();
        let x = self.x - center.x;
        let y = self.y - center.y;
        self.x = x.mul_add(c, -(y * s)) + center.x;
        self.y = x.mul_add(s, y * c) + center.y;
        self
    }

    /// Move towards `v` by the fraction `alpha`
    pub fn lerp(&mut self, v: Self, alpha: f32) -> &mut Self {
        self.x += (v.x - self.x) * alpha;
        self.y += (v.y - self.y) * alpha;
        self
    }

    /// Read two components from `array` starting at `offset`
    #[must_use]
    pub fn from_array(array: &[f32], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1])
    }

    /// Components as an array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vector2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from(array: [f32; 2]) -> Self {
        Self::new(array[0], array[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_rotate_around_quarter_turn() {
        let mut v = Vector2::new(2.0, 1.0);
        v.rotate_around(Vector2::new(1.0, 1.0), std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(v, Vector2::new(1.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_angle_covers_full_circle() {
        assert_relative_eq!(Vector2::new(1.0, 0.0).angle(), 0.0, epsilon = EPSILON);
        assert_relative_eq!(
            Vector2::new(0.0, -1.0).angle(),
            1.5 * std::f32::consts::PI,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_normalize_zero_vector_is_noop() {
        let mut v = Vector2::ZERO;
        v.normalize();
        assert_eq!(v, Vector2::ZERO);
        assert_relative_eq!(Vector2::new(3.0, 4.0).normalize().length(), 1.0, epsilon = EPSILON);
    }
}
