use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::{Matrix4, Quaternion, Vector3};

/// Four-component vector, used for homogeneous coordinates and tangents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector4 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl_approx_eq!(Vector4, x, y, z, w);

impl Default for Vector4 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Vector4 {
    /// Create a vector from components
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Extend a 3D vector with `w`
    #[must_use]
    pub const fn from_vector3(v: Vector3, w: f32) -> Self {
        Self::new(v.x, v.y, v.z, w)
    }

    /// Overwrite all components
    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        *self = Self::new(x, y, z, w);
        self
    }

    /// The xyz part
    #[must_use]
    pub const fn xyz(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, v: Self) -> f32 {
        self.x.mul_add(v.x, self.y.mul_add(v.y, self.z.mul_add(v.z, self.w * v.w)))
    }

    /// Euclidean length
    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length; the zero vector is left unchanged
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            *self = *self * (1.0 / length);
        }
        self
    }

    /// Multiply by a 4x4 matrix
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        let e = &m.elements;
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);
        self.x = e[0].mul_add(x, e[4].mul_add(y, e[8].mul_add(z, e[12] * w)));
        self.y = e[1].mul_add(x, e[5].mul_add(y, e[9].mul_add(z, e[13] * w)));
        self.z = e[2].mul_add(x, e[6].mul_add(y, e[10].mul_add(z, e[14] * w)));
        self.w = e[3].mul_add(x, e[7].mul_add(y, e[11].mul_add(z, e[15] * w)));
        self
    }

    /// Store the rotation of `q` as axis (xyz) and angle (w)
    pub fn set_axis_angle_from_quaternion(&mut self, q: Quaternion) -> &mut Self {
        self.w = 2.0 * q.w.clamp(-1.0, 1.0).acos();
        let s = q.w.mul_add(-q.w, 1.0).max(0.0).sqrt();
        if s < 0.0001 {
            self.x = 1.0;
            self.y = 0.0;
            self.z = 0.0;
        } else {
            self.x = q.x / s;
            self.y = q.y / s;
            self.z = q.z / s;
        }
        self
    }

    /// Move towards `v` by the fraction `alpha`
    pub fn lerp(&mut self, v: Self, alpha: f32) -> &mut Self {
        *self = *self + (v - *self) * alpha;
        self
    }

    /// Read four components from `array` starting at `offset`
    #[must_use]
    pub fn from_array(array: &[f32], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1], array[offset + 2], array[offset + 3])
    }

    /// Components as an array
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Add for Vector4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }
}

impl Sub for Vector4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z, self.w - rhs.w)
    }
}

impl Mul<f32> for Vector4 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}
