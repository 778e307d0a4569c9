use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::{Euler, Quaternion, Vector3};

/// 4x4 affine/projective matrix in column-major order.
///
/// `elements[12..15]` hold the translation. The `from_rows`/`set`
/// constructors take arguments in row-major reading order so literal
/// matrices look the way they are written on paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4 {
    /// Column-major elements
    pub elements: [f32; 16],
}

impl_approx_eq_elements!(Matrix4);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Identity matrix
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build from row-major arguments
    #[must_use]
    #[rustfmt::skip]
    pub const fn from_rows(
        n11: f32, n12: f32, n13: f32, n14: f32,
        n21: f32, n22: f32, n23: f32, n24: f32,
        n31: f32, n32: f32, n33: f32, n34: f32,
        n41: f32, n42: f32, n43: f32, n44: f32,
    ) -> Self {
        Self {
            elements: [
                n11, n21, n31, n41,
                n12, n22, n32, n42,
                n13, n23, n33, n43,
                n14, n24, n34, n44,
            ],
        }
    }

    /// Overwrite from row-major arguments
    #[rustfmt::skip]
    pub fn set(
        &mut self,
        n11: f32, n12: f32, n13: f32, n14: f32,
        n21: f32, n22: f32, n23: f32, n24: f32,
        n31: f32, n32: f32, n33: f32, n34: f32,
        n41: f32, n42: f32, n43: f32, n44: f32,
    ) -> &mut Self {
        *self = Self::from_rows(
            n11, n12, n13, n14,
            n21, n22, n23, n24,
            n31, n32, n33, n34,
            n41, n42, n43, n44,
        );
        self
    }

    /// Reset to identity
    pub fn identity(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    /// Pure translation
    #[must_use]
    pub fn from_translation(v: Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.set_position(v);
        m
    }

    /// Pure per-axis scale
    #[must_use]
    pub fn from_scale(v: Vector3) -> Self {
        let mut m = Self::IDENTITY;
        m.make_scale(v.x, v.y, v.z);
        m
    }

    /// Pure rotation from a unit quaternion
    #[must_use]
    pub fn from_quaternion(q: Quaternion) -> Self {
        Self::compose(Vector3::ZERO, q, Vector3::ONE)
    }

    /// Pure rotation from Euler angles
    #[must_use]
    pub fn from_euler(euler: Euler) -> Self {
        Self::from_quaternion(Quaternion::from_euler(euler))
    }

    /// Pure rotation about a unit axis
    #[must_use]
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.make_rotation_axis(axis, angle);
        m
    }

    /// Translation-rotation-scale matrix `T * R * S`
    #[must_use]
    pub fn compose(position: Vector3, quaternion: Quaternion, scale: Vector3) -> Self {
        let Quaternion { x, y, z, w } = quaternion;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        let (sx, sy, sz) = (scale.x, scale.y, scale.z);

        Self {
            elements: [
                (1.0 - (yy + zz)) * sx,
                (xy + wz) * sx,
                (xz - wy) * sx,
                0.0,
                (xy - wz) * sy,
                (1.0 - (xx + zz)) * sy,
                (yz + wx) * sy,
                0.0,
                (xz + wy) * sz,
                (yz - wx) * sz,
                (1.0 - (xx + yy)) * sz,
                0.0,
                position.x,
                position.y,
                position.z,
                1.0,
            ],
        }
    }

    /// Split into translation, rotation and scale.
    ///
    /// Scale magnitudes come from the basis column lengths; a negative
    /// determinant flips the X scale. The rotation block is normalized by those
    /// scales before being converted to a quaternion.
    #[must_use]
    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        let te = &self.elements;

        let mut sx = Vector3::new(te[0], te[1], te[2]).length();
        let sy = Vector3::new(te[4], te[5], te[6]).length();
        let sz = Vector3::new(te[8], te[9], te[10]).length();

        if self.determinant() < 0.0 {
            sx = -sx;
        }

        let position = Vector3::new(te[12], te[13], te[14]);

        let inverse = |s: f32| if s == 0.0 { 0.0 } else { 1.0 / s };
        let (inv_sx, inv_sy, inv_sz) = (inverse(sx), inverse(sy), inverse(sz));

        let mut rotation = *self;
        for (column, inv) in [inv_sx, inv_sy, inv_sz].into_iter().enumerate() {
            for row in 0..3 {
                rotation.elements[column * 4 + row] *= inv;
            }
        }
        let quaternion = Quaternion::from_rotation_matrix(&rotation);

        (position, quaternion, Vector3::new(sx, sy, sz))
    }

    /// Copy only the translation of `m`
    pub fn copy_position(&mut self, m: &Self) -> &mut Self {
        self.elements[12..15].copy_from_slice(&m.elements[12..15]);
        self
    }

    /// Basis column vectors
    #[must_use]
    pub fn extract_basis(&self) -> (Vector3, Vector3, Vector3) {
        (
            Vector3::from_array(&self.elements, 0),
            Vector3::from_array(&self.elements, 4),
            Vector3::from_array(&self.elements, 8),
        )
    }

    /// Rotation-only matrix whose columns are the given axes
    #[rustfmt::skip]
    pub fn make_basis(&mut self, x: Vector3, y: Vector3, z: Vector3) -> &mut Self {
        self.set(
            x.x, y.x, z.x, 0.0,
            x.y, y.y, z.y, 0.0,
            x.z, y.z, z.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation part of `m` with its scale removed
    pub fn extract_rotation(&mut self, m: &Self) -> &mut Self {
        let me = &m.elements;
        let mut out = Self::IDENTITY;
        for column in 0..3 {
            let length = Vector3::from_array(me, column * 4).length();
            let inv = if length == 0.0 { 0.0 } else { 1.0 / length };
            for row in 0..3 {
                out.elements[column * 4 + row] = me[column * 4 + row] * inv;
            }
        }
        *self = out;
        self
    }

    /// Rotation from Euler angles; translation cleared
    pub fn make_rotation_from_euler(&mut self, euler: Euler) -> &mut Self {
        *self = Self::from_euler(euler);
        self
    }

    /// Rotation from a unit quaternion; translation cleared
    pub fn make_rotation_from_quaternion(&mut self, q: Quaternion) -> &mut Self {
        *self = Self::from_quaternion(q);
        self
    }

    /// Set the rotation block so that its -Z axis points from `eye` towards
    /// `target`. Translation is left untouched.
    pub fn look_at(&mut self, eye: Vector3, target: Vector3, up: Vector3) -> &mut Self {
        let mut z = eye - target;
        if z.length_squared() == 0.0 {
            // eye and target coincide
            z.z = 1.0;
        }
        z.normalize();

        let mut x = up.cross(z);
        if x.length_squared() == 0.0 {
            // up and z are parallel
            if up.z.abs() == 1.0 {
                z.x += 0.0001;
            } else {
                z.z += 0.0001;
            }
            z.normalize();
            x = up.cross(z);
        }
        x.normalize();
        let y = z.cross(x);

        let te = &mut self.elements;
        te[0] = x.x;
        te[4] = y.x;
        te[8] = z.x;
        te[1] = x.y;
        te[5] = y.y;
        te[9] = z.y;
        te[2] = x.z;
        te[6] = y.z;
        te[10] = z.z;
        self
    }

    /// `self = self * m`
    pub fn multiply(&mut self, m: &Self) -> &mut Self {
        *self = *self * *m;
        self
    }

    /// `self = m * self`
    pub fn premultiply(&mut self, m: &Self) -> &mut Self {
        *self = *m * *self;
        self
    }

    /// `self = a * b`
    pub fn multiply_matrices(&mut self, a: &Self, b: &Self) -> &mut Self {
        *self = *a * *b;
        self
    }

    /// Scale every element
    pub fn multiply_scalar(&mut self, s: f32) -> &mut Self {
        for e in &mut self.elements {
            *e *= s;
        }
        self
    }

    /// Determinant
    #[must_use]
    pub fn determinant(&self) -> f32 {
        nalgebra::Matrix4::<f32>::from(*self).determinant()
    }

    /// Transpose in place
    pub fn transpose(&mut self) -> &mut Self {
        for (a, b) in [(1, 4), (2, 8), (6, 9), (3, 12), (7, 13), (11, 14)] {
            self.elements.swap(a, b);
        }
        self
    }

    /// Overwrite the translation
    pub fn set_position(&mut self, v: Vector3) -> &mut Self {
        self.elements[12] = v.x;
        self.elements[13] = v.y;
        self.elements[14] = v.z;
        self
    }

    /// Inverse, or `None` when the matrix is singular
    #[must_use]
    pub fn try_inverse(&self) -> Option<Self> {
        nalgebra::Matrix4::<f32>::from(*self).try_inverse().map(Self::from)
    }

    /// Invert in place. A singular matrix becomes identity and a warning is
    /// logged; this never panics.
    pub fn invert(&mut self) -> &mut Self {
        *self = self.try_inverse().unwrap_or_else(|| {
            log::warn!("Matrix4::invert: determinant is 0, falling back to identity");
            Self::IDENTITY
        });
        self
    }

    /// Inverse by value, with the same identity fallback as [`Self::invert`]
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut m = *self;
        m.invert();
        m
    }

    /// Scale the basis columns by `v`
    pub fn scale(&mut self, v: Vector3) -> &mut Self {
        for (column, s) in [v.x, v.y, v.z].into_iter().enumerate() {
            for row in 0..4 {
                self.elements[column * 4 + row] *= s;
            }
        }
        self
    }

    /// Largest basis column length
    #[must_use]
    pub fn get_max_scale_on_axis(&self) -> f32 {
        let (x, y, z) = self.extract_basis();
        x.length_squared().max(y.length_squared()).max(z.length_squared()).sqrt()
    }

    /// Pure translation
    #[rustfmt::skip]
    pub fn make_translation(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set(
            1.0, 0.0, 0.0, x,
            0.0, 1.0, 0.0, y,
            0.0, 0.0, 1.0, z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation of `theta` radians about X
    #[rustfmt::skip]
    pub fn make_rotation_x(&mut self, theta: f32) -> &mut Self {
        let (s, c) = theta.sin_cos();
        self.set(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation of `theta` radians about Y
    #[rustfmt::skip]
    pub fn make_rotation_y(&mut self, theta: f32) -> &mut Self {
        let (s, c) = theta.sin_cos();
        self.set(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation of `theta` radians about Z
    #[rustfmt::skip]
    pub fn make_rotation_z(&mut self, theta: f32) -> &mut Self {
        let (s, c) = theta.sin_cos();
        self.set(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation of `angle` radians about a unit axis
    #[rustfmt::skip]
    pub fn make_rotation_axis(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let Vector3 { x, y, z } = axis;
        let (tx, ty) = (t * x, t * y);
        self.set(
            tx * x + c, tx * y - s * z, tx * z + s * y, 0.0,
            tx * y + s * z, ty * y + c, ty * z - s * x, 0.0,
            tx * z - s * y, ty * z + s * x, t * z * z + c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Per-axis scale
    #[rustfmt::skip]
    pub fn make_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set(
            x, 0.0, 0.0, 0.0,
            0.0, y, 0.0, 0.0,
            0.0, 0.0, z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Shear matrix
    #[rustfmt::skip]
    pub fn make_shear(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set(
            1.0, y, z, 0.0,
            x, 1.0, z, 0.0,
            x, y, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Perspective projection for the given frustum planes
    #[rustfmt::skip]
    pub fn make_perspective(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        let x = 2.0 * near / (right - left);
        let y = 2.0 * near / (top - bottom);
        let a = (right + left) / (right - left);
        let b = (top + bottom) / (top - bottom);
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);
        self.set(
            x, 0.0, a, 0.0,
            0.0, y, b, 0.0,
            0.0, 0.0, c, d,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Orthographic projection for the given box
    #[rustfmt::skip]
    pub fn make_orthographic(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        let w = 1.0 / (right - left);
        let h = 1.0 / (top - bottom);
        let p = 1.0 / (far - near);
        let x = (right + left) * w;
        let y = (top + bottom) * h;
        let z = (far + near) * p;
        self.set(
            2.0 * w, 0.0, 0.0, -x,
            0.0, 2.0 * h, 0.0, -y,
            0.0, 0.0, -2.0 * p, -z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Exact element equality
    #[must_use]
    pub fn equals(&self, m: &Self) -> bool {
        self == m
    }

    /// Raw bytes of the column-major elements, ready for upload
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.elements)
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from(nalgebra::Matrix4::<f32>::from(self) * nalgebra::Matrix4::<f32>::from(rhs))
    }
}
