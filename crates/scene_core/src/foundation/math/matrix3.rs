use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::{Matrix4, Vector3};

/// 3x3 matrix in column-major order.
///
/// Mostly used as a normal matrix and for texture-coordinate transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix3 {
    /// Column-major elements
    pub elements: [f32; 9],
}

impl_approx_eq_elements!(Matrix3);

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Build from row-major arguments
    #[must_use]
    #[rustfmt::skip]
    pub const fn from_rows(
        n11: f32, n12: f32, n13: f32,
        n21: f32, n22: f32, n23: f32,
        n31: f32, n32: f32, n33: f32,
    ) -> Self {
        Self { elements: [n11, n21, n31, n12, n22, n32, n13, n23, n33] }
    }

    /// Overwrite from row-major arguments
    #[rustfmt::skip]
    pub fn set(
        &mut self,
        n11: f32, n12: f32, n13: f32,
        n21: f32, n22: f32, n23: f32,
        n31: f32, n32: f32, n33: f32,
    ) -> &mut Self {
        *self = Self::from_rows(n11, n12, n13, n21, n22, n23, n31, n32, n33);
        self
    }

    /// Reset to identity
    pub fn identity(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    /// Upper-left 3x3 block of a 4x4 matrix
    pub fn set_from_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        let me = m.elements;
        self.elements = [me[0], me[1], me[2], me[4], me[5], me[6], me[8], me[9], me[10]];
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
        nalgebra::Matrix3::<f32>::from(*self).determinant()
    }

    /// Inverse, or `None` when the matrix is singular
    #[must_use]
    pub fn try_inverse(&self) -> Option<Self> {
        nalgebra::Matrix3::<f32>::from(*self).try_inverse().map(Self::from)
    }

    /// Invert in place; a singular matrix becomes identity
    pub fn invert(&mut self) -> &mut Self {
        *self = self.try_inverse().unwrap_or_else(|| {
            log::warn!("Matrix3::invert: determinant is 0, falling back to identity");
            Self::IDENTITY
        });
        self
    }

    /// Transpose in place
    pub fn transpose(&mut self) -> &mut Self {
        self.elements.swap(1, 3);
        self.elements.swap(2, 6);
        self.elements.swap(5, 7);
        self
    }

    /// Inverse-transpose of the upper 3x3 of `m`
    pub fn get_normal_matrix(&mut self, m: &Matrix4) -> &mut Self {
        self.set_from_matrix4(m).invert().transpose()
    }

    /// Normal matrix for `m`, by value
    #[must_use]
    pub fn normal_matrix(m: &Matrix4) -> Self {
        let mut n = Self::IDENTITY;
        n.get_normal_matrix(m);
        n
    }

    /// Append a 2D scale
    pub fn scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        #[rustfmt::skip]
        let s = Self::from_rows(
            sx, 0.0, 0.0,
            0.0, sy, 0.0,
            0.0, 0.0, 1.0,
        );
        self.premultiply(&s)
    }

    /// Append a 2D rotation by `theta` radians
    pub fn rotate(&mut self, theta: f32) -> &mut Self {
        let (s, c) = theta.sin_cos();
        #[rustfmt::skip]
        let r = Self::from_rows(
            c, -s, 0.0,
            s, c, 0.0,
            0.0, 0.0, 1.0,
        );
        self.premultiply(&r)
    }

    /// Append a 2D translation
    pub fn translate(&mut self, tx: f32, ty: f32) -> &mut Self {
        #[rustfmt::skip]
        let t = Self::from_rows(
            1.0, 0.0, tx,
            0.0, 1.0, ty,
            0.0, 0.0, 1.0,
        );
        self.premultiply(&t)
    }
}

impl Mul for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from(nalgebra::Matrix3::<f32>::from(self) * nalgebra::Matrix3::<f32>::from(rhs))
    }
}

impl Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Vector3 {
        let mut v = rhs;
        v.apply_matrix3(&self);
        v
    }
}
