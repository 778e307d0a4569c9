//! Conversions to and from `nalgebra` types
//!
//! Matrix inversion, products, determinants and quaternion products and
//! interpolation are computed by `nalgebra` through these conversions; both
//! sides store matrices column-major, so they are plain copies.

use super::{Matrix3, Matrix4, Quaternion, Vector3};

impl From<Vector3> for nalgebra::Vector3<f32> {
    fn from(v: Vector3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Vector3<f32>> for Vector3 {
    fn from(v: nalgebra::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for nalgebra::Point3<f32> {
    fn from(v: Vector3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Quaternion> for nalgebra::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        Self::new(q.w, q.x, q.y, q.z)
    }
}

impl From<nalgebra::Quaternion<f32>> for Quaternion {
    fn from(q: nalgebra::Quaternion<f32>) -> Self {
        Self::new(q.i, q.j, q.k, q.w)
    }
}

impl From<Quaternion> for nalgebra::UnitQuaternion<f32> {
    fn from(q: Quaternion) -> Self {
        Self::from_quaternion(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
    }
}

impl From<nalgebra::UnitQuaternion<f32>> for Quaternion {
    fn from(q: nalgebra::UnitQuaternion<f32>) -> Self {
        Self::new(q.i, q.j, q.k, q.w)
    }
}

impl From<Matrix4> for nalgebra::Matrix4<f32> {
    fn from(m: Matrix4) -> Self {
        Self::from_column_slice(&m.elements)
    }
}

impl From<nalgebra::Matrix4<f32>> for Matrix4 {
    fn from(m: nalgebra::Matrix4<f32>) -> Self {
        let mut elements = [0.0; 16];
        elements.copy_from_slice(m.as_slice());
        Self { elements }
    }
}

impl From<Matrix3> for nalgebra::Matrix3<f32> {
    fn from(m: Matrix3) -> Self {
        Self::from_column_slice(&m.elements)
    }
}

impl From<nalgebra::Matrix3<f32>> for Matrix3 {
    fn from(m: nalgebra::Matrix3<f32>) -> Self {
        let mut elements = [0.0; 9];
        elements.copy_from_slice(m.as_slice());
        Self { elements }
    }
}
