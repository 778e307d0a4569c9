use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::{Euler, EulerOrder, Matrix3, Matrix4, Vector3};

/// Rotation quaternion.
///
/// A quaternion must be unit length to represent a rotation. This is not
/// enforced on every write; call [`Quaternion::normalize`] before composing a
/// quaternion built from untrusted components into a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component of the vector part
    pub x: f32,
    /// Y component of the vector part
    pub y: f32,
    /// Z component of the vector part
    pub z: f32,
    /// Scalar part
    pub w: f32,
}

impl_approx_eq!(Quaternion, x, y, z, w);

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a quaternion from raw components
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation equivalent to `euler`
    #[must_use]
    pub fn from_euler(euler: Euler) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_euler(euler);
        q
    }

    /// Rotation of `angle` radians around the unit vector `axis`
    #[must_use]
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_axis_angle(axis, angle);
        q
    }

    /// Rotation encoded in the upper 3x3 of `m` (assumed unscaled)
    #[must_use]
    pub fn from_rotation_matrix(m: &Matrix4) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_rotation_matrix(m);
        q
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`
    #[must_use]
    pub fn from_unit_vectors(from: Vector3, to: Vector3) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_unit_vectors(from, to);
        q
    }

    /// Overwrite all components
    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        *self = Self::new(x, y, z, w);
        self
    }

    /// Set from Euler angles, honouring the rotation order
    pub fn set_from_euler(&mut self, euler: Euler) -> &mut Self {
        let (s1, c1) = (euler.x / 2.0).sin_cos();
        let (s2, c2) = (euler.y / 2.0).sin_cos();
        let (s3, c3) = (euler.z / 2.0).sin_cos();

        let (x, y, z, w) = match euler.order {
            EulerOrder::XYZ => (
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::YXZ => (
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            EulerOrder::ZXY => (
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::ZYX => (
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            EulerOrder::YZX => (
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::XZY => (
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
        };
        self.set(x, y, z, w)
    }

    /// Set from a unit axis and an angle in radians
    pub fn set_from_axis_angle(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        let (s, c) = (angle / 2.0).sin_cos();
        self.set(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Set from the upper 3x3 of a pure rotation matrix
    pub fn set_from_rotation_matrix(&mut self, m: &Matrix4) -> &mut Self {
        let mut basis = Matrix3::IDENTITY;
        basis.set_from_matrix4(m);
        let rotation = nalgebra::Rotation3::<f32>::from_matrix_unchecked(nalgebra::Matrix3::<f32>::from(basis));
        *self = nalgebra::UnitQuaternion::<f32>::from_rotation_matrix(&rotation).into();
        self
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`
    pub fn set_from_unit_vectors(&mut self, from: Vector3, to: Vector3) -> &mut Self {
        let mut r = from.dot(to) + 1.0;

        if r < f32::EPSILON {
            // Opposite vectors: pick any axis perpendicular to `from`.
            r = 0.0;
            if from.x.abs() > from.z.abs() {
                self.set(-from.y, from.x, 0.0, r);
            } else {
                self.set(0.0, -from.z, from.y, r);
            }
        } else {
            let axis = from.cross(to);
            self.set(axis.x, axis.y, axis.z, r);
        }
        self.normalize()
    }

    /// Angle in radians between two rotations
    #[must_use]
    pub fn angle_to(self, q: Self) -> f32 {
        2.0 * self.dot(q).abs().clamp(-1.0, 1.0).acos()
    }

    /// Rotate towards `q` by at most `step` radians
    pub fn rotate_towards(&mut self, q: Self, step: f32) -> &mut Self {
        let angle = self.angle_to(q);
        if angle == 0.0 {
            return self;
        }
        let t = (step / angle).min(1.0);
        self.slerp(q, t)
    }

    /// Inverse of a unit quaternion
    pub fn invert(&mut self) -> &mut Self {
        self.conjugate()
    }

    /// Inverse of a unit quaternion, by value
    #[must_use]
    pub fn inverse(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Negate the vector part
    pub fn conjugate(&mut self) -> &mut Self {
        *self = self.inverse();
        self
    }

    /// Four-dimensional dot product
    #[must_use]
    pub fn dot(self, q: Self) -> f32 {
        self.x.mul_add(q.x, self.y.mul_add(q.y, self.z.mul_add(q.z, self.w * q.w)))
    }

    /// Squared norm
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Norm
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Scale to unit length; a zero quaternion becomes identity
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.length();
        if length == 0.0 {
            *self = Self::IDENTITY;
        } else {
            let inv = 1.0 / length;
            self.set(self.x * inv, self.y * inv, self.z * inv, self.w * inv);
        }
        self
    }

    /// `self = self * q`
    pub fn multiply(&mut self, q: Self) -> &mut Self {
        self.multiply_quaternions(*self, q)
    }

    /// `self = q * self`
    pub fn premultiply(&mut self, q: Self) -> &mut Self {
        self.multiply_quaternions(q, *self)
    }

    /// `self = a * b` (apply `b` first, then `a`)
    pub fn multiply_quaternions(&mut self, a: Self, b: Self) -> &mut Self {
        *self = Self::from(nalgebra::Quaternion::<f32>::from(a) * nalgebra::Quaternion::<f32>::from(b));
        self
    }

    /// Spherical interpolation towards `qb` by `t`, along the shorter arc
    pub fn slerp(&mut self, qb: Self, t: f32) -> &mut Self {
        if t == 0.0 {
            return self;
        }
        if t == 1.0 {
            *self = qb;
            return self;
        }

        let target = if self.dot(qb) < 0.0 { Self::new(-qb.x, -qb.y, -qb.z, -qb.w) } else { qb };
        let from = nalgebra::UnitQuaternion::<f32>::from(*self);
        let to = nalgebra::UnitQuaternion::<f32>::from(target);
        // nearly identical rotations have no stable arc; fall back to a normalized lerp
        let blended = from.try_slerp(&to, t, f32::EPSILON).unwrap_or_else(|| from.nlerp(&to, t));
        *self = blended.into();
        self
    }

    /// Interpolated rotation between `qa` and `qb`
    #[must_use]
    pub fn slerp_quaternions(qa: Self, qb: Self, t: f32) -> Self {
        let mut q = qa;
        q.slerp(qb, t);
        q
    }

    /// Exact component equality
    #[must_use]
    pub fn equals(self, q: Self) -> bool {
        self == q
    }

    /// Components as an array in `[x, y, z, w]` order
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut q = Self::IDENTITY;
        q.multiply_quaternions(self, rhs);
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_axis_angle_matches_rotation_matrix() {
        let q = Quaternion::from_axis_angle(Vector3::new(1.0, 2.0, 3.0).normalized(), 0.7);
        let m = Matrix4::from_quaternion(q);
        let recovered = Quaternion::from_rotation_matrix(&m);
        assert_relative_eq!(recovered, q, epsilon = 1e-5);
    }

    #[test]
    fn test_multiply_applies_right_operand_first() {
        let a = Quaternion::from_axis_angle(Vector3::Z, FRAC_PI_2);
        let b = Quaternion::from_axis_angle(Vector3::X, FRAC_PI_2);

        // (a * b) v == a (b v)
        let mut combined = Vector3::Y;
        combined.apply_quaternion(a * b);
        let mut sequential = Vector3::Y;
        sequential.apply_quaternion(b).apply_quaternion(a);
        assert_relative_eq!(combined, sequential, epsilon = EPSILON);

        let mut pre = b;
        pre.premultiply(a);
        assert_relative_eq!(pre, a * b, epsilon = EPSILON);
    }

    #[test]
    fn test_unit_vectors_including_opposite() {
        let q = Quaternion::from_unit_vectors(Vector3::X, Vector3::Y);
        let mut v = Vector3::X;
        v.apply_quaternion(q);
        assert_relative_eq!(v, Vector3::Y, epsilon = EPSILON);

        let flip = Quaternion::from_unit_vectors(Vector3::Z, -Vector3::Z);
        let mut w = Vector3::Z;
        w.apply_quaternion(flip);
        assert_relative_eq!(w, -Vector3::Z, epsilon = EPSILON);
        assert_relative_eq!(flip.length(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_slerp_halfway_and_endpoints() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(Vector3::Y, PI / 2.0);
        let half = Quaternion::slerp_quaternions(a, b, 0.5);
        assert_relative_eq!(half, Quaternion::from_axis_angle(Vector3::Y, PI / 4.0), epsilon = EPSILON);
        assert_relative_eq!(Quaternion::slerp_quaternions(a, b, 1.0), b);
        assert_relative_eq!(a.angle_to(b), FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_slerp_takes_shorter_arc_and_handles_near_identity() {
        let a = Quaternion::from_axis_angle(Vector3::Z, 0.2);
        let b = Quaternion::from_axis_angle(Vector3::Z, 0.6);
        let negated_b = Quaternion::new(-b.x, -b.y, -b.z, -b.w);

        let mut v = Vector3::X;
        v.apply_quaternion(Quaternion::slerp_quaternions(a, negated_b, 0.5));
        let mut expected = Vector3::X;
        expected.apply_quaternion(Quaternion::from_axis_angle(Vector3::Z, 0.4));
        assert_relative_eq!(v, expected, epsilon = 1e-5);

        let almost = Quaternion::from_axis_angle(Vector3::Z, 0.2 + 1e-7);
        let mid = Quaternion::slerp_quaternions(a, almost, 0.5);
        assert_relative_eq!(mid.length(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(mid, a, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_matrix_branches() {
        // trace <= 0 with each diagonal entry dominant in turn
        for axis in [Vector3::X, Vector3::Y, Vector3::Z] {
            let q = Quaternion::from_axis_angle(axis, 3.0);
            let mut recovered = Quaternion::from_rotation_matrix(&Matrix4::from_quaternion(q));
            if recovered.dot(q) < 0.0 {
                recovered = Quaternion::new(-recovered.x, -recovered.y, -recovered.z, -recovered.w);
            }
            assert_relative_eq!(recovered, q, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rotate_towards_is_bounded_by_step() {
        let target = Quaternion::from_axis_angle(Vector3::Y, 1.0);
        let mut q = Quaternion::IDENTITY;
        q.rotate_towards(target, 0.25);
        assert_relative_eq!(q.angle_to(Quaternion::IDENTITY), 0.25, epsilon = 1e-4);
        q.rotate_towards(target, 10.0);
        assert_relative_eq!(q, target, epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_cancels_rotation() {
        let q = Quaternion::from_axis_angle(Vector3::new(0.0, 0.6, 0.8), 1.1);
        assert_relative_eq!(q * q.inverse(), Quaternion::IDENTITY, epsilon = EPSILON);

        let mut zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        zero.normalize();
        assert_eq!(zero, Quaternion::IDENTITY);
    }
}
