use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{Cylindrical, Euler, Matrix3, Matrix4, Quaternion, Spherical};

/// Three-component vector used for positions, directions and scales.
///
/// Most transforming operations mutate the receiver and return it so they can
/// be chained:
///
/// ```
/// use scene_core::foundation::math::{Matrix4, Vector3};
///
/// let mut v = Vector3::new(1.0, 0.0, 0.0);
/// v.apply_matrix4(&Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0)))
///     .multiply_scalar(2.0);
/// assert_eq!(v, Vector3::new(2.0, 4.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl_approx_eq!(Vector3, x, y, z);

impl Vector3 {
    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Vector with every component set to one
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    /// Unit X axis
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit Y axis
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit Z axis
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a vector from components
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Overwrite all components
    pub fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Set every component to `scalar`
    pub fn set_scalar(&mut self, scalar: f32) -> &mut Self {
        self.set(scalar, scalar, scalar)
    }

    /// Component by index (0 = x, 1 = y, anything else = z)
    #[must_use]
    pub const fn component(self, index: usize) -> f32 {
        match index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Set a component by index (0 = x, 1 = y, anything else = z)
    pub fn set_component(&mut self, index: usize, value: f32) -> &mut Self {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            _ => self.z = value,
        }
        self
    }

    /// `self += v * s`
    pub fn add_scaled_vector(&mut self, v: Self, s: f32) -> &mut Self {
        self.x = v.x.mul_add(s, self.x);
        self.y = v.y.mul_add(s, self.y);
        self.z = v.z.mul_add(s, self.z);
        self
    }

    /// `self = a + b`
    pub fn add_vectors(&mut self, a: Self, b: Self) -> &mut Self {
        *self = a + b;
        self
    }

    /// `self = a - b`
    pub fn sub_vectors(&mut self, a: Self, b: Self) -> &mut Self {
        *self = a - b;
        self
    }

    /// Component-wise product
    pub fn multiply(&mut self, v: Self) -> &mut Self {
        self.x *= v.x;
        self.y *= v.y;
        self.z *= v.z;
        self
    }

    /// Uniform scale
    pub fn multiply_scalar(&mut self, scalar: f32) -> &mut Self {
        *self *= scalar;
        self
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, v: Self) -> f32 {
        self.x.mul_add(v.x, self.y.mul_add(v.y, self.z * v.z))
    }

    /// Cross product `self × v`
    #[must_use]
    pub fn cross(self, v: Self) -> Self {
        Self::new(
            self.y.mul_add(v.z, -(self.z * v.y)),
            self.z.mul_add(v.x, -(self.x * v.z)),
            self.x.mul_add(v.y, -(self.y * v.x)),
        )
    }

    /// `self = a × b`
    pub fn cross_vectors(&mut self, a: Self, b: Self) -> &mut Self {
        *self = a.cross(b);
        self
    }

    /// Squared Euclidean length
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Sum of absolute components
    #[must_use]
    pub fn manhattan_length(self) -> f32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    /// Scale to unit length; the zero vector is left unchanged
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            *self *= 1.0 / length;
        }
        self
    }

    /// Unit-length copy of this vector
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Keep the direction, change the length
    pub fn set_length(&mut self, length: f32) -> &mut Self {
        self.normalize().multiply_scalar(length)
    }

    /// Flip every component
    pub fn negate(&mut self) -> &mut Self {
        *self = -*self;
        self
    }

    /// Distance to `v`
    #[must_use]
    pub fn distance_to(self, v: Self) -> f32 {
        self.distance_to_squared(v).sqrt()
    }

    /// Squared distance to `v`
    #[must_use]
    pub fn distance_to_squared(self, v: Self) -> f32 {
        (self - v).length_squared()
    }

    /// Move towards `v` by the fraction `alpha`
    pub fn lerp(&mut self, v: Self, alpha: f32) -> &mut Self {
        self.x += (v.x - self.x) * alpha;
        self.y += (v.y - self.y) * alpha;
        self.z += (v.z - self.z) * alpha;
        self
    }

    /// Component-wise minimum
    pub fn min(&mut self, v: Self) -> &mut Self {
        self.x = self.x.min(v.x);
        self.y = self.y.min(v.y);
        self.z = self.z.min(v.z);
        self
    }

    /// Component-wise maximum
    pub fn max(&mut self, v: Self) -> &mut Self {
        self.x = self.x.max(v.x);
        self.y = self.y.max(v.y);
        self.z = self.z.max(v.z);
        self
    }

    /// Component-wise clamp between `min` and `max`
    pub fn clamp(&mut self, min: Self, max: Self) -> &mut Self {
        self.max(min).min(max)
    }

    /// Round every component down
    pub fn floor(&mut self) -> &mut Self {
        self.set(self.x.floor(), self.y.floor(), self.z.floor())
    }

    /// Round every component up
    pub fn ceil(&mut self) -> &mut Self {
        self.set(self.x.ceil(), self.y.ceil(), self.z.ceil())
    }

    /// Round every component to the nearest integer
    pub fn round(&mut self) -> &mut Self {
        self.set(self.x.round(), self.y.round(), self.z.round())
    }

    /// Multiply by a 3x3 matrix
    pub fn apply_matrix3(&mut self, m: &Matrix3) -> &mut Self {
        let e = &m.elements;
        let (x, y, z) = (self.x, self.y, self.z);
        self.x = e[0].mul_add(x, e[3].mul_add(y, e[6] * z));
        self.y = e[1].mul_add(x, e[4].mul_add(y, e[7] * z));
        self.z = e[2].mul_add(x, e[5].mul_add(y, e[8] * z));
        self
    }

    /// Transform by a normal matrix and renormalize
    pub fn apply_normal_matrix(&mut self, m: &Matrix3) -> &mut Self {
        self.apply_matrix3(m).normalize()
    }

    /// Transform as a point (`w = 1`), including the perspective divide
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        let e = &m.elements;
        let (x, y, z) = (self.x, self.y, self.z);
        let w = 1.0 / e[3].mul_add(x, e[7].mul_add(y, e[11].mul_add(z, e[15])));
        self.x = e[0].mul_add(x, e[4].mul_add(y, e[8].mul_add(z, e[12]))) * w;
        self.y = e[1].mul_add(x, e[5].mul_add(y, e[9].mul_add(z, e[13]))) * w;
        self.z = e[2].mul_add(x, e[6].mul_add(y, e[10].mul_add(z, e[14]))) * w;
        self
    }

    /// Rotate by a quaternion
    pub fn apply_quaternion(&mut self, q: Quaternion) -> &mut Self {
        let (x, y, z) = (self.x, self.y, self.z);
        let (qx, qy, qz, qw) = (q.x, q.y, q.z, q.w);

        // q * v
        let ix = qw * x + qy * z - qz * y;
        let iy = qw * y + qz * x - qx * z;
        let iz = qw * z + qx * y - qy * x;
        let iw = -qx * x - qy * y - qz * z;

        // (q * v) * q^-1
        self.x = ix * qw + iw * -qx + iy * -qz - iz * -qy;
        self.y = iy * qw + iw * -qy + iz * -qx - ix * -qz;
        self.z = iz * qw + iw * -qz + ix * -qy - iy * -qx;
        self
    }

    /// Rotate by Euler angles
    pub fn apply_euler(&mut self, euler: Euler) -> &mut Self {
        self.apply_quaternion(Quaternion::from_euler(euler))
    }

    /// Rotate around a unit `axis` by `angle` radians
    pub fn apply_axis_angle(&mut self, axis: Self, angle: f32) -> &mut Self {
        self.apply_quaternion(Quaternion::from_axis_angle(axis, angle))
    }

    /// Transform as a direction (`w = 0`) and renormalize
    pub fn transform_direction(&mut self, m: &Matrix4) -> &mut Self {
        let e = &m.elements;
        let (x, y, z) = (self.x, self.y, self.z);
        self.x = e[0].mul_add(x, e[4].mul_add(y, e[8] * z));
        self.y = e[1].mul_add(x, e[5].mul_add(y, e[9] * z));
        self.z = e[2].mul_add(x, e[6].mul_add(y, e[10] * z));
        self.normalize()
    }

    /// Map from world space to normalized device coordinates
    pub fn project(&mut self, matrix_world_inverse: &Matrix4, projection: &Matrix4) -> &mut Self {
        self.apply_matrix4(matrix_world_inverse).apply_matrix4(projection)
    }

    /// Map from normalized device coordinates back to world space
    pub fn unproject(&mut self, projection_inverse: &Matrix4, matrix_world: &Matrix4) -> &mut Self {
        self.apply_matrix4(projection_inverse).apply_matrix4(matrix_world)
    }

    /// Project onto the line spanned by `v`
    pub fn project_on_vector(&mut self, v: Self) -> &mut Self {
        let denominator = v.length_squared();
        if denominator == 0.0 {
            return self.set_scalar(0.0);
        }
        let scalar = v.dot(*self) / denominator;
        *self = v * scalar;
        self
    }

    /// Remove the component along `plane_normal`
    pub fn project_on_plane(&mut self, plane_normal: Self) -> &mut Self {
        let mut along = *self;
        along.project_on_vector(plane_normal);
        *self -= along;
        self
    }

    /// Reflect off a plane with the given unit normal
    pub fn reflect(&mut self, normal: Self) -> &mut Self {
        let d = 2.0 * self.dot(normal);
        *self -= normal * d;
        self
    }

    /// Angle in radians between this vector and `v`
    #[must_use]
    pub fn angle_to(self, v: Self) -> f32 {
        let denominator = (self.length_squared() * v.length_squared()).sqrt();
        if denominator == 0.0 {
            return std::f32::consts::FRAC_PI_2;
        }
        let theta = self.dot(v) / denominator;
        theta.clamp(-1.0, 1.0).acos()
    }

    /// Translation part of an affine matrix
    pub fn set_from_matrix_position(&mut self, m: &Matrix4) -> &mut Self {
        let e = &m.elements;
        self.set(e[12], e[13], e[14])
    }

    /// Per-axis scale of an affine matrix
    pub fn set_from_matrix_scale(&mut self, m: &Matrix4) -> &mut Self {
        let sx = Self::from_array(&m.elements, 0).length();
        let sy = Self::from_array(&m.elements, 4).length();
        let sz = Self::from_array(&m.elements, 8).length();
        self.set(sx, sy, sz)
    }

    /// First three entries of matrix column `index`
    pub fn set_from_matrix_column(&mut self, m: &Matrix4, index: usize) -> &mut Self {
        *self = Self::from_array(&m.elements, index * 4);
        self
    }

    /// Cartesian position of spherical coordinates
    pub fn set_from_spherical(&mut self, s: Spherical) -> &mut Self {
        self.set_from_spherical_coords(s.radius, s.phi, s.theta)
    }

    /// Cartesian position of `(radius, phi, theta)`
    pub fn set_from_spherical_coords(&mut self, radius: f32, phi: f32, theta: f32) -> &mut Self {
        let sin_phi_radius = phi.sin() * radius;
        self.set(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        )
    }

    /// Cartesian position of cylindrical coordinates
    pub fn set_from_cylindrical(&mut self, c: Cylindrical) -> &mut Self {
        self.set_from_cylindrical_coords(c.radius, c.theta, c.y)
    }

    /// Cartesian position of `(radius, theta, y)`
    pub fn set_from_cylindrical_coords(&mut self, radius: f32, theta: f32, y: f32) -> &mut Self {
        self.set(radius * theta.sin(), y, radius * theta.cos())
    }

    /// Exact component equality
    #[must_use]
    pub fn equals(self, v: Self) -> bool {
        self == v
    }

    /// Read three components from `array` starting at `offset`
    #[must_use]
    pub fn from_array(array: &[f32], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1], array[offset + 2])
    }

    /// Components as an array
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Write the components into `array` starting at `offset`
    pub fn write_to_array(self, array: &mut [f32], offset: usize) {
        array[offset] = self.x;
        array[offset + 1] = self.y;
        array[offset + 2] = self.z;
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vector3> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl MulAssign<f32> for Vector3 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Div<f32> for Vector3 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        self * (1.0 / rhs)
    }
}

impl DivAssign<f32> for Vector3 {
    fn div_assign(&mut self, rhs: f32) {
        *self *= 1.0 / rhs;
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(array: [f32; 3]) -> Self {
        Self::new(array[0], array[1], array[2])
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_chained_operations() {
        let mut v = Vector3::new(3.0, 0.0, 4.0);
        v.normalize().multiply_scalar(10.0).add_scaled_vector(Vector3::Y, 2.0);
        assert_relative_eq!(v, Vector3::new(6.0, 2.0, 8.0), epsilon = EPSILON);
    }

    #[test]
    fn test_receiver_as_operand_has_no_aliasing() {
        // The receiver is read before it is overwritten.
        let a = Vector3::new(5.0, 5.0, 5.0);
        let mut v = Vector3::new(1.0, 2.0, 3.0);
        v.sub_vectors(a, v);
        assert_eq!(v, Vector3::new(4.0, 3.0, 2.0));

        let mut w = Vector3::X;
        w.cross_vectors(w, Vector3::Y);
        assert_eq!(w, Vector3::Z);

        // Reusing one scratch vector across nested calls.
        let mut scratch = Vector3::new(1.0, 1.0, 0.0);
        let projected = *scratch.project_on_vector(Vector3::X);
        scratch.add_vectors(scratch, projected);
        assert_eq!(scratch, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_apply_quaternion_rotates_about_axis() {
        let mut v = Vector3::X;
        v.apply_axis_angle(Vector3::Z, FRAC_PI_2);
        assert_relative_eq!(v, Vector3::Y, epsilon = EPSILON);
    }

    #[test]
    fn test_apply_matrix4_translates_points_not_directions() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));

        let mut point = Vector3::ZERO;
        point.apply_matrix4(&m);
        assert_relative_eq!(point, Vector3::new(1.0, 2.0, 3.0), epsilon = EPSILON);

        let mut direction = Vector3::Z;
        direction.transform_direction(&m);
        assert_relative_eq!(direction, Vector3::Z, epsilon = EPSILON);
    }

    #[test]
    fn test_projection_and_reflection() {
        let mut v = Vector3::new(1.0, 1.0, 0.0);
        v.project_on_plane(Vector3::Y);
        assert_relative_eq!(v, Vector3::X, epsilon = EPSILON);

        let mut incoming = Vector3::new(1.0, -1.0, 0.0);
        incoming.reflect(Vector3::Y);
        assert_relative_eq!(incoming, Vector3::new(1.0, 1.0, 0.0), epsilon = EPSILON);

        assert_relative_eq!(Vector3::X.angle_to(Vector3::Y), FRAC_PI_2, epsilon = EPSILON);
        assert_relative_eq!(Vector3::X.angle_to(-Vector3::X), PI, epsilon = EPSILON);
        // Degenerate input does not produce NaN.
        assert_relative_eq!(Vector3::ZERO.angle_to(Vector3::X), FRAC_PI_2);
    }

    #[test]
    fn test_spherical_round_trip() {
        let original = Vector3::new(1.0, 2.0, -3.0);
        let mut spherical = Spherical::default();
        spherical.set_from_vector3(original);

        let mut rebuilt = Vector3::ZERO;
        rebuilt.set_from_spherical(spherical);
        assert_relative_eq!(rebuilt, original, epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_scale_and_position_extraction() {
        let m = Matrix4::compose(
            Vector3::new(4.0, 5.0, 6.0),
            Quaternion::from_axis_angle(Vector3::Y, 0.3),
            Vector3::new(2.0, 3.0, 4.0),
        );
        let mut position = Vector3::ZERO;
        position.set_from_matrix_position(&m);
        let mut scale = Vector3::ZERO;
        scale.set_from_matrix_scale(&m);

        assert_relative_eq!(position, Vector3::new(4.0, 5.0, 6.0), epsilon = EPSILON);
        assert_relative_eq!(scale, Vector3::new(2.0, 3.0, 4.0), epsilon = 1e-5);
    }
}
