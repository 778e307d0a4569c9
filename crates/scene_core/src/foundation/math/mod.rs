//! Transform math kernel
//!
//! Value types backing every transform, bounding volume and ray query in the
//! crate. All types are `Copy`, operate on `f32` and never allocate.
//!
//! ## Conventions
//!
//! - Matrices store their elements in **column-major** order, while the
//!   `set` constructors take their arguments in row-major reading order.
//! - In-place operations take `&mut self` and return `&mut Self` so calls
//!   can be chained. Operands are passed by value, which makes it safe to
//!   pass the receiver as one of its own operands.
//! - Rotations are right-handed; angles are radians unless a name says
//!   otherwise.
//!
//! ## Failure modes
//!
//! No arithmetic path panics. Inverting a singular matrix yields identity
//! and reports a warning through the `log` facade; use `try_inverse` when the
//! caller needs to observe the failure.

/// Implements `approx` comparisons field by field for a float struct.
macro_rules! impl_approx_eq {
    ($ty:ty, $($field:ident),+) => {
        impl approx::AbsDiffEq for $ty {
            type Epsilon = f32;

            fn default_epsilon() -> f32 {
                f32::EPSILON
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
                $(approx::AbsDiffEq::abs_diff_eq(&self.$field, &other.$field, epsilon))&&+
            }
        }

        impl approx::RelativeEq for $ty {
            fn default_max_relative() -> f32 {
                f32::EPSILON
            }

            fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
                $(approx::RelativeEq::relative_eq(&self.$field, &other.$field, epsilon, max_relative))&&+
            }
        }
    };
}

/// Implements `approx` comparisons for a type with an `elements` array.
macro_rules! impl_approx_eq_elements {
    ($ty:ty) => {
        impl approx::AbsDiffEq for $ty {
            type Epsilon = f32;

            fn default_epsilon() -> f32 {
                f32::EPSILON
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
                self.elements
                    .iter()
                    .zip(other.elements.iter())
                    .all(|(a, b)| approx::AbsDiffEq::abs_diff_eq(a, b, epsilon))
            }
        }

        impl approx::RelativeEq for $ty {
            fn default_max_relative() -> f32 {
                f32::EPSILON
            }

            fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
                self.elements
                    .iter()
                    .zip(other.elements.iter())
                    .all(|(a, b)| approx::RelativeEq::relative_eq(a, b, epsilon, max_relative))
            }
        }
    };
}

mod box3;
mod cylindrical;
mod euler;
mod frustum;
mod interop;
mod line3;
mod matrix3;
mod matrix4;
mod plane;
mod quaternion;
mod ray;
mod sphere;
mod spherical;
mod triangle;
mod vector2;
mod vector3;
mod vector4;

pub use box3::Box3;
pub use cylindrical::Cylindrical;
pub use euler::{Euler, EulerOrder};
pub use frustum::Frustum;
pub use line3::Line3;
pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
pub use plane::Plane;
pub use quaternion::Quaternion;
pub use ray::{Ray, SegmentApproach};
pub use sphere::Sphere;
pub use spherical::Spherical;
pub use triangle::Triangle;
pub use vector2::Vector2;
pub use vector3::Vector3;
pub use vector4::Vector4;

/// Mathematical constants
pub mod constants {
    /// Multiply degrees by this to get radians
    pub const DEG2RAD: f32 = std::f32::consts::PI / 180.0;

    /// Multiply radians by this to get degrees
    pub const RAD2DEG: f32 = 180.0 / std::f32::consts::PI;

    /// Tolerance used by geometric predicates
    pub const EPSILON: f32 = 1e-6;

    /// Euler extraction switches to the gimbal-lock branch at this magnitude
    pub const GIMBAL_LOCK_THRESHOLD: f32 = 0.99999;
}

/// Scalar helpers
pub mod utils {
    use super::constants::{DEG2RAD, RAD2DEG};

    /// Clamp `value` to `[min, max]`
    #[must_use]
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        value.max(min).min(max)
    }

    /// Linear interpolation between `a` and `b`
    #[must_use]
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        (1.0 - t).mul_add(a, t * b)
    }

    /// Degrees to radians
    #[must_use]
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * DEG2RAD
    }

    /// Radians to degrees
    #[must_use]
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * RAD2DEG
    }

    /// Modulo that is always non-negative for a positive divisor
    #[must_use]
    pub fn euclidean_modulo(n: f32, m: f32) -> f32 {
        ((n % m) + m) % m
    }

    /// Hermite interpolation of `x` between `min` and `max`
    #[must_use]
    pub fn smoothstep(x: f32, min: f32, max: f32) -> f32 {
        if x <= min {
            return 0.0;
        }
        if x >= max {
            return 1.0;
        }
        let t = (x - min) / (max - min);
        t * t * 2.0f32.mul_add(-t, 3.0)
    }

    /// Whether `value` is a power of two
    #[must_use]
    pub const fn is_power_of_two(value: u32) -> bool {
        value != 0 && (value & (value - 1)) == 0
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use approx::assert_relative_eq;

        #[test]
        fn test_scalar_helpers() {
            assert_relative_eq!(clamp(5.0, 0.0, 1.0), 1.0);
            assert_relative_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
            assert_relative_eq!(lerp(2.0, 4.0, 0.5), 3.0);
            assert_relative_eq!(euclidean_modulo(-1.0, 4.0), 3.0);
            assert_relative_eq!(smoothstep(0.5, 0.0, 1.0), 0.5);
            assert_relative_eq!(rad_to_deg(deg_to_rad(90.0)), 90.0, epsilon = 1e-4);
            assert!(is_power_of_two(64));
            assert!(!is_power_of_two(48));
            assert!(!is_power_of_two(0));
        }
    }
}
