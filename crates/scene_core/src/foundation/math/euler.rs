use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants::GIMBAL_LOCK_THRESHOLD;
use super::{Matrix4, Quaternion, Vector3};
use crate::error::SceneError;

/// Axis order in which Euler rotations are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum EulerOrder {
    /// Rotate about X, then Y, then Z (intrinsic)
    #[default]
    XYZ,
    /// Rotate about X, then Z, then Y
    XZY,
    /// Rotate about Y, then X, then Z
    YXZ,
    /// Rotate about Y, then Z, then X
    YZX,
    /// Rotate about Z, then X, then Y
    ZXY,
    /// Rotate about Z, then Y, then X
    ZYX,
}

impl EulerOrder {
    /// All supported orders
    pub const ALL: [Self; 6] = [Self::XYZ, Self::XZY, Self::YXZ, Self::YZX, Self::ZXY, Self::ZYX];

    /// Canonical name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::XYZ => "XYZ",
            Self::XZY => "XZY",
            Self::YXZ => "YXZ",
            Self::YZX => "YZX",
            Self::ZXY => "ZXY",
            Self::ZYX => "ZYX",
        }
    }
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EulerOrder {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SceneError::UnsupportedEulerOrder(s.to_string()))
    }
}

/// Rotation expressed as three angles applied in a given axis order.
///
/// Converting Euler → quaternion → Euler does not return the original angles
/// near gimbal lock; it returns an equivalent rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    /// Rotation about X in radians
    pub x: f32,
    /// Rotation about Y in radians
    pub y: f32,
    /// Rotation about Z in radians
    pub z: f32,
    /// Application order
    pub order: EulerOrder,
}

impl_approx_eq!(Euler, x, y, z);

impl Euler {
    /// Create Euler angles
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, order: EulerOrder) -> Self {
        Self { x, y, z, order }
    }

    /// Overwrite all angles and the order
    pub fn set(&mut self, x: f32, y: f32, z: f32, order: EulerOrder) -> &mut Self {
        *self = Self::new(x, y, z, order);
        self
    }

    /// Angles of `m` (upper 3x3 must be unscaled) in the given order
    #[must_use]
    pub fn from_rotation_matrix(m: &Matrix4, order: EulerOrder) -> Self {
        let mut euler = Self::default();
        euler.set_from_rotation_matrix(m, order);
        euler
    }

    /// Angles of `q` in the given order
    #[must_use]
    pub fn from_quaternion(q: Quaternion, order: EulerOrder) -> Self {
        let mut euler = Self::default();
        euler.set_from_quaternion(q, order);
        euler
    }

    /// Extract angles from a pure rotation matrix
    pub fn set_from_rotation_matrix(&mut self, m: &Matrix4, order: EulerOrder) -> &mut Self {
        let te = &m.elements;
        let (m11, m12, m13) = (te[0], te[4], te[8]);
        let (m21, m22, m23) = (te[1], te[5], te[9]);
        let (m31, m32, m33) = (te[2], te[6], te[10]);
        let unlocked = |v: f32| v.abs() < GIMBAL_LOCK_THRESHOLD;

        let (x, y, z) = match order {
            EulerOrder::XYZ => {
                let y = m13.clamp(-1.0, 1.0).asin();
                if unlocked(m13) {
                    ((-m23).atan2(m33), y, (-m12).atan2(m11))
                } else {
                    (m32.atan2(m22), y, 0.0)
                }
            }
            EulerOrder::YXZ => {
                let x = (-m23.clamp(-1.0, 1.0)).asin();
                if unlocked(m23) {
                    (x, m13.atan2(m33), m21.atan2(m22))
                } else {
                    (x, (-m31).atan2(m11), 0.0)
                }
            }
            EulerOrder::ZXY => {
                let x = m32.clamp(-1.0, 1.0).asin();
                if unlocked(m32) {
                    (x, (-m31).atan2(m33), (-m12).atan2(m22))
                } else {
                    (x, 0.0, m21.atan2(m11))
                }
            }
            EulerOrder::ZYX => {
                let y = (-m31.clamp(-1.0, 1.0)).asin();
                if unlocked(m31) {
                    (m32.atan2(m33), y, m21.atan2(m11))
                } else {
                    (0.0, y, (-m12).atan2(m22))
                }
            }
            EulerOrder::YZX => {
                let z = m21.clamp(-1.0, 1.0).asin();
                if unlocked(m21) {
                    ((-m23).atan2(m22), (-m31).atan2(m11), z)
                } else {
                    (0.0, m13.atan2(m33), z)
                }
            }
            EulerOrder::XZY => {
                let z = (-m12.clamp(-1.0, 1.0)).asin();
                if unlocked(m12) {
                    (m32.atan2(m22), m13.atan2(m11), z)
                } else {
                    ((-m23).atan2(m33), 0.0, z)
                }
            }
        };

        self.set(x, y, z, order)
    }

    /// Extract angles from a quaternion
    pub fn set_from_quaternion(&mut self, q: Quaternion, order: EulerOrder) -> &mut Self {
        self.set_from_rotation_matrix(&Matrix4::from_quaternion(q), order)
    }

    /// Take angles from a vector, keeping `order`
    pub fn set_from_vector3(&mut self, v: Vector3, order: EulerOrder) -> &mut Self {
        self.set(v.x, v.y, v.z, order)
    }

    /// Re-express the same rotation in another order (may lose information
    /// near gimbal lock)
    pub fn reorder(&mut self, order: EulerOrder) -> &mut Self {
        let q = Quaternion::from_euler(*self);
        self.set_from_quaternion(q, order)
    }

    /// Angles as a vector
    #[must_use]
    pub const fn to_vector3(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_matrix_round_trip_for_every_order() {
        for order in EulerOrder::ALL {
            let euler = Euler::new(0.3, -0.4, 0.5, order);
            let m = Matrix4::from_euler(euler);
            let recovered = Euler::from_rotation_matrix(&m, order);
            assert_relative_eq!(recovered, euler, epsilon = EPSILON);
            assert_eq!(recovered.order, order);
        }
    }

    #[test]
    fn test_quaternion_and_matrix_paths_agree() {
        for order in EulerOrder::ALL {
            let euler = Euler::new(-0.8, 0.2, 1.3, order);
            let from_matrix = Quaternion::from_rotation_matrix(&Matrix4::from_euler(euler));
            let direct = Quaternion::from_euler(euler);
            assert_relative_eq!(from_matrix, direct, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_gimbal_lock_yields_equivalent_rotation() {
        // Near |y| = 90° the angles are not unique; only the rotation is
        // expected to survive the trip through a quaternion.
        let locked = Euler::new(0.3, FRAC_PI_2, 0.2, EulerOrder::XYZ);
        let q = Quaternion::from_euler(locked);
        let recovered = Euler::from_quaternion(q, EulerOrder::XYZ);

        assert_relative_eq!(recovered.z, 0.0);
        assert_relative_eq!(
            Matrix4::from_euler(recovered),
            Matrix4::from_euler(locked),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_reorder_preserves_rotation() {
        let mut euler = Euler::new(0.1, 0.2, 0.3, EulerOrder::XYZ);
        let before = Quaternion::from_euler(euler);
        euler.reorder(EulerOrder::ZYX);
        assert_eq!(euler.order, EulerOrder::ZYX);
        assert_relative_eq!(Quaternion::from_euler(euler), before, epsilon = EPSILON);
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!("yxz".parse::<EulerOrder>().ok(), Some(EulerOrder::YXZ));
        assert!(matches!(
            "XYW".parse::<EulerOrder>(),
            Err(SceneError::UnsupportedEulerOrder(name)) if name == "XYW"
        ));
        assert_eq!(EulerOrder::ZXY.to_string(), "ZXY");
    }
}
