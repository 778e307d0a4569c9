//! Concrete configuration structures

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::{EulerOrder, Vector3};

/// # Scene Configuration
///
/// Defaults applied to nodes created through `Scene::create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Up vector used by `look_at`
    pub default_up: Vector3,
    /// Whether new nodes rebuild their local matrix from TRS during updates
    pub default_matrix_auto_update: bool,
    /// Euler order reported by `Node::rotation`
    pub default_euler_order: EulerOrder,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_up: Vector3::Y,
            default_matrix_auto_update: true,
            default_euler_order: EulerOrder::XYZ,
        }
    }
}

impl Config for SceneConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_up.length_squared() == 0.0 {
            return Err(ConfigError::Invalid("default_up must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// # Raycaster Configuration
///
/// Distance bounds and picking tolerances for ray queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycasterConfig {
    /// Hits closer than this are discarded
    pub near: f32,
    /// Hits further than this are discarded
    pub far: f32,
    /// World-space pick tolerance for line segments
    pub line_threshold: f32,
    /// World-space pick tolerance for point clouds
    pub points_threshold: f32,
    /// Layer mask; only nodes sharing a layer are hit-tested
    pub layers: u32,
}

impl Default for RaycasterConfig {
    fn default() -> Self {
        Self {
            near: 0.0,
            far: f32::INFINITY,
            line_threshold: 1.0,
            points_threshold: 1.0,
            layers: 1,
        }
    }
}

impl Config for RaycasterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.near < 0.0 || self.near > self.far {
            return Err(ConfigError::Invalid(format!(
                "near ({}) must be non-negative and not greater than far ({})",
                self.near, self.far
            )));
        }
        if self.line_threshold < 0.0 || self.points_threshold < 0.0 {
            return Err(ConfigError::Invalid("thresholds must be non-negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_raycaster_config_from_toml_fills_defaults() {
        let config = RaycasterConfig::from_str_with_format("far = 250.0\nline_threshold = 0.1\n", ConfigFormat::Toml).unwrap();
        assert_eq!(config.far, 250.0);
        assert_eq!(config.line_threshold, 0.1);
        assert_eq!(config.near, 0.0);
        assert_eq!(config.layers, 1);
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let result = RaycasterConfig::from_str_with_format("near = 10.0\nfar = 1.0\n", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_scene_config_ron_round_trip() {
        let config = SceneConfig {
            default_up: Vector3::Z,
            default_matrix_auto_update: false,
            default_euler_order: EulerOrder::ZYX,
        };
        let text = config.to_string_with_format(ConfigFormat::Ron).unwrap();
        let parsed = SceneConfig::from_str_with_format(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_file_round_trip_and_unknown_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("scene_core_raycaster_{}.toml", std::process::id()));
        let config = RaycasterConfig { far: 42.0, ..RaycasterConfig::default() };
        config.save_to_file(&path).unwrap();
        let loaded = RaycasterConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);

        assert!(matches!(
            RaycasterConfig::load_from_file(dir.join("raycaster.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
