//! Camera payloads
//!
//! A camera node keeps its view (`matrix_world_inverse`) in step with its
//! world matrix; the scene refreshes it whenever the world matrix changes.
//! Projection matrices are refreshed explicitly through
//! `update_projection_matrix` after editing the lens parameters.

use serde::{Deserialize, Serialize};

use crate::foundation::math::constants::{DEG2RAD, RAD2DEG};
use crate::foundation::math::Matrix4;

/// Sub-rectangle of a larger virtual viewport, for tiled rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewOffset {
    /// Width of the full virtual viewport
    pub full_width: f32,
    /// Height of the full virtual viewport
    pub full_height: f32,
    /// Horizontal offset of the sub-view
    pub offset_x: f32,
    /// Vertical offset of the sub-view
    pub offset_y: f32,
    /// Width of the sub-view
    pub width: f32,
    /// Height of the sub-view
    pub height: f32,
}

/// Perspective projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Zoom factor
    pub zoom: f32,
    /// Focus distance for stereo and depth-of-field effects
    pub focus: f32,
    /// Film size in millimetres along the larger axis
    pub film_gauge: f32,
    /// Horizontal film offset in millimetres
    pub film_offset: f32,
    /// Optional tiled sub-view
    pub view: Option<ViewOffset>,
    /// Projection matrix
    pub projection_matrix: Matrix4,
    /// Inverse of the projection matrix
    pub projection_matrix_inverse: Matrix4,
    /// Inverse of the node's world matrix
    pub matrix_world_inverse: Matrix4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

impl PerspectiveCamera {
    /// Camera with the given lens, projection already computed
    #[must_use]
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            zoom: 1.0,
            focus: 10.0,
            film_gauge: 35.0,
            film_offset: 0.0,
            view: None,
            projection_matrix: Matrix4::IDENTITY,
            projection_matrix_inverse: Matrix4::IDENTITY,
            matrix_world_inverse: Matrix4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Film width in millimetres
    #[must_use]
    pub fn film_width(&self) -> f32 {
        self.film_gauge * self.aspect.min(1.0)
    }

    /// Film height in millimetres
    #[must_use]
    pub fn film_height(&self) -> f32 {
        self.film_gauge / self.aspect.max(1.0)
    }

    /// Set the field of view from a focal length in millimetres
    pub fn set_focal_length(&mut self, focal_length: f32) -> &mut Self {
        let v_extent_slope = 0.5 * self.film_height() / focal_length;
        self.fov = RAD2DEG * 2.0 * v_extent_slope.atan();
        self.update_projection_matrix();
        self
    }

    /// Focal length in millimetres implied by the field of view
    #[must_use]
    pub fn focal_length(&self) -> f32 {
        let v_extent_slope = (DEG2RAD * 0.5 * self.fov).tan();
        0.5 * self.film_height() / v_extent_slope
    }

    /// Field of view after zoom, in degrees
    #[must_use]
    pub fn effective_fov(&self) -> f32 {
        RAD2DEG * 2.0 * ((DEG2RAD * 0.5 * self.fov).tan() / self.zoom).atan()
    }

    /// Render a tile of a larger virtual viewport
    pub fn set_view_offset(&mut self, view: ViewOffset) -> &mut Self {
        self.aspect = view.full_width / view.full_height;
        self.view = Some(view);
        self.update_projection_matrix();
        self
    }

    /// Drop the tiled sub-view
    pub fn clear_view_offset(&mut self) -> &mut Self {
        self.view = None;
        self.update_projection_matrix();
        self
    }

    /// Recompute the projection (and its inverse) from the lens parameters
    pub fn update_projection_matrix(&mut self) {
        let near = self.near;
        let mut top = near * (DEG2RAD * 0.5 * self.fov).tan() / self.zoom;
        let mut height = 2.0 * top;
        let mut width = self.aspect * height;
        let mut left = -0.5 * width;

        if let Some(view) = self.view {
            left += view.offset_x * width / view.full_width;
            top -= view.offset_y * height / view.full_height;
            width *= view.width / view.full_width;
            height *= view.height / view.full_height;
        }

        if self.film_offset != 0.0 {
            left += near * self.film_offset / self.film_width();
        }

        self.projection_matrix
            .make_perspective(left, left + width, top, top - height, near, self.far);
        self.projection_matrix_inverse = self.projection_matrix.inverse();
    }
}

/// Orthographic projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthographicCamera {
    /// Left plane
    pub left: f32,
    /// Right plane
    pub right: f32,
    /// Top plane
    pub top: f32,
    /// Bottom plane
    pub bottom: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Zoom factor
    pub zoom: f32,
    /// Optional tiled sub-view
    pub view: Option<ViewOffset>,
    /// Projection matrix
    pub projection_matrix: Matrix4,
    /// Inverse of the projection matrix
    pub projection_matrix_inverse: Matrix4,
    /// Inverse of the node's world matrix
    pub matrix_world_inverse: Matrix4,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self::new(-1.0, 1.0, 1.0, -1.0, 0.1, 2000.0)
    }
}

impl OrthographicCamera {
    /// Camera with the given view box, projection already computed
    #[must_use]
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            zoom: 1.0,
            view: None,
            projection_matrix: Matrix4::IDENTITY,
            projection_matrix_inverse: Matrix4::IDENTITY,
            matrix_world_inverse: Matrix4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Render a tile of a larger virtual viewport
    pub fn set_view_offset(&mut self, view: ViewOffset) -> &mut Self {
        self.view = Some(view);
        self.update_projection_matrix();
        self
    }

    /// Drop the tiled sub-view
    pub fn clear_view_offset(&mut self) -> &mut Self {
        self.view = None;
        self.update_projection_matrix();
        self
    }

    /// Recompute the projection (and its inverse) from the view box
    pub fn update_projection_matrix(&mut self) {
        let dx = (self.right - self.left) / (2.0 * self.zoom);
        let dy = (self.top - self.bottom) / (2.0 * self.zoom);
        let cx = (self.right + self.left) / 2.0;
        let cy = (self.top + self.bottom) / 2.0;

        let mut left = cx - dx;
        let mut right = cx + dx;
        let mut top = cy + dy;
        let mut bottom = cy - dy;

        if let Some(view) = self.view {
            let scale_w = (self.right - self.left) / view.full_width / self.zoom;
            let scale_h = (self.top - self.bottom) / view.full_height / self.zoom;
            left += scale_w * view.offset_x;
            right = left + scale_w * view.width;
            top -= scale_h * view.offset_y;
            bottom = top - scale_h * view.height;
        }

        self.projection_matrix
            .make_orthographic(left, right, top, bottom, self.near, self.far);
        self.projection_matrix_inverse = self.projection_matrix.inverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vector3;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_perspective_defaults() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.fov, 50.0);
        assert_eq!(camera.aspect, 1.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 2000.0);
        assert_relative_eq!(
            camera.projection_matrix * camera.projection_matrix_inverse,
            Matrix4::IDENTITY,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_perspective_near_plane_maps_to_minus_one() {
        let camera = PerspectiveCamera::new(90.0, 1.0, 1.0, 100.0);
        let mut p = Vector3::new(1.0, 1.0, -1.0);
        p.apply_matrix4(&camera.projection_matrix);
        assert_relative_eq!(p, Vector3::new(1.0, 1.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_zoom_narrows_effective_fov() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 10.0);
        camera.zoom = 2.0;
        camera.update_projection_matrix();
        assert!(camera.effective_fov() < 60.0);
    }

    #[test]
    fn test_focal_length_round_trip() {
        let mut camera = PerspectiveCamera::default();
        camera.set_focal_length(35.0);
        assert_relative_eq!(camera.focal_length(), 35.0, epsilon = EPSILON);
    }

    #[test]
    fn test_orthographic_zoom_and_view_offset() {
        let mut camera = OrthographicCamera::new(-2.0, 2.0, 2.0, -2.0, 0.1, 10.0);
        let mut corner = Vector3::new(2.0, 2.0, -1.0);
        corner.apply_matrix4(&camera.projection_matrix);
        assert_relative_eq!(corner.x, 1.0, epsilon = EPSILON);

        camera.zoom = 2.0;
        camera.update_projection_matrix();
        let mut edge = Vector3::new(1.0, 0.0, -1.0);
        edge.apply_matrix4(&camera.projection_matrix);
        assert_relative_eq!(edge.x, 1.0, epsilon = EPSILON);

        camera.zoom = 1.0;
        camera.set_view_offset(ViewOffset {
            full_width: 100.0,
            full_height: 100.0,
            offset_x: 50.0,
            offset_y: 0.0,
            width: 50.0,
            height: 100.0,
        });
        // the right half of the view box now spans NDC [-1, 1]
        let mut center = Vector3::new(0.0, 0.0, -1.0);
        center.apply_matrix4(&camera.projection_matrix);
        assert_relative_eq!(center.x, -1.0, epsilon = EPSILON);
    }
}
