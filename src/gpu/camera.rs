//! Fixed perspective camera looking down the -z axis at the origin.

use glam::{Mat4, Vec3};

/// Closest the camera gets to the origin, in particle units.
const MIN_DISTANCE: f32 = 400.0;

/// Perspective camera framing the particle cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +z.
    pub distance: f32,
    /// Viewport width over height.
    pub aspect: f32,
}

impl Camera {
    /// Create a camera framing a viewport of `width` x `height` physical
    /// pixels on a display with the given scale factor.
    pub fn new(width: u32, height: u32, scale_factor: f32) -> Self {
        let mut camera = Self {
            fov_y: 75.0,
            near: 0.1,
            far: 2000.0,
            distance: MIN_DISTANCE,
            aspect: 1.0,
        };
        camera.fit_viewport(width, height, scale_factor);
        camera
    }

    /// Follow a viewport resize. Wider viewports move the camera back.
    ///
    /// Distance follows the logical width, so the framing is the same on
    /// high-DPI displays.
    pub fn fit_viewport(&mut self, width: u32, height: u32, scale_factor: f32) {
        if width == 0 || height == 0 {
            return;
        }
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 };
        self.aspect = width as f32 / height as f32;
        self.distance = (width as f32 / scale / 4.0).max(MIN_DISTANCE);
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_follows_width() {
        assert_eq!(Camera::new(800, 600, 1.0).distance, 400.0);
        assert_eq!(Camera::new(2560, 1440, 1.0).distance, 640.0);
    }

    #[test]
    fn test_distance_uses_logical_width() {
        // 1280 logical pixels at 2x.
        let camera = Camera::new(2560, 1440, 2.0);
        assert_eq!(camera.distance, 400.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(Camera::new(3840, 1080, 2.0).distance, 480.0);
    }

    #[test]
    fn test_bad_scale_factor_treated_as_one() {
        assert_eq!(Camera::new(2560, 1440, 0.0).distance, 640.0);
        assert_eq!(Camera::new(2560, 1440, f32::NAN).distance, 640.0);
    }

    #[test]
    fn test_zero_viewport_keeps_previous() {
        let mut camera = Camera::new(1920, 1080, 1.0);
        let before = camera.clone();
        camera.fit_viewport(0, 1080, 1.0);
        assert_eq!(camera, before);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(1280, 720, 1.0);
        let clip = camera.projection_matrix() * camera.view_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
