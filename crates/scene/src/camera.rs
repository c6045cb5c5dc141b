use crate::config::CameraSettings;
use glam::{Mat4, Vec3};

/// Point every scene camera looks at.
pub const CAMERA_TARGET: Vec3 = Vec3::ZERO;
const CAMERA_UP: Vec3 = Vec3::Y;

/// True when a camera at `position` has a well-defined view of `target`:
/// finite, not on the target, and not looking straight along the up axis.
pub fn can_look_at(position: Vec3, target: Vec3) -> bool {
    let forward = target - position;
    position.is_finite()
        && forward.length_squared() > 1e-8
        && forward.normalize().cross(CAMERA_UP).length_squared() > 1e-8
}

/// Snapshot of the projection parameters, comparable across resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

/// Perspective camera looking at a fixed target.
///
/// The projection matrix is cached; `set_aspect` recomputes it so the cached
/// matrix never lags the aspect ratio.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default(), 1.0)
    }
}

impl PerspectiveCamera {
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let mut camera = Self {
            position: settings.position,
            target: CAMERA_TARGET,
            fov: settings.fov_degrees.to_radians(),
            aspect,
            near: settings.near,
            far: settings.far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio and the projection derived from it.
    pub fn set_aspect(&mut self, aspect: f32) {
        debug_assert!(aspect.is_finite() && aspect > 0.0);
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    pub fn config(&self) -> CameraConfig {
        CameraConfig {
            fov_degrees: self.fov.to_degrees(),
            near: self.near,
            far: self.far,
            aspect: self.aspect,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, CAMERA_UP)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 10.0));
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(vp.is_finite());
        let cfg = cam.config();
        assert!((cfg.fov_degrees - 35.0).abs() < 1e-4);
        assert_eq!(cfg.near, 0.1);
        assert_eq!(cfg.far, 100.0);
    }

    #[test]
    fn set_aspect_refreshes_projection() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert_ne!(cam.projection_matrix(), before);
        let expected = Mat4::perspective_rh(35f32.to_radians(), 2.0, 0.1, 100.0);
        assert_eq!(cam.projection_matrix(), expected);
    }

    #[test]
    fn degenerate_positions_cannot_look_at_target() {
        assert!(can_look_at(Vec3::new(0.0, 0.0, 10.0), CAMERA_TARGET));
        assert!(can_look_at(Vec3::new(0.0, 10.0, 0.1), CAMERA_TARGET));
        assert!(!can_look_at(CAMERA_TARGET, CAMERA_TARGET));
        assert!(!can_look_at(Vec3::new(0.0, 10.0, 0.0), CAMERA_TARGET));
        assert!(!can_look_at(Vec3::new(f32::NAN, 0.0, 10.0), CAMERA_TARGET));

        let mut cam = PerspectiveCamera::default();
        cam.position = CAMERA_TARGET;
        assert!(!cam.view_projection().is_finite());
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = PerspectiveCamera::from_settings(&CameraSettings::default(), 4.0 / 3.0);
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
    }
}
