use cubescene_assets::TextureSource;
use cubescene_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a scene config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Camera projection and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 3.0,
            position: Vec3::new(10.0, 10.0, 10.0),
        }
    }
}

/// Box dimensions in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeSettings {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for CubeSettings {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 2.0,
            depth: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    /// Color map, fetched in the background at startup.
    pub texture: TextureSource,
    /// Surface color used while the texture is loading or after it failed.
    pub fallback_color: Color,
    /// Sampler anisotropy clamp. 1 disables anisotropic filtering.
    pub anisotropy: u16,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            texture: TextureSource::default(),
            fallback_color: Color::PURPLE,
            anisotropy: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Radians added to each rotation axis per frame.
    pub rotation_step: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            rotation_step: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Aspect ratio used when the host surface has zero area and no earlier
    /// size is known.
    pub fallback_aspect: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            fallback_aspect: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Multisample the color and depth targets to smooth edges.
    pub antialias: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { antialias: true }
    }
}

/// Every tunable of the demo scene. All fields have defaults, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Clear color behind the scene.
    pub background: Color,
    pub camera: CameraSettings,
    pub light: LightSettings,
    pub cube: CubeSettings,
    pub material: MaterialSettings,
    pub animation: AnimationSettings,
    pub viewport: ViewportSettings,
    pub render: RenderSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: Color::SKY_BLUE,
            camera: CameraSettings::default(),
            light: LightSettings::default(),
            cube: CubeSettings::default(),
            material: MaterialSettings::default(),
            animation: AnimationSettings::default(),
            viewport: ViewportSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Read a YAML config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "scene config loaded");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.near > 0.0 && cam.far > cam.near && cam.far.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if !crate::camera::can_look_at(cam.position, crate::camera::CAMERA_TARGET) {
            return Err(ConfigError::Invalid(format!(
                "camera.position {} must be finite, away from the target and off its vertical axis",
                cam.position
            )));
        }
        if !self.animation.rotation_step.is_finite() {
            return Err(ConfigError::Invalid(
                "animation.rotation_step must be finite".into(),
            ));
        }
        let fallback = self.viewport.fallback_aspect;
        if !(fallback > 0.0 && fallback.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "viewport.fallback_aspect must be positive, got {fallback}"
            )));
        }
        let cube = &self.cube;
        if !(cube.width > 0.0 && cube.height > 0.0 && cube.depth > 0.0) {
            return Err(ConfigError::Invalid("cube dimensions must be positive".into()));
        }
        if self.material.anisotropy == 0 {
            return Err(ConfigError::Invalid(
                "material.anisotropy must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.camera.fov_degrees, 35.0);
        assert_eq!(c.camera.near, 0.1);
        assert_eq!(c.camera.far, 100.0);
        assert_eq!(c.camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(c.light.intensity, 3.0);
        assert_eq!(c.background, Color::SKY_BLUE);
        assert_eq!(c.animation.rotation_step, 0.01);
        assert_eq!(c.material.anisotropy, 16);
        assert!(c.render.antialias);
        c.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = SceneConfig::from_yaml_str(
            "camera:\n  fov_degrees: 50\nmaterial:\n  texture: ./local.png\n",
        )
        .unwrap();
        assert_eq!(c.camera.fov_degrees, 50.0);
        assert_eq!(c.camera.far, 100.0);
        assert_eq!(
            c.material.texture,
            TextureSource::Path("./local.png".into())
        );
        assert_eq!(c.light, LightSettings::default());
    }

    #[test]
    fn antialias_can_be_disabled() {
        let c = SceneConfig::from_yaml_str("render:\n  antialias: false\n").unwrap();
        assert!(!c.render.antialias);
        assert_eq!(c.camera, CameraSettings::default());
        assert!(c.to_yaml().unwrap().contains("antialias: false"));
    }

    #[test]
    fn empty_yaml_is_default() {
        let c = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(c, SceneConfig::default());
    }

    #[test]
    fn rejects_bad_planes() {
        let err = SceneConfig::from_yaml_str("camera:\n  near: 5\n  far: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_camera_on_target() {
        let err = SceneConfig::from_yaml_str("camera:\n  position: [0.0, 0.0, 0.0]\n").unwrap_err();
        assert!(err.to_string().contains("camera.position"));

        let err = SceneConfig::from_yaml_str("camera:\n  position: [0.0, 5.0, 0.0]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let moved = SceneConfig::from_yaml_str("camera:\n  position: [3.0, 4.0, 5.0]\n").unwrap();
        let camera = crate::camera::PerspectiveCamera::from_settings(&moved.camera, 1.0);
        assert!(camera.view_projection().is_finite());
    }

    #[test]
    fn rejects_zero_fallback_aspect() {
        let err =
            SceneConfig::from_yaml_str("viewport:\n  fallback_aspect: 0\n").unwrap_err();
        assert!(err.to_string().contains("fallback_aspect"));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        let mut config = SceneConfig::default();
        config.background = Color::BLACK;
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SceneConfig::load("/no/such/scene.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
