use crate::camera::PerspectiveCamera;
use crate::graph::{SceneRoot, TextureSlot};
use std::convert::Infallible;
use std::fmt::Write as _;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and camera and produces one frame. It never
/// mutates the scene.
pub trait Renderer {
    type Error: std::error::Error + 'static;

    /// Render one frame of `scene` as seen from `camera`.
    fn render(&mut self, scene: &SceneRoot, camera: &PerspectiveCamera) -> Result<(), Self::Error>;
}

/// Text renderer for headless runs.
///
/// Produces a human-readable description of each frame. Used by the CLI,
/// logging, and tests of the frame loop.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
    last: String,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_output(&self) -> &str {
        &self.last
    }

    pub fn describe(scene: &SceneRoot, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        let cfg = camera.config();
        let _ = writeln!(
            out,
            "=== Scene (background=#{:06x}) ===",
            scene.background.to_hex()
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.4} near={} far={}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            cfg.fov_degrees,
            cfg.aspect,
            cfg.near,
            cfg.far
        );
        for light in scene.lights() {
            let _ = writeln!(
                out,
                "  light intensity={:.1} pos=({:.1}, {:.1}, {:.1})",
                light.intensity, light.position.x, light.position.y, light.position.z
            );
        }
        for mesh in scene.meshes() {
            let rot = mesh.transform.euler_xyz();
            let map = match &mesh.material.map {
                TextureSlot::Pending(src) => format!("pending({src})"),
                TextureSlot::Ready(tex) => format!("ready({}x{})", tex.width, tex.height),
                TextureSlot::Fallback { .. } => "fallback".to_string(),
            };
            let _ = writeln!(
                out,
                "  mesh {} rot=({:.2}, {:.2}, {:.2}) map={}",
                mesh.name, rot.x, rot.y, rot.z, map
            );
        }
        out
    }
}

impl Renderer for DebugTextRenderer {
    type Error = Infallible;

    fn render(&mut self, scene: &SceneRoot, camera: &PerspectiveCamera) -> Result<(), Infallible> {
        self.last = Self::describe(scene, camera);
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::graph::assemble;
    use cubescene_assets::TextureSource;

    #[test]
    fn debug_renderer_describes_scene() {
        let (scene, _) = assemble(&SceneConfig::default(), TextureSource::default());
        let camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::new();
        renderer.render(&scene, &camera).unwrap();

        let out = renderer.last_output();
        assert!(out.contains("background=#87ceeb"));
        assert!(out.contains("fov=35"));
        assert!(out.contains("light intensity=3.0"));
        assert!(out.contains("mesh cube"));
        assert!(out.contains("pending(https://"));
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = SceneRoot::new(cubescene_common::Color::BLACK);
        let out = DebugTextRenderer::describe(&scene, &PerspectiveCamera::default());
        assert!(out.contains("#000000"));
        assert!(!out.contains("mesh"));
    }
}
