//! Scene state for the spinning cube demo.
//!
//! Owns everything between the host (a window, or a headless test harness)
//! and the GPU backend: configuration, camera, viewport binding, the scene
//! graph, and the frame loop.
//!
//! # Invariants
//! - Camera aspect equals host width / height after every non-zero resize.
//! - Camera state never holds NaN or infinity, even for zero-area hosts.
//! - Each frame advances every rotation axis by exactly one fixed step.
//! - A failed texture load degrades the material; it never stops the loop.
//! - Renderers read the scene and never mutate it.

pub mod camera;
pub mod config;
pub mod context;
pub mod frame_loop;
pub mod graph;
pub mod headless;
pub mod renderer;
pub mod viewport;

pub use camera::{CameraConfig, PerspectiveCamera};
pub use config::{ConfigError, RenderSettings, SceneConfig};
pub use context::{SceneContext, TextureOutcome};
pub use frame_loop::{FrameLoop, FrameScheduler, FrameStatus, LoopHandle, RenderState};
pub use graph::{
    BoxGeometry, DirectionalLight, Mesh, MeshId, SceneRoot, StandardMaterial, TextureSlot,
};
pub use headless::{HeadlessSurface, ManualScheduler};
pub use renderer::{DebugTextRenderer, Renderer};
pub use viewport::{DrawingSurface, SurfaceSize, SyncOutcome, ViewportBinding, ViewportMetrics};

pub fn crate_info() -> &'static str {
    "cubescene-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
