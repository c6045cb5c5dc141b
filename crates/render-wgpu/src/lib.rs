//! wgpu render backend for the cube scene.
//!
//! Draws every scene mesh as a textured box lit by the scene's directional
//! light, over the scene background.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Color maps are uploaded as sRGB textures and rendered to an sRGB
//!   surface; there is no separate gamma step.
//! - A material without a ready texture draws its plain color.
//! - With antialiasing on, color and depth are rendered at 4 samples per
//!   pixel and resolved into the surface.

mod gpu;
mod mesh;
mod shaders;
mod surface;

pub use gpu::WgpuRenderer;
pub use surface::{GpuSurface, RenderError};

use cubescene_scene::{RenderSettings, SurfaceSize};

/// Open a GPU device for `target` and build a renderer, blocking until the
/// adapter and device are ready.
pub fn create_renderer(
    target: impl Into<wgpu::SurfaceTarget<'static>>,
    size: SurfaceSize,
    settings: &RenderSettings,
) -> Result<WgpuRenderer, RenderError> {
    let gpu = pollster::block_on(GpuSurface::new(target, size))?;
    Ok(WgpuRenderer::new(gpu, settings.antialias))
}
