use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::graph::{self, MeshId, SceneRoot, TextureSlot};
use crate::viewport::{DrawingSurface, SurfaceSize, SyncOutcome, ViewportBinding};
use cubescene_assets::{PendingTexture, TextureLoader};
use cubescene_common::{SceneId, Transform};
use glam::Vec3;
use std::sync::Arc;

/// How a pending texture resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureOutcome {
    Applied,
    FellBack(String),
}

/// Everything one scene instance needs: scene graph, camera, viewport
/// binding and the in-flight texture load.
#[derive(Debug)]
pub struct SceneContext {
    id: SceneId,
    scene: SceneRoot,
    camera: PerspectiveCamera,
    viewport: ViewportBinding,
    animated: MeshId,
    pending: Option<PendingTexture>,
}

impl SceneContext {
    /// Assemble the scene around an already-started texture load and size the
    /// camera and drawing surface to the host.
    pub fn new<S: DrawingSurface + ?Sized>(
        config: &SceneConfig,
        texture: PendingTexture,
        host: SurfaceSize,
        surface: &mut S,
    ) -> Self {
        let id = SceneId::new();
        let _span = tracing::info_span!("scene_init", scene = %id.short()).entered();

        let (scene, animated) = graph::assemble(config, texture.source().clone());
        let mut camera =
            PerspectiveCamera::from_settings(&config.camera, config.viewport.fallback_aspect);
        let mut viewport = ViewportBinding::new(config.viewport.fallback_aspect);
        viewport.sync(host, &mut camera, surface);

        tracing::info!(
            width = host.width,
            height = host.height,
            aspect = camera.aspect(),
            "scene ready"
        );

        Self {
            id,
            scene,
            camera,
            viewport,
            animated,
            pending: Some(texture),
        }
    }

    /// Start loading the configured texture and build the scene.
    pub fn load<S: DrawingSurface + ?Sized>(
        config: &SceneConfig,
        loader: &TextureLoader,
        host: SurfaceSize,
        surface: &mut S,
    ) -> Self {
        let texture = loader.load(config.material.texture.clone());
        Self::new(config, texture, host, surface)
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn scene(&self) -> &SceneRoot {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> &ViewportBinding {
        &self.viewport
    }

    /// Host resize event handler.
    pub fn resize<S: DrawingSurface + ?Sized>(
        &mut self,
        host: SurfaceSize,
        surface: &mut S,
    ) -> SyncOutcome {
        self.viewport.sync(host, &mut self.camera, surface)
    }

    /// Transform of the spinning mesh.
    pub fn animated_transform(&self) -> Option<&Transform> {
        self.scene.mesh(self.animated).map(|m| &m.transform)
    }

    /// Write the frame loop's rotation into the spinning mesh.
    pub fn set_rotation(&mut self, euler: Vec3) {
        if let Some(mesh) = self.scene.mesh_mut(self.animated) {
            mesh.transform.set_euler_xyz(euler);
        }
    }

    /// True while the texture load has not reported back.
    pub fn texture_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Check the in-flight texture load without blocking. On success the
    /// color map is installed; on failure the material falls back to its
    /// plain color and a warning is logged.
    pub fn poll_assets(&mut self) -> Option<TextureOutcome> {
        let result = self.pending.as_ref()?.try_take()?;
        let source = self.pending.take().map(|p| p.source().to_string());

        let (slot, outcome) = match result {
            Ok(texture) => {
                tracing::info!(
                    scene = %self.id.short(),
                    label = %texture.label,
                    width = texture.width,
                    height = texture.height,
                    "texture ready"
                );
                (TextureSlot::Ready(Arc::new(texture)), TextureOutcome::Applied)
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(
                    scene = %self.id.short(),
                    source = source.as_deref().unwrap_or("<unknown>"),
                    "texture load failed, using fallback material: {reason}"
                );
                (
                    TextureSlot::Fallback {
                        reason: reason.clone(),
                    },
                    TextureOutcome::FellBack(reason),
                )
            }
        };

        if let Some(mesh) = self.scene.mesh_mut(self.animated) {
            mesh.material.map = slot;
        }
        Some(outcome)
    }
}
