use crate::config::SceneConfig;
use cubescene_assets::{TextureData, TextureSource};
use cubescene_common::{Color, Transform};
use glam::Vec3;
use std::sync::Arc;

/// Light arriving from `position` towards `target`, like sunlight.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }
}

/// Axis-aligned box centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth) * 0.5
    }
}

/// State of a material's color map.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSlot {
    /// Still loading from the given source.
    Pending(TextureSource),
    Ready(Arc<TextureData>),
    /// The load failed; the material draws untextured.
    Fallback { reason: String },
}

/// Physically-flavoured surface: a color map over a base color.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub map: TextureSlot,
    /// Color drawn when the map is not ready.
    pub fallback_color: Color,
    pub anisotropy: u16,
}

impl StandardMaterial {
    pub fn texture(&self) -> Option<&Arc<TextureData>> {
        match &self.map {
            TextureSlot::Ready(tex) => Some(tex),
            _ => None,
        }
    }

    /// Base color multiplied with the map. White when textured, so the
    /// texture shows unaltered.
    pub fn base_color(&self) -> Color {
        match self.map {
            TextureSlot::Ready(_) => Color::WHITE,
            _ => self.fallback_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: BoxGeometry,
    pub material: StandardMaterial,
    pub transform: Transform,
}

/// Top-level container of everything that gets drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRoot {
    pub background: Color,
    lights: Vec<DirectionalLight>,
    meshes: Vec<Mesh>,
}

impl SceneRoot {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }

    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn lights(&self) -> &[DirectionalLight] {
        &self.lights
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }
}

/// Build the demo world: a white directional light and one textured box.
///
/// Runs once per scene. The box starts with a pending color map that the
/// frame loop resolves when the texture load finishes.
pub fn assemble(config: &SceneConfig, texture: TextureSource) -> (SceneRoot, MeshId) {
    let mut scene = SceneRoot::new(config.background);

    scene.add_light(DirectionalLight {
        color: config.light.color,
        intensity: config.light.intensity,
        position: config.light.position,
        target: Vec3::ZERO,
    });

    let cube = &config.cube;
    let mesh = scene.add_mesh(Mesh {
        name: "cube".into(),
        geometry: BoxGeometry::new(cube.width, cube.height, cube.depth),
        material: StandardMaterial {
            map: TextureSlot::Pending(texture),
            fallback_color: config.material.fallback_color,
            anisotropy: config.material.anisotropy,
        },
        transform: Transform::default(),
    });

    tracing::debug!(
        lights = scene.lights().len(),
        meshes = scene.meshes().len(),
        "scene assembled"
    );
    (scene, mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_one_light_one_mesh() {
        let config = SceneConfig::default();
        let (scene, id) = assemble(&config, TextureSource::default());

        assert_eq!(scene.background, Color::SKY_BLUE);
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.meshes().len(), 1);

        let light = &scene.lights()[0];
        assert_eq!(light.intensity, 3.0);
        assert_eq!(light.position, Vec3::new(10.0, 10.0, 10.0));

        let mesh = scene.mesh(id).unwrap();
        assert_eq!(mesh.geometry, BoxGeometry::new(2.0, 2.0, 2.0));
        assert!(matches!(mesh.material.map, TextureSlot::Pending(_)));
        assert_eq!(mesh.transform, Transform::default());
    }

    #[test]
    fn light_direction_is_normalized() {
        let light = DirectionalLight {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
        };
        let dir = light.to_light();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x > 0.0 && dir.y > 0.0 && dir.z > 0.0);
    }

    #[test]
    fn material_color_follows_slot() {
        let mut mat = StandardMaterial {
            map: TextureSlot::Pending(TextureSource::default()),
            fallback_color: Color::PURPLE,
            anisotropy: 16,
        };
        assert_eq!(mat.base_color(), Color::PURPLE);
        assert!(mat.texture().is_none());

        mat.map = TextureSlot::Ready(Arc::new(TextureData::solid("t", 1, 1, [9, 9, 9, 255])));
        assert_eq!(mat.base_color(), Color::WHITE);
        assert!(mat.texture().is_some());

        mat.map = TextureSlot::Fallback {
            reason: "404".into(),
        };
        assert_eq!(mat.base_color(), Color::PURPLE);
    }

    #[test]
    fn box_half_extents() {
        assert_eq!(
            BoxGeometry::new(2.0, 4.0, 6.0).half_extents(),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }
}
