use bytemuck::{Pod, Zeroable};
use cubescene_scene::BoxGeometry;
use glam::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };
}

/// One face: outward normal plus the axes spanning it, chosen so that
/// `right × up == normal` and the corners wind counter-clockwise seen from
/// outside.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
];

/// Texture coordinates for bottom-left, bottom-right, top-right, top-left.
/// Image rows run top to bottom, so v is flipped.
const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

/// Vertices and indices for a box, one texture copy per face.
pub(crate) fn box_mesh(geometry: &BoxGeometry) -> (Vec<Vertex>, Vec<u16>) {
    let half = geometry.half_extents();
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, right, up) in FACES {
        let base = vertices.len() as u16;
        let corners = [-right - up, right - up, right + up, -right + up];
        for (corner, uv) in corners.iter().zip(CORNER_UVS) {
            let position = (normal + *corner) * half;
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_counts() {
        let (v, i) = box_mesh(&BoxGeometry::new(2.0, 2.0, 2.0));
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn positions_on_box_surface() {
        let (v, _) = box_mesh(&BoxGeometry::new(2.0, 4.0, 6.0));
        for vert in &v {
            let p = Vec3::from(vert.position);
            assert_eq!(p.abs(), Vec3::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn faces_wind_outward() {
        let (v, i) = box_mesh(&BoxGeometry::new(2.0, 2.0, 2.0));
        for tri in i.chunks(3) {
            let a = Vec3::from(v[tri[0] as usize].position);
            let b = Vec3::from(v[tri[1] as usize].position);
            let c = Vec3::from(v[tri[2] as usize].position);
            let face_normal = (b - a).cross(c - a).normalize();
            let n = Vec3::from(v[tri[0] as usize].normal);
            assert!((face_normal - n).length() < 1e-5, "{face_normal} vs {n}");
        }
    }

    #[test]
    fn uvs_cover_unit_square() {
        let (v, _) = box_mesh(&BoxGeometry::new(1.0, 1.0, 1.0));
        for face in v.chunks(4) {
            let uvs: Vec<[f32; 2]> = face.iter().map(|x| x.uv).collect();
            assert_eq!(uvs, CORNER_UVS.to_vec());
        }
    }
}
