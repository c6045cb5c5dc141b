/// WGSL shader for textured meshes lit by one directional light.
///
/// Texture and base color are in linear space: the color map uses an sRGB
/// texture format, so sampling decodes it, and the sRGB surface re-encodes
/// the output.
pub const MESH_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    to_light: vec4<f32>,
    light_color: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> object: Object;
@group(1) @binding(1)
var color_map: texture_2d<f32>;
@group(1) @binding(2)
var color_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (object.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(color_map, color_sampler, in.uv) * object.base_color;
    let diffuse = max(dot(normalize(in.world_normal), globals.to_light.xyz), 0.0);
    let lit = albedo.rgb * globals.light_color.rgb * diffuse;
    return vec4<f32>(lit, 1.0);
}
"#;
