/// WGSL shader for meshes: the ground, the sun and the plane.
///
/// `params.x` selects the shading: 0 lit, 1 unlit, 2 plane height shading.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    // xyz: unit vector towards the light, w: light intensity
    light_dir: vec4<f32>,
    // rgb: ambient light, w: glow time
    ambient: vec4<f32>,
    boundary_center: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) tint: vec4<f32>,
    @location(8) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) local_y: f32,
    @location(3) @interpolate(flat) mode: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = world_normal;
    out.color = vec4<f32>(vertex.color, 1.0) * instance.tint;
    out.local_y = vertex.position.y;
    out.mode = instance.params.x;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.mode > 1.5) {
        let brightness = smoothstep(-20.0, 20.0, in.local_y);
        return vec4<f32>(mix(vec3<f32>(0.2), vec3<f32>(1.0), brightness), 1.0);
    }
    if (in.mode > 0.5) {
        return in.color;
    }
    let n = normalize(in.world_normal);
    let diffuse = max(dot(n, uniforms.light_dir.xyz), 0.0) * uniforms.light_dir.w;
    let lighting = uniforms.ambient.rgb + vec3<f32>(diffuse);
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;

/// WGSL shader for line lists: flat-coloured airflow and the glowing
/// boundary box.
pub const LINE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
    ambient: vec4<f32>,
    boundary_center: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec3<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    out.local = vertex.position;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}

// Boundary vertices are relative to the box centre.
@vertex
fn vs_glow(vertex: LineVertex) -> LineOutput {
    let world = vertex.position + uniforms.boundary_center.xyz;
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.color = vertex.color;
    out.local = vertex.position;
    return out;
}

@fragment
fn fs_glow(in: LineOutput) -> @location(0) vec4<f32> {
    let time = uniforms.ambient.w;
    let wave = abs(sin(time * 0.3 + length(in.local.xy) * 0.0003));
    let color = mix(vec3<f32>(0.1, 0.2, 0.8), vec3<f32>(0.8, 0.1, 0.2), wave);
    return vec4<f32>(color, 0.3 + 0.2 * wave) * in.color;
}
"#;
