//! GLSL-like source for the engine's four fixed pipelines (geometry, skybox,
//! composition, present). Compiled to SPIR-V once at `Engine::initialize`
//! time via [`crate::shader::compile_vertex_fragment`]; see §4.2/§4.7.

/// Set 0 binding 0: `mat4 view_proj` (the camera/global dynamic UBO, §4.9).
/// Push constant: `mat4 model` at offset 0, vertex stage (§4.8).
pub const GEOMETRY_VERTEX: &str = r#"
#version 450

layout(location = 0) in vec3 in_position;
layout(location = 1) in vec3 in_normal;
layout(location = 2) in vec2 in_uv;
layout(location = 3) in vec3 in_tangent;

layout(set = 0, binding = 0) uniform CameraUniform {
    mat4 view_proj;
} camera;

layout(push_constant) uniform PushConstants {
    mat4 model;
} pc;

layout(location = 0) out vec3 out_world_pos;
layout(location = 1) out vec3 out_normal;
layout(location = 2) out vec2 out_uv;

void main() {
    vec4 world_pos = pc.model * vec4(in_position, 1.0);
    out_world_pos = world_pos.xyz;
    out_normal = mat3(pc.model) * in_normal;
    out_uv = in_uv;
    gl_Position = camera.view_proj * world_pos;
}
"#;

/// Set 1: the per-mesh material set (`material_set_bindings`, §4.10), writes
/// the four G-buffer channels this pass owns (§4.7).
pub const GEOMETRY_FRAGMENT: &str = r#"
#version 450

layout(location = 0) in vec3 in_world_pos;
layout(location = 1) in vec3 in_normal;
layout(location = 2) in vec2 in_uv;

layout(set = 1, binding = 0) uniform sampler2D albedo_map;
layout(set = 1, binding = 2) uniform sampler2D specular_map;

layout(location = 0) out vec4 out_position;
layout(location = 1) out vec4 out_normal;
layout(location = 2) out vec4 out_albedo;
layout(location = 3) out float out_specular;

void main() {
    out_position = vec4(in_world_pos, 1.0);
    out_normal = vec4(normalize(in_normal), 0.0);
    out_albedo = texture(albedo_map, in_uv);
    out_specular = texture(specular_map, in_uv).r;
}
"#;

/// Fullscreen triangle generated from `gl_VertexIndex`, no vertex buffer
/// bound (§4.11 step 5: "draw three vertices from gl_VertexIndex").
pub const FULLSCREEN_TRIANGLE_VERTEX: &str = r#"
#version 450

layout(location = 0) out vec2 out_uv;

void main() {
    out_uv = vec2((gl_VertexIndex << 1) & 2, gl_VertexIndex & 2);
    gl_Position = vec4(out_uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// Set 0: the four G-buffer samplers plus the scene UBO (single region, not
/// dynamically offset, §4.11 step 2), in the field order `SceneUniform` packs
/// them so the std140 block matches the Rust struct byte-for-byte.
pub const COMPOSITION_FRAGMENT: &str = r#"
#version 450

layout(location = 0) in vec2 in_uv;

layout(set = 0, binding = 0) uniform sampler2D g_position;
layout(set = 0, binding = 1) uniform sampler2D g_normal;
layout(set = 0, binding = 2) uniform sampler2D g_albedo;
layout(set = 0, binding = 3) uniform sampler2D g_specular;

layout(set = 0, binding = 4) uniform SceneUniform {
    float ambient;
    float specular_strength;
    float specular_shininess;
    float _padding;
    vec3 camera_pos; float _pad_camera;
    vec3 sun_dir; float _pad_sun_dir;
    vec3 sun_pos; float _pad_sun_pos;
} scene;

layout(location = 0) out vec4 out_color;

void main() {
    vec3 position = texture(g_position, in_uv).rgb;
    vec3 normal = normalize(texture(g_normal, in_uv).rgb);
    vec3 albedo = texture(g_albedo, in_uv).rgb;
    float specular = texture(g_specular, in_uv).r;

    vec3 light_dir = normalize(-scene.sun_dir);
    float diffuse = max(dot(normal, light_dir), 0.0);

    vec3 view_dir = normalize(scene.camera_pos - position);
    vec3 half_dir = normalize(light_dir + view_dir);
    float spec = pow(max(dot(normal, half_dir), 0.0), scene.specular_shininess)
        * specular * scene.specular_strength;

    vec3 color = albedo * (scene.ambient + diffuse) + vec3(spec);
    out_color = vec4(color, 1.0);
}
"#;

/// Skybox pass: same vertex attributes and camera set as the geometry
/// pipeline, but writes straight to the composition pass's color output
/// instead of the G-buffer (§4.7 "Skybox" row).
pub const SKYBOX_VERTEX: &str = r#"
#version 450

layout(location = 0) in vec3 in_position;
layout(location = 1) in vec3 in_normal;
layout(location = 2) in vec2 in_uv;
layout(location = 3) in vec3 in_tangent;

layout(set = 0, binding = 0) uniform CameraUniform {
    mat4 view_proj;
} camera;

layout(push_constant) uniform PushConstants {
    mat4 model;
} pc;

layout(location = 0) out vec2 out_uv;

void main() {
    out_uv = in_uv;
    gl_Position = camera.view_proj * pc.model * vec4(in_position, 1.0);
}
"#;

pub const SKYBOX_FRAGMENT: &str = r#"
#version 450

layout(location = 0) in vec2 in_uv;

layout(set = 1, binding = 0) uniform sampler2D albedo_map;

layout(location = 0) out vec4 out_color;

void main() {
    out_color = texture(albedo_map, in_uv);
}
"#;

/// The final swapchain-writing pass: a fullscreen triangle sampling the
/// composed (and, if run, skybox-blended) offscreen color image. This is the
/// "swapchain copy" `CompositionPass`/`UiPass`'s doc comments anticipate, and
/// doubles as the attachment point for an external UI collaborator's own
/// draws (§6 "Window collaborator", §4.11 step 7).
pub const PRESENT_FRAGMENT: &str = r#"
#version 450

layout(location = 0) in vec2 in_uv;

layout(set = 0, binding = 0) uniform sampler2D composed;

layout(location = 0) out vec4 out_color;

void main() {
    out_color = texture(composed, in_uv);
}
"#;
