//! GLSL bodies. Uniform and attribute declarations are generated by
//! [`crate::material::Material`] and prepended at compile time.

pub static NOISE_GLSL: &str = include_str!("../shaders/noise.glsl");
pub static BLEND_GLSL: &str = include_str!("../shaders/blend.glsl");
pub static VERTEX_GLSL: &str = include_str!("../shaders/vertex.glsl");
pub static FRAGMENT_GLSL: &str = include_str!("../shaders/fragment.glsl");

/// Noise and blend helpers followed by the vertex `main`.
pub fn vertex_body() -> String {
    [NOISE_GLSL, BLEND_GLSL, VERTEX_GLSL].join("\n\n")
}
