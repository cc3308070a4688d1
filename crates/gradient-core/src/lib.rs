//! WebGL mesh-gradient core: a small GL wrapper (typed uniform graph,
//! attribute buffers, plane geometry, materials, meshes) and the animation
//! controller that drives it. Everything here is target-independent; the
//! browser binding lives in the root crate.

pub mod attribute;
pub mod color;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod gl;
pub mod gradient;
pub mod material;
pub mod mesh;
pub mod minigl;
pub mod shaders;
pub mod uniform;

pub use color::{parse_color_array, parse_rgb_color, parse_rgba_color, Palette, Rgba};
pub use error::{ColorError, GeometryError, GlError, GradientError, UniformError};
pub use geometry::{Orientation, PlaneGeometry};
pub use gl::{GlBackend, RecordingGl, ShaderStage};
pub use gradient::{FrameOutcome, Gradient, GradientConfig, GradientOptions, GradientState};
pub use material::Material;
pub use mesh::Mesh;
pub use minigl::{MeshId, MiniGl, OrthographicCamera};
pub use uniform::{Uniform, UniformSet, UniformValue};
