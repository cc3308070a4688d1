//! Thin GPU call surface used by the GL wrapper.
//!
//! [`GlBackend`] mirrors the subset of WebGL 1 the mesh gradient needs. The
//! browser front-end implements it for `web_sys::WebGlRenderingContext`;
//! host builds use [`RecordingGl`] from the `recording` module.

mod recording;

pub use recording::{GlCall, RecordedLocation, RecordingGl, UniformUpload};

use std::fmt;

/// Shader stage a uniform declaration or compiled shader belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    /// Per-vertex attribute data (`ARRAY_BUFFER`).
    Array,
    /// Triangle indices (`ELEMENT_ARRAY_BUFFER`).
    ElementArray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Float,
    UnsignedShort,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    Triangles,
    Lines,
}

/// Raw GPU operations, one method per WebGL entry point used.
///
/// Methods take `&self` like the browser context does; implementations that
/// need to track state use interior mutability.
pub trait GlBackend {
    type Shader;
    type Program;
    type Buffer;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn shader_compiled(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_linked(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn use_program(&self, program: Option<&Self::Program>);
    fn delete_program(&self, program: &Self::Program);

    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    /// Returns `-1` when the attribute is not active in `program`.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32;

    fn uniform1f(&self, location: &Self::UniformLocation, value: f32);
    fn uniform1i(&self, location: &Self::UniformLocation, value: i32);
    fn uniform2fv(&self, location: &Self::UniformLocation, value: &[f32; 2]);
    fn uniform3fv(&self, location: &Self::UniformLocation, value: &[f32; 3]);
    fn uniform4fv(&self, location: &Self::UniformLocation, value: &[f32; 4]);
    fn uniform_matrix4fv(&self, location: &Self::UniformLocation, transpose: bool, value: &[f32; 16]);

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>);
    fn delete_buffer(&self, buffer: &Self::Buffer);
    /// Uploads `data` to the buffer bound at `target` with `STATIC_DRAW` usage.
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        component: ComponentType,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    /// Resizes the drawing buffer (the canvas backing store on the web).
    fn set_drawing_buffer_size(&self, width: u32, height: u32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&self, depth: f32);
    /// Clears both the color and the depth buffer.
    fn clear(&self);
    fn draw_elements(&self, mode: DrawMode, count: i32, component: ComponentType, offset: i32);
}
