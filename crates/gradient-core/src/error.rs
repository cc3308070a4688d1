use crate::gl::ShaderStage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlError {
    #[error("failed to create {0} shader")]
    CreateShader(ShaderStage),
    #[error("failed to create program")]
    CreateProgram,
    #[error("failed to create buffer")]
    CreateBuffer,
    #[error("program failed to link: {log}")]
    Link { log: String },
    #[error("attribute holds {len} values, not a multiple of component size {size}")]
    AttributeLength { len: usize, size: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UniformError {
    #[error("uniform array `{name}` has no elements")]
    EmptyArray { name: String },
    #[error("uniform array `{name}` mixes `{expected}` and `{found}` elements")]
    MixedArray {
        name: String,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("segment counts must be at least 1")]
    ZeroSegments,
    #[error("{count} vertices do not fit 16-bit indices")]
    TooManyVertices { count: usize },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("color list is empty")]
    Empty,
    #[error("color list holds {count} entries, at most 5 are supported")]
    TooMany { count: usize },
    #[error("`{input}` is not an rgb()/rgba() color")]
    Malformed { input: String },
    #[error("`{input}` has a component out of range")]
    OutOfRange { input: String },
    #[error("color {index}: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: Box<ColorError>,
    },
}

#[derive(Debug, Error)]
pub enum GradientError {
    #[error("gradient is not connected to a GL context")]
    NotConnected,
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Uniform(#[from] UniformError),
}
