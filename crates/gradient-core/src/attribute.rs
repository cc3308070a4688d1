use crate::error::GlError;
use crate::gl::{BufferTarget, ComponentType, GlBackend};

/// CPU-side contents of an [`Attribute`].
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValues {
    Float(Vec<f32>),
    UnsignedShort(Vec<u16>),
}

impl AttributeValues {
    pub fn len(&self) -> usize {
        match self {
            AttributeValues::Float(v) => v.len(),
            AttributeValues::UnsignedShort(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            AttributeValues::Float(_) => ComponentType::Float,
            AttributeValues::UnsignedShort(_) => ComponentType::UnsignedShort,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            AttributeValues::Float(v) => Some(v),
            AttributeValues::UnsignedShort(_) => None,
        }
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match self {
            AttributeValues::UnsignedShort(v) => Some(v),
            AttributeValues::Float(_) => None,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeValues::Float(v) => bytemuck::cast_slice(v),
            AttributeValues::UnsignedShort(v) => bytemuck::cast_slice(v),
        }
    }
}

/// A vertex attribute or index list backed by one GPU buffer.
///
/// The buffer is created once; [`Attribute::update`] only re-uploads.
pub struct Attribute<B: GlBackend> {
    target: BufferTarget,
    size: usize,
    normalized: bool,
    buffer: B::Buffer,
    values: AttributeValues,
}

impl<B: GlBackend> Attribute<B> {
    pub fn new(gl: &B, target: BufferTarget, size: usize, component: ComponentType) -> Result<Self, GlError> {
        let buffer = gl.create_buffer().ok_or(GlError::CreateBuffer)?;
        let values = match component {
            ComponentType::Float => AttributeValues::Float(Vec::new()),
            ComponentType::UnsignedShort => AttributeValues::UnsignedShort(Vec::new()),
        };
        Ok(Self {
            target,
            size,
            normalized: false,
            buffer,
            values,
        })
    }

    pub fn dispose(self, gl: &B) {
        gl.delete_buffer(&self.buffer);
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn component_type(&self) -> ComponentType {
        self.values.component_type()
    }

    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Replaces the CPU values and uploads them.
    pub fn set_values(&mut self, gl: &B, values: AttributeValues) -> Result<(), GlError> {
        if values.len() % self.size != 0 {
            return Err(GlError::AttributeLength {
                len: values.len(),
                size: self.size,
            });
        }
        self.values = values;
        self.update(gl);
        Ok(())
    }

    /// Float storage resized to `len`, reusing the allocation when it already
    /// has that length. `None` for index attributes.
    pub(crate) fn float_storage(&mut self, len: usize) -> Option<&mut Vec<f32>> {
        match &mut self.values {
            AttributeValues::Float(v) => {
                if v.len() != len {
                    *v = vec![0.0; len];
                }
                Some(v)
            }
            AttributeValues::UnsignedShort(_) => None,
        }
    }

    /// Pushes the current values to the GPU. Nothing to do while empty.
    pub fn update(&self, gl: &B) {
        if self.values.is_empty() {
            return;
        }
        gl.bind_buffer(self.target, Some(&self.buffer));
        gl.buffer_data(self.target, self.values.as_bytes());
    }

    /// Resolves `name` in `program` and points it at this buffer.
    /// Index buffers and inactive attributes yield `None`.
    pub fn attach(&self, gl: &B, name: &str, program: &B::Program) -> Option<u32> {
        let location = u32::try_from(gl.attrib_location(program, name)).ok();
        if self.target == BufferTarget::Array {
            if let Some(index) = location {
                gl.bind_buffer(self.target, Some(&self.buffer));
                self.point(gl, index);
            }
        }
        location
    }

    /// Binds the buffer for drawing; vertex attributes also re-point `location`.
    pub fn bind(&self, gl: &B, location: Option<u32>) {
        gl.bind_buffer(self.target, Some(&self.buffer));
        if let (BufferTarget::Array, Some(index)) = (self.target, location) {
            self.point(gl, index);
        }
    }

    fn point(&self, gl: &B, index: u32) {
        gl.enable_vertex_attrib_array(index);
        gl.vertex_attrib_pointer(
            index,
            self.size as i32,
            self.values.component_type(),
            self.normalized,
            0,
            0,
        );
    }
}
