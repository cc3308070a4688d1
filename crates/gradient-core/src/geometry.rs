use crate::attribute::{Attribute, AttributeValues};
use crate::error::{GeometryError, GradientError};
use crate::gl::{BufferTarget, ComponentType, GlBackend};

/// Largest vertex count addressable with 16-bit indices.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// World axes the 2D grid is laid onto: the grid's horizontal coordinate goes
/// to the first axis, the (negated) vertical coordinate to the second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    Xy,
    #[default]
    Xz,
    Yz,
}

impl Orientation {
    fn axes(self) -> (usize, usize) {
        match self {
            Orientation::Xy => (0, 1),
            Orientation::Xz => (0, 2),
            Orientation::Yz => (1, 2),
        }
    }
}

pub struct GeometryAttributes<B: GlBackend> {
    pub position: Attribute<B>,
    pub uv: Attribute<B>,
    pub uv_norm: Attribute<B>,
    pub index: Attribute<B>,
}

/// Subdivided rectangle centered on the origin.
pub struct PlaneGeometry<B: GlBackend> {
    attributes: GeometryAttributes<B>,
    x_seg_count: usize,
    y_seg_count: usize,
    vertex_count: usize,
    quad_count: usize,
    width: f32,
    height: f32,
    orientation: Orientation,
}

impl<B: GlBackend> PlaneGeometry<B> {
    pub fn new(
        gl: &B,
        width: f32,
        height: f32,
        x_seg_count: usize,
        y_seg_count: usize,
        orientation: Orientation,
    ) -> Result<Self, GradientError> {
        let attributes = GeometryAttributes {
            position: Attribute::new(gl, BufferTarget::Array, 3, ComponentType::Float)?,
            uv: Attribute::new(gl, BufferTarget::Array, 2, ComponentType::Float)?,
            uv_norm: Attribute::new(gl, BufferTarget::Array, 2, ComponentType::Float)?,
            index: Attribute::new(gl, BufferTarget::ElementArray, 3, ComponentType::UnsignedShort)?,
        };
        let mut geometry = Self {
            attributes,
            x_seg_count: 0,
            y_seg_count: 0,
            vertex_count: 0,
            quad_count: 0,
            width,
            height,
            orientation,
        };
        geometry.set_topology(gl, x_seg_count, y_seg_count)?;
        geometry.set_size(gl, width, height, orientation);
        Ok(geometry)
    }

    /// Frees all four attribute buffers.
    pub fn dispose(self, gl: &B) {
        let GeometryAttributes {
            position,
            uv,
            uv_norm,
            index,
        } = self.attributes;
        for attribute in [position, uv, uv_norm, index] {
            attribute.dispose(gl);
        }
    }

    pub fn x_seg_count(&self) -> usize {
        self.x_seg_count
    }

    pub fn y_seg_count(&self) -> usize {
        self.y_seg_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of triangles, two per grid cell.
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn attributes(&self) -> &GeometryAttributes<B> {
        &self.attributes
    }

    /// Attributes by the names the vertex shader declares them under.
    pub fn named_attributes(&self) -> [(&'static str, &Attribute<B>); 4] {
        [
            ("position", &self.attributes.position),
            ("uv", &self.attributes.uv),
            ("uvNorm", &self.attributes.uv_norm),
            ("index", &self.attributes.index),
        ]
    }

    pub fn index_count(&self) -> usize {
        self.attributes.index.values().len()
    }

    /// Rebuilds uv, normalized uv and index buffers for the given resolution.
    /// Positions are left alone; follow with [`PlaneGeometry::set_size`].
    pub fn set_topology(&mut self, gl: &B, x_seg_count: usize, y_seg_count: usize) -> Result<(), GradientError> {
        if x_seg_count == 0 || y_seg_count == 0 {
            return Err(GeometryError::ZeroSegments.into());
        }
        let vertex_count = (x_seg_count + 1) * (y_seg_count + 1);
        if vertex_count > MAX_VERTICES {
            return Err(GeometryError::TooManyVertices { count: vertex_count }.into());
        }
        self.x_seg_count = x_seg_count;
        self.y_seg_count = y_seg_count;
        self.vertex_count = vertex_count;
        self.quad_count = x_seg_count * y_seg_count * 2;

        let mut uv = vec![0.0f32; 2 * vertex_count];
        let mut uv_norm = vec![0.0f32; 2 * vertex_count];
        let mut index = vec![0u16; 3 * self.quad_count];
        let (xs, ys) = (x_seg_count as f32, y_seg_count as f32);
        for y in 0..=y_seg_count {
            for x in 0..=x_seg_count {
                let i = y * (x_seg_count + 1) + x;
                uv[2 * i] = x as f32 / xs;
                uv[2 * i + 1] = 1.0 - y as f32 / ys;
                uv_norm[2 * i] = x as f32 / xs * 2.0 - 1.0;
                uv_norm[2 * i + 1] = 1.0 - y as f32 / ys * 2.0;
                if x < x_seg_count && y < y_seg_count {
                    let cell = y * x_seg_count + x;
                    let below = i + 1 + x_seg_count;
                    // top-left, bottom-left, top-right / top-right, bottom-left, bottom-right
                    let corners = [i, below, i + 1, i + 1, below, below + 1];
                    for (k, v) in corners.into_iter().enumerate() {
                        index[6 * cell + k] = v as u16;
                    }
                }
            }
        }
        self.attributes.uv.set_values(gl, AttributeValues::Float(uv))?;
        self.attributes.uv_norm.set_values(gl, AttributeValues::Float(uv_norm))?;
        self.attributes.index.set_values(gl, AttributeValues::UnsignedShort(index))?;
        log::trace!(
            "Geometry.setTopology {}x{} vertices={}",
            x_seg_count,
            y_seg_count,
            vertex_count
        );
        Ok(())
    }

    /// Recomputes positions for a `width` x `height` plane laid onto the axes
    /// of `orientation`. The third axis stays zero.
    pub fn set_size(&mut self, gl: &B, width: f32, height: f32, orientation: Orientation) {
        self.width = width;
        self.height = height;
        self.orientation = orientation;
        let (x_seg_count, y_seg_count) = (self.x_seg_count, self.y_seg_count);
        let (first, second) = orientation.axes();
        let left = width / -2.0;
        let top = height / -2.0;
        let seg_width = width / x_seg_count as f32;
        let seg_height = height / y_seg_count as f32;
        if let Some(position) = self.attributes.position.float_storage(3 * self.vertex_count) {
            for y in 0..=y_seg_count {
                let py = top + y as f32 * seg_height;
                for x in 0..=x_seg_count {
                    let px = left + x as f32 * seg_width;
                    let base = 3 * (y * (x_seg_count + 1) + x);
                    let vertex = &mut position[base..base + 3];
                    vertex.fill(0.0);
                    vertex[first] = px;
                    vertex[second] = -py;
                }
            }
        }
        self.attributes.position.update(gl);
        log::trace!("Geometry.setSize {}x{} {:?}", width, height, orientation);
    }
}
