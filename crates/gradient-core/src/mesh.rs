use crate::geometry::PlaneGeometry;
use crate::gl::{ComponentType, DrawMode, GlBackend};
use crate::material::Material;
use crate::uniform::UniformSet;

/// One geometry drawn with one material.
///
/// Attribute locations are resolved once here; [`Mesh::draw`] reuses them.
pub struct Mesh<B: GlBackend> {
    geometry: PlaneGeometry<B>,
    material: Material<B>,
    pub wireframe: bool,
    attribute_locations: [Option<u32>; 4],
}

impl<B: GlBackend> Mesh<B> {
    pub fn new(gl: &B, geometry: PlaneGeometry<B>, material: Material<B>) -> Self {
        let mut attribute_locations = [None; 4];
        for (slot, (name, attribute)) in attribute_locations.iter_mut().zip(geometry.named_attributes()) {
            *slot = attribute.attach(gl, name, material.program());
        }
        log::trace!("Mesh.new locations={:?}", attribute_locations);
        Self {
            geometry,
            material,
            wireframe: false,
            attribute_locations,
        }
    }

    pub fn geometry(&self) -> &PlaneGeometry<B> {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut PlaneGeometry<B> {
        &mut self.geometry
    }

    pub fn material(&self) -> &Material<B> {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material<B> {
        &mut self.material
    }

    pub fn attribute_locations(&self) -> &[Option<u32>; 4] {
        &self.attribute_locations
    }

    /// Splits the mesh back into its parts, e.g. to pair the geometry with a
    /// rebuilt material.
    pub fn into_parts(self) -> (PlaneGeometry<B>, Material<B>) {
        (self.geometry, self.material)
    }

    pub fn dispose(self, gl: &B) {
        self.geometry.dispose(gl);
        self.material.dispose(gl);
    }

    /// Binds the program, uploads uniforms, binds attributes, then issues the
    /// indexed draw.
    pub fn draw(&self, gl: &B, common: &UniformSet) {
        gl.use_program(Some(self.material.program()));
        self.material.upload_uniforms(gl, common);
        for ((_, attribute), location) in self
            .geometry
            .named_attributes()
            .into_iter()
            .zip(self.attribute_locations)
        {
            attribute.bind(gl, location);
        }
        let mode = if self.wireframe {
            DrawMode::Lines
        } else {
            DrawMode::Triangles
        };
        gl.draw_elements(mode, self.geometry.index_count() as i32, ComponentType::UnsignedShort, 0);
    }
}
