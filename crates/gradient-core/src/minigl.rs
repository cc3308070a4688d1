//! GL context owner: canvas sizing, common uniforms, projection and the
//! registry of meshes drawn by [`MiniGl::render`].

use crate::error::{GlError, GradientError};
use crate::geometry::{Orientation, PlaneGeometry};
use crate::gl::GlBackend;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::uniform::{Uniform, UniformSet, UniformValue};
use glam::Mat4;
use instant::Instant;
use std::fmt;
use std::time::Duration;

/// Gap after which the debug trace prints a `---` separator.
const DEBUG_SEPARATOR_GAP: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

/// Parameters of the orthographic projection. `left`, `right` and `top` land
/// in the translation column of the matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            near: -2000.0,
            far: 2000.0,
        }
    }
}

impl OrthographicCamera {
    pub fn projection(&self, width: u32, height: u32) -> Mat4 {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        Mat4::from_cols_array(&[
            2.0 / w,
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / h,
            0.0,
            0.0,
            0.0,
            0.0,
            2.0 / (self.near - self.far),
            0.0,
            self.left,
            self.right,
            self.top,
            1.0,
        ])
    }
}

/// Opt-in trace of context operations, emitted as `log::debug!` records.
#[derive(Debug, Default)]
pub struct DebugLog {
    enabled: bool,
    last: Option<Instant>,
}

impl DebugLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn trace(&mut self, label: &str, details: impl fmt::Debug) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        if self.last.map_or(true, |last| now.duration_since(last) > DEBUG_SEPARATOR_GAP) {
            log::debug!("---");
        }
        log::debug!("{:>32}: {:?}", label, details);
        self.last = Some(now);
    }
}

pub struct MiniGl<B: GlBackend> {
    gl: B,
    meshes: Vec<(MeshId, Mesh<B>)>,
    next_mesh: u32,
    width: u32,
    height: u32,
    common: UniformSet,
    debug: DebugLog,
}

impl<B: GlBackend> MiniGl<B> {
    pub fn new(gl: B, debug: bool) -> Self {
        let identity = Mat4::IDENTITY.to_cols_array();
        let common = UniformSet::new()
            .with("projectionMatrix", Uniform::mat4(identity))
            .with("modelViewMatrix", Uniform::mat4(identity))
            .with("resolution", Uniform::vec2([1.0, 1.0]))
            .with("aspectRatio", Uniform::float(1.0));
        Self {
            gl,
            meshes: Vec::new(),
            next_mesh: 0,
            width: 0,
            height: 0,
            common,
            debug: DebugLog::new(debug),
        }
    }

    pub fn gl(&self) -> &B {
        &self.gl
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Uniforms declared in and bound to every material of this context.
    pub fn common_uniforms(&self) -> &UniformSet {
        &self.common
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.gl.set_drawing_buffer_size(width, height);
        self.gl.viewport(0, 0, width as i32, height as i32);
        self.set_common("resolution", UniformValue::Vec2([width as f32, height as f32]));
        self.set_common(
            "aspectRatio",
            UniformValue::Float(width as f32 / height.max(1) as f32),
        );
        self.debug.trace("MiniGl.setSize", (width, height));
    }

    pub fn set_orthographic_camera(&mut self, camera: OrthographicCamera) {
        let projection = camera.projection(self.width, self.height).to_cols_array();
        self.set_common(
            "projectionMatrix",
            UniformValue::Mat4 {
                value: projection,
                transpose: false,
            },
        );
        self.debug.trace("MiniGl.setOrthographicCamera", projection);
    }

    pub fn set_model_view(&mut self, model_view: Mat4) {
        self.set_common(
            "modelViewMatrix",
            UniformValue::Mat4 {
                value: model_view.to_cols_array(),
                transpose: false,
            },
        );
    }

    fn set_common(&mut self, name: &str, value: UniformValue) {
        if let Some(uniform) = self.common.get_mut(name) {
            uniform.set(value);
        }
    }

    pub fn create_material(
        &mut self,
        vertex_body: &str,
        fragment_body: &str,
        uniforms: UniformSet,
    ) -> Result<Material<B>, GlError> {
        let material = Material::new(&self.gl, &self.common, vertex_body, fragment_body, uniforms)?;
        self.debug.trace("Material.new", material.bindings().len());
        Ok(material)
    }

    pub fn create_plane_geometry(
        &mut self,
        width: f32,
        height: f32,
        x_seg_count: usize,
        y_seg_count: usize,
        orientation: Orientation,
    ) -> Result<PlaneGeometry<B>, GradientError> {
        let geometry = PlaneGeometry::new(&self.gl, width, height, x_seg_count, y_seg_count, orientation)?;
        self.debug
            .trace("PlaneGeometry.new", (x_seg_count, y_seg_count, width, height));
        Ok(geometry)
    }

    /// Builds a mesh and registers it for drawing.
    pub fn add_mesh(&mut self, geometry: PlaneGeometry<B>, material: Material<B>) -> MeshId {
        let mesh = Mesh::new(&self.gl, geometry, material);
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.push((id, mesh));
        self.debug.trace("Mesh.new", id);
        id
    }

    /// Unregisters a mesh and hands it back.
    pub fn remove_mesh(&mut self, id: MeshId) -> Option<Mesh<B>> {
        let pos = self.meshes.iter().position(|(mesh_id, _)| *mesh_id == id)?;
        Some(self.meshes.remove(pos).1)
    }

    /// Unregisters a mesh and frees its buffers and program. Returns false
    /// for an unknown id.
    pub fn dispose_mesh(&mut self, id: MeshId) -> bool {
        match self.remove_mesh(id) {
            Some(mesh) => {
                mesh.dispose(&self.gl);
                self.debug.trace("Mesh.dispose", id);
                true
            }
            None => false,
        }
    }

    /// Frees every registered mesh.
    pub fn dispose(&mut self) {
        for (_, mesh) in self.meshes.drain(..) {
            mesh.dispose(&self.gl);
        }
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh<B>> {
        self.meshes.iter().find(|(mesh_id, _)| *mesh_id == id).map(|(_, m)| m)
    }

    /// The backend together with a registered mesh, for operations that need
    /// both (re-tessellation, buffer updates).
    pub fn mesh_mut(&mut self, id: MeshId) -> Option<(&B, &mut Mesh<B>)> {
        let gl = &self.gl;
        self.meshes
            .iter_mut()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, m)| (gl, m))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Clears color and depth, then draws every mesh in registration order.
    pub fn render(&self) {
        self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
        self.gl.clear_depth(1.0);
        self.gl.clear();
        for (_, mesh) in &self.meshes {
            mesh.draw(&self.gl, &self.common);
        }
    }
}
