//! Shader program with generated uniform declarations.

use crate::error::GlError;
use crate::gl::{GlBackend, ShaderStage};
use crate::uniform::{UniformPath, UniformSet};

pub const PRECISION_PREAMBLE: &str = "precision highp float;";

/// Attributes every vertex stage receives from [`crate::geometry::PlaneGeometry`].
pub const VERTEX_ATTRIBUTES: &str = "attribute vec4 position;\nattribute vec2 uv;\nattribute vec2 uvNorm;";

/// Which uniform tree a binding reads from at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformScope {
    /// Context-wide uniforms owned by [`crate::minigl::MiniGl`].
    Common,
    /// Uniforms owned by the material itself.
    Material,
}

/// One leaf uniform and the location it resolved to at link time.
pub struct UniformBinding<B: GlBackend> {
    pub name: String,
    pub scope: UniformScope,
    path: UniformPath,
    location: Option<B::UniformLocation>,
}

impl<B: GlBackend> UniformBinding<B> {
    pub fn location(&self) -> Option<&B::UniformLocation> {
        self.location.as_ref()
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

pub struct Material<B: GlBackend> {
    uniforms: UniformSet,
    bindings: Vec<UniformBinding<B>>,
    vertex_source: String,
    fragment_source: String,
    program: B::Program,
    vertex_shader: B::Shader,
    fragment_shader: B::Shader,
}

impl<B: GlBackend> Material<B> {
    /// Compiles and links `vertex_body` / `fragment_body` with declarations for
    /// `common` and `uniforms` prepended, then resolves every leaf location.
    ///
    /// Compile failures are logged with their info log; the program failing to
    /// link is returned as [`GlError::Link`].
    pub fn new(
        gl: &B,
        common: &UniformSet,
        vertex_body: &str,
        fragment_body: &str,
        uniforms: UniformSet,
    ) -> Result<Self, GlError> {
        let vertex_source = format!(
            "{PRECISION_PREAMBLE}\n{VERTEX_ATTRIBUTES}\n{}\n{}\n{vertex_body}\n",
            common.declarations(ShaderStage::Vertex),
            uniforms.declarations(ShaderStage::Vertex),
        );
        let fragment_source = format!(
            "{PRECISION_PREAMBLE}\n{}\n{}\n{fragment_body}\n",
            common.declarations(ShaderStage::Fragment),
            uniforms.declarations(ShaderStage::Fragment),
        );

        let mut compile_logs = Vec::new();
        let vertex_shader = compile(gl, ShaderStage::Vertex, &vertex_source, &mut compile_logs)?;
        let fragment_shader = compile(gl, ShaderStage::Fragment, &fragment_source, &mut compile_logs)?;

        let program = gl.create_program().ok_or(GlError::CreateProgram)?;
        gl.attach_shader(&program, &vertex_shader);
        gl.attach_shader(&program, &fragment_shader);
        gl.link_program(&program);
        if !gl.program_linked(&program) {
            let mut log = gl.program_info_log(&program).unwrap_or_default();
            for entry in compile_logs {
                log.push('\n');
                log.push_str(&entry);
            }
            log::error!("program link failed: {}", log);
            gl.delete_program(&program);
            gl.delete_shader(&vertex_shader);
            gl.delete_shader(&fragment_shader);
            return Err(GlError::Link { log });
        }
        gl.use_program(Some(&program));

        let mut bindings = attach_uniforms(gl, &program, common, UniformScope::Common);
        bindings.extend(attach_uniforms(gl, &program, &uniforms, UniformScope::Material));
        log::trace!("Material.attachUniforms bound {} leaves", bindings.len());

        Ok(Self {
            uniforms,
            bindings,
            vertex_source,
            fragment_source,
            program,
            vertex_shader,
            fragment_shader,
        })
    }

    /// Frees the program and both shaders.
    pub fn dispose(self, gl: &B) {
        gl.delete_program(&self.program);
        gl.delete_shader(&self.vertex_shader);
        gl.delete_shader(&self.fragment_shader);
    }

    pub fn uniforms(&self) -> &UniformSet {
        &self.uniforms
    }

    /// Mutable access for in-place value changes. Adding or removing uniforms
    /// here does not re-link; build a new material for that.
    pub fn uniforms_mut(&mut self) -> &mut UniformSet {
        &mut self.uniforms
    }

    pub fn program(&self) -> &B::Program {
        &self.program
    }

    pub fn shader(&self, stage: ShaderStage) -> &B::Shader {
        match stage {
            ShaderStage::Vertex => &self.vertex_shader,
            ShaderStage::Fragment => &self.fragment_shader,
        }
    }

    pub fn bindings(&self) -> &[UniformBinding<B>] {
        &self.bindings
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// Uploads every bound leaf. Unresolved locations are skipped.
    pub fn upload_uniforms(&self, gl: &B, common: &UniformSet) {
        for binding in &self.bindings {
            let Some(location) = &binding.location else {
                continue;
            };
            let tree = match binding.scope {
                UniformScope::Common => common,
                UniformScope::Material => &self.uniforms,
            };
            if let Some(leaf) = tree.leaf(&binding.path) {
                leaf.upload(gl, location);
            }
        }
    }
}

fn compile<B: GlBackend>(
    gl: &B,
    stage: ShaderStage,
    source: &str,
    logs: &mut Vec<String>,
) -> Result<B::Shader, GlError> {
    let shader = gl.create_shader(stage).ok_or(GlError::CreateShader(stage))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if !gl.shader_compiled(&shader) {
        let info = gl.shader_info_log(&shader).unwrap_or_default();
        log::error!("{} shader failed to compile: {}", stage, info);
        logs.push(format!("{stage}: {info}"));
    }
    log::trace!("Material.compileShaderSource {} ({} bytes)", stage, source.len());
    Ok(shader)
}

fn attach_uniforms<B: GlBackend>(
    gl: &B,
    program: &B::Program,
    uniforms: &UniformSet,
    scope: UniformScope,
) -> Vec<UniformBinding<B>> {
    uniforms
        .leaf_bindings()
        .into_iter()
        .map(|(name, path)| {
            let location = gl.uniform_location(program, &name);
            if location.is_none() {
                log::debug!("uniform `{}` is not active in the program", name);
            }
            UniformBinding {
                name,
                scope,
                path,
                location,
            }
        })
        .collect()
}
