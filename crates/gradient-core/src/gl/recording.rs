use super::{BufferTarget, ComponentType, DrawMode, GlBackend, ShaderStage};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};

/// A value handed to one of the `uniform*` entry points.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformUpload {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4 { transpose: bool, value: [f32; 16] },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CreateShader { id: u32, stage: ShaderStage },
    DeleteShader(u32),
    CompileShader { id: u32, ok: bool },
    CreateProgram { id: u32 },
    DeleteProgram(u32),
    LinkProgram { id: u32, ok: bool },
    UseProgram(Option<u32>),
    Uniform { name: String, value: UniformUpload },
    CreateBuffer { id: u32 },
    DeleteBuffer(u32),
    BindBuffer { target: BufferTarget, id: Option<u32> },
    BufferData { target: BufferTarget, bytes: usize },
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, component: ComponentType },
    SetDrawingBufferSize { width: u32, height: u32 },
    Viewport { width: i32, height: i32 },
    ClearColor([f32; 4]),
    ClearDepth(f32),
    Clear,
    DrawElements { mode: DrawMode, count: i32 },
}

/// Location handed out by [`RecordingGl`]; remembers the name it was resolved for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedLocation {
    pub program: u32,
    pub name: String,
}

#[derive(Default)]
struct ShaderRecord {
    stage: Option<ShaderStage>,
    source: String,
    compiled: bool,
}

#[derive(Default)]
struct ProgramRecord {
    shaders: SmallVec<[u32; 2]>,
    linked: bool,
    attributes: Vec<String>,
}

/// Headless [`GlBackend`] that hands out integer handles and records calls.
///
/// Uniform locations resolve only for names whose root identifier occurs in
/// one of the program's shader sources, and attribute locations follow the
/// order of `attribute` declarations in the vertex source, so mismatches
/// between generated declarations and binding names show up in tests.
#[derive(Default)]
pub struct RecordingGl {
    next_id: Cell<u32>,
    calls: RefCell<Vec<GlCall>>,
    shaders: RefCell<Vec<(u32, ShaderRecord)>>,
    programs: RefCell<Vec<(u32, ProgramRecord)>>,
    fail_compile: Cell<Option<ShaderStage>>,
    fail_link: Cell<bool>,
    live: RefCell<LiveObjects>,
}

/// GPU objects created minus those deleted; unaffected by `clear_calls`.
#[derive(Default)]
struct LiveObjects {
    shaders: usize,
    programs: usize,
    buffers: usize,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent compile of `stage` fail.
    pub fn fail_compile(&self, stage: ShaderStage) {
        self.fail_compile.set(Some(stage));
    }

    /// Makes every subsequent link fail even if both stages compiled.
    pub fn fail_link(&self) {
        self.fail_link.set(true);
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements { .. }))
            .count()
    }

    pub fn buffers_created(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, GlCall::CreateBuffer { .. }))
            .count()
    }

    /// Programs created and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.live.borrow().programs
    }

    pub fn live_shaders(&self) -> usize {
        self.live.borrow().shaders
    }

    pub fn live_buffers(&self) -> usize {
        self.live.borrow().buffers
    }

    /// All values uploaded for the uniform bound as `name`, oldest first.
    pub fn uniform_uploads(&self, name: &str) -> Vec<UniformUpload> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                GlCall::Uniform { name: n, value } if n == name => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_uniform(&self, name: &str) -> Option<UniformUpload> {
        self.uniform_uploads(name).pop()
    }

    /// Source most recently handed to a shader of `stage`.
    pub fn last_source(&self, stage: ShaderStage) -> Option<String> {
        self.shaders
            .borrow()
            .iter()
            .rev()
            .find(|(_, s)| s.stage == Some(stage))
            .map(|(_, s)| s.source.clone())
    }

    fn alloc(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn program_sources(&self, program: u32) -> Vec<String> {
        let programs = self.programs.borrow();
        let shaders = self.shaders.borrow();
        programs
            .iter()
            .find(|(id, _)| *id == program)
            .map(|(_, p)| {
                p.shaders
                    .iter()
                    .filter_map(|sid| shaders.iter().find(|(id, _)| id == sid))
                    .map(|(_, s)| s.source.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn root_identifier(name: &str) -> &str {
    let end = name.find(['.', '[']).unwrap_or(name.len());
    &name[..end]
}

fn attribute_names(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("attribute "))
        .filter_map(|rest| rest.trim_end_matches(';').split_whitespace().nth(1))
        .map(str::to_owned)
        .collect()
}

fn contains_identifier(source: &str, ident: &str) -> bool {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word == ident)
}

impl GlBackend for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type UniformLocation = RecordedLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<u32> {
        let id = self.alloc();
        self.shaders.borrow_mut().push((
            id,
            ShaderRecord {
                stage: Some(stage),
                ..ShaderRecord::default()
            },
        ));
        self.live.borrow_mut().shaders += 1;
        self.record(GlCall::CreateShader { id, stage });
        Some(id)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        if let Some((_, s)) = self.shaders.borrow_mut().iter_mut().find(|(id, _)| id == shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: &u32) {
        let mut ok = false;
        if let Some((_, s)) = self.shaders.borrow_mut().iter_mut().find(|(id, _)| id == shader) {
            s.compiled = s.stage != self.fail_compile.get() && !s.source.is_empty();
            ok = s.compiled;
        }
        self.record(GlCall::CompileShader { id: *shader, ok });
    }

    fn shader_compiled(&self, shader: &u32) -> bool {
        self.shaders
            .borrow()
            .iter()
            .find(|(id, _)| id == shader)
            .map(|(_, s)| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &u32) -> Option<String> {
        (!self.shader_compiled(shader)).then(|| format!("ERROR: 0:1: shader {shader} rejected"))
    }

    fn delete_shader(&self, shader: &u32) {
        let mut live = self.live.borrow_mut();
        live.shaders = live.shaders.saturating_sub(1);
        self.record(GlCall::DeleteShader(*shader));
    }

    fn create_program(&self) -> Option<u32> {
        let id = self.alloc();
        self.programs.borrow_mut().push((id, ProgramRecord::default()));
        self.live.borrow_mut().programs += 1;
        self.record(GlCall::CreateProgram { id });
        Some(id)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        if let Some((_, p)) = self.programs.borrow_mut().iter_mut().find(|(id, _)| id == program) {
            p.shaders.push(*shader);
        }
    }

    fn link_program(&self, program: &u32) {
        let (all_compiled, attributes) = {
            let shaders = self.shaders.borrow();
            let programs = self.programs.borrow();
            let attached = programs
                .iter()
                .find(|(id, _)| id == program)
                .map(|(_, p)| p.shaders.clone())
                .unwrap_or_default();
            let records: Vec<&ShaderRecord> = attached
                .iter()
                .filter_map(|sid| shaders.iter().find(|(id, _)| id == sid).map(|(_, s)| s))
                .collect();
            let attributes = records
                .iter()
                .filter(|s| s.stage == Some(ShaderStage::Vertex))
                .flat_map(|s| attribute_names(&s.source))
                .collect::<Vec<_>>();
            (records.len() == 2 && records.iter().all(|s| s.compiled), attributes)
        };
        let ok = all_compiled && !self.fail_link.get();
        if let Some((_, p)) = self.programs.borrow_mut().iter_mut().find(|(id, _)| id == program) {
            p.linked = ok;
            p.attributes = attributes;
        }
        self.record(GlCall::LinkProgram { id: *program, ok });
    }

    fn program_linked(&self, program: &u32) -> bool {
        self.programs
            .borrow()
            .iter()
            .find(|(id, _)| id == program)
            .map(|(_, p)| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &u32) -> Option<String> {
        (!self.program_linked(program)).then(|| format!("program {program} failed to link"))
    }

    fn use_program(&self, program: Option<&u32>) {
        self.record(GlCall::UseProgram(program.copied()));
    }

    fn delete_program(&self, program: &u32) {
        if let Some((_, p)) = self.programs.borrow_mut().iter_mut().find(|(id, _)| id == program) {
            p.linked = false;
        }
        let mut live = self.live.borrow_mut();
        live.programs = live.programs.saturating_sub(1);
        self.record(GlCall::DeleteProgram(*program));
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<RecordedLocation> {
        if !self.program_linked(program) {
            return None;
        }
        let root = root_identifier(name);
        self.program_sources(*program)
            .iter()
            .any(|src| contains_identifier(src, root))
            .then(|| RecordedLocation {
                program: *program,
                name: name.to_owned(),
            })
    }

    fn attrib_location(&self, program: &u32, name: &str) -> i32 {
        self.programs
            .borrow()
            .iter()
            .find(|(id, _)| id == program)
            .and_then(|(_, p)| p.attributes.iter().position(|a| a == name))
            .map(|i| i as i32)
            .unwrap_or(-1)
    }

    fn uniform1f(&self, location: &RecordedLocation, value: f32) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value: UniformUpload::Float(value),
        });
    }

    fn uniform1i(&self, location: &RecordedLocation, value: i32) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value: UniformUpload::Int(value),
        });
    }

    fn uniform2fv(&self, location: &RecordedLocation, value: &[f32; 2]) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value: UniformUpload::Vec2(*value),
        });
    }

    fn uniform3fv(&self, location: &RecordedLocation, value: &[f32; 3]) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value: UniformUpload::Vec3(*value),
        });
    }

    fn uniform4fv(&self, location: &RecordedLocation, value: &[f32; 4]) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value: UniformUpload::Vec4(*value),
        });
    }

    fn uniform_matrix4fv(&self, location: &RecordedLocation, transpose: bool, value: &[f32; 16]) {
        self.record(GlCall::Uniform {
            name: location.name.clone(),
            value: UniformUpload::Mat4 {
                transpose,
                value: *value,
            },
        });
    }

    fn create_buffer(&self) -> Option<u32> {
        let id = self.alloc();
        self.live.borrow_mut().buffers += 1;
        self.record(GlCall::CreateBuffer { id });
        Some(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&u32>) {
        self.record(GlCall::BindBuffer {
            target,
            id: buffer.copied(),
        });
    }

    fn delete_buffer(&self, buffer: &u32) {
        let mut live = self.live.borrow_mut();
        live.buffers = live.buffers.saturating_sub(1);
        self.record(GlCall::DeleteBuffer(*buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record(GlCall::BufferData {
            target,
            bytes: data.len(),
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        component: ComponentType,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            component,
        });
    }

    fn set_drawing_buffer_size(&self, width: u32, height: u32) {
        self.record(GlCall::SetDrawingBufferSize { width, height });
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport { width, height });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear_depth(&self, depth: f32) {
        self.record(GlCall::ClearDepth(depth));
    }

    fn clear(&self) {
        self.record(GlCall::Clear);
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, _component: ComponentType, _offset: i32) {
        self.record(GlCall::DrawElements { mode, count });
    }
}
