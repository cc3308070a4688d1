use crate::constants::CONTEXT_KIND;
use gradient_core::gl::{BufferTarget, ComponentType, DrawMode, GlBackend, ShaderStage};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;
use web_sys::WebGlRenderingContext as GL;

/// WebGL 1 context plus the canvas whose backing store it draws into.
pub struct WebGl {
    gl: GL,
    canvas: web::HtmlCanvasElement,
}

impl WebGl {
    /// Acquires an antialiased `webgl` context for `canvas`.
    pub fn from_canvas(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let attributes = js_sys::Object::new();
        js_sys::Reflect::set(&attributes, &JsValue::from_str("antialias"), &JsValue::TRUE)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let gl = canvas
            .get_context_with_context_options(CONTEXT_KIND, &attributes)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("{} context unavailable", CONTEXT_KIND))?
            .dyn_into::<GL>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self {
            gl,
            canvas: canvas.clone(),
        })
    }
}

fn shader_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => GL::ARRAY_BUFFER,
        BufferTarget::ElementArray => GL::ELEMENT_ARRAY_BUFFER,
    }
}

fn component_type(component: ComponentType) -> u32 {
    match component {
        ComponentType::Float => GL::FLOAT,
        ComponentType::UnsignedShort => GL::UNSIGNED_SHORT,
    }
}

fn draw_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::Triangles => GL::TRIANGLES,
        DrawMode::Lines => GL::LINES,
    }
}

impl GlBackend for WebGl {
    type Shader = web::WebGlShader;
    type Program = web::WebGlProgram;
    type Buffer = web::WebGlBuffer;
    type UniformLocation = web::WebGlUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader> {
        self.gl.create_shader(shader_kind(stage))
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &Self::Shader) {
        self.gl.compile_shader(shader);
    }

    fn shader_compiled(&self, shader: &Self::Shader) -> bool {
        self.gl
            .get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &Self::Shader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<Self::Program> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        self.gl.attach_shader(program, shader);
    }

    fn link_program(&self, program: &Self::Program) {
        self.gl.link_program(program);
    }

    fn program_linked(&self, program: &Self::Program) -> bool {
        self.gl
            .get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &Self::Program) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn use_program(&self, program: Option<&Self::Program>) {
        self.gl.use_program(program);
    }

    fn delete_program(&self, program: &Self::Program) {
        self.gl.delete_program(Some(program));
    }

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::UniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32 {
        self.gl.get_attrib_location(program, name)
    }

    fn uniform1f(&self, location: &Self::UniformLocation, value: f32) {
        self.gl.uniform1f(Some(location), value);
    }

    fn uniform1i(&self, location: &Self::UniformLocation, value: i32) {
        self.gl.uniform1i(Some(location), value);
    }

    fn uniform2fv(&self, location: &Self::UniformLocation, value: &[f32; 2]) {
        self.gl.uniform2fv_with_f32_array(Some(location), value);
    }

    fn uniform3fv(&self, location: &Self::UniformLocation, value: &[f32; 3]) {
        self.gl.uniform3fv_with_f32_array(Some(location), value);
    }

    fn uniform4fv(&self, location: &Self::UniformLocation, value: &[f32; 4]) {
        self.gl.uniform4fv_with_f32_array(Some(location), value);
    }

    fn uniform_matrix4fv(&self, location: &Self::UniformLocation, transpose: bool, value: &[f32; 16]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), transpose, value);
    }

    fn create_buffer(&self) -> Option<Self::Buffer> {
        self.gl.create_buffer()
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>) {
        self.gl.bind_buffer(buffer_target(target), buffer);
    }

    fn delete_buffer(&self, buffer: &Self::Buffer) {
        self.gl.delete_buffer(Some(buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.gl
            .buffer_data_with_u8_array(buffer_target(target), data, GL::STATIC_DRAW);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.gl.enable_vertex_attrib_array(index);
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: i32,
        component: ComponentType,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.gl.vertex_attrib_pointer_with_i32(
            index,
            size,
            component_type(component),
            normalized,
            stride,
            offset,
        );
    }

    fn set_drawing_buffer_size(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.gl.clear_color(r, g, b, a);
    }

    fn clear_depth(&self, depth: f32) {
        self.gl.clear_depth(depth);
    }

    fn clear(&self) {
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, component: ComponentType, offset: i32) {
        self.gl
            .draw_elements_with_i32(draw_mode(mode), count, component_type(component), offset);
    }
}
