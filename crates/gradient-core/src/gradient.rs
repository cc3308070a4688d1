//! Animated mesh gradient: builds the uniform graph and the plane mesh, then
//! steps the frame/resize/pause-play state machine.
//!
//! The controller never schedules frames itself. The host calls
//! [`Gradient::animate`] once per display frame and keeps doing so only while
//! the returned [`FrameOutcome::reschedule`] is true.

use crate::color::{resolve_palette, Palette, Rgba};
use crate::constants::*;
use crate::error::{GradientError, UniformError};
use crate::geometry::{Orientation, MAX_VERTICES};
use crate::gl::{GlBackend, ShaderStage};
use crate::minigl::{MeshId, MiniGl, OrthographicCamera};
use crate::shaders::{vertex_body, FRAGMENT_GLSL};
use crate::uniform::{Uniform, UniformSet, UniformValue};
use glam::{Mat4, Vec3};

/// Host-facing options, fixed for the lifetime of a gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientOptions {
    /// `rgb()`/`rgba()` strings; `None` uses the built-in palette.
    pub colors: Option<Vec<String>>,
    pub height: u32,
    /// Draw a single frame and tear down.
    pub is_static: bool,
    pub darken_top: bool,
    /// Enables pointer scrubbing.
    pub interactive: bool,
    pub pause_on_scroll: bool,
    pub amplitude: f32,
    pub seed: f32,
    pub freq_x: f32,
    pub freq_y: f32,
    /// Enables the GL context debug trace.
    pub debug: bool,
}

impl Default for GradientOptions {
    fn default() -> Self {
        Self {
            colors: None,
            height: DEFAULT_HEIGHT,
            is_static: false,
            darken_top: false,
            interactive: false,
            pause_on_scroll: false,
            amplitude: DEFAULT_AMPLITUDE,
            seed: DEFAULT_SEED,
            freq_x: DEFAULT_FREQ_X,
            freq_y: DEFAULT_FREQ_Y,
            debug: false,
        }
    }
}

/// Runtime configuration created by [`Gradient::connect`].
#[derive(Clone, Debug, PartialEq)]
pub struct GradientConfig {
    /// Segments per pixel along x and y.
    pub density: [f32; 2],
    pub zoom: f32,
    /// Radians; the vertex deform inclines by its tangent.
    pub rotation: f32,
    pub wireframe: bool,
    pub playing: bool,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            zoom: 1.0,
            rotation: 0.0,
            wireframe: false,
            playing: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientState {
    Uninitialized,
    /// Context created; the scene is built on the next frame by `init`.
    Connecting,
    Playing,
    Paused,
    /// Terminal state of a static gradient after its final render.
    RenderedOnce,
    Disposed,
}

/// Result of one [`Gradient::animate`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// A draw was issued this call.
    pub drawn: bool,
    /// The host should request another frame.
    pub reschedule: bool,
}

pub struct Gradient<B: GlBackend> {
    options: GradientOptions,
    config: GradientConfig,
    state: GradientState,
    minigl: Option<MiniGl<B>>,
    mesh: Option<MeshId>,
    palette: Option<Palette>,
    active_colors: [f32; 4],
    freq: [f32; 2],
    t: f64,
    last: f64,
    frame_index: u64,
    drawn: bool,
    width: u32,
    pointer_held: bool,
    meta_key: bool,
    scrolling: bool,
    intersecting: bool,
}

impl<B: GlBackend> Gradient<B> {
    pub fn new(options: GradientOptions) -> Self {
        let freq = [options.freq_x, options.freq_y];
        Self {
            options,
            config: GradientConfig::default(),
            state: GradientState::Uninitialized,
            minigl: None,
            mesh: None,
            palette: None,
            active_colors: [1.0; 4],
            freq,
            t: TIME_SEED_MS,
            last: 0.0,
            frame_index: 0,
            drawn: false,
            width: 0,
            pointer_held: false,
            meta_key: false,
            scrolling: false,
            intersecting: false,
        }
    }

    /// Binds the gradient to a GL context. Scene construction is left to
    /// [`Gradient::init`], which the host runs on the following frame.
    pub fn connect(&mut self, gl: B) {
        if let Some(previous) = self.minigl.as_mut() {
            previous.dispose();
        }
        self.config = GradientConfig::default();
        self.minigl = Some(MiniGl::new(gl, self.options.debug));
        self.mesh = None;
        self.drawn = false;
        self.state = GradientState::Connecting;
        log::debug!("gradient connected");
    }

    /// Resolves the palette, builds material, geometry and mesh, then sizes
    /// everything for `viewport_width`. Runs once; later calls are no-ops.
    pub fn init(&mut self, viewport_width: u32) -> Result<(), GradientError> {
        if self.state != GradientState::Connecting {
            return match self.state {
                GradientState::Uninitialized | GradientState::Disposed => Err(GradientError::NotConnected),
                _ => Ok(()),
            };
        }
        let palette = resolve_palette(self.options.colors.as_deref());
        let uniforms = self.build_uniforms(&palette.colors)?;
        let minigl = self.minigl.as_mut().ok_or(GradientError::NotConnected)?;
        let material = minigl.create_material(&vertex_body(), FRAGMENT_GLSL, uniforms)?;
        let geometry = minigl.create_plane_geometry(1.0, 1.0, 1, 1, Orientation::Xz)?;
        let id = minigl.add_mesh(geometry, material);
        if let Some((_, mesh)) = minigl.mesh_mut(id) {
            mesh.wireframe = self.config.wireframe;
        }
        minigl.set_model_view(Mat4::from_scale(Vec3::new(self.config.zoom, self.config.zoom, 1.0)));
        self.mesh = Some(id);
        self.palette = Some(palette);
        self.state = if self.config.playing {
            GradientState::Playing
        } else {
            GradientState::Paused
        };
        self.resize(viewport_width)?;
        log::info!("gradient ready ({} colors)", self.active_palette_len());
        Ok(())
    }

    /// Resizes the context and re-tessellates the plane for a viewport
    /// `width` pixels wide at the configured height.
    pub fn resize(&mut self, width: u32) -> Result<(), GradientError> {
        let minigl = self.minigl.as_mut().ok_or(GradientError::NotConnected)?;
        let height = self.options.height;
        self.width = width;
        minigl.set_size(width, height);
        minigl.set_orthographic_camera(OrthographicCamera::default());

        let Some(id) = self.mesh else {
            return Ok(());
        };
        let (x_seg_count, y_seg_count) = segment_counts(width, height, self.config.density);
        let shadow_power = if width < NARROW_VIEWPORT_WIDTH {
            SHADOW_POWER_NARROW
        } else {
            SHADOW_POWER_WIDE
        };
        if let Some((gl, mesh)) = minigl.mesh_mut(id) {
            let geometry = mesh.geometry_mut();
            geometry.set_topology(gl, x_seg_count, y_seg_count)?;
            geometry.set_size(gl, width as f32, height as f32, Orientation::Xz);
            if let Some(uniform) = mesh.material_mut().uniforms_mut().get_mut("u_shadow_power") {
                uniform.set(UniformValue::Float(shadow_power));
            }
        }
        Ok(())
    }

    /// One frame step at `timestamp` (milliseconds, as handed out by the
    /// display clock).
    ///
    /// Every other call is skipped, as are calls while the document is hidden
    /// or playback is paused; a held pointer forces the frame through.
    pub fn animate(&mut self, timestamp: f64, document_hidden: bool) -> FrameOutcome {
        if !matches!(self.state, GradientState::Playing | GradientState::Paused) {
            return FrameOutcome::default();
        }
        let frame_index = self.frame_index;
        self.frame_index += 1;
        let skip = document_hidden || !self.config.playing || frame_index % 2 == 0;

        let mut outcome = FrameOutcome::default();
        if !skip || self.pointer_held {
            self.t += (timestamp - self.last).clamp(0.0, FRAME_DELTA_CAP_MS);
            self.last = timestamp;
            if self.pointer_held {
                self.t += if self.meta_key {
                    -SCRUB_STEP_MS
                } else {
                    SCRUB_STEP_MS
                };
            }
            let t = self.t as f32;
            self.with_uniforms(|uniforms| {
                if let Some(time) = uniforms.get_mut("u_time") {
                    time.set(UniformValue::Float(t));
                }
            });
            self.render();
            self.drawn = true;
            outcome.drawn = true;
        }

        if self.drawn && self.options.is_static {
            self.render();
            self.disconnect();
            self.state = GradientState::RenderedOnce;
            outcome.drawn = true;
            return outcome;
        }
        outcome.reschedule = self.config.playing || self.pointer_held;
        outcome
    }

    fn render(&self) {
        if let Some(minigl) = &self.minigl {
            minigl.render();
        }
    }

    /// Resumes playback. Returns true when the host should request a frame.
    /// Before `init` this only sets the flag `init` starts from.
    pub fn play(&mut self) -> bool {
        if self.state == GradientState::Connecting {
            self.config.playing = true;
            return false;
        }
        if !self.is_ready() {
            return false;
        }
        self.config.playing = true;
        self.state = GradientState::Playing;
        true
    }

    pub fn pause(&mut self) {
        if self.state == GradientState::Connecting {
            self.config.playing = false;
        } else if self.is_ready() {
            self.config.playing = false;
            self.state = GradientState::Paused;
        }
    }

    /// Starts scrubbing; `meta` scrubs backwards. Returns true when the host
    /// should request a frame because the loop is idle.
    pub fn pointer_down(&mut self, meta: bool) -> bool {
        if !self.options.interactive || !self.is_ready() {
            return false;
        }
        self.meta_key = meta;
        self.pointer_held = true;
        !self.config.playing
    }

    pub fn pointer_up(&mut self) {
        self.pointer_held = false;
    }

    /// Shifts both noise frequencies by `delta`.
    pub fn update_frequency(&mut self, delta: f32) {
        self.freq[0] += delta;
        self.freq[1] += delta;
        let freq = self.freq;
        self.with_uniforms(|uniforms| {
            if let Some(noise_freq) = uniforms
                .get_mut("u_global")
                .and_then(|global| global.field_mut("noiseFreq"))
            {
                noise_freq.set(UniformValue::Vec2(freq));
            }
        });
    }

    /// Mutes or unmutes one color slot. Out-of-range indices are ignored.
    pub fn toggle_color(&mut self, index: usize) {
        let Some(slot) = self.active_colors.get_mut(index) else {
            return;
        };
        *slot = if *slot == 0.0 { 1.0 } else { 0.0 };
        let mask = self.active_colors;
        self.with_uniforms(|uniforms| {
            if let Some(active) = uniforms.get_mut("u_active_colors") {
                active.set(UniformValue::Vec4(mask));
            }
        });
    }

    /// Replaces the palette. After `init` this rebuilds the uniform graph and
    /// the program and swaps the mesh, keeping its geometry.
    pub fn set_colors(&mut self, colors: Option<Vec<String>>) -> Result<(), GradientError> {
        self.options.colors = colors;
        let Some(id) = self.mesh else {
            return Ok(());
        };
        let palette = resolve_palette(self.options.colors.as_deref());
        let uniforms = self.build_uniforms(&palette.colors)?;
        let minigl = self.minigl.as_mut().ok_or(GradientError::NotConnected)?;
        let material = minigl.create_material(&vertex_body(), FRAGMENT_GLSL, uniforms)?;
        let Some(old) = minigl.remove_mesh(id) else {
            return Err(GradientError::NotConnected);
        };
        let (geometry, previous) = old.into_parts();
        previous.dispose(minigl.gl());
        let id = minigl.add_mesh(geometry, material);
        if let Some((_, mesh)) = minigl.mesh_mut(id) {
            mesh.wireframe = self.config.wireframe;
        }
        self.mesh = Some(id);
        self.palette = Some(palette);
        self.resize(self.width)
    }

    /// A scroll event. Pauses a playing gradient until scrolling settles.
    pub fn scroll_started(&mut self) {
        if self.options.pause_on_scroll && self.config.playing && self.is_ready() {
            self.scrolling = true;
            self.pause();
        }
    }

    /// Scrolling settled. Returns true when playback resumed and the host
    /// should request a frame.
    pub fn scroll_ended(&mut self) -> bool {
        if !self.scrolling {
            return false;
        }
        self.scrolling = false;
        self.intersecting && self.play()
    }

    pub fn set_intersecting(&mut self, intersecting: bool) {
        self.intersecting = intersecting;
    }

    /// Frees the mesh and stops the loop. Safe to call repeatedly; a static
    /// gradient that already rendered counts as disconnected.
    pub fn disconnect(&mut self) {
        if matches!(self.state, GradientState::Disposed | GradientState::RenderedOnce) {
            return;
        }
        self.config.playing = false;
        self.pointer_held = false;
        self.scrolling = false;
        if let (Some(minigl), Some(id)) = (self.minigl.as_mut(), self.mesh.take()) {
            minigl.dispose_mesh(id);
        }
        self.state = GradientState::Disposed;
        log::debug!("gradient disconnected");
    }

    fn is_ready(&self) -> bool {
        matches!(self.state, GradientState::Playing | GradientState::Paused)
    }

    fn with_uniforms(&mut self, f: impl FnOnce(&mut UniformSet)) {
        if let (Some(minigl), Some(id)) = (self.minigl.as_mut(), self.mesh) {
            if let Some((_, mesh)) = minigl.mesh_mut(id) {
                f(mesh.material_mut().uniforms_mut());
            }
        }
    }

    fn active_palette_len(&self) -> usize {
        self.palette.as_ref().map_or(0, |p| p.colors.len())
    }

    fn build_uniforms(&self, colors: &[Rgba]) -> Result<UniformSet, UniformError> {
        let seed = self.options.seed;
        let base = colors.first().copied().unwrap_or([0.0, 0.0, 0.0, 1.0]);
        let layer_colors = if colors.len() > 1 { &colors[1..] } else { colors };
        let n = colors.len().max(1) as f32;

        let layers = layer_colors
            .iter()
            .enumerate()
            .map(|(i, color)| {
                let e = (i + 1) as f32;
                Uniform::structure(
                    UniformSet::new()
                        .with("color", Uniform::vec4(*color))
                        .with(
                            "noiseFreq",
                            Uniform::vec2([LAYER_NOISE_FREQ_BASE[0] + e / n, LAYER_NOISE_FREQ_BASE[1] + e / n]),
                        )
                        .with("noiseSpeed", Uniform::float(LAYER_NOISE_SPEED_BASE + LAYER_STEP * e))
                        .with("noiseFlow", Uniform::float(LAYER_NOISE_FLOW_BASE + LAYER_STEP * e))
                        .with("noiseSeed", Uniform::float(seed + LAYER_SEED_STEP * e))
                        .with("noiseFloor", Uniform::float(LAYER_NOISE_FLOOR))
                        .with("noiseCeil", Uniform::float(LAYER_NOISE_CEIL_BASE + LAYER_NOISE_CEIL_STEP * e)),
                )
            })
            .collect();

        let global = UniformSet::new()
            .with("noiseFreq", Uniform::vec2(self.freq))
            .with("noiseSpeed", Uniform::float(GLOBAL_NOISE_SPEED));
        let vert_deform = UniformSet::new()
            .with("incline", Uniform::float(self.config.rotation.tan()))
            .with("offsetTop", Uniform::float(DEFORM_OFFSET_TOP))
            .with("offsetBottom", Uniform::float(DEFORM_OFFSET_BOTTOM))
            .with("noiseFreq", Uniform::vec2(DEFORM_NOISE_FREQ))
            .with("noiseAmp", Uniform::float(self.options.amplitude))
            .with("noiseSpeed", Uniform::float(DEFORM_NOISE_SPEED))
            .with("noiseFlow", Uniform::float(DEFORM_NOISE_FLOW))
            .with("noiseSeed", Uniform::float(seed));

        Ok(UniformSet::new()
            .with("u_time", Uniform::float(0.0))
            .with("u_shadow_power", Uniform::float(SHADOW_POWER_NARROW))
            .with("u_darken_top", Uniform::float(if self.options.darken_top { 1.0 } else { 0.0 }))
            .with("u_active_colors", Uniform::vec4(self.active_colors))
            .with("u_global", Uniform::structure(global))
            .with(
                "u_vertDeform",
                Uniform::structure(vert_deform).excluded_from(ShaderStage::Fragment),
            )
            .with("u_baseColor", Uniform::vec4(base).excluded_from(ShaderStage::Fragment))
            .with(
                "u_waveLayers",
                Uniform::array("u_waveLayers", layers)?.excluded_from(ShaderStage::Fragment),
            ))
    }

    pub fn state(&self) -> GradientState {
        self.state
    }

    pub fn options(&self) -> &GradientOptions {
        &self.options
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    pub fn is_playing(&self) -> bool {
        self.config.playing
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Elapsed-time accumulator in milliseconds.
    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn active_colors(&self) -> [f32; 4] {
        self.active_colors
    }

    pub fn frequency(&self) -> [f32; 2] {
        self.freq
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn minigl(&self) -> Option<&MiniGl<B>> {
        self.minigl.as_ref()
    }

    pub fn mesh_id(&self) -> Option<MeshId> {
        self.mesh
    }
}

/// `ceil(dimension * density)` per axis, at least one segment each and
/// clamped so the grid stays addressable with 16-bit indices.
pub fn segment_counts(width: u32, height: u32, density: [f32; 2]) -> (usize, usize) {
    let x = (width as f32 * density[0]).ceil().max(1.0) as usize;
    let y = (height as f32 * density[1]).ceil().max(1.0) as usize;
    let y = y.min(MAX_VERTICES / 2 - 1);
    let x = x.min(MAX_VERTICES / (y + 1) - 1);
    (x, y)
}
