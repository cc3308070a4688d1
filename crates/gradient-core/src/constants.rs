// Tuning constants for the gradient animation and its uniform graph.

// Palette: light blue, blue, light purple, purple
pub const DEFAULT_SECTION_COLORS: [u32; 4] = [0xc3e4ff, 0x6ec3f4, 0xeae2ff, 0xb9beff];

// Time
pub const TIME_SEED_MS: f64 = 1_253_106.0; // keeps the noise away from its origin on the first frame
pub const FRAME_DELTA_CAP_MS: f64 = 1000.0 / 15.0; // longest step taken after a stall
pub const SCRUB_STEP_MS: f64 = 160.0; // extra time per frame while the pointer is held

// Canvas and tessellation
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_DENSITY: [f32; 2] = [0.06, 0.16]; // segments per pixel, x then y
pub const NARROW_VIEWPORT_WIDTH: u32 = 600;
pub const SHADOW_POWER_NARROW: f32 = 5.0;
pub const SHADOW_POWER_WIDE: f32 = 6.0;

// Noise
pub const DEFAULT_AMPLITUDE: f32 = 320.0;
pub const DEFAULT_SEED: f32 = 5.0;
pub const DEFAULT_FREQ_X: f32 = 14e-5;
pub const DEFAULT_FREQ_Y: f32 = 29e-5;
pub const FREQ_DELTA: f32 = 1e-5; // step used by hosts nudging the frequency
pub const GLOBAL_NOISE_SPEED: f32 = 5e-6;

// Vertex deformation
pub const DEFORM_OFFSET_TOP: f32 = -0.5;
pub const DEFORM_OFFSET_BOTTOM: f32 = -0.5;
pub const DEFORM_NOISE_FREQ: [f32; 2] = [3.0, 4.0];
pub const DEFORM_NOISE_SPEED: f32 = 10.0;
pub const DEFORM_NOISE_FLOW: f32 = 3.0;

// Wave layers, per layer index e (1-based)
pub const LAYER_NOISE_FREQ_BASE: [f32; 2] = [2.0, 3.0];
pub const LAYER_NOISE_SPEED_BASE: f32 = 11.0;
pub const LAYER_NOISE_FLOW_BASE: f32 = 6.5;
pub const LAYER_STEP: f32 = 0.3; // speed/flow increase per layer
pub const LAYER_SEED_STEP: f32 = 10.0;
pub const LAYER_NOISE_FLOOR: f32 = 0.1;
pub const LAYER_NOISE_CEIL_BASE: f32 = 0.63;
pub const LAYER_NOISE_CEIL_STEP: f32 = 0.07;
