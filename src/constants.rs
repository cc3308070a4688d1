/// Browser-side tuning for the gradient host.
///
/// Kept free of `web_sys` so host tests can `include!` this file.
// Quiet period after the last scroll event before playback resumes (ms)
pub const SCROLL_END_DELAY_MS: i32 = 200;

// Page query fragment that turns on the GL debug trace
pub const DEBUG_QUERY: &str = "debug=webgl";

pub const CONTEXT_KIND: &str = "webgl";
pub const DEFAULT_CANVAS_ID: &str = "gradient-canvas";

// Canvas data attributes read as options (presence means on)
pub const ATTR_DARKEN_TOP: &str = "data-js-darken-top";
pub const ATTR_STATIC: &str = "data-static";
pub const ATTR_INTERACTIVE: &str = "data-interactive";
pub const ATTR_PAUSE_ON_SCROLL: &str = "data-pause-on-scroll";
