#![cfg(target_arch = "wasm32")]
use crate::constants::*;
use crate::events::Listeners;
use crate::frame::{FrameLoop, SharedGradient};
use crate::webgl::WebGl;
use gradient_core::{Gradient, GradientOptions, GradientState};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod webgl;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("mesh-gradient loaded");
    Ok(())
}

fn options_for(canvas: &web::HtmlCanvasElement, colors: Option<js_sys::Array>) -> GradientOptions {
    GradientOptions {
        colors: colors.as_ref().map(dom::string_list),
        darken_top: canvas.has_attribute(ATTR_DARKEN_TOP),
        is_static: canvas.has_attribute(ATTR_STATIC),
        interactive: canvas.has_attribute(ATTR_INTERACTIVE),
        pause_on_scroll: canvas.has_attribute(ATTR_PAUSE_ON_SCROLL),
        debug: dom::debug_requested(),
        ..GradientOptions::default()
    }
}

struct Session {
    canvas: web::HtmlCanvasElement,
    gradient: SharedGradient,
    listeners: Rc<RefCell<Listeners>>,
    frames: FrameLoop,
}

impl Session {
    /// Second half of initialization, run one frame after `connect`.
    async fn finish_init(self: Rc<Self>) -> anyhow::Result<()> {
        frame::next_animation_frame().await?;
        self.gradient
            .borrow_mut()
            .init(dom::viewport_width())
            .map_err(|e| anyhow::anyhow!("gradient init failed: {}", e))?;
        self.wire_listeners()?;
        self.frames.request();
        Ok(())
    }

    fn wire_listeners(&self) -> anyhow::Result<()> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let (interactive, pause_on_scroll) = {
            let gradient = self.gradient.borrow();
            (gradient.options().interactive, gradient.options().pause_on_scroll)
        };
        let mut listeners = self.listeners.borrow_mut();

        let gradient = self.gradient.clone();
        listeners.add(&window, "resize", move |_| {
            if let Err(e) = gradient.borrow_mut().resize(dom::viewport_width()) {
                log::error!("resize failed: {}", e);
            }
        })?;

        if interactive {
            let gradient = self.gradient.clone();
            let frames = self.frames.clone();
            listeners.add(&window, "mousedown", move |event| {
                let idle = gradient.borrow_mut().pointer_down(events::meta_key(&event));
                if idle {
                    frames.request();
                }
            })?;
            let gradient = self.gradient.clone();
            listeners.add(&window, "mouseup", move |_| gradient.borrow_mut().pointer_up())?;
        }

        if pause_on_scroll {
            let pending = listeners.pending_timeout();
            let scroll_end = {
                let gradient = self.gradient.clone();
                let frames = self.frames.clone();
                let pending = pending.clone();
                listeners.timer(move || {
                    pending.set(None);
                    let resumed = gradient.borrow_mut().scroll_ended();
                    if resumed {
                        frames.request();
                    }
                })
            };
            let gradient = self.gradient.clone();
            let timer_window = window.clone();
            listeners.add(&window, "scroll", move |_| {
                if let Some(handle) = pending.take() {
                    timer_window.clear_timeout_with_handle(handle);
                }
                pending.set(
                    timer_window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(&scroll_end, SCROLL_END_DELAY_MS)
                        .ok(),
                );
                gradient.borrow_mut().scroll_started();
            })?;

            let gradient = self.gradient.clone();
            listeners.observe_intersection(&self.canvas, move |visible| {
                gradient.borrow_mut().set_intersecting(visible);
            })?;
        }
        log::debug!("{} listeners attached", listeners.len());
        Ok(())
    }
}

/// Browser handle for one gradient canvas.
#[wasm_bindgen]
pub struct MeshGradient {
    session: Rc<Session>,
}

#[wasm_bindgen]
impl MeshGradient {
    /// `colors` is an optional array of 1 to 5 `rgb()`/`rgba()` strings.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: web::HtmlCanvasElement, colors: Option<js_sys::Array>) -> MeshGradient {
        let gradient = Rc::new(RefCell::new(Gradient::new(options_for(&canvas, colors))));
        let listeners = Rc::new(RefCell::new(Listeners::default()));
        let frames = FrameLoop::new(gradient.clone(), listeners.clone());
        MeshGradient {
            session: Rc::new(Session {
                canvas,
                gradient,
                listeners,
                frames,
            }),
        }
    }

    /// Looks the canvas up by id (default `gradient-canvas`) and starts it.
    pub fn mount(canvas_id: Option<String>, colors: Option<js_sys::Array>) -> Result<MeshGradient, JsValue> {
        let id = canvas_id.as_deref().unwrap_or(DEFAULT_CANVAS_ID);
        let canvas = dom::canvas_by_id(id).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let gradient = MeshGradient::new(canvas, colors);
        gradient.init_gradient()?;
        Ok(gradient)
    }

    /// Acquires the WebGL context and builds the scene on the next frame.
    /// A missing context leaves the instance untouched so the call can be
    /// retried.
    #[wasm_bindgen(js_name = initGradient)]
    pub fn init_gradient(&self) -> Result<(), JsValue> {
        let session = &self.session;
        let state = session.gradient.borrow().state();
        if !matches!(state, GradientState::Uninitialized | GradientState::Disposed) {
            log::warn!("initGradient called twice");
            return Ok(());
        }
        let gl = WebGl::from_canvas(&session.canvas).map_err(|e| {
            log::error!("no WebGL context: {:?}", e);
            JsValue::from_str(&e.to_string())
        })?;
        session.gradient.borrow_mut().connect(gl);

        let session = session.clone();
        spawn_local(async move {
            if let Err(e) = session.finish_init().await {
                log::error!("init error: {:?}", e);
            }
        });
        Ok(())
    }

    pub fn play(&self) {
        let resumed = self.session.gradient.borrow_mut().play();
        if resumed {
            self.session.frames.request();
        }
    }

    pub fn pause(&self) {
        self.session.gradient.borrow_mut().pause();
    }

    #[wasm_bindgen(js_name = updateFrequency)]
    pub fn update_frequency(&self, delta: f32) {
        self.session.gradient.borrow_mut().update_frequency(delta);
    }

    #[wasm_bindgen(js_name = toggleColor)]
    pub fn toggle_color(&self, index: usize) {
        self.session.gradient.borrow_mut().toggle_color(index);
    }

    #[wasm_bindgen(js_name = setColors)]
    pub fn set_colors(&self, colors: Option<js_sys::Array>) -> Result<(), JsValue> {
        let colors = colors.as_ref().map(dom::string_list);
        self.session
            .gradient
            .borrow_mut()
            .set_colors(colors)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn disconnect(&self) {
        self.session.gradient.borrow_mut().disconnect();
        self.session.listeners.borrow_mut().clear();
        self.session.frames.release();
    }
}
