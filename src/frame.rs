use crate::dom;
use crate::events::Listeners;
use crate::webgl::WebGl;
use gradient_core::{Gradient, GradientState};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub type SharedGradient = Rc<RefCell<Gradient<WebGl>>>;

type Tick = Closure<dyn FnMut(f64)>;

/// `requestAnimationFrame` loop around [`Gradient::animate`].
///
/// At most one frame is queued at a time; [`FrameLoop::request`] is a no-op
/// while one is pending, so `play()` during playback does not fork the loop.
/// The tick closure holds a clone of the loop, so it is released once the
/// gradient reaches a terminal state and re-created by the next request.
#[derive(Clone)]
pub struct FrameLoop {
    gradient: SharedGradient,
    listeners: Rc<RefCell<Listeners>>,
    tick: Rc<RefCell<Option<Tick>>>,
    pending: Rc<Cell<bool>>,
}

impl FrameLoop {
    pub fn new(gradient: SharedGradient, listeners: Rc<RefCell<Listeners>>) -> Self {
        Self {
            gradient,
            listeners,
            tick: Rc::new(RefCell::new(None)),
            pending: Rc::new(Cell::new(false)),
        }
    }

    fn frame(&self, timestamp: f64) {
        self.pending.set(false);
        let outcome = self
            .gradient
            .borrow_mut()
            .animate(timestamp, dom::document_hidden());
        if outcome.reschedule {
            self.request();
            return;
        }
        let state = self.gradient.borrow().state();
        if matches!(state, GradientState::RenderedOnce | GradientState::Disposed) {
            // static gradients tear themselves down after the final draw
            self.listeners.borrow_mut().clear();
            // this runs inside the tick, so the closure is dropped after it returns
            if let Some(tick) = self.tick.borrow_mut().take() {
                spawn_local(async move { drop(tick) });
            }
        }
    }

    /// Queues the next frame unless one is already queued.
    pub fn request(&self) {
        if self.pending.get() {
            return;
        }
        let Some(window) = web::window() else {
            return;
        };
        let mut tick = self.tick.borrow_mut();
        let tick = tick.get_or_insert_with(|| {
            let this = self.clone();
            Closure::wrap(Box::new(move |timestamp: f64| this.frame(timestamp)) as Box<dyn FnMut(f64)>)
        });
        if window
            .request_animation_frame(tick.as_ref().unchecked_ref())
            .is_ok()
        {
            self.pending.set(true);
        }
    }

    /// Drops the tick closure unless a frame is still queued; a queued frame
    /// sees the terminal state and releases it itself.
    pub fn release(&self) {
        if !self.pending.get() {
            self.tick.borrow_mut().take();
        }
    }
}

/// Resolves on the next animation frame with its timestamp.
pub async fn next_animation_frame() -> anyhow::Result<f64> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.request_animation_frame(&resolve);
    });
    scheduled.map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let timestamp = JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(timestamp.as_f64().unwrap_or(0.0))
}
