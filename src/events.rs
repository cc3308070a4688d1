use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Handler = Closure<dyn FnMut(web::Event)>;

/// Owns every closure handed to the browser so they can be detached again.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(web::EventTarget, &'static str, Handler)>,
    observer: Option<(web::IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
    timers: Vec<Closure<dyn FnMut()>>,
    pending_timeout: Rc<Cell<Option<i32>>>,
}

impl Listeners {
    pub fn add(
        &mut self,
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<()> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        self.entries.push((target.clone(), event, closure));
        Ok(())
    }

    /// Handle of the timeout currently armed with a [`Listeners::timer`]
    /// callback; cleared before the callbacks are dropped.
    pub fn pending_timeout(&self) -> Rc<Cell<Option<i32>>> {
        self.pending_timeout.clone()
    }

    /// Keeps a timer callback alive and hands back the JS function for it.
    pub fn timer(&mut self, handler: impl FnMut() + 'static) -> js_sys::Function {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        let function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        self.timers.push(closure);
        function
    }

    /// Reports whether `element` intersects the viewport, on every change.
    pub fn observe_intersection(
        &mut self,
        element: &web::Element,
        mut handler: impl FnMut(bool) + 'static,
    ) -> anyhow::Result<()> {
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<web::IntersectionObserverEntry>() {
                    handler(entry.is_intersecting());
                }
            }
        }) as Box<dyn FnMut(js_sys::Array)>);
        let observer = web::IntersectionObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        observer.observe(element);
        if let Some((previous, _)) = self.observer.replace((observer, closure)) {
            previous.disconnect();
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Detaches every listener and the observer. Safe to call repeatedly.
    pub fn clear(&mut self) {
        for (target, event, closure) in self.entries.drain(..) {
            _ = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
        if let Some((observer, _)) = self.observer.take() {
            observer.disconnect();
        }
        if let (Some(handle), Some(window)) = (self.pending_timeout.take(), web::window()) {
            window.clear_timeout_with_handle(handle);
        }
        self.timers.clear();
    }
}

/// `metaKey` of a mouse event; false for anything else.
pub fn meta_key(event: &web::Event) -> bool {
    event
        .dyn_ref::<web::MouseEvent>()
        .map_or(false, web::MouseEvent::meta_key)
}
