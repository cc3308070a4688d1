use crate::constants::DEBUG_QUERY;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// `window.innerWidth` in whole pixels, 0 when unavailable.
pub fn viewport_width() -> u32 {
    web::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map_or(0, |w| w.max(0.0) as u32)
}

#[inline]
pub fn document_hidden() -> bool {
    window_document().map_or(false, |d| d.hidden())
}

/// True when the page URL asks for the WebGL debug trace.
pub fn debug_requested() -> bool {
    web::window()
        .and_then(|w| w.location().search().ok())
        .map_or(false, |search| search.to_lowercase().contains(DEBUG_QUERY))
}

pub fn canvas_by_id(id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", id))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))
}

/// Strings out of a JS array; non-string entries become empty strings and
/// fail color validation downstream.
pub fn string_list(array: &js_sys::Array) -> Vec<String> {
    array.iter().map(|v| v.as_string().unwrap_or_default()).collect()
}
