//! WASM bridge: exposes the viewer engine to a hand-written JS/DOM page.
//!
//! The page owns the DOM: it mounts the SVG, wires pointer and form
//! events, and performs the actual fetch. This bridge owns all state and
//! invariants: the page reports events with `performance.now()`
//! timestamps and applies the returned CSS transform / status verbatim.

use std::sync::Mutex;

use profgraph_core::session::{GenerateOutcome, GenerateRequest, ViewerSession};
use profgraph_core::viewport::{PointerButton, PointerTarget};
use profgraph_protocol::{GraphOptions, InputSource, Size};
use serde::Serialize;
use wasm_bindgen::prelude::*;

static SESSION: Mutex<Option<ViewerSession>> = Mutex::new(None);

fn with_session<T>(f: impl FnOnce(&mut ViewerSession) -> T) -> T {
    let mut guard = SESSION.lock().unwrap_or_else(|e| e.into_inner());
    let session = guard.get_or_insert_with(ViewerSession::new);
    f(session)
}

/// Everything the page needs to POST one generate request: the form
/// fields, plus the file name of the `file` part when the page should
/// attach its currently selected `File` object.
#[derive(Debug, Serialize)]
struct DispatchInfo {
    fields: Vec<(String, String)>,
    upload: Option<String>,
}

impl DispatchInfo {
    fn from_request(request: &GenerateRequest) -> Self {
        let mut fields: Vec<(String, String)> = request
            .options
            .form_fields()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        let upload = match &request.source {
            InputSource::Path(path) => {
                fields.push(("file_path".to_string(), path.clone()));
                None
            }
            InputSource::Blob { name, .. } => Some(name.clone()),
        };
        Self { fields, upload }
    }

    fn to_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self).map_err(|e| JsError::new(&e.to_string()))
    }
}

fn status_to_json(session: &ViewerSession) -> Result<String, JsError> {
    serde_json::to_string(session.status()).map_err(|e| JsError::new(&e.to_string()))
}

// --- Input source & options ---

/// Select a server-side path as the input source. Blank paths are
/// rejected (returns false).
#[wasm_bindgen]
pub fn set_source_path(path: &str, now_ms: f64) -> bool {
    match InputSource::from_path(path) {
        Some(source) => {
            with_session(|session| session.set_source(source, now_ms));
            true
        }
        None => false,
    }
}

/// Select a page-held `File` as the input source. Only the name crosses
/// the boundary; the page attaches the File itself when it dispatches.
#[wasm_bindgen]
pub fn set_source_file(name: &str, now_ms: f64) {
    let source = InputSource::from_bytes(name, Vec::<u8>::new());
    with_session(|session| session.set_source(source, now_ms));
}

/// Replace the option values from a JSON object (missing fields keep
/// their defaults). Triggers auto-update.
#[wasm_bindgen]
pub fn set_options(json: &str, now_ms: f64) -> Result<(), JsError> {
    let options: GraphOptions =
        serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string()))?;
    with_session(|session| {
        *session.options_mut() = options;
        session.options_changed(now_ms);
    });
    Ok(())
}

#[wasm_bindgen]
pub fn set_auto_update(on: bool, now_ms: f64) {
    with_session(|session| session.set_auto_update(on, now_ms));
}

#[wasm_bindgen]
pub fn auto_update() -> bool {
    with_session(|session| session.auto_update())
}

// --- Scheduling ---

/// Explicit generate (button, Ctrl+Enter). Returns the dispatch info as
/// JSON, or `None` when nothing should be sent (no source reported via
/// status; in-flight manual triggers are dropped).
#[wasm_bindgen]
pub fn generate_now() -> Result<Option<String>, JsError> {
    with_session(|session| match session.generate_now() {
        Some(request) => DispatchInfo::from_request(&request).to_json().map(Some),
        None => Ok(None),
    })
}

/// Advance the clock; returns dispatch info when the debounce deadline
/// fired. The page calls this from its timer/frame callback.
#[wasm_bindgen]
pub fn poll(now_ms: f64) -> Result<Option<String>, JsError> {
    with_session(|session| match session.poll(now_ms) {
        Some(request) => DispatchInfo::from_request(&request).to_json().map(Some),
        None => Ok(None),
    })
}

/// The armed debounce deadline in ms, for pages that prefer setTimeout
/// over polling.
#[wasm_bindgen]
pub fn deadline_ms() -> Option<f64> {
    with_session(|session| session.scheduler().deadline_ms())
}

// --- Completion ---
// Each returns the new status as JSON, the one report for the dispatch.

#[wasm_bindgen]
pub fn complete_svg(markup: &str, now_ms: f64) -> Result<String, JsError> {
    with_session(|session| {
        session.apply_outcome(GenerateOutcome::Svg(markup.to_string()), now_ms);
        status_to_json(session)
    })
}

#[wasm_bindgen]
pub fn complete_app_error(message: &str, now_ms: f64) -> Result<String, JsError> {
    with_session(|session| {
        session.apply_outcome(GenerateOutcome::App(message.to_string()), now_ms);
        status_to_json(session)
    })
}

#[wasm_bindgen]
pub fn complete_http_error(
    status: u16,
    message: Option<String>,
    now_ms: f64,
) -> Result<String, JsError> {
    with_session(|session| {
        session.apply_outcome(GenerateOutcome::Http { status, message }, now_ms);
        status_to_json(session)
    })
}

#[wasm_bindgen]
pub fn complete_transport_error(message: &str, now_ms: f64) -> Result<String, JsError> {
    with_session(|session| {
        session.apply_outcome(GenerateOutcome::Transport(message.to_string()), now_ms);
        status_to_json(session)
    })
}

#[wasm_bindgen]
pub fn status_json() -> Result<String, JsError> {
    with_session(|session| status_to_json(session))
}

/// Whether a fit-to-view is owed to freshly mounted content. The page
/// checks this from a requestAnimationFrame callback (the SVG needs one
/// layout pass before it is measurable) and then calls [`fit_view`].
#[wasm_bindgen]
pub fn take_pending_fit() -> bool {
    with_session(|session| session.take_pending_fit())
}

// --- Viewport ---

#[wasm_bindgen]
pub fn zoom_at_point(cx: f64, cy: f64, factor: f64) -> String {
    with_session(|session| {
        session.viewport_mut().zoom_at_point(cx, cy, factor);
        session.viewport().css_transform()
    })
}

#[wasm_bindgen]
pub fn zoom_in(container_width: f64, container_height: f64) -> String {
    with_session(|session| {
        session
            .viewport_mut()
            .zoom_in(Size::new(container_width, container_height));
        session.viewport().css_transform()
    })
}

#[wasm_bindgen]
pub fn zoom_out(container_width: f64, container_height: f64) -> String {
    with_session(|session| {
        session
            .viewport_mut()
            .zoom_out(Size::new(container_width, container_height));
        session.viewport().css_transform()
    })
}

#[wasm_bindgen]
pub fn reset_view() -> String {
    with_session(|session| {
        session.viewport_mut().reset();
        session.viewport().css_transform()
    })
}

#[wasm_bindgen]
pub fn fit_view(
    container_width: f64,
    container_height: f64,
    content_width: f64,
    content_height: f64,
) -> String {
    with_session(|session| {
        session.viewport_mut().fit_to_view(
            Size::new(container_width, container_height),
            Size::new(content_width, content_height),
        );
        session.viewport().css_transform()
    })
}

/// Pointer-down. `button` is the DOM button code (0 = primary);
/// `text_target` reports whether the event target is SVG text, which
/// keeps native selection instead of panning.
#[wasm_bindgen]
pub fn pan_begin(button: i16, text_target: bool, x: f64, y: f64) {
    let button = match button {
        0 => PointerButton::Primary,
        1 => PointerButton::Auxiliary,
        _ => PointerButton::Secondary,
    };
    let target = if text_target {
        PointerTarget::Text
    } else {
        PointerTarget::Other
    };
    with_session(|session| session.viewport_mut().begin_pan(button, target, x, y));
}

#[wasm_bindgen]
pub fn pan_move(x: f64, y: f64) -> String {
    with_session(|session| {
        session.viewport_mut().update_pan(x, y);
        session.viewport().css_transform()
    })
}

#[wasm_bindgen]
pub fn pan_end() {
    with_session(|session| session.viewport_mut().end_pan());
}

#[wasm_bindgen]
pub fn transform_css() -> String {
    with_session(|session| session.viewport().css_transform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use profgraph_protocol::GraphOptions;

    #[test]
    fn dispatch_info_for_path_source() {
        let request = GenerateRequest {
            options: GraphOptions::default(),
            source: InputSource::Path("/tmp/app.prof".into()),
        };
        let info = DispatchInfo::from_request(&request);
        assert_eq!(info.upload, None);
        assert_eq!(
            info.fields.last(),
            Some(&("file_path".to_string(), "/tmp/app.prof".to_string()))
        );
    }

    #[test]
    fn dispatch_info_for_upload_source() {
        let request = GenerateRequest {
            options: GraphOptions::default(),
            source: InputSource::from_bytes("run.pstats", Vec::<u8>::new()),
        };
        let info = DispatchInfo::from_request(&request);
        assert_eq!(info.upload.as_deref(), Some("run.pstats"));
        assert!(info.fields.iter().all(|(key, _)| key != "file_path"));
        let json = info.to_json().ok().unwrap();
        assert!(json.contains("\"upload\":\"run.pstats\""));
    }
}
