//! Transport for generate requests.
//!
//! A dispatch settles into exactly one [`GenerateOutcome`], delivered
//! through a shared mailbox the app drains at the top of the next frame.
//! Native posts from a worker thread with reqwest; wasm32 uses the
//! browser's fetch via `web_sys`.

use std::sync::{Arc, Mutex};

use eframe::egui;
use profgraph_core::session::{GenerateOutcome, GenerateRequest};
use profgraph_protocol::{GenerateResponse, InputSource};

/// The backend stores exactly one outcome per dispatch here; the session's
/// "at most one in flight" invariant means the slot is always free.
pub type OutcomeMailbox = Arc<Mutex<Option<GenerateOutcome>>>;

pub trait GenerateBackend {
    /// Fire the request. Must eventually deliver exactly one outcome to
    /// `mailbox` and wake the UI.
    fn dispatch(&self, request: GenerateRequest, mailbox: OutcomeMailbox, ctx: egui::Context);
}

/// Posts multipart forms to `<base_url>/generate`.
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.base_url)
    }
}

fn deliver(mailbox: &OutcomeMailbox, ctx: &egui::Context, outcome: GenerateOutcome) {
    if let Ok(mut slot) = mailbox.lock() {
        *slot = Some(outcome);
    }
    ctx.request_repaint();
}

/// Map a settled HTTP exchange onto an outcome. Shared by both transports
/// so the error taxonomy stays identical across targets.
fn classify(status: u16, ok: bool, body: Result<String, String>) -> GenerateOutcome {
    let text = match body {
        Ok(text) => text,
        Err(error) => return GenerateOutcome::Transport(error),
    };
    if !ok {
        // Failed requests usually still carry a structured error body.
        let message = serde_json::from_str::<GenerateResponse>(&text)
            .ok()
            .map(|response| response.error)
            .filter(|error| !error.is_empty());
        return GenerateOutcome::Http { status, message };
    }
    match serde_json::from_str::<GenerateResponse>(&text) {
        Ok(response) => match response.into_result() {
            Ok(svg) => GenerateOutcome::Svg(svg),
            Err(error) => GenerateOutcome::App(error),
        },
        Err(error) => GenerateOutcome::Transport(error.to_string()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GenerateBackend for HttpBackend {
    fn dispatch(&self, request: GenerateRequest, mailbox: OutcomeMailbox, ctx: egui::Context) {
        let url = self.generate_url();
        log::info!("POST {url} ({})", request.source.file_name());
        std::thread::spawn(move || {
            let outcome = post_native(&url, &request);
            deliver(&mailbox, &ctx, outcome);
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn post_native(url: &str, request: &GenerateRequest) -> GenerateOutcome {
    use reqwest::blocking::multipart::{Form, Part};

    let mut form = Form::new();
    for (key, value) in request.options.form_fields() {
        form = form.text(key, value);
    }
    form = match &request.source {
        InputSource::Path(path) => form.text("file_path", path.clone()),
        InputSource::Blob { name, bytes } => {
            let part = Part::bytes(bytes.to_vec()).file_name(name.clone());
            form.part("file", part)
        }
    };

    let client = reqwest::blocking::Client::new();
    let response = match client.post(url).multipart(form).send() {
        Ok(response) => response,
        Err(error) => return GenerateOutcome::Transport(error.to_string()),
    };
    let status = response.status().as_u16();
    let ok = response.status().is_success();
    let body = response.text().map_err(|error| error.to_string());
    classify(status, ok, body)
}

#[cfg(target_arch = "wasm32")]
impl GenerateBackend for HttpBackend {
    fn dispatch(&self, request: GenerateRequest, mailbox: OutcomeMailbox, ctx: egui::Context) {
        let url = self.generate_url();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match post_wasm(&url, &request).await {
                Ok(outcome) => outcome,
                Err(error) => GenerateOutcome::Transport(error),
            };
            deliver(&mailbox, &ctx, outcome);
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn post_wasm(url: &str, request: &GenerateRequest) -> Result<GenerateOutcome, String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: wasm_bindgen::JsValue| format!("{e:?}");

    let form = web_sys::FormData::new().map_err(js_err)?;
    for (key, value) in request.options.form_fields() {
        form.append_with_str(key, &value).map_err(js_err)?;
    }
    match &request.source {
        InputSource::Path(path) => {
            form.append_with_str("file_path", path).map_err(js_err)?;
        }
        InputSource::Blob { name, bytes } => {
            let array = js_sys::Uint8Array::from(bytes.as_ref());
            let parts = js_sys::Array::of1(&array);
            let blob = web_sys::Blob::new_with_u8_array_sequence(&parts).map_err(js_err)?;
            form.append_with_blob_and_filename("file", &blob, name)
                .map_err(js_err)?;
        }
    }

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);

    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let response_value = JsFuture::from(window.fetch_with_str_and_init(url, &init))
        .await
        .map_err(js_err)?;
    let response: web_sys::Response = response_value
        .dyn_into()
        .map_err(|_| "not a Response".to_string())?;

    let status = response.status();
    let ok = response.ok();
    let text_value = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    let body = text_value
        .as_string()
        .ok_or_else(|| "response body is not text".to_string())?;
    Ok(classify(status, ok, Ok(body)))
}
