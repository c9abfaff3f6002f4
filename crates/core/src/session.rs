//! Single-threaded viewer session: options + input source + scheduler +
//! viewport + status, wired together the way the page uses them.
//!
//! All mutation happens on one cooperative thread. The host drives the
//! session with three calls per frame: drain the backend's outcome (if
//! any) into [`ViewerSession::apply_outcome`], ask
//! [`ViewerSession::poll`] whether a debounced dispatch fired, and flush
//! [`ViewerSession::take_pending_fit`] once the mounted content is
//! measurable (the deferred fit models the frame callback the DOM
//! version needs before the SVG has a layout size).

use profgraph_protocol::{FormatChoice, GraphOptions, InputSource, SourceFormat};

use crate::scheduler::GenerationScheduler;
use crate::status::Status;
use crate::svg::{SvgError, SvgInfo};
use crate::viewport::ViewportTransform;

/// Immutable snapshot handed to the generate backend. Exactly one exists
/// per dispatch; options edited after the snapshot affect only the next
/// request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub options: GraphOptions,
    pub source: InputSource,
}

/// How a dispatched request settled. The backend reduces transport-level
/// detail to these four cases; the session turns each into exactly one
/// status report.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// 2xx response whose payload carried SVG markup.
    Svg(String),
    /// 2xx response whose payload carried an error field.
    App(String),
    /// Non-success HTTP status; `message` is the error body if it parsed.
    Http { status: u16, message: Option<String> },
    /// The request itself failed (network drop, fetch exception, ...).
    Transport(String),
}

/// A successfully mounted graph: the markup for the display surface plus
/// the native size recovered from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedGraph {
    pub markup: String,
    pub width: f64,
    pub height: f64,
}

pub struct ViewerSession {
    options: GraphOptions,
    source: Option<InputSource>,
    scheduler: GenerationScheduler,
    viewport: ViewportTransform,
    status: Status,
    mounted: Option<MountedGraph>,
    fit_pending: bool,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            options: GraphOptions::default(),
            source: None,
            scheduler: GenerationScheduler::new(),
            viewport: ViewportTransform::new(),
            status: Status::info("Select a profile file to begin."),
            mounted: None,
            fit_pending: false,
        }
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Mutable access for the option widgets. Edits do not trigger by
    /// themselves; call [`options_changed`](Self::options_changed) after.
    pub fn options_mut(&mut self) -> &mut GraphOptions {
        &mut self.options
    }

    pub fn source(&self) -> Option<&InputSource> {
        self.source.as_ref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn scheduler(&self) -> &GenerationScheduler {
        &self.scheduler
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportTransform {
        &mut self.viewport
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn mounted(&self) -> Option<&MountedGraph> {
        self.mounted.as_ref()
    }

    pub fn auto_update(&self) -> bool {
        self.scheduler.auto_update()
    }

    pub fn is_generating(&self) -> bool {
        self.scheduler.is_in_flight()
    }

    /// Replace the input source. When the format dropdown is on auto the
    /// inferred format is reported in the status bar (selection itself
    /// stays on auto; the server re-infers on every request).
    pub fn set_source(&mut self, source: InputSource, now_ms: f64) {
        if self.options.format == FormatChoice::Auto
            && let Some(format) = SourceFormat::infer_from_filename(source.file_name())
        {
            self.status = Status::success(format!("Detected format: {format}"));
        }
        self.source = Some(source);
        self.scheduler.trigger(now_ms, true);
    }

    /// Auto-update trigger for any changed option widget.
    pub fn options_changed(&mut self, now_ms: f64) {
        self.scheduler.trigger(now_ms, self.has_source());
    }

    /// Toggle auto-update mode; turning it on immediately attempts a
    /// trigger so the view catches up with edits made in manual mode.
    pub fn set_auto_update(&mut self, on: bool, now_ms: f64) {
        self.scheduler.set_auto_update(on);
        self.scheduler.trigger(now_ms, self.has_source());
    }

    /// Explicit generate (button, Ctrl+Enter). Returns the request to
    /// dispatch, or `None`: without a source this reports the validation
    /// error and sends nothing; while a request is in flight it is
    /// silently dropped.
    pub fn generate_now(&mut self) -> Option<GenerateRequest> {
        if !self.has_source() {
            self.status = Status::error("Please select a profile file.");
            return None;
        }
        if !self.scheduler.generate_now() {
            return None;
        }
        self.snapshot()
    }

    /// Fire the debounce deadline if it has passed. Returns the request
    /// to dispatch; the snapshot is taken here, at least one quiet period
    /// after the last contributing edit.
    pub fn poll(&mut self, now_ms: f64) -> Option<GenerateRequest> {
        if !self.scheduler.poll(now_ms) {
            return None;
        }
        self.snapshot()
    }

    /// Consume the settle of the one in-flight request: report exactly
    /// one status, mount the graph on success, and let the scheduler
    /// schedule the coalesced follow-up if one was requested.
    pub fn apply_outcome(&mut self, outcome: GenerateOutcome, now_ms: f64) {
        self.status = match outcome {
            GenerateOutcome::Svg(markup) => match SvgInfo::parse(&markup) {
                Ok(info) => {
                    self.mounted = Some(MountedGraph {
                        markup,
                        width: info.width,
                        height: info.height,
                    });
                    // Start from identity, then fit once the surface has
                    // laid the content out and can measure it.
                    self.viewport.reset();
                    self.fit_pending = true;
                    Status::success("Ready")
                }
                Err(SvgError::NotSvg) => Status::error("No SVG in response."),
                Err(error) => Status::error(format!("Failed to parse SVG: {error}")),
            },
            GenerateOutcome::App(message) => Status::error(message),
            GenerateOutcome::Http { status, message } => Status::error(
                message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| format!("Server error ({status})")),
            ),
            GenerateOutcome::Transport(message) => {
                Status::error(format!("Request failed: {message}"))
            }
        };
        self.scheduler.complete(now_ms, self.has_source());
    }

    /// Whether a fit-to-view is owed to the freshly mounted content.
    /// Clears the flag; the host calls `viewport_mut().fit_to_view(...)`
    /// with the measured sizes.
    pub fn take_pending_fit(&mut self) -> bool {
        std::mem::take(&mut self.fit_pending)
    }

    // A dispatch is only reachable through source-gated triggers and the
    // source is never unset, so this always snapshots in practice.
    fn snapshot(&mut self) -> Option<GenerateRequest> {
        let source = self.source.clone()?;
        self.status = Status::info("Generating...");
        Some(GenerateRequest {
            options: self.options.clone(),
            source,
        })
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}
