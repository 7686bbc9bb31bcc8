//! Driver seams: the browser and the snapshot/metric collaborators.
//!
//! The rendering engine is an external collaborator. Everything the core
//! needs from it goes through [`PageDriver`]: resolve a query against the
//! current document, perform one action, report the current URL and the
//! document-ready signal. Resolution returns detached [`ElementState`]
//! snapshots; a snapshot is stale the moment the page re-renders, so
//! callers keep the [`crate::locator::ElementQuery`] and re-resolve.

use crate::locator::ElementQuery;
use crate::result::ComprarResult;

/// Detached snapshot of one resolved element.
///
/// This is a value, not a handle: it does not track the live element and
/// must not be held across waits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementState {
    /// Rendered text content
    pub text: String,
    /// Current input value (empty for non-inputs)
    pub value: String,
    /// Whether the element is visible
    pub visible: bool,
}

impl ElementState {
    /// Create a visible element snapshot with text content
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: String::new(),
            visible: true,
        }
    }

    /// Create a visible input snapshot with a value
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            value: value.into(),
            visible: true,
        }
    }
}

/// The browser seam consumed by the command queue engine.
///
/// Implementations resolve queries against the live document at call
/// time. An empty result from [`PageDriver::resolve`] is not an error;
/// the engine decides what emptiness means per command kind.
pub trait PageDriver {
    /// Resolve a query against the current document, evaluated now.
    fn resolve(&self, query: &ElementQuery) -> Vec<ElementState>;

    /// Click the first element matching the query.
    fn click(&mut self, query: &ElementQuery) -> ComprarResult<()>;

    /// Clear the first matching input and type `text` into it. Typing
    /// into a `<select>` chooses the option with that value.
    fn type_text(&mut self, query: &ElementQuery, text: &str) -> ComprarResult<()>;

    /// Navigate to an absolute URL.
    fn visit(&mut self, url: &str) -> ComprarResult<()>;

    /// The current document URL.
    fn current_url(&self) -> String;

    /// Whether the document has signalled ready.
    fn document_ready(&self) -> bool;
}

/// Fire-and-forget snapshot/metric collaborator.
///
/// Capture mechanics (screenshots, video) live outside the core; the core
/// only requests a named snapshot or records a named metric and moves on.
pub trait Recorder {
    /// Request a named snapshot of the current page.
    fn capture_snapshot(&mut self, name: &str);

    /// Record a named metric value.
    fn record_metric(&mut self, name: &str, value: f64);
}

/// Recorder that drops every request, with a trace for debugging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn capture_snapshot(&mut self, name: &str) {
        tracing::debug!(snapshot = name, "snapshot requested (null recorder)");
    }

    fn record_metric(&mut self, name: &str, value: f64) {
        tracing::debug!(metric = name, value, "metric recorded (null recorder)");
    }
}
