//! Per-worker text rendering state.

use std::sync::Arc;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::pattern::PatternCache;
use crate::stringify;
use crate::value::Value;

/// Everything the text side of serialization needs: the worker's [`PatternCache`] and the
/// diagnostic channel for recovered failures.
///
/// A renderer belongs to one worker and is passed by `&mut` into rendering, so compiled
/// patterns are never shared between workers.
///
/// # Examples
///
/// ```rust
/// use logfields::render::Renderer;
/// use logfields::structured::key_value_with_pattern;
///
/// let mut renderer = Renderer::new();
/// let marker = key_value_with_pattern("k", 5, "{0}:{1}").unwrap();
/// assert_eq!(marker.render(&mut renderer), "k:5");
/// assert_eq!(renderer.patterns().len(), 1);
/// ```
#[derive(Debug)]
pub struct Renderer {
    pub(crate) patterns: PatternCache,
    pub(crate) diagnostics: Arc<dyn Diagnostics>,
}

impl Renderer {
    /// Creates a renderer reporting to [`TracingDiagnostics`].
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(TracingDiagnostics))
    }

    /// Creates a renderer reporting to `diagnostics`.
    pub fn with_diagnostics(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            patterns: PatternCache::new(),
            diagnostics,
        }
    }

    /// The patterns compiled by this renderer so far.
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Renders a plain value, see [`stringify::to_display_string`].
    pub fn render_value(&self, value: &Value) -> String {
        stringify::to_display_string(value, &*self.diagnostics)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
