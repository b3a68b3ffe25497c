use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::render::{Template, TypesetEngine};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Read-only after startup; every request gets its own scratch directory.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Resolved once at startup from `OUTPUT_DIR` or the service default.
    pub output_dir: PathBuf,
    /// Parsed once at startup so a malformed template fails fast.
    pub template: Arc<Template>,
    /// Pluggable typesetting backend. Default: `PdfLatex`.
    pub engine: Arc<dyn TypesetEngine>,
}
