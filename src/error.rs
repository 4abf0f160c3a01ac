//
//  error.rs
//  symgraph
//

use std::path::PathBuf;

/// Errors that abort a unit or a whole run.
///
/// Per-node problems never surface here; the emitter records them as
/// [`Diagnostic`](crate::graph::Diagnostic)s and keeps walking.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Span {start}..{end} is outside {file} ({len} chars)")]
    SpanOutOfBounds {
        file: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Error budget exceeded in {file}: {errors} node errors (budget {budget})")]
    ErrorBudgetExceeded {
        file: String,
        errors: usize,
        budget: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
