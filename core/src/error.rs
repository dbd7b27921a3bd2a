//! Error types for snippet rendering.
//!
//! # Design
//! Rendering is a pure transform over data that is already in memory, with
//! one exception: file parts spooled to disk are read while the multipart
//! body is assembled. A failed read aborts the whole render rather than
//! leaving a half-built body behind. Responses fail only on a status code
//! that HTTP cannot express.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `RequestRenderer::render` and `ResponseRenderer::render`.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A file part backed by a path on disk could not be read.
    #[error("failed to read file part `{field}` from {}", .path.display())]
    PartRead {
        field: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A captured status code outside `100..=999`.
    #[error("invalid HTTP status code {status}")]
    InvalidStatus { status: u16 },
}
