// crates/reel-engine/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while serving frames. Never propagated past the scheduler —
/// each is logged once and folded into an empty/partial `Frame` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open media {path}: {source}")]
    MediaOpenFailed { path: PathBuf, source: anyhow::Error },

    #[error("failed to decode frame from {path}")]
    MediaDecodeFailed { path: PathBuf },

    #[error("request cancelled")]
    Cancelled,
}
