// crates/reel-core/src/error.rs

use thiserror::Error;

/// Errors that can surface while parsing or validating a composition
/// document. Everything past `create()`/`parse()` is handled inside
/// `reel-engine` instead — a malformed document is the only thing this
/// crate itself refuses to proceed with.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("composition document is invalid: {0}")]
    CompositionInvalid(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
