//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between job scheduling and pixel
//! work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests use the recording
//! `MockBackend` below.

use super::params::TranscodeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// `Sync` because jobs run on a rayon pool and share one backend.
pub trait ImageBackend: Sync {
    /// Decode `params.source`, cover-fit it to `params.footprint`, encode with
    /// `params.codec` and replace `params.output` atomically.
    fn transcode(&self, params: &TranscodeParams) -> Result<(), BackendError>;
}
