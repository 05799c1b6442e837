//! High-level transcode operation.
//!
//! Combines an asset class's [`EncodeProfile`] with a codec to build
//! [`TranscodeParams`], makes sure the destination directory exists, and
//! hands the work to the backend.

use super::backend::{BackendError, ImageBackend};
use super::params::{Codec, EncodeProfile, TranscodeParams};
use crate::probe::{self, ProbeError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Decode, resize or encode failed.
    #[error("{0}")]
    Backend(#[from] BackendError),
    /// The destination directory could not be prepared.
    #[error("{0}")]
    Destination(#[from] ProbeError),
}

/// Plan a transcode without executing it.
pub fn plan_transcode(
    source: &Path,
    output: &Path,
    codec: Codec,
    profile: &EncodeProfile,
) -> TranscodeParams {
    TranscodeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        footprint: profile.footprint,
        codec,
        quality: profile.quality_for(codec),
        avif_speed: profile.avif_speed,
    }
}

/// Produce `output` from `source` at the profile's footprint in `codec`.
pub fn transcode(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    codec: Codec,
    profile: &EncodeProfile,
) -> Result<(), TranscodeError> {
    if let Some(dir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        probe::ensure_dir(dir)?;
    }
    let params = plan_transcode(source, output, codec, profile);
    backend.transcode(&params)?;
    Ok(())
}
