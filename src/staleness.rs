//! Staleness resolution from modification times.
//!
//! A derived file is regenerated when it is missing, or when its source is
//! strictly newer. Equal timestamps count as fresh, since coarse-clock
//! filesystems (FAT, some network mounts) often stamp a source and a
//! derivative written in the same second identically.
//!
//! Each derivative is resolved on its own, so a run may rebuild only the
//! WebP file for an image whose AVIF file is still fresh.

use crate::probe::{self, ProbeError};
use std::path::Path;

/// State of one derived file relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Missing,
    Stale,
    Fresh,
}

impl Freshness {
    pub fn needs_regeneration(self) -> bool {
        !matches!(self, Freshness::Fresh)
    }
}

/// Compare `source` against `derived` on disk.
///
/// Fails only if the source itself cannot be probed.
pub fn resolve(source: &Path, derived: &Path) -> Result<Freshness, ProbeError> {
    if !probe::exists(derived) {
        return Ok(Freshness::Missing);
    }
    let source_time = probe::mod_time(source)?;
    let derived_time = match probe::mod_time(derived) {
        Ok(t) => t,
        // Removed between the existence check and the stat
        Err(ProbeError::NotFound(_)) => return Ok(Freshness::Missing),
        Err(e) => return Err(e),
    };

    if source_time > derived_time {
        Ok(Freshness::Stale)
    } else {
        Ok(Freshness::Fresh)
    }
}

pub fn needs_regeneration(source: &Path, derived: &Path) -> Result<bool, ProbeError> {
    resolve(source, derived).map(Freshness::needs_regeneration)
}
