//! Filesystem probing.
//!
//! Every staleness decision in the pipeline is made from live filesystem state
//! read through this module: existence, modification time and directory
//! membership. Nothing is remembered between runs.
//!
//! ## Absent vs. broken
//!
//! Optional structure (a project without a gallery folder) is expected to be
//! missing. [`list_optional`] reports that as [`Presence::Absent`] and keeps
//! real I/O failures (permissions, a file where a directory should be) as
//! errors, so callers can tolerate the first without swallowing the second.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ProbeError::NotFound(path.to_path_buf())
        } else {
            ProbeError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Something that may legitimately be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence<T> {
    Present(T),
    Absent,
}

/// A single directory entry, as listed by [`list_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    /// File name, lossily converted for non-UTF-8 names.
    pub name: String,
    pub is_dir: bool,
}

pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Modification time of `path`. Fails with [`ProbeError::NotFound`] when absent.
pub fn mod_time(path: &Path) -> Result<SystemTime, ProbeError> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| ProbeError::from_io(path, e))
}

/// Create `path` (and parents). An already existing directory is not an error.
pub fn ensure_dir(path: &Path) -> Result<(), ProbeError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(ProbeError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// List the entries of `dir`, sorted by file name.
///
/// Sorting keeps build logs reproducible; nothing downstream depends on order.
pub fn list_entries(dir: &Path) -> Result<Vec<Entry>, ProbeError> {
    let read = fs::read_dir(dir).map_err(|e| ProbeError::from_io(dir, e))?;

    let mut entries = Vec::new();
    for item in read {
        let item = item.map_err(|e| ProbeError::from_io(dir, e))?;
        let path = item.path();
        // file_type() does not follow symlinks; a symlinked project dir should count
        let is_dir = path.is_dir();
        entries.push(Entry {
            name: item.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Like [`list_entries`], but a missing directory is [`Presence::Absent`].
pub fn list_optional(dir: &Path) -> Result<Presence<Vec<Entry>>, ProbeError> {
    match list_entries(dir) {
        Ok(entries) => Ok(Presence::Present(entries)),
        Err(ProbeError::NotFound(_)) => Ok(Presence::Absent),
        Err(e) => Err(e),
    }
}

/// First of `candidates` that exists on disk.
pub fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Presence<PathBuf> {
    candidates
        .into_iter()
        .find(|path| path.is_file())
        .map_or(Presence::Absent, Presence::Present)
}
