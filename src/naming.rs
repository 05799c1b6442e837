//! Filename conventions for sources and derived assets.
//!
//! Derived files live next to their sources and are found by the web layer
//! purely by name, so the rules here are the output contract:
//!
//! - `alpha/thumbnail.jpg` → `alpha/thumbnail.avif`, `alpha/thumbnail.webp`
//! - `alpha/images/a.jpg` → `alpha/images/a_thumb.avif`, `a_thumb.webp`
//!
//! ## Base-name collisions
//!
//! `a.jpg` and `a.png` in the same gallery would both map to `a_thumb.*`.
//! When a base name is shared (ignoring case), every source in that group
//! keeps its full file name in the derived name instead (`a.jpg_thumb.avif`,
//! `a.png_thumb.avif`). Unshared names keep the conventional form.
//!
//! The final stems are then checked as a whole, again ignoring case. Should two
//! still clash (`a.JPG` next to `a.jpg`, or `a.jpg.png` next to `a.jpg` and
//! `a.png`), the first in listing order keeps its stem and the others move to
//! `<file name>~<n><suffix>`.
//!
//! ## Derived files are not sources
//!
//! A gallery may contain `.webp` sources, and derived WebP files sit in the
//! same directory. Anything whose extension is an output codec and whose stem
//! ends with the derived suffix is recognised as a derivative and never
//! enumerated as a source.

use crate::imaging::Codec;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Dot-files and dot-directories, including macOS `._*` resource forks.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether a project directory name is ignored (hidden or archive-like).
pub fn is_skipped_project(name: &str, skip_suffixes: &[String]) -> bool {
    is_hidden(name)
        || skip_suffixes
            .iter()
            .any(|suffix| name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()))
}

/// Lowercased extension of `path` if it is on `allow_list` (case-insensitive).
pub fn allowed_extension(path: &Path, allow_list: &[String]) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    allow_list
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        .then(|| ext.to_ascii_lowercase())
}

/// Candidate thumbnail source paths, in preference order.
pub fn thumbnail_candidates(project_dir: &Path, stem: &str, extensions: &[String]) -> Vec<PathBuf> {
    extensions
        .iter()
        .map(|ext| project_dir.join(format!("{stem}.{ext}")))
        .collect()
}

/// `thumbnail` + AVIF → `thumbnail.avif`.
pub fn derived_file_name(derived_stem: &str, codec: Codec) -> String {
    format!("{}.{}", derived_stem, codec.extension())
}

/// Whether `file_name` is a gallery derivative produced with `suffix`.
pub fn is_derived_gallery_file(file_name: &str, suffix: &str) -> bool {
    let path = Path::new(file_name);
    let is_output_codec = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Codec::from_extension)
        .is_some();
    let stem_matches = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(suffix));
    is_output_codec && stem_matches
}

/// Whether `file_name` is any derivative (thumbnail or gallery).
///
/// Used for the final count, so a `.webp` gallery *source* is not counted.
pub fn is_derived_file(file_name: &str, thumbnail_stem: &str, gallery_suffix: &str) -> bool {
    let path = Path::new(file_name);
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let is_output_codec = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Codec::from_extension)
        .is_some();
    is_output_codec && (stem == thumbnail_stem || stem.ends_with(gallery_suffix))
}

/// Assign a derived stem to every gallery source in one directory.
///
/// `sources` are the allowed, non-derived source files of a single gallery,
/// in listing order. Returns `(source, derived_stem)` pairs in the input order.
///
/// Stems are unique ignoring ASCII case, so no two sources share a derivative
/// even on case-insensitive filesystems.
pub fn assign_gallery_stems(sources: &[PathBuf], suffix: &str) -> Vec<(PathBuf, String)> {
    let mut base_counts: HashMap<String, usize> = HashMap::new();
    for source in sources {
        *base_counts.entry(base_name(source).to_ascii_lowercase()).or_default() += 1;
    }

    let preferred: Vec<String> = sources
        .iter()
        .map(|source| {
            let base = base_name(source);
            if base_counts[&base.to_ascii_lowercase()] > 1 {
                format!("{}{suffix}", file_name(source))
            } else {
                format!("{base}{suffix}")
            }
        })
        .collect();

    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for stem in &preferred {
        *stem_counts.entry(stem.to_ascii_lowercase()).or_default() += 1;
    }

    // Uncontested stems are reserved up front so no fallback can take them
    let mut taken: HashSet<String> = stem_counts
        .iter()
        .filter(|(_, count)| **count == 1)
        .map(|(stem, _)| stem.clone())
        .collect();

    sources
        .iter()
        .zip(preferred)
        .map(|(source, stem)| {
            let key = stem.to_ascii_lowercase();
            if stem_counts[&key] == 1 || taken.insert(key) {
                return (source.clone(), stem);
            }
            let name = file_name(source);
            let fallback = std::iter::once(format!("{name}{suffix}"))
                .chain((2..).map(|n| format!("{name}~{n}{suffix}")))
                .find(|candidate| !taken.contains(&candidate.to_ascii_lowercase()))
                .unwrap_or_default();
            taken.insert(fallback.to_ascii_lowercase());
            (source.clone(), fallback)
        })
        .collect()
}

fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
