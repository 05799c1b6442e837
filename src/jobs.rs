//! Asset job enumeration.
//!
//! Two independent scans over the content root, both tolerant of missing
//! structure:
//!
//! 1. **Thumbnails**: each project's canonical `thumbnail.<ext>` yields one
//!    [`AssetCandidate`] with an AVIF and a WebP target at the thumbnail
//!    footprint. A project without one produces a
//!    [`ScanWarning::MissingThumbnail`], not an error.
//! 2. **Gallery**: each allowed, non-hidden file in a project's gallery folder
//!    yields one candidate with two targets at the gallery footprint.
//!
//! Candidates list *every* target. [`resolve`] then narrows a candidate to a
//! [`RegenerationJob`] holding only the targets that are missing or stale, or
//! to nothing when all of them are fresh.
//!
//! Only a failure to list the content root itself is an error.

use crate::config::PipelineConfig;
use crate::imaging::{Codec, EncodeProfile};
use crate::naming;
use crate::probe::{self, Entry, Presence, ProbeError};
use crate::staleness;
use std::fmt;
use std::path::{Path, PathBuf};

/// The two kinds of derived asset the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobClass {
    Thumbnail,
    Gallery,
}

impl fmt::Display for JobClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobClass::Thumbnail => f.write_str("thumbnail"),
            JobClass::Gallery => f.write_str("gallery"),
        }
    }
}

/// One derived file: a codec and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTarget {
    pub codec: Codec,
    pub path: PathBuf,
}

/// A source raster and the project it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Project directory name.
    pub project: String,
    pub path: PathBuf,
    /// `alpha` for thumbnails, `alpha/a.jpg` for gallery images.
    pub label: String,
}

/// A source with all of its potential derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCandidate {
    pub class: JobClass,
    pub source: SourceImage,
    pub profile: EncodeProfile,
    pub targets: Vec<DerivedTarget>,
}

/// A source with only the derivatives that must be regenerated. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationJob {
    pub class: JobClass,
    pub source: SourceImage,
    pub profile: EncodeProfile,
    pub targets: Vec<DerivedTarget>,
}

/// Non-fatal findings from a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// A project has no canonical thumbnail source.
    MissingThumbnail { project: String },
    /// An optional directory exists but could not be listed.
    UnreadableDirectory { path: PathBuf, message: String },
}

/// Result of one scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub candidates: Vec<AssetCandidate>,
    pub warnings: Vec<ScanWarning>,
}

/// Project directories under the content root, skipping hidden and archive names.
///
/// This is the only listing whose failure is fatal.
pub fn project_dirs(root: &Path, config: &PipelineConfig) -> Result<Vec<Entry>, ProbeError> {
    Ok(probe::list_entries(root)?
        .into_iter()
        .filter(|entry| entry.is_dir && !naming::is_skipped_project(&entry.name, &config.skip_suffixes))
        .collect())
}

fn targets_for(dir: &Path, derived_stem: &str) -> Vec<DerivedTarget> {
    Codec::ALL
        .into_iter()
        .map(|codec| DerivedTarget {
            codec,
            path: dir.join(naming::derived_file_name(derived_stem, codec)),
        })
        .collect()
}

/// Scan every project for its canonical thumbnail.
pub fn enumerate_thumbnails(
    root: &Path,
    config: &PipelineConfig,
) -> Result<ScanOutcome, ProbeError> {
    let settings = &config.thumbnail;
    let profile = config.thumbnail_profile();
    let mut outcome = ScanOutcome::default();

    for project in project_dirs(root, config)? {
        let candidates =
            naming::thumbnail_candidates(&project.path, &settings.filename, &settings.extensions);
        let Presence::Present(source) = probe::first_existing(candidates) else {
            outcome.warnings.push(ScanWarning::MissingThumbnail {
                project: project.name,
            });
            continue;
        };

        outcome.candidates.push(AssetCandidate {
            class: JobClass::Thumbnail,
            targets: targets_for(&project.path, &settings.filename),
            source: SourceImage {
                label: project.name.clone(),
                project: project.name,
                path: source,
            },
            profile,
        });
    }

    Ok(outcome)
}

/// Scan every project's gallery folder for allowed source images.
pub fn enumerate_gallery(root: &Path, config: &PipelineConfig) -> Result<ScanOutcome, ProbeError> {
    let settings = &config.gallery;
    let profile = config.gallery_profile();
    let mut outcome = ScanOutcome::default();

    for project in project_dirs(root, config)? {
        let gallery_dir = project.path.join(&settings.dir);
        let entries = match probe::list_optional(&gallery_dir) {
            Ok(Presence::Present(entries)) => entries,
            Ok(Presence::Absent) => continue,
            Err(e) => {
                outcome.warnings.push(ScanWarning::UnreadableDirectory {
                    path: gallery_dir,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let sources: Vec<PathBuf> = entries
            .into_iter()
            .filter(|entry| !entry.is_dir && !naming::is_hidden(&entry.name))
            .filter(|entry| !naming::is_derived_gallery_file(&entry.name, &settings.suffix))
            .filter(|entry| naming::allowed_extension(&entry.path, &settings.extensions).is_some())
            .map(|entry| entry.path)
            .collect();

        for (source, derived_stem) in naming::assign_gallery_stems(&sources, &settings.suffix) {
            let file_name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            outcome.candidates.push(AssetCandidate {
                class: JobClass::Gallery,
                targets: targets_for(&gallery_dir, &derived_stem),
                source: SourceImage {
                    label: format!("{}/{}", project.name, file_name),
                    project: project.name.clone(),
                    path: source,
                },
                profile,
            });
        }
    }

    Ok(outcome)
}

/// Narrow a candidate to the targets that need regeneration.
///
/// `Ok(None)` means every target is fresh. Each target is checked on its own.
pub fn resolve(candidate: &AssetCandidate) -> Result<Option<RegenerationJob>, ProbeError> {
    let mut stale = Vec::new();
    for target in &candidate.targets {
        if staleness::needs_regeneration(&candidate.source.path, &target.path)? {
            stale.push(target.clone());
        }
    }

    if stale.is_empty() {
        return Ok(None);
    }
    Ok(Some(RegenerationJob {
        class: candidate.class,
        source: candidate.source.clone(),
        profile: candidate.profile,
        targets: stale,
    }))
}
