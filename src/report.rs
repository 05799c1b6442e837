//! Build statistics.
//!
//! A [`BuildReport`] is created fresh for every run and never persisted.
//! Per-class counters come from merging per-job results after each scan; the
//! derived-file totals come from [`count_derived`], a recursive walk of the
//! content root that also sees files produced by earlier runs.

use crate::config::PipelineConfig;
use crate::imaging::Codec;
use crate::jobs::{JobClass, ScanWarning};
use crate::naming;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Counters for one job class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassStats {
    /// Sources with at least one regenerated derivative and no failures.
    pub processed: usize,
    /// Sources whose derivatives were all fresh.
    pub skipped: usize,
    /// Sources with at least one failed derivative.
    pub failed: usize,
    /// Individual transcode invocations that succeeded.
    pub encoded: usize,
}

impl ClassStats {
    pub fn merge(&mut self, other: ClassStats) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.encoded += other.encoded;
    }
}

/// Derived files on disk, by codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecCounts {
    pub avif: usize,
    pub webp: usize,
}

impl CodecCounts {
    fn add(&mut self, codec: Codec) {
        match codec {
            Codec::Avif => self.avif += 1,
            Codec::WebP => self.webp += 1,
        }
    }
}

/// A job (or one of its derivatives) that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub class: JobClass,
    /// The offending path: the derivative being written, or the source.
    pub path: PathBuf,
    pub message: String,
}

/// Aggregate outcome of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub thumbnails: ClassStats,
    pub gallery: ClassStats,
    /// Projects without a canonical thumbnail source.
    pub missing_thumbnails: Vec<String>,
    /// Other non-fatal scan findings.
    pub warnings: Vec<ScanWarning>,
    pub failures: Vec<JobFailure>,
    pub derived: CodecCounts,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn stats_mut(&mut self, class: JobClass) -> &mut ClassStats {
        match class {
            JobClass::Thumbnail => &mut self.thumbnails,
            JobClass::Gallery => &mut self.gallery,
        }
    }

    pub fn record_warning(&mut self, warning: ScanWarning) {
        match warning {
            ScanWarning::MissingThumbnail { project } => self.missing_thumbnails.push(project),
            other => self.warnings.push(other),
        }
    }

    /// Total transcode invocations that succeeded in this run.
    pub fn total_encoded(&self) -> usize {
        self.thumbnails.encoded + self.gallery.encoded
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Recursively count derived files under `root`.
///
/// Unreadable subtrees are skipped; the count is informational.
pub fn count_derived(root: &Path, config: &PipelineConfig) -> CodecCounts {
    let mut counts = CodecCounts::default();
    let derived = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file());

    for entry in derived {
        let name = entry.file_name().to_string_lossy();
        if !naming::is_derived_file(&name, &config.thumbnail.filename, &config.gallery.suffix) {
            continue;
        }
        if let Some(codec) = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Codec::from_extension)
        {
            counts.add(codec);
        }
    }
    counts
}
