//! # Folio Assets
//!
//! Incremental derivation of web-ready image assets for a portfolio content
//! tree. Every project directory may carry a canonical `thumbnail.<ext>` and a
//! gallery folder of source images; for each of those sources this crate keeps
//! an AVIF and a WebP derivative, cover-fitted to a fixed footprint, sitting
//! right next to the source.
//!
//! ```text
//! content/projects/
//! ├── config.toml              # Optional overrides (see `gen-config`)
//! ├── alpha/
//! │   ├── thumbnail.jpg        # Canonical source
//! │   ├── thumbnail.avif       # 300x400 derivative
//! │   ├── thumbnail.webp
//! │   └── images/
//! │       ├── a.jpg
//! │       ├── a_thumb.avif     # 300x300 derivative
//! │       └── a_thumb.webp
//! └── beta.zip                 # Skipped
//! ```
//!
//! # Architecture: Scan → Resolve → Transcode → Aggregate
//!
//! ```text
//! 1. Enumerate  content root → candidates   (thumbnails, then gallery images)
//! 2. Resolve    candidate    → job | fresh  (per-derivative timestamp check)
//! 3. Transcode  job          → files        (bounded rayon pool, atomic writes)
//! 4. Aggregate  results      → BuildReport  (counts, failures, elapsed time)
//! ```
//!
//! No state survives between runs: the filesystem is the only cache. A second
//! run over an unchanged tree performs zero transcodes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`probe`] | Existence, mtime, listings and directory creation with typed errors |
//! | [`staleness`] | Source-vs-derivative freshness decision |
//! | [`naming`] | Source and derivative filename conventions, collision handling |
//! | [`jobs`] | Thumbnail and gallery enumeration, candidate → job resolution |
//! | [`imaging`] | Cover-fit + AVIF/WebP encoding behind the `ImageBackend` trait |
//! | [`pipeline`] | Stage state machine, worker pool, progress events, dry-run plan |
//! | [`report`] | Per-run statistics and the derived-file count |
//! | [`config`] | `config.toml` loading over stock defaults, validation |
//! | [`output`] | CLI output formatting for events, reports and plans |
//!
//! # Design Decisions
//!
//! ## Per-Derivative Staleness
//!
//! Each derivative is checked on its own: a missing WebP next to a fresh AVIF
//! re-encodes only the WebP. A derivative is fresh when its mtime is at least
//! the source's. Equal timestamps count as fresh, which keeps coarse-grained
//! filesystems from rebuilding everything on every run.
//!
//! ## Failures Stay Local
//!
//! A corrupt source or a failed encode is recorded in the
//! [`BuildReport`](report::BuildReport) and the batch moves on. Only an
//! unreadable content root aborts the run. Because output is written to a
//! temp file and renamed into place, a failed encode never leaves a truncated
//! derivative that would look fresh next time.
//!
//! ## No External Tools
//!
//! Decoding and AVIF encoding use the `image` crate (rav1e underneath); lossy
//! WebP comes from the `webp` crate, which builds a vendored libwebp. No
//! ImageMagick, no subprocesses, nothing to install next to the binary.

pub mod config;
pub mod imaging;
pub mod jobs;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod staleness;

#[cfg(test)]
pub(crate) mod test_helpers;
