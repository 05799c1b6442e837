//! Parameter types for transcoding.
//!
//! These describe *what* to produce. The [`backend`](super::backend) decides
//! *how*, which lets tests swap in a recording mock.
//!
//! - [`Codec`] — output codec: AVIF (modern, small) or WebP (fallback).
//! - [`Footprint`] — exact output width × height; always cover-fitted.
//! - [`Quality`] — lossy encoding quality (1–100). Clamped on construction.
//! - [`EncodeProfile`] — per asset class: footprint plus per-codec quality.
//! - [`TranscodeParams`] — one fully specified source → output transcode.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Output codec of a derived asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Codec {
    Avif,
    WebP,
}

impl Codec {
    /// Both codecs, in the order they are generated.
    pub const ALL: [Codec; 2] = [Codec::Avif, Codec::WebP];

    pub fn extension(self) -> &'static str {
        match self {
            Codec::Avif => "avif",
            Codec::WebP => "webp",
        }
    }

    /// Codec for a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Codec> {
        Codec::ALL
            .into_iter()
            .find(|codec| ext.eq_ignore_ascii_case(codec.extension()))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Avif => f.write_str("AVIF"),
            Codec::WebP => f.write_str("WebP"),
        }
    }
}

/// Exact pixel dimensions of a derived asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encoding settings shared by every derivative of one asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeProfile {
    pub footprint: Footprint,
    pub avif_quality: Quality,
    pub webp_quality: Quality,
    /// rav1e speed, 1 (slowest, smallest) to 10.
    pub avif_speed: u8,
}

impl EncodeProfile {
    pub fn quality_for(&self, codec: Codec) -> Quality {
        match codec {
            Codec::Avif => self.avif_quality,
            Codec::WebP => self.webp_quality,
        }
    }
}

/// Everything the backend needs for one transcode.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub footprint: Footprint,
    pub codec: Codec,
    pub quality: Quality,
    pub avif_speed: u8,
}
