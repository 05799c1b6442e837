//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Cover fit | centered `crop_imm` from [`plan_cover`], then `resize_exact` with `Lanczos3` |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | Encode → WebP | `webp::Encoder` (lossy, quality-driven) |
//! | Atomic write | `tempfile::Builder` in the destination dir + `persist` |
//!
//! Output is always encoded fully in memory and then written to a hidden
//! `.partial` file next to the destination. Only a completed encode is
//! renamed into place, so a crash or encode error never leaves a truncated
//! derivative that the next run would mistake for a fresh one.

use super::backend::{BackendError, ImageBackend};
use super::calculations::plan_cover;
use super::params::{Codec, Footprint, Quality, TranscodeParams};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Write;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
///
/// The format is sniffed from content, so a PNG saved as `.jpg` still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Crop the centered window with the footprint's aspect ratio, then scale it.
fn cover_fit(img: &DynamicImage, footprint: Footprint) -> Result<DynamicImage, BackendError> {
    let plan = plan_cover(img.dimensions(), (footprint.width, footprint.height)).ok_or_else(|| {
        BackendError::ProcessingFailed(format!(
            "Cannot fit {}x{} image into {}",
            img.width(),
            img.height(),
            footprint
        ))
    })?;

    let (x, y) = plan.crop_origin;
    let (w, h) = plan.crop_size;
    let window = img.crop_imm(x, y, w, h);
    Ok(window.resize_exact(footprint.width, footprint.height, FilterType::Lanczos3))
}

/// Both encoders take 8-bit RGB or RGBA only.
fn to_8bit(img: DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

fn encode(
    img: &DynamicImage,
    codec: Codec,
    quality: Quality,
    avif_speed: u8,
) -> Result<Vec<u8>, BackendError> {
    match codec {
        Codec::Avif => encode_avif(img, quality, avif_speed),
        Codec::WebP => encode_webp(img, quality),
    }
}

/// Encode as AVIF using rav1e via the `image` crate.
fn encode_avif(img: &DynamicImage, quality: Quality, speed: u8) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
        &mut bytes,
        speed,
        quality.value() as u8,
    );
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))?;
    Ok(bytes)
}

/// Encode as lossy WebP.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let encoder = webp::Encoder::from_image(img)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {}", e)))?;
    Ok(encoder.encode(quality.value() as f32).to_vec())
}

/// Write `bytes` to a temp file beside `dest`, then rename over `dest`.
///
/// The temp file is hidden and carries no image extension, so neither the
/// staleness check nor the final derived-file count ever sees it.
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn transcode(&self, params: &TranscodeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let fitted = to_8bit(cover_fit(&img, params.footprint)?);
        let bytes = encode(&fitted, params.codec, params.quality, params.avif_speed)?;
        write_atomically(&params.output, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{write_jpeg, write_png_rgba};
    use std::fs;
    use tempfile::TempDir;

    fn params(source: &Path, output: &Path, codec: Codec, w: u32, h: u32) -> TranscodeParams {
        TranscodeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            footprint: Footprint::new(w, h),
            codec,
            quality: Quality::new(75),
            avif_speed: 10,
        }
    }

    #[test]
    fn cover_fit_produces_exact_footprint() {
        let img = DynamicImage::new_rgb8(80, 60);
        let fitted = cover_fit(&img, Footprint::new(30, 40)).unwrap();
        assert_eq!(fitted.dimensions(), (30, 40));

        let img = DynamicImage::new_rgb8(60, 80);
        let fitted = cover_fit(&img, Footprint::new(30, 30)).unwrap();
        assert_eq!(fitted.dimensions(), (30, 30));
    }

    #[test]
    fn cover_fit_crops_from_center() {
        // Left and right thirds red, middle third green: a square crop keeps green
        let img = image::RgbImage::from_fn(90, 30, |x, _| {
            if (30..60).contains(&x) {
                image::Rgb([0, 255, 0])
            } else {
                image::Rgb([255, 0, 0])
            }
        });
        let fitted = cover_fit(&DynamicImage::ImageRgb8(img), Footprint::new(30, 30)).unwrap();
        let center = fitted.to_rgb8().get_pixel(15, 15).0;
        assert!(center[1] > 200 && center[0] < 50, "center pixel was {center:?}");
    }

    #[test]
    fn cover_fit_handles_extreme_aspect_ratios() {
        let strip = DynamicImage::new_rgb8(10_000, 1);
        let fitted = cover_fit(&strip, Footprint::new(300, 300)).unwrap();
        assert_eq!(fitted.dimensions(), (300, 300));

        let column = DynamicImage::new_rgb8(2, 5_000);
        let fitted = cover_fit(&column, Footprint::new(30, 40)).unwrap();
        assert_eq!(fitted.dimensions(), (30, 40));
    }

    #[test]
    fn to_8bit_keeps_alpha_only_when_present() {
        let rgba = DynamicImage::new_rgba16(2, 2);
        assert!(matches!(to_8bit(rgba), DynamicImage::ImageRgba8(_)));
        let luma = DynamicImage::new_luma8(2, 2);
        assert!(matches!(to_8bit(luma), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn transcode_jpeg_to_webp_has_footprint_dimensions() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        write_jpeg(&source, 80, 60);

        let output = tmp.path().join("source_thumb.webp");
        RustBackend::new()
            .transcode(&params(&source, &output, Codec::WebP, 30, 30))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (30, 30));
    }

    #[test]
    fn transcode_png_with_alpha_to_avif() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        write_png_rgba(&source, 40, 40);

        let output = tmp.path().join("thumbnail.avif");
        RustBackend::new()
            .transcode(&params(&source, &output, Codec::Avif, 30, 40))
            .unwrap();

        assert!(output.exists());
        assert!(fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn transcode_corrupt_source_fails_without_output() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        fs::write(&source, "definitely not a jpeg").unwrap();

        let output = tmp.path().join("broken_thumb.avif");
        let result = RustBackend::new().transcode(&params(&source, &output, Codec::Avif, 30, 30));

        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
        // No leftover temp files either
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn transcode_missing_source_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = RustBackend::new().transcode(&params(
            &tmp.path().join("gone.jpg"),
            &tmp.path().join("gone_thumb.webp"),
            Codec::WebP,
            30,
            30,
        ));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn write_atomically_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("thumbnail.webp");
        fs::write(&dest, "old").unwrap();

        write_atomically(&dest, b"new").unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"new");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
