//! End-to-end builds with the real image backend on small synthetic images.
//!
//! Footprints are shrunk through `config.toml` and AVIF runs at its fastest
//! speed so real encodes stay quick in debug builds.

use folio_assets::config::{self, CONFIG_FILENAME};
use folio_assets::pipeline::{self, PipelineError};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const SMALL_CONFIG: &str = r#"
[thumbnail]
width = 24
height = 32

[gallery]
width = 20
height = 20

[encoding]
avif_speed = 10

[processing]
max_processes = 2
"#;

fn content_root() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(CONFIG_FILENAME), SMALL_CONFIG).unwrap();
    tmp
}

fn write_rgb(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_fn(width, height, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 90]))
        .save(path)
        .unwrap();
}

fn write_rgba(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_fn(width, height, |x, _| Rgba([10, 200, 10, (x * 6) as u8]))
        .save(path)
        .unwrap();
}

fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

fn is_avif(path: &Path) -> bool {
    let bytes = fs::read(path).unwrap();
    bytes.len() > 12 && &bytes[4..8] == b"ftyp"
}

fn sample_project(root: &Path) -> Vec<PathBuf> {
    let sources = vec![
        root.join("alpha/thumbnail.jpg"),
        root.join("alpha/images/a.jpg"),
        root.join("alpha/images/b.png"),
        root.join("alpha/images/c.webp"),
    ];
    write_rgb(&sources[0], 60, 40);
    write_rgb(&sources[1], 50, 70);
    write_rgba(&sources[2], 40, 40);
    write_rgb(&sources[3], 30, 30);
    sources
}

#[test]
fn build_derives_every_asset_then_rebuild_does_nothing() {
    let tmp = content_root();
    let root = tmp.path();
    sample_project(root);
    let config = config::load_config(root).unwrap();

    let report = pipeline::run(root, &config, None).unwrap();

    let source_time = modified(&root.join("alpha/thumbnail.jpg"));
    for name in ["thumbnail.avif", "thumbnail.webp"] {
        assert!(modified(&root.join("alpha").join(name)) >= source_time, "{name}");
    }
    assert_eq!(report.thumbnails.processed, 1);
    assert_eq!(report.gallery.processed, 3);
    assert_eq!(report.total_encoded(), 8);
    assert!(report.is_clean(), "failures: {:?}", report.failures);
    assert_eq!(report.derived.avif, 4);
    // c.webp is a source, not a derivative
    assert_eq!(report.derived.webp, 4);

    assert_eq!(
        image::image_dimensions(root.join("alpha/thumbnail.webp")).unwrap(),
        (24, 32)
    );
    for name in ["a_thumb.webp", "b_thumb.webp", "c_thumb.webp"] {
        assert_eq!(
            image::image_dimensions(root.join("alpha/images").join(name)).unwrap(),
            (20, 20)
        );
    }
    assert!(is_avif(&root.join("alpha/thumbnail.avif")));
    assert!(is_avif(&root.join("alpha/images/b_thumb.avif")));

    let again = pipeline::run(root, &config, None).unwrap();
    assert_eq!(again.total_encoded(), 0);
    assert_eq!(again.thumbnails.skipped, 1);
    assert_eq!(again.gallery.skipped, 3);
    assert_eq!(again.derived, report.derived);
}

#[test]
fn only_the_touched_source_is_rebuilt() {
    let tmp = content_root();
    let root = tmp.path();
    let sources = sample_project(root);
    let config = config::load_config(root).unwrap();
    pipeline::run(root, &config, None).unwrap();

    let before = modified(&root.join("alpha/images/b_thumb.avif"));
    set_mtime(&sources[1], SystemTime::now() + Duration::from_secs(120));

    let report = pipeline::run(root, &config, None).unwrap();

    assert_eq!(report.gallery.processed, 1);
    assert_eq!(report.gallery.skipped, 2);
    assert_eq!(report.thumbnails.skipped, 1);
    assert_eq!(modified(&root.join("alpha/images/b_thumb.avif")), before);
}

#[test]
fn corrupt_source_is_reported_and_the_rest_completes() {
    let tmp = content_root();
    let root = tmp.path();
    sample_project(root);
    fs::write(root.join("alpha/images/broken.jpg"), "not an image").unwrap();
    let config = config::load_config(root).unwrap();

    let report = pipeline::run(root, &config, None).unwrap();

    assert_eq!(report.gallery.failed, 1);
    assert_eq!(report.gallery.processed, 3);
    assert_eq!(report.failures.len(), 2);
    assert!(!root.join("alpha/images/broken_thumb.avif").exists());
    assert!(!root.join("alpha/images/broken_thumb.webp").exists());
    assert!(root.join("alpha/images/a_thumb.webp").exists());
}

#[test]
fn projects_without_sources_only_warn() {
    let tmp = content_root();
    let root = tmp.path();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::create_dir_all(root.join("archive.zip")).unwrap();
    let config = config::load_config(root).unwrap();

    let report = pipeline::run(root, &config, None).unwrap();

    assert_eq!(report.missing_thumbnails, vec!["empty"]);
    assert_eq!(report.total_encoded(), 0);
    assert!(report.is_clean());
}

#[test]
fn missing_content_root_aborts() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("content/projects");
    let config = config::load_config(&root).unwrap();

    let result = pipeline::run(&root, &config, None);
    assert!(matches!(result, Err(PipelineError::ContentRoot { .. })));
}
