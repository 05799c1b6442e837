//! Shared test utilities.
//!
//! [`ContentTree`] builds throwaway content roots; the other helpers pin
//! modification times and write small real images for backend tests.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = ContentTree::new();
//! let source = tree.file("alpha/thumbnail.jpg");
//! set_mtime(&source, SystemTime::UNIX_EPOCH + Duration::from_secs(1));
//! ```

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

/// A content root in a temp directory, removed on drop.
pub struct ContentTree {
    tmp: TempDir,
}

impl ContentTree {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Absolute path for `rel`, without touching the filesystem.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    /// Create a placeholder file (and its parents). Content is not an image.
    pub fn file(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"placeholder").unwrap();
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

/// Set a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

// =========================================================================
// Real images
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Write a PNG with a transparent left half.
pub fn write_png_rgba(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([200, 40, 40, alpha])
    });
    img.save(path).unwrap();
}
