//! Image transcoding, with no system libraries to install.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, WebP) |
//! | **Cover fit** | Lanczos3 `resize_exact` + centered `crop_imm` |
//! | **Encode AVIF** | rav1e via `image::codecs::avif` |
//! | **Encode WebP** | `webp` crate, lossy |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for cover-fit math (unit testable)
//! - **Parameters**: Data structures describing a transcode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`transcode`], combining parameters with a backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{TranscodeError, plan_transcode, transcode};
pub use params::{Codec, EncodeProfile, Footprint, Quality, TranscodeParams};
pub use rust_backend::RustBackend;
