//! Pure calculation functions for cover fitting.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! A cover fit crops first and resizes second: the crop window is computed in
//! source pixels, so the only intermediate image is never larger than the
//! source itself, however extreme its aspect ratio.

/// Calculate the largest centered window of `source` with the aspect ratio of
/// `target`.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(x, y, width, height)` - Crop window in source pixels. One side always
///   spans the full source; both sides are at least 1.
pub fn calculate_crop_window(source: (u32, u32), target: (u32, u32)) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (tgt_w, tgt_h) = (target.0 as u64, target.1 as u64);

    // Compare aspect ratios without floats: src_w/src_h vs tgt_w/tgt_h
    if src_w * tgt_h > tgt_w * src_h {
        // Source is wider: keep full height, trim the sides
        let w = ((src_h * tgt_w + tgt_h / 2) / tgt_h).clamp(1, src_w);
        ((src_w - w) as u32 / 2, 0, w as u32, src_h as u32)
    } else {
        // Source is taller (or same aspect): keep full width, trim top and bottom
        let h = ((src_w * tgt_h + tgt_w / 2) / tgt_w).clamp(1, src_h);
        (0, (src_h - h) as u32 / 2, src_w as u32, h as u32)
    }
}

/// Crop-then-resize plan for a "cover" fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverPlan {
    /// Crop window origin in source pixels.
    pub crop_origin: (u32, u32),
    /// Crop window size in source pixels.
    pub crop_size: (u32, u32),
}

/// Plan a cover fit of `source` into `target`. `None` for degenerate sizes.
pub fn plan_cover(source: (u32, u32), target: (u32, u32)) -> Option<CoverPlan> {
    if source.0 == 0 || source.1 == 0 || target.0 == 0 || target.1 == 0 {
        return None;
    }
    let (x, y, w, h) = calculate_crop_window(source, target);
    Some(CoverPlan {
        crop_origin: (x, y),
        crop_size: (w, h),
    })
}
