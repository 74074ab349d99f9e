//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// A single variant size to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSize {
    pub width: u32,
    pub height: u32,
}

/// Calculate which widths to generate and their heights.
///
/// Requested widths wider than the original are dropped (no upscaling).
/// The rest are sorted ascending and deduplicated, with heights preserving
/// the source aspect ratio. If every requested width exceeds the original,
/// the original size is the only entry.
///
/// ```text
/// original 3000x2000, widths [2048, 1024, 4096]  →  1024x683, 2048x1365
/// original 500x400,   widths [1024]              →  500x400
/// ```
pub fn calculate_variant_widths(original: (u32, u32), widths: &[u32]) -> Vec<VariantSize> {
    let (orig_w, orig_h) = original;

    let mut kept: Vec<u32> = widths
        .iter()
        .copied()
        .filter(|&w| w > 0 && w <= orig_w)
        .collect();
    kept.sort_unstable();
    kept.dedup();

    let mut result: Vec<VariantSize> = kept
        .into_iter()
        .map(|width| {
            let ratio = width as f64 / orig_w as f64;
            let height = ((orig_h as f64 * ratio).round() as u32).max(1);
            VariantSize { width, height }
        })
        .collect();

    if result.is_empty() {
        result.push(VariantSize {
            width: orig_w,
            height: orig_h,
        });
    }

    result
}
