//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{VariantSize, calculate_variant_widths};
use super::params::{Quality, ResizeParams};
use crate::descriptor::ImageType;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// What to generate for one source image.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    pub widths: Vec<u32>,
    /// Concrete output formats, in browser preference order.
    pub formats: Vec<ImageType>,
    pub quality: Quality,
}

/// A planned variant: the resize job plus its file name.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedVariant {
    pub params: ResizeParams,
    /// `{stem}-{width}.{ext}`, relative to the output directory.
    pub file_name: String,
}

/// Plan one resize per (format, width) without executing anything.
///
/// Ordered format-major, widths ascending within each format.
pub fn plan_variants(
    source: &Path,
    output_dir: &Path,
    filename_stem: &str,
    original_dims: (u32, u32),
    config: &VariantConfig,
) -> Vec<PlannedVariant> {
    let sizes = calculate_variant_widths(original_dims, &config.widths);
    config
        .formats
        .iter()
        .flat_map(|&format| {
            sizes.iter().map(move |&VariantSize { width, height }| {
                let file_name = format!("{}-{}.{}", filename_stem, width, format.extension());
                PlannedVariant {
                    params: ResizeParams {
                        source: source.to_path_buf(),
                        output: output_dir.join(&file_name),
                        width,
                        height,
                        format,
                        quality: config.quality,
                    },
                    file_name,
                }
            })
        })
        .collect()
}
