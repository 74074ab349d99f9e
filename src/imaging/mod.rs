//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → AVIF** | Lanczos3 + rav1e encoder |
//! | **Resize → JPEG / PNG / WebP** | Lanczos3 + `image` encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
// Re-exported for tests (process.rs, operations.rs tests use this)
#[cfg(test)]
pub use backend::Dimensions;
pub use calculations::{VariantSize, calculate_variant_widths};
pub use operations::{PlannedVariant, VariantConfig, get_dimensions, plan_variants};
pub use params::{Quality, ResizeParams};
pub use rust_backend::{RustBackend, is_supported_source, supported_input_extensions};
