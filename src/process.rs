//! Responsive image generation.
//!
//! Stage 2 of the folio build pipeline. Takes the scan manifest and encodes
//! every asset role at its configured widths and formats, then records the
//! result as one [`ImageDescriptor`] per role.
//!
//! ## Output Structure
//!
//! ```text
//! processed/
//! ├── manifest.json              # Scan data + descriptors
//! ├── .cache-manifest.json       # See crate::cache
//! └── images/
//!     ├── background-1024.avif
//!     ├── background-1024.jpg
//!     ├── background-2048.avif
//!     ├── ...
//!     └── headshot-1024.avif
//! ```
//!
//! Variant URLs in the descriptors are relative to the site root
//! (`images/background-1024.avif`); the generate stage copies `images/`
//! as-is.
//!
//! ## Format resolution
//!
//! `original` in an asset's `formats` becomes the source's own encoding, so
//! `["avif", "original"]` on a PNG yields AVIF and PNG variants. Duplicates
//! collapse to their first position.
//!
//! ## Parallel Processing
//!
//! Roles are handled in order; the variants of one role are encoded in
//! parallel with [rayon](https://docs.rs/rayon). Progress is reported as
//! [`ProcessEvent`]s over an optional channel so the CLI can print while the
//! workers run.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::{AssetRole, SiteConfig};
use crate::descriptor::{ImageDescriptor, ImageType, ImageVariant};
use crate::imaging::{
    BackendError, ImageBackend, PlannedVariant, Quality, RustBackend, VariantConfig,
    get_dimensions, plan_variants,
};
use crate::scan::AssetSource;
use crate::types::{Education, Publication, Section};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
}

/// Directory under the processed dir (and later the site root) holding variants.
pub const IMAGES_DIR: &str = "images";

/// Input manifest (from scan stage).
#[derive(Debug, Deserialize)]
pub struct InputManifest {
    pub config: SiteConfig,
    pub education: Vec<Education>,
    pub publications: Vec<Publication>,
    pub sections: Vec<Section>,
    pub assets: Vec<AssetSource>,
}

/// Output manifest (after processing).
#[derive(Debug, Serialize)]
pub struct OutputManifest {
    pub config: SiteConfig,
    pub education: Vec<Education>,
    pub publications: Vec<Publication>,
    pub sections: Vec<Section>,
    pub images: BTreeMap<AssetRole, ImageDescriptor>,
}

/// How a variant was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Same content already on disk at the same path.
    Cached,
    /// Same content on disk under another name, copied over.
    Copied,
    Encoded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub width: u32,
    pub format: ImageType,
    pub status: VariantStatus,
}

/// Progress events for the CLI printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    AssetProcessed {
        role: AssetRole,
        source_path: String,
        dimensions: (u32, u32),
        variants: Vec<VariantInfo>,
    },
}

pub struct ProcessResult {
    pub manifest: OutputManifest,
    pub cache_stats: CacheStats,
}

pub fn process(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(
        &backend,
        manifest_path,
        source_root,
        output_dir,
        use_cache,
        events,
    )
}

/// Process assets using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let manifest_content = std::fs::read_to_string(manifest_path)?;
    let input: InputManifest = serde_json::from_str(&manifest_content)?;

    let images_dir = output_dir.join(IMAGES_DIR);
    std::fs::create_dir_all(&images_dir)?;

    let cache = Mutex::new(if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    });
    let stats = Mutex::new(CacheStats::default());

    let mut images = BTreeMap::new();
    for asset in &input.assets {
        let source_path = source_root.join(&asset.source_path);
        if !source_path.exists() {
            return Err(ProcessError::SourceNotFound(source_path));
        }

        let asset_config = input.config.assets.get(asset.role);
        let dimensions = get_dimensions(backend, &source_path)?;
        let formats = asset_config.resolved_formats(asset.original);
        let planned = plan_variants(
            &source_path,
            &images_dir,
            asset.role.as_str(),
            dimensions,
            &VariantConfig {
                widths: asset_config.widths.clone(),
                formats: formats.clone(),
                quality: Quality::new(asset_config.quality),
            },
        );
        debug!(role = %asset.role, variants = planned.len(), "planned variants");

        let source_hash = cache::hash_file(&source_path)?;
        let outcomes: Vec<(ImageVariant, VariantStatus)> = planned
            .par_iter()
            .map(|variant| -> Result<_, ProcessError> {
                let status = produce_variant(backend, variant, &source_hash, output_dir, &cache)?;
                let mut stats = stats.lock().unwrap_or_else(|e| e.into_inner());
                match status {
                    VariantStatus::Cached => stats.hit(),
                    VariantStatus::Copied => stats.copy(),
                    VariantStatus::Encoded => stats.miss(),
                }
                Ok((
                    ImageVariant {
                        format: variant.params.format,
                        width: variant.params.width,
                        height: variant.params.height,
                        url: format!("{}/{}", IMAGES_DIR, variant.file_name),
                    },
                    status,
                ))
            })
            .collect::<Result<_, ProcessError>>()?;

        if let Some(tx) = &events {
            tx.send(ProcessEvent::AssetProcessed {
                role: asset.role,
                source_path: asset.source_path.clone(),
                dimensions,
                variants: outcomes
                    .iter()
                    .map(|(v, status)| VariantInfo {
                        width: v.width,
                        format: v.format,
                        status: *status,
                    })
                    .collect(),
            })
            .ok();
        }

        images.insert(
            asset.role,
            ImageDescriptor {
                image_types: formats,
                original: asset.original,
                dimensions,
                variants: outcomes.into_iter().map(|(v, _)| v).collect(),
            },
        );
    }

    let cache = cache.into_inner().unwrap_or_else(|e| e.into_inner());
    cache.save(output_dir)?;
    let cache_stats = stats.into_inner().unwrap_or_else(|e| e.into_inner());
    info!(%cache_stats, "processed {} assets", images.len());

    Ok(ProcessResult {
        manifest: OutputManifest {
            config: input.config,
            education: input.education,
            publications: input.publications,
            sections: input.sections,
            images,
        },
        cache_stats,
    })
}

/// Produce one variant file, reusing cached output when possible.
fn produce_variant(
    backend: &impl ImageBackend,
    variant: &PlannedVariant,
    source_hash: &str,
    output_dir: &Path,
    cache: &Mutex<CacheManifest>,
) -> Result<VariantStatus, ProcessError> {
    let params = &variant.params;
    let params_hash = cache::hash_variant_params(
        params.width,
        params.height,
        params.format,
        params.quality.value(),
    );
    let relative = format!("{}/{}", IMAGES_DIR, variant.file_name);

    let cached = cache
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .find_cached(source_hash, &params_hash, output_dir);

    let status = match cached {
        Some(stored) if stored == relative => VariantStatus::Cached,
        Some(stored) => {
            std::fs::copy(output_dir.join(&stored), &params.output)?;
            VariantStatus::Copied
        }
        None => {
            backend.resize(params)?;
            VariantStatus::Encoded
        }
    };
    debug!(file = %relative, ?status, "variant ready");

    cache
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(relative, source_hash.to_string(), params_hash);
    Ok(status)
}
