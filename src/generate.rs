//! HTML page generation.
//!
//! Stage 3 of the folio build pipeline. Takes the processed manifest and
//! renders the single page of the site.
//!
//! ## Page Layout
//!
//! ```text
//! div.app                      ← background asset, tracks its own width
//! ├── header.header
//! │   └── div.card             ← header asset, tracks its own width
//! │       └── h1.title         name
//! └── main.content.container   ← content tile, fixed width
//!     ├── div.sidebar          headshot, name, education, contact, links
//!     └── section              tagline, prose sections, publications
//! ```
//!
//! Publications sit between the prose sections at `render.publications_position`
//! (clamped to the number of sections).
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! └── images/                  # Copied from processed/images
//!     ├── background-1024.avif
//!     └── ...
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined into the page:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/folio.js`: In-browser background resizing and contact reveal
//!
//! ## Background widths at build time
//!
//! Width-tracking backgrounds are mounted on a [`StaticViewport`], so the
//! initial `image-set()` is computed for `render.viewport_width`. The page
//! script takes over from there.

use crate::background::{BackgroundError, ResponsiveBackground, StaticViewport, Tag};
use crate::components::{
    education_list, link_lines, prose_section, publication_list, responsive_picture,
};
use crate::config::{self, AssetRole, SiteConfig};
use crate::descriptor::{DescriptorError, ImageDescriptor};
use crate::disclosure::Disclosure;
use crate::process::IMAGES_DIR;
use crate::types::{Education, Publication, Section};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Processed manifest has no image for {0}")]
    MissingAsset(AssetRole),
    #[error("Directory walk failed: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl From<BackgroundError> for GenerateError {
    fn from(e: BackgroundError) -> Self {
        match e {
            BackgroundError::Descriptor(e) => GenerateError::Descriptor(e),
            BackgroundError::Json(e) => GenerateError::Json(e),
        }
    }
}

/// Processed manifest from stage 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub config: SiteConfig,
    pub education: Vec<Education>,
    pub publications: Vec<Publication>,
    pub sections: Vec<Section>,
    pub images: BTreeMap<AssetRole, ImageDescriptor>,
}

impl Manifest {
    fn image(&self, role: AssetRole) -> Result<&ImageDescriptor, GenerateError> {
        self.images
            .get(&role)
            .ok_or(GenerateError::MissingAsset(role))
    }
}

/// What [`generate`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub index: PathBuf,
    /// Image paths relative to the output directory, sorted.
    pub images: Vec<String>,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/folio.js");

/// `sizes` for the headshot `<picture>`.
const HEADSHOT_SIZES: &str = "(max-width: 700px) 50vw, 256px";

pub fn generate(
    manifest_path: &Path,
    processed_dir: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;

    let color_css = config::generate_color_css(&manifest.config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    let page = render_page(&manifest, &css)?;

    fs::create_dir_all(output_dir)?;
    let index = output_dir.join("index.html");
    fs::write(&index, page.into_string())?;
    info!(path = %index.display(), "wrote page");

    let images = copy_images(&processed_dir.join(IMAGES_DIR), &output_dir.join(IMAGES_DIR))?;

    Ok(GenerateReport {
        index,
        images: images
            .into_iter()
            .map(|rel| format!("{}/{}", IMAGES_DIR, rel))
            .collect(),
    })
}

/// Copy every file under `src` into `dst`, keeping relative paths.
///
/// Returns the copied paths relative to `dst`, sorted.
fn copy_images(src: &Path, dst: &Path) -> Result<Vec<String>, GenerateError> {
    fs::create_dir_all(dst)?;
    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        debug!(file = %relative.display(), "copied image");
        copied.push(relative.to_string_lossy().replace('\\', "/"));
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, description: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn sidebar(manifest: &Manifest) -> Result<Markup, GenerateError> {
    let profile = &manifest.config.profile;
    let headshot = responsive_picture(
        manifest.image(AssetRole::Headshot)?,
        "headshot",
        &format!("{}'s headshot", profile.name),
        HEADSHOT_SIZES,
    )?;

    Ok(html! {
        div.sidebar {
            (headshot)
            br;
            b {
                @if profile.profile_url.is_empty() {
                    (profile.name)
                } @else {
                    a href=(profile.profile_url) { (profile.name) }
                }
            }
            @if !profile.pronouns.is_empty() {
                " (" (profile.pronouns) ")"
            }
            br;
            br;
            (education_list(&manifest.education))
            (profile.contact_note)
            br;
            br;
            span.contact { (Disclosure::new().render(&profile.email)) }
            br;
            br;
            (link_lines(&profile.links))
        }
    })
}

/// Prose sections with the publication list spliced in.
fn content_blocks(manifest: &Manifest) -> Vec<Markup> {
    let mut blocks: Vec<Markup> = manifest.sections.iter().map(prose_section).collect();
    let position = manifest
        .config
        .render
        .publications_position
        .min(blocks.len());
    blocks.insert(position, publication_list(&manifest.publications));
    blocks
}

/// Renders the full page. Pure: no filesystem access.
pub fn render_page(manifest: &Manifest, css: &str) -> Result<Markup, GenerateError> {
    let config = &manifest.config;
    let profile = &config.profile;
    let viewport_width = config.render.viewport_width;
    let viewport = StaticViewport::new(viewport_width);

    let background = ResponsiveBackground::observed(
        manifest.image(AssetRole::Background)?.clone(),
        Tag::Div,
        viewport_width,
    )?
    .class("app");
    let card = ResponsiveBackground::observed(
        manifest.image(AssetRole::Header)?.clone(),
        Tag::Div,
        viewport_width,
    )?
    .class("card");

    // The tile is repeated, never stretched: render it at its widest encoded width.
    let tile = manifest.image(AssetRole::Content)?;
    let tile_width = tile
        .variants
        .iter()
        .map(|v| v.width)
        .max()
        .unwrap_or(tile.dimensions.0);
    let content = ResponsiveBackground::fixed(tile.clone(), Tag::Main, tile_width)?
        .class("content container");

    let _observations: Vec<_> = [&background, &card]
        .into_iter()
        .filter_map(|bg| bg.mount(&viewport))
        .collect();

    let card = card.render(html! {
        div.container {
            h1.title { (profile.name) }
        }
    })?;
    let sidebar = sidebar(manifest)?;

    let section = html! {
        section {
            @if !profile.tagline.is_empty() {
                div { p { b { (profile.tagline) } } }
            }
            @for block in content_blocks(manifest) {
                (block)
            }
        }
    };

    let main = content.render(html! {
        (sidebar)
        (section)
    })?;

    let body = background.render(html! {
        header.header { (card) }
        (main)
    })?;

    Ok(base_document(&profile.name, &profile.tagline, css, body))
}

// ============================================================================
// Tests
// ============================================================================
