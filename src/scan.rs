//! Content discovery and manifest generation.
//!
//! Stage 1 of the folio build pipeline. Reads the content root, validates it,
//! and produces a [`Manifest`] the process stage consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                  # Profile, assets, colors (optional)
//! ├── education.json               # [{degree, university, advisor: {name, url}}]
//! ├── publications.json            # [{title, url, authors, conference}]
//! ├── sections/
//! │   ├── 010-About-Me.md          # Prose section "About Me"
//! │   ├── 030-Background.md        # Prose section "Background"
//! │   └── notes.md                 # Unnumbered = left off the page
//! └── assets/
//!     ├── background.jpg           # Paths are set per role in config.toml
//!     ├── header.jpg
//!     ├── content.png
//!     └── headshot.jpg
//! ```
//!
//! ## Validation
//!
//! - `education.json` and `publications.json` must exist and parse. Record
//!   order is preserved; nothing is sorted or filtered.
//! - Every asset role must point at an existing file with a decodable
//!   extension (see [`supported_input_extensions`]).
//! - `sections/` is optional.

use crate::config::{self, AssetRole, SiteConfig};
use crate::descriptor::ImageType;
use crate::imaging::{is_supported_source, supported_input_extensions};
use crate::naming::parse_entry_name;
use crate::types::{Education, Publication, Section};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Required content file not found: {0}")]
    MissingContent(PathBuf),
    #[error("Source image for {role} not found: {path}")]
    MissingAsset { role: AssetRole, path: PathBuf },
    #[error("Source image for {role} has an unsupported format: {path}")]
    UnsupportedAsset { role: AssetRole, path: PathBuf },
}

pub const EDUCATION_FILE: &str = "education.json";
pub const PUBLICATIONS_FILE: &str = "publications.json";
pub const SECTIONS_DIR: &str = "sections";

/// Manifest output from the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub config: SiteConfig,
    pub education: Vec<Education>,
    pub publications: Vec<Publication>,
    /// Numbered sections, sorted by number.
    pub sections: Vec<Section>,
    /// One entry per role, in [`AssetRole::ALL`] order.
    pub assets: Vec<AssetSource>,
}

/// A validated source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSource {
    pub role: AssetRole,
    /// Relative to the content root.
    pub source_path: String,
    /// Encoding of the source file, used to resolve `original`.
    pub original: ImageType,
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingContent(root.to_path_buf()));
    }

    let config = config::load_config(root)?;
    let education: Vec<Education> = read_records(root, EDUCATION_FILE)?;
    let publications: Vec<Publication> = read_records(root, PUBLICATIONS_FILE)?;
    let sections = parse_sections(&root.join(SECTIONS_DIR))?;
    let assets = resolve_assets(root, &config)?;

    info!(
        education = education.len(),
        publications = publications.len(),
        sections = sections.len(),
        "scanned {}",
        root.display()
    );

    Ok(Manifest {
        config,
        education,
        publications,
        sections,
        assets,
    })
}

fn read_records<T: DeserializeOwned>(root: &Path, name: &str) -> Result<Vec<T>, ScanError> {
    let path = root.join(name);
    if !path.is_file() {
        return Err(ScanError::MissingContent(path));
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|source| ScanError::Json { path, source })
}

/// Read `NNN-Title.md` files, sorted by number. Unnumbered files are skipped.
fn parse_sections(dir: &Path) -> Result<Vec<Section>, ScanError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no sections directory");
        return Ok(Vec::new());
    }

    let mut md_files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("md"))
        })
        .collect();
    md_files.sort();

    let mut sections = Vec::new();
    for path in md_files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let parsed = parse_entry_name(&stem);
        let Some(sort_key) = parsed.number.filter(|_| parsed.is_published()) else {
            debug!(file = %path.display(), "skipping unnumbered section");
            continue;
        };
        sections.push(Section {
            title: parsed.display_title,
            sort_key,
            body: fs::read_to_string(&path)?,
        });
    }
    sections.sort_by_key(|s| s.sort_key);
    Ok(sections)
}

fn resolve_assets(root: &Path, config: &SiteConfig) -> Result<Vec<AssetSource>, ScanError> {
    AssetRole::ALL
        .into_iter()
        .map(|role| {
            let source = &config.assets.get(role).source;
            let path = root.join(source);
            if !path.is_file() {
                return Err(ScanError::MissingAsset { role, path });
            }
            let original = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ImageType::from_extension)
                .filter(|_| is_supported_source(&path));
            let Some(original) = original else {
                debug!(supported = ?supported_input_extensions(), "rejecting {}", path.display());
                return Err(ScanError::UnsupportedAsset { role, path });
            };
            Ok(AssetSource {
                role,
                source_path: source.clone(),
                original,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn scan_reads_all_content() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();

        assert_eq!(manifest.config.profile.name, "Ada Lovelace");
        assert_eq!(manifest.education.len(), 2);
        assert_eq!(manifest.publications.len(), 1);
        assert_eq!(manifest.assets.len(), 4);
    }

    #[test]
    fn records_keep_file_order() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(manifest.education[0].degree, "PhD, Mathematics");
        assert_eq!(manifest.education[1].degree, "BSc, Mathematics");
    }

    #[test]
    fn sections_sorted_by_number() {
        let tmp = setup_content();
        fs::write(tmp.path().join("sections/005-Intro.md"), "Hi.").unwrap();
        let manifest = scan(tmp.path()).unwrap();

        let titles: Vec<&str> = manifest.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "About Me", "Background"]);
        assert_eq!(manifest.sections[0].sort_key, 5);
    }

    #[test]
    fn unnumbered_sections_skipped() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        assert!(find_section(&manifest, "draft notes").is_none());
    }

    #[test]
    fn section_body_is_raw_markdown() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let about = find_section(&manifest, "About Me").unwrap();
        assert!(about.body.contains("**analytical engine**"));
    }

    #[test]
    fn missing_sections_dir_is_fine() {
        let tmp = setup_content();
        fs::remove_dir_all(tmp.path().join(SECTIONS_DIR)).unwrap();
        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.sections.is_empty());
    }

    #[test]
    fn missing_publications_is_error() {
        let tmp = setup_content();
        fs::remove_file(tmp.path().join(PUBLICATIONS_FILE)).unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::MissingContent(p) if p.ends_with(PUBLICATIONS_FILE)));
    }

    #[test]
    fn malformed_education_is_json_error() {
        let tmp = setup_content();
        fs::write(tmp.path().join(EDUCATION_FILE), r#"[{"degree": "PhD"}]"#).unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Json { path, .. } if path.ends_with(EDUCATION_FILE)));
    }

    #[test]
    fn empty_lists_are_valid() {
        let tmp = setup_content();
        fs::write(tmp.path().join(PUBLICATIONS_FILE), "[]").unwrap();
        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.publications.is_empty());
    }

    #[test]
    fn missing_asset_is_error() {
        let tmp = setup_content();
        fs::remove_file(tmp.path().join("assets/headshot.jpg")).unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::MissingAsset {
                role: AssetRole::Headshot,
                ..
            }
        ));
    }

    #[test]
    fn unsupported_asset_is_error() {
        let tmp = setup_content();
        fs::write(tmp.path().join("assets/tile.gif"), "GIF89a").unwrap();
        append_config(tmp.path(), "[assets.content]\nsource = \"assets/tile.gif\"\n");
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::UnsupportedAsset {
                role: AssetRole::Content,
                ..
            }
        ));
    }

    #[test]
    fn asset_original_format_from_extension() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(find_asset(&manifest, AssetRole::Content).original, ImageType::Png);
        assert_eq!(find_asset(&manifest, AssetRole::Headshot).original, ImageType::Jpeg);
        assert_eq!(
            find_asset(&manifest, AssetRole::Background).source_path,
            "assets/background.jpg"
        );
    }

    #[test]
    fn invalid_config_is_config_error() {
        let tmp = setup_content();
        append_config(tmp.path(), "[render]\nviewport_width = 0\n");
        assert!(matches!(scan(tmp.path()), Err(ScanError::Config(_))));
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = scan(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, ScanError::MissingContent(_)));
    }

    #[test]
    fn manifest_serializes_roles_lowercase() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains(r#""role":"headshot""#));
        assert!(json.contains(r#""original":"png""#));
    }
}
