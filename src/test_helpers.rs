//! Shared test utilities for the folio test suite.
//!
//! Builds a complete content directory in a temp dir, with real (tiny) JPEG
//! and PNG sources so the `RustBackend` can decode them, plus lookup helpers
//! that panic with a clear message on miss.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! let manifest = scan(tmp.path()).unwrap();
//! let about = find_section(&manifest, "About Me").unwrap();
//! ```

use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::TempDir;

use crate::config::AssetRole;
use crate::scan::{AssetSource, Manifest};
use crate::types::Section;

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new(BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a checkerboard PNG with an alpha channel.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([40, 40, 40, 255])
        } else {
            Rgba([60, 60, 60, 200])
        }
    });
    let file = fs::File::create(path).unwrap();
    image::codecs::png::PngEncoder::new(BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

// =========================================================================
// Content fixture
// =========================================================================

const CONFIG: &str = r#"
[profile]
name = "Ada Lovelace"
pronouns = "she/her"
profile_url = "https://example.org/ada"
email = "ada@example.org"
tagline = "Writing the first programs for machines that do not exist yet."
contact_note = "I read everything."

[[profile.links]]
label = "LinkedIn"
url = "https://linkedin.com/in/ada/"
"#;

const EDUCATION: &str = r#"[
  {
    "degree": "PhD, Mathematics",
    "university": "University of London",
    "advisor": {"name": "Augustus De Morgan", "url": "https://example.org/demorgan"}
  },
  {
    "degree": "BSc, Mathematics",
    "university": "Home Tutoring",
    "advisor": {"name": "Mary Somerville", "url": "https://example.org/somerville"}
  }
]"#;

const PUBLICATIONS: &str = r#"[
  {
    "title": "Notes on the Analytical Engine",
    "url": "https://example.org/notes",
    "authors": "A. Lovelace, L. F. Menabrea",
    "conference": "Scientific Memoirs 1843"
  }
]"#;

/// Create a content root with config, records, three section files (one
/// unnumbered) and all four asset sources.
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::write(root.join("config.toml"), CONFIG).unwrap();
    fs::write(root.join("education.json"), EDUCATION).unwrap();
    fs::write(root.join("publications.json"), PUBLICATIONS).unwrap();

    let sections = root.join("sections");
    fs::create_dir_all(&sections).unwrap();
    fs::write(
        sections.join("010-About-Me.md"),
        "I wrote programs for the **analytical engine**.\n",
    )
    .unwrap();
    fs::write(sections.join("030-Background.md"), "Raised on poetry and numbers.\n").unwrap();
    fs::write(sections.join("draft-notes.md"), "not ready\n").unwrap();

    let assets = root.join("assets");
    fs::create_dir_all(&assets).unwrap();
    write_test_jpeg(&assets.join("background.jpg"), 96, 48);
    write_test_jpeg(&assets.join("header.jpg"), 80, 40);
    write_test_png(&assets.join("content.png"), 64, 64);
    write_test_jpeg(&assets.join("headshot.jpg"), 48, 64);

    tmp
}

/// Append TOML to the fixture's `config.toml`.
pub fn append_config(root: &Path, toml: &str) {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(root.join("config.toml"))
        .unwrap();
    writeln!(file, "\n{toml}").unwrap();
}

// =========================================================================
// Manifest lookups
// =========================================================================

pub fn find_section<'a>(manifest: &'a Manifest, title: &str) -> Option<&'a Section> {
    manifest.sections.iter().find(|s| s.title == title)
}

/// Find the asset for a role. Panics if not found.
pub fn find_asset(manifest: &Manifest, role: AssetRole) -> &AssetSource {
    manifest
        .assets
        .iter()
        .find(|a| a.role == role)
        .unwrap_or_else(|| panic!("asset for role '{role}' not found"))
}
