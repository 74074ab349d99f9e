//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (record,
//! section, asset) leads with its positional index and what it *is*; file
//! paths and settings follow as indented context lines. The output reads as a
//! content inventory while still tracing back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Profile
//!     Ada Lovelace (she/her)
//!     Source: config.toml
//!
//! Education
//! 001 PhD, Mathematics
//!     University of London
//!
//! Publications
//! 001 Notes on the Analytical Engine
//!     Scientific Memoirs 1843
//!
//! Sections
//! 001 About Me
//! 002 Background
//!
//! Assets
//! 001 background
//!     Source: assets/background.jpg
//!     Formats: avif, jpeg @ 1024, 2048, 4096
//! ```
//!
//! ## Process
//!
//! ```text
//! background (5000x2500)
//!     Source: assets/background.jpg
//!     1024px avif: cached
//!     2048px avif: encoded
//! ```
//!
//! ## Generate
//!
//! ```text
//! Page → dist/index.html
//! Images → images/ (20 files)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure —
//! no I/O beyond checking whether `config.toml` exists.

use crate::generate::GenerateReport;
use crate::process::{ProcessEvent, VariantStatus};
use crate::scan::Manifest;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// A numbered section of `title` lines, each followed by optional context.
fn numbered<'a>(
    heading: &str,
    entries: impl Iterator<Item = (&'a str, Option<&'a str>)>,
) -> Vec<String> {
    let mut lines = vec![heading.to_string()];
    for (i, (title, context)) in entries.enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), title));
        if let Some(context) = context.filter(|c| !c.is_empty()) {
            lines.push(format!("{}{}", indent(1), context));
        }
    }
    lines
}

fn join_display<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output: profile, records, sections and assets.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let profile = &manifest.config.profile;
    let mut lines = vec!["Profile".to_string()];
    if profile.pronouns.is_empty() {
        lines.push(format!("{}{}", indent(1), profile.name));
    } else {
        lines.push(format!("{}{} ({})", indent(1), profile.name, profile.pronouns));
    }
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}Source: config.toml", indent(1)));
    }

    lines.push(String::new());
    lines.extend(numbered(
        "Education",
        manifest
            .education
            .iter()
            .map(|e| (e.degree.as_str(), Some(e.university.as_str()))),
    ));

    lines.push(String::new());
    lines.extend(numbered(
        "Publications",
        manifest
            .publications
            .iter()
            .map(|p| (p.title.as_str(), Some(p.conference.as_str()))),
    ));

    lines.push(String::new());
    lines.extend(numbered(
        "Sections",
        manifest.sections.iter().map(|s| (s.title.as_str(), None)),
    ));

    lines.push(String::new());
    lines.push("Assets".to_string());
    for (i, asset) in manifest.assets.iter().enumerate() {
        let config = manifest.config.assets.get(asset.role);
        lines.push(format!("{} {}", format_index(i + 1), asset.role));
        lines.push(format!("{}Source: {}", indent(1), asset.source_path));
        let mut widths = config.widths.clone();
        widths.sort_unstable();
        lines.push(format!(
            "{}Formats: {} @ {}",
            indent(1),
            join_display(&config.resolved_formats(asset.original)),
            join_display(&widths)
        ));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::AssetProcessed {
            role,
            source_path,
            dimensions: (width, height),
            variants,
        } => {
            let mut lines = vec![
                format!("{} ({}x{})", role, width, height),
                format!("{}Source: {}", indent(1), source_path),
            ];
            for variant in variants {
                let status = match variant.status {
                    VariantStatus::Cached => "cached",
                    VariantStatus::Copied => "copied",
                    VariantStatus::Encoded => "encoded",
                };
                lines.push(format!(
                    "{}{}px {}: {}",
                    indent(1),
                    variant.width,
                    variant.format,
                    status
                ));
            }
            lines
        }
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let files = match report.images.len() {
        1 => "1 file".to_string(),
        n => format!("{} files", n),
    };
    vec![
        format!("Page \u{2192} {}", report.index.display()),
        format!("Images \u{2192} images/ ({})", files),
    ]
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetRole;
    use crate::descriptor::ImageType;
    use crate::process::VariantInfo;
    use crate::scan::scan;
    use crate::test_helpers::*;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn scan_output_lists_everything() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest, tmp.path());

        assert_eq!(lines[0], "Profile");
        assert_eq!(lines[1], "    Ada Lovelace (she/her)");
        assert_eq!(lines[2], "    Source: config.toml");
        assert!(lines.contains(&"001 PhD, Mathematics".to_string()));
        assert!(lines.contains(&"    University of London".to_string()));
        assert!(lines.contains(&"001 Notes on the Analytical Engine".to_string()));
        assert!(lines.contains(&"001 About Me".to_string()));
        assert!(lines.contains(&"002 Background".to_string()));
    }

    #[test]
    fn scan_output_shows_resolved_formats() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest, tmp.path());

        let content = lines.iter().position(|l| l == "003 content").unwrap();
        assert_eq!(lines[content + 1], "    Source: assets/content.png");
        assert_eq!(lines[content + 2], "    Formats: avif, png @ 64");

        let background = lines.iter().position(|l| l == "001 background").unwrap();
        assert_eq!(lines[background + 2], "    Formats: avif, jpeg @ 1024, 2048, 4096");
    }

    #[test]
    fn scan_output_empty_lists_keep_headings() {
        let tmp = setup_content();
        let mut manifest = scan(tmp.path()).unwrap();
        manifest.publications.clear();
        manifest.sections.clear();
        let lines = format_scan_output(&manifest, tmp.path());

        let publications = lines.iter().position(|l| l == "Publications").unwrap();
        assert_eq!(lines[publications + 1], "");
        assert!(lines.contains(&"Sections".to_string()));
    }

    #[test]
    fn process_event_lines() {
        let event = ProcessEvent::AssetProcessed {
            role: AssetRole::Headshot,
            source_path: "assets/headshot.jpg".to_string(),
            dimensions: (1500, 2000),
            variants: vec![
                VariantInfo {
                    width: 256,
                    format: ImageType::Jpeg,
                    status: VariantStatus::Cached,
                },
                VariantInfo {
                    width: 256,
                    format: ImageType::Avif,
                    status: VariantStatus::Encoded,
                },
            ],
        };
        assert_eq!(
            format_process_event(&event),
            vec![
                "headshot (1500x2000)",
                "    Source: assets/headshot.jpg",
                "    256px jpeg: cached",
                "    256px avif: encoded",
            ]
        );
    }

    #[test]
    fn generate_output_counts_images() {
        let report = GenerateReport {
            index: PathBuf::from("dist/index.html"),
            images: vec!["images/a.avif".to_string(), "images/b.jpg".to_string()],
        };
        assert_eq!(
            format_generate_output(&report),
            vec!["Page \u{2192} dist/index.html", "Images \u{2192} images/ (2 files)"]
        );
    }

    #[test]
    fn generate_output_singular_file() {
        let report = GenerateReport {
            index: PathBuf::from("index.html"),
            images: vec!["images/a.avif".to_string()],
        };
        assert_eq!(format_generate_output(&report)[1], "Images \u{2192} images/ (1 file)");
    }
}
