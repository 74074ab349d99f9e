//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root; every key is optional and overrides the stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! [profile]
//! name = "Your Name"
//! pronouns = "they/them"
//! profile_url = "https://keybase.io/you"
//! email = "you@example.com"
//! tagline = "One bold sentence about what you do."
//! contact_note = "Say hello."
//!
//! [[profile.links]]
//! label = "LinkedIn"
//! url = "https://linkedin.com/in/you/"
//!
//! [assets.background]
//! source = "assets/background.jpg"  # Relative to the content root
//! widths = [4096, 2048, 1024]       # Pixel widths to generate
//! quality = 40                      # Lossy encoding quality (0-100)
//! formats = ["avif", "original"]    # Offered to the browser in this order
//!
//! [render]
//! viewport_width = 1280             # Width assumed before the page is measured
//! publications_position = 1         # Index among prose sections
//!
//! [colors.light]
//! background = "#ffffff"
//! surface = "rgba(255, 255, 255, 0.88)"
//! text = "#111111"
//! ...
//!
//! [processing]
//! max_processes = 4                 # Omit for auto = CPU cores
//! ```
//!
//! The four asset roles are `background` (whole page), `header` (title card),
//! `content` (main panel tile) and `headshot` (sidebar portrait).
//!
//! Unknown keys are rejected to catch typos early.

use crate::descriptor::ImageType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Who the page is about.
    pub profile: ProfileConfig,
    /// Source images and the variants generated from them.
    pub assets: AssetsConfig,
    /// Page layout knobs.
    pub render: RenderConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "profile.name must not be empty".into(),
            ));
        }
        for role in AssetRole::ALL {
            let asset = self.assets.get(role);
            if asset.quality > 100 {
                return Err(ConfigError::Validation(format!(
                    "assets.{role}.quality must be 0-100"
                )));
            }
            if asset.widths.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "assets.{role}.widths must not be empty"
                )));
            }
            if asset.widths.contains(&0) {
                return Err(ConfigError::Validation(format!(
                    "assets.{role}.widths values must be non-zero"
                )));
            }
            if asset.formats.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "assets.{role}.formats must not be empty"
                )));
            }
        }
        if self.render.viewport_width == 0 {
            return Err(ConfigError::Validation(
                "render.viewport_width must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Identity and contact details shown in the header and sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub name: String,
    pub pronouns: String,
    /// Target of the bold name link in the sidebar.
    pub profile_url: String,
    /// Revealed only after the visitor acknowledges the contact note.
    pub email: String,
    /// Bold lead paragraph above the prose sections.
    pub tagline: String,
    pub contact_note: String,
    pub links: Vec<Link>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "Your Name".to_string(),
            pronouns: String::new(),
            profile_url: String::new(),
            email: "you@example.com".to_string(),
            tagline: String::new(),
            contact_note: "I may not respond to all emails, but I read them.".to_string(),
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Where an image asset is used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Background,
    Header,
    Content,
    Headshot,
}

impl AssetRole {
    pub const ALL: [AssetRole; 4] = [
        AssetRole::Background,
        AssetRole::Header,
        AssetRole::Content,
        AssetRole::Headshot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetRole::Background => "background",
            AssetRole::Header => "header",
            AssetRole::Content => "content",
            AssetRole::Headshot => "headshot",
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested output format. `original` keeps the source encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    Avif,
    Webp,
    Jpeg,
    Png,
    Original,
}

impl FormatChoice {
    pub fn resolve(self, original: ImageType) -> ImageType {
        match self {
            FormatChoice::Avif => ImageType::Avif,
            FormatChoice::Webp => ImageType::Webp,
            FormatChoice::Jpeg => ImageType::Jpeg,
            FormatChoice::Png => ImageType::Png,
            FormatChoice::Original => original,
        }
    }
}

/// One source image and the variants to generate from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    /// Path relative to the content root.
    pub source: String,
    /// Pixel widths to generate. Widths above the source width are skipped.
    pub widths: Vec<u32>,
    /// Lossy encoding quality (0 = worst, 100 = best).
    pub quality: u32,
    /// Formats in browser preference order.
    pub formats: Vec<FormatChoice>,
}

impl AssetConfig {
    fn new(source: &str, widths: &[u32], quality: u32, formats: &[FormatChoice]) -> Self {
        Self {
            source: source.to_string(),
            widths: widths.to_vec(),
            quality,
            formats: formats.to_vec(),
        }
    }

    /// Concrete formats for a source of the given encoding, duplicates removed.
    pub fn resolved_formats(&self, original: ImageType) -> Vec<ImageType> {
        let mut out = Vec::new();
        for choice in &self.formats {
            let t = choice.resolve(original);
            if !out.contains(&t) {
                out.push(t);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub background: AssetConfig,
    pub header: AssetConfig,
    pub content: AssetConfig,
    pub headshot: AssetConfig,
}

impl AssetsConfig {
    pub fn get(&self, role: AssetRole) -> &AssetConfig {
        match role {
            AssetRole::Background => &self.background,
            AssetRole::Header => &self.header,
            AssetRole::Content => &self.content,
            AssetRole::Headshot => &self.headshot,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        use FormatChoice::{Avif, Original};
        Self {
            background: AssetConfig::new(
                "assets/background.jpg",
                &[4096, 2048, 1024],
                40,
                &[Avif, Original],
            ),
            header: AssetConfig::new(
                "assets/header.jpg",
                &[3984, 2048, 1024],
                40,
                &[Avif, Original],
            ),
            content: AssetConfig::new("assets/content.png", &[64], 80, &[Avif, Original]),
            headshot: AssetConfig::new(
                "assets/headshot.jpg",
                &[256, 512, 1024],
                40,
                &[Original, Avif],
            ),
        }
    }
}

/// Page layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Width in CSS pixels assumed for observed backgrounds in the static HTML.
    /// The page script replaces it with the measured width on load.
    pub viewport_width: u32,
    /// Index among the prose sections at which Publications is inserted.
    /// Values past the end append it last.
    pub publications_position: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            publications_position: 1,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page color behind the background image.
    pub background: String,
    /// Translucent fill of the header card and content panel.
    pub surface: String,
    pub text: String,
    /// Secondary text (pronouns, venues).
    pub text_muted: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#e9e6df".to_string(),
            surface: "rgba(255, 255, 255, 0.88)".to_string(),
            text: "#111111".to_string(),
            text_muted: "#555555".to_string(),
            link: "#1a4f8b".to_string(),
            link_hover: "#0b2a4d".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            surface: "rgba(16, 16, 16, 0.85)".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            link: "#8fb8e8".to_string(),
            link_hover: "#ffffff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so arrays
///   such as `widths` or `profile.links` are replaced, never appended.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the content root. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Profile
# ---------------------------------------------------------------------------
[profile]
name = "Your Name"
pronouns = ""

# Target of the bold name link in the sidebar.
profile_url = ""

# Hidden behind an acknowledgment button until the visitor clicks it.
email = "you@example.com"

# Bold lead paragraph above the prose sections.
tagline = ""

# Shown above the acknowledgment button.
contact_note = "I may not respond to all emails, but I read them."

# Sidebar links, in order. Repeat the block for each link.
# [[profile.links]]
# label = "LinkedIn"
# url = "https://linkedin.com/in/you/"

# ---------------------------------------------------------------------------
# Image assets
# ---------------------------------------------------------------------------
# Each role takes a source image (relative to the content root) and the
# variants to generate from it. Widths wider than the source are skipped.
# Formats: "avif", "webp", "jpeg", "png", or "original" (source encoding).
# The first format is the one browsers are offered first.

# Full-page backdrop.
[assets.background]
source = "assets/background.jpg"
widths = [4096, 2048, 1024]
quality = 40
formats = ["avif", "original"]

# Title card behind the name.
[assets.header]
source = "assets/header.jpg"
widths = [3984, 2048, 1024]
quality = 40
formats = ["avif", "original"]

# Repeating tile behind the main panel.
[assets.content]
source = "assets/content.png"
widths = [64]
quality = 80
formats = ["avif", "original"]

# Sidebar portrait.
[assets.headshot]
source = "assets/headshot.jpg"
widths = [256, 512, 1024]
quality = 40
formats = ["original", "avif"]

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Width in CSS pixels assumed for backgrounds before the page is measured.
viewport_width = 1280

# Where the Publications block sits among the prose sections (0 = first).
publications_position = 1

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#e9e6df"
surface = "rgba(255, 255, 255, 0.88)"    # Header card and main panel
text = "#111111"
text_muted = "#555555"
link = "#1a4f8b"
link_hover = "#0b2a4d"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
surface = "rgba(16, 16, 16, 0.85)"
text = "#eeeeee"
text_muted = "#999999"
link = "#8fb8e8"
link_hover = "#ffffff"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-surface: {light_surface};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-surface: {dark_surface};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_surface = colors.light.surface,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_surface = colors.dark.surface,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}
