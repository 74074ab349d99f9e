//! Image descriptors: the contract between the asset pipeline and the page.
//!
//! The process stage encodes every configured asset at several widths and in
//! several formats, then records the results as an [`ImageDescriptor`]. Page
//! components only ever ask a descriptor two things: which formats exist
//! ([`ImageDescriptor::image_types`]) and which URL serves a given width and
//! format ([`ImageDescriptor::image_url_for`]). They never see file paths,
//! quality settings, or cache state.
//!
//! ## URL resolution
//!
//! ```text
//! image_url_for(Some(w), Some(t))  narrowest `t` variant with width >= w,
//!                                  or the widest `t` variant if none is wide enough
//! image_url_for(None,    Some(t))  widest `t` variant
//! image_url_for(_,       None)     same, using the default format
//! ```
//!
//! The default format is the asset's original encoding when it was generated,
//! otherwise the first entry of `image_types`. The shipped page script
//! (`static/folio.js`) implements the same rules for in-browser resizes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("no {0} variant in image descriptor")]
    UnknownFormat(ImageType),
}

/// An encoded image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Avif,
    Webp,
    Jpeg,
    Png,
}

impl ImageType {
    /// Format identifier as used in `type("image/<id>")` and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Avif => "avif",
            ImageType::Webp => "webp",
            ImageType::Jpeg => "jpeg",
            ImageType::Png => "png",
        }
    }

    /// File extension for generated variants.
    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    pub fn mime(self) -> String {
        format!("image/{}", self.as_str())
    }

    /// Map a source file extension (case-insensitive) to its format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "avif" => Some(ImageType::Avif),
            "webp" => Some(ImageType::Webp),
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub format: ImageType,
    pub width: u32,
    pub height: u32,
    /// URL relative to the site root.
    pub url: String,
}

/// Build-time-resolved handle for one static image asset.
///
/// Immutable once produced by the process stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Formats in the order they should be offered to the browser.
    pub image_types: Vec<ImageType>,
    /// Encoding of the source file.
    pub original: ImageType,
    /// Intrinsic size of the source file.
    pub dimensions: (u32, u32),
    pub variants: Vec<ImageVariant>,
}

impl ImageDescriptor {
    /// Format used when a caller does not name one.
    pub fn default_type(&self) -> ImageType {
        if self.image_types.contains(&self.original) {
            self.original
        } else {
            self.image_types.first().copied().unwrap_or(self.original)
        }
    }

    /// Variants of one format, narrowest first.
    pub fn variants_for(&self, format: ImageType) -> Vec<&ImageVariant> {
        let mut found: Vec<&ImageVariant> =
            self.variants.iter().filter(|v| v.format == format).collect();
        found.sort_by_key(|v| v.width);
        found
    }

    /// Resolve the URL serving `width` pixels in `format`.
    ///
    /// `image_url_for(None, None)` is the fallback URL. A width of zero is not
    /// special-cased: it selects the narrowest variant.
    pub fn image_url_for(
        &self,
        width: Option<u32>,
        format: Option<ImageType>,
    ) -> Result<&str, DescriptorError> {
        let format = format.unwrap_or_else(|| self.default_type());
        let candidates = self.variants_for(format);
        let widest = *candidates
            .last()
            .ok_or(DescriptorError::UnknownFormat(format))?;

        let chosen = match width {
            Some(w) => candidates
                .iter()
                .find(|v| v.width >= w)
                .copied()
                .unwrap_or(widest),
            None => widest,
        };
        Ok(&chosen.url)
    }

    /// `srcset` value with width descriptors for one format.
    pub fn srcset(&self, format: ImageType) -> String {
        self.variants_for(format)
            .iter()
            .map(|v| format!("{} {}w", v.url, v.width))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
