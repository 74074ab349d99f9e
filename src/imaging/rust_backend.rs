//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use crate::descriptor::ImageType;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::LazyLock;

/// Source extensions whose decoders are compiled in.
///
/// AVIF sources are not accepted: the `avif` feature of the `image` crate
/// only provides the encoder.
const SOURCE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    SOURCE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of source file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has a decodable source extension (case-insensitive).
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| supported_input_extensions().contains(&e.as_str()))
}

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn encode_failed(format: ImageType, e: image::ImageError) -> BackendError {
    BackendError::ProcessingFailed(format!("{} encode failed: {}", format, e))
}

/// Encode and save in the requested format.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageType,
    quality: u32,
) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);
    let quality = quality.clamp(1, 100) as u8;

    let result = match format {
        ImageType::Avif => {
            let encoder =
                image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 6, quality);
            img.write_with_encoder(encoder)
        }
        ImageType::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
            rgb.write_with_encoder(encoder)
        }
        ImageType::Webp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(writer);
            rgba.write_with_encoder(encoder)
        }
        ImageType::Png => {
            let encoder = image::codecs::png::PngEncoder::new(writer);
            img.write_with_encoder(encoder)
        }
    };
    result.map_err(|e| encode_failed(format, e))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(
            &resized,
            &params.output,
            params.format,
            params.quality.value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{write_test_jpeg, write_test_png};

    fn resize_to(source: &Path, output: &Path, width: u32, height: u32, format: ImageType) {
        RustBackend::new()
            .resize(&ResizeParams {
                source: source.to_path_buf(),
                output: output.to_path_buf(),
                width,
                height,
                format,
                quality: Quality::new(40),
            })
            .unwrap();
    }

    #[test]
    fn supported_extensions_exclude_avif_sources() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "webp"] {
            assert!(exts.contains(expected), "expected {expected}");
        }
        assert!(!exts.contains(&"avif"));
    }

    #[test]
    fn is_supported_source_ignores_case() {
        assert!(is_supported_source(Path::new("a/b/Photo.JPG")));
        assert!(!is_supported_source(Path::new("a/b/photo.gif")));
        assert!(!is_supported_source(Path::new("no-extension")));
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn resize_jpeg_to_jpeg_has_target_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("out.jpg");
        write_test_jpeg(&source, 400, 300);

        resize_to(&source, &output, 200, 150, ImageType::Jpeg);

        assert_eq!(image::image_dimensions(&output).unwrap(), (200, 150));
    }

    #[test]
    fn resize_png_to_webp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("tile.png");
        let output = tmp.path().join("tile.webp");
        write_test_png(&source, 64, 64);

        resize_to(&source, &output, 32, 32, ImageType::Webp);

        assert_eq!(image::image_dimensions(&output).unwrap(), (32, 32));
    }

    #[test]
    fn resize_same_size_png_passthrough() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("tile.png");
        let output = tmp.path().join("tile-64.png");
        write_test_png(&source, 64, 64);

        resize_to(&source, &output, 64, 64, ImageType::Png);

        assert_eq!(image::image_dimensions(&output).unwrap(), (64, 64));
    }

    #[test]
    fn resize_to_avif_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("out.avif");
        write_test_jpeg(&source, 64, 48);

        resize_to(&source, &output, 32, 24, ImageType::Avif);

        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn resize_undecodable_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("out.png"),
            width: 10,
            height: 10,
            format: ImageType::Png,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
