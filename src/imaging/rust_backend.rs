//! Pure Rust raster backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `ImageReader::with_guessed_format` + `decode` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Sniff the MIME type of encoded bytes from their magic number.
pub fn sniff_mime_type(source: &[u8]) -> Option<&'static str> {
    image::guess_format(source).ok().map(|fmt| fmt.to_mime_type())
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
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

fn reader(source: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    type Surface = DynamicImage;

    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(source)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, source: &[u8]) -> Result<DynamicImage, BackendError> {
        reader(source)?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn dimensions(&self, surface: &DynamicImage) -> Dimensions {
        Dimensions {
            width: surface.width(),
            height: surface.height(),
        }
    }

    fn resize(
        &self,
        surface: DynamicImage,
        params: &ResizeParams,
    ) -> Result<DynamicImage, BackendError> {
        if surface.width() == params.width && surface.height() == params.height {
            return Ok(surface);
        }
        Ok(surface.resize_exact(params.width, params.height, FilterType::Lanczos3))
    }

    fn encode(
        &self,
        surface: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, BackendError> {
        // JPEG has no alpha channel; flatten first.
        let rgb = DynamicImage::ImageRgb8(surface.to_rgb8());
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, params.quality.jpeg_quality());
        rgb.write_with_encoder(encoder)
            .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::QualityFactor;
    use crate::test_helpers::{create_test_jpeg, create_test_png};

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "gif", "webp", "tif", "tiff"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let bytes = create_test_jpeg(200, 150);
        let dims = RustBackend::new().identify(&bytes).unwrap();
        assert_eq!(dims, Dimensions::new(200, 150));
    }

    #[test]
    fn identify_garbage_is_decode_error() {
        let result = RustBackend::new().identify(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let result = RustBackend::new().decode(b"\x00\x01\x02\x03");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn decode_png_source() {
        let bytes = create_test_png(64, 32);
        let backend = RustBackend::new();
        let surface = backend.decode(&bytes).unwrap();
        assert_eq!(backend.dimensions(&surface), Dimensions::new(64, 32));
    }

    #[test]
    fn resize_to_exact_dimensions() {
        let backend = RustBackend::new();
        let surface = backend.decode(&create_test_jpeg(400, 300)).unwrap();
        let resized = backend
            .resize(
                surface,
                &ResizeParams {
                    width: 200,
                    height: 150,
                },
            )
            .unwrap();
        assert_eq!(backend.dimensions(&resized), Dimensions::new(200, 150));
    }

    #[test]
    fn encode_produces_jpeg() {
        let backend = RustBackend::new();
        let surface = backend.decode(&create_test_png(80, 60)).unwrap();
        let bytes = backend
            .encode(
                &surface,
                &EncodeParams {
                    quality: QualityFactor::INITIAL,
                },
            )
            .unwrap();
        assert_eq!(sniff_mime_type(&bytes), Some("image/jpeg"));
        assert_eq!(backend.identify(&bytes).unwrap(), Dimensions::new(80, 60));
    }

    #[test]
    fn lower_quality_encodes_smaller() {
        let backend = RustBackend::new();
        let surface = backend.decode(&create_test_png(256, 256)).unwrap();
        let high = backend
            .encode(
                &surface,
                &EncodeParams {
                    quality: QualityFactor::INITIAL,
                },
            )
            .unwrap();
        let low = backend
            .encode(
                &surface,
                &EncodeParams {
                    quality: QualityFactor::FLOOR,
                },
            )
            .unwrap();
        assert!(low.len() < high.len(), "{} !< {}", low.len(), high.len());
    }

    #[test]
    fn sniff_mime_type_of_png() {
        assert_eq!(sniff_mime_type(&create_test_png(4, 4)), Some("image/png"));
        assert_eq!(sniff_mime_type(b"plain text"), None);
    }
}
