//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the raster operations the compressor
//! needs: identify, decode, resize, and encode. A decoded image lives in the
//! backend's own `Surface` type; the compressor owns each surface for the
//! length of one call and drops it on every exit path.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{EncodeParams, ResizeParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of an image or surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longer_edge(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// An immutable encoded image blob.
///
/// Compression never mutates one of these; every pass produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
    /// Known when the blob was produced by an encoder; `None` for untouched input.
    pub dimensions: Option<Dimensions>,
}

impl EncodedImage {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn size_kb(&self) -> f64 {
        self.data.len() as f64 / 1024.0
    }
}

/// Trait for raster backends.
///
/// `Sync` so a single backend can serve rayon workers compressing a batch.
pub trait ImageBackend: Sync {
    /// Decoded, drawable image owned by one compression call.
    type Surface;

    /// Read dimensions without a full decode where the format allows it.
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode source bytes into a surface. Undecodable input is
    /// [`BackendError::Decode`].
    fn decode(&self, source: &[u8]) -> Result<Self::Surface, BackendError>;

    fn dimensions(&self, surface: &Self::Surface) -> Dimensions;

    /// Draw the surface onto a new surface of the requested size.
    fn resize(
        &self,
        surface: Self::Surface,
        params: &ResizeParams,
    ) -> Result<Self::Surface, BackendError>;

    /// Encode the surface as a lossy raster (JPEG) at the given quality.
    fn encode(&self, surface: &Self::Surface, params: &EncodeParams)
    -> Result<Vec<u8>, BackendError>;

    /// MIME type of everything [`encode`](Self::encode) produces.
    fn output_mime_type(&self) -> &'static str {
        "image/jpeg"
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::QualityFactor;
    use std::sync::Mutex;

    type SizeScript = Box<dyn Fn(QualityFactor) -> usize + Send + Sync>;

    /// Mock backend that records operations and returns scripted encode sizes.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    pub struct MockBackend {
        /// Dimensions every decode reports; `None` makes decoding fail.
        pub source_dimensions: Option<Dimensions>,
        pub operations: Mutex<Vec<RecordedOp>>,
        size_for_quality: SizeScript,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify,
        Decode,
        Resize { width: u32, height: u32 },
        Encode { quality: u8 },
    }

    impl MockBackend {
        /// Decodes to `width`x`height`; every encode produces `encoded_size` bytes.
        pub fn with_dimensions(width: u32, height: u32, encoded_size: usize) -> Self {
            Self::scripted(width, height, move |_| encoded_size)
        }

        /// Decodes to `width`x`height`; encode size is computed from the quality.
        pub fn scripted(
            width: u32,
            height: u32,
            size_for_quality: impl Fn(QualityFactor) -> usize + Send + Sync + 'static,
        ) -> Self {
            Self {
                source_dimensions: Some(Dimensions::new(width, height)),
                operations: Mutex::new(Vec::new()),
                size_for_quality: Box::new(size_for_quality),
            }
        }

        /// Every decode fails.
        pub fn undecodable() -> Self {
            Self {
                source_dimensions: None,
                operations: Mutex::new(Vec::new()),
                size_for_quality: Box::new(|_| 0),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Qualities of every encode attempt, in order.
        pub fn encode_attempts(&self) -> Vec<u8> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { quality } => Some(quality),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        type Surface = Dimensions;

        fn identify(&self, _source: &[u8]) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Identify);
            self.source_dimensions
                .ok_or_else(|| BackendError::Decode("mock: undecodable".to_string()))
        }

        fn decode(&self, _source: &[u8]) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Decode);
            self.source_dimensions
                .ok_or_else(|| BackendError::Decode("mock: undecodable".to_string()))
        }

        fn dimensions(&self, surface: &Dimensions) -> Dimensions {
            *surface
        }

        fn resize(
            &self,
            _surface: Dimensions,
            params: &ResizeParams,
        ) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                width: params.width,
                height: params.height,
            });
            Ok(Dimensions::new(params.width, params.height))
        }

        fn encode(
            &self,
            _surface: &Dimensions,
            params: &EncodeParams,
        ) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                quality: params.quality.tenths(),
            });
            Ok(vec![0u8; (self.size_for_quality)(params.quality)])
        }
    }

    #[test]
    fn mock_records_decode_and_resize() {
        let backend = MockBackend::with_dimensions(800, 600, 10);

        let surface = backend.decode(b"anything").unwrap();
        assert_eq!(backend.dimensions(&surface), Dimensions::new(800, 600));
        let resized = backend
            .resize(
                surface,
                &ResizeParams {
                    width: 400,
                    height: 300,
                },
            )
            .unwrap();
        assert_eq!(resized, Dimensions::new(400, 300));

        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![
                RecordedOp::Decode,
                RecordedOp::Resize {
                    width: 400,
                    height: 300
                }
            ]
        );
    }

    #[test]
    fn mock_scripted_encode_sizes() {
        let backend = MockBackend::scripted(10, 10, |q| q.tenths() as usize * 100);
        let surface = backend.decode(b"x").unwrap();
        let bytes = backend
            .encode(
                &surface,
                &EncodeParams {
                    quality: QualityFactor::from_tenths(3),
                },
            )
            .unwrap();
        assert_eq!(bytes.len(), 300);
        assert_eq!(backend.encode_attempts(), vec![3]);
    }

    #[test]
    fn mock_undecodable_reports_decode_error() {
        let backend = MockBackend::undecodable();
        assert!(matches!(
            backend.decode(b"garbage"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn dimensions_helpers() {
        let d = Dimensions::new(300, 500);
        assert_eq!(d.longer_edge(), 500);
        assert_eq!(d.as_tuple(), (300, 500));
    }
}
