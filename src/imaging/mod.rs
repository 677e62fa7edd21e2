//! Image compression — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode** | `image` crate decoders (JPEG, PNG, GIF, TIFF, WebP) |
//! | **Resize** | Lanczos3, longer edge capped at 1200 px |
//! | **Re-encode** | JPEG quality ladder 0.8 → 0.1 until under the size budget |
//! | **Transport** | base64 `data:` URL |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and size math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use calculations::{MAX_DIMENSION, fit_within, format_file_size};
pub use operations::{
    CompressEvent, CompressOptions, CompressionResult, DEFAULT_MAX_SIZE_KB, ImageMetadata,
    SourceFile, collect_image_files, compress_files, compress_image, image_metadata,
    is_image_mime, output_paths, to_data_url,
};
pub use params::QualityFactor;
pub use rust_backend::{RustBackend, supported_input_extensions};
