//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they take
//! options, compute parameters, and drive the backend. The centrepiece is
//! [`compress_image`], the resize + quality-ladder loop used for every photo
//! before it is stored.

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::calculations::{
    MAX_DIMENSION, aspect_ratio_label, fit_within, fits_budget, format_file_size,
};
use super::params::{EncodeParams, QualityFactor, ResizeParams};
use super::rust_backend::{sniff_mime_type, supported_input_extensions};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Default size ceiling for [`compress_image`].
pub const DEFAULT_MAX_SIZE_KB: u32 = 500;

/// A source image as handed over by the user: bytes plus file facts.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
    pub mime_type: String,
    pub last_modified: Option<DateTime<Local>>,
}

impl SourceFile {
    /// Wrap in-memory bytes; the MIME type is sniffed from the content.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        let mime_type = sniff_mime_type(&data)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            name: name.into(),
            data,
            mime_type,
            last_modified: None,
        }
    }

    /// Read a file from disk. MIME comes from the content, falling back to
    /// the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let modified = std::fs::metadata(path)?.modified().ok();
        let mime_type = sniff_mime_type(&data)
            .or_else(|| mime_from_extension(path))
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            data,
            mime_type,
            last_modified: modified.map(DateTime::<Local>::from),
        })
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|fmt| fmt.to_mime_type())
}

/// True when the MIME type names an image.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Options for [`compress_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Size ceiling in kilobytes (1 KB = 1024 bytes).
    pub max_size_kb: u32,
    /// Longest edge of the output.
    pub max_dimension: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            max_dimension: MAX_DIMENSION,
        }
    }
}

impl CompressOptions {
    pub fn with_max_size_kb(max_size_kb: u32) -> Self {
        Self {
            max_size_kb,
            ..Self::default()
        }
    }
}

/// Final blob and the quality factor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub image: EncodedImage,
    /// `None` when the source could not be decoded and was returned as is.
    pub quality: Option<QualityFactor>,
}

impl CompressionResult {
    pub fn is_passthrough(&self) -> bool {
        self.quality.is_none()
    }
}

/// Resize and re-encode a source until it fits `options.max_size_kb`.
///
/// 1. The longer edge is capped at `options.max_dimension` (never upscaled).
/// 2. JPEG encodes run at quality 0.8, 0.7, … 0.1; the first attempt that
///    fits the budget wins, and 0.1 is accepted even when still oversized.
///
/// A source that cannot be decoded is returned unchanged with no quality.
/// Encoder failures after a successful decode are propagated.
pub fn compress_image<B: ImageBackend>(
    backend: &B,
    source: &SourceFile,
    options: &CompressOptions,
) -> Result<CompressionResult> {
    let surface = match backend.decode(&source.data) {
        Ok(surface) => surface,
        Err(BackendError::Decode(reason)) => {
            warn!(name = %source.name, %reason, "image could not be decoded, keeping original");
            return Ok(CompressionResult {
                image: EncodedImage {
                    data: source.data.clone(),
                    mime_type: source.mime_type.clone(),
                    dimensions: None,
                },
                quality: None,
            });
        }
        Err(e) => return Err(e),
    };

    let original = backend.dimensions(&surface);
    let (width, height) = fit_within(original.as_tuple(), options.max_dimension);
    let surface = backend.resize(surface, &ResizeParams { width, height })?;

    let mut quality = QualityFactor::INITIAL;
    loop {
        let data = backend.encode(&surface, &EncodeParams { quality })?;
        let fits = fits_budget(data.len(), options.max_size_kb);
        debug!(
            name = %source.name,
            %quality,
            size_bytes = data.len(),
            fits,
            "encode attempt"
        );

        match quality.step_down() {
            Some(next) if !fits => quality = next,
            _ => {
                debug!(
                    name = %source.name,
                    "final size: {:.1}KB at quality {}",
                    data.len() as f64 / 1024.0,
                    quality
                );
                return Ok(CompressionResult {
                    image: EncodedImage {
                        data,
                        mime_type: backend.output_mime_type().to_string(),
                        dimensions: Some(Dimensions::new(width, height)),
                    },
                    quality: Some(quality),
                });
            }
        }
    }
}

/// Encode a blob as a `data:` URL (standard base64 alphabet, padded).
pub fn to_data_url(image: &EncodedImage) -> String {
    format!(
        "data:{};base64,{}",
        image.mime_type,
        STANDARD.encode(&image.data)
    )
}

/// Descriptive facts about a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: String,
    pub size: String,
    pub mime_type: String,
    /// Short `DD.MM.YYYY` date, empty when unknown.
    pub last_modified: String,
}

/// Read dimensions and file facts. Undecodable sources report 0x0.
pub fn image_metadata<B: ImageBackend>(backend: &B, source: &SourceFile) -> ImageMetadata {
    let dims = backend
        .identify(&source.data)
        .unwrap_or(Dimensions::new(0, 0));
    ImageMetadata {
        width: dims.width,
        height: dims.height,
        aspect_ratio: aspect_ratio_label(dims.as_tuple()),
        size: format_file_size(source.size_bytes() as u64),
        mime_type: source.mime_type.clone(),
        last_modified: source
            .last_modified
            .map(|t| crate::dates::format_short(&t.naive_local()))
            .unwrap_or_default(),
    }
}

/// Progress event emitted per file by [`compress_files`].
#[derive(Debug, Clone)]
pub enum CompressEvent {
    Compressed {
        name: String,
        original_bytes: usize,
        final_bytes: usize,
        quality: QualityFactor,
        dimensions: Dimensions,
    },
    Passthrough {
        name: String,
        bytes: usize,
    },
    Failed {
        name: String,
        error: String,
    },
}

/// Compress many sources in parallel. Results keep input order.
///
/// Each source gets its own surface; nothing is shared between workers
/// except the (stateless) backend and the optional progress channel.
pub fn compress_files<B: ImageBackend>(
    backend: &B,
    sources: &[SourceFile],
    options: &CompressOptions,
    progress: Option<Sender<CompressEvent>>,
) -> Vec<Result<CompressionResult>> {
    sources
        .par_iter()
        .map_with(progress, |progress, source| {
            let result = compress_image(backend, source, options);
            if let Some(tx) = progress {
                let event = match &result {
                    Ok(r) => match (r.quality, r.image.dimensions) {
                        (Some(quality), Some(dimensions)) => CompressEvent::Compressed {
                            name: source.name.clone(),
                            original_bytes: source.size_bytes(),
                            final_bytes: r.image.size_bytes(),
                            quality,
                            dimensions,
                        },
                        _ => CompressEvent::Passthrough {
                            name: source.name.clone(),
                            bytes: source.size_bytes(),
                        },
                    },
                    Err(e) => CompressEvent::Failed {
                        name: source.name.clone(),
                        error: e.to_string(),
                    },
                };
                // Receiver gone means nobody is listening; keep working.
                tx.send(event).ok();
            }
            result
        })
        .collect()
}

/// Expand files and directories into the image files they contain.
///
/// Directories are walked recursively; only extensions with a compiled-in
/// decoder are kept. Explicit file arguments are kept regardless of
/// extension. Output is sorted for stable ordering.
pub fn collect_image_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let supported = supported_input_extensions();
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                let is_supported = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| supported.contains(&e.to_lowercase().as_str()));
                if entry.file_type().is_file() && is_supported {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

/// Output locations, relative to the output directory, for files found by
/// [`collect_image_files`].
///
/// A file keeps its path relative to the input directory it was found in;
/// explicit file arguments land at the top level. Compressed files take a
/// `.jpg` extension, passthroughs keep theirs. When two files would land on
/// the same path, the later one gets a `-2`, `-3`, … suffix on its stem.
pub fn output_paths(inputs: &[PathBuf], files: &[(&Path, bool)]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|&(file, passthrough)| {
            let relative = inputs
                .iter()
                .filter_map(|root| file.strip_prefix(root).ok())
                .find(|rel| !rel.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .or_else(|| file.file_name().map(PathBuf::from))
                .unwrap_or_default();
            let base = if passthrough {
                relative
            } else {
                relative.with_extension("jpg")
            };

            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = with_stem_suffix(&base, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

fn with_stem_suffix(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    path.with_file_name(name)
}
