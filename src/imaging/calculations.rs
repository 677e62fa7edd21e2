//! Pure calculation functions for image dimensions and sizes.
//!
//! All functions here are pure and testable without any I/O or images.

/// Longest edge a compressed image may have.
pub const MAX_DIMENSION: u32 = 1200;

/// Calculate the surface dimensions for a source so that its longer edge
/// does not exceed `max_dimension`.
///
/// Landscape sources wider than the limit are pinned on width; anything else
/// taller than the limit is pinned on height. The other edge scales
/// proportionally and is truncated to whole pixels (minimum 1). Sources that
/// already fit are returned unchanged — never upscaled.
///
/// # Examples
/// ```
/// # use keepsake::imaging::fit_within;
/// assert_eq!(fit_within((4000, 3000), 1200), (1200, 900));
/// assert_eq!(fit_within((3000, 4000), 1200), (900, 1200));
/// assert_eq!(fit_within((800, 600), 1200), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (width, height) = source;

    if width > height && width > max_dimension {
        let h = (height as f64 * max_dimension as f64 / width as f64) as u32;
        (max_dimension, h.max(1))
    } else if height > max_dimension {
        let w = (width as f64 * max_dimension as f64 / height as f64) as u32;
        (w.max(1), max_dimension)
    } else {
        (width, height)
    }
}

/// Width / height with two decimals, `"0"` for degenerate dimensions.
pub fn aspect_ratio_label(dimensions: (u32, u32)) -> String {
    let (width, height) = dimensions;
    if width == 0 || height == 0 {
        return "0".to_string();
    }
    format!("{:.2}", width as f64 / height as f64)
}

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable byte count in binary units: `1536` → `"1.5 KB"`.
///
/// The value is rounded to two decimals and trailing zeros are dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // Integer walk instead of log1024: ln(1 MiB) / ln(1024) is not exactly 2.
    let mut exponent = 0;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exponent])
}

/// Whether an encoded size fits a kilobyte budget.
pub fn fits_budget(size_bytes: usize, max_size_kb: u32) -> bool {
    size_bytes as f64 / 1024.0 <= max_size_kb as f64
}
