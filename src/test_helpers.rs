//! Shared test utilities for the keepsake test suite.
//!
//! Synthetic images are generated in memory so tests never depend on
//! fixture files, and [`at`] builds wall-clock times from a compact string.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let jpeg = create_test_jpeg(200, 150);
//! let now = at("2024-02-14 18:30");
//! ```

use chrono::NaiveDateTime;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

/// A smooth-gradient JPEG of the given dimensions.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Jpeg)
}

/// A smooth-gradient PNG of the given dimensions.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

/// A PNG full of deterministic noise.
///
/// Noise survives JPEG compression badly, so even the lowest quality step
/// stays well above a one-kilobyte budget.
pub fn create_noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    encode(img, ImageFormat::Png)
}

// =========================================================================
// Clock
// =========================================================================

/// Parse `"YYYY-MM-DD HH:MM"` into a wall-clock time. Panics on bad input.
pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .unwrap_or_else(|e| panic!("bad test timestamp '{s}': {e}"))
}
