//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which runs
//! the resize + re-encode loop) and the [`backend`](super::backend) (which
//! does the pixel work), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`QualityFactor`] — Lossy encoding quality on the 0.0–1.0 scale, held as
//!   whole tenths so the retry ladder is exact.
//! - [`ResizeParams`] — Target surface dimensions.
//! - [`EncodeParams`] — Quality for one JPEG encode attempt.

use std::fmt;

/// Quality factor for lossy re-encoding, stored in tenths (1 = 0.1, 8 = 0.8).
///
/// Floating point subtraction of 0.1 drifts (`0.8 - 7 * 0.1 > 0.1`), which
/// would let the retry loop run past its floor. Tenths keep every step exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualityFactor(u8);

impl QualityFactor {
    /// First attempt of the compression loop (0.8).
    pub const INITIAL: QualityFactor = QualityFactor(8);
    /// Last attempt of the compression loop (0.1). Always accepted.
    pub const FLOOR: QualityFactor = QualityFactor(1);

    /// Build from tenths, clamped to 1..=10.
    pub fn from_tenths(tenths: u8) -> Self {
        Self(tenths.clamp(1, 10))
    }

    pub fn tenths(self) -> u8 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Encoder quality on the 1–100 scale used by `JpegEncoder`.
    pub fn jpeg_quality(self) -> u8 {
        self.0 * 10
    }

    pub fn is_floor(self) -> bool {
        self <= Self::FLOOR
    }

    /// The next lower step, or `None` once the floor is reached.
    pub fn step_down(self) -> Option<Self> {
        if self.is_floor() {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }
}

impl Default for QualityFactor {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for QualityFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", u32::from(self.0) * 10)
    }
}

/// Target dimensions for drawing the source onto a fresh surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
}

/// Parameters for one encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub quality: QualityFactor,
}
