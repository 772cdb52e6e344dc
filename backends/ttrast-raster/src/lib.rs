// this_file: backends/ttrast-raster/src/lib.rs

//! ttrast-raster: outlines in, fractional coverage out
//!
//! The pipeline per glyph:
//!
//! 1. Scale and flip the outline into pixel space, snapping every coordinate
//!    to the 26.6 grid ([`fixed`])
//! 2. Flatten quadratic segments into lines ([`curves`])
//! 3. Build an edge table in oversampled row space ([`edge`])
//! 4. Sweep the sub-scanlines with an active edge table, accumulating exact
//!    horizontal coverage per pixel ([`scan_converter`])
//!
//! [`Rasterizer`] runs that pipeline for a single outline and charges every
//! working buffer to the host allocator. [`GlyphRasterizer`] binds it to a
//! [`Font`](ttrast_sfnt::Font) and a pixel size, and [`batch`] fans glyph
//! lists out over threads when the `parallel` feature is enabled.

use std::fmt;
use std::str::FromStr;

use ttrast_core::TtError;

pub mod batch;
pub mod curves;
pub mod edge;
pub mod fixed;
pub mod rasterizer;
pub mod scan_converter;

pub use batch::{rasterize_batch, BatchOutput, CancelFlag};
pub use rasterizer::{GlyphBitmap, GlyphRasterizer, Placement, Rasterizer};

/// How overlapping and self-intersecting contours are resolved
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum FillRule {
    /// Inside wherever the signed crossing count is non-zero; what
    /// TrueType fonts are drawn for
    #[default]
    NonZeroWinding,
    /// Inside wherever the crossing count is odd
    EvenOdd,
}

impl FromStr for FillRule {
    type Err = TtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nonzero" | "non-zero" | "winding" => Ok(FillRule::NonZeroWinding),
            "evenodd" | "even-odd" => Ok(FillRule::EvenOdd),
            other => Err(TtError::config(format!("unknown fill rule '{}'", other))),
        }
    }
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FillRule::NonZeroWinding => "nonzero",
            FillRule::EvenOdd => "even-odd",
        })
    }
}
