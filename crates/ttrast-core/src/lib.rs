// this_file: crates/ttrast-core/src/lib.rs

//! ttrast Core: the vocabulary shared by every stage
//!
//! A glyph travels through three stages on its way to pixels:
//!
//! 1. **Table reading** - big-endian structures pulled out of the font blob
//! 2. **Outline extraction** - contours of quadratic curves in font units
//! 3. **Scan conversion** - contours become fractional pixel coverage
//!
//! The crates implementing those stages only agree on what lives here: the
//! [`Outline`] they pass along, the [`CoverageBitmap`] that comes out the far
//! end, the [`TtError`] taxonomy, and the [`Host`] capability set that stands
//! in for the allocator and math routines a C-style library would have
//! linked against.

pub mod config;
pub mod coverage;
pub mod error;
pub mod host;
pub mod outline;

pub use config::{OutlineConfig, RasterConfig, RoundingMode};
pub use coverage::CoverageBitmap;
pub use error::{Result, TtError};
pub use host::{
    Allocation, BudgetAllocator, Host, HostAllocator, HostMath, StdMath, SystemAllocator,
};
pub use outline::{Bounds, Contour, Outline, Point, Segment, Transform};
pub use types::{BitmapBox, GlyphId, GlyphMetrics, Tag, VerticalMetrics};

/// Plain numeric structures exchanged between stages
pub mod types {
    use std::fmt;

    /// Index of a glyph within one font
    pub type GlyphId = u16;

    /// Four-byte table identifier such as `glyf` or `OS/2`
    #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Tag([u8; 4]);

    impl Tag {
        pub const HEAD: Tag = Tag(*b"head");
        pub const HHEA: Tag = Tag(*b"hhea");
        pub const HMTX: Tag = Tag(*b"hmtx");
        pub const MAXP: Tag = Tag(*b"maxp");
        pub const LOCA: Tag = Tag(*b"loca");
        pub const GLYF: Tag = Tag(*b"glyf");
        pub const CMAP: Tag = Tag(*b"cmap");
        pub const KERN: Tag = Tag(*b"kern");

        pub const fn new(bytes: &[u8; 4]) -> Self {
            Tag(*bytes)
        }

        pub const fn from_u32(value: u32) -> Self {
            Tag(value.to_be_bytes())
        }

        pub const fn to_bytes(self) -> [u8; 4] {
            self.0
        }

        pub const fn to_u32(self) -> u32 {
            u32::from_be_bytes(self.0)
        }
    }

    impl fmt::Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for &b in &self.0 {
                let c = if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '?'
                };
                write!(f, "{}", c)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Tag('{}')", self)
        }
    }

    /// Horizontal metrics of one glyph, in font units
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GlyphMetrics {
        pub advance_width: u16,
        pub left_side_bearing: i16,
    }

    /// Font-wide vertical metrics from `hhea`, in font units
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VerticalMetrics {
        pub ascent: i16,
        pub descent: i16,
        pub line_gap: i16,
    }

    impl VerticalMetrics {
        /// Baseline-to-baseline distance
        pub fn line_height(&self) -> i32 {
            self.ascent as i32 - self.descent as i32 + self.line_gap as i32
        }
    }

    /// Integer pixel rectangle in y-down bitmap space
    ///
    /// `x0`/`y0` are inclusive, `x1`/`y1` exclusive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BitmapBox {
        pub x0: i32,
        pub y0: i32,
        pub x1: i32,
        pub y1: i32,
    }

    impl BitmapBox {
        /// Never overflows: the full `i32` span is `u32::MAX` wide
        pub fn width(&self) -> u32 {
            span(self.x0, self.x1)
        }

        pub fn height(&self) -> u32 {
            span(self.y0, self.y1)
        }

        pub fn is_empty(&self) -> bool {
            self.width() == 0 || self.height() == 0
        }
    }

    fn span(from: i32, to: i32) -> u32 {
        (to as i64 - from as i64).clamp(0, u32::MAX as i64) as u32
    }

}
