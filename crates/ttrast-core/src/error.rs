//! Error types for ttrast

use thiserror::Error;

use crate::types::{GlyphId, Tag};

pub type Result<T> = std::result::Result<T, TtError>;

/// Main error type for ttrast
///
/// Parsing errors are reported per table or per glyph; a single broken glyph
/// never poisons the rest of the font. See [`TtError::is_glyph_recoverable`]
/// for the variants a renderer should answer with an empty glyph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TtError {
    /// A read ran past the end of the buffer it was aimed at.
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    /// A table the font cannot work without is absent from the directory.
    #[error("required table '{0}' is missing")]
    MissingTable(Tag),

    #[error("invalid font: {0}")]
    InvalidFont(String),

    #[error("glyph {glyph} has invalid data: {reason}")]
    InvalidGlyphData { glyph: GlyphId, reason: String },

    #[error("composite glyph {glyph} exceeds the nesting limit of {limit}")]
    CompositeRecursionLimit { glyph: GlyphId, limit: u32 },

    /// Not produced by rasterization: empty outlines render as empty bitmaps.
    /// Only reported when a caller explicitly asks for a drawable glyph.
    #[error("glyph {0} has no contours")]
    DegenerateGlyph(GlyphId),

    #[error("glyph {glyph} is out of range (font has {count} glyphs)")]
    GlyphOutOfRange { glyph: GlyphId, count: u16 },

    #[error("font has no supported character map subtable")]
    UnsupportedCmap,

    #[error("bitmap of {width}x{height} exceeds the maximum dimension of {max}")]
    BitmapTooLarge { width: u32, height: u32, max: u32 },

    #[error("host allocator refused a request for {bytes} bytes")]
    AllocationFailed { bytes: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

impl TtError {
    /// Out-of-bounds read of `len` bytes at `offset` in a buffer of `available` bytes
    pub fn out_of_bounds(offset: usize, len: usize, available: usize) -> Self {
        Self::OutOfBounds {
            offset,
            len,
            available,
        }
    }

    /// Malformed glyph encoding
    ///
    /// ```
    /// # use ttrast_core::TtError;
    /// let err = TtError::invalid_glyph(7, "flag repeat overruns point count");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "glyph 7 has invalid data: flag repeat overruns point count"
    /// );
    /// ```
    pub fn invalid_glyph(glyph: GlyphId, reason: impl Into<String>) -> Self {
        Self::InvalidGlyphData {
            glyph,
            reason: reason.into(),
        }
    }

    pub fn invalid_font(reason: impl Into<String>) -> Self {
        Self::InvalidFont(reason.into())
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Whether the error only concerns one glyph
    ///
    /// Callers should render nothing for that glyph and carry on with the
    /// rest of the text; the error itself is still worth logging.
    pub fn is_glyph_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidGlyphData { .. }
                | Self::CompositeRecursionLimit { .. }
                | Self::DegenerateGlyph(_)
                | Self::GlyphOutOfRange { .. }
        )
    }

    /// Whether an error raised while decoding one glyph's outline leaves the
    /// rest of the font usable
    ///
    /// Adds short reads to [`is_glyph_recoverable`](Self::is_glyph_recoverable):
    /// tables are range-checked when a font is opened, so a read past the end
    /// during decoding means the glyph's own bytes are truncated.
    pub fn is_glyph_data_error(&self) -> bool {
        self.is_glyph_recoverable() || matches!(self, Self::OutOfBounds { .. })
    }
}
