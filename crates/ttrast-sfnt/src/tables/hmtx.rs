//! Horizontal metrics

use ttrast_core::{GlyphId, GlyphMetrics, Result, TtError};

use crate::reader::Reader;

/// `hmtx` view
///
/// The first `number_of_h_metrics` glyphs have a full record; the rest
/// reuse the last advance and store only their left side bearing.
#[derive(Debug, Clone, Copy)]
pub struct Hmtx<'a> {
    data: Reader<'a>,
    number_of_h_metrics: u16,
}

impl<'a> Hmtx<'a> {
    pub fn new(data: &'a [u8], number_of_h_metrics: u16) -> Result<Self> {
        if number_of_h_metrics == 0 {
            return Err(TtError::invalid_font("hhea.numberOfHMetrics is zero"));
        }
        Ok(Self {
            data: Reader::new(data),
            number_of_h_metrics,
        })
    }

    pub fn metrics(&self, glyph: GlyphId) -> Result<GlyphMetrics> {
        let long = self.number_of_h_metrics as usize;
        let g = glyph as usize;
        if g < long {
            return Ok(GlyphMetrics {
                advance_width: self.data.read_u16(g * 4)?,
                left_side_bearing: self.data.read_i16(g * 4 + 2)?,
            });
        }
        let advance_width = self.data.read_u16((long - 1) * 4)?;
        let left_side_bearing = self.data.read_i16(long * 4 + (g - long) * 2)?;
        Ok(GlyphMetrics {
            advance_width,
            left_side_bearing,
        })
    }
}
