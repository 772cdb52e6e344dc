//! Glyph locations

use std::ops::Range;

use ttrast_core::{GlyphId, Result, TtError};

use super::LocaFormat;
use crate::reader::Reader;

#[derive(Debug, Clone, Copy)]
pub struct Loca<'a> {
    data: Reader<'a>,
    format: LocaFormat,
}

impl<'a> Loca<'a> {
    pub fn new(data: &'a [u8], format: LocaFormat) -> Self {
        Self {
            data: Reader::new(data),
            format,
        }
    }

    fn offset(&self, index: usize) -> Result<usize> {
        Ok(match self.format {
            LocaFormat::Short => self.data.read_u16(index * 2)? as usize * 2,
            LocaFormat::Long => self.data.read_u32(index * 4)? as usize,
        })
    }

    /// Byte range of a glyph inside `glyf`; `None` for a glyph without data
    pub fn glyph_range(&self, glyph: GlyphId) -> Result<Option<Range<usize>>> {
        let start = self.offset(glyph as usize)?;
        let end = self.offset(glyph as usize + 1)?;
        if end < start {
            return Err(TtError::invalid_glyph(
                glyph,
                format!("loca offsets decrease ({} > {})", start, end),
            ));
        }
        Ok((end > start).then_some(start..end))
    }
}
