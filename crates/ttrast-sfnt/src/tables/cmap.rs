//! Character to glyph mapping
//!
//! Of all encoding records the one with the widest Unicode coverage wins:
//! full-repertoire Unicode first, then the BMP, then legacy encodings.
//! Formats 0, 4, 6, 12 and 13 are understood; variation sequences
//! (format 14) are not.

use ttrast_core::{GlyphId, Result, TtError};

use crate::reader::Reader;

const SUPPORTED_FORMATS: [u16; 5] = [0, 4, 6, 12, 13];

/// Preference of an encoding record; `None` for records that are never used
fn encoding_score(platform: u16, encoding: u16) -> Option<u8> {
    match (platform, encoding) {
        // Unicode full repertoire
        (0, 4) | (0, 6) | (3, 10) => Some(4),
        // Unicode BMP
        (0, 3) | (3, 1) => Some(3),
        (0, 0..=2) => Some(2),
        // Windows symbol
        (3, 0) => Some(1),
        // Mac Roman
        (1, 0) => Some(0),
        // (0, 5) holds variation sequences only
        _ => None,
    }
}

/// The selected `cmap` subtable
#[derive(Debug, Clone, Copy)]
pub struct Cmap<'a> {
    subtable: Reader<'a>,
    format: u16,
    platform_id: u16,
    encoding_id: u16,
}

impl<'a> Cmap<'a> {
    /// Select the best supported subtable of a `cmap` table
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let r = Reader::new(data);
        let num_tables = r.read_u16(2)? as usize;

        let mut best: Option<(u8, Cmap<'a>)> = None;
        for i in 0..num_tables {
            let rec = 4 + i * 8;
            let platform_id = r.read_u16(rec)?;
            let encoding_id = r.read_u16(rec + 2)?;
            let offset = r.read_u32(rec + 4)? as usize;

            let Some(score) = encoding_score(platform_id, encoding_id) else {
                continue;
            };
            if best.as_ref().is_some_and(|(s, _)| *s >= score) {
                continue;
            }
            let subtable = r.tail(offset)?;
            let format = subtable.read_u16(0)?;
            if !SUPPORTED_FORMATS.contains(&format) {
                log::debug!(
                    "cmap: skipping format {} subtable ({}, {})",
                    format,
                    platform_id,
                    encoding_id
                );
                continue;
            }
            best = Some((
                score,
                Cmap {
                    subtable,
                    format,
                    platform_id,
                    encoding_id,
                },
            ));
        }

        best.map(|(_, cmap)| cmap).ok_or(TtError::UnsupportedCmap)
    }

    pub fn format(&self) -> u16 {
        self.format
    }

    /// Platform and encoding of the chosen record
    pub fn encoding(&self) -> (u16, u16) {
        (self.platform_id, self.encoding_id)
    }

    /// Glyph for a character code; `None` when unmapped
    pub fn glyph_index(&self, code: u32) -> Result<Option<GlyphId>> {
        let glyph = match self.format {
            0 => self.format0(code)?,
            4 => self.format4(code)?,
            6 => self.format6(code)?,
            12 => self.segmented(code, false)?,
            13 => self.segmented(code, true)?,
            _ => None,
        };
        Ok(glyph.filter(|&g| g != 0))
    }

    fn format0(&self, code: u32) -> Result<Option<GlyphId>> {
        if code > 0xFF {
            return Ok(None);
        }
        Ok(Some(self.subtable.read_u8(6 + code as usize)? as GlyphId))
    }

    fn format4(&self, code: u32) -> Result<Option<GlyphId>> {
        if code > 0xFFFF {
            return Ok(None);
        }
        let code = code as u16;
        let r = &self.subtable;
        let seg_count = (r.read_u16(6)? / 2) as usize;
        let end_codes = 14;
        let start_codes = end_codes + seg_count * 2 + 2;
        let id_deltas = start_codes + seg_count * 2;
        let id_range_offsets = id_deltas + seg_count * 2;

        // First segment whose end code is >= code
        let (mut lo, mut hi) = (0usize, seg_count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if r.read_u16(end_codes + mid * 2)? < code {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == seg_count {
            return Ok(None);
        }
        let seg = lo;

        let start = r.read_u16(start_codes + seg * 2)?;
        if code < start {
            return Ok(None);
        }
        let delta = r.read_u16(id_deltas + seg * 2)?;
        let range_offset_pos = id_range_offsets + seg * 2;
        let range_offset = r.read_u16(range_offset_pos)? as usize;

        if range_offset == 0 {
            return Ok(Some(code.wrapping_add(delta)));
        }
        let addr = range_offset_pos + range_offset + (code - start) as usize * 2;
        let glyph = r.read_u16(addr)?;
        if glyph == 0 {
            return Ok(None);
        }
        Ok(Some(glyph.wrapping_add(delta)))
    }

    fn format6(&self, code: u32) -> Result<Option<GlyphId>> {
        let r = &self.subtable;
        let first = r.read_u16(6)? as u32;
        let count = r.read_u16(8)? as u32;
        if code < first || code - first >= count {
            return Ok(None);
        }
        Ok(Some(r.read_u16(10 + (code - first) as usize * 2)?))
    }

    /// Formats 12 and 13: sorted groups of `(start, end, glyph)`
    fn segmented(&self, code: u32, constant: bool) -> Result<Option<GlyphId>> {
        let r = &self.subtable;
        let num_groups = r.read_u32(12)? as usize;
        let group = |i: usize| -> Result<(u32, u32, u32)> {
            let at = 16 + i * 12;
            Ok((r.read_u32(at)?, r.read_u32(at + 4)?, r.read_u32(at + 8)?))
        };

        let (mut lo, mut hi) = (0usize, num_groups);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let (start, end, glyph) = group(mid)?;
            if code < start {
                hi = mid;
            } else if code > end {
                lo = mid + 1;
            } else {
                let id = if constant {
                    glyph
                } else {
                    glyph.wrapping_add(code - start)
                };
                return Ok(GlyphId::try_from(id).ok());
            }
        }
        Ok(None)
    }
}
