//! Legacy pair kerning from the `kern` table
//!
//! Only the first subtable is consulted, and only when it is a horizontal
//! format 0 pair list. Anything else kerns to zero.

use ttrast_core::{GlyphId, Result};

use crate::reader::Reader;

const COVERAGE_HORIZONTAL: u16 = 0x0001;
const COVERAGE_MINIMUM: u16 = 0x0002;
const COVERAGE_CROSS_STREAM: u16 = 0x0004;

#[derive(Debug, Clone, Copy)]
pub struct Kern<'a> {
    /// Format 0 pair array, or `None` when the table has nothing usable
    pairs: Option<(Reader<'a>, usize)>,
}

impl<'a> Kern<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let r = Reader::new(data);
        // Apple's version 1 header starts with a u32; it is ignored
        if r.read_u16(0)? != 0 || r.read_u16(2)? == 0 {
            return Ok(Self { pairs: None });
        }

        let coverage = r.read_u16(8)?;
        let format = coverage >> 8;
        let usable = format == 0
            && coverage & COVERAGE_HORIZONTAL != 0
            && coverage & (COVERAGE_MINIMUM | COVERAGE_CROSS_STREAM) == 0;
        if !usable {
            log::debug!("kern: first subtable coverage 0x{:04X} not usable", coverage);
            return Ok(Self { pairs: None });
        }

        let n_pairs = r.read_u16(10)? as usize;
        let pairs = r.sub(18, n_pairs * 6)?;
        Ok(Self {
            pairs: Some((pairs, n_pairs)),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.map_or(true, |(_, n)| n == 0)
    }

    /// Adjustment in font units between `left` and `right`
    pub fn advance(&self, left: GlyphId, right: GlyphId) -> Result<i16> {
        let Some((pairs, n)) = self.pairs else {
            return Ok(0);
        };
        let needle = (left as u32) << 16 | right as u32;

        let (mut lo, mut hi) = (0usize, n);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let key = pairs.read_u32(mid * 6)?;
            match key.cmp(&needle) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return pairs.read_i16(mid * 6 + 4),
            }
        }
        Ok(0)
    }
}
