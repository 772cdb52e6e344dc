//! TrueType collections (`ttcf`)
//!
//! A plain sfnt counts as a collection of one font at offset 0.

use ttrast_core::{Result, TtError};

use crate::reader::Reader;

pub const TTCF_MAGIC: u32 = 0x7474_6366;

pub fn is_collection(data: &[u8]) -> bool {
    Reader::new(data).read_u32(0).ok() == Some(TTCF_MAGIC)
}

/// Number of fonts stored in `data`
pub fn font_count(data: &[u8]) -> Result<u32> {
    if is_collection(data) {
        Reader::new(data).read_u32(8)
    } else {
        Ok(1)
    }
}

/// Offset of the table directory of font `index`
pub fn font_offset(data: &[u8], index: u32) -> Result<usize> {
    let count = font_count(data)?;
    if index >= count {
        return Err(TtError::invalid_font(format!(
            "font index {} out of range, file holds {} font(s)",
            index, count
        )));
    }
    if !is_collection(data) {
        return Ok(0);
    }
    let entry = 12usize + index as usize * 4;
    Ok(Reader::new(data).read_u32(entry)? as usize)
}
