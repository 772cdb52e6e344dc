//! The sfnt table directory

use ttrast_core::{Result, Tag, TtError};

use crate::reader::{Cursor, Reader};

/// `0x00010000`, the version of a TrueType sfnt
pub const TRUETYPE_MAGIC: u32 = 0x0001_0000;
/// Apple's `true` variant of [`TRUETYPE_MAGIC`]
pub const APPLE_TRUE_MAGIC: u32 = 0x7472_7565;
/// CFF-flavoured OpenType; the directory parses, but there is no `glyf`
pub const OPENTYPE_CFF_MAGIC: u32 = 0x4F54_544F;

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 16;

/// One entry of the table directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    /// From the start of the file, even inside a collection
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

/// Table records of one font, validated against the blob
#[derive(Debug, Clone)]
pub struct TableDirectory<'a> {
    data: &'a [u8],
    sfnt_version: u32,
    records: Vec<TableRecord>,
}

impl<'a> TableDirectory<'a> {
    /// Scan the directory of the font starting at `font_offset`
    ///
    /// Fails with [`TtError::InvalidFont`] for an unknown sfnt version and
    /// with [`TtError::OutOfBounds`] when the directory or any table it
    /// lists extends past the end of `data`.
    pub fn parse(data: &'a [u8], font_offset: usize) -> Result<Self> {
        let reader = Reader::new(data);
        let mut c = reader.cursor(font_offset);

        let sfnt_version = c.u32()?;
        match sfnt_version {
            TRUETYPE_MAGIC | APPLE_TRUE_MAGIC | OPENTYPE_CFF_MAGIC => {},
            other => {
                return Err(TtError::invalid_font(format!(
                    "unknown sfnt version 0x{:08X}",
                    other
                )))
            },
        }

        let num_tables = c.u16()? as usize;
        // searchRange, entrySelector, rangeShift
        c.skip(6)?;
        debug_assert_eq!(c.position(), font_offset + HEADER_LEN);

        // Check the whole record array up front so a lying count fails fast
        reader.slice(c.position(), num_tables * RECORD_LEN)?;

        let mut records = Vec::with_capacity(num_tables);
        for _ in 0..num_tables {
            let record = read_record(&mut c)?;
            reader.slice(record.offset as usize, record.length as usize)?;
            records.push(record);
        }

        log::debug!(
            "sfnt directory at {}: version 0x{:08X}, {} tables",
            font_offset,
            sfnt_version,
            records.len()
        );

        Ok(Self {
            data,
            sfnt_version,
            records,
        })
    }

    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }

    pub fn find(&self, tag: Tag) -> Option<TableRecord> {
        self.records.iter().find(|r| r.tag == tag).copied()
    }

    pub fn require(&self, tag: Tag) -> Result<TableRecord> {
        self.find(tag).ok_or(TtError::MissingTable(tag))
    }

    /// Raw bytes of a table, if present
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        self.find(tag).and_then(|r| self.data.get(r.range()))
    }

    pub fn require_table(&self, tag: Tag) -> Result<&'a [u8]> {
        let record = self.require(tag)?;
        Reader::new(self.data).slice(record.offset as usize, record.length as usize)
    }
}

fn read_record(c: &mut Cursor<'_>) -> Result<TableRecord> {
    Ok(TableRecord {
        tag: c.tag()?,
        checksum: c.u32()?,
        offset: c.u32()?,
        length: c.u32()?,
    })
}

/// Standard sfnt checksum: the big-endian `u32` sum of the zero-padded data
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
