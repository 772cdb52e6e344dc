//! Parsers for the tables a rasterizer needs

pub mod cmap;
pub mod hmtx;
pub mod kern;
pub mod loca;

use ttrast_core::{Result, TtError, VerticalMetrics};

use crate::reader::Reader;

/// How `loca` stores its offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaFormat {
    /// `u16` offsets divided by two
    Short,
    Long,
}

/// The fields of `head` used for outlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub loca_format: LocaFormat,
}

impl Head {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let r = Reader::new(data);
        let units_per_em = r.read_u16(18)?;
        if units_per_em == 0 {
            return Err(TtError::invalid_font("head.unitsPerEm is zero"));
        }
        let loca_format = match r.read_i16(50)? {
            0 => LocaFormat::Short,
            1 => LocaFormat::Long,
            other => {
                return Err(TtError::invalid_font(format!(
                    "head.indexToLocFormat {} is neither 0 nor 1",
                    other
                )))
            },
        };
        Ok(Self {
            units_per_em,
            x_min: r.read_i16(36)?,
            y_min: r.read_i16(38)?,
            x_max: r.read_i16(40)?,
            y_max: r.read_i16(42)?,
            loca_format,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maxp {
    pub num_glyphs: u16,
}

impl Maxp {
    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            num_glyphs: Reader::new(data).read_u16(4)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hhea {
    pub metrics: VerticalMetrics,
    pub number_of_h_metrics: u16,
}

impl Hhea {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let r = Reader::new(data);
        Ok(Self {
            metrics: VerticalMetrics {
                ascent: r.read_i16(4)?,
                descent: r.read_i16(6)?,
                line_gap: r.read_i16(8)?,
            },
            number_of_h_metrics: r.read_u16(34)?,
        })
    }
}
