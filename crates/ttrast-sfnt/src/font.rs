//! Font loading and per-glyph queries

use ttrast_core::{
    Bounds, GlyphId, GlyphMetrics, Host, Outline, OutlineConfig, Result, Tag, TtError,
    VerticalMetrics,
};

use crate::collection;
use crate::directory::TableDirectory;
use crate::glyf::{Glyf, GlyphHeader};
use crate::tables::cmap::Cmap;
use crate::tables::hmtx::Hmtx;
use crate::tables::kern::Kern;
use crate::tables::loca::Loca;
use crate::tables::{Head, Hhea, Maxp};

/// Options for [`Font::with_options`]
#[derive(Debug, Clone, Default)]
pub struct FontOptions {
    /// Font to open inside a collection; ignored for plain fonts
    pub index: u32,
    pub host: Host,
    pub outline: OutlineConfig,
}

/// A TrueType font borrowed from its blob
///
/// The table directory and the fixed-size tables are parsed once here;
/// everything glyph-related is decoded on request. A `Font` never mutates
/// after construction and can be shared between threads by reference.
#[derive(Debug, Clone)]
pub struct Font<'a> {
    data: &'a [u8],
    directory: TableDirectory<'a>,
    head: Head,
    hhea: Hhea,
    num_glyphs: u16,
    hmtx: Hmtx<'a>,
    glyf: Glyf<'a>,
    cmap: Cmap<'a>,
    kern: Option<Kern<'a>>,
    host: Host,
    config: OutlineConfig,
}

impl<'a> Font<'a> {
    /// Open the first font in `data` with the default host
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_options(data, FontOptions::default())
    }

    /// Open font `index` of a collection
    pub fn from_collection(data: &'a [u8], index: u32) -> Result<Self> {
        Self::with_options(
            data,
            FontOptions {
                index,
                ..FontOptions::default()
            },
        )
    }

    pub fn with_options(data: &'a [u8], options: FontOptions) -> Result<Self> {
        let offset = collection::font_offset(data, options.index)?;
        let directory = TableDirectory::parse(data, offset)?;

        let head = Head::parse(directory.require_table(Tag::HEAD)?)?;
        let maxp = Maxp::parse(directory.require_table(Tag::MAXP)?)?;
        let hhea = Hhea::parse(directory.require_table(Tag::HHEA)?)?;
        let hmtx = Hmtx::new(
            directory.require_table(Tag::HMTX)?,
            hhea.number_of_h_metrics,
        )?;
        // glyf first: CFF-flavoured fonts lack both, and glyf is the one that matters
        let glyf_data = directory.require_table(Tag::GLYF)?;
        let loca = Loca::new(directory.require_table(Tag::LOCA)?, head.loca_format);
        let glyf = Glyf::new(glyf_data, loca, maxp.num_glyphs);
        let cmap = Cmap::parse(directory.require_table(Tag::CMAP)?)?;
        let kern = directory.table(Tag::KERN).map(Kern::parse).transpose()?;

        log::debug!(
            "loaded font {}: {} glyphs, {} units/em, cmap format {}",
            options.index,
            maxp.num_glyphs,
            head.units_per_em,
            cmap.format()
        );

        Ok(Self {
            data,
            directory,
            head,
            hhea,
            num_glyphs: maxp.num_glyphs,
            hmtx,
            glyf,
            cmap,
            kern,
            host: options.host,
            config: options.outline,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn directory(&self) -> &TableDirectory<'a> {
        &self.directory
    }

    /// Raw bytes of any table
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        self.directory.table(tag)
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn outline_config(&self) -> OutlineConfig {
        self.config
    }

    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// Union of all glyph boxes, from `head`
    pub fn font_bounds(&self) -> Bounds {
        Bounds {
            x_min: self.head.x_min as f32,
            y_min: self.head.y_min as f32,
            x_max: self.head.x_max as f32,
            y_max: self.head.y_max as f32,
        }
    }

    pub fn vertical_metrics(&self) -> VerticalMetrics {
        self.hhea.metrics
    }

    pub fn cmap(&self) -> &Cmap<'a> {
        &self.cmap
    }

    /// Glyph for `ch`, or `None` when the font does not map it
    pub fn glyph_index(&self, ch: char) -> Result<Option<GlyphId>> {
        self.cmap.glyph_index(ch as u32)
    }

    fn check_glyph(&self, glyph: GlyphId) -> Result<()> {
        if glyph >= self.num_glyphs {
            return Err(TtError::GlyphOutOfRange {
                glyph,
                count: self.num_glyphs,
            });
        }
        Ok(())
    }

    /// Horizontal metrics, borrowed from a component if it asks for that
    pub fn glyph_metrics(&self, glyph: GlyphId) -> Result<GlyphMetrics> {
        self.check_glyph(glyph)?;
        let source = self.glyf.metrics_source(glyph, self.config)?;
        self.hmtx.metrics(source)
    }

    pub fn glyph_header(&self, glyph: GlyphId) -> Result<Option<GlyphHeader>> {
        self.glyf.header(glyph)
    }

    /// Bounding box stored in the glyph header, without decoding the outline
    pub fn glyph_box(&self, glyph: GlyphId) -> Result<Option<Bounds>> {
        Ok(self.glyf.header(glyph)?.map(|h| h.bounds()))
    }

    /// Whether the glyph has no outline data at all
    pub fn is_glyph_empty(&self, glyph: GlyphId) -> Result<bool> {
        Ok(match self.glyf.header(glyph)? {
            None => true,
            Some(h) => h.number_of_contours == 0,
        })
    }

    /// Decode the outline of `glyph` in font units
    ///
    /// Decoding buffers are charged to the font's host allocator.
    pub fn outline(&self, glyph: GlyphId) -> Result<Outline> {
        self.glyf.outline(glyph, self.config, &self.host)
    }

    /// Pair adjustment from the legacy `kern` table, in font units
    pub fn kern_advance(&self, left: GlyphId, right: GlyphId) -> Result<i16> {
        match &self.kern {
            Some(kern) => kern.advance(left, right),
            None => Ok(0),
        }
    }

    /// Scale that maps the ascent-to-descent span onto `height` pixels
    pub fn scale_for_pixel_height(&self, height: f32) -> f32 {
        let m = self.hhea.metrics;
        let span = self.host.math().fabs(m.ascent as f32 - m.descent as f32);
        if span == 0.0 {
            return self.scale_for_em_to_pixels(height);
        }
        height / span
    }

    /// Scale that maps one em onto `pixels`
    pub fn scale_for_em_to_pixels(&self, pixels: f32) -> f32 {
        pixels / self.head.units_per_em as f32
    }
}
