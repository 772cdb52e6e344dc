//! Assemble small TrueType fonts in memory
//!
//! Tests, benches and fuzz seeds build their fonts here instead of
//! shipping binary fixtures. The output is a well-formed sfnt: tables are
//! sorted and 4-byte aligned, checksums are filled in, and point flags are
//! compressed the way font compilers do it.
//!
//! ```
//! use ttrast_core::Point;
//! use ttrast_sfnt::builder::{FontBuilder, GlyphSpec};
//! use ttrast_sfnt::Font;
//!
//! let data = FontBuilder::new(1000)
//!     .glyph(GlyphSpec::Empty { advance: 500 })
//!     .glyph(GlyphSpec::simple(
//!         vec![vec![Point::on(0.0, 0.0), Point::on(0.0, 700.0), Point::on(600.0, 0.0)]],
//!         650,
//!     ))
//!     .map_char('A', 1)
//!     .build();
//!
//! let font = Font::new(&data)?;
//! assert_eq!(font.glyph_index('A')?, Some(1));
//! # Ok::<(), ttrast_core::TtError>(())
//! ```

use std::collections::BTreeMap;

use ttrast_core::{GlyphId, Point, Tag};

use crate::directory::{checksum, TRUETYPE_MAGIC};

const HEAD_MAGIC: u32 = 0x5F0F_3CF5;
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// How a component is positioned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentPlacement {
    Offset(i16, i16),
    /// Parent point index, child point index
    Anchor(u16, u16),
}

/// Linear part of a component transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentTransform {
    Identity,
    Scale(f32),
    XyScale(f32, f32),
    TwoByTwo([f32; 4]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub glyph: GlyphId,
    pub placement: ComponentPlacement,
    pub transform: ComponentTransform,
    pub use_my_metrics: bool,
    pub scaled_offset: bool,
}

impl ComponentSpec {
    pub fn offset(glyph: GlyphId, dx: i16, dy: i16) -> Self {
        Self {
            glyph,
            placement: ComponentPlacement::Offset(dx, dy),
            transform: ComponentTransform::Identity,
            use_my_metrics: false,
            scaled_offset: false,
        }
    }

    pub fn anchored(glyph: GlyphId, parent_point: u16, child_point: u16) -> Self {
        Self {
            placement: ComponentPlacement::Anchor(parent_point, child_point),
            ..Self::offset(glyph, 0, 0)
        }
    }

    pub fn with_transform(mut self, transform: ComponentTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn use_my_metrics(mut self) -> Self {
        self.use_my_metrics = true;
        self
    }

    pub fn scaled_offset(mut self) -> Self {
        self.scaled_offset = true;
        self
    }
}

/// One glyph of the font under construction
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphSpec {
    /// No outline data, like a space
    Empty { advance: u16 },
    /// Contours in font units; coordinates are rounded to integers
    Simple {
        contours: Vec<Vec<Point>>,
        advance: u16,
    },
    Composite {
        components: Vec<ComponentSpec>,
        advance: u16,
    },
    /// Glyph bytes written as given, for malformed-data tests
    Raw { data: Vec<u8>, advance: u16 },
}

impl GlyphSpec {
    pub fn simple(contours: Vec<Vec<Point>>, advance: u16) -> Self {
        GlyphSpec::Simple { contours, advance }
    }

    pub fn composite(components: Vec<ComponentSpec>, advance: u16) -> Self {
        GlyphSpec::Composite {
            components,
            advance,
        }
    }

    fn advance(&self) -> u16 {
        match self {
            GlyphSpec::Empty { advance }
            | GlyphSpec::Simple { advance, .. }
            | GlyphSpec::Composite { advance, .. }
            | GlyphSpec::Raw { advance, .. } => *advance,
        }
    }
}

/// Which `cmap` subtable to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmapFormat {
    /// Format 4 when every mapped character is in the BMP, 12 otherwise
    Auto,
    Format4,
    Format12,
}

#[derive(Debug, Clone)]
pub struct FontBuilder {
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    line_gap: i16,
    glyphs: Vec<GlyphSpec>,
    chars: BTreeMap<u32, GlyphId>,
    kern: BTreeMap<(GlyphId, GlyphId), i16>,
    cmap_format: CmapFormat,
    force_long_loca: bool,
    sfnt_version: u32,
    omitted: Vec<Tag>,
    extra: Vec<(Tag, Vec<u8>)>,
}

impl FontBuilder {
    pub fn new(units_per_em: u16) -> Self {
        let ascent = (units_per_em as i32 * 4 / 5) as i16;
        Self {
            units_per_em,
            ascent,
            descent: ascent - units_per_em as i16,
            line_gap: 0,
            glyphs: Vec::new(),
            chars: BTreeMap::new(),
            kern: BTreeMap::new(),
            cmap_format: CmapFormat::Auto,
            force_long_loca: false,
            sfnt_version: TRUETYPE_MAGIC,
            omitted: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn vertical_metrics(mut self, ascent: i16, descent: i16, line_gap: i16) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self.line_gap = line_gap;
        self
    }

    /// Append a glyph; its id is the number of glyphs added before it
    pub fn glyph(mut self, glyph: GlyphSpec) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn map_char(mut self, ch: char, glyph: GlyphId) -> Self {
        self.chars.insert(ch as u32, glyph);
        self
    }

    pub fn kern_pair(mut self, left: GlyphId, right: GlyphId, value: i16) -> Self {
        self.kern.insert((left, right), value);
        self
    }

    pub fn cmap_format(mut self, format: CmapFormat) -> Self {
        self.cmap_format = format;
        self
    }

    /// Use 32-bit `loca` offsets even when 16-bit ones would do
    pub fn long_loca(mut self, long: bool) -> Self {
        self.force_long_loca = long;
        self
    }

    pub fn sfnt_version(mut self, version: u32) -> Self {
        self.sfnt_version = version;
        self
    }

    /// Leave a generated table out of the font
    pub fn omit_table(mut self, tag: Tag) -> Self {
        self.omitted.push(tag);
        self
    }

    /// Add a table verbatim, replacing a generated one with the same tag
    pub fn table(mut self, tag: Tag, data: Vec<u8>) -> Self {
        self.extra.push((tag, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_at(0)
    }

    /// Build a font whose table offsets assume it starts at `base`
    pub fn build_at(&self, base: usize) -> Vec<u8> {
        let encoded: Vec<EncodedGlyph> = self.glyphs.iter().map(encode_glyph).collect();

        let mut glyf = Vec::new();
        let mut offsets = vec![0usize];
        for g in &encoded {
            glyf.extend_from_slice(&g.data);
            offsets.push(glyf.len());
        }
        let long_loca = self.force_long_loca || glyf.len() / 2 > u16::MAX as usize;
        let mut loca = Vec::new();
        for &o in &offsets {
            if long_loca {
                put_u32(&mut loca, o as u32);
            } else {
                put_u16(&mut loca, (o / 2) as u16);
            }
        }

        let bbox = encoded
            .iter()
            .filter_map(|g| g.bbox)
            .fold(None::<[i16; 4]>, |acc, b| {
                Some(match acc {
                    None => b,
                    Some(a) => [a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])],
                })
            })
            .unwrap_or([0; 4]);

        let mut tables: BTreeMap<Tag, Vec<u8>> = BTreeMap::new();
        tables.insert(Tag::HEAD, self.head(bbox, long_loca));
        tables.insert(Tag::HHEA, self.hhea(&encoded));
        tables.insert(Tag::MAXP, self.maxp());
        tables.insert(Tag::HMTX, self.hmtx(&encoded));
        tables.insert(Tag::LOCA, loca);
        tables.insert(Tag::GLYF, glyf);
        tables.insert(Tag::CMAP, self.cmap());
        if !self.kern.is_empty() {
            tables.insert(Tag::KERN, self.kern_table());
        }
        for tag in &self.omitted {
            tables.remove(tag);
        }
        for (tag, data) in &self.extra {
            tables.insert(*tag, data.clone());
        }

        self.assemble(base, tables)
    }

    fn assemble(&self, base: usize, tables: BTreeMap<Tag, Vec<u8>>) -> Vec<u8> {
        let n = tables.len();
        let mut out = Vec::new();
        put_u32(&mut out, self.sfnt_version);
        put_u16(&mut out, n as u16);
        let (search_range, entry_selector) = search_params(n);
        put_u16(&mut out, search_range * 16);
        put_u16(&mut out, entry_selector);
        put_u16(&mut out, (n as u16 * 16).saturating_sub(search_range * 16));

        let mut offset = 12 + n * 16;
        let mut body = Vec::new();
        let mut head_at = None;
        for (tag, data) in &tables {
            if *tag == Tag::HEAD {
                head_at = Some(offset);
            }
            out.extend_from_slice(&tag.to_bytes());
            put_u32(&mut out, checksum(data));
            put_u32(&mut out, (base + offset) as u32);
            put_u32(&mut out, data.len() as u32);

            body.extend_from_slice(data);
            pad4(&mut body);
            offset = 12 + n * 16 + body.len();
        }
        out.extend_from_slice(&body);

        if let Some(at) = head_at {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
            if let Some(slot) = out.get_mut(at + 8..at + 12) {
                slot.copy_from_slice(&adjustment.to_be_bytes());
            }
        }
        out
    }

    fn head(&self, bbox: [i16; 4], long_loca: bool) -> Vec<u8> {
        let mut t = Vec::with_capacity(54);
        put_u32(&mut t, 0x0001_0000);
        put_u32(&mut t, 0x0001_0000);
        put_u32(&mut t, 0);
        put_u32(&mut t, HEAD_MAGIC);
        put_u16(&mut t, 0x000B);
        put_u16(&mut t, self.units_per_em);
        t.extend_from_slice(&[0; 16]);
        for v in bbox {
            put_i16(&mut t, v);
        }
        put_u16(&mut t, 0);
        put_u16(&mut t, 8);
        put_i16(&mut t, 2);
        put_i16(&mut t, long_loca as i16);
        put_i16(&mut t, 0);
        t
    }

    fn hhea(&self, glyphs: &[EncodedGlyph]) -> Vec<u8> {
        let max_advance = self.glyphs.iter().map(GlyphSpec::advance).max().unwrap_or(0);
        let min_lsb = glyphs.iter().filter_map(|g| g.bbox).map(|b| b[0]).min().unwrap_or(0);
        let x_max_extent = glyphs.iter().filter_map(|g| g.bbox).map(|b| b[2]).max().unwrap_or(0);

        let mut t = Vec::with_capacity(36);
        put_u32(&mut t, 0x0001_0000);
        put_i16(&mut t, self.ascent);
        put_i16(&mut t, self.descent);
        put_i16(&mut t, self.line_gap);
        put_u16(&mut t, max_advance);
        put_i16(&mut t, min_lsb);
        put_i16(&mut t, 0);
        put_i16(&mut t, x_max_extent);
        put_i16(&mut t, 1);
        put_i16(&mut t, 0);
        t.extend_from_slice(&[0; 12]);
        put_u16(&mut t, self.glyphs.len().max(1) as u16);
        t
    }

    fn maxp(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(32);
        put_u32(&mut t, 0x0001_0000);
        put_u16(&mut t, self.glyphs.len() as u16);
        t.extend_from_slice(&[0; 26]);
        t
    }

    fn hmtx(&self, glyphs: &[EncodedGlyph]) -> Vec<u8> {
        let mut t = Vec::new();
        for (spec, g) in self.glyphs.iter().zip(glyphs) {
            put_u16(&mut t, spec.advance());
            put_i16(&mut t, g.bbox.map_or(0, |b| b[0]));
        }
        if t.is_empty() {
            t.extend_from_slice(&[0; 4]);
        }
        t
    }

    fn cmap(&self) -> Vec<u8> {
        let bmp_only = self.chars.keys().all(|&c| c <= 0xFFFF);
        let use_12 = match self.cmap_format {
            CmapFormat::Auto => !bmp_only,
            CmapFormat::Format4 => false,
            CmapFormat::Format12 => true,
        };

        let mut t = Vec::new();
        put_u16(&mut t, 0);
        put_u16(&mut t, 1);
        put_u16(&mut t, 3);
        put_u16(&mut t, if use_12 { 10 } else { 1 });
        put_u32(&mut t, 12);
        if use_12 {
            t.extend_from_slice(&self.cmap_format12());
        } else {
            t.extend_from_slice(&self.cmap_format4());
        }
        t
    }

    /// Runs of consecutive codes mapped to consecutive glyphs
    fn char_runs(&self) -> Vec<(u32, u32, GlyphId)> {
        let mut runs: Vec<(u32, u32, GlyphId)> = Vec::new();
        for (&code, &glyph) in &self.chars {
            match runs.last_mut() {
                Some((start, end, first))
                    if *end + 1 == code && (*first as u32 + (code - *start)) == glyph as u32 =>
                {
                    *end = code;
                },
                _ => runs.push((code, code, glyph)),
            }
        }
        runs
    }

    fn cmap_format4(&self) -> Vec<u8> {
        let mut segments: Vec<(u16, u16, u16)> = self
            .char_runs()
            .into_iter()
            .filter(|&(_, end, _)| end < 0xFFFF)
            .map(|(start, end, glyph)| {
                (start as u16, end as u16, (glyph as u16).wrapping_sub(start as u16))
            })
            .collect();
        segments.push((0xFFFF, 0xFFFF, 1));

        let seg_count = segments.len() as u16;
        let (search_range, entry_selector) = search_params(seg_count as usize);
        let mut t = Vec::new();
        put_u16(&mut t, 4);
        put_u16(&mut t, (16 + segments.len() * 8) as u16);
        put_u16(&mut t, 0);
        put_u16(&mut t, seg_count * 2);
        put_u16(&mut t, search_range * 2);
        put_u16(&mut t, entry_selector);
        put_u16(&mut t, (seg_count - search_range) * 2);
        for &(_, end, _) in &segments {
            put_u16(&mut t, end);
        }
        put_u16(&mut t, 0);
        for &(start, _, _) in &segments {
            put_u16(&mut t, start);
        }
        for &(_, _, delta) in &segments {
            put_u16(&mut t, delta);
        }
        for _ in &segments {
            put_u16(&mut t, 0);
        }
        t
    }

    fn cmap_format12(&self) -> Vec<u8> {
        let runs = self.char_runs();
        let mut t = Vec::new();
        put_u16(&mut t, 12);
        put_u16(&mut t, 0);
        put_u32(&mut t, (16 + runs.len() * 12) as u32);
        put_u32(&mut t, 0);
        put_u32(&mut t, runs.len() as u32);
        for (start, end, glyph) in runs {
            put_u32(&mut t, start);
            put_u32(&mut t, end);
            put_u32(&mut t, glyph as u32);
        }
        t
    }

    fn kern_table(&self) -> Vec<u8> {
        let n = self.kern.len();
        let (search_range, entry_selector) = search_params(n);
        let mut t = Vec::new();
        put_u16(&mut t, 0);
        put_u16(&mut t, 1);
        put_u16(&mut t, 0);
        put_u16(&mut t, (14 + n * 6) as u16);
        put_u16(&mut t, 0x0001);
        put_u16(&mut t, n as u16);
        put_u16(&mut t, search_range * 6);
        put_u16(&mut t, entry_selector);
        put_u16(&mut t, (n as u16 - search_range) * 6);
        for (&(left, right), &value) in &self.kern {
            put_u16(&mut t, left);
            put_u16(&mut t, right);
            put_i16(&mut t, value);
        }
        t
    }
}

/// Assemble a `ttcf` collection from several fonts
pub fn collection(fonts: &[FontBuilder]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"ttcf");
    put_u32(&mut out, 0x0001_0000);
    put_u32(&mut out, fonts.len() as u32);

    let mut body = Vec::new();
    let header_len = 12 + fonts.len() * 4;
    for font in fonts {
        let offset = header_len + body.len();
        put_u32(&mut out, offset as u32);
        body.extend_from_slice(&font.build_at(offset));
        pad4(&mut body);
    }
    out.extend_from_slice(&body);
    out
}

struct EncodedGlyph {
    data: Vec<u8>,
    /// `[x_min, y_min, x_max, y_max]`; `None` without outline
    bbox: Option<[i16; 4]>,
}

fn encode_glyph(spec: &GlyphSpec) -> EncodedGlyph {
    let mut glyph = match spec {
        GlyphSpec::Empty { .. } => EncodedGlyph {
            data: Vec::new(),
            bbox: None,
        },
        GlyphSpec::Simple { contours, .. } => encode_simple(contours),
        GlyphSpec::Composite { components, .. } => encode_composite(components),
        GlyphSpec::Raw { data, .. } => EncodedGlyph {
            data: data.clone(),
            bbox: None,
        },
    };
    if glyph.data.len() % 2 == 1 {
        glyph.data.push(0);
    }
    glyph
}

fn encode_simple(contours: &[Vec<Point>]) -> EncodedGlyph {
    let points: Vec<(i16, i16, bool)> = contours
        .iter()
        .flatten()
        .map(|p| (p.x.round() as i16, p.y.round() as i16, p.on_curve))
        .collect();
    let Some(&(x0, y0, _)) = points.first() else {
        return EncodedGlyph {
            data: Vec::new(),
            bbox: None,
        };
    };
    let bbox = points.iter().fold([x0, y0, x0, y0], |b, &(x, y, _)| {
        [b[0].min(x), b[1].min(y), b[2].max(x), b[3].max(y)]
    });

    let mut flags = Vec::with_capacity(points.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut px, mut py) = (0i16, 0i16);
    for &(x, y, on) in &points {
        let mut flag = if on { 0x01 } else { 0 };
        flag |= encode_delta(x.wrapping_sub(px), 0x02, 0x10, &mut xs);
        flag |= encode_delta(y.wrapping_sub(py), 0x04, 0x20, &mut ys);
        flags.push(flag);
        px = x;
        py = y;
    }

    let mut t = Vec::new();
    put_i16(&mut t, contours.iter().filter(|c| !c.is_empty()).count() as i16);
    for v in bbox {
        put_i16(&mut t, v);
    }
    let mut end = 0usize;
    for contour in contours.iter().filter(|c| !c.is_empty()) {
        end += contour.len();
        put_u16(&mut t, (end - 1) as u16);
    }
    put_u16(&mut t, 0);

    let mut i = 0;
    while i < flags.len() {
        let flag = flags[i];
        let run = flags[i + 1..]
            .iter()
            .take(255)
            .take_while(|&&f| f == flag)
            .count();
        if run > 0 {
            t.push(flag | 0x08);
            t.push(run as u8);
        } else {
            t.push(flag);
        }
        i += run + 1;
    }
    t.extend_from_slice(&xs);
    t.extend_from_slice(&ys);

    EncodedGlyph {
        data: t,
        bbox: Some(bbox),
    }
}

/// Append one coordinate delta and return its flag bits
fn encode_delta(delta: i16, short: u8, same: u8, out: &mut Vec<u8>) -> u8 {
    if delta == 0 {
        same
    } else if delta.unsigned_abs() <= 255 {
        out.push(delta.unsigned_abs() as u8);
        if delta > 0 {
            short | same
        } else {
            short
        }
    } else {
        out.extend_from_slice(&delta.to_be_bytes());
        0
    }
}

fn encode_composite(components: &[ComponentSpec]) -> EncodedGlyph {
    let mut t = Vec::new();
    put_i16(&mut t, -1);
    t.extend_from_slice(&[0; 8]);

    for (i, c) in components.iter().enumerate() {
        let mut flags = 0u16;
        let mut args = Vec::new();
        match c.placement {
            ComponentPlacement::Offset(dx, dy) => {
                flags |= 0x0002;
                if i8::try_from(dx).is_ok() && i8::try_from(dy).is_ok() {
                    args.push(dx as i8 as u8);
                    args.push(dy as i8 as u8);
                } else {
                    flags |= 0x0001;
                    put_i16(&mut args, dx);
                    put_i16(&mut args, dy);
                }
            },
            ComponentPlacement::Anchor(parent, child) => {
                if parent <= 0xFF && child <= 0xFF {
                    args.push(parent as u8);
                    args.push(child as u8);
                } else {
                    flags |= 0x0001;
                    put_u16(&mut args, parent);
                    put_u16(&mut args, child);
                }
            },
        }
        match c.transform {
            ComponentTransform::Identity => {},
            ComponentTransform::Scale(s) => {
                flags |= 0x0008;
                put_i16(&mut args, f2dot14(s));
            },
            ComponentTransform::XyScale(sx, sy) => {
                flags |= 0x0040;
                put_i16(&mut args, f2dot14(sx));
                put_i16(&mut args, f2dot14(sy));
            },
            ComponentTransform::TwoByTwo(m) => {
                flags |= 0x0080;
                for v in m {
                    put_i16(&mut args, f2dot14(v));
                }
            },
        }
        if i + 1 < components.len() {
            flags |= 0x0020;
        }
        if c.use_my_metrics {
            flags |= 0x0200;
        }
        if c.scaled_offset {
            flags |= 0x0800;
        }

        put_u16(&mut t, flags);
        put_u16(&mut t, c.glyph);
        t.extend_from_slice(&args);
    }

    EncodedGlyph {
        data: t,
        bbox: None,
    }
}

fn f2dot14(v: f32) -> i16 {
    (v * 16384.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Largest power of two not above `n`, and its log2
fn search_params(n: usize) -> (u16, u16) {
    if n == 0 {
        return (0, 0);
    }
    let log = usize::BITS - 1 - n.leading_zeros();
    (1u16 << log, log as u16)
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}
