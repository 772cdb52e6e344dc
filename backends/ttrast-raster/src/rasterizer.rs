//! Outlines to coverage bitmaps
//!
//! [`Rasterizer`] is the font-agnostic entry point: give it an outline in
//! font units, a [`Placement`] into pixel space and a bitmap size. The
//! [`GlyphRasterizer`] on top of it works in glyph ids and characters,
//! sizing and positioning each bitmap from the glyph's own bounds.

use log::{debug, warn};
use ttrast_core::{
    BitmapBox, Bounds, CoverageBitmap, GlyphId, Host, Outline, RasterConfig, Result, Segment,
    TtError,
};
use ttrast_sfnt::Font;

use crate::edge::Edge;
use crate::fixed::{F26Dot6, FixedPoint};
use crate::scan_converter::ScanConverter;
use crate::FillRule;

/// Font units to bitmap pixels
///
/// `px = x * scale_x + shift_x` and `py = -y * scale_y + shift_y`: font y
/// grows upwards, bitmap rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale_x: f32,
    pub scale_y: f32,
    pub shift_x: f32,
    pub shift_y: f32,
}

impl Placement {
    pub fn uniform(scale: f32) -> Self {
        Self::new(scale, scale)
    }

    pub fn new(scale_x: f32, scale_y: f32) -> Self {
        Self {
            scale_x,
            scale_y,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }

    pub fn with_shift(mut self, shift_x: f32, shift_y: f32) -> Self {
        self.shift_x = shift_x;
        self.shift_y = shift_y;
        self
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale_x + self.shift_x,
            -y * self.scale_y + self.shift_y,
        )
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// Scan conversion with a fixed configuration and host
#[derive(Debug, Clone)]
pub struct Rasterizer {
    host: Host,
    config: RasterConfig,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Result<Self> {
        Self::with_host(Host::default(), config)
    }

    pub fn with_host(host: Host, config: RasterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { host, config })
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Rasterize `outline` into a `width x height` coverage bitmap
    ///
    /// An outline without contours gives an all-zero bitmap, and a zero
    /// width or height gives an empty one; neither is an error.
    ///
    /// The output buffer, the coverage accumulator and the edge tables are
    /// charged to the host allocator. Edge storage is charged before it
    /// grows. Every charge is released when the call returns, including the
    /// output's: the returned bitmap belongs to the caller from then on.
    pub fn rasterize(
        &self,
        outline: &Outline,
        placement: &Placement,
        width: u32,
        height: u32,
        fill_rule: FillRule,
    ) -> Result<CoverageBitmap> {
        let max = self.config.max_bitmap_dim;
        if width > max || height > max {
            return Err(TtError::BitmapTooLarge { width, height, max });
        }

        let _output = self
            .host
            .charge_for::<f32>(width as usize * height as usize)?;
        if outline.is_empty() || width == 0 || height == 0 {
            return Ok(CoverageBitmap::zeroed(width, height));
        }
        let _accumulator = self.host.charge_for::<u32>(width as usize)?;

        let math = self.host.math();
        let tolerance = F26Dot6::from_f32(self.config.flatness, self.config.rounding, math)
            .max(F26Dot6::from_raw(1));
        let mut converter = ScanConverter::new(width, height, self.config.oversample, tolerance)
            .with_host(self.host.clone());
        converter.set_fill_rule(fill_rule);
        self.trace(outline, placement, &mut converter)?;

        // The active table never outgrows the global one
        let edges = converter.edge_count();
        let _active_table = self.host.charge_for::<Edge>(edges)?;
        debug!(
            "rasterizing {}x{} with {} edges, oversample {}, {}",
            width, height, edges, self.config.oversample, fill_rule
        );

        let gamma = self.config.gamma;
        CoverageBitmap::from_fill(width, height, |data| {
            converter.render(data, math, gamma)
        })
    }

    /// Feed every contour of `outline` to the converter in pixel space
    fn trace(
        &self,
        outline: &Outline,
        placement: &Placement,
        converter: &mut ScanConverter,
    ) -> Result<()> {
        let math = self.host.math();
        let rounding = self.config.rounding;
        let snap = |p: ttrast_core::Point| {
            let (x, y) = placement.apply(p.x, p.y);
            FixedPoint::new(
                F26Dot6::from_f32(x, rounding, math),
                F26Dot6::from_f32(y, rounding, math),
            )
        };

        for contour in outline.contours() {
            let mut started = false;
            for segment in contour.segments() {
                let (start, end) = match segment {
                    Segment::Line(p0, p1) => (p0, p1),
                    Segment::Quad(p0, _, p1) => (p0, p1),
                };
                if !started {
                    converter.move_to(snap(start))?;
                    started = true;
                }
                match segment {
                    Segment::Line(..) => converter.line_to(snap(end))?,
                    Segment::Quad(_, c, _) => converter.quadratic_to(snap(c), snap(end))?,
                }
            }
            converter.close()?;
        }
        Ok(())
    }

    /// Pixel box covering `bounds` under `placement`, in y-down space
    pub fn bitmap_box(&self, bounds: &Bounds, placement: &Placement) -> BitmapBox {
        let math = self.host.math();
        let (x0, y0) = placement.apply(bounds.x_min, bounds.y_max);
        let (x1, y1) = placement.apply(bounds.x_max, bounds.y_min);
        BitmapBox {
            x0: math.floor(x0.min(x1)) as i32,
            y0: math.floor(y0.min(y1)) as i32,
            x1: math.ceil(x0.max(x1)) as i32,
            y1: math.ceil(y0.max(y1)) as i32,
        }
    }
}

/// A rendered glyph and where it sits relative to the pen position
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub glyph: GlyphId,
    pub coverage: CoverageBitmap,
    /// Pixels from the origin to the bitmap's left column
    pub left: i32,
    /// Pixels from the baseline up to the bitmap's top row
    pub top: i32,
}

impl GlyphBitmap {
    pub fn empty(glyph: GlyphId) -> Self {
        Self {
            glyph,
            coverage: CoverageBitmap::zeroed(0, 0),
            left: 0,
            top: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.coverage.width()
    }

    pub fn height(&self) -> u32 {
        self.coverage.height()
    }
}

/// Glyph-level rendering for one font at one size
///
/// ```rust
/// use ttrast_core::Point;
/// use ttrast_raster::GlyphRasterizer;
/// use ttrast_sfnt::builder::{FontBuilder, GlyphSpec};
/// use ttrast_sfnt::Font;
///
/// let square = vec![
///     Point::on(0.0, 0.0),
///     Point::on(0.0, 500.0),
///     Point::on(500.0, 500.0),
///     Point::on(500.0, 0.0),
/// ];
/// let data = FontBuilder::new(1000)
///     .vertical_metrics(1000, 0, 0)
///     .glyph(GlyphSpec::Empty { advance: 500 })
///     .glyph(GlyphSpec::simple(vec![square], 600))
///     .map_char('x', 1)
///     .build();
/// let font = Font::new(&data).unwrap();
///
/// let raster = GlyphRasterizer::new(&font, 20.0).unwrap();
/// let bitmap = raster.render_char('x').unwrap();
/// assert_eq!((bitmap.width(), bitmap.height()), (10, 10));
/// assert_eq!(bitmap.top, 10);
/// ```
#[derive(Debug, Clone)]
pub struct GlyphRasterizer<'f, 'a> {
    font: &'f Font<'a>,
    rasterizer: Rasterizer,
    scale: f32,
    fill_rule: FillRule,
}

impl<'f, 'a> GlyphRasterizer<'f, 'a> {
    /// Size glyphs so the font's ascent-to-descent span is `pixel_height`
    pub fn new(font: &'f Font<'a>, pixel_height: f32) -> Result<Self> {
        let scale = font.scale_for_pixel_height(pixel_height);
        Self::with_scale(font, scale)
    }

    /// Size glyphs so one em is `pixels` wide
    pub fn with_em_size(font: &'f Font<'a>, pixels: f32) -> Result<Self> {
        let scale = font.scale_for_em_to_pixels(pixels);
        Self::with_scale(font, scale)
    }

    fn with_scale(font: &'f Font<'a>, scale: f32) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(TtError::config(format!("invalid scale factor {}", scale)));
        }
        Ok(Self {
            font,
            rasterizer: Rasterizer::with_host(font.host().clone(), RasterConfig::default())?,
            scale,
            fill_rule: FillRule::default(),
        })
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    pub fn with_config(mut self, config: RasterConfig) -> Result<Self> {
        self.rasterizer = Rasterizer::with_host(self.font.host().clone(), config)?;
        Ok(self)
    }

    pub fn font(&self) -> &'f Font<'a> {
        self.font
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Pixel box of `glyph` relative to its origin; `None` when it draws nothing
    ///
    /// Measured from the decoded outline, so composite glyphs with a stale
    /// header box are still sized correctly.
    pub fn bitmap_box(&self, glyph: GlyphId) -> Result<Option<BitmapBox>> {
        let outline = self.font.outline(glyph)?;
        Ok(self.box_of(&outline))
    }

    fn box_of(&self, outline: &Outline) -> Option<BitmapBox> {
        let bounds = outline.bounds()?;
        let bbox = self
            .rasterizer
            .bitmap_box(&bounds, &Placement::uniform(self.scale));
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Decode and rasterize `glyph`
    pub fn render_glyph(&self, glyph: GlyphId) -> Result<GlyphBitmap> {
        let outline = self.font.outline(glyph)?;
        self.render_outline(glyph, &outline)
    }

    fn render_outline(&self, glyph: GlyphId, outline: &Outline) -> Result<GlyphBitmap> {
        let Some(bbox) = self.box_of(outline) else {
            return Ok(GlyphBitmap::empty(glyph));
        };

        let placement =
            Placement::uniform(self.scale).with_shift(-bbox.x0 as f32, -bbox.y0 as f32);
        let coverage = self.rasterizer.rasterize(
            outline,
            &placement,
            bbox.width(),
            bbox.height(),
            self.fill_rule,
        )?;

        Ok(GlyphBitmap {
            glyph,
            coverage,
            left: bbox.x0,
            top: -bbox.y0,
        })
    }

    /// Render the glyph `ch` maps to; unmapped characters draw glyph 0
    pub fn render_char(&self, ch: char) -> Result<GlyphBitmap> {
        let glyph = self.font.glyph_index(ch)?.unwrap_or(0);
        self.render_glyph(glyph)
    }

    /// Like [`render_glyph`](Self::render_glyph), but a glyph whose own data
    /// is unusable renders as an empty bitmap instead of failing
    ///
    /// That covers truncated glyph bytes as well as malformed ones: the
    /// tables were range-checked when the font was opened, so a short read
    /// while decoding concerns this glyph alone. Errors that concern the
    /// whole call, such as allocation refusals or oversized bitmaps, are
    /// still returned.
    pub fn render_glyph_or_empty(&self, glyph: GlyphId) -> Result<GlyphBitmap> {
        let outline = match self.font.outline(glyph) {
            Ok(outline) => outline,
            Err(err) if err.is_glyph_data_error() => {
                warn!("glyph {} rendered empty: {}", glyph, err);
                return Ok(GlyphBitmap::empty(glyph));
            },
            Err(err) => return Err(err),
        };
        match self.render_outline(glyph, &outline) {
            Err(err) if err.is_glyph_recoverable() => {
                warn!("glyph {} rendered empty: {}", glyph, err);
                Ok(GlyphBitmap::empty(glyph))
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ttrast_core::{BudgetAllocator, Contour, Point};
    use ttrast_sfnt::builder::{FontBuilder, GlyphSpec};
    use ttrast_sfnt::FontOptions;

    fn square_outline(x: f32, y: f32, size: f32) -> Outline {
        let points = [
            Point::on(x, y),
            Point::on(x, y + size),
            Point::on(x + size, y + size),
            Point::on(x + size, y),
        ];
        Outline::new(Contour::from_points(&points).into_iter().collect())
    }

    #[test]
    fn test_placement_flips_y() {
        let p = Placement::uniform(2.0).with_shift(1.0, 10.0);
        assert_eq!(p.apply(3.0, 4.0), (7.0, 2.0));
    }

    #[test]
    fn test_bitmap_box_rounds_outwards() {
        let raster = Rasterizer::new(RasterConfig::default()).unwrap();
        let bounds = Bounds {
            x_min: -0.5,
            y_min: -1.25,
            x_max: 3.2,
            y_max: 7.9,
        };
        let bbox = raster.bitmap_box(&bounds, &Placement::uniform(1.0));
        assert_eq!(
            bbox,
            BitmapBox {
                x0: -1,
                y0: -8,
                x1: 4,
                y1: 2
            }
        );
    }

    #[test]
    fn test_unit_square_fills_bitmap() {
        let raster = Rasterizer::new(RasterConfig::default()).unwrap();
        let outline = square_outline(0.0, 0.0, 1.0);
        let placement = Placement::uniform(4.0).with_shift(0.0, 4.0);
        let bitmap = raster
            .rasterize(&outline, &placement, 4, 4, FillRule::NonZeroWinding)
            .unwrap();
        assert!(bitmap.data().iter().all(|&c| c == 1.0));
    }

    #[test]
    fn test_zero_sized_bitmap_is_valid() {
        let raster = Rasterizer::new(RasterConfig::default()).unwrap();
        let outline = square_outline(0.0, 0.0, 1.0);
        let bitmap = raster
            .rasterize(&outline, &Placement::default(), 0, 3, FillRule::EvenOdd)
            .unwrap();
        assert!(bitmap.is_empty());
        assert_eq!(bitmap.height(), 3);
    }

    #[test]
    fn test_too_large_is_rejected() {
        let config = RasterConfig::default().with_max_bitmap_dim(64);
        let raster = Rasterizer::new(config).unwrap();
        let err = raster
            .rasterize(&Outline::empty(), &Placement::default(), 65, 1, FillRule::default())
            .unwrap_err();
        assert_eq!(
            err,
            TtError::BitmapTooLarge {
                width: 65,
                height: 1,
                max: 64
            }
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(Rasterizer::new(RasterConfig::default().with_oversample(0)).is_err());
    }

    #[test]
    fn test_allocator_is_released_after_rasterizing() {
        let budget = Arc::new(BudgetAllocator::new(1 << 20));
        let host = Host::with_allocator(budget.clone());
        let raster = Rasterizer::with_host(host, RasterConfig::default()).unwrap();
        raster
            .rasterize(
                &square_outline(0.0, 0.0, 8.0),
                &Placement::default().with_shift(0.0, 8.0),
                8,
                8,
                FillRule::default(),
            )
            .unwrap();
        assert_eq!(budget.in_use(), 0);
    }

    fn test_font() -> Vec<u8> {
        let square = vec![
            Point::on(0.0, 0.0),
            Point::on(0.0, 500.0),
            Point::on(500.0, 500.0),
            Point::on(500.0, 0.0),
        ];
        let offset_square = vec![
            Point::on(-100.0, 0.0),
            Point::on(-100.0, 500.0),
            Point::on(400.0, 500.0),
            Point::on(400.0, 0.0),
        ];
        FontBuilder::new(1000)
            .vertical_metrics(800, -200, 0)
            .glyph(GlyphSpec::Empty { advance: 500 })
            .glyph(GlyphSpec::simple(vec![square], 600))
            .glyph(GlyphSpec::Empty { advance: 250 })
            .glyph(GlyphSpec::Raw {
                data: vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0x09, 10],
                advance: 100,
            })
            // One contour announced, nothing after the header
            .glyph(GlyphSpec::Raw {
                data: vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
                advance: 100,
            })
            .glyph(GlyphSpec::simple(vec![offset_square], 600))
            .map_char('s', 1)
            .map_char(' ', 2)
            .build()
    }

    #[test]
    fn test_glyph_placement() {
        let data = test_font();
        let font = Font::new(&data).unwrap();
        // 1000 units of ascent-descent onto 20 px: 1/50 px per unit
        let raster = GlyphRasterizer::new(&font, 20.0).unwrap();
        let bitmap = raster.render_glyph(1).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (10, 10));
        assert_eq!((bitmap.left, bitmap.top), (0, 10));
        assert!((bitmap.coverage.coverage_sum() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_space_renders_empty() {
        let data = test_font();
        let font = Font::new(&data).unwrap();
        let raster = GlyphRasterizer::new(&font, 20.0).unwrap();
        let bitmap = raster.render_char(' ').unwrap();
        assert_eq!(bitmap, GlyphBitmap::empty(2));
        assert_eq!(raster.bitmap_box(2).unwrap(), None);
    }

    #[test]
    fn test_broken_glyph_surfaces_or_renders_empty() {
        let data = test_font();
        let font = Font::new(&data).unwrap();
        let raster = GlyphRasterizer::new(&font, 20.0).unwrap();
        assert!(matches!(
            raster.render_glyph(3),
            Err(TtError::InvalidGlyphData { glyph: 3, .. })
        ));
        assert_eq!(raster.render_glyph_or_empty(3).unwrap(), GlyphBitmap::empty(3));
        assert!(raster.render_glyph_or_empty(1).unwrap().width() > 0);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let data = test_font();
        let font = Font::new(&data).unwrap();
        assert!(GlyphRasterizer::new(&font, 0.0).is_err());
        assert!(GlyphRasterizer::with_em_size(&font, f32::NAN).is_err());
    }

    #[test]
    fn test_truncated_glyph_renders_empty() {
        let data = test_font();
        let font = Font::new(&data).unwrap();
        let raster = GlyphRasterizer::new(&font, 20.0).unwrap();
        assert!(matches!(
            raster.render_glyph(4),
            Err(TtError::OutOfBounds { .. })
        ));
        assert_eq!(raster.render_glyph_or_empty(4).unwrap(), GlyphBitmap::empty(4));
    }

    #[test]
    fn test_allocation_refusal_is_not_swallowed() {
        let data = test_font();
        let budget = Arc::new(BudgetAllocator::new(0));
        let options = FontOptions {
            host: Host::with_allocator(budget.clone()),
            ..FontOptions::default()
        };
        let font = Font::with_options(&data, options).unwrap();
        let raster = GlyphRasterizer::new(&font, 20.0).unwrap();
        assert!(matches!(
            raster.render_glyph_or_empty(1),
            Err(TtError::AllocationFailed { .. })
        ));
        assert_eq!(budget.in_use(), 0);
    }

    #[test]
    fn test_enormous_scale_is_too_large_not_a_panic() {
        let data = test_font();
        let font = Font::new(&data).unwrap();
        let raster = GlyphRasterizer::with_em_size(&font, 1e11).unwrap();
        assert!(matches!(
            raster.render_glyph(5),
            Err(TtError::BitmapTooLarge { .. })
        ));
    }
}
