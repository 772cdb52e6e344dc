//! Outline extraction from `glyf`
//!
//! Glyphs are decoded into a flat list of points plus contour end indices
//! first. Composite glyphs append their transformed components to that
//! list, which keeps point indices meaningful for components that are
//! positioned by matching points rather than by offsets. Contours are only
//! normalised into [`Contour`]s once the whole glyph is resolved.
//!
//! Working buffers are charged to the font's host allocator before they are
//! filled and released once the outline is handed back.

use ttrast_core::{
    Allocation, Bounds, Contour, GlyphId, Host, HostMath, Outline, OutlineConfig, Point, Result,
    Transform, TtError,
};

use crate::reader::{Cursor, Reader};
use crate::tables::loca::Loca;

// Simple glyph point flags
const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

// Composite component flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;
const USE_MY_METRICS: u16 = 0x0200;
const SCALED_COMPONENT_OFFSET: u16 = 0x0800;
const UNSCALED_COMPONENT_OFFSET: u16 = 0x1000;

/// Fixed-size header at the start of every non-empty glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphHeader {
    /// Negative for composite glyphs
    pub number_of_contours: i16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

impl GlyphHeader {
    pub fn is_composite(&self) -> bool {
        self.number_of_contours < 0
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x_min: self.x_min as f32,
            y_min: self.y_min as f32,
            x_max: self.x_max as f32,
            y_max: self.y_max as f32,
        }
    }
}

/// How a component is placed inside its parent
#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    Offset(f32, f32),
    /// Parent point index, child point index
    Anchor(u16, u16),
}

#[derive(Debug, Clone, PartialEq)]
struct Component {
    glyph: GlyphId,
    flags: u16,
    placement: Placement,
    /// Linear part `[a, b, c, d]`
    matrix: [f32; 4],
}

/// Points of a glyph with inclusive contour end indices
#[derive(Debug, Default)]
struct RawGlyph {
    points: Vec<Point>,
    ends: Vec<usize>,
}

impl RawGlyph {
    fn append(&mut self, other: RawGlyph, t: &Transform) {
        let base = self.points.len();
        self.points.extend(other.points.into_iter().map(|p| t.apply(p)));
        self.ends.extend(other.ends.into_iter().map(|e| e + base));
    }

    fn into_outline(self) -> Outline {
        let mut contours = Vec::with_capacity(self.ends.len());
        let mut start = 0;
        for end in self.ends {
            if let Some(contour) = self
                .points
                .get(start..=end)
                .and_then(Contour::from_points)
            {
                contours.push(contour);
            }
            start = end + 1;
        }
        Outline::new(contours)
    }
}

/// Per-request bookkeeping while resolving composites
struct Resolve<'h> {
    root: GlyphId,
    components: u32,
    config: OutlineConfig,
    host: &'h Host,
    charges: Vec<Allocation>,
}

impl Resolve<'_> {
    /// Reserve room for `count` values of `T` until the request finishes
    fn charge_for<T>(&mut self, count: usize) -> Result<()> {
        let charge = self.host.charge_for::<T>(count)?;
        self.charges.push(charge);
        Ok(())
    }
}

/// The `glyf` table together with its `loca` index
#[derive(Debug, Clone, Copy)]
pub struct Glyf<'a> {
    data: Reader<'a>,
    loca: Loca<'a>,
    num_glyphs: u16,
}

impl<'a> Glyf<'a> {
    pub fn new(data: &'a [u8], loca: Loca<'a>, num_glyphs: u16) -> Self {
        Self {
            data: Reader::new(data),
            loca,
            num_glyphs,
        }
    }

    fn check_range(&self, glyph: GlyphId) -> Result<()> {
        if glyph >= self.num_glyphs {
            return Err(TtError::GlyphOutOfRange {
                glyph,
                count: self.num_glyphs,
            });
        }
        Ok(())
    }

    /// Raw bytes of a glyph; `None` for a glyph without outline data
    pub fn glyph_data(&self, glyph: GlyphId) -> Result<Option<Reader<'a>>> {
        self.check_range(glyph)?;
        match self.loca.glyph_range(glyph)? {
            None => Ok(None),
            Some(range) => self.data.sub(range.start, range.len()).map(Some),
        }
    }

    pub fn header(&self, glyph: GlyphId) -> Result<Option<GlyphHeader>> {
        let Some(data) = self.glyph_data(glyph)? else {
            return Ok(None);
        };
        let mut c = data.cursor(0);
        Ok(Some(GlyphHeader {
            number_of_contours: c.i16()?,
            x_min: c.i16()?,
            y_min: c.i16()?,
            x_max: c.i16()?,
            y_max: c.i16()?,
        }))
    }

    /// Decode the outline of `glyph`, resolving composites
    ///
    /// Point, flag and coordinate buffers are charged to `host` for the
    /// duration of the call; a refusal fails the decode with
    /// [`TtError::AllocationFailed`].
    pub fn outline(&self, glyph: GlyphId, config: OutlineConfig, host: &Host) -> Result<Outline> {
        self.check_range(glyph)?;
        let mut state = Resolve {
            root: glyph,
            components: 0,
            config,
            host,
            charges: Vec::new(),
        };
        let raw = self.resolve(glyph, 0, &mut state)?;
        log::debug!(
            "glyph {}: {} points in {} contours",
            glyph,
            raw.points.len(),
            raw.ends.len()
        );

        // Implied midpoints at most double the points
        state.charge_for::<Point>(raw.points.len().saturating_mul(2))?;
        state.charge_for::<Contour>(raw.ends.len())?;
        Ok(raw.into_outline())
    }

    /// Glyph whose horizontal metrics `glyph` should use
    ///
    /// A composite component flagged `USE_MY_METRICS` lends its metrics to
    /// the composite; this follows such components down the tree.
    pub fn metrics_source(&self, glyph: GlyphId, config: OutlineConfig) -> Result<GlyphId> {
        let mut current = glyph;
        for _ in 0..=config.max_composite_depth {
            let Some(data) = self.glyph_data(current)? else {
                return Ok(current);
            };
            if data.read_i16(0)? >= 0 {
                return Ok(current);
            }
            let components = self.components(current, data)?;
            match components.iter().find(|c| c.flags & USE_MY_METRICS != 0) {
                Some(c) => {
                    self.check_range(c.glyph)?;
                    current = c.glyph;
                },
                None => return Ok(current),
            }
        }
        Err(TtError::CompositeRecursionLimit {
            glyph,
            limit: config.max_composite_depth,
        })
    }

    fn resolve(&self, glyph: GlyphId, depth: u32, state: &mut Resolve<'_>) -> Result<RawGlyph> {
        let Some(data) = self.glyph_data(glyph)? else {
            return Ok(RawGlyph::default());
        };
        let number_of_contours = data.read_i16(0)?;
        if number_of_contours >= 0 {
            return decode_simple(glyph, data, number_of_contours as usize, state);
        }

        if depth >= state.config.max_composite_depth {
            return Err(TtError::CompositeRecursionLimit {
                glyph: state.root,
                limit: state.config.max_composite_depth,
            });
        }

        let mut raw = RawGlyph::default();
        for component in self.components(glyph, data)? {
            state.components += 1;
            if state.components > state.config.max_components {
                return Err(TtError::CompositeRecursionLimit {
                    glyph: state.root,
                    limit: state.config.max_components,
                });
            }
            if component.glyph >= self.num_glyphs {
                return Err(TtError::invalid_glyph(
                    glyph,
                    format!(
                        "component references glyph {} of {}",
                        component.glyph, self.num_glyphs
                    ),
                ));
            }

            let child = self.resolve(component.glyph, depth + 1, state)?;
            let transform =
                component_transform(glyph, &component, &raw, &child, state.host.math())?;
            state.charge_for::<Point>(child.points.len())?;
            state.charge_for::<usize>(child.ends.len())?;
            raw.append(child, &transform);
        }
        Ok(raw)
    }

    fn components(&self, glyph: GlyphId, data: Reader<'a>) -> Result<Vec<Component>> {
        let mut c = data.cursor(10);
        let mut out = Vec::new();
        loop {
            let flags = c.u16()?;
            let child = c.u16()?;

            let placement = match (
                flags & ARG_1_AND_2_ARE_WORDS != 0,
                flags & ARGS_ARE_XY_VALUES != 0,
            ) {
                (true, true) => Placement::Offset(c.i16()? as f32, c.i16()? as f32),
                (false, true) => Placement::Offset(c.i8()? as f32, c.i8()? as f32),
                (true, false) => Placement::Anchor(c.u16()?, c.u16()?),
                (false, false) => Placement::Anchor(c.u8()? as u16, c.u8()? as u16),
            };

            let matrix = if flags & WE_HAVE_A_SCALE != 0 {
                let s = c.f2dot14()?;
                [s, 0.0, 0.0, s]
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                let (sx, sy) = (c.f2dot14()?, c.f2dot14()?);
                [sx, 0.0, 0.0, sy]
            } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                [c.f2dot14()?, c.f2dot14()?, c.f2dot14()?, c.f2dot14()?]
            } else {
                [1.0, 0.0, 0.0, 1.0]
            };

            out.push(Component {
                glyph: child,
                flags,
                placement,
                matrix,
            });

            if flags & MORE_COMPONENTS == 0 {
                break;
            }
        }

        if out.iter().any(|c| c.flags & WE_HAVE_INSTRUCTIONS != 0) {
            log::debug!("glyph {}: skipping composite instructions", glyph);
        }
        Ok(out)
    }
}

fn component_transform(
    glyph: GlyphId,
    component: &Component,
    parent: &RawGlyph,
    child: &RawGlyph,
    math: &dyn HostMath,
) -> Result<Transform> {
    let [a, b, c, d] = component.matrix;
    let mut t = Transform {
        a,
        b,
        c,
        d,
        e: 0.0,
        f: 0.0,
    };

    match component.placement {
        Placement::Offset(dx, dy) => {
            let scaled = component.flags & SCALED_COMPONENT_OFFSET != 0
                && component.flags & UNSCALED_COMPONENT_OFFSET == 0;
            if scaled {
                t.e = dx * math.sqrt(a * a + b * b);
                t.f = dy * math.sqrt(c * c + d * d);
            } else {
                t.e = dx;
                t.f = dy;
            }
        },
        Placement::Anchor(parent_index, child_index) => {
            let anchor = parent.points.get(parent_index as usize).ok_or_else(|| {
                TtError::invalid_glyph(
                    glyph,
                    format!("anchor point {} not in parent outline", parent_index),
                )
            })?;
            let moving = child.points.get(child_index as usize).ok_or_else(|| {
                TtError::invalid_glyph(
                    glyph,
                    format!(
                        "anchor point {} not in component {}",
                        child_index, component.glyph
                    ),
                )
            })?;
            let (mx, my) = t.apply_vector(moving.x, moving.y);
            t.e = anchor.x - mx;
            t.f = anchor.y - my;
        },
    }
    Ok(t)
}

fn decode_simple(
    glyph: GlyphId,
    data: Reader<'_>,
    contours: usize,
    state: &mut Resolve<'_>,
) -> Result<RawGlyph> {
    if contours == 0 {
        return Ok(RawGlyph::default());
    }
    let mut c = data.cursor(10);

    state.charge_for::<usize>(contours)?;
    let mut ends = Vec::with_capacity(contours);
    for _ in 0..contours {
        let end = c.u16()? as usize;
        if let Some(&prev) = ends.last() {
            if end <= prev {
                return Err(TtError::invalid_glyph(
                    glyph,
                    format!("contour end points not increasing ({} after {})", end, prev),
                ));
            }
        }
        ends.push(end);
    }
    let num_points = ends.last().map_or(0, |&e| e + 1);

    let instruction_len = c.u16()? as usize;
    c.skip(instruction_len)?;

    state.charge_for::<u8>(num_points)?;
    state.charge_for::<i32>(num_points.saturating_mul(2))?;
    state.charge_for::<Point>(num_points)?;

    let flags = read_flags(glyph, &mut c, num_points)?;
    let xs = read_coordinates(&mut c, &flags, X_SHORT, X_SAME_OR_POSITIVE)?;
    let ys = read_coordinates(&mut c, &flags, Y_SHORT, Y_SAME_OR_POSITIVE)?;

    let points = flags
        .iter()
        .zip(xs.iter().zip(ys.iter()))
        .map(|(&f, (&x, &y))| Point {
            x: x as f32,
            y: y as f32,
            on_curve: f & ON_CURVE != 0,
        })
        .collect();

    Ok(RawGlyph { points, ends })
}

fn read_flags(glyph: GlyphId, c: &mut Cursor<'_>, num_points: usize) -> Result<Vec<u8>> {
    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = c.u8()?;
        flags.push(flag);
        if flag & REPEAT != 0 {
            let repeat = c.u8()? as usize;
            if flags.len() + repeat > num_points {
                return Err(TtError::invalid_glyph(
                    glyph,
                    format!(
                        "flag repeat of {} overruns {} points",
                        repeat, num_points
                    ),
                ));
            }
            flags.extend(std::iter::repeat(flag).take(repeat));
        }
    }
    Ok(flags)
}

fn read_coordinates(c: &mut Cursor<'_>, flags: &[u8], short: u8, same: u8) -> Result<Vec<i32>> {
    let mut value = 0i32;
    let mut out = Vec::with_capacity(flags.len());
    for &flag in flags {
        let delta = if flag & short != 0 {
            let d = c.u8()? as i32;
            if flag & same != 0 {
                d
            } else {
                -d
            }
        } else if flag & same != 0 {
            0
        } else {
            c.i16()? as i32
        };
        value += delta;
        out.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::LocaFormat;
    use std::sync::Arc;
    use ttrast_core::{BudgetAllocator, Segment};

    /// `glyf` + long `loca` bytes for a list of encoded glyphs
    fn tables(glyphs: &[Vec<u8>]) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = vec![0u8; 4];
        for g in glyphs {
            glyf.extend_from_slice(g);
            loca.extend_from_slice(&(glyf.len() as u32).to_be_bytes());
        }
        (glyf, loca)
    }

    fn header(contours: i16) -> Vec<u8> {
        let mut out = contours.to_be_bytes().to_vec();
        out.extend_from_slice(&[0; 8]);
        out
    }

    /// Triangle with long coordinates and no flag tricks
    fn triangle() -> Vec<u8> {
        let mut g = header(1);
        g.extend_from_slice(&2u16.to_be_bytes());
        g.extend_from_slice(&0u16.to_be_bytes());
        g.extend_from_slice(&[ON_CURVE; 3]);
        for dx in [0i16, 100, -50] {
            g.extend_from_slice(&dx.to_be_bytes());
        }
        for dy in [0i16, 0, 100] {
            g.extend_from_slice(&dy.to_be_bytes());
        }
        g
    }

    fn component(flags: u16, glyph: u16, args: &[u8]) -> Vec<u8> {
        let mut out = flags.to_be_bytes().to_vec();
        out.extend_from_slice(&glyph.to_be_bytes());
        out.extend_from_slice(args);
        out
    }

    fn decode(glyphs: &[Vec<u8>], glyph: GlyphId, config: OutlineConfig) -> Result<Outline> {
        let (glyf, loca) = tables(glyphs);
        let loca = Loca::new(&loca, LocaFormat::Long);
        Glyf::new(&glyf, loca, glyphs.len() as u16).outline(glyph, config, &Host::default())
    }

    #[test]
    fn test_simple_glyph() {
        let outline = decode(&[triangle()], 0, OutlineConfig::default()).unwrap();
        assert_eq!(outline.contours().len(), 1);
        assert_eq!(
            outline.contours()[0].points(),
            &[
                Point::on(0.0, 0.0),
                Point::on(100.0, 0.0),
                Point::on(50.0, 100.0)
            ]
        );
    }

    #[test]
    fn test_short_same_and_repeated_flags() {
        // Square from short deltas of both signs and "same" coordinates
        let mut square = header(1);
        square.extend_from_slice(&3u16.to_be_bytes());
        square.extend_from_slice(&0u16.to_be_bytes());
        square.extend_from_slice(&[
            ON_CURVE | X_SAME_OR_POSITIVE | Y_SAME_OR_POSITIVE,
            ON_CURVE | X_SHORT | X_SAME_OR_POSITIVE | Y_SAME_OR_POSITIVE,
            ON_CURVE | X_SAME_OR_POSITIVE | Y_SHORT | Y_SAME_OR_POSITIVE,
            ON_CURVE | X_SHORT | Y_SAME_OR_POSITIVE,
        ]);
        square.extend_from_slice(&[10, 10]);
        square.extend_from_slice(&[10]);

        // Three points sharing one flag byte through a repeat count
        let mut run = header(1);
        run.extend_from_slice(&2u16.to_be_bytes());
        run.extend_from_slice(&0u16.to_be_bytes());
        run.extend_from_slice(&[
            ON_CURVE | X_SHORT | X_SAME_OR_POSITIVE | Y_SAME_OR_POSITIVE | REPEAT,
            2,
        ]);
        run.extend_from_slice(&[1, 2, 3]);

        let glyphs = [square, run];
        let coords = |g: GlyphId| -> Vec<(f32, f32)> {
            decode(&glyphs, g, OutlineConfig::default()).unwrap().contours()[0]
                .points()
                .iter()
                .map(|p| (p.x, p.y))
                .collect()
        };
        assert_eq!(
            coords(0),
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
        );
        assert_eq!(coords(1), vec![(1.0, 0.0), (3.0, 0.0), (6.0, 0.0)]);
    }

    #[test]
    fn test_flag_repeat_overrun() {
        let mut g = header(1);
        g.extend_from_slice(&1u16.to_be_bytes());
        g.extend_from_slice(&0u16.to_be_bytes());
        g.extend_from_slice(&[ON_CURVE | REPEAT, 5]);
        let err = decode(&[g], 0, OutlineConfig::default()).unwrap_err();
        assert!(matches!(err, TtError::InvalidGlyphData { glyph: 0, .. }));
    }

    #[test]
    fn test_decreasing_end_points() {
        let mut g = header(2);
        g.extend_from_slice(&4u16.to_be_bytes());
        g.extend_from_slice(&4u16.to_be_bytes());
        g.extend_from_slice(&0u16.to_be_bytes());
        let err = decode(&[g], 0, OutlineConfig::default()).unwrap_err();
        assert!(matches!(err, TtError::InvalidGlyphData { .. }));
    }

    #[test]
    fn test_truncated_glyph_is_out_of_bounds() {
        let mut g = triangle();
        g.truncate(g.len() - 3);
        let err = decode(&[g], 0, OutlineConfig::default()).unwrap_err();
        assert!(matches!(err, TtError::OutOfBounds { .. }));
    }

    #[test]
    fn test_composite_offset_and_scale() {
        let mut composite = header(-1);
        let mut args = Vec::new();
        args.extend_from_slice(&200i16.to_be_bytes());
        args.extend_from_slice(&10i16.to_be_bytes());
        // 0.5 in 2.14
        args.extend_from_slice(&0x2000i16.to_be_bytes());
        composite.extend(component(
            ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE,
            0,
            &args,
        ));

        let outline = decode(&[triangle(), composite], 1, OutlineConfig::default()).unwrap();
        assert_eq!(
            outline.contours()[0].points(),
            &[
                Point::on(200.0, 10.0),
                Point::on(250.0, 10.0),
                Point::on(225.0, 60.0)
            ]
        );
    }

    #[test]
    fn test_scaled_component_offset() {
        let mut composite = header(-1);
        let mut args = vec![10u8, 4];
        args.extend_from_slice(&0x2000i16.to_be_bytes());
        composite.extend(component(
            ARGS_ARE_XY_VALUES | WE_HAVE_A_SCALE | SCALED_COMPONENT_OFFSET,
            0,
            &args,
        ));
        let outline = decode(&[triangle(), composite], 1, OutlineConfig::default()).unwrap();
        assert_eq!(outline.contours()[0].points()[0], Point::on(5.0, 2.0));
    }

    #[test]
    fn test_point_matched_components() {
        // Second triangle's point 0 lands on the first triangle's point 1
        let mut composite = header(-1);
        composite.extend(component(
            ARGS_ARE_XY_VALUES | MORE_COMPONENTS,
            0,
            &[0, 0],
        ));
        composite.extend(component(0, 0, &[1, 0]));

        let outline = decode(&[triangle(), composite], 1, OutlineConfig::default()).unwrap();
        assert_eq!(outline.contours().len(), 2);
        assert_eq!(outline.contours()[1].points()[0], Point::on(100.0, 0.0));
        assert_eq!(outline.contours()[1].points()[2], Point::on(150.0, 100.0));
    }

    #[test]
    fn test_bad_anchor_index() {
        let mut composite = header(-1);
        composite.extend(component(0, 0, &[7, 0]));
        let err = decode(&[triangle(), composite], 1, OutlineConfig::default()).unwrap_err();
        assert!(matches!(err, TtError::InvalidGlyphData { glyph: 1, .. }));
    }

    #[test]
    fn test_self_referencing_composite() {
        let mut composite = header(-1);
        composite.extend(component(ARGS_ARE_XY_VALUES, 0, &[0, 0]));
        let err = decode(&[composite], 0, OutlineConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TtError::CompositeRecursionLimit { glyph: 0, limit: 8 }
        );
    }

    #[test]
    fn test_component_ceiling() {
        // Ten references to the same triangle
        let mut composite = header(-1);
        for i in 0..10 {
            let more = if i < 9 { MORE_COMPONENTS } else { 0 };
            composite.extend(component(ARGS_ARE_XY_VALUES | more, 0, &[0, 0]));
        }
        let glyphs = [triangle(), composite];

        let ok = decode(&glyphs, 1, OutlineConfig::default()).unwrap();
        assert_eq!(ok.contours().len(), 10);

        let err = decode(&glyphs, 1, OutlineConfig::default().with_max_components(4)).unwrap_err();
        assert_eq!(err, TtError::CompositeRecursionLimit { glyph: 1, limit: 4 });
    }

    #[test]
    fn test_empty_and_out_of_range_glyphs() {
        let outline = decode(&[triangle(), Vec::new()], 1, OutlineConfig::default()).unwrap();
        assert!(outline.is_empty());

        let err = decode(&[triangle()], 1, OutlineConfig::default()).unwrap_err();
        assert_eq!(err, TtError::GlyphOutOfRange { glyph: 1, count: 1 });
    }

    #[test]
    fn test_off_curve_points_become_quads() {
        let mut g = header(1);
        g.extend_from_slice(&3u16.to_be_bytes());
        g.extend_from_slice(&0u16.to_be_bytes());
        g.extend_from_slice(&[ON_CURVE, 0, 0, ON_CURVE]);
        for dx in [0i16, 0, 100, 0] {
            g.extend_from_slice(&dx.to_be_bytes());
        }
        for dy in [0i16, 100, 0, -100] {
            g.extend_from_slice(&dy.to_be_bytes());
        }
        let outline = decode(&[g], 0, OutlineConfig::default()).unwrap();
        let segments: Vec<_> = outline.contours()[0].segments().collect();
        assert_eq!(segments.len(), 3);
        assert!(matches!(segments[0], Segment::Quad(_, _, p) if p == Point::on(50.0, 100.0)));
    }

    #[test]
    fn test_use_my_metrics() {
        let mut composite = header(-1);
        composite.extend(component(
            ARGS_ARE_XY_VALUES | USE_MY_METRICS,
            0,
            &[0, 0],
        ));
        let (glyf, loca) = tables(&[triangle(), composite]);
        let loca = Loca::new(&loca, LocaFormat::Long);
        let glyf = Glyf::new(&glyf, loca, 2);
        assert_eq!(glyf.metrics_source(1, OutlineConfig::default()).unwrap(), 0);
        assert_eq!(glyf.metrics_source(0, OutlineConfig::default()).unwrap(), 0);
        assert!(glyf.header(1).unwrap().unwrap().is_composite());
    }

    #[test]
    fn test_decode_buffers_are_charged() {
        let (glyf, loca) = tables(&[triangle(), Vec::new()]);
        let loca = Loca::new(&loca, LocaFormat::Long);
        let glyf = Glyf::new(&glyf, loca, 2);

        let refused = Arc::new(BudgetAllocator::new(0));
        let err = glyf
            .outline(0, OutlineConfig::default(), &Host::with_allocator(refused.clone()))
            .unwrap_err();
        assert!(matches!(err, TtError::AllocationFailed { .. }));
        assert_eq!(refused.in_use(), 0);

        // A glyph without outline data needs no buffers at all
        let empty = glyf
            .outline(1, OutlineConfig::default(), &Host::with_allocator(refused.clone()))
            .unwrap();
        assert!(empty.is_empty());

        let roomy = Arc::new(BudgetAllocator::new(1 << 16));
        let outline = glyf
            .outline(0, OutlineConfig::default(), &Host::with_allocator(roomy.clone()))
            .unwrap();
        assert_eq!(outline.contours().len(), 1);
        assert_eq!(roomy.in_use(), 0);
    }
}
