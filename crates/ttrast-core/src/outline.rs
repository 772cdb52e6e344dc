//! Glyph outlines: closed contours of lines and quadratic curves
//!
//! TrueType stores contours as runs of on-curve and off-curve points, where
//! two consecutive off-curve points imply an on-curve point halfway between
//! them. [`Contour::from_points`] makes those implied points explicit, so
//! every contour handed to the rasterizer starts on the curve and alternates
//! cleanly between [`Segment::Line`] and [`Segment::Quad`].

use crate::error::{Result, TtError};
use crate::types::GlyphId;

/// One outline point in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub on_curve: bool,
}

impl Point {
    pub const fn on(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            on_curve: true,
        }
    }

    pub const fn off(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            on_curve: false,
        }
    }

    /// On-curve point halfway to `other`
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::on((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// 2x3 affine transform applied to composite glyph components
///
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn translate(e: f32, f: f32) -> Self {
        Transform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e,
            f,
        }
    }

    /// Linear part only
    #[inline]
    pub fn apply_vector(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.c * y, self.b * x + self.d * y)
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        let (x, y) = self.apply_vector(p.x, p.y);
        Point {
            x: x + self.e,
            y: y + self.f,
            on_curve: p.on_curve,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned box in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Bounds {
    fn of_point(p: &Point) -> Self {
        Self {
            x_min: p.x,
            y_min: p.y,
            x_max: p.x,
            y_max: p.y,
        }
    }

    fn include(&mut self, p: &Point) {
        self.x_min = self.x_min.min(p.x);
        self.y_min = self.y_min.min(p.y);
        self.x_max = self.x_max.max(p.x);
        self.y_max = self.y_max.max(p.y);
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// A piece of a contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Point, Point),
    /// Start, control, end
    Quad(Point, Point, Point),
}

/// Closed sequence of points that starts on the curve
///
/// Never holds two consecutive off-curve points, so every off-curve point
/// sits between two on-curve neighbours (wrapping around at the end).
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// Normalise raw TrueType points into a contour
    ///
    /// Inserts the implied on-curve midpoint between every pair of
    /// consecutive off-curve points and rotates the sequence so it begins
    /// on the curve. A contour made only of off-curve points starts at the
    /// midpoint of its last and first points. Returns `None` for an empty
    /// slice.
    pub fn from_points(raw: &[Point]) -> Option<Contour> {
        let n = raw.len();
        let first_on = raw.iter().position(|p| p.on_curve);

        let (start, rest): (Point, Box<dyn Iterator<Item = &Point>>) = match first_on {
            Some(i) => (raw[i], Box::new(raw[i + 1..].iter().chain(raw[..i].iter()))),
            None => {
                let last = raw.last()?;
                (last.midpoint(&raw[0]), Box::new(raw.iter()))
            },
        };

        let mut points = Vec::with_capacity(n + n / 2 + 1);
        points.push(start);

        for p in rest {
            if let Some(prev) = points.last() {
                if !prev.on_curve && !p.on_curve {
                    let mid = prev.midpoint(p);
                    points.push(mid);
                }
            }
            points.push(*p);
        }

        Some(Contour { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lines and quadratic curves, closing back to the first point
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            points: &self.points,
            index: 0,
        }
    }

    pub fn transform(&self, t: &Transform) -> Contour {
        Contour {
            points: self.points.iter().map(|p| t.apply(*p)).collect(),
        }
    }
}

/// Iterator over the segments of a [`Contour`]
#[derive(Debug, Clone)]
pub struct Segments<'c> {
    points: &'c [Point],
    index: usize,
}

impl<'c> Iterator for Segments<'c> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let n = self.points.len();
        if n < 2 || self.index >= n {
            return None;
        }

        let start = self.points[self.index];
        let next = self.points[(self.index + 1) % n];
        if next.on_curve {
            self.index += 1;
            Some(Segment::Line(start, next))
        } else {
            let end = self.points[(self.index + 2) % n];
            self.index += 2;
            Some(Segment::Quad(start, next, end))
        }
    }
}

/// All contours of one glyph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    contours: Vec<Contour>,
    bounds: Option<Bounds>,
}

impl Outline {
    pub fn new(contours: Vec<Contour>) -> Self {
        let bounds = contours
            .iter()
            .flat_map(|c| c.points.iter())
            .fold(None::<Bounds>, |acc, p| match acc {
                None => Some(Bounds::of_point(p)),
                Some(mut b) => {
                    b.include(p);
                    Some(b)
                },
            });
        Self { contours, bounds }
    }

    /// Outline of a glyph without contours, such as a space
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Box around every point, control points included
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    pub fn transform(&self, t: &Transform) -> Outline {
        Outline::new(self.contours.iter().map(|c| c.transform(t)).collect())
    }

    /// Fail with [`TtError::DegenerateGlyph`] when nothing would be drawn
    ///
    /// Rasterization itself accepts empty outlines; this is for callers
    /// that need ink, for example to report a glyph that unexpectedly
    /// decoded to nothing.
    pub fn ensure_drawable(&self, glyph: GlyphId) -> Result<&Self> {
        if self.is_empty() {
            Err(TtError::DegenerateGlyph(glyph))
        } else {
            Ok(self)
        }
    }
}
