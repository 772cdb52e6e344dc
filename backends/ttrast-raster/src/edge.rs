//! Edges in oversampled scanline space
//!
//! Each line piece of a flattened outline becomes an [`Edge`]. The y axis is
//! stretched by the oversampling factor, so sample row `r` is sub-scanline
//! `r` and its sample point sits at `r * 64 + 32` in 26.6 units, the centre
//! of the sub-scanline. An edge covers the sample rows whose centres lie in
//! the half-open interval `[y_start, y_end)`, which keeps shared vertices
//! from being counted twice.

use crate::fixed::{F26Dot6, FixedPoint};

const SAMPLE_OFFSET: i64 = F26Dot6::HALF.raw() as i64;
const ROW: i64 = F26Dot6::ONE.raw() as i64;

/// A non-horizontal line piece, oriented top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Crossing at the row last passed to [`Edge::update_to`]
    pub x: F26Dot6,

    /// +1 when the original segment ran downwards, -1 when it ran upwards
    pub direction: i8,

    /// First sample row crossed (inclusive)
    pub y_min: i32,

    /// Last sample row crossed (inclusive)
    pub y_max: i32,

    x_start: i64,
    y_start: i64,
    dx: i64,
    dy: i64,
}

impl Edge {
    /// Edge from `p0` to `p1`, with y already in oversampled units
    ///
    /// Returns `None` for horizontal pieces and for pieces that do not reach
    /// any sample row centre.
    pub fn new(p0: FixedPoint, p1: FixedPoint, oversample: u8) -> Option<Self> {
        let scale = oversample.max(1) as i64;
        let y0 = p0.y.raw() as i64 * scale;
        let y1 = p1.y.raw() as i64 * scale;
        if y0 == y1 {
            return None;
        }

        let (start, y_start, end, y_end, direction) = if y1 > y0 {
            (p0, y0, p1, y1, 1i8)
        } else {
            (p1, y1, p0, y0, -1i8)
        };

        let y_min = ceil_div(y_start - SAMPLE_OFFSET, ROW);
        let y_max = ceil_div(y_end - SAMPLE_OFFSET, ROW) - 1;
        if y_min > y_max {
            return None;
        }

        let mut edge = Edge {
            x: start.x,
            direction,
            y_min: clamp_row(y_min),
            y_max: clamp_row(y_max),
            x_start: start.x.raw() as i64,
            y_start,
            dx: end.x.raw() as i64 - start.x.raw() as i64,
            dy: y_end - y_start,
        };
        edge.update_to(edge.y_min);
        Some(edge)
    }

    /// Crossing with the centre of sample row `row`
    ///
    /// Evaluated from the endpoints every time, so long edges do not drift
    /// the way an incremental slope would.
    #[inline]
    pub fn x_at(&self, row: i32) -> F26Dot6 {
        // dy spans up to 2^36 once oversampled, so the product needs i128
        let sample_y = row as i128 * ROW as i128 + SAMPLE_OFFSET as i128;
        let offset =
            ((sample_y - self.y_start as i128) * self.dx as i128).div_euclid(self.dy as i128);
        let x = self.x_start as i128 + offset;
        F26Dot6::from_raw(x.clamp(i32::MIN as i128, i32::MAX as i128) as i32)
    }

    #[inline]
    pub fn update_to(&mut self, row: i32) {
        self.x = self.x_at(row);
    }

    #[inline]
    pub fn is_active(&self, row: i32) -> bool {
        row <= self.y_max
    }
}

/// Smallest integer `q` with `q * d >= n`, for positive `d`
#[inline]
fn ceil_div(n: i64, d: i64) -> i64 {
    -(-n).div_euclid(d)
}

#[inline]
fn clamp_row(row: i64) -> i32 {
    row.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// A growable set of edges
///
/// Serves both as the global edge table, sorted by first row, and as the
/// active edge table, re-sorted by crossing on every sample row.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Room for exactly `additional` more edges without reallocating
    pub fn reserve_exact(&mut self, additional: usize) {
        self.edges.reserve_exact(additional);
    }

    pub fn sort_by_x(&mut self) {
        self.edges.sort_by(|a, b| a.x.cmp(&b.x));
    }

    /// Order by first sample row, ties by crossing
    pub fn sort_by_y_min(&mut self) {
        self.edges
            .sort_by(|a, b| a.y_min.cmp(&b.y_min).then(a.x.cmp(&b.x)));
    }

    /// Drop edges that end above `row`
    pub fn remove_inactive(&mut self, row: i32) {
        self.edges.retain(|edge| edge.is_active(row));
    }

    /// Move every edge's crossing to `row`
    pub fn update_all(&mut self, row: i32) {
        for edge in &mut self.edges {
            edge.update_to(row);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }
}
