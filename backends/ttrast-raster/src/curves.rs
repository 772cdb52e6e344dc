//! Quadratic curve flattening
//!
//! Curves are split with de Casteljau subdivision until each piece is close
//! enough to its chord, then emitted as line endpoints. All arithmetic stays
//! on the 26.6 grid.

use crate::fixed::{F26Dot6, FixedPoint};

/// Subdivision stops here even if the tolerance is not yet met; 2^16 pieces
/// per curve is far beyond anything a glyph needs.
pub const MAX_DEPTH: u32 = 16;

/// Upper bound on how far a quadratic strays from its chord
///
/// The curve's farthest point from the chord midpoint is half the control
/// point's offset from it. The offset is measured in the Manhattan metric,
/// which overestimates the Euclidean distance and so errs towards
/// subdividing.
pub fn quadratic_deviation(p0: FixedPoint, p1: FixedPoint, p2: FixedPoint) -> F26Dot6 {
    let mid = p0.midpoint(p2);
    let dx = (p1.x.raw() as i64 - mid.x.raw() as i64).abs();
    let dy = (p1.y.raw() as i64 - mid.y.raw() as i64).abs();
    let d = (dx + dy) / 2;
    F26Dot6::from_raw(d.min(i32::MAX as i64) as i32)
}

/// Flatten the quadratic `p0 → p2` with control `p1`
///
/// `emit` receives the end point of every line piece in order; the start
/// point `p0` is never emitted, so callers chain it onto their current
/// position. The final emitted point is always exactly `p2`.
pub fn flatten_quadratic<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    tolerance: F26Dot6,
    emit: &mut F,
) where
    F: FnMut(FixedPoint),
{
    subdivide(p0, p1, p2, tolerance, emit, 0);
}

fn subdivide<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    tolerance: F26Dot6,
    emit: &mut F,
    depth: u32,
) where
    F: FnMut(FixedPoint),
{
    if depth >= MAX_DEPTH || quadratic_deviation(p0, p1, p2) <= tolerance {
        emit(p2);
        return;
    }

    let m01 = p0.midpoint(p1);
    let m12 = p1.midpoint(p2);
    let m012 = m01.midpoint(m12);

    subdivide(p0, m01, m012, tolerance, emit, depth + 1);
    subdivide(m012, m12, p2, tolerance, emit, depth + 1);
}
