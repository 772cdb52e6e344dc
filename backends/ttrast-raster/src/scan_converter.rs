// this_file: backends/ttrast-raster/src/scan_converter.rs

//! Scan converter for turning flattened outlines into coverage.
//!
//! Paths arrive in pixel space (y down, 26.6 fixed point) through the
//! `move_to` / `line_to` / `quadratic_to` / `close` calls. Each line piece
//! becomes an [`Edge`]; rendering then walks the sub-scanlines top to bottom
//! with an active edge table and accumulates exact horizontal coverage.
//!
//! The edge table grows in chunks, and each chunk is charged to the host
//! allocator before the table is resized.

use ttrast_core::{Allocation, Host, HostMath, Result};

use crate::curves::flatten_quadratic;
use crate::edge::{Edge, EdgeList};
use crate::fixed::{F26Dot6, FixedPoint};
use crate::FillRule;

const PIXEL: i64 = F26Dot6::ONE.raw() as i64;

/// Edges reserved by the first charge; later charges double the table
const FIRST_EDGE_CHUNK: usize = 8;

/// Edge builder and renderer for one bitmap
#[derive(Debug)]
pub struct ScanConverter {
    /// Every edge of the path, in oversampled row space
    edges: EdgeList,

    /// Current pen position
    current: FixedPoint,

    /// Start of the open contour, if any
    contour_start: Option<FixedPoint>,

    fill_rule: FillRule,

    /// Sub-scanlines per pixel row
    oversample: u8,

    /// Maximum deviation of a flattened curve from the true curve
    tolerance: F26Dot6,

    width: u32,
    height: u32,

    host: Host,
    /// Reservations backing the edge table's capacity
    charges: Vec<Allocation>,
    reserved: usize,
}

impl ScanConverter {
    pub fn new(width: u32, height: u32, oversample: u8, tolerance: F26Dot6) -> Self {
        Self {
            edges: EdgeList::new(),
            current: FixedPoint::default(),
            contour_start: None,
            fill_rule: FillRule::default(),
            oversample: oversample.max(1),
            tolerance,
            width,
            height,
            host: Host::default(),
            charges: Vec::new(),
            reserved: 0,
        }
    }

    /// Charge edge storage to `host` instead of the default system allocator
    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Start a new contour, closing the previous one
    pub fn move_to(&mut self, p: FixedPoint) -> Result<()> {
        self.close()?;
        self.current = p;
        self.contour_start = Some(p);
        Ok(())
    }

    pub fn line_to(&mut self, p: FixedPoint) -> Result<()> {
        if let Some(edge) = Edge::new(self.current, p, self.oversample) {
            self.reserve_edge()?;
            self.edges.push(edge);
        }
        self.current = p;
        Ok(())
    }

    pub fn quadratic_to(&mut self, control: FixedPoint, p: FixedPoint) -> Result<()> {
        let start = self.current;
        let tolerance = self.tolerance;
        let mut result = Ok(());
        flatten_quadratic(start, control, p, tolerance, &mut |q| {
            if result.is_ok() {
                result = self.line_to(q);
            }
        });
        result
    }

    /// Connect back to the contour start
    pub fn close(&mut self) -> Result<()> {
        if let Some(start) = self.contour_start.take() {
            if self.current != start {
                self.line_to(start)?;
            }
        }
        Ok(())
    }

    /// Make room for one more edge, charging the host when the table grows
    fn reserve_edge(&mut self) -> Result<()> {
        if self.edges.len() < self.reserved {
            return Ok(());
        }
        let chunk = self.reserved.max(FIRST_EDGE_CHUNK);
        self.charges.push(self.host.charge_for::<Edge>(chunk)?);
        self.reserved += chunk;
        self.edges.reserve_exact(self.reserved - self.edges.len());
        Ok(())
    }

    /// Number of edges built so far
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Accumulate coverage into `out`, a row-major `width * height` buffer
    ///
    /// Each sub-scanline adds the exact covered length of every pixel it
    /// crosses, in 1/64 pixel steps; a pixel row is divided by
    /// `64 * oversample` when its last sub-scanline is done. Coverage is
    /// clamped to `0.0..=1.0` and then raised to `1 / gamma`.
    /// Any contour still open is closed first, which can fail only when the
    /// host refuses the closing edge.
    pub fn render(&mut self, out: &mut [f32], math: &dyn HostMath, gamma: f32) -> Result<()> {
        self.close()?;
        if self.edges.is_empty() || self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let ov = self.oversample as i64;
        let width = self.width as usize;
        let total_rows = self.height as i64 * ov;

        self.edges.sort_by_y_min();
        let edges = self.edges.as_slice();

        let first_row = edges.iter().map(|e| e.y_min as i64).min().unwrap_or(0);
        let last_row = edges.iter().map(|e| e.y_max as i64).max().unwrap_or(-1);
        let row_start = first_row.max(0);
        let row_end = (last_row + 1).min(total_rows);
        if row_start >= row_end {
            return Ok(());
        }

        let py_start = row_start / ov;
        let py_end = (row_end + ov - 1) / ov;

        let mut acc = vec![0u32; width];
        let mut active = EdgeList::with_capacity(32);
        let mut next = 0usize;
        let scale = 1.0 / (PIXEL * ov) as f32;
        let inv_gamma = 1.0 / gamma;

        for py in py_start..py_end {
            for sub in 0..ov {
                let row = (py * ov + sub) as i32;

                while next < edges.len() && edges[next].y_min <= row {
                    if edges[next].y_max >= row {
                        active.push(edges[next]);
                    }
                    next += 1;
                }
                active.remove_inactive(row);
                if active.is_empty() {
                    continue;
                }
                active.update_all(row);
                active.sort_by_x();
                self.fill_spans(active.as_slice(), &mut acc);
            }

            let start = py as usize * width;
            let Some(dst) = out.get_mut(start..start + width) else {
                break;
            };
            for (d, a) in dst.iter_mut().zip(acc.iter_mut()) {
                let mut c = (*a as f32 * scale).clamp(0.0, 1.0);
                if gamma != 1.0 && c > 0.0 {
                    c = math.pow(c, inv_gamma).clamp(0.0, 1.0);
                }
                *d = c;
                *a = 0;
            }
        }
        Ok(())
    }

    /// Walk one sub-scanline's crossings and add its inside spans
    fn fill_spans(&self, active: &[Edge], acc: &mut [u32]) {
        let mut winding = 0i32;
        for pair in active.windows(2) {
            winding += pair[0].direction as i32;
            let inside = match self.fill_rule {
                FillRule::NonZeroWinding => winding != 0,
                FillRule::EvenOdd => winding & 1 != 0,
            };
            if inside {
                add_span(acc, pair[0].x.raw() as i64, pair[1].x.raw() as i64);
            }
        }
    }
}

/// Add the covered length of `[x0, x1)` to every pixel it touches
fn add_span(acc: &mut [u32], x0: i64, x1: i64) {
    let limit = acc.len() as i64 * PIXEL;
    let x0 = x0.clamp(0, limit);
    let x1 = x1.clamp(0, limit);
    if x1 <= x0 {
        return;
    }

    let first = (x0 / PIXEL) as usize;
    let last = (x1 / PIXEL) as usize;
    if first == last {
        acc[first] += (x1 - x0) as u32;
        return;
    }

    acc[first] += (PIXEL - x0 % PIXEL) as u32;
    for a in &mut acc[first + 1..last] {
        *a += PIXEL as u32;
    }
    if let Some(a) = acc.get_mut(last) {
        *a += (x1 % PIXEL) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ttrast_core::{BudgetAllocator, StdMath, TtError};

    fn px(x: i32, y: i32) -> FixedPoint {
        FixedPoint::from_raw(x * 64, y * 64)
    }

    fn rect(conv: &mut ScanConverter, x0: i32, y0: i32, x1: i32, y1: i32) {
        conv.move_to(px(x0, y0)).unwrap();
        conv.line_to(px(x1, y0)).unwrap();
        conv.line_to(px(x1, y1)).unwrap();
        conv.line_to(px(x0, y1)).unwrap();
        conv.close().unwrap();
    }

    fn render(conv: &mut ScanConverter) -> Vec<f32> {
        let mut out = vec![0.0; (conv.width * conv.height) as usize];
        conv.render(&mut out, &StdMath, 1.0).unwrap();
        out
    }

    #[test]
    fn test_add_span_fractional_ends() {
        let mut acc = vec![0u32; 4];
        add_span(&mut acc, 32, 3 * 64 + 16);
        assert_eq!(acc, vec![32, 64, 64, 16]);
    }

    #[test]
    fn test_add_span_clips_to_row() {
        let mut acc = vec![0u32; 2];
        add_span(&mut acc, -500, 500);
        assert_eq!(acc, vec![64, 64]);
        add_span(&mut acc, 10, 10);
        assert_eq!(acc, vec![64, 64]);
    }

    #[test]
    fn test_pixel_aligned_rectangle() {
        let mut conv = ScanConverter::new(4, 4, 4, F26Dot6::from_raw(4));
        rect(&mut conv, 1, 1, 3, 3);
        let out = render(&mut conv);
        #[rustfmt::skip]
        let expected = vec![
            0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 1.0, 0.0,
            0.0, 1.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_half_pixel_edge_gives_half_coverage() {
        let mut conv = ScanConverter::new(2, 1, 4, F26Dot6::from_raw(4));
        conv.move_to(FixedPoint::from_raw(32, 0)).unwrap();
        conv.line_to(FixedPoint::from_raw(128, 0)).unwrap();
        conv.line_to(FixedPoint::from_raw(128, 64)).unwrap();
        conv.line_to(FixedPoint::from_raw(32, 64)).unwrap();
        let out = render(&mut conv);
        assert_eq!(out, vec![0.5, 1.0]);
    }

    #[test]
    fn test_winding_direction_does_not_matter_for_single_contour() {
        let mut cw = ScanConverter::new(4, 4, 2, F26Dot6::from_raw(4));
        rect(&mut cw, 0, 0, 4, 4);
        let mut ccw = ScanConverter::new(4, 4, 2, F26Dot6::from_raw(4));
        ccw.move_to(px(0, 0)).unwrap();
        ccw.line_to(px(0, 4)).unwrap();
        ccw.line_to(px(4, 4)).unwrap();
        ccw.line_to(px(4, 0)).unwrap();
        assert_eq!(render(&mut cw), render(&mut ccw));
    }

    #[test]
    fn test_fill_rules_on_overlapping_contours() {
        let build = |rule| {
            let mut conv = ScanConverter::new(4, 1, 1, F26Dot6::from_raw(4));
            conv.set_fill_rule(rule);
            rect(&mut conv, 0, 0, 4, 1);
            rect(&mut conv, 1, 0, 3, 1);
            render(&mut conv)
        };
        assert_eq!(build(FillRule::NonZeroWinding), vec![1.0; 4]);
        assert_eq!(build(FillRule::EvenOdd), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_shape_outside_bitmap_is_clipped() {
        let mut conv = ScanConverter::new(2, 2, 4, F26Dot6::from_raw(4));
        rect(&mut conv, -10, -10, 1, 1);
        rect(&mut conv, 5, 5, 9, 9);
        let out = render(&mut conv);
        assert_eq!(out, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_curve_is_flattened_inside_its_hull() {
        let mut conv = ScanConverter::new(8, 8, 4, F26Dot6::from_raw(4));
        conv.move_to(px(0, 8)).unwrap();
        conv.quadratic_to(px(4, 0), px(8, 8)).unwrap();
        conv.close().unwrap();
        assert!(conv.edge_count() > 2);
        let out = render(&mut conv);
        // The arch is thickest at the bottom middle and thin at the top
        assert_eq!(out[7 * 8 + 3], 1.0);
        assert!(out[3] < 0.5);
        assert!(out.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_gamma_brightens_partial_coverage() {
        let mut conv = ScanConverter::new(1, 1, 1, F26Dot6::from_raw(4));
        conv.move_to(FixedPoint::from_raw(0, 0)).unwrap();
        conv.line_to(FixedPoint::from_raw(16, 0)).unwrap();
        conv.line_to(FixedPoint::from_raw(16, 64)).unwrap();
        conv.line_to(FixedPoint::from_raw(0, 64)).unwrap();
        let mut out = vec![0.0];
        conv.render(&mut out, &StdMath, 2.0).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_edge_table_growth_is_charged_up_front() {
        let edge_bytes = std::mem::size_of::<Edge>();
        let budget = Arc::new(BudgetAllocator::new(FIRST_EDGE_CHUNK * edge_bytes));
        let mut conv = ScanConverter::new(64, 64, 1, F26Dot6::from_raw(4))
            .with_host(Host::with_allocator(budget.clone()));

        // A comb of vertical edges: the first chunk fits, the second does not
        conv.move_to(px(0, 0)).unwrap();
        let mut refused = None;
        for i in 0..2 * FIRST_EDGE_CHUNK as i32 {
            let y = if i % 2 == 0 { 10 } else { 0 };
            if let Err(err) = conv.line_to(px(i + 1, y)) {
                refused = Some(err);
                break;
            }
        }
        assert!(matches!(refused, Some(TtError::AllocationFailed { .. })));
        assert_eq!(conv.edge_count(), FIRST_EDGE_CHUNK);
        assert_eq!(budget.in_use(), FIRST_EDGE_CHUNK * edge_bytes);

        drop(conv);
        assert_eq!(budget.in_use(), 0);
    }
}
