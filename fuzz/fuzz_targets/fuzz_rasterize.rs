//! Fuzz the scan converter with arbitrary outlines and placements
//!
//! Input bytes are read as a small header (bitmap size, scale, fill rule)
//! followed by points. Coverage must stay within 0..=1 whatever the shape.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ttrast_core::{Contour, Outline, Point, RasterConfig};
use ttrast_raster::{FillRule, Placement, Rasterizer};

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }

    let width = (data[0] % 64) as u32;
    let height = (data[1] % 64) as u32;
    let scale = (data[2] as f32 + 1.0) / 32.0;
    let oversample = data[3] % 16 + 1;
    let rule = if data[4] & 1 == 0 {
        FillRule::NonZeroWinding
    } else {
        FillRule::EvenOdd
    };
    let contour_len = (data[5] % 16) as usize + 1;

    let points: Vec<Point> = data[6..]
        .chunks_exact(5)
        .map(|c| Point {
            x: i16::from_be_bytes([c[0], c[1]]) as f32,
            y: i16::from_be_bytes([c[2], c[3]]) as f32,
            on_curve: c[4] & 1 == 1,
        })
        .collect();
    let contours: Vec<Contour> = points
        .chunks(contour_len)
        .filter_map(Contour::from_points)
        .collect();
    let outline = Outline::new(contours);

    let Ok(raster) = Rasterizer::new(RasterConfig::default().with_oversample(oversample)) else {
        return;
    };
    let placement = Placement::uniform(scale).with_shift(width as f32 / 2.0, height as f32 / 2.0);
    if let Ok(bitmap) = raster.rasterize(&outline, &placement, width, height, rule) {
        assert!(bitmap.data().iter().all(|c| (0.0..=1.0).contains(c)));
    }
});
