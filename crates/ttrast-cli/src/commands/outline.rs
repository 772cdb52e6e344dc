//! Outline command implementation

use anyhow::Result;

use super::{open_font, read_font_file, resolve_glyph};
use crate::cli::OutlineArgs;

pub fn run(args: &OutlineArgs) -> Result<()> {
    let data = read_font_file(&args.font)?;
    let font = open_font(&data, &args.font)?;
    let glyph = resolve_glyph(&font, &args.glyph)?;

    let outline = font.outline(glyph)?;
    let metrics = font.glyph_metrics(glyph)?;
    println!(
        "glyph {}: advance {}, lsb {}",
        glyph, metrics.advance_width, metrics.left_side_bearing
    );

    let Some(bounds) = outline.bounds() else {
        println!("(no contours)");
        return Ok(());
    };
    println!(
        "bounds: {} {} {} {}",
        bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max
    );

    for (i, contour) in outline.contours().iter().enumerate() {
        println!("contour {} ({} points)", i, contour.len());
        for p in contour.points() {
            let kind = if p.on_curve { "on " } else { "off" };
            println!("  {} {} {}", kind, p.x, p.y);
        }
    }

    Ok(())
}
