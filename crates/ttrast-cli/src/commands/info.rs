//! Info command implementation
//!
//! Prints the table directory and the font-wide numbers the rasterizer
//! depends on.

use anyhow::Result;
use ttrast_core::Tag;
use ttrast_sfnt::collection;

use super::{open_font, read_font_file};
use crate::cli::InfoArgs;

pub fn run(args: &InfoArgs) -> Result<()> {
    let data = read_font_file(&args.font)?;
    let font = open_font(&data, &args.font)?;

    println!("ttrast v{}", env!("CARGO_PKG_VERSION"));
    println!("file:          {}", args.font.font.display());
    if collection::is_collection(&data) {
        println!(
            "collection:    face {} of {}",
            args.font.index,
            collection::font_count(&data)?
        );
    }
    println!("units per em:  {}", font.units_per_em());
    println!("glyph count:   {}", font.num_glyphs());

    let vm = font.vertical_metrics();
    println!(
        "ascent:        {}\ndescent:       {}\nline gap:      {}",
        vm.ascent, vm.descent, vm.line_gap
    );

    let bounds = font.font_bounds();
    println!(
        "font bbox:     {} {} {} {}",
        bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max
    );

    let (platform, encoding) = font.cmap().encoding();
    println!(
        "cmap:          format {} (platform {}, encoding {})",
        font.cmap().format(),
        platform,
        encoding
    );
    println!(
        "kerning:       {}",
        if font.table(Tag::KERN).is_some() {
            "kern"
        } else {
            "none"
        }
    );

    println!();
    println!("tables:");
    for record in font.directory().records() {
        println!(
            "  {}  offset {:>8}  length {:>8}  checksum {:08X}",
            record.tag, record.offset, record.length, record.checksum
        );
    }

    Ok(())
}
