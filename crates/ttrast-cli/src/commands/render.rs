//! Render command implementation
//!
//! Configuration comes from `TTRAST_*` environment variables first; explicit
//! flags override them.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use log::info;
use ttrast_core::RasterConfig;
use ttrast_raster::GlyphRasterizer;

use super::{open_font, read_font_file, resolve_glyph};
use crate::cli::RenderArgs;
use crate::export;

pub fn run(args: &RenderArgs) -> Result<()> {
    let data = read_font_file(&args.font)?;
    let font = open_font(&data, &args.font)?;
    let glyph = resolve_glyph(&font, &args.glyph)?;

    // Rendering a glyph that draws nothing is almost certainly a mistake
    font.outline(glyph)?.ensure_drawable(glyph)?;

    let config = raster_config(args)?;
    let rasterizer = if args.em {
        GlyphRasterizer::with_em_size(&font, args.size)?
    } else {
        GlyphRasterizer::new(&font, args.size)?
    }
    .with_fill_rule(args.fill_rule)
    .with_config(config)?;

    let bitmap = rasterizer.render_glyph(glyph)?;
    info!(
        "glyph {} at scale {}: {}x{} px, left {}, top {}",
        glyph,
        rasterizer.scale(),
        bitmap.width(),
        bitmap.height(),
        bitmap.left,
        bitmap.top
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            export::write_pgm(&bitmap.coverage, &mut out)?;
            out.flush()?;
            eprintln!(
                "wrote {}x{} glyph {} to {}",
                bitmap.width(),
                bitmap.height(),
                glyph,
                path.display()
            );
        },
        None => {
            print!("{}", export::ascii_preview(&bitmap.coverage));
            eprintln!(
                "glyph {}: {}x{} px, left {}, top {}",
                glyph,
                bitmap.width(),
                bitmap.height(),
                bitmap.left,
                bitmap.top
            );
        },
    }

    Ok(())
}

fn raster_config(args: &RenderArgs) -> Result<RasterConfig> {
    let mut config = RasterConfig::from_env()?;
    if let Some(oversample) = args.oversample {
        config = config.with_oversample(oversample);
    }
    if let Some(gamma) = args.gamma {
        config = config.with_gamma(gamma);
    }
    config.validate()?;
    Ok(config)
}
