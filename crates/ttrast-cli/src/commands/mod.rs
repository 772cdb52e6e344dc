//! Subcommand implementations

pub mod info;
pub mod outline;
pub mod render;

use anyhow::{Context, Result};
use ttrast_core::{GlyphId, OutlineConfig};
use ttrast_sfnt::{Font, FontOptions};

use crate::cli::{FontArgs, GlyphSelector};

/// Read the font file named on the command line
pub(crate) fn read_font_file(args: &FontArgs) -> Result<Vec<u8>> {
    std::fs::read(&args.font).with_context(|| format!("failed to read {}", args.font.display()))
}

/// Parse one face of `data`, with outline limits taken from the environment
pub(crate) fn open_font<'a>(data: &'a [u8], args: &FontArgs) -> Result<Font<'a>> {
    let options = FontOptions {
        index: args.index,
        outline: OutlineConfig::from_env()?,
        ..FontOptions::default()
    };
    Font::with_options(data, options).with_context(|| {
        format!(
            "failed to load face {} of {}",
            args.index,
            args.font.display()
        )
    })
}

pub(crate) fn resolve_glyph(font: &Font<'_>, selector: &GlyphSelector) -> Result<GlyphId> {
    match (selector.ch, selector.glyph) {
        (_, Some(glyph)) => Ok(glyph),
        (Some(ch), None) => font
            .glyph_index(ch)?
            .with_context(|| format!("no glyph for {:?} (U+{:04X})", ch, ch as u32)),
        (None, None) => anyhow::bail!("either --char or --glyph is required"),
    }
}
