//! CLI argument definitions using Clap v4

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ttrast_raster::FillRule;

/// ttrast - TrueType outlines and coverage from the command line
#[derive(Parser, Debug)]
#[command(name = "ttrast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display tables, units per em, glyph count and vertical metrics
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Dump the contours of one glyph
    #[command(alias = "o")]
    Outline(OutlineArgs),

    /// Rasterize one glyph to a PGM file or an ASCII preview
    #[command(alias = "r")]
    Render(RenderArgs),
}

/// Font file and face selection shared by every command
#[derive(Args, Debug)]
pub struct FontArgs {
    /// Font file path (.ttf or .ttc)
    pub font: PathBuf,

    /// Face index for TTC collections
    #[arg(short = 'y', long = "index", default_value = "0")]
    pub index: u32,
}

/// Which glyph to operate on
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct GlyphSelector {
    /// Character to look up through the cmap
    #[arg(short = 'c', long = "char")]
    pub ch: Option<char>,

    /// Glyph index, bypassing the cmap
    #[arg(short = 'g', long = "glyph")]
    pub glyph: Option<u16>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub font: FontArgs,
}

#[derive(Args, Debug)]
pub struct OutlineArgs {
    #[command(flatten)]
    pub font: FontArgs,

    #[command(flatten)]
    pub glyph: GlyphSelector,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub font: FontArgs,

    #[command(flatten)]
    pub glyph: GlyphSelector,

    /// Pixel height of the font's ascent-to-descent span
    #[arg(short = 's', long = "size", default_value = "32")]
    pub size: f32,

    /// Treat --size as pixels per em instead
    #[arg(long = "em")]
    pub em: bool,

    /// Fill rule: nonzero or even-odd
    #[arg(long = "fill-rule", default_value = "nonzero")]
    pub fill_rule: FillRule,

    /// Sub-scanlines per pixel row (1-16); overrides TTRAST_OVERSAMPLE
    #[arg(long = "oversample")]
    pub oversample: Option<u8>,

    /// Coverage gamma; overrides TTRAST_GAMMA
    #[arg(long = "gamma")]
    pub gamma: Option<f32>,

    /// Output PGM file; prints an ASCII preview when omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}
