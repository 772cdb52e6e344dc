//! ttrast CLI - inspect TrueType fonts and rasterize glyphs

mod cli;
mod commands;
mod export;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Outline(args) => commands::outline::run(args),
        Commands::Render(args) => commands::render::run(args),
    }
}
