//! Coverage bitmaps as PGM files and terminal art

use std::io::{self, Write};

use ttrast_core::CoverageBitmap;

/// Binary greymap (P5), one byte per pixel, ink bright on black
pub fn write_pgm<W: Write>(bitmap: &CoverageBitmap, out: &mut W) -> io::Result<()> {
    writeln!(out, "P5")?;
    writeln!(out, "{} {}", bitmap.width(), bitmap.height())?;
    writeln!(out, "255")?;
    out.write_all(&bitmap.to_alpha8())?;
    Ok(())
}

const RAMP: &[u8] = b" .:-=+*#%@";

/// One character per pixel, darker glyphs for higher coverage
pub fn ascii_preview(bitmap: &CoverageBitmap) -> String {
    let mut text = String::with_capacity((bitmap.width() as usize + 1) * bitmap.height() as usize);
    for y in 0..bitmap.height() {
        for &c in bitmap.row(y).unwrap_or(&[]) {
            let level = (c.clamp(0.0, 1.0) * (RAMP.len() - 1) as f32 + 0.5) as usize;
            text.push(RAMP[level.min(RAMP.len() - 1)] as char);
        }
        text.push('\n');
    }
    text
}
