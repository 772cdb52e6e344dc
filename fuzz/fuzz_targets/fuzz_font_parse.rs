//! Fuzz font loading and glyph decoding with arbitrary bytes
//!
//! Malformed fonts must surface as errors, never as panics, overflows or
//! unbounded recursion. Every glyph in a font that loads is decoded, so the
//! composite resolver and the flag/coordinate decoders see hostile input too.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ttrast_sfnt::{collection, Font};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000_000 {
        return;
    }

    let faces = collection::font_count(data).unwrap_or(1).min(4);
    for index in 0..faces {
        let Ok(font) = Font::from_collection(data, index) else {
            continue;
        };

        let _ = font.vertical_metrics();
        for ch in ['A', 'g', ' ', '\u{1F600}'] {
            let _ = font.glyph_index(ch);
        }

        for glyph in 0..font.num_glyphs().min(512) {
            let _ = font.glyph_metrics(glyph);
            let _ = font.glyph_box(glyph);
            let _ = font.kern_advance(glyph, glyph.wrapping_add(1));
            if let Ok(outline) = font.outline(glyph) {
                let _ = outline.contours().iter().map(|c| c.segments().count()).sum::<usize>();
            }
        }
    }
});
