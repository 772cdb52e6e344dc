//! Rendering many glyphs at once
//!
//! With the `parallel` feature the glyph list is spread over rayon's thread
//! pool; without it the same function runs sequentially. Either way the
//! cancellation flag is checked before each glyph starts, so a cancelled
//! batch stops after the glyphs already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use ttrast_core::{GlyphId, Result};

use crate::rasterizer::{GlyphBitmap, GlyphRasterizer};

/// Shared stop signal for a running batch
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-glyph results in input order
#[derive(Debug)]
pub struct BatchOutput {
    /// One entry per glyph that was started; skipped glyphs are absent
    pub results: Vec<(GlyphId, Result<GlyphBitmap>)>,
    /// Whether any glyph was skipped because of cancellation
    pub cancelled: bool,
}

impl BatchOutput {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }
}

/// Render every glyph in `glyphs`, stopping early once `cancel` is set
///
/// Each glyph succeeds or fails on its own; one broken glyph never aborts
/// the rest of the batch.
pub fn rasterize_batch(
    rasterizer: &GlyphRasterizer<'_, '_>,
    glyphs: &[GlyphId],
    cancel: &CancelFlag,
) -> BatchOutput {
    let render = |&glyph: &GlyphId| {
        if cancel.is_cancelled() {
            None
        } else {
            Some((glyph, rasterizer.render_glyph(glyph)))
        }
    };

    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;
        glyphs.par_iter().filter_map(render).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = glyphs.iter().map_while(render).collect();

    let cancelled = results.len() < glyphs.len();
    debug!(
        "batch rendered {} of {} glyphs{}",
        results.len(),
        glyphs.len(),
        if cancelled { " (cancelled)" } else { "" }
    );
    BatchOutput { results, cancelled }
}
