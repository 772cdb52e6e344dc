// this_file: crates/ttrast-sfnt/src/lib.rs

//! TrueType table reading and outline extraction
//!
//! [`Font`] borrows a font blob, scans its table directory once and then
//! answers per-glyph questions on demand: which glyph a character maps to,
//! how wide it is, and what its outline looks like. Nothing is cached and
//! nothing is mutated after loading, so a `Font` can be shared freely
//! between threads.
//!
//! Every read is bounds-checked. Malformed data surfaces as a
//! [`TtError`](ttrast_core::TtError) scoped to the table or glyph that
//! contained it.

pub mod collection;
pub mod directory;
pub mod font;
pub mod glyf;
pub mod reader;
pub mod tables;

#[cfg(feature = "builder")]
pub mod builder;

pub use directory::{TableDirectory, TableRecord};
pub use font::{Font, FontOptions};
pub use glyf::GlyphHeader;
pub use reader::{Cursor, Reader};
