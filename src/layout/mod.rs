//! Text fragments as delivered by the layout parser.
//!
//! The extractor does not parse documents itself. Callers hand it positioned
//! text runs, optionally decomposed into glyphs, in layout space.

pub mod text_line;

pub use text_line::{LineItem, TextChar, TextDirection, TextLine};
