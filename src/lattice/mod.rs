//! Ruled ("lattice") table reconstruction.
//!
//! The pipeline for one page:
//!
//! 1. [`lines`]: open the raster with long thin kernels to isolate ruling
//!    lines, outline table regions and find the joints where lines cross.
//! 2. [`scale`]: move every region, joint and segment into layout space.
//! 3. [`grid`]: turn joints into row/column bands and close cell edges that
//!    coincide with detected lines.
//! 4. [`assign`]: drop each text fragment into its cell.
//! 5. [`report`]: score how well the text fit.
//!
//! [`LatticeExtractor`] drives all of it.

pub mod assign;
pub mod extractor;
pub mod grid;
pub mod lines;
pub mod report;
pub mod scale;

pub use assign::{CellLocation, CellText, SplitText};
pub use extractor::{ExtractedTable, LatticeExtractor, PageLayout};
pub use grid::{Cell, ColumnInterval, Edge, RowInterval, Table};
pub use report::ParsingReport;
pub use scale::CoordinateScaler;
