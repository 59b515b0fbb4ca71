// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::enum_variant_names)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # Lattice Oxide
//!
//! Reconstructs ruled ("lattice") tables from a rendered page: ruling lines are
//! found on a binary raster, their crossings define a row/column grid, and the
//! page's positioned text is dropped into the resulting cells.
//!
//! ## Pipeline
//!
//! - **Raster preparation**: adaptive thresholding of a grayscale render into a
//!   two-level [`raster::BinaryRaster`]
//! - **Line detection**: morphological opening with long thin kernels, contour
//!   tracing into segments, table outlines and joints
//! - **Coordinate scaling**: one conversion from raster pixels (origin top-left)
//!   to layout units (origin bottom-left)
//! - **Grid building**: row/column bands, closed cell edges, spanning cells
//! - **Text assignment**: best-overlap cell location, optional splitting at
//!   ruling lines, super/subscript flagging
//!
//! Document parsing and rendering are out of scope: callers supply the raster
//! (or grayscale image) and the text fragments of each page.
//!
//! ## Quick Start
//!
//! ```
//! use lattice_oxide::geometry::{BBox, PixelRect};
//! use lattice_oxide::layout::{TextDirection, TextLine};
//! use lattice_oxide::lattice::{LatticeExtractor, PageLayout};
//! use lattice_oxide::raster::BinaryRaster;
//! use lattice_oxide::LatticeConfig;
//!
//! # fn main() -> lattice_oxide::Result<()> {
//! // 2 x 2 grid of 2px rules on a 300 x 300 render
//! let mut raster = BinaryRaster::new(300, 300);
//! for i in 0..3 {
//!     let at = 50 + i * 100;
//!     raster.fill_rect(PixelRect::new(at, 50, 2, 202));
//!     raster.fill_rect(PixelRect::new(50, at, 202, 2));
//! }
//!
//! // The page is 300 x 300 layout units, so y flips: raster row 100 is y = 200.
//! let page = PageLayout::new(300.0, 300.0).with_lines([TextLine::new(
//!     "Total",
//!     BBox::new(80.0, 195.0, 120.0, 205.0),
//!     TextDirection::Horizontal,
//! )]);
//!
//! let extractor = LatticeExtractor::new(LatticeConfig::default())?;
//! let tables = extractor.extract(&raster, &page)?;
//! assert_eq!(tables[0].data[0][0], "Total");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry in both coordinate spaces
pub mod geometry;

// Text fragments from the layout parser
pub mod layout;

// Binary rasters and morphology
pub mod raster;

// Table reconstruction
pub mod lattice;

// Re-exports
pub use config::{LatticeConfig, ThresholdConfig};
pub use error::{Error, Result};
pub use lattice::{ExtractedTable, LatticeExtractor, PageLayout, ParsingReport};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Total order on floats for sorting; NaN sorts after every number.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// # use std::cmp::Ordering;
    /// # use lattice_oxide::utils::safe_float_cmp;
    /// assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
    /// assert_eq!(safe_float_cmp(f32::NAN, 1.0), Ordering::Greater);
    /// ```
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_safe_float_cmp_normal() {
            assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
            assert_eq!(safe_float_cmp(2.0, 1.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(1.5, 1.5), Ordering::Equal);
        }

        #[test]
        fn test_safe_float_cmp_nan() {
            assert_eq!(safe_float_cmp(f32::NAN, f32::NAN), Ordering::Equal);
            assert_eq!(safe_float_cmp(f32::NAN, 0.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(0.0, f32::NAN), Ordering::Less);
        }

        #[test]
        fn test_descending_sort() {
            let mut tops = vec![10.0, f32::NAN, 30.0, 20.0];
            tops.sort_by(|a, b| safe_float_cmp(*b, *a));
            assert!(tops[0].is_nan());
            assert_eq!(&tops[1..], &[30.0, 20.0, 10.0]);
        }
    }
}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "lattice_oxide");
    }
}
