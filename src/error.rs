//! Error types for the lattice extraction engine.
//!
//! Only malformed inputs surface as errors. Noisy geometry (segments that match
//! no grid line, sparse joint clusters, text outside the grid) is tolerated and
//! reported through the `log` facade instead.

/// Result type alias for lattice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing a ruled table.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// The raster cannot be processed (empty, bad threshold parameters, ...)
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// Page extents in layout space are zero, negative or not finite
    #[error("Invalid page size: {width} x {height}")]
    InvalidPageSize {
        /// Page width in layout units
        width: f32,
        /// Page height in layout units
        height: f32,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two rasters that must be combined pixel-wise differ in size
    #[error("Raster dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        /// Dimensions of the left-hand raster
        expected: (u32, u32),
        /// Dimensions of the right-hand raster
        found: (u32, u32),
    },

    /// Serializing an extracted table failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
