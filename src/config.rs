//! Configuration for lattice table extraction.

use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::lattice::grid::Edge;

/// Parameters for turning a grayscale page image into a binary raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Side of the gaussian neighbourhood; odd and at least 3.
    pub block_size: u32,
    /// Constant subtracted from the weighted local mean.
    pub c: f32,
    /// Treat the page background as foreground (for light lines on dark fills).
    pub process_background: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            block_size: 15,
            c: -2.0,
            process_background: false,
        }
    }
}

impl ThresholdConfig {
    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "threshold block size must be odd and >= 3, got {}",
                self.block_size
            )));
        }
        Ok(())
    }
}

/// Lattice extraction configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeConfig {
    /// Ruling lines shorter than `raster_extent / line_scale` pixels are ignored.
    pub line_scale: u32,

    /// Extra dilation passes for the joint-search masks.
    pub iterations: u32,

    /// Tolerance for merging near-duplicate row/column coordinates.
    pub line_tol: f32,

    /// Tolerance for matching a segment end to a row/column boundary.
    pub joint_tol: f32,

    /// Margin around a table region when scoping segments and text to it.
    pub bbox_tol: f32,

    /// At most this many candidate regions (largest first) are examined.
    pub max_regions: usize,

    /// Douglas–Peucker tolerance, in pixels, for region outlines.
    pub approx_epsilon: f64,

    /// Regions with this many joints or fewer are not treated as tables.
    pub sparse_joint_limit: usize,

    /// Split text runs that cross cell boundaries.
    pub split_text: bool,

    /// Wrap super/subscript runs in `<s></s>`.
    pub flag_size: bool,

    /// Characters removed from text before it is stored in a cell.
    pub strip_text: String,

    /// Directions in which text landing in a spanning cell is moved.
    pub shift_text: Vec<Edge>,

    /// Layout-space areas to look for tables in; empty means the whole page.
    pub table_areas: Vec<BBox>,

    /// Binarization parameters used when extracting from a grayscale image.
    pub threshold: ThresholdConfig,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LatticeConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            line_scale: 15,
            iterations: 0,
            line_tol: 2.0,
            joint_tol: 2.0,
            bbox_tol: 2.0,
            max_regions: 10,
            approx_epsilon: 3.0,
            sparse_joint_limit: 4,
            split_text: false,
            flag_size: false,
            strip_text: String::new(),
            shift_text: vec![Edge::Bottom, Edge::Top],
            table_areas: Vec::new(),
            threshold: ThresholdConfig::default(),
        }
    }

    /// Set the line scale.
    pub fn with_line_scale(mut self, line_scale: u32) -> Self {
        self.line_scale = line_scale;
        self
    }

    /// Set the number of extra dilation passes.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the line-merge tolerance.
    pub fn with_line_tol(mut self, tol: f32) -> Self {
        self.line_tol = tol;
        self
    }

    /// Set the segment-to-boundary tolerance.
    pub fn with_joint_tol(mut self, tol: f32) -> Self {
        self.joint_tol = tol;
        self
    }

    /// Enable splitting of text that crosses cell boundaries.
    pub fn with_split_text(mut self, enable: bool) -> Self {
        self.split_text = enable;
        self
    }

    /// Enable super/subscript flagging.
    pub fn with_flag_size(mut self, enable: bool) -> Self {
        self.flag_size = enable;
        self
    }

    /// Set the characters stripped from cell text.
    pub fn with_strip_text(mut self, chars: impl Into<String>) -> Self {
        self.strip_text = chars.into();
        self
    }

    /// Set the span-resolution directions.
    pub fn with_shift_text(mut self, shift: Vec<Edge>) -> Self {
        self.shift_text = shift;
        self
    }

    /// Restrict detection to the given layout-space areas.
    pub fn with_table_areas(mut self, areas: Vec<BBox>) -> Self {
        self.table_areas = areas;
        self
    }

    /// Set the binarization parameters.
    pub fn with_threshold(mut self, threshold: ThresholdConfig) -> Self {
        self.threshold = threshold;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.line_scale == 0 {
            return Err(Error::InvalidConfig("line_scale must be positive".to_string()));
        }
        if self.max_regions == 0 {
            return Err(Error::InvalidConfig("max_regions must be positive".to_string()));
        }
        for (name, value) in [
            ("line_tol", self.line_tol),
            ("joint_tol", self.joint_tol),
            ("bbox_tol", self.bbox_tol),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.approx_epsilon.is_finite() || self.approx_epsilon <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "approx_epsilon must be positive, got {}",
                self.approx_epsilon
            )));
        }
        self.threshold.validate()
    }
}
