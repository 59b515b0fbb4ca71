//! Page-level table extraction.
//!
//! [`LatticeExtractor`] runs the whole pipeline for one page: line detection
//! on the raster, region and joint discovery, conversion to layout space, grid
//! construction, and text assignment. Pages are independent; the extractor
//! holds only its configuration and can be shared across threads.

use image::GrayImage;
use serde::Serialize;

use crate::config::LatticeConfig;
use crate::error::Result;
use crate::geometry::{BBox, Orientation, PixelRect};
use crate::layout::{TextDirection, TextLine};
use crate::lattice::assign::{
    filter_in_bbox, flag_font_size, locate_cell, resolve_span, split_across_cells, strip_text,
    CellText, SplitText,
};
use crate::lattice::grid::{build_intervals, ColumnInterval, RowInterval, Table};
use crate::lattice::lines::{detect_lines, find_joints, find_table_regions};
use crate::lattice::report::ParsingReport;
use crate::lattice::scale::{CoordinateScaler, PageGeometry, TableRegion};
use crate::raster::BinaryRaster;
use crate::utils::safe_float_cmp;

/// Layout-side description of a page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Page width in layout units
    pub width: f32,
    /// Page height in layout units
    pub height: f32,
    /// Page number reported back in each table's report
    pub page_number: usize,
    /// Text fragments of the page, either direction
    pub lines: Vec<TextLine>,
}

impl PageLayout {
    /// Create a page with no text.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set the page number.
    pub fn with_page_number(mut self, page_number: usize) -> Self {
        self.page_number = page_number;
        self
    }

    /// Add text fragments.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = TextLine>) -> Self {
        self.lines.extend(lines);
        self
    }
}

/// One reconstructed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTable {
    /// Trimmed cell text, row-major, top row first
    pub data: Vec<Vec<String>>,
    /// Row bands, top to bottom
    pub rows: Vec<RowInterval>,
    /// Column bands, left to right
    pub cols: Vec<ColumnInterval>,
    /// Region bounds in layout space
    pub bbox: BBox,
    /// Placement error of every located fragment, in assignment order
    pub errors: Vec<f32>,
    /// Quality metrics
    pub report: ParsingReport,
}

impl ExtractedTable {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// Serialize the table as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Ruled-table extractor.
#[derive(Debug, Clone, Default)]
pub struct LatticeExtractor {
    config: LatticeConfig,
}

impl LatticeExtractor {
    /// Create an extractor; the configuration is checked up front.
    pub fn new(config: LatticeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Binarize a grayscale page render, then extract from it.
    pub fn extract_from_image(&self, gray: &GrayImage, page: &PageLayout) -> Result<Vec<ExtractedTable>> {
        let raster = BinaryRaster::adaptive_threshold(gray, &self.config.threshold)?;
        self.extract(&raster, page)
    }

    /// Extract every ruled table on a page, topmost first.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::PixelRect;
    /// use lattice_oxide::lattice::{LatticeExtractor, PageLayout};
    /// use lattice_oxide::raster::BinaryRaster;
    /// use lattice_oxide::LatticeConfig;
    ///
    /// let mut raster = BinaryRaster::new(300, 300);
    /// for i in 0..4 {
    ///     let at = 30 + i * 60;
    ///     raster.fill_rect(PixelRect::new(at, 30, 2, 182)); // vertical rule
    ///     raster.fill_rect(PixelRect::new(30, at, 182, 2)); // horizontal rule
    /// }
    ///
    /// let extractor = LatticeExtractor::new(LatticeConfig::default()).unwrap();
    /// let tables = extractor.extract(&raster, &PageLayout::new(300.0, 300.0)).unwrap();
    /// assert_eq!(tables.len(), 1);
    /// assert_eq!(tables[0].shape(), (3, 3));
    /// ```
    pub fn extract(&self, raster: &BinaryRaster, page: &PageLayout) -> Result<Vec<ExtractedTable>> {
        let geometry = self.detect(raster, page)?;

        let mut regions: Vec<&TableRegion> = geometry.regions.iter().collect();
        regions.sort_by(|a, b| safe_float_cmp(b.bbox.top(), a.bbox.top()));

        let tables: Vec<ExtractedTable> = regions
            .into_iter()
            .enumerate()
            .map(|(i, region)| self.build_table(region, &geometry, page, i + 1))
            .collect();

        log::info!("Extracted {} tables from page {}", tables.len(), page.page_number);
        Ok(tables)
    }

    /// Run raster-space detection and move the results to layout space.
    fn detect(&self, raster: &BinaryRaster, page: &PageLayout) -> Result<PageGeometry> {
        let scaler = CoordinateScaler::new(raster.dimensions(), (page.width, page.height))?;
        let cfg = &self.config;

        let restricted;
        let raster = if cfg.table_areas.is_empty() {
            raster
        } else {
            let areas: Vec<PixelRect> = cfg.table_areas.iter().map(|a| scaler.rect_to_raster(a)).collect();
            restricted = raster.retain_regions(&areas);
            &restricted
        };

        let (v_mask, v_segments) = detect_lines(raster, Orientation::Vertical, cfg.line_scale, cfg.iterations)?;
        let (h_mask, h_segments) = detect_lines(raster, Orientation::Horizontal, cfg.line_scale, cfg.iterations)?;

        let regions = find_table_regions(&v_mask, &h_mask, cfg.max_regions, cfg.approx_epsilon)?;
        let joints = find_joints(&regions, &v_mask, &h_mask, cfg.sparse_joint_limit)?;

        Ok(scaler.scale_page(&joints, &v_segments, &h_segments))
    }

    fn build_table(&self, region: &TableRegion, geometry: &PageGeometry, page: &PageLayout, order: usize) -> ExtractedTable {
        let cfg = &self.config;
        let bbox = region.bbox;

        let vertical = filter_in_bbox(&bbox, &geometry.vertical, cfg.bbox_tol);
        let horizontal = filter_in_bbox(&bbox, &geometry.horizontal, cfg.bbox_tol);
        let (rows, cols) = build_intervals(&bbox, &region.joints, cfg.line_tol);

        let mut table = Table::new(rows, cols);
        table
            .set_edges(&vertical, &horizontal, cfg.joint_tol)
            .set_border()
            .set_span();

        let fragments = filter_in_bbox(&bbox, &page.lines, cfg.bbox_tol);
        let (mut v_text, mut h_text): (Vec<TextLine>, Vec<TextLine>) = fragments
            .into_iter()
            .partition(|t| t.direction == TextDirection::Vertical);
        v_text.sort_by(|a, b| {
            safe_float_cmp(a.bbox.x0, b.bbox.x0).then_with(|| safe_float_cmp(b.bbox.y0, a.bbox.y0))
        });
        h_text.sort_by(|a, b| {
            safe_float_cmp(b.bbox.y0, a.bbox.y0).then_with(|| safe_float_cmp(a.bbox.x0, b.bbox.x0))
        });

        let mut errors = Vec::new();
        for fragment in v_text.iter().chain(h_text.iter()) {
            let Some(loc) = locate_cell(&table, fragment) else {
                log::warn!(
                    "Dropping {:?}: no row contains its centre y = {}",
                    fragment.text.trim(),
                    fragment.bbox.center().y
                );
                continue;
            };
            errors.push(loc.error);

            let pieces = if cfg.split_text {
                match split_across_cells(&table, fragment, cfg.flag_size, &cfg.strip_text) {
                    SplitText::Cells(pieces) => pieces,
                    SplitText::Unplaced(_) => continue,
                }
            } else {
                vec![CellText {
                    row: loc.row,
                    col: loc.col,
                    text: self.render(fragment),
                }]
            };

            for piece in pieces {
                let (row, col) = resolve_span(&table, piece.row, piece.col, &cfg.shift_text);
                log::trace!("{:?} -> ({}, {})", piece.text, row, col);
                if let Some(cell) = table.cell_mut(row, col) {
                    cell.push_text(&piece.text);
                }
            }
        }

        let data = table.data();
        let report = ParsingReport::new(&errors, &data, order, page.page_number);
        log::debug!(
            "Table {} on page {}: {}x{} cells, accuracy {}",
            order,
            page.page_number,
            table.rows.len(),
            table.cols.len(),
            report.accuracy
        );

        ExtractedTable {
            data,
            rows: table.rows,
            cols: table.cols,
            bbox,
            errors,
            report,
        }
    }

    fn render(&self, fragment: &TextLine) -> String {
        let text = if self.config.flag_size && !fragment.items.is_empty() {
            flag_font_size(&fragment.items, fragment.direction)
        } else {
            fragment.text.clone()
        };
        strip_text(&text, &self.config.strip_text)
    }
}
