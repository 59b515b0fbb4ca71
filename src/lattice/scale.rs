//! Mapping between raster space and layout space.
//!
//! Raster space has its origin at the top-left with y growing downward; layout
//! space has its origin at the bottom-left with y growing upward. Every piece
//! of detected geometry passes through [`CoordinateScaler`] exactly once,
//! after detection and before the grid is built.

use crate::error::{Error, Result};
use crate::geometry::{BBox, Orientation, PixelPoint, PixelRect, PixelSegment, Point, Segment};
use crate::lattice::lines::RegionJoints;

/// Per-page scale factors between the two coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScaler {
    scale_x: f32,
    scale_y: f32,
    raster_height: f32,
}

impl CoordinateScaler {
    /// Build the scaler from the raster's pixel size and the page's layout size.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::{PixelPoint, Point};
    /// use lattice_oxide::lattice::scale::CoordinateScaler;
    ///
    /// // 300 dpi render of a US Letter page
    /// let scaler = CoordinateScaler::new((2550, 3300), (612.0, 792.0)).unwrap();
    /// let p = scaler.to_layout(PixelPoint::new(0, 3300));
    /// assert_eq!(p, Point::new(0.0, 0.0));
    /// ```
    pub fn new(raster_size: (u32, u32), page_size: (f32, f32)) -> Result<Self> {
        let (raster_width, raster_height) = raster_size;
        if raster_width == 0 || raster_height == 0 {
            return Err(Error::InvalidRaster(format!(
                "cannot scale from an empty raster ({}x{})",
                raster_width, raster_height
            )));
        }
        let (page_width, page_height) = page_size;
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(page_width) || !valid(page_height) {
            return Err(Error::InvalidPageSize {
                width: page_width,
                height: page_height,
            });
        }
        Ok(Self {
            scale_x: page_width / raster_width as f32,
            scale_y: page_height / raster_height as f32,
            raster_height: raster_height as f32,
        })
    }

    /// Layout units per pixel horizontally.
    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    /// Layout units per pixel vertically.
    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Flip and scale a pixel position into layout space.
    pub fn to_layout(&self, p: PixelPoint) -> Point {
        Point::new(self.x_to_layout(p.x), self.y_to_layout(p.y))
    }

    /// Inverse of [`to_layout`](Self::to_layout), rounded to the nearest pixel.
    pub fn to_raster(&self, p: Point) -> PixelPoint {
        PixelPoint::new(
            (p.x / self.scale_x).round() as i32,
            (self.raster_height - p.y / self.scale_y).round() as i32,
        )
    }

    /// Map a pixel rectangle to a layout box.
    ///
    /// The rectangle's bottom-left pixel corner `(x, y + height)` becomes
    /// `(x0, y0)` and its top-right corner `(x + width, y)` becomes `(x1, y1)`.
    pub fn rect_to_layout(&self, r: &PixelRect) -> BBox {
        BBox::new(
            self.x_to_layout(r.x),
            self.y_to_layout(r.y + r.height),
            self.x_to_layout(r.x + r.width),
            self.y_to_layout(r.y),
        )
    }

    /// Map a layout box back to the pixel rectangle covering it.
    pub fn rect_to_raster(&self, b: &BBox) -> PixelRect {
        let top_left = self.to_raster(Point::new(b.x0.min(b.x1), b.y0.max(b.y1)));
        let bottom_right = self.to_raster(Point::new(b.x0.max(b.x1), b.y0.min(b.y1)));
        PixelRect::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    /// Map a detected segment to layout space.
    ///
    /// Vertical segments come out bottom end first, horizontal ones left end first.
    pub fn segment_to_layout(&self, s: &PixelSegment) -> Segment {
        let a = self.to_layout(PixelPoint::new(s.x1, s.y1));
        let b = self.to_layout(PixelPoint::new(s.x2, s.y2));
        match s.orientation {
            Orientation::Vertical => Segment::vertical(a.x, a.y, b.y),
            Orientation::Horizontal => Segment::horizontal(a.x, b.x, a.y),
        }
    }

    fn x_to_layout(&self, x: i32) -> f32 {
        x as f32 * self.scale_x
    }

    fn y_to_layout(&self, y: i32) -> f32 {
        (y as f32 - self.raster_height).abs() * self.scale_y
    }
}

/// A table region in layout space together with its joints.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRegion {
    /// Region bounds
    pub bbox: BBox,
    /// Line intersections inside the region
    pub joints: Vec<Point>,
}

/// All detected geometry of a page, in layout space.
#[derive(Debug, Clone, Default)]
pub struct PageGeometry {
    /// Table regions, in detection order
    pub regions: Vec<TableRegion>,
    /// Vertical ruling lines
    pub vertical: Vec<Segment>,
    /// Horizontal ruling lines
    pub horizontal: Vec<Segment>,
}

impl CoordinateScaler {
    /// Convert a page's detection output into layout space in one pass.
    pub fn scale_page(
        &self,
        tables: &RegionJoints,
        vertical: &[PixelSegment],
        horizontal: &[PixelSegment],
    ) -> PageGeometry {
        let regions = tables
            .iter()
            .map(|(rect, joints)| TableRegion {
                bbox: self.rect_to_layout(rect),
                joints: joints.iter().map(|j| self.to_layout(*j)).collect(),
            })
            .collect();
        PageGeometry {
            regions,
            vertical: vertical.iter().map(|s| self.segment_to_layout(s)).collect(),
            horizontal: horizontal.iter().map(|s| self.segment_to_layout(s)).collect(),
        }
    }
}
