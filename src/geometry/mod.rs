//! Geometric primitives for lattice reconstruction.
//!
//! Two coordinate spaces meet in this crate and they must never be mixed:
//!
//! - **Layout space** ([`Point`], [`BBox`], [`Segment`]): the page's native
//!   coordinates, origin at the bottom-left, y increasing upward, `f32` units.
//! - **Raster space** ([`PixelPoint`], [`PixelRect`], [`PixelSegment`]): pixel
//!   coordinates of the rendered page, origin at the top-left, y increasing
//!   downward, integer units.
//!
//! The only conversion between them is
//! [`CoordinateScaler`](crate::lattice::scale::CoordinateScaler).

use serde::Serialize;

/// Orientation of a ruling line (and of the text run it delimits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    /// Runs left to right; constant y
    Horizontal,
    /// Runs bottom to top; constant x
    Vertical,
}

/// A 2D point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate (increasing upward)
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box in layout space.
///
/// `(x0, y0)` is the bottom-left corner and `(x1, y1)` the top-right corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl BBox {
    /// Create a box from its bottom-left and top-right corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::BBox;
    ///
    /// let bbox = BBox::new(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(bbox.width(), 100.0);
    /// assert_eq!(bbox.height(), 50.0);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x0
    }

    /// Right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x1
    }

    /// Top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y1
    }

    /// Bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y0
    }

    /// Horizontal extent (never negative).
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    /// Vertical extent (never negative).
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// Get the center point of the box.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::BBox;
    ///
    /// let center = BBox::new(0.0, 0.0, 100.0, 50.0).center();
    /// assert_eq!(center.x, 50.0);
    /// assert_eq!(center.y, 25.0);
    /// ```
    pub fn center(&self) -> Point {
        Point {
            x: (self.x0 + self.x1) / 2.0,
            y: (self.y0 + self.y1) / 2.0,
        }
    }

    /// Grow the box by `tol` on every side.
    pub fn expand(&self, tol: f32) -> BBox {
        BBox::new(self.x0 - tol, self.y0 - tol, self.x1 + tol, self.y1 + tol)
    }

    /// Check if this box contains a point (edges inclusive).
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::{BBox, Point};
    ///
    /// let bbox = BBox::new(0.0, 0.0, 100.0, 100.0);
    /// assert!(bbox.contains_point(&Point::new(50.0, 50.0)));
    /// assert!(bbox.contains_point(&Point::new(100.0, 0.0)));
    /// assert!(!bbox.contains_point(&Point::new(150.0, 50.0)));
    /// ```
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Check if `other` lies entirely inside this box (edges inclusive).
    pub fn contains(&self, other: &BBox) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}

/// A ruling line in layout space.
///
/// Horizontal segments have `y1 == y2` and `x1 <= x2`; vertical segments have
/// `x1 == x2` and `y1 <= y2` (bottom end first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    /// First x coordinate
    pub x1: f32,
    /// First y coordinate
    pub y1: f32,
    /// Second x coordinate
    pub x2: f32,
    /// Second y coordinate
    pub y2: f32,
    /// Line orientation
    pub orientation: Orientation,
}

impl Segment {
    /// Create a horizontal segment at height `y` spanning `x1..x2`.
    pub fn horizontal(x1: f32, x2: f32, y: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y,
            x2: x1.max(x2),
            y2: y,
            orientation: Orientation::Horizontal,
        }
    }

    /// Create a vertical segment at `x` spanning `y1..y2`.
    pub fn vertical(x: f32, y1: f32, y2: f32) -> Self {
        Self {
            x1: x,
            y1: y1.min(y2),
            x2: x,
            y2: y1.max(y2),
            orientation: Orientation::Vertical,
        }
    }

    /// True for horizontal segments.
    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    /// True for vertical segments.
    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }
}

/// A pixel position in raster space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Column
    pub x: i32,
    /// Row (increasing downward)
    pub y: i32,
}

impl PixelPoint {
    /// Create a new pixel position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned pixel rectangle, top-left anchored, as produced by a
/// bounding-rectangle extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column
    pub x: i32,
    /// Top row
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding rectangle of a set of pixel positions.
    ///
    /// Like a raster bounding-rect primitive, the extent is inclusive: a single
    /// pixel yields a 1×1 rectangle. Returns `None` for an empty set.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::{PixelPoint, PixelRect};
    ///
    /// let rect = PixelRect::bounding(&[PixelPoint::new(2, 3), PixelPoint::new(4, 9)]).unwrap();
    /// assert_eq!(rect, PixelRect::new(2, 3, 3, 7));
    /// ```
    pub fn bounding(points: &[PixelPoint]) -> Option<PixelRect> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Area in pixels.
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// A ruling line in raster space, as reduced from a contour's bounding box.
///
/// Vertical segments are stored bottom end first (`y1 >= y2` in pixel rows),
/// horizontal segments left end first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelSegment {
    /// First x coordinate
    pub x1: i32,
    /// First y coordinate
    pub y1: i32,
    /// Second x coordinate
    pub x2: i32,
    /// Second y coordinate
    pub y2: i32,
    /// Line orientation
    pub orientation: Orientation,
}

impl PixelSegment {
    /// Reduce a line contour's bounding rectangle to a single segment along
    /// the rectangle's midline.
    pub fn from_rect(rect: &PixelRect, orientation: Orientation) -> Self {
        let (x1, x2) = (rect.x, rect.x + rect.width);
        let (y1, y2) = (rect.y, rect.y + rect.height);
        match orientation {
            Orientation::Vertical => {
                let x = (x1 + x2).div_euclid(2);
                Self {
                    x1: x,
                    y1: y2,
                    x2: x,
                    y2: y1,
                    orientation,
                }
            },
            Orientation::Horizontal => {
                let y = (y1 + y2).div_euclid(2);
                Self {
                    x1,
                    y1: y,
                    x2,
                    y2: y,
                    orientation,
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_creation() {
        let p = Point::new(10.0, 20.0);
        assert_eq!(p.x, 10.0);
        assert_eq!(p.y, 20.0);
    }

    #[test]
    fn test_bbox_edges() {
        let b = BBox::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(b.left(), 10.0);
        assert_eq!(b.right(), 110.0);
        assert_eq!(b.bottom(), 20.0);
        assert_eq!(b.top(), 70.0);
    }

    #[test]
    fn test_bbox_degenerate_extent() {
        let b = BBox::new(5.0, 5.0, 5.0, 5.0);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
    }

    #[test]
    fn test_bbox_expand() {
        let b = BBox::new(10.0, 10.0, 20.0, 20.0).expand(2.0);
        assert_eq!(b, BBox::new(8.0, 8.0, 22.0, 22.0));
    }

    #[test]
    fn test_bbox_contains() {
        let outer = BBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&BBox::new(10.0, 10.0, 20.0, 20.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&BBox::new(90.0, 90.0, 110.0, 95.0)));
    }

    #[test]
    fn test_bbox_union() {
        let u = BBox::new(0.0, 0.0, 50.0, 50.0).union(&BBox::new(25.0, 25.0, 75.0, 75.0));
        assert_eq!(u, BBox::new(0.0, 0.0, 75.0, 75.0));
    }

    #[test]
    fn test_segment_constructors_normalise_order() {
        let h = Segment::horizontal(30.0, 10.0, 5.0);
        assert_eq!((h.x1, h.x2), (10.0, 30.0));
        assert!(h.is_horizontal());

        let v = Segment::vertical(4.0, 90.0, 10.0);
        assert_eq!((v.y1, v.y2), (10.0, 90.0));
        assert!(v.is_vertical());
    }

    #[test]
    fn test_pixel_rect_bounding_empty() {
        assert!(PixelRect::bounding(&[]).is_none());
    }

    #[test]
    fn test_pixel_rect_bounding_single_pixel() {
        let r = PixelRect::bounding(&[PixelPoint::new(7, 8)]).unwrap();
        assert_eq!(r, PixelRect::new(7, 8, 1, 1));
        assert_eq!(r.area(), 1);
    }

    #[test]
    fn test_pixel_segment_from_vertical_rect() {
        // 3px wide line at columns 49..=51, rows 49..=201
        let rect = PixelRect::new(49, 49, 3, 153);
        let seg = PixelSegment::from_rect(&rect, Orientation::Vertical);
        assert_eq!((seg.x1, seg.y1, seg.x2, seg.y2), (50, 202, 50, 49));
    }

    #[test]
    fn test_pixel_segment_from_horizontal_rect() {
        let rect = PixelRect::new(49, 99, 203, 3);
        let seg = PixelSegment::from_rect(&rect, Orientation::Horizontal);
        assert_eq!((seg.x1, seg.y1, seg.x2, seg.y2), (49, 100, 252, 100));
    }
}
