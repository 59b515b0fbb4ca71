//! Row/column partition and cell grid of one table region.
//!
//! Cells live in a dense `rows × cols` arena addressed by `(row, col)`. Row 0
//! is the top row and column 0 the leftmost; all geometry is in layout space.

use serde::Serialize;

use crate::geometry::{BBox, Point, Segment};
use crate::lattice::lines::merge_close_lines;
use crate::utils::safe_float_cmp;

/// One side of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Edge {
    /// Left side
    Left,
    /// Right side
    Right,
    /// Top side
    Top,
    /// Bottom side
    Bottom,
}

/// Horizontal band of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnInterval {
    /// Left boundary
    pub left: f32,
    /// Right boundary
    pub right: f32,
}

/// Vertical band of a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowInterval {
    /// Top boundary
    pub top: f32,
    /// Bottom boundary
    pub bottom: f32,
}

/// Turn a region and its joints into row and column intervals.
///
/// Joint coordinates plus the region's own edges are merged per axis within
/// `line_tol`; columns ascend left to right, rows descend top to bottom.
pub fn build_intervals(
    region: &BBox,
    joints: &[Point],
    line_tol: f32,
) -> (Vec<RowInterval>, Vec<ColumnInterval>) {
    let mut xs: Vec<f32> = joints.iter().map(|j| j.x).collect();
    xs.extend([region.x0, region.x1]);
    xs.sort_by(|a, b| safe_float_cmp(*a, *b));

    let mut ys: Vec<f32> = joints.iter().map(|j| j.y).collect();
    ys.extend([region.y0, region.y1]);
    ys.sort_by(|a, b| safe_float_cmp(*b, *a));

    let cols = merge_close_lines(&xs, line_tol)
        .windows(2)
        .map(|w| ColumnInterval {
            left: w[0],
            right: w[1],
        })
        .collect();
    let rows = merge_close_lines(&ys, line_tol)
        .windows(2)
        .map(|w| RowInterval {
            top: w[0],
            bottom: w[1],
        })
        .collect();
    (rows, cols)
}

/// A grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Left x
    pub x1: f32,
    /// Bottom y
    pub y1: f32,
    /// Right x
    pub x2: f32,
    /// Top y
    pub y2: f32,
    /// A ruling line closes the left side
    pub left: bool,
    /// A ruling line closes the right side
    pub right: bool,
    /// A ruling line closes the top side
    pub top: bool,
    /// A ruling line closes the bottom side
    pub bottom: bool,
    /// Merged with a horizontal neighbour
    pub hspan: bool,
    /// Merged with a vertical neighbour
    pub vspan: bool,
    text: String,
}

impl Cell {
    /// Create an open cell with the given corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            left: false,
            right: false,
            top: false,
            bottom: false,
            hspan: false,
            vspan: false,
            text: String::new(),
        }
    }

    /// Number of closed sides, 0 to 4.
    pub fn bound(&self) -> u8 {
        self.left as u8 + self.right as u8 + self.top as u8 + self.bottom as u8
    }

    /// Whether the given side is closed.
    pub fn has_edge(&self, edge: Edge) -> bool {
        match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// The cell's box.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Accumulated text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append text; cell text only ever grows.
    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

/// The cell grid of one table region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Row bands, top to bottom
    pub rows: Vec<RowInterval>,
    /// Column bands, left to right
    pub cols: Vec<ColumnInterval>,
    /// `cells[row][col]`
    pub cells: Vec<Vec<Cell>>,
}

impl Table {
    /// Create the grid; `cells[r][c]` spans `cols[c]` horizontally and `rows[r]` vertically.
    pub fn new(rows: Vec<RowInterval>, cols: Vec<ColumnInterval>) -> Self {
        let cells = rows
            .iter()
            .map(|r| cols.iter().map(|c| Cell::new(c.left, r.bottom, c.right, r.top)).collect())
            .collect();
        Self { rows, cols, cells }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// True when the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Mutable cell at `(row, col)`.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Close every side of every cell.
    pub fn set_all_edges(&mut self) -> &mut Self {
        for cell in self.cells.iter_mut().flatten() {
            cell.left = true;
            cell.right = true;
            cell.top = true;
            cell.bottom = true;
        }
        self
    }

    /// Close cell sides that coincide with detected ruling lines.
    ///
    /// A segment is matched to a column (row) boundary within `tol`, and to the
    /// run of rows (columns) its extent covers. Segments that match no boundary
    /// are ignored.
    pub fn set_edges(&mut self, vertical: &[Segment], horizontal: &[Segment], tol: f32) -> &mut Self {
        if self.is_empty() {
            return self;
        }
        let close = |a: f32, b: f32| (a - b).abs() <= tol;
        let (n_rows, n_cols) = self.shape();

        for v in vertical {
            // the segment's upper end opens the row run
            let Some(start) = self.rows.iter().position(|r| close(v.y2, r.top)) else {
                continue;
            };
            let end = self
                .rows
                .iter()
                .position(|r| close(v.y1, r.top))
                .unwrap_or(n_rows);

            if let Some(col) = self.cols.iter().position(|c| close(v.x1, c.left)) {
                for row in start..end {
                    self.cells[row][col].left = true;
                    if col > 0 {
                        self.cells[row][col - 1].right = true;
                    }
                }
            } else if close(v.x1, self.cols[n_cols - 1].right) {
                for row in start..end {
                    self.cells[row][n_cols - 1].right = true;
                }
            }
        }

        for h in horizontal {
            let Some(start) = self.cols.iter().position(|c| close(h.x1, c.left)) else {
                continue;
            };
            let end = self
                .cols
                .iter()
                .position(|c| close(h.x2, c.left))
                .unwrap_or(n_cols);

            if let Some(row) = self.rows.iter().position(|r| close(h.y1, r.top)) {
                for col in start..end {
                    self.cells[row][col].top = true;
                    if row > 0 {
                        self.cells[row - 1][col].bottom = true;
                    }
                }
            } else if close(h.y1, self.rows[n_rows - 1].bottom) {
                for col in start..end {
                    self.cells[n_rows - 1][col].bottom = true;
                }
            }
        }
        self
    }

    /// Close the outer boundary of the table.
    pub fn set_border(&mut self) -> &mut Self {
        if self.is_empty() {
            return self;
        }
        let (n_rows, n_cols) = self.shape();
        for row in self.cells.iter_mut() {
            row[0].left = true;
            row[n_cols - 1].right = true;
        }
        for col in 0..n_cols {
            self.cells[0][col].top = true;
            self.cells[n_rows - 1][col].bottom = true;
        }
        self
    }

    /// Infer spanning cells from their open sides.
    ///
    /// Cells bounded on one side or none are flagged as spanning both ways.
    /// That is a heuristic: it cannot tell a missed ruling line from a genuinely
    /// merged block.
    pub fn set_span(&mut self) -> &mut Self {
        for cell in self.cells.iter_mut().flatten() {
            let (left, right, top, bottom) = (cell.left, cell.right, cell.top, cell.bottom);
            match cell.bound() {
                4 => {},
                3 => {
                    if !left || !right {
                        cell.hspan = true;
                    } else if !top || !bottom {
                        cell.vspan = true;
                    }
                },
                2 => {
                    if left && right {
                        cell.hspan = true;
                    } else if top && bottom {
                        cell.vspan = true;
                    }
                },
                _ => {
                    cell.hspan = true;
                    cell.vspan = true;
                },
            }
        }
        self
    }

    /// Cell text as trimmed strings, row-major.
    pub fn data(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.text().trim().to_string()).collect())
            .collect()
    }
}
