//! Placing text fragments into grid cells.
//!
//! A fragment is scoped to a region with [`filter_in_bbox`], located with
//! [`locate_cell`], optionally cut at ruling lines with [`split_across_cells`],
//! and finally moved out of spanned sub-cells with [`resolve_span`].

use std::collections::HashSet;

use crate::geometry::{BBox, Segment};
use crate::layout::{LineItem, TextDirection, TextLine};
use crate::lattice::grid::{Edge, Table};

/// Geometry that can be scoped to a table region.
pub trait InBBox {
    /// Whether `self` belongs to `bbox`, allowing `tol` slack on every side.
    fn in_bbox(&self, bbox: &BBox, tol: f32) -> bool;
}

impl InBBox for Segment {
    fn in_bbox(&self, bbox: &BBox, tol: f32) -> bool {
        if self.is_vertical() {
            self.y1 > bbox.bottom() - tol
                && self.y2 < bbox.top() + tol
                && bbox.left() - tol <= self.x1
                && self.x1 <= bbox.right() + tol
        } else {
            self.x1 > bbox.left() - tol
                && self.x2 < bbox.right() + tol
                && bbox.bottom() - tol <= self.y1
                && self.y1 <= bbox.top() + tol
        }
    }
}

impl InBBox for TextLine {
    fn in_bbox(&self, bbox: &BBox, tol: f32) -> bool {
        bbox.expand(tol).contains_point(&self.bbox.center())
    }
}

/// Keep the items that belong to `bbox`.
///
/// # Examples
///
/// ```
/// use lattice_oxide::geometry::{BBox, Segment};
/// use lattice_oxide::lattice::assign::filter_in_bbox;
///
/// let region = BBox::new(0.0, 0.0, 100.0, 100.0);
/// let lines = [Segment::vertical(50.0, 0.0, 100.0), Segment::vertical(300.0, 0.0, 100.0)];
/// assert_eq!(filter_in_bbox(&region, &lines, 2.0).len(), 1);
/// ```
pub fn filter_in_bbox<T: InBBox + Clone>(bbox: &BBox, items: &[T], tol: f32) -> Vec<T> {
    items.iter().filter(|item| item.in_bbox(bbox, tol)).cloned().collect()
}

/// Where a fragment landed and how badly it fits there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLocation {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Overflow of the fragment past the cell, relative to its size; 0 when contained
    pub error: f32,
}

/// Find the cell a fragment belongs to.
///
/// The row is the first whose band strictly contains the fragment's vertical
/// centre. Within it each column is scored by the share of the fragment's
/// width it overlaps (`-1` when disjoint) and the best score wins, leftmost on
/// ties. Returns `None` when no row contains the centre.
pub fn locate_cell(table: &Table, fragment: &TextLine) -> Option<CellLocation> {
    let b = &fragment.bbox;
    let cy = b.center().y;
    let row = table.rows.iter().position(|r| r.bottom < cy && cy < r.top)?;

    let width = b.width().max(1.0);
    let height = b.height().max(1.0);
    let (x0, x1) = (b.left(), b.right());

    let mut col = 0;
    let mut best = f32::NEG_INFINITY;
    for (i, c) in table.cols.iter().enumerate() {
        let score = if c.left <= x1 && c.right >= x0 {
            (x1.min(c.right) - x0.max(c.left)) / width
        } else {
            -1.0
        };
        if score > best {
            best = score;
            col = i;
        }
    }
    if best < 0.0 {
        log::warn!(
            "{:?} lies outside the table columns: text x-range ({}, {}), columns ({}, {})",
            fragment.text.trim(),
            x0,
            x1,
            table.cols.first().map_or(0.0, |c| c.left),
            table.cols.last().map_or(0.0, |c| c.right),
        );
    }

    let cell = table.cell(row, col)?;
    let top = (b.top() - cell.y2).max(0.0);
    let bottom = (cell.y1 - b.bottom()).max(0.0);
    let left = (cell.x1 - b.left()).max(0.0);
    let right = (b.right() - cell.x2).max(0.0);
    let error = (width * (top + bottom) + height * (left + right)) / (width * height);

    Some(CellLocation { row, col, error })
}

/// Move a position out of a spanned sub-cell.
///
/// For each direction in order, a spanning cell is walked along that
/// direction until a cell closed on that side is reached. `Left`/`Right` only
/// apply to horizontally spanning cells, `Top`/`Bottom` to vertical ones. The
/// walk never leaves the grid.
pub fn resolve_span(table: &Table, row: usize, col: usize, directions: &[Edge]) -> (usize, usize) {
    let (n_rows, n_cols) = table.shape();
    let (mut row, mut col) = (row, col);
    if table.cell(row, col).is_none() {
        return (row, col);
    }

    for &edge in directions {
        let cell = &table.cells[row][col];
        match edge {
            Edge::Left if cell.hspan => {
                while col > 0 && !table.cells[row][col].left {
                    col -= 1;
                }
            },
            Edge::Right if cell.hspan => {
                while col + 1 < n_cols && !table.cells[row][col].right {
                    col += 1;
                }
            },
            Edge::Top if cell.vspan => {
                while row > 0 && !table.cells[row][col].top {
                    row -= 1;
                }
            },
            Edge::Bottom if cell.vspan => {
                while row + 1 < n_rows && !table.cells[row][col].bottom {
                    row += 1;
                }
            },
            _ => {},
        }
    }
    (row, col)
}

/// A piece of text bound for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Text to append to the cell
    pub text: String,
}

/// Outcome of cutting a fragment at ruling lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitText {
    /// Ordered per-cell pieces; consecutive pieces never share a cell
    Cells(Vec<CellText>),
    /// The fragment could not be placed; holds its raw text
    Unplaced(String),
}

/// Cut a fragment that crosses ruling lines into per-cell pieces.
///
/// For horizontal text the candidate cuts are the overlapped columns whose
/// cell (in the fragment's row) is closed on the right, each keyed by that
/// right edge. A glyph goes to the first cut its centre does not pass, or to
/// the last cut when it passes all of them. Vertical text works the same way
/// with rows and bottom edges. Virtual characters follow the previous glyph.
///
/// With `flag_size` set, each piece is rendered by [`flag_font_size`]. Any of
/// the characters in `strip` are removed from the pieces.
pub fn split_across_cells(table: &Table, fragment: &TextLine, flag_size: bool, strip: &str) -> SplitText {
    if fragment.is_empty() {
        return SplitText::Cells(Vec::new());
    }
    let Some(cuts) = find_cuts(table, fragment) else {
        log::warn!("Could not split {:?} across cells", fragment.text.trim());
        return SplitText::Unplaced(fragment.text.clone());
    };

    let mut keyed: Vec<((usize, usize), LineItem)> = Vec::with_capacity(fragment.items.len());
    if fragment.items.is_empty() {
        let key = cuts.key_for(fragment.bbox.center().x, fragment.bbox.center().y);
        keyed.extend(fragment.text.chars().map(|c| (key, LineItem::Virtual(c))));
    } else {
        let mut last = cuts.first();
        for item in &fragment.items {
            let key = match item {
                LineItem::Char(c) => {
                    let center = c.bbox.center();
                    cuts.key_for(center.x, center.y)
                },
                LineItem::Virtual(_) => last,
            };
            last = key;
            keyed.push((key, item.clone()));
        }
    }

    let mut pieces: Vec<((usize, usize), Vec<LineItem>)> = Vec::new();
    for (key, item) in keyed {
        match pieces.last_mut() {
            Some((k, items)) if *k == key => items.push(item),
            _ => pieces.push((key, vec![item])),
        }
    }

    SplitText::Cells(
        pieces
            .into_iter()
            .map(|((row, col), items)| {
                let text = if flag_size {
                    flag_font_size(&items, fragment.direction)
                } else {
                    items.iter().map(LineItem::char).collect()
                };
                CellText {
                    row,
                    col,
                    text: strip_text(&text, strip),
                }
            })
            .collect(),
    )
}

/// Candidate cut boundaries of one fragment.
struct Cuts {
    direction: TextDirection,
    /// Band of the fixed row (or column) the fragment lives in
    band: (f32, f32),
    /// `((row, col), boundary)`, in reading order
    cuts: Vec<((usize, usize), f32)>,
}

impl Cuts {
    fn first(&self) -> (usize, usize) {
        self.cuts[0].0
    }

    fn key_for(&self, cx: f32, cy: f32) -> (usize, usize) {
        let (lo, hi) = self.band;
        let hit = self.cuts.iter().find(|(_, boundary)| match self.direction {
            TextDirection::Horizontal => lo <= cy && cy <= hi && cx <= *boundary,
            TextDirection::Vertical => lo <= cx && cx <= hi && cy >= *boundary,
        });
        match hit {
            Some((key, _)) => *key,
            None => self.cuts[self.cuts.len() - 1].0,
        }
    }
}

fn find_cuts(table: &Table, fragment: &TextLine) -> Option<Cuts> {
    let b = &fragment.bbox;
    let center = b.center();
    match fragment.direction {
        TextDirection::Horizontal => {
            let row = table
                .rows
                .iter()
                .position(|r| r.bottom <= center.y && center.y <= r.top)?;
            let overlap: Vec<usize> = table
                .cols
                .iter()
                .enumerate()
                .filter(|(_, c)| c.left <= b.right() && b.left() <= c.right)
                .map(|(i, _)| i)
                .collect();
            let first = *overlap.first()?;
            let mut cuts: Vec<((usize, usize), f32)> = overlap
                .iter()
                .filter_map(|&c| {
                    let cell = table.cell(row, c)?;
                    cell.right.then_some(((row, c), cell.x2))
                })
                .collect();
            if cuts.is_empty() {
                let last = table.cells[row].last()?;
                cuts.push(((row, first), last.x2));
            }
            Some(Cuts {
                direction: TextDirection::Horizontal,
                band: (table.rows[row].bottom, table.rows[row].top),
                cuts,
            })
        },
        TextDirection::Vertical => {
            let col = table
                .cols
                .iter()
                .position(|c| c.left <= center.x && center.x <= c.right)?;
            let overlap: Vec<usize> = table
                .rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r.bottom <= b.top() && b.bottom() <= r.top)
                .map(|(i, _)| i)
                .collect();
            let first = *overlap.first()?;
            let mut cuts: Vec<((usize, usize), f32)> = overlap
                .iter()
                .filter_map(|&r| {
                    let cell = table.cell(r, col)?;
                    cell.bottom.then_some(((r, col), cell.y1))
                })
                .collect();
            if cuts.is_empty() {
                let last = table.cells.last()?.get(col)?;
                cuts.push(((first, col), last.y1));
            }
            Some(Cuts {
                direction: TextDirection::Vertical,
                band: (table.cols[col].left, table.cols[col].right),
                cuts,
            })
        },
    }
}

/// Render a run of items, marking the smallest glyphs with `<s>`…`</s>`.
///
/// When the positioned glyphs come in more than one size, consecutive
/// same-size glyphs are grouped, the groups at the minimum size are wrapped in
/// markers, whitespace-only groups are dropped, and virtual characters are
/// left out. Otherwise the items are concatenated unchanged. Meant for
/// spotting super/subscripts; it is a heuristic.
///
/// # Examples
///
/// ```
/// use lattice_oxide::geometry::{BBox, Orientation};
/// use lattice_oxide::layout::{LineItem, TextChar};
/// use lattice_oxide::lattice::assign::flag_font_size;
///
/// let items = vec![
///     LineItem::Char(TextChar::new('m', BBox::new(0.0, 0.0, 6.0, 10.0))),
///     LineItem::Char(TextChar::new('2', BBox::new(6.0, 6.0, 9.0, 11.0))),
/// ];
/// assert_eq!(flag_font_size(&items, Orientation::Horizontal), "m<s>2</s>");
/// ```
pub fn flag_font_size(items: &[LineItem], direction: TextDirection) -> String {
    let sized: Vec<(char, i64)> = items
        .iter()
        .filter_map(|item| match item {
            LineItem::Char(c) => Some((c.char, size_key(c.size(direction)))),
            LineItem::Virtual(_) => None,
        })
        .collect();

    let distinct: HashSet<i64> = sized.iter().map(|(_, s)| *s).collect();
    if distinct.len() <= 1 {
        return items.iter().map(LineItem::char).collect();
    }
    let Some(min_size) = distinct.iter().min().copied() else {
        return String::new();
    };

    let mut out = String::new();
    let mut start = 0;
    while start < sized.len() {
        let size = sized[start].1;
        let end = sized[start..]
            .iter()
            .position(|(_, s)| *s != size)
            .map_or(sized.len(), |n| start + n);
        let group: String = sized[start..end].iter().map(|(c, _)| *c).collect();
        if !group.trim().is_empty() {
            if size == min_size {
                out.push_str("<s>");
                out.push_str(&group);
                out.push_str("</s>");
            } else {
                out.push_str(&group);
            }
        }
        start = end;
    }
    out
}

/// Glyph size rounded to six decimals, as an exact comparison key.
fn size_key(size: f32) -> i64 {
    (size as f64 * 1e6).round() as i64
}

/// Remove every character of `chars` from `text`.
pub fn strip_text(text: &str, chars: &str) -> String {
    if chars.is_empty() {
        return text.to_string();
    }
    text.chars().filter(|c| !chars.contains(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;
    use crate::layout::TextChar;
    use crate::lattice::grid::{ColumnInterval, RowInterval};

    fn table(rows: &[(f32, f32)], cols: &[(f32, f32)]) -> Table {
        Table::new(
            rows.iter().map(|&(top, bottom)| RowInterval { top, bottom }).collect(),
            cols.iter().map(|&(left, right)| ColumnInterval { left, right }).collect(),
        )
    }

    fn three_by_two() -> Table {
        let mut t = table(&[(300.0, 200.0), (200.0, 100.0), (100.0, 0.0)], &[(0.0, 100.0), (100.0, 200.0)]);
        t.set_all_edges();
        t
    }

    fn frag(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> TextLine {
        TextLine::new(text, BBox::new(x0, y0, x1, y1), Orientation::Horizontal)
    }

    #[test]
    fn test_filter_segments() {
        let region = BBox::new(0.0, 0.0, 100.0, 100.0);
        let segs = [
            Segment::vertical(101.0, 0.0, 100.0),
            Segment::vertical(50.0, -5.0, 100.0),
            Segment::horizontal(0.0, 100.0, -1.5),
            Segment::horizontal(0.0, 103.0, 50.0),
        ];
        let kept = filter_in_bbox(&region, &segs, 2.0);
        assert_eq!(kept, vec![segs[0], segs[2]]);
    }

    #[test]
    fn test_filter_text_by_center() {
        let region = BBox::new(0.0, 0.0, 100.0, 100.0);
        let lines = [
            frag("in", 90.0, 10.0, 110.0, 20.0),
            frag("edge", 100.0, 10.0, 104.0, 20.0),
            frag("out", 100.0, 10.0, 106.0, 20.0),
        ];
        let kept = filter_in_bbox(&region, &lines, 2.0);
        let texts: Vec<&str> = kept.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["in", "edge"]);
    }

    #[test]
    fn test_locate_contained_fragment() {
        let t = three_by_two();
        let loc = locate_cell(&t, &frag("Total", 30.0, 145.0, 70.0, 155.0)).unwrap();
        assert_eq!((loc.row, loc.col), (1, 0));
        assert_eq!(loc.error, 0.0);
    }

    #[test]
    fn test_locate_prefers_larger_overlap() {
        let t = three_by_two();
        let loc = locate_cell(&t, &frag("wide", 80.0, 245.0, 180.0, 255.0)).unwrap();
        assert_eq!((loc.row, loc.col), (0, 1));
        // 20 units stick out to the left, fragment is 100x10
        assert!((loc.error - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_locate_tie_goes_left() {
        let t = three_by_two();
        let loc = locate_cell(&t, &frag("mid", 90.0, 45.0, 110.0, 55.0)).unwrap();
        assert_eq!((loc.row, loc.col), (2, 0));
    }

    #[test]
    fn test_locate_outside_columns() {
        let t = three_by_two();
        let loc = locate_cell(&t, &frag("far", 300.0, 45.0, 310.0, 55.0)).unwrap();
        assert_eq!(loc.col, 0);
        assert!(loc.error > 0.0);
    }

    #[test]
    fn test_locate_no_row() {
        let t = three_by_two();
        assert!(locate_cell(&t, &frag("below", 10.0, -30.0, 20.0, -20.0)).is_none());
        // centre on a row boundary belongs to neither row
        assert!(locate_cell(&t, &frag("line", 10.0, 195.0, 20.0, 205.0)).is_none());
    }

    #[test]
    fn test_locate_degenerate_fragment() {
        let t = three_by_two();
        let loc = locate_cell(&t, &frag("", 50.0, 150.0, 50.0, 150.0)).unwrap();
        assert_eq!(loc.error, 0.0);
    }

    #[test]
    fn test_resolve_span_moves_to_bounded_cell() {
        // one column, rows 0 and 1 merged vertically
        let mut t = table(&[(300.0, 200.0), (200.0, 100.0), (100.0, 0.0)], &[(0.0, 100.0)]);
        t.set_border();
        t.set_edges(&[], &[Segment::horizontal(0.0, 100.0, 100.0)], 2.0);
        t.set_span();
        assert!(t.cells[1][0].vspan);

        assert_eq!(resolve_span(&t, 1, 0, &[Edge::Top]), (0, 0));
        assert_eq!(resolve_span(&t, 0, 0, &[Edge::Bottom]), (1, 0));
        assert_eq!(resolve_span(&t, 0, 0, &[Edge::Bottom, Edge::Top]), (0, 0));
        // no horizontal span, so left/right leave it alone
        assert_eq!(resolve_span(&t, 1, 0, &[Edge::Left, Edge::Right]), (1, 0));
    }

    #[test]
    fn test_resolve_span_stays_in_grid() {
        let mut t = table(&[(10.0, 0.0)], &[(0.0, 10.0), (10.0, 20.0)]);
        t.set_span();
        assert_eq!(resolve_span(&t, 0, 1, &[Edge::Right, Edge::Bottom]), (0, 1));
        assert_eq!(resolve_span(&t, 0, 1, &[Edge::Left, Edge::Top]), (0, 0));
    }

    fn split_fixture() -> Table {
        let mut t = table(&[(100.0, 0.0)], &[(0.0, 100.0), (100.0, 200.0)]);
        t.set_border();
        t.set_edges(&[Segment::vertical(100.0, 0.0, 100.0)], &[], 2.0);
        t
    }

    #[test]
    fn test_split_at_ruling_line() {
        let t = split_fixture();
        let line = TextLine::horizontal_run("left right", 50.0, 45.0, 55.0, 10.0).unwrap();
        let split = split_across_cells(&t, &line, false, "");
        assert_eq!(
            split,
            SplitText::Cells(vec![
                CellText {
                    row: 0,
                    col: 0,
                    text: "left ".to_string()
                },
                CellText {
                    row: 0,
                    col: 1,
                    text: "right".to_string()
                },
            ])
        );
    }

    #[test]
    fn test_split_virtual_chars_follow_previous() {
        let t = split_fixture();
        let glyph = |c, x0: f32| LineItem::Char(TextChar::new(c, BBox::new(x0, 45.0, x0 + 10.0, 55.0)));
        let line = TextLine::from_items(
            vec![glyph('a', 80.0), LineItem::Virtual(' '), glyph('b', 110.0), LineItem::Virtual('\n')],
            Orientation::Horizontal,
        )
        .unwrap();
        let SplitText::Cells(pieces) = split_across_cells(&t, &line, false, "\n") else {
            panic!("expected cells");
        };
        let texts: Vec<(usize, &str)> = pieces.iter().map(|p| (p.col, p.text.as_str())).collect();
        assert_eq!(texts, vec![(0, "a "), (1, "b")]);
    }

    #[test]
    fn test_split_without_interior_line() {
        // only the outer border closes the row: everything goes to the last column
        let mut t = table(&[(100.0, 0.0)], &[(0.0, 100.0), (100.0, 200.0)]);
        t.set_border();
        let line = TextLine::horizontal_run("spread", 70.0, 45.0, 55.0, 10.0).unwrap();
        let SplitText::Cells(pieces) = split_across_cells(&t, &line, false, "") else {
            panic!("expected cells");
        };
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].col, 1);
        assert_eq!(pieces[0].text, "spread");
    }

    #[test]
    fn test_split_vertical_text() {
        let mut t = table(&[(200.0, 100.0), (100.0, 0.0)], &[(0.0, 50.0)]);
        t.set_all_edges();
        let glyph = |c, y0: f32| LineItem::Char(TextChar::new(c, BBox::new(20.0, y0, 30.0, y0 + 10.0)));
        let line = TextLine::from_items(
            vec![glyph('u', 120.0), glyph('p', 110.0), glyph('d', 90.0), glyph('n', 80.0)],
            Orientation::Vertical,
        )
        .unwrap();
        let SplitText::Cells(pieces) = split_across_cells(&t, &line, false, "") else {
            panic!("expected cells");
        };
        let keyed: Vec<(usize, &str)> = pieces.iter().map(|p| (p.row, p.text.as_str())).collect();
        assert_eq!(keyed, vec![(0, "up"), (1, "dn")]);
    }

    #[test]
    fn test_split_outside_rows_is_unplaced() {
        let t = split_fixture();
        let line = TextLine::horizontal_run("lost", 10.0, 500.0, 510.0, 10.0).unwrap();
        assert_eq!(split_across_cells(&t, &line, false, ""), SplitText::Unplaced("lost".to_string()));
    }

    #[test]
    fn test_split_empty_fragment() {
        let t = split_fixture();
        let line = frag("  ", 10.0, 40.0, 20.0, 50.0);
        assert_eq!(split_across_cells(&t, &line, false, ""), SplitText::Cells(Vec::new()));
    }

    #[test]
    fn test_flag_font_size_uniform() {
        let line = TextLine::horizontal_run("a b", 0.0, 0.0, 10.0, 5.0).unwrap();
        assert_eq!(flag_font_size(&line.items, Orientation::Horizontal), "a b");
    }

    #[test]
    fn test_flag_font_size_marks_smallest_runs() {
        let big = |c, x: f32| LineItem::Char(TextChar::new(c, BBox::new(x, 0.0, x + 5.0, 10.0)));
        let small = |c, x: f32| LineItem::Char(TextChar::new(c, BBox::new(x, 5.0, x + 3.0, 10.0)));
        let items = vec![
            big('x', 0.0),
            small('2', 5.0),
            LineItem::Virtual(' '),
            big('+', 10.0),
            small(' ', 15.0),
            big('y', 18.0),
            small('3', 23.0),
        ];
        assert_eq!(flag_font_size(&items, Orientation::Horizontal), "x<s>2</s>+y<s>3</s>");
    }

    #[test]
    fn test_strip_text() {
        assert_eq!(strip_text(" 1,234\n", " ,\n"), "1234");
        assert_eq!(strip_text("keep", ""), "keep");
    }
}
