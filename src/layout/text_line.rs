//! Text fragments supplied by the external layout parser.
//!
//! A [`TextLine`] is one run of text with a layout-space bounding box. When the
//! layout parser can decompose it, the line also carries its constituent
//! [`LineItem`]s: real glyphs with their own boxes, and virtual characters
//! (spaces, line breaks) the parser inserted without geometry.

use crate::geometry::{BBox, Orientation};

/// Reading direction of a text run.
pub type TextDirection = Orientation;

/// A single glyph with its layout-space box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    /// The character itself
    pub char: char,
    /// Bounding box of the glyph
    pub bbox: BBox,
}

impl TextChar {
    /// Create a new glyph.
    pub fn new(char: char, bbox: BBox) -> Self {
        Self { char, bbox }
    }

    /// Size metric used to spot super/subscripts.
    ///
    /// Horizontal text is compared by glyph height, vertical text by glyph width.
    pub fn size(&self, direction: TextDirection) -> f32 {
        match direction {
            TextDirection::Horizontal => self.bbox.height(),
            TextDirection::Vertical => self.bbox.width(),
        }
    }
}

/// One element of a decomposed text line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    /// A positioned glyph
    Char(TextChar),
    /// A character inserted by the layout parser (word space, line break)
    Virtual(char),
}

impl LineItem {
    /// The character this item contributes to the line's text.
    pub fn char(&self) -> char {
        match self {
            LineItem::Char(c) => c.char,
            LineItem::Virtual(c) => *c,
        }
    }
}

/// A text fragment: a run of characters in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Text content, including virtual characters
    pub text: String,
    /// Bounding box of the whole run
    pub bbox: BBox,
    /// Reading direction
    pub direction: TextDirection,
    /// Constituent glyphs; empty when the parser did not decompose the run
    pub items: Vec<LineItem>,
}

impl TextLine {
    /// Create an undecomposed fragment.
    pub fn new(text: impl Into<String>, bbox: BBox, direction: TextDirection) -> Self {
        Self {
            text: text.into(),
            bbox,
            direction,
            items: Vec::new(),
        }
    }

    /// Build a fragment from its items.
    ///
    /// The bounding box is the union of the glyph boxes and the text is the
    /// concatenation of every item. Returns `None` when there is no positioned
    /// glyph to derive a box from.
    ///
    /// # Examples
    ///
    /// ```
    /// use lattice_oxide::geometry::{BBox, Orientation};
    /// use lattice_oxide::layout::{LineItem, TextChar, TextLine};
    ///
    /// let line = TextLine::from_items(
    ///     vec![
    ///         LineItem::Char(TextChar::new('a', BBox::new(0.0, 0.0, 5.0, 10.0))),
    ///         LineItem::Virtual(' '),
    ///         LineItem::Char(TextChar::new('b', BBox::new(8.0, 0.0, 13.0, 10.0))),
    ///     ],
    ///     Orientation::Horizontal,
    /// )
    /// .unwrap();
    /// assert_eq!(line.text, "a b");
    /// assert_eq!(line.bbox, BBox::new(0.0, 0.0, 13.0, 10.0));
    /// ```
    pub fn from_items(items: Vec<LineItem>, direction: TextDirection) -> Option<Self> {
        let bbox = items
            .iter()
            .filter_map(|item| match item {
                LineItem::Char(c) => Some(c.bbox),
                LineItem::Virtual(_) => None,
            })
            .reduce(|acc, b| acc.union(&b))?;
        let text = items.iter().map(LineItem::char).collect();
        Some(Self {
            text,
            bbox,
            direction,
            items,
        })
    }

    /// Build a horizontal fragment by laying out `text` glyph by glyph.
    ///
    /// Each glyph is `advance` wide and spans `y0..y1`; spaces become
    /// positioned glyphs too. Handy for fixtures and synthetic pages.
    pub fn horizontal_run(text: &str, x0: f32, y0: f32, y1: f32, advance: f32) -> Option<Self> {
        let items = text
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let left = x0 + i as f32 * advance;
                LineItem::Char(TextChar::new(c, BBox::new(left, y0, left + advance, y1)))
            })
            .collect();
        Self::from_items(items, TextDirection::Horizontal)
    }

    /// Positioned glyphs of the line, in order.
    pub fn chars(&self) -> impl Iterator<Item = &TextChar> {
        self.items.iter().filter_map(|item| match item {
            LineItem::Char(c) => Some(c),
            LineItem::Virtual(_) => None,
        })
    }

    /// True when the fragment has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
