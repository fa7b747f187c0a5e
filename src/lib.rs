//! A small text layout engine.
//!
//! The engine turns a string and a font face into positioned lines of
//! glyphs under per-line box constraints:
//!
//! - Shaping is delegated to [rustybuzz] through the [`Face`] trait, which
//!   also carries the font's vertical metrics.
//! - Break opportunities are classified per UAX #14 via [unicode-linebreak]
//!   before any flow runs.
//! - The flow engine folds the shaped run greedily into [`Line`]s, backing
//!   up to the last allowed break when a glyph overflows, and optionally
//!   justifies soft-wrapped lines by stretching inter-word gaps.
//! - The caret index maps text positions to baseline points and arbitrary
//!   points back to text positions.
//!
//! The central type is [`Layout`]: construct it once per text (shaping
//!   happens eagerly), then [`flow`](Layout::flow) it as often as the
//! available geometry changes.
//!
//! ```
//! use textflow::{Abs, Layout};
//! # use textflow::{Em, Face, FontMetrics, RawGlyph, Dir, Lang};
//! # struct Fixed;
//! # impl Face for Fixed {
//! #     fn metrics(&self) -> FontMetrics {
//! #         FontMetrics {
//! #             units_per_em: 1000.0,
//! #             ascent: Em::new(0.8),
//! #             descent: Em::new(0.2),
//! #             leading: Em::zero(),
//! #         }
//! #     }
//! #     fn shape(&self, text: &str, _: Dir, _: Lang) -> Vec<RawGlyph> {
//! #         text.char_indices()
//! #             .map(|(i, _)| RawGlyph {
//! #                 id: 0,
//! #                 cluster: i,
//! #                 x_advance: Em::one(),
//! #                 y_advance: Em::zero(),
//! #                 x_offset: Em::zero(),
//! #                 y_offset: Em::zero(),
//! #             })
//! #             .collect()
//! #     }
//! # }
//! # let face = Fixed;
//! let mut layout = Layout::new(face, Abs::pt(10.0), "hello world");
//! layout.flow(Abs::pt(80.0), false);
//! assert_eq!(layout.num_lines(), 2);
//! ```
//!
//! [rustybuzz]: https://github.com/harfbuzz/rustybuzz
//! [unicode-linebreak]: https://github.com/axelf4/unicode-linebreak

pub mod caret;
pub mod error;
pub mod flow;
pub mod font;
pub mod geom;
pub mod linebreak;
pub mod shaping;

pub use crate::error::{FontError, FontResult, LayoutError, LayoutResult};
pub use crate::flow::{Line, LineGeometry};
pub use crate::font::{Bytes, Face, Font, FontMetrics};
pub use crate::geom::{Abs, Em, Point, Scalar};
pub use crate::linebreak::BreakClass;
pub use crate::shaping::{Dir, GlyphRun, Lang, RawGlyph, ShapedGlyph};

/// A laid-out text.
///
/// Owns the text, the shaped glyph run, and (after a flow) the line list
/// and per-glyph positions. The run is a pure function of the face and the
/// text, so it is shaped once at construction and survives re-flows; a
/// flow replaces the lines and positions wholesale.
///
/// A layout is single-threaded: flowing and querying it require exclusive
/// access, but the value moves freely across threads when its face does.
#[derive(Debug, Clone)]
pub struct Layout<F: Face = Font> {
    face: F,
    font_size: Abs,
    text: String,
    classes: Vec<BreakClass>,
    run: GlyphRun,
    positions: Vec<Point>,
    lines: Vec<Line>,
    ascent: Abs,
    line_height: Abs,
}

/// A glyph with its final position, as handed to a renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PlacedGlyph {
    /// The glyph's id in the face.
    pub id: u16,
    /// The byte offset of the glyph's cluster in the text.
    pub cluster: usize,
    /// The glyph's position, on the baseline.
    pub position: Point,
    /// The glyph's horizontal advance.
    pub x_advance: Abs,
}

impl<F: Face> Layout<F> {
    /// Create a layout for the text, shaping it with the face.
    ///
    /// The text is not yet flowed into lines; call [`flow`](Self::flow) or
    /// [`flow_with`](Self::flow_with) before querying lines or carets.
    pub fn new(face: F, font_size: Abs, text: &str) -> Self {
        let classes = linebreak::classify(text);
        let run = shaping::shape(&face, text, Dir::Ltr, Lang::ENGLISH);
        let metrics = face.metrics();
        Self {
            ascent: metrics.ascent.at(font_size),
            line_height: metrics.line_height().at(font_size),
            face,
            font_size,
            text: text.into(),
            classes,
            run,
            positions: vec![],
            lines: vec![],
        }
    }

    /// Create a layout from raw bytes, failing fast if they are not valid
    /// UTF-8.
    pub fn from_bytes(face: F, font_size: Abs, bytes: &[u8]) -> LayoutResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| LayoutError::InvalidUtf8)?;
        Ok(Self::new(face, font_size, text))
    }

    /// Flow the text into lines of a single fixed width.
    ///
    /// The line height comes from the face's metrics. With `justify`, every
    /// soft-wrapped line except the last is stretched to the full width.
    pub fn flow(&mut self, width: Abs, justify: bool) {
        // Always from the metrics, even if a previous `flow_with` ran with
        // a custom line height.
        let line_height = self.face.metrics().line_height().at(self.font_size);
        self.flow_with(|_| LineGeometry { offset: Abs::zero(), width }, line_height, justify);
    }

    /// Flow the text into lines whose boxes the caller chooses per line.
    ///
    /// `geometry` is called once per line with the line's top `y` and must
    /// be a pure function of it, or repeated flows of the same layout will
    /// diverge. Any previous flow's lines and positions are discarded.
    pub fn flow_with<G>(&mut self, geometry: G, line_height: Abs, justify: bool)
    where
        G: FnMut(Abs) -> LineGeometry,
    {
        self.line_height = line_height;
        flow::flow(
            &self.run,
            self.text.len(),
            &self.classes,
            geometry,
            self.font_size,
            self.ascent,
            line_height,
            justify,
            &mut self.positions,
            &mut self.lines,
        );
    }

    /// The laid-out lines. Empty until the first flow.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The number of laid-out lines.
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// The positioned glyphs a renderer should draw for this line.
    ///
    /// Yields only the visible glyphs: trailing whitespace and consumed
    /// break characters are skipped.
    pub fn glyphs_of<'a>(&'a self, line: &'a Line) -> impl Iterator<Item = PlacedGlyph> + 'a {
        line.visible.clone().map(|i| {
            let glyph = &self.run.glyphs[i];
            PlacedGlyph {
                id: glyph.id,
                cluster: glyph.range.start,
                position: self.positions[i],
                x_advance: glyph.x_advance.at(self.font_size),
            }
        })
    }

    /// The baseline point at which a caret for the text index should be
    /// drawn.
    ///
    /// Out-of-range indices clamp to the text and indices inside a char or
    /// cluster snap to its start. Before the first flow, this is the
    /// origin.
    pub fn caret_point(&self, index: usize) -> Point {
        caret::point_at(
            &self.lines,
            &self.run,
            &self.positions,
            &self.text,
            self.font_size,
            index,
        )
    }

    /// The caret index closest to the point.
    ///
    /// Total over the plane: points outside all lines clamp to the nearest
    /// one. Returns [`npos`](Self::npos) only before the first flow.
    pub fn caret_index(&self, x: Abs, y: Abs) -> usize {
        caret::index_at(
            &self.lines,
            &self.run,
            &self.positions,
            &self.text,
            self.font_size,
            self.ascent,
            self.line_height,
            Point::new(x, y),
        )
    }

    /// The sentinel index one past the last byte of the text.
    pub fn npos(&self) -> usize {
        self.text.len()
    }

    /// The break class in front of the next line boundary candidate at the
    /// byte index.
    ///
    /// Indexing at or past the end of the text reports a mandatory break.
    pub fn line_break(&self, index: usize) -> BreakClass {
        match self.classes.get(index) {
            Some(&class) => class,
            None => BreakClass::Mandatory,
        }
    }

    /// The word-boundary class at the byte index, per UAX #29.
    pub fn word_break(&self, index: usize) -> BreakClass {
        linebreak::word_bound(&self.text, index)
    }

    /// The laid-out text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The face the text was shaped with.
    pub fn face(&self) -> &F {
        &self.face
    }

    /// The font size.
    pub fn font_size(&self) -> Abs {
        self.font_size
    }
}
