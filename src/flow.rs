//! The flow engine.
//!
//! Folds a shaped glyph run into lines under caller-supplied per-line
//! geometry. The engine is an explicit state machine over integer cursors
//! into the glyph arena: it advances glyph by glyph, records each glyph's
//! pen position, and closes a line whenever it reaches a mandatory break or
//! overflows the line box with an allowed break available to back up to.

use std::ops::Range;

use crate::geom::{Abs, Point};
use crate::linebreak::BreakClass;
use crate::shaping::{GlyphRun, ShapedGlyph};

/// The box available to one line, as reported by the caller's line geometry
/// function.
///
/// The geometry function is consulted once per line, before that line's
/// content is known, which makes non-rectangular flow regions possible
/// (e.g. text wrapping around an obstacle). It must be a pure function of
/// the line's top `y`, or re-flows will not be reproducible.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineGeometry {
    /// The horizontal start of the line box.
    pub offset: Abs,
    /// The usable width of the line box.
    pub width: Abs,
}

/// A laid-out line.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Line {
    /// The line's byte range in the text.
    ///
    /// Line ranges are disjoint, in reading order, and concatenate to the
    /// full text; a consumed break character belongs to the line it ends.
    pub text: Range<usize>,
    /// The range of glyph indices whose clusters start in `text`.
    pub glyphs: Range<usize>,
    /// The subrange of `glyphs` that should be rendered: trailing
    /// whitespace (including a consumed break character) is trimmed.
    pub visible: Range<usize>,
    /// The horizontal offset of the line box used for this line.
    pub x: Abs,
    /// The width of the line box used for this line.
    pub width: Abs,
    /// The y position of the line's baseline.
    pub baseline: Abs,
    /// Whether the line ends at a mandatory break.
    pub mandatory: bool,
}

/// Flows the glyph run into lines, filling the `positions` arena (one pen
/// position per glyph) and the `lines` vector.
pub(crate) fn flow<G>(
    run: &GlyphRun,
    text_len: usize,
    classes: &[BreakClass],
    geometry: G,
    font_size: Abs,
    ascent: Abs,
    line_height: Abs,
    justify: bool,
    positions: &mut Vec<Point>,
    lines: &mut Vec<Line>,
) where
    G: FnMut(Abs) -> LineGeometry,
{
    positions.clear();
    positions.resize(run.glyphs.len(), Point::zero());
    lines.clear();

    let mut machine = Flow {
        glyphs: &run.glyphs,
        classes,
        geometry,
        font_size,
        ascent,
        line_height,
        positions: &mut *positions,
        lines: &mut *lines,
    };
    machine.run(text_len);

    if justify {
        let last = lines.len().saturating_sub(1);
        for line in &lines[..last] {
            if !line.mandatory {
                justify_line(line, &run.glyphs, classes, font_size, positions);
            }
        }
    }
}

/// The flow state machine.
struct Flow<'a, G> {
    glyphs: &'a [ShapedGlyph],
    classes: &'a [BreakClass],
    geometry: G,
    font_size: Abs,
    ascent: Abs,
    line_height: Abs,
    positions: &'a mut Vec<Point>,
    lines: &'a mut Vec<Line>,
}

impl<G: FnMut(Abs) -> LineGeometry> Flow<'_, G> {
    fn run(&mut self, text_len: usize) {
        let mut geo = (self.geometry)(Abs::zero());
        let mut state = State {
            cursor: 0,
            x: geo.offset,
            y: Abs::zero(),
            line_text: 0,
            line_glyph: 0,
            last_allowed: None,
        };
        let mut closed_mandatory = false;

        while state.cursor < self.glyphs.len() {
            let i = state.cursor;
            let glyph = &self.glyphs[i];

            // Record the pen position, then advance it.
            self.positions[i] = Point::new(state.x, state.y + self.ascent);
            state.x += glyph.x_advance.at(self.font_size);

            // A mandatory break always closes the line, independent of the
            // width.
            if self.classes[glyph.range.start] == BreakClass::Mandatory {
                self.close(&mut state, &mut geo, i, true);
                closed_mandatory = true;
                continue;
            }

            if self.classes[glyph.range.start] == BreakClass::Allowed {
                state.last_allowed = Some(i);
            }

            // If the glyph's trailing edge exceeds the line box, back up to
            // the most recent allowed break in this line. Without one, the
            // line is allowed to overflow: we never break inside a cluster.
            if !geo.width.fits(state.x - geo.offset) {
                if let Some(breakpoint) = state.last_allowed {
                    self.close(&mut state, &mut geo, breakpoint, false);
                    closed_mandatory = false;
                    continue;
                }
            }

            state.cursor += 1;
        }

        // The final partial span becomes the last line. Empty text and text
        // ending in a mandatory break still get a line, so that a caret
        // after the end of text is always addressable.
        if state.line_text < text_len || self.lines.is_empty() || closed_mandatory {
            let end = self.glyphs.len();
            let visible = self.trim(state.line_glyph..end);
            self.lines.push(Line {
                text: state.line_text..text_len,
                glyphs: state.line_glyph..end,
                visible,
                x: geo.offset,
                width: geo.width,
                baseline: state.y + self.ascent,
                mandatory: false,
            });
        }
    }

    /// Close the current line at the break glyph `breakpoint`.
    ///
    /// The break character's cluster is consumed: its bytes still belong to
    /// the closed line's text range, but it is trimmed from the visible
    /// range, and the next line starts with the glyph after its cluster.
    fn close(&mut self, state: &mut State, geo: &mut LineGeometry, breakpoint: usize, mandatory: bool) {
        let break_range = self.glyphs[breakpoint].range.clone();

        // Skip all glyphs of the break character's cluster.
        let mut end = breakpoint + 1;
        while self
            .glyphs
            .get(end)
            .is_some_and(|g| g.range.start < break_range.end)
        {
            end += 1;
        }

        let visible = self.trim(state.line_glyph..end);
        self.lines.push(Line {
            text: state.line_text..break_range.end,
            glyphs: state.line_glyph..end,
            visible,
            x: geo.offset,
            width: geo.width,
            baseline: state.y + self.ascent,
            mandatory,
        });

        // Thread the state to the next line.
        state.cursor = end;
        state.line_glyph = end;
        state.line_text = break_range.end;
        state.last_allowed = None;
        state.y += self.line_height;
        *geo = (self.geometry)(state.y);
        state.x = geo.offset;
    }

    /// Trim trailing whitespace glyphs from a line's glyph range.
    fn trim(&self, glyphs: Range<usize>) -> Range<usize> {
        let mut end = glyphs.end;
        while end > glyphs.start && self.glyphs[end - 1].is_whitespace() {
            end -= 1;
        }
        glyphs.start..end
    }
}

/// The threaded per-line state of the flow machine.
struct State {
    /// The next glyph to lay out.
    cursor: usize,
    /// The pen's x position.
    x: Abs,
    /// The top of the current line.
    y: Abs,
    /// The byte offset at which the current line starts.
    line_text: usize,
    /// The glyph index at which the current line starts.
    line_glyph: usize,
    /// The most recent allowed-break glyph in the current line.
    last_allowed: Option<usize>,
}

/// Stretch a line's inter-word gaps so that its rendered width exactly
/// fills the line box.
///
/// The slack is distributed evenly over the allowed-break clusters interior
/// to the visible range; glyphs downstream of each gap shift cumulatively.
/// Distribution is pure float accumulation, with no per-gap rounding. A
/// line without interior gaps is left untouched.
fn justify_line(
    line: &Line,
    glyphs: &[ShapedGlyph],
    classes: &[BreakClass],
    font_size: Abs,
    positions: &mut Vec<Point>,
) {
    if line.visible.is_empty() {
        return;
    }

    // A gap sits after an allowed-break cluster; leading and trailing gaps
    // don't participate. Only a cluster's first glyph counts.
    let eligible = |j: usize| {
        j > line.visible.start
            && j + 1 < line.visible.end
            && classes[glyphs[j].range.start] == BreakClass::Allowed
            && glyphs[j - 1].range.start != glyphs[j].range.start
    };

    let gaps = line.visible.clone().filter(|&j| eligible(j)).count();
    if gaps == 0 {
        return;
    }

    let last = line.visible.end - 1;
    let natural =
        positions[last].x + glyphs[last].x_advance.at(font_size) - line.x;
    let extra = (line.width - natural) / gaps as f64;

    let mut shift = Abs::zero();
    for j in line.glyphs.clone() {
        positions[j].x += shift;
        if eligible(j) {
            shift += extra;
        }
    }
}
