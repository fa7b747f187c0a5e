//! Mapping between text indices and visual positions.
//!
//! A caret index is a byte offset into the laid-out text, always on a
//! `char` boundary. `point_at` turns such an index into the pen position
//! where a caret should be drawn and `index_at` inverts that, resolving an
//! arbitrary point to the closest caret index.

use crate::flow::Line;
use crate::geom::{Abs, Point};
use crate::linebreak::is_forced_break;
use crate::shaping::GlyphRun;

/// The caret position for the text index, as a point on the baseline of
/// the index's line.
///
/// Indices are clamped to the text and snapped down to the nearest char
/// boundary. An index inside a line maps to the leading edge of its
/// glyph; the index just past a line's text maps to the trailing edge of
/// the line's last glyph.
pub(crate) fn point_at(
    lines: &[Line],
    run: &GlyphRun,
    positions: &[Point],
    text: &str,
    font_size: Abs,
    mut index: usize,
) -> Point {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }

    if lines.is_empty() {
        return Point::zero();
    }

    // The line whose text range contains the index. An index at the very
    // end of the text belongs to the last line.
    let i = lines
        .partition_point(|line| line.text.end <= index)
        .min(lines.len() - 1);
    let line = &lines[i];

    // Clusters never straddle a line break, so a containing glyph always
    // belongs to this line.
    if let Some(k) = run.glyph_at(index) {
        return Point::new(positions[k].x, line.baseline);
    }

    // No cluster contains the index. That happens when the shaper dropped
    // the text's leading glyphs (default ignorables), leaving a gap before
    // the first cluster; such indices sit at the line's leading edge.
    if run
        .glyphs
        .get(line.glyphs.start)
        .is_some_and(|g| index < g.range.start)
    {
        return Point::new(line.x, line.baseline);
    }

    // Past the line's glyphs: the trailing edge of the last one.
    match line.glyphs.end.checked_sub(1).filter(|&j| j >= line.glyphs.start) {
        Some(j) => Point::new(
            positions[j].x + run.glyphs[j].x_advance.at(font_size),
            line.baseline,
        ),
        None => Point::new(line.x, line.baseline),
    }
}

/// The caret index closest to the point.
///
/// Every point resolves to some index: points above the first line map
/// into it, points below the last line into that, and horizontally the
/// caret snaps to the closest edge of the hit glyph's cluster. Trimmed
/// trailing whitespace still owns caret positions, so points over it
/// resolve into the whitespace run; only far to the right of everything
/// does the caret land after the last addressable cluster, before a
/// consumed break character.
pub(crate) fn index_at(
    lines: &[Line],
    run: &GlyphRun,
    positions: &[Point],
    text: &str,
    font_size: Abs,
    ascent: Abs,
    line_height: Abs,
    point: Point,
) -> usize {
    if lines.is_empty() {
        return text.len();
    }

    // The line whose vertical band contains the point.
    let i = lines
        .partition_point(|line| line.baseline - ascent + line_height <= point.y)
        .min(lines.len() - 1);
    let line = &lines[i];

    // Trimmed trailing whitespace participates in the scan so that every
    // cluster start in it stays reachable; a consumed forced-break cluster
    // does not, because its positions belong to the next line.
    let mut scan_end = line.visible.end;
    while scan_end < line.glyphs.end && !is_forced_break(run.glyphs[scan_end].c) {
        scan_end += 1;
    }

    // Walk the glyphs and map the point onto the nearer cluster edge of
    // the glyph it falls into.
    for j in line.visible.start..scan_end {
        let glyph = &run.glyphs[j];
        let left = positions[j].x;
        let advance = glyph.x_advance.at(font_size);
        if point.x < left + advance / 2.0 {
            return glyph.range.start;
        }
        if point.x < left + advance {
            return glyph.range.end;
        }
    }

    // Past the line's content.
    if line.visible.end < line.glyphs.end {
        // The line ends in trimmed whitespace or a consumed break
        // character; the caret goes before it.
        run.glyphs[line.visible.end].range.start
    } else {
        line.text.end
    }
}
