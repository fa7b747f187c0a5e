//! End-to-end tests of the public API over a deterministic test face.
//!
//! The face maps every char to one glyph with a fixed advance of `1em`, so
//! at a font size of 10pt each char is exactly 10pt wide, the ascent is 8pt
//! and the line height is 10pt. That makes every expected position exact.

use textflow::{
    Abs, BreakClass, Dir, Em, Face, FontMetrics, Lang, Layout, LayoutError,
    LineGeometry, Point, RawGlyph,
};

struct FixedFace;

impl Face for FixedFace {
    fn metrics(&self) -> FontMetrics {
        FontMetrics {
            units_per_em: 1000.0,
            ascent: Em::new(0.8),
            descent: Em::new(0.2),
            leading: Em::zero(),
        }
    }

    fn shape(&self, text: &str, _: Dir, _: Lang) -> Vec<RawGlyph> {
        text.char_indices()
            .map(|(i, c)| RawGlyph {
                id: c as u16,
                cluster: i,
                x_advance: Em::one(),
                y_advance: Em::zero(),
                x_offset: Em::zero(),
                y_offset: Em::zero(),
            })
            .collect()
    }
}

const SIZE: Abs = Abs::pt(10.0);

fn layout(text: &str) -> Layout<FixedFace> {
    Layout::new(FixedFace, SIZE, text)
}

/// The clusters a renderer would draw for the line, as byte offsets.
fn visible_clusters(layout: &Layout<FixedFace>, line: usize) -> Vec<usize> {
    layout
        .glyphs_of(&layout.lines()[line])
        .map(|g| g.cluster)
        .collect()
}

fn assert_line_coverage(layout: &Layout<FixedFace>) {
    let lines = layout.lines();
    assert!(!lines.is_empty());
    assert_eq!(lines[0].text.start, 0);
    assert_eq!(lines[lines.len() - 1].text.end, layout.text().len());
    for pair in lines.windows(2) {
        assert_eq!(pair[0].text.end, pair[1].text.start);
    }
}

#[test]
fn test_soft_wrap_at_space() {
    let mut layout = layout("ab cd");
    layout.flow(Abs::pt(25.0), false);

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);

    // The space belongs to the first line's text but is not rendered.
    assert_eq!(lines[0].text, 0..3);
    assert_eq!(lines[1].text, 3..5);
    assert_eq!(visible_clusters(&layout, 0), vec![0, 1]);
    assert_eq!(visible_clusters(&layout, 1), vec![3, 4]);
    assert!(!lines[0].mandatory);

    // The second line restarts at the left edge, one line height down.
    let placed: Vec<_> = layout.glyphs_of(&lines[1]).collect();
    assert_eq!(placed[0].position, Point::new(Abs::zero(), Abs::pt(18.0)));
    assert_eq!(placed[1].position, Point::new(Abs::pt(10.0), Abs::pt(18.0)));

    assert_line_coverage(&layout);
}

#[test]
fn test_wide_line_does_not_wrap() {
    let mut layout = layout("ab cd");
    layout.flow(Abs::pt(50.0), false);
    assert_eq!(layout.num_lines(), 1);
    assert_eq!(visible_clusters(&layout, 0), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_mandatory_break_at_every_width() {
    // A newline splits the text at the same byte no matter how much or how
    // little room there is, and "line1"/"line2" have no other break
    // opportunities, so the count stays exactly two.
    for width in [1000.0, 60.0, 30.0, 0.0] {
        let mut layout = layout("line1\nline2");
        layout.flow(Abs::pt(width), false);

        let lines = layout.lines();
        assert_eq!(lines.len(), 2, "width {width}");
        assert_eq!(lines[0].text, 0..6);
        assert_eq!(lines[1].text, 6..11);
        assert!(lines[0].mandatory);
        // The newline itself is consumed.
        assert_eq!(visible_clusters(&layout, 0), vec![0, 1, 2, 3, 4]);
        assert_line_coverage(&layout);
    }
}

#[test]
fn test_unbreakable_text_overflows() {
    let mut layout = layout("hello");
    layout.flow(Abs::pt(20.0), false);
    assert_eq!(layout.num_lines(), 1);
    assert_eq!(layout.lines()[0].text, 0..5);
}

#[test]
fn test_space_run_breaks_after_last_space() {
    let mut layout = layout("a   b");
    layout.flow(Abs::pt(25.0), false);

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, 0..4);
    assert_eq!(visible_clusters(&layout, 0), vec![0]);
    assert_eq!(visible_clusters(&layout, 1), vec![4]);
}

#[test]
fn test_empty_text_has_one_line() {
    let mut layout = layout("");
    layout.flow(Abs::pt(100.0), false);

    assert_eq!(layout.num_lines(), 1);
    assert_eq!(layout.lines()[0].text, 0..0);
    assert_eq!(layout.caret_point(0), Point::new(Abs::zero(), Abs::pt(8.0)));
    assert_eq!(layout.caret_index(Abs::pt(50.0), Abs::pt(50.0)), 0);
}

#[test]
fn test_trailing_newline_yields_empty_final_line() {
    let mut layout = layout("a\n");
    layout.flow(Abs::pt(100.0), false);

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, 0..2);
    assert_eq!(lines[1].text, 2..2);

    // A caret after the newline sits at the start of the empty line.
    assert_eq!(layout.caret_point(2), Point::new(Abs::zero(), Abs::pt(18.0)));
}

#[test]
fn test_zero_width_degrades_per_cluster() {
    let mut layout = layout("a b");
    layout.flow(Abs::zero(), false);

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, 0..2);
    assert_eq!(lines[1].text, 2..3);
    assert_line_coverage(&layout);
}

#[test]
fn test_caret_round_trips_on_cluster_starts() {
    // "a   b" wraps after its last space, trimming a whole run of spaces
    // from the first line; their cluster starts must stay reachable.
    for text in ["ab cd", "a   b"] {
        let mut layout = layout(text);
        layout.flow(Abs::pt(25.0), false);

        for index in 0..=text.len() {
            let point = layout.caret_point(index);
            assert_eq!(
                layout.caret_index(point.x, point.y),
                index,
                "{text:?} index {index} via {point:?}"
            );
        }
    }
}

#[test]
fn test_caret_point_trailing_edge() {
    let mut layout = layout("ab cd");
    layout.flow(Abs::pt(25.0), false);

    // Index 2 addresses the consumed space on the first line.
    assert_eq!(layout.caret_point(2), Point::new(Abs::pt(20.0), Abs::pt(8.0)));
    // The end of the text is the trailing edge of the last glyph.
    assert_eq!(layout.caret_point(5), Point::new(Abs::pt(20.0), Abs::pt(18.0)));
    // Out of range clamps.
    assert_eq!(layout.caret_point(99), layout.caret_point(5));
}

#[test]
fn test_caret_index_clamps_to_visible_text() {
    let mut layout = layout("ab cd");
    layout.flow(Abs::pt(25.0), false);

    // Far right of the first line lands before the trimmed space, not
    // after it.
    assert_eq!(layout.caret_index(Abs::pt(500.0), Abs::pt(5.0)), 2);
    // Above and below the block clamp to the first and last line.
    assert_eq!(layout.caret_index(Abs::zero(), Abs::pt(-100.0)), 0);
    assert_eq!(layout.caret_index(Abs::zero(), Abs::pt(100.0)), 3);
}

#[test]
fn test_reflow_is_idempotent() {
    let mut layout = layout("the quick brown fox");
    layout.flow(Abs::pt(65.0), true);
    let first: Vec<Vec<_>> = layout
        .lines()
        .iter()
        .map(|line| layout.glyphs_of(line).collect())
        .collect();
    let lines = layout.lines().to_vec();

    layout.flow(Abs::pt(65.0), true);
    let second: Vec<Vec<_>> = layout
        .lines()
        .iter()
        .map(|line| layout.glyphs_of(line).collect())
        .collect();

    assert_eq!(layout.lines(), &lines[..]);
    assert_eq!(first, second);
}

#[test]
fn test_justify_fills_line() {
    // "aa bb cc dd" wraps after "cc" at width 85; the first line's two
    // inner gaps stretch by 2.5pt each so the line ends exactly at 85pt.
    let mut layout = layout("aa bb cc dd");
    layout.flow(Abs::pt(85.0), true);

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(visible_clusters(&layout, 0), vec![0, 1, 2, 3, 4, 5, 6, 7]);

    let placed: Vec<_> = layout.glyphs_of(&lines[0]).collect();
    // The first glyph stays put and the line's trailing edge hits the
    // full width.
    assert_eq!(placed[0].position.x, Abs::zero());
    let trailing = placed[7].position.x + placed[7].x_advance;
    assert!(trailing.approx_eq(Abs::pt(85.0)), "trailing edge {trailing:?}");
    // Each word after a gap shifts by one more share of the slack.
    assert!(placed[3].position.x.approx_eq(Abs::pt(32.5)));
    assert!(placed[6].position.x.approx_eq(Abs::pt(65.0)));

    // The last line is never justified.
    let last: Vec<_> = layout.glyphs_of(&lines[1]).collect();
    assert_eq!(last[0].position.x, Abs::zero());
    assert_eq!(last[1].position.x, Abs::pt(10.0));
}

#[test]
fn test_justify_skips_mandatory_lines() {
    let mut layout = layout("a b\ncd");
    layout.flow(Abs::pt(100.0), true);

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].mandatory);

    // Hard-broken lines keep their natural spacing.
    let placed: Vec<_> = layout.glyphs_of(&lines[0]).collect();
    assert_eq!(placed[2].position.x, Abs::pt(20.0));
}

#[test]
fn test_flow_with_non_rectangular_geometry() {
    // The first line is indented past an obstacle, later lines start at
    // the left edge.
    let mut layout = layout("ab cd");
    layout.flow_with(
        |y| LineGeometry {
            offset: if y < Abs::pt(5.0) { Abs::pt(20.0) } else { Abs::zero() },
            width: Abs::pt(25.0),
        },
        Abs::pt(10.0),
        false,
    );

    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].x, Abs::pt(20.0));
    assert_eq!(lines[1].x, Abs::zero());

    let first: Vec<_> = layout.glyphs_of(&lines[0]).collect();
    assert_eq!(first[0].position.x, Abs::pt(20.0));
    let second: Vec<_> = layout.glyphs_of(&lines[1]).collect();
    assert_eq!(second[0].position.x, Abs::zero());
}

#[test]
fn test_flow_uses_metrics_after_custom_line_height() {
    let mut layout = layout("a\nb");
    layout.flow_with(
        |_| LineGeometry { offset: Abs::zero(), width: Abs::pt(100.0) },
        Abs::pt(50.0),
        false,
    );
    assert_eq!(layout.lines()[1].baseline, Abs::pt(58.0));

    // The simple variant goes back to the face's own line height.
    layout.flow(Abs::pt(100.0), false);
    assert_eq!(layout.lines()[1].baseline, Abs::pt(18.0));
}

#[test]
fn test_from_bytes_rejects_invalid_utf8() {
    let result = Layout::from_bytes(FixedFace, SIZE, &[0x66, 0xff, 0xfe]);
    assert!(matches!(result, Err(LayoutError::InvalidUtf8)));
}

#[test]
fn test_break_queries() {
    let layout = layout("ab cd");
    assert_eq!(layout.line_break(0), BreakClass::Prohibited);
    assert_eq!(layout.line_break(2), BreakClass::Allowed);
    assert_eq!(layout.line_break(99), BreakClass::Mandatory);
    assert_eq!(layout.word_break(3), BreakClass::Allowed);
    assert_eq!(layout.word_break(4), BreakClass::Prohibited);
    assert_eq!(layout.npos(), 5);
}
