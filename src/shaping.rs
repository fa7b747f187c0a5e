//! The shaping adapter.
//!
//! Wraps the external shaping backend behind the [`Face`] seam and turns its
//! raw cluster indices into byte ranges that the flow engine and the caret
//! queries can work with directly.

use std::fmt::{self, Debug, Formatter};
use std::ops::Range;

use crate::font::Face;
use crate::geom::Em;

/// The dominant direction of a text run, passed to the shaping backend.
///
/// The flow engine itself only lays out left-to-right text; the hint exists
/// because the shaping collaborator's contract includes it.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Dir {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// An identifier for a natural language, passed to the shaping backend.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Lang([u8; 3], u8);

impl Lang {
    /// The code for English.
    pub const ENGLISH: Self = Self(*b"en ", 2);

    /// Construct a language from a two- or three-letter ISO 639 code.
    pub fn new(iso: &str) -> Option<Self> {
        let len = iso.len();
        if matches!(len, 2..=3) && iso.chars().all(|c| c.is_ascii_alphabetic()) {
            let mut bytes = *b"   ";
            bytes[..len].copy_from_slice(iso.as_bytes());
            bytes.make_ascii_lowercase();
            Some(Self(bytes, len as u8))
        } else {
            None
        }
    }

    /// The language code as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0[..usize::from(self.1)]).unwrap_or_default()
    }
}

impl Default for Lang {
    fn default() -> Self {
        Self::ENGLISH
    }
}

impl Debug for Lang {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single glyph record as produced by the shaping backend.
///
/// All lengths are font-relative; `cluster` is a byte offset into the shaped
/// text marking the start of the glyph's source cluster.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawGlyph {
    /// The glyph's index in the face.
    pub id: u16,
    /// The byte offset of the glyph's cluster in the shaped text.
    pub cluster: usize,
    /// The advance width of the glyph.
    pub x_advance: Em,
    /// The advance height of the glyph.
    pub y_advance: Em,
    /// The horizontal offset of the glyph.
    pub x_offset: Em,
    /// The vertical offset of the glyph.
    pub y_offset: Em,
}

/// A single glyph after adaptation.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ShapedGlyph {
    /// The glyph's index in the face.
    pub id: u16,
    /// The advance width of the glyph.
    pub x_advance: Em,
    /// The advance height of the glyph.
    pub y_advance: Em,
    /// The horizontal offset of the glyph.
    pub x_offset: Em,
    /// The vertical offset of the glyph.
    pub y_offset: Em,
    /// The byte range of this glyph's cluster in the text. A cluster is a
    /// sequence of one or multiple glyphs that cannot be separated and must
    /// always be treated as a union.
    ///
    /// The ranges of the glyphs in a [`GlyphRun`] do not overlap and are
    /// monotonically non-decreasing for left-to-right text.
    pub range: Range<usize>,
    /// The first char in this glyph's cluster.
    pub c: char,
}

impl ShapedGlyph {
    /// Whether the glyph's cluster starts with whitespace.
    ///
    /// Such glyphs are trimmed from a line's visible range when they trail
    /// it, and consumed break characters are always of this kind.
    pub fn is_whitespace(&self) -> bool {
        self.c.is_whitespace()
    }
}

/// The result of shaping text.
#[derive(Debug, Clone, Default)]
pub struct GlyphRun {
    /// The shaped glyphs in visual order.
    pub glyphs: Vec<ShapedGlyph>,
    /// The sum of all advance widths.
    pub width: Em,
}

impl GlyphRun {
    /// The index of the first glyph whose cluster contains `text_index`, if
    /// any glyph's cluster does.
    ///
    /// When a cluster maps to multiple glyphs, this returns the first of
    /// them, which carries the cluster's pen position.
    pub fn glyph_at(&self, text_index: usize) -> Option<usize> {
        let idx = self.glyphs.partition_point(|g| g.range.end <= text_index);
        self.glyphs
            .get(idx)
            .is_some_and(|g| g.range.start <= text_index)
            .then_some(idx)
    }
}

/// Shape text into a [`GlyphRun`].
///
/// Total over any input buffer: empty text produces an empty run and
/// unmapped codepoints surface as notdef glyphs, courtesy of the backend's
/// contract ([`Face::shape`]).
pub fn shape<F: Face>(face: &F, text: &str, dir: Dir, lang: Lang) -> GlyphRun {
    let raw = face.shape(text, dir, lang);
    let mut glyphs = Vec::with_capacity(raw.len());

    for (i, glyph) in raw.iter().enumerate() {
        // The cluster's byte range ends where the next differing cluster
        // begins: rustybuzz only reports start offsets.
        let start = glyph.cluster;
        let end = raw[i + 1..]
            .iter()
            .map(|next| next.cluster)
            .find(|&next| next != start)
            .unwrap_or(text.len());

        let c = text.get(start..).and_then(|s| s.chars().next()).unwrap_or('\u{FFFD}');

        glyphs.push(ShapedGlyph {
            id: glyph.id,
            x_advance: glyph.x_advance,
            y_advance: glyph.y_advance,
            x_offset: glyph.x_offset,
            y_offset: glyph.y_offset,
            range: start..end,
            c,
        });
    }

    #[cfg(debug_assertions)]
    assert_glyph_ranges_in_order(&glyphs);

    let width = glyphs.iter().map(|g| g.x_advance).sum();
    GlyphRun { glyphs, width }
}

/// Asserts that the ranges of `glyphs` are monotonically non-decreasing.
///
/// This asserts instead of returning a bool in order to provide a more
/// informative message when the invariant is violated.
#[cfg(debug_assertions)]
fn assert_glyph_ranges_in_order(glyphs: &[ShapedGlyph]) {
    for pair in glyphs.windows(2) {
        let [a, b] = pair else { return };
        if a.range.start > b.range.start {
            panic!(
                "glyph ranges should be monotonically non-decreasing, \
                 but found glyphs out of order:\n\n\
                 first: {a:#?}\nsecond: {b:#?}",
            );
        }
    }
}
