//! Font handling.

use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use ecow::eco_format;
use rustybuzz::{BufferFlags, UnicodeBuffer};

use crate::error::{FontError, FontResult};
use crate::geom::Em;
use crate::shaping::{Dir, Lang, RawGlyph};

/// A shared byte buffer that is cheap to clone and hash.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct Bytes(Arc<Vec<u8>>);

impl Bytes {
    /// Create a shared buffer from a vector.
    pub fn new(data: Vec<u8>) -> Self {
        Self(Arc::new(data))
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl Debug for Bytes {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Bytes({})", self.0.len())
    }
}

/// A typeface from which text can be shaped and measured.
///
/// This is the seam between the layout engine and its two external
/// collaborators: the font (metrics) and the shaping backend (glyph
/// selection). The engine calls [`shape`](Self::shape) once per layout and
/// treats the result as opaque; tests can substitute a deterministic face
/// with fixed advances to exercise the flow machinery without a shaping
/// backend.
pub trait Face {
    /// The face's vertical metrics.
    fn metrics(&self) -> FontMetrics;

    /// Shape a run of text, producing one record per glyph in visual order.
    ///
    /// Must be total over any input: codepoints the face cannot map come
    /// back as the notdef glyph (id 0) rather than failing, and empty text
    /// yields an empty vector. Cluster values are byte offsets into `text`
    /// and monotonically non-decreasing for left-to-right text.
    fn shape(&self, text: &str, dir: Dir, lang: Lang) -> Vec<RawGlyph>;
}

/// An OpenType font.
///
/// Values of this type are cheap to clone and hash.
#[derive(Clone)]
pub struct Font(Arc<Repr>);

/// The internal representation of a font.
struct Repr {
    /// The font's index in the buffer.
    index: u32,
    /// The font's metrics.
    metrics: FontMetrics,
    /// The underlying ttf-parser face.
    ttf: ttf_parser::Face<'static>,
    /// The underlying rustybuzz face.
    rusty: rustybuzz::Face<'static>,
    // NOTE: `ttf` and `rusty` reference `data`, so it's important for `data`
    // to be dropped after them or they will be left dangling while they're
    // dropped. Fields are dropped in declaration order, so `data` needs to be
    // declared after `ttf` and `rusty`.
    /// The raw font data, possibly shared with other fonts from the same
    /// collection. The allocation must not move, because `ttf` points into
    /// it using unsafe code.
    data: Bytes,
}

impl Font {
    /// Parse a font from data and collection index.
    pub fn new(data: Bytes, index: u32) -> FontResult<Self> {
        let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
        if index >= count {
            return Err(FontError::MissingFace(index));
        }

        // Safety:
        // - The slice's location is stable in memory:
        //   - We don't move the underlying vector
        //   - Nobody else can move it since we have a strong ref to the `Arc`.
        // - The internal 'static lifetime is not leaked because it's rewritten
        //   to the self-lifetime in `ttf()`.
        let slice: &'static [u8] =
            unsafe { std::slice::from_raw_parts(data.as_ptr(), data.len()) };

        let ttf = ttf_parser::Face::parse(slice, index)
            .map_err(|err| FontError::Parse(eco_format!("{err}")))?;
        let rusty = rustybuzz::Face::from_slice(slice, index)
            .ok_or_else(|| FontError::Parse(eco_format!("unsupported face")))?;
        let metrics = FontMetrics::from_ttf(&ttf);

        Ok(Self(Arc::new(Repr { index, metrics, ttf, rusty, data })))
    }

    /// Parse all fonts in the given data.
    pub fn iter(data: Bytes) -> impl Iterator<Item = Self> {
        let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
        (0..count).filter_map(move |index| Self::new(data.clone(), index).ok())
    }

    /// The underlying buffer.
    pub fn data(&self) -> &Bytes {
        &self.0.data
    }

    /// The font's index in the buffer.
    pub fn index(&self) -> u32 {
        self.0.index
    }

    /// The number of font units per one em.
    pub fn units_per_em(&self) -> f64 {
        self.0.metrics.units_per_em
    }

    /// Convert from font units to an em length.
    pub fn to_em(&self, units: impl Into<f64>) -> Em {
        Em::from_units(units, self.units_per_em())
    }

    /// A reference to the underlying `ttf-parser` face.
    pub fn ttf(&self) -> &ttf_parser::Face<'_> {
        // We can't implement Deref because that would leak the
        // internal 'static lifetime.
        &self.0.ttf
    }

    /// A reference to the underlying `rustybuzz` face.
    pub fn rusty(&self) -> &rustybuzz::Face<'_> {
        // We can't implement Deref because that would leak the
        // internal 'static lifetime.
        &self.0.rusty
    }
}

impl Face for Font {
    fn metrics(&self) -> FontMetrics {
        self.0.metrics
    }

    fn shape(&self, text: &str, dir: Dir, lang: Lang) -> Vec<RawGlyph> {
        if text.is_empty() {
            return vec![];
        }

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        if let Ok(language) = rustybuzz::Language::from_str(lang.as_str()) {
            buffer.set_language(language);
        }
        buffer.set_direction(match dir {
            Dir::Ltr => rustybuzz::Direction::LeftToRight,
            Dir::Rtl => rustybuzz::Direction::RightToLeft,
        });
        buffer.guess_segment_properties();

        // By default, Harfbuzz creates zero-width space glyphs for default
        // ignorables. Those carry no layout information, so drop them.
        buffer.set_flags(BufferFlags::REMOVE_DEFAULT_IGNORABLES);

        let shaped = rustybuzz::shape(self.rusty(), &[], buffer);
        let infos = shaped.glyph_infos();
        let positions = shaped.glyph_positions();

        infos
            .iter()
            .zip(positions)
            .map(|(info, pos)| RawGlyph {
                id: info.glyph_id as u16,
                cluster: info.cluster as usize,
                x_advance: self.to_em(pos.x_advance),
                y_advance: self.to_em(pos.y_advance),
                x_offset: self.to_em(pos.x_offset),
                y_offset: self.to_em(pos.y_offset),
            })
            .collect()
    }
}

impl Hash for Font {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.data.hash(state);
        self.0.index.hash(state);
    }
}

impl Eq for Font {}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.0.data == other.0.data && self.0.index == other.0.index
    }
}

impl Debug for Font {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Font({})", self.0.index)
    }
}

/// Metrics of a font face.
///
/// All vertical metrics are non-negative distances from the baseline,
/// font-relative so they can be resolved at any font size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontMetrics {
    /// How many font units represent one em unit.
    pub units_per_em: f64,
    /// The distance from the baseline to the typographic ascender.
    pub ascent: Em,
    /// The distance from the baseline to the typographic descender.
    pub descent: Em,
    /// The recommended extra gap between two lines.
    pub leading: Em,
}

impl FontMetrics {
    /// Extract the font's metrics.
    pub fn from_ttf(ttf: &ttf_parser::Face) -> Self {
        let units_per_em = f64::from(ttf.units_per_em());
        let to_em = |units: i16| Em::from_units(units, units_per_em);

        let ascent = to_em(ttf.typographic_ascender().unwrap_or(ttf.ascender()));
        let descent = -to_em(ttf.typographic_descender().unwrap_or(ttf.descender()));
        let leading = to_em(ttf.typographic_line_gap().unwrap_or(ttf.line_gap()));

        Self {
            units_per_em,
            ascent: nonneg(ascent),
            descent: nonneg(descent),
            leading: nonneg(leading),
        }
    }

    /// The vertical extent of one line: ascent + descent + leading.
    pub fn line_height(&self) -> Em {
        self.ascent + self.descent + self.leading
    }
}

/// Clamp a metric to the non-negative range.
fn nonneg(em: Em) -> Em {
    Em::new(em.get().max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_data_fails_to_parse() {
        let result = Font::new(Bytes::new(vec![0xde, 0xad, 0xbe, 0xef]), 0);
        assert!(matches!(result, Err(FontError::Parse(_))));
    }

    #[test]
    fn test_missing_face_index() {
        let result = Font::new(Bytes::new(vec![0; 12]), 7);
        assert!(matches!(result, Err(FontError::MissingFace(7))));
    }
}
