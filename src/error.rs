//! Error taxonomy for layout construction.
//!
//! Caret and hit-test queries never fail: out-of-range inputs clamp to the
//! nearest valid boundary instead (see the query docs). Errors exist only
//! where construction must fail fast: malformed input text and unusable
//! font data.

use std::fmt::{self, Display, Formatter};

use ecow::EcoString;

/// A result type with a font-related error.
pub type FontResult<T> = Result<T, FontError>;

/// An error that occurred while loading a font face.
///
/// This is an environment problem (missing or broken font resources), as
/// opposed to [`LayoutError::InvalidUtf8`], which is a problem with the
/// caller's data.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum FontError {
    /// The data could not be parsed as an OpenType face.
    ///
    /// The string carries the parser's detail message, if available.
    Parse(EcoString),
    /// The font collection does not contain a face at this index.
    MissingFace(u32),
}

impl std::error::Error for FontError {}

impl Display for FontError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Parse(detail) if detail.is_empty() => {
                write!(f, "failed to parse font data")
            }
            Self::Parse(detail) => write!(f, "failed to parse font data ({detail})"),
            Self::MissingFace(index) => {
                write!(f, "font collection has no face at index {index}")
            }
        }
    }
}

/// A result type with a layout-related error.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// An error that occurred while constructing a layout.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum LayoutError {
    /// The input buffer was not valid UTF-8.
    ///
    /// All public indices are byte offsets into the text, so a layout over
    /// malformed bytes would have undefined cluster semantics. Construction
    /// rejects such buffers instead of deferring the problem to queries.
    InvalidUtf8,
    /// The font face could not be loaded.
    Font(FontError),
}

impl std::error::Error for LayoutError {}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => f.pad("text is not valid utf-8"),
            Self::Font(err) => err.fmt(f),
        }
    }
}

impl From<FontError> for LayoutError {
    fn from(err: FontError) -> Self {
        Self::Font(err)
    }
}
