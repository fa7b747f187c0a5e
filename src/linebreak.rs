//! The Unicode line-break classifier.
//!
//! A thin layer over the UAX #14 line breaking algorithm that turns break
//! *opportunities* (which sit between characters) into a per-byte table of
//! break *classes* (which sit on the character that permits the break). The
//! flow engine indexes this table by a glyph's cluster start.

use unicode_linebreak::{BreakOpportunity, linebreaks};
use unicode_segmentation::UnicodeSegmentation;

/// Whether a line may, must, or must not end at a text position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BreakClass {
    /// The line must not end here.
    Prohibited,
    /// The line may end here (e.g. after a space or a hyphen).
    Allowed,
    /// The line must end here (after `'\n'` and equivalents), regardless of
    /// the available width.
    Mandatory,
}

/// Classify every byte offset of `text`.
///
/// The entry at a codepoint's start byte is that codepoint's break class;
/// entries at continuation bytes are `Prohibited` fillers and carry no
/// independent meaning. The result is a pure function of the text, so
/// repeated flows over the same buffer see identical classes.
pub fn classify(text: &str) -> Vec<BreakClass> {
    let mut classes = vec![BreakClass::Prohibited; text.len()];

    for (end, opportunity) in linebreaks(text) {
        // The opportunity sits after the codepoint ending at `end`; attribute
        // it to that codepoint's start byte.
        let Some((start, c)) = text[..end].char_indices().next_back() else {
            continue;
        };

        classes[start] = if end == text.len() {
            // UAX #14 rule LB3 emits a mandatory opportunity at the end of
            // text. End of text is not a character, so only keep the entry
            // when the last codepoint is a forced break on its own.
            if is_forced_break(c) {
                BreakClass::Mandatory
            } else {
                continue;
            }
        } else {
            match opportunity {
                BreakOpportunity::Mandatory => BreakClass::Mandatory,
                BreakOpportunity::Allowed => BreakClass::Allowed,
            }
        };
    }

    classes
}

/// Whether the codepoint forces a line break on its own (the UAX #14 BK,
/// CR, LF and NL classes).
pub(crate) fn is_forced_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Whether a word may end at the byte offset `index` of `text`, per the
/// UAX #29 word boundary rules.
///
/// Exposed for callers implementing word-wise selection (double-click);
/// the start and end of text always count as boundaries.
pub fn word_bound(text: &str, index: usize) -> BreakClass {
    if index == 0 || index >= text.len() {
        return BreakClass::Allowed;
    }

    for (start, _) in text.split_word_bound_indices() {
        if start == index {
            return BreakClass::Allowed;
        }
        if start > index {
            break;
        }
    }

    BreakClass::Prohibited
}
