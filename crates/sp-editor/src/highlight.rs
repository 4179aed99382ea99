//! Highlighting — one semantic class per rendered byte.
//!
//! The classifier is a single forward pass over a row's render sequence,
//! re-run in full whenever the row's content changes. It knows exactly one
//! syntax rule: numbers. A digit is a [`Highlight::Number`] when it starts
//! after a separator or continues a number, and a `.` directly after a
//! number digit extends it (`3.14`). Everything else is
//! [`Highlight::Normal`].
//!
//! [`Highlight::Match`] never comes out of the classifier. Search paints it
//! over a row temporarily and restores the classifier's output afterwards.

use sp_term::ansi::Color;

/// Semantic class of a rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Number,
    Match,
}

impl Highlight {
    /// The foreground color this class is drawn with.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Normal => Color::Default,
            Self::Number => Color::RED,
            Self::Match => Color::BLUE,
        }
    }
}

/// Punctuation that ends a token.
const SEPARATORS: &[u8] = b",.()+-/*=~%<>[];";

/// Whether `byte` separates tokens: whitespace, NUL, or [`SEPARATORS`].
#[must_use]
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C | 0)
        || SEPARATORS.contains(&byte)
}

/// Classify every byte of a rendered row.
///
/// The result always has the same length as `render`.
#[must_use]
pub fn classify(render: &[u8]) -> Vec<Highlight> {
    let mut hl = Vec::with_capacity(render.len());
    let mut prev_sep = true;

    for &byte in render {
        let prev = hl.last().copied().unwrap_or_default();

        let is_number = (byte.is_ascii_digit() && (prev_sep || prev == Highlight::Number))
            || (byte == b'.' && prev == Highlight::Number);

        if is_number {
            hl.push(Highlight::Number);
            prev_sep = false;
        } else {
            hl.push(Highlight::Normal);
            prev_sep = is_separator(byte);
        }
    }

    hl
}
