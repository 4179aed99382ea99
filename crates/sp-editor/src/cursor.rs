//! Cursor — the logical edit position.
//!
//! `x` is a raw column into the current row, `y` a row index. The cursor
//! may sit one row past the end of the document (`y == len`), where `x` is
//! always 0; that is where typing appends a fresh row.
//!
//! `rx` is the render column of `x`, recomputed by
//! [`Cursor::sync_render_x`] before every frame. Movement never reads it.
//!
//! # Invariant
//!
//! `0 <= y <= doc.len()`, and `0 <= x <= doc.row_len(y)` (which is 0 past
//! the end). Every movement ends with [`Cursor::clamp`], so crossing onto a
//! shorter row snaps `x` to its end.

use crate::document::Document;

/// A cardinal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// The edit cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Raw column.
    pub x: usize,
    /// Row index.
    pub y: usize,
    /// Render column of `x`, derived.
    pub rx: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { x: 0, y: 0, rx: 0 }
    }

    /// A cursor at `(x, y)`. `rx` is left for the next sync.
    #[must_use]
    pub const fn at(x: usize, y: usize) -> Self {
        Self { x, y, rx: 0 }
    }

    /// Move one step in `direction`, wrapping across row ends horizontally.
    pub fn step(&mut self, direction: Direction, doc: &Document) {
        match direction {
            Direction::Left => {
                if self.x > 0 {
                    self.x -= 1;
                } else if self.y > 0 {
                    self.y -= 1;
                    self.x = doc.row_len(self.y);
                }
            }
            Direction::Right => {
                if let Some(row) = doc.row(self.y) {
                    if self.x < row.len() {
                        self.x += 1;
                    } else if self.x == row.len() {
                        self.y += 1;
                        self.x = 0;
                    }
                }
            }
            Direction::Up => self.y = self.y.saturating_sub(1),
            Direction::Down => {
                if self.y < doc.len() {
                    self.y += 1;
                }
            }
        }
        self.clamp(doc);
    }

    /// Move to column 0.
    pub const fn home(&mut self) {
        self.x = 0;
    }

    /// Move to the end of the current row.
    pub fn end(&mut self, doc: &Document) {
        self.x = doc.row_len(self.y);
    }

    /// Restore the invariant after the document or cursor changed.
    pub fn clamp(&mut self, doc: &Document) {
        self.y = self.y.min(doc.len());
        self.x = self.x.min(doc.row_len(self.y));
    }

    /// Recompute `rx` from `x`.
    pub fn sync_render_x(&mut self, doc: &Document) {
        self.rx = doc.raw_to_render(self.y, self.x);
    }
}
