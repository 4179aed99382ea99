//! Viewport — which slice of the document is on screen.
//!
//! The viewport owns the scroll offsets and the size of the text area (the
//! terminal minus the status bar and message bar). On a terminal too short
//! for both bars the text area keeps one row and the bars that do not fit
//! are dropped, message bar first, so a frame never outgrows the screen. [`Viewport::scroll`]
//! runs before every frame and moves the offsets just far enough that the
//! cursor's render position is inside the window:
//!
//! ```text
//! row_offset <= cursor.y  < row_offset + rows
//! col_offset <= cursor.rx < col_offset + cols
//! ```

use sp_term::terminal::Size;

use crate::cursor::Cursor;

/// Lines reserved below the text area: status bar and message bar.
pub const RESERVED_ROWS: u16 = 2;

/// Scroll state and text-area size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub row_offset: usize,
    /// First visible render column.
    pub col_offset: usize,
    rows: usize,
    cols: usize,
    bars: usize,
}

impl Viewport {
    /// A viewport of exactly `rows` x `cols` text cells with both bars
    /// below it. Rows and columns are at least 1.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            rows: rows.max(1),
            cols: cols.max(1),
            bars: usize::from(RESERVED_ROWS),
        }
    }

    /// The text area for a terminal of `size`.
    #[must_use]
    pub fn for_terminal(size: Size) -> Self {
        let height = size.rows.max(1);
        let bars = RESERVED_ROWS.min(height - 1);
        Self {
            bars: usize::from(bars),
            ..Self::new(usize::from(height - bars), usize::from(size.cols))
        }
    }

    /// Visible text rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Visible text columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Bar lines drawn below the text area: 2 normally, fewer on a
    /// terminal too short to hold them.
    #[inline]
    #[must_use]
    pub const fn bars(&self) -> usize {
        self.bars
    }

    /// Lines in a full frame: text rows plus bars.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.rows + self.bars
    }

    /// Adjust offsets so the cursor is visible. `cursor.rx` must be current.
    pub const fn scroll(&mut self, cursor: &Cursor) {
        if cursor.y < self.row_offset {
            self.row_offset = cursor.y;
        }
        if cursor.y >= self.row_offset + self.rows {
            self.row_offset = cursor.y + 1 - self.rows;
        }
        if cursor.rx < self.col_offset {
            self.col_offset = cursor.rx;
        }
        if cursor.rx >= self.col_offset + self.cols {
            self.col_offset = cursor.rx + 1 - self.cols;
        }
    }

    /// Put row `y` at the top of the window.
    pub const fn pin_top(&mut self, y: usize) {
        self.row_offset = y;
    }

    /// Whether `(y, rx)` is inside the window.
    #[must_use]
    pub const fn contains(&self, y: usize, rx: usize) -> bool {
        y >= self.row_offset
            && y < self.row_offset + self.rows
            && rx >= self.col_offset
            && rx < self.col_offset + self.cols
    }
}
