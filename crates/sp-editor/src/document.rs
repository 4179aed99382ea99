//! Document — the ordered rows of the file being edited.
//!
//! The document exclusively owns every [`Row`]. Other components borrow a
//! row for the length of one operation and never keep it.
//!
//! Every mutating primitive bumps the modified counter. The counter is only
//! reset by [`Document::mark_clean`], after a load or a successful save.
//!
//! Persisted format: each row's raw bytes followed by exactly one `\n`.

use std::path::{Path, PathBuf};

use crate::row::Row;

/// An in-memory text document.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    dirty: u64,
    path: Option<PathBuf>,
    tab_stop: usize,
}

impl Document {
    // -- Construction ---------------------------------------------------------

    /// Create an empty, unnamed document.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            path: None,
            tab_stop: tab_stop.max(1),
        }
    }

    /// Build a clean document from lines without terminators.
    #[must_use]
    pub fn from_lines<I>(lines: I, tab_stop: usize) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut doc = Self::new(tab_stop);
        for line in lines {
            doc.insert_row(doc.len(), line);
        }
        doc.mark_clean();
        doc
    }

    // -- Access -----------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `at`, if it exists.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Mutable row `at`, for highlight overlays. Content edits go through
    /// the document so the modified counter stays honest.
    #[inline]
    pub(crate) fn row_mut(&mut self, at: usize) -> Option<&mut Row> {
        self.rows.get_mut(at)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Raw length of row `at`, or 0 past the end.
    #[inline]
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    /// Tab stop used for rendering.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Associated file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Associate a file path.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Modification counter since the last load or save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> u64 {
        self.dirty
    }

    /// Whether there are unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.dirty > 0
    }

    /// Reset the modification counter.
    pub const fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    // -- Row primitives ---------------------------------------------------------

    /// Insert a row at `at` (clamped to `0..=len`).
    pub fn insert_row(&mut self, at: usize, content: Vec<u8>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(content, self.tab_stop));
        self.dirty += 1;
    }

    /// Remove row `at`. No-op out of bounds.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Insert `byte` into row `row` at `at` (clamped to the row length).
    /// No-op if the row does not exist.
    pub fn insert_char(&mut self, row: usize, at: usize, byte: u8) {
        let tab_stop = self.tab_stop;
        if let Some(r) = self.rows.get_mut(row) {
            r.insert(at, byte, tab_stop);
            self.dirty += 1;
        }
    }

    /// Delete the byte at `at` in row `row`. No-op if either is out of
    /// bounds.
    pub fn delete_char(&mut self, row: usize, at: usize) {
        let tab_stop = self.tab_stop;
        if let Some(r) = self.rows.get_mut(row) {
            if r.remove(at, tab_stop) {
                self.dirty += 1;
            }
        }
    }

    /// Append `bytes` to row `row`.
    pub fn append_string(&mut self, row: usize, bytes: &[u8]) {
        let tab_stop = self.tab_stop;
        if let Some(r) = self.rows.get_mut(row) {
            r.append(bytes, tab_stop);
            self.dirty += 1;
        }
    }

    /// Split row `row` at `at`: the tail becomes a new row just below.
    pub fn split_row(&mut self, row: usize, at: usize) {
        let tab_stop = self.tab_stop;
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let tail = r.split_off(at, tab_stop);
        self.dirty += 1;
        self.insert_row(row + 1, tail);
    }

    // -- Column mapping -------------------------------------------------------------

    /// Render column of raw column `x` in row `row` (0 past the end).
    #[must_use]
    pub fn raw_to_render(&self, row: usize, x: usize) -> usize {
        self.rows
            .get(row)
            .map_or(0, |r| r.raw_to_render(x, self.tab_stop))
    }

    /// Raw column for render column `rx` in row `row` (0 past the end).
    #[must_use]
    pub fn render_to_raw(&self, row: usize, rx: usize) -> usize {
        self.rows
            .get(row)
            .map_or(0, |r| r.render_to_raw(rx, self.tab_stop))
    }

    // -- Persistence ---------------------------------------------------------------

    /// Every row's raw bytes, each followed by one `\n`.
    #[must_use]
    pub fn to_persisted_bytes(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(row.chars());
            out.push(b'\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(lines: &[&[u8]]) -> Document {
        Document::from_lines(lines.iter().map(|l| l.to_vec()), 8)
    }

    fn contents(doc: &Document) -> Vec<Vec<u8>> {
        doc.rows().iter().map(|r| r.chars().to_vec()).collect()
    }

    #[test]
    fn new_document_is_empty_and_clean() {
        let d = Document::new(8);
        assert!(d.is_empty());
        assert!(!d.is_modified());
        assert!(d.path().is_none());
    }

    #[test]
    fn from_lines_is_clean() {
        let d = doc(&[b"a", b"b"]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.dirty(), 0);
    }

    #[test]
    fn insert_row_clamps_and_shifts() {
        let mut d = doc(&[b"a", b"c"]);
        d.insert_row(1, b"b".to_vec());
        d.insert_row(99, b"d".to_vec());
        assert_eq!(contents(&d), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
        assert_eq!(d.dirty(), 2);
    }

    #[test]
    fn delete_row_shifts_and_ignores_out_of_bounds() {
        let mut d = doc(&[b"a", b"b", b"c"]);
        d.delete_row(1);
        assert_eq!(contents(&d), vec![b"a".to_vec(), b"c".to_vec()]);
        d.delete_row(5);
        assert_eq!(d.len(), 2);
        assert_eq!(d.dirty(), 1);
    }

    #[test]
    fn char_primitives_count_modifications() {
        let mut d = doc(&[b"ac"]);
        d.insert_char(0, 1, b'b');
        assert_eq!(d.row(0).unwrap().chars(), b"abc");
        d.delete_char(0, 0);
        assert_eq!(d.row(0).unwrap().chars(), b"bc");
        d.delete_char(0, 9);
        d.insert_char(9, 0, b'x');
        assert_eq!(d.dirty(), 2);
    }

    #[test]
    fn append_string_concatenates() {
        let mut d = doc(&[b"foo"]);
        d.append_string(0, b"bar");
        assert_eq!(d.row(0).unwrap().chars(), b"foobar");
        assert!(d.is_modified());
    }

    #[test]
    fn split_row_moves_tail_below() {
        let mut d = doc(&[b"hello world", b"next"]);
        d.split_row(0, 5);
        assert_eq!(
            contents(&d),
            vec![b"hello".to_vec(), b" world".to_vec(), b"next".to_vec()]
        );
    }

    #[test]
    fn mark_clean_resets_counter() {
        let mut d = doc(&[b"x"]);
        d.insert_char(0, 0, b'y');
        d.mark_clean();
        assert!(!d.is_modified());
    }

    #[test]
    fn persisted_bytes_terminate_every_row() {
        let d = doc(&[b"ab\tc", b"", b"last"]);
        assert_eq!(d.to_persisted_bytes(), b"ab\tc\n\nlast\n".to_vec());
        assert!(Document::new(8).to_persisted_bytes().is_empty());
    }

    #[test]
    fn column_mapping_past_end_is_zero() {
        let d = doc(&[b"\tx"]);
        assert_eq!(d.raw_to_render(0, 1), 8);
        assert_eq!(d.render_to_raw(0, 8), 1);
        assert_eq!(d.raw_to_render(3, 1), 0);
        assert_eq!(d.render_to_raw(3, 1), 0);
    }
}
