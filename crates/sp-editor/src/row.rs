//! Row — one line of the document.
//!
//! A row stores three parallel views of the same line:
//!
//! - **chars** — the raw bytes as typed or loaded, without a line terminator
//! - **render** — chars with every tab expanded to the next tab stop
//! - **highlight** — one [`Highlight`] per render byte
//!
//! Render and highlight are derived data. Every mutation of chars rebuilds
//! both in full; nothing is patched incrementally.
//!
//! # Columns
//!
//! A *raw column* indexes chars; a *render column* indexes render. The two
//! differ only after a tab. [`Row::raw_to_render`] and
//! [`Row::render_to_raw`] convert between them by walking the row from the
//! left, so `render_to_raw(raw_to_render(x)) == x` for every `x` in
//! `0..=len`.

use crate::highlight::{self, Highlight};

/// A single line of text with its render projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
    hl: Vec<Highlight>,
}

impl Row {
    /// Build a row from raw content.
    #[must_use]
    pub fn new(chars: Vec<u8>, tab_stop: usize) -> Self {
        let mut row = Self {
            chars,
            render: Vec::new(),
            hl: Vec::new(),
        };
        row.update(tab_stop);
        row
    }

    // -- Access -------------------------------------------------------------

    /// Raw content.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// Tab-expanded content.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Highlight classes, one per render byte.
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.hl
    }

    /// Raw length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    // -- Mutation -----------------------------------------------------------

    /// Insert `byte` at `at`, clamped to `0..=len`.
    pub fn insert(&mut self, at: usize, byte: u8, tab_stop: usize) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, byte);
        self.update(tab_stop);
    }

    /// Remove the byte at `at`. Returns `false` (and changes nothing) if
    /// `at` is not in `0..len`.
    pub fn remove(&mut self, at: usize, tab_stop: usize) -> bool {
        if at >= self.chars.len() {
            return false;
        }
        self.chars.remove(at);
        self.update(tab_stop);
        true
    }

    /// Append `bytes` to the end of the row.
    pub fn append(&mut self, bytes: &[u8], tab_stop: usize) {
        self.chars.extend_from_slice(bytes);
        self.update(tab_stop);
    }

    /// Cut the row at `at` (clamped) and return everything from `at` on.
    pub fn split_off(&mut self, at: usize, tab_stop: usize) -> Vec<u8> {
        let tail = self.chars.split_off(at.min(self.chars.len()));
        self.update(tab_stop);
        tail
    }

    /// Rebuild render and highlight from chars.
    fn update(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        self.render.clear();

        for &byte in &self.chars {
            if byte == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(byte);
            }
        }

        self.hl = highlight::classify(&self.render);
    }

    // -- Highlight overlay ---------------------------------------------------

    /// Paint `class` over `len` render bytes starting at `start`. The span
    /// is clipped to the row.
    pub fn paint(&mut self, start: usize, len: usize, class: Highlight) {
        let start = start.min(self.hl.len());
        let end = start.saturating_add(len).min(self.hl.len());
        self.hl[start..end].fill(class);
    }

    /// Put back a highlight sequence saved before a [`paint`](Self::paint).
    ///
    /// Ignored if the row has been re-rendered to a different length since.
    pub fn restore_highlight(&mut self, saved: Vec<Highlight>) {
        if saved.len() == self.hl.len() {
            self.hl = saved;
        }
    }

    // -- Search ---------------------------------------------------------------

    /// Render offset of the first occurrence of `needle`.
    #[must_use]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        self.render
            .windows(needle.len())
            .position(|window| window == needle)
    }

    // -- Column mapping -------------------------------------------------------

    /// Render column at which raw column `x` starts.
    #[must_use]
    pub fn raw_to_render(&self, x: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut rx = 0;
        for &byte in self.chars.iter().take(x) {
            if byte == b'\t' {
                rx += (tab_stop - 1) - (rx % tab_stop);
            }
            rx += 1;
        }
        rx
    }

    /// First raw column whose cumulative render width exceeds `rx`: the
    /// insertion point for render column `rx`. Returns `len` when `rx` is
    /// at or past the end of the render sequence.
    #[must_use]
    pub fn render_to_raw(&self, rx: usize, tab_stop: usize) -> usize {
        let tab_stop = tab_stop.max(1);
        let mut cur = 0;
        for (x, &byte) in self.chars.iter().enumerate() {
            if byte == b'\t' {
                cur += (tab_stop - 1) - (cur % tab_stop);
            }
            cur += 1;
            if cur > rx {
                return x;
            }
        }
        self.chars.len()
    }
}
