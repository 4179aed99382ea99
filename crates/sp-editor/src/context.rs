//! Context — the one explicit editor state object.
//!
//! Every component operation receives the context instead of reaching for
//! global state. It bundles the document, cursor, viewport, message bar,
//! options and file store, and implements the edit operations that combine
//! document primitives with cursor movement.

use std::path::Path;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::status::StatusMessage;
use crate::store::FileStore;
use crate::viewport::Viewport;

/// Editor state shared by every operation.
pub struct Context {
    pub doc: Document,
    pub cursor: Cursor,
    pub viewport: Viewport,
    pub status: StatusMessage,
    pub options: Options,
    pub store: Box<dyn FileStore>,
}

impl Context {
    /// An empty, unnamed document.
    #[must_use]
    pub fn new(options: Options, store: Box<dyn FileStore>, viewport: Viewport) -> Self {
        Self {
            doc: Document::new(options.tab_stop),
            cursor: Cursor::new(),
            viewport,
            status: StatusMessage::default(),
            options,
            store,
        }
    }

    /// Replace the document with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the store cannot read the file.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let lines = self.store.read_lines(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut doc = Document::from_lines(lines, self.options.tab_stop);
        doc.set_path(path);
        log::info!("opened {} ({} lines)", path.display(), doc.len());
        self.doc = doc;
        self.cursor = Cursor::new();
        Ok(())
    }

    // -- Edits ----------------------------------------------------------------

    /// Insert `byte` at the cursor. On the line past the end, a fresh row is
    /// appended first.
    pub fn insert_char(&mut self, byte: u8) {
        if self.cursor.y == self.doc.len() {
            self.doc.insert_row(self.doc.len(), Vec::new());
        }
        self.doc.insert_char(self.cursor.y, self.cursor.x, byte);
        self.cursor.x += 1;
    }

    /// Break the line at the cursor and move to the start of the new line.
    pub fn insert_newline(&mut self) {
        if self.cursor.x == 0 {
            self.doc.insert_row(self.cursor.y, Vec::new());
        } else {
            self.doc.split_row(self.cursor.y, self.cursor.x);
        }
        self.cursor.y += 1;
        self.cursor.x = 0;
    }

    /// Delete the byte left of the cursor, joining with the previous line at
    /// column 0.
    pub fn delete_char(&mut self) {
        let Cursor { x, y, .. } = self.cursor;
        if y == self.doc.len() || (x == 0 && y == 0) {
            return;
        }

        if x > 0 {
            self.doc.delete_char(y, x - 1);
            self.cursor.x -= 1;
        } else {
            let prev_len = self.doc.row_len(y - 1);
            let moved = self
                .doc
                .row(y)
                .map(|row| row.chars().to_vec())
                .unwrap_or_default();
            self.doc.append_string(y - 1, &moved);
            self.doc.delete_row(y);
            self.cursor.y -= 1;
            self.cursor.x = prev_len;
        }
    }

    // -- Save -------------------------------------------------------------------

    /// Write the document to its path and report the outcome on the message
    /// bar. Leaves the document untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Save`] if the write fails. The caller may retry.
    pub fn save(&mut self) -> Result<usize> {
        let Some(path) = self.doc.path().map(Path::to_path_buf) else {
            self.status.set("No file name");
            return Ok(0);
        };
        let bytes = self.doc.to_persisted_bytes();

        match self.store.write_all(&path, &bytes) {
            Ok(()) => {
                self.doc.mark_clean();
                self.status.set(format!("{} bytes written to disk", bytes.len()));
                log::info!("saved {} ({} bytes)", path.display(), bytes.len());
                Ok(bytes.len())
            }
            Err(err) => {
                let err = Error::Save(err);
                self.status.set(format!("Can't save! {err}"));
                log::warn!("save to {} failed: {err}", path.display());
                Err(err)
            }
        }
    }

    // -- Frame preparation --------------------------------------------------------

    /// Refresh the cursor's render column and scroll it into view.
    pub fn scroll(&mut self) {
        self.cursor.clamp(&self.doc);
        self.cursor.sync_render_x(&self.doc);
        self.viewport.scroll(&self.cursor);
    }
}
