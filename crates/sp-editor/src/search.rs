//! Search — incremental find driven by the prompt.
//!
//! [`SearchEngine`] is a [`PromptHandler`]. Every keystroke re-runs the
//! scan, so the cursor follows the query as it is typed. The arrow keys
//! step to the next (Right/Down) or previous (Up/Left) match; any other key
//! restarts the scan from the top of the document.
//!
//! The current match is painted with [`Highlight::Match`]. The row's
//! classifier output is saved first and put back before the next scan, so
//! at most one row carries the overlay at any time.
//!
//! Cancelling restores the cursor and scroll offsets captured when the
//! search began.

use sp_term::input::{KeyCode, KeyEvent};

use crate::context::Context;
use crate::cursor::Cursor;
use crate::highlight::Highlight;
use crate::prompt::{PromptHandler, PromptStep, default_step};

/// Prompt template for find.
pub const SEARCH_PROMPT: &str = "Search: {} (Use ESC/Arrows/Enter)";

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Scan direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// State of one find session.
#[derive(Debug)]
pub struct SearchEngine {
    last_match: Option<usize>,
    direction: SearchDirection,
    /// Row and highlight sequence before the current overlay was painted.
    saved_highlight: Option<(usize, Vec<Highlight>)>,
    saved_cursor: Cursor,
    saved_row_offset: usize,
    saved_col_offset: usize,
}

impl SearchEngine {
    /// Start a session, remembering where the view is.
    #[must_use]
    pub const fn new(ctx: &Context) -> Self {
        Self {
            last_match: None,
            direction: SearchDirection::Forward,
            saved_highlight: None,
            saved_cursor: ctx.cursor,
            saved_row_offset: ctx.viewport.row_offset,
            saved_col_offset: ctx.viewport.col_offset,
        }
    }

    /// Row of the most recent match.
    #[must_use]
    pub const fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    /// Find the next row containing `query` and move the cursor onto it.
    fn scan(&mut self, ctx: &mut Context, query: &[u8]) {
        if self.last_match.is_none() {
            self.direction = SearchDirection::Forward;
        }

        let n = ctx.doc.len();
        let mut current = self.last_match;
        for _ in 0..n {
            let next = match (current, self.direction) {
                (None, _) => 0,
                (Some(row), SearchDirection::Forward) => {
                    if row + 1 >= n {
                        0
                    } else {
                        row + 1
                    }
                }
                (Some(row), SearchDirection::Backward) => {
                    if row == 0 {
                        n - 1
                    } else {
                        row - 1
                    }
                }
            };
            current = Some(next);

            let Some(offset) = ctx.doc.row(next).and_then(|r| r.find(query)) else {
                continue;
            };

            self.last_match = Some(next);
            ctx.cursor.y = next;
            ctx.cursor.x = ctx.doc.render_to_raw(next, offset);
            ctx.viewport.pin_top(next);

            if let Some(row) = ctx.doc.row_mut(next) {
                self.saved_highlight = Some((next, row.highlight().to_vec()));
                row.paint(offset, query.len(), Highlight::Match);
            }
            log::trace!("match for {query:?} at row {next}, render col {offset}");
            break;
        }
    }

    fn restore_highlight(&mut self, ctx: &mut Context) {
        if let Some((at, saved)) = self.saved_highlight.take() {
            if let Some(row) = ctx.doc.row_mut(at) {
                row.restore_highlight(saved);
            }
        }
    }
}

impl PromptHandler for SearchEngine {
    fn on_keystroke(&mut self, ctx: &mut Context, input: &str, key: KeyEvent) -> PromptStep {
        self.restore_highlight(ctx);

        match key.code {
            KeyCode::Enter | KeyCode::Escape => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
                return default_step(input, key);
            }
            KeyCode::Right | KeyCode::Down => self.direction = SearchDirection::Forward,
            KeyCode::Left | KeyCode::Up => self.direction = SearchDirection::Backward,
            _ => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
            }
        }

        if !input.is_empty() {
            self.scan(ctx, input.as_bytes());
        }
        default_step(input, key)
    }

    fn finish(&mut self, ctx: &mut Context, outcome: Option<String>) {
        self.restore_highlight(ctx);
        if outcome.is_none() {
            ctx.cursor = self.saved_cursor;
            ctx.viewport.row_offset = self.saved_row_offset;
            ctx.viewport.col_offset = self.saved_col_offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::options::Options;
    use crate::store::MemStore;
    use crate::viewport::Viewport;
    use pretty_assertions::assert_eq;

    fn ctx_with(lines: &[&[u8]]) -> Context {
        let mut ctx = Context::new(
            Options::default(),
            Box::new(MemStore::new()),
            Viewport::new(10, 40),
        );
        ctx.doc = Document::from_lines(lines.iter().map(|l| l.to_vec()), 8);
        ctx
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn type_query(engine: &mut SearchEngine, ctx: &mut Context, query: &str) {
        let mut input = String::new();
        for b in query.bytes() {
            input.push(char::from(b));
            engine.on_keystroke(ctx, &input, key(KeyCode::Char(b)));
        }
    }

    fn matched_rows(ctx: &Context) -> Vec<usize> {
        (0..ctx.doc.len())
            .filter(|&i| {
                ctx.doc
                    .row(i)
                    .is_some_and(|r| r.highlight().contains(&Highlight::Match))
            })
            .collect()
    }

    #[test]
    fn forward_search_wraps_around() {
        let mut ctx = ctx_with(&[b"foo", b"bar", b"foobar"]);
        let mut engine = SearchEngine::new(&ctx);

        type_query(&mut engine, &mut ctx, "foo");
        assert_eq!(engine.last_match(), Some(0));

        engine.on_keystroke(&mut ctx, "foo", key(KeyCode::Down));
        assert_eq!(engine.last_match(), Some(2));
        assert_eq!(ctx.cursor.y, 2);

        engine.on_keystroke(&mut ctx, "foo", key(KeyCode::Right));
        assert_eq!(engine.last_match(), Some(0));
    }

    #[test]
    fn backward_search_wraps_to_last_row() {
        let mut ctx = ctx_with(&[b"foo", b"bar", b"foobar"]);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "foo");

        engine.on_keystroke(&mut ctx, "foo", key(KeyCode::Up));
        assert_eq!(engine.last_match(), Some(2));
        engine.on_keystroke(&mut ctx, "foo", key(KeyCode::Left));
        assert_eq!(engine.last_match(), Some(0));
    }

    #[test]
    fn arrow_without_prior_match_scans_forward_from_top() {
        let mut ctx = ctx_with(&[b"x", b"needle", b"needle"]);
        let mut engine = SearchEngine::new(&ctx);
        engine.on_keystroke(&mut ctx, "needle", key(KeyCode::Up));
        assert_eq!(engine.last_match(), Some(1));
    }

    #[test]
    fn match_moves_cursor_to_raw_column() {
        let mut ctx = ctx_with(&[b"a\tneedle"]);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "needle");
        assert_eq!((ctx.cursor.x, ctx.cursor.y), (2, 0));
        assert_eq!(ctx.viewport.row_offset, 0);
    }

    #[test]
    fn match_pins_row_to_top_of_view() {
        let lines: Vec<Vec<u8>> = (0..50)
            .map(|i| if i == 30 { b"target".to_vec() } else { b"-".to_vec() })
            .collect();
        let mut ctx = ctx_with(&[]);
        ctx.doc = Document::from_lines(lines, 8);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "target");
        assert_eq!(ctx.viewport.row_offset, 30);
    }

    #[test]
    fn only_current_match_is_highlighted() {
        let mut ctx = ctx_with(&[b"foo", b"bar", b"foobar"]);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "foo");
        assert_eq!(matched_rows(&ctx), vec![0]);

        engine.on_keystroke(&mut ctx, "foo", key(KeyCode::Down));
        assert_eq!(matched_rows(&ctx), vec![2]);
        let hl = ctx.doc.row(2).unwrap().highlight();
        assert_eq!(&hl[..3], &[Highlight::Match; 3]);
        assert_eq!(&hl[3..], &[Highlight::Normal; 3]);
    }

    #[test]
    fn no_match_leaves_cursor_alone() {
        let mut ctx = ctx_with(&[b"abc", b"def"]);
        ctx.cursor = Cursor::at(1, 1);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "zzz");
        assert_eq!(engine.last_match(), None);
        assert_eq!((ctx.cursor.x, ctx.cursor.y), (1, 1));
    }

    #[test]
    fn empty_query_does_not_scan() {
        let mut ctx = ctx_with(&[b"abc"]);
        ctx.cursor = Cursor::at(2, 0);
        let mut engine = SearchEngine::new(&ctx);
        engine.on_keystroke(&mut ctx, "", key(KeyCode::Down));
        assert_eq!(engine.last_match(), None);
        assert_eq!(ctx.cursor.x, 2);
    }

    #[test]
    fn enter_keeps_position_and_clears_overlay() {
        let mut ctx = ctx_with(&[b"one", b"two"]);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "two");

        let step = engine.on_keystroke(&mut ctx, "two", key(KeyCode::Enter));
        assert_eq!(step, PromptStep::Accept("two".to_owned()));
        engine.finish(&mut ctx, Some("two".to_owned()));

        assert_eq!(ctx.cursor.y, 1);
        assert!(matched_rows(&ctx).is_empty());
        assert_eq!(engine.last_match(), None);
    }

    #[test]
    fn escape_restores_cursor_and_offsets() {
        let mut ctx = ctx_with(&[b"one", b"two", b"three"]);
        ctx.cursor = Cursor::at(1, 0);
        ctx.viewport.col_offset = 1;
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "three");
        assert_eq!(ctx.cursor.y, 2);

        let step = engine.on_keystroke(&mut ctx, "three", key(KeyCode::Escape));
        assert_eq!(step, PromptStep::Cancel);
        engine.finish(&mut ctx, None);

        assert_eq!((ctx.cursor.x, ctx.cursor.y), (1, 0));
        assert_eq!(ctx.viewport.row_offset, 0);
        assert_eq!(ctx.viewport.col_offset, 1);
        assert!(matched_rows(&ctx).is_empty());
    }

    #[test]
    fn empty_document_is_safe() {
        let mut ctx = ctx_with(&[]);
        let mut engine = SearchEngine::new(&ctx);
        type_query(&mut engine, &mut ctx, "x");
        engine.on_keystroke(&mut ctx, "x", key(KeyCode::Up));
        assert_eq!(engine.last_match(), None);
    }
}
