//! Editor — key dispatch on top of the [`Context`].
//!
//! Keys are first mapped to a [`Command`], then executed. While a prompt is
//! open (save-as, find) every key goes to the prompt instead.
//!
//! # Key bindings
//!
//! | Key                    | Command                                   |
//! |------------------------|-------------------------------------------|
//! | Ctrl-Q                 | quit (confirmed when there are changes)   |
//! | Ctrl-S                 | save, prompting for a name if unnamed     |
//! | Ctrl-F                 | incremental find                          |
//! | Arrows, Home, End      | move                                      |
//! | PageUp, PageDown       | move one screenful                        |
//! | Backspace, Ctrl-H      | delete left                               |
//! | Delete                 | delete right                              |
//! | Enter                  | split line                                |
//! | Ctrl-L, Escape         | nothing (the frame is redrawn anyway)     |
//! | anything printable     | insert                                    |

use std::path::Path;
use std::time::Instant;

use sp_term::event_loop::{Action, App};
use sp_term::input::{KeyCode, KeyEvent, Modifiers};
use sp_term::terminal::Size;

use crate::context::Context;
use crate::cursor::Direction;
use crate::error::Result;
use crate::options::Options;
use crate::prompt::{Prompt, PromptHandler, PromptStep, default_step};
use crate::render;
use crate::search::{SEARCH_PROMPT, SearchEngine};
use crate::store::FileStore;
use crate::viewport::Viewport;

/// Message shown at startup.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

/// Prompt template for naming an unnamed document.
pub const SAVE_AS_PROMPT: &str = "Save as: {} (ESC to cancel)";

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A logical editor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save,
    Find,
    Move(Direction),
    Home,
    End,
    PageUp,
    PageDown,
    DeleteBackward,
    DeleteForward,
    Newline,
    Insert(u8),
    Noop,
}

/// Map a decoded key to its command.
#[must_use]
pub fn command_for(key: KeyEvent) -> Command {
    if key.modifiers.contains(Modifiers::CTRL) {
        return match key.code {
            KeyCode::Char(b'q') => Command::Quit,
            KeyCode::Char(b's') => Command::Save,
            KeyCode::Char(b'f') => Command::Find,
            _ => Command::Noop,
        };
    }

    match key.code {
        KeyCode::Char(byte) if byte >= 0x20 && byte != 0x7F => Command::Insert(byte),
        KeyCode::Char(_) | KeyCode::Escape => Command::Noop,
        KeyCode::Tab => Command::Insert(b'\t'),
        KeyCode::Enter => Command::Newline,
        KeyCode::Backspace => Command::DeleteBackward,
        KeyCode::Delete => Command::DeleteForward,
        KeyCode::Up => Command::Move(Direction::Up),
        KeyCode::Down => Command::Move(Direction::Down),
        KeyCode::Left => Command::Move(Direction::Left),
        KeyCode::Right => Command::Move(Direction::Right),
        KeyCode::Home => Command::Home,
        KeyCode::End => Command::End,
        KeyCode::PageUp => Command::PageUp,
        KeyCode::PageDown => Command::PageDown,
    }
}

// ---------------------------------------------------------------------------
// Save-as
// ---------------------------------------------------------------------------

/// Names the document from prompt input, then saves it.
struct SaveAs;

impl PromptHandler for SaveAs {
    fn on_keystroke(&mut self, _ctx: &mut Context, input: &str, key: KeyEvent) -> PromptStep {
        default_step(input, key)
    }

    fn finish(&mut self, ctx: &mut Context, outcome: Option<String>) {
        match outcome {
            Some(name) => {
                ctx.doc.set_path(name);
                // Failures are reported on the message bar.
                ctx.save().ok();
            }
            None => ctx.status.set("Save aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// The editor application.
pub struct Editor {
    ctx: Context,
    prompt: Option<Prompt>,
    quit_remaining: u8,
}

impl Editor {
    /// An editor on an empty, unnamed document.
    #[must_use]
    pub fn new(options: Options, store: Box<dyn FileStore>) -> Self {
        let viewport = Viewport::for_terminal(Size::new(80, 24));
        let mut ctx = Context::new(options, store, viewport);
        ctx.status.set(HELP_MESSAGE);
        Self {
            quit_remaining: options.quit_times,
            ctx,
            prompt: None,
        }
    }

    /// An editor on the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`](crate::error::Error::Open) if the file cannot
    /// be read.
    pub fn open(path: &Path, options: Options, store: Box<dyn FileStore>) -> Result<Self> {
        let mut editor = Self::new(options, store);
        editor.ctx.open(path)?;
        Ok(editor)
    }

    /// Shared editor state.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    /// Whether a prompt currently owns the keyboard.
    #[must_use]
    pub const fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    /// Handle one key.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if let Some(prompt) = &mut self.prompt {
            if prompt.handle_key(&mut self.ctx, key) {
                self.prompt = None;
            }
            self.quit_remaining = self.ctx.options.quit_times;
            return Action::Continue;
        }

        let command = command_for(key);
        if command == Command::Quit {
            return self.quit();
        }
        self.quit_remaining = self.ctx.options.quit_times;
        self.execute(command);
        Action::Continue
    }

    fn quit(&mut self) -> Action {
        if self.ctx.doc.is_modified() && self.quit_remaining > 0 {
            self.ctx.status.set(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_remaining
            ));
            self.quit_remaining -= 1;
            return Action::Continue;
        }
        log::info!("quit");
        Action::Quit
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Save => return self.save(),
            Command::Find => return self.find(),
            Command::PageUp => return self.page(Direction::Up),
            Command::PageDown => return self.page(Direction::Down),
            _ => {}
        }

        let ctx = &mut self.ctx;
        match command {
            Command::Move(direction) => ctx.cursor.step(direction, &ctx.doc),
            Command::Home => ctx.cursor.home(),
            Command::End => ctx.cursor.end(&ctx.doc),
            Command::DeleteBackward => ctx.delete_char(),
            Command::DeleteForward => {
                ctx.cursor.step(Direction::Right, &ctx.doc);
                ctx.delete_char();
            }
            Command::Newline => ctx.insert_newline(),
            Command::Insert(byte) => ctx.insert_char(byte),
            Command::Save
            | Command::Find
            | Command::PageUp
            | Command::PageDown
            | Command::Quit
            | Command::Noop => {}
        }
    }

    fn save(&mut self) {
        if self.ctx.doc.path().is_none() {
            self.prompt = Some(Prompt::open(&mut self.ctx, SAVE_AS_PROMPT, Box::new(SaveAs)));
            return;
        }
        // Failures are reported on the message bar.
        self.ctx.save().ok();
    }

    fn find(&mut self) {
        let engine = SearchEngine::new(&self.ctx);
        self.prompt = Some(Prompt::open(&mut self.ctx, SEARCH_PROMPT, Box::new(engine)));
    }

    /// Jump to the top (or bottom) visible row, then move a full screen.
    fn page(&mut self, direction: Direction) {
        let ctx = &mut self.ctx;
        let rows = ctx.viewport.rows();
        ctx.cursor.y = match direction {
            Direction::Up => ctx.viewport.row_offset,
            _ => (ctx.viewport.row_offset + rows - 1).min(ctx.doc.len()),
        };
        ctx.cursor.clamp(&ctx.doc);
        for _ in 0..rows {
            ctx.cursor.step(direction, &ctx.doc);
        }
    }
}

impl App for Editor {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        self.handle_key(key)
    }

    fn on_resize(&mut self, size: Size) {
        let mut viewport = Viewport::for_terminal(size);
        viewport.row_offset = self.ctx.viewport.row_offset;
        viewport.col_offset = self.ctx.viewport.col_offset;
        log::debug!("text area {}x{}", viewport.cols(), viewport.rows());
        self.ctx.viewport = viewport;
    }

    fn frame(&mut self) -> Vec<u8> {
        self.ctx.scroll();
        render::draw_frame(&self.ctx, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Cursor;
    use crate::document::Document;
    use crate::store::{FsStore, MemStore};
    use pretty_assertions::assert_eq;
    use sp_term::event_loop::EventLoop;
    use sp_term::terminal::ScriptedDriver;

    fn editor_with(lines: &[&[u8]]) -> Editor {
        let mut ed = Editor::new(Options::default(), Box::new(MemStore::new()));
        ed.ctx.doc = Document::from_lines(lines.iter().map(|l| l.to_vec()), 8);
        ed
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn type_bytes(ed: &mut Editor, bytes: &[u8]) {
        for &b in bytes {
            ed.handle_key(key(KeyCode::Char(b)));
        }
    }

    fn contents(ed: &Editor) -> Vec<Vec<u8>> {
        ed.context().doc.rows().iter().map(|r| r.chars().to_vec()).collect()
    }

    fn pos(ed: &Editor) -> (usize, usize) {
        (ed.context().cursor.x, ed.context().cursor.y)
    }

    // -- Command mapping --------------------------------------------------------

    #[test]
    fn command_table() {
        assert_eq!(command_for(KeyEvent::ctrl(b'q')), Command::Quit);
        assert_eq!(command_for(KeyEvent::ctrl(b's')), Command::Save);
        assert_eq!(command_for(KeyEvent::ctrl(b'f')), Command::Find);
        assert_eq!(command_for(KeyEvent::ctrl(b'l')), Command::Noop);
        assert_eq!(command_for(KeyEvent::ctrl(b'x')), Command::Noop);
        assert_eq!(command_for(key(KeyCode::Escape)), Command::Noop);
        assert_eq!(command_for(key(KeyCode::Char(b'a'))), Command::Insert(b'a'));
        assert_eq!(command_for(key(KeyCode::Char(0xE9))), Command::Insert(0xE9));
        assert_eq!(command_for(key(KeyCode::Char(0x1C))), Command::Noop);
        assert_eq!(command_for(key(KeyCode::Tab)), Command::Insert(b'\t'));
        assert_eq!(command_for(key(KeyCode::Backspace)), Command::DeleteBackward);
        assert_eq!(command_for(key(KeyCode::Delete)), Command::DeleteForward);
        assert_eq!(command_for(key(KeyCode::Up)), Command::Move(Direction::Up));
    }

    // -- Editing ------------------------------------------------------------------

    #[test]
    fn typing_into_empty_document() {
        let mut ed = editor_with(&[]);
        type_bytes(&mut ed, b"hi");
        ed.handle_key(key(KeyCode::Enter));
        type_bytes(&mut ed, b"there");
        assert_eq!(contents(&ed), vec![b"hi".to_vec(), b"there".to_vec()]);
        assert_eq!(pos(&ed), (5, 1));
    }

    #[test]
    fn delete_key_removes_right() {
        let mut ed = editor_with(&[b"abc"]);
        ed.handle_key(key(KeyCode::Delete));
        assert_eq!(contents(&ed), vec![b"bc".to_vec()]);
        assert_eq!(pos(&ed), (0, 0));
    }

    #[test]
    fn delete_at_row_end_joins_next_row() {
        let mut ed = editor_with(&[b"ab", b"cd"]);
        ed.handle_key(key(KeyCode::End));
        ed.handle_key(key(KeyCode::Delete));
        assert_eq!(contents(&ed), vec![b"abcd".to_vec()]);
        assert_eq!(pos(&ed), (2, 0));
    }

    #[test]
    fn ctrl_h_deletes_left() {
        let mut ed = editor_with(&[b"abc"]);
        ed.handle_key(key(KeyCode::End));
        ed.handle_key(sp_term::input::decode_byte(0x08));
        assert_eq!(contents(&ed), vec![b"ab".to_vec()]);
    }

    #[test]
    fn page_down_and_up_move_a_screenful() {
        let lines: Vec<Vec<u8>> = (0..100).map(|i| format!("{i}").into_bytes()).collect();
        let mut ed = editor_with(&[]);
        ed.ctx.doc = Document::from_lines(lines, 8);
        ed.on_resize(Size::new(80, 12));

        ed.handle_key(key(KeyCode::PageDown));
        assert_eq!(ed.context().cursor.y, 19);
        ed.frame();
        assert_eq!(ed.context().viewport.row_offset, 10);

        ed.handle_key(key(KeyCode::PageUp));
        assert_eq!(ed.context().cursor.y, 0);
    }

    #[test]
    fn cursor_stays_on_screen_across_tabbed_rows() {
        let lines: Vec<Vec<u8>> = (0..30)
            .map(|i| match i % 3 {
                0 => format!("\tone\ttwo\tthree {i}").into_bytes(),
                1 => b"a\t\tb".to_vec(),
                _ => Vec::new(),
            })
            .collect();
        let mut ed = editor_with(&[]);
        ed.ctx.doc = Document::from_lines(lines, 8);
        // Four text rows, eight columns: one tab stop per screen width.
        ed.on_resize(Size::new(8, 6));

        let mut keys = vec![KeyCode::Right; 20];
        keys.extend([
            KeyCode::End,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::End,
            KeyCode::Down,
            KeyCode::Down,
            KeyCode::PageDown,
            KeyCode::End,
            KeyCode::Up,
            KeyCode::Left,
            KeyCode::PageDown,
            KeyCode::PageDown,
            KeyCode::End,
            KeyCode::PageUp,
            KeyCode::Home,
            KeyCode::Right,
            KeyCode::Down,
            KeyCode::End,
        ]);

        for code in keys {
            ed.handle_key(key(code));
            ed.frame();
            let ctx = ed.context();
            assert!(
                ctx.viewport.contains(ctx.cursor.y, ctx.cursor.rx),
                "{code:?}: cursor {:?} outside {:?}",
                ctx.cursor,
                ctx.viewport
            );
        }
    }

    #[test]
    fn page_down_stops_past_last_row() {
        let mut ed = editor_with(&[b"a", b"b"]);
        ed.handle_key(key(KeyCode::PageDown));
        assert_eq!(ed.context().cursor.y, 2);
    }

    // -- Quit ----------------------------------------------------------------------

    #[test]
    fn clean_document_quits_immediately() {
        let mut ed = editor_with(&[b"a"]);
        assert_eq!(ed.handle_key(KeyEvent::ctrl(b'q')), Action::Quit);
    }

    #[test]
    fn dirty_document_needs_repeated_quit() {
        let mut ed = editor_with(&[]);
        type_bytes(&mut ed, b"x");

        for remaining in (1..=3).rev() {
            assert_eq!(ed.handle_key(KeyEvent::ctrl(b'q')), Action::Continue);
            assert_eq!(
                ed.context().status.text(),
                format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {remaining} more times to quit."
                )
            );
        }
        assert_eq!(ed.handle_key(KeyEvent::ctrl(b'q')), Action::Quit);
    }

    #[test]
    fn other_key_resets_quit_counter() {
        let mut ed = editor_with(&[]);
        type_bytes(&mut ed, b"x");
        ed.handle_key(KeyEvent::ctrl(b'q'));
        ed.handle_key(KeyEvent::ctrl(b'q'));
        ed.handle_key(key(KeyCode::Left));
        ed.handle_key(KeyEvent::ctrl(b'q'));
        assert!(ed.context().status.text().contains("Press Ctrl-Q 3 more"));
    }

    #[test]
    fn zero_quit_times_quits_dirty_document() {
        let mut ed = Editor::new(
            Options::default().with_quit_times(0),
            Box::new(MemStore::new()),
        );
        type_bytes(&mut ed, b"x");
        assert_eq!(ed.handle_key(KeyEvent::ctrl(b'q')), Action::Quit);
    }

    // -- Save --------------------------------------------------------------------

    #[test]
    fn save_with_path_writes_immediately() {
        let store = MemStore::new().with_file("doc.txt", b"a\n");
        let mut ed = Editor::open(Path::new("doc.txt"), Options::default(), Box::new(store)).unwrap();
        type_bytes(&mut ed, b"b");
        ed.handle_key(KeyEvent::ctrl(b's'));
        assert!(!ed.is_prompting());
        assert_eq!(ed.context().status.text(), "3 bytes written to disk");
        assert!(!ed.context().doc.is_modified());
    }

    #[test]
    fn save_unnamed_prompts_for_name() {
        let mut ed = editor_with(&[]);
        type_bytes(&mut ed, b"x");
        ed.handle_key(KeyEvent::ctrl(b's'));
        assert!(ed.is_prompting());
        assert_eq!(ed.context().status.text(), "Save as:  (ESC to cancel)");

        type_bytes(&mut ed, b"new.txt");
        assert_eq!(ed.context().status.text(), "Save as: new.txt (ESC to cancel)");
        ed.handle_key(key(KeyCode::Enter));

        assert!(!ed.is_prompting());
        assert_eq!(ed.context().doc.path(), Some(Path::new("new.txt")));
        assert_eq!(ed.context().status.text(), "2 bytes written to disk");
    }

    #[test]
    fn save_as_cancel_aborts() {
        let mut ed = editor_with(&[]);
        type_bytes(&mut ed, b"x");
        ed.handle_key(KeyEvent::ctrl(b's'));
        type_bytes(&mut ed, b"n");
        ed.handle_key(key(KeyCode::Escape));
        assert!(!ed.is_prompting());
        assert_eq!(ed.context().status.text(), "Save aborted");
        assert!(ed.context().doc.path().is_none());
        assert!(ed.context().doc.is_modified());
        assert_eq!(contents(&ed), vec![b"x".to_vec()]);
    }

    #[test]
    fn failed_save_is_reported_and_retryable() {
        let mut store = MemStore::new();
        store.set_fail_writes(true);
        let mut ed = Editor::new(Options::default(), Box::new(store));
        ed.ctx.doc.set_path("x.txt");
        type_bytes(&mut ed, b"x");
        ed.handle_key(KeyEvent::ctrl(b's'));
        assert!(ed.context().status.text().starts_with("Can't save!"));
        assert!(ed.context().doc.is_modified());
    }

    #[test]
    fn open_missing_file_fails() {
        let result = Editor::open(
            Path::new("nope.txt"),
            Options::default(),
            Box::new(MemStore::new()),
        );
        assert!(result.is_err());
    }

    // -- Find ------------------------------------------------------------------

    #[test]
    fn find_then_escape_restores_cursor() {
        let mut ed = editor_with(&[b"alpha", b"beta", b"gamma"]);
        ed.ctx.cursor = Cursor::at(2, 0);
        ed.handle_key(KeyEvent::ctrl(b'f'));
        assert_eq!(ed.context().status.text(), "Search:  (Use ESC/Arrows/Enter)");

        type_bytes(&mut ed, b"gam");
        assert_eq!(pos(&ed), (0, 2));
        ed.handle_key(key(KeyCode::Escape));
        assert!(!ed.is_prompting());
        assert_eq!(pos(&ed), (2, 0));
    }

    #[test]
    fn find_then_enter_keeps_match_position() {
        let mut ed = editor_with(&[b"alpha", b"beta", b"gamma"]);
        ed.handle_key(KeyEvent::ctrl(b'f'));
        type_bytes(&mut ed, b"ta");
        ed.handle_key(key(KeyCode::Enter));
        assert!(!ed.is_prompting());
        assert_eq!(pos(&ed), (2, 1));
    }

    #[test]
    fn prompt_keys_do_not_edit_document() {
        let mut ed = editor_with(&[b"abc"]);
        ed.handle_key(KeyEvent::ctrl(b'f'));
        type_bytes(&mut ed, b"zz");
        ed.handle_key(key(KeyCode::Escape));
        assert_eq!(contents(&ed), vec![b"abc".to_vec()]);
        assert!(!ed.context().doc.is_modified());
    }

    // -- Through the event loop ----------------------------------------------------

    #[test]
    fn scripted_session_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");

        let mut input = b"hello\x13".to_vec();
        input.extend_from_slice(path.to_str().unwrap().as_bytes());
        input.extend_from_slice(b"\r\x11");

        let mut ed = Editor::new(Options::default(), Box::new(FsStore));
        let mut event_loop = EventLoop::new(ScriptedDriver::new(Size::new(40, 10), &input));
        event_loop.run(&mut ed).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello\n");
        let last = event_loop.driver().last_write().unwrap();
        assert_eq!(last, b"\x1b[2J\x1b[H");
    }

    #[test]
    fn frames_show_cursor_after_drawing() {
        let mut ed = editor_with(&[b"abc"]);
        let mut event_loop = EventLoop::new(ScriptedDriver::new(Size::new(40, 10), b"\x11"));
        event_loop.run(&mut ed).unwrap();
        let first = &event_loop.driver().writes()[0];
        assert!(first.ends_with(b"\x1b[?25h"));
    }
}
