//! Renderer — composes one full frame as a single byte sequence.
//!
//! A frame is built in an [`AppendBuffer`] and written by the event loop in
//! one call. Its layout, top to bottom:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ text rows (viewport.rows() lines)  │  welcome / `~` / highlighted slice
//! │ ...                                │
//! ├────────────────────────────────────┤
//! │ name - N lines (modified)     y/N  │  status bar, reverse video
//! ├────────────────────────────────────┤
//! │ transient message                  │  message bar
//! └────────────────────────────────────┘
//! ```
//!
//! Lines are separated by `\r\n` with none after the last, so the frame
//! fills exactly [`Viewport::height`] lines and never scrolls the
//! terminal. When the viewport has fewer than two bars the message bar is
//! dropped first, then the status bar.
//!
//! The cursor is hidden while drawing and shown again at the end. Color
//! escapes are emitted only when the color changes between two bytes.
//!
//! [`Viewport::height`]: crate::viewport::Viewport::height

use std::time::Instant;

use sp_term::ansi::{self, Color};
use sp_term::output::AppendBuffer;

use crate::context::Context;
use crate::highlight::Highlight;
use crate::row::Row;

/// Longest file name shown on the status bar.
const STATUS_NAME_MAX: usize = 20;

/// Name shown for a document without a path.
const NO_NAME: &str = "[No Name]";

/// The line shown in an empty document.
#[must_use]
pub fn welcome_message() -> String {
    format!("Simpad editor -- version {}", env!("CARGO_PKG_VERSION"))
}

/// Build the frame for the current state. Call [`Context::scroll`] first.
#[must_use]
pub fn draw_frame(ctx: &Context, now: Instant) -> Vec<u8> {
    let mut out = AppendBuffer::new();

    ansi::cursor_hide(&mut out).ok();
    ansi::cursor_home(&mut out).ok();

    draw_rows(&mut out, ctx);
    if ctx.viewport.bars() >= 1 {
        out.append(b"\r\n");
        draw_status_bar(&mut out, ctx);
    }
    if ctx.viewport.bars() >= 2 {
        out.append(b"\r\n");
        draw_message_bar(&mut out, ctx, now);
    }

    let vp = &ctx.viewport;
    ansi::cursor_to(
        &mut out,
        ctx.cursor.rx.saturating_sub(vp.col_offset),
        ctx.cursor.y.saturating_sub(vp.row_offset),
    )
    .ok();
    ansi::cursor_show(&mut out).ok();

    out.into_bytes()
}

// ---------------------------------------------------------------------------
// Text area
// ---------------------------------------------------------------------------

fn draw_rows(out: &mut AppendBuffer, ctx: &Context) {
    let vp = &ctx.viewport;
    for y in 0..vp.rows() {
        if y > 0 {
            out.append(b"\r\n");
        }
        match ctx.doc.row(y + vp.row_offset) {
            Some(row) => draw_text(out, row, vp.col_offset, vp.cols()),
            None if ctx.doc.is_empty() && y == vp.rows() / 3 => draw_welcome(out, vp.cols()),
            None => out.push(b'~'),
        }
        ansi::erase_line(out).ok();
    }
}

fn draw_welcome(out: &mut AppendBuffer, cols: usize) {
    let message = welcome_message();
    let shown = &message.as_bytes()[..message.len().min(cols)];
    let mut padding = (cols - shown.len()) / 2;
    if padding > 0 {
        out.push(b'~');
        padding -= 1;
    }
    for _ in 0..padding {
        out.push(b' ');
    }
    out.append(shown);
}

/// Draw the visible slice of `row`, colored by highlight class.
fn draw_text(out: &mut AppendBuffer, row: &Row, col_offset: usize, cols: usize) {
    let render = row.render();
    let start = col_offset.min(render.len());
    let end = start.saturating_add(cols).min(render.len());
    let mut current: Option<Color> = None;

    for (&byte, &class) in render[start..end].iter().zip(&row.highlight()[start..end]) {
        if is_control(byte) {
            let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
            ansi::reverse(out).ok();
            out.push(symbol);
            ansi::reset(out).ok();
            if let Some(color) = current {
                ansi::fg(out, color).ok();
            }
        } else if class == Highlight::Normal {
            if current.take().is_some() {
                ansi::fg(out, Color::Default).ok();
            }
            out.push(byte);
        } else {
            let color = class.color();
            if current != Some(color) {
                current = Some(color);
                ansi::fg(out, color).ok();
            }
            out.push(byte);
        }
    }
    ansi::fg(out, Color::Default).ok();
}

const fn is_control(byte: u8) -> bool {
    byte < 0x20 || byte == 0x7F
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

fn draw_status_bar(out: &mut AppendBuffer, ctx: &Context) {
    let cols = ctx.viewport.cols();
    let name = ctx
        .doc
        .path()
        .map_or_else(|| NO_NAME.to_owned(), |p| p.display().to_string());
    let name: String = name.chars().take(STATUS_NAME_MAX).collect();
    let modified = if ctx.doc.is_modified() { " (modified)" } else { "" };

    let left = format!("{name} - {} lines{modified}", ctx.doc.len());
    let right = format!("{}/{}", ctx.cursor.y + 1, ctx.doc.len());

    ansi::reverse(out).ok();
    let left = &left.as_bytes()[..left.len().min(cols)];
    out.append(left);
    let mut len = left.len();
    while len < cols {
        if cols - len == right.len() {
            out.append(right.as_bytes());
            break;
        }
        out.push(b' ');
        len += 1;
    }
    ansi::reset(out).ok();
}

fn draw_message_bar(out: &mut AppendBuffer, ctx: &Context, now: Instant) {
    ansi::erase_line(out).ok();
    if let Some(text) = ctx.status.visible(now, ctx.options.message_timeout) {
        let cols = ctx.viewport.cols();
        out.append(&text.as_bytes()[..text.len().min(cols)]);
    }
}
