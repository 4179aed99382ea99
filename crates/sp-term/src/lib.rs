// SPDX-License-Identifier: MIT
//
// sp-term — Terminal plumbing for simpad.
//
// Everything that touches the terminal lives here: raw mode and window
// size (`terminal`), the escape-sequence key decoder (`input`), the ANSI
// command encoders (`ansi`), the per-frame append buffer (`output`), and
// the single-threaded draw/read loop (`event_loop`).
//
// Direct termios and hand-written escape sequences, no TUI framework: the
// editor emits a small, fixed set of VT100 commands and decodes a small,
// fixed set of key sequences.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod terminal;
