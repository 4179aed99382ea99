// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns the raw byte stream coming out of a raw-mode terminal into logical
// key events: plain bytes, control combinations, and the handful of
// multi-byte navigation sequences VT100-style terminals send.
//
// # Design
//
// The decoder is a fixed-lookahead state machine rooted at ESC (0x1B):
//
//   ESC [ A|B|C|D|H|F      → arrows, Home, End
//   ESC [ 1..8 ~           → Home, Delete, End, PageUp, PageDown
//   ESC O H|F              → Home, End (alternate encoding)
//   anything else          → bare Escape
//
// It never buffers more than three bytes past the ESC and never blocks
// longer than the source's read timeout per byte. A sequence that is cut
// short by a timeout, or that doesn't match, collapses into a bare Escape.
// Decoding never fails; only the underlying read can.

use std::collections::VecDeque;
use std::io;

use bitflags::bitflags;

const ESC: u8 = 0x1B;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event: key identity plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// `Ctrl` + an ASCII letter (given lowercase).
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self {
            code: KeyCode::Char(letter),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Whether this is `Ctrl` + `letter`.
    #[must_use]
    pub fn is_ctrl(&self, letter: u8) -> bool {
        self.modifiers.contains(Modifiers::CTRL) && self.code == KeyCode::Char(letter)
    }
}

/// Identity of a key.
///
/// Text is byte-oriented: [`Char`](KeyCode::Char) carries the raw byte as
/// typed, including bytes above 0x7F.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A plain byte.
    Char(u8),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// A legacy terminal can only tell us about Ctrl, and only for the
    /// letters that fold into 0x01..=0x1A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0000_0100;
    }
}

// ─── Byte Sources ───────────────────────────────────────────────────────────

/// Anything the decoder can pull bytes from.
///
/// `Ok(None)` means the read timed out with no data. That is not an error:
/// the caller treats it as an empty tick.
pub trait ByteSource {
    /// Read one byte, waiting at most the source's timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails for a reason other
    /// than "no data yet".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// A queue of bytes. Once drained, every read times out.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Converts a [`ByteSource`] into a stream of [`KeyEvent`]s.
///
/// # Example
///
/// ```
/// use std::collections::VecDeque;
/// use sp_term::input::{KeyCode, KeyDecoder, KeyEvent};
///
/// let mut decoder = KeyDecoder::new(VecDeque::from(b"\x1b[A".to_vec()));
/// assert_eq!(decoder.next_key()?, Some(KeyEvent::plain(KeyCode::Up)));
/// assert_eq!(decoder.next_key()?, None);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct KeyDecoder<S> {
    source: S,
}

impl<S: ByteSource> KeyDecoder<S> {
    /// Wrap a byte source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Decode the next key.
    ///
    /// Returns `Ok(None)` when the first read times out. Once a key has
    /// started (an ESC arrived), later timeouts shorten the sequence instead.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the source.
    pub fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        let Some(byte) = self.source.read_byte()? else {
            return Ok(None);
        };
        if byte == ESC {
            return self.decode_escape().map(Some);
        }
        Ok(Some(decode_byte(byte)))
    }

    fn decode_escape(&mut self) -> io::Result<KeyEvent> {
        let escape = KeyEvent::plain(KeyCode::Escape);

        let Some(first) = self.source.read_byte()? else {
            return Ok(escape);
        };
        let Some(second) = self.source.read_byte()? else {
            return Ok(escape);
        };

        let code = match (first, second) {
            (b'[', digit @ b'0'..=b'9') => {
                if self.source.read_byte()? != Some(b'~') {
                    return Ok(escape);
                }
                match digit {
                    b'1' | b'7' => KeyCode::Home,
                    b'3' => KeyCode::Delete,
                    b'4' | b'8' => KeyCode::End,
                    b'5' => KeyCode::PageUp,
                    b'6' => KeyCode::PageDown,
                    _ => return Ok(escape),
                }
            }
            (b'[', b'A') => KeyCode::Up,
            (b'[', b'B') => KeyCode::Down,
            (b'[', b'C') => KeyCode::Right,
            (b'[', b'D') => KeyCode::Left,
            (b'[' | b'O', b'H') => KeyCode::Home,
            (b'[' | b'O', b'F') => KeyCode::End,
            _ => return Ok(escape),
        };

        Ok(KeyEvent::plain(code))
    }
}

/// Map a single non-ESC byte to a key.
#[must_use]
pub const fn decode_byte(byte: u8) -> KeyEvent {
    match byte {
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x00 => KeyEvent::ctrl(b'@'),
        b @ 0x01..=0x1A => KeyEvent::ctrl(b + b'a' - 1),
        b => KeyEvent::plain(KeyCode::Char(b)),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
