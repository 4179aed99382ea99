// SPDX-License-Identifier: MIT
//
// Terminal driver — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), and raw fd reads/writes. These are the
// standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// The editor talks to the terminal through the `Driver` trait: read one
// byte with a bounded wait, write a batch of bytes, ask for the window
// size. `Terminal` is the real implementation. `ScriptedDriver` replays
// canned input and records output so the event loop and renderer can be
// exercised without a TTY.
//
// Raw mode uses VMIN=0 / VTIME=1: `read()` returns after at most 100ms
// with zero bytes if nothing was typed. That timeout is the loop's only
// suspension point and also bounds each byte of an escape sequence.

use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::input::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

// ─── Driver ─────────────────────────────────────────────────────────────────

/// The terminal as the editor sees it.
pub trait Driver: ByteSource {
    /// Write `bytes` in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Query the current window size.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined by any means.
    fn window_size(&mut self) -> io::Result<Size>;
}

// ─── Cursor Position Report ─────────────────────────────────────────────────

/// Longest reply we accept to a cursor position request.
const MAX_REPORT_LEN: usize = 32;

/// Parse a cursor position report: `ESC [ rows ; cols R`.
///
/// The trailing `R` is optional so the caller can stop reading at it.
#[must_use]
pub fn parse_cursor_report(report: &[u8]) -> Option<Size> {
    let body = report.strip_prefix(b"\x1b[")?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let rows = rows.parse::<u16>().ok()?;
    let cols = cols.parse::<u16>().ok()?;
    (rows > 0 && cols > 0).then_some(Size { cols, rows })
}

/// Measure the window by parking the cursor in the far corner and asking
/// where it ended up.
fn measure_via_cursor<D: Driver + ?Sized>(driver: &mut D) -> io::Result<Size> {
    let mut request = Vec::with_capacity(16);
    ansi::cursor_to_far_corner(&mut request)?;
    ansi::request_cursor_position(&mut request)?;
    driver.write_bytes(&request)?;

    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    while reply.len() < MAX_REPORT_LEN {
        match driver.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => reply.push(b),
        }
    }

    parse_cursor_report(&reply)
        .ok_or_else(|| io::Error::other("cannot determine terminal window size"))
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup lets the hook restore cooked mode
/// without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Reset SGR, show the cursor, clear the screen, home the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence straight to stdout's file descriptor.
///
/// Skips `io::stdout()` so a panic raised while its lock is held cannot
/// deadlock or panic again.
fn emergency_restore() {
    #[cfg(unix)]
    {
        let _ = write_fd(libc::STDOUT_FILENO, EMERGENCY_RESTORE);
    }

    #[cfg(not(unix))]
    {
        use std::io::Write;

        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

/// Write all of `bytes` to `fd` with `write(2)`, resuming after partial
/// writes and `EINTR`.
///
/// A frame that fits the kernel buffer leaves in a single call. Rust's
/// line-buffered stdout would instead split it at the last newline.
#[cfg(unix)]
fn write_fd(fd: libc::c_int, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        let rest = &bytes[written..];
        let n = unsafe { libc::write(fd, rest.as_ptr().cast::<libc::c_void>(), rest.len()) };
        match usize::try_from(n) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(n) => written += n,
            Err(_) => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
    Ok(())
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The process's controlling terminal, in raw mode while active.
///
/// Raw mode is restored when the handle is dropped, and by the panic hook
/// if the editor panics mid-frame.
///
/// # Example
///
/// ```no_run
/// use sp_term::terminal::{Driver, Terminal};
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// let size = term.window_size()?;
/// // ... read keys, write frames ...
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    /// Where frames are written; stdout outside of tests.
    #[cfg(unix)]
    output_fd: libc::c_int,
}

impl Default for Terminal {
    fn default() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            #[cfg(unix)]
            output_fd: libc::STDOUT_FILENO,
        }
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Terminal {
    /// Create a handle. Does **not** enter raw mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether raw mode is currently active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.original_termios.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Enter raw mode. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be read or set
    /// (for instance when stdin is not a terminal).
    #[cfg(unix)]
    pub fn enter(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if self.original_termios.is_some() {
            return Ok(());
        }

        install_panic_hook();
        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after 100ms with or without data.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        log::debug!("terminal entered raw mode");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn enter(&mut self) -> io::Result<()> {
        Err(io::Error::other("raw mode is only supported on unix"))
    }

    /// Restore the terminal attributes saved by [`enter`](Self::enter).
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes cannot be restored.
    #[cfg(unix)]
    pub fn leave(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        let Some(original) = self.original_termios.take() else {
            return Ok(());
        };
        let fd = io::stdin().as_raw_fd();

        unsafe {
            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        log::debug!("terminal left raw mode");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn leave(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Query the window size via `ioctl(TIOCGWINSZ)`.
    #[cfg(unix)]
    fn ioctl_size() -> Option<Size> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

        (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }

    #[cfg(not(unix))]
    fn ioctl_size() -> Option<Size> {
        None
    }
}

impl ByteSource for Terminal {
    #[cfg(unix)]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

impl Driver for Terminal {
    #[cfg(unix)]
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        write_fd(self.output_fd, bytes)
    }

    #[cfg(not(unix))]
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        use std::io::Write;

        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    }

    fn window_size(&mut self) -> io::Result<Size> {
        match Self::ioctl_size() {
            Some(size) => Ok(size),
            None => {
                log::debug!("TIOCGWINSZ unavailable, measuring via cursor report");
                measure_via_cursor(self)
            }
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── ScriptedDriver ─────────────────────────────────────────────────────────

/// An in-memory [`Driver`]: replays queued input, records every write.
///
/// Once the input queue is drained every read times out, which the event
/// loop treats as an idle tick.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    input: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    size: Option<Size>,
}

impl ScriptedDriver {
    /// A driver reporting `size` with `input` queued.
    #[must_use]
    pub fn new(size: Size, input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            writes: Vec::new(),
            size: Some(size),
        }
    }

    /// A driver whose window size cannot be queried directly, so it must
    /// be measured from the queued cursor report.
    #[must_use]
    pub fn without_size(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            writes: Vec::new(),
            size: None,
        }
    }

    /// Queue more input.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Every `write_bytes` call so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// The most recent write.
    #[must_use]
    pub fn last_write(&self) -> Option<&[u8]> {
        self.writes.last().map(Vec::as_slice)
    }
}

impl ByteSource for ScriptedDriver {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }
}

impl Driver for ScriptedDriver {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writes.push(bytes.to_vec());
        Ok(())
    }

    fn window_size(&mut self) -> io::Result<Size> {
        match self.size {
            Some(size) => Ok(size),
            None => measure_via_cursor(self),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
