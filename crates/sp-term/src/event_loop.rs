// SPDX-License-Identifier: MIT
//
// Event loop — the heartbeat of the editor.
//
// One thread, one loop, two steps per iteration:
//
//   1. Draw: the application composes a complete frame and the loop writes
//      it to the driver in a single call.
//   2. Read: the decoder pulls one key from the driver. The driver's read
//      timeout (100ms for the real terminal) turns "no input" into an idle
//      tick, so the loop keeps drawing even while the user does nothing.
//      That is how transient messages expire without a timer thread.
//
// There is nothing to cancel mid-flight: a key is handled completely before
// the next frame is drawn.

use std::io;

use crate::ansi;
use crate::input::{KeyDecoder, KeyEvent};
use crate::terminal::{Driver, Size};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Only [`on_key`](App::on_key) and [`frame`](App::frame) are required.
pub trait App {
    /// Handle a decoded key. Return [`Action::Quit`] to exit the loop.
    fn on_key(&mut self, key: KeyEvent) -> Action;

    /// Called once with the window size before the first frame.
    fn on_resize(&mut self, _size: Size) {}

    /// Called when a read times out with no input.
    fn on_tick(&mut self) {}

    /// Compose the next frame. The returned bytes are written in one call.
    fn frame(&mut self) -> Vec<u8>;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Drives an [`App`] from a [`Driver`].
///
/// # Example
///
/// ```
/// use sp_term::event_loop::{Action, App, EventLoop};
/// use sp_term::input::KeyEvent;
/// use sp_term::terminal::{ScriptedDriver, Size};
///
/// struct QuitOnAnyKey;
///
/// impl App for QuitOnAnyKey {
///     fn on_key(&mut self, _key: KeyEvent) -> Action {
///         Action::Quit
///     }
///
///     fn frame(&mut self) -> Vec<u8> {
///         b"hello".to_vec()
///     }
/// }
///
/// let driver = ScriptedDriver::new(Size::new(80, 24), b"x");
/// let mut event_loop = EventLoop::new(driver);
/// event_loop.run(&mut QuitOnAnyKey)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct EventLoop<D> {
    driver: D,
}

impl<D: Driver> EventLoop<D> {
    /// Wrap a driver.
    pub const fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Shared access to the driver.
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver.
    pub const fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Consume the loop and return the driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Tell the application how big the window is.
    ///
    /// # Errors
    ///
    /// Returns an error if the window size cannot be determined.
    pub fn start<A: App + ?Sized>(&mut self, app: &mut A) -> io::Result<Size> {
        let size = self.driver.window_size()?;
        log::debug!("window size {}x{}", size.cols, size.rows);
        app.on_resize(size);
        Ok(size)
    }

    /// Draw one frame, then read and dispatch at most one key.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the frame or reading input fails.
    pub fn step<A: App + ?Sized>(&mut self, app: &mut A) -> io::Result<Action> {
        let frame = app.frame();
        self.driver.write_bytes(&frame)?;

        match KeyDecoder::new(&mut self.driver).next_key()? {
            Some(key) => Ok(app.on_key(key)),
            None => {
                app.on_tick();
                Ok(Action::Continue)
            }
        }
    }

    /// Run until the application returns [`Action::Quit`], then clear the
    /// screen and home the cursor.
    ///
    /// # Errors
    ///
    /// Returns the first driver error. The caller owns restoring the screen
    /// in that case.
    pub fn run<A: App + ?Sized>(&mut self, app: &mut A) -> io::Result<()> {
        self.start(app)?;
        while self.step(app)? == Action::Continue {}

        let mut goodbye = Vec::with_capacity(8);
        ansi::clear_screen(&mut goodbye)?;
        ansi::cursor_home(&mut goodbye)?;
        self.driver.write_bytes(&goodbye)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
