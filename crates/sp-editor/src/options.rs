//! Editor options.
//!
//! A handful of knobs with sensible defaults. The binary fills them from
//! command-line flags; everything below the binary receives a finished
//! [`Options`] value and never reads configuration on its own.
//!
//! | Option            | Default | Meaning                                    |
//! |-------------------|---------|--------------------------------------------|
//! | `tab_stop`        | 8       | Tabs expand to the next multiple of this   |
//! | `quit_times`      | 3       | Extra Ctrl-Q presses to discard changes    |
//! | `message_timeout` | 5s      | How long a status message stays visible    |

use std::time::Duration;

/// Default tab stop width.
pub const DEFAULT_TAB_STOP: usize = 8;

/// Default number of confirming Ctrl-Q presses with unsaved changes.
pub const DEFAULT_QUIT_TIMES: u8 = 3;

/// Default visibility window for status messages.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Editor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Tab stop width in columns. Never zero.
    pub tab_stop: usize,
    /// Ctrl-Q presses needed to quit with unsaved changes.
    pub quit_times: u8,
    /// How long a status message stays on the message bar.
    pub message_timeout: Duration,
}

impl Options {
    /// Set the tab stop, clamping zero to one.
    #[must_use]
    pub const fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = if tab_stop == 0 { 1 } else { tab_stop };
        self
    }

    /// Set the quit confirmation count.
    #[must_use]
    pub const fn with_quit_times(mut self, quit_times: u8) -> Self {
        self.quit_times = quit_times;
        self
    }

    /// Set the message timeout.
    #[must_use]
    pub const fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
        }
    }
}
