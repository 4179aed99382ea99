//! Status message — the transient line on the message bar.
//!
//! A message is stamped with the instant it was set and is shown only while
//! it is younger than the configured timeout.

use std::time::{Duration, Instant};

/// The most recent status message and when it was set.
#[derive(Debug, Clone, Default)]
pub struct StatusMessage {
    text: String,
    set_at: Option<Instant>,
}

impl StatusMessage {
    /// Replace the message, stamped now.
    pub fn set(&mut self, text: impl Into<String>) {
        self.set_at_instant(text, Instant::now());
    }

    /// Replace the message with an explicit timestamp.
    pub fn set_at_instant(&mut self, text: impl Into<String>, at: Instant) {
        self.text = text.into();
        self.set_at = Some(at);
    }

    /// The message text, regardless of age.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message if it is still within `timeout` of being set.
    #[must_use]
    pub fn visible(&self, now: Instant, timeout: Duration) -> Option<&str> {
        let set_at = self.set_at?;
        let fresh = now.saturating_duration_since(set_at) < timeout;
        (fresh && !self.text.is_empty()).then_some(self.text.as_str())
    }
}
