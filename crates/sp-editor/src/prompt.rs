//! Prompt — a one-line input mode on the message bar.
//!
//! Save-as and find share one prompt routine. The prompt owns the input
//! line and edits it; everything else is delegated to a [`PromptHandler`],
//! which sees every keystroke and decides when the prompt closes.
//!
//! # Flow
//!
//! 1. [`Prompt::open`] shows the template with empty input
//! 2. Each key edits the input, then goes to
//!    [`PromptHandler::on_keystroke`]
//! 3. [`PromptStep::Accept`] or [`PromptStep::Cancel`] closes the prompt and
//!    hands the outcome to [`PromptHandler::finish`]

use sp_term::input::{KeyCode, KeyEvent};

use crate::context::Context;

/// Placeholder in a prompt template replaced by the current input.
pub const INPUT_PLACEHOLDER: &str = "{}";

// ---------------------------------------------------------------------------
// Handler interface
// ---------------------------------------------------------------------------

/// What the prompt should do after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStep {
    /// Keep reading keys.
    Continue,
    /// Close with this value.
    Accept(String),
    /// Close without a value.
    Cancel,
}

/// Strategy behind a prompt.
pub trait PromptHandler {
    /// Called after every key, once the input line has been edited.
    fn on_keystroke(&mut self, ctx: &mut Context, input: &str, key: KeyEvent) -> PromptStep;

    /// Called once when the prompt closes. `None` means cancelled.
    fn finish(&mut self, ctx: &mut Context, outcome: Option<String>);
}

/// The standard closing rule: Escape cancels, Enter accepts non-empty input.
#[must_use]
pub fn default_step(input: &str, key: KeyEvent) -> PromptStep {
    match key.code {
        KeyCode::Escape => PromptStep::Cancel,
        KeyCode::Enter if !input.is_empty() => PromptStep::Accept(input.to_owned()),
        _ => PromptStep::Continue,
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// An open prompt.
pub struct Prompt {
    template: String,
    input: String,
    handler: Box<dyn PromptHandler>,
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt")
            .field("template", &self.template)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl Prompt {
    /// Open a prompt. `template` must contain [`INPUT_PLACEHOLDER`].
    pub fn open(
        ctx: &mut Context,
        template: impl Into<String>,
        handler: Box<dyn PromptHandler>,
    ) -> Self {
        let prompt = Self {
            template: template.into(),
            input: String::new(),
            handler,
        };
        log::debug!("prompt opened: {:?}", prompt.template);
        prompt.show(ctx);
        prompt
    }

    /// The input typed so far.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Feed one key. Returns `true` once the prompt has closed.
    pub fn handle_key(&mut self, ctx: &mut Context, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Backspace | KeyCode::Delete => {
                self.input.pop();
            }
            KeyCode::Char(byte) if key.modifiers.is_empty() && is_printable(byte) => {
                self.input.push(char::from(byte));
            }
            _ => {}
        }

        match self.handler.on_keystroke(ctx, &self.input, key) {
            PromptStep::Continue => {
                self.show(ctx);
                false
            }
            PromptStep::Accept(value) => {
                log::debug!("prompt accepted: {value:?}");
                ctx.status.set("");
                self.handler.finish(ctx, Some(value));
                true
            }
            PromptStep::Cancel => {
                log::debug!("prompt cancelled");
                ctx.status.set("");
                self.handler.finish(ctx, None);
                true
            }
        }
    }

    fn show(&self, ctx: &mut Context) {
        ctx.status
            .set(self.template.replacen(INPUT_PLACEHOLDER, &self.input, 1));
    }
}

const fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E)
}
