//! # sp-editor — Editor core for simpad
//!
//! Everything between the decoded key and the frame bytes:
//!
//! - **[`row`]** / **[`document`]** — rows with tab-expanded render text and
//!   per-byte highlight, the ordered row list, and its persisted form
//! - **[`highlight`]** — the number classifier and highlight classes
//! - **[`cursor`]** / **[`viewport`]** — edit position and scroll offsets
//! - **[`context`]** — the explicit editor state passed to every operation
//! - **[`prompt`]** / **[`search`]** — the message-bar prompt and the
//!   incremental find that runs inside it
//! - **[`render`]** — frame composition
//! - **[`editor`]** — key to command dispatch; implements sp-term's `App`
//! - **[`store`]** — file access behind a trait, on disk or in memory

pub mod context;
pub mod cursor;
pub mod document;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod options;
pub mod prompt;
pub mod render;
pub mod row;
pub mod search;
pub mod status;
pub mod store;
pub mod viewport;
