//! # Section Editing
//!
//! The [`Editor`] controller owns the open document session. It validates
//! section ids against the selected template, routes edits into the
//! [`Document`](crate::models::Document) model and schedules persistence.
//!
//! ## Save lifecycle
//!
//! Every mutation marks the session [`SaveStatus::Dirty`] and re-arms a
//! [`Debouncer`]. The host calls [`Editor::tick`] from its event loop; once
//! the quiet period has elapsed the whole document is written in a single
//! record and the status returns to clean. Saving a named version bypasses
//! the debounce and writes at once.
//!
//! Time is injected through [`Clock`](crate::clock::Clock), so tests drive
//! the debounce deterministically with a manual clock.

pub mod debounce;
pub mod editor;
pub mod insertion;
pub mod status;

pub use debounce::{DEFAULT_DEBOUNCE_MS, Debouncer};
pub use editor::{Editor, EditorError, GenerationFailure, GenerationTicket};
pub use insertion::{InsertionPoint, splice};
pub use status::SaveStatus;
