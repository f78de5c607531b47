//! Core of the docsmith structured document editor.
//!
//! Documents are authored against a [`Template`] of named sections. Section
//! text may reference stored images with `![alt](attachment:id)` and embed
//! `$..$` / `$$..$$` math; [`render`] turns it into safe markup. The
//! [`Editor`] controller owns the open document, its bounded version history
//! and debounced persistence into a [`KeyValueStore`].

pub mod clock;
pub mod diagram;
pub mod editing;
pub mod export;
pub mod generation;
pub mod io;
pub mod models;
pub mod render;

// Re-export key types for easier usage
pub use clock::{Clock, ManualClock, SystemClock};
pub use editing::{Editor, EditorError, InsertionPoint, SaveStatus};
pub use io::{FileStore, KeyValueStore, MemoryStore, Persistence, StoreError};
pub use models::{
    AttachmentId, AttachmentStore, Document, SectionDef, SectionKind, Template, Version,
    builtin_templates, find_template,
};
pub use render::{MathRenderer, NoMath, SafeMarkup, render, render_document};
