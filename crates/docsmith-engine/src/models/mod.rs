pub mod attachments;
pub mod document;
pub mod template;
pub mod version;

pub use attachments::{AttachmentId, AttachmentStore, is_data_uri, reference_tag};
pub use document::{Document, SectionValues};
pub use template::{SectionDef, SectionKind, Template, builtin_templates, find_template};
pub use version::{MAX_VERSIONS, Version, VersionHistory};
