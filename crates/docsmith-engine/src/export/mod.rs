//! Word-compatible export of a document's section values.
//!
//! Word opens HTML saved with a `.doc` extension, so the export is a plain
//! markup dump: every section becomes a heading and a paragraph. Attachment
//! references and math are left as their literal text.

use crate::models::{SectionValues, Template};
use crate::render::escape;

/// File extension of exported documents.
pub const EXPORT_EXTENSION: &str = "doc";

/// Project template and section values into a markup document.
pub fn to_markup(template: &Template, values: &SectionValues) -> String {
    let mut out = String::new();
    out.push_str(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:w=\"urn:schemas-microsoft-com:office:word\" \
         xmlns=\"http://www.w3.org/TR/REC-html40\">\n",
    );
    out.push_str("<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&template.name).as_str()));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&template.name).as_str()));

    for section in &template.sections {
        out.push_str(&format!("<h2>{}</h2>\n", escape(&section.label).as_str()));
        out.push_str(&format!(
            "<p>{}</p>\n",
            escape(values.get(&section.id)).with_line_breaks()
        ));
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// File name for an export of `template`, e.g. `lab-report.doc`.
pub fn export_file_name(template: &Template) -> String {
    let stem: String = template
        .id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "document".to_string() } else { stem };
    format!("{stem}.{EXPORT_EXTENSION}")
}
