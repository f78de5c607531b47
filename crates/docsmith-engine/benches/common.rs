// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use docsmith_engine::AttachmentStore;

#[allow(dead_code)]
pub fn generate_plain_text(paragraphs: usize) -> String {
    let base = "Plain paragraph with <angle brackets> & \"quotes\" that need escaping.\nSecond line of the paragraph.\n\n";
    base.repeat(paragraphs)
}

/// Section text mixing prose, math and attachment references, plus a store
/// holding every referenced attachment.
#[allow(dead_code)]
pub fn generate_rich_section(paragraphs: usize) -> (String, AttachmentStore) {
    let mut store = AttachmentStore::new();
    let mut text = String::new();

    for i in 0..paragraphs {
        let id = store.insert(format!("data:image/png;base64,{}", "QUJD".repeat(64)));
        text.push_str(&format!("Paragraph {i} has inline math $x_{i} < y$ and a figure.\n"));
        text.push_str(&format!("![Figure {i}](attachment:{id})\n"));
        if i % 3 == 0 {
            text.push_str("$$\\sum_{k=0}^{n} k = \\frac{n(n+1)}{2}$$\n");
        }
        if i % 5 == 0 {
            text.push_str("A dangling $ sign and a ![missing](attachment:img_gone) reference.\n");
        }
        text.push('\n');
    }

    (text, store)
}
