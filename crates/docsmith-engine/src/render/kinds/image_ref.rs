/// Image reference tag: `![alt](attachment:id)`.
///
/// Alt text and id are matched non-greedily and never span a line break.
/// None of the characters in the tag syntax are touched by escaping, so the
/// pattern runs unchanged over escaped text.
pub struct ImageRef;

impl ImageRef {
    pub const PATTERN: &'static str = r"!\[(.*?)\]\(attachment:(.*?)\)";
}
