/// Display math: `$$expr$$`. Takes precedence over inline math.
pub struct MathBlock;

impl MathBlock {
    pub const FENCE: &'static [u8; 2] = b"$$";
}

/// Inline math: `$expr$`. Never spans a line break.
pub struct MathInline;

impl MathInline {
    pub const DOLLAR: u8 = b'$';
    pub const LINE_BREAK: u8 = b'\n';
}
