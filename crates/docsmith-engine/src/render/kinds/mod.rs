//! # Inline Kinds
//!
//! Types that own the delimiters of the inline reference syntax. The
//! pipeline passes refer to these constants and never hardcode `$$`, `$` or
//! the image reference shape.
//!
//! - **`MathBlock`**: `FENCE = b"$$"` - display math, may span lines
//! - **`MathInline`**: `DOLLAR = b'$'` - inline math, single line
//! - **`ImageRef`**: `![alt](attachment:id)` reference tag

pub mod image_ref;
pub mod math;

pub use image_ref::ImageRef;
pub use math::{MathBlock, MathInline};
