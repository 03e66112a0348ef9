//! Caption rich text to styled Unicode.

pub mod format;
pub mod unicode;

pub use format::format_caption;
pub use unicode::TextStyle;
