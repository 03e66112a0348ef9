/// Letter styles available in the Mathematical Alphanumeric Symbols block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextStyle {
    #[default]
    Plain,
    Bold,
    Italic,
    BoldItalic,
}

impl TextStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Plain,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }

    /// First code points of the styled `A` and `a`.
    fn bases(self) -> Option<(u32, u32)> {
        match self {
            Self::Plain => None,
            Self::Bold => Some((0x1D400, 0x1D41A)),
            Self::Italic => Some((0x1D434, 0x1D44E)),
            Self::BoldItalic => Some((0x1D468, 0x1D482)),
        }
    }
}

/// Map one character; anything outside `A-Z` / `a-z` is returned unchanged.
pub fn style_char(c: char, style: TextStyle) -> char {
    let Some((upper, lower)) = style.bases() else {
        return c;
    };
    // Mathematical italic small h is a hole in the block; Planck's constant stands in for it.
    if style == TextStyle::Italic && c == 'h' {
        return '\u{210E}';
    }
    let cp = match c {
        'A'..='Z' => upper + (c as u32 - 'A' as u32),
        'a'..='z' => lower + (c as u32 - 'a' as u32),
        _ => return c,
    };
    char::from_u32(cp).unwrap_or(c)
}

pub fn style_str(s: &str, style: TextStyle) -> String {
    s.chars().map(|c| style_char(c, style)).collect()
}
