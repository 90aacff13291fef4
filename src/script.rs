//! Script detection for choosing the writing direction of alternate names.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Latin,
    Greek,
    Cyrillic,
    Armenian,
    Hebrew,
    Arabic,
    Syriac,
    Thaana,
    Nko,
    Devanagari,
    Thai,
    Hangul,
    Kana,
    Han,
    Unknown,
}

impl Script {
    pub fn of_char(ch: char) -> Self {
        match ch as u32 {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => Self::Latin,
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Self::Greek,
            0x0400..=0x052F => Self::Cyrillic,
            0x0530..=0x058F => Self::Armenian,
            0x0590..=0x05FF | 0xFB1D..=0xFB4F => Self::Hebrew,
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF
            | 0xFE70..=0xFEFF => Self::Arabic,
            0x0700..=0x074F => Self::Syriac,
            0x0780..=0x07BF => Self::Thaana,
            0x07C0..=0x07FF => Self::Nko,
            0x0900..=0x097F => Self::Devanagari,
            0x0E00..=0x0E7F => Self::Thai,
            0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => Self::Hangul,
            0x3040..=0x30FF => Self::Kana,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Self::Han,
            _ => Self::Unknown,
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(
            self,
            Self::Hebrew | Self::Arabic | Self::Syriac | Self::Thaana | Self::Nko
        )
    }
}

/// Script of the first letter that belongs to a known script.
pub fn detect_script(text: &str) -> Script {
    text.chars()
        .map(Script::of_char)
        .find(|script| *script != Script::Unknown)
        .unwrap_or(Script::Unknown)
}

pub fn is_rtl_text(text: &str) -> bool {
    detect_script(text).is_rtl()
}
