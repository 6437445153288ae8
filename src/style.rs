//! Numeric formatting styles embedded in candidates.
//!
//! A candidate produced by number rewriting carries one of these styles so
//! that downstream stages can tell "１，２３４" apart from "千二百三十四"
//! without re-deriving it from the surface string. The container stores the
//! style but never interprets it; rendering and re-formatting happen in the
//! number rewriter.

use serde::{Deserialize, Serialize};

/// Formatting style of a numeric candidate. Not a bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum NumberStyle {
    /// No particular numeric styling.
    #[default]
    Default,
    /// Halfwidth Arabic with separators: "1,234".
    SeparatedArabicHalfwidth,
    /// Fullwidth Arabic with separators: "１，２３４".
    SeparatedArabicFullwidth,
    /// Plain halfwidth Arabic: "1234".
    ArabicHalfwidth,
    /// Plain fullwidth Arabic: "１２３４".
    ArabicFullwidth,
    /// Kanji numerals: "千二百三十四".
    Kanji,
    /// Old-style kanji numerals: "壱千弐百参拾四".
    OldKanji,
    /// Positional kanji digits: "一二三四".
    KanjiArabic,
    /// Capital Roman numerals: "Ⅻ".
    RomanCapital,
    /// Small Roman numerals: "ⅻ".
    RomanSmall,
    /// Circled numbers: "⑫".
    Circled,
    /// Hexadecimal: "0x4d2".
    Hex,
    /// Octal: "02322".
    Oct,
    /// Binary: "0b10011010010".
    Bin,
}

impl NumberStyle {
    /// Short label used in debug dumps.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            NumberStyle::Default => "default",
            NumberStyle::SeparatedArabicHalfwidth => "separated_arabic_halfwidth",
            NumberStyle::SeparatedArabicFullwidth => "separated_arabic_fullwidth",
            NumberStyle::ArabicHalfwidth => "arabic_halfwidth",
            NumberStyle::ArabicFullwidth => "arabic_fullwidth",
            NumberStyle::Kanji => "kanji",
            NumberStyle::OldKanji => "old_kanji",
            NumberStyle::KanjiArabic => "kanji_arabic",
            NumberStyle::RomanCapital => "roman_capital",
            NumberStyle::RomanSmall => "roman_small",
            NumberStyle::Circled => "circled",
            NumberStyle::Hex => "hex",
            NumberStyle::Oct => "oct",
            NumberStyle::Bin => "bin",
        }
    }
}

impl std::fmt::Display for NumberStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        assert_eq!(NumberStyle::default(), NumberStyle::Default);
    }

    #[test]
    fn test_style_labels_unique() {
        let styles = [
            NumberStyle::Default,
            NumberStyle::SeparatedArabicHalfwidth,
            NumberStyle::SeparatedArabicFullwidth,
            NumberStyle::ArabicHalfwidth,
            NumberStyle::ArabicFullwidth,
            NumberStyle::Kanji,
            NumberStyle::OldKanji,
            NumberStyle::KanjiArabic,
            NumberStyle::RomanCapital,
            NumberStyle::RomanSmall,
            NumberStyle::Circled,
            NumberStyle::Hex,
            NumberStyle::Oct,
            NumberStyle::Bin,
        ];
        let mut labels: Vec<&str> = styles.iter().map(NumberStyle::as_str).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), styles.len());
    }
}
