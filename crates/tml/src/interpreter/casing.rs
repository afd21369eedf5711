//! Case mapping for the `upcase`, `downcase` and `capitalize` operations.
//!
//! Case rules use these to adjust inflected forms, e.g.
//! `(capitalize @value)`. Mapping is Unicode-aware and locale-independent.

use icu_casemap::CaseMapper;
use icu_locale_core::{LanguageIdentifier, langid};
use unicode_segmentation::UnicodeSegmentation;

fn root() -> LanguageIdentifier {
    langid!("und")
}

/// Uppercase the whole string.
pub fn upcase(text: &str) -> String {
    CaseMapper::new()
        .uppercase_to_string(text, &root())
        .to_string()
}

/// Lowercase the whole string.
pub fn downcase(text: &str) -> String {
    CaseMapper::new()
        .lowercase_to_string(text, &root())
        .to_string()
}

/// Uppercase the first grapheme, leaving the rest unchanged.
pub fn capitalize(text: &str) -> String {
    let mut graphemes = text.graphemes(true);
    match graphemes.next() {
        Some(first) => {
            let mut result = upcase(first);
            result.push_str(graphemes.as_str());
            result
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_grapheme_only() {
        assert_eq!(capitalize("élan vital"), "Élan vital");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn full_mappings() {
        assert_eq!(upcase("straße"), "STRASSE");
        assert_eq!(downcase("ДОМ"), "дом");
    }
}
