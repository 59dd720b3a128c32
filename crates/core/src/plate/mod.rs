//! Civilian license-plate grammar and canonicalization.
//!
//! Plates use a 12-letter alphabet whose glyphs exist in both Cyrillic and
//! Latin (А/A, В/B, ...). OCR output mixes the two freely, so validation
//! accepts either script and [`canonicalize`] folds everything to Cyrillic.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Grammar: one letter, three digits, two letters, two-or-three digits.
/// Letters come from the Cyrillic/Latin-confusable alphabet only.
static PLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[АВЕКМНОРСТУХABEKMHOPCTYX]\d{3}[АВЕКМНОРСТУХABEKMHOPCTYX]{2}\d{2,3}$").unwrap()
});

/// Whether `text` is a well-formed plate identifier (8 or 9 symbols).
///
/// Used both to filter raw OCR reads and to validate user-supplied
/// search queries. Pure, no side effects.
pub fn is_valid_plate(text: &str) -> bool {
    PLATE_RE.is_match(text)
}

/// Map a Latin letter to its visually identical Cyrillic counterpart.
///
/// Digits and already-Cyrillic letters pass through unchanged.
pub fn to_cyrillic(symbol: char) -> char {
    match symbol {
        'A' => 'А',
        'B' => 'В',
        'E' => 'Е',
        'K' => 'К',
        'M' => 'М',
        'H' => 'Н',
        'O' => 'О',
        'P' => 'Р',
        'C' => 'С',
        'T' => 'Т',
        'Y' => 'У',
        'X' => 'Х',
        other => other,
    }
}

/// Fold a plate string to its canonical all-Cyrillic form.
pub fn canonicalize(plate: &str) -> String {
    plate.chars().map(to_cyrillic).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_cyrillic_plate() {
        assert!(is_valid_plate("А123ВС45"));
    }

    #[test]
    fn test_accepts_latin_plate() {
        assert!(is_valid_plate("X471HK96"));
    }

    #[test]
    fn test_accepts_three_digit_region() {
        assert!(is_valid_plate("О777ОО777"));
        assert!(is_valid_plate("K001MP196"));
    }

    #[test]
    fn test_accepts_mixed_script() {
        // OCR routinely mixes scripts within one read
        assert!(is_valid_plate("Х471HК96"));
    }

    #[test]
    fn test_rejects_malformed() {
        // Two leading letters
        assert!(!is_valid_plate("AB123C45"));
        // Digits only
        assert!(!is_valid_plate("1234567"));
        // Letter outside the alphabet
        assert!(!is_valid_plate("Z123AB45"));
        assert!(!is_valid_plate("Ж123АВ45"));
        // Wrong lengths
        assert!(!is_valid_plate("А123ВС4"));
        assert!(!is_valid_plate("А123ВС4567"));
        // Empty
        assert!(!is_valid_plate(""));
    }

    #[test]
    fn test_rejects_lowercase() {
        assert!(!is_valid_plate("x471hk96"));
    }

    #[test]
    fn test_to_cyrillic_covers_alphabet() {
        let latin = "ABEKMHOPCTYX";
        let cyrillic = "АВЕКМНОРСТУХ";
        for (l, c) in latin.chars().zip(cyrillic.chars()) {
            assert_eq!(to_cyrillic(l), c);
        }
    }

    #[test]
    fn test_to_cyrillic_leaves_digits() {
        for d in '0'..='9' {
            assert_eq!(to_cyrillic(d), d);
        }
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("X471HK96"), "Х471НК96");
        // Already canonical
        assert_eq!(canonicalize("А123ВС45"), "А123ВС45");
    }
}
