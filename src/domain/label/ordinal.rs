//! Bijection between ASCII letters and 1-based catalogue ordinals.
//!
//! Classifier labels of the form `product-<letter>` name catalogue rows by
//! position: `a` is row 1, `b` is row 2, up to `z` for row 26.

const LABEL_PREFIX: &str = "product-";
const LETTERS: u32 = 26;

/// Maps `a..=z` (either case) to `1..=26`.
pub fn letter_to_ordinal(letter: char) -> Option<u32> {
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    Some(letter.to_ascii_lowercase() as u32 - 'a' as u32 + 1)
}

/// Maps `1..=26` back to `a..=z`.
pub fn ordinal_to_letter(ordinal: u32) -> Option<char> {
    if !(1..=LETTERS).contains(&ordinal) {
        return None;
    }
    char::from_u32('a' as u32 + ordinal - 1)
}

/// A parsed `product-<letter>` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrdinalLabel {
    ordinal: u32,
}

impl OrdinalLabel {
    /// Parses `product-<letter>`; prefix and letter are case-insensitive,
    /// anything else (extra characters, digits) is not an ordinal label.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != LABEL_PREFIX.len() + 1 || !raw.is_char_boundary(LABEL_PREFIX.len()) {
            return None;
        }
        let (prefix, rest) = raw.split_at(LABEL_PREFIX.len());
        if !prefix.eq_ignore_ascii_case(LABEL_PREFIX) {
            return None;
        }
        let ordinal = letter_to_ordinal(rest.chars().next()?)?;
        Some(Self { ordinal })
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

/// Renders ordinal `n` back into its `product-<letter>` label.
pub fn ordinal_label(ordinal: u32) -> Option<String> {
    ordinal_to_letter(ordinal).map(|letter| format!("{}{}", LABEL_PREFIX, letter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijection_is_total_on_its_domain() {
        for ordinal in 1..=26 {
            let letter = ordinal_to_letter(ordinal).unwrap();
            assert_eq!(letter_to_ordinal(letter), Some(ordinal));
        }
        for letter in 'a'..='z' {
            let ordinal = letter_to_ordinal(letter).unwrap();
            assert_eq!(ordinal_to_letter(ordinal), Some(letter));
        }
        assert_eq!(ordinal_to_letter(0), None);
        assert_eq!(ordinal_to_letter(27), None);
        assert_eq!(letter_to_ordinal('1'), None);
    }

    #[test]
    fn parses_product_labels() {
        assert_eq!(OrdinalLabel::parse("product-a").unwrap().ordinal(), 1);
        assert_eq!(OrdinalLabel::parse("Product-C").unwrap().ordinal(), 3);
        assert_eq!(OrdinalLabel::parse(" product-z ").unwrap().ordinal(), 26);
        assert_eq!(ordinal_label(4).as_deref(), Some("product-d"));
        assert_eq!(ordinal_label(27), None);
    }

    #[test]
    fn rejects_near_misses() {
        assert!(OrdinalLabel::parse("product-").is_none());
        assert!(OrdinalLabel::parse("product-ab").is_none());
        assert!(OrdinalLabel::parse("product-1").is_none());
        assert!(OrdinalLabel::parse("produce-a").is_none());
        assert!(OrdinalLabel::parse("product-é").is_none());
    }
}
