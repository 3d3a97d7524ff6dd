//! Fixed bilingual term dictionaries used when remote translation is unavailable.

/// English -> Spanish domain terms. Longest match wins during substitution.
const EN_ES: &[(&str, &str)] = &[
    ("Allergen Information", "Información de alérgenos"),
    ("common allergens", "alérgenos comunes"),
    ("Total Carbs", "Carbohidratos totales"),
    ("Cholesterol", "Colesterol"),
    ("may contain", "puede contener"),
    ("Total Fat", "Grasa total"),
    ("free from", "libre de"),
    ("Calories", "Calorías"),
    ("contains", "contiene"),
    ("Protein", "Proteína"),
    ("Sodium", "Sodio"),
    ("Fiber", "Fibra"),
    ("Sugar", "Azúcar"),
    ("Price", "Precio"),
    ("Carbs", "Carbohidratos"),
    ("Fat", "Grasa"),
];

#[derive(Debug, Clone, Copy)]
pub struct TermDictionary {
    terms: &'static [(&'static str, &'static str)],
}

impl TermDictionary {
    /// Dictionary for a primary language subtag, if one exists.
    pub fn for_language(primary: &str) -> Option<Self> {
        match primary {
            "es" => Some(Self { terms: EN_ES }),
            _ => None,
        }
    }

    /// True when the text already carries target-language terms.
    pub fn is_localized(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .any(|(_, target)| lowered.contains(&target.to_lowercase()))
    }

    /// Single left-to-right pass of case-insensitive substitution. Replaced text
    /// is never rescanned. Returns `None` when no term matched.
    pub fn substitute(&self, text: &str) -> Option<String> {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len() + text.len() / 4);
        let mut replaced = false;
        let mut i = 0;

        while i < text.len() {
            let best = self
                .terms
                .iter()
                .filter(|(source, _)| {
                    let end = i + source.len();
                    end <= bytes.len() && bytes[i..end].eq_ignore_ascii_case(source.as_bytes())
                })
                .max_by_key(|(source, _)| source.len());

            match best {
                Some((source, target)) => {
                    let matched = &text[i..i + source.len()];
                    out.push_str(&match_case(matched, target));
                    i += source.len();
                    replaced = true;
                }
                None => {
                    // Only ASCII terms can match, so stepping a whole char keeps `i` on a boundary.
                    let ch = text[i..].chars().next().unwrap_or_default();
                    out.push(ch);
                    i += ch.len_utf8().max(1);
                }
            }
        }

        replaced.then_some(out)
    }
}

/// Carries the capitalisation of the matched word's first letter onto the replacement.
fn match_case(matched: &str, replacement: &str) -> String {
    let first_upper = matched.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) if first_upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
