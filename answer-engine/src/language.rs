use serde::Serialize;

/// Languages with a localized fallback prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    English,
    Nepali,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Nepali => "ne",
        }
    }
}

/// Below this many letters the text is too short to judge.
const MIN_LETTERS: usize = 3;

/// Guesses the query language from its script.
///
/// Nepali is written in Devanagari; anything else, and anything too short to
/// tell, is treated as English.
pub fn detect_language(raw: &str) -> Language {
    let mut letters = 0usize;
    let mut devanagari = 0usize;
    for c in raw.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        if ('\u{0900}'..='\u{097F}').contains(&c) {
            devanagari += 1;
        }
    }

    if letters < MIN_LETTERS {
        return Language::English;
    }
    if devanagari * 2 >= letters {
        Language::Nepali
    } else {
        Language::English
    }
}
