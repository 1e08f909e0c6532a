//! Utterance cleanup applied before pattern matching.

use crate::reminder::types::Language;

const NUMBER_WORDS: [(&str, &str); 13] = [
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("ten", "10"),
    ("eleven", "11"),
    ("twelve", "12"),
];

/// Lowercase, collapse whitespace, strip trailing sentence punctuation, map
/// Devanagari digits to ASCII, and (English only) spell-out numbers to digits.
pub fn normalize(utterance: &str, language: Language) -> String {
    let lowered: String = utterance
        .to_lowercase()
        .chars()
        .map(devanagari_digit_to_ascii)
        .collect();

    let words = lowered.split_whitespace().map(|word| match language {
        Language::English => number_word(word).unwrap_or(word),
        Language::Hindi | Language::Marathi => word,
    });

    let joined = words.collect::<Vec<_>>().join(" ");
    joined
        .trim_end_matches(&['?', '!', ',', '।'][..])
        .trim_end_matches(|c: char| c == '.' && !joined.ends_with("m."))
        .trim()
        .to_string()
}

fn number_word(word: &str) -> Option<&'static str> {
    NUMBER_WORDS
        .iter()
        .find(|(spelled, _)| *spelled == word)
        .map(|(_, digits)| *digits)
}

fn devanagari_digit_to_ascii(c: char) -> char {
    match c {
        '\u{0966}'..='\u{096F}' => {
            char::from_digit(c as u32 - 0x0966, 10).unwrap_or(c)
        }
        _ => c,
    }
}
