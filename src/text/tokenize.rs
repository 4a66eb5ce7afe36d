//! Word and sentence splitting.

use std::sync::LazyLock;

use regex::Regex;

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// A sentence ends at one of these, followed by a single space.
static SENTENCE_END_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[।!.۔?] ").unwrap());

/// Maximal runs of word characters. Punctuation and whitespace are dropped.
#[must_use]
pub fn tokenize_words(text: &str) -> Vec<String> {
    WORD_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Split after sentence-ending punctuation.
///
/// The terminator stays with its sentence and the one space after it is consumed. Any extra
/// spaces stay at the start of the next sentence.
#[must_use]
pub fn tokenize_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_REGEX.find_iter(text) {
        // Drop the trailing space (one byte) from the match.
        sentences.push(text[start..m.end() - 1].to_string());
        start = m.end();
    }
    sentences.push(text[start..].to_string());
    sentences
}

/// Split on an arbitrary delimiter, keeping empty pieces.
#[must_use]
pub fn split_on(text: &str, delimiter: &str) -> Vec<String> {
    text.split(delimiter).map(str::to_string).collect()
}
