//! Regex cleaners.
//!
//! Apart from [`remove_special_characters`], every cleaner collapses whitespace runs to a single
//! space and trims the result.

use std::sync::LazyLock;

use regex::Regex;

/// Anything outside the Arabic letter block used by Sindhi, `۽`, and whitespace.
static SPECIAL_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x{0621}-\x{06BE} \x{06FD}\s]").unwrap());
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static EMOJI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}", // emoticons
        r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
        r"\x{1F680}-\x{1F6FF}", // transport & map
        r"\x{1F1E0}-\x{1F1FF}", // flags
        r"\x{2702}-\x{27B0}",
        r"\x{24C2}-\x{1F251}",
        "]+",
    ))
    .unwrap()
});
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Drop punctuation, Latin text, digits and symbols. Spacing is left as is.
#[must_use]
pub fn remove_special_characters(text: &str) -> String {
    SPECIAL_CHAR_REGEX.replace_all(text, "").into_owned()
}

#[must_use]
pub fn remove_numbers(text: &str) -> String {
    collapse_whitespace(&NUMBER_REGEX.replace_all(text, ""))
}

#[must_use]
pub fn remove_urls(text: &str) -> String {
    collapse_whitespace(&URL_REGEX.replace_all(text, ""))
}

#[must_use]
pub fn remove_emoji(text: &str) -> String {
    collapse_whitespace(&EMOJI_REGEX.replace_all(text, ""))
}

/// URLs, emoji, numbers, then special characters, with whitespace collapsed at the end.
#[must_use]
pub fn clean(text: &str) -> String {
    let text = remove_urls(text);
    let text = remove_emoji(&text);
    let text = remove_numbers(&text);
    collapse_whitespace(&remove_special_characters(&text))
}
