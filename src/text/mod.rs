//! Sindhi text utilities: tokenization, cleaning, stopwords and tagging features.

pub mod clean;
pub mod features;
pub mod stopwords;
pub mod tokenize;

pub use clean::{clean, remove_emoji, remove_numbers, remove_special_characters, remove_urls};
pub use features::{TokenFeatures, prepare_sentence};
pub use stopwords::{Stopwords, remove_stopwords};
pub use tokenize::{split_on, tokenize_sentences, tokenize_words};
