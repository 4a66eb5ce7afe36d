//! Stopword sets.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Reader;
use serde::Deserialize;

use super::tokenize::tokenize_words;

/// Header of the stopword column in a stopword CSV.
pub const STOPWORD_COLUMN: &str = "Stopwords";

#[derive(Debug, Deserialize)]
struct StopwordRow {
    #[serde(rename = "Stopwords")]
    word: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Load the `Stopwords` column of a CSV file. Other columns are ignored.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or has no `Stopwords` column.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("open stopwords {}", path.as_ref().display()))?;
        Self::from_csv_reader(file)
            .with_context(|| format!("parse stopwords {}", path.as_ref().display()))
    }

    /// # Errors
    /// Returns an error on malformed CSV or a missing `Stopwords` column.
    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = Reader::from_reader(rdr);
        let headers = reader.headers().context("read CSV header")?;
        if !headers.iter().any(|h| h == STOPWORD_COLUMN) {
            anyhow::bail!("CSV has no {STOPWORD_COLUMN:?} column");
        }

        let mut words = HashSet::new();
        for result in reader.deserialize() {
            let row: StopwordRow = result.context("parse stopword row")?;
            let word = row.word.trim();
            if !word.is_empty() {
                words.insert(word.to_string());
            }
        }
        Ok(Self { words })
    }

    /// Union with more words. Words already present are not duplicated.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Stopwords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Tokenize `text` into words, drop stopwords, and join what is left with single spaces.
#[must_use]
pub fn remove_stopwords(text: &str, stopwords: &Stopwords) -> String {
    tokenize_words(text)
        .into_iter()
        .filter(|word| !stopwords.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}
