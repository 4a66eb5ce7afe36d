//! Per-token feature records for a CRF part-of-speech tagger.

use serde::Serialize;

/// One token of a whitespace-split sentence together with its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenFeatures {
    pub word: String,
    /// `None` for the first token.
    pub previous: Option<String>,
    /// `None` for the last token.
    pub next: Option<String>,
}

impl TokenFeatures {
    #[must_use]
    pub fn is_bos(&self) -> bool {
        self.previous.is_none()
    }

    #[must_use]
    pub fn is_eos(&self) -> bool {
        self.next.is_none()
    }

    /// Attribute pairs in the order a CRF tagger expects them:
    /// `word`, then `BOS` or `-1:word`, then `EOS` or `+1:word`.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attrs = vec![("word", self.word.as_str())];
        match &self.previous {
            None => attrs.push(("BOS", "True")),
            Some(prev) => attrs.push(("-1:word", prev.as_str())),
        }
        match &self.next {
            None => attrs.push(("EOS", "True")),
            Some(next) => attrs.push(("+1:word", next.as_str())),
        }
        attrs
    }
}

/// Build feature records for every whitespace-separated token of `sentence`.
#[must_use]
pub fn prepare_sentence(sentence: &str) -> Vec<TokenFeatures> {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    tokens
        .iter()
        .enumerate()
        .map(|(i, word)| TokenFeatures {
            word: (*word).to_string(),
            previous: i.checked_sub(1).map(|p| tokens[p].to_string()),
            next: tokens.get(i + 1).map(|n| (*n).to_string()),
        })
        .collect()
}
