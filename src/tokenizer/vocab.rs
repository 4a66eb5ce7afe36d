//! Character vocabulary.
//!
//! Maps single-character tokens to ids and back. The lemmatizer uses two independent
//! instances: one for the input word, one for the generated lemma.
//!
//! The on-disk format is a JSON object of `token -> id`, the word index of a character-level
//! tokenizer. Id 0 is normally left unassigned and acts as the stop sentinel on decode.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// The token returned for ids without a mapping. Emitting it ends generation.
pub const SENTINEL: &str = "";

/// Bidirectional token/id mapping. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: HashMap<u32, String>,
}

impl Vocabulary {
    /// Build from `(token, id)` pairs.
    ///
    /// # Errors
    /// Returns an error if a token or an id appears twice, or a token is not exactly one
    /// character.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for (token, id) in pairs {
            let token = token.into();
            if token.is_empty() {
                bail!("empty token cannot be mapped (id {id})");
            }
            if token.chars().count() != 1 {
                bail!("token {token:?} (id {id}) is not a single character");
            }
            if let Some(existing) = vocab.id_to_token.get(&id) {
                bail!("id {id} assigned to both {existing:?} and {token:?}");
            }
            if vocab.token_to_id.contains_key(&token) {
                bail!("token {token:?} assigned more than one id");
            }
            vocab.id_to_token.insert(id, token.clone());
            vocab.token_to_id.insert(token, id);
        }
        Ok(vocab)
    }

    /// Build from the characters of `alphabet`, numbering them from `first_id`.
    ///
    /// # Errors
    /// Returns an error if `alphabet` repeats a character.
    pub fn from_chars(alphabet: &str, first_id: u32) -> Result<Self> {
        Self::from_pairs(
            alphabet
                .chars()
                .zip(first_id..)
                .map(|(ch, id)| (ch.to_string(), id)),
        )
    }

    /// Parse a JSON `token -> id` object.
    ///
    /// # Errors
    /// Returns an error on malformed JSON or a non-bijective mapping.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let index: HashMap<String, u32> =
            serde_json::from_str(raw).context("parse vocabulary json")?;
        Self::from_pairs(index)
    }

    /// Read a JSON `token -> id` object from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read vocabulary {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    #[must_use]
    pub fn contains_id(&self, id: u32) -> bool {
        self.id_to_token.contains_key(&id)
    }

    /// Largest assigned id, if any.
    #[must_use]
    pub fn max_id(&self) -> Option<u32> {
        self.id_to_token.keys().copied().max()
    }

    #[must_use]
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Token for `id`, or [`SENTINEL`] when the id has no mapping.
    #[must_use]
    pub fn id_to_token(&self, id: u32) -> &str {
        self.id_to_token.get(&id).map_or(SENTINEL, String::as_str)
    }

    /// Encode a single character, falling back to `unk_id`.
    #[must_use]
    pub fn encode_char(&self, ch: char, unk_id: u32) -> u32 {
        let mut buf = [0u8; 4];
        self.token_to_id(ch.encode_utf8(&mut buf)).unwrap_or(unk_id)
    }

    /// Encode a string character by character. Unknown characters become `unk_id`.
    #[must_use]
    pub fn encode(&self, text: &str, unk_id: u32) -> Vec<u32> {
        text.chars().map(|ch| self.encode_char(ch, unk_id)).collect()
    }

    /// Decode ids into a string, skipping ids without a mapping.
    #[must_use]
    pub fn decode(&self, ids: &[u32]) -> String {
        ids.iter().map(|&id| self.id_to_token(id)).collect()
    }
}
