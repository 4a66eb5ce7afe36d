use serde::{Deserialize, Serialize};

use crate::tokenizer::TruncationPolicy;

/// Shape of the encoder/decoder network.
///
/// Must match the exported weights exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Size of the input id space (largest input id + 1)
    pub input_vocab_size: usize,
    /// Size of the target id space; also the length of each decoder distribution
    pub target_vocab_size: usize,
    /// Character embedding dimension (shared by encoder and decoder)
    pub embedding_dim: usize,
    /// LSTM hidden/cell dimension
    pub hidden_dim: usize,
}

impl ModelConfig {
    /// Validate that configuration is consistent.
    ///
    /// # Errors
    /// Returns an error if any dimension is zero.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.input_vocab_size == 0 {
            return Err("input_vocab_size must be positive");
        }
        if self.target_vocab_size == 0 {
            return Err("target_vocab_size must be positive");
        }
        if self.embedding_dim == 0 {
            return Err("embedding_dim must be positive");
        }
        if self.hidden_dim == 0 {
            return Err("hidden_dim must be positive");
        }
        Ok(())
    }

    /// Tiny network for tests and smoke runs.
    #[must_use]
    pub fn tiny(input_vocab_size: usize, target_vocab_size: usize) -> Self {
        Self {
            input_vocab_size,
            target_vocab_size,
            embedding_dim: 8,
            hidden_dim: 16,
        }
    }
}

/// Upper bound for `max_input_length` and `max_output_length`. Words never come close.
pub const MAX_SEQUENCE_LENGTH: usize = 1024;

/// Decoding-loop settings. Loaded once with the model and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Fixed encoder input length; inputs are right-padded to it
    pub max_input_length: usize,
    /// Upper bound on generated tokens, and therefore on decoder steps
    pub max_output_length: usize,
    /// Padding id for encoder input
    #[serde(default)]
    pub pad_id: u32,
    /// Start-of-sequence id fed to the first decoder step
    pub start_id: u32,
    /// Id for input characters missing from the input vocabulary (defaults to `pad_id`)
    #[serde(default)]
    pub unk_id: Option<u32>,
    /// Handling of inputs longer than `max_input_length`
    #[serde(default)]
    pub truncation: TruncationPolicy,
}

impl DecodeConfig {
    /// Validate the length bounds.
    ///
    /// # Errors
    /// Returns an error if either length is zero or above [`MAX_SEQUENCE_LENGTH`].
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_input_length == 0 {
            return Err("max_input_length must be positive");
        }
        if self.max_output_length == 0 {
            return Err("max_output_length must be positive");
        }
        if self.max_input_length > MAX_SEQUENCE_LENGTH {
            return Err("max_input_length exceeds MAX_SEQUENCE_LENGTH");
        }
        if self.max_output_length > MAX_SEQUENCE_LENGTH {
            return Err("max_output_length exceeds MAX_SEQUENCE_LENGTH");
        }
        Ok(())
    }

    #[must_use]
    pub fn unk_id(&self) -> u32 {
        self.unk_id.unwrap_or(self.pad_id)
    }
}

/// Contents of `config.json` in a model directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmatizerConfig {
    pub model: ModelConfig,
    pub decoding: DecodeConfig,
}

impl LemmatizerConfig {
    /// Validate both halves and check that the special ids fit the vocab sizes.
    ///
    /// # Errors
    /// Returns an error describing the first inconsistency found.
    pub fn validate(&self) -> Result<(), &'static str> {
        self.model.validate()?;
        self.decoding.validate()?;
        if self.decoding.start_id as usize >= self.model.target_vocab_size {
            return Err("start_id must be below target_vocab_size");
        }
        if self.decoding.pad_id as usize >= self.model.input_vocab_size {
            return Err("pad_id must be below input_vocab_size");
        }
        if self.decoding.unk_id() as usize >= self.model.input_vocab_size {
            return Err("unk_id must be below input_vocab_size");
        }
        Ok(())
    }
}
