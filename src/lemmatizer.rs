//! Long-lived lemmatizer handle.
//!
//! Load once, then share (`Arc<Lemmatizer>`) between threads. Each call owns its own decoder
//! state; nothing in the handle is mutated after construction. Dropping the handle releases
//! the weights.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use candle_core::Device;
use tracing::debug;

use crate::error::{LemmaError, LemmaResult};
use crate::inference::{DecodeLimits, Lemma, decode};
use crate::model::{DecodeConfig, LemmatizerConfig, Seq2Seq, Seq2SeqLstm};
use crate::text::tokenize_words;
use crate::tokenizer::Vocabulary;
use crate::weights::loader::{ModelArtifacts, load_model_dir};

pub struct Lemmatizer<M = Seq2SeqLstm> {
    model: M,
    input_vocab: Vocabulary,
    target_vocab: Vocabulary,
    config: DecodeConfig,
    limits: DecodeLimits,
}

impl Lemmatizer<Seq2SeqLstm> {
    /// Load a model directory onto the CPU.
    ///
    /// # Errors
    /// Returns an error if any artifact cannot be loaded.
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_on(dir, &Device::Cpu)
    }

    /// Load a model directory onto `device`.
    ///
    /// # Errors
    /// Returns an error if any artifact cannot be loaded.
    pub fn load_on(dir: &Path, device: &Device) -> Result<Self> {
        let ModelArtifacts {
            model,
            input_vocab,
            target_vocab,
            config,
        } = load_model_dir(dir, device)
            .with_context(|| format!("load lemmatizer from {}", dir.display()))?;
        Self::new(model, input_vocab, target_vocab, config.decoding)
    }

    /// Full configuration, reconstructed from the model and decoding halves.
    #[must_use]
    pub fn full_config(&self) -> LemmatizerConfig {
        LemmatizerConfig {
            model: self.model.config().clone(),
            decoding: self.config.clone(),
        }
    }
}

impl<M: Seq2Seq> Lemmatizer<M> {
    /// Assemble a handle from its parts.
    ///
    /// # Errors
    /// Returns an error if `config` fails validation or `start_id` is outside the model's
    /// target vocabulary.
    pub fn new(
        model: M,
        input_vocab: Vocabulary,
        target_vocab: Vocabulary,
        config: DecodeConfig,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid DecodeConfig")?;
        if config.start_id as usize >= model.target_vocab_size() {
            bail!(
                "start_id {} is outside the target vocabulary of {} ids",
                config.start_id,
                model.target_vocab_size()
            );
        }
        Ok(Self {
            model,
            input_vocab,
            target_vocab,
            config,
            limits: DecodeLimits::default(),
        })
    }

    /// Default limits applied by [`Lemmatizer::lemmatize`].
    #[must_use]
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    #[must_use]
    pub fn input_vocab(&self) -> &Vocabulary {
        &self.input_vocab
    }

    #[must_use]
    pub fn target_vocab(&self) -> &Vocabulary {
        &self.target_vocab
    }

    /// Lemmatize one word with the handle's default limits.
    ///
    /// # Errors
    /// See [`LemmaError`].
    pub fn lemmatize(&self, word: &str) -> LemmaResult<Lemma> {
        self.lemmatize_with(word, &self.limits)
    }

    /// Lemmatize one word with explicit limits.
    ///
    /// # Errors
    /// See [`LemmaError`].
    pub fn lemmatize_with(&self, word: &str, limits: &DecodeLimits) -> LemmaResult<Lemma> {
        let start = Instant::now();
        let lemma = decode(
            &self.model,
            word,
            &self.input_vocab,
            &self.target_vocab,
            &self.config,
            limits,
        )?;
        debug!(
            word,
            lemma = %lemma.text,
            steps = lemma.steps,
            stop = ?lemma.stop,
            elapsed_us = start.elapsed().as_micros(),
            "lemmatized"
        );
        Ok(lemma)
    }

    /// Lemmatize raw bytes, rejecting anything that is not UTF-8.
    ///
    /// # Errors
    /// Returns [`LemmaError::InvalidInput`] for invalid UTF-8, otherwise as
    /// [`Lemmatizer::lemmatize`].
    pub fn lemmatize_bytes(&self, bytes: &[u8]) -> LemmaResult<Lemma> {
        let word = std::str::from_utf8(bytes)
            .map_err(|e| LemmaError::InvalidInput(format!("input is not valid UTF-8: {e}")))?;
        self.lemmatize(word)
    }

    /// Split `text` into words and lemmatize each one.
    ///
    /// Returns `(word, lemma)` pairs in order. Fails on the first word that fails.
    ///
    /// # Errors
    /// See [`Lemmatizer::lemmatize`].
    pub fn lemmatize_text(&self, text: &str) -> LemmaResult<Vec<(String, Lemma)>> {
        tokenize_words(text)
            .into_iter()
            .map(|word| {
                let lemma = self.lemmatize(&word)?;
                Ok((word, lemma))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::StopReason;
    use crate::model::{SequenceDecoder, SequenceEncoder};
    use crate::tokenizer::TruncationPolicy;

    /// Copies the first `keep` characters of the input word, then stops.
    struct Prefix {
        keep: usize,
        vocab_size: usize,
    }

    impl SequenceEncoder for Prefix {
        type State = (Vec<u32>, usize);

        fn encode(&self, input_ids: &[u32]) -> candle_core::Result<(Vec<u32>, usize)> {
            Ok((input_ids.to_vec(), 0))
        }
    }

    impl SequenceDecoder for Prefix {
        type State = (Vec<u32>, usize);

        fn target_vocab_size(&self) -> usize {
            self.vocab_size
        }

        fn step(
            &self,
            _previous_id: u32,
            state: &(Vec<u32>, usize),
        ) -> candle_core::Result<(Vec<f32>, (Vec<u32>, usize))> {
            let (ids, pos) = state;
            let id = if *pos < self.keep { ids[*pos] as usize } else { 0 };
            let mut scores = vec![0.0; self.vocab_size];
            scores[id] = 1.0;
            Ok((scores, (ids.clone(), pos + 1)))
        }
    }

    fn lemmatizer(keep: usize) -> Lemmatizer<Prefix> {
        let alphabet = "رهندو";
        Lemmatizer::new(
            Prefix {
                keep,
                vocab_size: 8,
            },
            Vocabulary::from_chars(alphabet, 1).unwrap(),
            Vocabulary::from_chars(alphabet, 1).unwrap(),
            DecodeConfig {
                max_input_length: 8,
                max_output_length: 6,
                pad_id: 0,
                start_id: 7,
                unk_id: None,
                truncation: TruncationPolicy::Reject,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_lemmatize_word() {
        let lem = lemmatizer(2);
        let out = lem.lemmatize("رهندو").unwrap();
        assert_eq!(out.text, "ره");
        assert_eq!(out.stop, StopReason::Sentinel);
        assert_eq!(out.steps, 3);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let lem = lemmatizer(2);
        let err = lem.lemmatize_bytes(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, LemmaError::InvalidInput(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_bytes_path_matches_str_path() {
        let lem = lemmatizer(2);
        let a = lem.lemmatize_bytes("رهندو".as_bytes()).unwrap();
        let b = lem.lemmatize("رهندو").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_word() {
        let lem = lemmatizer(2);
        // Encoder sees only padding; the decoder copies pad ids, which resolve to the sentinel.
        let out = lem.lemmatize("").unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.steps, 1);
    }

    #[test]
    fn test_lemmatize_text() {
        let lem = lemmatizer(1);
        let out = lem.lemmatize_text("رهندو، دو").unwrap();
        let pairs: Vec<(&str, &str)> = out
            .iter()
            .map(|(w, l)| (w.as_str(), l.text.as_str()))
            .collect();
        assert_eq!(pairs, vec![("رهندو", "ر"), ("دو", "د")]);
    }

    #[test]
    fn test_default_limits_apply() {
        let lem = lemmatizer(5).with_limits(DecodeLimits::default().with_max_steps(2));
        let err = lem.lemmatize("رهندو").unwrap_err();
        assert!(matches!(err, LemmaError::Cancelled { steps: 2, .. }));
        assert!(lem.lemmatize_with("رهندو", &DecodeLimits::unlimited()).is_ok());
    }

    #[test]
    fn test_new_rejects_unusable_config() {
        let vocab = Vocabulary::from_chars("رهندو", 1).unwrap();
        let config = DecodeConfig {
            max_input_length: 8,
            max_output_length: 0,
            pad_id: 0,
            start_id: 7,
            unk_id: None,
            truncation: TruncationPolicy::Reject,
        };
        let prefix = || Prefix {
            keep: 2,
            vocab_size: 8,
        };

        let err = Lemmatizer::new(prefix(), vocab.clone(), vocab.clone(), config.clone())
            .err()
            .expect("zero max_output_length should be rejected");
        assert!(
            err.chain()
                .any(|e| e.to_string().contains("max_output_length")),
            "{err:?}"
        );

        let bad_start = DecodeConfig {
            max_output_length: 6,
            start_id: 8,
            ..config
        };
        assert!(Lemmatizer::new(prefix(), vocab.clone(), vocab, bad_start).is_err());
    }
}
