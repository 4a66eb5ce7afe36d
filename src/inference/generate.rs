//! Greedy decoding loop.
//!
//! Encodes the padded input once, then steps the decoder on its own previous output until it
//! emits the empty sentinel or the output reaches `max_output_length` tokens.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{CancelReason, LemmaError, LemmaResult};
use crate::inference::greedy::{argmax, usable_count};
use crate::model::{DecodeConfig, Seq2Seq};
use crate::tokenizer::{Vocabulary, pad_sequence};

/// Caller-side limits, independent of `max_output_length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeLimits {
    /// Wall-clock budget for the whole decode (encoder included).
    pub timeout: Option<Duration>,
    /// Maximum decoder steps before giving up.
    pub max_steps: Option<usize>,
}

impl DecodeLimits {
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// How a successful decode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The decoder chose an id that resolves to the empty sentinel.
    Sentinel,
    /// The output reached `max_output_length` tokens. Often a sign of an out-of-distribution
    /// input.
    LengthCap,
}

/// Result of one lemmatization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lemma {
    pub text: String,
    /// Emitted target ids; the sentinel id is not included.
    pub ids: Vec<u32>,
    /// Decoder steps performed.
    pub steps: usize,
    pub stop: StopReason,
}

impl Lemma {
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.stop == StopReason::LengthCap
    }
}

/// Encode `text` with the input vocabulary and pad it to `max_input_length`.
///
/// # Errors
/// Returns [`LemmaError::InvalidConfig`] if `cfg` fails validation, and
/// [`LemmaError::InvalidInput`] if the text is too long and the truncation policy is `reject`.
pub fn prepare_input(text: &str, vocab: &Vocabulary, cfg: &DecodeConfig) -> LemmaResult<Vec<u32>> {
    cfg.validate().map_err(LemmaError::InvalidConfig)?;
    let ids = vocab.encode(text, cfg.unk_id());
    pad_sequence(&ids, cfg.max_input_length, cfg.pad_id, cfg.truncation).map_err(|overflow| {
        LemmaError::InvalidInput(format!(
            "input has {} characters, the model accepts at most {}",
            overflow.len, overflow.max_len
        ))
    })
}

/// Run the greedy loop over an already padded input.
///
/// # Errors
/// Returns [`LemmaError::InvalidConfig`] if `cfg` fails validation, an inference error if the
/// model fails or returns a malformed distribution, and [`LemmaError::Cancelled`] if a limit in
/// `limits` is hit first.
pub fn decode_padded<M>(
    model: &M,
    padded: &[u32],
    target_vocab: &Vocabulary,
    cfg: &DecodeConfig,
    limits: &DecodeLimits,
) -> LemmaResult<Lemma>
where
    M: Seq2Seq + ?Sized,
{
    cfg.validate().map_err(LemmaError::InvalidConfig)?;
    let started = Instant::now();
    let expected = model.target_vocab_size();

    let mut state = model.encode(padded)?;
    let mut previous_id = cfg.start_id;
    let mut ids = Vec::new();
    let mut steps = 0usize;

    loop {
        if ids.len() >= cfg.max_output_length {
            debug!(steps, "stopped at max_output_length");
            return Ok(Lemma {
                text: target_vocab.decode(&ids),
                ids,
                steps,
                stop: StopReason::LengthCap,
            });
        }
        if let Some(max_steps) = limits.max_steps {
            if steps >= max_steps {
                return Err(LemmaError::Cancelled {
                    steps,
                    reason: CancelReason::StepBudget(max_steps),
                });
            }
        }
        if let Some(timeout) = limits.timeout {
            if started.elapsed() >= timeout {
                return Err(LemmaError::Cancelled {
                    steps,
                    reason: CancelReason::Timeout(timeout),
                });
            }
        }

        let (scores, next_state) = model.step(previous_id, &state)?;
        steps += 1;

        if scores.len() != expected {
            return Err(LemmaError::MalformedDistribution {
                step: steps,
                expected,
                actual: scores.len(),
            });
        }
        let Some(id) = argmax(&scores) else {
            return Err(LemmaError::MalformedDistribution {
                step: steps,
                expected,
                actual: usable_count(&scores),
            });
        };

        let token = target_vocab.id_to_token(id);
        trace!(step = steps, id, token, "decoder step");

        if token.is_empty() {
            debug!(steps, len = ids.len(), "stopped on sentinel");
            return Ok(Lemma {
                text: target_vocab.decode(&ids),
                ids,
                steps,
                stop: StopReason::Sentinel,
            });
        }

        ids.push(id);
        previous_id = id;
        state = next_state;
    }
}

/// Lemmatize one word: prepare the input, then run [`decode_padded`].
///
/// # Errors
/// See [`prepare_input`] and [`decode_padded`].
pub fn decode<M>(
    model: &M,
    text: &str,
    input_vocab: &Vocabulary,
    target_vocab: &Vocabulary,
    cfg: &DecodeConfig,
    limits: &DecodeLimits,
) -> LemmaResult<Lemma>
where
    M: Seq2Seq + ?Sized,
{
    let padded = prepare_input(text, input_vocab, cfg)?;
    decode_padded(model, &padded, target_vocab, cfg, limits)
}
