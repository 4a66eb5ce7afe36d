pub mod config;
pub mod lstm;

pub use config::{DecodeConfig, LemmatizerConfig, MAX_SEQUENCE_LENGTH, ModelConfig};
pub use lstm::{REQUIRED_TENSORS, Seq2SeqLstm, load_model, load_model_from_bytes};

use candle_core::Result;

/// Turns a padded input sequence into the decoder's initial state.
///
/// Implementations must be deterministic for a fixed input.
pub trait SequenceEncoder {
    type State;

    /// # Errors
    /// Returns an error if inference fails.
    fn encode(&self, input_ids: &[u32]) -> Result<Self::State>;
}

/// One step of autoregressive decoding.
///
/// Implementations must be deterministic for identical `(previous_id, state)`.
pub trait SequenceDecoder {
    type State;

    /// Length of the score vector returned by [`SequenceDecoder::step`].
    fn target_vocab_size(&self) -> usize;

    /// Score every target id given the previous id, and produce the next state.
    ///
    /// # Errors
    /// Returns an error if inference fails.
    fn step(&self, previous_id: u32, state: &Self::State) -> Result<(Vec<f32>, Self::State)>;
}

/// An encoder and decoder that agree on the state they pass between them.
pub trait Seq2Seq: SequenceEncoder + SequenceDecoder<State = <Self as SequenceEncoder>::State> {}

impl<T> Seq2Seq for T where
    T: SequenceEncoder + SequenceDecoder<State = <T as SequenceEncoder>::State>
{
}
