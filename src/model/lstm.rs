//! Character-level LSTM encoder-decoder.
//!
//! The encoder reads the padded input word and hands its final hidden/cell state to the
//! decoder, which emits one target character distribution per step.

use candle_core::{DType, Device, Result, Tensor};
use candle_nn::rnn::LSTMState;
use candle_nn::{Embedding, LSTM, Linear, Module, RNN, VarBuilder};

use super::config::ModelConfig;
use super::{SequenceDecoder, SequenceEncoder};

/// Tensor names every weights file must provide.
pub const REQUIRED_TENSORS: &[&str] = &[
    "encoder.embedding.weight",
    "encoder.lstm.weight_ih_l0",
    "encoder.lstm.weight_hh_l0",
    "encoder.lstm.bias_ih_l0",
    "encoder.lstm.bias_hh_l0",
    "decoder.embedding.weight",
    "decoder.lstm.weight_ih_l0",
    "decoder.lstm.weight_hh_l0",
    "decoder.lstm.bias_ih_l0",
    "decoder.lstm.bias_hh_l0",
    "decoder.proj.weight",
    "decoder.proj.bias",
];

/// Encoder-decoder lemmatization network.
///
/// Immutable after construction, so one instance can serve concurrent callers.
pub struct Seq2SeqLstm {
    /// Input character embedding
    encoder_embedding: Embedding,
    /// Encoder recurrence
    encoder_lstm: LSTM,
    /// Target character embedding
    decoder_embedding: Embedding,
    /// Decoder recurrence, stepped once per generated character
    decoder_lstm: LSTM,
    /// Hidden state -> target vocabulary scores
    proj: Linear,
    /// Model configuration
    config: ModelConfig,
    /// Device for tensor operations
    device: Device,
}

impl Seq2SeqLstm {
    /// Create the network by loading weights.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or weight loading fails.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: ModelConfig, vb: VarBuilder) -> Result<Self> {
        config
            .validate()
            .map_err(|e| candle_core::Error::Msg(e.to_string()))?;

        let device = vb.device().clone();

        let enc = vb.pp("encoder");
        let encoder_embedding = candle_nn::embedding(
            config.input_vocab_size,
            config.embedding_dim,
            enc.pp("embedding"),
        )?;
        let encoder_lstm = candle_nn::lstm(
            config.embedding_dim,
            config.hidden_dim,
            candle_nn::LSTMConfig::default(),
            enc.pp("lstm"),
        )?;

        let dec = vb.pp("decoder");
        let decoder_embedding = candle_nn::embedding(
            config.target_vocab_size,
            config.embedding_dim,
            dec.pp("embedding"),
        )?;
        let decoder_lstm = candle_nn::lstm(
            config.embedding_dim,
            config.hidden_dim,
            candle_nn::LSTMConfig::default(),
            dec.pp("lstm"),
        )?;
        let proj = candle_nn::linear(config.hidden_dim, config.target_vocab_size, dec.pp("proj"))?;

        Ok(Self {
            encoder_embedding,
            encoder_lstm,
            decoder_embedding,
            decoder_lstm,
            proj,
            config,
            device,
        })
    }

    /// Get the model configuration.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Raw decoder logits for one step.
    ///
    /// # Returns
    /// Logits of shape (1, target_vocab_size) and the next state.
    ///
    /// # Errors
    /// Returns an error if tensor operations fail.
    pub fn step_logits(&self, previous_id: u32, state: &LSTMState) -> Result<(Tensor, LSTMState)> {
        let ids = Tensor::new(&[previous_id], &self.device)?;
        let emb = self.decoder_embedding.forward(&ids)?;
        let next = self.decoder_lstm.step(&emb, state)?;
        let logits = self.proj.forward(next.h())?;
        Ok((logits, next))
    }
}

impl SequenceEncoder for Seq2SeqLstm {
    type State = LSTMState;

    fn encode(&self, input_ids: &[u32]) -> Result<LSTMState> {
        if input_ids.is_empty() {
            return Err(candle_core::Error::Msg(
                "encoder received an empty sequence".to_string(),
            ));
        }
        // Model expects (batch, seq_len).
        let input = Tensor::from_vec(input_ids.to_vec(), (1, input_ids.len()), &self.device)?;
        let emb = self.encoder_embedding.forward(&input)?;
        let mut states = self.encoder_lstm.seq(&emb)?;
        states
            .pop()
            .ok_or_else(|| candle_core::Error::Msg("encoder produced no state".to_string()))
    }
}

impl SequenceDecoder for Seq2SeqLstm {
    type State = LSTMState;

    fn target_vocab_size(&self) -> usize {
        self.config.target_vocab_size
    }

    fn step(&self, previous_id: u32, state: &LSTMState) -> Result<(Vec<f32>, LSTMState)> {
        let (logits, next) = self.step_logits(previous_id, state)?;
        let probs = candle_nn::ops::softmax_last_dim(&logits)?;
        let scores = probs.squeeze(0)?.to_vec1::<f32>()?;
        Ok((scores, next))
    }
}

/// Load the network from a safetensors file.
///
/// # Errors
/// Returns an error if file loading or model construction fails.
pub fn load_model(
    path: &std::path::Path,
    config: ModelConfig,
    device: &Device,
) -> Result<Seq2SeqLstm> {
    let data = std::fs::read(path)?;
    let vb = VarBuilder::from_buffered_safetensors(data, DType::F32, device)?;
    Seq2SeqLstm::new(config, vb)
}

/// Load the network from in-memory safetensors bytes.
///
/// # Errors
/// Returns an error if the buffer cannot be parsed as safetensors or model construction fails.
pub fn load_model_from_bytes(
    data: &[u8],
    config: ModelConfig,
    device: &Device,
) -> Result<Seq2SeqLstm> {
    let vb = VarBuilder::from_buffered_safetensors(data.to_vec(), DType::F32, device)?;
    Seq2SeqLstm::new(config, vb)
}
