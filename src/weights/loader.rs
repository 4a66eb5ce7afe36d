//! Model directory loading.
//!
//! A model directory holds everything one lemmatizer needs:
//!
//! ```text
//! config.json          LemmatizerConfig (network shape + decoding settings)
//! model.safetensors    encoder/decoder weights
//! input_vocab.json     input character -> id
//! target_vocab.json    target character -> id
//! ```

use std::path::Path;

use anyhow::{Context, Result, bail};
use candle_core::Device;
use safetensors::SafeTensors;
use tracing::{debug, info};

use crate::model::{LemmatizerConfig, REQUIRED_TENSORS, Seq2SeqLstm, load_model_from_bytes};
use crate::tokenizer::Vocabulary;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const INPUT_VOCAB_FILE: &str = "input_vocab.json";
pub const TARGET_VOCAB_FILE: &str = "target_vocab.json";

/// Everything loaded from a model directory.
pub struct ModelArtifacts {
    pub model: Seq2SeqLstm,
    pub input_vocab: Vocabulary,
    pub target_vocab: Vocabulary,
    pub config: LemmatizerConfig,
}

/// Read and validate `config.json` from a model directory.
///
/// # Errors
/// Returns an error if the file is missing, unparsable, or inconsistent.
pub fn load_config(dir: &Path) -> Result<LemmatizerConfig> {
    let config_path = dir.join(CONFIG_FILE);
    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("read config {}", config_path.display()))?;
    let cfg: LemmatizerConfig =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", config_path.display()))?;
    cfg.validate()
        .map_err(anyhow::Error::msg)
        .context("invalid LemmatizerConfig")?;
    Ok(cfg)
}

/// Load weights, vocabularies and configuration from `dir`.
///
/// # Errors
/// Returns an error if any artifact is missing or the artifacts disagree with each other.
pub fn load_model_dir(dir: &Path, device: &Device) -> Result<ModelArtifacts> {
    if !dir.is_dir() {
        bail!("model directory not found: {}", dir.display());
    }

    let config = load_config(dir)?;

    let input_vocab = Vocabulary::from_json_file(&dir.join(INPUT_VOCAB_FILE))?;
    check_vocab_fits(&input_vocab, config.model.input_vocab_size, "input")?;
    let target_vocab = Vocabulary::from_json_file(&dir.join(TARGET_VOCAB_FILE))?;
    check_vocab_fits(&target_vocab, config.model.target_vocab_size, "target")?;

    let weights_path = dir.join(WEIGHTS_FILE);
    let data = std::fs::read(&weights_path)
        .with_context(|| format!("read weights {}", weights_path.display()))?;
    check_weights(&data, &config)
        .with_context(|| format!("check {}", weights_path.display()))?;

    let model = load_model_from_bytes(&data, config.model.clone(), device)
        .context("load safetensors weights")?;

    info!(
        dir = %dir.display(),
        input_vocab = input_vocab.len(),
        target_vocab = target_vocab.len(),
        hidden_dim = config.model.hidden_dim,
        "loaded lemmatizer model"
    );

    Ok(ModelArtifacts {
        model,
        input_vocab,
        target_vocab,
        config,
    })
}

fn check_vocab_fits(vocab: &Vocabulary, vocab_size: usize, which: &str) -> Result<()> {
    if vocab.is_empty() {
        bail!("{which} vocabulary is empty");
    }
    if let Some(max_id) = vocab.max_id() {
        if max_id as usize >= vocab_size {
            bail!("{which} vocabulary uses id {max_id}, but the model only has {vocab_size} ids");
        }
    }
    Ok(())
}

/// Verify that every tensor the network needs is present, with the embedding and projection
/// shapes the config promises.
fn check_weights(data: &[u8], config: &LemmatizerConfig) -> Result<()> {
    let st = SafeTensors::deserialize(data).context("parse safetensors header")?;

    let names = st.names();
    for required in REQUIRED_TENSORS {
        if !names.iter().any(|name| name.as_str() == *required) {
            bail!(
                "weights are missing tensor {required:?}; expected an encoder/decoder export with {} tensors",
                REQUIRED_TENSORS.len()
            );
        }
    }

    let m = &config.model;
    let expected_shapes: [(&str, [usize; 2]); 3] = [
        ("encoder.embedding.weight", [m.input_vocab_size, m.embedding_dim]),
        ("decoder.embedding.weight", [m.target_vocab_size, m.embedding_dim]),
        ("decoder.proj.weight", [m.target_vocab_size, m.hidden_dim]),
    ];
    for (name, expected) in expected_shapes {
        let view = st.tensor(name).with_context(|| format!("read tensor {name}"))?;
        if view.shape() != expected {
            bail!(
                "tensor {name} has shape {:?}, config.json implies {expected:?}",
                view.shape()
            );
        }
    }

    debug!(tensors = names.len(), "weights header ok");
    Ok(())
}
