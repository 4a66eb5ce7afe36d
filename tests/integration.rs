use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};

use sindhi_nlp::inference::{DecodeLimits, StopReason};
use sindhi_nlp::model::{
    DecodeConfig, LemmatizerConfig, ModelConfig, Seq2SeqLstm, SequenceDecoder, SequenceEncoder,
    load_model,
};
use sindhi_nlp::tokenizer::{TruncationPolicy, Vocabulary};
use sindhi_nlp::weights::loader::{
    CONFIG_FILE, INPUT_VOCAB_FILE, TARGET_VOCAB_FILE, WEIGHTS_FILE, load_model_dir,
};
use sindhi_nlp::{LemmaError, Lemmatizer};

const ALPHABET: &str = "رهندوڪتاب";

fn temp_model_dir(tag: &str) -> PathBuf {
    let uniq = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("timestamp")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("sindhi_nlp_{tag}_{uniq}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn vocab_json(alphabet: &str) -> String {
    let index: std::collections::BTreeMap<String, u32> = alphabet
        .chars()
        .zip(1u32..)
        .map(|(ch, id)| (ch.to_string(), id))
        .collect();
    serde_json::to_string(&index).expect("vocab json")
}

fn lemmatizer_config() -> LemmatizerConfig {
    let n = ALPHABET.chars().count();
    LemmatizerConfig {
        // Input ids 1..=n plus pad 0; target ids 1..=n plus sentinel 0 and start n + 1.
        model: ModelConfig::tiny(n + 1, n + 2),
        decoding: DecodeConfig {
            max_input_length: 10,
            max_output_length: 6,
            pad_id: 0,
            start_id: u32::try_from(n + 1).expect("small vocab"),
            unk_id: None,
            truncation: TruncationPolicy::Reject,
        },
    }
}

/// Write a complete model directory with randomly initialised weights. Returns the varmap so
/// callers can tamper with the weights.
fn write_model_dir(dir: &Path) -> VarMap {
    let config = lemmatizer_config();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    Seq2SeqLstm::new(config.model.clone(), vb).expect("random model");

    varmap.save(dir.join(WEIGHTS_FILE)).expect("save weights");
    std::fs::write(
        dir.join(CONFIG_FILE),
        serde_json::to_string_pretty(&config).expect("config json"),
    )
    .expect("write config");
    std::fs::write(dir.join(INPUT_VOCAB_FILE), vocab_json(ALPHABET)).expect("write vocab");
    std::fs::write(dir.join(TARGET_VOCAB_FILE), vocab_json(ALPHABET)).expect("write vocab");
    varmap
}

#[test]
fn model_dir_loads_and_decodes() -> anyhow::Result<()> {
    let dir = temp_model_dir("load");
    write_model_dir(&dir);

    let lem = Lemmatizer::load(&dir)?;
    assert_eq!(lem.full_config(), lemmatizer_config());
    assert_eq!(lem.input_vocab().len(), ALPHABET.chars().count());

    let out = lem.lemmatize("رهندو")?;
    assert!(out.steps >= 1);
    assert!(out.steps <= lem.config().max_output_length);
    assert_eq!(out.ids.len(), out.text.chars().count());
    match out.stop {
        StopReason::Sentinel => assert_eq!(out.steps, out.ids.len() + 1),
        StopReason::LengthCap => assert_eq!(out.ids.len(), lem.config().max_output_length),
    }

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn weights_file_loads_without_directory_metadata() -> anyhow::Result<()> {
    let dir = temp_model_dir("weights_only");
    write_model_dir(&dir);

    let config = lemmatizer_config();
    let model = load_model(&dir.join(WEIGHTS_FILE), config.model.clone(), &Device::Cpu)?;
    let state = model.encode(&[1, 2, 3, 0, 0, 0, 0, 0, 0, 0])?;
    let (scores, _) = model.step(config.decoding.start_id, &state)?;
    assert_eq!(scores.len(), config.model.target_vocab_size);

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn decoding_is_deterministic() -> anyhow::Result<()> {
    let dir = temp_model_dir("determinism");
    write_model_dir(&dir);
    let lem = Lemmatizer::load(&dir)?;

    for word in ["رهندو", "ڪتاب", "", "x"] {
        let a = lem.lemmatize(word)?;
        let b = lem.lemmatize(word)?;
        assert_eq!(a, b, "word {word:?}");
        assert!(a.steps <= lem.config().max_output_length);
    }

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn oversized_input_is_rejected_before_inference() -> anyhow::Result<()> {
    let dir = temp_model_dir("oversize");
    write_model_dir(&dir);
    let lem = Lemmatizer::load(&dir)?;

    let err = lem.lemmatize("رهندورهندورهندو").unwrap_err();
    assert!(matches!(err, LemmaError::InvalidInput(_)), "{err}");
    assert!(!err.is_retryable());

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn missing_tensor_is_reported_by_name() {
    let dir = temp_model_dir("missing_tensor");
    let varmap = write_model_dir(&dir);
    varmap
        .data()
        .lock()
        .expect("varmap lock")
        .remove("decoder.proj.bias");
    varmap.save(dir.join(WEIGHTS_FILE)).expect("save weights");

    let err = load_model_dir(&dir, &Device::Cpu)
        .err()
        .expect("weights without decoder.proj.bias should error");
    assert!(
        err.chain()
            .any(|e| e.to_string().contains("decoder.proj.bias")),
        "unexpected error chain: {err:?}"
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn config_without_start_id_is_rejected() {
    let dir = temp_model_dir("no_start");
    write_model_dir(&dir);
    std::fs::write(
        dir.join(CONFIG_FILE),
        r#"{
            "model": {"input_vocab_size": 10, "target_vocab_size": 11, "embedding_dim": 8, "hidden_dim": 16},
            "decoding": {"max_input_length": 10, "max_output_length": 6}
        }"#,
    )
    .expect("write config");

    assert!(Lemmatizer::load(&dir).is_err());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn shared_handle_serves_threads() -> anyhow::Result<()> {
    let dir = temp_model_dir("threads");
    write_model_dir(&dir);
    let lem = Arc::new(Lemmatizer::load(&dir)?);
    let expected = lem.lemmatize("رهندو")?;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lem = Arc::clone(&lem);
                s.spawn(move || lem.lemmatize("رهندو"))
            })
            .collect();
        for handle in handles {
            let got = handle.join().expect("thread panicked").expect("lemmatize");
            assert_eq!(got, expected);
        }
    });

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

#[test]
fn zero_timeout_cancels() -> anyhow::Result<()> {
    let dir = temp_model_dir("timeout");
    write_model_dir(&dir);
    let lem = Lemmatizer::load(&dir)?;

    let limits = DecodeLimits::default().with_timeout(std::time::Duration::ZERO);
    let err = lem.lemmatize_with("رهندو", &limits).unwrap_err();
    assert!(err.is_retryable(), "{err}");

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}

/// Decoder that spells out a fixed lemma one character per step, then emits id 0.
struct FixedLemma {
    lemma_ids: Vec<u32>,
    vocab_size: usize,
}

impl SequenceEncoder for FixedLemma {
    type State = usize;

    fn encode(&self, _input_ids: &[u32]) -> candle_core::Result<usize> {
        Ok(0)
    }
}

impl SequenceDecoder for FixedLemma {
    type State = usize;

    fn target_vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn step(&self, _previous_id: u32, pos: &usize) -> candle_core::Result<(Vec<f32>, usize)> {
        let mut scores = vec![0.01; self.vocab_size];
        let id = self.lemma_ids.get(*pos).copied().unwrap_or(0);
        scores[id as usize] = 0.9;
        Ok((scores, pos + 1))
    }
}

#[test]
fn lemmatizes_fixture_word() {
    let vocab = Vocabulary::from_chars(ALPHABET, 1).expect("vocab");
    let lemma_ids = vec![
        vocab.token_to_id("ر").expect("ر"),
        vocab.token_to_id("ه").expect("ه"),
    ];
    let config = lemmatizer_config();
    let lem = Lemmatizer::new(
        FixedLemma {
            lemma_ids,
            vocab_size: config.model.target_vocab_size,
        },
        vocab.clone(),
        vocab,
        config.decoding,
    )
    .expect("lemmatizer");

    let out = lem.lemmatize("رهندو").expect("lemmatize");
    assert_eq!(out.text, "ره");
    assert_eq!(out.stop, StopReason::Sentinel);
    assert_eq!(out.steps, 3);

    let words = lem.lemmatize_text("رهندو ڪتاب").expect("lemmatize_text");
    assert_eq!(words.len(), 2);
    assert!(words.iter().all(|(_, l)| l.text == "ره"));
}

#[test]
fn zero_length_config_is_refused_at_construction() {
    let vocab = Vocabulary::from_chars(ALPHABET, 1).expect("vocab");
    let mut config = lemmatizer_config();
    config.decoding.max_output_length = 0;
    let model = FixedLemma {
        lemma_ids: vec![1, 2],
        vocab_size: config.model.target_vocab_size,
    };

    let err = Lemmatizer::new(model, vocab.clone(), vocab, config.decoding)
        .err()
        .expect("max_output_length of 0 should be refused");
    assert!(
        err.chain()
            .any(|e| e.to_string().contains("max_output_length")),
        "unexpected error chain: {err:?}"
    );
}
