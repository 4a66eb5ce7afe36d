//! Sindhi NLP CLI
//!
//! Lemmatization with a character-level encoder/decoder model, plus the text utilities.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sindhi_nlp::inference::{DecodeLimits, StopReason};
use sindhi_nlp::lemmatizer::Lemmatizer;
use sindhi_nlp::text::{self, Stopwords};
use sindhi_nlp::weights::loader as weights_loader;

/// What to do with each input.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Task {
    /// Lemmatize every word (needs --model)
    #[default]
    Lemmatize,
    /// Split into words
    Words,
    /// Split into sentences
    Sentences,
    /// Strip URLs, emoji, numbers and non-Sindhi characters
    Clean,
    /// Drop stopwords (needs --stopwords)
    Stopwords,
}

impl Task {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lemmatize => "lemmatize",
            Self::Words => "words",
            Self::Sentences => "sentences",
            Self::Clean => "clean",
            Self::Stopwords => "stopwords",
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// One result per line
    #[default]
    Plain,
    /// JSON with metadata
    Json,
}

/// Sindhi NLP - lemmatization and text preprocessing for Sindhi.
#[derive(Debug, Parser)]
#[command(
    name = "sindhi-nlp",
    version,
    about = "Lemmatize and preprocess Sindhi text",
    long_about = "Character-level LSTM lemmatizer for Sindhi plus tokenization, cleaning and \
                  stopword filtering.\n\n\
                  The model directory holds config.json, model.safetensors, input_vocab.json \
                  and target_vocab.json."
)]
struct Cli {
    /// Input text; all arguments are joined with spaces
    #[arg(index = 1)]
    words: Vec<String>,

    /// Task to run
    #[arg(short, long, value_enum, default_value = "lemmatize")]
    task: Task,

    /// Model directory for lemmatization
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Stopword CSV with a `Stopwords` column
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Per-word decode timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    format: OutputFormat,

    /// Interactive REPL mode
    #[arg(short, long)]
    interactive: bool,

    /// Print model info and exit
    #[arg(long)]
    info: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct JsonLemma {
    input: String,
    lemma: String,
    steps: usize,
    stop: StopReason,
    elapsed_ms: f64,
}

#[derive(Debug, Serialize)]
struct JsonText {
    task: &'static str,
    input: String,
    output: Vec<String>,
}

/// Resources a task may need, loaded once up front.
struct Runner {
    task: Task,
    format: OutputFormat,
    lemmatizer: Option<Lemmatizer>,
    stopwords: Option<Stopwords>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.info {
        return print_model_info(&cli);
    }

    let runner = Runner::from_cli(&cli)?;

    if cli.interactive {
        return run_interactive_mode(&runner);
    }

    if cli.words.is_empty() {
        anyhow::bail!(
            "No input provided. Usage: sindhi-nlp --model models/lemmatizer \"رهندو\"\n\
             Or run interactive mode: sindhi-nlp --interactive\n\
             Run sindhi-nlp --help for more options."
        );
    }
    let input = cli.words.join(" ");
    runner.run(&input)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Print information about the model directory.
fn print_model_info(cli: &Cli) -> Result<()> {
    println!("Sindhi NLP v{}", env!("CARGO_PKG_VERSION"));
    println!("=================");
    println!();

    let Some(dir) = &cli.model else {
        println!("No --model given.");
        println!(
            "A model directory holds {}, {}, {} and {}.",
            weights_loader::CONFIG_FILE,
            weights_loader::WEIGHTS_FILE,
            weights_loader::INPUT_VOCAB_FILE,
            weights_loader::TARGET_VOCAB_FILE
        );
        return Ok(());
    };

    let config = weights_loader::load_config(dir)?;
    println!("Model directory: {}", dir.display());
    println!();
    println!("Network:");
    println!("  Input vocabulary:  {} ids", config.model.input_vocab_size);
    println!("  Target vocabulary: {} ids", config.model.target_vocab_size);
    println!("  Embedding dim:     {}", config.model.embedding_dim);
    println!("  Hidden dim:        {}", config.model.hidden_dim);
    println!();
    println!("Decoding:");
    println!("  Max input length:  {}", config.decoding.max_input_length);
    println!("  Max output length: {}", config.decoding.max_output_length);
    println!("  Start id:          {}", config.decoding.start_id);
    println!("  Pad id:            {}", config.decoding.pad_id);
    println!("  Unknown id:        {}", config.decoding.unk_id());
    println!("  Truncation:        {:?}", config.decoding.truncation);

    let weights = dir.join(weights_loader::WEIGHTS_FILE);
    if weights.exists() {
        let metadata = std::fs::metadata(&weights)?;
        println!();
        println!("Weights size: {} KB", metadata.len() / 1024);
    } else {
        println!();
        println!("Weights file not found at {}", weights.display());
    }

    Ok(())
}

impl Runner {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let lemmatizer = if cli.task == Task::Lemmatize {
            let dir = cli.model.as_ref().context(
                "Lemmatization needs a model directory. Pass `--model path/to/model_dir`.",
            )?;
            let mut limits = DecodeLimits::default();
            if let Some(ms) = cli.timeout_ms {
                limits = limits.with_timeout(Duration::from_millis(ms));
            }
            Some(Lemmatizer::load(dir)?.with_limits(limits))
        } else {
            None
        };

        let stopwords = if cli.task == Task::Stopwords {
            let path = cli
                .stopwords
                .as_ref()
                .context("Stopword removal needs a list. Pass `--stopwords path/to/list.csv`.")?;
            let sw = Stopwords::from_csv_path(path)?;
            debug!(count = sw.len(), "loaded stopwords");
            Some(sw)
        } else {
            None
        };

        Ok(Self {
            task: cli.task,
            format: cli.format,
            lemmatizer,
            stopwords,
        })
    }

    fn run(&self, input: &str) -> Result<()> {
        match self.task {
            Task::Lemmatize => self.run_lemmatize(input),
            Task::Words => self.output_text(input, text::tokenize_words(input)),
            Task::Sentences => self.output_text(input, text::tokenize_sentences(input)),
            Task::Clean => self.output_text(input, vec![text::clean(input)]),
            Task::Stopwords => {
                let sw = self.stopwords.as_ref().context("stopwords not loaded")?;
                self.output_text(input, vec![text::remove_stopwords(input, sw)])
            }
        }
    }

    fn run_lemmatize(&self, input: &str) -> Result<()> {
        let lemmatizer = self.lemmatizer.as_ref().context("model not loaded")?;

        let mut results = Vec::new();
        for word in text::tokenize_words(input) {
            let start = Instant::now();
            let lemma = lemmatizer
                .lemmatize(&word)
                .with_context(|| format!("Failed to lemmatize {word:?}"))?;
            results.push(JsonLemma {
                input: word,
                lemma: lemma.text,
                steps: lemma.steps,
                stop: lemma.stop,
                elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            });
        }

        match self.format {
            OutputFormat::Plain => {
                for r in &results {
                    if r.stop == StopReason::LengthCap {
                        println!("{}\t{}\t(truncated)", r.input, r.lemma);
                    } else {
                        println!("{}\t{}", r.input, r.lemma);
                    }
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        }
        Ok(())
    }

    fn output_text(&self, input: &str, output: Vec<String>) -> Result<()> {
        match self.format {
            OutputFormat::Plain => {
                for line in &output {
                    println!("{line}");
                }
            }
            OutputFormat::Json => {
                let payload = JsonText {
                    task: self.task.as_str(),
                    input: input.to_string(),
                    output,
                };
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
        }
        Ok(())
    }
}

fn run_interactive_mode(runner: &Runner) -> Result<()> {
    println!("Sindhi NLP - Interactive Mode ({})", runner.task.as_str());
    println!("Type text and press Enter. Type 'quit' or 'exit' to leave.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        if let Err(err) = runner.run(input) {
            eprintln!("Error: {err:#}");
            eprintln!();
        }
    }

    Ok(())
}
