#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod inference;
pub mod lemmatizer;
pub mod model;
pub mod text;
pub mod tokenizer;
pub mod weights;

pub use error::{CancelReason, LemmaError, LemmaResult};
pub use inference::{DecodeLimits, Lemma, StopReason};
pub use lemmatizer::Lemmatizer;
