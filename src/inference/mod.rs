pub mod generate;
pub mod greedy;

pub use generate::{DecodeLimits, Lemma, StopReason, decode, decode_padded, prepare_input};
pub use greedy::argmax;
