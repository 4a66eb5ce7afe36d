pub mod padding;
pub mod vocab;

pub use padding::{Overflow, TruncationPolicy, pad_sequence};
pub use vocab::{SENTINEL, Vocabulary};
