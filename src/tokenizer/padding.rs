//! Fixed-length input preparation.

use serde::{Deserialize, Serialize};

/// What to do with an encoded input longer than the model's input length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Refuse the input.
    #[default]
    Reject,
    /// Keep the leading ids, drop the tail.
    KeepStart,
    /// Keep the trailing ids, drop the head.
    KeepEnd,
}

/// Returned by [`pad_sequence`] when an input is too long under [`TruncationPolicy::Reject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    pub len: usize,
    pub max_len: usize,
}

/// Right-pad `ids` with `pad_id` to exactly `max_len`.
///
/// # Errors
/// Returns [`Overflow`] if `ids` is longer than `max_len` and the policy is `Reject`.
pub fn pad_sequence(
    ids: &[u32],
    max_len: usize,
    pad_id: u32,
    policy: TruncationPolicy,
) -> Result<Vec<u32>, Overflow> {
    let kept = if ids.len() <= max_len {
        ids
    } else {
        match policy {
            TruncationPolicy::Reject => {
                return Err(Overflow {
                    len: ids.len(),
                    max_len,
                });
            }
            TruncationPolicy::KeepStart => &ids[..max_len],
            TruncationPolicy::KeepEnd => &ids[ids.len() - max_len..],
        }
    };

    let mut padded = Vec::with_capacity(max_len);
    padded.extend_from_slice(kept);
    padded.resize(max_len, pad_id);
    Ok(padded)
}
