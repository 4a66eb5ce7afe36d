//! Greedy token selection.

/// Index of the highest score.
///
/// Ties resolve to the lowest index. Infinities compare as ordinary values. Returns `None` for
/// an empty slice or when any score is NaN.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn argmax(scores: &[f32]) -> Option<u32> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &v) in scores.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        match best {
            Some((_, best_val)) if v <= best_val => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx as u32)
}

/// Number of entries in `scores` that are not NaN.
#[must_use]
pub fn usable_count(scores: &[f32]) -> usize {
    scores.iter().filter(|v| !v.is_nan()).count()
}
