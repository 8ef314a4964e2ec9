//! Uniform random draws.

use rand::Rng;

/// Draw an integer uniformly from `[min, max)`.
///
/// Returns `min` when the range is empty.
pub fn random_int(min: u64, max: u64) -> u64 {
    if max <= min {
        return min;
    }
    rand::rng().random_range(min..max)
}

/// Pick a uniformly random index into a collection of `len` items.
pub fn random_index(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(rand::rng().random_range(0..len))
}
