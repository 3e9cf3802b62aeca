use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;

/// Deterministic stand-in for model output. Sinusoid values derived from a hash of the text keep
/// vectors reproducible across runs and machines with no model on disk.
pub(crate) fn make_stub_vector(text: &str, dim: usize, normalize: bool) -> Vec<f32> {
    let mut v = vec![0f32; dim];
    let h = hash64(text.as_bytes());
    for (idx, value) in v.iter_mut().enumerate() {
        // Offset by the index so neighbouring dimensions differ even when the hash shift repeats.
        *value = (((h >> (idx % 32)) as f32 * 0.0001) + idx as f32).sin();
    }
    if normalize {
        l2_normalize_in_place(&mut v);
    }
    v
}
