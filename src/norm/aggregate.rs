use super::stats::{group_indices, mean};
use crate::structs::{NormalizedObservation, VowelMean};

/// Mean normalized F1/F2 per (speaker, vowel), sorted by speaker then vowel
///
/// This is the table a vowel plot consumes: one labeled point per group.
#[must_use]
pub fn vowel_means(rows: &[NormalizedObservation]) -> Vec<VowelMean> {
    group_indices(rows, |r| {
        (r.observation.speaker.clone(), r.observation.vowel.clone())
    })
    .into_iter()
    .filter_map(|((speaker, vowel), indices)| {
        let f1: Vec<f64> = indices.iter().map(|&i| rows[i].f1_norm).collect();
        let f2: Vec<f64> = indices.iter().map(|&i| rows[i].f2_norm).collect();
        Some(VowelMean {
            speaker,
            vowel,
            n: indices.len(),
            f1: mean(&f1)?,
            f2: mean(&f2)?,
        })
    })
    .collect()
}
