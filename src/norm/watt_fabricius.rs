//! Watt & Fabricius triangle-scaling normalization

use super::join::join_one_to_many;
use super::stats::{group_indices, mean};
use crate::structs::{
    FormantPoint, Method, NormError, Normalized, NormalizedObservation, Observation, Result,
    SpeakerParams, SpeakerScaler, TrianglePoints,
};
use std::collections::BTreeMap;

/// Mean F1/F2 of every (speaker, vowel) group, vowels in key order per speaker
#[must_use]
pub fn vowel_centroids(observations: &[Observation]) -> BTreeMap<String, BTreeMap<String, FormantPoint>> {
    let mut centroids: BTreeMap<String, BTreeMap<String, FormantPoint>> = BTreeMap::new();
    for ((speaker, vowel), indices) in
        group_indices(observations, |o| (o.speaker.clone(), o.vowel.clone()))
    {
        let f1: Vec<f64> = indices.iter().map(|&i| observations[i].f1).collect();
        let f2: Vec<f64> = indices.iter().map(|&i| observations[i].f2).collect();
        // groups from group_indices are never empty
        let (Some(f1), Some(f2)) = (mean(&f1), mean(&f2)) else {
            continue;
        };
        centroids
            .entry(speaker)
            .or_default()
            .insert(vowel, FormantPoint { f1, f2 });
    }
    centroids
}

/// Derive beet, bat and school from a speaker's vowel centroids
///
/// beet takes the lowest F1 and the highest F2, each independently. bat
/// takes the highest F1 together with the F2 of the vowel that has it; on
/// ties the first vowel in key order wins. school sits at beet's F1 on
/// both axes.
#[must_use]
pub fn triangle(centroids: &BTreeMap<String, FormantPoint>) -> Option<TrianglePoints> {
    let mut points = centroids.values();
    let first = *points.next()?;

    let mut min_f1 = first.f1;
    let mut max_f2 = first.f2;
    let mut bat = first;
    for p in points {
        min_f1 = min_f1.min(p.f1);
        max_f2 = max_f2.max(p.f2);
        if p.f1 > bat.f1 {
            bat = *p;
        }
    }

    Some(TrianglePoints {
        beet: FormantPoint {
            f1: min_f1,
            f2: max_f2,
        },
        bat,
        school: FormantPoint {
            f1: min_f1,
            f2: min_f1,
        },
    })
}

impl TrianglePoints {
    /// Scaling factors (S1, S2): the mean F1 and mean F2 of the three points
    #[must_use]
    pub fn scaling_factors(&self) -> (f64, f64) {
        let s1 = (self.beet.f1 + self.bat.f1 + self.school.f1) / 3.0;
        let s2 = (self.beet.f2 + self.bat.f2 + self.school.f2) / 3.0;
        (s1, s2)
    }
}

/// One scaler row per speaker
///
/// # Errors
/// Returns `InsufficientData` if a speaker has no vowel centroids and
/// `DegenerateGroup` if a scaling factor is not positive
pub fn scaler_table(observations: &[Observation]) -> Result<Vec<SpeakerScaler>> {
    vowel_centroids(observations)
        .into_iter()
        .map(|(speaker, centroids)| {
            let triangle = triangle(&centroids).ok_or_else(|| {
                NormError::InsufficientData(format!("speaker {speaker} has no vowel classes"))
            })?;
            let (s1, s2) = triangle.scaling_factors();
            if s1 <= 0.0 || s2 <= 0.0 {
                return Err(NormError::DegenerateGroup(format!(
                    "speaker {speaker}: scaling factors S1={s1}, S2={s2} must be positive"
                )));
            }
            log::debug!(
                "Speaker {speaker}: {} vowel classes, S1={s1:.2}, S2={s2:.2}",
                centroids.len()
            );
            Ok(SpeakerScaler {
                speaker,
                triangle,
                s1,
                s2,
            })
        })
        .collect()
}

/// Divide each token's formants by its speaker's scaling factors
///
/// # Errors
/// Returns `InsufficientData` for an empty input table, and any error of
/// [`scaler_table`] or of the speaker join
pub fn watt_fabricius(observations: &[Observation]) -> Result<Normalized> {
    if observations.is_empty() {
        return Err(NormError::InsufficientData(
            "no observations to derive vowel triangles from".into(),
        ));
    }

    let scalers = scaler_table(observations)?;
    let rows = join_one_to_many(observations, &scalers, |o| o.speaker.clone(), |s| s.speaker.clone())?
        .into_iter()
        .map(|(obs, scaler)| NormalizedObservation {
            observation: obs.clone(),
            f1_norm: obs.f1 / scaler.s1,
            f2_norm: obs.f2 / scaler.s2,
        })
        .collect();

    let params = scalers
        .into_iter()
        .map(|s| {
            (
                s.speaker,
                SpeakerParams::WattFabricius {
                    triangle: s.triangle,
                    s1: s.s1,
                    s2: s.s2,
                },
            )
        })
        .collect();

    Ok(Normalized {
        method: Method::WattFabricius,
        rows,
        params,
    })
}
