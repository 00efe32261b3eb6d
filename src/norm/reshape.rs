//! Wide-to-long and long-to-wide reshaping of the formant columns
//!
//! The long table holds one `(id, formant, value)` triple per observation
//! and formant. Restoring it looks each observation's formants up by
//! `(id, formant)`, so the round trip is exact as long as ids are unique.

use crate::structs::{Formant, LongRow, NormError, NormalizedObservation, Observation, Result};
use std::collections::{HashMap, HashSet};

/// Flatten F1 and F2 into one value column
///
/// # Errors
/// Returns `InvalidInput` if two observations share an id
pub fn to_long(observations: &[Observation]) -> Result<Vec<LongRow>> {
    let mut seen = HashSet::with_capacity(observations.len());
    let mut long = Vec::with_capacity(observations.len() * Formant::ALL.len());

    for obs in observations {
        if !seen.insert(obs.id) {
            return Err(NormError::InvalidInput(format!(
                "Duplicate observation id {} (speaker {})",
                obs.id, obs.speaker
            )));
        }
        for formant in Formant::ALL {
            let value = match formant {
                Formant::F1 => obs.f1,
                Formant::F2 => obs.f2,
            };
            long.push(LongRow {
                id: obs.id,
                speaker: obs.speaker.clone(),
                formant,
                value,
            });
        }
    }

    Ok(long)
}

/// Pivot long rows back onto the observations they came from
///
/// The values found in `long` become the normalized columns; every other
/// column comes from `observations` unchanged and in order.
///
/// # Errors
/// Returns `JoinCardinalityViolation` if any observation lacks a value for
/// some formant, if a `(id, formant)` pair appears twice, or if `long`
/// holds rows for ids that are not in `observations`
pub fn to_wide(observations: &[Observation], long: &[LongRow]) -> Result<Vec<NormalizedObservation>> {
    let mut cells: HashMap<(usize, Formant), f64> = HashMap::with_capacity(long.len());
    for row in long {
        if cells.insert((row.id, row.formant), row.value).is_some() {
            return Err(NormError::JoinCardinalityViolation(format!(
                "observation {} has more than one {} value",
                row.id, row.formant
            )));
        }
    }

    let lookup = |id: usize, formant: Formant| {
        cells.get(&(id, formant)).copied().ok_or_else(|| {
            NormError::JoinCardinalityViolation(format!("observation {id} has no {formant} value"))
        })
    };

    let wide = observations
        .iter()
        .map(|obs| {
            Ok(NormalizedObservation {
                observation: obs.clone(),
                f1_norm: lookup(obs.id, Formant::F1)?,
                f2_norm: lookup(obs.id, Formant::F2)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let expected = wide.len() * Formant::ALL.len();
    if cells.len() != expected {
        return Err(NormError::JoinCardinalityViolation(format!(
            "long table has {} values for {} observations",
            cells.len(),
            wide.len()
        )));
    }

    Ok(wide)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Observation> {
        vec![
            Observation {
                id: 4,
                speaker: "A".into(),
                sex: Some("F".into()),
                word: "beet".into(),
                vowel: "IY".into(),
                f1: 300.0,
                f2: 2200.0,
            },
            Observation {
                id: 9,
                speaker: "A".into(),
                sex: Some("F".into()),
                word: "beet".into(),
                vowel: "IY".into(),
                f1: 300.0,
                f2: 2200.0,
            },
        ]
    }

    #[test]
    fn test_to_long_shape() {
        let long = to_long(&sample()).expect("reshape");

        assert_eq!(long.len(), 4);
        assert_eq!(long[0].formant, Formant::F1);
        assert_eq!(long[1].formant, Formant::F2);
        assert!((long[1].value - 2200.0).abs() < f64::EPSILON);
        assert_eq!(long[2].id, 9);
    }

    #[test]
    fn test_round_trip_with_identical_rows() {
        // Identical measurements only stay apart because of their ids
        let obs = sample();
        let mut long = to_long(&obs).expect("reshape");
        for row in &mut long {
            if row.id == 9 {
                row.value += 1.0;
            }
        }

        let wide = to_wide(&obs, &long).expect("restore");

        assert_eq!(wide.len(), 2);
        assert_eq!(wide[0].observation, obs[0]);
        assert_eq!(wide[1].observation, obs[1]);
        assert!((wide[0].f1_norm - 300.0).abs() < f64::EPSILON);
        assert!((wide[1].f1_norm - 301.0).abs() < f64::EPSILON);
        assert!((wide[1].f2_norm - 2201.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut obs = sample();
        obs[1].id = obs[0].id;
        assert!(matches!(to_long(&obs), Err(NormError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_formant_rejected() {
        let obs = sample();
        let mut long = to_long(&obs).expect("reshape");
        long.pop();

        let err = to_wide(&obs, &long).expect_err("F2 of observation 9 is gone");
        assert!(matches!(err, NormError::JoinCardinalityViolation(_)));
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let obs = sample();
        let mut long = to_long(&obs).expect("reshape");
        long.push(long[0].clone());

        assert!(to_wide(&obs, &long).is_err());
    }

    #[test]
    fn test_stray_rows_rejected() {
        let obs = sample();
        let long = to_long(&obs).expect("reshape");

        let err = to_wide(&obs[..1], &long).expect_err("rows for id 9 have no observation");
        assert!(matches!(err, NormError::JoinCardinalityViolation(_)));
    }
}
