//! Nearey log-mean normalization
//!
//! Both variants run on the long table: Nearey 1 takes one log mean per
//! (speaker, formant), Nearey 2 pools F1 and F2 into a single log mean per
//! speaker so the ratio between the formants survives normalization.

use super::reshape::{to_long, to_wide};
use super::stats::{group_indices, mean};
use crate::structs::{
    Formant, LongRow, Method, NormError, Normalized, Observation, Result, SpeakerParams,
};
use std::collections::BTreeMap;

/// Nearey 1: log-mean normalize each formant separately per speaker
///
/// # Errors
/// Returns `InvalidInput` if any formant value is not strictly positive
pub fn nearey1(observations: &[Observation]) -> Result<Normalized> {
    let mut long = log_long(observations)?;
    let means = center_log_values(&mut long, |r| (r.speaker.clone(), r.formant));
    let rows = to_wide(observations, &long)?;

    let mut per_speaker: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for ((speaker, formant), mu) in means {
        let entry = per_speaker.entry(speaker).or_insert((f64::NAN, f64::NAN));
        match formant {
            Formant::F1 => entry.0 = mu,
            Formant::F2 => entry.1 = mu,
        }
    }
    let params = per_speaker
        .into_iter()
        .map(|(speaker, (f1_log_mean, f2_log_mean))| {
            (speaker, SpeakerParams::Nearey1 { f1_log_mean, f2_log_mean })
        })
        .collect();

    Ok(Normalized {
        method: Method::Nearey1,
        rows,
        params,
    })
}

/// Nearey 2: log-mean normalize with one mean pooled over F1 and F2 per speaker
///
/// # Errors
/// Returns `InvalidInput` if any formant value is not strictly positive
pub fn nearey2(observations: &[Observation]) -> Result<Normalized> {
    let mut long = log_long(observations)?;
    let means = center_log_values(&mut long, |r| r.speaker.clone());
    let rows = to_wide(observations, &long)?;

    let params = means
        .into_iter()
        .map(|(speaker, log_mean)| (speaker, SpeakerParams::Nearey2 { log_mean }))
        .collect();

    Ok(Normalized {
        method: Method::Nearey2,
        rows,
        params,
    })
}

/// Long table with every value replaced by its natural log
fn log_long(observations: &[Observation]) -> Result<Vec<LongRow>> {
    let mut long = to_long(observations)?;
    for row in &mut long {
        if row.value <= 0.0 {
            return Err(NormError::InvalidInput(format!(
                "observation {} (speaker {}): {} = {} is not positive, log undefined",
                row.id, row.speaker, row.formant, row.value
            )));
        }
        row.value = row.value.ln();
    }
    Ok(long)
}

/// Subtract each group's mean log value and exponentiate back
///
/// Returns the log mean of every group.
fn center_log_values<K, F>(long: &mut [LongRow], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&LongRow) -> K,
{
    let mut means = BTreeMap::new();
    for (k, indices) in group_indices(long, key) {
        let logs: Vec<f64> = indices.iter().map(|&i| long[i].value).collect();
        // groups from group_indices are never empty
        let mu = mean(&logs).unwrap_or(0.0);
        for &i in &indices {
            long[i].value = (long[i].value - mu).exp();
        }
        means.insert(k, mu);
    }
    means
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::norm::testutil::{obs, two_speakers};

    /// Pooled normalization computed straight from the wide table
    fn nearey2_direct(observations: &[Observation]) -> Vec<(f64, f64)> {
        observations
            .iter()
            .map(|o| {
                let logs: Vec<f64> = observations
                    .iter()
                    .filter(|p| p.speaker == o.speaker)
                    .flat_map(|p| [p.f1.ln(), p.f2.ln()])
                    .collect();
                let mu = mean(&logs).expect("non-empty");
                ((o.f1.ln() - mu).exp(), (o.f2.ln() - mu).exp())
            })
            .collect()
    }

    #[test]
    fn test_pooled_log_mean_is_zero() {
        let out = nearey2(&two_speakers()).expect("normalize");

        for speaker in ["A", "B"] {
            let logs: Vec<f64> = out
                .rows
                .iter()
                .filter(|r| r.observation.speaker == speaker)
                .flat_map(|r| [r.f1_norm.ln(), r.f2_norm.ln()])
                .collect();
            let mu = mean(&logs).expect("non-empty");
            assert!((mu.exp() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reshape_matches_direct() {
        let rows = two_speakers();
        let out = nearey2(&rows).expect("normalize");
        let direct = nearey2_direct(&rows);

        assert_eq!(out.rows.len(), rows.len());
        for (row, (f1, f2)) in out.rows.iter().zip(direct) {
            assert!((row.f1_norm - f1).abs() < 1e-12);
            assert!((row.f2_norm - f2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pooling_keeps_formant_ratio() {
        let rows = two_speakers();
        let out = nearey2(&rows).expect("normalize");

        for row in &out.rows {
            let raw = row.observation.f2 / row.observation.f1;
            assert!((row.f2_norm / row.f1_norm - raw).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nearey1_centers_each_formant() {
        let out = nearey1(&two_speakers()).expect("normalize");

        for speaker in ["A", "B"] {
            let speaker_rows: Vec<_> = out
                .rows
                .iter()
                .filter(|r| r.observation.speaker == speaker)
                .collect();
            let f1: Vec<f64> = speaker_rows.iter().map(|r| r.f1_norm.ln()).collect();
            let f2: Vec<f64> = speaker_rows.iter().map(|r| r.f2_norm.ln()).collect();
            assert!(mean(&f1).expect("non-empty").abs() < 1e-9);
            assert!(mean(&f2).expect("non-empty").abs() < 1e-9);
        }
        assert_eq!(out.params.len(), 2);
    }

    #[test]
    fn test_nearey1_differs_from_nearey2() {
        let rows = two_speakers();
        let one = nearey1(&rows).expect("normalize");
        let two = nearey2(&rows).expect("normalize");

        assert!((one.rows[0].f1_norm - two.rows[0].f1_norm).abs() > 1e-3);
    }

    #[test]
    fn test_preserves_rows() {
        let rows = two_speakers();
        let out = nearey2(&rows).expect("normalize");

        let restored: Vec<Observation> = out.rows.into_iter().map(|r| r.observation).collect();
        assert_eq!(restored, rows);
    }

    #[test]
    fn test_non_positive_rejected() {
        let rows = vec![obs(0, "A", "IY", 300.0, 2200.0), obs(1, "A", "AA", 0.0, 1200.0)];

        let err = nearey2(&rows).expect_err("zero F1");
        assert!(matches!(err, NormError::InvalidInput(_)));
        assert!(nearey1(&rows).is_err());
    }
}
