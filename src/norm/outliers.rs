//! Per-(speaker, vowel) Mahalanobis outlier filter

use super::distance::mahalanobis_sq;
use super::stats::group_indices;
use crate::structs::{
    FilterConfig, FilterOutcome, NormError, Observation, Result, SmallGroupPolicy,
};

/// Drop observations far from their (speaker, vowel) centroid
///
/// A row is kept iff the square root of its squared Mahalanobis distance is
/// at most `config.threshold`. Groups whose covariance is undefined are
/// handled according to `config.small_groups`. Input order is preserved.
///
/// # Errors
/// Returns `Config` for a negative or non-finite threshold, and
/// `DegenerateGroup` for an undefined covariance under `SmallGroupPolicy::Reject`
pub fn filter_outliers(observations: &[Observation], config: &FilterConfig) -> Result<FilterOutcome> {
    if !config.threshold.is_finite() || config.threshold < 0.0 {
        return Err(NormError::Config(format!(
            "Outlier threshold must be a non-negative number, got {}",
            config.threshold
        )));
    }

    let groups = group_indices(observations, |o| (o.speaker.clone(), o.vowel.clone()));
    let mut keep = vec![true; observations.len()];
    let mut passed_through = Vec::new();

    for ((speaker, vowel), indices) in groups {
        let f1: Vec<f64> = indices.iter().map(|&i| observations[i].f1).collect();
        let f2: Vec<f64> = indices.iter().map(|&i| observations[i].f2).collect();

        let Some(distances) = mahalanobis_sq(&f1, &f2) else {
            match config.small_groups {
                SmallGroupPolicy::Pass => {
                    log::debug!(
                        "Speaker {speaker}, vowel {vowel}: {} tokens, covariance undefined, kept unfiltered",
                        indices.len()
                    );
                    passed_through.push((speaker, vowel));
                    continue;
                }
                SmallGroupPolicy::Reject => {
                    return Err(NormError::DegenerateGroup(format!(
                        "speaker {speaker}, vowel {vowel}: {} tokens do not define a covariance",
                        indices.len()
                    )));
                }
            }
        };

        for (&i, d) in indices.iter().zip(distances) {
            if d.max(0.0).sqrt() > config.threshold {
                keep[i] = false;
            }
        }
    }

    let mut outcome = FilterOutcome {
        passed_through,
        ..FilterOutcome::default()
    };
    for (obs, kept) in observations.iter().zip(keep) {
        if kept {
            outcome.kept.push(obs.clone());
        } else {
            outcome.removed.push(obs.clone());
        }
    }

    log::info!(
        "Outlier filter (threshold {}): kept {}, removed {}",
        config.threshold,
        outcome.kept.len(),
        outcome.removed.len()
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(id: usize, speaker: &str, vowel: &str, f1: f64, f2: f64) -> Observation {
        Observation {
            id,
            speaker: speaker.to_string(),
            sex: None,
            word: format!("w{id}"),
            vowel: vowel.to_string(),
            f1,
            f2,
        }
    }

    /// Hexagon of radius 20 Hz plus its centre, and one token 1000 Hz away
    fn cluster_with_outlier(speaker: &str) -> Vec<Observation> {
        let mut rows = vec![obs(0, speaker, "AA", 500.0, 1500.0)];
        for k in 0..6 {
            let angle = f64::from(k) * std::f64::consts::FRAC_PI_3;
            rows.push(obs(
                rows.len(),
                speaker,
                "AA",
                500.0 + 20.0 * angle.cos(),
                1500.0 + 20.0 * angle.sin(),
            ));
        }
        rows.push(obs(rows.len(), speaker, "AA", 1500.0, 1500.0));
        rows
    }

    #[test]
    fn test_removes_far_token() {
        let rows = cluster_with_outlier("A");
        let outcome = filter_outliers(&rows, &FilterConfig::default()).expect("filter");

        assert_eq!(outcome.kept.len(), 7);
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(outcome.removed[0].id, 7);
        assert!(outcome.passed_through.is_empty());
    }

    #[test]
    fn test_filter_idempotent() {
        let rows = cluster_with_outlier("A");
        let config = FilterConfig::default();

        let once = filter_outliers(&rows, &config).expect("first pass");
        let twice = filter_outliers(&once.kept, &config).expect("second pass");

        assert_eq!(once.kept, twice.kept);
        assert!(twice.removed.is_empty());
    }

    #[test]
    fn test_preserves_order_and_values() {
        let mut rows = cluster_with_outlier("A");
        rows.reverse();
        let outcome = filter_outliers(&rows, &FilterConfig::default()).expect("filter");

        let expected: Vec<Observation> = rows.into_iter().filter(|o| o.id != 7).collect();
        assert_eq!(outcome.kept, expected);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut rows = cluster_with_outlier("A");
        // same vowel label, different speaker, far away from speaker A's cluster
        rows.push(obs(100, "B", "AA", 800.0, 1200.0));
        rows.push(obs(101, "B", "AA", 820.0, 1260.0));

        let outcome = filter_outliers(&rows, &FilterConfig::default()).expect("filter");

        assert_eq!(outcome.removed.len(), 1);
        assert!(outcome.kept.iter().any(|o| o.id == 100));
        assert_eq!(outcome.passed_through, vec![("B".to_string(), "AA".to_string())]);
    }

    #[test]
    fn test_small_group_pass_through() {
        let rows = vec![obs(0, "A", "IY", 300.0, 2200.0), obs(1, "A", "IY", 900.0, 900.0)];
        let outcome = filter_outliers(&rows, &FilterConfig::default()).expect("filter");

        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.passed_through.len(), 1);
    }

    #[test]
    fn test_small_group_reject() {
        let rows = vec![obs(0, "A", "IY", 300.0, 2200.0), obs(1, "A", "IY", 320.0, 2300.0)];
        let config = FilterConfig {
            threshold: 2.0,
            small_groups: SmallGroupPolicy::Reject,
        };

        let err = filter_outliers(&rows, &config).expect_err("two tokens cannot be tested");
        assert!(matches!(err, NormError::DegenerateGroup(_)));
    }

    #[test]
    fn test_invalid_threshold() {
        let config = FilterConfig {
            threshold: -1.0,
            ..FilterConfig::default()
        };
        assert!(matches!(
            filter_outliers(&[], &config),
            Err(NormError::Config(_))
        ));
    }
}
