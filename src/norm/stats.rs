use crate::structs::{GroupStats, NormError, Result};
use std::collections::BTreeMap;

impl GroupStats {
    /// Mean and sample standard deviation (N-1 divisor) of `values`
    ///
    /// A single value has a standard deviation of zero.
    ///
    /// # Errors
    /// Returns error if values is empty
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate(values: &[f64]) -> Result<Self> {
        let mean = mean(values)
            .ok_or_else(|| NormError::InsufficientData("Cannot calculate stats for empty data".into()))?;

        let count = values.len();
        let std_dev = if count < 2 {
            0.0
        } else {
            let ss = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        };

        Ok(Self {
            count,
            mean,
            std_dev,
        })
    }

    /// Standardize a value against these stats
    #[must_use]
    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }
}

/// Arithmetic mean, `None` for an empty slice
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Indices of `items` grouped by key, in key order
///
/// Within a group, indices keep their input order.
pub fn group_indices<T, K, F>(items: &[T], key: F) -> BTreeMap<K, Vec<usize>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        groups.entry(key(item)).or_default().push(i);
    }
    groups
}
