//! Normalization pipeline that orchestrates filtering, normalization and aggregation

use crate::structs::{
    FilterConfig, FilterOutcome, Method, NormError, Normalized, Observation, Result, VowelMean,
};

/// Configuration for a normalization run
#[derive(Debug, Clone, Copy)]
pub struct NormalizeConfig {
    pub method: Method,
    /// `None` skips the outlier filter
    pub filter: Option<FilterConfig>,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub input_rows: usize,
    pub filter: Option<FilterOutcome>,
    pub normalized: Normalized,
    pub means: Vec<VowelMean>,
}

/// Apply one normalization procedure
///
/// # Errors
/// Returns whatever error the chosen procedure raises
pub fn normalize(method: Method, observations: &[Observation]) -> Result<Normalized> {
    match method {
        Method::Lobanov => super::lobanov::lobanov(observations),
        Method::Nearey1 => super::nearey::nearey1(observations),
        Method::Nearey2 => super::nearey::nearey2(observations),
        Method::WattFabricius => super::watt_fabricius::watt_fabricius(observations),
    }
}

/// Run the full pipeline: filter, normalize, aggregate
///
/// # Errors
/// Returns `InvalidInput` if a formant is not positive, error if filtering
/// or normalization fails, or if a normalized value is not finite
pub fn run_pipeline(observations: &[Observation], config: &NormalizeConfig) -> Result<PipelineResult> {
    if observations.is_empty() {
        return Err(NormError::InsufficientData("no observations loaded".into()));
    }
    if let Some(bad) = observations.iter().find(|o| !(o.f1 > 0.0 && o.f2 > 0.0)) {
        return Err(NormError::InvalidInput(format!(
            "observation {} (speaker {}): formants F1={}, F2={} must be positive",
            bad.id, bad.speaker, bad.f1, bad.f2
        )));
    }

    let filter = config
        .filter
        .as_ref()
        .map(|f| super::outliers::filter_outliers(observations, f))
        .transpose()?;
    let working = filter.as_ref().map_or(observations, |f| f.kept.as_slice());

    log::info!("Normalizing {} observations ({})", working.len(), config.method);
    let normalized = normalize(config.method, working)?;

    if let Some(bad) = normalized
        .rows
        .iter()
        .find(|r| !r.f1_norm.is_finite() || !r.f2_norm.is_finite())
    {
        return Err(NormError::DegenerateGroup(format!(
            "observation {} (speaker {}) normalized to a non-finite value",
            bad.observation.id, bad.observation.speaker
        )));
    }

    let means = super::aggregate::vowel_means(&normalized.rows);

    Ok(PipelineResult {
        input_rows: observations.len(),
        filter,
        normalized,
        means,
    })
}
