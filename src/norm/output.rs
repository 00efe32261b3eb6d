//! Output file writers for the normalize phase

use super::pipeline::PipelineResult;
use super::stats::group_indices;
use crate::structs::{
    FilterOutcome, Method, Normalized, NormalizedObservation, Observation, Result, SpeakerParams,
    VowelMean,
};
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Write `normalized.tsv` - every kept observation with its normalized formants
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_normalized(output_dir: &Path, rows: &[NormalizedObservation]) -> Result<()> {
    let path = output_dir.join("normalized.tsv");
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    writer.write_record(["id", "speaker", "sex", "word", "vowel", "F1", "F2", "F1_norm", "F2_norm"])?;
    for row in rows {
        let obs = &row.observation;
        writer.write_record([
            obs.id.to_string(),
            obs.speaker.clone(),
            obs.sex.clone().unwrap_or_default(),
            obs.word.clone(),
            obs.vowel.clone(),
            obs.f1.to_string(),
            obs.f2.to_string(),
            format!("{:.6}", row.f1_norm),
            format!("{:.6}", row.f2_norm),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `vowel_means.csv` - one plot point per (speaker, vowel)
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_vowel_means(output_dir: &Path, means: &[VowelMean]) -> Result<()> {
    let path = output_dir.join("vowel_means.csv");
    let mut writer = WriterBuilder::new().from_path(path)?;

    writer.write_record(["speaker", "vowel", "n", "F1_norm", "F2_norm"])?;
    for m in means {
        writer.write_record([
            m.speaker.clone(),
            m.vowel.clone(),
            m.n.to_string(),
            format!("{:.6}", m.f1),
            format!("{:.6}", m.f2),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `summary.json` - machine-readable run summary
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_summary_json(output_dir: &Path, result: &PipelineResult, threshold: Option<f64>) -> Result<()> {
    let path = output_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&build_summary(result, threshold))?;
    fs::write(path, json)?;
    Ok(())
}

/// Human readable overview, printed at the end of a run
#[must_use]
pub fn summary_text(result: &PipelineResult) -> String {
    use std::fmt::Write as _;

    let normalized = &result.normalized;
    let mut s = format!(
        "{} normalization: {} of {} observations, {} speakers\n",
        normalized.method,
        normalized.rows.len(),
        result.input_rows,
        normalized.params.len()
    );
    if let Some(filter) = &result.filter {
        let _ = writeln!(
            s,
            "  outliers removed: {}, groups kept unfiltered: {}",
            filter.removed.len(),
            filter.passed_through.len()
        );
    }
    for (speaker, params) in &normalized.params {
        let _ = writeln!(s, "  {speaker}: {}", describe_params(params));
    }
    s
}

/// Per-speaker token counts before and after the outlier filter
#[must_use]
pub fn inspect_text(observations: &[Observation], filter: &FilterOutcome) -> String {
    use std::fmt::Write as _;

    let mut removed: BTreeMap<&str, usize> = BTreeMap::new();
    for obs in &filter.removed {
        *removed.entry(obs.speaker.as_str()).or_insert(0) += 1;
    }

    let mut s = String::from("speaker\tsex\ttokens\tvowels\toutliers\n");
    for (speaker, indices) in group_indices(observations, |o| o.speaker.clone()) {
        let sex = observations[indices[0]].sex.as_deref().unwrap_or("-");
        let vowels = group_indices(&indices, |&i| observations[i].vowel.as_str()).len();
        let _ = writeln!(
            s,
            "{speaker}\t{sex}\t{}\t{vowels}\t{}",
            indices.len(),
            removed.get(speaker.as_str()).copied().unwrap_or(0)
        );
    }
    let _ = writeln!(
        s,
        "total: {} tokens, {} outliers, {} groups kept unfiltered",
        observations.len(),
        filter.removed.len(),
        filter.passed_through.len()
    );
    s
}

fn describe_params(params: &SpeakerParams) -> String {
    match params {
        SpeakerParams::Lobanov { f1, f2 } => format!(
            "F1 mean={:.2} sd={:.2}, F2 mean={:.2} sd={:.2}",
            f1.mean, f1.std_dev, f2.mean, f2.std_dev
        ),
        SpeakerParams::Nearey1 {
            f1_log_mean,
            f2_log_mean,
        } => format!("log mean F1={f1_log_mean:.4}, F2={f2_log_mean:.4}"),
        SpeakerParams::Nearey2 { log_mean } => format!("pooled log mean={log_mean:.4}"),
        SpeakerParams::WattFabricius { s1, s2, .. } => format!("S1={s1:.2}, S2={s2:.2}"),
    }
}

fn build_summary(result: &PipelineResult, threshold: Option<f64>) -> SummaryOutput {
    let normalized: &Normalized = &result.normalized;

    let mut tokens: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &normalized.rows {
        *tokens.entry(row.observation.speaker.as_str()).or_insert(0) += 1;
    }
    let mut removed: BTreeMap<&str, usize> = BTreeMap::new();
    if let Some(filter) = &result.filter {
        for obs in &filter.removed {
            *removed.entry(obs.speaker.as_str()).or_insert(0) += 1;
        }
    }

    let speakers = normalized
        .params
        .iter()
        .map(|(speaker, params)| SpeakerEntry {
            speaker: speaker.clone(),
            tokens: tokens.get(speaker.as_str()).copied().unwrap_or(0),
            outliers_removed: removed.get(speaker.as_str()).copied().unwrap_or(0),
            params: params.clone(),
        })
        .collect();

    SummaryOutput {
        method: normalized.method,
        input_rows: result.input_rows,
        output_rows: normalized.rows.len(),
        outlier_filter: result.filter.as_ref().map(|f| FilterSummary {
            threshold,
            removed: f.removed.len(),
            passed_through_groups: f
                .passed_through
                .iter()
                .map(|(speaker, vowel)| format!("{speaker}/{vowel}"))
                .collect(),
        }),
        speakers,
    }
}

// JSON output structures

#[derive(Serialize)]
struct SummaryOutput {
    method: Method,
    input_rows: usize,
    output_rows: usize,
    outlier_filter: Option<FilterSummary>,
    speakers: Vec<SpeakerEntry>,
}

#[derive(Serialize)]
struct FilterSummary {
    threshold: Option<f64>,
    removed: usize,
    passed_through_groups: Vec<String>,
}

#[derive(Serialize)]
struct SpeakerEntry {
    speaker: String,
    tokens: usize,
    outliers_removed: usize,
    params: SpeakerParams,
}
