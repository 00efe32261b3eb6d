//! Consolidated public types for the vownorm crate
//!
//! This module contains all public structs, enums, and error types used across the crate.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum NormError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate group: {0}")]
    DegenerateGroup(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Join cardinality violation: {0}")]
    JoinCardinalityViolation(String),
}

pub type Result<T> = std::result::Result<T, NormError>;

// ============================================================================
// Input Types
// ============================================================================

/// Represents a parsed delimited file with headers and rows
#[derive(Debug, Clone)]
pub struct CsvData {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvData {
    /// Get number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Get column index by name
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get column index by name, failing if the column is absent
    ///
    /// # Errors
    /// Returns `InvalidInput` if no header matches `name`
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            NormError::InvalidInput(format!(
                "{}: missing required column '{name}' (found: {})",
                self.source,
                self.headers.join(", ")
            ))
        })
    }
}

/// Header names of the columns the loader selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub speaker: String,
    pub sex: String,
    pub word: String,
    pub vowel: String,
    pub f1: String,
    pub f2: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            speaker: "speaker".to_string(),
            sex: "sex".to_string(),
            word: "word".to_string(),
            vowel: "vowel".to_string(),
            f1: "F1".to_string(),
            f2: "F2".to_string(),
        }
    }
}

/// One vowel token
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Unique across all loaded files; used to restore reshaped tables
    pub id: usize,
    pub speaker: String,
    /// Kept verbatim as text
    pub sex: Option<String>,
    pub word: String,
    pub vowel: String,
    pub f1: f64,
    pub f2: f64,
}

/// An observation with the two normalized formant columns appended
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedObservation {
    pub observation: Observation,
    pub f1_norm: f64,
    pub f2_norm: f64,
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Normalization procedure applied to a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Per-speaker, per-formant z-score
    Lobanov,
    /// Per-speaker, per-formant log-mean
    Nearey1,
    /// Per-speaker log-mean pooled across formants
    Nearey2,
    /// Scaling by speaker vowel-space triangle
    WattFabricius,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lobanov => "Lobanov",
            Self::Nearey1 => "Nearey 1",
            Self::Nearey2 => "Nearey 2",
            Self::WattFabricius => "Watt & Fabricius",
        };
        f.write_str(name)
    }
}

/// What the outlier filter does with groups too small (or too collinear)
/// to define a covariance matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SmallGroupPolicy {
    /// Keep every row of the group
    #[default]
    Pass,
    /// Abort with a `DegenerateGroup` error
    Reject,
}

/// Settings for the outlier filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub threshold: f64,
    pub small_groups: SmallGroupPolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            small_groups: SmallGroupPolicy::Pass,
        }
    }
}

// ============================================================================
// Reshape Types
// ============================================================================

/// Formant name used as the key column of the long table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Formant {
    F1,
    F2,
}

impl Formant {
    pub const ALL: [Self; 2] = [Self::F1, Self::F2];
}

impl fmt::Display for Formant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F1 => f.write_str("F1"),
            Self::F2 => f.write_str("F2"),
        }
    }
}

/// One (observation, formant, value) triple of the long table
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub id: usize,
    pub speaker: String,
    pub formant: Formant,
    pub value: f64,
}

// ============================================================================
// Statistics Types
// ============================================================================

/// Mean and sample standard deviation of a set of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

/// A 2-D point in (F1, F2) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormantPoint {
    pub f1: f64,
    pub f2: f64,
}

/// Synthetic corner points of a speaker's vowel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrianglePoints {
    pub beet: FormantPoint,
    pub bat: FormantPoint,
    pub school: FormantPoint,
}

/// One row of the Watt & Fabricius scaler table
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerScaler {
    pub speaker: String,
    pub triangle: TrianglePoints,
    pub s1: f64,
    pub s2: f64,
}

/// Per-speaker parameters a normalization run derived
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum SpeakerParams {
    Lobanov { f1: GroupStats, f2: GroupStats },
    Nearey1 { f1_log_mean: f64, f2_log_mean: f64 },
    Nearey2 { log_mean: f64 },
    WattFabricius { triangle: TrianglePoints, s1: f64, s2: f64 },
}

/// Mean normalized formants of one (speaker, vowel) group
#[derive(Debug, Clone, PartialEq)]
pub struct VowelMean {
    pub speaker: String,
    pub vowel: String,
    pub n: usize,
    pub f1: f64,
    pub f2: f64,
}

/// Normalized table plus the per-speaker parameters that produced it
#[derive(Debug, Clone)]
pub struct Normalized {
    pub method: Method,
    pub rows: Vec<NormalizedObservation>,
    pub params: Vec<(String, SpeakerParams)>,
}

/// Rows kept and removed by the outlier filter
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Observation>,
    pub removed: Vec<Observation>,
    /// (speaker, vowel) groups passed through without a distance test
    pub passed_through: Vec<(String, String)>,
}
