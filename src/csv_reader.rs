use crate::structs::{ColumnMap, CsvData, NormError, Observation, Result};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

impl CsvData {
    /// Parse a TSV or CSV file
    ///
    /// Every cell is read as text. Typing happens later, per column, so a
    /// sex code such as `F` stays a string.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or is malformed
    pub fn from_file(path: &Path, is_tsv: bool) -> Result<Self> {
        let delimiter = if is_tsv { b'\t' } else { b',' };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(ToString::to_string).collect();
            rows.push(row);
        }

        Ok(Self {
            source: path.display().to_string(),
            headers,
            rows,
        })
    }

    /// Select the observation columns, assigning ids starting at `first_id`
    ///
    /// Rows whose F1 or F2 cell is empty or `NA` are skipped; the second
    /// element of the returned pair counts them.
    ///
    /// # Errors
    /// Returns `InvalidInput` if a required column is missing or a formant
    /// cell holds a non-numeric, non-finite or non-positive value
    pub fn observations(
        &self,
        columns: &ColumnMap,
        first_id: usize,
    ) -> Result<(Vec<Observation>, usize)> {
        let speaker_idx = self.require_column(&columns.speaker)?;
        let word_idx = self.require_column(&columns.word)?;
        let vowel_idx = self.require_column(&columns.vowel)?;
        let f1_idx = self.require_column(&columns.f1)?;
        let f2_idx = self.require_column(&columns.f2)?;
        let sex_idx = self.column_index(&columns.sex);

        let mut observations = Vec::with_capacity(self.row_count());
        let mut missing = 0;

        for (row_idx, row) in self.rows.iter().enumerate() {
            // header is line 1
            let line = row_idx + 2;
            let cell = |idx: usize| row.get(idx).map_or("", |s| s.trim());

            let f1 = parse_formant(cell(f1_idx), &self.source, line, &columns.f1)?;
            let f2 = parse_formant(cell(f2_idx), &self.source, line, &columns.f2)?;
            let (Some(f1), Some(f2)) = (f1, f2) else {
                missing += 1;
                continue;
            };

            observations.push(Observation {
                id: first_id + observations.len(),
                speaker: cell(speaker_idx).to_string(),
                sex: sex_idx.map(|i| cell(i).to_string()),
                word: cell(word_idx).to_string(),
                vowel: cell(vowel_idx).to_string(),
                f1,
                f2,
            });
        }

        Ok((observations, missing))
    }
}

/// Parse one formant cell; `None` marks a missing measurement
fn parse_formant(raw: &str, source: &str, line: usize, column: &str) -> Result<Option<f64>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(Some(value)),
        Ok(value) if value.is_finite() => Err(NormError::InvalidInput(format!(
            "{source}:{line}: column '{column}' holds non-positive frequency {value}"
        ))),
        _ => Err(NormError::InvalidInput(format!(
            "{source}:{line}: column '{column}' holds non-numeric value '{raw}'"
        ))),
    }
}

/// Load and concatenate observations from several files
///
/// Ids are unique across the combined table.
///
/// # Errors
/// Returns error if any file fails to parse or lacks a required column
pub fn load_observations(
    paths: &[PathBuf],
    columns: &ColumnMap,
    is_tsv: bool,
) -> Result<Vec<Observation>> {
    if paths.is_empty() {
        return Err(NormError::Config("No input files given".into()));
    }

    let mut all = Vec::new();
    for path in paths {
        let data = CsvData::from_file(path, is_tsv)?;
        let (observations, missing) = data.observations(columns, all.len())?;
        if missing > 0 {
            log::warn!(
                "{}: skipped {missing} rows with missing formant values",
                path.display()
            );
        }
        log::info!(
            "Loaded {} observations from {} ({} columns)",
            observations.len(),
            path.display(),
            data.col_count()
        );
        all.extend(observations);
    }

    Ok(all)
}
