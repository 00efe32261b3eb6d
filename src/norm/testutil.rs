//! Shared fixtures for normalization tests

use crate::structs::Observation;

pub fn obs(id: usize, speaker: &str, vowel: &str, f1: f64, f2: f64) -> Observation {
    Observation {
        id,
        speaker: speaker.to_string(),
        sex: Some("F".to_string()),
        word: format!("{}{id}", vowel.to_lowercase()),
        vowel: vowel.to_string(),
        f1,
        f2,
    }
}

/// Two speakers with different vowel-space sizes, rows interleaved
pub fn two_speakers() -> Vec<Observation> {
    vec![
        obs(0, "A", "IY", 300.0, 2200.0),
        obs(1, "B", "IY", 380.0, 2700.0),
        obs(2, "A", "IY", 320.0, 2300.0),
        obs(3, "A", "AE", 680.0, 1750.0),
        obs(4, "B", "AE", 900.0, 2100.0),
        obs(5, "A", "AA", 700.0, 1200.0),
        obs(6, "B", "AA", 880.0, 1400.0),
        obs(7, "A", "AA", 720.0, 1250.0),
        obs(8, "B", "UW", 400.0, 1300.0),
        obs(9, "A", "UW", 340.0, 1000.0),
        obs(10, "B", "IY", 360.0, 2800.0),
    ]
}
