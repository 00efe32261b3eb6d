//! Lobanov (z-score) normalization

use super::join::join_one_to_many;
use super::stats::group_indices;
use crate::structs::{
    Formant, GroupStats, Method, NormError, Normalized, NormalizedObservation, Observation, Result,
    SpeakerParams,
};

/// Per-speaker mean and SD of each formant
struct SpeakerZ {
    speaker: String,
    f1: GroupStats,
    f2: GroupStats,
}

/// z-score each formant within each speaker
///
/// # Errors
/// Returns `DegenerateGroup` if a speaker has fewer than two tokens or a
/// formant with zero standard deviation
pub fn lobanov(observations: &[Observation]) -> Result<Normalized> {
    let mut table = Vec::new();
    for (speaker, indices) in group_indices(observations, |o| o.speaker.clone()) {
        let f1: Vec<f64> = indices.iter().map(|&i| observations[i].f1).collect();
        let f2: Vec<f64> = indices.iter().map(|&i| observations[i].f2).collect();
        let f1 = formant_stats(&speaker, Formant::F1, &f1)?;
        let f2 = formant_stats(&speaker, Formant::F2, &f2)?;
        table.push(SpeakerZ { speaker, f1, f2 });
    }

    let rows = join_one_to_many(observations, &table, |o| o.speaker.clone(), |s| s.speaker.clone())?
        .into_iter()
        .map(|(obs, z)| NormalizedObservation {
            observation: obs.clone(),
            f1_norm: z.f1.z_score(obs.f1),
            f2_norm: z.f2.z_score(obs.f2),
        })
        .collect();

    let params = table
        .into_iter()
        .map(|z| (z.speaker, SpeakerParams::Lobanov { f1: z.f1, f2: z.f2 }))
        .collect();

    Ok(Normalized {
        method: Method::Lobanov,
        rows,
        params,
    })
}

fn formant_stats(speaker: &str, formant: Formant, values: &[f64]) -> Result<GroupStats> {
    let stats = GroupStats::calculate(values)?;
    if stats.count < 2 {
        return Err(NormError::DegenerateGroup(format!(
            "speaker {speaker}: {formant} has {} token(s), need at least 2 for a standard deviation",
            stats.count
        )));
    }
    if stats.std_dev <= 0.0 {
        return Err(NormError::DegenerateGroup(format!(
            "speaker {speaker}: {formant} has zero variance"
        )));
    }
    Ok(stats)
}
