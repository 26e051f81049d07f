//! Pairwise compatibility scoring
//!
//! A weighted combination of BPM proximity, Camelot key distance, energy
//! alignment, and genre similarity. Missing metadata degrades the affected
//! factor to a neutral score; scoring never fails.

use crate::types::SongRecord;

/// Neutral factor score used when the underlying metadata is missing
const NEUTRAL: f64 = 0.5;

/// A BPM gap of 10% of the target tempo zeroes the BPM factor
const BPM_ZERO_FRACTION: f64 = 0.10;

/// Key factor reaches zero at wheel distance 6
const KEY_ZERO_DISTANCE: f64 = 6.0;

/// Factor weights for the compatibility score
///
/// The scorer does not require weights to sum to 1; it clamps the final
/// score instead. Callers overriding weights own the normalization.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub bpm: f64,
    pub key: f64,
    pub energy: f64,
    pub genre: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            bpm: 0.35,
            key: 0.30,
            energy: 0.20,
            genre: 0.15,
        }
    }
}

/// Score how well two songs pair up, in [0, 1], with per-factor reasons
pub fn score_pair(
    song_a: &SongRecord,
    song_b: &SongRecord,
    weights: &ScoreWeights,
) -> (f64, Vec<String>) {
    let mut reasons = Vec::with_capacity(4);

    let bpm_score = bpm_factor(song_a, song_b, &mut reasons);
    let key_score = key_factor(song_a, song_b, &mut reasons);
    let energy_score = energy_factor(song_a, song_b, &mut reasons);
    let genre_score = genre_factor(song_a, song_b, &mut reasons);

    let total = bpm_score * weights.bpm
        + key_score * weights.key
        + energy_score * weights.energy
        + genre_score * weights.genre;

    (total.clamp(0.0, 1.0), reasons)
}

fn bpm_factor(song_a: &SongRecord, song_b: &SongRecord, reasons: &mut Vec<String>) -> f64 {
    match (song_a.bpm, song_b.bpm) {
        // Guard the division: a zero target BPM degrades to neutral
        (Some(bpm_a), Some(bpm_b)) if bpm_a > 0.0 => {
            let diff_pct = (bpm_a - bpm_b).abs() / bpm_a;
            let score = (1.0 - diff_pct / BPM_ZERO_FRACTION).max(0.0);

            if diff_pct < 0.02 {
                reasons.push(format!("BPM: {bpm_b:.1} (perfect match, <2% diff)"));
            } else if diff_pct < 0.05 {
                reasons.push(format!(
                    "BPM: {bpm_b:.1} (excellent match, {:.1}% diff)",
                    diff_pct * 100.0
                ));
            } else {
                reasons.push(format!("BPM: {bpm_b:.1} ({:.1}% diff)", diff_pct * 100.0));
            }
            score
        }
        _ => {
            reasons.push("BPM: unknown (neutral)".to_string());
            NEUTRAL
        }
    }
}

fn key_factor(song_a: &SongRecord, song_b: &SongRecord, reasons: &mut Vec<String>) -> f64 {
    match (song_a.key, song_b.key) {
        (Some(key_a), Some(key_b)) => {
            let distance = key_a.distance(key_b);
            let score = (1.0 - f64::from(distance) / KEY_ZERO_DISTANCE).max(0.0);

            match distance {
                0 => reasons.push(format!("Key: {key_b} (perfect match)")),
                1 => reasons.push(format!("Key: {key_b} (adjacent on Camelot wheel)")),
                d => reasons.push(format!("Key: {key_b} (distance: {d})")),
            }
            score
        }
        _ => {
            reasons.push("Key: unknown (neutral)".to_string());
            NEUTRAL
        }
    }
}

fn energy_factor(song_a: &SongRecord, song_b: &SongRecord, reasons: &mut Vec<String>) -> f64 {
    match (song_a.energy_level, song_b.energy_level) {
        (Some(energy_a), Some(energy_b)) => {
            let diff = f64::from(energy_a.abs_diff(energy_b));
            let score = (1.0 - diff / 10.0).max(0.0);

            if diff < 1.5 {
                reasons.push(format!("Energy: {energy_b}/10 (similar vibe)"));
            } else {
                reasons.push(format!("Energy: {energy_b}/10 (contrast)"));
            }
            score
        }
        _ => {
            reasons.push("Energy: unknown (neutral)".to_string());
            NEUTRAL
        }
    }
}

fn genre_factor(song_a: &SongRecord, song_b: &SongRecord, reasons: &mut Vec<String>) -> f64 {
    match (&song_a.primary_genre, &song_b.primary_genre) {
        (Some(genre_a), Some(genre_b)) if genre_a == genre_b => {
            reasons.push(format!("Genre: {genre_b} (same genre)"));
            1.0
        }
        (Some(_), Some(genre_b)) => {
            reasons.push(format!("Genre: {genre_b} (cross-genre blend)"));
            NEUTRAL
        }
        _ => {
            reasons.push("Genre: unknown (neutral)".to_string());
            NEUTRAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CamelotKey;

    fn song(id: &str, bpm: f64, key: &str, energy: u8, genre: &str) -> SongRecord {
        let mut record = SongRecord::unanalyzed(id, "Artist", id);
        record.bpm = Some(bpm);
        record.key = Some(key.parse::<CamelotKey>().unwrap());
        record.energy_level = Some(energy);
        record.primary_genre = Some(genre.to_string());
        record
    }

    #[test]
    fn test_self_comparison_is_near_perfect() {
        let a = song("a", 120.0, "8B", 7, "Pop");
        let (score, reasons) = score_pair(&a, &a, &ScoreWeights::default());
        assert!(score >= 0.99, "self score was {score}");
        assert_eq!(reasons.len(), 4);
    }

    #[test]
    fn test_score_always_in_unit_range() {
        let a = song("a", 120.0, "1A", 0, "Pop");
        let b = song("b", 200.0, "7B", 10, "Metal");
        let (score, _) = score_pair(&a, &b, &ScoreWeights::default());
        assert!((0.0..=1.0).contains(&score));

        // Oversized custom weights are clamped, not rejected
        let heavy = ScoreWeights {
            bpm: 2.0,
            key: 2.0,
            energy: 2.0,
            genre: 2.0,
        };
        let (score, _) = score_pair(&a, &a, &heavy);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_zero_bpm_degrades_to_neutral() {
        let mut a = song("a", 0.0, "8B", 5, "Pop");
        a.bpm = Some(0.0);
        let b = song("b", 120.0, "8B", 5, "Pop");
        let (score, reasons) = score_pair(&a, &b, &ScoreWeights::default());
        assert!((0.0..=1.0).contains(&score));
        assert!(reasons[0].contains("neutral"));
    }

    #[test]
    fn test_missing_fields_degrade_not_fail() {
        let a = SongRecord::unanalyzed("a", "Artist", "A");
        let b = SongRecord::unanalyzed("b", "Artist", "B");
        let (score, reasons) = score_pair(&a, &b, &ScoreWeights::default());
        // All four factors neutral: 0.5 * (0.35+0.30+0.20+0.15)
        assert!((score - 0.5).abs() < 1e-9);
        assert!(reasons.iter().all(|r| r.contains("neutral")));
    }

    #[test]
    fn test_close_tempos_score_high() {
        let a = song("a", 120.0, "8B", 7, "Pop");
        let b = song("b", 124.0, "9B", 7, "Pop");
        let (score, _) = score_pair(&a, &b, &ScoreWeights::default());
        assert!(score > 0.8, "score was {score}");
    }

    #[test]
    fn test_custom_weights_shift_the_balance() {
        let a = song("a", 120.0, "8B", 7, "Pop");
        // Identical except genre
        let b = song("b", 120.0, "8B", 7, "Country");

        let genre_only = ScoreWeights {
            bpm: 0.0,
            key: 0.0,
            energy: 0.0,
            genre: 1.0,
        };
        let (score, _) = score_pair(&a, &b, &genre_only);
        assert!((score - 0.5).abs() < 1e-9);

        let no_genre = ScoreWeights {
            bpm: 0.4,
            key: 0.4,
            energy: 0.2,
            genre: 0.0,
        };
        let (score, _) = score_pair(&a, &b, &no_genre);
        assert!((score - 1.0).abs() < 1e-9);
    }
}
