//! Library-wide pair discovery
//!
//! Scores every unique pair in the catalog and surfaces the ones worth
//! mashing up. The pair grid grows quadratically, so scoring runs on rayon.

use super::{recommend::recommend_mashup_type, scoring, ScoreWeights};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::{PairRecommendation, SongRecord};
use rayon::prelude::*;
use tracing::info;

/// Constraints for a pair-discovery pass
#[derive(Debug, Clone)]
pub struct PairQuery {
    /// Cap on the number of pairs returned
    pub max_pairs: usize,
    /// Pairs scoring below this are dropped
    pub min_compatibility: f64,
    /// Only consider songs with this primary genre
    pub genre_filter: Option<String>,
    pub weights: ScoreWeights,
}

impl Default for PairQuery {
    fn default() -> Self {
        Self {
            max_pairs: 20,
            min_compatibility: 0.6,
            genre_filter: None,
            weights: ScoreWeights::default(),
        }
    }
}

/// Score every unique pair in the library, best first
///
/// Each surviving pair carries the scorer's reasons and a mashup-type
/// recommendation. A library of zero or one songs yields no pairs.
pub fn find_all_pairs(catalog: &dyn Catalog, query: &PairQuery) -> Result<Vec<PairRecommendation>> {
    let genre_filter = query.genre_filter.clone();
    let songs: Vec<SongRecord> = catalog.filter(&|record: &SongRecord| match &genre_filter {
        Some(genre) => record.primary_genre.as_deref() == Some(genre.as_str()),
        None => true,
    })?;

    if songs.len() < 2 {
        return Ok(vec![]);
    }

    let pair_count = songs.len() * (songs.len() - 1) / 2;
    info!("Scoring {pair_count} pairs across {} songs", songs.len());

    // Upper-triangle index pairs; each unordered pair scored once
    let indices: Vec<(usize, usize)> = (0..songs.len())
        .flat_map(|i| (i + 1..songs.len()).map(move |j| (i, j)))
        .collect();

    let mut results: Vec<PairRecommendation> = indices
        .par_iter()
        .filter_map(|&(i, j)| {
            let (score, reasons) = scoring::score_pair(&songs[i], &songs[j], &query.weights);
            if score < query.min_compatibility {
                return None;
            }
            Some(PairRecommendation {
                song_a_id: songs[i].id.clone(),
                song_b_id: songs[j].id.clone(),
                compatibility_score: score,
                match_reasons: reasons,
                recommended_mashup: recommend_mashup_type(&songs[i], &songs[j]),
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.compatibility_score
            .partial_cmp(&a.compatibility_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(query.max_pairs);

    info!("Found {} pairs above threshold", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::key::CamelotKey;

    fn song(id: &str, bpm: f64, key: &str, genre: &str) -> SongRecord {
        let mut record = SongRecord::unanalyzed(id, "Artist", id);
        record.bpm = Some(bpm);
        record.key = key.parse::<CamelotKey>().ok();
        record.energy_level = Some(5);
        record.primary_genre = Some(genre.to_string());
        record.has_vocals = true;
        record
    }

    #[test]
    fn test_pairs_above_threshold_sorted_descending() {
        let catalog = MemoryCatalog::from_records(vec![
            song("a", 120.0, "8B", "Pop"),
            song("b", 121.0, "8B", "Pop"),
            song("c", 180.0, "3A", "Metal"),
        ])
        .unwrap();

        let results = find_all_pairs(&catalog, &PairQuery::default()).unwrap();
        // a+b is the only strong pair; a+c and b+c fall below threshold
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].song_a_id, "a");
        assert_eq!(results[0].song_b_id, "b");
        assert!(results[0].compatibility_score >= 0.6);
        assert!(!results[0].match_reasons.is_empty());
    }

    #[test]
    fn test_each_pair_carries_a_recommendation() {
        let catalog = MemoryCatalog::from_records(vec![
            song("a", 120.0, "8B", "Pop"),
            song("b", 121.0, "8B", "Pop"),
        ])
        .unwrap();

        let results = find_all_pairs(&catalog, &PairQuery::default()).unwrap();
        assert_eq!(results.len(), 1);
        let rec = &results[0].recommended_mashup;
        assert_eq!(rec.config_suggestion.song_a_id, "a");
        assert_eq!(rec.config_suggestion.song_b_id, "b");
        assert!(rec.confidence > 0.0);
    }

    #[test]
    fn test_max_pairs_caps_results() {
        let records: Vec<SongRecord> = (0..8)
            .map(|i| song(&format!("s{i}"), 120.0, "8B", "Pop"))
            .collect();
        let catalog = MemoryCatalog::from_records(records).unwrap();

        let query = PairQuery {
            max_pairs: 5,
            min_compatibility: 0.0,
            ..Default::default()
        };
        let results = find_all_pairs(&catalog, &query).unwrap();
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].compatibility_score >= pair[1].compatibility_score);
        }
    }

    #[test]
    fn test_genre_filter_restricts_the_grid() {
        let catalog = MemoryCatalog::from_records(vec![
            song("pop1", 120.0, "8B", "Pop"),
            song("pop2", 121.0, "8B", "Pop"),
            song("jazz", 120.0, "8B", "Jazz"),
        ])
        .unwrap();

        let query = PairQuery {
            genre_filter: Some("Pop".to_string()),
            min_compatibility: 0.0,
            ..Default::default()
        };
        let results = find_all_pairs(&catalog, &query).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results
            .iter()
            .all(|p| p.song_a_id != "jazz" && p.song_b_id != "jazz"));
    }

    #[test]
    fn test_tiny_library_yields_no_pairs() {
        let empty = MemoryCatalog::new();
        assert!(find_all_pairs(&empty, &PairQuery::default())
            .unwrap()
            .is_empty());

        let single = MemoryCatalog::from_records(vec![song("only", 120.0, "8B", "Pop")]).unwrap();
        assert!(find_all_pairs(&single, &PairQuery::default())
            .unwrap()
            .is_empty());
    }
}
