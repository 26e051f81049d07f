//! Match ranking over the catalog
//!
//! Three strategies share one entry point:
//! - harmonic: BPM window + compatible-key pre-filter, ranked by tempo and
//!   wheel proximity
//! - semantic: nearest-neighbor over mood text
//! - hybrid (default): harmonic over-fetch, then semantic rerank restricted
//!   to those candidates

use super::{scoring, CuratorConfig};
use crate::catalog::{Catalog, NeighborFilter};
use crate::error::{MixmashError, Result};
use crate::types::{MatchCandidate, SongRecord};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Candidate selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    Harmonic,
    Semantic,
    #[default]
    Hybrid,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStrategy::Harmonic => "harmonic",
            MatchStrategy::Semantic => "semantic",
            MatchStrategy::Hybrid => "hybrid",
        };
        f.write_str(s)
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "harmonic" => Ok(MatchStrategy::Harmonic),
            "semantic" => Ok(MatchStrategy::Semantic),
            "hybrid" => Ok(MatchStrategy::Hybrid),
            _ => Err(format!(
                "unknown strategy '{s}' (expected harmonic, semantic, or hybrid)"
            )),
        }
    }
}

/// Constraints for one match query
#[derive(Debug, Clone)]
pub struct MatchQuery {
    /// Only candidates with this primary genre
    pub genre_filter: Option<String>,
    /// Free-text vibe override for semantic/hybrid strategies
    pub semantic_query: Option<String>,
    /// Song ids the caller wants left out
    pub exclude_ids: Vec<String>,
    pub max_results: usize,
}

impl Default for MatchQuery {
    fn default() -> Self {
        Self {
            genre_filter: None,
            semantic_query: None,
            exclude_ids: Vec::new(),
            max_results: 5,
        }
    }
}

/// The matching engine; holds its catalog handle and config explicitly
pub struct Curator {
    catalog: Arc<dyn Catalog>,
    config: CuratorConfig,
}

impl Curator {
    pub fn new(catalog: Arc<dyn Catalog>, config: CuratorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    /// Find compatible songs for `target_id`, ranked best-first
    ///
    /// Never returns the target itself or excluded ids; result length is at
    /// most `query.max_results`, sorted by non-increasing score with ties
    /// broken by stable catalog order.
    pub fn find_matches(
        &self,
        target_id: &str,
        strategy: MatchStrategy,
        query: &MatchQuery,
    ) -> Result<Vec<MatchCandidate>> {
        info!("Finding matches for '{target_id}' using {strategy} strategy");

        let target = self
            .catalog
            .get(target_id)?
            .ok_or_else(|| MixmashError::NotFound(target_id.to_string()))?;

        let mut results = match strategy {
            MatchStrategy::Harmonic => self.harmonic(&target, query, query.max_results)?,
            MatchStrategy::Semantic => self.semantic(&target, query)?,
            MatchStrategy::Hybrid => self.hybrid(&target, query)?,
        };

        results.truncate(query.max_results);
        info!("Found {} compatible matches", results.len());
        Ok(results)
    }

    /// BPM window + compatible-key filter, ranked by tempo/wheel proximity
    fn harmonic(
        &self,
        target: &SongRecord,
        query: &MatchQuery,
        limit: usize,
    ) -> Result<Vec<MatchCandidate>> {
        let target_bpm = target.bpm.ok_or_else(|| {
            MixmashError::ConfigError(format!("harmonic matching requires BPM on '{}'", target.id))
        })?;
        let target_key = target.key.ok_or_else(|| {
            MixmashError::ConfigError(format!("harmonic matching requires key on '{}'", target.id))
        })?;

        let bpm_min = target_bpm * (1.0 - self.config.bpm_tolerance);
        let bpm_max = target_bpm * (1.0 + self.config.bpm_tolerance);
        let compatible = target_key.compatible_keys();

        let excluded: HashSet<&str> = query.exclude_ids.iter().map(String::as_str).collect();
        let target_id = target.id.clone();
        let genre_filter = query.genre_filter.clone();

        let candidates = self.catalog.filter(&|record: &SongRecord| {
            if record.id == target_id || excluded.contains(record.id.as_str()) {
                return false;
            }
            if let Some(genre) = &genre_filter {
                if record.primary_genre.as_deref() != Some(genre.as_str()) {
                    return false;
                }
            }
            let bpm_ok = record
                .bpm
                .map(|bpm| bpm >= bpm_min && bpm <= bpm_max)
                .unwrap_or(false);
            let key_ok = record
                .key
                .map(|key| compatible.contains(&key))
                .unwrap_or(false);
            bpm_ok && key_ok
        })?;

        debug!(
            "Harmonic pre-filter: {} candidates in [{bpm_min:.1}, {bpm_max:.1}] BPM",
            candidates.len()
        );

        let mut results: Vec<MatchCandidate> = candidates
            .iter()
            .map(|record| {
                // bpm within the window, so proximity stays in [0, 1]
                let bpm = record.bpm.unwrap_or(target_bpm);
                let bpm_proximity = (1.0 - (bpm - target_bpm).abs() / target_bpm).max(0.0);
                let key_distance = record
                    .key
                    .map(|key| target_key.distance(key))
                    .unwrap_or(0);
                let key_proximity = (1.0 - f64::from(key_distance) / 6.0).max(0.0);
                let score = (bpm_proximity * 0.6 + key_proximity * 0.4).clamp(0.0, 1.0);

                self.candidate(target, record, score)
            })
            .collect();

        sort_descending(&mut results);
        results.truncate(limit);
        Ok(results)
    }

    /// Nearest-neighbor over free text, ranked by similarity
    fn semantic(&self, target: &SongRecord, query: &MatchQuery) -> Result<Vec<MatchCandidate>> {
        let text = query
            .semantic_query
            .as_deref()
            .or_else(|| target.semantic_text())
            .ok_or_else(|| {
                MixmashError::InvalidRequest(format!(
                    "semantic matching needs a query text or a mood summary on '{}'",
                    target.id
                ))
            })?;

        let filter = NeighborFilter {
            genre: query.genre_filter.clone(),
            restrict_ids: None,
        };

        // Over-fetch so exclusions don't starve the result set
        let neighbors =
            self.catalog
                .nearest_neighbors(text, query.max_results * 2 + 1, Some(&filter))?;

        let excluded: HashSet<&str> = query.exclude_ids.iter().map(String::as_str).collect();
        let mut results = Vec::with_capacity(query.max_results);
        for (id, distance) in neighbors {
            if id == target.id || excluded.contains(id.as_str()) {
                continue;
            }
            let Some(record) = self.catalog.get(&id)? else {
                continue;
            };
            let score = (1.0 - distance).clamp(0.0, 1.0);
            let mut candidate = self.candidate(target, &record, score);
            candidate
                .reasons
                .insert(0, format!("Semantic similarity: {score:.2}"));
            results.push(candidate);
        }

        sort_descending(&mut results);
        results.truncate(query.max_results);
        Ok(results)
    }

    /// Harmonic over-fetch, then semantic rerank restricted to that set
    fn hybrid(&self, target: &SongRecord, query: &MatchQuery) -> Result<Vec<MatchCandidate>> {
        let harmonic = self.harmonic(target, query, self.config.hybrid_prefetch)?;
        if harmonic.is_empty() {
            warn!("No harmonic matches for '{}'", target.id);
            return Ok(vec![]);
        }

        let Some(text) = query
            .semantic_query
            .as_deref()
            .or_else(|| target.semantic_text())
        else {
            // No mood text to rerank with; harmonic order stands
            debug!("Hybrid degrading to harmonic: no semantic text for '{}'", target.id);
            return Ok(harmonic);
        };

        let candidate_ids: HashSet<String> =
            harmonic.iter().map(|c| c.song_id.clone()).collect();
        let filter = NeighborFilter {
            genre: query.genre_filter.clone(),
            restrict_ids: Some(candidate_ids),
        };
        let neighbors = self
            .catalog
            .nearest_neighbors(text, harmonic.len(), Some(&filter))?;

        let mut results = Vec::with_capacity(neighbors.len());
        for (id, distance) in neighbors {
            let Some(harmonic_match) = harmonic.iter().find(|c| c.song_id == id) else {
                continue;
            };
            let semantic_score = (1.0 - distance).clamp(0.0, 1.0);
            let score = (harmonic_match.compatibility_score * 0.6 + semantic_score * 0.4)
                .clamp(0.0, 1.0);

            let mut candidate = harmonic_match.clone();
            candidate.compatibility_score = score;
            candidate.reasons.insert(
                0,
                format!("Hybrid score: {score:.2} (semantic similarity {semantic_score:.2})"),
            );
            results.push(candidate);
        }

        sort_descending(&mut results);
        Ok(results)
    }

    /// Attach the detailed four-factor reasons to a ranked candidate
    fn candidate(&self, target: &SongRecord, record: &SongRecord, score: f64) -> MatchCandidate {
        let (_, reasons) = scoring::score_pair(target, record, &self.config.weights);
        MatchCandidate {
            song_id: record.id.clone(),
            compatibility_score: score,
            reasons,
        }
    }
}

/// Stable descending sort: catalog order breaks score ties
fn sort_descending(results: &mut [MatchCandidate]) {
    results.sort_by(|a, b| {
        b.compatibility_score
            .partial_cmp(&a.compatibility_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::key::CamelotKey;

    fn song(id: &str, bpm: f64, key: &str, mood: &str) -> SongRecord {
        let mut record = SongRecord::unanalyzed(id, "Artist", id);
        record.bpm = Some(bpm);
        record.key = Some(key.parse::<CamelotKey>().unwrap());
        record.energy_level = Some(5);
        record.primary_genre = Some("Pop".to_string());
        record.mood_summary = Some(mood.to_string());
        record
    }

    fn curator_with(records: Vec<SongRecord>) -> Curator {
        let catalog = MemoryCatalog::from_records(records).unwrap();
        Curator::new(Arc::new(catalog), CuratorConfig::default())
    }

    #[test]
    fn test_harmonic_ranks_closest_tempo_first() {
        // Scenario: 120 BPM / 8B target; 124 BPM at adjacent key should win
        let curator = curator_with(vec![
            song("target", 120.0, "8B", "bright summer pop"),
            song("near", 124.0, "9B", "bright summer pop"),
            song("edge", 126.0, "9B", "bright summer pop"),
            song("off_key", 124.0, "3A", "bright summer pop"),
            song("off_tempo", 150.0, "8B", "bright summer pop"),
        ]);

        let results = curator
            .find_matches("target", MatchStrategy::Harmonic, &MatchQuery::default())
            .unwrap();

        assert_eq!(results[0].song_id, "near");
        assert!(results[0].compatibility_score > 0.8);
        assert!(results.iter().all(|c| c.song_id != "target"));
        assert!(results.iter().all(|c| c.song_id != "off_key"));
        assert!(results.iter().all(|c| c.song_id != "off_tempo"));
        for pair in results.windows(2) {
            assert!(pair[0].compatibility_score >= pair[1].compatibility_score);
        }
    }

    #[test]
    fn test_harmonic_requires_target_bpm_and_key() {
        let mut silent = song("target", 120.0, "8B", "mood");
        silent.bpm = None;
        let curator = curator_with(vec![silent]);
        let err = curator
            .find_matches("target", MatchStrategy::Harmonic, &MatchQuery::default())
            .unwrap_err();
        assert!(matches!(err, MixmashError::ConfigError(_)));
    }

    #[test]
    fn test_never_exceeds_max_results() {
        let mut records = vec![song("target", 120.0, "8B", "pop")];
        for i in 0..20 {
            records.push(song(&format!("c{i}"), 120.0, "8B", "pop"));
        }
        let curator = curator_with(records);

        let query = MatchQuery {
            max_results: 3,
            ..Default::default()
        };
        for strategy in [
            MatchStrategy::Harmonic,
            MatchStrategy::Semantic,
            MatchStrategy::Hybrid,
        ] {
            let results = curator.find_matches("target", strategy, &query).unwrap();
            assert!(results.len() <= 3, "{strategy} returned {}", results.len());
            assert!(results.iter().all(|c| c.song_id != "target"));
        }
    }

    #[test]
    fn test_missing_target_is_not_found() {
        let curator = curator_with(vec![]);
        let err = curator
            .find_matches("ghost", MatchStrategy::Hybrid, &MatchQuery::default())
            .unwrap_err();
        assert!(matches!(err, MixmashError::NotFound(_)));
    }

    #[test]
    fn test_semantic_without_text_is_invalid_request() {
        let mut moodless = song("target", 120.0, "8B", "");
        moodless.mood_summary = None;
        let curator = curator_with(vec![moodless, song("other", 120.0, "8B", "pop")]);

        let err = curator
            .find_matches("target", MatchStrategy::Semantic, &MatchQuery::default())
            .unwrap_err();
        assert!(matches!(err, MixmashError::InvalidRequest(_)));

        // An explicit query text rescues it
        let query = MatchQuery {
            semantic_query: Some("upbeat pop".to_string()),
            ..Default::default()
        };
        assert!(curator
            .find_matches("target", MatchStrategy::Semantic, &query)
            .is_ok());
    }

    #[test]
    fn test_hybrid_restricted_to_harmonic_candidates() {
        // "vibe_only" matches the mood perfectly but is far off tempo, so it
        // must not appear in hybrid results
        let curator = curator_with(vec![
            song("target", 120.0, "8B", "melancholy rain"),
            song("in_window", 122.0, "8B", "sunny beach"),
            song("vibe_only", 170.0, "8B", "melancholy rain"),
        ]);

        let results = curator
            .find_matches("target", MatchStrategy::Hybrid, &MatchQuery::default())
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].song_id, "in_window");
    }

    #[test]
    fn test_exclude_ids_respected() {
        let curator = curator_with(vec![
            song("target", 120.0, "8B", "pop"),
            song("banned", 120.0, "8B", "pop"),
            song("ok", 121.0, "8B", "pop"),
        ]);

        let query = MatchQuery {
            exclude_ids: vec!["banned".to_string()],
            ..Default::default()
        };
        let results = curator
            .find_matches("target", MatchStrategy::Harmonic, &query)
            .unwrap();
        assert!(results.iter().all(|c| c.song_id != "banned"));
        assert!(results.iter().any(|c| c.song_id == "ok"));
    }

    #[test]
    fn test_genre_filter_applies_to_harmonic() {
        let mut country = song("country", 121.0, "8B", "pop");
        country.primary_genre = Some("Country".to_string());
        let curator = curator_with(vec![
            song("target", 120.0, "8B", "pop"),
            song("pop", 122.0, "8B", "pop"),
            country,
        ]);

        let query = MatchQuery {
            genre_filter: Some("Country".to_string()),
            ..Default::default()
        };
        let results = curator
            .find_matches("target", MatchStrategy::Harmonic, &query)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].song_id, "country");
    }
}
