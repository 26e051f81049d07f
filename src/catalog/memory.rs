//! In-memory catalog store
//!
//! Insertion-ordered so that score ties break on stable catalog order.
//! Nearest-neighbor queries use token-overlap similarity over the song's mood
//! text, which is enough for ranking contracts; a production deployment swaps
//! in a real embedding index behind the same trait.

use super::{Catalog, NeighborFilter};
use crate::error::{MixmashError, Result};
use crate::types::SongRecord;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Default)]
struct Store {
    /// Records in insertion order
    records: Vec<SongRecord>,
    /// id -> index into `records`
    index: HashMap<String, usize>,
}

/// Insertion-ordered in-memory song library
#[derive(Default)]
pub struct MemoryCatalog {
    store: RwLock<Store>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of records (test and load helper)
    pub fn from_records(records: impl IntoIterator<Item = SongRecord>) -> Result<Self> {
        let catalog = Self::new();
        for record in records {
            catalog.upsert(record)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| MixmashError::CatalogError("catalog lock poisoned".into()))
    }
}

/// Lowercased alphanumeric tokens of a text
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Token-overlap similarity in [0, 1] (Jaccard)
fn similarity(query: &HashSet<String>, document: &HashSet<String>) -> f64 {
    if query.is_empty() || document.is_empty() {
        return 0.0;
    }
    let intersection = query.intersection(document).count();
    let union = query.len() + document.len() - intersection;
    intersection as f64 / union as f64
}

/// Text indexed for a song: mood summary plus section themes and genres
fn document_text(record: &SongRecord) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(mood) = &record.mood_summary {
        parts.push(mood.clone());
    }
    parts.extend(record.genres.iter().cloned());
    for section in &record.sections {
        parts.extend(section.themes.iter().cloned());
        if let Some(tone) = &section.emotional_tone {
            parts.push(tone.clone());
        }
    }
    parts.join(" ")
}

impl Catalog for MemoryCatalog {
    fn get(&self, id: &str) -> Result<Option<SongRecord>> {
        let store = self.read()?;
        Ok(store.index.get(id).map(|&i| store.records[i].clone()))
    }

    fn filter(&self, predicate: &dyn Fn(&SongRecord) -> bool) -> Result<Vec<SongRecord>> {
        let store = self.read()?;
        Ok(store
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    fn nearest_neighbors(
        &self,
        text: &str,
        k: usize,
        filter: Option<&NeighborFilter>,
    ) -> Result<Vec<(String, f64)>> {
        let store = self.read()?;
        let query = tokenize(text);

        let mut scored: Vec<(String, f64)> = store
            .records
            .iter()
            .filter(|r| filter.map_or(true, |f| f.matches(r)))
            .map(|r| {
                let document = tokenize(&document_text(r));
                let distance = 1.0 - similarity(&query, &document);
                (r.id.clone(), distance)
            })
            .collect();

        // Stable sort keeps catalog order among equal distances
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    fn upsert(&self, record: SongRecord) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|_| MixmashError::CatalogError("catalog lock poisoned".into()))?;

        if let Some(&i) = store.index.get(&record.id) {
            store.records[i] = record;
        } else {
            let next = store.records.len();
            store.index.insert(record.id.clone(), next);
            store.records.push(record);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, mood: &str) -> SongRecord {
        let mut record = SongRecord::unanalyzed(id, "Artist", id);
        record.mood_summary = Some(mood.to_string());
        record
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let catalog = MemoryCatalog::new();
        catalog.upsert(song("a", "happy")).unwrap();
        catalog.upsert(song("b", "sad")).unwrap();
        catalog.upsert(song("a", "euphoric")).unwrap();

        assert_eq!(catalog.len(), 2);
        let ids: Vec<String> = catalog.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"], "order survives replacement");
        assert_eq!(
            catalog.get("a").unwrap().unwrap().mood_summary.as_deref(),
            Some("euphoric")
        );
    }

    #[test]
    fn test_index_stays_aligned_across_inserts() {
        let catalog = MemoryCatalog::new();
        for i in 0..10 {
            catalog.upsert(song(&format!("s{i}"), "mood")).unwrap();
        }
        catalog.upsert(song("s3", "replaced")).unwrap();
        catalog.upsert(song("s10", "appended")).unwrap();

        for i in 0..=10 {
            let id = format!("s{i}");
            let record = catalog.get(&id).unwrap().unwrap();
            assert_eq!(record.id, id);
        }
        assert_eq!(catalog.len(), 11);
        assert_eq!(
            catalog.get("s3").unwrap().unwrap().mood_summary.as_deref(),
            Some("replaced")
        );
    }

    #[test]
    fn test_nearest_neighbors_orders_by_overlap() {
        let catalog = MemoryCatalog::new();
        catalog.upsert(song("close", "upbeat summer anthem")).unwrap();
        catalog.upsert(song("far", "slow winter dirge")).unwrap();

        let results = catalog
            .nearest_neighbors("upbeat summer", 10, None)
            .unwrap();
        assert_eq!(results[0].0, "close");
        assert!(results[0].1 < results[1].1);
        for (_, distance) in &results {
            assert!((0.0..=1.0).contains(distance));
        }
    }

    #[test]
    fn test_nearest_neighbors_respects_filter() {
        let catalog = MemoryCatalog::new();
        let mut a = song("a", "upbeat pop");
        a.primary_genre = Some("Pop".into());
        let mut b = song("b", "upbeat country");
        b.primary_genre = Some("Country".into());
        catalog.upsert(a).unwrap();
        catalog.upsert(b).unwrap();

        let filter = NeighborFilter {
            genre: Some("Country".into()),
            restrict_ids: None,
        };
        let results = catalog
            .nearest_neighbors("upbeat", 10, Some(&filter))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "b");

        let filter = NeighborFilter {
            genre: None,
            restrict_ids: Some(["a".to_string()].into_iter().collect()),
        };
        let results = catalog
            .nearest_neighbors("upbeat", 10, Some(&filter))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "a");
    }
}
