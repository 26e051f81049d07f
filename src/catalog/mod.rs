//! Catalog store abstractions
//!
//! The catalog is the shared song library: written by the analysis
//! collaborator, read by the curator. The trait mirrors the query surface the
//! matching engine needs; the real deployment may back it with a vector
//! database, the in-process implementations here back it with a Vec.
//!
//! Reads may be eventually consistent with writes from other processes; the
//! curator never assumes a transaction.

mod json;
mod memory;

pub use json::JsonCatalog;
pub use memory::MemoryCatalog;

use crate::error::Result;
use crate::types::SongRecord;
use std::collections::HashSet;

/// Constraints applied inside a nearest-neighbor query
#[derive(Debug, Clone, Default)]
pub struct NeighborFilter {
    /// Only songs with this primary genre
    pub genre: Option<String>,
    /// Only songs whose id is in this set
    pub restrict_ids: Option<HashSet<String>>,
}

impl NeighborFilter {
    pub fn matches(&self, record: &SongRecord) -> bool {
        if let Some(genre) = &self.genre {
            if record.primary_genre.as_deref() != Some(genre.as_str()) {
                return false;
            }
        }
        if let Some(ids) = &self.restrict_ids {
            if !ids.contains(&record.id) {
                return false;
            }
        }
        true
    }
}

/// Song library query surface
///
/// Implementations must preserve a stable iteration order for `filter` and
/// `list` (insertion order) so that ranking ties break deterministically.
pub trait Catalog: Send + Sync {
    /// Fetch a song by id
    fn get(&self, id: &str) -> Result<Option<SongRecord>>;

    /// All songs matching a predicate, in stable catalog order
    fn filter(&self, predicate: &dyn Fn(&SongRecord) -> bool) -> Result<Vec<SongRecord>>;

    /// Nearest neighbors to a free-text query, as (id, distance) pairs sorted
    /// by ascending distance; distance is in [0, 1]
    fn nearest_neighbors(
        &self,
        text: &str,
        k: usize,
        filter: Option<&NeighborFilter>,
    ) -> Result<Vec<(String, f64)>>;

    /// Insert or replace a song record (write path owned by the analysis
    /// collaborator)
    fn upsert(&self, record: SongRecord) -> Result<()>;

    /// All songs in stable catalog order
    fn list(&self) -> Result<Vec<SongRecord>> {
        self.filter(&|_| true)
    }

    /// Name of this catalog backend (for logging)
    fn name(&self) -> &'static str;
}
