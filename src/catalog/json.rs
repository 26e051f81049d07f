//! JSON-file-backed catalog
//!
//! Persists the library to a single JSON document so the CLI keeps state
//! between runs. Writes go through a temp file and an atomic rename so an
//! interrupted write cannot corrupt the library.

use super::{Catalog, MemoryCatalog, NeighborFilter};
use crate::error::Result;
use crate::types::SongRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Library file schema version
const SCHEMA_VERSION: &str = "1.0";

/// On-disk library document
#[derive(Debug, Serialize, Deserialize)]
struct LibraryJson {
    version: String,
    generator_version: String,
    saved_at: String,
    songs: Vec<SongRecord>,
}

/// Catalog persisted to a `library.json` file
pub struct JsonCatalog {
    path: PathBuf,
    inner: MemoryCatalog,
}

impl JsonCatalog {
    /// Open (or create) a library file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let file = File::open(&path)?;
            let reader = BufReader::new(file);
            let doc: LibraryJson = serde_json::from_reader(reader)?;
            debug!("Loaded {} songs from {}", doc.songs.len(), path.display());
            MemoryCatalog::from_records(doc.songs)?
        } else {
            debug!("No library at {}, starting empty", path.display());
            MemoryCatalog::new()
        };

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn save(&self) -> Result<()> {
        let songs = self.inner.list()?;
        let doc = LibraryJson {
            version: SCHEMA_VERSION.to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            songs,
        };

        // Temp file in the same directory so the rename stays on one filesystem
        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        if let Err(e) = serde_json::to_writer_pretty(writer, &doc) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        info!("Saved {} songs to {}", doc.songs.len(), self.path.display());
        Ok(())
    }
}

impl Catalog for JsonCatalog {
    fn get(&self, id: &str) -> Result<Option<SongRecord>> {
        self.inner.get(id)
    }

    fn filter(&self, predicate: &dyn Fn(&SongRecord) -> bool) -> Result<Vec<SongRecord>> {
        self.inner.filter(predicate)
    }

    fn nearest_neighbors(
        &self,
        text: &str,
        k: usize,
        filter: Option<&NeighborFilter>,
    ) -> Result<Vec<(String, f64)>> {
        self.inner.nearest_neighbors(text, k, filter)
    }

    fn upsert(&self, record: SongRecord) -> Result<()> {
        self.inner.upsert(record)?;
        self.save()
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
