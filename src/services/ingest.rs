//! Local-file ingestion
//!
//! Resolves a caller-supplied path into a catalog identity. Artist and title
//! come from the "Artist - Title" filename convention when present; the id is
//! the sanitized artist/title pair with an FNV-1a hash of the normalized path
//! appended, so re-ingesting the same file is idempotent while two files that
//! share a name stay distinct.

use super::{IngestedSong, IngestionService};
use crate::error::{MixmashError, Result};
use crate::types::AudioFormat;
use hash32::{FnvHasher, Hasher as _};
use std::hash::Hasher as _;
use std::path::Path;
use tracing::debug;

/// Ingestor for audio files already on local disk
#[derive(Debug, Default)]
pub struct LocalFileIngestor;

impl LocalFileIngestor {
    pub fn new() -> Self {
        Self
    }
}

impl IngestionService for LocalFileIngestor {
    fn ingest(&self, source: &str) -> Result<IngestedSong> {
        let path = Path::new(source);

        if !path.exists() {
            return Err(MixmashError::invalid_input(source, "file does not exist"));
        }
        if !path.is_file() {
            return Err(MixmashError::invalid_input(source, "not a regular file"));
        }
        if !AudioFormat::is_supported_path(path) {
            let format = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(MixmashError::invalid_input(
                source,
                format!("unsupported format '{format}'"),
            ));
        }

        let (artist, title) = artist_title_from_filename(path);
        let id = song_id(&artist, &title, path);

        debug!("Ingested {} as '{}'", path.display(), id);

        Ok(IngestedSong {
            id,
            path: path.to_path_buf(),
            artist,
            title,
        })
    }

    fn name(&self) -> &'static str {
        "local-file"
    }
}

/// Split an "Artist - Title" file stem; fall back to Unknown Artist
fn artist_title_from_filename(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    match stem.split_once(" - ") {
        Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            (artist.trim().to_string(), title.trim().to_string())
        }
        _ => ("Unknown Artist".to_string(), stem.trim().to_string()),
    }
}

/// Deterministic song id: sanitized `artist_title` plus a short path hash
fn song_id(artist: &str, title: &str, path: &Path) -> String {
    format!(
        "{}_{}_{:08x}",
        sanitize(artist),
        sanitize(title),
        path_hash(path)
    )
}

/// Lowercase, alphanumerics only, spaces collapsed to single underscores
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_sep = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    out.trim_end_matches('_').to_string()
}

/// FNV-1a hash of the normalized path, for cross-platform stability
fn path_hash(path: &Path) -> u32 {
    let normalized = path.to_string_lossy().replace('\\', "/").to_lowercase();
    let mut hasher = FnvHasher::default();
    hasher.write(normalized.as_bytes());
    hasher.finish32()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ingest_parses_artist_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Daft Punk - Harder Better.mp3");
        fs::write(&path, b"").unwrap();

        let ingestor = LocalFileIngestor::new();
        let song = ingestor.ingest(path.to_str().unwrap()).unwrap();

        assert_eq!(song.artist, "Daft Punk");
        assert_eq!(song.title, "Harder Better");
        assert!(song.id.starts_with("daft_punk_harder_better_"));
    }

    #[test]
    fn test_ingest_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("track.wav");
        fs::write(&path, b"").unwrap();

        let ingestor = LocalFileIngestor::new();
        let first = ingestor.ingest(path.to_str().unwrap()).unwrap();
        let second = ingestor.ingest(path.to_str().unwrap()).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.artist, "Unknown Artist");
        assert_eq!(first.title, "track");
    }

    #[test]
    fn test_ingest_rejects_missing_and_unsupported() {
        let dir = TempDir::new().unwrap();
        let ingestor = LocalFileIngestor::new();

        let err = ingestor.ingest("/no/such/file.mp3").unwrap_err();
        assert!(!err.is_transient());

        let path = dir.path().join("notes.txt");
        fs::write(&path, b"").unwrap();
        let err = ingestor.ingest(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, MixmashError::InvalidInput { .. }));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Taylor Swift"), "taylor_swift");
        assert_eq!(sanitize("Ke$ha"), "ke_ha");
        assert_eq!(sanitize("AC/DC"), "ac_dc");
    }
}
