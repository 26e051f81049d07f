//! Manifest-based analysis backend
//!
//! The actual feature extraction (BPM, key, sections, transcript-derived
//! semantics) runs in an external tool that leaves a JSON sidecar next to
//! each audio file. This backend only loads that sidecar and shapes it into a
//! catalog record, which keeps DSP entirely outside this crate.

use super::{manifest_path, AnalysisService, IngestedSong};
use crate::error::{MixmashError, Result};
use crate::key::CamelotKey;
use crate::types::{Section, SongRecord, SourceKind};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use tracing::debug;

/// Sidecar document written by the external analysis tool
#[derive(Debug, Deserialize)]
struct AnalysisManifest {
    artist: Option<String>,
    title: Option<String>,
    bpm: Option<f64>,
    key: Option<CamelotKey>,
    #[serde(default)]
    genres: Vec<String>,
    primary_genre: Option<String>,
    mood_summary: Option<String>,
    energy_level: Option<u8>,
    valence: Option<u8>,
    #[serde(default)]
    has_vocals: bool,
    #[serde(default)]
    sections: Vec<Section>,
    duration_seconds: Option<f64>,
}

/// Analyzer that reads precomputed `<file>.analysis.json` sidecars
#[derive(Debug, Default)]
pub struct ManifestAnalyzer;

impl ManifestAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl AnalysisService for ManifestAnalyzer {
    fn analyze(&self, song: &IngestedSong) -> Result<SongRecord> {
        let sidecar = manifest_path(&song.path);
        if !sidecar.exists() {
            return Err(MixmashError::analysis(
                &song.path,
                format!("analysis manifest not found at {}", sidecar.display()),
            ));
        }

        let file = File::open(&sidecar)
            .map_err(|e| MixmashError::analysis(&song.path, format!("cannot open manifest: {e}")))?;
        let manifest: AnalysisManifest = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| MixmashError::analysis(&song.path, format!("malformed manifest: {e}")))?;

        debug!(
            "Loaded manifest for '{}': {} sections",
            song.id,
            manifest.sections.len()
        );

        Ok(SongRecord {
            id: song.id.clone(),
            artist: manifest.artist.unwrap_or_else(|| song.artist.clone()),
            title: manifest.title.unwrap_or_else(|| song.title.clone()),
            bpm: manifest.bpm,
            key: manifest.key,
            genres: manifest.genres,
            primary_genre: manifest.primary_genre,
            mood_summary: manifest.mood_summary,
            energy_level: manifest.energy_level,
            valence: manifest.valence,
            has_vocals: manifest.has_vocals,
            sections: manifest.sections,
            duration_seconds: manifest.duration_seconds,
            source: SourceKind::LocalFile,
            analyzed_at: Some(chrono::Utc::now()),
        })
    }

    fn name(&self) -> &'static str {
        "manifest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn ingested(path: PathBuf) -> IngestedSong {
        IngestedSong {
            id: "artist_track_0".into(),
            path,
            artist: "Artist".into(),
            title: "Track".into(),
        }
    }

    #[test]
    fn test_analyze_reads_sidecar() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("track.mp3");
        fs::write(&audio, b"").unwrap();
        fs::write(
            dir.path().join("track.mp3.analysis.json"),
            r#"{
                "bpm": 120.0,
                "key": "8B",
                "primary_genre": "Pop",
                "mood_summary": "upbeat and ironic",
                "energy_level": 7,
                "has_vocals": true,
                "sections": [
                    {"kind": "verse", "start": 0.0, "end": 30.0,
                     "energy_level": 6, "vocal_density": "dense",
                     "vocal_intensity": 7, "emotional_tone": "joyful",
                     "lyrical_function": "narrative", "themes": ["love"]}
                ]
            }"#,
        )
        .unwrap();

        let record = ManifestAnalyzer::new().analyze(&ingested(audio)).unwrap();
        assert_eq!(record.id, "artist_track_0");
        assert_eq!(record.bpm, Some(120.0));
        assert_eq!(record.key.unwrap().to_string(), "8B");
        assert!(record.is_analyzed());
        assert_eq!(record.sections[0].themes, vec!["love"]);
    }

    #[test]
    fn test_analyze_missing_manifest_is_transient() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("track.mp3");
        fs::write(&audio, b"").unwrap();

        let err = ManifestAnalyzer::new().analyze(&ingested(audio)).unwrap_err();
        assert!(err.is_transient());
    }
}
