//! External collaborator traits
//!
//! The pipeline treats ingestion, audio analysis, and mashup engineering as
//! swappable backends behind these traits. The implementations shipped here
//! stay on the planning side of the boundary: the manifest analyzer reads
//! precomputed analysis sidecars, the plan-writing engineer emits a build
//! plan for the downstream DSP service. Neither touches audio samples.

mod ingest;
mod manifest;
mod plan;

pub use ingest::LocalFileIngestor;
pub use manifest::ManifestAnalyzer;
pub use plan::PlanWriter;

use crate::error::Result;
use crate::types::{MashupType, SongRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A resolved input song, before analysis
#[derive(Debug, Clone)]
pub struct IngestedSong {
    /// Deterministic catalog id derived from the source
    pub id: String,
    /// Local audio file path
    pub path: PathBuf,
    pub artist: String,
    pub title: String,
}

/// Resolves a caller-supplied source (file path, URL) into a local song
pub trait IngestionService: Send + Sync {
    fn ingest(&self, source: &str) -> Result<IngestedSong>;

    /// Name of this ingestor (for logging)
    fn name(&self) -> &'static str;
}

/// Extracts full song metadata (BPM, key, sections, mood) from audio
pub trait AnalysisService: Send + Sync {
    /// Analyze the audio at `path`, producing the catalog record for `song`
    fn analyze(&self, song: &IngestedSong) -> Result<SongRecord>;

    /// Name of this analyzer (for logging)
    fn name(&self) -> &'static str;
}

/// Render quality requested from the engineering service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    Draft,
    High,
    Broadcast,
}

/// Output container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Mp3,
    Wav,
}

/// Options forwarded to the engineering service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    pub quality: QualityPreset,
    pub format: OutputFormat,
    /// Theme driving a theme-fusion build
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            format: OutputFormat::Mp3,
            theme: None,
        }
    }
}

/// Builds the mashup artifact for an approved song pair
pub trait EngineeringService: Send + Sync {
    /// Build a mashup of the given type, returning the output artifact path.
    ///
    /// Fails with a `MissingPrecondition` error naming the field when the
    /// song pair cannot support the requested type.
    fn build(
        &self,
        mashup_type: MashupType,
        song_a: &SongRecord,
        song_b: &SongRecord,
        options: &BuildOptions,
    ) -> Result<PathBuf>;

    /// Name of this engineer (for logging)
    fn name(&self) -> &'static str;
}

/// Sidecar manifest path for an audio file (`track.mp3` -> `track.mp3.analysis.json`)
pub(crate) fn manifest_path(audio_path: &Path) -> PathBuf {
    let mut name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".analysis.json");
    audio_path.with_file_name(name)
}
