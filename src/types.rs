//! Core data types for mixmash
//!
//! These types represent the domain model and flow through the curator and
//! workflow. Song records are written by the analysis collaborator and are
//! read-only to this crate; everything else is session-scoped.

use crate::key::CamelotKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Song sections
// =============================================================================

/// Structural role of a section within a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Intro,
    Verse,
    PreChorus,
    Chorus,
    Bridge,
    Instrumental,
    Outro,
}

/// How densely a section is packed with vocals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocalDensity {
    Dense,
    Moderate,
    Sparse,
    None,
}

/// Lyrical function a section plays in the song's narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricalFunction {
    Question,
    Answer,
    Narrative,
    Reflection,
    Hook,
    Other,
}

/// One analyzed section of a song
///
/// Sections are ordered by start time, non-overlapping, and cover the full
/// duration of the song (a contract owned by the analysis collaborator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Section energy (0-10)
    pub energy_level: Option<u8>,
    pub vocal_density: Option<VocalDensity>,
    /// Vocal intensity (0-10)
    pub vocal_intensity: Option<u8>,
    pub emotional_tone: Option<String>,
    pub lyrical_function: Option<LyricalFunction>,
    #[serde(default)]
    pub themes: Vec<String>,
}

// =============================================================================
// Song record
// =============================================================================

/// Where a song came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    LocalFile,
    Remote,
}

/// Complete catalog record for one analyzed song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRecord {
    /// Stable catalog identifier
    pub id: String,
    pub artist: String,
    pub title: String,
    pub bpm: Option<f64>,
    pub key: Option<CamelotKey>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub primary_genre: Option<String>,
    pub mood_summary: Option<String>,
    /// Overall energy (0-10)
    pub energy_level: Option<u8>,
    /// Emotional positivity (0-10)
    pub valence: Option<u8>,
    pub has_vocals: bool,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub duration_seconds: Option<f64>,
    pub source: SourceKind,
    pub analyzed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl SongRecord {
    /// Create a minimal record for a song that has not been analyzed yet
    pub fn unanalyzed(id: impl Into<String>, artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            artist: artist.into(),
            title: title.into(),
            bpm: None,
            key: None,
            genres: vec![],
            primary_genre: None,
            mood_summary: None,
            energy_level: None,
            valence: None,
            has_vocals: false,
            sections: vec![],
            duration_seconds: None,
            source: SourceKind::LocalFile,
            analyzed_at: None,
        }
    }

    /// A record counts as analyzed once section-level metadata is present
    pub fn is_analyzed(&self) -> bool {
        !self.sections.is_empty()
    }

    /// Text used for semantic similarity queries (mood summary)
    pub fn semantic_text(&self) -> Option<&str> {
        self.mood_summary.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Curator results
// =============================================================================

/// One ranked match candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub song_id: String,
    /// Compatibility in [0, 1], higher is better
    pub compatibility_score: f64,
    /// Human-readable explanations for the score
    pub reasons: Vec<String>,
}

/// The eight mashup strategies
///
/// A closed sum type matched exhaustively everywhere: adding a ninth strategy
/// is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MashupType {
    Classic,
    StemSwap,
    EnergyMatched,
    AdaptiveHarmony,
    ThemeFusion,
    SemanticAligned,
    RoleAware,
    Conversational,
}

impl MashupType {
    pub const ALL: [MashupType; 8] = [
        MashupType::Classic,
        MashupType::StemSwap,
        MashupType::EnergyMatched,
        MashupType::AdaptiveHarmony,
        MashupType::ThemeFusion,
        MashupType::SemanticAligned,
        MashupType::RoleAware,
        MashupType::Conversational,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MashupType::Classic => "CLASSIC",
            MashupType::StemSwap => "STEM_SWAP",
            MashupType::EnergyMatched => "ENERGY_MATCHED",
            MashupType::AdaptiveHarmony => "ADAPTIVE_HARMONY",
            MashupType::ThemeFusion => "THEME_FUSION",
            MashupType::SemanticAligned => "SEMANTIC_ALIGNED",
            MashupType::RoleAware => "ROLE_AWARE",
            MashupType::Conversational => "CONVERSATIONAL",
        }
    }
}

impl fmt::Display for MashupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MashupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        MashupType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown mashup type: {s}"))
    }
}

/// Song ids (and for theme fusion, the chosen theme) to seed the engineer with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSuggestion {
    pub song_a_id: String,
    pub song_b_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Recommended mashup strategy for one song pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MashupRecommendation {
    pub mashup_type: MashupType,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub reasoning: String,
    pub config_suggestion: ConfigSuggestion,
}

/// A compatible pair discovered by library-wide batch analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRecommendation {
    pub song_a_id: String,
    pub song_b_id: String,
    pub compatibility_score: f64,
    pub match_reasons: Vec<String>,
    pub recommended_mashup: MashupRecommendation,
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats accepted by the ingestion service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
