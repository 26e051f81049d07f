//! Plan-writing engineering backend
//!
//! Validates that a song pair can support the approved mashup type, then
//! writes a build plan the downstream audio-engineering service consumes.
//! The plan is the output artifact of this core: stem separation, stretching,
//! pitch-shifting and mixing happen on the other side of the boundary.

use super::{BuildOptions, EngineeringService};
use crate::error::{MixmashError, Result};
use crate::types::{MashupType, SongRecord};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Build plan schema version
const PLAN_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
struct SongRef<'a> {
    id: &'a str,
    artist: &'a str,
    title: &'a str,
    bpm: Option<f64>,
    key: Option<String>,
}

#[derive(Debug, Serialize)]
struct BuildPlan<'a> {
    version: &'static str,
    created_at: String,
    mashup_type: MashupType,
    song_a: SongRef<'a>,
    song_b: SongRef<'a>,
    options: &'a BuildOptions,
}

/// Engineer that emits build-plan JSON files into an output directory
pub struct PlanWriter {
    output_dir: PathBuf,
}

impl PlanWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Check the pair supports the requested type, naming the missing field
    fn check_preconditions(
        mashup_type: MashupType,
        song_a: &SongRecord,
        song_b: &SongRecord,
        options: &BuildOptions,
    ) -> Result<()> {
        let missing = |field| MixmashError::MissingPrecondition { mashup_type, field };

        // Every strategy tempo-syncs the pair
        if song_a.bpm.is_none() || song_b.bpm.is_none() {
            return Err(missing("bpm"));
        }

        match mashup_type {
            MashupType::StemSwap => {
                // Rotates stems across three or more songs
                Err(missing("third song"))
            }
            MashupType::AdaptiveHarmony => {
                if song_a.key.is_none() || song_b.key.is_none() {
                    return Err(missing("key"));
                }
                Ok(())
            }
            MashupType::EnergyMatched => {
                if song_a.energy_level.is_none() || song_b.energy_level.is_none() {
                    return Err(missing("energy_level"));
                }
                Ok(())
            }
            MashupType::ThemeFusion => {
                if options.theme.is_none() {
                    return Err(missing("theme"));
                }
                Ok(())
            }
            MashupType::Classic
            | MashupType::SemanticAligned
            | MashupType::RoleAware
            | MashupType::Conversational => Ok(()),
        }
    }

    fn song_ref(song: &SongRecord) -> SongRef<'_> {
        SongRef {
            id: &song.id,
            artist: &song.artist,
            title: &song.title,
            bpm: song.bpm,
            key: song.key.map(|k| k.to_string()),
        }
    }
}

impl EngineeringService for PlanWriter {
    fn build(
        &self,
        mashup_type: MashupType,
        song_a: &SongRecord,
        song_b: &SongRecord,
        options: &BuildOptions,
    ) -> Result<PathBuf> {
        Self::check_preconditions(mashup_type, song_a, song_b, options)?;

        std::fs::create_dir_all(&self.output_dir)?;

        let file_name = format!(
            "{}__{}__{}.plan.json",
            song_a.id,
            song_b.id,
            mashup_type.as_str().to_lowercase()
        );
        let output_path = self.output_dir.join(file_name);

        let plan = BuildPlan {
            version: PLAN_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            mashup_type,
            song_a: Self::song_ref(song_a),
            song_b: Self::song_ref(song_b),
            options,
        };

        write_atomic(&output_path, &plan).map_err(|e| MixmashError::EngineeringFailed {
            mashup_type,
            reason: format!("cannot write plan to {}: {e}", output_path.display()),
        })?;

        info!(
            "Wrote {} build plan: {}",
            mashup_type,
            output_path.display()
        );
        Ok(output_path)
    }

    fn name(&self) -> &'static str {
        "plan-writer"
    }
}

/// Write JSON through a temp file and rename, so a crash leaves no torn plan
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path)?;
    let writer = BufWriter::new(file);

    if let Err(e) = serde_json::to_writer_pretty(writer, value) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}
