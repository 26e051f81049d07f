//! Mashup-type selection
//!
//! An ordered decision tree over the pair's metadata. Rules are checked from
//! most to least specific and the highest-confidence satisfied rule wins, so
//! the recommendation is deterministic for a given pair.

use crate::types::{
    ConfigSuggestion, LyricalFunction, MashupRecommendation, MashupType, SongRecord, VocalDensity,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Recommend the best mashup strategy for a song pair
pub fn recommend_mashup_type(song_a: &SongRecord, song_b: &SongRecord) -> MashupRecommendation {
    let both_sectioned = song_a.is_analyzed() && song_b.is_analyzed();

    let (mashup_type, confidence, reasoning, theme) = select(song_a, song_b, both_sectioned);

    debug!(
        "Recommending {mashup_type} ({confidence:.2}) for '{}' + '{}'",
        song_a.id, song_b.id
    );

    MashupRecommendation {
        mashup_type,
        confidence,
        reasoning,
        config_suggestion: ConfigSuggestion {
            song_a_id: song_a.id.clone(),
            song_b_id: song_b.id.clone(),
            theme,
        },
    }
}

fn select(
    song_a: &SongRecord,
    song_b: &SongRecord,
    both_sectioned: bool,
) -> (MashupType, f64, String, Option<String>) {
    // 1. Clashing keys on two vocal tracks: pitch-shift one side into place
    if let (Some(key_a), Some(key_b)) = (song_a.key, song_b.key) {
        let distance = key_a.distance(key_b);
        if distance > 2 && song_a.has_vocals && song_b.has_vocals {
            return (
                MashupType::AdaptiveHarmony,
                0.90,
                format!("Keys are {distance} steps apart - pitch-shifting will fix clash"),
                None,
            );
        }
    }

    if both_sectioned {
        // 2. Complementary lyrical functions
        if has_conversational_pairing(song_a, song_b) {
            return (
                MashupType::Conversational,
                0.85,
                "Songs have complementary lyrical functions (question/answer or \
                 narrative/reflection)"
                    .to_string(),
                None,
            );
        }

        // 3. Shared lyrical themes
        if let Some(theme) = first_common_theme(song_a, song_b) {
            return (
                MashupType::ThemeFusion,
                0.80,
                format!("Shared theme: '{theme}' - can create thematic narrative"),
                Some(theme),
            );
        }

        // 4. Contrasting vocal density
        if has_density_contrast(song_a, song_b) {
            return (
                MashupType::RoleAware,
                0.75,
                "Contrasting vocal densities - can create lead/harmony/texture roles"
                    .to_string(),
                None,
            );
        }
    }

    // 5/6. Vocal presence decides between the classic variants
    if song_a.has_vocals && song_b.has_vocals {
        (
            MashupType::Classic,
            0.70,
            "Both songs have vocals - classic vocal+instrumental mashup works well".to_string(),
            None,
        )
    } else if song_a.has_vocals || song_b.has_vocals {
        (
            MashupType::Classic,
            0.60,
            "One song has vocals - can extract vocal or instrumental as needed".to_string(),
            None,
        )
    } else {
        // 7. Nothing special detected
        (
            MashupType::Classic,
            0.50,
            "Default mashup type (no special characteristics detected)".to_string(),
            None,
        )
    }
}

fn functions(song: &SongRecord) -> BTreeSet<LyricalFunction> {
    song.sections
        .iter()
        .filter_map(|s| s.lyrical_function)
        .collect()
}

/// Question in one song answered in the other, or narrative met by reflection
fn has_conversational_pairing(song_a: &SongRecord, song_b: &SongRecord) -> bool {
    let funcs_a = functions(song_a);
    let funcs_b = functions(song_b);

    let question_answer = (funcs_a.contains(&LyricalFunction::Question)
        && funcs_b.contains(&LyricalFunction::Answer))
        || (funcs_b.contains(&LyricalFunction::Question)
            && funcs_a.contains(&LyricalFunction::Answer));

    let narrative_reflection = (funcs_a.contains(&LyricalFunction::Narrative)
        || funcs_b.contains(&LyricalFunction::Narrative))
        && (funcs_a.contains(&LyricalFunction::Reflection)
            || funcs_b.contains(&LyricalFunction::Reflection));

    question_answer || narrative_reflection
}

/// Lexicographically first theme present in sections of both songs
fn first_common_theme(song_a: &SongRecord, song_b: &SongRecord) -> Option<String> {
    let themes = |song: &SongRecord| -> BTreeSet<String> {
        song.sections
            .iter()
            .flat_map(|s| s.themes.iter().cloned())
            .collect()
    };
    let themes_a = themes(song_a);
    let themes_b = themes(song_b);
    themes_a.intersection(&themes_b).next().cloned()
}

/// Dense vocals somewhere in the pair alongside sparse vocals somewhere else
fn has_density_contrast(song_a: &SongRecord, song_b: &SongRecord) -> bool {
    let densities: BTreeSet<VocalDensity> = song_a
        .sections
        .iter()
        .chain(song_b.sections.iter())
        .filter_map(|s| s.vocal_density)
        .collect();
    densities.contains(&VocalDensity::Dense) && densities.contains(&VocalDensity::Sparse)
}
