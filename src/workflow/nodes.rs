//! Stage functions for the mashup pipeline
//!
//! One function per stage, `fn(SessionState, &Services) -> SessionState`.
//! Stage failures are recorded on the state instead of bubbling, so the graph
//! can make its retry decision from data alone.

use super::state::{Resolution, SessionState, SessionStatus};
use crate::config::Settings;
use crate::catalog::Catalog;
use crate::curator::{recommend_mashup_type, Curator, MatchQuery};
use crate::error::MixmashError;
use crate::services::{AnalysisService, EngineeringService, IngestedSong, IngestionService};
use crate::types::{MashupType, SongRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared backends every stage function can reach
pub struct Services {
    pub catalog: Arc<dyn Catalog>,
    pub ingestion: Arc<dyn IngestionService>,
    pub analysis: Arc<dyn AnalysisService>,
    pub engineering: Arc<dyn EngineeringService>,
    pub settings: Settings,
}

pub fn ingest_a(mut state: SessionState, services: &Services) -> SessionState {
    state.status = SessionStatus::Ingesting;
    let source = state.source_a.clone();
    state.log(format!("Ingesting song A from '{source}'"));

    match services.ingestion.ingest(&source) {
        Ok(song) => {
            info!("Ingested song A as '{}'", song.id);
            state.song_a_id = Some(song.id.clone());
            state.song_a_ingest = Some(song);
        }
        Err(e) => state.record_error(&e),
    }
    state
}

pub fn ingest_b(mut state: SessionState, services: &Services) -> SessionState {
    state.status = SessionStatus::Ingesting;
    let Some(source) = state.source_b.clone() else {
        state.record_error(&MixmashError::InvalidRequest(
            "ingest_b reached without a second source".into(),
        ));
        return state;
    };
    state.log(format!("Ingesting song B from '{source}'"));

    match services.ingestion.ingest(&source) {
        Ok(song) => {
            info!("Ingested song B as '{}'", song.id);
            state.song_b_id = Some(song.id.clone());
            state.song_b_ingest = Some(song);
        }
        Err(e) => state.record_error(&e),
    }
    state
}

pub fn analyze_a(state: SessionState, services: &Services) -> SessionState {
    analyze_slot(state, services, Slot::A)
}

pub fn analyze_b(state: SessionState, services: &Services) -> SessionState {
    analyze_slot(state, services, Slot::B)
}

#[derive(Clone, Copy)]
enum Slot {
    A,
    B,
}

fn analyze_slot(mut state: SessionState, services: &Services, slot: Slot) -> SessionState {
    state.status = SessionStatus::Analyzing;

    let ingested: Option<IngestedSong> = match slot {
        Slot::A => state.song_a_ingest.clone(),
        Slot::B => state.song_b_ingest.clone(),
    };
    let Some(song) = ingested else {
        state.record_error(&MixmashError::InvalidRequest(
            "analysis reached before ingestion".into(),
        ));
        return state;
    };

    // Skip re-analysis when the catalog already holds full section metadata
    match services.catalog.get(&song.id) {
        Ok(Some(existing)) if existing.is_analyzed() => {
            debug!("Using cached analysis for '{}'", song.id);
            state.log(format!("Using cached analysis for '{}'", song.id));
            set_meta(&mut state, slot, existing);
            return state;
        }
        Ok(_) => {}
        Err(e) => {
            state.record_error(&e);
            return state;
        }
    }

    state.log(format!("Analyzing '{}'", song.id));
    match services.analysis.analyze(&song) {
        Ok(record) => {
            if let Err(e) = services.catalog.upsert(record.clone()) {
                state.record_error(&e);
                return state;
            }
            info!("Analyzed '{}'", record.id);
            set_meta(&mut state, slot, record);
        }
        Err(e) => state.record_error(&e),
    }
    state
}

fn set_meta(state: &mut SessionState, slot: Slot, record: SongRecord) {
    match slot {
        Slot::A => state.song_a_meta = Some(record),
        Slot::B => state.song_b_meta = Some(record),
    }
}

pub fn find_matches(mut state: SessionState, services: &Services) -> SessionState {
    state.status = SessionStatus::Curating;
    let Some(target_id) = state.song_a_id.clone() else {
        state.record_error(&MixmashError::InvalidRequest(
            "matching reached before song A was ingested".into(),
        ));
        return state;
    };

    let config = services.settings.curator.clone();
    let strategy = config.default_strategy;
    let query = MatchQuery {
        max_results: config.max_candidates,
        ..Default::default()
    };
    let curator = Curator::new(Arc::clone(&services.catalog), config);

    match curator.find_matches(&target_id, strategy, &query) {
        Ok(candidates) if candidates.is_empty() => {
            state.record_error(&MixmashError::InvalidRequest(format!(
                "no compatible matches found for '{target_id}'"
            )));
        }
        Ok(candidates) => {
            state.log(format!("Found {} candidate matches", candidates.len()));
            state.candidates = candidates;
        }
        Err(e) => state.record_error(&e),
    }
    state
}

/// Bind the match selection and load the partner's metadata
///
/// In batch mode an unresolved selection auto-resolves to the top candidate.
/// The interactive suspension happens in the graph, before this node runs.
pub fn await_selection(mut state: SessionState, services: &Services) -> SessionState {
    state.status = SessionStatus::Curating;

    if state.selected_match.is_none() {
        let Some(top) = state.candidates.first().cloned() else {
            state.record_error(&MixmashError::InvalidRequest(
                "selection reached with no candidates".into(),
            ));
            return state;
        };
        state.log(format!(
            "Auto-selected top match '{}' ({:.2})",
            top.song_id, top.compatibility_score
        ));
        state.selected_match = Some(top);
        state.match_resolution = Resolution::Auto;
    }

    let Some(selected_id) = state.selected_match.as_ref().map(|m| m.song_id.clone()) else {
        return state;
    };
    state.song_b_id = Some(selected_id.clone());

    // The catalog write may lag behind the candidate list; a miss is transient
    match services.catalog.get(&selected_id) {
        Ok(Some(record)) => state.song_b_meta = Some(record),
        Ok(None) => state.record_error(&MixmashError::CatalogError(format!(
            "selected match '{selected_id}' not yet visible in catalog"
        ))),
        Err(e) => state.record_error(&e),
    }
    state
}

pub fn recommend_type(mut state: SessionState, _services: &Services) -> SessionState {
    state.status = SessionStatus::Curating;
    let (Some(song_a), Some(song_b)) = (&state.song_a_meta, &state.song_b_meta) else {
        state.record_error(&MixmashError::InvalidRequest(
            "recommendation reached before both songs were analyzed".into(),
        ));
        return state;
    };

    let recommendation = recommend_mashup_type(song_a, song_b);
    state.log(format!(
        "Recommended {} (confidence {:.2}): {}",
        recommendation.mashup_type, recommendation.confidence, recommendation.reasoning
    ));
    state.recommendation = Some(recommendation);
    state
}

/// Bind the mashup-type decision
///
/// A pre-specified type counts as the user's decision; otherwise batch mode
/// approves the recommendation. Interactive suspension happens in the graph.
pub fn await_approval(mut state: SessionState, _services: &Services) -> SessionState {
    state.status = SessionStatus::AwaitingApproval;

    if state.approved_type.is_none() {
        let recommended = state.recommendation.as_ref().map(|r| r.mashup_type);
        if let Some(requested) = state.requested_type {
            state.log(format!("Using pre-specified mashup type {requested}"));
            state.approved_type = Some(requested);
            state.approval_resolution = Resolution::User;
        } else if let Some(recommended) = recommended {
            state.log(format!("Auto-approved recommended type {recommended}"));
            state.approved_type = Some(recommended);
            state.approval_resolution = Resolution::Auto;
        } else {
            state.record_error(&MixmashError::InvalidRequest(
                "approval reached with neither a recommendation nor a requested type".into(),
            ));
        }
    }
    state
}

pub fn create_mashup(mut state: SessionState, services: &Services) -> SessionState {
    state.status = SessionStatus::Engineering;
    let (Some(mashup_type), Some(song_a), Some(song_b)) = (
        state.approved_type,
        state.song_a_meta.clone(),
        state.song_b_meta.clone(),
    ) else {
        state.record_error(&MixmashError::InvalidRequest(
            "engineering reached before pair and type were bound".into(),
        ));
        return state;
    };

    let mut options = services.settings.build.clone();
    if mashup_type == MashupType::ThemeFusion && options.theme.is_none() {
        options.theme = state
            .recommendation
            .as_ref()
            .and_then(|r| r.config_suggestion.theme.clone());
    }

    state.log(format!(
        "Building {mashup_type} mashup of '{}' + '{}'",
        song_a.id, song_b.id
    ));
    match services.engineering.build(mashup_type, &song_a, &song_b, &options) {
        Ok(path) => {
            info!("Mashup plan written to {}", path.display());
            state.log(format!("Output: {}", path.display()));
            state.output_path = Some(path);
        }
        Err(e) => state.record_error(&e),
    }
    state
}
