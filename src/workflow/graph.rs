//! The pipeline stage graph
//!
//! Explicit edges, bounded per-stage retry, and human-in-the-loop suspension.
//! The orchestrator owns the shared service handles; session state stays with
//! the caller between steps so suspended sessions cost nothing to abandon.

use super::nodes::{self, Services};
use super::state::{Resolution, SessionRequest, SessionState, SessionStatus, Stage};
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::services::{AnalysisService, EngineeringService, IngestionService};
use std::sync::Arc;
use tracing::{info, warn};

/// Drives sessions through the stage graph
pub struct Orchestrator {
    services: Services,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        ingestion: Arc<dyn IngestionService>,
        analysis: Arc<dyn AnalysisService>,
        engineering: Arc<dyn EngineeringService>,
        settings: Settings,
    ) -> Self {
        Self {
            services: Services {
                catalog,
                ingestion,
                analysis,
                engineering,
                settings,
            },
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.services.settings
    }

    /// Create a fresh session for a request
    pub fn start(&self, request: SessionRequest) -> SessionState {
        info!("Starting session for '{}'", request.source_a);
        SessionState::new(request)
    }

    /// Run the session until it completes, fails, or suspends at a checkpoint
    ///
    /// In interactive mode a session returns unresolved at a checkpoint; the
    /// caller binds a decision (`resolve_match` / `approve_type`) and calls
    /// `advance` again.
    pub fn advance(&self, mut state: SessionState) -> SessionState {
        loop {
            if state.is_terminal() {
                return state;
            }
            if self.suspended(&state) {
                // Both checkpoints surface as awaiting approval while parked
                state.status = SessionStatus::AwaitingApproval;
                return state;
            }
            state = self.step(state);
        }
    }

    /// Batch convenience: start and run to a terminal status
    pub fn run(&self, request: SessionRequest) -> SessionState {
        self.advance(self.start(request))
    }

    /// True when an interactive session is parked at an unresolved checkpoint
    fn suspended(&self, state: &SessionState) -> bool {
        if !self.services.settings.interactive {
            return false;
        }
        match state.stage {
            Stage::AwaitSelection => state.match_resolution == Resolution::Unresolved,
            Stage::AwaitApproval => {
                state.approval_resolution == Resolution::Unresolved
                    && state.requested_type.is_none()
            }
            _ => false,
        }
    }

    /// Run the current stage once, then apply the error/transition edges
    fn step(&self, state: SessionState) -> SessionState {
        let stage = state.stage;
        let mut state = self.run_stage(state);

        if let Some(error) = state.error.clone() {
            if error.transient && state.retry_count < self.services.settings.max_retries {
                state.retry_count += 1;
                state.error = None;
                warn!(
                    "Stage {} failed, retry {}/{}",
                    stage.name(),
                    state.retry_count,
                    self.services.settings.max_retries
                );
                state.log(format!(
                    "Retrying {} (attempt {})",
                    stage.name(),
                    state.retry_count + 1
                ));
                // Re-enter the same stage
                return state;
            }

            warn!("Session failed at {}: {}", stage.name(), error.message);
            state.status = SessionStatus::Failed;
            return state;
        }

        // Success: the retry budget is per-stage
        state.retry_count = 0;
        state.stage = next_stage(&state);
        if state.stage == Stage::Done {
            state.status = SessionStatus::Completed;
            state.log("Session completed".to_string());
        }
        state
    }

    fn run_stage(&self, state: SessionState) -> SessionState {
        let services = &self.services;
        match state.stage {
            Stage::IngestA => nodes::ingest_a(state, services),
            Stage::AnalyzeA => nodes::analyze_a(state, services),
            Stage::IngestB => nodes::ingest_b(state, services),
            Stage::AnalyzeB => nodes::analyze_b(state, services),
            Stage::FindMatches => nodes::find_matches(state, services),
            Stage::AwaitSelection => nodes::await_selection(state, services),
            Stage::RecommendType => nodes::recommend_type(state, services),
            Stage::AwaitApproval => nodes::await_approval(state, services),
            Stage::CreateMashup => nodes::create_mashup(state, services),
            Stage::Done => state,
        }
    }
}

/// Transition edges taken after a stage succeeds
fn next_stage(state: &SessionState) -> Stage {
    match state.stage {
        Stage::IngestA => Stage::AnalyzeA,
        Stage::AnalyzeA => {
            if state.source_b.is_some() {
                Stage::IngestB
            } else {
                Stage::FindMatches
            }
        }
        Stage::IngestB => Stage::AnalyzeB,
        Stage::AnalyzeB => Stage::RecommendType,
        Stage::FindMatches => Stage::AwaitSelection,
        Stage::AwaitSelection => {
            // Self-loop until the partner's metadata is bound
            if state.song_b_meta.is_some() {
                Stage::RecommendType
            } else {
                Stage::AwaitSelection
            }
        }
        Stage::RecommendType => Stage::AwaitApproval,
        Stage::AwaitApproval => {
            if state.approved_type.is_some() {
                Stage::CreateMashup
            } else {
                Stage::AwaitApproval
            }
        }
        Stage::CreateMashup => Stage::Done,
        Stage::Done => Stage::Done,
    }
}
