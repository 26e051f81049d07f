//! Session state for one mashup pipeline run
//!
//! A session is a single mutable record threaded through the stage graph. One
//! session is one sequential control flow; independent sessions can run
//! concurrently because nothing here is shared.

use crate::services::IngestedSong;
use crate::types::{MashupRecommendation, MashupType, MatchCandidate, SongRecord};
use crate::error::{MixmashError, Result};
use std::path::PathBuf;

/// Coarse user-facing progress of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Ingesting,
    Analyzing,
    Curating,
    AwaitingApproval,
    Engineering,
    Completed,
    Failed,
}

/// The stage graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    IngestA,
    AnalyzeA,
    IngestB,
    AnalyzeB,
    FindMatches,
    AwaitSelection,
    RecommendType,
    AwaitApproval,
    CreateMashup,
    Done,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::IngestA => "ingest_a",
            Stage::AnalyzeA => "analyze_a",
            Stage::IngestB => "ingest_b",
            Stage::AnalyzeB => "analyze_b",
            Stage::FindMatches => "find_matches",
            Stage::AwaitSelection => "await_selection",
            Stage::RecommendType => "recommend_type",
            Stage::AwaitApproval => "await_approval",
            Stage::CreateMashup => "create_mashup",
            Stage::Done => "done",
        }
    }
}

/// How a human checkpoint was (or was not yet) settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Unresolved,
    /// Pipeline picked for the caller (batch mode)
    Auto,
    /// Caller decided explicitly
    User,
}

/// What the caller asks a session to do
#[derive(Debug, Clone, Default)]
pub struct SessionRequest {
    /// First input song (file path)
    pub source_a: String,
    /// Second input song; when absent the curator picks a partner
    pub source_b: Option<String>,
    /// Pre-approved mashup type, honored as a user decision
    pub requested_type: Option<MashupType>,
}

/// A stage failure recorded on the session
#[derive(Debug, Clone)]
pub struct SessionError {
    pub message: String,
    /// Transient failures re-enter the same stage, fatal ones end the session
    pub transient: bool,
}

/// Caller-facing summary of a finished (or failed) session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    pub output_path: Option<PathBuf>,
    pub song_a_id: Option<String>,
    pub song_b_id: Option<String>,
    pub approved_type: Option<MashupType>,
    pub error: Option<String>,
    pub log: Vec<String>,
}

/// Full pipeline state for one session
///
/// Each field is written by exactly one stage; the graph only reads them to
/// pick edges. Discarded once the session reaches a terminal status.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub source_a: String,
    pub source_b: Option<String>,
    pub requested_type: Option<MashupType>,

    pub song_a_ingest: Option<IngestedSong>,
    pub song_b_ingest: Option<IngestedSong>,
    pub song_a_id: Option<String>,
    pub song_b_id: Option<String>,
    pub song_a_meta: Option<SongRecord>,
    pub song_b_meta: Option<SongRecord>,

    pub candidates: Vec<MatchCandidate>,
    pub selected_match: Option<MatchCandidate>,
    pub match_resolution: Resolution,

    pub recommendation: Option<MashupRecommendation>,
    pub approved_type: Option<MashupType>,
    pub approval_resolution: Resolution,

    pub output_path: Option<PathBuf>,
    pub status: SessionStatus,
    pub stage: Stage,
    pub error: Option<SessionError>,
    pub retry_count: u8,
    pub log: Vec<String>,
}

impl SessionState {
    pub fn new(request: SessionRequest) -> Self {
        Self {
            source_a: request.source_a,
            source_b: request.source_b,
            requested_type: request.requested_type,
            song_a_ingest: None,
            song_b_ingest: None,
            song_a_id: None,
            song_b_id: None,
            song_a_meta: None,
            song_b_meta: None,
            candidates: Vec::new(),
            selected_match: None,
            match_resolution: Resolution::Unresolved,
            recommendation: None,
            approved_type: None,
            approval_resolution: Resolution::Unresolved,
            output_path: None,
            status: SessionStatus::Pending,
            stage: Stage::IngestA,
            error: None,
            retry_count: 0,
            log: Vec::new(),
        }
    }

    /// Append a line to the session log
    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message.into());
    }

    /// Record a stage failure; the graph decides whether to retry
    pub fn record_error(&mut self, error: &MixmashError) {
        let message = error.to_string();
        self.log(format!("[{}] error: {message}", self.stage.name()));
        self.error = Some(SessionError {
            message,
            transient: error.is_transient(),
        });
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Bind the user's match selection at the AwaitSelection checkpoint
    ///
    /// The pick must be one of the candidates offered; anything else is
    /// rejected so the session cannot advance with an unvetted pair.
    pub fn resolve_match(&mut self, song_id: &str) -> Result<()> {
        let candidate = self
            .candidates
            .iter()
            .find(|c| c.song_id == song_id)
            .cloned()
            .ok_or_else(|| {
                MixmashError::InvalidRequest(format!(
                    "'{song_id}' is not among the offered candidates"
                ))
            })?;
        self.log(format!("User selected match '{song_id}'"));
        self.selected_match = Some(candidate);
        self.match_resolution = Resolution::User;
        Ok(())
    }

    /// Bind the user's mashup-type decision at the AwaitApproval checkpoint
    pub fn approve_type(&mut self, mashup_type: MashupType) {
        self.log(format!("User approved mashup type {mashup_type}"));
        self.approved_type = Some(mashup_type);
        self.approval_resolution = Resolution::User;
    }

    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            status: self.status,
            output_path: self.output_path.clone(),
            song_a_id: self.song_a_id.clone(),
            song_b_id: self.song_b_id.clone(),
            approved_type: self.approved_type,
            error: self.error.as_ref().map(|e| e.message.clone()),
            log: self.log.clone(),
        }
    }
}
