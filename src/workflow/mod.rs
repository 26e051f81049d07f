//! Mashup pipeline: explicit stage graph over a session record
//!
//! The pipeline sequences ingestion, analysis, match selection, type approval,
//! and mashup creation. Stages are plain functions over `SessionState`; the
//! graph in `graph.rs` owns the edges, the retry loop, and the two
//! human-in-the-loop checkpoints.

mod graph;
mod nodes;
mod state;

pub use graph::Orchestrator;
pub use state::{
    Resolution, SessionOutcome, SessionRequest, SessionState, SessionStatus, Stage,
};
