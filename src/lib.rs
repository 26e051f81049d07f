//! mixmash - Harmonic Mashup Planning & Curation System
//!
//! A library (plus CLI) that plans audio mashups: it curates compatible song
//! pairs from an analyzed library, recommends a mashup strategy per pair, and
//! drives each session from ingestion through to a build plan for the
//! downstream engineering service.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `key`: Camelot wheel distance and key compatibility
//! - `catalog`: the song library (in-memory and JSON-file-backed stores)
//! - `services`: ingestion, analysis, and engineering backends (swappable)
//! - `curator`: compatibility scoring, match ranking, type recommendation
//! - `workflow`: the session stage graph with retry and approval checkpoints
//!
//! # Example
//!
//! ```no_run
//! use mixmash::catalog::MemoryCatalog;
//! use mixmash::config::Settings;
//! use mixmash::services::{LocalFileIngestor, ManifestAnalyzer, PlanWriter};
//! use mixmash::workflow::{Orchestrator, SessionRequest};
//! use std::sync::Arc;
//!
//! let settings = Settings::default();
//! let orchestrator = Orchestrator::new(
//!     Arc::new(MemoryCatalog::new()),
//!     Arc::new(LocalFileIngestor::new()),
//!     Arc::new(ManifestAnalyzer::new()),
//!     Arc::new(PlanWriter::new(&settings.output_dir)),
//!     settings,
//! );
//! let state = orchestrator.run(SessionRequest {
//!     source_a: "one.mp3".into(),
//!     source_b: Some("two.mp3".into()),
//!     requested_type: None,
//! });
//! println!("Session finished: {:?}", state.status);
//! ```

pub mod catalog;
pub mod config;
pub mod curator;
pub mod error;
pub mod key;
pub mod services;
pub mod types;
pub mod workflow;

// Re-export key types at crate root
pub use error::{MixmashError, Result};
pub use key::CamelotKey;
pub use types::{MashupRecommendation, MashupType, MatchCandidate, SongRecord};
