//! mixmash CLI entry point

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mixmash::catalog::{Catalog, JsonCatalog};
use mixmash::config::{Cli, Command, Settings};
use mixmash::curator::{find_all_pairs, Curator, MatchQuery, MatchStrategy, PairQuery};
use mixmash::error::Result;
use mixmash::services::{LocalFileIngestor, ManifestAnalyzer, PlanWriter};
use mixmash::types::{AudioFormat, MashupType};
use mixmash::workflow::{Orchestrator, SessionRequest, SessionState, SessionStatus, Stage};
use mixmash::MixmashError;
use std::io::Write as _;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    let settings = Settings::from_cli(&cli);

    match dispatch(&cli, settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        "error".to_string()
    } else {
        cli.log_level().to_string().to_lowercase()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter)),
        )
        .with_target(false)
        .init();
}

fn dispatch(cli: &Cli, mut settings: Settings) -> Result<ExitCode> {
    match &cli.command {
        Command::Create {
            song_a,
            song_b,
            mashup_type,
            interactive,
        } => {
            settings.interactive = *interactive;
            create(settings, song_a, song_b.as_deref(), *mashup_type)
        }
        Command::FindMatches {
            song_id,
            strategy,
            genre,
            vibe,
            max_results,
        } => find_matches(
            &settings,
            song_id,
            *strategy,
            genre.clone(),
            vibe.clone(),
            *max_results,
        ),
        Command::Recommend {
            song_a_id,
            song_b_id,
        } => recommend(&settings, song_a_id, song_b_id),
        Command::Pairs {
            max_pairs,
            min_score,
            genre,
        } => pairs(&settings, *max_pairs, *min_score, genre.clone()),
        Command::List => list(&settings),
        Command::Add { path } => add(&settings, path),
    }
}

fn open_orchestrator(settings: Settings) -> Result<Orchestrator> {
    let catalog = JsonCatalog::open(&settings.library_path)?;
    let engineer = PlanWriter::new(&settings.output_dir);
    Ok(Orchestrator::new(
        Arc::new(catalog),
        Arc::new(LocalFileIngestor::new()),
        Arc::new(ManifestAnalyzer::new()),
        Arc::new(engineer),
        settings,
    ))
}

fn create(
    settings: Settings,
    song_a: &str,
    song_b: Option<&str>,
    mashup_type: Option<MashupType>,
) -> Result<ExitCode> {
    let interactive = settings.interactive;
    let orchestrator = open_orchestrator(settings)?;

    let mut state = orchestrator.advance(orchestrator.start(SessionRequest {
        source_a: song_a.to_string(),
        source_b: song_b.map(String::from),
        requested_type: mashup_type,
    }));

    if interactive {
        while !state.is_terminal() {
            state = match state.stage {
                Stage::AwaitSelection => prompt_selection(state)?,
                Stage::AwaitApproval => prompt_approval(state)?,
                _ => state,
            };
            state = orchestrator.advance(state);
        }
    }

    report_session(&state)
}

/// Show the candidate list and bind the user's pick
fn prompt_selection(mut state: SessionState) -> Result<SessionState> {
    println!("Candidate matches:");
    for (i, candidate) in state.candidates.iter().enumerate() {
        println!(
            "  [{}] {} (score {:.2})",
            i + 1,
            candidate.song_id,
            candidate.compatibility_score
        );
        for reason in &candidate.reasons {
            println!("        {reason}");
        }
    }

    let count = state.candidates.len();
    let choice = read_line(&format!("Select a match [1-{count}]: "))?;
    let index: usize = choice
        .trim()
        .parse()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .ok_or_else(|| MixmashError::InvalidRequest(format!("invalid selection '{choice}'")))?;

    let pick = state.candidates[index - 1].song_id.clone();
    state.resolve_match(&pick)?;
    Ok(state)
}

/// Show the recommendation and bind the user's type decision
fn prompt_approval(mut state: SessionState) -> Result<SessionState> {
    if let Some(rec) = &state.recommendation {
        println!(
            "Recommended: {} (confidence {:.2})",
            rec.mashup_type, rec.confidence
        );
        println!("  {}", rec.reasoning);
    }

    let answer = read_line("Accept? [Y/n, or type a mashup type]: ")?;
    let answer = answer.trim();
    let approved = if answer.is_empty() || answer.eq_ignore_ascii_case("y") {
        state
            .recommendation
            .as_ref()
            .map(|r| r.mashup_type)
            .ok_or_else(|| MixmashError::InvalidRequest("nothing to approve".into()))?
    } else {
        answer
            .parse::<MashupType>()
            .map_err(MixmashError::InvalidRequest)?
    };

    state.approve_type(approved);
    Ok(state)
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

fn report_session(state: &SessionState) -> Result<ExitCode> {
    let outcome = state.outcome();
    match outcome.status {
        SessionStatus::Completed => {
            println!(
                "Mashup planned: {} + {} as {}",
                outcome.song_a_id.as_deref().unwrap_or("?"),
                outcome.song_b_id.as_deref().unwrap_or("?"),
                outcome
                    .approved_type
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "?".to_string()),
            );
            if let Some(path) = &outcome.output_path {
                println!("Plan written to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!(
                "Session failed: {}",
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            for line in &outcome.log {
                eprintln!("  {line}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn find_matches(
    settings: &Settings,
    song_id: &str,
    strategy: MatchStrategy,
    genre: Option<String>,
    vibe: Option<String>,
    max_results: usize,
) -> Result<ExitCode> {
    let catalog = JsonCatalog::open(&settings.library_path)?;
    let curator = Curator::new(Arc::new(catalog), settings.curator.clone());

    let query = MatchQuery {
        genre_filter: genre,
        semantic_query: vibe,
        exclude_ids: vec![],
        max_results,
    };
    let results = curator.find_matches(song_id, strategy, &query)?;

    if results.is_empty() {
        println!("No compatible matches for '{song_id}'");
        return Ok(ExitCode::from(1));
    }

    println!("Matches for '{song_id}' ({strategy}):");
    for candidate in &results {
        println!(
            "  {} (score {:.2})",
            candidate.song_id, candidate.compatibility_score
        );
        for reason in &candidate.reasons {
            println!("      {reason}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn recommend(settings: &Settings, song_a_id: &str, song_b_id: &str) -> Result<ExitCode> {
    let catalog = JsonCatalog::open(&settings.library_path)?;
    let song_a = catalog
        .get(song_a_id)?
        .ok_or_else(|| MixmashError::NotFound(song_a_id.to_string()))?;
    let song_b = catalog
        .get(song_b_id)?
        .ok_or_else(|| MixmashError::NotFound(song_b_id.to_string()))?;

    let rec = mixmash::curator::recommend_mashup_type(&song_a, &song_b);
    println!(
        "{} (confidence {:.2})",
        rec.mashup_type, rec.confidence
    );
    println!("  {}", rec.reasoning);
    if let Some(theme) = &rec.config_suggestion.theme {
        println!("  Theme: {theme}");
    }
    Ok(ExitCode::SUCCESS)
}

fn pairs(
    settings: &Settings,
    max_pairs: usize,
    min_score: f64,
    genre: Option<String>,
) -> Result<ExitCode> {
    let catalog = JsonCatalog::open(&settings.library_path)?;

    let spinner = if settings.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Scoring pairs across {} songs", catalog.len()));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let query = PairQuery {
        max_pairs,
        min_compatibility: min_score,
        genre_filter: genre,
        weights: settings.curator.weights,
    };
    let results = find_all_pairs(&catalog, &query)?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if results.is_empty() {
        println!("No pairs above {min_score:.2}");
        return Ok(ExitCode::from(1));
    }

    for pair in &results {
        println!(
            "{} + {} (score {:.2}) -> {} ({:.2})",
            pair.song_a_id,
            pair.song_b_id,
            pair.compatibility_score,
            pair.recommended_mashup.mashup_type,
            pair.recommended_mashup.confidence,
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn list(settings: &Settings) -> Result<ExitCode> {
    let catalog = JsonCatalog::open(&settings.library_path)?;
    let songs = catalog.list()?;

    if songs.is_empty() {
        println!("Library is empty ({})", settings.library_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    for song in &songs {
        let bpm = song
            .bpm
            .map(|b| format!("{b:.1}"))
            .unwrap_or_else(|| "?".to_string());
        let key = song
            .key
            .map(|k| k.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{}  {} - {}  [{} BPM, {}]{}",
            song.id,
            song.artist,
            song.title,
            bpm,
            key,
            if song.is_analyzed() { "" } else { "  (unanalyzed)" },
        );
    }
    println!("{} songs", songs.len());
    Ok(ExitCode::SUCCESS)
}

fn add(settings: &Settings, dir: &std::path::Path) -> Result<ExitCode> {
    if !dir.is_dir() {
        return Err(MixmashError::invalid_input(
            dir.display().to_string(),
            "not a directory",
        ));
    }

    let catalog = JsonCatalog::open(&settings.library_path)?;
    let ingestor = LocalFileIngestor::new();
    let analyzer = ManifestAnalyzer::new();

    let files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| AudioFormat::is_supported_path(entry.path()))
        .collect();

    if files.is_empty() {
        println!("No audio files found under {}", dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let progress = if settings.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let mut added = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for entry in &files {
        let source = entry.path().to_string_lossy().into_owned();
        if let Some(pb) = &progress {
            pb.set_message(
                entry
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }

        match ingest_one(&catalog, &ingestor, &analyzer, &source) {
            Ok(true) => added += 1,
            Ok(false) => skipped += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!("Skipping {source}: {e}");
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!(
        "Summary: {added} added, {skipped} already analyzed, {failed} failed (of {} total)",
        files.len()
    );
    Ok(if failed > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Ingest and analyze one file; false means it was already in the library
fn ingest_one(
    catalog: &JsonCatalog,
    ingestor: &LocalFileIngestor,
    analyzer: &ManifestAnalyzer,
    source: &str,
) -> Result<bool> {
    use mixmash::services::{AnalysisService as _, IngestionService as _};

    let song = ingestor.ingest(source)?;
    if let Some(existing) = catalog.get(&song.id)? {
        if existing.is_analyzed() {
            return Ok(false);
        }
    }
    let record = analyzer.analyze(&song)?;
    catalog.upsert(record)?;
    Ok(true)
}
