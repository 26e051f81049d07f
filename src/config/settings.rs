//! Runtime configuration settings

use crate::curator::CuratorConfig;
use crate::services::BuildOptions;
use std::path::PathBuf;

/// Runtime settings for the mashup pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Song library JSON file
    pub library_path: PathBuf,
    /// Output directory for build plans
    pub output_dir: PathBuf,
    /// Matching engine tunables
    pub curator: CuratorConfig,
    /// Per-stage retry cap for transient failures
    pub max_retries: u8,
    /// Suspend at human checkpoints instead of auto-resolving
    pub interactive: bool,
    /// Options forwarded to the engineering service
    pub build: BuildOptions,
    /// Show progress bars
    pub show_progress: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        Self {
            library_path: cli.library.clone(),
            output_dir: cli.output.clone(),
            show_progress: !cli.quiet,
            ..Self::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_path: PathBuf::from("library.json"),
            output_dir: PathBuf::from("./output"),
            curator: CuratorConfig::default(),
            max_retries: 3,
            interactive: false,
            build: BuildOptions::default(),
            show_progress: true,
        }
    }
}
