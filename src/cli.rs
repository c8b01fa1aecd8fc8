/// # text-reorg CLI Interface (Module)
///
/// Command parsing, config resolution and the async entrypoint [`run`], shared by
/// `main` and the integration tests. Business logic lives in [`crate::traverse`] and
/// [`crate::aggregate`]; this module only wires the production collaborators together.
///
/// Settings are layered: defaults, then the YAML file given with `--config`, then
/// command-line flags (which also read `TEXT_REORG_INPUT` / `TEXT_REORG_OUTPUT`).
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::contract::Backend;
use crate::convert::PandocConverter;
use crate::load_config::{load_api_key, load_config};
use crate::logging::LoggingConfig;
use crate::transform::LlmTransformer;
use crate::traverse::{self, TraversalReport};

/// CLI for text-reorg: reorganise folders of text files and combine them per folder.
#[derive(Parser, Debug)]
#[clap(
    name = "text-reorg",
    version,
    about = "Reorganise folders of .txt files with a generative text service and combine each folder into txt, md and odt"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process every .txt file under the input root, then combine each directory
    Run(RunArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Path to a YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Root of the tree of .txt files to process
    #[clap(long, env = "TEXT_REORG_INPUT")]
    pub input: Option<PathBuf>,
    /// Root of the mirrored output tree
    #[clap(long, env = "TEXT_REORG_OUTPUT")]
    pub output: Option<PathBuf>,
    /// Text service backend
    #[clap(long, value_enum)]
    pub backend: Option<Backend>,
    /// Model name (defaults per backend)
    #[clap(long)]
    pub model: Option<String>,
    /// File with the instruction prompt prepended to every text
    #[clap(long)]
    pub prompt: Option<PathBuf>,
    /// Seconds to wait after each directory
    #[clap(long)]
    pub delay_secs: Option<u64>,
    /// pandoc executable used for the .odt output
    #[clap(long)]
    pub pandoc: Option<PathBuf>,
    /// Directory for timestamped log files
    #[clap(long)]
    pub log_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Defaults, overlaid by the config file, overlaid by flags.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };
        if let Some(input) = &self.input {
            config.traversal.input_root = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.traversal.output_root = Some(output.clone());
        }
        if let Some(delay) = self.delay_secs {
            config.traversal.delay_secs = delay;
        }
        if let Some(backend) = self.backend {
            config.transform.backend = backend;
        }
        if let Some(model) = &self.model {
            config.transform.model = Some(model.clone());
        }
        if let Some(prompt) = &self.prompt {
            config.transform.prompt_path = Some(prompt.clone());
        }
        if let Some(pandoc) = &self.pandoc {
            config.convert.pandoc = pandoc.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.logging.log_dir = log_dir.clone();
        }
        Ok(config)
    }
}

impl Cli {
    /// Logging settings, needed by `main` before the subscriber exists.
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        match &self.command {
            Commands::Run(args) => Ok(args.resolve()?.logging),
        }
    }
}

/// Runs one traversal with the production text service and pandoc.
pub async fn execute(config: &Config) -> Result<TraversalReport> {
    config.trace_loaded();
    let traversal = config
        .traversal
        .to_traversal_config()
        .context("both an input root (--input) and an output root (--output) are required")?;

    let api_key = load_api_key(config.transform.backend)?;
    let transformer = LlmTransformer::new(&config.transform, api_key)
        .context("Failed to construct text transformer")?;
    let converter = PandocConverter::new(&config.convert);

    let report = traverse::run(&traversal, &transformer, &converter).await?;
    if !report.is_clean() {
        tracing::warn!(
            failed = report.failed.len(),
            aggregation_failures = report.aggregation_failures.len(),
            "Completed with failures; see log for details"
        );
    }
    Ok(report)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Run(args) => {
            let config = args.resolve()?;
            tracing::info!(command = "run", "Starting traversal");
            match execute(&config).await {
                Ok(report) => {
                    println!("Run complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "run", error = %e, "Run failed");
                    Err(e)
                }
            }
        }
    }
}
