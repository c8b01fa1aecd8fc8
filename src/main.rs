use anyhow::Result;
use clap::Parser;
use text_reorg::cli::{run, Cli};
use text_reorg::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let logging = cli.logging_config()?;
    let (_guard, log_file) = init_logging(&logging)?;
    tracing::info!(log_file = %log_file.display(), "Logger configured");

    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result
}
