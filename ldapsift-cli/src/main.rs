//! ldapsift binary entry point
//!
//! Wires the file source, correlation engine, and emitter together.
//! Correlated events go to stdout; diagnostics go to stderr so the event
//! stream stays pipeable.

mod cli;
mod error;

use clap::Parser;
use tokio::sync::mpsc;

use ldapsift_engine::{
    CorrelationEngine, CorrelatorConfigBuilder, FileSource, FormatEmitter, LinePatterns,
    SourceConfig,
};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_level.as_str())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "ldapsift failed");
        eprintln!("ERROR: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = CorrelatorConfigBuilder::new()
        .format(cli.format.into())
        .follow(cli.follow)
        .poll_interval_ms(cli.poll_interval_ms)
        .build()?;

    if cli.files.len() > 1 {
        tracing::warn!(
            ignored = cli.files.len() - 1,
            "only the first log file is processed, ignoring the rest"
        );
    }
    let path = cli.files[0].clone();
    tracing::info!(path = %path.display(), follow = config.follow, "ldapsift starting");

    let patterns = LinePatterns::new()?;
    let mut engine = CorrelationEngine::new(&patterns);
    let mut emitter = FormatEmitter::new(config.format, std::io::stdout());

    let (tx, mut rx) = mpsc::channel(1024);
    let source = FileSource::new(path, SourceConfig::from(&config), tx);
    let source_task = tokio::spawn(source.run());

    while let Some(line) = rx.recv().await {
        engine.process_line(&line.text, &mut emitter);
    }

    source_task
        .await
        .map_err(|e| CliError::Internal(format!("source task failed: {e}")))??;

    tracing::info!(
        lines = engine.lines_processed(),
        skipped = engine.lines_skipped(),
        events = engine.events_emitted(),
        open_connections = engine.tracked_connections(),
        "processing complete"
    );

    Ok(())
}
