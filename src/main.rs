use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payment_sim::application::processor::CommandProcessor;
use payment_sim::config::{EngineConfig, THRESHOLD_ENV};
use payment_sim::domain::ports::PaymentRepositoryBox;
use payment_sim::infrastructure::in_memory::InMemoryPaymentRepository;
use payment_sim::interfaces::json::snapshot_writer::SnapshotWriter;
use payment_sim::interfaces::text::runner::Runner;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, BufReader};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command file to process. Reads stdin interactively when omitted.
    input: Option<PathBuf>,

    /// Amount at or above which authorized payments are held for
    /// pre-settlement review. Empty or 0 disables the review.
    #[arg(long, env = THRESHOLD_ENV)]
    threshold: Option<String>,

    /// Write every payment, with its history, as JSON to this path on exit.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries command results.
    {
        use tracing_subscriber::{EnvFilter, fmt};
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
    }

    let cli = Cli::parse();

    let config = EngineConfig::from_threshold_setting(cli.threshold.as_deref()).into_diagnostic()?;
    if let Some(threshold) = &config.pre_settlement_threshold {
        eprintln!("PRE_SETTLEMENT_REVIEW enabled for amounts >= {threshold}");
    }

    let repository: PaymentRepositoryBox = Box::new(InMemoryPaymentRepository::new());
    let processor = CommandProcessor::new(repository, config.pre_settlement_threshold);

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.into_diagnostic()?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let stdout = io::stdout();
    let mut runner = Runner::new(&processor, stdout.lock());

    tokio::select! {
        summary = runner.run(input) => {
            let summary = summary.into_diagnostic()?;
            tracing::info!(commands = summary.commands, errors = summary.errors, "Input processed");
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nShutdown requested, exiting...");
            return Ok(());
        }
    }

    if let Some(path) = cli.snapshot {
        let payments = processor.payments().await.into_diagnostic()?;
        let file = File::create(&path).into_diagnostic()?;
        SnapshotWriter::new(BufWriter::new(file))
            .write_payments(&payments)
            .into_diagnostic()?;
        tracing::info!(path = %path.display(), payments = payments.len(), "Snapshot written");
    }

    Ok(())
}
