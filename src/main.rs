use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use rpa_loop::application::orchestrator::{Orchestrator, RunOutcome, TerminatePolicy};
use rpa_loop::infrastructure::process::CommandLauncher;
use rpa_loop::infrastructure::validation::PayloadValidator;
use rpa_loop::interfaces::csv::config_reader::CsvConfigSource;
use rpa_loop::interfaces::csv::transaction_reader::CsvTransactionSource;
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum Terminate {
    Always,
    OnSuccess,
    Never,
}

impl From<Terminate> for TerminatePolicy {
    fn from(value: Terminate) -> Self {
        match value {
            Terminate::Always => TerminatePolicy::Always,
            Terminate::OnSuccess => TerminatePolicy::OnSuccess,
            Terminate::Never => TerminatePolicy::Never,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration CSV file with `key,value` columns
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Directory for the daily log file
    #[arg(long, env = "AUTOMATION_LOGS")]
    log_dir: Option<PathBuf>,

    /// Process name used in the log file name
    #[arg(long, env = "PROCESS_NAME")]
    process_name: Option<String>,

    /// When to stop the applications started during initialization
    #[arg(long, value_enum, default_value = "always")]
    terminate: Terminate,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _guard =
        rpa_loop::logging::init(cli.log_dir.as_deref(), cli.process_name.as_deref()).into_diagnostic()?;

    let orchestrator = Orchestrator::new(
        Box::new(CsvConfigSource::new(cli.config)),
        Box::new(CommandLauncher::new()),
        Box::new(CsvTransactionSource::new()),
        Box::new(PayloadValidator::new()),
    )
    .with_terminate_policy(cli.terminate.into());

    let outcome = orchestrator.run().await;

    if cli.json {
        let report = serde_json::to_string_pretty(outcome.report()).into_diagnostic()?;
        println!("{report}");
    }

    match outcome {
        RunOutcome::Done(_) => Ok(()),
        RunOutcome::Fatal(failure, _) => Err(failure.into()),
    }
}
