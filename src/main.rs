use anyhow::{Context, Result};
use assetter::cli::output::{format_execution_event, format_report, status_lines};
use assetter::cli::Cli;
use assetter::core::config::BuildConfig;
use assetter::engine::{EngineCommand, EsbuildClient, TailwindClient};
use assetter::execution::{ExecutionEvent, PipelineRunner};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout is reserved for status lines
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to set logging subscriber")?;

    let config = match &cli.config_file {
        Some(path) => BuildConfig::from_file(path)
            .with_context(|| format!("Failed to load build config from {}", path))?,
        None => BuildConfig::default(),
    };
    debug!("Build configuration: {:?}", config);

    let params = cli
        .paths
        .to_parameters()
        .context("Invalid build parameters")?;

    let bundler = EsbuildClient::new(EngineCommand::new(&config.esbuild, config.timeout_secs));
    let generator = TailwindClient::new(EngineCommand::new(&config.tailwindcss, config.timeout_secs));

    let mut runner = PipelineRunner::new(bundler, generator, &config);
    if let Some(strategy) = cli.strategy {
        runner = runner.with_strategy(strategy.into());
    }

    let verbose = cli.verbose;
    runner.add_event_handler(move |event| {
        for line in status_lines(&event) {
            println!("{}", line);
        }
        if verbose && !matches!(event, ExecutionEvent::PipelineFailed { .. }) {
            eprintln!("{}", format_execution_event(&event));
        }
    });

    let report = runner.run(&params).await;

    println!();
    println!("{}", format_report(&report, &params.output_root));

    std::process::exit(report.exit_code());
}
