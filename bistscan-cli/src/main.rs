//! BIST Scan CLI: scanner loop, single cycles, and status inspection.
//!
//! Commands:
//! - `run`: announce the worker and scan forever at the configured interval
//! - `once`: run a single cycle and print what it found
//! - `status`: print the last status summary written by a running worker
//! - `check-config`: load and validate the configuration, then print it

use anyhow::{Context, Result};
use bistscan_core::data::{
    CircuitBreaker, CsvProvider, DataProvider, SyntheticProvider, YahooProvider,
};
use bistscan_runner::{
    read_status, AlertDispatcher, JsonFileSink, LogDispatcher, ProviderKind, ScanConfig, Scanner,
    TelegramDispatcher, ThreadSleeper,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bistscan", about = "BIST technical signal scanner", version)]
struct Cli {
    /// Path to the TOML config file. Defaults apply when the file is absent.
    #[arg(long, global = true, default_value = "bistscan.toml")]
    config: PathBuf,

    /// Debug-level logging (overrides RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan forever at the configured interval.
    Run {
        /// Use synthetic data instead of the configured provider.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Run a single scan cycle and print the results.
    Once {
        /// Use synthetic data instead of the configured provider.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Print the full scan state as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the last status summary written by a worker.
    Status {
        /// Status file. Defaults to the path in the config.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Validate the configuration and print the effective values.
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { synthetic } => run_loop(&cli.config, synthetic),
        Commands::Once { synthetic, json } => run_once(&cli.config, synthetic, json),
        Commands::Status { path } => show_status(&cli.config, path),
        Commands::CheckConfig => check_config(&cli.config),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: &Path) -> Result<ScanConfig> {
    if path.exists() {
        return ScanConfig::load(path).with_context(|| format!("loading {}", path.display()));
    }
    info!(path = %path.display(), "config file not found, using defaults");
    let mut config = ScanConfig::default();
    config.apply_env_overrides();
    config.validate().context("default configuration")?;
    Ok(config)
}

fn build_provider(config: &ScanConfig, synthetic: bool) -> Result<Box<dyn DataProvider>> {
    let kind = if synthetic {
        ProviderKind::Synthetic
    } else {
        config.data.provider
    };
    Ok(match kind {
        ProviderKind::Yahoo => {
            let breaker = Arc::new(CircuitBreaker::new(
                config.data.breaker_cooldown(),
                config.data.breaker_failure_threshold,
            ));
            Box::new(YahooProvider::new(breaker)?)
        }
        ProviderKind::Csv => {
            let dir = config
                .data
                .csv_dir
                .clone()
                .context("data.csv_dir is required for the csv provider")?;
            Box::new(CsvProvider::new(dir))
        }
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new()),
    })
}

fn build_dispatcher(config: &ScanConfig) -> Result<Box<dyn AlertDispatcher>> {
    match &config.alert.bot_token {
        Some(token) => {
            if config.alert.chat_ids.is_empty() {
                warn!("bot token set but no chat ids configured; alerts go nowhere");
            }
            Ok(Box::new(TelegramDispatcher::new(token)?))
        }
        None => {
            info!("no bot token configured, alerts are logged only");
            Ok(Box::new(LogDispatcher))
        }
    }
}

fn build_scanner(config_path: &Path, synthetic: bool) -> Result<Scanner> {
    let config = load_config(config_path)?;
    let provider = build_provider(&config, synthetic)?;
    let dispatcher = build_dispatcher(&config)?;
    let sink = JsonFileSink::new(config.status.path.clone());
    info!(
        provider = provider.name(),
        alerts = dispatcher.name(),
        symbols = config.symbols.len(),
        interval_secs = config.interval_secs,
        parallel = config.parallel,
        "scanner configured"
    );
    Ok(Scanner::new(config, provider, dispatcher, Box::new(sink)))
}

fn run_loop(config_path: &Path, synthetic: bool) -> Result<()> {
    let scanner = build_scanner(config_path, synthetic)?;
    info!("BIST signal worker starting");
    scanner.announce();
    scanner.run(&ThreadSleeper)
}

fn run_once(config_path: &Path, synthetic: bool, json: bool) -> Result<()> {
    let scanner = build_scanner(config_path, synthetic)?;
    let report = scanner.run_cycle();

    if json {
        let state = scanner.state().load();
        println!("{}", serde_json::to_string_pretty(&*state)?);
        return Ok(());
    }

    println!(
        "Cycle at {}: {} analyzed, {} skipped, {} errors, {} signals ({:.1}s)",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.analyzed,
        report.skipped,
        report.errors.len(),
        report.signals.len(),
        report.elapsed.as_secs_f64(),
    );
    for signal in &report.signals {
        println!(
            "  {:<10} {:<12} {:>10.2}  {}",
            signal.symbol,
            signal.strength,
            signal.price,
            signal.triggers.join("; ")
        );
    }
    for error in &report.errors {
        println!("  ERROR {}: {}", error.symbol, error.error);
    }
    Ok(())
}

fn show_status(config_path: &Path, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => load_config(config_path)?.status.path,
    };
    let summary =
        read_status(&path).with_context(|| format!("reading status from {}", path.display()))?;

    println!("Running:          {}", summary.running);
    println!("Last run:         {}", fmt_time(summary.last_run));
    println!("Total signals:    {}", summary.total_signals);
    println!("Last signal:      {}", fmt_time(summary.last_signal_time));
    println!("Errors (cycle):   {}", summary.errors_count);
    println!(
        "Heartbeat:        {} ({}s ago)",
        summary.worker_heartbeat.format("%Y-%m-%d %H:%M:%S UTC"),
        (chrono::Utc::now() - summary.worker_heartbeat).num_seconds()
    );
    Ok(())
}

fn fmt_time(t: Option<chrono::DateTime<chrono::Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn check_config(config_path: &Path) -> Result<()> {
    let mut config = load_config(config_path)?;
    if config.alert.bot_token.is_some() {
        config.alert.bot_token = Some("<redacted>".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
