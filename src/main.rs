// CDR Synth - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/cdr-synth -n 10000 --seed 42 > cdrs.jsonl
// ```
//
// Or against your own network document:
//
// ```console
// $ ./target/release/cdr-synth --network network.json --output-format csv -o cdrs.csv --verbose
// ```
//
// The binary installs no interrupt handler. Ctrl-C terminates the process
// immediately and the output file may end mid-record; cancellation through
// `CancellationToken` is for library callers.

use anyhow::{Context, Result};
use cdr_synth::simulation::{open_sink, CancellationToken, LoggingConfig, SimulationOrchestrator};
use cdr_synth::types::config::CliArgs;
use cdr_synth::types::{NetworkConfig, SimulationConfig};
use clap::Parser;
use std::path::Path;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match SimulationConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    if args.print_network {
        match NetworkConfig::sample().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize sample network: {}", e);
                process::exit(1);
            }
        }
    }

    let _logging = match LoggingConfig::from_flags(
        args.verbose,
        args.debug,
        args.log_json,
        args.log_dir.as_deref(),
    )
    .init()
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting CDR Synth");

    if let Err(e) = run(args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    info!("CDR Synth completed successfully");
}

fn run(args: CliArgs) -> Result<()> {
    let dry_run = args.dry_run;

    let config = SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    print_startup_banner(&config);

    let orchestrator =
        SimulationOrchestrator::new(config.clone()).context("Failed to prepare the generation run")?;
    eprintln!("{}", orchestrator.describe().context("Topology cache is not ready")?);

    if dry_run {
        eprintln!("Configuration, network document and topology validated successfully!");
        eprintln!("Dry run mode - no records will be generated.");
        return Ok(());
    }

    let format = config
        .get_output_format()
        .map_err(anyhow::Error::msg)
        .context("Invalid output format")?;
    let output_path = config.output_path.as_deref().map(Path::new);
    let mut sink = open_sink(format, output_path).context("Failed to open output")?;

    eprintln!("Generating {} records...", config.record_count);
    // Never cancelled; see the note at the top of this file
    let statistics = orchestrator
        .run(sink.as_mut(), CancellationToken::new())
        .context("Generation failed")?;

    eprintln!("{}", statistics.report());
    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("CDR Synth");
    eprintln!("=========");
    eprintln!("Synthetic Call Detail Records for 2G/3G/4G/5G networks");
    eprintln!();

    eprintln!("Configuration:");
    eprintln!(
        "  Network: {}",
        config.network_config.as_deref().unwrap_or("built-in sample")
    );
    eprintln!("  Records: {}", config.record_count);
    eprintln!("  Workers: {}", config.workers);
    eprintln!("  Mix Policy: {}", config.technology_mix.policy);
    eprintln!(
        "  Durations: {} - {} s ({:?})",
        config.min_duration_secs, config.max_duration_secs, config.duration_profile
    );
    if config.service_categories.is_empty() {
        eprintln!("  Service Mix: uniform");
    } else {
        let mix: Vec<String> =
            config.service_categories.iter().map(|(c, w)| format!("{}={}", c, w)).collect();
        eprintln!("  Service Mix: {}", mix.join(","));
    }
    if let Some(interval) = config.split_interval_secs {
        eprintln!("  Split Interval: {} s", interval);
    }
    match &config.customers_file {
        Some(path) => eprintln!("  Customers: {}", path),
        None => eprintln!("  Customers: {} generated", config.customer_count),
    }
    eprintln!("  Output Format: {}", config.output_format);
    eprintln!("  Output: {}", config.output_path.as_deref().unwrap_or("stdout"));
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}
