use beacon_map::io::{load_scanners, RegistrationConfig, RegistrationReport};
use beacon_map::{register, BeaconMapError};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Merge beacon scanner reports into one global frame and count the beacons.
#[derive(Parser, Debug)]
#[command(name = "beacon-map", version, about)]
struct Cli {
    /// Scanner report (`--- scanner <id> ---` blocks of `x,y,z` lines).
    input: PathBuf,

    /// JSON file overriding registration thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full JSON report instead of the beacon count.
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Detect overlaps sequentially even when built with `rayon`.
    #[arg(long)]
    serial: bool,

    /// Log level (off, error, warn, info, debug, trace). With the `tracing`
    /// feature, `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("unknown log level {s:?} (expected off, error, warn, info, debug or trace)"))
}

#[cfg(feature = "tracing")]
fn init_logging(level: LevelFilter) {
    let _ = tracing_log::LogTracer::init();
    beacon_map::core::init_tracing(false, level);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: LevelFilter) {
    if let Err(err) = beacon_map::core::init_with_level(level) {
        eprintln!("warning: logger not installed: {err}");
    }
}

fn run(cli: &Cli) -> Result<(), BeaconMapError> {
    let config = match &cli.config {
        Some(path) => RegistrationConfig::load_json(path)?,
        None => RegistrationConfig::default(),
    };
    let mut params = config.build_params();
    if cli.serial {
        params.parallel = false;
    }

    let scanners = load_scanners(&cli.input)?;
    log::info!("loaded {} scanners from {}", scanners.len(), cli.input.display());
    let result = register(scanners, params)?;

    let report = RegistrationReport::new(Some(cli.input.display().to_string()), &result);
    if let Some(path) = &cli.output {
        report.write_json(path)?;
        log::info!("report written to {}", path.display());
    }
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.beacon_count);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
