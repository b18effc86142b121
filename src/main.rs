// tempmon - seasonal temperature anomaly monitor

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use tempmon_service::cities::CityRegistry;
use tempmon_service::config::{load_config, MonitorConfig};
use tempmon_service::ingest::history::load_history_file;
use tempmon_service::ingest::openweather::{LiveTemperatureProvider, OpenWeatherClient};
use tempmon_service::logging::{self, init_logger, DataSource};
use tempmon_service::monitor::{analyze_all, live_check, CityReport, LiveCheck};

#[derive(Parser)]
#[command(name = "tempmon")]
#[command(version)]
#[command(about = "Flag unusual temperatures against rolling and seasonal baselines", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV history with city, timestamp and temperature columns
    #[arg(short, long)]
    data: PathBuf,

    /// Only report on this city
    #[arg(long)]
    city: Option<String>,

    /// Fetch and classify current temperatures from OpenWeatherMap
    #[arg(long)]
    live: bool,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("tempmon: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => MonitorConfig::default(),
    };

    if let Err(e) = init_logger(config.logging.level, config.logging.file.as_deref()) {
        eprintln!("tempmon: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            logging::error(DataSource::System, None, &message);
            eprintln!("tempmon: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &MonitorConfig) -> Result<(), String> {
    let seasons = config.season_mapping().map_err(|e| e.to_string())?;
    let registry = config.city_registry().map_err(|e| e.to_string())?;

    logging::info(
        DataSource::System,
        None,
        &format!("Loading history from {}", cli.data.display()),
    );
    let history = load_history_file(&cli.data, &seasons)
        .map_err(|e| format!("{}: {}", cli.data.display(), e))?;

    let mut series = history.into_series();
    if let Some(wanted) = &cli.city {
        series.retain(|name, _| name.eq_ignore_ascii_case(wanted.trim()));
        if series.is_empty() {
            return Err(format!("no history for city '{}'", wanted));
        }
    }

    let reports = analyze_all(&series, &config.analysis, &seasons);

    let provider = if cli.live {
        live_provider(config, registry)
    } else {
        None
    };
    let now = Utc::now();

    for report in reports.values() {
        print_report(report);
        if let Some(provider) = &provider {
            let check = live_check(provider.as_ref(), &report.profile, &seasons, &config.analysis, now);
            print_live(&check);
        }
        println!();
    }

    logging::info(
        DataSource::System,
        None,
        &format!("Reported on {} cities", reports.len()),
    );
    Ok(())
}

// A missing API key disables live checks instead of failing the run
fn live_provider(config: &MonitorConfig, registry: CityRegistry) -> Option<Box<dyn LiveTemperatureProvider>> {
    match OpenWeatherClient::from_env(&config.live, registry) {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            logging::warn(
                DataSource::OpenWeather,
                None,
                &format!("Live checks disabled: {}", e),
            );
            None
        }
    }
}

fn print_report(report: &CityReport) {
    println!("== {} ==", report.city);

    match &report.summary {
        Some(s) => {
            println!(
                "  readings {:>6}   mean {:>7.2}   std {:>7}",
                s.count,
                s.mean,
                s.stddev.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
            );
            println!(
                "  min {:.2}   25% {:.2}   50% {:.2}   75% {:.2}   max {:.2}",
                s.min, s.q25, s.median, s.q75, s.max
            );
        }
        None => println!("  no readings"),
    }

    println!(
        "  rolling anomalies (window {}, {}σ): {}",
        report.annotated.window,
        report.annotated.sigma_multiplier,
        report.anomaly_count()
    );
    for point in report.annotated.anomalies() {
        println!(
            "    {}  {:>7.2}  (mean {:.2}, std {:.2})",
            point.reading.timestamp.format("%Y-%m-%d %H:%M"),
            point.reading.temperature,
            point.mean.unwrap_or(f64::NAN),
            point.stddev.unwrap_or(f64::NAN)
        );
    }

    println!("  seasonal profile:");
    for (season, stats) in report.profile.iter() {
        match (stats.mean, stats.stddev) {
            (Some(mean), Some(std)) => {
                println!("    {:<7} n={:<6} mean {:>7.2}  std {:>6.2}", season.as_str(), stats.count, mean, std)
            }
            (Some(mean), None) => {
                println!("    {:<7} n={:<6} mean {:>7.2}  std      -", season.as_str(), stats.count, mean)
            }
            _ => println!("    {:<7} n={:<6} no data", season.as_str(), stats.count),
        }
    }
}

fn print_live(check: &LiveCheck) {
    match (check.temperature, check.verdict) {
        (Some(t), Some(verdict)) => println!(
            "  live ({}, {}): {:.1} -> {}",
            check.season,
            check.instant.format("%Y-%m-%d %H:%M UTC"),
            t,
            verdict
        ),
        _ => println!("  live: unavailable"),
    }
}
