mod cli;
mod config;
mod datasources;
mod error;
mod export;
mod logic;
mod models;

use chrono::{Local, Utc};
use clap::Parser;
use cli::{Cli, Commands, LocationArgs, OddsArgs};
use config::Config;
use datasources::PowerClient;
use error::Result;
use export::ExportDocument;
use logic::exceedance::{day_of_year, matching_records};
use logic::{OddsQuery, OddsService};
use models::{ClimateSeries, OddsReport};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        if e.is_retryable() {
            eprintln!("Couldn't get historical data right now. Please try again in a moment.");
            eprintln!("  ({})", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init = cli.command {
        Config::setup_interactive()?;
        return Ok(());
    }

    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Odds(args) => run_odds(&config, &args).await,
        Commands::Presets => {
            list_presets(&config);
            Ok(())
        }
        Commands::Check(location) => run_check(&config, &location).await,
        Commands::Init => Ok(()),
    }
}

async fn run_odds(config: &Config, args: &OddsArgs) -> Result<()> {
    let coordinate = args.location.resolve(config)?;
    let thresholds = args.thresholds(config)?;
    let dates = args.dates_or(Local::now().date_naive());

    if thresholds.is_empty() {
        tracing::info!("No thresholds given, only the typical-day summary will be shown");
    }

    let service = OddsService::new(PowerClient::new(config.provider.clone())?);
    let reports = match dates.as_slice() {
        [date] => {
            let query = OddsQuery {
                coordinate,
                date: *date,
                thresholds,
            };
            let report = service.query(&query).await?;
            vec![(query, report)]
        }
        _ => service.query_dates(coordinate, &dates, thresholds).await?,
    };
    tracing::debug!("{} location(s) cached", service.cached_locations());

    if args.json || args.output.is_some() {
        let generated_at = Utc::now();
        let documents: Vec<ExportDocument> = reports
            .iter()
            .map(|(query, report)| ExportDocument::new(query, report, generated_at))
            .collect();
        let json = export::to_json(&documents)?;

        if let Some(path) = &args.output {
            std::fs::write(path, &json)?;
            println!("Exported {} result set(s) to {}", documents.len(), path.display());
        }
        if args.json {
            println!("{}", json);
        }
        return Ok(());
    }

    for (query, report) in &reports {
        print_report(query, report);
    }
    Ok(())
}

fn print_report(query: &OddsQuery, report: &OddsReport) {
    println!();
    println!(
        "Odds for {} on {} (day {} of the year)",
        query.coordinate,
        query.date.format("%B %-d, %Y"),
        day_of_year(query.date)
    );

    for result in &report.results {
        println!(
            "  {} {:<16} {:>4.0}%",
            result.category.symbol(),
            result.label,
            result.value_percent
        );
        println!("     {}", result.note);
    }

    match &report.summary {
        Some(summary) => println!(
            "  Typical day: high {:.0}°C, low {:.0}°C, {:.0} mm precipitation, {:.0} km/h wind",
            summary.avg_high_c, summary.avg_low_c, summary.avg_precip_mm, summary.avg_wind_kph
        ),
        None => println!("  No historical data for this day of the year."),
    }
}

fn list_presets(config: &Config) {
    if config.presets.is_empty() {
        println!("No presets configured. Add a `presets` list to config.yaml.");
        return;
    }

    for preset in &config.presets {
        let parts: Vec<String> = preset
            .thresholds
            .iter()
            .map(|(category, value)| category.label(value))
            .collect();
        println!("{:<12} {}", preset.name, parts.join(", "));
    }
}

async fn run_check(config: &Config, location: &LocationArgs) -> Result<()> {
    let coordinate = location.resolve(config)?;
    println!("Config OK");
    println!("  Provider: {}", config.provider.base_url);
    println!("  User-Agent: {}", config.provider.user_agent);

    let client = PowerClient::new(config.provider.clone())?;
    match client.fetch_daily_history(coordinate).await {
        Ok(series) => {
            if series.is_empty() {
                println!("NASA POWER: OK, but no daily highs were returned for {}", coordinate);
                return Ok(());
            }
            println!("NASA POWER: OK ({} days for {})", series.len(), coordinate);
            print_coverage(&series, Local::now().date_naive());
            Ok(())
        }
        Err(e) => {
            println!("NASA POWER: FAILED");
            Err(e)
        }
    }
}

fn print_coverage(series: &ClimateSeries, today: chrono::NaiveDate) {
    let years = matching_records(series, today).len();
    println!("  {} years of data match today's day of the year", years);
}
