use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use yblov::scraper::WebScraper;
use yblov::types::{MunicipalityRef, MunicipalityResults};
use yblov::writer::ResultsWriter;

#[derive(Parser)]
#[command(name = "yblov")]
#[command(about = "A volby.cz election results scraper", long_about = None)]
struct Cli {
    #[arg(help = "volby.cz results page listing municipalities (must contain xjazyk=CZ)")]
    url: String,

    #[arg(help = "Output CSV file")]
    output: PathBuf,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn write_row(
    writer: &mut ResultsWriter<File>,
    municipality: &MunicipalityRef,
    results: &MunicipalityResults,
) {
    writer.write_row(municipality, results).unwrap_or_else(|e| {
        log::error!("Error writing row for {}: {}", municipality.code, e);
        process::exit(1);
    });
    log::debug!("Wrote {} ({})", municipality.name, municipality.code);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    if !yblov::is_valid_url(&cli.url) {
        log::error!(
            "Invalid link: must start with {} and contain xjazyk=CZ",
            yblov::BASE_URL
        );
        process::exit(1);
    }

    let scraper = WebScraper::new().unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    log::info!("Fetching municipality index from {}...", cli.url);
    let municipalities = scraper
        .fetch_municipalities(&cli.url)
        .await
        .unwrap_or_else(|e| {
            log::error!("Error fetching municipality index: {}", e);
            process::exit(1);
        });

    log::info!(
        "Found {} municipalities. Reading candidate parties...",
        municipalities.len()
    );

    // The first municipality pins the party column order for the whole run.
    let first = &municipalities[0];
    let first_results = scraper
        .fetch_municipality_results(&first.detail_url)
        .await
        .unwrap_or_else(|e| {
            log::error!("Error fetching {}: {}", first.detail_url, e);
            process::exit(1);
        });
    let parties: Vec<String> = first_results.votes.names().map(str::to_string).collect();

    let mut writer = ResultsWriter::from_path(&cli.output, parties).unwrap_or_else(|e| {
        log::error!("Error creating {}: {}", cli.output.display(), e);
        process::exit(1);
    });

    log::info!("Processing results...");
    write_row(&mut writer, first, &first_results);
    for municipality in &municipalities[1..] {
        let results = scraper
            .fetch_municipality_results(&municipality.detail_url)
            .await
            .unwrap_or_else(|e| {
                log::error!("Error fetching {}: {}", municipality.detail_url, e);
                process::exit(1);
            });
        write_row(&mut writer, municipality, &results);
    }

    log::info!("Done! Results saved to {}", cli.output.display());
}
