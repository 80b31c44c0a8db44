use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

use windmon_service::analysis::normalize::TimeNormalizer;
use windmon_service::config;
use windmon_service::dev_mode::DevMode;
use windmon_service::ingest::CsvSource;
use windmon_service::ingest::gsheet::SheetSource;
use windmon_service::logging::{self, DataSource};
use windmon_service::model::RunMode;
use windmon_service::pipeline;
use windmon_service::report::{self, Labels};
use windmon_service::verify;

#[derive(Debug, Parser)]
#[command(name = "windmon", about = "Wind farm data report generator.")]
struct Cli {
    /// TOML configuration file (defaults to ./windmon.toml when present)
    #[arg(short, long, env = "WINDMON_CONFIG")]
    config: Option<PathBuf>,
    /// historical, current or estimated
    #[arg(long)]
    mode: Option<RunMode>,
    /// Report output path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Read `<station>.csv` files from this directory instead of the sheet
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Pin the run's "now" (RFC 3339), e.g. to replay a past day
    #[arg(long)]
    now: Option<DateTime<FixedOffset>>,
    /// Seed for forecast jitter
    #[arg(long)]
    seed: Option<u64>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the HTML report (default)
    Generate,
    /// Check that every configured station is reachable and parseable
    Verify {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save every station's live CSV into a directory for later --data-dir runs
    Snapshot { dir: PathBuf },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logger(logging::level_for_verbosity(cli.verbose));

    let mut config = config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    if let Some(seed) = cli.seed {
        config.forecast.seed = Some(seed);
    }
    config.validate().context("validating configuration")?;

    logging::info(
        DataSource::System,
        None,
        &format!("mode {}, {} stations, output {}", config.mode, config.stations.len(), config.output_path.display()),
    );

    let normalizer = TimeNormalizer::new(config.source_tz()?, config.display_tz()?);
    let source: Box<dyn CsvSource> = match &cli.data_dir {
        Some(dir) => Box::new(DevMode::new(dir)),
        None => Box::new(SheetSource::from_config(&config)?),
    };

    match cli.cmd.unwrap_or(Command::Generate) {
        Command::Generate => {
            let now = match cli.now {
                Some(now) => now.with_timezone(&normalizer.display_tz()),
                None => normalizer.now(),
            };
            let mut rng = match config.forecast.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            let model = pipeline::run(&config, source.as_ref(), &normalizer, now, &mut rng);
            let html = report::render_report(&model, Labels::for_language(config.language));
            report::write_report(&config.output_path, &html)
                .with_context(|| format!("writing {}", config.output_path.display()))?;

            println!("✅ HTML report written: {}", config.output_path.display());
            println!("📅 Timestamp: {}", model.generated_at.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "📊 Stations: {} ({} with forecast, {} failed)",
                model.stations.len(),
                model.stations_with_forecast(),
                model.failed_stations()
            );
        }
        Command::Verify { json } => {
            let report = verify::run_verification(source.as_ref(), &config, &normalizer);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", verify::format_report(&report));
            }
            if report.summary.working == 0 {
                bail!("no configured station is working");
            }
        }
        Command::Snapshot { dir } => {
            let dev = DevMode::new(dir);
            for station in &config.stations {
                let csv = source
                    .fetch_csv(station)
                    .with_context(|| format!("fetching {}", station.name))?;
                let path = dev.save_station_csv(station, &csv)?;
                println!("💾 {} → {}", station.name, path.display());
            }
        }
    }

    Ok(())
}
