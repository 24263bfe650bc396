//! Marathon Tracker CLI
//!
//! Collects the top certified marathons of each US state with elevation data.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use marathon_tracker::{
    error::Result,
    models::{Config, OutputFormat, Pacing, RECORD_HEADERS, SENTINEL},
    pipeline::{self, CancelToken},
    services::{ElevationFieldRecovery, RaceListExtractor, StateCollector},
    storage::LocalStorage,
    utils::http::HttpFetcher,
};

/// Marathon Tracker - certified US marathons with elevation
#[derive(Parser, Debug)]
#[command(
    name = "marathon-tracker",
    version,
    about = "Collects top US marathons per state with course elevation"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "marathon.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect races for every configured state and write the output file
    Collect {
        /// Output file (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv or json
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Races kept per state
        #[arg(long)]
        max_races: Option<usize>,

        /// Only these states (code or name); repeatable
        #[arg(long = "state")]
        states: Vec<String>,

        /// Detail pages fetched at once within a state
        #[arg(long)]
        concurrency: Option<usize>,

        /// Skip politeness delays (for local mirrors)
        #[arg(long)]
        no_delay: bool,
    },

    /// Extract ranked races from a saved state listing page
    Extract {
        /// Path to the saved HTML
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Recover elevation from a saved race detail page
    Elevation {
        /// Path to the saved HTML
        #[arg(short, long)]
        file: PathBuf,

        /// Race name, for log messages
        #[arg(short, long, default_value = "saved page")]
        name: String,
    },

    /// Validate configuration
    Validate,

    /// List configured states
    States,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load_if_exists(&cli.config);
    let level = match &loaded {
        Ok(Some(config)) => config.logging.level.clone(),
        _ => "info".to_string(),
    };

    // Initialize logging system before anything is reported
    init_logging(cli.verbose, &level);

    let strict = matches!(cli.command, Command::Validate);
    let mut config = match loaded {
        Ok(Some(config)) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Ok(None) => {
            log::info!(
                "No configuration at {}, using defaults",
                cli.config.display()
            );
            Config::default()
        }
        Err(e) if strict => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return Err(e);
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Collect {
            output,
            format,
            max_races,
            states,
            concurrency,
            no_delay,
        } => {
            if let Some(path) = output {
                config.output.path = path;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            if let Some(max_races) = max_races {
                config.selection.max_races = max_races;
            }
            if let Some(concurrency) = concurrency {
                config.crawler.max_concurrent = concurrency;
            }
            config.validate()?;

            let states = config.select_states(&states)?;
            let fetcher = HttpFetcher::new(&config.crawler)?;
            let mut collector = StateCollector::new(&config, &fetcher)?;
            if no_delay {
                collector = collector.with_pacing(Pacing::none());
            }
            let storage = LocalStorage::new(&config.output.path, config.output.format);

            let cancel = CancelToken::new();
            let signal_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupt received, stopping after the current state...");
                    signal_token.cancel();
                }
            });

            pipeline::run_collection(&collector, &states, &storage, &cancel).await?;
        }

        Command::Extract { file } => {
            let content = std::fs::read_to_string(&file)?;
            let extractor = RaceListExtractor::new(&config.selectors, &config.selection)?;
            let races = extractor.extract_html(&content);

            log::info!("{} qualifying races in {}", races.len(), file.display());
            for (rank, race) in races.iter().enumerate() {
                println!(
                    "{:>3}. {} | {} | {} finishers | {} | {}",
                    rank + 1,
                    race.name,
                    race.city,
                    race.finishers,
                    race.course_type.as_deref().unwrap_or(SENTINEL),
                    race.date.as_deref().unwrap_or(SENTINEL),
                );
            }
        }

        Command::Elevation { file, name } => {
            let content = std::fs::read_to_string(&file)?;
            let recovery = ElevationFieldRecovery::new(&config.selectors)?;
            let reading = recovery.recover(&content, &name);

            let show = |v: Option<u32>| v.map_or_else(|| SENTINEL.to_string(), |v| v.to_string());
            println!("{}: {}", RECORD_HEADERS[6], show(reading.gain_ft));
            println!("{}: {}", RECORD_HEADERS[7], show(reading.loss_ft));
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }

        Command::States => {
            for state in &config.states {
                println!("{}  {}", state.code, state.name);
            }
        }
    }

    Ok(())
}
