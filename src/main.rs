use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pr_reviewer_service::{
    api::{self, AppState},
    assignment::{ReviewAssignmentOrchestrator, SystemClock},
    config::{Config, DEFAULT_CONFIG_YAML},
    store::MemoryStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pr-reviewer")]
#[command(about = "Assigns pull request reviewers from the author's team")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen address, overrides config and HTTP_ADDR
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(short, long, default_value = "pr-reviewer.yml")]
        config_file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref()).await?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Initialize tracing
    init_tracing(&config.logging.level)?;

    match cli.command {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.set_listen_addr(&addr);
            }
            serve(config).await?;
        }

        Commands::Init { config_file, force } => {
            init_config(config_file, force).await?;
        }
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Load configuration from file (if given) and apply environment overrides
async fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) if path.exists() => Config::load_from_file(path).await?,
        Some(path) => {
            // Tracing is not up yet
            eprintln!("Configuration file not found: {:?}. Using defaults.", path);
            Config::default()
        }
        None => Config::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

async fn serve(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let addr = config.socket_addr()?;

    let rng = match config.review.random_seed {
        Some(seed) => {
            warn!("Reviewer selection seeded with {}; assignments are reproducible", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let orchestrator = ReviewAssignmentOrchestrator::with_sources(
        Arc::new(MemoryStore::new()),
        config.assignment_config(),
        Arc::new(SystemClock),
        Box::new(rng),
    );

    info!(
        "Starting reviewer assignment service (max {} reviewers per pull request)",
        config.review.max_reviewers
    );
    api::serve(addr, AppState::new(Arc::new(orchestrator))).await
}

/// Initialize configuration file
async fn init_config(config_file: PathBuf, force: bool) -> Result<()> {
    info!("Initializing configuration file: {:?}", config_file);

    if config_file.exists() && !force {
        warn!(
            "Configuration file already exists: {:?}. Pass --force to overwrite.",
            config_file
        );
        return Ok(());
    }

    tokio::fs::write(&config_file, DEFAULT_CONFIG_YAML)
        .await
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    info!("Configuration file created successfully: {:?}", config_file);
    println!("Configuration file created: {:?}", config_file);
    println!("Edit this file to customize the service.");

    Ok(())
}
