//! Placar CLI
//!
//! - `placar serve` runs the dashboard server
//! - `placar fetch` runs one poll cycle and prints the result
//! - `placar init-config` prints a default config file
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the first of
//! `~/.config/placar/config.toml`, `/etc/placar/config.toml`, `./config.toml`)
//! with `PLACAR_*` environment variables on top. `RUST_LOG` overrides the
//! configured log level.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use placar::api::{serve, AppState};
use placar::config::{generate_default_config, Config, LoggingConfig};
use placar::dashboard::Dashboard;
use placar::lifecycle::Subscription;
use placar::panel::{PanelStore, PanelView, Team};
use placar::poller::{CycleOutcome, Poller};
use placar::render::format_value;
use placar::sth::{HistorySource, StHistoryClient};

const DEFAULT_FILTER: &str = "placar=info,tower_http=info";

#[derive(Parser)]
#[command(name = "placar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live goal scoreboard over an STH-Comet history API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the dashboard server
    Serve,

    /// Fetch one attribute once and print it
    Fetch {
        /// Attribute to fetch (gb or gr)
        #[arg(short, long)]
        attr: String,
        /// Number of samples (default: from config)
        #[arg(short = 'n', long)]
        last_n: Option<usize>,
    },

    /// Print a default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = load_config(cli.config.as_deref(), std::io::stderr)?;
            init_tracing(&config.logging);
            run_server(config).await?;
        }

        Commands::Fetch { attr, last_n } => {
            let mut config = load_config(cli.config.as_deref(), std::io::stderr)?;
            if let Some(n) = last_n {
                config.sth.last_n = n;
            }
            config.validate()?;
            init_tracing(&config.logging);
            fetch_once(&config, &attr).await?;
        }

        Commands::InitConfig { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Load the config with a temporary subscriber installed; the configured one
/// is only known once loading is done.
fn load_config<W>(path: Option<&Path>, writer: W) -> anyhow::Result<Config>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(writer)
        .finish();

    tracing::subscriber::with_default(bootstrap, || {
        let config = match path {
            Some(path) => {
                let config = Config::load_with_env(path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?;
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            None => Config::load_default(),
        };
        Ok(config)
    })
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if logging.level.contains('=') {
            EnvFilter::new(&logging.level)
        } else {
            EnvFilter::new(format!("placar={},tower_http=info", logging.level))
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Placar v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("History endpoint: {}", config.sth.endpoint);

    let source: Arc<dyn HistorySource> = Arc::new(StHistoryClient::new(&config.sth)?);
    let dashboard = Arc::new(Dashboard::mount(
        &config.dashboard.attributes,
        &config.sth,
        source,
    )?);

    let state = AppState::new(Arc::clone(&dashboard), config.dashboard.clone());
    let result = serve(state).await;

    tracing::info!("Unmounting panels...");
    dashboard.unmount();
    tracing::info!("Placar stopped");

    result?;
    Ok(())
}

async fn fetch_once(config: &Config, attr: &str) -> anyhow::Result<()> {
    let team = Team::from_attribute(attr)?;
    let client = StHistoryClient::new(&config.sth)?;
    let url = client.request_url(team.attribute(), config.sth.last_n);

    let store = PanelStore::new(team);
    let poller = Poller::new(
        team.attribute(),
        config.sth.last_n,
        Arc::new(client),
        store.clone(),
    );

    if poller.poll_once(&Subscription::new()).await == CycleOutcome::Failed {
        anyhow::bail!("Fetching {} from {} failed", attr, url);
    }

    println!("{}", team.title());
    println!();

    match store.view().await {
        PanelView::Populated { series } => {
            println!("Last {} events", series.len());
            println!("{:<12} {}", "Time", "Value");
            println!("{}", "-".repeat(24));
            for sample in series.iter() {
                println!("{:<12} {}", sample.label(), format_value(sample.value));
            }
        }
        _ => {
            println!("{}", placar::render::html::EMPTY_TEXT);
        }
    }

    Ok(())
}
