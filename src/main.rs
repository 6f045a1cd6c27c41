//! Field boss respawn board entry point.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use respawn_board::api::{create_router, AppState};
use respawn_board::config::Config;
use respawn_board::deaths::{spawn_poller, DeathsClient, SnapshotStore};
use respawn_board::metrics;
use respawn_board::schedule::{Mode, Presenter, DISPLAY_TIME_FORMAT};
use respawn_board::utils::shutdown_signal;

/// Field boss respawn board.
#[derive(Parser, Debug)]
#[command(name = "respawn-board")]
#[command(about = "Polls boss death times and serves a respawn schedule")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll upstream and serve the board (default).
    Run {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Fetch death times once and print the schedule.
    FetchOnce {
        /// Show respawn times instead of death times.
        #[arg(long)]
        respawn: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG may come from .env
    let filter = if args.verbose {
        EnvFilter::new("respawn_board=debug,info")
    } else {
        Config::load()
            .map(|config| config.log_filter())
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::FetchOnce { respawn }) => cmd_fetch_once(respawn).await,
        Some(Command::Run { port }) => cmd_run(port.or(args.port)).await,
        None => cmd_run(args.port).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("RESPAWN BOARD - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Upstream: {}", config.upstream_url);
    println!("  Poll Interval: {}ms", config.poll_interval_ms);
    println!("  Fetch Timeout: {}s", config.fetch_timeout_s);
    println!("  On Fetch Failure: {}", config.on_fetch_failure);
    println!("  Timezone: {}", config.display_timezone);
    println!("  Static Dir: {}", config.static_dir);
    println!("  Listen: {}:{}", config.host, config.port);
    println!("  Log Level: {}", config.rust_log);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch once and print the board to stdout.
async fn cmd_fetch_once(respawn: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let tz = config.timezone().map_err(|e| anyhow::anyhow!(e))?;
    let client = DeathsClient::from_config(&config)?;

    println!("Fetching {} ...", client.url());
    let snapshot = client.try_fetch().await?;

    let mode = if respawn { Mode::Respawn } else { Mode::Death };
    let now = Utc::now();
    let presenter = Presenter::new(tz);
    let entries = presenter.present(&snapshot, mode, now);
    let zone = presenter.zone_label(now);

    println!("----------------------------------------------------------------------");
    for entry in &entries {
        let note = if entry.is_past {
            String::new()
        } else {
            format!(" (in {} min)", entry.minutes_left)
        };
        println!(
            "  {} {}  {}{}",
            entry.time.format(DISPLAY_TIME_FORMAT),
            zone,
            entry.name,
            note
        );
    }
    println!("----------------------------------------------------------------------");
    println!(
        "{} of {} entries shown ({} mode)",
        entries.len(),
        snapshot.len(),
        mode
    );

    Ok(())
}

/// Start the poller and serve the board until shutdown.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Upstream: {}", config.upstream_url);
    info!("Timezone: {}", config.display_timezone);
    info!("On fetch failure: {}", config.on_fetch_failure);

    let store = SnapshotStore::new();
    let mut app_state = AppState::from_config(&config, store.clone())?;

    if config.metrics_enabled {
        match metrics::install_prometheus() {
            Ok(handle) => {
                let upkeep = handle.clone();
                tokio::spawn(async move {
                    loop {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        upkeep.run_upkeep();
                    }
                });
                app_state = app_state.with_metrics(handle);
            }
            Err(e) => warn!("Failed to install metrics exporter: {}", e),
        }
    }

    // Start polling upstream
    let client = DeathsClient::from_config(&config)?;
    let _poller = spawn_poller(
        client,
        store,
        config.poll_interval(),
        config.on_fetch_failure,
    );

    // Start HTTP server
    let ip = config
        .host
        .parse::<IpAddr>()
        .map_err(|e| anyhow::anyhow!("Invalid HOST {:?}: {}", config.host, e))?;
    let addr = SocketAddr::new(ip, config.port);
    let listener = TcpListener::bind(addr).await?;
    info!("Server starting on http://{}", addr);

    let router = create_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
