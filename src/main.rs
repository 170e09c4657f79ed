use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squad_tracker::api::state::AppState;
use squad_tracker::cache::CacheStore;
use squad_tracker::client::FaceitClient;
use squad_tracker::config::AppConfig;
use squad_tracker::parse_duration;
use squad_tracker::service::TrackerService;
use squad_tracker::storage::{RosterStore, StorageConfig};

#[derive(Parser)]
#[command(name = "squad-tracker")]
#[command(about = "Local CS2 squad performance tracker backed by the FACEIT Data API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Identity cache TTL (e.g., "1h", "30m")
        #[arg(long)]
        identity_ttl: Option<String>,

        /// Match-history cache TTL (e.g., "30m")
        #[arg(long)]
        history_ttl: Option<String>,
    },

    /// Register a player by nickname
    AddPlayer { nickname: String },

    /// Remove a player from the roster
    RemovePlayer { nickname: String },

    /// List registered players, best rank first
    Players,

    /// Re-fetch ranks for all registered players
    Refresh,

    /// Show recent matches for a player
    Matches {
        nickname: String,

        /// How many history entries to fetch
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show aggregate performance for a player
    Performance {
        nickname: String,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show the squad impact-score ranking
    Ranking,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting squad-tracker v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))
        .context("Failed to load configuration")?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }

    let storage = StorageConfig::new(config.data_dir.clone());
    let roster = Arc::new(RosterStore::for_config(&storage));

    // The roster listing needs no API token; everything else does.
    if let Commands::Players = cli.command {
        let players = roster.list().context("Failed to read roster")?;
        if players.is_empty() {
            println!("No players registered. Use `add-player <nickname>`.");
            return Ok(());
        }
        println!("=== Roster ({} players) ===\n", players.len());
        for (rank, p) in players.iter().enumerate() {
            println!(
                "  {:>2}. {:<20} elo {:>5}  level {:>2}",
                rank + 1,
                p.nickname,
                p.elo,
                p.level
            );
        }
        return Ok(());
    }

    if let Commands::Serve {
        identity_ttl,
        history_ttl,
        ..
    } = &cli.command
    {
        if let Some(ttl) = identity_ttl.as_deref().and_then(parse_duration) {
            config.cache.identity_ttl_seconds = ttl.as_secs();
        }
        if let Some(ttl) = history_ttl.as_deref().and_then(parse_duration) {
            config.cache.history_ttl_seconds = ttl.as_secs();
        }
    }

    let cache = Arc::new(CacheStore::new());
    let client = Arc::new(
        FaceitClient::from_config(&config, cache.clone())
            .context("Failed to build upstream client")?,
    );
    let service = Arc::new(TrackerService::new(
        client,
        roster,
        config.upstream.history_limit,
    ));

    match cli.command {
        Commands::Serve { host, port, .. } => {
            let state = AppState {
                service,
                cache,
            };
            let app = squad_tracker::api::build_router(state);

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::AddPlayer { nickname } => match service.register_player(&nickname).await {
            Ok(entry) => {
                println!(
                    "Registered {} (elo {}, level {})",
                    entry.nickname, entry.elo, entry.level
                );
            }
            Err(e) => {
                tracing::error!("Failed to register {}: {}", nickname, e);
                std::process::exit(1);
            }
        },
        Commands::RemovePlayer { nickname } => {
            if service.remove_player(&nickname)? {
                println!("Removed {}", nickname);
            } else {
                println!("No such player: {}", nickname);
            }
        }
        Commands::Players => unreachable!("handled above"),
        Commands::Refresh => {
            let outcome = service.refresh_all().await?;
            println!("\n=== Refresh Results ===");
            println!("Updated: {}", outcome.updated);
            println!("Failed:  {}", outcome.failed);
        }
        Commands::Matches { nickname, limit } => {
            match service.player_matches(&nickname, limit).await {
                Ok(matches) => {
                    println!("=== Recent matches for {} ===\n", nickname);
                    for m in &matches {
                        println!(
                            "  {:<14} {:<10} {:>9}  K/D/A {:>2}/{:>2}/{:>2}  HS {:>2}  score {}",
                            m.map,
                            m.result.to_string(),
                            m.date,
                            m.stats.kills,
                            m.stats.deaths,
                            m.stats.assists,
                            m.stats.headshots,
                            m.score
                        );
                    }
                    println!("\n{} matches", matches.len());
                }
                Err(e) => {
                    tracing::error!("Failed to fetch matches: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Performance { nickname, limit } => {
            match service.player_performance(&nickname, limit).await {
                Ok(result) => {
                    let p = &result.performance;
                    println!("=== Performance: {} ===\n", result.nickname);
                    println!("Matches:   {} ({}W / {}L)", p.matches_played, p.wins, p.losses);
                    println!("Win rate:  {:.1}%", p.win_rate);
                    println!("K/D:       {:.2}", p.avg_kd);
                    println!("HS%:       {:.1}", p.avg_hs);
                    println!("MVPs:      {}", p.total_mvps);
                    println!("Impact:    {:.2}", result.impact_score);
                }
                Err(e) => {
                    tracing::error!("Failed to compute performance: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Ranking => {
            let ranking = service.impact_ranking().await?;
            println!("=== Impact ranking ===\n");
            for (rank, entry) in ranking.iter().enumerate() {
                println!(
                    "  {:>2}. {:<20} {:>7.2}  ({} matches)",
                    rank + 1,
                    entry.nickname,
                    entry.impact_score,
                    entry.matches_counted
                );
            }
        }
    }

    Ok(())
}
