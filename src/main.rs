use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use featurevote::api::{self, AppState};
use featurevote::config::{Config, HOST_VAR, PORT_VAR};
use featurevote::mcp;
use featurevote_core::seed;

#[derive(Parser)]
#[command(name = "fvote")]
#[command(about = "Feature-request voting server")]
struct Cli {
    /// Database file (defaults to FEATUREVOTE_DB, then the platform data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Load sample features and demo voters
    Seed,
    /// Create or update the database schema, then exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the MCP stdio stream.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "featurevote=debug,featurevote_core=debug,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut overrides = Vec::new();
    if let Some(Commands::Serve { port, host }) = &cli.command {
        if let Some(port) = port {
            overrides.push((PORT_VAR, port.to_string()));
        }
        if let Some(host) = host {
            overrides.push((HOST_VAR, host.clone()));
        }
    }

    let mut config = Config::load_with_overrides(&overrides)?;
    if let Some(path) = cli.db {
        config.db_path = Some(path);
    }

    match cli.command {
        Some(Commands::Serve { .. }) => serve(&config).await?,
        Some(Commands::Mcp) => {
            let db = config.open_database()?;
            mcp::run_stdio_server(db, config.page_size).await?;
        }
        Some(Commands::Seed) => {
            let db = config.open_database()?;
            let report = seed::load_sample_data(&db)?;
            println!(
                "Created {} users, {} features and {} votes",
                report.users_created, report.features_created, report.votes_cast
            );
        }
        Some(Commands::Migrate) => {
            config.open_database()?;
            println!("Database schema is up to date");
        }
        None => serve(&config).await?,
    }

    Ok(())
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Starting featurevote server on {}", config.bind_addr());

    let db = config.open_database()?;
    let app = api::router(AppState::new(db).with_page_size(config.page_size));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("featurevote server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("featurevote server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
