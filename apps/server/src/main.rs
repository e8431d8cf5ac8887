use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use parley_chats::{ChatService, LoggingMediaStore, MediaStore, MessageService};
use parley_config::load as load_config;
use parley_database::MessageContent;
use parley_gateway::{create_router, GatewayState};
use parley_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "parley-server")]
#[command(about = "Parley chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Seed the database with a demo conversation
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::SeedData => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Parley backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(services.db_pool.clone(), &config.auth);
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(parley_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let media: Arc<dyn MediaStore> = Arc::new(LoggingMediaStore);
    let chat_service = ChatService::new(services.db_pool.clone(), media.clone());
    let message_service = MessageService::new(services.db_pool.clone(), media);

    let (chat, created) = chat_service.create_direct_chat("demo-alice", "demo-bob").await?;
    if !created {
        info!(chat_id = %chat.public_id, "demo chat already present, skipping seed");
        return Ok(());
    }

    for (sender, text) in [
        ("demo-alice", "hey, is this thing on?"),
        ("demo-bob", "loud and clear"),
        ("demo-alice", "great, see you at standup"),
    ] {
        message_service
            .create_message(&chat, sender, MessageContent::Text { text: text.to_string() })
            .await?;
    }

    info!(chat_id = %chat.public_id, "seeded demo conversation");
    Ok(())
}
