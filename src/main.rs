mod engine;

use clap::{Parser, Subcommand};
use courier_core::config::{self, CursorBackend};
use courier_core::traits::{CursorStore, Directory};
use courier_store::{FileCursorStore, MemoryCursorStore, Store};
use courier_telegram::client::TelegramClient;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "courier",
    version,
    about = "Courier — Telegram private-message relay engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay engine.
    Start,
    /// Check configuration and record-store health.
    Status,
    /// Forward a one-off message through the default bot.
    Send {
        /// Sender username the message is attributed to.
        username: String,
        /// The message text.
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.courier.log_level)),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let store = Store::new(&cfg.store).await?;

            let cursors: Arc<dyn CursorStore> = match cfg.cursor.backend {
                CursorBackend::Memory => Arc::new(MemoryCursorStore::new()),
                CursorBackend::File => {
                    Arc::new(FileCursorStore::new(config::shellexpand(&cfg.cursor.dir)))
                }
            };

            let engine = engine::Engine::new(
                Arc::new(TelegramClient::new()),
                Arc::new(store),
                cursors,
                cfg.poll.clone(),
                cfg.rewrite.clone(),
            );

            println!("Courier — starting relay engine...");
            engine.run().await;
        }
        Commands::Status => {
            println!("Courier — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Cursor backend: {:?}", cfg.cursor.backend);
            println!();

            let store = Store::new(&cfg.store).await?;
            let bots = store.list_active_bots().await?;
            if bots.is_empty() {
                println!("  no active bots configured");
            }
            for bot in &bots {
                let destination = store.default_destination(&bot.id).await?;
                let routing = match &destination {
                    Some(d) if d.topic_id.is_some() => {
                        format!("{} / {}", d.group_label, d.topic_label)
                    }
                    Some(d) => d.group_label.clone(),
                    None => "no default destination".to_string(),
                };
                println!("  {} — {routing}", bot.name);
            }
        }
        Commands::Send { username, text } => {
            if text.is_empty() {
                anyhow::bail!("no message provided. Usage: courier send <username> <text>");
            }
            let text = text.join(" ");

            let store = Store::new(&cfg.store).await?;
            let api = TelegramClient::new();

            let outcome =
                engine::send_direct(&api, &store, &cfg.rewrite, &username, &text).await?;
            println!("{}", outcome.describe());
            if !outcome.is_sent() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
