//! Parley console host.
//!
//! Simulates a small world on stdin: players join, move and chat, and every
//! player's deliveries are printed as they arrive. Set `PARLEY_JSON=1` for
//! one JSON object per delivery.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use serde_json::json;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use parley::config::env::{apply_env_overrides, get_config_path};
use parley::config::{load_and_validate, validate_config, Config};
use parley::host::channels::Delivery;
use parley::host::console::{ConsoleCommand, ConsoleHost, Outcome};
use parley::language::LanguageRegistry;
use parley::TransformerSystem;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Parley v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    let config = if Path::new(&config_path).exists() {
        info!("Loading configuration from {}...", config_path);
        load_and_validate(&config_path).map_err(|e| {
            error!("Failed to load configuration: {}", e);
            error!("Please ensure {} is properly formatted.", config_path);
            e
        })?
    } else {
        warn!("{} not found, using built-in defaults", config_path);
        let config = apply_env_overrides(Config::default());
        validate_config(&config)?;
        config
    };

    let languages = LanguageRegistry::from_config(&config)?;
    info!("Configuration loaded successfully");
    info!("  Languages: {}", languages.languages().len());
    info!("  Babble: {}", languages.babble().name);
    info!("  Require nickname: {}", config.chat.require_nickname);
    if languages.languages().is_empty() {
        warn!("No languages configured; every message will be babble");
    }

    let json = std::env::var("PARLEY_JSON").is_ok_and(|v| v == "1");
    let system = TransformerSystem::standard(Arc::new(config.chat), Arc::new(languages));
    let console = ConsoleHost::new(system);

    println!("Type /help for commands, /quit to exit.");

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let outcome = ConsoleCommand::parse(&line).and_then(|command| console.execute(command));
                match outcome {
                    Ok(Outcome::Joined { id, name, deliveries }) => {
                        println!("{} joined as player {}", name, id);
                        tokio::spawn(print_deliveries(name, deliveries, json));
                    }
                    Ok(Outcome::Info(text)) => println!("{}", text),
                    Ok(Outcome::Processed(report)) => {
                        debug!(state = ?report.state, delivered = report.delivered, skipped = report.skipped, "Processed");
                        // Let printer tasks drain before the next prompt line.
                        tokio::task::yield_now().await;
                    }
                    Ok(Outcome::Quit) => break,
                    Err(e) => println!("{}", e),
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Parley stopped");
    Ok(())
}

/// Print everything delivered to one player until they leave.
async fn print_deliveries(name: String, mut deliveries: mpsc::UnboundedReceiver<Delivery>, json: bool) {
    while let Some(delivery) = deliveries.recv().await {
        let now = Local::now();
        if json {
            let value = match &delivery {
                Delivery::Chat(chat) => json!({ "to": name, "at": now.to_rfc3339(), "chat": chat }),
                Delivery::Notice(text) => json!({ "to": name, "at": now.to_rfc3339(), "notice": text }),
            };
            println!("{}", value);
        } else {
            let stamp = now.format("%H:%M:%S");
            match delivery {
                Delivery::Chat(chat) => println!("[{}] {} <- {}", stamp, name, chat.text),
                Delivery::Notice(text) => println!("[{}] {} (notice) {}", stamp, name, text),
            }
        }
    }
    debug!(player = %name, "Delivery channel closed");
}
