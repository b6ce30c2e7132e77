//! playbot -- an IRC bot that runs Go snippets on the Go Playground.
//!
//! Startup wiring only: load the config, build the registry, connect, and
//! pump transport events into the dispatcher. The initial connection failure
//! is fatal; later disconnects reconnect with a fixed delay and rejoin the
//! configured channels.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use playbot_commands::{register_builtins, Dispatcher, MessageSink, SinkError};
use playbot_irc::{Client, Event};
use playbot_playground::PlayClient;
use playbot_types::BotConfig;

const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// playbot -- run Go snippets from IRC on the Go Playground.
#[derive(Parser, Debug)]
#[command(name = "playbot", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

/// The IRC client as the command layer's reply seam.
struct IrcSink {
    client: Client,
}

#[async_trait]
impl MessageSink for IrcSink {
    async fn send_line(&self, target: &str, text: &str) -> Result<(), SinkError> {
        self.client
            .privmsg(target, text)
            .await
            .map_err(|e| SinkError(e.to_string()))
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    init_tracing(config.debug);

    let play = Arc::new(PlayClient::new());
    let registry = Arc::new(register_builtins(play, &config.command_prefix));

    let mut first_attempt = true;
    loop {
        let (client, mut events) = match Client::connect(&config).await {
            Ok(pair) => pair,
            Err(e) if first_attempt => {
                return Err(e).context("initial connection failed");
            }
            Err(e) => {
                warn!(error = %e, "reconnect failed, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };
        first_attempt = false;

        let sink: Arc<dyn MessageSink> = Arc::new(IrcSink {
            client: client.clone(),
        });
        let dispatcher = Dispatcher::new(registry.clone(), sink, &config.command_prefix);

        while let Some(event) = events.recv().await {
            match event {
                Event::Ready => {
                    info!(server = %config.server, "connected and registered");
                    for channel in &config.join_channels {
                        if let Err(e) = client.join(channel).await {
                            warn!(%channel, error = %e, "join failed");
                        }
                    }
                }
                Event::Privmsg { target, sender, text } => {
                    dispatcher
                        .dispatch(&client.current_nick(), &target, &sender, &text)
                        .await;
                }
                Event::Disconnected => {
                    warn!("lost connection to server");
                    break;
                }
            }
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
