use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use duet::client::{
    AgentEvent, ClientConfig, DEFAULT_SERVER_URL, WebRtcTransportFactory, connect,
};
use duet::server::{ServerConfig, serve};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet", version, about = "Pairs two participants into a call")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling coordinator.
    Serve {
        /// Overrides DUET_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// STUN url handed to participants; repeatable. Overrides DUET_STUN.
        #[arg(long)]
        stun: Vec<String>,
    },
    /// Join the lobby as a participant.
    Join {
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,

        #[arg(short, long)]
        name: Option<String>,

        /// Seconds to wait for inbound media before inspecting the channels.
        #[arg(long, default_value_t = 5)]
        settle_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve { bind, stun } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if !stun.is_empty() {
                config.stun_urls = stun;
            }

            println!(
                "{} {}",
                "🚀 Coordinator listening on".green().bold(),
                config.bind_addr
            );
            serve(config).await
        }

        Commands::Join {
            server,
            name,
            settle_secs,
        } => {
            let display_name = match name {
                Some(name) if !name.trim().is_empty() => name,
                _ => prompt_name().await?,
            };
            let config = ClientConfig {
                server_url: server,
                display_name,
                settle_window: Duration::from_secs(settle_secs),
                ..ClientConfig::default()
            };
            run_participant(config).await
        }
    }
}

/// Runs a terminal prompt on the blocking pool so the agent's event stream
/// keeps flowing while the user types.
async fn ask<T, F>(prompt: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .context("Prompt task panicked")?
}

async fn prompt_name() -> Result<String> {
    ask(|| {
        let name = Input::<String>::new()
            .with_prompt("Your name")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() {
                    Err("a name is required to join")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .context("Failed to read name")?;
        Ok(name.trim().to_owned())
    })
    .await
}

async fn confirm_rejoin() -> Result<bool> {
    ask(|| {
        Confirm::new()
            .with_prompt("Connection failed. Rejoin the lobby?")
            .default(true)
            .interact()
            .context("Failed to read answer")
    })
    .await
}

async fn run_participant(config: ClientConfig) -> Result<()> {
    println!("{} {}", "📡 Connecting to".cyan(), config.server_url);
    let mut conn = connect(config, WebRtcTransportFactory)
        .await
        .context("Failed to reach the signaling server")?;

    loop {
        let event = tokio::select! {
            event = conn.events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                conn.handle.leave().await?;
                break;
            }
        };
        let Some(event) = event else { break };
        print_event(&event);

        if let AgentEvent::Failed { .. } = event {
            if !confirm_rejoin().await? {
                break;
            }
            conn.handle.join().await?;
        }
    }

    // The agent may already be gone if the server hung up.
    let _ = conn.handle.shutdown().await;
    let _ = conn.task.await;
    println!("{}", "👋 Bye".bold());
    Ok(())
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::Welcome { participant_id } => {
            println!("{} {}", "✔ Connected as".green(), participant_id)
        }
        AgentEvent::Waiting => println!("{}", "⏳ Waiting for someone to join...".yellow()),
        AgentEvent::Paired { room_id, role } => {
            println!("{} {} as {}", "🤝 Paired in room".cyan(), room_id, role)
        }
        AgentEvent::Connected { media, .. } => {
            println!("{} ({})", "✨ Call connected".green().bold(), media)
        }
        AgentEvent::MediaTimedOut { timeout, .. } => {
            println!("{} {}", "⚠ Connected, but".yellow(), timeout)
        }
        AgentEvent::PeerLeft { .. } => {
            println!("{}", "👤 Your peer left. Back in the lobby.".yellow())
        }
        AgentEvent::Failed { reason, .. } => {
            println!("{} {}", "✖ Connection failed:".red().bold(), reason)
        }
        AgentEvent::Left => println!("{}", "Left the lobby".dimmed()),
    }
}
