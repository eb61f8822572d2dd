//! cahbot - local REPL for the `cah` command group
//!
//! Lines are run as commands (`create main uk`, `end`, `kick 2`, `packs`).
//! `?<text>` prints the autocomplete choices for a `packs` argument,
//! `/as <id> [name]` and `/in <channel>` switch the simulated caller.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use cahbot::commands::{CahCommands, Caller};
use cahbot::config::Config;
use cahbot::paths;
use cahbot::session::{ChannelId, UserId};
use cahbot::state::SharedState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cahbot=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = paths::config_path();
    let config = Config::load(&config_path).context("failed to load config")?;
    let state = Arc::new(SharedState::from_config(config)?);
    info!("{} packs in catalog", state.catalog.len());

    let commands = CahCommands::new(state);
    let mut caller = Caller {
        channel: ChannelId(1),
        user: UserId(1),
        username: "local".to_string(),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        // keep trailing spaces, they matter to autocomplete
        if let Some(raw) = line.strip_prefix('?') {
            let choices = commands.autocomplete_packs(raw);
            println!("{}", serde_json::to_string_pretty(&choices)?);
            continue;
        }

        let line = line.trim();
        if let Some(rest) = line.strip_prefix("/as ") {
            let mut parts = rest.split_whitespace();
            match parts.next().and_then(|id| id.parse().ok()) {
                Some(id) => {
                    caller.user = UserId(id);
                    caller.username = parts
                        .next()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("user{id}"));
                    println!("now {} ({})", caller.username, caller.user);
                }
                None => println!("usage: /as <id> [name]"),
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("/in ") {
            match rest.trim().parse() {
                Ok(id) => {
                    caller.channel = ChannelId(id);
                    println!("now in channel {}", caller.channel);
                }
                Err(_) => println!("usage: /in <channel>"),
            }
            continue;
        }
        if line == "/quit" {
            break;
        }

        match commands.handle_input(&caller, line).await {
            Ok(result) if result.is_empty() => println!("ok"),
            Ok(result) => println!("{}", result.text),
            Err(e) => eprintln!("error: {e:#}"),
        }
    }

    Ok(())
}
