//! Chat command implementations for `cah`
//!
//! Thin glue between raw command text and the session registry. Lifecycle
//! errors with a chat wording come back as a normal reply; anything else is
//! returned as `Err` for the caller's generic error path.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::completion::{self, Suggestion};
use crate::session::{humanize, ChannelId, GameError, UserId};
use crate::state::SharedState;

/// Decides whether a user administers a channel
///
/// Injected so the two `end` paths (admin removal, owner removal) can be
/// driven without a chat platform.
#[async_trait]
pub trait AdminCheck: Send + Sync {
    async fn is_channel_admin(&self, channel: ChannelId, user: UserId) -> Result<bool>;
}

/// Fixed set of admin users, valid in every channel
#[derive(Debug, Default)]
pub struct StaticAdmins {
    users: HashSet<UserId>,
}

impl StaticAdmins {
    pub fn from_ids(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            users: ids.into_iter().map(UserId).collect(),
        }
    }
}

#[async_trait]
impl AdminCheck for StaticAdmins {
    async fn is_channel_admin(&self, _channel: ChannelId, user: UserId) -> Result<bool> {
        Ok(self.users.contains(&user))
    }
}

/// Who ran a command, and where
#[derive(Debug, Clone)]
pub struct Caller {
    pub channel: ChannelId,
    pub user: UserId,
    pub username: String,
}

/// Result of a command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Output text to display
    pub text: String,
}

impl CommandResult {
    pub fn normal(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Success with nothing to show
    pub fn silent() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Check if result has any output
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The `cah` command group
pub struct CahCommands {
    state: Arc<SharedState>,
}

impl CahCommands {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    #[instrument(name = "cmd.dispatch", skip(self, caller), fields(input.len = input.len()))]
    pub async fn handle_input(&self, caller: &Caller, input: &str) -> Result<CommandResult> {
        let (mut cmd, mut args) = split_word(input.trim());
        if cmd.eq_ignore_ascii_case("cah") {
            (cmd, args) = split_word(args);
        }

        match cmd.to_lowercase().as_str() {
            "create" | "c" => self.cmd_create(caller, args).await,
            "end" => self.cmd_end(caller).await,
            "kick" => self.cmd_kick(caller, args).await,
            "packs" => Ok(self.cmd_packs()),
            "" | "help" => Ok(CommandResult::normal(self.cmd_help())),
            other => Ok(CommandResult::normal(format!("Unknown command: {}", other))),
        }
    }

    /// Suggestions for the `packs` argument of `create`
    pub fn autocomplete_packs(&self, raw: &str) -> Vec<Suggestion> {
        completion::complete(&self.state.catalog, raw)
    }

    /// `create [packs=]["]<packs...>["] [-v]`
    pub async fn cmd_create(&self, caller: &Caller, args: &str) -> Result<CommandResult> {
        let (vote_mode, packs) = parse_create_args(args);

        let defaults = &self.state.config.default_packs;
        let result = if packs.is_empty() {
            self.state.sessions.create_session(
                caller.channel,
                caller.user,
                &caller.username,
                vote_mode,
                defaults.as_slice(),
            )
        } else {
            self.state.sessions.create_session(
                caller.channel,
                caller.user,
                &caller.username,
                vote_mode,
                packs.as_slice(),
            )
        };

        match result {
            Ok(_) => Ok(CommandResult::silent()),
            Err(err) => reply_or_raise(err),
        }
    }

    /// `end`: admins remove the channel's game, everyone else only their own
    pub async fn cmd_end(&self, caller: &Caller) -> Result<CommandResult> {
        let is_admin = match self
            .state
            .admins
            .is_channel_admin(caller.channel, caller.user)
            .await
        {
            Ok(is_admin) => is_admin,
            Err(err) => {
                warn!(user = %caller.user, "admin check failed, treating as non-admin: {err:#}");
                false
            }
        };

        let result = if is_admin {
            self.state.sessions.end_session(caller.channel)
        } else {
            self.state.sessions.adminless_end_session(caller.user)
        };

        match result {
            Ok(session) => {
                info!(
                    channel = %session.channel,
                    by = %caller.user,
                    admin = is_admin,
                    "stopped game"
                );
                Ok(CommandResult::normal("Stopped the game"))
            }
            Err(err) => reply_or_raise(err),
        }
    }

    /// `kick <user id>`
    pub async fn cmd_kick(&self, caller: &Caller, args: &str) -> Result<CommandResult> {
        let target = match parse_user_id(args) {
            Some(id) => id,
            None => return Ok(CommandResult::normal("Usage: kick <user>")),
        };

        match self.state.sessions.kick_player(caller.user, target) {
            Ok(_) => Ok(CommandResult::normal("User removed")),
            Err(err) => reply_or_raise(err),
        }
    }

    /// `packs`: every pack with its description
    pub fn cmd_packs(&self) -> CommandResult {
        let mut out = "Available packs: \n\n".to_string();
        for pack in self.state.catalog.all() {
            out.push_str(&format!("`{}` - {}\n", pack.name, pack.description));
        }
        CommandResult::normal(out)
    }

    fn cmd_help(&self) -> String {
        r#"Play cards against humanity!

  cah create [-v] [packs...]   Start a game here (* for all packs, -v for vote mode)
  cah end                      End the game in this channel
  cah kick <user>              Remove a player from your game
  cah packs                    List available packs
"#
        .to_string()
    }
}

/// Split off the first word, trimming what follows
fn split_word(input: &str) -> (&str, &str) {
    input
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((input, ""))
}

/// Split `create` arguments into the vote switch and pack tokens.
///
/// A leading `packs=` is dropped once, and a quoted value right after it
/// holds the pack list. Tokens outside the quotes are switches or packs.
fn parse_create_args(args: &str) -> (bool, Vec<&str>) {
    let args = args.trim();
    let args = args.strip_prefix("packs=").unwrap_or(args);

    let mut packs = Vec::new();
    let mut loose = args;
    if let Some(quoted) = args.strip_prefix('"') {
        let (inner, after) = quoted.split_once('"').unwrap_or((quoted, ""));
        packs.extend(inner.split_whitespace());
        loose = after;
    }

    let mut vote_mode = false;
    for token in loose.split_whitespace() {
        match token {
            "-v" | "vote:true" => vote_mode = true,
            "vote:false" => vote_mode = false,
            _ => packs.push(token),
        }
    }
    (vote_mode, packs)
}

/// Accept a bare id or a `<@id>` / `<@!id>` mention
fn parse_user_id(arg: &str) -> Option<UserId> {
    let arg = arg.split_whitespace().next()?;
    let digits = arg
        .strip_prefix("<@")
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.trim_start_matches('!'))
        .unwrap_or(arg);
    digits.parse().ok().map(UserId)
}

fn reply_or_raise(err: GameError) -> Result<CommandResult> {
    let err = anyhow::Error::new(err);
    match humanize(&err) {
        Some(text) => {
            tracing::debug!("command refused: {err}");
            Ok(CommandResult::normal(text))
        }
        None => Err(err),
    }
}
