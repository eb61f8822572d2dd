//! Per-channel game sessions
//!
//! At most one game runs per channel and a user plays in at most one game.
//! Both rules are enforced by `SessionManager` through `DashMap` entries:
//! the channel's shard stays locked from the existence check until the new
//! session is inserted, so concurrent creations in one channel cannot both
//! win, while unrelated channels only contend when they share a shard.
//!
//! Lock order is always `sessions` before `players`; no code path holds a
//! `players` guard while touching `sessions`.

mod error;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::{Entry, OccupiedEntry};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::completion::WILDCARD;

pub use error::{humanize, GameError};

/// Chat channel a game is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Chat user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one game instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: UserId,
    pub name: String,
}

/// Snapshot of a running game
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub channel: ChannelId,
    pub creator: UserId,
    pub creator_name: String,
    /// Players vote on the winning card instead of a card czar picking it
    pub vote_mode: bool,
    /// Selected pack keys, in catalog order
    pub packs: Vec<String>,
    /// Joined players, creator first
    pub players: Vec<Player>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(
        channel: ChannelId,
        creator: UserId,
        creator_name: &str,
        vote_mode: bool,
        packs: Vec<String>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            channel,
            creator,
            creator_name: creator_name.to_string(),
            vote_mode,
            packs,
            players: vec![Player {
                id: creator,
                name: creator_name.to_string(),
            }],
            created_at: Utc::now(),
        }
    }

    pub fn has_player(&self, user: UserId) -> bool {
        self.players.iter().any(|p| p.id == user)
    }
}

/// What happened when a player left or was kicked
#[derive(Debug, Clone)]
pub enum Departure {
    /// The game goes on without them
    Left,
    /// The creator or the last player left, so the game was removed
    Ended(Session),
}

/// Registry of running games keyed by channel
pub struct SessionManager {
    catalog: Arc<Catalog>,
    sessions: DashMap<ChannelId, Session>,
    /// Which channel each player is in
    players: DashMap<UserId, ChannelId>,
}

impl SessionManager {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            sessions: DashMap::new(),
            players: DashMap::new(),
        }
    }

    /// Start a game in `channel` with the creator as its first player.
    ///
    /// `pack_keys` are catalog keys or `"*"` for every pack.
    #[instrument(
        name = "session.create",
        skip(self, requester_name, pack_keys),
        fields(packs = pack_keys.len())
    )]
    pub fn create_session<S: AsRef<str>>(
        &self,
        channel: ChannelId,
        requester: UserId,
        requester_name: &str,
        vote_mode: bool,
        pack_keys: &[S],
    ) -> Result<Session, GameError> {
        let slot = match self.sessions.entry(channel) {
            Entry::Occupied(_) => return Err(GameError::AlreadyRunning),
            Entry::Vacant(slot) => slot,
        };

        let packs = self.resolve_packs(pack_keys)?;

        match self.players.entry(requester) {
            Entry::Occupied(_) => return Err(GameError::PlayerAlreadyInGame),
            Entry::Vacant(player) => {
                player.insert(channel);
            }
        }

        let session = Session::new(channel, requester, requester_name, vote_mode, packs);
        slot.insert(session.clone());

        info!(
            channel = %channel,
            creator = %requester,
            vote_mode,
            packs = session.packs.len(),
            "created a new game"
        );
        Ok(session)
    }

    /// Remove the game in `channel` unconditionally.
    ///
    /// Callers gate this behind their own admin check.
    #[instrument(name = "session.end", skip(self))]
    pub fn end_session(&self, channel: ChannelId) -> Result<Session, GameError> {
        match self.sessions.entry(channel) {
            Entry::Occupied(entry) => {
                let session = self.remove_session(entry);
                info!(channel = %channel, "game ended");
                Ok(session)
            }
            Entry::Vacant(_) => Err(GameError::NoSessionInChannel),
        }
    }

    /// Remove the game `requester` is playing in, if they created it.
    #[instrument(name = "session.end_as_owner", skip(self))]
    pub fn adminless_end_session(&self, requester: UserId) -> Result<Session, GameError> {
        let channel = self.channel_of(requester).ok_or(GameError::NoSessionForUser)?;

        match self.sessions.entry(channel) {
            Entry::Occupied(entry) => {
                if entry.get().creator != requester {
                    return Err(GameError::NotOwner);
                }
                let session = self.remove_session(entry);
                info!(channel = %channel, creator = %requester, "game ended by its creator");
                Ok(session)
            }
            Entry::Vacant(_) => Err(GameError::NoSessionForUser),
        }
    }

    /// Remove `target` from the game `requester` created.
    #[instrument(name = "session.kick", skip(self))]
    pub fn kick_player(&self, requester: UserId, target: UserId) -> Result<Departure, GameError> {
        let channel = self.channel_of(requester).ok_or(GameError::NoSessionForUser)?;

        match self.sessions.entry(channel) {
            Entry::Occupied(entry) => {
                let session = entry.get();
                if session.creator != requester {
                    return Err(GameError::NotAuthorized);
                }
                if !session.has_player(target) {
                    return Err(GameError::PlayerNotInGame);
                }
                info!(channel = %channel, target = %target, "player kicked");
                Ok(self.remove_player(entry, target))
            }
            Entry::Vacant(_) => Err(GameError::NoSessionForUser),
        }
    }

    /// Add a player to the game running in `channel`.
    #[instrument(name = "session.join", skip(self, name))]
    pub fn join_session(
        &self,
        channel: ChannelId,
        user: UserId,
        name: &str,
    ) -> Result<Session, GameError> {
        match self.sessions.entry(channel) {
            Entry::Occupied(mut entry) => {
                match self.players.entry(user) {
                    Entry::Occupied(_) => return Err(GameError::PlayerAlreadyInGame),
                    Entry::Vacant(player) => {
                        player.insert(channel);
                    }
                }
                entry.get_mut().players.push(Player {
                    id: user,
                    name: name.to_string(),
                });
                debug!(channel = %channel, user = %user, "player joined");
                Ok(entry.get().clone())
            }
            Entry::Vacant(_) => Err(GameError::NoSessionInChannel),
        }
    }

    /// Take `user` out of whatever game they are in.
    #[instrument(name = "session.leave", skip(self))]
    pub fn leave_session(&self, user: UserId) -> Result<Departure, GameError> {
        let channel = self.channel_of(user).ok_or(GameError::NoSessionForUser)?;

        match self.sessions.entry(channel) {
            Entry::Occupied(entry) if entry.get().has_player(user) => {
                Ok(self.remove_player(entry, user))
            }
            _ => Err(GameError::NoSessionForUser),
        }
    }

    pub fn session_in_channel(&self, channel: ChannelId) -> Option<Session> {
        self.sessions.get(&channel).map(|s| s.value().clone())
    }

    pub fn session_for_user(&self, user: UserId) -> Option<Session> {
        let channel = self.channel_of(user)?;
        self.session_in_channel(channel)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn channel_of(&self, user: UserId) -> Option<ChannelId> {
        self.players.get(&user).map(|c| *c)
    }

    fn resolve_packs<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<String>, GameError> {
        let mut all = false;
        let mut wanted = HashSet::new();

        for key in keys {
            let key = key.as_ref();
            if key == WILDCARD {
                all = true;
            } else if self.catalog.lookup(key).is_some() {
                wanted.insert(key);
            } else {
                debug!(key, "unknown pack requested");
                return Err(GameError::UnknownPack(key.to_string()));
            }
        }

        let packs: Vec<String> = self
            .catalog
            .all()
            .iter()
            .filter(|p| all || wanted.contains(p.key.as_str()))
            .map(|p| p.key.clone())
            .collect();

        if packs.is_empty() {
            return Err(GameError::NoValidPacks);
        }
        Ok(packs)
    }

    /// Free the players, then drop the session while its channel is still locked
    fn remove_session(&self, entry: OccupiedEntry<'_, ChannelId, Session>) -> Session {
        for player in &entry.get().players {
            self.players.remove(&player.id);
        }
        entry.remove()
    }

    fn remove_player(
        &self,
        mut entry: OccupiedEntry<'_, ChannelId, Session>,
        user: UserId,
    ) -> Departure {
        let session = entry.get_mut();
        session.players.retain(|p| p.id != user);
        self.players.remove(&user);

        if session.creator == user || session.players.is_empty() {
            Departure::Ended(self.remove_session(entry))
        } else {
            Departure::Left
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;

    const CH: ChannelId = ChannelId(10);
    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);
    const CAROL: UserId = UserId(3);

    fn manager() -> SessionManager {
        let catalog = Catalog::new(vec![
            CatalogItem::new("main", "Base Set", ""),
            CatalogItem::new("uk", "UK Edition", ""),
            CatalogItem::new("food", "Food Pack", ""),
        ])
        .unwrap();
        SessionManager::new(Arc::new(catalog))
    }

    #[test]
    fn test_create_records_creator_and_packs() {
        let m = manager();
        let s = m.create_session(CH, ALICE, "alice", true, &["food", "main"]).unwrap();
        assert_eq!(s.creator, ALICE);
        assert!(s.vote_mode);
        assert_eq!(s.packs, vec!["main", "food"]);
        assert_eq!(s.players, vec![Player { id: ALICE, name: "alice".to_string() }]);
        assert_eq!(m.active_sessions(), 1);
        assert_eq!(m.session_for_user(ALICE).map(|s| s.id), Some(s.id));
    }

    #[test]
    fn test_create_wildcard_selects_everything() {
        let m = manager();
        let s = m.create_session(CH, ALICE, "alice", false, &["*"]).unwrap();
        assert_eq!(s.packs, vec!["main", "uk", "food"]);
    }

    #[test]
    fn test_create_twice_in_channel() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        let err = m.create_session(CH, BOB, "bob", false, &["main"]).unwrap_err();
        assert_eq!(err, GameError::AlreadyRunning);
        assert!(m.session_for_user(BOB).is_none());
    }

    #[test]
    fn test_create_pack_errors() {
        let m = manager();
        let err = m.create_session(CH, ALICE, "alice", false, &["main", "bogus"]).unwrap_err();
        assert_eq!(err, GameError::UnknownPack("bogus".to_string()));

        let none: [&str; 0] = [];
        let err = m.create_session(CH, ALICE, "alice", false, &none).unwrap_err();
        assert_eq!(err, GameError::NoValidPacks);

        // failed creations leave nothing behind
        assert_eq!(m.active_sessions(), 0);
        assert!(m.session_for_user(ALICE).is_none());
    }

    #[test]
    fn test_wildcard_on_empty_catalog() {
        let m = SessionManager::new(Arc::new(Catalog::new(vec![]).unwrap()));
        let err = m.create_session(CH, ALICE, "alice", false, &["*"]).unwrap_err();
        assert_eq!(err, GameError::NoValidPacks);
    }

    #[test]
    fn test_one_game_per_player() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        let err = m
            .create_session(ChannelId(11), ALICE, "alice", false, &["main"])
            .unwrap_err();
        assert_eq!(err, GameError::PlayerAlreadyInGame);
        assert!(m.session_in_channel(ChannelId(11)).is_none());
    }

    #[test]
    fn test_end_session_frees_players() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        m.join_session(CH, BOB, "bob").unwrap();

        let ended = m.end_session(CH).unwrap();
        assert_eq!(ended.players.len(), 2);
        assert!(m.session_for_user(BOB).is_none());
        assert_eq!(m.end_session(CH).unwrap_err(), GameError::NoSessionInChannel);

        // both may start fresh games now
        m.create_session(ChannelId(11), BOB, "bob", false, &["uk"]).unwrap();
    }

    #[test]
    fn test_players_free_once_channel_looks_empty() {
        let m = Arc::new(manager());
        for round in 0..200u64 {
            let ch = ChannelId(round);
            let other = ChannelId(10_000 + round);
            m.create_session(ch, ALICE, "alice", false, &["main"]).unwrap();
            m.join_session(ch, BOB, "bob").unwrap();

            // act the moment the channel reads as empty
            let watcher = {
                let m = m.clone();
                std::thread::spawn(move || {
                    while m.session_in_channel(ch).is_some() {
                        std::hint::spin_loop();
                    }
                    m.create_session(other, BOB, "bob", false, &["uk"])
                })
            };
            m.end_session(ch).unwrap();

            let created = watcher.join().unwrap();
            assert!(created.is_ok(), "round {round}: {created:?}");
            m.end_session(other).unwrap();
        }
    }

    #[test]
    fn test_remove_session_clears_player_index_first() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        m.join_session(CH, BOB, "bob").unwrap();

        let entry = match m.sessions.entry(CH) {
            Entry::Occupied(entry) => entry,
            Entry::Vacant(_) => panic!("session missing"),
        };
        let ended = m.remove_session(entry);
        assert_eq!(ended.players.len(), 2);
        assert!(m.players.is_empty());
        assert!(m.sessions.is_empty());
    }

    #[test]
    fn test_adminless_end() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        m.join_session(CH, BOB, "bob").unwrap();

        assert_eq!(m.adminless_end_session(BOB).unwrap_err(), GameError::NotOwner);
        assert_eq!(m.adminless_end_session(CAROL).unwrap_err(), GameError::NoSessionForUser);
        assert!(m.session_in_channel(CH).is_some());

        m.adminless_end_session(ALICE).unwrap();
        assert!(m.session_in_channel(CH).is_none());
    }

    #[test]
    fn test_kick_rules() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        m.join_session(CH, BOB, "bob").unwrap();

        assert_eq!(m.kick_player(CAROL, BOB).unwrap_err(), GameError::NoSessionForUser);
        assert_eq!(m.kick_player(BOB, ALICE).unwrap_err(), GameError::NotAuthorized);
        assert_eq!(m.kick_player(ALICE, CAROL).unwrap_err(), GameError::PlayerNotInGame);

        assert!(matches!(m.kick_player(ALICE, BOB), Ok(Departure::Left)));
        assert!(m.session_for_user(BOB).is_none());
        assert_eq!(m.session_in_channel(CH).unwrap().players.len(), 1);
    }

    #[test]
    fn test_creator_kicking_self_ends_game() {
        let m = manager();
        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        m.join_session(CH, BOB, "bob").unwrap();
        assert!(matches!(m.kick_player(ALICE, ALICE), Ok(Departure::Ended(_))));
        assert_eq!(m.active_sessions(), 0);
        assert!(m.session_for_user(BOB).is_none());
    }

    #[test]
    fn test_join_and_leave() {
        let m = manager();
        assert_eq!(m.join_session(CH, BOB, "bob").unwrap_err(), GameError::NoSessionInChannel);

        m.create_session(CH, ALICE, "alice", false, &["main"]).unwrap();
        let s = m.join_session(CH, BOB, "bob").unwrap();
        assert!(s.has_player(BOB));
        assert_eq!(m.join_session(CH, BOB, "bob").unwrap_err(), GameError::PlayerAlreadyInGame);

        assert!(matches!(m.leave_session(BOB), Ok(Departure::Left)));
        assert_eq!(m.leave_session(BOB).unwrap_err(), GameError::NoSessionForUser);
        assert!(matches!(m.leave_session(ALICE), Ok(Departure::Ended(_))));
        assert_eq!(m.active_sessions(), 0);
    }
}
