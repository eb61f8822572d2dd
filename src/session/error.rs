//! Lifecycle errors and their user-facing wording

use thiserror::Error;

/// Why a lifecycle operation was refused
///
/// Every kind is fixable by the user (change the input, try again).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("a game is already running in this channel")]
    AlreadyRunning,
    #[error("unknown pack: {0}")]
    UnknownPack(String),
    #[error("no valid packs selected")]
    NoValidPacks,
    #[error("requester did not create this game")]
    NotOwner,
    #[error("requester is not in a game")]
    NoSessionForUser,
    #[error("requester may not kick players from this game")]
    NotAuthorized,
    #[error("target player is not in this game")]
    PlayerNotInGame,
    #[error("player is already in a game")]
    PlayerAlreadyInGame,
    #[error("no game is running in this channel")]
    NoSessionInChannel,
}

/// Map a lifecycle error to the message shown in chat
///
/// Returns `None` for anything that is not a [`GameError`], so callers can
/// hand those to their generic error path.
pub fn humanize(err: &anyhow::Error) -> Option<String> {
    let err = err.downcast_ref::<GameError>()?;
    let text = match err {
        GameError::AlreadyRunning => "There's already a game running in this channel".to_string(),
        GameError::UnknownPack(key) => {
            format!("Unknown pack `{key}`, use `packs` to list the available ones")
        }
        GameError::NoValidPacks => "No valid packs selected".to_string(),
        GameError::NotOwner => "You're not the creator of this game".to_string(),
        GameError::NoSessionForUser => "You're not in a game".to_string(),
        GameError::NotAuthorized => "Only the game creator can kick players".to_string(),
        GameError::PlayerNotInGame => "That user is not in your game".to_string(),
        GameError::PlayerAlreadyInGame => "You're already in a game".to_string(),
        GameError::NoSessionInChannel => "There's no game running in this channel".to_string(),
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_known_kinds() {
        let err = anyhow::Error::new(GameError::AlreadyRunning);
        assert_eq!(
            humanize(&err).as_deref(),
            Some("There's already a game running in this channel")
        );

        let err = anyhow::Error::new(GameError::UnknownPack("nope".to_string()));
        assert!(humanize(&err).unwrap().contains("`nope`"));
    }

    #[test]
    fn test_humanize_through_context() {
        let err = anyhow::Error::new(GameError::NotOwner).context("ending game");
        assert_eq!(
            humanize(&err).as_deref(),
            Some("You're not the creator of this game")
        );
    }

    #[test]
    fn test_humanize_unmapped_is_none() {
        let err = anyhow::anyhow!("permission lookup failed");
        assert!(humanize(&err).is_none());
    }
}
