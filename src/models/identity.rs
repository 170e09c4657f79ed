//! Player identity as returned by the upstream lookup.

use serde::{Deserialize, Serialize};

/// A player's upstream identity and current rank.
///
/// Returned by an identity lookup and immutable once built; a rank change
/// is observed by performing a fresh lookup, never by mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Nickname as registered upstream
    pub nickname: String,

    /// Upstream player id (the join key into match details)
    pub player_id: String,

    /// FACEIT elo for CS2; 0 when the player has no CS2 record
    pub elo: i64,

    /// Skill level (1-10) derived from elo upstream; 0 when absent
    pub level: i64,

    /// Avatar image URL, if the player has one set
    pub avatar_url: Option<String>,
}

impl PlayerIdentity {
    pub fn new(nickname: String, player_id: String, elo: i64, level: i64) -> Self {
        Self {
            nickname,
            player_id,
            elo,
            level,
            avatar_url: None,
        }
    }

    /// Builder method to set the avatar URL.
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_builder() {
        let identity = PlayerIdentity::new("s1mple".to_string(), "ac71ba3c".to_string(), 3850, 10)
            .with_avatar_url("https://cdn.example.com/avatar.png");

        assert_eq!(identity.nickname, "s1mple");
        assert_eq!(identity.elo, 3850);
        assert!(identity.avatar_url.is_some());
    }

    #[test]
    fn test_identity_serialization() {
        let identity = PlayerIdentity::new("device".to_string(), "b2c3d4".to_string(), 2900, 10);

        let json = serde_json::to_string(&identity).unwrap();
        let parsed: PlayerIdentity = serde_json::from_str(&json).unwrap();

        assert_eq!(identity, parsed);
    }
}
