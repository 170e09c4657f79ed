//! Registered-player roster entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PlayerIdentity;

/// A player registered in the local roster.
///
/// Unique by nickname and by upstream player id; re-registering either
/// updates the existing entry (upsert).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub nickname: String,

    /// Upstream player id used for history and match-detail lookups
    pub player_id: String,

    pub elo: i64,
    pub level: i64,
    pub avatar_url: Option<String>,

    /// When this entry was last written
    pub last_updated: DateTime<Utc>,
}

impl RosterEntry {
    /// Build a roster entry from a fresh identity lookup.
    pub fn from_identity(identity: &PlayerIdentity) -> Self {
        Self {
            nickname: identity.nickname.clone(),
            player_id: identity.player_id.clone(),
            elo: identity.elo,
            level: identity.level,
            avatar_url: identity.avatar_url.clone(),
            last_updated: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_identity() {
        let identity = PlayerIdentity::new("ropz".to_string(), "f00-ba7".to_string(), 3400, 10);
        let entry = RosterEntry::from_identity(&identity);

        assert_eq!(entry.nickname, "ropz");
        assert_eq!(entry.player_id, "f00-ba7");
        assert_eq!(entry.elo, 3400);
        assert!(entry.avatar_url.is_none());
    }

    #[test]
    fn test_roster_entry_serialization() {
        let entry = RosterEntry {
            nickname: "NiKo".to_string(),
            player_id: "1234".to_string(),
            elo: 3100,
            level: 10,
            avatar_url: None,
            last_updated: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: RosterEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(entry.nickname, parsed.nickname);
        assert_eq!(entry.elo, parsed.elo);
    }
}
