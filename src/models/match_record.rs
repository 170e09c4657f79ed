//! Normalized per-match records.
//!
//! A `MatchRecord` is the canonical unit everything downstream consumes.
//! It is produced once per match by the aggregator, after the loose
//! upstream JSON has been coerced into the typed shape below.

use serde::{Deserialize, Serialize};

/// Outcome of a match from the tracked player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Victory,
    Defeat,
    Unknown,
}

impl MatchResult {
    /// Normalize a raw result value from any of the upstream shapes.
    ///
    /// The history endpoint reports `"1"`/`"0"`, older payloads spell the
    /// outcome out, and team stats use a win flag. Anything unrecognized
    /// classifies as `Unknown` rather than guessing.
    pub fn from_raw(raw: &str) -> Self {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("1")
            || value.eq_ignore_ascii_case("victory")
            || value.eq_ignore_ascii_case("win")
            || value.eq_ignore_ascii_case("won")
        {
            MatchResult::Victory
        } else if value.eq_ignore_ascii_case("0")
            || value.eq_ignore_ascii_case("defeat")
            || value.eq_ignore_ascii_case("loss")
            || value.eq_ignore_ascii_case("lost")
        {
            MatchResult::Defeat
        } else {
            MatchResult::Unknown
        }
    }

    pub fn is_victory(&self) -> bool {
        matches!(self, MatchResult::Victory)
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Victory => write!(f, "Victory"),
            MatchResult::Defeat => write!(f, "Defeat"),
            MatchResult::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Per-player stat block for one match.
///
/// Every field defaults to 0 when the upstream payload omits it. Deaths
/// default to 0 as well; ratio computations guard the zero denominator
/// instead of fabricating a death.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub headshots: i64,
    pub mvps: i64,
    pub damage: i64,
}

/// A single normalized match the tracked player participated in.
///
/// Invariant: a record is only emitted when the player's stat block was
/// located inside the match detail. A match where the player cannot be
/// found produces no record at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Upstream match id
    pub match_id: String,

    /// Resolved map name, `"N/A"` when no extraction tier produced one
    pub map: String,

    /// Match start time as reported upstream (unix seconds or ISO string);
    /// empty when no timestamp field was present — treat as unknown
    pub date: String,

    /// Normalized outcome
    pub result: MatchResult,

    /// Raw score string, e.g. `"16 / 14"`; `"Unknown"` when absent
    pub score: String,

    /// The player's stat block for this match
    pub stats: MatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_victory_literals() {
        for raw in ["1", "victory", "Victory", "WIN", "won"] {
            assert_eq!(MatchResult::from_raw(raw), MatchResult::Victory, "{raw}");
        }
    }

    #[test]
    fn test_result_defeat_literals() {
        for raw in ["0", "defeat", "LOSS", "Lost"] {
            assert_eq!(MatchResult::from_raw(raw), MatchResult::Defeat, "{raw}");
        }
    }

    #[test]
    fn test_result_unknown_literals() {
        for raw in ["", "2", "16 / 14", "draw"] {
            assert_eq!(MatchResult::from_raw(raw), MatchResult::Unknown, "{raw}");
        }
    }

    #[test]
    fn test_result_trims_whitespace() {
        assert_eq!(MatchResult::from_raw("  win "), MatchResult::Victory);
    }

    #[test]
    fn test_stats_default_to_zero() {
        let stats = MatchStats::default();
        assert_eq!(stats.kills, 0);
        assert_eq!(stats.deaths, 0);
        assert_eq!(stats.damage, 0);
    }

    #[test]
    fn test_record_serialization() {
        let record = MatchRecord {
            match_id: "1-abc".to_string(),
            map: "de_mirage".to_string(),
            date: "1719658800".to_string(),
            result: MatchResult::Victory,
            score: "13 / 7".to_string(),
            stats: MatchStats {
                kills: 21,
                deaths: 14,
                assists: 5,
                headshots: 11,
                mvps: 3,
                damage: 1980,
            },
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: MatchRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.match_id, record.match_id);
        assert_eq!(parsed.result, MatchResult::Victory);
        assert_eq!(parsed.stats.kills, 21);
    }
}
