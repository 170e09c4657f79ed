//! Derived performance models.

use serde::{Deserialize, Serialize};

/// Aggregate performance over a set of matches.
///
/// Recomputed on demand from a list of match records; never stored.
/// Every ratio guards its zero denominator, so an empty match list yields
/// all-zero figures instead of an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatePerformance {
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,

    /// Win percentage, 0-100
    pub win_rate: f64,

    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub total_mvps: i64,

    /// Kills per death; 0 when no deaths were recorded
    pub avg_kd: f64,

    /// Headshot percentage of kills, 0-100; 0 when no kills were recorded
    pub avg_hs: f64,
}

/// One row of the impact-score ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactRankingEntry {
    pub nickname: String,

    /// Mean per-match impact score across the matches considered
    pub impact_score: f64,

    /// Matches that contributed to the mean
    pub matches_counted: u32,
}
