//! Performance metrics calculation.
//!
//! Computes derived figures from normalized match records:
//! - Aggregate performance (win rate, K/D, headshot percentage)
//! - Per-match impact score and its mean across matches
//!
//! Every division guards the zero-denominator case; empty or degenerate
//! input yields well-defined zero values, never an error.

use crate::models::{AggregatePerformance, MatchRecord};

/// Canonical impact-score weights: kills, assists, damage.
pub const IMPACT_KILL_WEIGHT: f64 = 2.0;
pub const IMPACT_ASSIST_WEIGHT: f64 = 1.0;
pub const IMPACT_DAMAGE_WEIGHT: f64 = 0.01;

/// Boost applied to the base score when the match was won.
pub const IMPACT_VICTORY_MULTIPLIER: f64 = 1.5;

/// Reduce a list of match records into aggregate performance figures.
pub fn aggregate_performance(matches: &[MatchRecord]) -> AggregatePerformance {
    let matches_played = matches.len() as u32;
    let wins = matches.iter().filter(|m| m.result.is_victory()).count() as u32;

    let mut total_kills = 0i64;
    let mut total_deaths = 0i64;
    let mut total_assists = 0i64;
    let mut total_headshots = 0i64;
    let mut total_mvps = 0i64;

    for record in matches {
        total_kills += record.stats.kills;
        total_deaths += record.stats.deaths;
        total_assists += record.stats.assists;
        total_headshots += record.stats.headshots;
        total_mvps += record.stats.mvps;
    }

    let win_rate = if matches_played > 0 {
        wins as f64 / matches_played as f64 * 100.0
    } else {
        0.0
    };

    // A flawless run reports K/D 0 rather than fabricating a death
    let avg_kd = if total_deaths > 0 {
        total_kills as f64 / total_deaths as f64
    } else {
        0.0
    };

    let avg_hs = if total_kills > 0 {
        total_headshots as f64 / total_kills as f64 * 100.0
    } else {
        0.0
    };

    AggregatePerformance {
        matches_played,
        wins,
        losses: matches_played - wins,
        win_rate,
        total_kills,
        total_deaths,
        total_assists,
        total_mvps,
        avg_kd,
        avg_hs,
    }
}

/// Impact score for a single match.
pub fn impact_score(record: &MatchRecord) -> f64 {
    let base = record.stats.kills as f64 * IMPACT_KILL_WEIGHT
        + record.stats.assists as f64 * IMPACT_ASSIST_WEIGHT
        + record.stats.damage as f64 * IMPACT_DAMAGE_WEIGHT;

    if record.result.is_victory() {
        base * IMPACT_VICTORY_MULTIPLIER
    } else {
        base
    }
}

/// Arithmetic mean of the per-match impact scores; 0 for an empty list.
pub fn average_impact_score(matches: &[MatchRecord]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }

    let total: f64 = matches.iter().map(impact_score).sum();
    total / matches.len() as f64
}
