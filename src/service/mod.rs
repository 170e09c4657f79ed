//! Player and ranking operations.
//!
//! Thin orchestration over the roster store, the upstream client and the
//! aggregation pipeline. The API routes and the CLI both drive this layer
//! rather than talking to the collaborators directly.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::MatchAggregator;
use crate::calculate::{aggregate_performance, average_impact_score};
use crate::client::FaceitClient;
use crate::models::{
    AggregatePerformance, ImpactRankingEntry, MatchRecord, RosterEntry,
};
use crate::storage::{RosterStore, StorageError};

/// Errors surfaced to the API and CLI.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Player not registered: {0}")]
    PlayerNotFound(String),

    #[error("Upstream lookup failed for {0}; try again later")]
    UpstreamUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Counts from a refresh-all pass.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RefreshOutcome {
    pub updated: u32,
    pub failed: u32,
}

/// A player's aggregate figures plus the mean impact score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlayerPerformance {
    pub nickname: String,
    pub performance: AggregatePerformance,
    pub impact_score: f64,
}

pub struct TrackerService {
    client: Arc<FaceitClient>,
    aggregator: MatchAggregator,
    roster: Arc<RosterStore>,
    history_limit: u32,
}

impl TrackerService {
    pub fn new(client: Arc<FaceitClient>, roster: Arc<RosterStore>, history_limit: u32) -> Self {
        let aggregator = MatchAggregator::new(client.clone());
        Self {
            client,
            aggregator,
            roster,
            history_limit,
        }
    }

    /// All registered players, elo descending.
    pub fn roster(&self) -> Result<Vec<RosterEntry>, ServiceError> {
        Ok(self.roster.list()?)
    }

    /// Register a player by nickname: upstream identity lookup, then
    /// upsert into the roster. A cached identity is acceptable here.
    pub async fn register_player(&self, nickname: &str) -> Result<RosterEntry, ServiceError> {
        let identity = self
            .client
            .lookup_identity(nickname, true)
            .await
            .ok_or_else(|| ServiceError::UpstreamUnavailable(nickname.to_string()))?;

        let entry = RosterEntry::from_identity(&identity);
        self.roster.upsert(entry.clone())?;
        info!("Registered player {} ({})", entry.nickname, entry.player_id);
        Ok(entry)
    }

    /// Remove a player from the roster; `false` when not registered.
    pub fn remove_player(&self, nickname: &str) -> Result<bool, ServiceError> {
        Ok(self.roster.delete(nickname)?)
    }

    /// Re-fetch a player's rank with the cache bypassed, upsert the fresh
    /// figures and drop the cached match history so derivative data is
    /// re-fetched on next read.
    pub async fn refresh_player(&self, nickname: &str) -> Result<RosterEntry, ServiceError> {
        let identity = self
            .client
            .lookup_identity(nickname, false)
            .await
            .ok_or_else(|| ServiceError::UpstreamUnavailable(nickname.to_string()))?;

        let entry = RosterEntry::from_identity(&identity);
        self.roster.upsert(entry.clone())?;
        self.client
            .invalidate_history(&entry.player_id, self.history_limit);

        Ok(entry)
    }

    /// Refresh every registered player. One failed lookup degrades that
    /// player only; the pass continues.
    pub async fn refresh_all(&self) -> Result<RefreshOutcome, ServiceError> {
        let mut outcome = RefreshOutcome::default();

        for entry in self.roster.list()? {
            match self.refresh_player(&entry.nickname).await {
                Ok(_) => outcome.updated += 1,
                Err(e) => {
                    warn!("Refresh failed for {}: {}", entry.nickname, e);
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    fn registered(&self, nickname: &str) -> Result<RosterEntry, ServiceError> {
        self.roster
            .get(nickname)?
            .ok_or_else(|| ServiceError::PlayerNotFound(nickname.to_string()))
    }

    /// Normalized recent matches for a registered player.
    pub async fn player_matches(
        &self,
        nickname: &str,
        limit: Option<u32>,
    ) -> Result<Vec<MatchRecord>, ServiceError> {
        let entry = self.registered(nickname)?;
        let limit = limit.unwrap_or(self.history_limit);

        self.aggregator
            .collect_matches(&entry.player_id, limit, true)
            .await
            .ok_or_else(|| ServiceError::UpstreamUnavailable(nickname.to_string()))
    }

    /// Aggregate performance plus mean impact score over recent matches.
    pub async fn player_performance(
        &self,
        nickname: &str,
        limit: Option<u32>,
    ) -> Result<PlayerPerformance, ServiceError> {
        let entry = self.registered(nickname)?;
        let matches = self.player_matches(nickname, limit).await?;

        Ok(PlayerPerformance {
            nickname: entry.nickname,
            performance: aggregate_performance(&matches),
            impact_score: average_impact_score(&matches),
        })
    }

    /// Mean impact score per registered player, best first. A player
    /// whose history cannot be fetched is skipped, not ranked at zero.
    pub async fn impact_ranking(&self) -> Result<Vec<ImpactRankingEntry>, ServiceError> {
        let mut ranking = Vec::new();

        for entry in self.roster.list()? {
            let Some(matches) = self
                .aggregator
                .collect_matches(&entry.player_id, self.history_limit, true)
                .await
            else {
                warn!("Skipping {} in ranking (history unavailable)", entry.nickname);
                continue;
            };

            ranking.push(ImpactRankingEntry {
                nickname: entry.nickname,
                impact_score: average_impact_score(&matches),
                matches_counted: matches.len() as u32,
            });
        }

        ranking.sort_by(|a, b| {
            b.impact_score
                .partial_cmp(&a.impact_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranking)
    }

    /// Upstream lifetime statistics payload, passed through untouched.
    pub async fn lifetime_stats(&self, nickname: &str) -> Result<Value, ServiceError> {
        let entry = self.registered(nickname)?;

        self.client
            .fetch_lifetime_stats(&entry.player_id, true)
            .await
            .ok_or_else(|| ServiceError::UpstreamUnavailable(nickname.to_string()))
    }
}
