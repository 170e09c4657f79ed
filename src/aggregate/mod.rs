//! Match aggregation.
//!
//! Joins each entry of a fetched history page with its per-match detail,
//! locates the tracked player inside the nested team/player structure and
//! emits one normalized [`MatchRecord`] per joinable match. A match whose
//! detail cannot be fetched, or where the player cannot be located, is
//! skipped entirely — never emitted as a zero-stat record, which would
//! silently dilute downstream averages.

mod extract;

pub use extract::{coerce_int, locate_player, resolve_map, resolve_result, resolve_timestamp};

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::{FaceitClient, MatchSummary};
use crate::models::MatchRecord;

/// Normalize one summary/detail pair into a record.
///
/// Returns `None` when the player has no locatable stats entry in the
/// detail payload.
pub fn normalize_match(summary: &MatchSummary, rounds: &[Value], player_id: &str) -> Option<MatchRecord> {
    let (team, player_stats) = locate_player(rounds, player_id)?;

    let score = summary
        .raw
        .get("score")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Unknown")
        .to_string();

    Some(MatchRecord {
        match_id: summary.match_id.clone(),
        map: resolve_map(&summary.raw, rounds),
        date: resolve_timestamp(&summary.raw, rounds),
        result: resolve_result(&summary.raw, Some(team), player_id),
        score,
        stats: extract::extract_stats(player_stats),
    })
}

/// Fetches and joins match data for one player.
pub struct MatchAggregator {
    client: Arc<FaceitClient>,
}

impl MatchAggregator {
    pub fn new(client: Arc<FaceitClient>) -> Self {
        Self { client }
    }

    /// Collect normalized records for up to `limit` recent matches.
    ///
    /// Detail fetches run sequentially over the page. A single failed
    /// detail fetch degrades that one match and the loop continues;
    /// `None` is returned only when the history page itself is
    /// unavailable.
    pub async fn collect_matches(
        &self,
        player_id: &str,
        limit: u32,
        use_cache: bool,
    ) -> Option<Vec<MatchRecord>> {
        let summaries = self.client.fetch_history(player_id, limit, use_cache).await?;

        let mut records = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            let Some(rounds) = self
                .client
                .fetch_match_detail(&summary.match_id, use_cache)
                .await
            else {
                debug!("Skipping match {} (detail unavailable)", summary.match_id);
                continue;
            };

            match normalize_match(summary, &rounds, player_id) {
                Some(record) => records.push(record),
                None => {
                    debug!(
                        "Skipping match {} (player {} not in detail)",
                        summary.match_id, player_id
                    );
                }
            }
        }

        Some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::client::testing::MockTransport;
    use crate::config::CacheConfig;
    use crate::models::MatchResult;
    use serde_json::json;

    fn summary(match_id: &str, raw: Value) -> MatchSummary {
        MatchSummary {
            match_id: match_id.to_string(),
            raw,
        }
    }

    fn detail_for(player_id: &str) -> Vec<Value> {
        vec![json!({
            "round_stats": { "Map": "de_nuke" },
            "teams": [
                {
                    "team_stats": { "Team Win": "1" },
                    "players": [
                        {
                            "player_id": player_id,
                            "player_stats": {
                                "Kills": "20", "Deaths": "12", "Assists": "4",
                                "Headshots": "9", "MVPs": "2", "Damage": "1850"
                            }
                        }
                    ]
                }
            ]
        })]
    }

    #[test]
    fn test_normalize_match_full_record() {
        let s = summary(
            "m1",
            json!({ "started_at": 1719658800, "score": "13 / 9" }),
        );

        let record = normalize_match(&s, &detail_for("p1"), "p1").unwrap();

        assert_eq!(record.match_id, "m1");
        assert_eq!(record.map, "de_nuke");
        assert_eq!(record.date, "1719658800");
        assert_eq!(record.result, MatchResult::Victory);
        assert_eq!(record.score, "13 / 9");
        assert_eq!(record.stats.kills, 20);
        assert_eq!(record.stats.damage, 1850);
    }

    #[test]
    fn test_normalize_match_player_absent_drops_record() {
        let s = summary("m1", json!({}));
        assert!(normalize_match(&s, &detail_for("someone-else"), "p1").is_none());
    }

    #[test]
    fn test_normalize_match_empty_detail_drops_record() {
        let s = summary("m1", json!({}));
        assert!(normalize_match(&s, &[], "p1").is_none());
    }

    #[test]
    fn test_normalize_match_defaults() {
        let s = summary("m1", json!({}));
        let rounds = vec![json!({
            "teams": [{
                "players": [ { "player_id": "p1", "player_stats": {} } ]
            }]
        })];

        let record = normalize_match(&s, &rounds, "p1").unwrap();

        assert_eq!(record.map, "N/A");
        assert_eq!(record.date, "");
        assert_eq!(record.result, MatchResult::Unknown);
        assert_eq!(record.score, "Unknown");
        assert_eq!(record.stats.deaths, 0);
    }

    fn history_payload(ids: &[&str]) -> Value {
        let items: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "match_id": id, "started_at": 1719658800 }))
            .collect();
        json!({ "items": items })
    }

    fn detail_payload(player_id: &str) -> Value {
        json!({ "rounds": detail_for(player_id) })
    }

    #[tokio::test]
    async fn test_collect_matches_survives_one_failed_detail() {
        let transport = MockTransport::new()
            .with_response("/players/p1/history", history_payload(&["m1", "m2", "m3"]))
            .with_response("/matches/m1/stats", detail_payload("p1"))
            .with_failure("/matches/m2/stats")
            .with_response("/matches/m3/stats", detail_payload("p1"));

        let client = Arc::new(FaceitClient::new(
            Arc::new(transport),
            Arc::new(CacheStore::new()),
            CacheConfig::default(),
        ));
        let aggregator = MatchAggregator::new(client);

        let records = aggregator.collect_matches("p1", 20, true).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].match_id, "m1");
        assert_eq!(records[1].match_id, "m3");
    }

    #[tokio::test]
    async fn test_collect_matches_skips_unjoinable_match() {
        let transport = MockTransport::new()
            .with_response("/players/p1/history", history_payload(&["m1", "m2"]))
            .with_response("/matches/m1/stats", detail_payload("p1"))
            .with_response("/matches/m2/stats", detail_payload("not-p1"));

        let client = Arc::new(FaceitClient::new(
            Arc::new(transport),
            Arc::new(CacheStore::new()),
            CacheConfig::default(),
        ));
        let aggregator = MatchAggregator::new(client);

        let records = aggregator.collect_matches("p1", 20, true).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].match_id, "m1");
    }

    #[tokio::test]
    async fn test_collect_matches_history_failure_is_absent() {
        let transport = MockTransport::new().with_failure("/players/p1/history");

        let client = Arc::new(FaceitClient::new(
            Arc::new(transport),
            Arc::new(CacheStore::new()),
            CacheConfig::default(),
        ));
        let aggregator = MatchAggregator::new(client);

        assert!(aggregator.collect_matches("p1", 20, true).await.is_none());
    }
}
