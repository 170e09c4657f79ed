//! Upstream FACEIT Data API client.
//!
//! Issues authenticated requests for player identity, match history and
//! per-match statistics, memoizing each lookup through the shared
//! [`CacheStore`]. Every operation degrades to `None` on transport errors
//! or non-success responses — callers treat absence as "try later", never
//! as an exception. No retries are performed at this layer.
//!
//! The HTTP layer sits behind the [`Transport`] trait so tests can script
//! responses and failures without a network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CacheNamespace, CacheStore};
use crate::config::{AppConfig, CacheConfig};
use crate::models::PlayerIdentity;

/// Errors that can occur talking to the upstream API.
///
/// These never cross the client's public lookup surface — they are logged
/// and collapsed to `None` there — but the [`Transport`] seam exposes them
/// for tests and for construction-time failures.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("API token is not a valid header value")]
    InvalidToken,

    #[error("API token missing: set the {0} environment variable")]
    MissingToken(String),
}

/// One entry of a fetched match-history page.
///
/// Raw-ish intermediate used only to drive the join against per-match
/// detail; callers do not retain it.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub match_id: String,
    pub raw: Value,
}

/// Minimal async HTTP seam: GET a path under the API base URL and parse
/// the body as JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError>;
}

/// Bearer-token authenticated transport over reqwest.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base = Url::parse(base_url).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| UpstreamError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Read-through cached client for the upstream stats service.
pub struct FaceitClient {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheStore>,
    ttls: CacheConfig,
}

impl FaceitClient {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<CacheStore>, ttls: CacheConfig) -> Self {
        Self {
            transport,
            cache,
            ttls,
        }
    }

    /// Build a client over real HTTP from the application config.
    ///
    /// Fails when the bearer token is absent from the configured
    /// environment variable.
    pub fn from_config(config: &AppConfig, cache: Arc<CacheStore>) -> Result<Self, UpstreamError> {
        let api_key = config
            .upstream
            .api_key()
            .ok_or_else(|| UpstreamError::MissingToken(config.upstream.api_key_env.clone()))?;

        let transport = HttpTransport::new(
            &config.upstream.base_url,
            &api_key,
            Duration::from_secs(config.upstream.timeout_seconds),
        )?;

        Ok(Self::new(
            Arc::new(transport),
            cache,
            config.cache.clone(),
        ))
    }

    /// Look up a player's identity and CS2 rank by nickname.
    ///
    /// The cache key is the lower-cased nickname so repeated lookups with
    /// different casing share one entry. Rank fields default to 0 when the
    /// player has no CS2 record.
    pub async fn lookup_identity(&self, nickname: &str, use_cache: bool) -> Option<PlayerIdentity> {
        let cache_key = nickname.to_lowercase();

        if use_cache {
            if let Some(cached) = self.cache.get(CacheNamespace::PlayerIdentity, &cache_key) {
                if let Ok(identity) = serde_json::from_value::<PlayerIdentity>(cached) {
                    debug!("Identity cache hit for {}", nickname);
                    return Some(identity);
                }
            }
        }

        let payload = match self
            .transport
            .get_json("/players", &[("nickname", nickname.to_string())])
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Identity lookup failed for {}: {}", nickname, e);
                return None;
            }
        };

        let player_id = match payload.get("player_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                warn!("Identity payload for {} has no player_id", nickname);
                return None;
            }
        };

        let cs2 = payload.get("games").and_then(|games| games.get("cs2"));
        let elo = cs2
            .and_then(|game| game.get("faceit_elo"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let level = cs2
            .and_then(|game| game.get("skill_level"))
            .and_then(Value::as_i64)
            .unwrap_or(0);

        let mut identity = PlayerIdentity::new(nickname.to_string(), player_id, elo, level);
        if let Some(avatar) = payload.get("avatar").and_then(Value::as_str) {
            if !avatar.is_empty() {
                identity = identity.with_avatar_url(avatar);
            }
        }

        if use_cache {
            if let Ok(value) = serde_json::to_value(&identity) {
                self.cache.set(
                    CacheNamespace::PlayerIdentity,
                    &cache_key,
                    value,
                    self.ttls.identity_ttl(),
                );
            }
        }

        Some(identity)
    }

    /// Fetch one bounded page of match-history summaries, most recent
    /// first. The cache key includes the limit so different page sizes do
    /// not collide.
    pub async fn fetch_history(
        &self,
        player_id: &str,
        limit: u32,
        use_cache: bool,
    ) -> Option<Vec<MatchSummary>> {
        let cache_key = format!("{}_{}", player_id, limit);

        if use_cache {
            if let Some(cached) = self.cache.get(CacheNamespace::MatchHistory, &cache_key) {
                debug!("History cache hit for {}", player_id);
                return Some(Self::summaries_from_items(&cached));
            }
        }

        let payload = match self
            .transport
            .get_json(
                &format!("/players/{}/history", player_id),
                &[
                    ("game", "cs2".to_string()),
                    ("offset", "0".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!("History fetch failed for {}: {}", player_id, e);
                return None;
            }
        };

        let items = payload.get("items").cloned().unwrap_or(Value::Array(Vec::new()));

        if use_cache {
            self.cache.set(
                CacheNamespace::MatchHistory,
                &cache_key,
                items.clone(),
                self.ttls.history_ttl(),
            );
        }

        Some(Self::summaries_from_items(&items))
    }

    fn summaries_from_items(items: &Value) -> Vec<MatchSummary> {
        let Some(items) = items.as_array() else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let match_id = item.get("match_id").and_then(Value::as_str)?;
                Some(MatchSummary {
                    match_id: match_id.to_string(),
                    raw: item.clone(),
                })
            })
            .collect()
    }

    /// Fetch the per-match round blocks. Detail for a finished match never
    /// changes, so this namespace carries the longest TTL.
    pub async fn fetch_match_detail(&self, match_id: &str, use_cache: bool) -> Option<Vec<Value>> {
        if use_cache {
            if let Some(cached) = self.cache.get(CacheNamespace::MatchDetail, match_id) {
                debug!("Match detail cache hit for {}", match_id);
                return cached.as_array().cloned();
            }
        }

        let payload = match self
            .transport
            .get_json(&format!("/matches/{}/stats", match_id), &[])
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Match detail fetch failed for {}: {}", match_id, e);
                return None;
            }
        };

        let rounds = payload.get("rounds").cloned().unwrap_or(Value::Array(Vec::new()));

        if use_cache {
            self.cache.set(
                CacheNamespace::MatchDetail,
                match_id,
                rounds.clone(),
                self.ttls.match_detail_ttl(),
            );
        }

        rounds.as_array().cloned()
    }

    /// Fetch the upstream lifetime statistics payload for a player.
    pub async fn fetch_lifetime_stats(&self, player_id: &str, use_cache: bool) -> Option<Value> {
        if use_cache {
            if let Some(cached) = self.cache.get(CacheNamespace::LifetimeStats, player_id) {
                debug!("Lifetime stats cache hit for {}", player_id);
                return Some(cached);
            }
        }

        let payload = match self
            .transport
            .get_json(&format!("/players/{}/stats/cs2", player_id), &[])
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Lifetime stats fetch failed for {}: {}", player_id, e);
                return None;
            }
        };

        if use_cache {
            self.cache.set(
                CacheNamespace::LifetimeStats,
                player_id,
                payload.clone(),
                self.ttls.lifetime_ttl(),
            );
        }

        Some(payload)
    }

    /// Drop the cached history page for one player at the given limit.
    /// Called after a rank refresh so derivative data is re-fetched.
    pub fn invalidate_history(&self, player_id: &str, limit: u32) {
        self.cache
            .invalidate(CacheNamespace::MatchHistory, &format!("{}_{}", player_id, limit));
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockTransport;
    use super::*;
    use serde_json::json;

    fn client_with(transport: MockTransport) -> (FaceitClient, Arc<CacheStore>) {
        let cache = Arc::new(CacheStore::new());
        let client = FaceitClient::new(Arc::new(transport), cache.clone(), CacheConfig::default());
        (client, cache)
    }

    fn identity_payload() -> Value {
        json!({
            "player_id": "p-123",
            "nickname": "s1mple",
            "avatar": "https://cdn.example.com/a.png",
            "games": {
                "cs2": { "faceit_elo": 3850, "skill_level": 10 }
            }
        })
    }

    #[tokio::test]
    async fn test_lookup_identity_extracts_rank() {
        let transport = MockTransport::new().with_response("/players", identity_payload());
        let (client, _) = client_with(transport);

        let identity = client.lookup_identity("s1mple", true).await.unwrap();

        assert_eq!(identity.player_id, "p-123");
        assert_eq!(identity.elo, 3850);
        assert_eq!(identity.level, 10);
        assert_eq!(
            identity.avatar_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[tokio::test]
    async fn test_lookup_identity_defaults_rank_to_zero() {
        let payload = json!({ "player_id": "p-9", "games": {} });
        let transport = MockTransport::new().with_response("/players", payload);
        let (client, _) = client_with(transport);

        let identity = client.lookup_identity("newbie", true).await.unwrap();

        assert_eq!(identity.elo, 0);
        assert_eq!(identity.level, 0);
        assert!(identity.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_lookup_identity_missing_player_id_is_absent() {
        let transport = MockTransport::new().with_response("/players", json!({"nickname": "x"}));
        let (client, _) = client_with(transport);

        assert!(client.lookup_identity("x", true).await.is_none());
    }

    #[tokio::test]
    async fn test_identity_cache_key_is_case_insensitive() {
        let transport = MockTransport::new().with_response("/players", identity_payload());
        let cache = Arc::new(CacheStore::new());
        let transport = Arc::new(transport);
        let client = FaceitClient::new(transport.clone(), cache, CacheConfig::default());

        client.lookup_identity("S1mple", true).await.unwrap();
        client.lookup_identity("s1MPLE", true).await.unwrap();

        assert_eq!(transport.calls_to("/players"), 1);
    }

    #[tokio::test]
    async fn test_cache_bypass_forces_fresh_fetch() {
        let transport = Arc::new(MockTransport::new().with_response("/players", identity_payload()));
        let cache = Arc::new(CacheStore::new());
        let client = FaceitClient::new(transport.clone(), cache, CacheConfig::default());

        client.lookup_identity("s1mple", true).await.unwrap();
        client.lookup_identity("s1mple", false).await.unwrap();

        assert_eq!(transport.calls_to("/players"), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_absent_not_error() {
        let transport = MockTransport::new().with_failure("/players");
        let (client, _) = client_with(transport);

        assert!(client.lookup_identity("s1mple", true).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_history_builds_summaries() {
        let items = json!({
            "items": [
                { "match_id": "m1", "started_at": 1700000000 },
                { "match_id": "m2", "started_at": 1700003600 },
                { "no_id_here": true }
            ]
        });
        let transport = MockTransport::new().with_response("/players/p-123/history", items);
        let (client, _) = client_with(transport);

        let summaries = client.fetch_history("p-123", 20, true).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].match_id, "m1");
        assert_eq!(summaries[1].match_id, "m2");
    }

    #[tokio::test]
    async fn test_history_cache_key_includes_limit() {
        let items = json!({ "items": [{ "match_id": "m1" }] });
        let transport =
            Arc::new(MockTransport::new().with_response("/players/p-123/history", items));
        let cache = Arc::new(CacheStore::new());
        let client = FaceitClient::new(transport.clone(), cache, CacheConfig::default());

        client.fetch_history("p-123", 10, true).await.unwrap();
        client.fetch_history("p-123", 20, true).await.unwrap();
        client.fetch_history("p-123", 10, true).await.unwrap();

        // Two distinct page sizes, third call served from cache
        assert_eq!(transport.calls_to("/players/p-123/history"), 2);
    }

    #[tokio::test]
    async fn test_fetch_match_detail_returns_rounds() {
        let payload = json!({ "rounds": [ { "round_stats": { "Map": "de_nuke" } } ] });
        let transport = MockTransport::new().with_response("/matches/m1/stats", payload);
        let (client, _) = client_with(transport);

        let rounds = client.fetch_match_detail("m1", true).await.unwrap();

        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0]["round_stats"]["Map"], json!("de_nuke"));
    }

    #[tokio::test]
    async fn test_match_detail_failure_is_absent() {
        let transport = MockTransport::new().with_failure("/matches/m1/stats");
        let (client, _) = client_with(transport);

        assert!(client.fetch_match_detail("m1", true).await.is_none());
    }

    #[tokio::test]
    async fn test_lifetime_stats_cached() {
        let payload = json!({ "lifetime": { "Matches": "412" } });
        let transport =
            Arc::new(MockTransport::new().with_response("/players/p-123/stats/cs2", payload));
        let cache = Arc::new(CacheStore::new());
        let client = FaceitClient::new(transport.clone(), cache, CacheConfig::default());

        client.fetch_lifetime_stats("p-123", true).await.unwrap();
        client.fetch_lifetime_stats("p-123", true).await.unwrap();

        assert_eq!(transport.calls_to("/players/p-123/stats/cs2"), 1);
    }

    #[tokio::test]
    async fn test_invalidate_history_forces_refetch() {
        let items = json!({ "items": [{ "match_id": "m1" }] });
        let transport =
            Arc::new(MockTransport::new().with_response("/players/p-123/history", items));
        let cache = Arc::new(CacheStore::new());
        let client = FaceitClient::new(transport.clone(), cache, CacheConfig::default());

        client.fetch_history("p-123", 20, true).await.unwrap();
        client.invalidate_history("p-123", 20);
        client.fetch_history("p-123", 20, true).await.unwrap();

        assert_eq!(transport.calls_to("/players/p-123/history"), 2);
    }
}
