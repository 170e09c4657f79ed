//! Ordered fallback extraction over loose upstream JSON.
//!
//! The upstream payload shape drifts across endpoints and API versions:
//! depending on match type a field may live on the history summary, inside
//! a nested object, or only in the match detail. Each resolver below tries
//! a fixed sequence of pure extractor functions, ordered from
//! most-specific to least-reliable; the first non-empty value wins.

use serde_json::Value;

use crate::models::{MatchResult, MatchStats};

/// Non-empty string out of a string or numeric JSON value.
fn raw_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(raw_string)
}

/// Integer coercion for stat fields, which arrive as numbers or as
/// decimal strings depending on the endpoint. Missing or unparseable
/// values default to 0.
pub fn coerce_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

// ── map name ──

fn map_from_summary_fields(summary: &Value, _rounds: &[Value]) -> Option<String> {
    field_string(summary, "game_map_name").or_else(|| field_string(summary, "i18n"))
}

fn map_from_summary_object(summary: &Value, _rounds: &[Value]) -> Option<String> {
    let map = summary.get("map")?;
    if map.is_object() {
        field_string(map, "name")
            .or_else(|| field_string(map, "i18n"))
            .or_else(|| field_string(map, "game_map_name"))
    } else {
        raw_string(map)
    }
}

fn map_from_first_round(_summary: &Value, rounds: &[Value]) -> Option<String> {
    let first = rounds.first()?;
    first
        .get("round_stats")
        .and_then(|stats| field_string(stats, "Map"))
        .or_else(|| field_string(first, "Map"))
}

fn map_from_voting(summary: &Value, _rounds: &[Value]) -> Option<String> {
    let map = summary.get("voting")?.get("map")?;
    if map.is_object() {
        field_string(map, "name").or_else(|| field_string(map, "i18n"))
    } else {
        raw_string(map)
    }
}

fn map_from_competition_name(summary: &Value, _rounds: &[Value]) -> Option<String> {
    field_string(summary, "competition_name")
}

fn map_from_any_round(_summary: &Value, rounds: &[Value]) -> Option<String> {
    rounds.iter().find_map(|round| {
        round.get("round_stats").and_then(|stats| {
            field_string(stats, "Map").or_else(|| field_string(stats, "map"))
        })
    })
}

type MapExtractor = fn(&Value, &[Value]) -> Option<String>;

const MAP_TIERS: &[MapExtractor] = &[
    map_from_summary_fields,
    map_from_summary_object,
    map_from_first_round,
    map_from_voting,
    map_from_competition_name,
    map_from_any_round,
];

/// Resolve the map name, `"N/A"` when every tier comes up empty.
pub fn resolve_map(summary: &Value, rounds: &[Value]) -> String {
    MAP_TIERS
        .iter()
        .find_map(|tier| tier(summary, rounds))
        .filter(|name| name != "Unknown")
        .unwrap_or_else(|| "N/A".to_string())
}

// ── result ──

fn result_from_team(team: &Value) -> Option<String> {
    team.get("team_stats")
        .and_then(|stats| field_string(stats, "Team Win"))
        .or_else(|| field_string(team, "Result"))
}

fn result_from_factions(summary: &Value, player_id: &str) -> Option<String> {
    let factions = summary.get("factions")?.as_object()?;

    factions.values().find_map(|faction| {
        let players = faction.get("players")?.as_array()?;
        let is_member = players
            .iter()
            .any(|p| p.get("player_id").and_then(Value::as_str) == Some(player_id));
        if !is_member {
            return None;
        }
        faction.get("stats").and_then(|stats| field_string(stats, "score"))
    })
}

/// Resolve the match outcome from the player's perspective.
///
/// `player_team` is the team block the player was located in, when any.
/// The first tier that produces a raw value decides; the raw value is then
/// normalized, so an unrecognizable explicit field classifies as Unknown
/// rather than falling through to the team-win flag.
pub fn resolve_result(
    summary: &Value,
    player_team: Option<&Value>,
    player_id: &str,
) -> MatchResult {
    let raw = field_string(summary, "game_result")
        .or_else(|| field_string(summary, "result"))
        .or_else(|| player_team.and_then(result_from_team))
        .or_else(|| result_from_factions(summary, player_id));

    match raw {
        Some(raw) => MatchResult::from_raw(&raw),
        None => MatchResult::Unknown,
    }
}

// ── timestamp ──

const SUMMARY_DATE_KEYS: &[&str] = &["started_at", "finished_at", "date", "created_at"];
const GENERIC_DATE_KEYS: &[&str] = &["timestamp", "time", "match_date", "game_date"];

/// Resolve the match timestamp; empty string when nothing is present.
/// Callers must treat empty as unknown, not as epoch zero.
pub fn resolve_timestamp(summary: &Value, rounds: &[Value]) -> String {
    let from_first_round = |rounds: &[Value]| {
        let first = rounds.first()?;
        first
            .get("round_stats")
            .and_then(|stats| field_string(stats, "Date"))
            .or_else(|| field_string(first, "Date"))
    };

    SUMMARY_DATE_KEYS
        .iter()
        .find_map(|key| field_string(summary, key))
        .or_else(|| from_first_round(rounds))
        .or_else(|| {
            GENERIC_DATE_KEYS
                .iter()
                .find_map(|key| field_string(summary, key))
        })
        .unwrap_or_default()
}

// ── player location and stats ──

/// Locate the player inside the detail's team/player nesting.
///
/// Returns the containing team block and the player's `player_stats`
/// object. A match whose detail does not contain the player yields `None`
/// and must be dropped by the caller.
pub fn locate_player<'a>(rounds: &'a [Value], player_id: &str) -> Option<(&'a Value, &'a Value)> {
    let teams = rounds.first()?.get("teams")?.as_array()?;

    for team in teams {
        let Some(players) = team.get("players").and_then(Value::as_array) else {
            continue;
        };
        for player in players {
            if player.get("player_id").and_then(Value::as_str) == Some(player_id) {
                let stats = player.get("player_stats")?;
                return Some((team, stats));
            }
        }
    }

    None
}

/// Coerce the per-player stat block into typed integers.
pub fn extract_stats(player_stats: &Value) -> MatchStats {
    MatchStats {
        kills: coerce_int(player_stats.get("Kills")),
        deaths: coerce_int(player_stats.get("Deaths")),
        assists: coerce_int(player_stats.get("Assists")),
        headshots: coerce_int(player_stats.get("Headshots")),
        mvps: coerce_int(player_stats.get("MVPs")),
        damage: coerce_int(player_stats.get("Damage")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_int_shapes() {
        assert_eq!(coerce_int(Some(&json!(21))), 21);
        assert_eq!(coerce_int(Some(&json!("14"))), 14);
        assert_eq!(coerce_int(Some(&json!(" 7 "))), 7);
        assert_eq!(coerce_int(Some(&json!("0.62"))), 0);
        assert_eq!(coerce_int(Some(&json!(null))), 0);
        assert_eq!(coerce_int(Some(&json!("garbage"))), 0);
        assert_eq!(coerce_int(None), 0);
    }

    #[test]
    fn test_map_first_tier_wins() {
        let summary = json!({
            "game_map_name": "de_dust2",
            "map": { "name": "de_mirage" },
            "competition_name": "5v5 RANKED"
        });

        assert_eq!(resolve_map(&summary, &[]), "de_dust2");
    }

    #[test]
    fn test_map_object_tier() {
        let summary = json!({ "map": { "i18n": "Ancient" } });
        assert_eq!(resolve_map(&summary, &[]), "Ancient");
    }

    #[test]
    fn test_map_bare_string_tier() {
        let summary = json!({ "map": "de_vertigo" });
        assert_eq!(resolve_map(&summary, &[]), "de_vertigo");
    }

    #[test]
    fn test_map_third_tier_from_detail() {
        // Everything before the detail tier deliberately null or absent
        let summary = json!({ "game_map_name": null, "map": null });
        let rounds = vec![json!({ "round_stats": { "Map": "de_inferno" } })];

        assert_eq!(resolve_map(&summary, &rounds), "de_inferno");
    }

    #[test]
    fn test_map_voting_tier() {
        let summary = json!({ "voting": { "map": { "name": "de_anubis" } } });
        assert_eq!(resolve_map(&summary, &[]), "de_anubis");
    }

    #[test]
    fn test_map_competition_fallback() {
        let summary = json!({ "competition_name": "ECL Season 3" });
        assert_eq!(resolve_map(&summary, &[]), "ECL Season 3");
    }

    #[test]
    fn test_map_all_tiers_empty() {
        assert_eq!(resolve_map(&json!({}), &[]), "N/A");
    }

    #[test]
    fn test_map_unknown_collapses_to_na() {
        let summary = json!({ "game_map_name": "Unknown" });
        assert_eq!(resolve_map(&summary, &[]), "N/A");
    }

    #[test]
    fn test_result_explicit_field() {
        let summary = json!({ "game_result": "victory" });
        assert_eq!(resolve_result(&summary, None, "p1"), MatchResult::Victory);
    }

    #[test]
    fn test_result_generic_field() {
        let summary = json!({ "result": "0" });
        assert_eq!(resolve_result(&summary, None, "p1"), MatchResult::Defeat);
    }

    #[test]
    fn test_result_from_team_win_flag() {
        let team = json!({ "team_stats": { "Team Win": "1" } });
        assert_eq!(
            resolve_result(&json!({}), Some(&team), "p1"),
            MatchResult::Victory
        );
    }

    #[test]
    fn test_result_explicit_field_shadows_team_flag() {
        // An unrecognizable explicit value decides as Unknown; the team
        // flag is not consulted once an earlier tier produced a value.
        let summary = json!({ "game_result": "overtime" });
        let team = json!({ "team_stats": { "Team Win": "1" } });

        assert_eq!(
            resolve_result(&summary, Some(&team), "p1"),
            MatchResult::Unknown
        );
    }

    #[test]
    fn test_result_faction_score_is_unknown() {
        let summary = json!({
            "factions": {
                "faction1": {
                    "players": [ { "player_id": "p1" } ],
                    "stats": { "score": "16 / 14" }
                }
            }
        });

        // A bare score string never matches a victory/defeat literal
        assert_eq!(resolve_result(&summary, None, "p1"), MatchResult::Unknown);
    }

    #[test]
    fn test_result_nothing_found() {
        assert_eq!(resolve_result(&json!({}), None, "p1"), MatchResult::Unknown);
    }

    #[test]
    fn test_timestamp_started_at_wins() {
        let summary = json!({ "started_at": 1719658800, "finished_at": 1719662400 });
        assert_eq!(resolve_timestamp(&summary, &[]), "1719658800");
    }

    #[test]
    fn test_timestamp_falls_through_to_finished() {
        let summary = json!({ "finished_at": "2025-06-29T12:00:00Z" });
        assert_eq!(resolve_timestamp(&summary, &[]), "2025-06-29T12:00:00Z");
    }

    #[test]
    fn test_timestamp_from_round_stats() {
        let rounds = vec![json!({ "round_stats": { "Date": "1719658800" } })];
        assert_eq!(resolve_timestamp(&json!({}), &rounds), "1719658800");
    }

    #[test]
    fn test_timestamp_generic_keys() {
        let summary = json!({ "match_date": 1719000000 });
        assert_eq!(resolve_timestamp(&summary, &[]), "1719000000");
    }

    #[test]
    fn test_timestamp_absent_is_empty() {
        assert_eq!(resolve_timestamp(&json!({}), &[]), "");
    }

    fn detail_with_player(player_id: &str) -> Vec<Value> {
        vec![json!({
            "teams": [
                {
                    "team_stats": { "Team Win": "0" },
                    "players": [
                        { "player_id": "someone-else", "player_stats": { "Kills": "3" } }
                    ]
                },
                {
                    "team_stats": { "Team Win": "1" },
                    "players": [
                        { "player_id": player_id, "player_stats": { "Kills": "21", "Deaths": "14" } }
                    ]
                }
            ]
        })]
    }

    #[test]
    fn test_locate_player_finds_team_and_stats() {
        let rounds = detail_with_player("p1");
        let (team, stats) = locate_player(&rounds, "p1").unwrap();

        assert_eq!(team["team_stats"]["Team Win"], json!("1"));
        assert_eq!(stats["Kills"], json!("21"));
    }

    #[test]
    fn test_locate_player_absent() {
        let rounds = detail_with_player("p1");
        assert!(locate_player(&rounds, "p2").is_none());
    }

    #[test]
    fn test_locate_player_empty_rounds() {
        assert!(locate_player(&[], "p1").is_none());
    }

    #[test]
    fn test_extract_stats_defaults() {
        let stats = extract_stats(&json!({ "Kills": "18", "Damage": 1620 }));

        assert_eq!(stats.kills, 18);
        assert_eq!(stats.damage, 1620);
        assert_eq!(stats.deaths, 0);
        assert_eq!(stats.headshots, 0);
    }
}
