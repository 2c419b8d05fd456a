use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::Value;

use crate::error::PropError;
use crate::http_client::http_client;
use crate::rate_limit::Pacer;
use crate::state::GameLog;

const STATS_BASE: &str = "https://stats.nba.com/stats";
const STATS_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// stats.nba.com throttles aggressively; retry a couple of times with a
/// longer pause before giving up on one player.
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// One row of the league-wide player index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub id: u64,
    pub name: String,
}

/// Tabular payload shape shared by every stats.nba.com endpoint.
#[derive(Debug, Deserialize)]
struct StatsDoc {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    name: String,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("stats payload missing column {name}"))
    }
}

/// Per-run game-log source: fetches the player index once, paces and retries
/// per-player log requests, and caches results so a player with several
/// props is fetched once.
pub struct GameLogSource {
    season: String,
    pacer: Pacer,
    index: Option<Vec<PlayerEntry>>,
    cache: HashMap<u64, Option<Vec<GameLog>>>,
}

impl GameLogSource {
    pub fn new(season: String, pacer: Pacer) -> Self {
        Self {
            season,
            pacer,
            index: None,
            cache: HashMap::new(),
        }
    }

    /// The current-season player index, fetched lazily and kept for the run.
    pub fn player_index(&mut self) -> Result<&[PlayerEntry]> {
        if self.index.is_none() {
            self.pacer.pause();
            let body = fetch_stats_endpoint(
                "commonallplayers",
                &[
                    ("LeagueID", "00"),
                    ("Season", self.season.as_str()),
                    ("IsOnlyCurrentSeason", "1"),
                ],
            )?;
            self.index = Some(parse_player_index_json(&body)?);
        }
        Ok(self.index.as_deref().unwrap_or_default())
    }

    /// Game logs for one player, most recent first. A player whose fetch
    /// already failed this run stays failed; the caller drops their props.
    pub fn game_logs(&mut self, player_id: u64) -> Result<Vec<GameLog>> {
        if let Some(cached) = self.cache.get(&player_id) {
            return match cached {
                Some(logs) => Ok(logs.clone()),
                None => Err(anyhow::anyhow!(
                    "player {player_id} already failed this run"
                )),
            };
        }

        let result = self.fetch_with_retry(player_id);
        match &result {
            Ok(logs) => {
                self.cache.insert(player_id, Some(logs.clone()));
            }
            Err(_) => {
                self.cache.insert(player_id, None);
            }
        }
        result
    }

    fn fetch_with_retry(&mut self, player_id: u64) -> Result<Vec<GameLog>> {
        let mut last_err = None;
        for attempt in 0..MAX_FETCH_ATTEMPTS {
            if attempt > 0 {
                // Longer pause when the provider pushed back.
                std::thread::sleep(self.pacer.min_interval() * 2 * attempt);
            }
            self.pacer.pause();
            match self.fetch_once(player_id) {
                Ok(logs) => return Ok(logs),
                // A malformed payload will not improve on refetch; only
                // throttling and transport failures are worth another try.
                Err(err) if !is_retryable(&err) => return Err(err),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            anyhow::anyhow!("game log fetch failed for player {player_id}")
        }))
    }

    fn fetch_once(&self, player_id: u64) -> Result<Vec<GameLog>> {
        let player_id = player_id.to_string();
        let body = fetch_stats_endpoint(
            "playergamelog",
            &[
                ("PlayerID", player_id.as_str()),
                ("Season", self.season.as_str()),
                ("SeasonType", "Regular Season"),
            ],
        )?;
        parse_game_log_json(&body)
    }
}

fn is_retryable(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<PropError>(),
        Some(PropError::RateLimited(_))
    ) || err.downcast_ref::<reqwest::Error>().is_some()
}

fn fetch_stats_endpoint(endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
    let url = format!("{STATS_BASE}/{endpoint}");
    let client = http_client()?;
    let resp = client
        .get(&url)
        .query(params)
        .header(USER_AGENT, STATS_USER_AGENT)
        .header("Referer", "https://www.nba.com/")
        .header("Origin", "https://www.nba.com")
        .header("x-nba-stats-origin", "stats")
        .header("x-nba-stats-token", "true")
        .send()
        .with_context(|| format!("stats {endpoint} request failed"))?;
    let status = resp.status();
    let body = resp
        .text()
        .with_context(|| format!("failed reading stats {endpoint} body"))?;
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PropError::RateLimited(format!("stats http {status}")).into());
    }
    if !status.is_success() {
        return Err(anyhow::anyhow!("stats http {status} on {endpoint}"));
    }
    Ok(body)
}

pub fn parse_player_index_json(body: &str) -> Result<Vec<PlayerEntry>> {
    let doc: StatsDoc = serde_json::from_str(body).context("invalid player index json")?;
    let set = doc
        .result_sets
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case("CommonAllPlayers"))
        .or_else(|| doc.result_sets.first())
        .context("player index payload has no result sets")?;

    let id_col = set.column("PERSON_ID")?;
    let name_col = set.column("DISPLAY_FIRST_LAST")?;

    let mut out = Vec::with_capacity(set.row_set.len());
    for (row_idx, row) in set.row_set.iter().enumerate() {
        let id = cell_u64(row, id_col)
            .with_context(|| format!("player index row {row_idx}: bad PERSON_ID"))?;
        let name = cell_str(row, name_col)
            .with_context(|| format!("player index row {row_idx}: bad DISPLAY_FIRST_LAST"))?;
        if name.is_empty() {
            continue;
        }
        out.push(PlayerEntry { id, name });
    }
    Ok(out)
}

/// Parse a playergamelog payload, validating every tracked column, and
/// normalize ordering to most recent first regardless of provider order.
pub fn parse_game_log_json(body: &str) -> Result<Vec<GameLog>> {
    let doc: StatsDoc = serde_json::from_str(body).context("invalid game log json")?;
    let set = doc
        .result_sets
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case("PlayerGameLog"))
        .or_else(|| doc.result_sets.first())
        .context("game log payload has no result sets")?;

    let date_col = set.column("GAME_DATE")?;
    let matchup_col = set.column("MATCHUP")?;
    let min_col = set.column("MIN")?;
    let pts_col = set.column("PTS")?;
    let reb_col = set.column("REB")?;
    let ast_col = set.column("AST")?;
    let stl_col = set.column("STL")?;
    let blk_col = set.column("BLK")?;

    let mut logs = Vec::with_capacity(set.row_set.len());
    for (row_idx, row) in set.row_set.iter().enumerate() {
        let ctx = |col: &str| format!("game log row {row_idx}: bad {col}");
        logs.push(GameLog {
            date: cell_str(row, date_col).with_context(|| ctx("GAME_DATE"))?,
            matchup: cell_str(row, matchup_col).with_context(|| ctx("MATCHUP"))?,
            minutes: cell_f64(row, min_col).with_context(|| ctx("MIN"))?,
            points: cell_f64(row, pts_col).with_context(|| ctx("PTS"))?,
            rebounds: cell_f64(row, reb_col).with_context(|| ctx("REB"))?,
            assists: cell_f64(row, ast_col).with_context(|| ctx("AST"))?,
            steals: cell_f64(row, stl_col).with_context(|| ctx("STL"))?,
            blocks: cell_f64(row, blk_col).with_context(|| ctx("BLK"))?,
        });
    }

    sort_most_recent_first(&mut logs);
    Ok(logs)
}

fn sort_most_recent_first(logs: &mut [GameLog]) {
    // Provider sends most recent first today; sorting makes that explicit
    // instead of an assumption. A row whose date cannot be parsed sorts as
    // oldest so it can never claim a slot in the recent window.
    logs.sort_by_key(|g| {
        std::cmp::Reverse(parse_game_date(&g.date).unwrap_or(NaiveDate::MIN))
    });
}

fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in ["%b %d, %Y", "%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    None
}

fn cell_str(row: &[Value], col: usize) -> Result<String> {
    match row.get(col) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        other => Err(anyhow::anyhow!("expected string, got {other:?}")),
    }
}

fn cell_u64(row: &[Value], col: usize) -> Result<u64> {
    match row.get(col) {
        Some(Value::Number(n)) => n.as_u64().context("not an unsigned integer"),
        Some(Value::String(s)) => s.trim().parse::<u64>().context("not an unsigned integer"),
        other => Err(anyhow::anyhow!("expected number, got {other:?}")),
    }
}

/// Stat cells are usually numbers but arrive as strings in some payloads;
/// null counts as zero (a did-not-record stat line, matching the original).
fn cell_f64(row: &[Value], col: usize) -> Result<f64> {
    match row.get(col) {
        Some(Value::Number(n)) => n.as_f64().context("not a finite number"),
        Some(Value::String(s)) => s.trim().parse::<f64>().context("not a finite number"),
        Some(Value::Null) => Ok(0.0),
        other => Err(anyhow::anyhow!("expected number, got {other:?}")),
    }
}
