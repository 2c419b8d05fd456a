use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::error::PropError;
use crate::http_client::http_client;
use crate::state::{Market, PropLine};

const ODDS_BASE: &str = "https://api.the-odds-api.com/v4";
const SPORT_KEY: &str = "basketball_nba";

/// Preferred books, in order. Falls back to whatever the event offers.
const BOOKMAKER_PRIORITY: [&str; 4] = ["draftkings", "fanduel", "betmgm", "caesars"];

/// Lines may not be posted for today yet; when nothing matches the date we
/// take the nearest upcoming events, capped.
const UPCOMING_EVENT_CAP: usize = 12;

/// One NBA event as listed by the odds provider.
#[derive(Debug, Clone, Deserialize)]
pub struct OddsEventRef {
    pub id: String,
    pub commence_time: String,
    pub home_team: String,
    pub away_team: String,
}

impl OddsEventRef {
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

#[derive(Debug, Deserialize)]
struct EventOddsDoc {
    #[serde(default)]
    bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsBookmaker {
    key: String,
    title: String,
    #[serde(default)]
    markets: Vec<OddsMarket>,
}

#[derive(Debug, Deserialize)]
struct OddsMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<OddsOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsOutcome {
    name: String,
    /// Player name for player-prop markets.
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    point: Option<f64>,
}

/// Fetch the event list and keep today's slate (or the nearest upcoming
/// events when nothing commences today). An empty result is valid, not an
/// error.
pub fn fetch_events_for_date(api_key: &str, today: NaiveDate) -> Result<Vec<OddsEventRef>> {
    let url = format!("{ODDS_BASE}/sports/{SPORT_KEY}/events");
    let client = http_client()?;
    let resp = client
        .get(&url)
        .query(&[("apiKey", api_key), ("dateFormat", "iso")])
        .header(USER_AGENT, "propedge/0.1")
        .send()
        .context("odds events request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading odds events body")?;
    check_odds_status(status, &body)?;

    let events = parse_events_json(&body)?;
    Ok(filter_events_for_date(events, today))
}

/// Fetch player-prop lines for one event.
pub fn fetch_event_props(
    api_key: &str,
    regions: &str,
    event: &OddsEventRef,
) -> Result<Vec<PropLine>> {
    let url = format!("{ODDS_BASE}/sports/{SPORT_KEY}/events/{}/odds", event.id);
    let markets = Market::ALL
        .iter()
        .map(|m| m.odds_api_key())
        .collect::<Vec<_>>()
        .join(",");

    let client = http_client()?;
    let resp = client
        .get(&url)
        .query(&[
            ("apiKey", api_key),
            ("regions", regions),
            ("oddsFormat", "american"),
            ("markets", markets.as_str()),
        ])
        .header(USER_AGENT, "propedge/0.1")
        .send()
        .context("event odds request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading event odds body")?;
    check_odds_status(status, &body)?;

    parse_event_props_json(&body, event)
}

fn check_odds_status(status: StatusCode, body: &str) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PropError::Auth(format!("odds http {}: {}", status, snippet(body))).into());
    }
    if !status.is_success() {
        return Err(anyhow::anyhow!("odds http {}: {}", status, snippet(body)));
    }
    Ok(())
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(220)
        .collect()
}

pub fn parse_events_json(body: &str) -> Result<Vec<OddsEventRef>> {
    let events: Option<Vec<OddsEventRef>> =
        serde_json::from_str(body).context("invalid odds events json")?;
    Ok(events.unwrap_or_default())
}

/// The events endpoint returns upcoming events beyond today; keep today's,
/// or fall back to the nearest upcoming slate (original day-before behavior).
pub fn filter_events_for_date(events: Vec<OddsEventRef>, today: NaiveDate) -> Vec<OddsEventRef> {
    let today_str = today.format("%Y-%m-%d").to_string();
    let todays: Vec<OddsEventRef> = events
        .iter()
        .filter(|e| e.commence_time.get(..10) == Some(today_str.as_str()))
        .cloned()
        .collect();
    if !todays.is_empty() {
        return todays;
    }
    events.into_iter().take(UPCOMING_EVENT_CAP).collect()
}

/// Parse one event-odds document into prop lines: pick the highest-priority
/// bookmaker, then keep only Over outcomes that carry a player name and a
/// posted point.
pub fn parse_event_props_json(body: &str, event: &OddsEventRef) -> Result<Vec<PropLine>> {
    let doc: Option<EventOddsDoc> =
        serde_json::from_str(body).context("invalid event odds json")?;
    let Some(doc) = doc else {
        return Ok(Vec::new());
    };

    let Some(book) = pick_bookmaker(&doc.bookmakers) else {
        return Ok(Vec::new());
    };

    let mut props = Vec::new();
    for market_block in &book.markets {
        let Some(market) = Market::from_odds_api_key(&market_block.key) else {
            continue;
        };
        for outcome in &market_block.outcomes {
            if outcome.name != "Over" {
                continue;
            }
            let Some(player) = outcome
                .description
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
            else {
                continue;
            };
            let Some(line) = outcome.point else {
                continue;
            };
            props.push(PropLine {
                event_id: event.id.clone(),
                player: player.to_string(),
                market,
                line,
                over_odds: outcome.price.map(|p| p.round() as i32).unwrap_or(-110),
                home_team: event.home_team.clone(),
                away_team: event.away_team.clone(),
                bookmaker: book.title.clone(),
            });
        }
    }
    Ok(props)
}

fn pick_bookmaker(bookmakers: &[OddsBookmaker]) -> Option<&OddsBookmaker> {
    for pref in BOOKMAKER_PRIORITY {
        if let Some(book) = bookmakers.iter().find(|b| b.key == pref) {
            return Some(book);
        }
    }
    bookmakers.first()
}
