use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;

use crate::config::AppConfig;
use crate::error::PropError;
use crate::export;
use crate::gamelog_fetch::GameLogSource;
use crate::join::{join_props, resolve_entry};
use crate::odds_fetch;
use crate::rate_limit::Pacer;
use crate::report::{TOP_PICK_SCORE, sort_scored, write_report};
use crate::scoring::score_prop;
use crate::state::{GameLog, ScoredProp};

/// What one run produced, for the closing console summary.
#[derive(Debug)]
pub struct RunSummary {
    pub events: usize,
    pub prop_lines: usize,
    pub players_looked_up: usize,
    pub players_dropped: usize,
    pub props_scored: usize,
    pub top_picks: usize,
    pub report_path: PathBuf,
    pub xlsx_path: Option<PathBuf>,
}

/// Full pipeline: events → prop lines → game logs → join → score → report.
///
/// Only an authentication failure aborts the run. A date with no games or
/// no posted lines completes successfully with an empty report; any
/// per-event or per-player failure drops that event or player and keeps
/// going.
pub fn run_analysis(
    config: &AppConfig,
    mut on_progress: impl FnMut(String),
) -> Result<RunSummary> {
    let now = Local::now().naive_local();
    let today = now.date();

    on_progress(format!("Fetching NBA events for {today}..."));
    let events = odds_fetch::fetch_events_for_date(&config.odds_api_key, today)?;
    if events.is_empty() {
        let note = PropError::NoData(format!("no NBA games scheduled for {today}"));
        on_progress(format!("{note}; writing an empty report"));
        return finish(config, Vec::new(), 0, 0, 0, 0, &mut on_progress);
    }
    on_progress(format!("{} games found", events.len()));

    let mut odds_pacer = Pacer::new(config.odds_delay);
    let mut props = Vec::new();
    for (i, event) in events.iter().enumerate() {
        odds_pacer.pause();
        match odds_fetch::fetch_event_props(&config.odds_api_key, &config.regions, event) {
            Ok(lines) => {
                on_progress(format!(
                    "[{}/{}] {} — {} props",
                    i + 1,
                    events.len(),
                    event.matchup(),
                    lines.len()
                ));
                props.extend(lines);
            }
            Err(err) => {
                if is_fatal(&err) {
                    return Err(err);
                }
                on_progress(format!(
                    "[{}/{}] {} — skipped ({err:#})",
                    i + 1,
                    events.len(),
                    event.matchup()
                ));
            }
        }
    }

    if props.is_empty() {
        let note = PropError::NoData("no prop lines posted yet".to_string());
        on_progress(format!("{note}; writing an empty report"));
        return finish(config, Vec::new(), events.len(), 0, 0, 0, &mut on_progress);
    }

    // Deterministic lookup order.
    let unique_players: BTreeSet<String> = props.iter().map(|p| p.player.clone()).collect();
    on_progress(format!(
        "{} prop lines across {} players; pulling game logs...",
        props.len(),
        unique_players.len()
    ));

    let mut source = GameLogSource::new(config.season.clone(), Pacer::new(config.stats_delay));
    let index = match source.player_index() {
        Ok(index) => index.to_vec(),
        Err(err) => {
            // No index means no player can be resolved; the run still ends
            // with a (necessarily empty) report rather than a hard failure.
            on_progress(format!("Stats provider unavailable ({err:#})"));
            Vec::new()
        }
    };

    let mut logs_by_player: HashMap<String, Vec<GameLog>> = HashMap::new();
    let mut dropped = 0usize;
    for (i, player) in unique_players.iter().enumerate() {
        let Some(entry) = resolve_entry(player, &index) else {
            let note = PropError::Resolution(player.clone());
            on_progress(format!(
                "[{}/{}] dropped: {note}",
                i + 1,
                unique_players.len()
            ));
            dropped += 1;
            continue;
        };
        match source.game_logs(entry.id) {
            Ok(logs) if logs.len() >= config.min_games => {
                on_progress(format!(
                    "[{}/{}] {player} — {} games",
                    i + 1,
                    unique_players.len(),
                    logs.len()
                ));
                logs_by_player.insert(entry.name.clone(), logs);
            }
            Ok(logs) => {
                on_progress(format!(
                    "[{}/{}] {player} — only {} games (need {}), dropped",
                    i + 1,
                    unique_players.len(),
                    logs.len(),
                    config.min_games
                ));
                dropped += 1;
            }
            Err(err) => {
                on_progress(format!(
                    "[{}/{}] {player} — fetch failed, dropped ({err:#})",
                    i + 1,
                    unique_players.len()
                ));
                dropped += 1;
            }
        }
    }

    let joined = join_props(&props, &logs_by_player, config.min_games);
    let mut scored: Vec<ScoredProp> = joined
        .iter()
        .filter_map(|j| score_prop(&j.prop, &j.logs, config.window_games, config.near_tolerance))
        .collect();
    sort_scored(&mut scored);

    finish(
        config,
        scored,
        events.len(),
        props.len(),
        unique_players.len(),
        dropped,
        &mut on_progress,
    )
}

fn finish(
    config: &AppConfig,
    scored: Vec<ScoredProp>,
    events: usize,
    prop_lines: usize,
    players_looked_up: usize,
    players_dropped: usize,
    on_progress: &mut impl FnMut(String),
) -> Result<RunSummary> {
    let now = Local::now().naive_local();
    let report_path = write_report(&config.report_dir, &scored, now)?;
    let xlsx_path = if config.export_xlsx {
        let path = export::export_xlsx(&config.report_dir, &scored, now)?;
        on_progress(format!("Workbook written to {}", path.display()));
        Some(path)
    } else {
        None
    };

    let top_picks = scored
        .iter()
        .filter(|p| p.metrics.score >= TOP_PICK_SCORE)
        .count();
    Ok(RunSummary {
        events,
        prop_lines,
        players_looked_up,
        players_dropped,
        props_scored: scored.len(),
        top_picks,
        report_path,
        xlsx_path,
    })
}

fn is_fatal(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PropError>()
        .is_some_and(PropError::is_fatal)
}
