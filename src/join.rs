use std::collections::HashMap;

use crate::gamelog_fetch::PlayerEntry;
use crate::state::{GameLog, PropLine};

/// A prop line matched to its player's game-log history.
#[derive(Debug, Clone)]
pub struct JoinedProp {
    pub prop: PropLine,
    pub logs: Vec<GameLog>,
}

/// Join prop lines to per-player histories. Pure: props whose player cannot
/// be resolved, or whose history is shorter than `min_games`, are silently
/// dropped.
pub fn join_props(
    props: &[PropLine],
    logs_by_player: &HashMap<String, Vec<GameLog>>,
    min_games: usize,
) -> Vec<JoinedProp> {
    // HashMap iteration order is process-random; sorted names keep the
    // resolution deterministic across runs.
    let mut names: Vec<String> = logs_by_player.keys().cloned().collect();
    names.sort();

    let mut joined = Vec::new();
    for prop in props {
        let Some(idx) = resolve_index(&prop.player, &names) else {
            continue;
        };
        let Some(logs) = logs_by_player.get(&names[idx]) else {
            continue;
        };
        if logs.len() < min_games {
            continue;
        }
        joined.push(JoinedProp {
            prop: prop.clone(),
            logs: logs.clone(),
        });
    }
    joined
}

/// Resolve a sportsbook player name against the stats-provider index.
pub fn resolve_entry<'a>(name: &str, index: &'a [PlayerEntry]) -> Option<&'a PlayerEntry> {
    let names: Vec<String> = index.iter().map(|e| e.name.clone()).collect();
    resolve_index(name, &names).map(|i| &index[i])
}

/// Resolution ladder, most to least strict:
/// 1. exact folded match with the generational suffix intact,
/// 2. exact match with suffixes removed,
/// 3. every word of the target appears in the candidate,
/// 4. unique last-name match.
///
/// The suffix-preserving rung keeps "Tim Hardaway Jr." away from a
/// plain "Tim Hardaway" when both are on the board; the folded rungs
/// tolerate case, punctuation and suffix differences, and the
/// word-containment rung absorbs simple diacritic stripping since the
/// remaining fragments are substrings.
pub fn resolve_index(target: &str, names: &[String]) -> Option<usize> {
    let target_exact = fold_name(target);
    if target_exact.is_empty() {
        return None;
    }
    if let Some(idx) = names.iter().position(|n| fold_name(n) == target_exact) {
        return Some(idx);
    }

    let target_norm = normalize_name(target);
    if target_norm.is_empty() {
        return None;
    }

    if let Some(idx) = names.iter().position(|n| normalize_name(n) == target_norm) {
        return Some(idx);
    }

    let target_words: Vec<&str> = target_norm.split_whitespace().collect();
    if let Some(idx) = names.iter().position(|n| {
        let norm = normalize_name(n);
        target_words.iter().all(|w| norm.contains(w))
    }) {
        return Some(idx);
    }

    let last = target_words.last()?;
    let matches: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, n)| {
            normalize_name(n)
                .split_whitespace()
                .next_back()
                .is_some_and(|n_last| n_last == *last)
        })
        .map(|(i, _)| i)
        .collect();
    if matches.len() == 1 {
        return Some(matches[0]);
    }
    None
}

/// Lowercased, punctuation-free words, suffixes kept.
fn fold_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased, punctuation-free words with generational suffixes removed.
pub fn normalize_name(raw: &str) -> String {
    fold_name(raw)
        .split_whitespace()
        .filter(|w| !matches!(*w, "jr" | "sr" | "ii" | "iii" | "iv" | "v"))
        .collect::<Vec<_>>()
        .join(" ")
}
