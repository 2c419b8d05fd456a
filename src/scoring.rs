use crate::state::{GameDetail, GameLog, GameOutcome, PropLine, PropMetrics, ScoredProp};

/// Weights of the composite confidence score. The score is a deterministic
/// pure function of (hit rate, near-miss rate, average margin, std dev):
///
///   40·hit_rate + 15·near_rate + 25·margin_norm + 20·consistency
///
/// where margin_norm = clamp((avg_margin + 10) / 20, 0, 1) and
/// consistency = max(0, 1 − std_dev / 10). Every term is non-negative and
/// the sum is bounded by 100, so the score lives in [0, 100]. It rises with
/// hit rate and average margin and falls with variability; a perfectly
/// consistent player (std dev 0) earns the full consistency term with no
/// division by the deviation.
const HIT_WEIGHT: f64 = 40.0;
const NEAR_WEIGHT: f64 = 15.0;
const MARGIN_WEIGHT: f64 = 25.0;
const CONSISTENCY_WEIGHT: f64 = 20.0;

const MARGIN_NORM_SPAN: f64 = 10.0;
const CONSISTENCY_SPAN: f64 = 10.0;

pub fn confidence_score(hit_rate: f64, near_rate: f64, avg_margin: f64, std_dev: f64) -> f64 {
    let margin_norm = ((avg_margin + MARGIN_NORM_SPAN) / (2.0 * MARGIN_NORM_SPAN)).clamp(0.0, 1.0);
    let consistency = (1.0 - std_dev / CONSISTENCY_SPAN).max(0.0);
    HIT_WEIGHT * hit_rate
        + NEAR_WEIGHT * near_rate
        + MARGIN_WEIGHT * margin_norm
        + CONSISTENCY_WEIGHT * consistency
}

/// Score one prop against its most-recent-first history, truncated to the
/// last `window` games. Returns `None` for an empty history so a
/// `ScoredProp` always carries a non-empty detail sequence.
pub fn score_prop(
    prop: &PropLine,
    logs: &[GameLog],
    window: usize,
    near_tolerance: f64,
) -> Option<ScoredProp> {
    let recent = &logs[..logs.len().min(window)];
    if recent.is_empty() {
        return None;
    }

    let details: Vec<GameDetail> = recent
        .iter()
        .map(|g| {
            // Combination markets are summed per game before anything is
            // aggregated.
            let value = g.market_value(prop.market);
            let margin = value - prop.line;
            let outcome = classify_margin(margin, near_tolerance);
            GameDetail {
                date: g.date.clone(),
                matchup: g.matchup.clone(),
                minutes: g.minutes,
                value,
                margin,
                outcome,
            }
        })
        .collect();

    let n = details.len();
    let hits = details
        .iter()
        .filter(|d| d.outcome == GameOutcome::Hit)
        .count();
    let nears = details
        .iter()
        .filter(|d| d.outcome == GameOutcome::Near)
        .count();

    let avg_margin = details.iter().map(|d| d.margin).sum::<f64>() / n as f64;
    let std_dev = population_std_dev(details.iter().map(|d| d.value));

    let last5 = &details[..n.min(5)];
    let last5_avg_margin = last5.iter().map(|d| d.margin).sum::<f64>() / last5.len() as f64;

    let hit_rate = hits as f64 / n as f64;
    let near_rate = nears as f64 / n as f64;
    let score = confidence_score(hit_rate, near_rate, avg_margin, std_dev);

    Some(ScoredProp {
        prop: prop.clone(),
        metrics: PropMetrics {
            hits,
            nears,
            games: n,
            hit_rate,
            near_rate,
            avg_margin,
            std_dev,
            last5_avg_margin,
            score,
        },
        details,
    })
}

/// A game hits only when the value strictly exceeds the line; landing on the
/// line or within the tolerance below it is a near-miss.
fn classify_margin(margin: f64, near_tolerance: f64) -> GameOutcome {
    if margin > 0.0 {
        GameOutcome::Hit
    } else if margin >= -near_tolerance {
        GameOutcome::Near
    } else {
        GameOutcome::Miss
    }
}

/// Population standard deviation (divide by n), matching the metric the
/// report documents.
fn population_std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n == 0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    var.sqrt()
}
