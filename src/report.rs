use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::state::{GameOutcome, ScoredProp};

/// Score bands used for the summary counts.
pub const TOP_PICK_SCORE: f64 = 60.0;
const MODERATE_SCORE: f64 = 45.0;

/// Rank props for the report: confidence score descending, ties broken by
/// hit rate descending, then player name ascending. Fully deterministic, so
/// identical inputs order identically across runs.
pub fn sort_scored(props: &mut [ScoredProp]) {
    props.sort_by(|a, b| {
        b.metrics
            .score
            .total_cmp(&a.metrics.score)
            .then(b.metrics.hit_rate.total_cmp(&a.metrics.hit_rate))
            .then(a.prop.player.cmp(&b.prop.player))
    });
}

/// Write the ranked report, named with the run timestamp. Zero props still
/// produces a valid document.
pub fn write_report(dir: &Path, scored: &[ScoredProp], now: NaiveDateTime) -> Result<PathBuf> {
    let filename = format!("propedge_{}.html", now.format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    let html = render_html(scored, now);
    fs::write(&path, html).with_context(|| format!("failed writing report {}", path.display()))?;
    Ok(path)
}

pub fn render_html(scored: &[ScoredProp], now: NaiveDateTime) -> String {
    let top = scored
        .iter()
        .filter(|p| p.metrics.score >= TOP_PICK_SCORE)
        .count();
    let moderate = scored
        .iter()
        .filter(|p| p.metrics.score >= MODERATE_SCORE && p.metrics.score < TOP_PICK_SCORE)
        .count();

    let mut out = String::with_capacity(4096 + scored.len() * 2048);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"UTF-8\">\n");
    out.push_str(&format!(
        "<title>PropEdge NBA — {}</title>\n",
        now.format("%b %d, %Y")
    ));
    out.push_str(
        "<style>\n\
         body{font-family:system-ui,sans-serif;background:#0b0b14;color:#e2e2f0;margin:0}\n\
         header{padding:16px 24px;border-bottom:1px solid #22223a}\n\
         .summary{padding:12px 24px;color:#8888aa}\n\
         table{width:100%;border-collapse:collapse;font-size:14px}\n\
         th{padding:8px;text-align:left;color:#6b6b8a;font-size:11px;letter-spacing:1px}\n\
         td{padding:8px;border-bottom:1px solid #181828}\n\
         tr.prop{cursor:pointer}\n\
         tr.detail{display:none;background:#10101c}\n\
         .hit{color:#34d399}.near{color:#fbbf24}.miss{color:#f87171}\n\
         .score{font-weight:700}\n\
         </style>\n\
         <script>function toggle(id){var el=document.getElementById(id);\
         el.style.display=el.style.display==='table-row'?'none':'table-row';}</script>\n\
         </head><body>\n",
    );
    out.push_str(&format!(
        "<header><h1>PropEdge NBA</h1><p>{} — Over props, ranked by confidence</p></header>\n",
        now.format("%A, %B %d, %Y")
    ));
    out.push_str(&format!(
        "<div class=\"summary\">{} props — {} top picks (60+), {} moderate (45–59)</div>\n",
        scored.len(),
        top,
        moderate
    ));

    if scored.is_empty() {
        out.push_str("<div class=\"summary\">No props scored for this date.</div>\n");
        out.push_str("</body></html>\n");
        return out;
    }

    out.push_str(
        "<table><thead><tr>\
         <th>#</th><th>Player</th><th>Game</th><th>Market</th><th>Line</th><th>Odds</th>\
         <th>Hits</th><th>Near</th><th>Avg Margin</th><th>Std Dev</th><th>Last 5</th><th>Score</th>\
         </tr></thead><tbody>\n",
    );

    for (i, sp) in scored.iter().enumerate() {
        let rank = i + 1;
        let m = &sp.metrics;
        out.push_str(&format!(
            "<tr class=\"prop\" onclick=\"toggle('d{rank}')\">\
             <td>{rank}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}/{}</td><td>{}/{}</td><td>{:+.2}</td><td>{:.2}</td><td>{:+.2}</td>\
             <td class=\"score\">{:.1}</td></tr>\n",
            escape(&sp.prop.player),
            escape(&sp.prop.matchup()),
            sp.prop.market.label(),
            sp.prop.line,
            format_odds(sp.prop.over_odds),
            m.hits,
            m.games,
            m.nears,
            m.games,
            m.avg_margin,
            m.std_dev,
            m.last5_avg_margin,
            m.score,
        ));

        out.push_str(&format!(
            "<tr class=\"detail\" id=\"d{rank}\"><td colspan=\"12\"><table>\
             <thead><tr><th>Date</th><th>Matchup</th><th>Min</th><th>Value</th>\
             <th>Margin</th><th>Result</th></tr></thead><tbody>\n",
        ));
        for d in &sp.details {
            let class = match d.outcome {
                GameOutcome::Hit => "hit",
                GameOutcome::Near => "near",
                GameOutcome::Miss => "miss",
            };
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{:.0}</td><td>{}</td>\
                 <td class=\"{class}\">{:+.1}</td><td class=\"{class}\">{}</td></tr>\n",
                escape(&d.date),
                escape(&d.matchup),
                d.minutes,
                d.value,
                d.margin,
                d.outcome.label(),
            ));
        }
        out.push_str("</tbody></table></td></tr>\n");
    }

    out.push_str("</tbody></table>\n");
    out.push_str(
        "<footer class=\"summary\">Data: NBA.com + The Odds API — click a row for the last games \
         — for informational purposes only</footer>\n</body></html>\n",
    );
    out
}

fn format_odds(odds: i32) -> String {
    if odds > 0 {
        format!("+{odds}")
    } else {
        odds.to_string()
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::{escape, format_odds};

    #[test]
    fn positive_odds_get_a_plus_sign() {
        assert_eq!(format_odds(120), "+120");
        assert_eq!(format_odds(-110), "-110");
    }

    #[test]
    fn html_entities_are_escaped() {
        assert_eq!(escape("O'Neal & <co>"), "O'Neal &amp; &lt;co&gt;");
    }
}
