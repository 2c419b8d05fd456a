use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::state::ScoredProp;

/// Write the ranked props and their per-game rows to an XLSX workbook next
/// to the HTML report. Expects the props already sorted.
pub fn export_xlsx(dir: &Path, scored: &[ScoredProp], now: NaiveDateTime) -> Result<PathBuf> {
    let filename = format!("propedge_{}.xlsx", now.format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);

    let mut props_rows = vec![vec![
        "Rank".to_string(),
        "Player".to_string(),
        "Game".to_string(),
        "Market".to_string(),
        "Line".to_string(),
        "Over Odds".to_string(),
        "Bookmaker".to_string(),
        "Hits".to_string(),
        "Near".to_string(),
        "Games".to_string(),
        "Hit Rate".to_string(),
        "Near Rate".to_string(),
        "Avg Margin".to_string(),
        "Std Dev".to_string(),
        "Last 5 Avg".to_string(),
        "Score".to_string(),
    ]];

    let mut detail_rows = vec![vec![
        "Rank".to_string(),
        "Player".to_string(),
        "Market".to_string(),
        "Date".to_string(),
        "Matchup".to_string(),
        "Minutes".to_string(),
        "Value".to_string(),
        "Margin".to_string(),
        "Result".to_string(),
    ]];

    for (i, sp) in scored.iter().enumerate() {
        let rank = (i + 1).to_string();
        let m = &sp.metrics;
        props_rows.push(vec![
            rank.clone(),
            sp.prop.player.clone(),
            sp.prop.matchup(),
            sp.prop.market.label().to_string(),
            sp.prop.line.to_string(),
            sp.prop.over_odds.to_string(),
            sp.prop.bookmaker.clone(),
            m.hits.to_string(),
            m.nears.to_string(),
            m.games.to_string(),
            format!("{:.3}", m.hit_rate),
            format!("{:.3}", m.near_rate),
            format!("{:.2}", m.avg_margin),
            format!("{:.2}", m.std_dev),
            format!("{:.2}", m.last5_avg_margin),
            format!("{:.1}", m.score),
        ]);

        for d in &sp.details {
            detail_rows.push(vec![
                rank.clone(),
                sp.prop.player.clone(),
                sp.prop.market.label().to_string(),
                d.date.clone(),
                d.matchup.clone(),
                format!("{:.0}", d.minutes),
                d.value.to_string(),
                format!("{:+.1}", d.margin),
                d.outcome.label().to_string(),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Props")?;
        write_rows(sheet, &props_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("GameLogs")?;
        write_rows(sheet, &detail_rows)?;
    }
    workbook
        .save(&path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(path)
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
