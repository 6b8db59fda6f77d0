use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::engine::EloRun;

pub struct ExportReport {
    pub history_rows: usize,
    pub rating_rows: usize,
}

/// Writes the run as a workbook with a `History` and a `Ratings` sheet.
pub fn export_run_xlsx(path: &Path, run: &EloRun) -> Result<ExportReport> {
    let history_rows = history_rows(run);
    let rating_rows = rating_rows(run);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("History")?;
        write_rows(sheet, &history_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Ratings")?;
        write_rows(sheet, &rating_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        history_rows: history_rows.len() - 1,
        rating_rows: rating_rows.len() - 1,
    })
}

pub fn history_rows(run: &EloRun) -> Vec<Vec<String>> {
    let mut rows = vec![
        [
            "Date",
            "Home",
            "Away",
            "HG",
            "AG",
            "Result",
            "Home Pre",
            "Away Pre",
            "P Home",
            "P Draw",
            "P Away",
            "Home Post",
            "Away Post",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>(),
    ];

    for e in &run.trace {
        rows.push(vec![
            e.record.date.format("%Y-%m-%d").to_string(),
            e.record.home_team.clone(),
            e.record.away_team.clone(),
            e.record.home_goals.to_string(),
            e.record.away_goals.to_string(),
            e.record.result.label().to_string(),
            format!("{:.1}", e.r_home_pre),
            format!("{:.1}", e.r_away_pre),
            format!("{:.4}", e.probs.home),
            format!("{:.4}", e.probs.draw),
            format!("{:.4}", e.probs.away),
            format!("{:.1}", e.r_home_post),
            format!("{:.1}", e.r_away_post),
        ]);
    }
    rows
}

pub fn rating_rows(run: &EloRun) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Rank".to_string(),
        "Team".to_string(),
        "Rating".to_string(),
    ]];
    for (idx, (team, rating)) in run.final_ratings.leaderboard().into_iter().enumerate() {
        rows.push(vec![(idx + 1).to_string(), team, format!("{rating:.1}")]);
    }
    rows
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
