use anyhow::{Context, Result};
use tracing::info;

use laliga_elo::config::{self, RunSettings};
use laliga_elo::{engine, export, history_store, match_data};

fn main() -> Result<()> {
    config::load_dotenv();
    laliga_elo::init_tracing();

    let settings = RunSettings::resolve(&config::cli_args())?;
    let matches = match_data::load_matches_json(&settings.matches_path)?;
    let run = engine::process(&matches, settings.elo).context("elo replay failed")?;

    let mut conn = history_store::open_db(&settings.db_path)?;
    let run_id = history_store::save_run(&mut conn, &run)?;

    if let Some(path) = settings.xlsx_path.as_deref() {
        let report = export::export_run_xlsx(path, &run)?;
        info!(
            path = %path.display(),
            history = report.history_rows,
            ratings = report.rating_rows,
            "exported workbook"
        );
    }

    println!("Elo run {run_id} saved to {}", settings.db_path.display());
    println!(
        "Matches: {}  Teams: {}  K: {}  Home adv: {}",
        run.trace.len(),
        run.final_ratings.len(),
        settings.elo.k,
        settings.elo.home_adv_pts
    );
    println!();
    println!("Top {} ratings:", settings.top);
    println!("{:<4} {:<28} {:>8}", "#", "Team", "Rating");
    println!("{}", "-".repeat(42));
    for (idx, (team, rating)) in run
        .final_ratings
        .leaderboard()
        .into_iter()
        .take(settings.top)
        .enumerate()
    {
        println!("{:<4} {:<28} {:>8.1}", idx + 1, team, rating);
    }

    Ok(())
}
