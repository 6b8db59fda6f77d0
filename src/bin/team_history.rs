use anyhow::{Result, anyhow};

use laliga_elo::config::{self, RunSettings};
use laliga_elo::{engine, history_store, preview};

const DEFAULT_RECENT: usize = 10;

fn main() -> Result<()> {
    config::load_dotenv();
    laliga_elo::init_tracing();

    let args = config::cli_args();
    let settings = RunSettings::resolve(&args)?;
    let team = config::arg_value(&args, "--team")
        .ok_or_else(|| anyhow!("usage: team_history --team <name> [--recent N] [--series]"))?;
    let recent_n = config::parse_usize_arg(&args, "--recent").unwrap_or(DEFAULT_RECENT);

    let conn = history_store::open_db(&settings.db_path)?;
    let run = history_store::load_latest(&conn)?;

    let Some(rating) = run.final_ratings.get(&team) else {
        return Err(anyhow!("{team:?} does not appear in the stored run"));
    };
    println!("{team}: {rating:.1}");

    if config::has_flag(&args, "--series") {
        println!();
        println!("Rating after each match:");
        for point in engine::team_series(&run.trace, &team) {
            println!("  {}  {:>7.1}", point.date.format("%Y-%m-%d"), point.rating);
        }
    }

    println!();
    println!("Recent matches:");
    for e in preview::recent_matches(&run.trace, &team, recent_n) {
        let (pre, post) = if e.record.home_team == team {
            (e.r_home_pre, e.r_home_post)
        } else {
            (e.r_away_pre, e.r_away_post)
        };
        println!(
            "  {}  {:<22} {}-{} {:<22} {:>7.1} -> {:>7.1}",
            e.record.date.format("%Y-%m-%d"),
            e.record.home_team,
            e.record.home_goals,
            e.record.away_goals,
            e.record.away_team,
            pre,
            post
        );
    }

    Ok(())
}
