use anyhow::{Result, anyhow};

use laliga_elo::config::{self, RunSettings};
use laliga_elo::history_store;
use laliga_elo::match_data::MatchRecord;
use laliga_elo::preview::{self, DEFAULT_FORM_WINDOW, Form};

fn main() -> Result<()> {
    config::load_dotenv();
    laliga_elo::init_tracing();

    let args = config::cli_args();
    let settings = RunSettings::resolve(&args)?;
    let conn = history_store::open_db(&settings.db_path)?;
    let run = history_store::load_latest(&conn)?;
    let history: Vec<MatchRecord> = run.trace.iter().map(|e| e.record.clone()).collect();
    let teams = preview::known_teams(&history);

    let (Some(home), Some(away)) = (
        config::arg_value(&args, "--home"),
        config::arg_value(&args, "--away"),
    ) else {
        println!("Usage: preview --home <team> --away <team> [--form N]");
        println!();
        println!("Known teams:");
        for team in &teams {
            println!("  {team}");
        }
        return Ok(());
    };
    for team in [&home, &away] {
        if !teams.contains(team) {
            return Err(anyhow!("unknown team {team:?}"));
        }
    }

    let window = config::parse_usize_arg(&args, "--form").unwrap_or(DEFAULT_FORM_WINDOW);
    // The stored run's parameters, so the preview agrees with the trace.
    let p = preview::match_preview(&run.final_ratings, &history, &home, &away, run.config, window);

    println!("{} ({:.1}) vs {} ({:.1})", p.home, p.r_home, p.away, p.r_away);
    println!("Home win: {:>5.1}%", p.probs.home * 100.0);
    println!("Draw:     {:>5.1}%", p.probs.draw * 100.0);
    println!("Away win: {:>5.1}%", p.probs.away * 100.0);
    println!();
    println!("Elo diff (home incl. advantage): {:.1} points", p.diff);
    print_form(&p.home, window, p.home_form);
    print_form(&p.away, window, p.away_form);

    Ok(())
}

fn print_form(team: &str, window: usize, form: Form) {
    println!(
        "{team} last {window}: played {} pts {} gf {} ga {}",
        form.matches, form.points, form.goals_for, form.goals_against
    );
}
