use anyhow::{Context, Result};

use laliga_elo::calibration::{self, Outcome, Prob3};
use laliga_elo::config::{self, RunSettings};
use laliga_elo::{engine, history_store, match_data};

const ECE_BINS: usize = 10;

fn main() -> Result<()> {
    config::load_dotenv();
    laliga_elo::init_tracing();

    let args = config::cli_args();
    let settings = RunSettings::resolve(&args)?;

    // --replay scores a fresh run over the matches file instead of the stored one.
    let run = if config::has_flag(&args, "--replay") {
        let matches = match_data::load_matches_json(&settings.matches_path)?;
        engine::process(&matches, settings.elo).context("elo replay failed")?
    } else {
        let conn = history_store::open_db(&settings.db_path)?;
        if let Some(stored) = history_store::latest_run(&conn)? {
            println!("Stored run #{} ({})", stored.run_id, stored.created_at);
        }
        history_store::load_latest(&conn)?
    };

    let metrics = calibration::score(&run.trace, settings.epsilon)?;

    let predictions: Vec<Prob3> = run.trace.iter().map(|e| e.probs).collect();
    let outcomes: Vec<Outcome> = run
        .trace
        .iter()
        .map(|e| calibration::classify_outcome(e.record.home_goals, e.record.away_goals))
        .collect();
    let ece = calibration::expected_calibration_error(&predictions, &outcomes, ECE_BINS)?;

    println!("Matches: {}", metrics.count);
    println!("Accuracy (argmax): {:.4}", metrics.accuracy);
    println!("Avg log loss: {:.4}", metrics.avg_log_loss);
    println!("Brier: {:.4}", metrics.brier);
    println!("ECE ({ECE_BINS} bins): {ece:.4}");

    if config::has_flag(&args, "--bins") {
        for class in Outcome::ALL {
            println!();
            println!("Reliability ({}):", class.label());
            println!("{:>11} {:>6} {:>9} {:>9}", "bucket", "n", "pred", "actual");
            for b in calibration::calibration_bins(&predictions, &outcomes, class, ECE_BINS) {
                if b.count == 0 {
                    continue;
                }
                println!(
                    "{:>5.2}-{:<5.2} {:>6} {:>9.3} {:>9.3}",
                    b.bucket_start, b.bucket_end, b.count, b.avg_pred, b.actual_rate
                );
            }
        }
    }

    Ok(())
}
