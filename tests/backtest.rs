use chrono::NaiveDate;

use laliga_elo::calibration::{self, DEFAULT_EPSILON};
use laliga_elo::engine::TraceEntry;
use laliga_elo::{EloConfig, EloError, MatchRecord, Outcome, Prob3, engine};

fn entry(home_goals: u32, away_goals: u32, probs: Prob3) -> TraceEntry {
    let date = NaiveDate::from_ymd_opt(2023, 10, 1).expect("valid date");
    TraceEntry {
        record: MatchRecord::new(date, "Osasuna", "Mallorca", home_goals, away_goals),
        r_home_pre: 1500.0,
        r_away_pre: 1500.0,
        probs,
        r_home_post: 1500.0,
        r_away_post: 1500.0,
    }
}

#[test]
fn single_home_win_scores_as_expected() {
    let trace = vec![entry(
        2,
        1,
        Prob3 {
            home: 0.6,
            draw: 0.25,
            away: 0.15,
        },
    )];
    let m = calibration::score(&trace, DEFAULT_EPSILON).expect("non-empty trace");
    assert_eq!(m.count, 1);
    assert_eq!(m.accuracy, 1.0);
    assert!((m.avg_log_loss - 0.5108).abs() < 1e-4);
    assert!((m.avg_log_loss + 0.6_f64.ln()).abs() < 1e-12);
}

#[test]
fn ground_truth_comes_from_goals_not_the_label() {
    let mut e = entry(
        0,
        0,
        Prob3 {
            home: 0.5,
            draw: 0.3,
            away: 0.2,
        },
    );
    e.record.result = Outcome::Home;
    let m = calibration::score(&[e], DEFAULT_EPSILON).expect("non-empty trace");
    assert_eq!(m.accuracy, 0.0);
    assert!((m.avg_log_loss + 0.3_f64.ln()).abs() < 1e-12);
}

#[test]
fn empty_trace_is_reported() {
    assert_eq!(
        calibration::score(&[], DEFAULT_EPSILON),
        Err(EloError::EmptyInput)
    );
}

#[test]
fn scoring_is_idempotent() {
    let d = |day| NaiveDate::from_ymd_opt(2023, 11, day).expect("valid date");
    let matches = vec![
        MatchRecord::new(d(1), "Betis", "Cadiz", 2, 0),
        MatchRecord::new(d(2), "Cadiz", "Granada", 1, 1),
        MatchRecord::new(d(3), "Granada", "Betis", 0, 3),
        MatchRecord::new(d(4), "Betis", "Granada", 0, 1),
    ];
    let run = engine::process(&matches, EloConfig::default()).expect("valid run");

    let first = calibration::score(&run.trace, DEFAULT_EPSILON).expect("scored");
    let second = calibration::score(&run.trace, DEFAULT_EPSILON).expect("scored");
    assert_eq!(first, second);
    assert_eq!(first.count, 4);
    assert!(first.accuracy >= 0.0 && first.accuracy <= 1.0);
    assert!(first.avg_log_loss > 0.0);
}

#[test]
fn fresh_engine_predicts_every_opener_as_home() {
    let d = NaiveDate::from_ymd_opt(2023, 8, 11).expect("valid date");
    let matches = vec![
        MatchRecord::new(d, "Alaves", "Cadiz", 1, 0),
        MatchRecord::new(d, "Granada", "Atletico Madrid", 1, 3),
    ];
    let run = engine::process(&matches, EloConfig::default()).expect("valid run");
    let m = calibration::score(&run.trace, DEFAULT_EPSILON).expect("scored");
    assert_eq!(m.accuracy, 0.5);
}
