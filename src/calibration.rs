use serde::{Deserialize, Serialize};

use crate::engine::TraceEntry;
use crate::error::EloError;

pub const DEFAULT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Parses a result label as found in football-data style sheets.
    pub fn from_label(raw: &str) -> Result<Self, EloError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "H" | "HOME" => Ok(Outcome::Home),
            "D" | "DRAW" => Ok(Outcome::Draw),
            "A" | "AWAY" => Ok(Outcome::Away),
            _ => Err(EloError::InvalidOutcome(raw.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }

    /// Keeps every component inside `[eps, 1 - eps]` so `ln` stays finite.
    pub fn clipped(self, eps: f64) -> Self {
        let lo = eps;
        let hi = 1.0 - eps;
        Self {
            home: self.home.clamp(lo, hi),
            draw: self.draw.clamp(lo, hi),
            away: self.away.clamp(lo, hi),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub count: usize,
    pub accuracy: f64,
    pub avg_log_loss: f64,
    pub brier: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

pub fn classify_outcome(home_goals: u32, away_goals: u32) -> Outcome {
    if home_goals > away_goals {
        Outcome::Home
    } else if home_goals < away_goals {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

/// Most likely outcome; ties resolve home, then draw, then away.
pub fn argmax(p: Prob3) -> Outcome {
    if p.home >= p.draw && p.home >= p.away {
        Outcome::Home
    } else if p.draw >= p.away {
        Outcome::Draw
    } else {
        Outcome::Away
    }
}

/// Scores an engine trace against what actually happened on the pitch.
///
/// The realised outcome is re-derived from the goal counts rather than the
/// stored result label.
pub fn score(trace: &[TraceEntry], epsilon: f64) -> Result<BacktestMetrics, EloError> {
    let predictions: Vec<Prob3> = trace.iter().map(|e| e.probs).collect();
    let outcomes: Vec<Outcome> = trace
        .iter()
        .map(|e| classify_outcome(e.record.home_goals, e.record.away_goals))
        .collect();
    evaluate_probs(&predictions, &outcomes, epsilon)
}

pub fn evaluate_probs(
    predictions: &[Prob3],
    outcomes: &[Outcome],
    epsilon: f64,
) -> Result<BacktestMetrics, EloError> {
    check_lengths(predictions, outcomes)?;

    let mut brier_sum = 0.0_f64;
    let mut log_loss_sum = 0.0_f64;
    let mut correct = 0usize;

    for (p, outcome) in predictions.iter().zip(outcomes) {
        let p = p.clipped(epsilon);
        let y = one_hot(*outcome);
        brier_sum +=
            (p.home - y.home).powi(2) + (p.draw - y.draw).powi(2) + (p.away - y.away).powi(2);

        log_loss_sum += -p.get(*outcome).ln();

        if argmax(p) == *outcome {
            correct += 1;
        }
    }

    let n = predictions.len();
    let nf = n as f64;
    Ok(BacktestMetrics {
        count: n,
        accuracy: correct as f64 / nf,
        avg_log_loss: log_loss_sum / nf,
        brier: brier_sum / nf,
    })
}

pub fn calibration_bins(
    predictions: &[Prob3],
    outcomes: &[Outcome],
    class: Outcome,
    bins: usize,
) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (p, outcome) in predictions.iter().zip(outcomes) {
        let class_prob = p.get(class).clamp(0.0, 1.0);

        let idx = ((class_prob * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += class_prob;
        if *outcome == class {
            actual_sum[idx] += 1.0;
        }
    }

    let mut out = Vec::with_capacity(bins);
    for i in 0..bins {
        let count = counts[i];
        let (avg_pred, actual_rate) = if count > 0 {
            (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
        } else {
            (0.0, 0.0)
        };
        out.push(CalibrationBin {
            bucket_start: i as f64 / bins as f64,
            bucket_end: (i + 1) as f64 / bins as f64,
            count,
            avg_pred,
            actual_rate,
        });
    }
    out
}

/// Count-weighted gap between predicted and observed frequency, averaged
/// over the three outcome classes.
pub fn expected_calibration_error(
    predictions: &[Prob3],
    outcomes: &[Outcome],
    bins: usize,
) -> Result<f64, EloError> {
    check_lengths(predictions, outcomes)?;
    let n = predictions.len() as f64;
    let mut sum = 0.0;

    for class in Outcome::ALL {
        for b in calibration_bins(predictions, outcomes, class, bins) {
            if b.count == 0 {
                continue;
            }
            let w = b.count as f64 / n;
            sum += w * (b.avg_pred - b.actual_rate).abs();
        }
    }

    Ok(sum / 3.0)
}

fn check_lengths(predictions: &[Prob3], outcomes: &[Outcome]) -> Result<(), EloError> {
    if predictions.len() != outcomes.len() {
        return Err(EloError::LengthMismatch {
            predictions: predictions.len(),
            outcomes: outcomes.len(),
        });
    }
    if predictions.is_empty() {
        return Err(EloError::EmptyInput);
    }
    Ok(())
}

fn one_hot(outcome: Outcome) -> Prob3 {
    match outcome {
        Outcome::Home => Prob3 {
            home: 1.0,
            draw: 0.0,
            away: 0.0,
        },
        Outcome::Draw => Prob3 {
            home: 0.0,
            draw: 1.0,
            away: 0.0,
        },
        Outcome::Away => Prob3 {
            home: 0.0,
            draw: 0.0,
            away: 1.0,
        },
    }
}
