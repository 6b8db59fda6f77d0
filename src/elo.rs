use serde::{Deserialize, Serialize};

use crate::calibration::{Outcome, Prob3};

/// Rating assigned to a team the first time it is seen.
pub const BASE_RATING: f64 = 1500.0;

/// Logistic scale: a 400 point gap is 10:1 odds in the no-draw model.
pub const LOGISTIC_DIVISOR: f64 = 400.0;

pub const BASE_DRAW_RATE: f64 = 0.28;
pub const DRAW_SLOPE_DIVISOR: f64 = 2000.0;
pub const DRAW_MIN: f64 = 0.15;
pub const DRAW_MAX: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    pub k: f64,
    pub home_adv_pts: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k: 20.0,
            home_adv_pts: 60.0,
        }
    }
}

impl EloConfig {
    pub fn predict(&self, r_home: f64, r_away: f64) -> Prob3 {
        predict(r_home, r_away, self.home_adv_pts)
    }

    pub fn update(&self, r_home: f64, r_away: f64, outcome: Outcome) -> (f64, f64) {
        update(r_home, r_away, outcome, self.k, self.home_adv_pts)
    }
}

/// Home-perspective rating gap, home advantage included.
pub fn rating_diff(r_home: f64, r_away: f64, home_advantage: f64) -> f64 {
    (r_home + home_advantage) - r_away
}

/// No-draw probability that the home side wins, given the rating gap.
///
/// Never rounds down to zero, however lopsided the fixture.
pub fn expected_home_nodraw(diff: f64) -> f64 {
    (1.0 / (1.0 + 10.0_f64.powf(-diff / LOGISTIC_DIVISOR))).max(f64::MIN_POSITIVE)
}

/// Draws peak for evenly matched sides and thin out as the gap widens.
///
/// Scaled to whole rating points before dividing, so a 260 point gap lands
/// on `DRAW_MIN` exactly.
pub fn draw_probability(diff: f64) -> f64 {
    ((BASE_DRAW_RATE * DRAW_SLOPE_DIVISOR - diff.abs()) / DRAW_SLOPE_DIVISOR)
        .clamp(DRAW_MIN, DRAW_MAX)
}

/// Three-way outcome distribution for a fixture.
///
/// The draw mass is taken first, the remainder is split between home and
/// away in the ratio of the no-draw logistic expectation. Each side's share
/// is evaluated from its own perspective so the underdog never rounds to zero.
pub fn predict(r_home: f64, r_away: f64, home_advantage: f64) -> Prob3 {
    let diff = rating_diff(r_home, r_away, home_advantage);
    let p_home_nodraw = expected_home_nodraw(diff);
    let p_away_nodraw = expected_home_nodraw(-diff);
    let p_draw = draw_probability(diff);

    Prob3 {
        home: (1.0 - p_draw) * p_home_nodraw,
        draw: p_draw,
        away: (1.0 - p_draw) * p_away_nodraw,
    }
}

pub fn score_home(outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Home => 1.0,
        Outcome::Draw => 0.5,
        Outcome::Away => 0.0,
    }
}

/// Post-match ratings for both sides. Zero-sum: whatever the home side
/// gains the away side loses.
pub fn update(
    r_home: f64,
    r_away: f64,
    outcome: Outcome,
    k_factor: f64,
    home_advantage: f64,
) -> (f64, f64) {
    let e_home = expected_home_nodraw(rating_diff(r_home, r_away, home_advantage));
    let s_home = score_home(outcome);

    let r_home_new = r_home + k_factor * (s_home - e_home);
    let r_away_new = r_away + k_factor * ((1.0 - s_home) - (1.0 - e_home));
    (r_home_new, r_away_new)
}
