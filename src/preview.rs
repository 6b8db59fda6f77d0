use serde::Serialize;

use crate::calibration::Prob3;
use crate::elo::{self, EloConfig};
use crate::engine::{RatingsSnapshot, TraceEntry};
use crate::match_data::MatchRecord;

pub const DEFAULT_FORM_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Form {
    pub matches: usize,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPreview {
    pub home: String,
    pub away: String,
    pub r_home: f64,
    pub r_away: f64,
    /// Home minus away, home advantage included.
    pub diff: f64,
    pub probs: Prob3,
    pub home_form: Form,
    pub away_form: Form,
}

/// Forecast for a hypothetical fixture using the latest ratings.
///
/// `history` must be chronological; only the last `form_window` matches of
/// each side count towards form.
pub fn match_preview(
    ratings: &RatingsSnapshot,
    history: &[MatchRecord],
    home: &str,
    away: &str,
    config: EloConfig,
    form_window: usize,
) -> MatchPreview {
    let r_home = ratings.rating(home);
    let r_away = ratings.rating(away);
    MatchPreview {
        home: home.to_string(),
        away: away.to_string(),
        r_home,
        r_away,
        diff: elo::rating_diff(r_home, r_away, config.home_adv_pts),
        probs: config.predict(r_home, r_away),
        home_form: team_form(history, home, form_window),
        away_form: team_form(history, away, form_window),
    }
}

/// Points (3/1/0) and goals over a team's last `n` matches.
pub fn team_form(history: &[MatchRecord], team: &str, n: usize) -> Form {
    let mut form = Form::default();
    for m in history.iter().rev().filter(|m| m.involves(team)).take(n) {
        let (gf, ga) = if m.home_team == team {
            (m.home_goals, m.away_goals)
        } else {
            (m.away_goals, m.home_goals)
        };
        form.matches += 1;
        form.goals_for = form.goals_for.saturating_add(gf);
        form.goals_against = form.goals_against.saturating_add(ga);
        form.points = form.points.saturating_add(match gf.cmp(&ga) {
            std::cmp::Ordering::Greater => 3,
            std::cmp::Ordering::Equal => 1,
            std::cmp::Ordering::Less => 0,
        });
    }
    form
}

/// A team's trace entries, newest first.
pub fn recent_matches<'a>(trace: &'a [TraceEntry], team: &str, n: usize) -> Vec<&'a TraceEntry> {
    trace
        .iter()
        .rev()
        .filter(|e| e.record.involves(team))
        .take(n)
        .collect()
}

/// Every team that appears in the history, sorted by name.
pub fn known_teams(history: &[MatchRecord]) -> Vec<String> {
    let mut teams: Vec<String> = history
        .iter()
        .flat_map(|m| [m.home_team.clone(), m.away_team.clone()])
        .collect();
    teams.sort();
    teams.dedup();
    teams
}
