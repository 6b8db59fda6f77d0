//! Sequential rating replay.
//!
//! Ratings live in a table owned by one [`RatingEngine`]; every match reads
//! the current ratings of both sides, records the forecast, then commits the
//! update before the next match is looked at. Processing order therefore
//! matters and the engine refuses input that goes back in time.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calibration::Prob3;
use crate::elo::{BASE_RATING, EloConfig};
use crate::error::EloError;
use crate::match_data::MatchRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub record: MatchRecord,
    pub r_home_pre: f64,
    pub r_away_pre: f64,
    pub probs: Prob3,
    pub r_home_post: f64,
    pub r_away_post: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingsSnapshot {
    ratings: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EloRun {
    pub config: EloConfig,
    pub trace: Vec<TraceEntry>,
    pub final_ratings: RatingsSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub date: NaiveDate,
    pub rating: f64,
}

impl RatingsSnapshot {
    pub fn from_map(ratings: HashMap<String, f64>) -> Self {
        Self { ratings }
    }

    /// Rating of a team, or the base rating if it never played.
    pub fn rating(&self, team: &str) -> f64 {
        self.ratings.get(team).copied().unwrap_or(BASE_RATING)
    }

    pub fn get(&self, team: &str) -> Option<f64> {
        self.ratings.get(team).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Highest rating first; equal ratings fall back to team name.
    pub fn leaderboard(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<_> = self
            .ratings
            .iter()
            .map(|(name, &rating)| (name.clone(), rating))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: EloConfig,
    ratings: HashMap<String, f64>,
    last_date: Option<NaiveDate>,
    processed: usize,
}

impl RatingEngine {
    pub fn new(config: EloConfig) -> Self {
        Self {
            config,
            ratings: HashMap::new(),
            last_date: None,
            processed: 0,
        }
    }

    /// Teams that have not played yet are not stored; they read as the base rating.
    pub fn rating(&self, team: &str) -> f64 {
        self.ratings.get(team).copied().unwrap_or(BASE_RATING)
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn snapshot(&self) -> RatingsSnapshot {
        RatingsSnapshot {
            ratings: self.ratings.clone(),
        }
    }

    pub fn into_snapshot(self) -> RatingsSnapshot {
        RatingsSnapshot {
            ratings: self.ratings,
        }
    }

    /// Feeds one match through the model and commits the new ratings.
    pub fn step(&mut self, record: &MatchRecord) -> Result<TraceEntry, EloError> {
        let index = self.processed;
        record.check(index)?;
        match self.last_date {
            Some(last) if record.date < last => {
                return Err(EloError::malformed(
                    index,
                    format!("date {} precedes previous match on {last}", record.date),
                ));
            }
            _ => {}
        }

        let r_home_pre = self.rating(&record.home_team);
        let r_away_pre = self.rating(&record.away_team);
        let probs = self.config.predict(r_home_pre, r_away_pre);
        let (r_home_post, r_away_post) = self.config.update(r_home_pre, r_away_pre, record.result);

        self.ratings.insert(record.home_team.clone(), r_home_post);
        self.ratings.insert(record.away_team.clone(), r_away_post);
        self.last_date = Some(record.date);
        self.processed += 1;

        debug!(
            index,
            home = %record.home_team,
            away = %record.away_team,
            result = record.result.label(),
            r_home_pre,
            r_away_pre,
            r_home_post,
            r_away_post,
            "processed match"
        );

        Ok(TraceEntry {
            record: record.clone(),
            r_home_pre,
            r_away_pre,
            probs,
            r_home_post,
            r_away_post,
        })
    }
}

/// Replays `matches` from a clean slate.
///
/// All or nothing: the first bad record aborts the run and no ratings are
/// returned.
pub fn process(matches: &[MatchRecord], config: EloConfig) -> Result<EloRun, EloError> {
    let mut engine = RatingEngine::new(config);
    let mut trace = Vec::with_capacity(matches.len());
    for record in matches {
        trace.push(engine.step(record)?);
    }

    let final_ratings = engine.into_snapshot();
    info!(
        matches = trace.len(),
        teams = final_ratings.len(),
        k = config.k,
        home_adv = config.home_adv_pts,
        "elo replay complete"
    );

    Ok(EloRun {
        config,
        trace,
        final_ratings,
    })
}

/// Post-match rating of `team` after each of its matches, oldest first.
pub fn team_series(trace: &[TraceEntry], team: &str) -> Vec<RatingPoint> {
    trace
        .iter()
        .filter_map(|e| {
            let rating = if e.record.home_team == team {
                e.r_home_post
            } else if e.record.away_team == team {
                e.r_away_post
            } else {
                return None;
            };
            Some(RatingPoint {
                date: e.record.date,
                rating,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    #[test]
    fn unseen_team_reads_as_base_without_being_stored() {
        let engine = RatingEngine::new(EloConfig::default());
        assert_eq!(engine.rating("Getafe"), BASE_RATING);
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn step_commits_before_next_match() {
        let mut engine = RatingEngine::new(EloConfig::default());
        let first = engine
            .step(&MatchRecord::new(day(1), "A", "B", 2, 0))
            .expect("first match");
        let second = engine
            .step(&MatchRecord::new(day(2), "B", "C", 1, 1))
            .expect("second match");
        assert_eq!(second.r_home_pre, first.r_away_post);
        assert_eq!(second.r_away_pre, BASE_RATING);
        assert_eq!(engine.processed(), 2);
        assert_eq!(engine.snapshot().len(), 3);
    }

    #[test]
    fn going_back_in_time_is_rejected() {
        let matches = vec![
            MatchRecord::new(day(5), "A", "B", 2, 0),
            MatchRecord::new(day(4), "C", "D", 0, 0),
        ];
        match process(&matches, EloConfig::default()) {
            Err(EloError::MalformedRecord { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected ordering failure, got {other:?}"),
        }
    }

    #[test]
    fn same_day_fixtures_are_allowed() {
        let matches = vec![
            MatchRecord::new(day(5), "A", "B", 2, 0),
            MatchRecord::new(day(5), "C", "D", 0, 0),
        ];
        assert!(process(&matches, EloConfig::default()).is_ok());
    }

    #[test]
    fn leaderboard_is_descending_with_name_tiebreak() {
        let mut map = HashMap::new();
        map.insert("Betis".to_string(), 1500.0);
        map.insert("Alaves".to_string(), 1500.0);
        map.insert("Girona".to_string(), 1540.5);
        let board = RatingsSnapshot::from_map(map).leaderboard();
        let names: Vec<&str> = board.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Girona", "Alaves", "Betis"]);
    }

    #[test]
    fn series_follows_either_side() {
        let matches = vec![
            MatchRecord::new(day(1), "A", "B", 2, 0),
            MatchRecord::new(day(2), "C", "D", 1, 0),
            MatchRecord::new(day(3), "B", "A", 0, 0),
        ];
        let run = process(&matches, EloConfig::default()).expect("valid run");
        let series = team_series(&run.trace, "A");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].rating, run.trace[0].r_home_post);
        assert_eq!(series[1].rating, run.trace[2].r_away_post);
        assert_eq!(series[1].rating, run.final_ratings.rating("A"));
    }
}
