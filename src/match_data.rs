use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calibration::{Outcome, classify_outcome};
use crate::error::EloError;

pub const DEFAULT_MATCHES_PATH: &str = "data/processed/matches_clean.json";

/// One row as delivered by the data-preparation step. Everything is
/// optional and rows are decoded one at a time, so a missing or mistyped
/// field is reported against its row instead of failing the whole parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub home_goals: Option<i64>,
    #[serde(default)]
    pub away_goals: Option<i64>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub result: Outcome,
}

impl MatchRecord {
    /// Builds a record whose result label is derived from the score.
    pub fn new(
        date: NaiveDate,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_goals: u32,
        away_goals: u32,
    ) -> Self {
        Self {
            date,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_goals,
            away_goals,
            result: classify_outcome(home_goals, away_goals),
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Checks the invariants a record must hold before it reaches the engine.
    pub fn check(&self, index: usize) -> Result<(), EloError> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(EloError::malformed(index, "blank team name"));
        }
        if self.home_team == self.away_team {
            return Err(EloError::malformed(
                index,
                format!("{} listed as both home and away", self.home_team),
            ));
        }
        Ok(())
    }
}

impl RawMatch {
    pub fn from_json(index: usize, row: serde_json::Value) -> Result<Self, EloError> {
        serde_json::from_value(row).map_err(|e| EloError::malformed(index, e.to_string()))
    }

    pub fn validate(&self, index: usize) -> Result<MatchRecord, EloError> {
        let raw_date = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EloError::malformed(index, "missing date"))?;
        let date = parse_match_date(raw_date)
            .ok_or_else(|| EloError::malformed(index, format!("unparseable date {raw_date:?}")))?;

        let home_team = required_team(self.home_team.as_deref(), index, "home_team")?;
        let away_team = required_team(self.away_team.as_deref(), index, "away_team")?;
        let home_goals = required_goals(self.home_goals, index, "home_goals")?;
        let away_goals = required_goals(self.away_goals, index, "away_goals")?;

        let from_goals = classify_outcome(home_goals, away_goals);
        let result = match self.result.as_deref() {
            Some(label) if !label.trim().is_empty() => {
                let parsed = Outcome::from_label(label)?;
                if parsed != from_goals {
                    warn!(
                        index,
                        label = parsed.label(),
                        score = %format!("{home_goals}-{away_goals}"),
                        "result label disagrees with score"
                    );
                }
                parsed
            }
            _ => from_goals,
        };

        let record = MatchRecord {
            date,
            home_team,
            away_team,
            home_goals,
            away_goals,
            result,
        };
        record.check(index)?;
        Ok(record)
    }
}

/// Accepts ISO dates, ISO datetimes and day-first football-data dates.
pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    for fmt in ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

pub fn validate_all(raw: &[RawMatch]) -> Result<Vec<MatchRecord>, EloError> {
    raw.iter()
        .enumerate()
        .map(|(idx, row)| row.validate(idx))
        .collect()
}

/// Stable, so same-day fixtures keep their source order.
pub fn sort_chronologically(matches: &mut [MatchRecord]) {
    matches.sort_by_key(|m| m.date);
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(trimmed).context("invalid matches json")?;
    let mut matches = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| RawMatch::from_json(idx, row)?.validate(idx))
        .collect::<Result<Vec<_>, EloError>>()?;
    sort_chronologically(&mut matches);
    Ok(matches)
}

pub fn load_matches_json(path: &Path) -> Result<Vec<MatchRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read matches file {}", path.display()))?;
    let matches =
        parse_matches_json(&raw).with_context(|| format!("parse matches {}", path.display()))?;
    info!(path = %path.display(), rows = matches.len(), "loaded matches");
    Ok(matches)
}

pub fn default_matches_path() -> PathBuf {
    PathBuf::from(DEFAULT_MATCHES_PATH)
}

fn required_team(value: Option<&str>, index: usize, field: &str) -> Result<String, EloError> {
    let name = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EloError::malformed(index, format!("missing {field}")))?;
    Ok(name.to_string())
}

fn required_goals(value: Option<i64>, index: usize, field: &str) -> Result<u32, EloError> {
    let goals = value.ok_or_else(|| EloError::malformed(index, format!("missing {field}")))?;
    u32::try_from(goals)
        .map_err(|_| EloError::malformed(index, format!("{field} out of range: {goals}")))
}
