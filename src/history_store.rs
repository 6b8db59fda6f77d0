use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use crate::calibration::{Outcome, Prob3};
use crate::elo::EloConfig;
use crate::engine::{EloRun, RatingsSnapshot, TraceEntry};
use crate::match_data::MatchRecord;

pub const DEFAULT_DB_PATH: &str = "data/processed/elo.sqlite";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub run_id: i64,
    pub created_at: String,
    pub config: EloConfig,
    pub matches: usize,
    pub teams: usize,
}

pub fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            k REAL NOT NULL,
            home_adv REAL NOT NULL,
            matches INTEGER NOT NULL,
            teams INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS elo_history (
            run_id INTEGER NOT NULL,
            seq INTEGER NOT NULL,
            date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_goals INTEGER NOT NULL,
            away_goals INTEGER NOT NULL,
            result TEXT NOT NULL,
            r_home_pre REAL NOT NULL,
            r_away_pre REAL NOT NULL,
            p_home REAL NOT NULL,
            p_draw REAL NOT NULL,
            p_away REAL NOT NULL,
            r_home_post REAL NOT NULL,
            r_away_post REAL NOT NULL,
            PRIMARY KEY (run_id, seq)
        );
        CREATE INDEX IF NOT EXISTS idx_history_home ON elo_history(home_team);
        CREATE INDEX IF NOT EXISTS idx_history_away ON elo_history(away_team);

        CREATE TABLE IF NOT EXISTS latest_ratings (
            run_id INTEGER NOT NULL,
            team TEXT NOT NULL,
            rating REAL NOT NULL,
            PRIMARY KEY (run_id, team)
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Writes a finished run in one transaction and returns its id.
pub fn save_run(conn: &mut Connection, run: &EloRun) -> Result<i64> {
    let tx = conn.transaction().context("begin save transaction")?;

    tx.execute(
        "INSERT INTO runs(created_at, k, home_adv, matches, teams) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            Utc::now().to_rfc3339(),
            run.config.k,
            run.config.home_adv_pts,
            run.trace.len() as i64,
            run.final_ratings.len() as i64
        ],
    )
    .context("insert run")?;
    let run_id = tx.last_insert_rowid();

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO elo_history(
                    run_id, seq, date, home_team, away_team, home_goals, away_goals, result,
                    r_home_pre, r_away_pre, p_home, p_draw, p_away, r_home_post, r_away_post)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )
            .context("prepare history insert")?;
        for (seq, e) in run.trace.iter().enumerate() {
            stmt.execute(params![
                run_id,
                seq as i64,
                e.record.date.format("%Y-%m-%d").to_string(),
                e.record.home_team,
                e.record.away_team,
                e.record.home_goals,
                e.record.away_goals,
                e.record.result.label(),
                e.r_home_pre,
                e.r_away_pre,
                e.probs.home,
                e.probs.draw,
                e.probs.away,
                e.r_home_post,
                e.r_away_post,
            ])
            .with_context(|| format!("insert history row {seq}"))?;
        }

        let mut stmt = tx
            .prepare("INSERT INTO latest_ratings(run_id, team, rating) VALUES (?1, ?2, ?3)")
            .context("prepare ratings insert")?;
        for (team, rating) in run.final_ratings.iter() {
            stmt.execute(params![run_id, team, rating])
                .with_context(|| format!("insert rating for {team}"))?;
        }
    }

    tx.commit().context("commit save transaction")?;
    info!(run_id, rows = run.trace.len(), "stored elo run");
    Ok(run_id)
}

pub fn latest_run(conn: &Connection) -> Result<Option<StoredRun>> {
    conn.query_row(
        "SELECT run_id, created_at, k, home_adv, matches, teams
         FROM runs ORDER BY run_id DESC LIMIT 1",
        [],
        |row| {
            Ok(StoredRun {
                run_id: row.get(0)?,
                created_at: row.get(1)?,
                config: EloConfig {
                    k: row.get(2)?,
                    home_adv_pts: row.get(3)?,
                },
                matches: row.get::<_, i64>(4)? as usize,
                teams: row.get::<_, i64>(5)? as usize,
            })
        },
    )
    .optional()
    .context("query latest run")
}

struct HistoryRow {
    date: String,
    home_team: String,
    away_team: String,
    home_goals: u32,
    away_goals: u32,
    result: String,
    ratings: [f64; 4],
    probs: Prob3,
}

pub fn load_history(conn: &Connection, run_id: i64) -> Result<Vec<TraceEntry>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                date, home_team, away_team, home_goals, away_goals, result,
                r_home_pre, r_away_pre, p_home, p_draw, p_away, r_home_post, r_away_post
            FROM elo_history
            WHERE run_id = ?1
            ORDER BY seq ASC
            "#,
        )
        .context("prepare load history query")?;

    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok(HistoryRow {
                date: row.get(0)?,
                home_team: row.get(1)?,
                away_team: row.get(2)?,
                home_goals: row.get(3)?,
                away_goals: row.get(4)?,
                result: row.get(5)?,
                ratings: [row.get(6)?, row.get(7)?, row.get(11)?, row.get(12)?],
                probs: Prob3 {
                    home: row.get(8)?,
                    draw: row.get(9)?,
                    away: row.get(10)?,
                },
            })
        })
        .context("query load history")?;

    let mut out = Vec::new();
    for row in rows {
        let row = row.context("decode history row")?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|e| anyhow!("stored date {:?} is invalid: {e}", row.date))?;
        let result = Outcome::from_label(&row.result)?;
        let [r_home_pre, r_away_pre, r_home_post, r_away_post] = row.ratings;
        out.push(TraceEntry {
            record: MatchRecord {
                date,
                home_team: row.home_team,
                away_team: row.away_team,
                home_goals: row.home_goals,
                away_goals: row.away_goals,
                result,
            },
            r_home_pre,
            r_away_pre,
            probs: row.probs,
            r_home_post,
            r_away_post,
        });
    }
    Ok(out)
}

pub fn load_ratings(conn: &Connection, run_id: i64) -> Result<RatingsSnapshot> {
    let mut stmt = conn
        .prepare("SELECT team, rating FROM latest_ratings WHERE run_id = ?1")
        .context("prepare load ratings query")?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .context("query load ratings")?;

    let mut ratings = HashMap::new();
    for row in rows {
        let (team, rating) = row.context("decode rating row")?;
        ratings.insert(team, rating);
    }
    Ok(RatingsSnapshot::from_map(ratings))
}

/// Latest stored run together with its trace and final ratings.
pub fn load_latest(conn: &Connection) -> Result<EloRun> {
    let run = latest_run(conn)?.context("no elo run stored yet; run elo_run first")?;
    Ok(EloRun {
        config: run.config,
        trace: load_history(conn, run.run_id)?,
        final_ratings: load_ratings(conn, run.run_id)?,
    })
}
