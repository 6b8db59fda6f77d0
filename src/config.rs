use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::calibration::DEFAULT_EPSILON;
use crate::elo::EloConfig;
use crate::history_store;
use crate::match_data;

const DEFAULT_TOP: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub matches_path: PathBuf,
    pub db_path: PathBuf,
    pub xlsx_path: Option<PathBuf>,
    pub elo: EloConfig,
    pub epsilon: f64,
    pub top: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            matches_path: match_data::default_matches_path(),
            db_path: history_store::default_db_path(),
            xlsx_path: None,
            elo: EloConfig::default(),
            epsilon: DEFAULT_EPSILON,
            top: DEFAULT_TOP,
        }
    }
}

impl RunSettings {
    /// Defaults, then `ELO_*` environment variables, then CLI flags.
    pub fn resolve(args: &[String]) -> Result<Self> {
        let mut out = Self::default();

        if let Some(p) = env_path("ELO_MATCHES_PATH") {
            out.matches_path = p;
        }
        if let Some(p) = env_path("ELO_DB_PATH") {
            out.db_path = p;
        }
        if let Some(v) = env_f64("ELO_K")? {
            out.elo.k = v;
        }
        if let Some(v) = env_f64("ELO_HOME_ADV")? {
            out.elo.home_adv_pts = v;
        }
        if let Some(v) = env_f64("ELO_EPSILON")? {
            out.epsilon = v;
        }

        if let Some(p) = parse_path_arg(args, "--matches") {
            out.matches_path = p;
        }
        if let Some(p) = parse_path_arg(args, "--db") {
            out.db_path = p;
        }
        out.xlsx_path = parse_path_arg(args, "--xlsx");
        if let Some(v) = parse_f64_arg(args, "--k") {
            out.elo.k = v;
        }
        if let Some(v) = parse_f64_arg(args, "--home-adv") {
            out.elo.home_adv_pts = v;
        }
        if let Some(v) = parse_f64_arg(args, "--epsilon") {
            out.epsilon = v;
        }
        if let Some(v) = parse_usize_arg(args, "--top") {
            out.top = v;
        }

        out.check()?;
        Ok(out)
    }

    fn check(&self) -> Result<()> {
        if !self.elo.k.is_finite() || self.elo.k < 0.0 {
            return Err(anyhow!("k-factor must be a non-negative number, got {}", self.elo.k));
        }
        if !self.elo.home_adv_pts.is_finite() {
            return Err(anyhow!("home advantage must be finite"));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 0.5) {
            return Err(anyhow!("epsilon must lie in (0, 0.5), got {}", self.epsilon));
        }
        Ok(())
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn cli_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn parse_f64_arg(args: &[String], name: &str) -> Option<f64> {
    arg_value(args, name).and_then(|v| v.parse::<f64>().ok())
}

pub fn parse_usize_arg(args: &[String], name: &str) -> Option<usize> {
    arg_value(args, name).and_then(|v| v.parse::<usize>().ok())
}

pub fn parse_path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    arg_value(args, name).map(PathBuf::from)
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| anyhow!("{key} is not a number: {trimmed:?}"))
}
