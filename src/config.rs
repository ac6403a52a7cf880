// src/config.rs
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::error::{Result, RoamingError};

pub const OUTPUT_DIR_ENV: &str = "ROAMSTATS_OUTPUT_DIR";
pub const LOG_FILTER_ENV: &str = "ROAMSTATS_LOG";

/// Header names of the three columns every roaming export must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnNames {
    pub country: &'static str,
    pub operator: &'static str,
    pub subscribers: &'static str,
}

impl ColumnNames {
    pub const DEFAULT: ColumnNames = ColumnNames {
        country: "Country Name",
        operator: "Operator",
        subscribers: "Number of SUBS",
    };

    pub fn required(&self) -> [&'static str; 3] {
        [self.country, self.operator, self.subscribers]
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which roaming export a job reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outgoing => "outgoing",
            Direction::Incoming => "incoming",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "outgoing" | "out" | "vlr" => Some(Direction::Outgoing),
            "incoming" | "in" | "hlr" => Some(Direction::Incoming),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub direction: Direction,
    /// A file path or a glob pattern.
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub log_filter: String,
    pub jobs: Vec<JobConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dashboards"),
            log_filter: "info".to_string(),
            jobs: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read a YAML config file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            RoamingError::Config(format!("reading {}: {}", path.display(), e))
        })?;
        let cfg = Self::from_yaml(&text)?;
        Ok(cfg.with_env_overrides())
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| RoamingError::Config(e.to_string()))
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = env::var(OUTPUT_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(filter) = env::var(LOG_FILTER_ENV) {
            if !filter.trim().is_empty() {
                self.log_filter = filter;
            }
        }
        self
    }

    /// Expand every job's input pattern into concrete paths, in job order.
    /// A pattern matching nothing is reported as `NotFound`.
    pub fn expand_jobs(&self) -> Vec<Result<(Direction, PathBuf)>> {
        let mut out = Vec::new();
        for job in &self.jobs {
            match expand_input(&job.input) {
                Ok(paths) => out.extend(paths.into_iter().map(|p| Ok((job.direction, p)))),
                Err(e) => out.push(Err(e)),
            }
        }
        out
    }
}

/// Resolve a path or glob pattern to the files it names, sorted.
pub fn expand_input(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|e| RoamingError::Config(format!("invalid input pattern `{}`: {}", pattern, e)))?
        .filter_map(|entry| entry.ok())
        .collect();
    if paths.is_empty() {
        return Err(RoamingError::NotFound {
            path: PathBuf::from(pattern),
        });
    }
    paths.sort();
    Ok(paths)
}
