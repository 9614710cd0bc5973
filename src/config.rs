use crate::model::PlayTime;
use crate::window::DateWindow;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// How the analysis window is chosen.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(untagged)]
pub enum WindowSpec {
    Month {
        year: i32,
        month: u8,
    },
    Range {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
    #[default]
    All,
}

/// Everything one analysis run needs, assembled from an optional JSON config
/// file and command-line overrides before the pipeline touches any data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub date_window: WindowSpec,
    #[serde(default = "default_threshold_ratio")]
    pub threshold_ratio: f64,
    #[serde(default = "default_top_n")]
    pub top_n_plays: usize,
    #[serde(default = "default_top_n")]
    pub top_n_cumulative: usize,
    #[serde(default)]
    pub chart_dir: Option<PathBuf>,
}

fn default_threshold_ratio() -> f64 {
    0.8
}

fn default_top_n() -> usize {
    10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            database: None,
            date_window: WindowSpec::default(),
            threshold_ratio: default_threshold_ratio(),
            top_n_plays: default_top_n(),
            top_n_cumulative: default_top_n(),
            chart_dir: None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

impl AnalysisConfig {
    /// Reject bad options up front, each failure naming the one at fault.
    pub fn validate(&self) -> Result<()> {
        if self.database.is_none() {
            bail!("database: no play log path given (set \"database\" or pass --db)");
        }
        if !self.threshold_ratio.is_finite() || self.threshold_ratio < 0.0 {
            bail!(
                "threshold_ratio: {} is not a usable completion ratio",
                self.threshold_ratio
            );
        }
        if self.top_n_plays == 0 {
            bail!("top_n_plays: must be positive");
        }
        if self.top_n_cumulative == 0 {
            bail!("top_n_cumulative: must be positive");
        }
        self.resolve_window().map(|_| ())
    }

    /// Turn the window choice into concrete bounds.
    pub fn resolve_window(&self) -> Result<DateWindow> {
        match &self.date_window {
            WindowSpec::All => Ok(DateWindow::unbounded()),
            WindowSpec::Month { year, month } => {
                DateWindow::month(*year, *month).context("date_window: bad year/month")
            }
            WindowSpec::Range { start, end } => {
                let start = parse_bound(start.as_deref(), "start")?;
                let end = parse_bound(end.as_deref(), "end")?;
                if let (Some(start), Some(end)) = (start, end) {
                    if end.order(start) == Ordering::Less {
                        bail!("date_window: end precedes start");
                    }
                }
                Ok(DateWindow { start, end })
            }
        }
    }
}

fn parse_bound(text: Option<&str>, which: &str) -> Result<Option<PlayTime>> {
    match text {
        None => Ok(None),
        Some(raw) => {
            let at = PlayTime::parse(raw)
                .with_context(|| format!("date_window: bad {which} bound"))?;
            Ok(Some(at))
        }
    }
}
