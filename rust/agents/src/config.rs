//! Run parameters for the demo binary: defaults, overlaid by a JSON file,
//! overlaid by `AGENTS_*` environment variables.

use crate::environments::grid_mdp::{tuning, GridMdp};
use gridworld::{presets, Layout, LayoutError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

pub const CONFIG_ENV: &str = "AGENTS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown grid {0:?}, expected one of {known:?}", known = presets::NAMES)]
    UnknownGrid(String),

    #[error("unknown tuning {0:?}")]
    UnknownTuning(String),

    #[error("grid {0:?} does not parse: {1}")]
    Layout(String, #[source] LayoutError),

    #[error("discount {0} is outside [0, 1]")]
    InvalidDiscount(f64),

    #[error("noise {0} is outside [0, 1]")]
    InvalidNoise(f64),

    #[error("{var}={value:?} is not valid")]
    InvalidEnv { var: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub grid: String,
    pub discount: f64,
    pub noise: f64,
    pub living_reward: f64,
    pub iterations: usize,
    /// Stop sweeping once a sweep changes no value by more than this.
    pub theta: Option<f64>,
    pub episodes: usize,
    pub max_steps: usize,
    pub seed: u64,
    /// Named parameter preset; replaces grid, discount, noise and living
    /// reward when set.
    pub tuning: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            grid: "BookGrid".into(),
            discount: 0.9,
            noise: 0.2,
            living_reward: 0.,
            iterations: 100,
            theta: None,
            episodes: 10,
            max_steps: 100,
            seed: 2718,
            tuning: None,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&s)
    }

    /// Applies `AGENTS_*` overrides read through `lookup`, usually
    /// `|k| std::env::var(k).ok()`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AGENTS_GRID") {
            self.grid = v;
        }
        if let Some(v) = lookup("AGENTS_TUNING") {
            self.tuning = Some(v);
        }
        override_parsed(&lookup, "AGENTS_DISCOUNT", &mut self.discount)?;
        override_parsed(&lookup, "AGENTS_NOISE", &mut self.noise)?;
        override_parsed(&lookup, "AGENTS_LIVING_REWARD", &mut self.living_reward)?;
        override_parsed(&lookup, "AGENTS_ITERATIONS", &mut self.iterations)?;
        override_parsed(&lookup, "AGENTS_SEED", &mut self.seed)?;

        Ok(self)
    }

    /// Replaces the grid parameters with those of the named tuning, if any.
    pub fn resolve_tuning(mut self) -> Result<Self> {
        if let Some(name) = &self.tuning {
            let t = tuning(name).ok_or_else(|| ConfigError::UnknownTuning(name.clone()))?;
            self.grid = t.grid.into();
            self.discount = t.discount;
            self.noise = t.noise;
            self.living_reward = t.living_reward;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(ConfigError::InvalidDiscount(self.discount));
        }
        if !(0.0..=1.0).contains(&self.noise) {
            return Err(ConfigError::InvalidNoise(self.noise));
        }
        if let Some(name) = &self.tuning {
            tuning(name).ok_or_else(|| ConfigError::UnknownTuning(name.clone()))?;
        }
        self.layout().map(|_| ())
    }

    pub fn layout(&self) -> Result<Layout> {
        presets::layout(&self.grid)
            .ok_or_else(|| ConfigError::UnknownGrid(self.grid.clone()))?
            .map_err(|e| ConfigError::Layout(self.grid.clone(), e))
    }

    pub fn mdp(&self) -> Result<GridMdp> {
        Ok(GridMdp::new(self.layout()?, self.noise, self.living_reward))
    }
}

fn override_parsed<F, T>(lookup: &F, var: &'static str, field: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(value) = lookup(var) {
        *field = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value })?;
    }

    Ok(())
}
