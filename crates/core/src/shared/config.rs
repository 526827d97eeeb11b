use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_EMBEDDER_INPUT_SIZE, DEFAULT_EMBEDDING_DIM, DEFAULT_SIMILARITY_THRESHOLD,
};

/// How a new face picks among clusters above the similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// First cluster in creation order whose similarity exceeds the threshold.
    FirstMatch,
    /// Most similar cluster above the threshold; ties go to the older cluster.
    ///
    /// Changes which cluster a face joins compared to `FirstMatch`, so it
    /// is opt-in only.
    BestMatch,
}

/// What to do with a detection box that covers no pixels once clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateBoxPolicy {
    /// Drop the box and continue with the next face.
    Skip,
    /// Abort the pass with `InvalidCropRegion`.
    Fail,
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchPolicy::FirstMatch => write!(f, "first-match"),
            MatchPolicy::BestMatch => write!(f, "best-match"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables of a clustering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub similarity_threshold: f64,
    pub embedding_dim: usize,
    /// Consumed by the embedder only; the clustering core never resizes.
    pub embedder_input_size: u32,
    pub match_policy: MatchPolicy,
    pub degenerate_boxes: DegenerateBoxPolicy,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            embedder_input_size: DEFAULT_EMBEDDER_INPUT_SIZE,
            match_policy: MatchPolicy::FirstMatch,
            degenerate_boxes: DegenerateBoxPolicy::Skip,
        }
    }
}

impl ClusteringConfig {
    /// Per-user config location, e.g. `~/.config/FaceGroup/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceGroup").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the per-user config if present, otherwise defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be between -1.0 and 1.0, got {}",
                self.similarity_threshold
            )));
        }
        if self.embedding_dim == 0 {
            return Err(ConfigError::Invalid(
                "embedding_dim must be positive".to_string(),
            ));
        }
        if self.embedder_input_size == 0 {
            return Err(ConfigError::Invalid(
                "embedder_input_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
