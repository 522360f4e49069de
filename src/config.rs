//! Learning configuration via TOML files.
//!
//! External orchestration hands the core a `[codebook]` table with the
//! partition style expressed as its string tag. Parsing validates
//! everything up front so a bad configuration fails before any learning
//! starts.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codebook::learning::LearnConfig;
use crate::data::PartitionPolicy;

/// Codebook learning configuration loaded from a TOML file.
///
/// ```
/// use codebook_core::CodebookConfig;
///
/// let config = CodebookConfig::from_toml_str(
///     r#"
///     [codebook]
///     size = 64
///     alpha = 0.05
///     convergence_threshold = 0.01
///     max_passes = 50
///     partition_style = "partitionSize"
///     partition_option = 50
///     seed = 42
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.size, 64);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CodebookConfig {
    /// Number of basis vectors to learn
    pub size: usize,
    /// L1 regularization weight
    pub alpha: f64,
    /// Convergence threshold on the per-pass error improvement
    pub convergence_threshold: f64,
    /// Hard pass bound
    pub max_passes: usize,
    /// Batch partitioning policy
    pub partition: PartitionPolicy,
    /// Seed for initialization and per-pass permutations
    pub seed: u64,
}

#[derive(Deserialize)]
struct RawConfigFile {
    codebook: RawCodebookConfig,
}

#[derive(Deserialize)]
struct RawCodebookConfig {
    size: Option<usize>,
    alpha: Option<f64>,
    convergence_threshold: Option<f64>,
    max_passes: Option<usize>,
    partition_style: Option<String>,
    partition_option: Option<usize>,
    seed: Option<u64>,
}

impl CodebookConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawConfigFile =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::try_from_raw(raw.codebook)
    }

    fn try_from_raw(raw: RawCodebookConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let size = raw.size.unwrap_or(defaults.size);
        if size == 0 {
            return Err(ConfigError::Parse("codebook.size must be > 0".into()));
        }

        let alpha = raw.alpha.unwrap_or(defaults.alpha);
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigError::Parse(
                "codebook.alpha must be finite and >= 0".into(),
            ));
        }

        let convergence_threshold = raw
            .convergence_threshold
            .unwrap_or(defaults.convergence_threshold);
        if !convergence_threshold.is_finite() || convergence_threshold <= 0.0 {
            return Err(ConfigError::Parse(
                "codebook.convergence_threshold must be finite and > 0".into(),
            ));
        }

        let max_passes = raw.max_passes.unwrap_or(defaults.max_passes);
        if max_passes == 0 {
            return Err(ConfigError::Parse("codebook.max_passes must be > 0".into()));
        }

        let partition = match (raw.partition_style, raw.partition_option) {
            (None, None) => defaults.partition,
            (style, option) => {
                let style = style.unwrap_or_else(|| "partitionSize".to_string());
                let option = option.unwrap_or(50);
                PartitionPolicy::from_tag(&style, option)
                    .map_err(|err| ConfigError::Parse(err.to_string()))?
            }
        };

        Ok(Self {
            size,
            alpha,
            convergence_threshold,
            max_passes,
            partition,
            seed: raw.seed.unwrap_or(defaults.seed),
        })
    }

    /// The learning-loop slice of this configuration.
    pub fn learn_config(&self) -> LearnConfig {
        LearnConfig {
            partition: self.partition,
            convergence_threshold: self.convergence_threshold,
            alpha: self.alpha,
            max_passes: self.max_passes,
            seed: self.seed,
        }
    }
}

impl Default for CodebookConfig {
    fn default() -> Self {
        Self {
            size: 512,
            alpha: 0.1,
            convergence_threshold: 0.01,
            max_passes: 50,
            partition: PartitionPolicy::PartitionSize(50),
            seed: 42,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the file
    Io(std::io::Error),
    /// Malformed TOML or invalid parameter values
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error while reading config: {err}"),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}
