//! Framework configuration
//!
//! [`FrameworkConfig`] can be built in code, loaded from a YAML or JSON file,
//! or assembled from command-line flags through [`FrameworkArgs`], which an
//! embedding binary flattens into its own `clap` parser.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of pools evaluated concurrently in Filter and Score.
pub const DEFAULT_PARALLELISM: usize = 16;

/// Default upper bound for a single Permit wait.
pub const DEFAULT_MAX_PERMIT_WAIT: Duration = Duration::from_secs(15 * 60);

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the framework driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameworkConfig {
    /// Pools evaluated concurrently during Filter and Score fan-out
    pub parallelism: usize,

    /// Per score plugin weight; plugins not listed weigh 1
    pub score_weights: BTreeMap<String, i64>,

    /// Longest wait a Permit plugin may request
    #[serde(with = "duration_string")]
    pub max_permit_wait: Duration,

    /// Logging setup for embedding binaries
    pub logging: LogConfig,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            score_weights: BTreeMap::new(),
            max_permit_wait: DEFAULT_MAX_PERMIT_WAIT,
            logging: LogConfig::default(),
        }
    }
}

impl FrameworkConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    /// Weight applied to a score plugin's scores.
    pub fn score_weight(&self, plugin: &str) -> i64 {
        self.score_weights.get(plugin).copied().unwrap_or(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(Error::Config("parallelism must be at least 1".to_string()));
        }
        if self.max_permit_wait.is_zero() {
            return Err(Error::Config(
                "maxPermitWait must be greater than zero".to_string(),
            ));
        }
        for (plugin, weight) in &self.score_weights {
            if *weight <= 0 {
                return Err(Error::InvalidWeight {
                    plugin: plugin.clone(),
                    weight: *weight,
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output logs as JSON
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Scheduler flags for embedding in a `clap` parser with `#[command(flatten)]`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FrameworkArgs {
    /// Path to a YAML or JSON framework configuration file
    #[arg(long = "scheduler-config", env = "SCHEDULER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pools evaluated concurrently during Filter and Score
    #[arg(long = "scheduler-parallelism", env = "SCHEDULER_PARALLELISM")]
    pub parallelism: Option<usize>,

    /// Longest permitted Permit wait (e.g. "30s", "5m")
    #[arg(long = "max-permit-wait", env = "SCHEDULER_MAX_PERMIT_WAIT")]
    pub max_permit_wait: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl FrameworkArgs {
    /// Read the configuration file (or defaults) and apply flag overrides.
    pub fn load(&self) -> Result<FrameworkConfig> {
        let mut config = match &self.config {
            Some(path) => FrameworkConfig::from_file(path)?,
            None => FrameworkConfig::default(),
        };
        if let Some(parallelism) = self.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(wait) = &self.max_permit_wait {
            config.max_permit_wait = parse_duration(wait)?;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.log_json {
            config.logging.json = true;
        }
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Durations
// =============================================================================

/// Parse a duration string like "1h", "30m", "1h30m", "45s", or "2d".
/// A trailing bare number counts as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::DurationParse("empty duration string".to_string()));
    }

    let mut total_secs: u64 = 0;
    let mut num_buf = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            num_buf.push(c);
            continue;
        }
        let num: u64 = num_buf
            .parse()
            .map_err(|_| Error::DurationParse(format!("invalid number in duration: {}", s)))?;
        num_buf.clear();

        let multiplier = match c {
            'd' | 'D' => 86400,
            'h' | 'H' => 3600,
            'm' | 'M' => 60,
            's' | 'S' => 1,
            _ => {
                return Err(Error::DurationParse(format!(
                    "unknown duration unit: {}",
                    c
                )))
            }
        };
        total_secs = num
            .checked_mul(multiplier)
            .and_then(|secs| total_secs.checked_add(secs))
            .ok_or_else(|| overflow(s))?;
    }

    if !num_buf.is_empty() {
        let num: u64 = num_buf
            .parse()
            .map_err(|_| Error::DurationParse(format!("invalid number in duration: {}", s)))?;
        total_secs = total_secs.checked_add(num).ok_or_else(|| overflow(s))?;
    }

    Ok(Duration::from_secs(total_secs))
}

fn overflow(s: &str) -> Error {
    Error::DurationParse(format!("duration out of range: {}", s))
}

mod duration_string {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{}s", d.as_secs()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
