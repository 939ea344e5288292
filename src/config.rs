//! Configuration types and loading
//!
//! The search used to live off a handful of hardcoded globals; they are an
//! explicit immutable [`Config`] here, loaded from YAML with a fallback
//! chain and passed into the engine.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Default search origin: 295 * 10^21. Even; the engine adjusts to odd.
pub const DEFAULT_INITIAL_SEED: &str = "295000000000000000000000";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search parameters
    pub search: SearchConfig,

    /// Checkpoint and log file locations
    pub files: FilesConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        let initial = self.initial_seed()?;
        if initial < BigUint::from(3u32) {
            return Err(eyre::eyre!("initial-seed must be at least 3, got {initial}"));
        }
        // Seeds are always odd, so an even divisor would never divide one:
        // no checkpoint (or backup) would ever be written
        if self.search.checkpoint_interval == 0 || self.search.checkpoint_interval % 2 == 0 {
            return Err(eyre::eyre!(
                "checkpoint-interval must be odd (seeds are odd), got {}",
                self.search.checkpoint_interval
            ));
        }
        if self.search.backup_modulus == 0 || self.search.backup_modulus % 2 == 0 {
            return Err(eyre::eyre!(
                "backup-modulus must be odd (seeds are odd), got {}",
                self.search.backup_modulus
            ));
        }
        Ok(())
    }

    /// Parse the configured initial seed
    pub fn initial_seed(&self) -> Result<BigUint> {
        self.search
            .initial_seed
            .trim()
            .parse::<BigUint>()
            .map_err(|_| {
                eyre::eyre!(
                    "initial-seed is not a decimal integer: {:?}",
                    self.search.initial_seed
                )
            })
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .hailstone.yml
        let local_config = PathBuf::from(".hailstone.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/hailstone/hailstone.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("hailstone").join("hailstone.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Starting seed as decimal text (arbitrary precision)
    #[serde(rename = "initial-seed")]
    pub initial_seed: String,

    /// Checkpoint whenever seed is divisible by this
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: u64,

    /// Among checkpoints, also write the backup when seed is divisible by this
    #[serde(rename = "backup-modulus")]
    pub backup_modulus: u64,

    /// Wall-clock budget in seconds before the one-shot timeout snapshot.
    /// Disabled by default (0): the search runs until killed.
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            initial_seed: DEFAULT_INITIAL_SEED.to_string(),
            checkpoint_interval: 1_000_001,
            backup_modulus: 11,
            timeout_secs: 0,
        }
    }
}

/// Checkpoint and log file locations, working-directory-relative by default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Primary save file
    pub primary: PathBuf,

    /// Backup save file
    pub backup: PathBuf,

    /// One-shot timeout snapshot
    pub timeout: PathBuf,

    /// Log file
    pub log: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("hailstone.save"),
            backup: PathBuf::from("hailstone.backup.save"),
            timeout: PathBuf::from("hailstone.timeout"),
            log: PathBuf::from("hailstone.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.initial_seed, DEFAULT_INITIAL_SEED);
        assert_eq!(config.search.checkpoint_interval, 1_000_001);
        assert_eq!(config.search.backup_modulus, 11);
        // Runs until killed unless a budget is opted into
        assert_eq!(config.search.timeout_secs, 0);
        assert_eq!(config.files.primary, PathBuf::from("hailstone.save"));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_initial_seed_parses() {
        let config = Config::default();
        let seed = config.initial_seed().unwrap();
        assert_eq!(seed.to_string(), DEFAULT_INITIAL_SEED);
    }

    #[test]
    fn test_validate_rejects_bad_seed() {
        let mut config = Config::default();
        config.search.initial_seed = "twelve".to_string();
        assert!(config.validate().is_err());

        config.search.initial_seed = "2".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.search.checkpoint_interval = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.backup_modulus = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_even_interval() {
        // An even interval never divides an odd seed: the loop would run
        // forever without a single checkpoint
        let mut config = Config::default();
        config.search.checkpoint_interval = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.backup_modulus = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
search:
  checkpoint-interval: 5
  timeout-secs: 0
files:
  primary: /tmp/custom.save
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.search.checkpoint_interval, 5);
        assert_eq!(config.search.timeout_secs, 0);
        assert_eq!(config.search.backup_modulus, 11);
        assert_eq!(config.files.primary, PathBuf::from("/tmp/custom.save"));
        assert_eq!(config.files.backup, PathBuf::from("hailstone.backup.save"));
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let missing = PathBuf::from("/nonexistent/hailstone.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
