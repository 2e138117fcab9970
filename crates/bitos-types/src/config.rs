//! Terminal configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BitosError, Result};

/// Largest accepted `latency.scale`.
pub const MAX_LATENCY_SCALE: f32 = 100.0;

/// Top-level terminal configuration (`bitos.toml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Host name shown in the prompt and by `uname`/`sysctl`.
    pub hostname: String,
    /// Login name of the simulated user.
    pub user: String,
    /// Maximum number of history entries kept per session.
    pub history_limit: usize,
    /// Artificial latency settings for network-simulation commands.
    pub latency: LatencyConfig,
    /// Fixed RNG seed for reproducible output. Random when absent.
    pub seed: Option<u64>,
    /// Where to persist the session between runs. Disabled when absent.
    pub session_file: Option<PathBuf>,
}

/// Artificial latency settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Whether simulated commands pause at all.
    pub enabled: bool,
    /// Multiplier applied to every simulated pause (1.0 = as scripted).
    pub scale: f32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            hostname: "bitos".to_string(),
            user: "user".to_string(),
            history_limit: 100,
            latency: LatencyConfig::default(),
            seed: None,
            session_file: None,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.0,
        }
    }
}

impl TerminalConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(BitosError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=MAX_LATENCY_SCALE).contains(&self.latency.scale) {
            return Err(BitosError::Config(format!(
                "latency.scale must be between 0 and {MAX_LATENCY_SCALE}, got {}",
                self.latency.scale
            )));
        }
        if self.hostname.is_empty() || self.user.is_empty() {
            return Err(BitosError::Config(
                "hostname and user must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = TerminalConfig::from_toml_str("").unwrap();
        assert_eq!(config.hostname, "bitos");
        assert_eq!(config.user, "user");
        assert_eq!(config.history_limit, 100);
        assert!(config.latency.enabled);
        assert!(config.seed.is_none());
        assert!(config.session_file.is_none());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let text = "hostname = \"lab\"\nseed = 7\n\n[latency]\nenabled = false\n";
        let config = TerminalConfig::from_toml_str(text).unwrap();
        assert_eq!(config.hostname, "lab");
        assert_eq!(config.seed, Some(7));
        assert!(!config.latency.enabled);
        assert_eq!(config.latency.scale, 1.0);
    }

    #[test]
    fn zero_history_limit_rejected() {
        let err = TerminalConfig::from_toml_str("history_limit = 0").unwrap_err();
        assert!(format!("{err}").contains("history_limit"));
    }

    #[test]
    fn negative_scale_rejected() {
        let err = TerminalConfig::from_toml_str("[latency]\nscale = -2.0").unwrap_err();
        assert!(format!("{err}").contains("latency.scale"));
    }

    #[test]
    fn oversized_scale_rejected() {
        let err = TerminalConfig::from_toml_str("[latency]\nscale = 1e30").unwrap_err();
        assert!(format!("{err}").contains("latency.scale must be between 0 and 100"));
        let err = TerminalConfig::from_toml_str("[latency]\nscale = inf").unwrap_err();
        assert!(format!("{err}").contains("latency.scale"));
        let config = TerminalConfig::from_toml_str("[latency]\nscale = 100.0").unwrap();
        assert_eq!(config.latency.scale, MAX_LATENCY_SCALE);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = TerminalConfig::from_toml_str("hostname = [").unwrap_err();
        assert!(format!("{err}").contains("TOML parse error"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user = \"alice\"\nsession_file = \"/tmp/bitos.json\"").unwrap();
        let config = TerminalConfig::load(file.path()).unwrap();
        assert_eq!(config.user, "alice");
        assert_eq!(
            config.session_file.as_deref(),
            Some(Path::new("/tmp/bitos.json"))
        );
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = TerminalConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(format!("{err}").contains("I/O error"));
    }
}
