//! Configuration management
//!
//! Handles:
//! - Metadata snapshot location
//! - Reconcile loop timing
//! - Default log filter
//!
//! The file is TOML. `HOSTNET_AGENT_CONFIG` overrides its location, otherwise
//! it lives in the OS config directory. A missing or empty file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "HOSTNET_AGENT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub metadata: MetadataConfig,
    pub resolver: ResolverConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub poll_interval_secs: u64,
    pub run_once: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("/var/lib/hostnet/metadata.json"),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            run_once: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "hostnet_agent=info,hostnet_resolver=info".to_string(),
        }
    }
}

impl AgentConfig {
    /// Load config from the env override or the OS-specific location
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        Self::load_from(&config_path).await
    }

    /// Load config from `path`, defaults when the file is absent or empty
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run without config - use defaults
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Get config file path, `HOSTNET_AGENT_CONFIG` first
    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("hostnet-agent");
        path.push("config.toml");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.resolver.poll_interval_secs, 30);
        assert!(!config.resolver.run_once);
        assert!(config.log.filter.contains("hostnet_resolver"));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AgentConfig::load_from(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\nrun_once = true\n\n[metadata]\nsnapshot_path = \"/tmp/snap.json\"").unwrap();

        let config = AgentConfig::load_from(file.path()).await.unwrap();
        assert!(config.resolver.run_once);
        assert_eq!(config.resolver.poll_interval_secs, 30);
        assert_eq!(config.metadata.snapshot_path, PathBuf::from("/tmp/snap.json"));
        assert_eq!(config.log, LogConfig::default());
    }

    #[tokio::test]
    async fn test_empty_file_yields_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = AgentConfig::load_from(file.path()).await.unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver\npoll_interval_secs = ").unwrap();

        assert!(AgentConfig::load_from(file.path()).await.is_err());
    }

    #[test]
    fn test_config_file_path() {
        if std::env::var(CONFIG_ENV_VAR).is_ok() || dirs::config_dir().is_none() {
            return;
        }

        let path = AgentConfig::config_file_path().unwrap();
        assert!(path.to_string_lossy().contains("hostnet-agent"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
