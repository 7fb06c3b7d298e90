use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::locale::Language;
use crate::policy::Policy;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub language: Option<String>,
    pub policy: Option<String>,
    pub proxy_base: Option<String>,
    pub api_base: Option<String>,
    pub default_model: Option<String>,
    pub storage_path: Option<PathBuf>,
    pub typewriter_chunk: Option<usize>,
    pub typewriter_delay_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            language: Some(Language::English.as_str().to_string()),
            policy: Some(Policy::Proxy.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Configured language; unknown values are an error rather than a silent default
    pub fn language(&self) -> Result<Language> {
        match &self.language {
            None => Ok(Language::default()),
            Some(s) => Language::from_str(s).ok_or_else(|| anyhow!("unknown language '{}'", s)),
        }
    }

    pub fn policy(&self) -> Result<Policy> {
        match &self.policy {
            None => Ok(Policy::Proxy),
            Some(s) => parse_policy(s),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("minichat").join("config.json"))
    }
}

/// Parse a policy name, listing the accepted ones on failure
pub fn parse_policy(s: &str) -> Result<Policy> {
    Policy::from_str(s).ok_or_else(|| {
        let expected: Vec<&str> = Policy::all().iter().map(|p| p.as_str()).collect();
        anyhow!("unknown policy '{}' (expected {})", s, expected.join(" or "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.policy().unwrap(), Policy::Proxy);
        assert_eq!(config.language().unwrap(), Language::English);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub/config.json");
        let config = Config {
            language: Some("zh".to_string()),
            policy: Some("direct".to_string()),
            proxy_base: Some("https://fn.example.com".to_string()),
            typewriter_chunk: Some(5),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.language().unwrap(), Language::Chinese);
        assert_eq!(loaded.policy().unwrap(), Policy::Direct);
    }

    #[test]
    fn test_partial_file_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "proxy_base": "http://localhost:8787" }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.proxy_base.as_deref(), Some("http://localhost:8787"));
        assert!(config.policy.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_unknown_policy_is_an_error() {
        let config = Config {
            policy: Some("telegram".to_string()),
            ..Config::default()
        };
        let err = config.policy().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown policy 'telegram' (expected proxy or direct)"
        );
    }
}
