//! Profile configuration for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A named API profile
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    /// Inventory API base URL
    pub api_url: Option<String>,
    /// Inventory API bearer token
    pub api_token: Option<String>,
    /// Default subaccount for this profile
    pub subaccount: Option<String>,
}

/// CLI configuration file: a map of named profiles
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Config {
    /// Load configuration from ~/.config/icov/config.json
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Profile {
        self.profiles.get(name).cloned().unwrap_or_default()
    }

    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("icov").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profiles() {
        let raw = r#"{
            "profiles": {
                "default": {"api_url": "https://acct.example.com", "api_token": "tok"},
                "staging": {"api_url": "https://staging.example.com", "subaccount": "sub-1"}
            }
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(
            config.profile("default").api_url.as_deref(),
            Some("https://acct.example.com")
        );
        assert_eq!(config.profile("staging").subaccount.as_deref(), Some("sub-1"));
    }

    #[test]
    fn test_missing_profile_is_empty() {
        let config = Config::default();
        let profile = config.profile("nope");
        assert!(profile.api_url.is_none());
        assert!(profile.api_token.is_none());
    }
}
