//! Service configuration

use anyhow::{bail, Result};
use recon_lib::fargate::DEFAULT_AGENT_IMAGE;
use recon_lib::models::Provider;
use recon_lib::run::RunOptions;
use recon_lib::search::{DEFAULT_LOOKBACK_HOURS, MAX_LOOKBACK_HOURS, MIN_LOOKBACK_HOURS};
use serde::Deserialize;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Inventory API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Inventory API bearer token
    #[serde(default)]
    pub api_token: String,

    /// HTTP port for health/metrics/result endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between reconciliation runs
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Collection window lookback in hours (1 hour to 7 days)
    #[serde(default = "default_lookback")]
    pub lookback_hours: u64,

    /// Restrict reconciliation to kubernetes-flagged instances
    #[serde(default)]
    pub kubernetes_only: bool,

    /// Also partition Fargate tasks by agent container presence
    #[serde(default)]
    pub include_fargate: bool,

    /// Image fragment identifying the agent container
    #[serde(default = "default_agent_image")]
    pub agent_image: String,

    /// Comma-separated providers to reconcile
    #[serde(default = "default_providers")]
    pub providers: String,

    /// Subaccount label for reporting context
    #[serde(default)]
    pub subaccount: Option<String>,
}

fn default_api_url() -> String {
    "https://inventory-api.example.com".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_interval() -> u64 {
    3600
}

fn default_lookback() -> u64 {
    DEFAULT_LOOKBACK_HOURS
}

fn default_agent_image() -> String {
    DEFAULT_AGENT_IMAGE.to_string()
}

fn default_providers() -> String {
    "Aws,Gcp,Azure".to_string()
}

impl ServiceConfig {
    /// Load configuration from RECON_-prefixed environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RECON"))
            .build()?;

        let loaded: ServiceConfig = config.try_deserialize().unwrap_or_else(|_| ServiceConfig {
            api_url: default_api_url(),
            api_token: String::new(),
            port: default_port(),
            interval_secs: default_interval(),
            lookback_hours: default_lookback(),
            kubernetes_only: false,
            include_fargate: false,
            agent_image: default_agent_image(),
            providers: default_providers(),
            subaccount: None,
        });
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_LOOKBACK_HOURS..=MAX_LOOKBACK_HOURS).contains(&self.lookback_hours) {
            bail!(
                "lookback_hours must be between {} and {}, got {}",
                MIN_LOOKBACK_HOURS,
                MAX_LOOKBACK_HOURS,
                self.lookback_hours
            );
        }
        self.parsed_providers()?;
        Ok(())
    }

    /// Providers parsed from the comma-separated config value
    pub fn parsed_providers(&self) -> Result<Vec<Provider>> {
        let mut providers = Vec::new();
        for name in self.providers.split(',') {
            match Provider::from_name(name) {
                Some(provider) => providers.push(provider),
                None => bail!("unknown provider in config: {name:?}"),
            }
        }
        if providers.is_empty() {
            bail!("at least one provider must be configured");
        }
        Ok(providers)
    }

    /// Run options derived from this configuration
    pub fn run_options(&self) -> Result<RunOptions> {
        Ok(RunOptions {
            lookback_hours: self.lookback_hours,
            providers: self.parsed_providers()?,
            kubernetes_only: self.kubernetes_only,
            subaccount: self.subaccount.clone(),
            include_fargate: self.include_fargate,
            agent_image: self.agent_image.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServiceConfig {
        ServiceConfig {
            api_url: default_api_url(),
            api_token: String::new(),
            port: default_port(),
            interval_secs: default_interval(),
            lookback_hours: default_lookback(),
            kubernetes_only: false,
            include_fargate: false,
            agent_image: default_agent_image(),
            providers: default_providers(),
            subaccount: None,
        }
    }

    #[test]
    fn test_default_providers_parse() {
        let config = base_config();
        let providers = config.parsed_providers().unwrap();
        assert_eq!(providers, vec![Provider::Aws, Provider::Gcp, Provider::Azure]);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let mut config = base_config();
        config.providers = "Aws,DigitalOcean".to_string();
        assert!(config.parsed_providers().is_err());
    }

    #[test]
    fn test_out_of_range_lookback_is_rejected() {
        let mut config = base_config();
        config.lookback_hours = 200;
        assert!(config.validate().is_err());
    }
}
