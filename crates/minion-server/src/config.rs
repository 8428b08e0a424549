use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, ensure};

use minion_routing::{NetworkConfig, PEER_ID_PLACEHOLDER};

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub url_identifier: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub enforce_api_keys: bool,
    pub network: NetworkConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let name = var("MINION_NAME", "minion");
        let url_identifier = get("MINION_URL_IDENTIFIER").unwrap_or_else(|| name.clone());
        let port: u16 = var("MINION_PORT", "8080")
            .parse()
            .context("MINION_PORT must be a port number")?;
        let timeout_secs: u64 = var("MINION_HTTP_TIMEOUT_SECS", "10")
            .parse()
            .context("MINION_HTTP_TIMEOUT_SECS must be a whole number of seconds")?;
        let enforce_api_keys = matches!(
            var("MINION_ENFORCE_API_KEYS", "false").to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        let peer_url_template = var(
            "MINION_PEER_URL_TEMPLATE",
            "https://{id}.minion.example.com/receive",
        );
        ensure!(
            peer_url_template.contains(PEER_ID_PLACEHOLDER),
            "MINION_PEER_URL_TEMPLATE must contain {PEER_ID_PLACEHOLDER}"
        );

        Ok(Self {
            name,
            url_identifier,
            db_path: var("MINION_DB_PATH", "minion.db").into(),
            host: var("MINION_HOST", "0.0.0.0"),
            port,
            enforce_api_keys,
            network: NetworkConfig {
                master_url: var("MINION_MASTER_URL", "https://master.example.com"),
                peer_url_template,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.name, "minion");
        assert_eq!(cfg.url_identifier, "minion");
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.enforce_api_keys);
        assert_eq!(
            cfg.network.peer_url_template,
            "https://{id}.minion.example.com/receive"
        );
        assert_eq!(cfg.network.timeout, Duration::from_secs(10));
    }

    #[test]
    fn identifier_follows_name_unless_set() {
        let cfg = config(&[("MINION_NAME", "eu-1")]).unwrap();
        assert_eq!(cfg.url_identifier, "eu-1");

        let cfg = config(&[("MINION_NAME", "eu-1"), ("MINION_URL_IDENTIFIER", "europe")]).unwrap();
        assert_eq!(cfg.url_identifier, "europe");
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(config(&[("MINION_PORT", "eighty")]).is_err());
        assert!(config(&[("MINION_HTTP_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn peer_template_needs_placeholder() {
        let cfg = config(&[("MINION_PEER_URL_TEMPLATE", "http://10.0.0.7:8080/{id}/receive")]).unwrap();
        assert_eq!(cfg.network.peer_url_template, "http://10.0.0.7:8080/{id}/receive");

        assert!(config(&[("MINION_PEER_URL_TEMPLATE", "http://10.0.0.7:8080/receive")]).is_err());
    }

    #[test]
    fn api_key_enforcement_flag() {
        assert!(config(&[("MINION_ENFORCE_API_KEYS", "TRUE")]).unwrap().enforce_api_keys);
        assert!(!config(&[("MINION_ENFORCE_API_KEYS", "no")]).unwrap().enforce_api_keys);
    }
}
