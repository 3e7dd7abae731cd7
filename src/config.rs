//! Optional config file loading. Search order: ./netcafe.toml, then
//! $XDG_CONFIG_HOME/netcafe/config.toml (or ~/.config/netcafe/config.toml).

use crate::scraper::{parse_site_list, Site};
use serde::Deserialize;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Per-source request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Number of HTTP attempts for transient failures (default 1, no retries).
    pub retry_count: Option<u32>,
    /// Delay in seconds before each retry (e.g. [1, 2, 4]).
    pub retry_backoff_secs: Option<Vec<u64>>,
    /// Fetch sources in parallel (default true).
    pub concurrent: Option<bool>,
    /// Source keys to scrape, in order (default: all).
    pub sources: Option<Vec<String>>,
}

impl Config {
    /// Configured sources, validated. None when the key is absent.
    pub fn sites(&self) -> Result<Option<Vec<Site>>, String> {
        match &self.sources {
            Some(keys) => parse_site_list(&keys.join(",")).map(Some),
            None => Ok(None),
        }
    }
}

/// Search order: (1) ./netcafe.toml, (2) $XDG_CONFIG_HOME/netcafe/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("netcafe.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("netcafe").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(Some(config));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.user_agent.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.retry_count.is_none());
        assert!(c.retry_backoff_secs.is_none());
        assert!(c.concurrent.is_none());
        assert!(c.sources.is_none());
        assert_eq!(c.sites().unwrap(), None);
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            user_agent = "Custom/1.0"
            timeout_secs = 20
            retry_count = 3
            retry_backoff_secs = [1, 2]
            concurrent = false
            sources = ["manboo", "kaikatsu"]
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.timeout_secs, Some(20));
        assert_eq!(c.retry_count, Some(3));
        assert_eq!(c.retry_backoff_secs.as_deref(), Some([1, 2].as_slice()));
        assert_eq!(c.concurrent, Some(false));
        assert_eq!(
            c.sites().unwrap(),
            Some(vec![Site::Manboo, Site::Kaikatsu])
        );
    }

    #[test]
    fn unknown_source_key_is_rejected() {
        let c: Config = toml::from_str(r#"sources = ["kaikatsu", "dice"]"#).unwrap();
        assert!(c.sites().is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("timeout_secs = [").is_err());
    }
}
