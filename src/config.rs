use std::{env, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://rdeapps.stanford.edu/dininghallmenu/";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    /// Raw origin pages are saved here when set.
    pub debug_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            host: "127.0.0.1".to_owned(),
            port: 3000,
            cache_ttl: Duration::from_secs(300),
            request_timeout: crate::fetch::DEFAULT_TIMEOUT,
            debug_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str, default| parse_or(key, lookup(key).as_deref(), default);
        Self {
            base_url: lookup("BASE_URL").unwrap_or(defaults.base_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT").as_deref(), defaults.port),
            cache_ttl: Duration::from_secs(parsed("CACHE_TTL_SECS", defaults.cache_ttl.as_secs())),
            request_timeout: Duration::from_secs(parsed(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            debug_dir: lookup("DEBUG_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, value: Option<&str>, default: T) -> T {
    match value.map(str::parse) {
        Some(Ok(v)) => v,
        Some(Err(_)) => {
            log::warn!("env var {key} is not valid, using the default.");
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.debug_dir, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BASE_URL", "http://localhost:8080/menu/"),
            ("PORT", "8081"),
            ("CACHE_TTL_SECS", "60"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("DEBUG_DIR", "/tmp/dumps"),
        ]);
        assert_eq!(config.base_url, "http://localhost:8080/menu/");
        assert_eq!(config.port, 8081);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.debug_dir, Some(PathBuf::from("/tmp/dumps")));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("CACHE_TTL_SECS", "-1"), ("DEBUG_DIR", "")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.debug_dir, None);
    }
}
