//! Environment-driven shell configuration.

use std::env;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Where the shell finds the server. Read from `ANIMAL_API_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub api_url: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("ANIMAL_API_URL") {
            Some(api_url) if !api_url.trim().is_empty() => Self { api_url },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_server() {
        assert_eq!(ShellConfig::from_lookup(|_| None).api_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn blank_url_falls_back_to_default() {
        let config = ShellConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn reads_api_url() {
        let config = ShellConfig::from_lookup(|key| {
            (key == "ANIMAL_API_URL").then(|| "http://animals.test".to_string())
        });
        assert_eq!(config.api_url, "http://animals.test");
    }
}
