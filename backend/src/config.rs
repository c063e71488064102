use crate::error::BackendError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const URL_ENV_VAR: &str = "NEIGHBORLY_URL";
pub const ANON_KEY_ENV_VAR: &str = "NEIGHBORLY_ANON_KEY";
pub const ACCESS_TOKEN_ENV_VAR: &str = "NEIGHBORLY_ACCESS_TOKEN";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,

    /// Public (anon) API key sent with every request
    #[serde(default)]
    pub anon_key: String,

    /// Session token of the signed-in user, if any
    #[serde(default)]
    pub access_token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Read the TOML file (when given and present), then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_toml_file(path)?,
            Some(path) => {
                return Err(BackendError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            BackendError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| BackendError::Config(err.to_string()))
    }

    /// Environment values win over file values; empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(URL_ENV_VAR) {
            self.url = url;
        }
        if let Some(key) = lookup(ANON_KEY_ENV_VAR) {
            self.anon_key = key;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV_VAR) {
            self.access_token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(BackendError::Config(format!(
                "backend url is not set (config `url` or {URL_ENV_VAR})"
            )));
        }
        let url = Url::parse(&self.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BackendError::Config(format!(
                "backend url must be http(s): {}",
                self.url
            )));
        }
        if self.anon_key.trim().is_empty() {
            return Err(BackendError::Config(format!(
                "anon key is not set (config `anon_key` or {ANON_KEY_ENV_VAR})"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(BackendError::Config("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn valid() -> BackendConfig {
        BackendConfig {
            url: "https://example.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_toml_with_defaults() {
        let config = BackendConfig::from_toml_str(
            r#"
url = "https://example.supabase.co"
anon_key = "anon"
"#,
        )
        .unwrap();
        assert_eq!(config, valid());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (URL_ENV_VAR, "http://localhost:54321"),
            (ACCESS_TOKEN_ENV_VAR, "token"),
            (ANON_KEY_ENV_VAR, "  "),
        ]);
        let mut config = valid();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.url, "http://localhost:54321");
        assert_eq!(config.anon_key, "anon");
        assert_eq!(config.access_token.as_deref(), Some("token"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.url = String::new();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.anon_key = String::new();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BackendConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, BackendError::Config(_)));
    }
}
