use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::provider::Provider;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Sampling parameters sent with every assist request.
///
/// Fixed for the lifetime of a session; only the config file can change them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub ollama_url: Option<String>,
    /// Endpoint override for the hosted providers, e.g. a proxy.
    pub api_base_url: Option<String>,
    pub generation: GenerationParams,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the user's config file. On first run a default file is written
    /// so there is something to edit.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_create(&Self::config_path()?)
    }

    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::new();
        match config.save_to(path) {
            Ok(()) => tracing::info!(path = %path.display(), "wrote default config"),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "could not write default config")
            }
        }
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("draftpad").join("config.json"))
    }

    /// Apply `DRAFTPAD_PROVIDER` / `DRAFTPAD_MODEL` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("DRAFTPAD_PROVIDER") {
            match value.parse::<Provider>() {
                Ok(provider) => {
                    if self.provider != Some(provider) {
                        // A model chosen for another provider would not exist there
                        self.model = None;
                    }
                    self.provider = Some(provider);
                }
                Err(e) => tracing::warn!(%e, "ignoring DRAFTPAD_PROVIDER"),
            }
        }

        if let Some(model) = lookup("DRAFTPAD_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = Some(model);
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider().default_model().to_string())
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Credential for `provider`: environment variable first, then config file.
    pub fn api_key(&self, provider: Provider) -> Option<SecretString> {
        self.api_key_with(provider, |name| std::env::var(name).ok())
    }

    pub fn api_key_with(
        &self,
        provider: Provider,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<SecretString> {
        let env_var = provider.api_key_env()?;
        let from_config = match provider {
            Provider::Gemini => self.gemini_api_key.clone(),
            Provider::Claude => self.claude_api_key.clone(),
            Provider::Ollama => None,
        };

        let present = |key: &String| !key.trim().is_empty();
        lookup(env_var)
            .filter(present)
            .or_else(|| from_config.filter(present))
            .map(SecretString::from)
    }

    /// Where the key for `provider` comes from: "env", "config", "local" or None.
    pub fn key_source(&self, provider: Provider) -> Option<&'static str> {
        let Some(env_var) = provider.api_key_env() else {
            return Some("local");
        };
        if std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty()) {
            Some("env")
        } else if self.api_key_with(provider, |_| None).is_some() {
            Some("config")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_generation_settings() {
        let config = Config::new();
        assert_eq!(config.provider(), Provider::Gemini);
        assert_eq!(config.model(), "gemini-1.5-pro");
        assert_eq!(config.generation.temperature, 0.7);
        assert_eq!(config.generation.top_p, 0.95);
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.generation.max_output_tokens, 8192);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.ollama_url(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(config.provider.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_first_load_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draftpad").join("config.json");

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.provider(), Provider::Gemini);

        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(reloaded.generation, GenerationParams::default());
        assert!(reloaded.gemini_api_key.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.provider = Some(Provider::Ollama);
        config.model = Some("gemma3:latest".to_string());
        config.generation.temperature = 0.2;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider(), Provider::Ollama);
        assert_eq!(loaded.model(), "gemma3:latest");
        assert_eq!(loaded.generation.temperature, 0.2);
        assert_eq!(loaded.generation.top_k, 40);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider":"claude","generation":{"top_k":10}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider(), Provider::Claude);
        assert_eq!(config.model(), "claude-sonnet-4-20250514");
        assert_eq!(config.generation.top_k, 10);
        assert_eq!(config.generation.max_output_tokens, 8192);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::new();
        config.model = Some("gemini-1.5-flash".to_string());

        config.apply_overrides(env(&[("DRAFTPAD_PROVIDER", "ollama")]));
        assert_eq!(config.provider(), Provider::Ollama);
        assert_eq!(config.model(), "llama3.2:latest");

        config.apply_overrides(env(&[("DRAFTPAD_MODEL", "mistral")]));
        assert_eq!(config.model(), "mistral");
    }

    #[test]
    fn test_blank_api_base_url_is_ignored() {
        let mut config = Config::new();
        assert_eq!(config.api_base_url(), None);
        config.api_base_url = Some("  ".to_string());
        assert_eq!(config.api_base_url(), None);
        config.api_base_url = Some(" http://proxy.local ".to_string());
        assert_eq!(config.api_base_url(), Some("http://proxy.local"));
    }

    #[test]
    fn test_ollama_key_source_is_local() {
        let config = Config::new();
        assert_eq!(config.key_source(Provider::Ollama), Some("local"));
        assert!(config.api_key(Provider::Ollama).is_none());
    }

    #[test]
    fn test_invalid_provider_override_is_ignored() {
        let mut config = Config::new();
        config.apply_overrides(env(&[("DRAFTPAD_PROVIDER", "nonsense")]));
        assert_eq!(config.provider(), Provider::Gemini);
    }

    #[test]
    fn test_api_key_prefers_environment() {
        let mut config = Config::new();
        config.gemini_api_key = Some("from-config".to_string());

        let key = config
            .api_key_with(Provider::Gemini, env(&[("GEMINI_API_KEY", "from-env")]))
            .unwrap();
        assert_eq!(key.expose_secret(), "from-env");

        let key = config.api_key_with(Provider::Gemini, env(&[])).unwrap();
        assert_eq!(key.expose_secret(), "from-config");
        assert!(!format!("{:?}", key).contains("from-config"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let mut config = Config::new();
        config.claude_api_key = Some("   ".to_string());
        assert!(config.api_key_with(Provider::Claude, env(&[])).is_none());
        assert!(config.api_key_with(Provider::Ollama, env(&[])).is_none());

        config.claude_api_key = Some("sk-ant-config".to_string());
        let key = config
            .api_key_with(Provider::Claude, env(&[("ANTHROPIC_API_KEY", "")]))
            .unwrap();
        assert_eq!(key.expose_secret(), "sk-ant-config");
    }
}
