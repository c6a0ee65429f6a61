use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Claude,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::Ollama => "ollama",
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Gemini, Provider::Claude, Provider::Ollama]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini (Google)",
            Provider::Claude => "Claude (Anthropic)",
            Provider::Ollama => "Ollama (Local)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-pro",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::Ollama => "llama3.2:latest",
        }
    }

    /// Environment variable holding the credential, if the provider needs one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::Claude => Some("ANTHROPIC_API_KEY"),
            Provider::Ollama => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "claude" | "anthropic" => Ok(Provider::Claude),
            "ollama" => Ok(Provider::Ollama),
            _ => Err(ConfigError::UnknownProvider {
                name: s.to_string(),
                expected: Provider::all()
                    .iter()
                    .map(Provider::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(" CLAUDE ".parse::<Provider>().unwrap(), Provider::Claude);
        assert_eq!("ollama".parse::<Provider>().unwrap(), Provider::Ollama);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "openai".parse::<Provider>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider { .. }));
        assert_eq!(
            err.to_string(),
            "Unknown provider 'openai', expected one of: gemini, claude, ollama"
        );
    }

    #[test]
    fn test_as_str_round_trips() {
        for provider in Provider::all() {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_only_local_provider_needs_no_key() {
        assert_eq!(Provider::Ollama.api_key_env(), None);
        assert_eq!(Provider::Gemini.api_key_env(), Some("GEMINI_API_KEY"));
    }
}
