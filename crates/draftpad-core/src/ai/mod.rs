pub mod claude;
pub mod gemini;
pub mod ollama;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{AssistError, ConfigError};
use crate::provider::Provider;

/// A remote model that turns one prompt into one reply.
///
/// Calls are single-turn and non-streaming: implementations must not keep any
/// conversation state between calls.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs and the UI.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, AssistError>;
}

/// Build the generator selected by `config`.
pub fn create_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, ConfigError> {
    let provider = config.provider();
    let model = config.model();
    let params = config.generation;

    let missing_key = || ConfigError::MissingApiKey {
        provider: provider.as_str(),
        env_var: provider.api_key_env().unwrap_or_default(),
    };

    let generator: Arc<dyn TextGenerator> = match provider {
        Provider::Gemini => {
            let key = config.api_key(provider).ok_or_else(missing_key)?;
            let mut client = GeminiClient::new(key, &model, params)?;
            if let Some(url) = config.api_base_url() {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
        Provider::Claude => {
            let key = config.api_key(provider).ok_or_else(missing_key)?;
            let mut client = ClaudeClient::new(key, &model, params)?;
            if let Some(url) = config.api_base_url() {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
        Provider::Ollama => Arc::new(OllamaClient::new(config.ollama_url(), &model, params)?),
    };

    tracing::info!(provider = %provider, model = %model, "text generator ready");
    Ok(generator)
}

/// Shared HTTP client settings for every provider.
pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    let builder =
        reqwest::Client::builder().user_agent(concat!("draftpad/", env!("CARGO_PKG_VERSION")));
    // Tests talk to a loopback listener; a proxy from the environment must not intercept it
    #[cfg(test)]
    let builder = builder.no_proxy();
    builder.build()
}

/// Turn a non-success response into `AssistError::Status`, keeping the body for the log.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AssistError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AssistError::Status {
        provider,
        status,
        body,
    })
}
