use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, TextGenerator};
use crate::config::GenerationParams;
use crate::error::AssistError;

const PROVIDER: &str = "claude";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    params: GenerationParams,
}

impl ClaudeClient {
    pub fn new(
        api_key: SecretString,
        model: &str,
        params: GenerationParams,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client()?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            params,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, prompt: &str) -> ClaudeRequest {
        ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.params.max_output_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            top_k: self.params.top_k,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        }
    }
}

fn reply_text(response: ClaudeResponse) -> Result<String, AssistError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|c| c.kind == "text")
        .map(|c| c.text)
        .collect();

    if text.is_empty() {
        return Err(AssistError::InvalidResponse {
            provider: PROVIDER,
            reason: "no text content".to_string(),
        });
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(AssistError::http(PROVIDER))?;

        let response = check_status(PROVIDER, response).await?;
        let body: ClaudeResponse = response.json().await.map_err(AssistError::http(PROVIDER))?;
        reply_text(body)
    }
}
