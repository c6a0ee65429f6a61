use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, http_client, TextGenerator};
use crate::config::GenerationParams;
use crate::error::AssistError;

const PROVIDER: &str = "ollama";

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    params: GenerationParams,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        model: &str,
        params: GenerationParams,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            params,
        })
    }

    fn request_body(&self, prompt: &str) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.params.temperature,
                top_p: self.params.top_p,
                top_k: self.params.top_k,
                num_predict: self.params.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(AssistError::http(PROVIDER))?;

        let response = check_status(PROVIDER, response).await?;
        let ollama_response: OllamaResponse =
            response.json().await.map_err(AssistError::http(PROVIDER))?;
        Ok(ollama_response.response)
    }
}
