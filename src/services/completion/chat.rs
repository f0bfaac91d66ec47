//! OpenAI-compatible chat completions provider
//!
//! Serves both OpenAI and OpenRouter; they differ only in base URL, model and
//! the attribution headers OpenRouter asks for.

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::completion::CompletionProvider,
};

#[derive(Clone)]
pub struct ChatCompletionProvider {
    name: &'static str,
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    extra_headers: Vec<(&'static str, String)>,
}

impl ChatCompletionProvider {
    pub fn new(
        name: &'static str,
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        model: String,
    ) -> Self {
        Self {
            name,
            http_client,
            api_key,
            api_url,
            model,
            extra_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request (e.g. `HTTP-Referer`)
    pub fn with_header(mut self, name: &'static str, value: String) -> Self {
        self.extra_headers.push((name, value));
        self
    }
}

#[async_trait::async_trait]
impl CompletionProvider for ChatCompletionProvider {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(provider = self.name, model = %self.model, "Sending chat completion request");

        let mut builder = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request);

        for (name, value) in &self.extra_headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "{} API returned status {}: {}",
                self.name, status, body
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Invalid {} response: {}", self.name, e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AppError::ExternalApi(format!(
                "{} response contained no text",
                self.name
            )));
        }

        Ok(content)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
