//! Generative-model completion providers
//!
//! Recommendations start as free text from a language model. Several hosted
//! models can produce it; the chain tries them in priority order and returns
//! the first usable answer.

use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    error::{AppError, AppResult},
};

pub mod chat;
pub mod gemini;

pub use chat::ChatCompletionProvider;
pub use gemini::GeminiProvider;

/// Trait for text completion backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt and return the raw model text
    async fn complete(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Ordered fallback over completion providers.
///
/// Providers are tried one at a time. Any failure, including a blank answer,
/// moves on to the next; a provider is never retried.
#[derive(Clone, Default)]
pub struct CompletionChain {
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl CompletionChain {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self { providers }
    }

    /// Registers Gemini, OpenAI and OpenRouter, each only if its key is set
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()?;

        let mut providers: Vec<Arc<dyn CompletionProvider>> = Vec::new();

        if let Some(key) = configured(&config.gemini_api_key) {
            providers.push(Arc::new(GeminiProvider::new(
                http_client.clone(),
                key,
                config.gemini_api_url.clone(),
                config.gemini_model.clone(),
            )));
        }

        if let Some(key) = configured(&config.openai_api_key) {
            providers.push(Arc::new(ChatCompletionProvider::new(
                "OpenAI",
                http_client.clone(),
                key,
                config.openai_api_url.clone(),
                config.openai_model.clone(),
            )));
        }

        if let Some(key) = configured(&config.openrouter_api_key) {
            let mut provider = ChatCompletionProvider::new(
                "OpenRouter",
                http_client,
                key,
                config.openrouter_api_url.clone(),
                config.openrouter_model.clone(),
            );
            if let Some(referer) = configured(&config.openrouter_referer) {
                provider = provider.with_header("HTTP-Referer", referer);
            }
            if let Some(title) = configured(&config.openrouter_title) {
                provider = provider.with_header("X-Title", title);
            }
            providers.push(Arc::new(provider));
        }

        let chain = Self::new(providers);
        tracing::info!(providers = ?chain.provider_names(), "Completion chain configured");
        Ok(chain)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First non-blank completion from the chain
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        if self.providers.is_empty() {
            return Err(AppError::AllProvidersExhausted(
                "no completion providers configured".to_string(),
            ));
        }

        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            tracing::info!(provider = provider.name(), "Requesting completion");

            match provider.complete(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(
                        provider = provider.name(),
                        chars = text.len(),
                        "Completion received"
                    );
                    return Ok(text);
                }
                Ok(_) => {
                    tracing::warn!(provider = provider.name(), "Completion was empty");
                    failures.push(format!("{}: empty response", provider.name()));
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Completion failed");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(AppError::AllProvidersExhausted(failures.join("; ")))
    }
}

fn configured(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn provider(name: &'static str, reply: AppResult<String>) -> MockCompletionProvider {
        let mut mock = MockCompletionProvider::new();
        mock.expect_name().return_const(name);
        let mut reply = Some(reply);
        mock.expect_complete()
            .times(1)
            .returning(move |_| reply.take().unwrap_or_else(|| Ok(String::new())));
        mock
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let mut unused = MockCompletionProvider::new();
        unused.expect_name().return_const("OpenRouter");
        unused.expect_complete().times(0);

        let chain = CompletionChain::new(vec![
            Arc::new(provider("Gemini", Ok("* Oldboy (2003) - ...".to_string()))),
            Arc::new(unused),
        ]);

        let text = chain.complete("prompt").await.unwrap();
        assert!(text.starts_with("* Oldboy"));
    }

    #[tokio::test]
    async fn test_failures_fall_through_in_order() {
        let mut seq = Sequence::new();
        let mut gemini = MockCompletionProvider::new();
        gemini.expect_name().return_const("Gemini");
        gemini
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::ExternalApi("status 503".to_string())));

        let mut openai = MockCompletionProvider::new();
        openai.expect_name().return_const("OpenAI");
        openai
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("   \n".to_string()));

        let mut openrouter = MockCompletionProvider::new();
        openrouter.expect_name().return_const("OpenRouter");
        openrouter
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("answer".to_string()));

        let chain = CompletionChain::new(vec![
            Arc::new(gemini),
            Arc::new(openai),
            Arc::new(openrouter),
        ]);
        assert_eq!(chain.complete("prompt").await.unwrap(), "answer");
    }

    #[tokio::test]
    async fn test_all_failed_is_exhausted() {
        let chain = CompletionChain::new(vec![
            Arc::new(provider("Gemini", Err(AppError::ExternalApi("timeout".to_string())))),
            Arc::new(provider("OpenAI", Ok(String::new()))),
        ]);

        match chain.complete("prompt").await {
            Err(AppError::AllProvidersExhausted(msg)) => {
                assert!(msg.contains("Gemini"));
                assert!(msg.contains("OpenAI: empty response"));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain = CompletionChain::default();
        assert!(chain.is_empty());
        let result = chain.complete("prompt").await;
        tokio_test::assert_err!(&result);
        assert!(matches!(result, Err(AppError::AllProvidersExhausted(_))));
    }

    #[test]
    fn test_from_config_registers_configured_providers() {
        let config = Config::from_iter(vec![
            ("TMDB_API_KEY".to_string(), "tmdb".to_string()),
            ("GEMINI_API_KEY".to_string(), "g".to_string()),
            ("OPENAI_API_KEY".to_string(), "  ".to_string()),
            ("OPENROUTER_API_KEY".to_string(), "or".to_string()),
        ])
        .unwrap();

        let chain = CompletionChain::from_config(&config).unwrap();
        assert_eq!(chain.provider_names(), vec!["Gemini", "OpenRouter"]);
    }
}
