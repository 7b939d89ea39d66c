use super::models::{AiConfig, AiMessage, AiProviderResponse};
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Sends a completion request to the AI provider.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>>;
}

// Lets the service hold a trait object when the provider is picked at runtime.
#[async_trait]
impl AiProvider for Box<dyn AiProvider> {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        (**self).chat_complete(messages, config).await
    }
}

/// Single-shot text generation on top of an `AiProvider`.
///
/// Every call is independent: one user message in, one answer out. The
/// config is fixed at construction and never mutated afterwards.
pub struct AiService<P: AiProvider> {
    provider: P,
    config: AiConfig,
}

impl<P: AiProvider> AiService<P> {
    pub fn new(provider: P, config: AiConfig) -> Self {
        Self { provider, config }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let messages = [AiMessage::user(prompt)];

        let response = self.provider.chat_complete(&messages, &self.config).await?;

        tracing::debug!(
            model = %self.config.model,
            chars = response.content.len(),
            "Model answered"
        );

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoProvider {
        seen: Mutex<Vec<(Vec<AiMessage>, String)>>,
    }

    #[async_trait]
    impl AiProvider for EchoProvider {
        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            config: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), config.model.clone()));
            Ok(AiProviderResponse {
                content: format!("echo: {}", messages[0].content),
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl AiProvider for FailingProvider {
        async fn chat_complete(
            &self,
            _: &[AiMessage],
            _: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            Err("quota exceeded".into())
        }
    }

    #[tokio::test]
    async fn generate_sends_a_single_user_message() {
        let provider = EchoProvider {
            seen: Mutex::new(Vec::new()),
        };
        let service = AiService::new(
            provider,
            AiConfig {
                model: "test-model".to_string(),
                ..Default::default()
            },
        );

        let answer = service.generate("What is the refund policy?").await.unwrap();
        assert_eq!(answer, "echo: What is the refund policy?");

        let seen = service.provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, vec![AiMessage::user("What is the refund policy?")]);
        assert_eq!(seen[0].1, "test-model");
    }

    #[tokio::test]
    async fn generate_propagates_provider_errors() {
        let boxed: Box<dyn AiProvider> = Box::new(FailingProvider);
        let service = AiService::new(boxed, AiConfig::default());

        let err = service.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
