use std::sync::Arc;

use crate::models::{Locale, Message};
use crate::providers::{AiProvider, GenerateRequest, SamplingConfig, Turn, TurnRole};
use crate::services::instruction::build_instruction;
use crate::services::settings::AppSettings;
use crate::services::translations::translations;

/// Credentials and model selection for every request.
#[derive(Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub sampling: SamplingConfig,
}

impl From<&AppSettings> for AssistantConfig {
    fn from(settings: &AppSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.api_base_url.clone(),
            sampling: SamplingConfig::default(),
        }
    }
}

/// Talks to the AI backend on behalf of the chat. Always yields text to show.
#[derive(Clone)]
pub struct AssistantService {
    provider: Arc<dyn AiProvider>,
    config: AssistantConfig,
}

impl AssistantService {
    pub fn new(provider: Arc<dyn AiProvider>, config: AssistantConfig) -> Self {
        Self { provider, config }
    }

    /// Ask the backend to answer `user_text` given the earlier messages of the
    /// session. Failures turn into a localized apology instead of an error.
    pub async fn generate_response(
        &self,
        user_text: &str,
        prior_messages: &[Message],
        locale: Locale,
    ) -> String {
        let strings = translations(locale);
        let request = self.build_request(user_text, prior_messages, locale);

        tracing::debug!(
            "Sending {} turns to {} ({})",
            request.turns.len(),
            self.provider.name(),
            request.model
        );

        match self.provider.generate(request).await {
            Ok(response) => {
                tracing::debug!(
                    "Usage: {:?} tokens in, {:?} tokens out",
                    response.tokens_in,
                    response.tokens_out
                );
                match response.text {
                    Some(text) if !text.is_empty() => text,
                    _ => {
                        tracing::warn!("{} returned no text", self.provider.name());
                        strings.empty_response.to_string()
                    }
                }
            }
            Err(e) => {
                tracing::error!("{} API error: {}", self.provider.name(), e);
                strings.service_error.to_string()
            }
        }
    }

    fn build_request(
        &self,
        user_text: &str,
        prior_messages: &[Message],
        locale: Locale,
    ) -> GenerateRequest {
        GenerateRequest {
            api_key: self.config.api_key.clone(),
            model: self.config.model.clone(),
            base_url: self.config.base_url.clone(),
            turns: build_turns(user_text, prior_messages),
            system_instruction: build_instruction(locale),
            sampling: self.config.sampling,
        }
    }
}

/// Prior messages in order, followed by the new user turn.
pub fn build_turns(user_text: &str, prior_messages: &[Message]) -> Vec<Turn> {
    prior_messages
        .iter()
        .map(|m| Turn::new(TurnRole::from(m.role), m.content.clone()))
        .chain(std::iter::once(Turn::new(TurnRole::User, user_text)))
        .collect()
}
