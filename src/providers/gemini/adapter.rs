use async_trait::async_trait;
use reqwest::Client;

use super::models::*;
use crate::providers::traits::AiProvider;
use crate::providers::types::*;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn base_url(custom: Option<&str>) -> &str {
        custom.unwrap_or(DEFAULT_BASE_URL)
    }

    /// Parse an API error response body into a user-friendly message.
    fn parse_error_message(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(msg) = parsed["error"]["message"].as_str() {
                return format!("HTTP {}: {}", status.as_u16(), msg);
            }
        }
        format!("HTTP {}: Request failed", status.as_u16())
    }

    fn build_contents(turns: &[Turn]) -> Vec<GeminiContent> {
        turns
            .iter()
            .map(|turn| GeminiContent {
                role: turn.role.as_str().to_string(),
                parts: vec![GeminiPart {
                    text: Some(turn.text.clone()),
                }],
            })
            .collect()
    }

    fn build_request(request: &GenerateRequest) -> GeminiRequest {
        let system_instruction = if request.system_instruction.trim().is_empty() {
            None
        } else {
            Some(GeminiSystemInstruction {
                parts: vec![GeminiPart {
                    text: Some(request.system_instruction.clone()),
                }],
            })
        };

        GeminiRequest {
            contents: Self::build_contents(&request.turns),
            system_instruction,
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(request.sampling.temperature),
                top_p: Some(request.sampling.top_p),
                top_k: Some(request.sampling.top_k),
            }),
        }
    }

    /// Concatenate the text parts of the first candidate. `None` when there is no text at all.
    fn extract_text(response: GeminiResponse) -> Result<GenerateResponse, ProviderError> {
        if let Some(error) = response.error {
            return Err(ProviderError::RequestFailed(
                error.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let candidate = response.candidates.and_then(|c| c.into_iter().next());
        if let Some(reason) = candidate.as_ref().and_then(|c| c.finish_reason.as_deref()) {
            tracing::debug!("Gemini finish reason: {}", reason);
        }

        let text = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty());

        let (tokens_in, tokens_out) = response
            .usage_metadata
            .map(|u| (u.prompt_token_count, u.candidates_token_count))
            .unwrap_or((None, None));

        Ok(GenerateResponse {
            text,
            tokens_in,
            tokens_out,
        })
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let base = Self::base_url(request.base_url.as_deref());
        let url = format!("{}/models/{}:generateContent", base, request.model);

        let gemini_request = Self::build_request(&request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &request.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ProviderError::AuthError("Invalid API key".to_string()));
        }

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(Self::parse_error_message(
                status, &body,
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Self::extract_text(gemini_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(turns: Vec<Turn>) -> GenerateRequest {
        GenerateRequest {
            api_key: "key".to_string(),
            model: "gemini-test".to_string(),
            base_url: None,
            turns,
            system_instruction: "Be helpful.".to_string(),
            sampling: SamplingConfig::default(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let req = request(vec![
            Turn::new(TurnRole::User, "A"),
            Turn::new(TurnRole::Model, "B"),
            Turn::new(TurnRole::User, "C"),
        ]);
        let body = serde_json::to_value(GeminiProvider::build_request(&req)).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "B");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be helpful.");

        let config = &body["generationConfig"];
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(config["topK"], 40);
    }

    #[test]
    fn test_blank_instruction_is_omitted() {
        let mut req = request(vec![Turn::new(TurnRole::User, "hi")]);
        req.system_instruction = "   ".to_string();
        let body = serde_json::to_value(GeminiProvider::build_request(&req)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Olá, "}, {"text": "estudante."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let response = GeminiProvider::extract_text(parsed).unwrap();
        assert_eq!(response.text.as_deref(), Some("Olá, estudante."));
        assert_eq!(response.tokens_in, Some(12));
        assert_eq!(response.tokens_out, Some(4));
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let parsed: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let response = GeminiProvider::extract_text(parsed).unwrap();
        assert!(response.text.is_none());

        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(GeminiProvider::extract_text(parsed).unwrap().text.is_none());
    }

    #[test]
    fn test_extract_text_surfaces_embedded_error() {
        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"error": {"message": "quota exceeded"}}"#).unwrap();
        let err = GeminiProvider::extract_text(parsed).unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed(msg) if msg == "quota exceeded"));
    }

    #[test]
    fn test_parse_error_message() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(
            GeminiProvider::parse_error_message(status, body),
            "HTTP 400: API key not valid"
        );
        assert_eq!(
            GeminiProvider::parse_error_message(status, "<html>"),
            "HTTP 400: Request failed"
        );
    }
}
