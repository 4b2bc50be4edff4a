use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiError, ContentBlock, Message, MessagesRequest, MessagesResponse};

const API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const MAX_OUTPUT_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ClaudeError {
    #[error("ANTHROPIC_API_KEY not set. Get one at https://console.anthropic.com")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API temporarily overloaded: {0}")]
    Overloaded(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone)]
pub struct ClaudeClient {
    http: Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    /// Reads `ANTHROPIC_API_KEY` and `ANTHROPIC_MODEL` from the environment.
    /// A missing key is not an error until the first call.
    pub fn from_env(http: Client) -> Self {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey);
        if api_key.is_none() {
            warn!("ANTHROPIC_API_KEY not set; extraction, article, and name lookup will fail");
        }
        let model = env::var("ANTHROPIC_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            http,
            api_key,
            model,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: Some(ApiKey("test-key".to_string())),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn without_key(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    /// Single-turn completion: one system prompt, one user message, text out.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, ClaudeError> {
        let api_key = self.api_key.as_ref().ok_or(ClaudeError::ApiKeyNotSet)?;
        let url = format!("{}/v1/messages", self.base_url);

        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_OUTPUT_TOKENS,
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &api_key.0)
            .header("anthropic-version", API_VERSION)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Anthropic API rate limited");
            return Err(ClaudeError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<MessagesResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = classify_api_error(status.as_u16(), err);
                warn!(error = %classified, "Anthropic API error");
                return Err(classified);
            }
            let snippet: String = text.chars().take(200).collect();
            warn!(status = %status, "Anthropic API error (no structured body)");
            return Err(ClaudeError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {snippet}"),
            });
        }

        let body: MessagesResponse = response.json().await?;
        if let Some(err) = &body.error {
            let classified = classify_api_error(status.as_u16(), err);
            warn!(error = %classified, "Anthropic API error in 200 response");
            return Err(classified);
        }

        debug!(model = %self.model, "completion received");
        collect_text(body.content.as_deref().unwrap_or_default())
    }
}

fn collect_text(blocks: &[ContentBlock]) -> Result<String, ClaudeError> {
    let text: String = blocks
        .iter()
        .filter(|b| b.kind.as_deref() == Some("text"))
        .filter_map(|b| b.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        warn!("model returned empty text (refusal or truncation)");
        return Err(ClaudeError::EmptyResponse);
    }
    Ok(text)
}

fn classify_api_error(status: u16, err: &ApiError) -> ClaudeError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match (status, err.kind.as_deref()) {
        (429, _) | (_, Some("rate_limit_error")) => ClaudeError::RateLimited,
        (529, _) | (_, Some("overloaded_error")) => ClaudeError::Overloaded(message),
        _ => ClaudeError::Api {
            code: status,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(kind: &str, message: &str) -> ApiError {
        ApiError {
            kind: Some(kind.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn classify_rate_limit_by_type() {
        let err = api_error("rate_limit_error", "Too many requests");
        assert!(matches!(
            classify_api_error(400, &err),
            ClaudeError::RateLimited
        ));
    }

    #[test]
    fn classify_overloaded_by_status() {
        let err = api_error("api_error", "Overloaded");
        assert!(matches!(
            classify_api_error(529, &err),
            ClaudeError::Overloaded(_)
        ));
    }

    #[test]
    fn classify_other_as_generic_api_error() {
        let err = api_error("invalid_request_error", "max_tokens must be positive");
        match classify_api_error(400, &err) {
            ClaudeError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "max_tokens must be positive");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn collect_text_joins_text_blocks() {
        let blocks = vec![
            ContentBlock {
                kind: Some("text".into()),
                text: Some("Hello ".into()),
            },
            ContentBlock {
                kind: Some("text".into()),
                text: Some("world".into()),
            },
        ];
        assert_eq!(collect_text(&blocks).unwrap(), "Hello world");
    }

    #[test]
    fn collect_text_empty_is_error() {
        assert!(matches!(collect_text(&[]), Err(ClaudeError::EmptyResponse)));
    }
}
