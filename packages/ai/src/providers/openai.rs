//! `OpenAI` chat completions provider implementation.

use serde::{Deserialize, Serialize};

use super::{LlmProvider, MAX_TOKENS, Message};
use crate::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    #[must_use]
    pub fn new(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Points the provider at an `OpenAI`-compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn build_request<'a>(
    model: &'a str,
    system_prompt: &'a str,
    messages: &'a [Message],
) -> OpenAiRequest<'a> {
    let mut api_messages = vec![OpenAiMessage {
        role: "system",
        content: system_prompt,
    }];
    api_messages.extend(messages.iter().map(|m| OpenAiMessage {
        role: &m.role,
        content: &m.content,
    }));

    OpenAiRequest {
        model,
        messages: api_messages,
        max_tokens: MAX_TOKENS,
    }
}

fn parse_response(status: reqwest::StatusCode, body: &str) -> Result<String, AiError> {
    if !status.is_success() {
        let err: OpenAiError = serde_json::from_str(body).unwrap_or_else(|_| OpenAiError {
            error: OpenAiErrorDetail {
                message: format!("HTTP {status}: {body}"),
            },
        });
        return Err(AiError::Provider {
            message: err.error.message,
        });
    }

    let response: OpenAiResponse = serde_json::from_str(body)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| AiError::Provider {
            message: "No text content in OpenAI response".to_string(),
        })
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, AiError> {
        let request = build_request(&self.model, system_prompt, messages);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        parse_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn system_prompt_leads_the_conversation() {
        let messages = vec![Message::user("Analyze this")];
        let request = build_request("gpt-4o", "You are an analyst.", &messages);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are an analyst.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Analyze this");
    }

    #[test]
    fn extracts_first_choice_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hotspot found"},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "Hotspot found");
    }

    #[test]
    fn empty_choices_is_provider_error() {
        let result = parse_response(StatusCode::OK, r#"{"choices":[]}"#);
        assert!(matches!(result, Err(AiError::Provider { .. })));
    }

    #[test]
    fn error_body_message_is_surfaced() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let Err(AiError::Provider { message }) = parse_response(StatusCode::UNAUTHORIZED, body)
        else {
            panic!("expected provider error");
        };
        assert_eq!(message, "Incorrect API key provided");
    }

    #[test]
    fn unparseable_error_body_keeps_status() {
        let Err(AiError::Provider { message }) =
            parse_response(StatusCode::BAD_GATEWAY, "upstream down")
        else {
            panic!("expected provider error");
        };
        assert!(message.contains("502"));
        assert!(message.contains("upstream down"));
    }
}
