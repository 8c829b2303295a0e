//! LLM provider abstraction and implementations.
//!
//! Supports `OpenAI` and Anthropic Claude via a common trait.

pub mod anthropic;
pub mod openai;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::AiError;

/// Default `OpenAI` model used when `AI_MODEL` is not set.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Default Anthropic model used when `AI_MODEL` is not set.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Maximum tokens requested from the model per completion.
pub(crate) const MAX_TOKENS: u32 = 4096;

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name used in log messages.
    fn name(&self) -> &str;

    /// Sends a completion request and returns the model's text reply.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the response carries no
    /// text.
    async fn complete(&self, system_prompt: &str, messages: &[Message])
    -> Result<String, AiError>;
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `OPENAI_API_KEY` set -> `OpenAI`
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
///
/// `AI_MODEL` overrides the provider's default model and `AI_BASE_URL`
/// points the `OpenAI` provider at a compatible server.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env(
    timeout: Option<Duration>,
) -> Result<Box<dyn LlmProvider>, AiError> {
    create_provider(|key| std::env::var(key).ok(), timeout)
}

/// Creates an LLM provider from settings resolved through `lookup`.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// requested provider is unknown. Returns [`AiError::Http`] if the HTTP
/// client cannot be built.
pub fn create_provider(
    lookup: impl Fn(&str) -> Option<String>,
    timeout: Option<Duration>,
) -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = lookup("AI_PROVIDER").unwrap_or_else(|| detect_provider(&lookup));
    let client = build_client(timeout)?;

    match provider.to_lowercase().as_str() {
        "openai" | "gpt" => {
            let api_key = require(&lookup, "OPENAI_API_KEY")?;
            let model = lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            let mut provider = openai::OpenAiProvider::new(api_key, model, client);
            if let Some(base_url) = lookup("AI_BASE_URL") {
                provider = provider.with_base_url(base_url);
            }
            Ok(Box::new(provider))
        }
        "anthropic" | "claude" => {
            let api_key = require(&lookup, "ANTHROPIC_API_KEY")?;
            let model = lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(
                api_key, model, client,
            )))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'openai' or 'anthropic'."),
        }),
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, AiError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AiError::Config {
            message: format!("{key} environment variable not set"),
        })
}

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, AiError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_provider`].
fn detect_provider(lookup: &impl Fn(&str) -> Option<String>) -> String {
    if lookup("OPENAI_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    if lookup("ANTHROPIC_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set OPENAI_API_KEY or ANTHROPIC_API_KEY, \
         or set AI_PROVIDER explicitly."
    );

    // Fall back to openai: produces a clear error about the missing key
    "openai".to_string()
}
