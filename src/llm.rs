//! Text-generation backend.
//!
//! Everything that talks to a model goes through [`TextGenerator`], so the
//! pipeline can run against a stub in tests and against
//! [`DisabledGenerator`] when no backend should be contacted.

use crate::config::GeneratorConfig;
use anyhow::{Result, bail};
use std::sync::Arc;
use thiserror::Error;

/// Any failure to produce text. Consumers treat every variant the same way:
/// the backend is unavailable and they fall back to deterministic output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Text generation is disabled")]
    Disabled,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Disabled)
    }
}

/// A `provider/model` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: String,
    pub model: String,
}

impl ModelSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('/') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok(Self {
                provider: provider.to_string(),
                model: model.to_string(),
            }),
            _ => bail!(
                "Model must be in format \"provider/model\" (e.g., \"openai/gpt-5.1\"), got {spec:?}"
            ),
        }
    }
}

/// Picks the backend for `config.model`. With `use_llm` off no backend is
/// built at all.
///
/// The HTTP backends use a blocking client, so call this (and drop the
/// result) outside of an async context.
pub fn build_generator(config: &GeneratorConfig, use_llm: bool) -> Result<Arc<dyn TextGenerator>> {
    let spec = ModelSpec::parse(&config.model)?;

    if !use_llm {
        return Ok(Arc::new(DisabledGenerator));
    }

    match spec.provider.as_str() {
        #[cfg(feature = "openai")]
        "openai" => Ok(Arc::new(openai::OpenAiGenerator::from_env(
            spec.model,
            config.max_tokens,
        )?)),
        #[cfg(not(feature = "openai"))]
        "openai" => {
            log::warn!("Built without the openai feature, features will not be synthesized");
            Ok(Arc::new(DisabledGenerator))
        }
        #[cfg(feature = "anthropic")]
        "anthropic" => Ok(Arc::new(anthropic::AnthropicGenerator::from_env(
            spec.model,
            config.max_tokens,
            config.temperature,
        )?)),
        #[cfg(not(feature = "anthropic"))]
        "anthropic" => {
            log::warn!("Built without the anthropic feature, features will not be synthesized");
            Ok(Arc::new(DisabledGenerator))
        }
        other => bail!("Unsupported provider: {other}"),
    }
}

#[cfg(any(feature = "openai", feature = "anthropic"))]
mod http {
    use super::GenerateError;
    use anyhow::{Context, Result};
    use reqwest::blocking::Client;
    use std::time::Duration;

    const CONNECT_TIMEOUT_SECS: u64 = 10;
    const REQUEST_TIMEOUT_SECS: u64 = 300;

    pub(super) fn client() -> Result<Client> {
        Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("llmmd/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")
    }

    /// Reads the whole body, turning non-2xx replies into
    /// [`GenerateError::Status`].
    pub(super) fn read_body(
        response: reqwest::blocking::Response,
    ) -> Result<String, GenerateError> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    pub(super) fn env_non_empty(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

#[cfg(feature = "openai")]
pub mod openai {
    //! OpenAI Responses API client.

    use super::{GenerateError, TextGenerator, http};
    use anyhow::Result;
    use log::debug;
    use reqwest::blocking::Client;
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_REASONING_EFFORT: &str = "low";

    pub struct OpenAiGenerator {
        client: Client,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        reasoning_effort: Option<String>,
        base_url: String,
    }

    /// Reasoning models (`gpt-5*`, `o1`, `o3`, `o4-*`) accept an effort hint;
    /// older chat models reject the field.
    pub fn is_reasoning_model(model: &str) -> bool {
        model.starts_with("gpt-5")
            || ["o1", "o3", "o4"]
                .iter()
                .any(|series| model == *series || model.starts_with(&format!("{series}-")))
    }

    impl OpenAiGenerator {
        pub fn new(
            api_key: Option<String>,
            model: impl Into<String>,
            max_tokens: u32,
        ) -> Result<Self> {
            let model = model.into();
            let reasoning_effort =
                is_reasoning_model(&model).then(|| DEFAULT_REASONING_EFFORT.to_string());

            Ok(Self {
                client: http::client()?,
                api_key: api_key.filter(|k| !k.trim().is_empty()),
                model,
                max_tokens,
                reasoning_effort,
                base_url: DEFAULT_BASE_URL.to_string(),
            })
        }

        /// Reads `OPENAI_API_KEY` and `OPENAI_BASE_URL`. A missing key is not
        /// an error here; every call will report it instead.
        pub fn from_env(model: impl Into<String>, max_tokens: u32) -> Result<Self> {
            let generator = Self::new(http::env_non_empty("OPENAI_API_KEY"), model, max_tokens)?;
            Ok(match http::env_non_empty("OPENAI_BASE_URL") {
                Some(url) => generator.with_base_url(url),
                None => generator,
            })
        }

        /// For OpenAI-compatible endpoints.
        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into().trim_end_matches('/').to_string();
            self
        }

        /// `None` leaves the field out of the request.
        pub fn with_reasoning_effort(mut self, effort: Option<String>) -> Self {
            self.reasoning_effort = effort;
            self
        }

        fn request<'a>(&'a self, prompt: &'a str) -> ResponsesRequest<'a> {
            ResponsesRequest {
                model: &self.model,
                input: prompt,
                max_output_tokens: self.max_tokens,
                reasoning: self
                    .reasoning_effort
                    .as_deref()
                    .map(|effort| Reasoning { effort }),
            }
        }
    }

    impl TextGenerator for OpenAiGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            let api_key = self.api_key.as_deref().ok_or_else(|| {
                GenerateError::MissingCredentials("OPENAI_API_KEY is not set".to_string())
            })?;

            let url = format!("{}/responses", self.base_url);
            debug!("Requesting {} ({} prompt bytes)", url, prompt.len());

            let response = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&self.request(prompt))
                .send()
                .map_err(|e| GenerateError::Network(e.to_string()))?;

            parse_response(&http::read_body(response)?)
        }
    }

    #[derive(Serialize)]
    struct ResponsesRequest<'a> {
        model: &'a str,
        input: &'a str,
        max_output_tokens: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<Reasoning<'a>>,
    }

    #[derive(Serialize)]
    struct Reasoning<'a> {
        effort: &'a str,
    }

    #[derive(Deserialize)]
    struct ResponsesBody {
        #[serde(default)]
        output: Vec<OutputItem>,
    }

    #[derive(Deserialize)]
    struct OutputItem {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        content: Vec<ContentPart>,
    }

    #[derive(Deserialize)]
    struct ContentPart {
        #[serde(default)]
        text: Option<String>,
    }

    /// Takes the first completed message; reasoning items are skipped.
    pub(crate) fn parse_response(body: &str) -> Result<String, GenerateError> {
        let parsed: ResponsesBody = serde_json::from_str(body)
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        parsed
            .output
            .into_iter()
            .find(|item| item.kind == "message" && item.status.as_deref() == Some("completed"))
            .and_then(|item| item.content.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                GenerateError::InvalidResponse("no completed message in output".to_string())
            })
    }

}

#[cfg(feature = "anthropic")]
pub mod anthropic {
    //! Anthropic Messages API client.

    use super::{GenerateError, TextGenerator, http};
    use anyhow::Result;
    use log::debug;
    use reqwest::blocking::Client;
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
    const ANTHROPIC_VERSION: &str = "2023-06-01";

    pub struct AnthropicGenerator {
        client: Client,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        temperature: f32,
        base_url: String,
    }

    impl AnthropicGenerator {
        pub fn new(
            api_key: Option<String>,
            model: impl Into<String>,
            max_tokens: u32,
            temperature: f32,
        ) -> Result<Self> {
            Ok(Self {
                client: http::client()?,
                api_key: api_key.filter(|k| !k.trim().is_empty()),
                model: model.into(),
                max_tokens,
                temperature,
                base_url: DEFAULT_BASE_URL.to_string(),
            })
        }

        /// Reads `ANTHROPIC_API_KEY` and `ANTHROPIC_BASE_URL`. As with the
        /// OpenAI backend, a missing key surfaces on the first call.
        pub fn from_env(model: impl Into<String>, max_tokens: u32, temperature: f32) -> Result<Self> {
            let generator = Self::new(
                http::env_non_empty("ANTHROPIC_API_KEY"),
                model,
                max_tokens,
                temperature,
            )?;
            Ok(match http::env_non_empty("ANTHROPIC_BASE_URL") {
                Some(url) => generator.with_base_url(url),
                None => generator,
            })
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into().trim_end_matches('/').to_string();
            self
        }

        fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
            MessagesRequest {
                model: &self.model,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                messages: vec![Message {
                    role: "user",
                    content: prompt,
                }],
            }
        }
    }

    impl TextGenerator for AnthropicGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            let api_key = self.api_key.as_deref().ok_or_else(|| {
                GenerateError::MissingCredentials("ANTHROPIC_API_KEY is not set".to_string())
            })?;

            let url = format!("{}/v1/messages", self.base_url);
            debug!("Requesting {} ({} prompt bytes)", url, prompt.len());

            let response = self
                .client
                .post(&url)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&self.request(prompt))
                .send()
                .map_err(|e| GenerateError::Network(e.to_string()))?;

            parse_response(&http::read_body(response)?)
        }
    }

    #[derive(Serialize)]
    struct MessagesRequest<'a> {
        model: &'a str,
        max_tokens: u32,
        temperature: f32,
        messages: Vec<Message<'a>>,
    }

    #[derive(Serialize)]
    struct Message<'a> {
        role: &'a str,
        content: &'a str,
    }

    #[derive(Deserialize)]
    struct MessagesBody {
        #[serde(default)]
        content: Vec<ContentBlock>,
    }

    #[derive(Deserialize)]
    struct ContentBlock {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: Option<String>,
    }

    /// Takes the first text block; thinking blocks are skipped.
    pub(crate) fn parse_response(body: &str) -> Result<String, GenerateError> {
        let parsed: MessagesBody = serde_json::from_str(body)
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| GenerateError::InvalidResponse("no text block in content".to_string()))
    }

}
