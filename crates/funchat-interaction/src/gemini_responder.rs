//! GeminiResponder - bot replies through the Gemini REST API.
//!
//! Calls `models/{model}:generateContent` directly with reqwest. Failures
//! never reach the caller: they are logged and replaced by the fallback
//! texts defined in [`funchat_core::responder`].

use crate::config::resolve_gemini_config;
use async_trait::async_trait;
use funchat_core::Responder;
use funchat_core::config::ResponderSettings;
use funchat_core::responder::{CONNECTION_FAILURE_REPLY, OFFLINE_REPLY};
use funchat_infrastructure::FunchatPaths;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Internal failure modes of a generation request.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Gemini API request failed: {0}")]
    Request(String),

    #[error("Gemini API returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse Gemini response: {0}")]
    Parse(String),

    #[error("Gemini API returned no text in the response candidates")]
    EmptyResponse,
}

/// Responder backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiResponder {
    client: Client,
    api_key: Option<String>,
    settings: ResponderSettings,
}

impl GeminiResponder {
    /// Creates a responder with the given key and generation settings.
    ///
    /// A missing or blank key is accepted: every reply then becomes the
    /// offline fallback.
    pub fn new(api_key: Option<String>, settings: ResponderSettings) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "[Responder] Gemini API key not found in environment or secret.json. Bot responses will be disabled."
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[Responder] Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            api_key,
            settings,
        }
    }

    /// Resolves credentials from `API_KEY` / `GEMINI_API_KEY` or
    /// `~/.config/funchat/secret.json`.
    ///
    /// A `model_name` in secret.json overrides `settings.model`.
    pub fn from_environment(mut settings: ResponderSettings) -> Self {
        let secret_path = FunchatPaths::secret_file().ok();
        let gemini = resolve_gemini_config(secret_path.as_deref(), |name| std::env::var(name).ok());

        if let Some(model) = gemini.as_ref().and_then(|g| g.model_name.clone()) {
            settings.model = model;
        }

        Self::new(gemini.map(|g| g.api_key), settings)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Persona prompt sent with every request.
    pub fn system_instruction(responder_name: &str) -> String {
        format!(
            "You are a helpful and friendly chat bot named {responder_name}. Your responses should be conversational, concise, and feel like a real person is talking. Avoid long paragraphs."
        )
    }

    fn build_request(&self, message: &str, responder_name: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: message.to_string(),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Self::system_instruction(responder_name),
                }],
            },
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_k: self.settings.top_k,
                top_p: self.settings.top_p,
                thinking_config: ThinkingConfig {
                    thinking_budget: self.settings.thinking_budget,
                },
            },
        }
    }

    /// Performs one generation request without any fallback handling.
    pub async fn generate(
        &self,
        message: &str,
        responder_name: &str,
    ) -> Result<String, ResponderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResponderError::MissingApiKey)?;

        let url = format!(
            "{}/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        let body = self.build_request(message, responder_name);

        tracing::debug!(
            "[Responder] Requesting reply from model {} as {}",
            self.settings.model,
            responder_name
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ResponderError::Request(err.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ResponderError::Parse(err.without_url().to_string()))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn get_response(&self, message: &str, responder_name: &str) -> String {
        match self.generate(message, responder_name).await {
            Ok(text) => text,
            Err(ResponderError::MissingApiKey) => OFFLINE_REPLY.to_string(),
            Err(e) => {
                tracing::error!("[Responder] Error fetching bot response: {}", e);
                CONNECTION_FAILURE_REPLY.to_string()
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String, ResponderError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ResponderError::EmptyResponse);
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: String) -> ResponderError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or(body);

    ResponderError::Http {
        status: status.as_u16(),
        message,
    }
}
