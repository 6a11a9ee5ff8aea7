//! Google Gemini API client implementation
//!
//! Speaks the `generateContent` endpoint directly. This is the boundary where
//! provider-specific failure payloads are folded into `RemoteError`.

use crate::core_types::{Role, Turn};
use crate::errors::RemoteError;
use crate::llm::{GenerationSettings, LLM};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API client
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
    settings: GenerationSettings,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// Create a new Gemini client with custom base URL
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: Some(text.to_string()),
        }],
    }
}

fn provider_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

impl GeminiClient {
    fn build_request(&self, system_prompt: &str, instruction: &str, history: &[Turn]) -> GeminiRequest {
        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|turn| text_content(Some(provider_role(turn.role)), &turn.text))
            .collect();
        contents.push(text_content(Some("user"), instruction));

        GeminiRequest {
            contents,
            system_instruction: text_content(None, system_prompt),
            generation_config: GeminiGenerationConfig {
                temperature: self.settings.temperature,
                top_k: self.settings.top_k,
                top_p: self.settings.top_p,
                max_output_tokens: self.settings.max_output_tokens,
            },
        }
    }
}

fn extract_text(response: GeminiResponse) -> Result<String, RemoteError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(RemoteError::EmptyResponse)?;

    if let Some(reason) = &candidate.finish_reason {
        log::debug!("Gemini candidate finish reason: {}", reason);
    }

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(RemoteError::EmptyResponse);
    }
    Ok(text)
}

/// Fold a non-success HTTP response into the closed error set.
fn classify_failure(status: StatusCode, body: &str) -> RemoteError {
    let details = serde_json::from_str::<GeminiError>(body).ok().map(|e| e.error);
    let provider_status = details
        .as_ref()
        .and_then(|d| d.status.clone())
        .unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS || provider_status == "RESOURCE_EXHAUSTED" {
        return RemoteError::RateLimited;
    }

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || provider_status == "UNAUTHENTICATED"
        || provider_status == "PERMISSION_DENIED"
    {
        return RemoteError::InvalidCredential;
    }

    // Gemini reports a bad key as a plain INVALID_ARGUMENT
    if provider_status == "INVALID_ARGUMENT"
        && body.to_ascii_lowercase().contains("api key")
    {
        return RemoteError::InvalidCredential;
    }

    match details {
        Some(d) if !d.message.is_empty() => {
            let code = if d.code == 0 { status.as_u16() } else { d.code };
            RemoteError::Upstream(format!("{} - {}", code, d.message))
        }
        _ => RemoteError::Upstream(format!(
            "request failed with status {}: {}",
            status,
            body.trim()
        )),
    }
}

#[async_trait]
impl LLM for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        instruction: &str,
        history: &[Turn],
    ) -> Result<String, RemoteError> {
        let request = self.build_request(system_prompt, instruction, history);

        log::debug!(
            "Gemini request to model {} with {} history turns",
            self.model,
            history.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Upstream(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = classify_failure(status, &error_text);
            log::error!("Gemini API call failed ({}): {}", status, err);
            return Err(err);
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            RemoteError::Upstream(format!("Failed to parse Gemini response: {}", e))
        })?;

        extract_text(gemini_response)
    }
}
