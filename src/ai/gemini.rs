/// Gemini `generateContent` backend
///
/// Sends prompt text and inline media to the REST endpoint in JSON mode,
/// with the operation's output schema as `responseSchema`, and returns the
/// text of the first candidate.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::backend::{GenerateRequest, ModelBackend, Part};
use crate::config::GatewayConfig;
use crate::datauri::DataUri;
use crate::error::GatewayError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GeminiBackend {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send(&self, request: GenerateRequest) -> Result<String, GatewayError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingApiKey)?;

        let body = request_body(&request)?;
        let started = Instant::now();

        tracing::info!(prompt = request.name, model = %self.config.model, "sending model request");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(Arc::new(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(Arc::new(e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            tracing::warn!(prompt = request.name, status = status.as_u16(), %message, "model request rejected");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let output = parse_response(&text)?;
        tracing::info!(
            prompt = request.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model request complete"
        );
        Ok(output)
    }
}

impl ModelBackend for GeminiBackend {
    fn generate(
        &self,
        request: GenerateRequest,
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send {
        self.send(request)
    }
}

/// Build the JSON body for a request. Media parts are split into MIME type
/// and payload; a string that is not a base64 data URI fails here.
fn request_body(request: &GenerateRequest) -> Result<GenerateContentRequest, GatewayError> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => Ok(WirePart {
                text: Some(text.clone()),
                ..WirePart::default()
            }),
            Part::Media(uri) => {
                let uri = DataUri::parse(uri).map_err(|e| GatewayError::Media(e.to_string()))?;
                Ok(WirePart {
                    inline_data: Some(InlineData {
                        mime_type: uri.mime().to_string(),
                        data: uri.payload().to_string(),
                    }),
                    ..WirePart::default()
                })
            }
        })
        .collect::<Result<Vec<_>, GatewayError>>()?;

    Ok(GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: request.output_schema.clone(),
        },
    })
}

/// Extract the answer text from a successful response body
fn parse_response(body: &str) -> Result<String, GatewayError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Schema(Arc::new(e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|feedback| feedback.block_reason) {
        return Err(GatewayError::InvalidOutput(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GatewayError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return match candidate.finish_reason {
            Some(reason) if reason != "STOP" => Err(GatewayError::InvalidOutput(format!(
                "generation stopped: {}",
                reason
            ))),
            _ => Err(GatewayError::EmptyResponse),
        };
    }

    Ok(text)
}
