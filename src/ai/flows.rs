/// The three AI operations
///
/// Each operation is a single round trip: build the prompt, call the
/// backend once, parse the structured answer. Failures are tagged with the
/// operation so the UI can report them; nothing is retried here.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use super::backend::{GenerateRequest, ModelBackend, Part};
use crate::datauri::DataUri;
use crate::error::{AiError, GatewayError};

const REDACT_PROMPT: &str = "You redact sensitive information from screenshots. \
Find every piece of sensitive data in the screenshot below (email addresses, phone numbers, \
credit card numbers, passwords, access tokens, personal addresses and similar) and cover it. \
Answer with the redacted screenshot as a base64 data URI in the same format and MIME type as the input.";

const EXTRACT_PROMPT: &str = "Read all of the text visible in the screenshot below and return it \
verbatim, keeping the original line breaks and reading order.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactInput {
    /// `data:<mime>;base64,<payload>`
    pub photo_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactOutput {
    pub redacted_photo_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextInput {
    pub photo_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextOutput {
    pub extracted_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainCodeInput {
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainCodeOutput {
    /// Markdown
    pub explanation: String,
}

/// Typed entry point to the model service
#[derive(Debug)]
pub struct AiGateway<B> {
    backend: B,
}

impl<B: ModelBackend> AiGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Redact sensitive information. The answer must itself be a valid data
    /// URI, otherwise the call fails and the caller keeps its original image.
    pub async fn redact(&self, input: RedactInput) -> Result<RedactOutput, AiError> {
        let request = GenerateRequest {
            name: "redactSensitiveInfo",
            parts: vec![
                Part::Text(REDACT_PROMPT.to_string()),
                Part::Media(input.photo_data_uri),
            ],
            output_schema: schema(
                "redactedPhotoDataUri",
                "The screenshot with sensitive information covered, as a data URI \
                 of the form 'data:<mimetype>;base64,<encoded_data>'.",
            ),
        };

        let output: RedactOutput = self.call(request).await.map_err(AiError::Redaction)?;

        DataUri::parse(&output.redacted_photo_data_uri)
            .map_err(|e| AiError::Redaction(GatewayError::InvalidOutput(e.to_string())))?;

        Ok(output)
    }

    /// Read the text out of a screenshot
    pub async fn extract_text(&self, input: ExtractTextInput) -> Result<ExtractTextOutput, AiError> {
        let request = GenerateRequest {
            name: "extractTextFromScreenshot",
            parts: vec![
                Part::Text(EXTRACT_PROMPT.to_string()),
                Part::Media(input.photo_data_uri),
            ],
            output_schema: schema("extractedText", "The text extracted from the screenshot."),
        };

        self.call(request).await.map_err(AiError::Extraction)
    }

    /// Explain a code snippet in Markdown
    pub async fn explain_code(&self, input: ExplainCodeInput) -> Result<ExplainCodeOutput, AiError> {
        let prompt = format!(
            "You are a senior engineer reviewing a code snippet. Explain what the following \
             {language} code does, step by step, for a developer who has not seen it before. \
             Point out anything surprising. Format the explanation as Markdown.\n\n\
             ```{language}\n{code}\n```",
            language = input.language,
            code = input.code,
        );

        let request = GenerateRequest {
            name: "explainCode",
            parts: vec![Part::Text(prompt)],
            output_schema: schema("explanation", "A Markdown explanation of the code."),
        };

        self.call(request).await.map_err(AiError::Explanation)
    }

    async fn call<T: DeserializeOwned>(&self, request: GenerateRequest) -> Result<T, GatewayError> {
        let text = self.backend.generate(request).await?;
        serde_json::from_str(strip_fences(&text)).map_err(|e| GatewayError::Schema(Arc::new(e)))
    }
}

/// Object schema with one required string property
fn schema(property: &str, description: &str) -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            (property): {
                "type": "STRING",
                "description": description,
            }
        },
        "required": [property],
    })
}

/// Models sometimes wrap JSON in a Markdown code fence even in JSON mode
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Backend that replays a canned answer and records what it was asked
    struct FakeBackend {
        answer: Result<String, GatewayError>,
        seen: Mutex<Vec<GenerateRequest>>,
    }

    impl FakeBackend {
        fn answering(answer: Result<&str, GatewayError>) -> Self {
            Self {
                answer: answer.map(str::to_string),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelBackend for FakeBackend {
        async fn generate(&self, request: GenerateRequest) -> Result<String, GatewayError> {
            self.seen.lock().unwrap().push(request);
            self.answer.clone()
        }
    }

    const IMAGE: &str = "data:image/png;base64,aGVsbG8=";

    #[tokio::test]
    async fn test_redact_returns_validated_uri() {
        let gateway = AiGateway::new(FakeBackend::answering(Ok(
            r#"{"redactedPhotoDataUri": "data:image/png;base64,Ynll"}"#,
        )));

        let output = gateway
            .redact(RedactInput { photo_data_uri: IMAGE.to_string() })
            .await
            .unwrap();
        assert_eq!(output.redacted_photo_data_uri, "data:image/png;base64,Ynll");

        let seen = gateway.backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].parts[1], Part::Media(IMAGE.to_string()));
        assert_eq!(seen[0].output_schema["required"][0], "redactedPhotoDataUri");
    }

    #[tokio::test]
    async fn test_redact_rejects_non_data_uri_answer() {
        let gateway = AiGateway::new(FakeBackend::answering(Ok(
            r#"{"redactedPhotoDataUri": "I cannot edit images"}"#,
        )));

        let result = gateway.redact(RedactInput { photo_data_uri: IMAGE.to_string() }).await;
        assert!(matches!(result, Err(AiError::Redaction(GatewayError::InvalidOutput(_)))));
    }

    #[tokio::test]
    async fn test_extract_text_parses_fenced_json() {
        let gateway = AiGateway::new(FakeBackend::answering(Ok(
            "```json\n{\"extractedText\": \"Total: $42\"}\n```",
        )));

        let output = gateway
            .extract_text(ExtractTextInput { photo_data_uri: IMAGE.to_string() })
            .await
            .unwrap();
        assert_eq!(output.extracted_text, "Total: $42");
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_tagged_with_operation() {
        let gateway = AiGateway::new(FakeBackend::answering(Ok(r#"{"text": "wrong field"}"#)));

        let result = gateway
            .extract_text(ExtractTextInput { photo_data_uri: IMAGE.to_string() })
            .await;
        assert!(matches!(result, Err(AiError::Extraction(GatewayError::Schema(_)))));
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_explanation_error() {
        let gateway = AiGateway::new(FakeBackend::answering(Err(GatewayError::EmptyResponse)));

        let result = gateway
            .explain_code(ExplainCodeInput {
                code: "fn main() {}".to_string(),
                language: "rust".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AiError::Explanation(GatewayError::EmptyResponse))));
    }

    #[tokio::test]
    async fn test_explain_code_prompt_carries_code_and_language() {
        let gateway = AiGateway::new(FakeBackend::answering(Ok(r#"{"explanation": "Prints hi."}"#)));

        let output = gateway
            .explain_code(ExplainCodeInput {
                code: "print('hi')".to_string(),
                language: "python".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.explanation, "Prints hi.");

        let seen = gateway.backend.seen.lock().unwrap();
        let Part::Text(prompt) = &seen[0].parts[0] else {
            panic!("expected a text prompt");
        };
        assert!(prompt.contains("```python\nprint('hi')\n```"));
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(RedactInput { photo_data_uri: IMAGE.to_string() }).unwrap();
        assert_eq!(value, json!({"photoDataUri": IMAGE}));
    }
}
