use std::future::Future;

use crate::error::GatewayError;

/// One piece of prompt content
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Media as a `data:<mime>;base64,<payload>` string, passed through unvalidated
    Media(String),
}

/// A single structured-output request to the model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Prompt name, for logs
    pub name: &'static str,
    pub parts: Vec<Part>,
    /// JSON schema the answer must follow
    pub output_schema: serde_json::Value,
}

/// The boundary to the external model service.
///
/// One call is one round trip: no retries, no timeout beyond the transport's.
/// The returned string is the raw JSON text the model produced.
pub trait ModelBackend: Send + Sync + 'static {
    fn generate(
        &self,
        request: GenerateRequest,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}
