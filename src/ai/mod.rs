/// AI gateway module
///
/// Typed request/response wrappers around an external generative model.
///
/// Architecture:
/// - `backend.rs` - the `ModelBackend` seam (one round trip per call)
/// - `gemini.rs` - production backend on the Gemini REST API
/// - `flows.rs` - redact / extract text / explain code on top of a backend

pub mod backend;
pub mod flows;
pub mod gemini;

pub use backend::ModelBackend;
pub use flows::{AiGateway, ExplainCodeInput, ExtractTextInput, RedactInput};
pub use gemini::GeminiBackend;
