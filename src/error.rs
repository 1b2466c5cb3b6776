/// Error types for every fallible concern in the application
///
/// All errors are `Clone` so they can travel inside iced messages.
/// Underlying I/O and HTTP errors are shared behind an `Arc`.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failure to turn a file or URL into a data URI
#[derive(Debug, Clone, Error)]
pub enum ConversionError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: Arc<reqwest::Error>,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed data URI: {0}")]
    Malformed(String),
}

/// Failure of one round trip to the generative model service
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("no API key configured (set GEMINI_API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("request to the model service failed")]
    Transport(#[source] Arc<reqwest::Error>),

    #[error("model service answered with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("model service returned no content")]
    EmptyResponse,

    #[error("model output does not match the expected schema")]
    Schema(#[source] Arc<serde_json::Error>),

    #[error("model output is invalid: {0}")]
    InvalidOutput(String),

    #[error("media input is not a base64 data URI: {0}")]
    Media(String),
}

/// A failed AI action, tagged with the action that failed
#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("could not prepare the image")]
    Preparation(#[source] ConversionError),

    #[error("redaction failed")]
    Redaction(#[source] GatewayError),

    #[error("text extraction failed")]
    Extraction(#[source] GatewayError),

    #[error("code explanation failed")]
    Explanation(#[source] GatewayError),
}

/// Failure while rasterizing a composition
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("syntax highlighting failed: {0}")]
    Highlight(String),

    #[error("composition has an empty surface ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("composition is too large to render ({width}x{height})")]
    TooLarge { width: u32, height: u32 },

    #[error("failed to encode PNG")]
    Encode(#[source] Arc<image::ImageError>),
}

/// Failure of the download action
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("could not read the capture")]
    Source(#[from] ConversionError),

    #[error("could not determine a download directory")]
    NoDownloadDir,

    #[error("rasterization task was interrupted")]
    Interrupted,
}

/// Failure to load the configuration file
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("invalid configuration in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Arc<toml::de::Error>,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Render an error and its whole source chain on one line
pub fn describe(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_walks_source_chain() {
        let error = AiError::Redaction(GatewayError::Status {
            status: 400,
            message: "bad image".to_string(),
        });

        assert_eq!(
            describe(&error),
            "redaction failed: model service answered with status 400: bad image"
        );
    }

    #[test]
    fn test_export_error_is_transparent_over_render() {
        let error = ExportError::from(RenderError::EmptySurface { width: 0, height: 10 });
        assert_eq!(error.to_string(), "composition has an empty surface (0x10)");
    }
}
