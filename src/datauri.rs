/// Data URI conversion
///
/// Turns files on disk and remote resources into self-contained
/// `data:<mime>;base64,<payload>` strings. These are what the model
/// service accepts as media input and what captures use as their source.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageFormat;

use crate::error::ConversionError;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A parsed, well-formed base64 data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    base64: String,
}

impl DataUri {
    /// Encode raw bytes under the given MIME type
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: mime.to_string(),
            base64: BASE64.encode(bytes),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// The payload must decode; a URI that parses here is always renderable
    /// as far as the encoding is concerned.
    pub fn parse(input: &str) -> Result<Self, ConversionError> {
        let rest = input
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ConversionError::Malformed("missing `data:` scheme".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ConversionError::Malformed("missing `,` separator".to_string()))?;

        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ConversionError::Malformed("payload is not base64".to_string()))?;

        if mime.is_empty() || !mime.contains('/') {
            return Err(ConversionError::Malformed(format!("invalid MIME type `{}`", mime)));
        }

        BASE64
            .decode(payload)
            .map_err(|e| ConversionError::Malformed(format!("invalid base64 payload: {}", e)))?;

        Ok(Self {
            mime: mime.to_string(),
            base64: payload.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The base64 payload, without the header
    pub fn payload(&self) -> &str {
        &self.base64
    }

    /// Decode the payload back to bytes
    pub fn decode(&self) -> Result<Vec<u8>, ConversionError> {
        BASE64
            .decode(&self.base64)
            .map_err(|e| ConversionError::Malformed(format!("invalid base64 payload: {}", e)))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.base64)
    }
}

/// Guess a MIME type from the file extension, then from the content
pub fn mime_for_path(path: &Path, bytes: &[u8]) -> String {
    let by_extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .and_then(|ext| match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            "bmp" => Some("image/bmp"),
            "svg" => Some("image/svg+xml"),
            "tif" | "tiff" => Some("image/tiff"),
            "avif" => Some("image/avif"),
            "mp4" | "m4v" => Some("video/mp4"),
            "webm" => Some("video/webm"),
            "mov" => Some("video/quicktime"),
            "mkv" => Some("video/x-matroska"),
            "avi" => Some("video/x-msvideo"),
            _ => None,
        });

    if let Some(mime) = by_extension {
        return mime.to_string();
    }

    image::guess_format(bytes)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME.to_string())
}

/// Read the full contents of a file into a data URI
pub async fn file_to_data_uri(path: &Path) -> Result<DataUri, ConversionError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ConversionError::Read {
        path: path.to_path_buf(),
        source: Arc::new(e),
    })?;

    let mime = mime_for_path(path, &bytes);
    tracing::debug!(path = %path.display(), %mime, size = bytes.len(), "encoded file as data URI");

    Ok(DataUri::from_bytes(&mime, &bytes))
}

/// Fetch a remote resource into a data URI
pub async fn url_to_data_uri(url: &str) -> Result<DataUri, ConversionError> {
    let fetch_error = |e: reqwest::Error| ConversionError::Fetch {
        url: url.to_string(),
        source: Arc::new(e),
    };

    let response = reqwest::get(url).await.map_err(fetch_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ConversionError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
        .filter(|value| !value.is_empty());

    let bytes = response.bytes().await.map_err(fetch_error)?;

    let mime = header_mime.unwrap_or_else(|| {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        mime_for_path(Path::new(path), &bytes)
    });

    tracing::debug!(%url, %mime, size = bytes.len(), "fetched remote resource as data URI");

    Ok(DataUri::from_bytes(&mime, &bytes))
}

/// Whether `src` points at a remote resource rather than inline data
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Detect the image format of an inline payload, if it is an image at all
pub fn image_format(uri: &DataUri) -> Option<ImageFormat> {
    ImageFormat::from_mime_type(uri.mime())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_accepts_well_formed_uri() {
        let uri = DataUri::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(uri.mime(), "image/png");
        assert_eq!(uri.payload(), "aGVsbG8=");
        assert_eq!(uri.decode().unwrap(), b"hello");
        assert_eq!(uri.to_string(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_parse_rejects_malformed_uris() {
        for input in [
            "image/png;base64,aGVsbG8=",
            "data:image/png;base64",
            "data:image/png,aGVsbG8=",
            "data:;base64,aGVsbG8=",
            "data:image/png;base64,!!not base64!!",
        ] {
            assert!(
                matches!(DataUri::parse(input), Err(ConversionError::Malformed(_))),
                "accepted {input}"
            );
        }
    }

    #[test]
    fn test_mime_from_extension_then_content() {
        assert_eq!(mime_for_path(Path::new("shot.PNG"), &[]), "image/png");
        assert_eq!(mime_for_path(Path::new("clip.webm"), &[]), "video/webm");

        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(mime_for_path(Path::new("noext"), &png_magic), "image/png");
        assert_eq!(mime_for_path(Path::new("noext"), b"plain"), FALLBACK_MIME);
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://placehold.co/600x400.png"));
        assert!(!is_remote("data:image/png;base64,aGVsbG8="));
    }

    #[tokio::test]
    async fn test_file_to_data_uri_reads_whole_file() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"not really a jpeg").unwrap();

        let uri = file_to_data_uri(file.path()).await.unwrap();
        assert_eq!(uri.mime(), "image/jpeg");
        assert_eq!(uri.decode().unwrap(), b"not really a jpeg");
    }

    #[tokio::test]
    async fn test_file_to_data_uri_missing_file() {
        let result = file_to_data_uri(Path::new("/nonexistent/capture.png")).await;
        assert!(matches!(result, Err(ConversionError::Read { .. })));
    }
}
