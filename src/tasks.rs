/// Background operations launched from `update`
///
/// Each function is a self-contained future that owns its inputs, so it can
/// be handed to `Task::perform` and report back through a single message.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rfd::AsyncFileDialog;

use crate::ai::{AiGateway, ExplainCodeInput, ExtractTextInput, ModelBackend, RedactInput};
use crate::datauri::{self, DataUri};
use crate::error::{AiError, ConversionError, ExportError};
use crate::render::export::{self, DownloadFolder};
use crate::render::Rasterizer;
use crate::state::activity::AiAction;
use crate::state::composer::ComposerState;
use crate::state::data::{CaptureKind, NewCapture, SourceFile};

/// Rasterizer shared with blocking tasks, created on first use
pub type SharedRasterizer = Arc<Mutex<Option<Rasterizer>>>;

/// Show the native picker filtered to one capture kind
pub async fn pick_capture(kind: CaptureKind) -> Option<PathBuf> {
    AsyncFileDialog::new()
        .set_title(format!("Add {}", kind.label().to_lowercase()))
        .add_filter(kind.label(), kind.extensions())
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Read a picked file into a capture ready for the library
pub async fn load_capture(path: PathBuf, kind: CaptureKind) -> Result<NewCapture, ConversionError> {
    let uri = datauri::file_to_data_uri(&path).await?;

    let size = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.len())
        .map_err(|e| ConversionError::Read {
            path: path.clone(),
            source: Arc::new(e),
        })?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Untitled {}", kind.label().to_lowercase()));

    Ok(NewCapture {
        name,
        kind,
        file: Some(SourceFile {
            path,
            mime: uri.mime().to_string(),
            size,
        }),
        src: uri.to_string(),
    })
}

/// Turn a capture's media into an inline data URI: the originating file
/// wins, a remote source is fetched, and an inline source is used as is
pub async fn resolve_source(src: String, file: Option<PathBuf>) -> Result<String, ConversionError> {
    if let Some(path) = file {
        return Ok(datauri::file_to_data_uri(&path).await?.to_string());
    }
    if datauri::is_remote(&src) {
        return Ok(datauri::url_to_data_uri(&src).await?.to_string());
    }
    Ok(src)
}

/// Convert, then call the model. A failed conversion aborts before any request.
pub async fn run_ai<B: ModelBackend>(
    gateway: Arc<AiGateway<B>>,
    action: AiAction,
    src: String,
    file: Option<PathBuf>,
) -> Result<String, AiError> {
    let photo_data_uri = resolve_source(src, file).await.map_err(AiError::Preparation)?;

    match action {
        AiAction::Redact => gateway
            .redact(RedactInput { photo_data_uri })
            .await
            .map(|output| output.redacted_photo_data_uri),
        AiAction::ExtractText => gateway
            .extract_text(ExtractTextInput { photo_data_uri })
            .await
            .map(|output| output.extracted_text),
    }
}

pub async fn explain_code<B: ModelBackend>(
    gateway: Arc<AiGateway<B>>,
    code: String,
    language: String,
) -> Result<String, AiError> {
    gateway
        .explain_code(ExplainCodeInput { code, language })
        .await
        .map(|output| output.explanation)
}

/// Ask where to save a capture. `None` when the dialog is cancelled.
pub async fn pick_save_path(default_name: String) -> Option<PathBuf> {
    AsyncFileDialog::new()
        .set_title("Save capture")
        .set_file_name(default_name)
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Write a capture's media bytes to `path`
pub async fn save_capture(src: String, path: PathBuf) -> Result<PathBuf, ExportError> {
    let uri = if datauri::is_remote(&src) {
        datauri::url_to_data_uri(&src).await?
    } else {
        DataUri::parse(&src)?
    };
    let bytes = uri.decode()?;
    export::write_file(path, bytes).await
}

/// Rasterize a composition off the UI thread and drop it in the download folder
pub async fn download_composition(
    rasterizer: SharedRasterizer,
    state: ComposerState,
    scale: f32,
    file_name: String,
) -> Result<PathBuf, ExportError> {
    tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let rendered = {
            let mut guard = rasterizer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.get_or_insert_with(Rasterizer::new).render_png(&state, scale)
        };
        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, scale, "rasterization finished");

        let mut sink = DownloadFolder::user()?;
        export::download(rendered, &file_name, &mut sink)
    })
    .await
    .map_err(|_| ExportError::Interrupted)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::backend::GenerateRequest;
    use crate::error::GatewayError;
    use std::io::Write;

    struct CannedBackend(&'static str);

    impl ModelBackend for CannedBackend {
        async fn generate(&self, _request: GenerateRequest) -> Result<String, GatewayError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_inline_source_is_used_as_is() {
        let src = "data:image/png;base64,aGVsbG8=".to_string();
        assert_eq!(resolve_source(src.clone(), None).await.unwrap(), src);
    }

    #[tokio::test]
    async fn test_originating_file_wins_over_src() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let uri = resolve_source("https://example.invalid/x.png".to_string(), Some(file.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_load_capture_fills_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"hello").unwrap();

        let capture = load_capture(path.clone(), CaptureKind::Image).await.unwrap();

        assert_eq!(capture.name, "shot.png");
        assert_eq!(capture.src, "data:image/png;base64,aGVsbG8=");
        let file = capture.file.unwrap();
        assert_eq!(file.path, path);
        assert_eq!(file.size, 5);
    }

    #[tokio::test]
    async fn test_missing_file_fails_preparation_without_calling_model() {
        let gateway = Arc::new(AiGateway::new(CannedBackend(r#"{"extractedText": "unused"}"#)));

        let result = run_ai(
            gateway,
            AiAction::ExtractText,
            String::new(),
            Some(PathBuf::from("/definitely/not/here.png")),
        )
        .await;

        assert!(matches!(result, Err(AiError::Preparation(ConversionError::Read { .. }))));
    }

    #[tokio::test]
    async fn test_extract_text_returns_model_text() {
        let gateway = Arc::new(AiGateway::new(CannedBackend(r#"{"extractedText": "Total: 42"}"#)));

        let text = run_ai(
            gateway,
            AiAction::ExtractText,
            "data:image/png;base64,aGVsbG8=".to_string(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(text, "Total: 42");
    }

    #[tokio::test]
    async fn test_save_capture_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("copy.png");

        save_capture("data:image/png;base64,aGVsbG8=".to_string(), target.clone())
            .await
            .unwrap();

        assert_eq!(std::fs::read(target).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_save_capture_rejects_malformed_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_capture("not a uri".to_string(), dir.path().join("x.png")).await;
        assert!(matches!(result, Err(ExportError::Source(_))));
    }
}
