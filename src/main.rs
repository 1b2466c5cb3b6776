use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use iced::widget::image::Handle;
use iced::widget::{column, container, row, text_editor};
use iced::{Element, Length, Subscription, Task, Theme};
use tracing_subscriber::EnvFilter;

mod ai;
mod color;
mod config;
mod datauri;
mod error;
mod render;
mod state;
mod tasks;
mod ui;

use ai::{AiGateway, GeminiBackend};
use config::{AppConfig, Product};
use error::{describe, AiError, ConversionError, ExportError};
use state::activity::{ActionState, AiAction, ToolBoard};
use state::composer::{ComposerState, GradientPreset, Language, WindowTheme};
use state::data::{CaptureId, CaptureKind, CaptureUpdate, NewCapture};
use state::library::Library;
use tasks::SharedRasterizer;
use ui::toast::Notifications;

/// Main application state
struct VisionaryCapture {
    config: AppConfig,
    gateway: Arc<AiGateway<GeminiBackend>>,
    notifications: Notifications,

    /// The capture collection and selection
    library: Library,
    tools: ToolBoard,
    tool_tab: AiAction,
    tag_input: String,
    /// Decoded sources, keyed by capture
    thumbnails: HashMap<CaptureId, Handle>,
    /// Decoded redaction results waiting to be applied
    redaction_previews: HashMap<CaptureId, Handle>,

    /// Code screenshot composition
    composer: ComposerState,
    editor: text_editor::Content,
    rasterizer: SharedRasterizer,
    download: ActionState<PathBuf>,
    explanation: ActionState<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Tick(Instant),
    DismissToast(u64),

    // Capture library
    AddCapture(CaptureKind),
    CapturePicked(CaptureKind, Option<PathBuf>),
    CaptureLoaded(Result<NewCapture, ConversionError>),
    SearchChanged(String),
    SelectCapture(CaptureId),
    ShowAllCaptures,
    RenameCapture(CaptureId, String),
    DeleteCapture(CaptureId),
    TagInputChanged(String),
    AddTag(CaptureId),
    RemoveTag(CaptureId, String),
    SaveCapture(CaptureId),
    SavePathPicked(CaptureId, Option<PathBuf>),
    CaptureSaved(Result<PathBuf, ExportError>),
    ToolTabSelected(AiAction),
    RunAi(CaptureId, AiAction),
    AiFinished(CaptureId, AiAction, Result<String, AiError>),
    ApplyRedaction(CaptureId),
    CopyToClipboard(String),

    // Composer
    CodeEdited(text_editor::Action),
    LanguageSelected(Language),
    WindowThemeSelected(WindowTheme),
    PresetSelected(GradientPreset),
    CustomBackgroundChanged(String),
    PaddingChanged(u16),
    BrightnessChanged(u16),
    ContrastChanged(u16),
    SaturationChanged(u16),
    LineNumbersToggled(bool),
    WatermarkChanged(String),
    Download,
    Downloaded(Result<PathBuf, ExportError>),
    ExplainCode,
    Explained(Result<String, AiError>),
}

impl VisionaryCapture {
    fn new(config: AppConfig, startup_error: Option<String>) -> (Self, Task<Message>) {
        let mut notifications =
            Notifications::new(Duration::from_secs(config.notifications.timeout_secs));
        if let Some(error) = startup_error {
            notifications.error("Configuration ignored", error);
        }

        let composer = ComposerState::new();
        let editor = text_editor::Content::with_text(composer.code());

        tracing::info!(product = ?config.product, model = %config.gateway.model, "Visionary Capture initialized");

        let app = Self {
            gateway: Arc::new(AiGateway::new(GeminiBackend::new(config.gateway.clone()))),
            config,
            notifications,
            library: Library::new(),
            tools: ToolBoard::new(),
            tool_tab: AiAction::Redact,
            tag_input: String::new(),
            thumbnails: HashMap::new(),
            redaction_previews: HashMap::new(),
            composer,
            editor,
            rasterizer: Arc::new(Mutex::new(None)),
            download: ActionState::Idle,
            explanation: ActionState::Idle,
        };

        (app, Task::none())
    }

    fn title(&self) -> String {
        match self.config.product {
            Product::Library => "Visionary Capture".to_string(),
            Product::Composer => "Visionary Capture - Composer".to_string(),
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(now) => {
                self.notifications.expire(now);
                Task::none()
            }
            Message::DismissToast(id) => {
                self.notifications.dismiss(id);
                Task::none()
            }

            Message::AddCapture(kind) => {
                Task::perform(tasks::pick_capture(kind), move |path| Message::CapturePicked(kind, path))
            }
            Message::CapturePicked(kind, Some(path)) => {
                Task::perform(tasks::load_capture(path, kind), Message::CaptureLoaded)
            }
            Message::CapturePicked(_, None) => Task::none(),
            Message::CaptureLoaded(Ok(new)) => {
                let name = new.name.clone();
                let id = self.library.add_capture(new);
                self.refresh_thumbnail(id);
                self.notifications.success("Capture added", name);
                Task::none()
            }
            Message::CaptureLoaded(Err(error)) => {
                tracing::error!(error = %describe(&error), "failed to add capture");
                self.notifications.error("Could not add capture", describe(&error));
                Task::none()
            }
            Message::SearchChanged(query) => {
                self.library.set_query(query);
                Task::none()
            }
            Message::SelectCapture(id) => {
                if self.library.select(id) {
                    self.tag_input.clear();
                }
                Task::none()
            }
            Message::ShowAllCaptures => {
                self.library.clear_selection();
                Task::none()
            }
            Message::RenameCapture(id, name) => {
                self.library.update_capture(id, CaptureUpdate::name(name));
                Task::none()
            }
            Message::DeleteCapture(id) => {
                if let Some(capture) = self.library.delete_capture(id) {
                    self.tools.remove(id);
                    self.thumbnails.remove(&id);
                    self.redaction_previews.remove(&id);
                    self.notifications.success("Capture deleted", capture.name);
                }
                Task::none()
            }
            Message::TagInputChanged(value) => {
                self.tag_input = value;
                Task::none()
            }
            Message::AddTag(id) => {
                if self.library.add_tag(id, &self.tag_input) {
                    self.tag_input.clear();
                }
                Task::none()
            }
            Message::RemoveTag(id, tag) => {
                self.library.remove_tag(id, &tag);
                Task::none()
            }
            Message::SaveCapture(id) => match self.library.get(id) {
                Some(capture) => Task::perform(tasks::pick_save_path(capture.name.clone()), move |path| {
                    Message::SavePathPicked(id, path)
                }),
                None => Task::none(),
            },
            Message::SavePathPicked(id, Some(path)) => match self.library.get(id) {
                Some(capture) => Task::perform(
                    tasks::save_capture(capture.src.clone(), path),
                    Message::CaptureSaved,
                ),
                None => Task::none(),
            },
            Message::SavePathPicked(_, None) => Task::none(),
            Message::CaptureSaved(Ok(path)) => {
                tracing::info!(path = %path.display(), "capture saved");
                self.notifications.success("Capture saved", path.display().to_string());
                Task::none()
            }
            Message::CaptureSaved(Err(error)) => {
                tracing::error!(error = %describe(&error), "failed to save capture");
                self.notifications.error("Could not save capture", describe(&error));
                Task::none()
            }
            Message::ToolTabSelected(tab) => {
                self.tool_tab = tab;
                Task::none()
            }
            Message::RunAi(id, action) => self.run_ai(id, action),
            Message::AiFinished(id, action, result) => {
                self.finish_ai(id, action, result);
                Task::none()
            }
            Message::ApplyRedaction(id) => {
                let redacted = self.tools.get(id).redaction.value().cloned();
                if let Some(src) = redacted {
                    if self.library.update_capture(id, CaptureUpdate::redacted(src)) {
                        self.refresh_thumbnail(id);
                        self.tools.clear(id, AiAction::Redact);
                        self.redaction_previews.remove(&id);
                        self.notifications.success("Redaction applied", "The capture now shows the redacted image.");
                    }
                }
                Task::none()
            }
            Message::CopyToClipboard(value) => {
                self.notifications.success("Copied", "Text copied to the clipboard.");
                iced::clipboard::write(value)
            }

            Message::CodeEdited(action) => {
                let is_edit = action.is_edit();
                self.editor.perform(action);
                if is_edit {
                    self.composer.set_code(editor_code(&self.editor));
                }
                Task::none()
            }
            Message::LanguageSelected(language) => {
                self.composer.language = language;
                Task::none()
            }
            Message::WindowThemeSelected(theme) => {
                self.composer.window_theme = theme;
                Task::none()
            }
            Message::PresetSelected(preset) => {
                self.composer.background = state::composer::Background::Preset(preset);
                Task::none()
            }
            Message::CustomBackgroundChanged(value) => {
                self.composer.set_custom_background(value);
                Task::none()
            }
            Message::PaddingChanged(value) => {
                self.composer.set_padding(value);
                Task::none()
            }
            Message::BrightnessChanged(value) => {
                self.composer.set_brightness(value);
                Task::none()
            }
            Message::ContrastChanged(value) => {
                self.composer.set_contrast(value);
                Task::none()
            }
            Message::SaturationChanged(value) => {
                self.composer.set_saturation(value);
                Task::none()
            }
            Message::LineNumbersToggled(show) => {
                self.composer.show_line_numbers = show;
                Task::none()
            }
            Message::WatermarkChanged(value) => {
                self.composer.watermark = value;
                Task::none()
            }
            Message::Download => {
                if !self.download.begin() {
                    return Task::none();
                }
                Task::perform(
                    tasks::download_composition(
                        self.rasterizer.clone(),
                        self.composer.clone(),
                        self.config.composer.pixel_ratio,
                        self.config.composer.file_name.clone(),
                    ),
                    Message::Downloaded,
                )
            }
            Message::Downloaded(result) => {
                match &result {
                    Ok(path) => self.notifications.success("Image downloaded", path.display().to_string()),
                    Err(error) => {
                        tracing::error!(error = %describe(error), "download failed");
                        self.notifications.error("Download failed", describe(error));
                    }
                }
                self.download.finish(result.map_err(|e| describe(&e)));
                Task::none()
            }
            Message::ExplainCode => {
                if !self.explanation.begin() {
                    return Task::none();
                }
                Task::perform(
                    tasks::explain_code(
                        self.gateway.clone(),
                        self.composer.code().to_string(),
                        self.composer.language.id().to_string(),
                    ),
                    Message::Explained,
                )
            }
            Message::Explained(result) => {
                if let Err(error) = &result {
                    tracing::error!(error = %describe(error), "code explanation failed");
                    self.notifications.error("Explanation failed", describe(error));
                }
                self.explanation.finish(result.map_err(|e| describe(&e)));
                Task::none()
            }
        }
    }

    fn run_ai(&mut self, id: CaptureId, action: AiAction) -> Task<Message> {
        let Some(capture) = self.library.get(id) else {
            return Task::none();
        };
        let src = capture.src.clone();
        let file = capture.file.as_ref().map(|file| file.path.clone());

        // In-flight guard: one request per action per capture
        if !self.tools.begin(id, action) {
            tracing::debug!(%id, ?action, "action already in flight");
            return Task::none();
        }
        tracing::info!(%id, ?action, "AI action started");

        Task::perform(tasks::run_ai(self.gateway.clone(), action, src, file), move |result| {
            Message::AiFinished(id, action, result)
        })
    }

    fn finish_ai(&mut self, id: CaptureId, action: AiAction, result: Result<String, AiError>) {
        match &result {
            Ok(_) => {
                tracing::info!(%id, ?action, "AI action succeeded");
                match action {
                    AiAction::Redact => self.notifications.success("Redaction ready", "Review it and apply it to the capture."),
                    AiAction::ExtractText => self.notifications.success("Text extracted", "The text is ready to copy."),
                }
            }
            Err(error) => {
                tracing::error!(%id, ?action, error = %describe(error), "AI action failed");
                let title = match error {
                    AiError::Preparation(_) => "Could not read the image",
                    AiError::Redaction(_) => "Redaction failed",
                    AiError::Extraction(_) => "Text extraction failed",
                    AiError::Explanation(_) => "Explanation failed",
                };
                self.notifications.error(title, describe(error));
            }
        }

        // The capture may have been deleted while the request was in flight
        if self.library.get(id).is_none() {
            return;
        }

        if action == AiAction::Redact {
            match result.as_ref().ok().and_then(|uri| ui::image_handle(uri)) {
                Some(handle) => {
                    self.redaction_previews.insert(id, handle);
                }
                None => {
                    self.redaction_previews.remove(&id);
                }
            }
        }
        self.tools.finish(id, action, result.map_err(|e| describe(&e)));
    }

    fn refresh_thumbnail(&mut self, id: CaptureId) {
        match self.library.get(id).and_then(|capture| ui::image_handle(&capture.src)) {
            Some(handle) => {
                self.thumbnails.insert(id, handle);
            }
            None => {
                self.thumbnails.remove(&id);
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let screen = match self.config.product {
            Product::Library => self.library_view(),
            Product::Composer => ui::composer::view(ui::composer::Props {
                state: &self.composer,
                content: &self.editor,
                download: &self.download,
                explanation: &self.explanation,
            }),
        };

        let mut layout = column![container(screen).height(Length::Fill)];
        if !self.notifications.is_empty() {
            layout = layout.push(container(self.notifications.view()).padding(16));
        }
        layout.into()
    }

    fn library_view(&self) -> Element<'_, Message> {
        let sidebar = ui::sidebar::view(ui::sidebar::Props {
            capture_count: self.library.capture_count(),
            editing: self.library.selected_id().is_some(),
        });

        let main: Element<Message> = match self.library.selected() {
            Some(capture) => ui::editor_panel::view(ui::editor_panel::Props {
                capture,
                image: self.thumbnails.get(&capture.id),
                tag_input: &self.tag_input,
                tools: ui::ai_tools::Props {
                    capture_id: capture.id,
                    kind: capture.kind,
                    tab: self.tool_tab,
                    tools: self.tools.get(capture.id),
                    redacted_preview: self.redaction_previews.get(&capture.id),
                },
            }),
            None => ui::file_manager::view(ui::file_manager::Props {
                captures: self.library.visible(),
                query: self.library.query(),
                thumbnails: &self.thumbnails,
            }),
        };

        row![sidebar, container(main).width(Length::Fill)].into()
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.notifications.is_empty() {
            Subscription::none()
        } else {
            iced::time::every(Duration::from_millis(250)).map(Message::Tick)
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Editor contents joined without the trailing newline `Content::text` appends
fn editor_code(content: &text_editor::Content) -> String {
    content
        .lines()
        .map(|line| String::from(&*line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visionary_capture=info")),
        )
        .init();

    let (config, startup_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(error) => {
            tracing::error!(error = %describe(&error), "invalid configuration, using defaults");
            let fallback = AppConfig::default()
                .with_env(|key| std::env::var(key).ok())
                .unwrap_or_default();
            (fallback, Some(describe(&error)))
        }
    };

    iced::application(VisionaryCapture::title, VisionaryCapture::update, VisionaryCapture::view)
        .subscription(VisionaryCapture::subscription)
        .theme(VisionaryCapture::theme)
        .centered()
        .run_with(move || VisionaryCapture::new(config, startup_error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::widget::text_editor::{Action, Edit, Motion};

    fn app() -> VisionaryCapture {
        VisionaryCapture::new(AppConfig::default(), None).0
    }

    #[test]
    fn test_code_edit_keeps_line_count() {
        let mut app = app();
        app.editor = text_editor::Content::with_text("a\nb\nc");
        app.composer.set_code("a\nb\nc");

        let _ = app.update(Message::CodeEdited(Action::Move(Motion::DocumentEnd)));
        let _ = app.update(Message::CodeEdited(Action::Edit(Edit::Insert('!'))));

        assert_eq!(app.composer.code(), "a\nb\nc!");
        assert_eq!(app.composer.line_count(), 3);
    }

    #[test]
    fn test_code_edit_keeps_typed_trailing_newline() {
        let mut app = app();
        app.editor = text_editor::Content::with_text("a");
        app.composer.set_code("a");

        let _ = app.update(Message::CodeEdited(Action::Move(Motion::DocumentEnd)));
        let _ = app.update(Message::CodeEdited(Action::Edit(Edit::Enter)));

        assert_eq!(app.composer.code(), "a\n");
        assert_eq!(app.composer.line_count(), 2);
    }
}
