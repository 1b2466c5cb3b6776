/// AI actions on the selected capture: redaction and text extraction

use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text, Column};
use iced::{Color, ContentFit, Element, Length};

use crate::state::activity::{ActionState, AiAction, CaptureTools};
use crate::state::data::{CaptureId, CaptureKind};
use crate::Message;

const ERROR_COLOR: Color = Color {
    r: 0.94,
    g: 0.27,
    b: 0.27,
    a: 1.0,
};

pub struct Props<'a> {
    pub capture_id: CaptureId,
    pub kind: CaptureKind,
    /// Which tab is open
    pub tab: AiAction,
    pub tools: CaptureTools,
    /// Decoded redaction result, if one is waiting to be applied
    pub redacted_preview: Option<&'a Handle>,
}

pub fn view(props: Props<'_>) -> Element<'_, Message> {
    let tabs = row![
        tab_button("Redact", AiAction::Redact, props.tab),
        tab_button("Extract text", AiAction::ExtractText, props.tab),
    ]
    .spacing(4);

    let body: Element<'_, Message> = if props.kind == CaptureKind::Video {
        text("AI tools work on image captures.").size(14).into()
    } else {
        match props.tab {
            AiAction::Redact => redact_tab(&props),
            AiAction::ExtractText => extract_tab(&props),
        }
    };

    container(column![text("AI tools").size(18), tabs, body].spacing(12))
        .padding(16)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn tab_button(label: &str, action: AiAction, open: AiAction) -> Element<'_, Message> {
    button(text(label).size(14))
        .style(if action == open { button::primary } else { button::secondary })
        .on_press(Message::ToolTabSelected(action))
        .into()
}

/// Trigger button, disabled while the action is in flight
fn run_button<'a>(props: &Props<'a>, action: AiAction, idle: &'a str, busy: &'a str) -> Element<'a, Message> {
    let pending = props.tools.action(action).is_pending();
    button(text(if pending { busy } else { idle }))
        .style(button::primary)
        .on_press_maybe((!pending).then_some(Message::RunAi(props.capture_id, action)))
        .into()
}

fn redact_tab<'a>(props: &Props<'a>) -> Element<'a, Message> {
    let mut content = Column::new()
        .spacing(10)
        .push(text("Cover names, emails, phone numbers and other personal details.").size(13))
        .push(run_button(props, AiAction::Redact, "Redact sensitive info", "Redacting..."));

    match &props.tools.redaction {
        ActionState::Succeeded(_) => {
            if let Some(handle) = props.redacted_preview {
                content = content.push(
                    image(handle.clone())
                        .width(Length::Fill)
                        .height(220)
                        .content_fit(ContentFit::Contain),
                );
            }
            content = content.push(
                button(text("Apply redaction"))
                    .style(button::success)
                    .on_press(Message::ApplyRedaction(props.capture_id)),
            );
        }
        ActionState::Failed(message) => {
            content = content.push(text(message.clone()).size(13).color(ERROR_COLOR));
        }
        ActionState::Idle | ActionState::Pending => {}
    }

    content.into()
}

fn extract_tab<'a>(props: &Props<'a>) -> Element<'a, Message> {
    let mut content = Column::new()
        .spacing(10)
        .push(run_button(props, AiAction::ExtractText, "Extract text", "Extracting..."));

    match &props.tools.extraction {
        ActionState::Succeeded(extracted) => {
            content = content
                .push(
                    container(scrollable(text(extracted.clone()).size(13)))
                        .padding(8)
                        .max_height(240)
                        .width(Length::Fill)
                        .style(container::bordered_box),
                )
                .push(
                    button(text("Copy to clipboard"))
                        .style(button::secondary)
                        .on_press(Message::CopyToClipboard(extracted.clone())),
                );
        }
        ActionState::Failed(message) => {
            content = content.push(text(message.clone()).size(13).color(ERROR_COLOR));
        }
        ActionState::Idle | ActionState::Pending => {}
    }

    content.into()
}
