/// Single-capture editor: preview, tags, save, delete and the AI tools

use iced::widget::image::Handle;
use iced::widget::{button, center, column, horizontal_space, image, row, scrollable, text, text_input, Row};
use iced::{ContentFit, Element, Length};

use super::ai_tools;
use crate::state::data::{Capture, CaptureKind};
use crate::Message;

pub struct Props<'a> {
    pub capture: &'a Capture,
    pub image: Option<&'a Handle>,
    /// Text of the new-tag field
    pub tag_input: &'a str,
    pub tools: ai_tools::Props<'a>,
}

pub fn view(props: Props<'_>) -> Element<'_, Message> {
    let capture = props.capture;

    let header = row![
        button(text("← Back")).style(button::text).on_press(Message::ShowAllCaptures),
        text_input("Capture name", &capture.name)
            .on_input(move |name| Message::RenameCapture(capture.id, name))
            .size(18)
            .width(320),
        horizontal_space(),
        button(text("Save capture"))
            .style(button::secondary)
            .on_press(Message::SaveCapture(capture.id)),
        button(text("Delete"))
            .style(button::danger)
            .on_press(Message::DeleteCapture(capture.id)),
    ]
    .spacing(8)
    .align_y(iced::Alignment::Center);

    let media: Element<'_, Message> = match (capture.kind, props.image) {
        (CaptureKind::Image, Some(handle)) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::FillPortion(3))
            .content_fit(ContentFit::Contain)
            .into(),
        (CaptureKind::Image, None) => center(text("Preview unavailable for this source")).into(),
        (CaptureKind::Video, _) => center(text("Video capture (playback is not supported)")).into(),
    };

    let details = text(format!(
        "{} · {} · added {}",
        capture.id,
        capture.kind.label(),
        capture.created_at.format("%Y-%m-%d %H:%M")
    ))
    .size(12);

    let origin = text(match &capture.file {
        Some(file) => format!("{} · {} · {} KB", file.path.display(), file.mime, file.size.div_ceil(1024)),
        None => "No originating file".to_string(),
    })
    .size(12);

    let chips = Row::with_children(capture.tags.iter().map(|tag| {
        button(text(format!("{} ×", tag)).size(12))
            .style(button::secondary)
            .on_press(Message::RemoveTag(capture.id, tag.clone()))
            .into()
    }))
    .spacing(6);

    let tag_editor = row![
        text_input("Add tag", props.tag_input)
            .on_input(Message::TagInputChanged)
            .on_submit(Message::AddTag(capture.id))
            .width(200),
        button(text("Add")).on_press(Message::AddTag(capture.id)),
    ]
    .spacing(6);

    let sidebar = scrollable(
        column![
            details,
            origin,
            text("Tags").size(16),
            chips,
            tag_editor,
            ai_tools::view(props.tools)
        ]
        .spacing(12),
    )
    .width(380);

    column![header, row![media, sidebar].spacing(16).height(Length::Fill)]
        .spacing(16)
        .padding(16)
        .into()
}
