/// Capture grid with search

use std::collections::HashMap;

use iced::widget::image::Handle;
use iced::widget::{button, center, column, container, image, scrollable, text, text_input};
use iced::{ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::state::data::{Capture, CaptureId, CaptureKind};
use crate::Message;

const CARD_WIDTH: f32 = 200.0;
const THUMBNAIL_HEIGHT: f32 = 130.0;

pub struct Props<'a> {
    /// Captures matching the query, most recent first
    pub captures: Vec<&'a Capture>,
    pub query: &'a str,
    pub thumbnails: &'a HashMap<CaptureId, Handle>,
}

pub fn view(props: Props<'_>) -> Element<'_, Message> {
    let search = text_input("Search by name or tag...", props.query)
        .on_input(Message::SearchChanged)
        .padding(10);

    let grid: Element<'_, Message> = if props.captures.is_empty() {
        center(text("No Captures Found").size(18)).height(240).into()
    } else {
        let cards = props
            .captures
            .into_iter()
            .map(|capture| card(capture, props.thumbnails.get(&capture.id)))
            .collect();

        scrollable(Wrap::with_elements(cards).spacing(12.0).line_spacing(12.0))
            .height(Length::Fill)
            .into()
    };

    column![search, grid].spacing(16).padding(16).into()
}

fn card<'a>(capture: &'a Capture, thumbnail: Option<&Handle>) -> Element<'a, Message> {
    let preview: Element<'a, Message> = match (capture.kind, thumbnail) {
        (CaptureKind::Image, Some(handle)) => image(handle.clone())
            .width(Length::Fill)
            .height(THUMBNAIL_HEIGHT)
            .content_fit(ContentFit::Cover)
            .into(),
        (kind, _) => center(text(kind.label()).size(14))
            .width(Length::Fill)
            .height(THUMBNAIL_HEIGHT)
            .style(container::dark)
            .into(),
    };

    let content = column![
        preview,
        text(&capture.name).size(14),
        text(capture.tags.join(", ")).size(12),
        text(capture.created_at.format("%Y-%m-%d %H:%M").to_string()).size(11),
    ]
    .spacing(6);

    button(content)
        .width(CARD_WIDTH)
        .padding(8)
        .style(button::secondary)
        .on_press(Message::SelectCapture(capture.id))
        .into()
}
