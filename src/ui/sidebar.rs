/// Library navigation: add captures and go back to the full grid

use iced::widget::{button, column, container, text, vertical_space};
use iced::{Element, Length};

use crate::state::data::CaptureKind;
use crate::Message;

pub struct Props {
    pub capture_count: usize,
    /// Whether a capture is open in the editor
    pub editing: bool,
}

pub fn view(props: Props) -> Element<'static, Message> {
    let all = button(text(format!("All captures ({})", props.capture_count)))
        .width(Length::Fill)
        .style(if props.editing { button::text } else { button::secondary })
        .on_press(Message::ShowAllCaptures);

    let content = column![
        text("Visionary Capture").size(22),
        vertical_space().height(12),
        button(text("Add image"))
            .width(Length::Fill)
            .style(button::primary)
            .on_press(Message::AddCapture(CaptureKind::Image)),
        button(text("Add video"))
            .width(Length::Fill)
            .style(button::secondary)
            .on_press(Message::AddCapture(CaptureKind::Video)),
        vertical_space().height(12),
        all,
    ]
    .spacing(8);

    container(content)
        .padding(16)
        .width(220)
        .height(Length::Fill)
        .style(container::rounded_box)
        .into()
}
