/// Transient notifications
///
/// Every outcome the user should hear about (a capture added, a failed AI
/// call, a finished download) becomes a toast with a title and a short
/// description. Toasts expire on their own after the configured timeout.

use std::time::{Duration, Instant};

use iced::widget::{button, column, container, row, text, Column};
use iced::{Border, Color, Element, Length};

use crate::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

/// Currently visible toasts, oldest first
#[derive(Debug)]
pub struct Notifications {
    toasts: Vec<Toast>,
    next_id: u64,
    timeout: Duration,
}

impl Notifications {
    pub fn new(timeout: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            next_id: 0,
            timeout,
        }
    }

    pub fn success(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Success, title.into(), description.into(), Instant::now());
    }

    pub fn error(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Error, title.into(), description.into(), Instant::now());
    }

    fn push(&mut self, kind: ToastKind, title: String, description: String, now: Instant) {
        self.toasts.push(Toast {
            id: self.next_id,
            title,
            description,
            kind,
            shown_at: now,
        });
        self.next_id += 1;
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    /// Drop every toast older than the timeout
    pub fn expire(&mut self, now: Instant) {
        let timeout = self.timeout;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < timeout);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let toasts = self.toasts.iter().map(|toast| {
            let accent = match toast.kind {
                ToastKind::Success => Color::from_rgb8(0x22, 0xc5, 0x5e),
                ToastKind::Error => Color::from_rgb8(0xef, 0x44, 0x44),
            };

            let body = row![
                column![
                    text(&toast.title).size(15).color(accent),
                    text(&toast.description).size(13),
                ]
                .spacing(4)
                .width(Length::Fill),
                button(text("×").size(14))
                    .style(button::text)
                    .on_press(Message::DismissToast(toast.id)),
            ]
            .spacing(8);

            container(body)
                .padding(12)
                .width(360)
                .style(move |theme: &iced::Theme| container::Style {
                    border: Border {
                        color: accent,
                        width: 1.0,
                        radius: 8.0.into(),
                    },
                    ..container::rounded_box(theme)
                })
                .into()
        });

        Column::with_children(toasts).spacing(8).into()
    }
}
