/// User interface views
///
/// Each view is a plain function from a typed `Props` snapshot to an
/// `Element`. Views never mutate state; they only emit `Message`s.

pub mod ai_tools;
pub mod composer;
pub mod editor_panel;
pub mod file_manager;
pub mod sidebar;
pub mod toast;

use iced::widget::image::Handle;
use iced::Color;

use crate::color::Rgba8;
use crate::datauri::{self, DataUri};

/// Convert a colour for iced
pub fn to_color(color: Rgba8) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a as f32 / 255.0)
}

/// Decode an inline raster image into a handle the image widget can show.
/// Remote sources, videos and formats the decoder does not know yield `None`.
pub fn image_handle(src: &str) -> Option<Handle> {
    let uri = DataUri::parse(src).ok()?;
    datauri::image_format(&uri)?;
    let bytes = uri.decode().ok()?;
    Some(Handle::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_handle_only_for_inline_images() {
        assert!(image_handle("data:image/png;base64,aGVsbG8=").is_some());
        assert!(image_handle("data:video/mp4;base64,aGVsbG8=").is_none());
        assert!(image_handle("https://example.com/a.png").is_none());
        assert!(image_handle("data:image/png;base64").is_none());
    }

    #[test]
    fn test_to_color_keeps_alpha() {
        let color = to_color(Rgba8::new(255, 0, 0, 51));
        assert_eq!(color.r, 1.0);
        assert!((color.a - 0.2).abs() < 1e-6);
    }
}
