/// Glyph shaping and rasterization
///
/// Wraps cosmic-text (the text engine iced itself uses) to measure and draw
/// monospace and UI text into a `Canvas`.

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};

use super::highlight::StyledLine;
use super::paint::Canvas;
use crate::color::Rgba8;

/// Text block geometry: font size and line height in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub line_height: f32,
    pub monospace: bool,
}

/// A shaped block of text, ready to measure or draw
pub struct ShapedText {
    buffer: Buffer,
    default_color: Rgba8,
}

impl ShapedText {
    /// Width of the longest laid-out line
    pub fn width(&self) -> f32 {
        self.buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max)
    }
}

pub struct TextPainter {
    font_system: FontSystem,
    cache: SwashCache,
}

impl TextPainter {
    /// Load system fonts. This is slow; keep one painter around.
    pub fn new() -> Self {
        let font_system = FontSystem::new();
        tracing::debug!(faces = font_system.db().len(), "font system loaded");
        Self {
            font_system,
            cache: SwashCache::new(),
        }
    }

    /// Shape highlighted lines as one block
    pub fn shape_lines(&mut self, lines: &[StyledLine], style: TextStyle, default_color: Rgba8) -> ShapedText {
        let mut spans: Vec<(&str, Rgba8)> = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                spans.push(("\n", default_color));
            }
            for span in line {
                spans.push((span.text.as_str(), span.color));
            }
        }
        self.shape(&spans, style, default_color)
    }

    /// Shape plain text in a single colour
    pub fn shape_plain(&mut self, text: &str, style: TextStyle, color: Rgba8) -> ShapedText {
        self.shape(&[(text, color)], style, color)
    }

    fn shape(&mut self, spans: &[(&str, Rgba8)], style: TextStyle, default_color: Rgba8) -> ShapedText {
        let family = if style.monospace { Family::Monospace } else { Family::SansSerif };

        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(style.size, style.line_height));
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_rich_text(
            &mut self.font_system,
            spans
                .iter()
                .map(|(text, color)| (*text, Attrs::new().family(family).color(to_cosmic(*color)))),
            Attrs::new().family(family),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        ShapedText { buffer, default_color }
    }

    /// Draw shaped text with its top-left corner at (x, y)
    pub fn draw(&mut self, canvas: &mut Canvas, text: &ShapedText, x: f32, y: f32) {
        let origin_x = x.round() as i32;
        let origin_y = y.round() as i32;

        text.buffer.draw(
            &mut self.font_system,
            &mut self.cache,
            to_cosmic(text.default_color),
            |gx, gy, w, h, color| {
                let color = Rgba8::new(color.r(), color.g(), color.b(), color.a());
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        canvas.blend(origin_x + gx + dx, origin_y + gy + dy, color);
                    }
                }
            },
        );
    }
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_cosmic(color: Rgba8) -> Color {
    Color::rgba(color.r, color.g, color.b, color.a)
}
