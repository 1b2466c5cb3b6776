/// Composition rasterizer
///
/// Paints the composer's current state (background, code window, gutter,
/// highlighted code, watermark, filters) into an RGBA image at an
/// arbitrary pixel ratio and encodes it as PNG.
///
/// Architecture:
/// - `paint.rs` - canvas and shape primitives
/// - `highlight.rs` - syntect tokenization into coloured spans
/// - `text.rs` - glyph shaping and drawing via cosmic-text
/// - `export.rs` - where the encoded PNG ends up

pub mod export;
pub mod highlight;
pub mod paint;
pub mod text;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

use crate::color::Rgba8;
use crate::error::RenderError;
use crate::state::composer::ComposerState;
use highlight::Highlighter;
use paint::{Canvas, Paint, Rect};
use text::{TextPainter, TextStyle};

// Layout in logical pixels, multiplied by the pixel ratio when painting
const CODE_FONT_SIZE: f32 = 16.0;
const CODE_LINE_HEIGHT: f32 = CODE_FONT_SIZE * 1.6;
const CONTENT_PADDING: f32 = 16.0;
const GUTTER_PADDING_LEFT: f32 = 16.0;
const GUTTER_PADDING_RIGHT: f32 = 12.0;
const MIN_WINDOW_WIDTH: f32 = 320.0;
const CORNER_RADIUS: f32 = 12.0;

const CHROME_PADDING: f32 = 12.0;
const DOT_RADIUS: f32 = 7.0;
const DOT_SPACING: f32 = 20.0;
const CHROME_HEIGHT: f32 = CHROME_PADDING * 2.0 + DOT_RADIUS * 2.0;
const DOT_COLORS: [Rgba8; 3] = [
    Rgba8::rgb(0xef, 0x44, 0x44),
    Rgba8::rgb(0xea, 0xb3, 0x08),
    Rgba8::rgb(0x22, 0xc5, 0x5e),
];

const WATERMARK_FONT_SIZE: f32 = 14.0;
const WATERMARK_LINE_HEIGHT: f32 = 20.0;
const WATERMARK_RIGHT: f32 = 32.0;
const WATERMARK_BOTTOM: f32 = 24.0;

// Largest surface the rasterizer will allocate
const MAX_SURFACE_SIDE: u32 = 16_384;
const MAX_SURFACE_PIXELS: u64 = 64 * 1024 * 1024;

fn check_surface(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptySurface { width, height });
    }
    if width > MAX_SURFACE_SIDE
        || height > MAX_SURFACE_SIDE
        || width as u64 * height as u64 > MAX_SURFACE_PIXELS
    {
        return Err(RenderError::TooLarge { width, height });
    }
    Ok(())
}

/// Turns composer state into pixels
pub struct Rasterizer {
    highlighter: Highlighter,
    text: TextPainter,
}

impl Rasterizer {
    /// Load grammars, themes and fonts
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
            text: TextPainter::new(),
        }
    }

    /// Paint the composition at `scale` device pixels per logical pixel
    pub fn render(&mut self, state: &ComposerState, scale: f32) -> Result<RgbaImage, RenderError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::EmptySurface { width: 0, height: 0 });
        }

        // Height is known from the line count alone; check it before shaping
        let padding = state.padding() as f32 * scale;
        let window_height = (CHROME_HEIGHT + CONTENT_PADDING * 2.0) * scale
            + state.line_count() as f32 * CODE_LINE_HEIGHT * scale;
        let height = (window_height + padding * 2.0).ceil() as u32;
        check_surface((MIN_WINDOW_WIDTH * scale + padding * 2.0).ceil() as u32, height)?;

        let theme = state.window_theme;
        let lines = self.highlighter.highlight(state.code(), state.language, theme)?;

        let code_style = TextStyle {
            size: CODE_FONT_SIZE * scale,
            line_height: CODE_LINE_HEIGHT * scale,
            monospace: true,
        };
        let code = self.text.shape_lines(&lines, code_style, theme.text_color());

        let gutter = state.show_line_numbers.then(|| {
            let numbers = state
                .line_numbers()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            self.text.shape_plain(&numbers, code_style, theme.muted_color())
        });

        // Horizontal offset of the code column inside the window
        let code_offset = match &gutter {
            Some(numbers) => (GUTTER_PADDING_LEFT + GUTTER_PADDING_RIGHT) * scale + numbers.width(),
            None => CONTENT_PADDING * scale,
        };

        let window_width = (code_offset + code.width() + CONTENT_PADDING * scale).max(MIN_WINDOW_WIDTH * scale);
        let width = (window_width + padding * 2.0).ceil() as u32;
        check_surface(width, height)?;

        let mut canvas = Canvas::new(width, height);
        let radius = CORNER_RADIUS * scale;

        // Background
        let surface = Rect::new(0.0, 0.0, width as f32, height as f32);
        canvas.fill_rounded_rect(surface, radius, &Paint::from_stops(state.background.stops()), None);

        // Window body and title bar
        let window = Rect::new(padding, padding, window_width, window_height);
        canvas.fill_rounded_rect(window, radius, &Paint::Solid(theme.window_color()), None);
        let chrome = Rect::new(padding, padding, window_width, CHROME_HEIGHT * scale);
        canvas.fill_rounded_rect(window, radius, &Paint::Solid(theme.chrome_color()), Some(chrome));

        let dot_y = padding + (CHROME_PADDING + DOT_RADIUS) * scale;
        for (i, color) in DOT_COLORS.iter().enumerate() {
            let dot_x = padding + (CONTENT_PADDING + DOT_RADIUS + i as f32 * DOT_SPACING) * scale;
            canvas.fill_circle(dot_x, dot_y, DOT_RADIUS * scale, *color);
        }

        // Gutter and code
        let content_y = padding + (CHROME_HEIGHT + CONTENT_PADDING) * scale;
        if let Some(numbers) = &gutter {
            self.text
                .draw(&mut canvas, numbers, padding + GUTTER_PADDING_LEFT * scale, content_y);
        }
        self.text.draw(&mut canvas, &code, padding + code_offset, content_y);

        if state.has_watermark() {
            let style = TextStyle {
                size: WATERMARK_FONT_SIZE * scale,
                line_height: WATERMARK_LINE_HEIGHT * scale,
                monospace: false,
            };
            let mark = self
                .text
                .shape_plain(state.watermark.trim(), style, Rgba8::WHITE.with_alpha(0.5));
            let x = width as f32 - WATERMARK_RIGHT * scale - mark.width();
            let y = height as f32 - WATERMARK_BOTTOM * scale - WATERMARK_LINE_HEIGHT * scale;
            self.text.draw(&mut canvas, &mark, x, y);
        }

        let mut image = canvas.into_image();
        state.filters().apply_to_image(&mut image);

        tracing::debug!(width, height, scale, "composition rendered");
        Ok(image)
    }

    /// Render and encode in one step
    pub fn render_png(&mut self, state: &ComposerState, scale: f32) -> Result<Vec<u8>, RenderError> {
        let image = self.render(state, scale)?;
        encode_png(&image)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an RGBA image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(|e| RenderError::Encode(std::sync::Arc::new(e)))?;
    Ok(bytes)
}
