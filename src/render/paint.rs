/// Software painting primitives
///
/// A small RGBA canvas with anti-aliased rounded rectangles, circles and
/// diagonal gradients. Everything is composited source-over.

use image::RgbaImage;

use crate::color::Rgba8;

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    fn contains_row(&self, y: f32) -> bool {
        y >= self.y && y < self.y + self.height
    }
}

/// Fill of a shape: one colour, or stops spread along the top-left to
/// bottom-right diagonal of the shape
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    Diagonal(Vec<Rgba8>),
}

impl Paint {
    pub fn from_stops(stops: Vec<Rgba8>) -> Self {
        match stops.as_slice() {
            [single] => Paint::Solid(*single),
            _ => Paint::Diagonal(stops),
        }
    }

    /// Colour at normalized position (u, v) inside the shape
    fn sample(&self, u: f32, v: f32) -> Rgba8 {
        match self {
            Paint::Solid(color) => *color,
            Paint::Diagonal(stops) => {
                // Isolines run parallel to the top-right / bottom-left diagonal
                let t = ((u + v) / 2.0).clamp(0.0, 1.0);
                gradient_at(stops, t)
            }
        }
    }
}

/// Evenly spaced multi-stop gradient
fn gradient_at(stops: &[Rgba8], t: f32) -> Rgba8 {
    match stops.len() {
        0 => Rgba8::TRANSPARENT,
        1 => stops[0],
        n => {
            let scaled = t * (n - 1) as f32;
            let index = (scaled.floor() as usize).min(n - 2);
            stops[index].lerp(stops[index + 1], scaled - index as f32)
        }
    }
}

/// RGBA drawing surface
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Create a fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Composite a colour over one pixel; out-of-bounds writes are dropped
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba8) {
        if x < 0 || y < 0 || x as u32 >= self.image.width() || y as u32 >= self.image.height() {
            return;
        }
        if color.a == 0 {
            return;
        }

        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let [r, g, b, a] = pixel.0;
        let out = color.over(Rgba8::new(r, g, b, a));
        pixel.0 = [out.r, out.g, out.b, out.a];
    }

    /// Fill a rounded rectangle, optionally restricted to the rows of `clip`
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, paint: &Paint, clip: Option<Rect>) {
        let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        let half_w = rect.width / 2.0;
        let half_h = rect.height / 2.0;
        let center_x = rect.x + half_w;
        let center_y = rect.y + half_h;

        let x0 = rect.x.floor().max(0.0) as i32;
        let y0 = rect.y.floor().max(0.0) as i32;
        let x1 = ((rect.x + rect.width).ceil() as i32).min(self.image.width() as i32);
        let y1 = ((rect.y + rect.height).ceil() as i32).min(self.image.height() as i32);

        for py in y0..y1 {
            let sample_y = py as f32 + 0.5;
            if let Some(clip) = clip {
                if !clip.contains_row(sample_y) {
                    continue;
                }
            }

            for px in x0..x1 {
                let sample_x = px as f32 + 0.5;

                // Signed distance to the rounded rectangle
                let qx = (sample_x - center_x).abs() - (half_w - radius);
                let qy = (sample_y - center_y).abs() - (half_h - radius);
                let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
                let inside = qx.max(qy).min(0.0);
                let distance = outside + inside - radius;

                let coverage = (0.5 - distance).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let u = (sample_x - rect.x) / rect.width;
                let v = (sample_y - rect.y) / rect.height;
                let color = paint.sample(u, v);
                let alpha = color.a as f32 / 255.0 * coverage;
                self.blend(px, py, color.with_alpha(alpha));
            }
        }
    }

    pub fn fill_circle(&mut self, center_x: f32, center_y: f32, radius: f32, color: Rgba8) {
        let rect = Rect::new(center_x - radius, center_y - radius, radius * 2.0, radius * 2.0);
        self.fill_rounded_rect(rect, radius, &Paint::Solid(color), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &Canvas, x: u32, y: u32) -> Rgba8 {
        let [r, g, b, a] = canvas.image.get_pixel(x, y).0;
        Rgba8::new(r, g, b, a)
    }

    #[test]
    fn test_rounded_rect_leaves_corners_transparent() {
        let mut canvas = Canvas::new(40, 40);
        canvas.fill_rounded_rect(
            Rect::new(0.0, 0.0, 40.0, 40.0),
            12.0,
            &Paint::Solid(Rgba8::rgb(10, 20, 30)),
            None,
        );

        assert_eq!(pixel(&canvas, 0, 0).a, 0);
        assert_eq!(pixel(&canvas, 20, 20), Rgba8::rgb(10, 20, 30));
        assert_eq!(pixel(&canvas, 20, 0), Rgba8::rgb(10, 20, 30));
    }

    #[test]
    fn test_diagonal_gradient_runs_corner_to_corner() {
        let start = Rgba8::rgb(255, 0, 0);
        let end = Rgba8::rgb(0, 0, 255);
        let mut canvas = Canvas::new(100, 100);
        canvas.fill_rounded_rect(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            0.0,
            &Paint::from_stops(vec![start, end]),
            None,
        );

        let top_left = pixel(&canvas, 0, 0);
        let bottom_right = pixel(&canvas, 99, 99);
        assert!(top_left.r > 250 && top_left.b < 5);
        assert!(bottom_right.b > 250 && bottom_right.r < 5);

        // The anti-diagonal sits at the midpoint
        let top_right = pixel(&canvas, 99, 0);
        let bottom_left = pixel(&canvas, 0, 99);
        assert!((top_right.r as i16 - bottom_left.r as i16).abs() <= 1);
    }

    #[test]
    fn test_clip_restricts_rows() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rounded_rect(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            0.0,
            &Paint::Solid(Rgba8::WHITE),
            Some(Rect::new(0.0, 0.0, 10.0, 4.0)),
        );

        assert_eq!(pixel(&canvas, 5, 3), Rgba8::WHITE);
        assert_eq!(pixel(&canvas, 5, 4).a, 0);
    }

    #[test]
    fn test_gradient_at_three_stops() {
        let stops = [Rgba8::rgb(0, 0, 0), Rgba8::rgb(100, 100, 100), Rgba8::rgb(200, 200, 200)];
        assert_eq!(gradient_at(&stops, 0.0), stops[0]);
        assert_eq!(gradient_at(&stops, 0.5), stops[1]);
        assert_eq!(gradient_at(&stops, 1.0), stops[2]);
    }

    #[test]
    fn test_blend_out_of_bounds_is_ignored() {
        let mut canvas = Canvas::new(2, 2);
        canvas.blend(-1, 0, Rgba8::WHITE);
        canvas.blend(5, 5, Rgba8::WHITE);
        assert_eq!(pixel(&canvas, 0, 0).a, 0);
    }
}
