/// Color utilities
///
/// This module handles the colour math shared by the live preview and
/// the rasterizer:
/// - 8-bit RGBA colours and hex parsing
/// - Alpha compositing
/// - Brightness / contrast / saturation filters with CSS semantics

/// Rec. 709 luminance weights, as used by CSS `saturate()`
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// An 8-bit sRGB colour with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same colour with an opacity in `0.0..=1.0`
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: to_u8(alpha),
            ..self
        }
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(input: &str) -> Option<Self> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).ok();

        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| {
                    let s = c.to_string();
                    channel(&s.repeat(2))
                });
                Some(Self::rgb(digits.next()??, digits.next()??, digits.next()??))
            }
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as floats in `0.0..=1.0`
    pub fn to_f32(self) -> [f32; 4] {
        [to_f32(self.r), to_f32(self.g), to_f32(self.b), to_f32(self.a)]
    }

    pub fn from_f32(rgba: [f32; 4]) -> Self {
        Self::new(to_u8(rgba[0]), to_u8(rgba[1]), to_u8(rgba[2]), to_u8(rgba[3]))
    }

    /// Composite `self` over `dst` (source-over, straight alpha)
    pub fn over(self, dst: Self) -> Self {
        let [sr, sg, sb, sa] = self.to_f32();
        let [dr, dg, db, da] = dst.to_f32();

        let out_a = sa + da * (1.0 - sa);
        if out_a <= f32::EPSILON {
            return Self::TRANSPARENT;
        }

        let mix = |s: f32, d: f32| (s * sa + d * da * (1.0 - sa)) / out_a;
        Self::from_f32([mix(sr, dr), mix(sg, dg), mix(sb, db), out_a])
    }

    /// Linear interpolation between two colours
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let a = self.to_f32();
        let b = other.to_f32();
        Self::from_f32([
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
            a[3] + (b[3] - a[3]) * t,
        ])
    }
}

/// Brightness / contrast / saturation, as integer percentages
///
/// 100 means "no adjustment" for all three, like the CSS filter functions
/// `brightness()`, `contrast()` and `saturate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    pub brightness: u16,
    pub contrast: u16,
    pub saturation: u16,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
        }
    }
}

impl Filters {
    /// Check if this represents an unfiltered image
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the filters to one colour. Alpha is preserved.
    ///
    /// Order and clamping follow the CSS filter chain: each step works on
    /// the clamped output of the previous one.
    pub fn apply(&self, color: Rgba8) -> Rgba8 {
        if self.is_identity() {
            return color;
        }

        let [r, g, b, a] = color.to_f32();
        let mut rgb = [r, g, b];

        // 1. Brightness (linear multiplier)
        let brightness = self.brightness as f32 / 100.0;
        for c in rgb.iter_mut() {
            *c = (*c * brightness).clamp(0.0, 1.0);
        }

        // 2. Contrast (around midpoint 0.5)
        let contrast = self.contrast as f32 / 100.0;
        for c in rgb.iter_mut() {
            *c = ((*c - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
        }

        // 3. Saturation (mix between luminance and colour)
        let saturation = self.saturation as f32 / 100.0;
        let luminance = rgb[0] * LUMA[0] + rgb[1] * LUMA[1] + rgb[2] * LUMA[2];
        for c in rgb.iter_mut() {
            *c = (luminance + (*c - luminance) * saturation).clamp(0.0, 1.0);
        }

        Rgba8::from_f32([rgb[0], rgb[1], rgb[2], a])
    }

    /// Apply the filters to every pixel of an image in place
    pub fn apply_to_image(&self, image: &mut image::RgbaImage) {
        if self.is_identity() {
            return;
        }
        for pixel in image.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let out = self.apply(Rgba8::new(r, g, b, a));
            pixel.0 = [out.r, out.g, out.b, out.a];
        }
    }
}

fn to_f32(channel: u8) -> f32 {
    channel as f32 / 255.0
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
