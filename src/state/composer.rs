/// Code screenshot composition state
///
/// This struct stores everything the composer's controls edit. Every control
/// maps to exactly one field; the preview and the rasterizer both read
/// a `ComposerState` and nothing else.

use std::fmt;
use std::ops::RangeInclusive;

use crate::color::{Filters, Rgba8};

pub const PADDING_RANGE: RangeInclusive<u16> = 16..=128;
pub const PADDING_STEP: u16 = 8;
pub const BRIGHTNESS_RANGE: RangeInclusive<u16> = 50..=150;
pub const CONTRAST_RANGE: RangeInclusive<u16> = 50..=150;
pub const SATURATION_RANGE: RangeInclusive<u16> = 0..=200;

const INITIAL_CODE: &str = r#"import React from "react";

function HelloWorld() {
  return <h1>Hello, World!</h1>;
}"#;

const DEFAULT_WATERMARK: &str = "Visionary Capture";
const DEFAULT_CUSTOM_BACKGROUND: Rgba8 = Rgba8::rgb(0x2a, 0x2a, 0x2a);

/// Highlighting grammars offered by the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Python,
    Java,
    CSharp,
    Go,
    Rust,
    Php,
    Sql,
    Css,
    Json,
    Yaml,
    Bash,
    Markdown,
}

impl Language {
    pub const ALL: [Language; 16] = [
        Language::JavaScript,
        Language::Jsx,
        Language::TypeScript,
        Language::Tsx,
        Language::Python,
        Language::Java,
        Language::CSharp,
        Language::Go,
        Language::Rust,
        Language::Php,
        Language::Sql,
        Language::Css,
        Language::Json,
        Language::Yaml,
        Language::Bash,
        Language::Markdown,
    ];

    /// Identifier sent to the model service
    pub fn id(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Jsx => "jsx",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Python => "python",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Sql => "sql",
            Language::Css => "css",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Bash => "bash",
            Language::Markdown => "markdown",
        }
    }

    /// Syntax token for the highlighter. The bundled grammars have no
    /// TypeScript, so TS/TSX highlight as JavaScript.
    pub fn syntax_token(self) -> &'static str {
        match self {
            Language::JavaScript | Language::Jsx | Language::TypeScript | Language::Tsx => "js",
            Language::Python => "py",
            Language::Java => "java",
            Language::CSharp => "cs",
            Language::Go => "go",
            Language::Rust => "rs",
            Language::Php => "php",
            Language::Sql => "sql",
            Language::Css => "css",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Bash => "sh",
            Language::Markdown => "md",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Language::JavaScript => "JavaScript",
            Language::Jsx => "JSX",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Php => "PHP",
            Language::Sql => "SQL",
            Language::Css => "CSS",
            Language::Json => "JSON",
            Language::Yaml => "YAML",
            Language::Bash => "Bash",
            Language::Markdown => "Markdown",
        };
        f.write_str(label)
    }
}

/// Look of the code window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowTheme {
    Dark,
    Light,
    Midnight,
    Sunrise,
}

impl WindowTheme {
    pub const ALL: [WindowTheme; 4] = [
        WindowTheme::Dark,
        WindowTheme::Light,
        WindowTheme::Midnight,
        WindowTheme::Sunrise,
    ];

    pub fn is_light(self) -> bool {
        matches!(self, WindowTheme::Light | WindowTheme::Sunrise)
    }

    /// Fill of the window body
    pub fn window_color(self) -> Rgba8 {
        match self {
            WindowTheme::Dark => Rgba8::rgb(0, 0, 0).with_alpha(0.75),
            WindowTheme::Light => Rgba8::WHITE.with_alpha(0.75),
            WindowTheme::Midnight => Rgba8::rgb(0x0d, 0x11, 0x17).with_alpha(0.80),
            WindowTheme::Sunrise => Rgba8::rgb(0xfa, 0xfa, 0xfa).with_alpha(0.80),
        }
    }

    /// Fill of the title bar holding the three dots
    pub fn chrome_color(self) -> Rgba8 {
        match self {
            WindowTheme::Dark => Rgba8::rgb(0, 0, 0).with_alpha(0.20),
            WindowTheme::Light => Rgba8::rgb(0xe5, 0xe7, 0xeb).with_alpha(0.80),
            WindowTheme::Midnight => Rgba8::rgb(0, 0, 0).with_alpha(0.30),
            WindowTheme::Sunrise => Rgba8::rgb(0xf3, 0xf4, 0xf6).with_alpha(0.90),
        }
    }

    /// Colour of the line-number gutter text
    pub fn muted_color(self) -> Rgba8 {
        if self.is_light() {
            Rgba8::rgb(0x71, 0x71, 0x7a)
        } else {
            Rgba8::rgb(0xa1, 0xa1, 0xaa)
        }
    }

    /// Fallback colour for code the highlighter leaves unstyled
    pub fn text_color(self) -> Rgba8 {
        if self.is_light() {
            Rgba8::rgb(0x18, 0x18, 0x1b)
        } else {
            Rgba8::rgb(0xf4, 0xf4, 0xf5)
        }
    }

    /// Name of the highlighting theme that matches this window
    pub fn highlight_theme(self) -> &'static str {
        if self.is_light() {
            "InspiredGitHub"
        } else {
            "base16-ocean.dark"
        }
    }
}

impl fmt::Display for WindowTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WindowTheme::Dark => "Dark",
            WindowTheme::Light => "Light",
            WindowTheme::Midnight => "Midnight",
            WindowTheme::Sunrise => "Sunrise",
        })
    }
}

/// Named background presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientPreset {
    PurpleDream,
    Sunset,
    Ocean,
    Citrus,
    Aqua,
    Aurora,
    Slate,
    Zinc,
    White,
}

impl GradientPreset {
    pub const ALL: [GradientPreset; 9] = [
        GradientPreset::PurpleDream,
        GradientPreset::Sunset,
        GradientPreset::Ocean,
        GradientPreset::Citrus,
        GradientPreset::Aqua,
        GradientPreset::Aurora,
        GradientPreset::Slate,
        GradientPreset::Zinc,
        GradientPreset::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GradientPreset::PurpleDream => "Purple Dream",
            GradientPreset::Sunset => "Sunset",
            GradientPreset::Ocean => "Ocean",
            GradientPreset::Citrus => "Citrus",
            GradientPreset::Aqua => "Aqua",
            GradientPreset::Aurora => "Aurora",
            GradientPreset::Slate => "Slate",
            GradientPreset::Zinc => "Zinc",
            GradientPreset::White => "White",
        }
    }

    /// Colour stops from top-left to bottom-right. One stop = solid fill.
    pub fn stops(self) -> &'static [Rgba8] {
        const PURPLE_DREAM: [Rgba8; 2] = [Rgba8::rgb(0xa8, 0x55, 0xf7), Rgba8::rgb(0x4f, 0x46, 0xe5)];
        const SUNSET: [Rgba8; 2] = [Rgba8::rgb(0xec, 0x48, 0x99), Rgba8::rgb(0xf4, 0x3f, 0x5e)];
        const OCEAN: [Rgba8; 2] = [Rgba8::rgb(0x4a, 0xde, 0x80), Rgba8::rgb(0x3b, 0x82, 0xf6)];
        const CITRUS: [Rgba8; 2] = [Rgba8::rgb(0xfa, 0xcc, 0x15), Rgba8::rgb(0xf9, 0x73, 0x16)];
        const AQUA: [Rgba8; 2] = [Rgba8::rgb(0x2d, 0xd4, 0xbf), Rgba8::rgb(0x08, 0x91, 0xb2)];
        const AURORA: [Rgba8; 3] = [
            Rgba8::rgb(0xfb, 0x71, 0x85),
            Rgba8::rgb(0xd9, 0x46, 0xef),
            Rgba8::rgb(0x63, 0x66, 0xf1),
        ];
        const SLATE: [Rgba8; 1] = [Rgba8::rgb(0x1e, 0x29, 0x3b)];
        const ZINC: [Rgba8; 1] = [Rgba8::rgb(0x18, 0x18, 0x1b)];
        const WHITE: [Rgba8; 1] = [Rgba8::rgb(0xfa, 0xfa, 0xfa)];

        match self {
            GradientPreset::PurpleDream => &PURPLE_DREAM,
            GradientPreset::Sunset => &SUNSET,
            GradientPreset::Ocean => &OCEAN,
            GradientPreset::Citrus => &CITRUS,
            GradientPreset::Aqua => &AQUA,
            GradientPreset::Aurora => &AURORA,
            GradientPreset::Slate => &SLATE,
            GradientPreset::Zinc => &ZINC,
            GradientPreset::White => &WHITE,
        }
    }
}

/// Active background: a preset or a raw colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Preset(GradientPreset),
    Solid(Rgba8),
}

impl Background {
    /// Colour stops for painting, top-left to bottom-right
    pub fn stops(&self) -> Vec<Rgba8> {
        match self {
            Background::Preset(preset) => preset.stops().to_vec(),
            Background::Solid(color) => vec![*color],
        }
    }
}

/// All composer inputs for one editing session
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerState {
    code: String,
    line_count: usize,
    pub language: Language,
    padding: u16,
    pub window_theme: WindowTheme,
    pub background: Background,
    /// Text of the custom colour field, applied only when it parses
    custom_background: String,
    pub show_line_numbers: bool,
    pub watermark: String,
    filters: Filters,
}

impl Default for ComposerState {
    fn default() -> Self {
        Self {
            code: INITIAL_CODE.to_string(),
            line_count: line_count(INITIAL_CODE),
            language: Language::Jsx,
            padding: 64,
            window_theme: WindowTheme::Dark,
            background: Background::Preset(GradientPreset::PurpleDream),
            custom_background: DEFAULT_CUSTOM_BACKGROUND.to_hex(),
            show_line_numbers: true,
            watermark: DEFAULT_WATERMARK.to_string(),
            filters: Filters::default(),
        }
    }
}

impl ComposerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replace the code buffer; the line count is recomputed only here
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
        self.line_count = line_count(&self.code);
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Line numbers shown in the gutter, starting at 1
    pub fn line_numbers(&self) -> RangeInclusive<usize> {
        1..=self.line_count
    }

    pub fn padding(&self) -> u16 {
        self.padding
    }

    /// Set padding, clamped to the slider range and snapped to its step
    pub fn set_padding(&mut self, padding: u16) {
        let min = *PADDING_RANGE.start();
        let clamped = padding.clamp(min, *PADDING_RANGE.end());
        let snapped = min + ((clamped - min + PADDING_STEP / 2) / PADDING_STEP) * PADDING_STEP;
        self.padding = snapped.min(*PADDING_RANGE.end());
    }

    pub fn custom_background(&self) -> &str {
        &self.custom_background
    }

    /// Update the custom colour field. A valid colour becomes the active
    /// background; anything else only updates the field text.
    pub fn set_custom_background(&mut self, input: impl Into<String>) -> bool {
        self.custom_background = input.into();
        match Rgba8::from_hex(&self.custom_background) {
            Some(color) => {
                self.background = Background::Solid(color);
                true
            }
            None => false,
        }
    }

    pub fn filters(&self) -> Filters {
        self.filters
    }

    pub fn set_brightness(&mut self, value: u16) {
        self.filters.brightness = value.clamp(*BRIGHTNESS_RANGE.start(), *BRIGHTNESS_RANGE.end());
    }

    pub fn set_contrast(&mut self, value: u16) {
        self.filters.contrast = value.clamp(*CONTRAST_RANGE.start(), *CONTRAST_RANGE.end());
    }

    pub fn set_saturation(&mut self, value: u16) {
        self.filters.saturation = value.clamp(*SATURATION_RANGE.start(), *SATURATION_RANGE.end());
    }

    /// Whether a watermark should be drawn
    pub fn has_watermark(&self) -> bool {
        !self.watermark.trim().is_empty()
    }
}

/// Number of newline-separated segments; the empty string has one line
pub fn line_count(code: &str) -> usize {
    code.split('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(line_count("a\nb\nc"), 3);
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("trailing\n"), 2);
        assert_eq!(line_count("\r\n\r\n"), 3);
    }

    #[test]
    fn test_set_code_updates_derived_lines() {
        let mut state = ComposerState::default();
        assert_eq!(state.line_count(), 5);

        state.set_code("fn main() {}\n");
        assert_eq!(state.line_count(), 2);
        assert_eq!(state.line_numbers().collect::<Vec<_>>(), vec![1, 2]);

        state.set_code("");
        assert_eq!(state.line_numbers().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_defaults() {
        let state = ComposerState::default();
        assert_eq!(state.language, Language::Jsx);
        assert_eq!(state.padding(), 64);
        assert_eq!(state.window_theme, WindowTheme::Dark);
        assert_eq!(state.background, Background::Preset(GradientPreset::PurpleDream));
        assert_eq!(state.custom_background(), "#2a2a2a");
        assert!(state.show_line_numbers);
        assert_eq!(state.watermark, "Visionary Capture");
        assert!(state.filters().is_identity());
    }

    #[test]
    fn test_padding_clamps_and_snaps() {
        let mut state = ComposerState::default();
        state.set_padding(0);
        assert_eq!(state.padding(), 16);
        state.set_padding(500);
        assert_eq!(state.padding(), 128);
        state.set_padding(30);
        assert_eq!(state.padding(), 32);
        state.set_padding(27);
        assert_eq!(state.padding(), 24);
    }

    #[test]
    fn test_custom_background_applies_only_valid_colours() {
        let mut state = ComposerState::default();

        assert!(!state.set_custom_background("#12"));
        assert_eq!(state.custom_background(), "#12");
        assert_eq!(state.background, Background::Preset(GradientPreset::PurpleDream));

        assert!(state.set_custom_background("#123456"));
        assert_eq!(state.background, Background::Solid(Rgba8::rgb(0x12, 0x34, 0x56)));
    }

    #[test]
    fn test_filter_setters_clamp() {
        let mut state = ComposerState::default();
        state.set_brightness(10);
        state.set_contrast(400);
        state.set_saturation(250);
        assert_eq!(
            state.filters(),
            Filters { brightness: 50, contrast: 150, saturation: 200 }
        );
    }

    #[test]
    fn test_typescript_highlights_as_javascript() {
        assert_eq!(Language::Tsx.syntax_token(), "js");
        assert_eq!(Language::Rust.syntax_token(), "rs");
        assert_eq!(Language::CSharp.to_string(), "C#");
    }

    #[test]
    fn test_background_stops() {
        assert_eq!(Background::Preset(GradientPreset::Aurora).stops().len(), 3);
        assert_eq!(Background::Preset(GradientPreset::Slate).stops().len(), 1);
        assert_eq!(Background::Solid(Rgba8::WHITE).stops(), vec![Rgba8::WHITE]);
    }
}
