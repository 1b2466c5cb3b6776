/// Code screenshot composer: style controls and live preview
///
/// The preview mirrors what `render::Rasterizer` paints. The colour filters
/// are applied to every flat colour here; the exported PNG filters every
/// pixel.

use std::path::PathBuf;

use iced::gradient::{self, Gradient};
use iced::highlighter;
use iced::widget::{
    button, column, container, horizontal_space, pick_list, row, scrollable, slider, text,
    text_editor, text_input, toggler, Column, Row,
};
use iced::{Background, Border, Color, Degrees, Element, Font, Length};

use super::to_color;
use crate::color::{Filters, Rgba8};
use crate::state::activity::ActionState;
use crate::state::composer::{
    Background as Fill, ComposerState, GradientPreset, Language, WindowTheme, BRIGHTNESS_RANGE,
    CONTRAST_RANGE, PADDING_RANGE, PADDING_STEP, SATURATION_RANGE,
};
use crate::Message;

const CODE_SIZE: f32 = 16.0;
const LINE_HEIGHT: f32 = 1.6;
const DOT_COLORS: [Rgba8; 3] = [
    Rgba8::rgb(0xef, 0x44, 0x44),
    Rgba8::rgb(0xea, 0xb3, 0x08),
    Rgba8::rgb(0x22, 0xc5, 0x5e),
];

pub struct Props<'a> {
    pub state: &'a ComposerState,
    pub content: &'a text_editor::Content,
    pub download: &'a ActionState<PathBuf>,
    pub explanation: &'a ActionState<String>,
}

pub fn view(props: Props<'_>) -> Element<'_, Message> {
    let controls = scrollable(controls(&props)).width(320);
    let preview = scrollable(
        column![preview(&props), explanation(props.explanation)]
            .spacing(24)
            .width(Length::Fill),
    )
    .width(Length::Fill);

    row![controls, preview].spacing(24).padding(16).into()
}

/// Highlighting theme of the live editor for a window theme
pub fn editor_theme(theme: WindowTheme) -> highlighter::Theme {
    if theme.is_light() {
        highlighter::Theme::InspiredGitHub
    } else {
        highlighter::Theme::Base16Ocean
    }
}

fn labeled<'a>(label: String, control: impl Into<Element<'a, Message>>) -> Column<'a, Message> {
    column![text(label).size(13), control.into()].spacing(6)
}

fn controls<'a>(props: &Props<'a>) -> Element<'a, Message> {
    let state = props.state;
    let filters = state.filters();

    let presets = Column::with_children(GradientPreset::ALL.chunks(3).map(|chunk| {
        Row::with_children(chunk.iter().map(|preset| {
            let active = state.background == Fill::Preset(*preset);
            button(text(preset.name()).size(12))
                .width(Length::Fill)
                .style(if active { button::primary } else { button::secondary })
                .on_press(Message::PresetSelected(*preset))
                .into()
        }))
        .spacing(4)
        .into()
    }))
    .spacing(4);

    let downloading = props.download.is_pending();
    let explaining = props.explanation.is_pending();

    column![
        text("Composer").size(22),
        labeled("Background".into(), presets),
        labeled(
            "Custom colour".into(),
            text_input("#2a2a2a", state.custom_background()).on_input(Message::CustomBackgroundChanged),
        ),
        labeled(
            "Window theme".into(),
            pick_list(WindowTheme::ALL, Some(state.window_theme), Message::WindowThemeSelected),
        ),
        labeled(
            "Language".into(),
            pick_list(Language::ALL, Some(state.language), Message::LanguageSelected),
        ),
        labeled(
            format!("Padding: {}px", state.padding()),
            slider(PADDING_RANGE, state.padding(), Message::PaddingChanged).step(PADDING_STEP),
        ),
        labeled(
            format!("Brightness: {}%", filters.brightness),
            slider(BRIGHTNESS_RANGE, filters.brightness, Message::BrightnessChanged),
        ),
        labeled(
            format!("Contrast: {}%", filters.contrast),
            slider(CONTRAST_RANGE, filters.contrast, Message::ContrastChanged),
        ),
        labeled(
            format!("Saturation: {}%", filters.saturation),
            slider(SATURATION_RANGE, filters.saturation, Message::SaturationChanged),
        ),
        toggler(state.show_line_numbers)
            .label("Line numbers")
            .on_toggle(Message::LineNumbersToggled),
        labeled(
            "Watermark".into(),
            text_input("Watermark", &state.watermark).on_input(Message::WatermarkChanged),
        ),
        button(text(if downloading { "Downloading..." } else { "Download PNG" }))
            .width(Length::Fill)
            .style(button::primary)
            .on_press_maybe((!downloading).then_some(Message::Download)),
        button(text(if explaining { "Explaining..." } else { "Explain code" }))
            .width(Length::Fill)
            .style(button::secondary)
            .on_press_maybe((!explaining).then_some(Message::ExplainCode)),
    ]
    .spacing(16)
    .padding(16)
    .into()
}

fn background(fill: &Fill, filters: Filters) -> Background {
    let stops = fill.stops();
    match stops.as_slice() {
        [single] => Background::Color(to_color(filters.apply(*single))),
        _ => {
            let last = (stops.len() - 1).max(1) as f32;
            let linear = stops
                .iter()
                .enumerate()
                .fold(gradient::Linear::new(Degrees(135.0)), |linear, (i, stop)| {
                    linear.add_stop(i as f32 / last, to_color(filters.apply(*stop)))
                });
            Background::Gradient(Gradient::Linear(linear))
        }
    }
}

fn preview<'a>(props: &Props<'a>) -> Element<'a, Message> {
    let state = props.state;
    let theme = state.window_theme;
    let filters = state.filters();
    let tint = |color: Rgba8| to_color(filters.apply(color));

    let dots = Row::with_children(DOT_COLORS.iter().map(|color| {
        let color = tint(*color);
        container(text(""))
            .width(14)
            .height(14)
            .style(move |_| container::Style {
                background: Some(Background::Color(color)),
                border: Border::default().rounded(7.0),
                ..container::Style::default()
            })
            .into()
    }))
    .spacing(6);

    let chrome_color = tint(theme.chrome_color());
    let chrome = container(dots)
        .padding([12, 16])
        .width(Length::Fill)
        .style(move |_| container::Style {
            background: Some(Background::Color(chrome_color)),
            ..container::Style::default()
        });

    let muted = tint(theme.muted_color());
    let gutter = state.show_line_numbers.then(|| {
        Column::with_children(state.line_numbers().map(|n| {
            text(n.to_string())
                .size(CODE_SIZE)
                .line_height(LINE_HEIGHT)
                .font(Font::MONOSPACE)
                .color(muted)
                .into()
        }))
        .padding([0, 12])
        .align_x(iced::Alignment::End)
    });

    let editor = text_editor(props.content)
        .on_action(Message::CodeEdited)
        .font(Font::MONOSPACE)
        .size(CODE_SIZE)
        .line_height(LINE_HEIGHT)
        .padding(0)
        .style(|theme, status| text_editor::Style {
            background: Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            ..text_editor::default(theme, status)
        })
        .highlight(state.language.syntax_token(), editor_theme(theme));

    let mut code_row = Row::new();
    if let Some(gutter) = gutter {
        code_row = code_row.push(gutter);
    }
    let code_row = code_row.push(editor).padding(16);

    let window_color = tint(theme.window_color());
    let window = container(column![chrome, code_row])
        .width(Length::Fill)
        .style(move |_| container::Style {
            background: Some(Background::Color(window_color)),
            border: Border::default().rounded(12.0),
            ..container::Style::default()
        });

    let mut canvas = Column::new().push(window);
    if state.has_watermark() {
        let mark = text(state.watermark.trim())
            .size(14)
            .color(tint(Rgba8::WHITE.with_alpha(0.5)));
        canvas = canvas.push(row![horizontal_space(), mark].padding([8, 16]));
    }

    let fill = background(&state.background, filters);
    container(canvas)
        .padding(state.padding())
        .width(Length::Fill)
        .style(move |_| container::Style {
            background: Some(fill),
            border: Border::default().rounded(12.0),
            ..container::Style::default()
        })
        .into()
}

fn explanation(state: &ActionState<String>) -> Element<'_, Message> {
    let body: Element<'_, Message> = match state {
        ActionState::Idle => text("Ask for an explanation of the code above.").size(13).into(),
        ActionState::Pending => text("Thinking...").size(13).into(),
        ActionState::Succeeded(markdown) => text(markdown.as_str()).size(14).into(),
        ActionState::Failed(message) => text(message.as_str())
            .size(13)
            .color(Color::from_rgb8(0xef, 0x44, 0x44))
            .into(),
    };

    container(column![text("Explanation").size(18), body].spacing(8))
        .padding(16)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_theme_follows_window() {
        assert_eq!(editor_theme(WindowTheme::Dark), highlighter::Theme::Base16Ocean);
        assert_eq!(editor_theme(WindowTheme::Sunrise), highlighter::Theme::InspiredGitHub);
    }

    #[test]
    fn test_solid_background_is_filtered() {
        let filters = Filters {
            brightness: 50,
            ..Filters::default()
        };
        let fill = Fill::Solid(Rgba8::rgb(200, 200, 200));

        match background(&fill, filters) {
            Background::Color(color) => assert!((color.r - 100.0 / 255.0).abs() < 0.01),
            other => panic!("expected a flat colour, got {:?}", other),
        }
    }

    #[test]
    fn test_preset_background_is_gradient() {
        let fill = Fill::Preset(GradientPreset::Aurora);
        assert!(matches!(background(&fill, Filters::default()), Background::Gradient(_)));
    }
}
