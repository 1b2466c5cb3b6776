/// Syntax highlighting for the rasterized composition
///
/// Uses syntect, the same engine behind iced's live editor highlighter, so
/// the exported PNG and the on-screen preview agree on colours.

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::color::Rgba8;
use crate::error::RenderError;
use crate::state::composer::{Language, WindowTheme};

/// A run of text in one colour
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub color: Rgba8,
}

/// One source line (no trailing newline)
pub type StyledLine = Vec<StyledSpan>;

pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Highlighter {
    /// Load the bundled grammars and themes
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    /// Highlight `code` line by line. Always returns exactly one styled
    /// line per `\n`-separated segment, so it lines up with the gutter.
    pub fn highlight(
        &self,
        code: &str,
        language: Language,
        window: WindowTheme,
    ) -> Result<Vec<StyledLine>, RenderError> {
        let theme_name = window.highlight_theme();
        let theme = self
            .themes
            .themes
            .get(theme_name)
            .ok_or_else(|| RenderError::Highlight(format!("missing theme `{}`", theme_name)))?;

        let syntax = self
            .syntaxes
            .find_syntax_by_token(language.syntax_token())
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();

        for segment in code.split('\n') {
            // The newline-aware grammars expect every line to end with `\n`
            let line = format!("{}\n", segment.trim_end_matches('\r'));
            let ranges = highlighter
                .highlight_line(&line, &self.syntaxes)
                .map_err(|e| RenderError::Highlight(e.to_string()))?;

            let spans = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches('\n');
                    if text.is_empty() {
                        return None;
                    }
                    let fg = style.foreground;
                    Some(StyledSpan {
                        text: text.to_string(),
                        color: Rgba8::new(fg.r, fg.g, fg.b, fg.a),
                    })
                })
                .collect();

            lines.push(spans);
        }

        Ok(lines)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &StyledLine) -> String {
        line.iter().map(|span| span.text.as_str()).collect()
    }

    #[test]
    fn test_one_styled_line_per_segment() {
        let highlighter = Highlighter::new();
        let code = "fn main() {\n    println!(\"hi\");\n}\n";

        let lines = highlighter.highlight(code, Language::Rust, WindowTheme::Dark).unwrap();

        assert_eq!(lines.len(), crate::state::composer::line_count(code));
        assert_eq!(plain(&lines[0]), "fn main() {");
        assert_eq!(plain(&lines[1]), "    println!(\"hi\");");
        assert!(lines[3].is_empty());
    }

    #[test]
    fn test_keywords_get_their_own_colour() {
        let highlighter = Highlighter::new();
        let lines = highlighter
            .highlight("fn main() {}", Language::Rust, WindowTheme::Dark)
            .unwrap();

        let colors: std::collections::HashSet<Rgba8> = lines[0].iter().map(|span| span.color).collect();
        assert!(colors.len() > 1, "expected more than one colour, got {:?}", lines[0]);
    }

    #[test]
    fn test_every_language_highlights() {
        let highlighter = Highlighter::new();
        for language in Language::ALL {
            for theme in WindowTheme::ALL {
                let lines = highlighter.highlight("a = 1\nb = 2", language, theme).unwrap();
                assert_eq!(lines.len(), 2, "{language} / {theme}");
            }
        }
    }
}
