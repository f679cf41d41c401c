use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::color::Color;
use crate::language::Language;

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b(?:
            0[xX][0-9A-Fa-f_]+ |
            0[bB][01_]+ |
            [0-9][0-9_]*(?:\.[0-9_]+)?(?:[eE][+-]?[0-9_]+)?
        )\b",
    )
    .expect("number pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Keyword,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    pub range: Range<usize>,
    pub kind: HighlightKind,
}

/// Display options handed to the highlighter by whoever owns the preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSettings {
    pub colour: Color,
    pub highlight_numbers: bool,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            colour: Color::BLUE,
            highlight_numbers: true,
        }
    }
}

/// Tokens for a single line, with the byte range of that line in the full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHighlight {
    pub line: Range<usize>,
    pub tokens: Vec<HighlightToken>,
}

/// Computes which byte ranges of a snippet body should be painted.
#[derive(Debug, Clone)]
pub struct KeywordHighlighter {
    language: Language,
    settings: HighlightSettings,
}

impl KeywordHighlighter {
    pub fn new(language: Language, settings: HighlightSettings) -> Self {
        Self { language, settings }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn settings(&self) -> &HighlightSettings {
        &self.settings
    }

    /// Colour for highlighted tokens; everything else stays black.
    pub fn colour_for(&self, kind: Option<HighlightKind>) -> Color {
        match kind {
            Some(_) => self.settings.colour,
            None => Color::BLACK,
        }
    }

    /// Keyword (and optionally number) ranges, sorted by start offset.
    pub fn highlight(&self, text: &str) -> Vec<HighlightToken> {
        let mut tokens = Vec::new();
        if text.is_empty() {
            return tokens;
        }
        let mut occupied = vec![false; text.len()];

        if let Some(regex) = self.language.keyword_regex() {
            collect_matches(regex, HighlightKind::Keyword, text, &mut tokens, &mut occupied);
        }
        if self.settings.highlight_numbers {
            collect_matches(
                &NUMBER_REGEX,
                HighlightKind::Number,
                text,
                &mut tokens,
                &mut occupied,
            );
        }

        tokens.sort_by_key(|token| token.range.start);
        tokens
    }

    /// Highlights only the line containing `position`; token ranges are absolute.
    pub fn highlight_line(&self, text: &str, position: usize) -> LineHighlight {
        let line = line_bounds(text, position);
        let offset = line.start;
        let tokens = self
            .highlight(&text[line.clone()])
            .into_iter()
            .map(|token| HighlightToken {
                range: token.range.start + offset..token.range.end + offset,
                kind: token.kind,
            })
            .collect();
        LineHighlight { line, tokens }
    }
}

fn collect_matches(
    regex: &Regex,
    kind: HighlightKind,
    text: &str,
    tokens: &mut Vec<HighlightToken>,
    occupied: &mut [bool],
) {
    for found in regex.find_iter(text) {
        let range = found.start()..found.end();
        if occupied[range.clone()].iter().any(|taken| *taken) {
            continue;
        }
        occupied[range.clone()].fill(true);
        tokens.push(HighlightToken { range, kind });
    }
}

fn line_bounds(text: &str, position: usize) -> Range<usize> {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }
    let start = text[..position].rfind('\n').map_or(0, |index| index + 1);
    let end = text[position..]
        .find('\n')
        .map_or(text.len(), |index| position + index);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(text: &str, tokens: &[HighlightToken]) -> Vec<(String, HighlightKind)> {
        tokens
            .iter()
            .map(|token| (text[token.range.clone()].to_string(), token.kind))
            .collect()
    }

    #[test]
    fn highlights_python_keywords_and_numbers() {
        let highlighter = KeywordHighlighter::new(Language::Python, HighlightSettings::default());
        let text = "for item in range(10):\n    print(item)";
        let tokens = highlighter.highlight(text);
        assert_eq!(
            ranges(text, &tokens),
            vec![
                ("for".to_string(), HighlightKind::Keyword),
                ("in".to_string(), HighlightKind::Keyword),
                ("10".to_string(), HighlightKind::Number),
                ("print".to_string(), HighlightKind::Keyword),
            ]
        );
    }

    #[test]
    fn number_highlighting_can_be_disabled() {
        let settings = HighlightSettings {
            colour: Color::rgb(200, 0, 0),
            highlight_numbers: false,
        };
        let highlighter = KeywordHighlighter::new(Language::PlainText, settings);
        assert!(highlighter.highlight("42 and 0xFF").is_empty());
        assert_eq!(
            highlighter.colour_for(Some(HighlightKind::Keyword)),
            Color::rgb(200, 0, 0)
        );
        assert_eq!(highlighter.colour_for(None), Color::BLACK);
    }

    #[test]
    fn identifiers_with_digits_are_not_numbers() {
        let highlighter = KeywordHighlighter::new(Language::PlainText, HighlightSettings::default());
        assert!(highlighter.highlight("x1 y_2").is_empty());
    }

    #[test]
    fn highlight_line_limits_tokens_to_current_line() {
        let highlighter = KeywordHighlighter::new(Language::Java, HighlightSettings::default());
        let text = "int a;\nreturn b;\nint c;";
        let line = highlighter.highlight_line(text, 9);
        assert_eq!(line.line, 7..16);
        assert_eq!(
            ranges(text, &line.tokens),
            vec![("return".to_string(), HighlightKind::Keyword)]
        );
    }

    #[test]
    fn highlight_line_clamps_out_of_range_positions() {
        let highlighter = KeywordHighlighter::new(Language::Java, HighlightSettings::default());
        let text = "int a;\nnew b;";
        let line = highlighter.highlight_line(text, 500);
        assert_eq!(line.line, 7..13);
        assert_eq!(line.tokens.len(), 1);
    }
}
