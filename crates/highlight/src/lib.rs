mod color;
mod highlighter;
mod language;

pub use color::{Color, ColorParseError};
pub use highlighter::{
    HighlightKind, HighlightSettings, HighlightToken, KeywordHighlighter, LineHighlight,
};
pub use language::{Language, UnknownLanguage};
