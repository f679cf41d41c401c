use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

const JAVA_KEYWORDS: &str = "abstract|continue|for|new|switch|default|package|null|synchronized|boolean|do|if|private|this|throws|break|double|implements|protected|throw|else|import|public|case|instanceof|return|catch|extends|int|try|char|final|interface|static|void|class|finally|long|float|super|while";

const CSHARP_KEYWORDS: &str = "abstract|event|new|struct|as|null|switch|base|this|bool|false|operator|throw|break|finally|out|true|override|try|case|catch|for|private|foreach|protected|public|class|if|readonly|const|ref|continue|in|return|using|int|virtual|default|interface|sealed|delegate|internal|void|do|is|while|double|else|static|namespace|string";

const PHP_KEYWORDS: &str = "abstract|and|array|as|break|case|catch|class|const|continue|declare|default|die|do|echo|else|elseif|enddeclare|endfor|endforeach|endif|endswitch|endwhile|extends|final|for|foreach|function|global|if|implements|include|interface|new|or|private|protected|public|require|return|static|switch|throw|try|var|while";

const PASCAL_KEYWORDS: &str = "and|array|as|begin|case|class|const|constructor|destructor|do|downto|else|end|except|file|finally|for|function|if|implementation|in|inherited|interface|is|mod|not|object|of|on|or|procedure|program|property|raise|record|repeat|set|then|to|try|type|unit|until|uses|var|while|with|xor";

const PYTHON_KEYWORDS: &str = "and|as|assert|break|class|continue|def|del|elif|else|except|exec|finally|for|from|global|if|import|in|is|lambda|not|or|pass|print|raise|return|try|while|with|yield";

const JAVASCRIPT_KEYWORDS: &str = "break|case|catch|continue|debugger|default|delete|do|else|finally|for|function|if|in|instanceof|new|return|switch|this|throw|try|typeof|var|void|while|with";

/// Source language a snippet is written in.
///
/// The set is closed: it doubles as the partition key of the snippet store and
/// as the element name used when the store is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Java,
    CSharp,
    Php,
    Pascal,
    Python,
    JavaScript,
    #[default]
    PlainText,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Java,
        Language::CSharp,
        Language::Php,
        Language::Pascal,
        Language::Python,
        Language::JavaScript,
        Language::PlainText,
    ];

    /// Stable identifier written to snippet documents.
    ///
    /// Pascal keeps the historical `CPlusPlus` element name so existing
    /// documents stay readable by older tools.
    pub fn identifier(self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::CSharp => "CSharp",
            Language::Php => "PHP",
            Language::Pascal => "CPlusPlus",
            Language::Python => "Python",
            Language::JavaScript => "Javascript",
            Language::PlainText => "PlainText",
        }
    }

    /// Human readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Php => "PHP",
            Language::Pascal => "Pascal",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::PlainText => "Plain Text",
        }
    }

    /// Raw keyword alternation (`a|b|c`). Empty for plain text.
    pub fn keyword_pattern(self) -> &'static str {
        match self {
            Language::Java => JAVA_KEYWORDS,
            Language::CSharp => CSHARP_KEYWORDS,
            Language::Php => PHP_KEYWORDS,
            Language::Pascal => PASCAL_KEYWORDS,
            Language::Python => PYTHON_KEYWORDS,
            Language::JavaScript => JAVASCRIPT_KEYWORDS,
            Language::PlainText => "",
        }
    }

    /// Compiled, word-bounded keyword matcher; `None` when the language has no keywords.
    pub fn keyword_regex(self) -> Option<&'static Regex> {
        KEYWORD_REGEXES[self.index()].as_ref()
    }

    /// Resolves an identifier, including the legacy names older documents used.
    pub fn from_identifier(identifier: &str) -> Option<Language> {
        match identifier {
            "Pascal" => return Some(Language::Pascal),
            "JavaScript" => return Some(Language::JavaScript),
            _ => {}
        }
        Language::ALL
            .into_iter()
            .find(|language| language.identifier() == identifier)
    }

    fn index(self) -> usize {
        match self {
            Language::Java => 0,
            Language::CSharp => 1,
            Language::Php => 2,
            Language::Pascal => 3,
            Language::Python => 4,
            Language::JavaScript => 5,
            Language::PlainText => 6,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts identifiers and display labels, ignoring ASCII case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(language) = Language::from_identifier(trimmed) {
            return Ok(language);
        }
        Language::ALL
            .into_iter()
            .find(|language| {
                language.identifier().eq_ignore_ascii_case(trimmed)
                    || language.display_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownLanguage(value.to_string()))
    }
}

static KEYWORD_REGEXES: Lazy<Vec<Option<Regex>>> = Lazy::new(|| {
    Language::ALL
        .into_iter()
        .map(|language| build_keyword_regex(language.keyword_pattern()))
        .collect()
});

fn build_keyword_regex(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    let bounded = format!(r"\b(?:{pattern})\b");
    let regex = RegexBuilder::new(&bounded)
        .multi_line(true)
        .build()
        .expect("built-in keyword pattern must compile");
    Some(regex)
}
