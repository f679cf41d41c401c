use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use snippetbox_highlight::Language;

use crate::error::SnippetError;

/// 儲存區中的單一片段。 / A named, tagged piece of text written in one language.
///
/// Values are immutable once built. Editing a snippet means building a new one
/// (usually through the `with_*` copies) and handing both to
/// [`SnippetManager::update`](crate::SnippetManager::update).
///
/// Snippets order by name first; the remaining fields only break ties so the
/// ordering agrees with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snippet {
    name: String,
    body: String,
    description: String,
    keywords: BTreeSet<String>,
    language: Language,
}

impl Snippet {
    pub fn new<I, K>(
        name: impl Into<String>,
        body: impl Into<String>,
        description: impl Into<String>,
        keywords: I,
        language: Language,
    ) -> Result<Self, SnippetError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(SnippetError::InvalidArgument(
                "snippet name must not be empty".into(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            body: body.into(),
            description: description.into(),
            keywords: normalize_keywords(keywords),
            language,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Case-insensitive name comparison used for store uniqueness.
    pub fn has_name(&self, name: &str) -> bool {
        names_equal(&self.name, name)
    }

    pub fn with_body(&self, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..self.clone()
        }
    }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    pub fn with_keywords<I, K>(&self, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        Self {
            keywords: normalize_keywords(keywords),
            ..self.clone()
        }
    }

    pub fn with_language(&self, language: Language) -> Self {
        Self {
            language,
            ..self.clone()
        }
    }

    pub fn renamed(&self, name: impl Into<String>) -> Result<Self, SnippetError> {
        Snippet::new(
            name,
            self.body.clone(),
            self.description.clone(),
            &self.keywords,
            self.language,
        )
    }
}

impl Ord for Snippet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.language.cmp(&other.language))
            .then_with(|| self.body.cmp(&other.body))
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.keywords.cmp(&other.keywords))
    }
}

impl PartialOrd for Snippet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn names_equal(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

fn normalize_keywords<I, K>(keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|keyword| keyword.as_ref().trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
