use crate::snippet::Snippet;

/// Decides whether a value passes a filter string.
///
/// Implementations receive the filter already trimmed and lower-cased (see
/// [`normalize_filter`]).
pub trait FilterMatcher<T: ?Sized> {
    fn matches(&self, value: &T, filter: &str) -> bool;
}

/// Matches snippets on name, description, display text, language label or an exact keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetMatcher;

impl FilterMatcher<Snippet> for SnippetMatcher {
    fn matches(&self, snippet: &Snippet, filter: &str) -> bool {
        matches(snippet, filter)
    }
}

pub fn matches(snippet: &Snippet, filter: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(filter);
    contains(snippet.name())
        || contains(snippet.description())
        || contains(&snippet.to_string())
        || contains(snippet.language().display_name())
        || snippet.keywords().contains(filter)
}

pub fn normalize_filter(text: &str) -> String {
    text.trim().to_lowercase()
}
