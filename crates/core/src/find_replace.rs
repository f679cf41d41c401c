use std::rc::Rc;

use log::debug;
use regex::{NoExpand, Regex, RegexBuilder};
use thiserror::Error;

use crate::events::{Observers, SubscriptionId};

/// What to look for and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    pub pattern: String,
    pub regex: bool,
    pub case_sensitive: bool,
}

impl FindOptions {
    pub fn literal(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            regex: false,
            case_sensitive: true,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            regex: true,
            case_sensitive: true,
        }
    }

    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }

    fn compile(&self) -> Result<Regex, FindError> {
        if self.pattern.is_empty() {
            return Err(FindError::EmptyPattern);
        }
        let source = if self.regex {
            self.pattern.clone()
        } else {
            regex::escape(&self.pattern)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!self.case_sensitive)
            .build()?;
        Ok(regex)
    }
}

#[derive(Debug, Error)]
pub enum FindError {
    #[error("no find text entered")]
    EmptyPattern,
    #[error("invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Byte range of a match inside the session text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindReplaceEvent {
    Found(TextMatch),
    Replaced { count: usize },
}

pub type FindReplaceListener = dyn Fn(&FindReplaceEvent);

/// Incremental find over a private copy of a text, plus replace-all.
///
/// Each successful `find_next` moves the cursor to the end of the match. Once
/// nothing further is found the session reports [`at_end`](Self::at_end)
/// until [`restart`](Self::restart) moves the cursor back to the start.
#[derive(Debug)]
pub struct FindReplaceSession {
    text: String,
    cursor: usize,
    last_match: Option<TextMatch>,
    exhausted: bool,
    observers: Observers<FindReplaceListener>,
}

impl FindReplaceSession {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            last_match: None,
            exhausted: false,
            observers: Observers::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_match(&self) -> Option<&TextMatch> {
        self.last_match.as_ref()
    }

    pub fn subscribe(&self, listener: Rc<FindReplaceListener>) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// True once the cursor reached the end of the text or the last search came up empty.
    pub fn at_end(&self) -> bool {
        self.exhausted || self.cursor >= self.text.len()
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
        self.exhausted = false;
        self.last_match = None;
    }

    /// Finds the next match at or after the cursor.
    pub fn find_next(&mut self, options: &FindOptions) -> Result<Option<TextMatch>, FindError> {
        let regex = options.compile()?;
        let found = if self.cursor <= self.text.len() {
            regex.find_at(&self.text, self.cursor)
        } else {
            None
        };
        let Some(found) = found else {
            self.exhausted = true;
            debug!("no further match for '{}'", options.pattern);
            return Ok(None);
        };

        let text_match = TextMatch {
            start: found.start(),
            end: found.end(),
            text: found.as_str().to_string(),
        };
        self.cursor = if found.start() == found.end() {
            next_char_boundary(&self.text, found.end())
        } else {
            found.end()
        };
        self.exhausted = false;
        self.last_match = Some(text_match.clone());
        self.emit(FindReplaceEvent::Found(text_match.clone()));
        Ok(Some(text_match))
    }

    /// Replaces every match and returns how many were replaced.
    ///
    /// Regex searches expand `$1`-style group references in `replacement`;
    /// literal searches insert it verbatim.
    pub fn replace_all(
        &mut self,
        options: &FindOptions,
        replacement: &str,
    ) -> Result<usize, FindError> {
        let regex = options.compile()?;
        let count = regex.find_iter(&self.text).count();
        if count > 0 {
            let replaced = if options.regex {
                regex.replace_all(&self.text, replacement).into_owned()
            } else {
                regex
                    .replace_all(&self.text, NoExpand(replacement))
                    .into_owned()
            };
            self.text = replaced;
        }
        self.restart();
        self.emit(FindReplaceEvent::Replaced { count });
        Ok(count)
    }

    fn emit(&self, event: FindReplaceEvent) {
        self.observers.notify(|listener| listener(&event));
    }
}

fn next_char_boundary(text: &str, position: usize) -> usize {
    text[position..]
        .chars()
        .next()
        .map_or(text.len() + 1, |ch| position + ch.len_utf8())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn finds_successive_literal_matches_then_reports_end() {
        let mut session = FindReplaceSession::new("foo bar foo");
        let options = FindOptions::literal("foo");

        let first = session.find_next(&options).unwrap().unwrap();
        assert_eq!((first.start, first.end), (0, 3));
        let second = session.find_next(&options).unwrap().unwrap();
        assert_eq!((second.start, second.end), (8, 11));
        assert!(session.at_end());
        assert!(session.find_next(&options).unwrap().is_none());

        session.restart();
        assert!(!session.at_end());
        assert_eq!(session.find_next(&options).unwrap().unwrap().start, 0);
    }

    #[test]
    fn literal_patterns_are_not_regexes() {
        let mut session = FindReplaceSession::new("a.b axb");
        let found = session
            .find_next(&FindOptions::literal("a.b"))
            .unwrap()
            .unwrap();
        assert_eq!(found.text, "a.b");
        assert!(session.find_next(&FindOptions::literal("a.b")).unwrap().is_none());
    }

    #[test]
    fn case_insensitive_search() {
        let mut session = FindReplaceSession::new("Hello");
        let options = FindOptions::literal("hello");
        assert!(session.find_next(&options).unwrap().is_none());
        session.restart();
        let options = options.case_sensitive(false);
        assert_eq!(session.find_next(&options).unwrap().unwrap().text, "Hello");
    }

    #[test]
    fn rejects_empty_and_invalid_patterns() {
        let mut session = FindReplaceSession::new("text");
        assert!(matches!(
            session.find_next(&FindOptions::literal("")),
            Err(FindError::EmptyPattern)
        ));
        assert!(matches!(
            session.find_next(&FindOptions::regex("(")),
            Err(FindError::InvalidPattern(_))
        ));
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn empty_regex_matches_still_advance() {
        let mut session = FindReplaceSession::new("ab");
        let options = FindOptions::regex("x*");
        let mut starts = Vec::new();
        while let Some(found) = session.find_next(&options).unwrap() {
            starts.push(found.start);
        }
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn replace_all_literal_and_regex() {
        let mut session = FindReplaceSession::new("cost: $1, $2");
        let count = session
            .replace_all(&FindOptions::literal("$"), "USD ")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.text(), "cost: USD 1, USD 2");

        let count = session
            .replace_all(&FindOptions::regex(r"USD (\d)"), "$1 dollars")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.into_text(), "cost: 1 dollars, 2 dollars");
    }

    #[test]
    fn observers_receive_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut session = FindReplaceSession::new("one two one");
        let sink = Rc::clone(&events);
        session.subscribe(Rc::new(move |event: &FindReplaceEvent| {
            sink.borrow_mut().push(event.clone())
        }));

        session.find_next(&FindOptions::literal("two")).unwrap();
        session
            .replace_all(&FindOptions::literal("one"), "1")
            .unwrap();
        session.find_next(&FindOptions::literal("zzz")).unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            FindReplaceEvent::Found(TextMatch {
                start: 4,
                end: 7,
                text: "two".into()
            })
        );
        assert_eq!(events[1], FindReplaceEvent::Replaced { count: 2 });
    }
}
