use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::se::Serializer;
use quick_xml::Reader;
use serde::Serialize;
use snippetbox_highlight::Language;

use crate::cursor::LanguageBucket;
use crate::error::SnippetError;
use crate::snippet::Snippet;

const ROOT_ELEMENT: &str = "snippets";
const SNIPPET_ELEMENT: &str = "snippet";

#[derive(Debug, Default, Serialize)]
#[serde(rename = "snippets")]
struct SnippetsDocument {
    #[serde(rename = "$value")]
    languages: Vec<LanguageElement>,
}

/// One element per language, named by the language identifier.
#[derive(Debug, Serialize)]
enum LanguageElement {
    Java(SnippetList),
    CSharp(SnippetList),
    #[serde(rename = "PHP")]
    Php(SnippetList),
    #[serde(rename = "CPlusPlus")]
    Pascal(SnippetList),
    Python(SnippetList),
    #[serde(rename = "Javascript")]
    JavaScript(SnippetList),
    PlainText(SnippetList),
}

impl LanguageElement {
    fn new(language: Language, list: SnippetList) -> Self {
        match language {
            Language::Java => LanguageElement::Java(list),
            Language::CSharp => LanguageElement::CSharp(list),
            Language::Php => LanguageElement::Php(list),
            Language::Pascal => LanguageElement::Pascal(list),
            Language::Python => LanguageElement::Python(list),
            Language::JavaScript => LanguageElement::JavaScript(list),
            Language::PlainText => LanguageElement::PlainText(list),
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct SnippetList {
    #[serde(rename = "snippet")]
    snippets: Vec<SnippetElement>,
}

#[derive(Debug, Default, Serialize)]
struct SnippetElement {
    name: String,
    data: String,
    description: String,
    keywords: String,
}

impl SnippetElement {
    fn from_snippet(snippet: &Snippet) -> Self {
        Self {
            name: snippet.name().to_string(),
            data: snippet.body().trim().to_string(),
            description: snippet.description().to_string(),
            keywords: snippet
                .keywords()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn set_field(&mut self, field: &str, text: String) {
        match field {
            "name" => self.name = text,
            "data" => self.data = text.trim().to_string(),
            "description" => self.description = text,
            "keywords" => self.keywords = text,
            _ => {}
        }
    }
}

/// Renders every non-empty bucket as an indented `<snippets>` document.
pub(crate) fn write_document(buckets: &[LanguageBucket]) -> Result<String, SnippetError> {
    let document = SnippetsDocument {
        languages: buckets
            .iter()
            .filter(|bucket| !bucket.entries.is_empty())
            .map(|bucket| {
                let list = SnippetList {
                    snippets: bucket
                        .entries
                        .values()
                        .map(SnippetElement::from_snippet)
                        .collect(),
                };
                LanguageElement::new(bucket.language, list)
            })
            .collect(),
    };

    let mut xml = String::new();
    let mut serializer = Serializer::new(&mut xml);
    serializer.indent(' ', 4);
    document.serialize(serializer)?;
    Ok(xml)
}

/// Collects buckets while the document is walked element by element.
struct DocumentBuilder<'a> {
    origin: &'a str,
    buckets: Vec<LanguageBucket>,
    seen_names: HashSet<String>,
    language: Option<Language>,
    current: Option<SnippetElement>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(origin: &'a str) -> Self {
        Self {
            origin,
            buckets: Vec::new(),
            seen_names: HashSet::new(),
            language: None,
            current: None,
        }
    }

    /// `depth` is the number of enclosing elements.
    fn open(&mut self, depth: usize, name: &str) -> Result<(), SnippetError> {
        match depth {
            0 if name == ROOT_ELEMENT => Ok(()),
            0 => Err(self.error(format!("expected <{ROOT_ELEMENT}> root, found <{name}>"))),
            1 => {
                let language = Language::from_identifier(name)
                    .ok_or_else(|| self.error(format!("unknown language '{name}'")))?;
                self.language = Some(language);
                Ok(())
            }
            2 if name == SNIPPET_ELEMENT => {
                self.current = Some(SnippetElement::default());
                Ok(())
            }
            2 => Err(self.error(format!("unexpected element <{name}>"))),
            _ => Ok(()),
        }
    }

    fn close(&mut self, depth: usize, name: &str, text: String) -> Result<(), SnippetError> {
        match depth {
            3 => {
                if let Some(element) = self.current.as_mut() {
                    element.set_field(name, text);
                }
                Ok(())
            }
            2 => match self.current.take() {
                Some(element) => self.push(element),
                None => Ok(()),
            },
            1 => {
                self.language = None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn push(&mut self, element: SnippetElement) -> Result<(), SnippetError> {
        let language = self.language.unwrap_or_default();
        let snippet = Snippet::new(
            element.name,
            element.data,
            element.description,
            element.keywords.split(','),
            language,
        )
        .map_err(|_| self.error("snippet without a name"))?;
        if !self.seen_names.insert(snippet.name().to_lowercase()) {
            return Err(self.error(format!("duplicate snippet name '{}'", snippet.name())));
        }
        let index = match self
            .buckets
            .iter()
            .position(|bucket| bucket.language == language)
        {
            Some(index) => index,
            None => {
                self.buckets.push(LanguageBucket::new(language));
                self.buckets.len() - 1
            }
        };
        self.buckets[index]
            .entries
            .insert(snippet.name().to_string(), snippet);
        Ok(())
    }

    fn error(&self, reason: impl ToString) -> SnippetError {
        SnippetError::parse(self.origin, reason)
    }
}

/// Parses a whole document into fresh buckets, in document order.
///
/// Element text is taken verbatim, edge whitespace included, except `data`
/// which is trimmed the same way it is on write. `origin` only
/// labels errors (a path, or `"<memory>"`).
pub(crate) fn read_document(xml: &str, origin: &str) -> Result<Vec<LanguageBucket>, SnippetError> {
    let mut reader = Reader::from_str(xml);
    reader.expand_empty_elements(true);

    let mut builder = DocumentBuilder::new(origin);
    let mut open: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut saw_root = false;
    loop {
        let event = reader
            .read_event()
            .map_err(|err| SnippetError::parse(origin, err))?;
        match event {
            Event::Start(start) => {
                if open.is_empty() && saw_root {
                    return Err(builder.error("more than one root element"));
                }
                let name = std::str::from_utf8(start.name().as_ref())
                    .map_err(|err| SnippetError::parse(origin, err))?
                    .to_string();
                builder.open(open.len(), &name)?;
                saw_root = true;
                open.push(name);
                text.clear();
            }
            Event::End(_) => {
                if let Some(name) = open.pop() {
                    builder.close(open.len(), &name, std::mem::take(&mut text))?;
                }
                text.clear();
            }
            Event::Text(content) => {
                let unescaped = content
                    .unescape()
                    .map_err(|err| SnippetError::parse(origin, err))?;
                text.push_str(&unescaped);
            }
            Event::CData(content) => {
                let raw = content.into_inner();
                let decoded =
                    std::str::from_utf8(&raw).map_err(|err| SnippetError::parse(origin, err))?;
                text.push_str(decoded);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(builder.error("unexpected end of document"));
    }
    if !saw_root {
        return Err(builder.error(format!("missing <{ROOT_ELEMENT}> root")));
    }
    Ok(builder.buckets)
}

pub(crate) fn read_file(path: &Path) -> Result<String, SnippetError> {
    fs::read_to_string(path).map_err(|err| SnippetError::io(path, err))
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), SnippetError> {
    write_atomic(path, contents.as_bytes()).map_err(|err| SnippetError::io(path, err))
}

/// Sibling of `path` with `.tmp` appended to the full file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
