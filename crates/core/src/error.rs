use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 片段儲存區的錯誤。 / Errors raised by the snippet store and its persistence layer.
#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("a snippet named '{0}' already exists")]
    DuplicateName(String),
    #[error("failed to parse snippets from {origin}: {reason}")]
    Parse { origin: String, reason: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize snippets: {0}")]
    Serialization(#[from] quick_xml::DeError),
}

impl SnippetError {
    pub(crate) fn parse(origin: impl Into<String>, reason: impl ToString) -> Self {
        SnippetError::Parse {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SnippetError::Io {
            path: path.into(),
            source,
        }
    }
}
