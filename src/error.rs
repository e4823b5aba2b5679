//! Error types for parsing, compiling and applying sound changes.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between a line of rule text and a changed word.
///
/// Parse and compile errors abort loading a rule source; apply errors abort
/// the call for that one word. Nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: `{line}` is not a valid rule")]
    MalformedRule { line: String },

    #[error("parse error: `{line}` is not a valid rule or category")]
    MalformedLine { line: String },

    #[error("parse error: category `{name}` is not defined")]
    UndefinedCategory { name: String },

    #[error("category error: category `{name}` already defined as `{existing}`")]
    DuplicateCategoryDefinition { name: String, existing: String },

    #[error("category error: duplicate element `{element}` in category `{category}`")]
    DuplicateCategoryElement { category: String, element: String },

    #[error("category error: `{name}` is not a valid category name")]
    MalformedCategoryName { name: String },

    #[error("category error: element `{element}` of category `{category}` is empty or contains whitespace")]
    MalformedCategoryElement { category: String, element: String },

    #[error("parse error: malformed category reference `{token}`")]
    MalformedReference { token: String },

    #[error("replacement error: unnumbered category `{name}` in replacement text")]
    UnnumberedReplacementCategory { name: String },

    #[error("replacement error: reference {number} to category `{name}` is not bound by the match")]
    UnboundReplacementReference { number: usize, name: String },

    #[error("replacement error: invalid index {index} for category `{name}`")]
    InvalidReplacementIndex { index: usize, name: String },

    #[error("parse error: inline flags are not supported in `{fragment}`")]
    InlineFlags { fragment: String },

    #[error("internal error: expanded pattern `{pattern}` failed to compile: {message}")]
    InternalCompileError { pattern: String, message: String },

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("{}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pair error: {message}")]
    MalformedStageChain { message: String },
}

impl Error {
    /// Attach a 1-based line number to an error raised while parsing a source.
    pub(crate) fn at_line(self, line: usize) -> Self {
        Error::Line { line, source: Box::new(self) }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::Load { path: path.into(), source: Box::new(self) }
    }

    /// Strip positional wrappers and return the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Line { source, .. } | Error::Load { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
