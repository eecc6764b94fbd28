use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Malformed `{...}` placeholder in a translated rich-text string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// `{` while already inside a placeholder
    UnexpectedOpen { offset: usize },
    /// `}` outside of a placeholder
    UnexpectedClose { offset: usize },
    /// String ended inside a placeholder
    Unterminated { offset: usize },
}

impl fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderError::UnexpectedOpen { offset } => {
                write!(f, "unexpected '{{' at offset {offset}")
            }
            PlaceholderError::UnexpectedClose { offset } => {
                write!(f, "unexpected '}}' at offset {offset}")
            }
            PlaceholderError::Unterminated { offset } => {
                write!(f, "placeholder opened at offset {offset} is never closed")
            }
        }
    }
}

impl Error for PlaceholderError {}

/// Failure to fetch a single image resource
#[derive(Debug)]
pub enum FetchError {
    NotFound(PathBuf),
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound(path) => write!(f, "resource not found: {}", path.display()),
            FetchError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchError::NotFound(_) => None,
            FetchError::Io { source, .. } => Some(source),
        }
    }
}

/// Document-level failure. Any of these aborts the whole help screen build.
#[derive(Debug)]
pub enum LoadError {
    Xml(String),
    UnsupportedVersion { found: f64, supported: f64 },
    Placeholder { id: String, source: PlaceholderError },
    MissingElement { parent: String, tag: String },
    UnknownDefinition(String),
    Image { src: String, source: FetchError },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Xml(msg) => write!(f, "malformed help document: {msg}"),
            LoadError::UnsupportedVersion { found, supported } => write!(
                f,
                "help document version {found} is newer than supported version {supported}"
            ),
            LoadError::Placeholder { id, source } => {
                write!(f, "bad placeholder in translation '{id}': {source}")
            }
            LoadError::MissingElement { parent, tag } => {
                write!(f, "<{parent}> requires a <{tag}> child")
            }
            LoadError::UnknownDefinition(spec) => {
                write!(f, "no custom block definition matches '{spec}'")
            }
            LoadError::Image { src, source } => write!(f, "could not load image {src}: {source}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Placeholder { source, .. } => Some(source),
            LoadError::Image { source, .. } => Some(source),
            _ => None,
        }
    }
}
