use std::fmt;
use std::path::PathBuf;

/// Error returned by [`parse`](super::parse) and [`load_spec`](super::load_spec)
///
/// Unresolved `!include` directives are not errors; they are replaced by
/// placeholders during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document parsed, but its root is not a mapping
    ///
    /// Covers empty documents, scalar roots (`"just text"`) and sequence roots.
    Format {
        /// Kind of node found at the root (`null`, `sequence`, `string`, ...)
        found: String,
    },
    /// The markup could not be tokenized
    ///
    /// The underlying YAML diagnostic is preserved verbatim in `message`.
    Syntax {
        /// Diagnostic produced by the YAML scanner
        message: String,
        /// 1-based line of the failure, when the scanner reports one
        line: Option<usize>,
        /// 1-based column of the failure, when the scanner reports one
        column: Option<usize>,
    },
    /// The specification file itself could not be read
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Operating system error text
        message: String,
    },
}

impl ParseError {
    pub(crate) fn syntax(err: &serde_yaml::Error) -> Self {
        let location = err.location();
        ParseError::Syntax {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Format { found } => {
                write!(
                    f,
                    "Invalid RAML format: root element must be a mapping, found {found}"
                )
            }
            ParseError::Syntax {
                message,
                line: Some(line),
                column: Some(column),
            } => write!(
                f,
                "Invalid YAML syntax at line {line}, column {column}: {message}"
            ),
            ParseError::Syntax { message, .. } => write!(f, "Invalid YAML syntax: {message}"),
            ParseError::Io { path, message } => {
                write!(f, "Failed to read {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ParseError {}
