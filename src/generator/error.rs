use std::fmt;

/// Error returned by the server and client generators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// A template failed to compile or render
    Template {
        /// Registered template name (`server/model.py`)
        template: String,
        /// Renderer diagnostic
        message: String,
    },
    /// The generator configuration cannot produce a coherent artifact set
    InvalidConfig {
        /// Description of the offending setting
        message: String,
    },
}

impl GenerateError {
    pub(crate) fn template(template: &str, err: &minijinja::Error) -> Self {
        // minijinja chains the root cause through `source()`
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        GenerateError::Template {
            template: template.to_string(),
            message,
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Template { template, message } => {
                write!(f, "Failed to render template '{template}': {message}")
            }
            GenerateError::InvalidConfig { message } => {
                write!(f, "Invalid generator configuration: {message}")
            }
        }
    }
}

impl std::error::Error for GenerateError {}
