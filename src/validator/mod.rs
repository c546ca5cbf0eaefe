//! # Validator Module
//!
//! All-or-nothing gate over a [`GeneratedFiles`] set. Every `.py` artifact is
//! parsed with the tree-sitter Python grammar; one malformed file rejects the
//! whole set.
//!
//! Import resolution is advisory: imports rooted in a package of the set are
//! checked against sibling artifacts and reported as warnings only.
//!
//! ```rust
//! use apiforge::generator::GeneratedFiles;
//! use apiforge::validator::validate;
//!
//! let mut files = GeneratedFiles::new();
//! files.insert("ok.py".into(), "x = 1\n".into());
//! files.insert("bad.py".into(), "def f(:\n".into());
//! let report = validate(&files);
//! assert!(!report.ok);
//! assert_eq!(report.errors.len(), 1);
//! assert_eq!(report.errors[0].path, "bad.py");
//! ```

use std::fmt;
use tracing::{debug, warn};

mod imports;
mod syntax;

pub use imports::{module_name, ModuleIndex};
pub use syntax::{PythonSyntax, SyntaxIssue};

use crate::generator::GeneratedFiles;

/// One finding against one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    /// 1-based line, 0 when the finding is not tied to a position
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        path: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.path, self.line, self.column, self.message)
    }
}

/// Outcome of validating one artifact set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// `true` only when no artifact has an error
    pub ok: bool,
    /// Syntax errors, in path order
    pub errors: Vec<ValidationIssue>,
    /// Advisory findings; never affect `ok`
    pub warnings: Vec<ValidationIssue>,
}

/// Generated code was rejected by the validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationValidationError {
    pub errors: Vec<ValidationIssue>,
}

impl fmt::Display for GenerationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generated code failed validation with {} error(s)", self.errors.len())?;
        for issue in &self.errors {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GenerationValidationError {}

/// Syntax-check every Python artifact and resolve local imports
pub fn validate(files: &GeneratedFiles) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut checker = match PythonSyntax::new() {
        Ok(checker) => checker,
        Err(message) => {
            report.errors.push(ValidationIssue::new("<validator>", 0, 0, message));
            return report;
        }
    };
    let index = ModuleIndex::from_paths(files.keys().map(String::as_str));

    for (path, content) in files.iter().filter(|(p, _)| p.ends_with(".py")) {
        match checker.check(content) {
            Ok(()) => {
                for target in index.unresolved(path, content) {
                    report.warnings.push(ValidationIssue::new(
                        path.as_str(),
                        0,
                        0,
                        format!("unresolved import '{target}'"),
                    ));
                }
            }
            Err(issue) => {
                warn!(
                    path = %path,
                    line = issue.line,
                    message = %issue.message,
                    "syntax error in generated file"
                );
                report.errors.push(ValidationIssue::new(
                    path.as_str(),
                    issue.line,
                    issue.column,
                    issue.message,
                ));
            }
        }
    }

    report.ok = report.errors.is_empty();
    debug!(
        files = files.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated artifact set"
    );
    report
}

/// Turn a failed report into an error
///
/// # Errors
///
/// [`GenerationValidationError`] carrying every per-file error when the
/// report is not ok.
pub fn ensure_valid(report: &ValidationReport) -> Result<(), GenerationValidationError> {
    if report.ok {
        Ok(())
    } else {
        Err(GenerationValidationError {
            errors: report.errors.clone(),
        })
    }
}

/// Print a report for humans on stderr
pub fn print_issues(report: &ValidationReport) {
    if !report.errors.is_empty() {
        eprintln!("\n❌ Generated code failed validation. {} error(s):\n", report.errors.len());
        for issue in &report.errors {
            eprintln!("  {issue}");
        }
    }
    for issue in &report.warnings {
        eprintln!("⚠️  {}: {}", issue.path, issue.message);
    }
}
