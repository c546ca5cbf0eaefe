use std::path::Path;
use tracing::info;

use super::build::build_specification;
use super::error::ParseError;
use super::include::IncludeResolver;
use super::raw::RawNode;
use super::types::Specification;

/// Parse RAML text into a [`Specification`]
///
/// `project_dir` is only used to locate `!include` targets. Without it every
/// include becomes a placeholder.
///
/// # Errors
///
/// * [`ParseError::Syntax`] when the text is not well-formed YAML
/// * [`ParseError::Format`] when the root is empty or not a mapping
pub fn parse(raw: &str, project_dir: Option<&Path>) -> Result<Specification, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Format {
            found: "empty document".to_string(),
        });
    }

    let mut node: RawNode = serde_yaml::from_str(raw).map_err(|e| ParseError::syntax(&e))?;

    // A tag on the root annotates the document; `!include` does not apply there
    while let RawNode::Tagged(tag, inner) = node {
        if tag == super::include::INCLUDE_TAG {
            return Err(ParseError::Format {
                found: "include directive".to_string(),
            });
        }
        node = *inner;
    }

    let entries = match node {
        RawNode::Map(entries) => entries,
        other => {
            return Err(ParseError::Format {
                found: other.kind().to_string(),
            })
        }
    };

    let mut resolver = IncludeResolver::new(project_dir);
    let root = resolver.resolve_map(entries);
    let spec = build_specification(&root);
    info!(
        title = %spec.title,
        resources = spec.resources.len(),
        types = spec.types.len(),
        "parsed specification"
    );
    Ok(spec)
}

/// Read and parse a specification file
///
/// The file's parent directory is used as the project directory.
pub fn load_spec(path: &Path) -> Result<Specification, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let project_dir = match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
        Some(dir) => dir,
        None => Path::new("."),
    };
    parse(&content, Some(project_dir))
}

/// Derive the batch name of a specification file from its stem
///
/// `specs/Orders API.raml` becomes `orders_api`.
pub fn spec_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug = stem
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric() && c != '-', "_")
        .trim_matches('_')
        .to_string();
    if slug.is_empty() {
        "api".to_string()
    } else {
        slug
    }
}
