//! `!include` resolution
//!
//! Directives are resolved against the project directory, probing a fixed list
//! of candidate locations. Resolution is best-effort: a directive that cannot
//! be located, or whose file revisits one already being expanded, becomes a
//! placeholder value and parsing carries on.

use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::raw::RawNode;

/// Tag name of the external-content directive (`!include`)
pub const INCLUDE_TAG: &str = "include";

/// Tab stop used when expanding tabs in included files
pub const INCLUDE_TAB_WIDTH: usize = 2;

/// Subdirectories searched after the project root, in order
const TYPE_DIRS: [&str; 2] = ["datatypes", "types"];

/// Expands include directives while converting a [`RawNode`] tree to JSON
pub(crate) struct IncludeResolver {
    project_dir: Option<PathBuf>,
    /// Canonical paths of the files currently being expanded
    active: Vec<PathBuf>,
}

impl IncludeResolver {
    pub(crate) fn new(project_dir: Option<&Path>) -> Self {
        Self {
            project_dir: project_dir.map(Path::to_path_buf),
            active: Vec::new(),
        }
    }

    pub(crate) fn resolve(&mut self, node: RawNode) -> Value {
        match node {
            RawNode::Null => Value::Null,
            RawNode::Bool(b) => Value::Bool(b),
            RawNode::Number(n) => Value::Number(n),
            RawNode::String(s) => Value::String(s),
            RawNode::Seq(items) => {
                Value::Array(items.into_iter().map(|item| self.resolve(item)).collect())
            }
            RawNode::Map(entries) => Value::Object(self.resolve_map(entries)),
            RawNode::Tagged(tag, inner) if tag == INCLUDE_TAG => match *inner {
                RawNode::String(name) => self.include(name.trim()),
                other => {
                    warn!(found = other.kind(), "!include expects a file name; dropping value");
                    Value::Null
                }
            },
            // `!type` and any other local tag annotate the value inline
            RawNode::Tagged(_, inner) => self.resolve(*inner),
        }
    }

    pub(crate) fn resolve_map(&mut self, entries: Vec<(String, RawNode)>) -> Map<String, Value> {
        let mut map = Map::with_capacity(entries.len());
        for (key, value) in entries {
            let value = self.resolve(value);
            map.insert(key, value);
        }
        map
    }

    fn include(&mut self, name: &str) -> Value {
        let Some((path, content)) = self.read_first_candidate(name) else {
            warn!(include = name, "unresolved !include; substituting placeholder");
            return placeholder(name);
        };

        let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if self.active.contains(&canonical) {
            warn!(
                include = name,
                path = %path.display(),
                "cyclic !include; substituting placeholder"
            );
            return placeholder(name);
        }

        debug!(include = name, path = %path.display(), "resolved !include");
        let content = expand_tabs(&content, INCLUDE_TAB_WIDTH);
        if !is_yaml_document(&path) {
            return Value::String(content);
        }

        match serde_yaml::from_str::<RawNode>(&content) {
            Ok(node) => {
                self.active.push(canonical);
                let value = self.resolve(node);
                self.active.pop();
                value
            }
            Err(err) => {
                let file_name = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_else(|| name.to_string());
                warn!(path = %path.display(), error = %err, "included file is not valid YAML");
                json!({
                    "type": "object",
                    "description": format!("Included from {file_name} (parsing error: {err})"),
                })
            }
        }
    }

    /// Returns the first readable candidate for `name`
    fn read_first_candidate(&self, name: &str) -> Option<(PathBuf, String)> {
        let project_dir = self.project_dir.as_deref()?;
        for path in candidate_paths(project_dir, name) {
            if !path.is_file() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(content) => return Some((path, content)),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to read included file");
                }
            }
        }
        None
    }
}

/// Candidate locations for an include, in probing order
pub fn candidate_paths(project_dir: &Path, name: &str) -> Vec<PathBuf> {
    let with_ext = format!("{name}.raml");
    let mut paths = vec![project_dir.join(name), project_dir.join(&with_ext)];
    for dir in TYPE_DIRS {
        paths.push(project_dir.join(dir).join(name));
        paths.push(project_dir.join(dir).join(&with_ext));
    }
    paths
}

/// Whether an include name refers to a type or datatype fragment
pub fn looks_like_type_reference(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".raml") || lower.contains("datatype") || lower.contains("types/")
}

/// Value substituted for an include that cannot be resolved
pub fn placeholder(name: &str) -> Value {
    if looks_like_type_reference(name) {
        json!({
            "type": "object",
            "properties": {},
            "description": format!("Included from {name}"),
        })
    } else {
        Value::String("string".to_string())
    }
}

fn is_yaml_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("raml" | "yaml" | "yml")
    )
}

/// Replaces tabs with spaces up to the next multiple of `width`
///
/// The column counter restarts after every line break.
pub fn expand_tabs(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = width - column % width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}
