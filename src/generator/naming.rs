use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

#[allow(clippy::expect_used)]
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("non-word pattern is valid"));
#[allow(clippy::expect_used)]
static WORD_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("word boundary pattern is valid"));
#[allow(clippy::expect_used)]
static LOWER_UPPER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("case boundary pattern is valid"));
#[allow(clippy::expect_used)]
static UNDERSCORES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+").expect("underscore pattern is valid"));

/// Python reserved words, including the soft constants
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Whether `name` is a Python keyword
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Convert arbitrary text to `snake_case`
///
/// Runs of non-alphanumeric characters become a single underscore and
/// camel-case boundaries are split (`userProfile-ID` → `user_profile_id`).
///
/// ```rust
/// use apiforge::generator::to_snake_case;
/// assert_eq!(to_snake_case("UserProfiles"), "user_profiles");
/// assert_eq!(to_snake_case("investigation-id"), "investigation_id");
/// ```
pub fn to_snake_case(text: &str) -> String {
    let spaced = NON_WORD_RE.replace_all(text, "_");
    let split = WORD_BOUNDARY_RE.replace_all(&spaced, "${1}_${2}");
    let split = LOWER_UPPER_RE.replace_all(&split, "${1}_${2}");
    let lower = split.to_lowercase();
    UNDERSCORES_RE
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Convert text to `PascalCase` by way of its snake form
pub fn to_pascal_case(text: &str) -> String {
    to_snake_case(text)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert text to `camelCase`
pub fn to_camel_case(text: &str) -> String {
    let pascal = to_pascal_case(text);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Turn a snake-cased name into a valid Python identifier
///
/// Empty names become `fallback`, digit-leading names are prefixed with
/// `<fallback>_` and keywords get a trailing underscore.
pub fn python_identifier(snake: &str, fallback: &str) -> String {
    let name = if snake.is_empty() {
        fallback.to_string()
    } else if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{fallback}_{snake}")
    } else {
        snake.to_string()
    };
    if is_python_keyword(&name) {
        format!("{name}_")
    } else {
        name
    }
}

fn non_keyword(name: String) -> String {
    if is_python_keyword(&name) {
        format!("{name}_")
    } else {
        name
    }
}

/// Members of the generated aggregate client that accessors must not shadow
const AGGREGATE_MEMBERS: &[&str] = &["close", "_base", "__init__", "__enter__", "__exit__"];

/// The spellings of one group name, derived exactly once
///
/// Every artifact that refers to a group reads these fields; nothing
/// re-derives a spelling from [`raw`](CanonicalName::raw).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalName {
    /// Name as it appears in the URI
    pub raw: String,
    /// Module, package, table and blueprint name
    pub snake: String,
    /// Class name stem (`User` → `UserSchema`, `UserService`, ...)
    pub pascal: String,
    /// Accessor name on aggregate objects, never one of their own members
    pub camel: String,
}

impl CanonicalName {
    pub fn derive(raw: &str) -> Self {
        let snake = python_identifier(&to_snake_case(raw), "resource");
        let pascal = non_keyword(to_pascal_case(&snake));
        let mut camel = non_keyword(to_camel_case(&snake));
        if AGGREGATE_MEMBERS.contains(&camel.as_str()) {
            camel.push('_');
        }
        Self {
            raw: raw.to_string(),
            snake,
            pascal,
            camel,
        }
    }
}

/// Generate a unique name by appending a numeric suffix if needed
///
/// The first occurrence keeps `base`; later ones become `base_1`, `base_2`, ...
///
/// # Arguments
///
/// * `seen` - Names already handed out in the current scope (updated in-place)
/// * `base` - Preferred name
pub fn unique_name(seen: &mut HashSet<String>, base: &str) -> String {
    if seen.insert(base.to_string()) {
        return base.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{base}_{i}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        i += 1;
    }
}

/// Escape text for embedding inside a triple-quoted Python docstring
pub fn docstring_text(text: &str) -> String {
    text.trim().replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render text as a single-quoted Python string literal
pub fn python_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
