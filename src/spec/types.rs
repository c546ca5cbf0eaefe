use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

static URI_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\{([^}]+)\}").expect("URI parameter pattern is valid")
});

/// HTTP verbs recognized under a resource
///
/// Any other key below a resource is ignored by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 7] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Delete,
        HttpVerb::Patch,
        HttpVerb::Head,
        HttpVerb::Options,
    ];

    /// Case-insensitive lookup of a resource key
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(key))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
        }
    }

    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
            HttpVerb::Patch => "patch",
            HttpVerb::Head => "head",
            HttpVerb::Options => "options",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed API description
///
/// Produced once per [`parse`](super::parse) call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    pub title: String,
    pub version: String,
    pub base_uri: String,
    pub description: String,
    /// Default media type for bodies declared without one
    pub media_type: String,
    pub protocols: Vec<String>,
    pub security_schemes: Map<String, Value>,
    pub traits: Map<String, Value>,
    /// Resources in document order, parents before their children
    pub resources: Vec<Resource>,
    /// Declared types in document order
    pub types: Vec<TypeDef>,
}

impl Specification {
    /// Looks up a declared type by its exact name
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Total number of methods across all resources
    pub fn method_count(&self) -> usize {
        self.resources.iter().map(|r| r.methods.len()).sum()
    }

    /// Lowercase, underscore-separated form of the title
    pub fn slug(&self) -> String {
        self.title
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
            .trim_matches('_')
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Parent URI and own key concatenated verbatim
    pub uri: String,
    pub display_name: String,
    pub description: String,
    pub methods: Vec<Method>,
    /// Declared `uriParameters`, keyed by parameter name
    pub uri_parameters: Map<String, Value>,
}

/// A `{name}` segment of a resource URI
#[derive(Debug, Clone, PartialEq)]
pub struct PathParameter {
    /// Name as written between the braces
    pub name: String,
    /// Matching `uriParameters` declaration, if any
    pub declared: Option<Value>,
}

impl PathParameter {
    /// Declared RAML type, `string` when undeclared
    pub fn declared_type(&self) -> &str {
        self.declared
            .as_ref()
            .and_then(|d| match d {
                Value::String(s) => Some(s.as_str()),
                Value::Object(m) => m.get("type").and_then(Value::as_str),
                _ => None,
            })
            .unwrap_or("string")
    }
}

impl Resource {
    /// Parameters found in the URI pattern, in order of appearance
    ///
    /// The URI is authoritative; declarations only contribute metadata.
    pub fn path_parameters(&self) -> Vec<PathParameter> {
        URI_PARAM_RE
            .captures_iter(&self.uri)
            .map(|c| {
                let name = c[1].to_string();
                let declared = self.uri_parameters.get(&name).cloned();
                PathParameter { name, declared }
            })
            .collect()
    }

    /// Declared `uriParameters` that never appear in the URI
    pub fn undeclared_uri_parameters(&self) -> Vec<&str> {
        let in_uri: Vec<String> = URI_PARAM_RE
            .captures_iter(&self.uri)
            .map(|c| c[1].to_string())
            .collect();
        self.uri_parameters
            .keys()
            .filter(|k| !in_uri.iter().any(|p| p == *k))
            .map(String::as_str)
            .collect()
    }
}

/// A single verb declared on a resource
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub verb: HttpVerb,
    pub display_name: String,
    pub description: String,
    pub query_parameters: Map<String, Value>,
    pub headers: Map<String, Value>,
    /// Request bodies keyed by media type
    pub body: Bodies,
    /// Responses keyed by status code (`"200"`, `"404"`, ...)
    pub responses: BTreeMap<String, ResponseSpec>,
    /// `securedBy` references
    pub secured_by: Vec<String>,
    /// `is` trait references
    pub traits: Vec<String>,
}

impl Method {
    /// Empty record for a verb declared without any detail
    pub fn bare(verb: HttpVerb) -> Self {
        Self {
            verb,
            display_name: verb.as_str().to_string(),
            description: String::new(),
            query_parameters: Map::new(),
            headers: Map::new(),
            body: Bodies::new(),
            responses: BTreeMap::new(),
            secured_by: Vec::new(),
            traits: Vec::new(),
        }
    }

    /// Request and response bodies of this method, requests first
    pub fn all_bodies(&self) -> impl Iterator<Item = &BodySpec> {
        self.body
            .values()
            .chain(self.responses.values().flat_map(|r| r.body.values()))
    }
}

pub type Bodies = BTreeMap<String, BodySpec>;

#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    /// Declared type name; `object` when unspecified
    pub type_name: String,
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
    pub example: Value,
    /// Raw `schema` text, empty when absent
    pub schema: String,
}

impl BodySpec {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Map::new(),
            required: Vec::new(),
            example: Value::Object(Map::new()),
            schema: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub description: String,
    pub headers: Map<String, Value>,
    pub body: Bodies,
}

/// A named type from the `types` section
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    /// Base type; `object` when unspecified
    pub kind: String,
    /// Property schemas in declaration order
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
    pub description: String,
    pub example: Value,
}
