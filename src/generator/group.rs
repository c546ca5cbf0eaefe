use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use super::naming::{
    python_identifier, python_string_literal, to_snake_case, unique_name, CanonicalName,
};
use super::schema::{infer_fields, FieldDescriptor, FieldSource};
use crate::spec::{HttpVerb, Method, Resource, Specification};

#[allow(clippy::expect_used)]
static URI_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("URI parameter pattern is valid"));

/// Group name used when a URI has no literal segment
pub const FALLBACK_GROUP: &str = "resource";

/// Argument names taken by the generated route and client signatures
const RESERVED_ARGS: &[&str] = &["self", "data", "params", "base", "client", "request"];

/// A path parameter as bound by Flask and the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteParam {
    /// Name between the braces in the URI
    pub name: String,
    /// Python argument name
    pub arg: String,
    /// Flask converter (`int`, `float`), empty for strings
    pub converter: String,
    /// Python literal used for this parameter in generated tests and examples
    pub sample: String,
}

/// One (endpoint, verb) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// Function name shared by the route, its test and the client method
    pub name: String,
    /// Upper-case verb (`GET`)
    pub verb: String,
    /// Lower-case verb (`get`)
    pub method: String,
    pub description: String,
    /// `true` when the URI ends in a parameter segment
    pub is_item: bool,
    /// `true` when `securedBy` names at least one real scheme
    pub secured: bool,
    /// Status code of the first declared 2xx response, or the verb default
    pub success_status: u16,
    /// `true` for verbs that send a JSON payload
    pub has_body: bool,
    /// Status codes a generated test accepts against an empty database
    pub expected_statuses: Vec<u16>,
}

/// One resource URI inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// URI as written in the document
    pub uri: String,
    /// Flask rule relative to `/api/<version>`
    pub route_path: String,
    /// Python string literal of the client path (f-string when parameterized)
    pub client_path: String,
    /// Concrete path used by generated server tests
    pub test_path: String,
    /// Concrete URI the generated client tests expect to be requested
    pub client_test_path: String,
    pub description: String,
    pub params: Vec<RouteParam>,
    /// Python argument list of the route function (`order_id, item_id`)
    pub args: String,
    /// Argument bound as the entity identifier (last path parameter)
    pub id_arg: Option<String>,
    pub operations: Vec<Operation>,
}

/// Resources sharing one canonical name, the unit of artifact generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceGroup {
    pub name: CanonicalName,
    pub endpoints: Vec<Endpoint>,
    pub fields: Vec<FieldDescriptor>,
    pub field_source: FieldSource,
}

impl ResourceGroup {
    pub fn operations(&self) -> impl Iterator<Item = (&Endpoint, &Operation)> {
        self.endpoints
            .iter()
            .flat_map(|e| e.operations.iter().map(move |op| (e, op)))
    }

    pub fn has_verb(&self, verb: &str) -> bool {
        self.operations().any(|(_, op)| op.verb == verb)
    }
}

/// Literal group name of a URI: its last non-parameter segment
///
/// ```rust
/// use apiforge::generator::group_name_for_uri;
/// assert_eq!(group_name_for_uri("/a/{id}/b"), "b");
/// assert_eq!(group_name_for_uri("/{id}"), "resource");
/// ```
pub fn group_name_for_uri(uri: &str) -> &str {
    uri.split('/')
        .filter(|part| !part.is_empty() && !is_param_segment(part))
        .last()
        .unwrap_or(FALLBACK_GROUP)
}

fn is_param_segment(part: &str) -> bool {
    part.starts_with('{') && part.ends_with('}')
}

/// Strip a leading `<api_version>/` from a URI
///
/// ```rust
/// use apiforge::generator::strip_version_prefix;
/// assert_eq!(strip_version_prefix("/v1/users", "v1"), "/users");
/// assert_eq!(strip_version_prefix("/v1", "v1"), "/v1");
/// ```
pub fn strip_version_prefix(uri: &str, api_version: &str) -> String {
    let relative = uri.trim_start_matches('/');
    let prefix = format!("{api_version}/");
    let relative = relative.strip_prefix(&prefix).unwrap_or(relative);
    format!("/{relative}")
}

/// Bind the `{param}` segments of a resource to Python arguments
pub fn route_params(resource: &Resource) -> Vec<RouteParam> {
    let mut seen = HashSet::new();
    resource
        .path_parameters()
        .into_iter()
        .map(|param| {
            let mut base = python_identifier(&to_snake_case(&param.name), "param");
            if RESERVED_ARGS.contains(&base.as_str()) {
                base.push('_');
            }
            let arg = unique_name(&mut seen, &base);
            let (converter, sample) = match param.declared_type() {
                "integer" => ("int", "1".to_string()),
                "number" => ("float", "1.5".to_string()),
                _ => ("", python_string_literal("test")),
            };
            RouteParam {
                name: param.name,
                arg,
                converter: converter.to_string(),
                sample,
            }
        })
        .collect()
}

/// Rewrite `{param}` placeholders into a Flask rule
pub fn flask_path(path: &str, params: &[RouteParam]) -> String {
    replace_params(path, params, |p| {
        if p.converter.is_empty() {
            format!("<{}>", p.arg)
        } else {
            format!("<{}:{}>", p.converter, p.arg)
        }
    })
}

/// Replace `{param}` occurrences left to right with the matching binding
fn replace_params(
    path: &str,
    params: &[RouteParam],
    render: impl Fn(&RouteParam) -> String,
) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last = 0;
    for (i, m) in URI_PARAM_RE.find_iter(path).enumerate() {
        out.push_str(&path[last..m.start()]);
        match params.get(i) {
            Some(p) => out.push_str(&render(p)),
            None => out.push_str(m.as_str()),
        }
        last = m.end();
    }
    out.push_str(&path[last..]);
    out
}

/// Python expression building the client request path
///
/// A plain string literal without parameters, an f-string otherwise.
pub fn client_path_expr(uri: &str, params: &[RouteParam]) -> String {
    if params.is_empty() {
        return python_string_literal(uri);
    }
    let mut out = String::from("f'");
    let mut last = 0;
    for (i, m) in URI_PARAM_RE.find_iter(uri).enumerate() {
        out.push_str(&fstring_escape(&uri[last..m.start()]));
        match params.get(i) {
            Some(p) => {
                out.push('{');
                out.push_str(&p.arg);
                out.push('}');
            }
            None => out.push_str(&fstring_escape(m.as_str())),
        }
        last = m.end();
    }
    out.push_str(&fstring_escape(&uri[last..]));
    out.push('\'');
    out
}

fn fstring_escape(text: &str) -> String {
    let quoted = python_string_literal(text);
    quoted[1..quoted.len() - 1]
        .replace('{', "{{")
        .replace('}', "}}")
}

/// Concrete path with every parameter replaced by a sample value
fn sample_path(uri: &str, params: &[RouteParam]) -> String {
    replace_params(uri, params, |p| {
        if p.converter.is_empty() {
            "test".to_string()
        } else {
            p.sample.clone()
        }
    })
}

/// Base operation word for a verb
fn verb_word(verb: HttpVerb, is_item: bool) -> &'static str {
    match verb {
        HttpVerb::Get if is_item => "get",
        HttpVerb::Get => "list",
        HttpVerb::Post => "create",
        HttpVerb::Put => "update",
        HttpVerb::Patch => "patch",
        HttpVerb::Delete => "delete",
        HttpVerb::Head => "head",
        HttpVerb::Options => "options",
    }
}

/// Derive the operation name for a verb on an endpoint
///
/// `GET /users` → `list_users`, `GET /users/{id}` → `get_users_by_id`.
pub fn operation_base_name(
    verb: HttpVerb,
    is_item: bool,
    group: &CanonicalName,
    params: &[RouteParam],
) -> String {
    let mut name = format!("{}_{}", verb_word(verb, is_item), group.snake);
    if !params.is_empty() {
        let args: Vec<&str> = params.iter().map(|p| p.arg.trim_end_matches('_')).collect();
        name.push_str("_by_");
        name.push_str(&args.join("_and_"));
    }
    name
}

fn default_status(verb: HttpVerb) -> u16 {
    match verb {
        HttpVerb::Post => 201,
        HttpVerb::Delete => 204,
        _ => 200,
    }
}

fn success_status(method: &Method) -> u16 {
    method
        .responses
        .keys()
        .filter_map(|code| code.parse::<u16>().ok())
        .find(|code| (200..300).contains(code))
        .unwrap_or_else(|| default_status(method.verb))
}

/// Statuses a generated test accepts when run against an empty database
fn expected_statuses(verb: HttpVerb, is_item: bool, success: u16) -> Vec<u16> {
    match verb {
        HttpVerb::Get if is_item => vec![success, 404],
        HttpVerb::Post => vec![success, 400],
        HttpVerb::Put | HttpVerb::Patch if is_item => vec![success, 400, 404],
        HttpVerb::Delete if is_item => vec![success, 404],
        HttpVerb::Put | HttpVerb::Patch | HttpVerb::Delete => vec![405],
        _ => vec![success],
    }
}

fn is_secured(method: &Method) -> bool {
    method.secured_by.iter().any(|s| s != "null")
}

/// Group resources by canonical name, in order of first appearance
///
/// Operation names are made unique per group and are the single source for
/// every artifact that refers to an operation.
pub fn group_resources(spec: &Specification, api_version: &str) -> Vec<ResourceGroup> {
    struct Pending<'a> {
        name: CanonicalName,
        resources: Vec<&'a Resource>,
    }

    let mut pending: Vec<Pending<'_>> = Vec::new();
    for resource in &spec.resources {
        let candidate = CanonicalName::derive(group_name_for_uri(&resource.uri));
        match pending.iter_mut().find(|p| p.name.snake == candidate.snake) {
            Some(existing) => existing.resources.push(resource),
            None => pending.push(Pending {
                name: candidate,
                resources: vec![resource],
            }),
        }
    }

    pending
        .into_iter()
        .map(|p| {
            let mut seen = HashSet::new();
            let endpoints = p
                .resources
                .iter()
                .map(|resource| build_endpoint(resource, &p.name, api_version, &mut seen))
                .collect();
            let (fields, field_source) =
                infer_fields(spec, &p.name.raw, p.resources.iter().copied());
            debug!(
                group = %p.name.snake,
                resources = p.resources.len(),
                fields = fields.len(),
                source = ?field_source,
                "grouped resources"
            );
            ResourceGroup {
                name: p.name,
                endpoints,
                fields,
                field_source,
            }
        })
        .collect()
}

fn build_endpoint(
    resource: &Resource,
    group: &CanonicalName,
    api_version: &str,
    seen: &mut HashSet<String>,
) -> Endpoint {
    let params = route_params(resource);
    let is_item = resource
        .uri
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .is_some_and(is_param_segment);
    let relative = strip_version_prefix(&resource.uri, api_version);
    let route_path = flask_path(&relative, &params);

    let operations = resource
        .methods
        .iter()
        .map(|method| {
            let success = success_status(method);
            Operation {
                name: unique_name(seen, &operation_base_name(method.verb, is_item, group, &params)),
                verb: method.verb.as_str().to_string(),
                method: method.verb.as_lower().to_string(),
                description: method.description.clone(),
                is_item,
                secured: is_secured(method),
                success_status: success,
                has_body: matches!(method.verb, HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch),
                expected_statuses: expected_statuses(method.verb, is_item, success),
            }
        })
        .collect();

    Endpoint {
        client_path: client_path_expr(&resource.uri, &params),
        test_path: sample_path(&relative, &params),
        client_test_path: sample_path(&resource.uri, &params),
        uri: resource.uri.clone(),
        description: resource.description.clone(),
        args: params.iter().map(|p| p.arg.as_str()).collect::<Vec<_>>().join(", "),
        id_arg: params.last().map(|p| p.arg.clone()),
        route_path,
        params,
        operations,
    }
}
