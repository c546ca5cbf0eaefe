use serde_json::{Map, Value};
use tracing::debug;

use super::types::{
    Bodies, BodySpec, HttpVerb, Method, Resource, ResponseSpec, Specification, TypeDef,
};

pub const DEFAULT_TITLE: &str = "API";
pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_BASE_URI: &str = "/api";
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";
pub const DEFAULT_PROTOCOLS: [&str; 2] = ["HTTP", "HTTPS"];

/// Keys that mark a body written without its media-type level
const BODY_SHORTHAND_KEYS: [&str; 5] = ["type", "properties", "example", "schema", "required"];

/// Build the IR from a fully include-resolved document root
pub fn build_specification(root: &Map<String, Value>) -> Specification {
    let media_type = text_or(root.get("mediaType"), DEFAULT_MEDIA_TYPE);

    let protocols = match root.get("protocols") {
        Some(value) if !value.is_null() => string_list(value),
        _ => DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect(),
    };

    // `schemas` is the RAML 0.8 spelling of `types`
    let types_section = match root.get("types") {
        Some(value) if !value.is_null() => Some(value),
        _ => root.get("schemas"),
    };

    let mut resources = Vec::new();
    collect_resources(root, "", &media_type, &mut resources);

    Specification {
        title: text_or(root.get("title"), DEFAULT_TITLE),
        version: text_or(root.get("version"), DEFAULT_VERSION),
        base_uri: text_or(root.get("baseUri"), DEFAULT_BASE_URI),
        description: text_or(root.get("description"), ""),
        protocols,
        security_schemes: object_or_empty(root.get("securitySchemes")),
        traits: object_or_empty(root.get("traits")),
        types: types_section.map(extract_types).unwrap_or_default(),
        resources,
        media_type,
    }
}

/// Walk `/`-prefixed keys depth first, parents before children
pub fn collect_resources(
    node: &Map<String, Value>,
    parent_uri: &str,
    media_type: &str,
    out: &mut Vec<Resource>,
) {
    for (key, value) in node {
        if !key.starts_with('/') {
            continue;
        }
        let uri = format!("{parent_uri}{key}");
        let empty = Map::new();
        let body = value.as_object().unwrap_or(&empty);

        let methods: Vec<Method> = body
            .iter()
            .filter_map(|(k, v)| HttpVerb::parse(k).map(|verb| extract_method(verb, v, media_type)))
            .collect();

        let resource = Resource {
            display_name: text_or(body.get("displayName"), key),
            description: text_or(body.get("description"), ""),
            uri_parameters: object_or_empty(body.get("uriParameters")),
            methods,
            uri: uri.clone(),
        };

        for name in resource.undeclared_uri_parameters() {
            debug!(
                uri = %resource.uri,
                parameter = name,
                "uriParameters entry not present in URI; ignored"
            );
        }
        debug!(
            uri = %resource.uri,
            methods = resource.methods.len(),
            "extracted resource"
        );

        out.push(resource);
        collect_resources(body, &uri, media_type, out);
    }
}

/// Normalize a method entry of any shape into a [`Method`]
///
/// A mapping is read field by field, a bare scalar is taken as the
/// description, anything else yields a bare method.
pub fn extract_method(verb: HttpVerb, value: &Value, media_type: &str) -> Method {
    let mut method = Method::bare(verb);
    match value {
        Value::Object(data) => {
            method.display_name = text_or(data.get("displayName"), verb.as_str());
            method.description = text_or(data.get("description"), "");
            method.query_parameters = object_or_empty(data.get("queryParameters"));
            method.headers = object_or_empty(data.get("headers"));
            method.body = data
                .get("body")
                .map(|b| extract_bodies(b, media_type))
                .unwrap_or_default();
            method.responses = data
                .get("responses")
                .and_then(Value::as_object)
                .map(|r| extract_responses(r, media_type))
                .unwrap_or_default();
            method.secured_by = data.get("securedBy").map(string_list).unwrap_or_default();
            method.traits = data.get("is").map(string_list).unwrap_or_default();
        }
        other => {
            if let Some(text) = scalar_text(other) {
                method.description = text;
            }
        }
    }
    method
}

/// Extract media-type keyed bodies
pub fn extract_bodies(value: &Value, media_type: &str) -> Bodies {
    let mut bodies = Bodies::new();
    match value {
        Value::Object(map) if is_body_shorthand(map) => {
            bodies.insert(media_type.to_string(), body_from_map(map));
        }
        Value::Object(map) => {
            for (media, spec) in map {
                let body = match spec {
                    Value::Object(inner) => body_from_map(inner),
                    Value::Null => BodySpec::of_type("object"),
                    other => BodySpec::of_type(
                        scalar_text(other).unwrap_or_else(|| "object".to_string()),
                    ),
                };
                bodies.insert(media.clone(), body);
            }
        }
        // `body: User` names the type of the default media type
        Value::String(type_name) => {
            bodies.insert(media_type.to_string(), BodySpec::of_type(type_name.clone()));
        }
        _ => {}
    }
    bodies
}

fn is_body_shorthand(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.keys().all(|k| !k.contains('/'))
        && map.keys().any(|k| BODY_SHORTHAND_KEYS.contains(&k.as_str()))
}

fn body_from_map(map: &Map<String, Value>) -> BodySpec {
    let (type_name, inline_properties) = split_type(map.get("type"));
    let properties = match map.get("properties") {
        Some(Value::Object(props)) => props.clone(),
        _ => inline_properties,
    };
    BodySpec {
        type_name,
        required: required_names(map, &properties),
        properties,
        example: map.get("example").cloned().unwrap_or_else(|| Value::Object(Map::new())),
        schema: text_or(map.get("schema"), ""),
    }
}

/// Extract status-code keyed responses
pub fn extract_responses(
    map: &Map<String, Value>,
    media_type: &str,
) -> std::collections::BTreeMap<String, ResponseSpec> {
    map.iter()
        .map(|(status, value)| {
            let response = match value {
                Value::Object(data) => ResponseSpec {
                    description: text_or(data.get("description"), ""),
                    headers: object_or_empty(data.get("headers")),
                    body: data
                        .get("body")
                        .map(|b| extract_bodies(b, media_type))
                        .unwrap_or_default(),
                },
                other => ResponseSpec {
                    description: scalar_text(other).unwrap_or_default(),
                    headers: Map::new(),
                    body: Bodies::new(),
                },
            };
            (status.clone(), response)
        })
        .collect()
}

/// Normalize the `types` section into ordered [`TypeDef`]s
pub fn extract_types(section: &Value) -> Vec<TypeDef> {
    let Some(entries) = section.as_object() else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|(name, def)| type_def_from_value(name, def))
        .collect()
}

fn type_def_from_value(name: &str, def: &Value) -> TypeDef {
    match def {
        Value::Object(map) => {
            let (kind, inline_properties) = split_type(map.get("type"));
            let properties = match map.get("properties") {
                Some(Value::Object(props)) => props.clone(),
                _ => inline_properties,
            };
            TypeDef {
                name: name.to_string(),
                kind,
                required: required_names(map, &properties),
                properties,
                description: text_or(map.get("description"), ""),
                example: map.get("example").cloned().unwrap_or_else(|| Value::Object(Map::new())),
            }
        }
        Value::String(text) if text.contains('\n') => {
            // Raw text from a non-YAML include, typically a JSON schema
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(schema)) => type_def_from_value(name, &Value::Object(schema)),
                _ => bare_type(name, "object"),
            }
        }
        Value::Null => bare_type(name, "object"),
        other => bare_type(name, &scalar_text(other).unwrap_or_else(|| "object".to_string())),
    }
}

fn bare_type(name: &str, kind: &str) -> TypeDef {
    TypeDef {
        name: name.to_string(),
        kind: kind.to_string(),
        properties: Map::new(),
        required: Vec::new(),
        description: String::new(),
        example: Value::Object(Map::new()),
    }
}

/// Split a `type` facet into its name and any inline properties
fn split_type(value: Option<&Value>) -> (String, Map<String, Value>) {
    match value {
        Some(Value::Object(inline)) => {
            let properties = object_or_empty(inline.get("properties"));
            (text_or(inline.get("type"), "object"), properties)
        }
        Some(Value::Array(items)) => {
            let names: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if names.is_empty() {
                ("object".to_string(), Map::new())
            } else {
                (names.join(" | "), Map::new())
            }
        }
        Some(other) => (
            scalar_text(other).unwrap_or_else(|| "object".to_string()),
            Map::new(),
        ),
        None => ("object".to_string(), Map::new()),
    }
}

/// Explicit `required` list, else properties flagged `required: true`
fn required_names(map: &Map<String, Value>, properties: &Map<String, Value>) -> Vec<String> {
    if let Some(Value::Array(names)) = map.get("required") {
        return names.iter().filter_map(scalar_text).collect();
    }
    properties
        .iter()
        .filter(|(_, schema)| schema.get("required").and_then(Value::as_bool) == Some(true))
        .map(|(name, _)| name.clone())
        .collect()
}

/// Text of a scalar value; `None` for containers and null
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(scalar_text)
        .unwrap_or_else(|| default.to_string())
}

fn object_or_empty(value: Option<&Value>) -> Map<String, Value> {
    value
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Reference lists (`securedBy`, `is`) written as a scalar, a list of names
/// or a list of single-key parameterized mappings
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => Some("null".to_string()),
                Value::Object(map) => map.keys().next().cloned(),
                other => scalar_text(other),
            })
            .collect(),
        Value::Null => Vec::new(),
        Value::Object(map) => map.keys().cloned().collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}
