use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::naming::{python_identifier, to_snake_case, unique_name};
use crate::spec::{Resource, Specification, TypeDef};

/// Attribute names that clash with SQLAlchemy, marshmallow or the
/// generated model methods
const RESERVED_ATTRS: &[&str] = &[
    "metadata", "query", "query_class", "registry", "fields", "opts", "context", "load",
    "loads", "dump", "dumps", "validate", "to_dict", "from_dict", "create", "update", "delete",
];

/// Column type for a RAML scalar type
///
/// Unknown and custom types are stored as strings.
pub fn column_type_for(raml_type: &str) -> &'static str {
    let ty = raml_type.trim().to_ascii_lowercase();
    if ty.ends_with("[]") {
        return "db.JSON";
    }
    match ty.as_str() {
        "string" => "db.String(255)",
        "integer" => "db.Integer",
        "number" => "db.Float",
        "boolean" => "db.Boolean",
        "date" | "date-only" => "db.Date",
        "datetime" | "datetime-only" => "db.DateTime",
        "time-only" => "db.Time",
        "file" => "db.LargeBinary",
        "array" | "object" => "db.JSON",
        _ => "db.String(255)",
    }
}

/// marshmallow field class for a column type
pub fn marshmallow_field_for(column_type: &str) -> &'static str {
    match column_type {
        "db.Integer" => "fields.Integer",
        "db.Float" => "fields.Float",
        "db.Boolean" => "fields.Boolean",
        "db.Date" => "fields.Date",
        "db.DateTime" => "fields.DateTime",
        "db.Time" => "fields.Time",
        "db.JSON" | "db.LargeBinary" => "fields.Raw",
        _ => "fields.String",
    }
}

/// Python type hint for a column type
fn python_type_for(column_type: &str) -> &'static str {
    match column_type {
        "db.Integer" => "int",
        "db.Float" => "float",
        "db.Boolean" => "bool",
        "db.Date" | "db.DateTime" | "db.Time" => "str",
        "db.JSON" => "Any",
        "db.LargeBinary" => "bytes",
        _ => "str",
    }
}

/// Python literal used as sample data in generated tests
fn sample_literal_for(column_type: &str, attr: &str) -> String {
    match column_type {
        "db.Integer" => "1".to_string(),
        "db.Float" => "1.5".to_string(),
        "db.Boolean" => "True".to_string(),
        "db.Date" => "'2024-01-01'".to_string(),
        "db.DateTime" => "'2024-01-01T00:00:00'".to_string(),
        "db.Time" => "'12:00:00'".to_string(),
        "db.JSON" | "db.LargeBinary" => "None".to_string(),
        _ => format!("'sample {attr}'"),
    }
}

/// How a group's field set was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Properties of the type whose name equals the group name
    TypeDef,
    /// Property names observed in request and response bodies
    Observed,
    /// `id`, `name`, `created_at`
    Default,
}

/// One persisted attribute of a generated entity
///
/// Templates read descriptors by position; generated code never inspects
/// attributes at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Property name as written in the document (`first-name`)
    pub key: String,
    /// Python attribute name (`first_name`)
    pub attr: String,
    /// SQLAlchemy column type expression
    pub column_type: String,
    /// marshmallow field class
    pub marshmallow_field: String,
    /// Python type hint used by client data models
    pub python_type: String,
    pub required: bool,
    pub primary_key: bool,
    /// Column default expression, if any
    pub default: Option<String>,
    /// Python literal used in generated tests
    pub sample: String,
}

impl FieldDescriptor {
    /// Descriptor for a property declared with `raml_type`
    pub fn new(seen: &mut HashSet<String>, key: &str, raml_type: &str, required: bool) -> Self {
        let attr = unique_name(seen, &attribute_name(key));
        let column_type = column_type_for(raml_type).to_string();
        Self {
            marshmallow_field: marshmallow_field_for(&column_type).to_string(),
            python_type: python_type_for(&column_type).to_string(),
            sample: sample_literal_for(&column_type, &attr),
            primary_key: attr == "id",
            key: key.to_string(),
            attr,
            column_type,
            required,
            default: None,
        }
    }

    /// Whether the document key differs from the Python attribute
    pub fn is_renamed(&self) -> bool {
        self.key != self.attr
    }
}

/// Python attribute for a property key
///
/// A trailing `?` marks an optional property in RAML and is dropped.
pub fn attribute_name(key: &str) -> String {
    let base = python_identifier(&to_snake_case(key.trim_end_matches('?')), "field");
    if RESERVED_ATTRS.contains(&base.as_str()) {
        format!("{base}_")
    } else {
        base
    }
}

/// RAML type of a property schema
///
/// Accepts the shorthand (`name: string`), a facet mapping and the
/// `string[]` array notation.
pub fn property_type(schema: &Value) -> String {
    match schema {
        Value::String(s) => s.clone(),
        Value::Object(facets) => match facets.get("type") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(_)) => "object".to_string(),
            Some(Value::Array(_)) => "string".to_string(),
            _ if facets.contains_key("properties") => "object".to_string(),
            _ if facets.contains_key("items") => "array".to_string(),
            _ => "string".to_string(),
        },
        _ => "string".to_string(),
    }
}

/// Descriptors for a declared type, in declaration order
pub fn fields_from_type_def(type_def: &TypeDef) -> Vec<FieldDescriptor> {
    type_fields(&type_def.properties, &type_def.required)
}

/// Property names seen in any request or response body, in first-seen order
pub fn observed_properties<'a>(resources: impl IntoIterator<Item = &'a Resource>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for resource in resources {
        for method in &resource.methods {
            for body in method.all_bodies() {
                for key in body.properties.keys() {
                    if !names.iter().any(|n| n == key) {
                        names.push(key.clone());
                    }
                }
            }
        }
    }
    names
}

/// `id`, `name` and `created_at`
pub fn default_fields() -> Vec<FieldDescriptor> {
    let mut seen = HashSet::new();
    let id = FieldDescriptor::new(&mut seen, "id", "integer", true);
    let name = FieldDescriptor::new(&mut seen, "name", "string", true);
    let mut created_at = FieldDescriptor::new(&mut seen, "created_at", "datetime", false);
    created_at.default = Some("datetime.utcnow".to_string());
    vec![id, name, created_at]
}

/// Infer the field set of a group
///
/// A type named exactly like the group wins over anything observed in
/// bodies. A matching type without properties, or no source at all, yields
/// the default trio.
pub fn infer_fields<'a>(
    spec: &Specification,
    group_raw_name: &str,
    resources: impl IntoIterator<Item = &'a Resource>,
) -> (Vec<FieldDescriptor>, FieldSource) {
    if let Some(type_def) = spec.type_def(group_raw_name) {
        let fields = fields_from_type_def(type_def);
        if fields.is_empty() {
            return (default_fields(), FieldSource::Default);
        }
        return (fields, FieldSource::TypeDef);
    }

    let observed = observed_properties(resources);
    if !observed.is_empty() {
        let mut seen = HashSet::new();
        let fields = observed
            .iter()
            .map(|key| FieldDescriptor::new(&mut seen, key, "string", false))
            .collect();
        return (fields, FieldSource::Observed);
    }

    (default_fields(), FieldSource::Default)
}

/// Build a sample request payload as a Python dict literal
pub fn sample_payload(fields: &[FieldDescriptor]) -> String {
    let entries: Vec<String> = fields
        .iter()
        .filter(|f| !(f.primary_key || f.default.is_some() || f.sample == "None"))
        .map(|f| format!("{}: {}", super::naming::python_string_literal(&f.key), f.sample))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Column used by the generated substring search
///
/// `name` when present, else the first string column.
pub fn search_field(fields: &[FieldDescriptor]) -> Option<&FieldDescriptor> {
    fields
        .iter()
        .find(|f| f.attr == "name" && f.column_type == "db.String(255)")
        .or_else(|| {
            fields
                .iter()
                .find(|f| f.column_type == "db.String(255)" && !f.primary_key)
        })
}

/// Descriptors for a property mapping
pub fn type_fields(properties: &Map<String, Value>, required: &[String]) -> Vec<FieldDescriptor> {
    let mut seen = HashSet::new();
    properties
        .iter()
        .map(|(key, schema)| {
            let is_required = required.iter().any(|r| r == key);
            FieldDescriptor::new(&mut seen, key, &property_type(schema), is_required)
        })
        .collect()
}
