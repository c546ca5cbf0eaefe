//! # Generator Module
//!
//! Maps a [`Specification`](crate::spec::Specification) onto a coordinated set
//! of Python artifacts: a Flask application and, optionally, a `requests`
//! client library.
//!
//! ## Architecture
//!
//! ```text
//! Specification → Resource groups → Field descriptors
//!               → Template rendering → GeneratedFiles
//! ```
//!
//! 1. **Grouping** - resources are grouped by the last literal segment of their
//!    URI; every group gets a [`CanonicalName`] derived exactly once
//! 2. **Operations** - each (endpoint, verb) pair gets one name shared by the
//!    route, its test, the client method and the client test
//! 3. **Fields** - a group's persisted fields come from the type of the same
//!    name, else from body properties, else `id`/`name`/`created_at`
//! 4. **Rendering** - a [`TemplateRegistry`] built once renders every artifact
//!    kind through its own function
//!
//! Output is a [`GeneratedFiles`] map of relative path to content. Nothing is
//! written to disk here.
//!
//! ## Generated Structure
//!
//! ```text
//! <spec>-flask/
//! ├── app/
//! │   ├── __init__.py             # create_app factory
//! │   ├── config.py
//! │   ├── api/__init__.py         # aggregated blueprint + /health
//! │   ├── extensions/{__init__,db}.py
//! │   ├── errors/{__init__,handlers}.py
//! │   ├── utils/__init__.py
//! │   └── resources/<group>/{__init__,model,schema,service,routes}.py
//! ├── tests/test_<group>.py
//! ├── run.py, wsgi.py
//! └── requirements.txt, requirements-dev.txt, .env.example, .gitignore, README.md
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use apiforge::generator::{GeneratorConfig, ServerGenerator, TemplateRegistry};
//! use apiforge::spec::parse;
//!
//! let spec = parse("title: Shop\n/items:\n  get:\n", None).unwrap();
//! let registry = TemplateRegistry::new().unwrap();
//! let files = ServerGenerator::new(&registry, GeneratorConfig::default())
//!     .generate(&spec)
//!     .unwrap();
//! assert!(files.contains_key("app/resources/items/routes.py"));
//! ```

use std::collections::BTreeMap;

mod client;
mod config;
mod error;
mod group;
mod naming;
mod schema;
mod server;
mod templates;

pub use client::{
    client_base_url, package_version, ClientGenerator, ClientLibraryGenerator, DEFAULT_CLIENT_HOST,
};
pub use config::{ClientConfig, GeneratorConfig};
pub use error::GenerateError;
pub use group::{
    flask_path, group_name_for_uri, group_resources, operation_base_name, route_params,
    strip_version_prefix, Endpoint, Operation, ResourceGroup, RouteParam, FALLBACK_GROUP,
};
pub use naming::{
    is_python_keyword, python_identifier, python_string_literal, to_camel_case, to_pascal_case,
    to_snake_case, unique_name, CanonicalName,
};
pub use schema::{
    column_type_for, default_fields, infer_fields, marshmallow_field_for, FieldDescriptor,
    FieldSource,
};
pub use server::ServerGenerator;
pub use templates::TemplateRegistry;

/// Relative POSIX path → file content, iterated in path order
pub type GeneratedFiles = BTreeMap<String, String>;

#[cfg(test)]
mod tests;
