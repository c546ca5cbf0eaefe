//! # Spec Module
//!
//! Turns RAML 1.0 text into the [`Specification`] IR consumed by the generators.
//!
//! ## Overview
//!
//! Parsing happens in three passes:
//!
//! ```text
//! RAML text → RawNode tree → include-resolved JSON → Specification
//! ```
//!
//! 1. **Load** - the YAML is read into a [`raw`] tree that keeps local tags and
//!    tolerates duplicate keys (last value wins, first position kept)
//! 2. **Resolve** - `!include` directives are replaced by the content of the
//!    first matching file under the project directory, or by a placeholder
//! 3. **Build** - resources, methods, bodies, responses and types are
//!    normalized into plain data with every default filled in
//!
//! ## Include Resolution
//!
//! Candidates are tried in this order, first existing file wins:
//!
//! ```text
//! <name>
//! <name>.raml
//! datatypes/<name>
//! datatypes/<name>.raml
//! types/<name>
//! types/<name>.raml
//! ```
//!
//! Unresolved and cyclic includes never fail the parse. A type-like name
//! (`*.raml`, `datatype`, `types/`) becomes an empty object type, anything
//! else becomes the string `string`.
//!
//! ## Usage
//!
//! ```rust
//! use apiforge::spec::{parse, HttpVerb};
//!
//! let spec = parse("title: T\n/a:\n  get:\n", None).unwrap();
//! assert_eq!(spec.resources[0].uri, "/a");
//! assert_eq!(spec.resources[0].methods[0].verb, HttpVerb::Get);
//! ```

mod build;
mod error;
mod include;
mod load;
mod raw;
mod types;

pub use build::{
    DEFAULT_BASE_URI, DEFAULT_MEDIA_TYPE, DEFAULT_PROTOCOLS, DEFAULT_TITLE, DEFAULT_VERSION,
};
pub use error::ParseError;
pub use include::{candidate_paths, expand_tabs, looks_like_type_reference, placeholder};
pub use load::{load_spec, parse, spec_name_from_path};
pub use types::*;
