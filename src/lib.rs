//! # apiforge
//!
//! **apiforge** turns RAML 1.0 API descriptions into ready-to-run Python
//! projects: a Flask application with SQLAlchemy models, marshmallow schemas,
//! services, blueprints and a pytest suite, plus an optional `requests`-based
//! client library.
//!
//! ## Architecture
//!
//! - **[`spec`]** - RAML parsing, `!include` resolution and the [`Specification`] IR
//! - **[`generator`]** - Resource grouping, naming, field inference and template rendering
//! - **[`validator`]** - tree-sitter syntax gate over every generated `.py` file
//! - **[`pipeline`]** - Batch Parse → Generate → Validate with per-spec failure isolation
//! - **[`config`]** - `apiforge.toml` loading and CLI overrides
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `apiforge-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(apiforge-gen)
//!     participant Pipeline as pipeline::run_batch
//!     participant Spec as spec::parse
//!     participant Gen as generator::ServerGenerator
//!     participant Val as validator::validate
//!     participant FS as File System
//!
//!     CLI->>Pipeline: SpecInput per file
//!     loop each specification, in order
//!         Pipeline->>Spec: parse(text, project_dir)
//!         Spec-->>Pipeline: Specification
//!         Pipeline->>Gen: generate(&spec)
//!         Gen-->>Pipeline: GeneratedFiles
//!         Pipeline->>Val: validate(&files)
//!         Val-->>Pipeline: ValidationReport
//!         Note over Pipeline: any failure is recorded,<br/>the batch moves on
//!     end
//!     Pipeline-->>CLI: BatchOutcome
//!     CLI->>FS: write <spec>-flask/ and <spec>-client/
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use apiforge::pipeline::{run_batch, BatchOptions, SpecInput};
//! use apiforge::generator::TemplateRegistry;
//!
//! let registry = TemplateRegistry::new().unwrap();
//! let inputs = vec![SpecInput::new("shop", "title: Shop\n/items:\n  get:\n  post:\n")];
//! let outcome = run_batch(&inputs, &BatchOptions::default(), &registry);
//!
//! assert!(outcome.is_success());
//! assert!(outcome.files.contains_key("shop-flask/app/resources/items/routes.py"));
//! ```
//!
//! From the command line:
//!
//! ```bash
//! apiforge-gen generate --spec api.raml --output out --client
//! ```
//!
//! Set `APIFORGE_LOG_LEVEL=debug` to follow grouping and include resolution.

pub mod cli;
pub mod config;
pub mod generator;
pub mod logging;
pub mod pipeline;
pub mod spec;
pub mod validator;

pub use generator::{
    ClientGenerator, GeneratedFiles, GeneratorConfig, ServerGenerator, TemplateRegistry,
};
pub use pipeline::{run_batch, BatchOptions, BatchOutcome, SpecInput};
pub use spec::{load_spec, parse, ParseError, Specification};
pub use validator::{validate, ValidationReport};
