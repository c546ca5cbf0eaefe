//! Batch pipeline: Parse → Generate → Validate for each specification
//!
//! Specifications are processed strictly in input order. A failure in any
//! stage is recorded as a [`SpecFailure`] and that specification contributes
//! no server files; the batch carries on with the next one.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::generator::{
    unique_name, ClientConfig, ClientLibraryGenerator, GeneratedFiles, GeneratorConfig,
    ServerGenerator, TemplateRegistry,
};
use crate::spec::{parse, spec_name_from_path, ParseError};
use crate::validator::{ensure_valid, validate, ValidationIssue};

/// One specification to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecInput {
    /// Batch name, used as the output prefix (`<name>-flask/`)
    pub name: String,
    /// Raw RAML text
    pub text: String,
    /// Directory `!include` paths are resolved against
    pub project_dir: Option<PathBuf>,
}

impl SpecInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            project_dir: None,
        }
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Read a specification file; its directory becomes the project directory
    ///
    /// # Errors
    ///
    /// [`ParseError::Io`] when the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self::new(spec_name_from_path(path), text).with_project_dir(dir))
    }
}

/// Options applied to every specification of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub server: GeneratorConfig,
    /// Also generate a client library per specification
    pub generate_client: bool,
}

/// Stage a specification failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Parse,
    ServerGeneration,
    Validation,
    ClientGeneration,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Parse => "parse",
            FailureStage::ServerGeneration => "server generation",
            FailureStage::Validation => "validation",
            FailureStage::ClientGeneration => "client generation",
        };
        f.write_str(name)
    }
}

/// A per-specification failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFailure {
    pub spec: String,
    pub stage: FailureStage,
    pub message: String,
}

impl fmt::Display for SpecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} failed: {}", self.spec, self.stage, self.message)
    }
}

impl std::error::Error for SpecFailure {}

/// Everything a batch produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Prefixed output paths of every accepted artifact set
    pub files: GeneratedFiles,
    /// Names of specifications whose server artifacts were accepted
    pub succeeded: Vec<String>,
    pub failures: Vec<SpecFailure>,
    /// Advisory validator findings, with prefixed paths
    pub warnings: Vec<ValidationIssue>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, spec: &str, stage: FailureStage, message: String) {
        warn!(spec = %spec, stage = %stage, error = %message, "specification failed");
        self.failures.push(SpecFailure {
            spec: spec.to_string(),
            stage,
            message,
        });
    }

    /// Accept an artifact set under `prefix`
    ///
    /// Paths already present are never overwritten.
    fn accept(&mut self, prefix: &str, files: GeneratedFiles, warnings: Vec<ValidationIssue>) {
        for (path, content) in files {
            self.files.entry(format!("{prefix}/{path}")).or_insert(content);
        }
        self.warnings.extend(warnings.into_iter().map(|mut w| {
            w.path = format!("{prefix}/{}", w.path);
            w
        }));
    }
}

/// Run the batch with the Python client backend of `registry`
pub fn run_batch(
    inputs: &[SpecInput],
    options: &BatchOptions,
    registry: &TemplateRegistry,
) -> BatchOutcome {
    run_batch_with(inputs, options, registry, registry)
}

/// Run the batch with a caller-supplied client backend
pub fn run_batch_with(
    inputs: &[SpecInput],
    options: &BatchOptions,
    registry: &TemplateRegistry,
    client_backend: &dyn ClientLibraryGenerator,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let server = ServerGenerator::new(registry, options.server.clone());
    let mut names = HashSet::new();

    for input in inputs {
        let name = unique_name(&mut names, &input.name);
        if name != input.name {
            warn!(spec = %input.name, renamed = %name, "duplicate specification name in batch");
        }

        let spec = match parse(&input.text, input.project_dir.as_deref()) {
            Ok(spec) => spec,
            Err(e) => {
                outcome.fail(&name, FailureStage::Parse, e.to_string());
                continue;
            }
        };

        let files = match server.generate(&spec) {
            Ok(files) => files,
            Err(e) => {
                outcome.fail(&name, FailureStage::ServerGeneration, e.to_string());
                continue;
            }
        };

        let report = validate(&files);
        if let Err(e) = ensure_valid(&report) {
            outcome.fail(&name, FailureStage::Validation, e.to_string());
            continue;
        }
        outcome.accept(&format!("{name}-flask"), files, report.warnings);
        outcome.succeeded.push(name.clone());
        info!(spec = %name, title = %spec.title, "server artifacts accepted");

        if options.generate_client {
            let config = ClientConfig::for_spec(
                &name,
                options.server.include_auth,
                options.server.generate_tests,
            );
            let result = client_backend.generate_client(&spec, &config).map_err(|e| e.to_string());
            let result = result.and_then(|files| {
                let report = validate(&files);
                ensure_valid(&report).map_err(|e| e.to_string())?;
                Ok((files, report.warnings))
            });
            match result {
                Ok((files, warnings)) => {
                    outcome.accept(&format!("{name}-client"), files, warnings);
                    info!(spec = %name, "client artifacts accepted");
                }
                Err(message) => outcome.fail(&name, FailureStage::ClientGeneration, message),
            }
        }
    }

    info!(
        specs = inputs.len(),
        succeeded = outcome.succeeded.len(),
        failed = outcome.failures.len(),
        files = outcome.files.len(),
        "batch finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::generator::GenerateError;
    use crate::spec::Specification;

    struct BrokenClient;

    impl ClientLibraryGenerator for BrokenClient {
        fn generate_client(
            &self,
            _: &Specification,
            _: &ClientConfig,
        ) -> Result<GeneratedFiles, GenerateError> {
            Err(GenerateError::InvalidConfig {
                message: "client backend unavailable".to_string(),
            })
        }
    }

    struct MalformedClient;

    impl ClientLibraryGenerator for MalformedClient {
        fn generate_client(
            &self,
            _: &Specification,
            _: &ClientConfig,
        ) -> Result<GeneratedFiles, GenerateError> {
            let mut files = GeneratedFiles::new();
            files.insert("pkg/__init__.py".to_string(), "def broken(:\n".to_string());
            Ok(files)
        }
    }

    fn registry() -> TemplateRegistry {
        TemplateRegistry::new().unwrap()
    }

    #[test]
    fn test_failure_stage_display() {
        assert_eq!(FailureStage::Parse.to_string(), "parse");
        assert_eq!(FailureStage::ClientGeneration.to_string(), "client generation");
        let failure = SpecFailure {
            spec: "orders".to_string(),
            stage: FailureStage::Validation,
            message: "boom".to_string(),
        };
        assert_eq!(failure.to_string(), "orders: validation failed: boom");
    }

    #[test]
    fn test_parse_failure_is_isolated() {
        let inputs = vec![
            SpecInput::new("broken", "- just\n- a list\n"),
            SpecInput::new("shop", "title: Shop\n/items:\n  get:\n"),
        ];
        let outcome = run_batch(&inputs, &BatchOptions::default(), &registry());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].spec, "broken");
        assert_eq!(outcome.failures[0].stage, FailureStage::Parse);
        assert_eq!(outcome.succeeded, vec!["shop".to_string()]);
        assert!(outcome.files.keys().all(|p| p.starts_with("shop-flask/")));
        assert!(outcome.files.contains_key("shop-flask/app/resources/items/routes.py"));
    }

    #[test]
    fn test_invalid_server_config_fails_every_spec() {
        let options = BatchOptions {
            server: GeneratorConfig {
                api_version: String::new(),
                ..GeneratorConfig::default()
            },
            generate_client: false,
        };
        let inputs = vec![SpecInput::new("shop", "title: Shop\n/items:\n  get:\n")];
        let outcome = run_batch(&inputs, &options, &registry());
        assert_eq!(outcome.failures[0].stage, FailureStage::ServerGeneration);
        assert!(outcome.files.is_empty());
    }

    #[test]
    fn test_client_failure_keeps_server_files() {
        let options = BatchOptions {
            generate_client: true,
            ..BatchOptions::default()
        };
        let inputs = vec![SpecInput::new("shop", "title: Shop\n/items:\n  get:\n")];
        let registry = registry();
        let outcome = run_batch_with(&inputs, &options, &registry, &BrokenClient);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].stage, FailureStage::ClientGeneration);
        assert!(outcome.failures[0].message.contains("client backend unavailable"));
        assert!(outcome.files.contains_key("shop-flask/app/__init__.py"));
        assert!(outcome.files.keys().all(|p| !p.starts_with("shop-client/")));
    }

    #[test]
    fn test_malformed_client_is_rejected_by_validator() {
        let options = BatchOptions {
            generate_client: true,
            ..BatchOptions::default()
        };
        let inputs = vec![SpecInput::new("shop", "title: Shop\n/items:\n  get:\n")];
        let registry = registry();
        let outcome = run_batch_with(&inputs, &options, &registry, &MalformedClient);
        assert_eq!(outcome.failures[0].stage, FailureStage::ClientGeneration);
        assert!(outcome.failures[0].message.contains("pkg/__init__.py"));
        assert!(outcome.files.keys().all(|p| !p.starts_with("shop-client/")));
    }

    #[test]
    fn test_client_files_are_prefixed() {
        let options = BatchOptions {
            generate_client: true,
            ..BatchOptions::default()
        };
        let inputs = vec![SpecInput::new("shop", "title: Shop\n/items:\n  get:\n")];
        let outcome = run_batch(&inputs, &options, &registry());
        assert!(outcome.is_success(), "{:?}", outcome.failures);
        assert!(outcome.files.contains_key("shop-client/shop_client/__init__.py"));
        assert!(outcome.files.contains_key("shop-client/setup.py"));
    }

    #[test]
    fn test_duplicate_names_do_not_overwrite() {
        let inputs = vec![
            SpecInput::new("shop", "title: First\n/items:\n  get:\n"),
            SpecInput::new("shop", "title: Second\n/items:\n  get:\n"),
        ];
        let outcome = run_batch(&inputs, &BatchOptions::default(), &registry());
        assert_eq!(outcome.succeeded, vec!["shop".to_string(), "shop_1".to_string()]);
        assert!(outcome.files["shop-flask/README.md"].contains("First"));
        assert!(outcome.files["shop_1-flask/README.md"].contains("Second"));
    }
}
