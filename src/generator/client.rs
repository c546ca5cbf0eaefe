use std::collections::HashSet;
use tracing::{debug, info};

use super::config::ClientConfig;
use super::error::GenerateError;
use super::group::{group_resources, ResourceGroup};
use super::naming::{unique_name, CanonicalName};
use super::schema::{sample_payload, type_fields};
use super::templates::{
    ClientGroupTemplateData, ClientTemplateData, ExampleCall, ModelTemplateData, TemplateRegistry,
};
use super::GeneratedFiles;
use crate::spec::Specification;

/// Host used when the document's base URI is relative
pub const DEFAULT_CLIENT_HOST: &str = "http://localhost:5000";

/// Names the generated `models.py` already binds
const TAKEN_MODEL_NAMES: &[&str] = &["Any", "Optional", "dataclass"];

/// Backend that turns a specification into a client library
///
/// The batch pipeline only talks to this trait, so a different client
/// flavor (or a test double) can be plugged in without touching it.
pub trait ClientLibraryGenerator {
    /// Generate the client artifact set for `spec`
    ///
    /// # Errors
    ///
    /// Any [`GenerateError`] the backend raises; the pipeline records it as a
    /// client generation failure.
    fn generate_client(
        &self,
        spec: &Specification,
        config: &ClientConfig,
    ) -> Result<GeneratedFiles, GenerateError>;
}

impl ClientLibraryGenerator for TemplateRegistry {
    fn generate_client(
        &self,
        spec: &Specification,
        config: &ClientConfig,
    ) -> Result<GeneratedFiles, GenerateError> {
        ClientGenerator::new(self, config.clone()).generate(spec)
    }
}

/// Python `requests` client generator
pub struct ClientGenerator<'r> {
    registry: &'r TemplateRegistry,
    config: ClientConfig,
}

impl<'r> ClientGenerator<'r> {
    pub fn new(registry: &'r TemplateRegistry, config: ClientConfig) -> Self {
        Self { registry, config }
    }

    /// Generate the client package, its tests and packaging files
    ///
    /// Resource groups and operation names match the server generated from
    /// the same document.
    pub fn generate(&self, spec: &Specification) -> Result<GeneratedFiles, GenerateError> {
        self.config.validate()?;
        // URIs are kept whole on the client, so no version prefix is stripped
        let groups = group_resources(spec, "");
        let package = self.config.package();
        let data = ClientTemplateData {
            dist_name: package.replace('_', "-"),
            client_class: aggregate_class_name(&self.config.client_class(), &groups),
            package: package.clone(),
            include_auth: self.config.include_auth,
            generate_tests: self.config.generate_tests,
            title: &spec.title,
            description: &spec.description,
            package_version: package_version(&spec.version),
            base_url: client_base_url(&spec.base_uri, &spec.version),
            groups: &groups,
            models: models(spec),
            examples: examples(&groups),
        };

        let r = self.registry;
        let mut files = GeneratedFiles::new();
        files.insert(format!("{package}/__init__.py"), r.render_client_package_init(&data)?);
        files.insert(format!("{package}/base_client.py"), r.render_base_client(&data)?);
        files.insert(format!("{package}/exceptions.py"), r.render_exceptions(&data)?);
        if !data.models.is_empty() {
            files.insert(format!("{package}/models.py"), r.render_models(&data)?);
        }
        files.insert(
            format!("{package}/resources/__init__.py"),
            r.render_client_resources_init(&data)?,
        );

        for group in &groups {
            let group_data = ClientGroupTemplateData {
                client: &data,
                group,
                name: &group.name,
                sample_payload: sample_payload(&group.fields),
            };
            let dir = format!("{package}/resources/{}", group.name.snake);
            files.insert(format!("{dir}/__init__.py"), r.render_client_group_init(&group_data)?);
            files.insert(format!("{dir}/client.py"), r.render_group_client(&group_data)?);
            if self.config.generate_tests {
                files.insert(
                    format!("tests/test_{}.py", group.name.snake),
                    r.render_client_group_test(&group_data)?,
                );
            }
            debug!(group = %group.name.snake, "rendered client group");
        }

        if self.config.generate_tests {
            files.insert("tests/__init__.py".into(), String::new());
            files.insert("tests/conftest.py".into(), r.render_client_conftest(&data)?);
            // Kept out of `tests/` so no `test_<group>.py` can shadow it
            files.insert("tests/integration/__init__.py".into(), String::new());
            files.insert(
                "tests/integration/test_client.py".into(),
                r.render_client_integration_test(&data)?,
            );
        }

        files.insert("setup.py".into(), r.render_setup_py(&data)?);
        files.insert("requirements.txt".into(), r.render_client_requirements(false)?);
        files.insert("requirements-dev.txt".into(), r.render_client_requirements(true)?);
        files.insert("pytest.ini".into(), r.render_client_pytest_ini(&data)?);
        files.insert(".gitignore".into(), r.render_client_gitignore()?);
        files.insert("README.md".into(), r.render_client_readme(&data)?);
        files.insert("examples/__init__.py".into(), String::new());
        files.insert("examples/basic_usage.py".into(), r.render_basic_usage(&data)?);

        info!(
            package = %package,
            groups = groups.len(),
            files = files.len(),
            "generated client artifacts"
        );
        Ok(files)
    }
}

/// Aggregate class name, kept apart from the per-group `<Pascal>Client` classes
fn aggregate_class_name(preferred: &str, groups: &[ResourceGroup]) -> String {
    let clashes = groups
        .iter()
        .any(|g| format!("{}Client", g.name.pascal) == preferred);
    if clashes {
        format!("{preferred}Api")
    } else {
        preferred.to_string()
    }
}

/// PEP 440 release version for a document version
///
/// ```rust
/// use apiforge::generator::package_version;
/// assert_eq!(package_version("v2"), "2");
/// assert_eq!(package_version("1.0"), "1.0");
/// assert_eq!(package_version("beta"), "0.1.0");
/// ```
pub fn package_version(version: &str) -> String {
    let trimmed = version.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let valid = !bare.is_empty()
        && bare.split('.').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if valid {
        bare.to_string()
    } else {
        "0.1.0".to_string()
    }
}

/// Default base URL baked into the client
///
/// `{version}` is substituted; relative URIs are anchored at
/// [`DEFAULT_CLIENT_HOST`].
pub fn client_base_url(base_uri: &str, version: &str) -> String {
    let uri = base_uri.replace("{version}", version);
    let uri = uri.trim_end_matches('/');
    if uri.starts_with("http://") || uri.starts_with("https://") {
        uri.to_string()
    } else if uri.is_empty() {
        DEFAULT_CLIENT_HOST.to_string()
    } else {
        format!("{DEFAULT_CLIENT_HOST}/{}", uri.trim_start_matches('/'))
    }
}

/// One dataclass per declared type, in declaration order
fn models(spec: &Specification) -> Vec<ModelTemplateData> {
    let mut seen: HashSet<String> = TAKEN_MODEL_NAMES.iter().map(|s| s.to_string()).collect();
    spec.types
        .iter()
        .map(|type_def| {
            let pascal = CanonicalName::derive(&type_def.name).pascal;
            ModelTemplateData {
                class_name: unique_name(&mut seen, &pascal),
                description: type_def.description.clone(),
                fields: type_fields(&type_def.properties, &type_def.required),
            }
        })
        .collect()
}

/// First GET of every group, called with sample path arguments
fn examples(groups: &[ResourceGroup]) -> Vec<ExampleCall> {
    groups
        .iter()
        .filter_map(|group| {
            let (endpoint, op) = group.operations().find(|(_, op)| op.verb == "GET")?;
            Some(ExampleCall {
                accessor: group.name.camel.clone(),
                operation: op.name.clone(),
                args: endpoint
                    .params
                    .iter()
                    .map(|p| p.sample.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        })
        .collect()
}
