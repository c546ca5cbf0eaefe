use tracing::{debug, info};

use super::config::GeneratorConfig;
use super::error::GenerateError;
use super::group::{group_resources, ResourceGroup};
use super::naming::python_string_literal;
use super::schema::{sample_payload, search_field, FieldDescriptor};
use super::templates::{GroupTemplateData, SchemaField, ServerTemplateData, TemplateRegistry};
use super::GeneratedFiles;
use crate::spec::Specification;

/// Flask application generator
///
/// Borrows the shared [`TemplateRegistry`]; one instance can generate any
/// number of specifications.
pub struct ServerGenerator<'r> {
    registry: &'r TemplateRegistry,
    config: GeneratorConfig,
}

impl<'r> ServerGenerator<'r> {
    pub fn new(registry: &'r TemplateRegistry, config: GeneratorConfig) -> Self {
        Self { registry, config }
    }

    /// Generate the full Flask artifact set for `spec`
    ///
    /// Paths are relative to the project root and use `/` separators.
    ///
    /// # Errors
    ///
    /// [`GenerateError::InvalidConfig`] before anything is rendered, or
    /// [`GenerateError::Template`] for the first artifact that fails.
    pub fn generate(&self, spec: &Specification) -> Result<GeneratedFiles, GenerateError> {
        self.config.validate()?;
        let groups = group_resources(spec, &self.config.api_version);
        let data = ServerTemplateData {
            app_name: &self.config.app_name,
            app_title: self.config.app_title(),
            api_version: &self.config.api_version,
            include_auth: self.config.include_auth,
            include_cors: self.config.include_cors,
            generate_tests: self.config.generate_tests,
            title: &spec.title,
            description: &spec.description,
            version: &spec.version,
            groups: &groups,
        };

        let r = self.registry;
        let mut files = GeneratedFiles::new();
        files.insert("app/__init__.py".into(), r.render_app_init(&data)?);
        files.insert("app/config.py".into(), r.render_app_config(&data)?);
        files.insert("app/extensions/__init__.py".into(), r.render_extensions_init(&data)?);
        files.insert("app/extensions/db.py".into(), r.render_extensions_db(&data)?);
        files.insert("app/errors/__init__.py".into(), r.render_errors_init(&data)?);
        files.insert("app/errors/handlers.py".into(), r.render_error_handlers(&data)?);
        files.insert("app/utils/__init__.py".into(), r.render_utils_init(&data)?);
        files.insert("app/resources/__init__.py".into(), r.render_resources_init(&data)?);
        files.insert("app/api/__init__.py".into(), r.render_api_init(&data)?);

        for group in &groups {
            let group_data = group_template_data(&data, group);
            let dir = format!("app/resources/{}", group.name.snake);
            files.insert(format!("{dir}/__init__.py"), r.render_group_init(&group_data)?);
            files.insert(format!("{dir}/model.py"), r.render_model(&group_data)?);
            files.insert(format!("{dir}/schema.py"), r.render_schema(&group_data)?);
            files.insert(format!("{dir}/service.py"), r.render_service(&group_data)?);
            files.insert(format!("{dir}/routes.py"), r.render_routes(&group_data)?);
            if self.config.generate_tests {
                files.insert(
                    format!("tests/test_{}.py", group.name.snake),
                    r.render_group_test(&group_data)?,
                );
            }
            debug!(
                group = %group.name.snake,
                endpoints = group.endpoints.len(),
                "rendered group artifacts"
            );
        }

        files.insert("run.py".into(), r.render_run(&data)?);
        files.insert("wsgi.py".into(), r.render_wsgi(&data)?);
        files.insert("requirements.txt".into(), r.render_requirements(&data, false)?);
        files.insert("requirements-dev.txt".into(), r.render_requirements(&data, true)?);
        files.insert(".env.example".into(), r.render_env_example()?);
        files.insert(".gitignore".into(), r.render_gitignore()?);
        files.insert("README.md".into(), r.render_readme(&data)?);

        if self.config.generate_tests {
            files.insert("tests/__init__.py".into(), r.render_tests_init(&data)?);
            files.insert("tests/conftest.py".into(), r.render_conftest(&data)?);
            files.insert("pytest.ini".into(), r.render_pytest_ini(&data)?);
        }

        info!(
            title = %spec.title,
            groups = groups.len(),
            files = files.len(),
            "generated server artifacts"
        );
        Ok(files)
    }
}

fn group_template_data<'a>(
    server: &'a ServerTemplateData<'a>,
    group: &'a ResourceGroup,
) -> GroupTemplateData<'a> {
    GroupTemplateData {
        server,
        group,
        name: &group.name,
        surrogate_id: !group.fields.iter().any(|f| f.attr == "id"),
        uses_datetime: group
            .fields
            .iter()
            .any(|f| f.default.as_deref().is_some_and(|d| d.starts_with("datetime."))),
        schema_fields: group.fields.iter().map(schema_field).collect(),
        search_field: search_field(&group.fields),
        sample_payload: sample_payload(&group.fields),
        any_secured: group.operations().any(|(_, op)| op.secured),
    }
}

/// marshmallow declaration for one descriptor
///
/// Integer primary keys and defaulted columns are server-assigned and only
/// dumped.
pub(crate) fn schema_field(field: &FieldDescriptor) -> SchemaField {
    let dump_only =
        (field.primary_key && field.column_type == "db.Integer") || field.default.is_some();
    let mut args = Vec::new();
    if dump_only {
        args.push("dump_only=True".to_string());
    } else if field.required {
        args.push("required=True".to_string());
    } else {
        args.push("allow_none=True".to_string());
    }
    if field.is_renamed() {
        args.push(format!("data_key={}", python_string_literal(&field.key)));
    }
    SchemaField {
        attr: field.attr.clone(),
        field: field.marshmallow_field.clone(),
        args: args.join(", "),
    }
}
