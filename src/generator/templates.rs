use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use super::error::GenerateError;
use super::group::ResourceGroup;
use super::naming::{docstring_text, python_string_literal, CanonicalName};
use super::schema::FieldDescriptor;

/// Every template compiled into the registry, by registered name
const TEMPLATES: &[(&str, &str)] = &[
    ("server/app_init.py", include_str!("../../templates/server/app_init.py.jinja")),
    ("server/config.py", include_str!("../../templates/server/config.py.jinja")),
    ("server/extensions_init.py", include_str!("../../templates/server/extensions_init.py.jinja")),
    ("server/extensions_db.py", include_str!("../../templates/server/extensions_db.py.jinja")),
    ("server/errors_init.py", include_str!("../../templates/server/errors_init.py.jinja")),
    ("server/error_handlers.py", include_str!("../../templates/server/error_handlers.py.jinja")),
    ("server/utils_init.py", include_str!("../../templates/server/utils_init.py.jinja")),
    ("server/resources_init.py", include_str!("../../templates/server/resources_init.py.jinja")),
    ("server/group_init.py", include_str!("../../templates/server/group_init.py.jinja")),
    ("server/model.py", include_str!("../../templates/server/model.py.jinja")),
    ("server/schema.py", include_str!("../../templates/server/schema.py.jinja")),
    ("server/service.py", include_str!("../../templates/server/service.py.jinja")),
    ("server/routes.py", include_str!("../../templates/server/routes.py.jinja")),
    ("server/api_init.py", include_str!("../../templates/server/api_init.py.jinja")),
    ("server/run.py", include_str!("../../templates/server/run.py.jinja")),
    ("server/wsgi.py", include_str!("../../templates/server/wsgi.py.jinja")),
    ("server/requirements.txt", include_str!("../../templates/server/requirements.txt.jinja")),
    ("server/env.example", include_str!("../../templates/server/env.example.jinja")),
    ("server/gitignore", include_str!("../../templates/server/gitignore.jinja")),
    ("server/README.md", include_str!("../../templates/server/README.md.jinja")),
    ("server/tests_init.py", include_str!("../../templates/server/tests_init.py.jinja")),
    ("server/conftest.py", include_str!("../../templates/server/conftest.py.jinja")),
    ("server/pytest.ini", include_str!("../../templates/server/pytest.ini.jinja")),
    ("server/test_group.py", include_str!("../../templates/server/test_group.py.jinja")),
    ("client/package_init.py", include_str!("../../templates/client/package_init.py.jinja")),
    ("client/base_client.py", include_str!("../../templates/client/base_client.py.jinja")),
    ("client/exceptions.py", include_str!("../../templates/client/exceptions.py.jinja")),
    ("client/models.py", include_str!("../../templates/client/models.py.jinja")),
    ("client/resources_init.py", include_str!("../../templates/client/resources_init.py.jinja")),
    ("client/group_init.py", include_str!("../../templates/client/group_init.py.jinja")),
    ("client/group_client.py", include_str!("../../templates/client/group_client.py.jinja")),
    ("client/conftest.py", include_str!("../../templates/client/conftest.py.jinja")),
    ("client/test_group.py", include_str!("../../templates/client/test_group.py.jinja")),
    (
        "client/test_integration.py",
        include_str!("../../templates/client/test_integration.py.jinja"),
    ),
    ("client/setup.py", include_str!("../../templates/client/setup.py.jinja")),
    ("client/requirements.txt", include_str!("../../templates/client/requirements.txt.jinja")),
    ("client/pytest.ini", include_str!("../../templates/client/pytest.ini.jinja")),
    ("client/gitignore", include_str!("../../templates/client/gitignore.jinja")),
    ("client/README.md", include_str!("../../templates/client/README.md.jinja")),
    ("client/basic_usage.py", include_str!("../../templates/client/basic_usage.py.jinja")),
];

/// Template data shared by every server artifact
#[derive(Debug, Clone, Serialize)]
pub struct ServerTemplateData<'a> {
    pub app_name: &'a str,
    pub app_title: String,
    pub api_version: &'a str,
    pub include_auth: bool,
    pub include_cors: bool,
    pub generate_tests: bool,
    /// Document title
    pub title: &'a str,
    pub description: &'a str,
    pub version: &'a str,
    pub groups: &'a [ResourceGroup],
}

/// One field as declared on the marshmallow schema
#[derive(Debug, Clone, Serialize)]
pub struct SchemaField {
    pub attr: String,
    pub field: String,
    /// Keyword arguments, already rendered (`required=True, data_key='first-name'`)
    pub args: String,
}

/// Template data for the per-group server artifacts
#[derive(Debug, Clone, Serialize)]
pub struct GroupTemplateData<'a> {
    pub server: &'a ServerTemplateData<'a>,
    pub group: &'a ResourceGroup,
    pub name: &'a CanonicalName,
    /// Model lacks an `id` attribute and gets an autoincrement key
    pub surrogate_id: bool,
    pub uses_datetime: bool,
    pub schema_fields: Vec<SchemaField>,
    pub search_field: Option<&'a FieldDescriptor>,
    /// Python dict literal posted by generated tests
    pub sample_payload: String,
    pub any_secured: bool,
}

/// A dataclass emitted into the client `models.py`
#[derive(Debug, Clone, Serialize)]
pub struct ModelTemplateData {
    pub class_name: String,
    pub description: String,
    pub fields: Vec<FieldDescriptor>,
}

/// One call shown in the client usage example
#[derive(Debug, Clone, Serialize)]
pub struct ExampleCall {
    pub accessor: String,
    pub operation: String,
    pub args: String,
}

/// Template data shared by every client artifact
#[derive(Debug, Clone, Serialize)]
pub struct ClientTemplateData<'a> {
    pub package: String,
    /// Distribution name (`orders-api-client`)
    pub dist_name: String,
    pub client_class: String,
    pub include_auth: bool,
    pub generate_tests: bool,
    pub title: &'a str,
    pub description: &'a str,
    /// PEP 440 version derived from the document version
    pub package_version: String,
    pub base_url: String,
    pub groups: &'a [ResourceGroup],
    pub models: Vec<ModelTemplateData>,
    pub examples: Vec<ExampleCall>,
}

/// Template data for the per-group client artifacts
#[derive(Debug, Clone, Serialize)]
pub struct ClientGroupTemplateData<'a> {
    pub client: &'a ClientTemplateData<'a>,
    pub group: &'a ResourceGroup,
    pub name: &'a CanonicalName,
    pub sample_payload: String,
}

/// Compiled templates for every artifact kind
///
/// Built once and shared by reference with the generators. Each artifact
/// kind has its own render function.
pub struct TemplateRegistry {
    env: Environment<'static>,
}

impl TemplateRegistry {
    /// Compile every embedded template
    ///
    /// # Errors
    ///
    /// [`GenerateError::Template`] naming the first template that fails to compile.
    pub fn new() -> Result<Self, GenerateError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("pystr", |value: String| python_string_literal(&value));
        env.add_filter("docstring", |value: String| docstring_text(&value));
        env.add_filter("pybool", |value: bool| if value { "True" } else { "False" });
        for (name, source) in TEMPLATES {
            env.add_template(*name, *source)
                .map_err(|e| GenerateError::template(name, &e))?;
        }
        Ok(Self { env })
    }

    /// Names of all registered templates
    pub fn template_names(&self) -> impl Iterator<Item = &'static str> {
        TEMPLATES.iter().map(|(name, _)| *name)
    }

    fn render<S: Serialize>(&self, name: &str, data: &S) -> Result<String, GenerateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| GenerateError::template(name, &e))?;
        template
            .render(data)
            .map_err(|e| GenerateError::template(name, &e))
    }

    pub fn render_app_init(&self, data: &ServerTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/app_init.py", data)
    }

    pub fn render_app_config(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/config.py", data)
    }

    pub fn render_extensions_init(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/extensions_init.py", data)
    }

    pub fn render_extensions_db(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/extensions_db.py", data)
    }

    pub fn render_errors_init(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/errors_init.py", data)
    }

    pub fn render_error_handlers(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/error_handlers.py", data)
    }

    pub fn render_utils_init(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/utils_init.py", data)
    }

    pub fn render_resources_init(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/resources_init.py", data)
    }

    pub fn render_group_init(&self, data: &GroupTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/group_init.py", data)
    }

    pub fn render_model(&self, data: &GroupTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/model.py", data)
    }

    pub fn render_schema(&self, data: &GroupTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/schema.py", data)
    }

    pub fn render_service(&self, data: &GroupTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/service.py", data)
    }

    pub fn render_routes(&self, data: &GroupTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/routes.py", data)
    }

    pub fn render_api_init(&self, data: &ServerTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/api_init.py", data)
    }

    pub fn render_run(&self, data: &ServerTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/run.py", data)
    }

    pub fn render_wsgi(&self, data: &ServerTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/wsgi.py", data)
    }

    /// Dependency manifest; `dev` adds the test toolchain
    pub fn render_requirements(
        &self,
        data: &ServerTemplateData<'_>,
        dev: bool,
    ) -> Result<String, GenerateError> {
        self.render(
            "server/requirements.txt",
            &minijinja::context! {
                include_auth => data.include_auth,
                include_cors => data.include_cors,
                dev,
            },
        )
    }

    pub fn render_env_example(&self) -> Result<String, GenerateError> {
        self.render("server/env.example", &minijinja::context! {})
    }

    pub fn render_gitignore(&self) -> Result<String, GenerateError> {
        self.render("server/gitignore", &minijinja::context! {})
    }

    pub fn render_readme(&self, data: &ServerTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/README.md", data)
    }

    pub fn render_tests_init(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/tests_init.py", data)
    }

    pub fn render_conftest(&self, data: &ServerTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/conftest.py", data)
    }

    pub fn render_pytest_ini(
        &self,
        data: &ServerTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("server/pytest.ini", data)
    }

    pub fn render_group_test(&self, data: &GroupTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("server/test_group.py", data)
    }

    pub fn render_client_package_init(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/package_init.py", data)
    }

    pub fn render_base_client(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/base_client.py", data)
    }

    pub fn render_exceptions(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/exceptions.py", data)
    }

    pub fn render_models(&self, data: &ClientTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("client/models.py", data)
    }

    pub fn render_client_resources_init(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/resources_init.py", data)
    }

    pub fn render_client_group_init(
        &self,
        data: &ClientGroupTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/group_init.py", data)
    }

    pub fn render_group_client(
        &self,
        data: &ClientGroupTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/group_client.py", data)
    }

    pub fn render_client_conftest(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/conftest.py", data)
    }

    pub fn render_client_group_test(
        &self,
        data: &ClientGroupTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/test_group.py", data)
    }

    pub fn render_client_integration_test(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/test_integration.py", data)
    }

    pub fn render_setup_py(&self, data: &ClientTemplateData<'_>) -> Result<String, GenerateError> {
        self.render("client/setup.py", data)
    }

    /// Client dependency manifest; `dev` adds the test toolchain
    pub fn render_client_requirements(&self, dev: bool) -> Result<String, GenerateError> {
        self.render("client/requirements.txt", &minijinja::context! { dev })
    }

    pub fn render_client_pytest_ini(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/pytest.ini", data)
    }

    pub fn render_client_gitignore(&self) -> Result<String, GenerateError> {
        self.render("client/gitignore", &minijinja::context! {})
    }

    pub fn render_client_readme(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/README.md", data)
    }

    pub fn render_basic_usage(
        &self,
        data: &ClientTemplateData<'_>,
    ) -> Result<String, GenerateError> {
        self.render("client/basic_usage.py", data)
    }
}
