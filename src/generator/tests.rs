#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::schema::{sample_payload, search_field};
use super::server::schema_field;
use super::*;
use crate::spec::{parse, Specification};
use std::collections::HashSet;

const USERS_RAML: &str = r#"#%RAML 1.0
title: User Service
version: v1
baseUri: https://api.example.com/{version}
/users:
  get:
  post:
  /{userId}:
    uriParameters:
      userId:
        type: integer
    get:
    put:
    delete:
      securedBy: [oauth_2_0]
"#;

fn spec(raml: &str) -> Specification {
    parse(raml, None).expect("fixture parses")
}

fn server_files(raml: &str, config: GeneratorConfig) -> GeneratedFiles {
    let registry = TemplateRegistry::new().unwrap();
    ServerGenerator::new(&registry, config)
        .generate(&spec(raml))
        .unwrap()
}

fn client_files(raml: &str, config: ClientConfig) -> GeneratedFiles {
    let registry = TemplateRegistry::new().unwrap();
    ClientGenerator::new(&registry, config)
        .generate(&spec(raml))
        .unwrap()
}

#[test]
fn test_registry_compiles_every_template() {
    let registry = TemplateRegistry::new().unwrap();
    assert_eq!(registry.template_names().count(), 40);
}

#[test]
fn test_to_snake_case() {
    assert_eq!(to_snake_case("UserProfiles"), "user_profiles");
    assert_eq!(to_snake_case("userProfile-ID"), "user_profile_id");
    assert_eq!(to_snake_case("HTTPServer"), "http_server");
    assert_eq!(to_snake_case("--a--b--"), "a_b");
    assert_eq!(to_snake_case(""), "");
}

#[test]
fn test_pascal_and_camel_case() {
    assert_eq!(to_pascal_case("user_profiles"), "UserProfiles");
    assert_eq!(to_pascal_case("order-items"), "OrderItems");
    assert_eq!(to_camel_case("user_profiles"), "userProfiles");
    assert_eq!(to_camel_case(""), "");
}

#[test]
fn test_python_identifier() {
    assert_eq!(python_identifier("class", "x"), "class_");
    assert_eq!(python_identifier("2fa", "field"), "field_2fa");
    assert_eq!(python_identifier("", "resource"), "resource");
    assert_eq!(python_identifier("users", "resource"), "users");
    assert!(is_python_keyword("lambda"));
    assert!(!is_python_keyword("users"));
}

#[test]
fn test_canonical_name_derivation() {
    let name = CanonicalName::derive("user-profiles");
    assert_eq!(name.raw, "user-profiles");
    assert_eq!(name.snake, "user_profiles");
    assert_eq!(name.pascal, "UserProfiles");
    assert_eq!(name.camel, "userProfiles");

    let keyword = CanonicalName::derive("class");
    assert_eq!(keyword.snake, "class_");
    assert_eq!(keyword.pascal, "Class");
    assert_eq!(keyword.camel, "class_");

    let member = CanonicalName::derive("close");
    assert_eq!(member.snake, "close");
    assert_eq!(member.pascal, "Close");
    assert_eq!(member.camel, "close_");
}

#[test]
fn test_unique_name() {
    let mut seen = HashSet::new();
    assert_eq!(unique_name(&mut seen, "foo"), "foo");
    assert_eq!(unique_name(&mut seen, "foo"), "foo_1");
    assert_eq!(unique_name(&mut seen, "foo"), "foo_2");
    assert_eq!(unique_name(&mut seen, "bar"), "bar");
}

#[test]
fn test_python_string_literal() {
    assert_eq!(python_string_literal("plain"), "'plain'");
    assert_eq!(python_string_literal("it's"), r"'it\'s'");
    assert_eq!(python_string_literal("a\nb"), r"'a\nb'");
    assert_eq!(python_string_literal(r"c:\tmp"), r"'c:\\tmp'");
}

#[test]
fn test_group_name_for_uri() {
    assert_eq!(group_name_for_uri("/users"), "users");
    assert_eq!(group_name_for_uri("/users/{id}"), "users");
    assert_eq!(group_name_for_uri("/a/{id}/b/{bid}"), "b");
    assert_eq!(group_name_for_uri("/{id}"), FALLBACK_GROUP);
    assert_eq!(group_name_for_uri("/"), FALLBACK_GROUP);
}

#[test]
fn test_groups_follow_first_appearance() {
    let spec = spec("title: T\n/orders:\n  get:\n/users:\n  get:\n/orders/{id}:\n  get:\n");
    let groups = group_resources(&spec, "v1");
    let names: Vec<&str> = groups.iter().map(|g| g.name.snake.as_str()).collect();
    assert_eq!(names, vec!["orders", "users"]);
    assert_eq!(groups[0].endpoints.len(), 2);
}

#[test]
fn test_operation_names() {
    let groups = group_resources(&spec(USERS_RAML), "v1");
    assert_eq!(groups.len(), 1);
    let names: Vec<&str> = groups[0].operations().map(|(_, op)| op.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "list_users",
            "create_users",
            "get_users_by_user_id",
            "update_users_by_user_id",
            "delete_users_by_user_id",
        ]
    );
}

#[test]
fn test_duplicate_operation_names_get_suffix() {
    let groups = group_resources(&spec("title: T\n/a/users:\n  get:\n/b/users:\n  get:\n"), "v1");
    let names: Vec<&str> = groups[0].operations().map(|(_, op)| op.name.as_str()).collect();
    assert_eq!(names, vec!["list_users", "list_users_1"]);
}

#[test]
fn test_route_params_and_flask_path() {
    let groups = group_resources(&spec(USERS_RAML), "v1");
    let item = &groups[0].endpoints[1];
    assert_eq!(item.uri, "/users/{userId}");
    assert_eq!(item.params[0].arg, "user_id");
    assert_eq!(item.params[0].converter, "int");
    assert_eq!(item.route_path, "/users/<int:user_id>");
    assert_eq!(item.test_path, "/users/1");
    assert_eq!(item.client_path, "f'/users/{user_id}'");
    assert_eq!(item.id_arg.as_deref(), Some("user_id"));
}

#[test]
fn test_reserved_path_args_are_renamed() {
    let groups = group_resources(&spec("title: T\n/things/{data}/{self}:\n  get:\n"), "v1");
    let endpoint = &groups[0].endpoints[0];
    assert_eq!(endpoint.args, "data_, self_");
    assert_eq!(endpoint.route_path, "/things/<data_>/<self_>");
}

#[test]
fn test_version_prefix_is_stripped() {
    assert_eq!(strip_version_prefix("/v1/users", "v1"), "/users");
    assert_eq!(strip_version_prefix("/v2/users", "v1"), "/v2/users");
    let groups = group_resources(&spec("title: T\n/v1/users:\n  get:\n"), "v1");
    assert_eq!(groups[0].endpoints[0].route_path, "/users");
    assert_eq!(groups[0].name.snake, "users");
}

#[test]
fn test_parameter_only_uri_falls_back_to_resource() {
    let files = server_files("title: T\n/{id}:\n  get:\n", GeneratorConfig::default());
    assert!(files.contains_key("app/resources/resource/routes.py"));
    assert!(files["app/resources/resource/routes.py"].contains("def get_resource_by_id(id):"));
}

#[test]
fn test_keyword_group_is_suffixed() {
    let files = server_files("title: T\n/class:\n  get:\n", GeneratorConfig::default());
    assert!(files.contains_key("app/resources/class_/model.py"));
    assert!(files["app/api/__init__.py"]
        .contains("from app.resources.class_ import routes as class__routes"));
}

#[test]
fn test_type_def_fields_win_over_observed() {
    let raml = r#"title: T
types:
  users:
    properties:
      email: string
      age: integer
/users:
  post:
    body:
      application/json:
        properties:
          nickname: string
"#;
    let groups = group_resources(&spec(raml), "v1");
    assert_eq!(groups[0].field_source, FieldSource::TypeDef);
    let attrs: Vec<&str> = groups[0].fields.iter().map(|f| f.attr.as_str()).collect();
    assert_eq!(attrs, vec!["email", "age"]);
    assert_eq!(groups[0].fields[1].column_type, "db.Integer");
}

#[test]
fn test_observed_fields_when_no_type() {
    let raml = r#"title: T
/users:
  post:
    body:
      application/json:
        properties:
          nickname: string
          score: integer
"#;
    let groups = group_resources(&spec(raml), "v1");
    assert_eq!(groups[0].field_source, FieldSource::Observed);
    let attrs: Vec<&str> = groups[0].fields.iter().map(|f| f.attr.as_str()).collect();
    assert_eq!(attrs, vec!["nickname", "score"]);
    assert!(groups[0].fields.iter().all(|f| f.column_type == "db.String(255)"));
}

#[test]
fn test_default_fields_without_information() {
    let groups = group_resources(&spec("title: T\n/widgets:\n  get:\n"), "v1");
    assert_eq!(groups[0].field_source, FieldSource::Default);
    assert_eq!(groups[0].fields, default_fields());
    let attrs: Vec<&str> = groups[0].fields.iter().map(|f| f.attr.as_str()).collect();
    assert_eq!(attrs, vec!["id", "name", "created_at"]);
}

#[test]
fn test_empty_matching_type_uses_defaults() {
    let groups = group_resources(
        &spec("title: T\ntypes:\n  widgets: object\n/widgets:\n  get:\n"),
        "v1",
    );
    assert_eq!(groups[0].field_source, FieldSource::Default);
}

#[test]
fn test_column_types() {
    assert_eq!(column_type_for("string"), "db.String(255)");
    assert_eq!(column_type_for("integer"), "db.Integer");
    assert_eq!(column_type_for("number"), "db.Float");
    assert_eq!(column_type_for("boolean"), "db.Boolean");
    assert_eq!(column_type_for("datetime"), "db.DateTime");
    assert_eq!(column_type_for("date-only"), "db.Date");
    assert_eq!(column_type_for("string[]"), "db.JSON");
    assert_eq!(column_type_for("Address"), "db.String(255)");
    assert_eq!(marshmallow_field_for("db.JSON"), "fields.Raw");
    assert_eq!(marshmallow_field_for("db.String(255)"), "fields.String");
}

#[test]
fn test_reserved_and_renamed_attributes() {
    let mut seen = HashSet::new();
    let metadata = FieldDescriptor::new(&mut seen, "metadata", "object", false);
    assert_eq!(metadata.attr, "metadata_");
    let first = FieldDescriptor::new(&mut seen, "first-name", "string", true);
    assert_eq!(first.attr, "first_name");
    assert!(first.is_renamed());
    let optional = FieldDescriptor::new(&mut seen, "nick?", "string", false);
    assert_eq!(optional.attr, "nick");
}

#[test]
fn test_schema_field_arguments() {
    let mut seen = HashSet::new();
    let id = FieldDescriptor::new(&mut seen, "id", "integer", true);
    assert_eq!(schema_field(&id).args, "dump_only=True");
    let first = FieldDescriptor::new(&mut seen, "first-name", "string", true);
    assert_eq!(schema_field(&first).args, "required=True, data_key='first-name'");
    let bio = FieldDescriptor::new(&mut seen, "bio", "string", false);
    assert_eq!(schema_field(&bio).args, "allow_none=True");
    assert_eq!(schema_field(&bio).field, "fields.String");
}

#[test]
fn test_sample_payload_skips_server_assigned_fields() {
    assert_eq!(sample_payload(&default_fields()), "{'name': 'sample name'}");
    assert_eq!(search_field(&default_fields()).map(|f| f.attr.as_str()), Some("name"));
}

#[test]
fn test_server_artifact_set() {
    let files = server_files(USERS_RAML, GeneratorConfig::default());
    for path in [
        "app/__init__.py",
        "app/config.py",
        "app/extensions/__init__.py",
        "app/extensions/db.py",
        "app/errors/__init__.py",
        "app/errors/handlers.py",
        "app/utils/__init__.py",
        "app/resources/__init__.py",
        "app/api/__init__.py",
        "app/resources/users/__init__.py",
        "app/resources/users/model.py",
        "app/resources/users/schema.py",
        "app/resources/users/service.py",
        "app/resources/users/routes.py",
        "run.py",
        "wsgi.py",
        "requirements.txt",
        "requirements-dev.txt",
        ".env.example",
        ".gitignore",
        "README.md",
        "tests/__init__.py",
        "tests/conftest.py",
        "tests/test_users.py",
        "pytest.ini",
    ] {
        assert!(files.contains_key(path), "missing {path}");
    }
    assert!(files["app/__init__.py"].contains("url_prefix='/api/v1'"));
    assert!(files["app/resources/users/schema.py"].contains("class UsersSchema(Schema):"));
    assert!(files["app/resources/users/schema.py"].contains("class UsersListSchema(Schema):"));
    assert!(files["app/resources/users/service.py"].contains("class UsersService:"));
}

#[test]
fn test_routes_declare_exactly_the_document_verbs() {
    let files = server_files(USERS_RAML, GeneratorConfig::default());
    let routes = &files["app/resources/users/routes.py"];
    assert_eq!(routes.matches("@users_bp.route(").count(), 5);
    assert!(routes.contains("@users_bp.route('/users', methods=['GET'])"));
    assert!(routes.contains("@users_bp.route('/users/<int:user_id>', methods=['DELETE'])"));
    assert!(!routes.contains("methods=['PATCH']"));
}

#[test]
fn test_secured_operation_requires_jwt() {
    let files = server_files(USERS_RAML, GeneratorConfig::default());
    let routes = &files["app/resources/users/routes.py"];
    assert_eq!(routes.matches("@jwt_required()").count(), 1);
    assert!(routes.contains("from flask_jwt_extended import jwt_required"));

    let config = GeneratorConfig {
        include_auth: false,
        ..GeneratorConfig::default()
    };
    let files = server_files(USERS_RAML, config);
    assert!(!files["app/resources/users/routes.py"].contains("jwt_required"));
    assert!(!files["app/__init__.py"].contains("jwt"));
}

#[test]
fn test_collection_level_update_is_rejected() {
    let files = server_files("title: T\n/users:\n  put:\n", GeneratorConfig::default());
    assert!(files["app/resources/users/routes.py"].contains("), 405"));
    assert!(files["tests/test_users.py"].contains("assert response.status_code in [405]"));
}

#[test]
fn test_operation_names_are_shared_across_artifacts() {
    let server = server_files(USERS_RAML, GeneratorConfig::default());
    let client = client_files(USERS_RAML, ClientConfig::default());
    let groups = group_resources(&spec(USERS_RAML), "v1");
    for (_, op) in groups[0].operations() {
        assert!(server["app/resources/users/routes.py"].contains(&format!("def {}(", op.name)));
        assert!(server["tests/test_users.py"].contains(&format!("def test_{}(", op.name)));
        assert!(client["api_client/resources/users/client.py"]
            .contains(&format!("def {}(self", op.name)));
        assert!(client["tests/test_users.py"].contains(&format!("def test_{}(", op.name)));
    }
}

#[test]
fn test_generation_is_deterministic() {
    let first = server_files(USERS_RAML, GeneratorConfig::default());
    let second = server_files(USERS_RAML, GeneratorConfig::default());
    assert_eq!(first, second);
    let first = client_files(USERS_RAML, ClientConfig::default());
    let second = client_files(USERS_RAML, ClientConfig::default());
    assert_eq!(first, second);
}

#[test]
fn test_requirements_vary_only_with_flags() {
    let all = server_files(USERS_RAML, GeneratorConfig::default());
    let other = server_files("title: Other\n/items:\n  get:\n", GeneratorConfig::default());
    assert_eq!(all["requirements.txt"], other["requirements.txt"]);
    assert!(all["requirements.txt"].contains("Flask-JWT-Extended>=4.5.0"));
    assert!(all["requirements.txt"].contains("Flask-CORS>=4.0.0"));
    assert!(!all["requirements.txt"].contains("pytest"));
    assert!(all["requirements-dev.txt"].starts_with(all["requirements.txt"].as_str()));
    assert!(all["requirements-dev.txt"].contains("pytest>=7.0.0"));

    let bare = server_files(
        USERS_RAML,
        GeneratorConfig {
            include_auth: false,
            include_cors: false,
            ..GeneratorConfig::default()
        },
    );
    assert!(!bare["requirements.txt"].contains("Flask-JWT-Extended"));
    assert!(!bare["requirements.txt"].contains("Flask-CORS"));
    assert!(bare["requirements.txt"].ends_with("Werkzeug>=2.3.0\n"));
}

#[test]
fn test_fixed_files_are_identical_across_specs() {
    let a = server_files(USERS_RAML, GeneratorConfig::default());
    let b = server_files("title: Other\n/items:\n  get:\n", GeneratorConfig::default());
    assert_eq!(a[".env.example"], b[".env.example"]);
    assert_eq!(a[".gitignore"], b[".gitignore"]);
    assert!(a[".env.example"].starts_with("# Environment variables for local development\n"));
}

#[test]
fn test_tests_disabled() {
    let config = GeneratorConfig {
        generate_tests: false,
        ..GeneratorConfig::default()
    };
    let files = server_files(USERS_RAML, config);
    assert!(files.keys().all(|p| !p.starts_with("tests/")));
    assert!(!files.contains_key("pytest.ini"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let registry = TemplateRegistry::new().unwrap();
    let spec = spec(USERS_RAML);
    for config in [
        GeneratorConfig {
            api_version: String::new(),
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            api_version: "v1/beta".to_string(),
            ..GeneratorConfig::default()
        },
        GeneratorConfig {
            app_name: "!!!".to_string(),
            ..GeneratorConfig::default()
        },
    ] {
        let err = ServerGenerator::new(&registry, config).generate(&spec).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidConfig { .. }), "{err}");
    }
}

#[test]
fn test_model_uses_descriptors() {
    let files = server_files("title: T\n/widgets:\n  get:\n", GeneratorConfig::default());
    let model = &files["app/resources/widgets/model.py"];
    assert!(model.contains("from datetime import datetime"));
    assert!(model.contains("id = db.Column(db.Integer, primary_key=True)"));
    assert!(model.contains("name = db.Column(db.String(255), nullable=False)"));
    assert!(model.contains("created_at = db.Column(db.DateTime, default=datetime.utcnow)"));
    assert!(model.contains("UPDATABLE_FIELDS = ('name', 'created_at', )"));
    assert!(!model.contains("autoincrement"));
}

#[test]
fn test_surrogate_key_without_id_field() {
    let raml = concat!(
        "title: T\n/notes:\n  post:\n    body:\n      application/json:\n",
        "        properties:\n          text: string\n",
    );
    let files = server_files(raml, GeneratorConfig::default());
    let model = &files["app/resources/notes/model.py"];
    assert!(model.contains("id = db.Column(db.Integer, primary_key=True, autoincrement=True)"));
    assert!(!model.contains("from datetime import datetime"));
}

#[test]
fn test_client_artifact_set() {
    let raml = format!("{USERS_RAML}types:\n  User:\n    properties:\n      email: string\n");
    let files = client_files(&raml, ClientConfig::for_spec("users", true, true));
    for path in [
        "users_client/__init__.py",
        "users_client/base_client.py",
        "users_client/exceptions.py",
        "users_client/models.py",
        "users_client/resources/__init__.py",
        "users_client/resources/users/__init__.py",
        "users_client/resources/users/client.py",
        "tests/__init__.py",
        "tests/conftest.py",
        "tests/test_users.py",
        "tests/integration/__init__.py",
        "tests/integration/test_client.py",
        "setup.py",
        "requirements.txt",
        "requirements-dev.txt",
        "pytest.ini",
        ".gitignore",
        "README.md",
        "examples/__init__.py",
        "examples/basic_usage.py",
    ] {
        assert!(files.contains_key(path), "missing {path}");
    }
    assert!(files["users_client/models.py"].contains("class User:"));
    assert!(files["setup.py"].contains("name='users-client'"));
}

#[test]
fn test_client_models_only_with_types() {
    let files = client_files(USERS_RAML, ClientConfig::default());
    assert!(!files.contains_key("api_client/models.py"));
}

#[test]
fn test_client_aggregate_class_avoids_group_clash() {
    let files = client_files(
        "title: T\n/orders:\n  get:\n",
        ClientConfig::for_spec("orders", true, true),
    );
    let init = &files["orders_client/__init__.py"];
    assert!(init.contains("class OrdersClientApi:"));
    assert!(init.contains("self.orders = OrdersClient(self._base)"));
}

#[test]
fn test_client_integration_suite_does_not_shadow_group_tests() {
    let files = client_files("title: T\n/integration:\n  get:\n  post:\n", ClientConfig::default());
    assert!(files["tests/test_integration.py"].contains("def test_list_integration("));
    assert!(files["tests/integration/test_client.py"]
        .contains("def test_client_exposes_every_resource("));
}

#[test]
fn test_client_accessor_does_not_shadow_aggregate_members() {
    let files = client_files("title: T\n/close:\n  get:\n", ClientConfig::default());
    let init = &files["api_client/__init__.py"];
    assert!(init.contains("self.close_ = CloseClient(self._base)"));
    assert!(!init.contains("self.close = "));
    assert!(init.contains("    def close(self):"));
    assert!(files["tests/test_close.py"].contains("api_client.close_.list_close("));
    assert!(files["tests/integration/test_client.py"]
        .contains("assert api_client.close_ is not None"));
    assert!(files["examples/basic_usage.py"].contains("client.close_.list_close("));
}

#[test]
fn test_client_base_url_and_version() {
    assert_eq!(
        client_base_url("https://api.example.com/{version}", "v2"),
        "https://api.example.com/v2"
    );
    assert_eq!(client_base_url("/api", "1.0"), "http://localhost:5000/api");
    assert_eq!(client_base_url("", "1.0"), DEFAULT_CLIENT_HOST);
    assert_eq!(package_version("v1"), "1");
    assert_eq!(package_version("2.1.0"), "2.1.0");
    assert_eq!(package_version("1..0"), "0.1.0");

    let files = client_files(USERS_RAML, ClientConfig::default());
    assert!(files["api_client/base_client.py"].contains("base_url='https://api.example.com/v1'"));
}

#[test]
fn test_client_tests_expect_full_uri() {
    let files = client_files(USERS_RAML, ClientConfig::default());
    let tests = &files["tests/test_users.py"];
    assert!(tests.contains("api_client.users.get_users_by_user_id(1, )"));
    assert!(tests.contains("assert args[1] == 'http://testserver' + '/users/1'"));
}
