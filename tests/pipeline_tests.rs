#![allow(clippy::unwrap_used, clippy::expect_used)]

use apiforge::generator::{
    ClientConfig, ClientLibraryGenerator, GenerateError, GeneratedFiles, TemplateRegistry,
};
use apiforge::pipeline::{run_batch, run_batch_with, BatchOptions, FailureStage, SpecInput};
use apiforge::spec::{parse, HttpVerb, Specification};
use std::fs;

/// Client backend that fails for one title and delegates otherwise
struct FlakyClient<'a> {
    registry: &'a TemplateRegistry,
    fail_title: &'static str,
}

impl ClientLibraryGenerator for FlakyClient<'_> {
    fn generate_client(
        &self,
        spec: &Specification,
        config: &ClientConfig,
    ) -> Result<GeneratedFiles, GenerateError> {
        if spec.title == self.fail_title {
            return Err(GenerateError::InvalidConfig {
                message: format!("cannot build a client for {}", spec.title),
            });
        }
        self.registry.generate_client(spec, config)
    }
}

fn spec_with_title(title: &str) -> String {
    format!("title: {title}\n/widgets:\n  get:\n  post:\n  /{{widgetId}}:\n    get:\n")
}

#[test]
fn test_minimal_spec_parses() {
    let raml = concat!(
        "#%RAML 1.0\ntitle: T\n/a:\n  get:\n    responses:\n      200:\n",
        "        body:\n          application/json:\n            type: string\n",
    );
    let spec = parse(raml, None).unwrap();
    assert_eq!(spec.title, "T");
    assert_eq!(spec.resources.len(), 1);
    let resource = &spec.resources[0];
    assert_eq!(resource.uri, "/a");
    assert_eq!(resource.methods.len(), 1);
    assert_eq!(resource.methods[0].verb, HttpVerb::Get);
    let responses: Vec<&String> = resource.methods[0].responses.keys().collect();
    assert_eq!(responses, vec!["200"]);
}

#[test]
fn test_unresolved_include_yields_placeholder_type() {
    let dir = tempfile::tempdir().unwrap();
    let raml = "title: T\ntypes:\n  Order: !include Order.raml\n";
    let spec = parse(raml, Some(dir.path())).unwrap();
    let order = spec.type_def("Order").unwrap();
    assert_eq!(order.kind, "object");
    assert!(order.properties.is_empty());
    assert!(order.description.contains("Order.raml"));
}

#[test]
fn test_client_failure_is_isolated_to_one_spec() {
    let registry = TemplateRegistry::new().unwrap();
    let backend = FlakyClient {
        registry: &registry,
        fail_title: "Second",
    };
    let inputs = vec![
        SpecInput::new("first", spec_with_title("First")),
        SpecInput::new("second", spec_with_title("Second")),
        SpecInput::new("third", spec_with_title("Third")),
    ];
    let options = BatchOptions {
        generate_client: true,
        ..BatchOptions::default()
    };

    let outcome = run_batch_with(&inputs, &options, &registry, &backend);

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].spec, "second");
    assert_eq!(outcome.failures[0].stage, FailureStage::ClientGeneration);
    for name in ["first", "third"] {
        assert!(outcome.files.contains_key(&format!("{name}-flask/app/__init__.py")));
        assert!(outcome.files.contains_key(&format!("{name}-client/setup.py")));
    }
    assert!(!outcome.files.keys().any(|p| p.starts_with("second-client/")));
}

#[test]
fn test_library_fixture_generates_valid_code() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/library/library.raml");
    let input = SpecInput::from_file(&path).unwrap();
    assert_eq!(input.name, "library");

    let registry = TemplateRegistry::new().unwrap();
    let options = BatchOptions {
        generate_client: true,
        ..BatchOptions::default()
    };
    let outcome = run_batch(&[input], &options, &registry);
    assert!(outcome.is_success(), "{:?}", outcome.failures);

    let books = &outcome.files["library-flask/app/resources/books/model.py"];
    assert!(books.contains("id = db.Column(db.Integer, primary_key=True"));
    assert!(books.contains("isbn = db.Column(db.String(255)"));
    assert!(books.contains("published_on = db.Column(db.Date"));
    assert!(books.contains("tags = db.Column(db.JSON"));

    let members = &outcome.files["library-flask/app/resources/members/model.py"];
    assert!(members.contains("display_name = db.Column("));
    assert!(members.contains("'display-name': _plain(self.display_name)"));
    assert!(members.contains("class_ = db.Column("));

    let routes = &outcome.files["library-flask/app/resources/books/routes.py"];
    assert!(routes.contains("@jwt_required()"));

    assert!(outcome.files.contains_key("library-flask/app/resources/reviews/routes.py"));
    assert!(outcome.files.contains_key("library-client/library_client/models.py"));
}

#[test]
fn test_generation_is_idempotent() {
    let registry = TemplateRegistry::new().unwrap();
    let inputs = vec![SpecInput::new("shop", spec_with_title("Shop"))];
    let options = BatchOptions {
        generate_client: true,
        ..BatchOptions::default()
    };
    let first = run_batch(&inputs, &options, &registry);
    let second = run_batch(&inputs, &options, &registry);
    assert_eq!(first.files, second.files);
}

#[test]
fn test_fixed_files_identical_across_specs() {
    let registry = TemplateRegistry::new().unwrap();
    let inputs = vec![
        SpecInput::new("one", spec_with_title("One")),
        SpecInput::new("two", "title: Two\n/orders:\n  get:\n"),
    ];
    let outcome = run_batch(&inputs, &BatchOptions::default(), &registry);
    assert_eq!(outcome.files["one-flask/.env.example"], outcome.files["two-flask/.env.example"]);
    assert_eq!(outcome.files["one-flask/.gitignore"], outcome.files["two-flask/.gitignore"]);
}

#[test]
fn test_manifest_follows_feature_flags() {
    let registry = TemplateRegistry::new().unwrap();
    let inputs = vec![SpecInput::new("shop", spec_with_title("Shop"))];

    let full = run_batch(&inputs, &BatchOptions::default(), &registry);
    let mut bare_options = BatchOptions::default();
    bare_options.server.include_auth = false;
    bare_options.server.include_cors = false;
    let bare = run_batch(&inputs, &bare_options, &registry);

    let full_reqs = &full.files["shop-flask/requirements.txt"];
    let bare_reqs = &bare.files["shop-flask/requirements.txt"];
    assert!(full_reqs.contains("Flask-JWT-Extended"));
    assert!(full_reqs.contains("Flask-CORS"));
    assert!(!bare_reqs.contains("Flask-JWT-Extended"));
    assert!(!bare_reqs.contains("Flask-CORS"));
    assert!(bare_reqs.contains("Flask-SQLAlchemy"));
}

#[test]
fn test_from_file_resolves_includes_relative_to_spec() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("types")).unwrap();
    fs::write(
        dir.path().join("types/parcels.raml"),
        "type: object\nproperties:\n  weight: number\n  label: string\n",
    )
    .unwrap();
    let spec_path = dir.path().join("post.raml");
    fs::write(
        &spec_path,
        "title: Post\ntypes:\n  parcels: !include parcels\n/parcels:\n  get:\n",
    )
    .unwrap();

    let input = SpecInput::from_file(&spec_path).unwrap();
    let registry = TemplateRegistry::new().unwrap();
    let outcome = run_batch(&[input], &BatchOptions::default(), &registry);
    assert!(outcome.is_success(), "{:?}", outcome.failures);
    let model = &outcome.files["post-flask/app/resources/parcels/model.py"];
    assert!(model.contains("weight = db.Column(db.Float"));
    assert!(model.contains("id = db.Column(db.Integer, primary_key=True, autoincrement=True)"));
}
