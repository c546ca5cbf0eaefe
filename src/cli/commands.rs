use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{resolve_config, ConfigOverrides};
use crate::generator::{group_resources, GeneratedFiles, TemplateRegistry};
use crate::pipeline::{run_batch, BatchOutcome, FailureStage, SpecFailure, SpecInput};
use crate::spec::{load_spec, spec_name_from_path, ParseError};
use crate::validator::{print_issues, ValidationReport};

/// Command-line interface for apiforge
///
/// Generates Flask applications (and optional Python clients) from RAML
/// specifications.
#[derive(Parser)]
#[command(name = "apiforge-gen")]
#[command(about = "RAML to Flask code generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a Flask application for each specification
    Generate {
        /// RAML specification files, processed in order
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<PathBuf>,

        /// Output directory; each spec lands under `<name>-flask/`
        #[arg(short, long)]
        output: PathBuf,

        /// Application name used in titles and config classes
        #[arg(long)]
        app_name: Option<String>,

        /// Version segment the routes are mounted under
        #[arg(long)]
        api_version: Option<String>,

        /// Leave out JWT authentication
        #[arg(long, default_value_t = false)]
        no_auth: bool,

        /// Leave out cross-origin support
        #[arg(long, default_value_t = false)]
        no_cors: bool,

        /// Leave out the pytest suite
        #[arg(long, default_value_t = false)]
        no_tests: bool,

        /// Also generate a Python client under `<name>-client/`
        #[arg(long, default_value_t = false)]
        client: bool,

        /// Path to apiforge.toml
        /// If not provided, will auto-detect alongside the first spec
        #[arg(long)]
        config: Option<PathBuf>,

        /// List the files that would be written without touching the disk
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the resources, groups and canonical names of a specification
    Inspect {
        /// RAML specification file
        #[arg(short, long)]
        spec: PathBuf,
    },
    /// Parse, generate and validate without writing anything
    Check {
        /// RAML specification files
        #[arg(short, long, required = true, num_args = 1..)]
        spec: Vec<PathBuf>,

        /// Also check the generated client
        #[arg(long, default_value_t = false)]
        client: bool,

        /// Path to apiforge.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Run a parsed command line
///
/// # Errors
///
/// Fails on unusable configuration, unwritable output, or when any
/// specification of the batch failed (after the successful ones are written).
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            spec,
            output,
            app_name,
            api_version,
            no_auth,
            no_cors,
            no_tests,
            client,
            config,
            dry_run,
        } => {
            let overrides = ConfigOverrides {
                app_name,
                api_version,
                no_auth,
                no_cors,
                no_tests,
                client,
            };
            let outcome = run_specs(&spec, config.as_deref(), &overrides)?;

            if dry_run {
                for path in outcome.files.keys() {
                    println!("{}", output.join(path).display());
                }
            } else {
                let written = write_files(&output, &outcome.files)?;
                println!("✅ Wrote {written} file(s) to {}", output.display());
            }
            report_outcome(&outcome)
        }
        Commands::Inspect { spec } => inspect(&spec),
        Commands::Check { spec, client, config } => {
            let overrides = ConfigOverrides {
                client,
                ..ConfigOverrides::default()
            };
            let outcome = run_specs(&spec, config.as_deref(), &overrides)?;
            let report = ValidationReport {
                warnings: outcome.warnings.clone(),
                ..ValidationReport::default()
            };
            print_issues(&report);
            for name in &outcome.succeeded {
                println!("✅ {name}: generated code is valid");
            }
            report_outcome(&outcome)
        }
    }
}

fn run_specs(
    paths: &[PathBuf],
    config: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<BatchOutcome> {
    let config =
        resolve_config(config, paths.first().map(PathBuf::as_path))?.with_overrides(overrides);
    let registry = TemplateRegistry::new().context("Failed to load templates")?;

    let mut inputs = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match SpecInput::from_file(path) {
            Ok(input) => inputs.push(input),
            Err(e) => unreadable.push(e),
        }
    }

    let mut outcome = run_batch(&inputs, &config.batch_options(), &registry);
    outcome.failures.extend(unreadable.into_iter().map(read_failure));
    Ok(outcome)
}

fn read_failure(error: ParseError) -> SpecFailure {
    let spec = match &error {
        ParseError::Io { path, .. } => spec_name_from_path(path),
        _ => String::new(),
    };
    SpecFailure {
        spec,
        stage: FailureStage::Parse,
        message: error.to_string(),
    }
}

/// Write every artifact below `output`, creating directories as needed
///
/// # Errors
///
/// Fails on the first directory or file that cannot be written.
pub fn write_files(output: &Path, files: &GeneratedFiles) -> anyhow::Result<usize> {
    for (relative, content) in files {
        let path = output.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
    }
    info!(output = %output.display(), files = files.len(), "artifacts written");
    Ok(files.len())
}

fn report_outcome(outcome: &BatchOutcome) -> anyhow::Result<()> {
    if outcome.is_success() {
        return Ok(());
    }
    for failure in &outcome.failures {
        eprintln!("❌ {failure}");
    }
    anyhow::bail!("{} specification(s) failed", outcome.failures.len())
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let spec = load_spec(path)?;
    println!("{} ({})", spec.title, spec.version);
    println!("base URI: {}", spec.base_uri);
    println!("{} resource(s), {} method(s)", spec.resources.len(), spec.method_count());

    println!("\nResources:");
    for resource in &spec.resources {
        let verbs: Vec<&str> = resource.methods.iter().map(|m| m.verb.as_str()).collect();
        println!("  {:<40} {}", resource.uri, verbs.join(" "));
    }

    println!("\nGroups:");
    for group in group_resources(&spec, "") {
        let name = &group.name;
        println!(
            "  {} (module {}, class {}, accessor {}, fields from {:?})",
            name.raw, name.snake, name.pascal, name.camel, group.field_source
        );
        for endpoint in &group.endpoints {
            for op in &endpoint.operations {
                println!("    {:<8} {:<40} {}", op.verb, endpoint.route_path, op.name);
            }
        }
    }

    if !spec.types.is_empty() {
        println!("\nTypes:");
        for ty in &spec.types {
            println!("  {} ({})", ty.name, ty.kind);
        }
    }
    Ok(())
}
