//! Project configuration for apiforge
//!
//! An `apiforge.toml` next to the first specification (or passed with
//! `--config`) supplies generator defaults; command-line flags override it.
//!
//! ```toml
//! generate_client = true
//!
//! [server]
//! app_name = "orders"
//! api_version = "v2"
//! include_auth = false
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::GeneratorConfig;
use crate::pipeline::BatchOptions;

/// File name looked up next to a specification
pub const CONFIG_FILE_NAME: &str = "apiforge.toml";

/// Settings loaded from `apiforge.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Flask generator options
    pub server: GeneratorConfig,
    /// Also generate a Python client per specification
    pub generate_client: bool,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub app_name: Option<String>,
    pub api_version: Option<String>,
    pub no_auth: bool,
    pub no_cors: bool,
    pub no_tests: bool,
    pub client: bool,
}

impl ForgeConfig {
    /// Apply command-line overrides
    ///
    /// Switch flags can only turn features off (`--no-auth`) or on
    /// (`--client`); absent flags keep the file value.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(app_name) = &overrides.app_name {
            self.server.app_name = app_name.clone();
        }
        if let Some(api_version) = &overrides.api_version {
            self.server.api_version = api_version.clone();
        }
        if overrides.no_auth {
            self.server.include_auth = false;
        }
        if overrides.no_cors {
            self.server.include_cors = false;
        }
        if overrides.no_tests {
            self.server.generate_tests = false;
        }
        if overrides.client {
            self.generate_client = true;
        }
        self
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            server: self.server.clone(),
            generate_client: self.generate_client,
        }
    }
}

/// Load a configuration file
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or is not valid TOML.
pub fn load_forge_config(config_path: &Path) -> anyhow::Result<Option<ForgeConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: ForgeConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Look for `apiforge.toml` in the directory of `spec_path`
pub fn detect_forge_config(spec_path: &Path) -> Option<PathBuf> {
    let dir = spec_path.parent()?;
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Resolve the effective configuration for a run
///
/// An explicit path must exist; otherwise the file next to the first spec is
/// used when present, and defaults apply when neither is found.
///
/// # Errors
///
/// Fails when an explicit path is missing or any file is malformed.
pub fn resolve_config(
    explicit: Option<&Path>,
    first_spec: Option<&Path>,
) -> anyhow::Result<ForgeConfig> {
    if let Some(path) = explicit {
        return load_forge_config(path)?
            .with_context(|| format!("Config file not found: {}", path.display()));
    }
    match first_spec.and_then(detect_forge_config) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using detected config");
            Ok(load_forge_config(&path)?.unwrap_or_default())
        }
        None => Ok(ForgeConfig::default()),
    }
}
