use serde::{Deserialize, Serialize};

use super::error::GenerateError;
use super::naming::{python_identifier, to_pascal_case, to_snake_case};

/// Options for the Flask server generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Application name used in titles, config classes and the README
    pub app_name: String,
    /// Version segment the routes are mounted under (`/api/<version>`)
    pub api_version: String,
    /// Emit JWT authentication wiring
    pub include_auth: bool,
    /// Emit cross-origin support
    pub include_cors: bool,
    /// Emit the pytest suite
    pub generate_tests: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            app_name: "flask_api".to_string(),
            api_version: "v1".to_string(),
            include_auth: true,
            include_cors: true,
            generate_tests: true,
        }
    }
}

impl GeneratorConfig {
    /// Check that the configuration can produce a coherent artifact set
    ///
    /// # Errors
    ///
    /// [`GenerateError::InvalidConfig`] when the API version is empty or not a
    /// single path segment, or the app name has no identifier characters.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let version = self.api_version.trim();
        if version.is_empty() {
            return Err(GenerateError::InvalidConfig {
                message: "api_version must not be empty".to_string(),
            });
        }
        if version.contains('/')
            || !version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
        {
            return Err(GenerateError::InvalidConfig {
                message: format!(
                    "api_version '{}' must be a single URL path segment",
                    self.api_version
                ),
            });
        }
        if to_snake_case(&self.app_name).is_empty() {
            return Err(GenerateError::InvalidConfig {
                message: format!("app_name '{}' contains no identifier characters", self.app_name),
            });
        }
        Ok(())
    }

    /// Human-readable title form of the app name (`orders-api` → `Orders Api`)
    pub fn app_title(&self) -> String {
        to_snake_case(&self.app_name)
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| to_pascal_case(w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Options for the Python client generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Import name of the generated package
    pub package_name: String,
    /// Emit bearer-token support in the base client
    pub include_auth: bool,
    /// Emit the pytest suite
    pub generate_tests: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            package_name: "api_client".to_string(),
            include_auth: true,
            generate_tests: true,
        }
    }
}

impl ClientConfig {
    /// Client options for a named specification (`orders-api` → `orders_api_client`)
    pub fn for_spec(spec_name: &str, include_auth: bool, generate_tests: bool) -> Self {
        Self {
            package_name: format!("{spec_name}_client"),
            include_auth,
            generate_tests,
        }
    }

    /// Importable package name
    pub fn package(&self) -> String {
        python_identifier(&to_snake_case(&self.package_name), "client")
    }

    /// Name of the aggregate client class
    pub fn client_class(&self) -> String {
        to_pascal_case(&self.package())
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        if to_snake_case(&self.package_name).is_empty() {
            return Err(GenerateError::InvalidConfig {
                message: format!(
                    "package_name '{}' contains no identifier characters",
                    self.package_name
                ),
            });
        }
        Ok(())
    }
}
