//! Server settings and the TOML application configuration file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::admin::AdminConfigBuilder;
use crate::error::ConfigError;
use crate::plugin::PluginOptions;
use crate::resource::ResourceConfig;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_ms: 5000,  // 5 seconds default
            max_body_bytes: 64 * 1024, // 64 KiB
        }
    }
}

/// Plugin attachment declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDeclaration {
    /// Resource the plugin is attached to
    pub resource_id: String,
    /// Plugin options (the columns to edit in place)
    #[serde(flatten)]
    pub options: PluginOptions,
}

/// Seed records for a resource held by the in-memory data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Resource the records belong to
    pub resource_id: String,
    /// Records as column-to-value tables
    #[serde(default)]
    pub records: Vec<Value>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Declared resources
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
    /// In-place edit plugin attachments
    #[serde(default)]
    pub plugins: Vec<PluginDeclaration>,
    /// Seed data
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

impl AppConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str)
            .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))
    }

    /// Builder pre-loaded with the declared resources and plugins.
    pub fn admin_builder(&self) -> AdminConfigBuilder {
        let builder = self
            .resources
            .iter()
            .cloned()
            .fold(AdminConfigBuilder::new(), AdminConfigBuilder::resource);
        self.plugins.iter().fold(builder, |b, p| {
            b.plugin(p.resource_id.clone(), p.options.clone())
        })
    }
}
