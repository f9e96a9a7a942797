//! Admin configuration: a mutable build phase sealed into an immutable
//! serving phase.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::ConfigError;
use crate::host::ConnectorRegistry;
use crate::plugin::{InPlaceEditPlugin, PluginOptions};
use crate::resource::ResourceConfig;

/// Collects resources and plugin attachments before serving starts.
///
/// Resources are only mutable through this builder; [`build`](Self::build)
/// consumes it and hands back a sealed [`AdminConfig`].
#[derive(Debug, Default)]
pub struct AdminConfigBuilder {
    resources: Vec<ResourceConfig>,
    plugins: Vec<(String, PluginOptions)>,
}

impl AdminConfigBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a resource.
    pub fn resource(mut self, resource: ResourceConfig) -> Self {
        self.resources.push(resource);
        self
    }

    /// Attaches an in-place edit plugin instance to a resource.
    pub fn plugin(mut self, resource_id: impl Into<String>, options: PluginOptions) -> Self {
        self.plugins.push((resource_id.into(), options));
        self
    }

    /// Runs the configuration build and seals the result.
    ///
    /// Order: resource checks, plugin instantiation, augmentation, schema
    /// discovery through each resource's connector, post-discovery
    /// validation. The first failure aborts the build.
    ///
    /// # Errors
    /// Any [`ConfigError`]; none of them is recoverable.
    pub async fn build(
        mut self,
        connectors: &ConnectorRegistry,
    ) -> Result<AdminConfig, ConfigError> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.resource_id.clone()) {
                return Err(ConfigError::DuplicateResource(resource.resource_id.clone()));
            }
            if resource.primary_key().is_none() {
                return Err(ConfigError::MissingPrimaryKey(resource.resource_id.clone()));
            }
            if connectors.get(&resource.data_source).is_none() {
                return Err(ConfigError::UnknownDataSource {
                    resource: resource.resource_id.clone(),
                    data_source: resource.data_source.clone(),
                });
            }
        }

        let mut instances: BTreeMap<String, InPlaceEditPlugin> = BTreeMap::new();
        for (resource_id, options) in std::mem::take(&mut self.plugins) {
            if !seen.contains(&resource_id) {
                return Err(ConfigError::UnknownResource(resource_id));
            }
            let plugin = InPlaceEditPlugin::new(resource_id, options);
            if instances.contains_key(plugin.instance_id()) {
                return Err(ConfigError::DuplicatePluginInstance {
                    instance_id: plugin.instance_id().to_string(),
                    resource: plugin.resource_id().to_string(),
                });
            }
            instances.insert(plugin.instance_id().to_string(), plugin);
        }

        for plugin in instances.values() {
            if let Some(resource) = self
                .resources
                .iter_mut()
                .find(|r| r.resource_id == plugin.resource_id())
            {
                plugin.modify_resource_config(resource)?;
            }
        }

        for resource in &mut self.resources {
            discover(resource, connectors).await?;
        }

        for plugin in instances.values() {
            if let Some(resource) = self
                .resources
                .iter()
                .find(|r| r.resource_id == plugin.resource_id())
            {
                plugin.validate_config_after_discover(resource)?;
            }
        }

        tracing::info!(
            "Admin configuration sealed: {} resources, {} in-place edit instances",
            self.resources.len(),
            instances.len()
        );

        let index = self
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.resource_id.clone(), i))
            .collect();

        Ok(AdminConfig {
            resources: self.resources,
            index,
            instances: instances.into_iter().collect(),
        })
    }
}

/// Merges connector-discovered columns into a resource: undeclared columns are
/// appended, declared columns without a type take the discovered one.
async fn discover(
    resource: &mut ResourceConfig,
    connectors: &ConnectorRegistry,
) -> Result<(), ConfigError> {
    let Some(connector) = connectors.get(&resource.data_source) else {
        return Err(ConfigError::UnknownDataSource {
            resource: resource.resource_id.clone(),
            data_source: resource.data_source.clone(),
        });
    };

    let discovered = connector
        .discover_columns(resource)
        .await
        .map_err(|e| ConfigError::Discovery {
            resource: resource.resource_id.clone(),
            message: e.to_string(),
        })?;

    for found in discovered {
        match resource.column_mut(&found.name) {
            Some(column) => {
                if column.column_type.is_none() {
                    column.column_type = found.column_type;
                }
            }
            None => {
                tracing::debug!(
                    "Discovered column {}.{}",
                    resource.resource_id,
                    found.name
                );
                resource.columns.push(found);
            }
        }
    }
    Ok(())
}

/// Sealed admin configuration shared by all requests.
///
/// Exposes shared references only; nothing can modify resources or plugin
/// instances once serving starts.
#[derive(Debug)]
pub struct AdminConfig {
    resources: Vec<ResourceConfig>,
    index: HashMap<String, usize>,
    instances: HashMap<String, InPlaceEditPlugin>,
}

impl AdminConfig {
    /// Looks up a resource by id.
    pub fn resource(&self, resource_id: &str) -> Option<&ResourceConfig> {
        self.index.get(resource_id).map(|&i| &self.resources[i])
    }

    /// All resources in declaration order.
    pub fn resources(&self) -> &[ResourceConfig] {
        &self.resources
    }

    /// Looks up a plugin instance by id.
    pub fn plugin_instance(&self, instance_id: &str) -> Option<&InPlaceEditPlugin> {
        self.instances.get(instance_id)
    }

    /// All plugin instances.
    pub fn plugin_instances(&self) -> impl Iterator<Item = &InPlaceEditPlugin> {
        self.instances.values()
    }
}
