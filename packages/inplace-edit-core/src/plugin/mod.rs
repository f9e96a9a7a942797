//! In-place list editing plugin.
//!
//! Binds the inline editor component onto selected columns of a resource
//! while the admin configuration is built, and checks after schema discovery
//! that every selected column really exists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::resource::{ComponentBinding, ResourceConfig};

/// Plugin name used for instance ids and component paths.
pub const PLUGIN_NAME: &str = "ListInPlaceEditPlugin";

/// Client-side editor bound to each target column.
pub const EDITOR_COMPONENT: &str = "InPlaceEdit.vue";

/// Metadata key carrying the owning plugin instance id.
pub const META_PLUGIN_INSTANCE_ID: &str = "pluginInstanceId";

/// Metadata key carrying the edited column name.
pub const META_COLUMN_NAME: &str = "columnName";

/// Options fixed when the plugin is attached to a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOptions {
    /// Names of the columns to make editable in the list view
    pub columns: BTreeSet<String>,
}

impl PluginOptions {
    /// Creates options targeting the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// One attachment of the plugin to one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InPlaceEditPlugin {
    options: PluginOptions,
    resource_id: String,
    instance_id: String,
}

impl InPlaceEditPlugin {
    /// Attaches the plugin to a resource.
    ///
    /// The instance id is derived from the plugin name, the resource id and
    /// [`Self::instance_unique_representation`], so it is stable across
    /// restarts and identical for two attachments to the same resource.
    pub fn new(resource_id: impl Into<String>, options: PluginOptions) -> Self {
        let resource_id = resource_id.into();
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(PLUGIN_NAME.as_bytes());
        hasher.update(resource_id.as_bytes());
        hasher.update(Self::instance_unique_representation().as_bytes());
        let instance_id = format!("{:08x}", hasher.finalize());

        Self {
            options,
            resource_id,
            instance_id,
        }
    }

    /// Distinguishes instances on the same resource; this plugin allows one.
    pub fn instance_unique_representation() -> &'static str {
        "single"
    }

    /// Opaque instance identifier used for routing and component metadata.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Resource this instance is attached to.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Plugin options.
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Whether `field` is one of the columns this instance edits.
    pub fn is_editable(&self, field: &str) -> bool {
        self.options.columns.contains(field)
    }

    /// Path of the update endpoint served for this instance.
    pub fn endpoint_path(&self) -> String {
        format!("/plugin/{}/update-field", self.instance_id)
    }

    /// Resolves a plugin component file to the path the client bundle uses.
    pub fn component_path(file: &str) -> String {
        format!("@@/plugins/{}/{}", PLUGIN_NAME, file)
    }

    /// Binds the inline editor onto every targeted column of `resource`.
    ///
    /// Columns not present yet are skipped here and caught by
    /// [`Self::validate_config_after_discover`]. All targeted columns are
    /// checked before any is modified, so a conflict leaves `resource`
    /// untouched.
    ///
    /// # Errors
    /// `ConfigError::DuplicateListComponent` if a targeted column already has
    /// a list component.
    pub fn modify_resource_config(
        &self,
        resource: &mut ResourceConfig,
    ) -> Result<(), ConfigError> {
        let targets: Vec<String> = resource
            .columns
            .iter()
            .filter(|c| self.options.columns.contains(&c.name))
            .map(|c| c.name.clone())
            .collect();

        for name in &targets {
            if resource
                .column(name)
                .is_some_and(|c| c.components.list.is_some())
            {
                return Err(ConfigError::DuplicateListComponent {
                    column: name.clone(),
                    resource: resource.resource_id.clone(),
                });
            }
        }

        let file = Self::component_path(EDITOR_COMPONENT);
        for name in targets {
            let mut meta = Map::new();
            meta.insert(
                META_PLUGIN_INSTANCE_ID.to_string(),
                Value::String(self.instance_id.clone()),
            );
            meta.insert(META_COLUMN_NAME.to_string(), Value::String(name.clone()));

            if let Some(column) = resource.column_mut(&name) {
                column.components.list = Some(ComponentBinding {
                    file: file.clone(),
                    meta,
                });
            }
            tracing::debug!(
                "Bound in-place editor to {}.{} (instance {})",
                resource.resource_id,
                name,
                self.instance_id
            );
        }

        Ok(())
    }

    /// Checks that every configured column exists on the resolved resource.
    ///
    /// # Errors
    /// `ConfigError::UnknownColumn` for the first configured column missing
    /// from `resource`.
    pub fn validate_config_after_discover(
        &self,
        resource: &ResourceConfig,
    ) -> Result<(), ConfigError> {
        for name in &self.options.columns {
            if resource.column(name).is_none() {
                return Err(ConfigError::UnknownColumn {
                    column: name.clone(),
                    resource_label: resource.label().to_string(),
                });
            }
        }
        Ok(())
    }
}
