//! Resource and column configuration owned by the admin host.

mod column;
mod value;

pub use column::{Column, ColumnComponents, ComponentBinding};
pub use value::{record_key, ColumnType};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as handed out by a connector: column name to JSON value.
pub type Record = Map<String, Value>;

/// Resource configuration.
///
/// Mutable only while the admin configuration is being built; once sealed
/// into an [`AdminConfig`](crate::admin::AdminConfig) it is reachable through
/// shared references only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Unique resource identifier
    pub resource_id: String,
    /// Human readable label (defaults to the resource id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Name of the data source whose connector stores the records
    pub data_source: String,
    /// Ordered column definitions
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Resource-wide options
    #[serde(default)]
    pub options: ResourceOptions,
}

/// Resource-wide options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceOptions {
    /// Actions admins may perform on records of this resource
    #[serde(default)]
    pub allowed_actions: AllowedActions,
}

/// Per-resource action permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedActions {
    /// Whether existing records may be edited
    #[serde(default = "default_true")]
    pub edit: bool,
}

impl Default for AllowedActions {
    fn default() -> Self {
        Self { edit: true }
    }
}

fn default_true() -> bool {
    true
}

impl ResourceConfig {
    /// Creates a resource with no columns.
    pub fn new(resource_id: impl Into<String>, data_source: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            label: None,
            data_source: data_source.into(),
            columns: Vec::new(),
            options: ResourceOptions::default(),
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets whether records may be edited.
    pub fn with_edit_allowed(mut self, allowed: bool) -> Self {
        self.options.allowed_actions.edit = allowed;
        self
    }

    /// Label shown to operators, falling back to the resource id.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.resource_id)
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Returns the primary key column, if one is declared.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }
}
