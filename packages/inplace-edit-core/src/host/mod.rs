//! Host collaborators: data connectors and the generic record update
//! operation, plus an in-memory reference host.

mod memory;
mod pipeline;

pub use memory::MemoryConnector;
pub use pipeline::{BeforeSaveHook, UpdatePipeline};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HostError;
use crate::resource::{Column, Record, ResourceConfig};

/// Authenticated admin performing a request, supplied by the host pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Login name
    pub username: String,
}

impl AdminUser {
    /// Creates an admin user.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Data access for the records of a resource.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Fetches a record by primary key, `None` if it does not exist.
    async fn get_record_by_primary_key(
        &self,
        resource: &ResourceConfig,
        record_id: &Value,
    ) -> Result<Option<Record>, HostError>;

    /// Writes the given columns of an existing record, leaving the rest as is.
    async fn update_record(
        &self,
        resource: &ResourceConfig,
        record_id: &Value,
        changes: &Record,
    ) -> Result<(), HostError>;

    /// Columns found in the underlying store for this resource.
    async fn discover_columns(
        &self,
        _resource: &ResourceConfig,
    ) -> Result<Vec<Column>, HostError> {
        Ok(Vec::new())
    }
}

/// Connectors keyed by data source name.
#[derive(Default, Clone)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connector under a data source name, replacing any previous one.
    pub fn register(&mut self, data_source: impl Into<String>, connector: Arc<dyn Connector>) {
        self.connectors.insert(data_source.into(), connector);
    }

    /// Looks up the connector of a data source.
    pub fn get(&self, data_source: &str) -> Option<&Arc<dyn Connector>> {
        self.connectors.get(data_source)
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("data_sources", &self.connectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Arguments of the host's generic record update operation.
#[derive(Debug)]
pub struct UpdateResourceRecord<'a> {
    /// Resource the record belongs to
    pub resource: &'a ResourceConfig,
    /// Primary key of the record
    pub record_id: &'a Value,
    /// Columns to write
    pub record: Record,
    /// Record state read before the update
    pub old_record: &'a Record,
    /// Admin performing the update
    pub admin_user: &'a AdminUser,
}

/// Result of the host's update operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// Failure message, `None` on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateOutcome {
    /// Successful outcome.
    pub fn ok() -> Self {
        Self { error: None }
    }

    /// Failed outcome with a message for the caller.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }
}

/// The host's generic record update operation.
///
/// Permission checks, hooks and validation belong to the implementation;
/// callers only see the outcome.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Applies `request.record` to the stored record.
    async fn update_resource_record(&self, request: UpdateResourceRecord<'_>) -> UpdateOutcome;
}
