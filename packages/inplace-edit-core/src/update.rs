//! Single-field update service behind the in-place edit endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::admin::AdminConfig;
use crate::error::UpdateFieldError;
use crate::host::{AdminUser, ConnectorRegistry, RecordUpdater, UpdateResourceRecord};
use crate::resource::{record_key, Record};

/// Body of an update-field request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldRequest {
    /// Target resource
    pub resource_id: String,
    /// Primary key of the record
    pub record_id: Value,
    /// Column being edited
    pub field: String,
    /// New value, coerced against the column type before use
    #[serde(default)]
    pub value: Value,
}

/// Body of an update-field response.
///
/// Serializes as `{"record": {...}}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFieldResponse {
    /// Record as re-read after the update
    Record(Record),
    /// Failure reported by the host update operation
    Error(String),
}

/// Applies single-field edits through the host's update operation.
///
/// Holds only the sealed configuration and injected collaborators, so
/// concurrent requests share nothing mutable through it.
#[derive(Clone)]
pub struct FieldUpdater {
    config: Arc<AdminConfig>,
    connectors: Arc<ConnectorRegistry>,
    updater: Arc<dyn RecordUpdater>,
}

impl FieldUpdater {
    /// Creates a service over a sealed configuration.
    pub fn new(
        config: Arc<AdminConfig>,
        connectors: Arc<ConnectorRegistry>,
        updater: Arc<dyn RecordUpdater>,
    ) -> Self {
        Self {
            config,
            connectors,
            updater,
        }
    }

    /// Sealed configuration this service serves.
    pub fn config(&self) -> &Arc<AdminConfig> {
        &self.config
    }

    /// Updates one field of one record on behalf of a plugin instance.
    ///
    /// Reads the record, hands a payload holding only `field` plus the old
    /// record to the update operation, then reads the record again so the
    /// response carries whatever the host changed along the way.
    ///
    /// # Returns
    /// `UpdateFieldResponse::Error` when the update operation fails (no second
    /// read happens), `UpdateFieldResponse::Record` otherwise.
    ///
    /// # Errors
    /// `UpdateFieldError` when the request cannot reach the update operation:
    /// unknown instance or resource, field not editable by this instance,
    /// value or record id not fitting the column, or record missing.
    pub async fn update_field(
        &self,
        instance_id: &str,
        request: UpdateFieldRequest,
        admin_user: &AdminUser,
    ) -> Result<UpdateFieldResponse, UpdateFieldError> {
        let plugin = self
            .config
            .plugin_instance(instance_id)
            .ok_or_else(|| UpdateFieldError::UnknownPluginInstance(instance_id.to_string()))?;

        let resource = self
            .config
            .resource(&request.resource_id)
            .ok_or_else(|| UpdateFieldError::UnknownResource(request.resource_id.clone()))?;

        let column = resource
            .column(&request.field)
            .filter(|_| plugin.resource_id() == resource.resource_id)
            .filter(|c| plugin.is_editable(&c.name))
            .ok_or_else(|| UpdateFieldError::FieldNotEditable {
                resource: resource.resource_id.clone(),
                field: request.field.clone(),
            })?;

        let value = column
            .coerce(request.value)
            .map_err(|source| UpdateFieldError::InvalidValue {
                field: column.name.clone(),
                source,
            })?;

        let record_id = match resource.primary_key() {
            Some(pk) => pk
                .coerce(request.record_id)
                .map_err(UpdateFieldError::InvalidRecordId)?,
            None => request.record_id,
        };

        let connector = self
            .connectors
            .get(&resource.data_source)
            .ok_or_else(|| UpdateFieldError::UnknownDataSource(resource.data_source.clone()))?;

        let not_found = || UpdateFieldError::RecordNotFound {
            resource: resource.resource_id.clone(),
            record_id: record_key(&record_id),
        };

        let old_record = connector
            .get_record_by_primary_key(resource, &record_id)
            .await?
            .ok_or_else(not_found)?;

        let mut changes = Record::new();
        changes.insert(column.name.clone(), value);

        tracing::debug!(
            "Updating {}.{} of record {} for {}",
            resource.resource_id,
            column.name,
            record_key(&record_id),
            admin_user.username
        );

        let outcome = self
            .updater
            .update_resource_record(UpdateResourceRecord {
                resource,
                record_id: &record_id,
                record: changes,
                old_record: &old_record,
                admin_user,
            })
            .await;

        if let Some(error) = outcome.error {
            tracing::warn!(
                "Update of {}.{} rejected: {}",
                resource.resource_id,
                column.name,
                error
            );
            return Ok(UpdateFieldResponse::Error(error));
        }

        let record = connector
            .get_record_by_primary_key(resource, &record_id)
            .await?
            .ok_or_else(not_found)?;

        Ok(UpdateFieldResponse::Record(record))
    }
}
