//! Reference implementation of the host's record update operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{AdminUser, ConnectorRegistry, RecordUpdater, UpdateOutcome, UpdateResourceRecord};
use crate::resource::{Record, ResourceConfig};

/// Hook run before an update is written.
///
/// A hook may add or rewrite columns of the pending change set, or veto the
/// update by returning a message for the caller.
#[async_trait]
pub trait BeforeSaveHook: Send + Sync {
    async fn before_save(
        &self,
        resource: &ResourceConfig,
        record: &mut Record,
        old_record: &Record,
        admin_user: &AdminUser,
    ) -> Result<(), String>;
}

/// Update operation: permission check, before-save hooks, connector write.
#[derive(Clone)]
pub struct UpdatePipeline {
    connectors: Arc<ConnectorRegistry>,
    hooks: HashMap<String, Vec<Arc<dyn BeforeSaveHook>>>,
}

impl UpdatePipeline {
    /// Creates a pipeline writing through the given connectors.
    pub fn new(connectors: Arc<ConnectorRegistry>) -> Self {
        Self {
            connectors,
            hooks: HashMap::new(),
        }
    }

    /// Registers a before-save hook for a resource. Hooks run in
    /// registration order.
    pub fn with_hook(
        mut self,
        resource_id: impl Into<String>,
        hook: Arc<dyn BeforeSaveHook>,
    ) -> Self {
        self.hooks.entry(resource_id.into()).or_default().push(hook);
        self
    }
}

#[async_trait]
impl RecordUpdater for UpdatePipeline {
    async fn update_resource_record(&self, request: UpdateResourceRecord<'_>) -> UpdateOutcome {
        let resource = request.resource;

        if !resource.options.allowed_actions.edit {
            tracing::warn!(
                "User {} may not edit records of {}",
                request.admin_user.username,
                resource.resource_id
            );
            return UpdateOutcome::failed("Action is not allowed");
        }

        let mut record = request.record;
        if let Some(hooks) = self.hooks.get(&resource.resource_id) {
            for hook in hooks {
                if let Err(message) = hook
                    .before_save(resource, &mut record, request.old_record, request.admin_user)
                    .await
                {
                    tracing::debug!("Before-save hook rejected update: {}", message);
                    return UpdateOutcome::failed(message);
                }
            }
        }

        let Some(connector) = self.connectors.get(&resource.data_source) else {
            tracing::error!("No connector for data source {}", resource.data_source);
            return UpdateOutcome::failed(format!(
                "No connector registered for data source '{}'",
                resource.data_source
            ));
        };

        match connector
            .update_record(resource, request.record_id, &record)
            .await
        {
            Ok(()) => UpdateOutcome::ok(),
            Err(e) => {
                tracing::error!("Failed to write record of {}: {}", resource.resource_id, e);
                UpdateOutcome::failed(e.to_string())
            }
        }
    }
}
