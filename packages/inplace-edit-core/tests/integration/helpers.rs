//! Shared fixtures: a `posts` resource over an in-memory connector.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use inplace_edit_core::error::HostError;
use inplace_edit_core::host::{
    AdminUser, BeforeSaveHook, Connector, ConnectorRegistry, MemoryConnector, RecordUpdater,
    UpdateOutcome, UpdatePipeline, UpdateResourceRecord,
};
use inplace_edit_core::resource::{Column, ColumnType, Record, ResourceConfig};
use inplace_edit_core::{AdminConfigBuilder, FieldUpdater, PluginOptions};

pub const PUBLISHED_AT: &str = "2024-01-01T00:00:00Z";

/// Memory connector that counts primary key reads.
#[derive(Default)]
pub struct CountingConnector {
    pub inner: MemoryConnector,
    pub reads: AtomicUsize,
}

impl CountingConnector {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for CountingConnector {
    async fn get_record_by_primary_key(
        &self,
        resource: &ResourceConfig,
        record_id: &Value,
    ) -> Result<Option<Record>, HostError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_record_by_primary_key(resource, record_id).await
    }

    async fn update_record(
        &self,
        resource: &ResourceConfig,
        record_id: &Value,
        changes: &Record,
    ) -> Result<(), HostError> {
        self.inner.update_record(resource, record_id, changes).await
    }

    async fn discover_columns(
        &self,
        resource: &ResourceConfig,
    ) -> Result<Vec<Column>, HostError> {
        self.inner.discover_columns(resource).await
    }
}

/// Sets `publishedAt` when a post moves to `published`.
pub struct PublishHook;

#[async_trait]
impl BeforeSaveHook for PublishHook {
    async fn before_save(
        &self,
        _resource: &ResourceConfig,
        record: &mut Record,
        old_record: &Record,
        _admin_user: &AdminUser,
    ) -> Result<(), String> {
        let publishing = record.get("status") == Some(&json!("published"))
            && old_record.get("status") != Some(&json!("published"));
        if publishing {
            record.insert("publishedAt".to_string(), json!(PUBLISHED_AT));
        }
        Ok(())
    }
}

/// Update operation that always refuses.
pub struct DenyingUpdater;

#[async_trait]
impl RecordUpdater for DenyingUpdater {
    async fn update_resource_record(&self, _request: UpdateResourceRecord<'_>) -> UpdateOutcome {
        UpdateOutcome::failed("Permission denied")
    }
}

pub fn posts_resource() -> ResourceConfig {
    ResourceConfig::new("posts", "main")
        .with_label("Posts")
        .with_column(Column::new("id").typed(ColumnType::Integer).primary())
        .with_column(Column::new("title").typed(ColumnType::String).required())
        .with_column(
            Column::new("status")
                .typed(ColumnType::String)
                .with_enum(vec![json!("draft"), json!("published")]),
        )
        .with_column(Column::new("views").typed(ColumnType::Integer))
        .with_column(Column::new("publishedAt").typed(ColumnType::DateTime))
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

pub fn admin() -> AdminUser {
    AdminUser::new("alice")
}

/// Sealed posts setup with in-place editing of `status` and `views`.
pub struct PostsFixture {
    pub connector: Arc<CountingConnector>,
    pub connectors: Arc<ConnectorRegistry>,
    pub service: FieldUpdater,
    pub instance_id: String,
}

pub async fn posts_fixture(resource: ResourceConfig) -> PostsFixture {
    let connector = Arc::new(CountingConnector::default());
    connector
        .inner
        .insert(
            &resource,
            record(json!({"id": 42, "title": "Hello", "status": "draft", "views": 3, "publishedAt": null})),
        )
        .unwrap();
    connector
        .inner
        .insert(
            &resource,
            record(json!({"id": 7, "title": "Other", "status": "draft", "views": 0, "publishedAt": null})),
        )
        .unwrap();

    let mut registry = ConnectorRegistry::new();
    registry.register("main", connector.clone());
    let connectors = Arc::new(registry);

    let config = AdminConfigBuilder::new()
        .resource(resource)
        .plugin("posts", PluginOptions::new(["status", "views"]))
        .build(&connectors)
        .await
        .unwrap();
    let config = Arc::new(config);
    let instance_id = config
        .plugin_instances()
        .next()
        .map(|p| p.instance_id().to_string())
        .unwrap();

    let pipeline = UpdatePipeline::new(connectors.clone()).with_hook("posts", Arc::new(PublishHook));
    let service = FieldUpdater::new(config, connectors.clone(), Arc::new(pipeline));

    PostsFixture {
        connector,
        connectors,
        service,
        instance_id,
    }
}
